use clap::Args;

/// Parameters used to select and config the queue transport.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct QueueCliArgs {
    /// SQS queue name prefix. When set and non-empty, queues named
    /// `<prefix>_<queue_type>` must exist and SQS is used as the transport;
    /// otherwise the in-process transport is used.
    #[arg(env = "XVERIFY_SQS_QUEUE_PREFIX", long)]
    pub sqs_queue_prefix: Option<String>,
}
