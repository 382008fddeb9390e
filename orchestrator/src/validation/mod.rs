use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::types::params::ValidationParams;
use crate::types::submission::{SubmissionRequest, ValidSubmission};

/// Why a submission was turned away. Reasons are mutually exclusive; the
/// first failing check wins.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("submission was not posted in the verification channel")]
    WrongChannel,
    #[error("expected exactly one image attachment, got {0}")]
    AttachmentCountInvalid(u32),
    #[error("message must look like `@<handle> <profile-link>`")]
    MalformedBody,
    #[error("the link is not a recognizable profile link")]
    InvalidLinkFormat,
    #[error("handle `@{in_text}` does not match the handle in the link (`{in_link}`)")]
    HandleMismatch { in_text: String, in_link: String },
}

static BODY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z0-9_]{1,15})\s+(\S+)$").expect("body pattern must compile"));

/// Validates a raw submission into a job-ready request.
///
/// Pure and deterministic: no clock, no I/O, no mutation. The checks run in
/// rejection-priority order so a submission with several problems always
/// reports the same reason.
pub fn validate(
    request: &SubmissionRequest,
    params: &ValidationParams,
) -> Result<ValidSubmission, RejectionReason> {
    if let Some(channel_id) = &params.verify_channel_id {
        if &request.channel_id != channel_id {
            return Err(RejectionReason::WrongChannel);
        }
    }

    if request.attachment_count != 1 {
        return Err(RejectionReason::AttachmentCountInvalid(request.attachment_count));
    }

    let captures = BODY_PATTERN.captures(request.body.trim()).ok_or(RejectionReason::MalformedBody)?;
    let claimed_handle = captures[1].to_ascii_lowercase();
    let raw_link = &captures[2];

    let link = parse_profile_link(raw_link, &params.accepted_hosts)?;
    let handle_in_link = handle_from_link(&link).ok_or(RejectionReason::InvalidLinkFormat)?;

    if !handle_in_link.eq_ignore_ascii_case(&claimed_handle) {
        return Err(RejectionReason::HandleMismatch {
            in_text: claimed_handle,
            in_link: handle_in_link.to_ascii_lowercase(),
        });
    }

    Ok(ValidSubmission {
        discord_id: request.discord_id.clone(),
        discord_username: request.discord_username.clone(),
        claimed_handle,
        profile_link: normalize_link(link),
    })
}

fn parse_profile_link(raw: &str, accepted_hosts: &[String]) -> Result<Url, RejectionReason> {
    let url = Url::parse(raw).map_err(|_| RejectionReason::InvalidLinkFormat)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RejectionReason::InvalidLinkFormat);
    }
    // Url lowercases the host during parsing
    let host = url.host_str().ok_or(RejectionReason::InvalidLinkFormat)?;
    if !accepted_hosts.iter().any(|accepted| accepted.eq_ignore_ascii_case(host)) {
        return Err(RejectionReason::InvalidLinkFormat);
    }
    Ok(url)
}

/// The handle is the first path segment: `x.com/<handle>[/status/...]`.
/// Trailing slashes and query strings play no part here.
fn handle_from_link(link: &Url) -> Option<String> {
    let mut segments = link.path_segments()?;
    let handle = segments.next()?.trim();
    if handle.is_empty() || !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(handle.to_string())
}

/// Canonical link stored on the job and hashed into the idempotency key:
/// lowercased host, trailing slash stripped, query preserved, fragment
/// dropped.
fn normalize_link(mut link: Url) -> String {
    link.set_fragment(None);
    let path = link.path().to_string();
    let trimmed = path.trim_end_matches('/');
    if !trimmed.is_empty() && trimmed != path {
        link.set_path(trimmed);
    }
    link.to_string()
}
