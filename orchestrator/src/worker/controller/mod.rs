pub mod event_worker;
pub mod expiry_worker;
pub mod worker_controller;

pub use event_worker::EventWorker;
pub use expiry_worker::ExpiryWorker;
pub use worker_controller::WorkerController;
