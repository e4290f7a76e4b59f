pub mod gate;
pub mod model;
pub mod processor;
pub mod repo;

pub use gate::{SafetyGate, HUMAN_APPROVAL_THRESHOLD, MAX_CONSECUTIVE_FAILURES};
pub use model::{ProcessResult, ProcessStatus, QueueItem, QueueStatus};
pub use processor::QueueProcessor;
pub use repo::QueueRepo;
