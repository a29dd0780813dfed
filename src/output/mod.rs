//! Persisting manifests: filesystem seam, formatting writer and the serialized write queue.

mod fs;
mod queue;
mod writer;

pub use fs::{DiskFileSystem, MemoryFileSystem, OutputFileSystem, SharedFileSystem};
pub use queue::{QueuedWriter, WriteTicket};
pub use writer::{OutputWriter, WriteOutcome};
