use crate::error::Result;
use crate::model::Record;

/// Downstream record receiver, one call per record, no batching.
///
/// Implementations must be safe to call from multiple segment workers
/// concurrently; this core itself delivers records for one segment strictly
/// sequentially. An error aborts the remaining emissions for the segment
/// and is surfaced to the caller, never retried here.
pub trait RecordSink: Send + Sync {
    fn receive(&self, record: Record) -> Result<()>;
}
