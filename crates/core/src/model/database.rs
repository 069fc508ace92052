use serde::{Deserialize, Serialize};

/// One outbound database call, attributed to the database service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseAccess {
    pub database_service_id: i32,
    pub name: String,
    pub latency_ms: i64,
    pub status: bool,
    pub time_bucket: i64,
}

/// A database access whose latency exceeded the configured per-type
/// threshold. `time_bucket` is derived from the owning span's own start
/// time, which can differ from the segment-level bucket used by topology
/// records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSlowStatement {
    /// Composite key: `"{segment_id}-{span_id}"`.
    pub id: String,
    pub database_service_id: i32,
    /// Statement text, truncated to the configured maximum length.
    pub statement: String,
    pub latency_ms: i64,
    /// None when no global-trace-id event preceded the detection.
    pub trace_id: Option<String>,
    pub time_bucket: i64,
}
