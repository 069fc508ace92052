use serde::{Deserialize, Serialize};

use crate::time;

/// Technology layer the instrumented span belongs to, as reported by the
/// agent that recorded it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpanLayer {
    Unknown,
    Database,
    RpcFramework,
    Http,
    Mq,
    Cache,
}

/// One key/value pair attached to a span. Tag order is preserved from the
/// wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanTag {
    pub key: String,
    pub value: String,
}

impl SpanTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Link from an entry span back to the call leg that produced it.
///
/// `parent_endpoint_id` may be the NONE sentinel: the cross-process header
/// protocol does not always carry a parent endpoint. `network_address_id`
/// identifies the peer address the caller used, which for messaging queues
/// is the queue endpoint rather than the producing service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentReference {
    pub parent_endpoint_id: i32,
    pub parent_service_instance_id: i32,
    pub network_address_id: i32,
}

/// Read-only view of one decoded span. Produced by the external wire
/// decoder; this crate never constructs these from raw payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanView {
    pub span_id: i32,
    pub layer: SpanLayer,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub is_error: bool,
    pub operation_id: i32,
    pub peer_id: i32,
    pub component_id: i32,
    pub tags: Vec<SpanTag>,
    pub refs: Vec<SegmentReference>,
}

/// Segment-level metadata shared by every span event of one segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentInfo {
    pub segment_id: String,
    pub service_id: i32,
    pub service_instance_id: i32,
    pub start_time_ms: i64,
}

impl SegmentInfo {
    pub fn minute_time_bucket(&self) -> i64 {
        time::minute_bucket(self.start_time_ms)
    }
}
