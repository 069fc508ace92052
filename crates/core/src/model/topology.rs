use serde::{Deserialize, Serialize};

use crate::model::{DetectPoint, RequestType};

/// Global traffic sample, not attributed to any particular scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllTraffic {
    pub service_name: String,
    pub service_instance_name: String,
    pub endpoint_name: String,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub time_bucket: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceTraffic {
    pub id: i32,
    pub name: String,
    pub service_instance_name: String,
    pub endpoint_name: String,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub time_bucket: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceTraffic {
    pub id: i32,
    pub name: String,
    pub service_name: String,
    pub endpoint_name: String,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub time_bucket: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointTraffic {
    pub id: i32,
    pub name: String,
    pub service_name: String,
    pub service_instance_name: String,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub time_bucket: i64,
}

/// Dependency-graph edge between two services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRelation {
    pub source_service_id: i32,
    pub source_service_name: String,
    pub source_service_instance_name: String,
    pub source_endpoint_name: String,
    pub dest_service_id: i32,
    pub dest_service_name: String,
    pub dest_service_instance_name: String,
    pub dest_endpoint_name: String,
    pub component_id: i32,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub detect_point: DetectPoint,
    pub time_bucket: i64,
}

/// Dependency-graph edge between two service instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceRelation {
    pub source_service_instance_id: i32,
    pub source_service_instance_name: String,
    pub source_service_name: String,
    pub source_endpoint_name: String,
    pub dest_service_instance_id: i32,
    pub dest_service_instance_name: String,
    pub dest_service_name: String,
    pub dest_endpoint_name: String,
    pub component_id: i32,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub detect_point: DetectPoint,
    pub time_bucket: i64,
}

/// Dependency-graph edge between a parent endpoint and the endpoint it
/// called. Only produced when both endpoints are known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointRelation {
    pub endpoint_id: i32,
    pub endpoint_name: String,
    pub service_name: String,
    pub child_endpoint_id: i32,
    pub child_endpoint_name: String,
    pub child_service_name: String,
    pub component_id: i32,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub request_type: RequestType,
    pub detect_point: DetectPoint,
    pub time_bucket: i64,
}
