use spantopo_core::consts::NONE;
use spantopo_core::model::database::DatabaseAccess;
use spantopo_core::model::topology::{
    AllTraffic, EndpointRelation, EndpointTraffic, InstanceRelation, InstanceTraffic,
    ServiceRelation, ServiceTraffic,
};
use spantopo_core::model::{DetectPoint, RequestType};

/// Accumulator for one topology edge under construction.
///
/// Both identity triples (endpoint, instance, service) and the detect point
/// must be fully populated before any conversion is called; `time_bucket`
/// is stamped once by the listener at finalize time.
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    pub source_endpoint_id: i32,
    pub source_endpoint_name: String,
    pub source_service_instance_id: i32,
    pub source_service_instance_name: String,
    pub source_service_id: i32,
    pub source_service_name: String,
    pub dest_endpoint_id: i32,
    pub dest_endpoint_name: String,
    pub dest_service_instance_id: i32,
    pub dest_service_instance_name: String,
    pub dest_service_id: i32,
    pub dest_service_name: String,
    pub detect_point: DetectPoint,
    pub component_id: i32,
    pub request_type: RequestType,
    pub latency_ms: i64,
    pub status: bool,
    pub response_code: i32,
    pub time_bucket: i64,
}

impl SourceBuilder {
    pub fn new(detect_point: DetectPoint) -> Self {
        Self {
            source_endpoint_id: NONE,
            source_endpoint_name: String::new(),
            source_service_instance_id: NONE,
            source_service_instance_name: String::new(),
            source_service_id: NONE,
            source_service_name: String::new(),
            dest_endpoint_id: NONE,
            dest_endpoint_name: String::new(),
            dest_service_instance_id: NONE,
            dest_service_instance_name: String::new(),
            dest_service_id: NONE,
            dest_service_name: String::new(),
            detect_point,
            component_id: NONE,
            request_type: RequestType::Rpc,
            latency_ms: 0,
            status: true,
            response_code: NONE,
            time_bucket: 0,
        }
    }

    pub fn all_traffic(&self) -> AllTraffic {
        AllTraffic {
            service_name: self.dest_service_name.clone(),
            service_instance_name: self.dest_service_instance_name.clone(),
            endpoint_name: self.dest_endpoint_name.clone(),
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            time_bucket: self.time_bucket,
        }
    }

    pub fn service_traffic(&self) -> ServiceTraffic {
        ServiceTraffic {
            id: self.dest_service_id,
            name: self.dest_service_name.clone(),
            service_instance_name: self.dest_service_instance_name.clone(),
            endpoint_name: self.dest_endpoint_name.clone(),
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            time_bucket: self.time_bucket,
        }
    }

    pub fn instance_traffic(&self) -> InstanceTraffic {
        InstanceTraffic {
            id: self.dest_service_instance_id,
            name: self.dest_service_instance_name.clone(),
            service_name: self.dest_service_name.clone(),
            endpoint_name: self.dest_endpoint_name.clone(),
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            time_bucket: self.time_bucket,
        }
    }

    pub fn endpoint_traffic(&self) -> EndpointTraffic {
        EndpointTraffic {
            id: self.dest_endpoint_id,
            name: self.dest_endpoint_name.clone(),
            service_name: self.dest_service_name.clone(),
            service_instance_name: self.dest_service_instance_name.clone(),
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            time_bucket: self.time_bucket,
        }
    }

    pub fn service_relation(&self) -> ServiceRelation {
        ServiceRelation {
            source_service_id: self.source_service_id,
            source_service_name: self.source_service_name.clone(),
            source_service_instance_name: self.source_service_instance_name.clone(),
            source_endpoint_name: self.source_endpoint_name.clone(),
            dest_service_id: self.dest_service_id,
            dest_service_name: self.dest_service_name.clone(),
            dest_service_instance_name: self.dest_service_instance_name.clone(),
            dest_endpoint_name: self.dest_endpoint_name.clone(),
            component_id: self.component_id,
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            detect_point: self.detect_point,
            time_bucket: self.time_bucket,
        }
    }

    pub fn instance_relation(&self) -> InstanceRelation {
        InstanceRelation {
            source_service_instance_id: self.source_service_instance_id,
            source_service_instance_name: self.source_service_instance_name.clone(),
            source_service_name: self.source_service_name.clone(),
            source_endpoint_name: self.source_endpoint_name.clone(),
            dest_service_instance_id: self.dest_service_instance_id,
            dest_service_instance_name: self.dest_service_instance_name.clone(),
            dest_service_name: self.dest_service_name.clone(),
            dest_endpoint_name: self.dest_endpoint_name.clone(),
            component_id: self.component_id,
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            detect_point: self.detect_point,
            time_bucket: self.time_bucket,
        }
    }

    /// Endpoint edges need both endpoints; the cross-process header protocol
    /// may not carry the parent endpoint, in which case no edge exists.
    pub fn endpoint_relation(&self) -> Option<EndpointRelation> {
        if self.source_endpoint_id == NONE || self.dest_endpoint_id == NONE {
            return None;
        }

        Some(EndpointRelation {
            endpoint_id: self.source_endpoint_id,
            endpoint_name: self.source_endpoint_name.clone(),
            service_name: self.source_service_name.clone(),
            child_endpoint_id: self.dest_endpoint_id,
            child_endpoint_name: self.dest_endpoint_name.clone(),
            child_service_name: self.dest_service_name.clone(),
            component_id: self.component_id,
            latency_ms: self.latency_ms,
            status: self.status,
            response_code: self.response_code,
            request_type: self.request_type,
            detect_point: self.detect_point,
            time_bucket: self.time_bucket,
        })
    }

    pub fn database_access(&self) -> DatabaseAccess {
        DatabaseAccess {
            database_service_id: self.dest_service_id,
            name: self.dest_service_name.clone(),
            latency_ms: self.latency_ms,
            status: self.status,
            time_bucket: self.time_bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> SourceBuilder {
        let mut builder = SourceBuilder::new(DetectPoint::Server);
        builder.source_endpoint_id = 201;
        builder.source_endpoint_name = "GET /gateway".to_string();
        builder.source_service_instance_id = 21;
        builder.source_service_instance_name = "gateway-0".to_string();
        builder.source_service_id = 2;
        builder.source_service_name = "gateway".to_string();
        builder.dest_endpoint_id = 301;
        builder.dest_endpoint_name = "GET /orders".to_string();
        builder.dest_service_instance_id = 31;
        builder.dest_service_instance_name = "orders-0".to_string();
        builder.dest_service_id = 3;
        builder.dest_service_name = "orders".to_string();
        builder.component_id = 14;
        builder.latency_ms = 42;
        builder.time_bucket = 202602010941;
        builder
    }

    #[test]
    fn traffic_records_carry_dest_identity() {
        let builder = populated();

        let all = builder.all_traffic();
        assert_eq!(all.service_name, "orders");
        assert_eq!(all.endpoint_name, "GET /orders");
        assert_eq!(all.time_bucket, 202602010941);

        let service = builder.service_traffic();
        assert_eq!(service.id, 3);
        assert_eq!(service.name, "orders");

        let endpoint = builder.endpoint_traffic();
        assert_eq!(endpoint.id, 301);
        assert_eq!(endpoint.service_instance_name, "orders-0");
    }

    #[test]
    fn relations_carry_both_sides() {
        let builder = populated();

        let relation = builder.service_relation();
        assert_eq!(relation.source_service_id, 2);
        assert_eq!(relation.dest_service_id, 3);
        assert_eq!(relation.detect_point, DetectPoint::Server);

        let relation = builder.instance_relation();
        assert_eq!(relation.source_service_instance_id, 21);
        assert_eq!(relation.dest_service_instance_id, 31);
    }

    #[test]
    fn endpoint_relation_requires_both_endpoints() {
        let builder = populated();
        let relation = builder.endpoint_relation().unwrap();
        assert_eq!(relation.endpoint_id, 201);
        assert_eq!(relation.child_endpoint_id, 301);

        let mut missing_parent = populated();
        missing_parent.source_endpoint_id = NONE;
        assert!(missing_parent.endpoint_relation().is_none());
    }

    #[test]
    fn database_access_is_attributed_to_dest_service() {
        let builder = populated();
        let access = builder.database_access();
        assert_eq!(access.database_service_id, 3);
        assert_eq!(access.name, "orders");
        assert_eq!(access.latency_ms, 42);
    }
}
