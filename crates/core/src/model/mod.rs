pub mod database;
pub mod topology;

use serde::{Deserialize, Serialize};

use crate::model::database::{DatabaseAccess, DatabaseSlowStatement};
use crate::model::topology::{
    AllTraffic, EndpointRelation, EndpointTraffic, InstanceRelation, InstanceTraffic,
    ServiceRelation, ServiceTraffic,
};

/// Side of the call on which a topology edge was observed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DetectPoint {
    Server,
    Client,
}

/// Coarse protocol classification of a call leg, derived from the span layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Http,
    Database,
    Rpc,
}

/// Everything this core emits to the downstream sink, one value per call.
/// Each variant is a plain field-sealed struct, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Record {
    All(AllTraffic),
    Service(ServiceTraffic),
    ServiceInstance(InstanceTraffic),
    Endpoint(EndpointTraffic),
    ServiceRelation(ServiceRelation),
    ServiceInstanceRelation(InstanceRelation),
    EndpointRelation(EndpointRelation),
    DatabaseAccess(DatabaseAccess),
    DatabaseSlowStatement(DatabaseSlowStatement),
}

impl Record {
    /// Stable scope name, useful for sinks that route by record kind.
    pub fn scope(&self) -> &'static str {
        match self {
            Record::All(_) => "all",
            Record::Service(_) => "service",
            Record::ServiceInstance(_) => "service_instance",
            Record::Endpoint(_) => "endpoint",
            Record::ServiceRelation(_) => "service_relation",
            Record::ServiceInstanceRelation(_) => "service_instance_relation",
            Record::EndpointRelation(_) => "endpoint_relation",
            Record::DatabaseAccess(_) => "database_access",
            Record::DatabaseSlowStatement(_) => "database_slow_statement",
        }
    }
}
