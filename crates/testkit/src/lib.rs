//! Shared fixtures for spantopo tests: an in-memory identity registry, a
//! recording sink, and a small pre-wired mesh of services.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use spantopo_core::consts::{USER_ENDPOINT_ID, USER_INSTANCE_ID, USER_SERVICE_ID};
use spantopo_core::error::{Result, SpantopoError};
use spantopo_core::inventory::{
    EndpointEntry, EndpointInventory, InstanceEntry, InstanceInventory, ServiceEntry,
    ServiceInventory,
};
use spantopo_core::model::Record;
use spantopo_core::segment::{SegmentInfo, SegmentReference, SpanLayer, SpanTag, SpanView};
use spantopo_core::sink::RecordSink;

/// In-memory implementation of all three identity-resolution capabilities.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    services: HashMap<i32, ServiceEntry>,
    instances: HashMap<i32, InstanceEntry>,
    endpoints: HashMap<i32, EndpointEntry>,
    address_services: HashMap<i32, i32>,
    address_instances: HashMap<(i32, i32), i32>,
}

impl InMemoryInventory {
    /// Empty registry except for the synthetic external-user identity.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_service(USER_SERVICE_ID, "User");
        registry.register_instance(USER_INSTANCE_ID, "User", USER_SERVICE_ID);
        registry.register_endpoint(USER_ENDPOINT_ID, "User");
        registry
    }

    pub fn register_service(&mut self, id: i32, name: &str) {
        self.services.insert(
            id,
            ServiceEntry {
                name: name.to_string(),
                mapping_service_id: spantopo_core::consts::NONE,
            },
        );
    }

    pub fn register_service_mapping(&mut self, id: i32, mapping_service_id: i32) {
        if let Some(entry) = self.services.get_mut(&id) {
            entry.mapping_service_id = mapping_service_id;
        }
    }

    pub fn register_instance(&mut self, id: i32, name: &str, service_id: i32) {
        self.instances.insert(
            id,
            InstanceEntry {
                name: name.to_string(),
                service_id,
            },
        );
    }

    pub fn register_endpoint(&mut self, id: i32, name: &str) {
        self.endpoints.insert(id, EndpointEntry { name: name.to_string() });
    }

    /// Binds a network address to the service/instance reachable through it.
    pub fn register_address(&mut self, address_id: i32, service_id: i32, instance_id: i32) {
        self.address_services.insert(address_id, service_id);
        self.address_instances
            .insert((service_id, address_id), instance_id);
    }
}

impl ServiceInventory for InMemoryInventory {
    fn get(&self, service_id: i32) -> Option<ServiceEntry> {
        self.services.get(&service_id).cloned()
    }

    fn service_id_by_address(&self, address_id: i32) -> Option<i32> {
        self.address_services.get(&address_id).copied()
    }
}

impl InstanceInventory for InMemoryInventory {
    fn get(&self, instance_id: i32) -> Option<InstanceEntry> {
        self.instances.get(&instance_id).cloned()
    }

    fn instance_id_by_address(&self, service_id: i32, address_id: i32) -> Option<i32> {
        self.address_instances.get(&(service_id, address_id)).copied()
    }
}

impl EndpointInventory for InMemoryInventory {
    fn get(&self, endpoint_id: i32) -> Option<EndpointEntry> {
        self.endpoints.get(&endpoint_id).cloned()
    }
}

/// Sink that appends every record to an in-memory list.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }

    pub fn scopes(&self) -> Vec<&'static str> {
        self.records().iter().map(Record::scope).collect()
    }
}

impl RecordSink for RecordingSink {
    fn receive(&self, record: Record) -> Result<()> {
        self.records.lock().expect("sink mutex poisoned").push(record);
        Ok(())
    }
}

/// Sink that accepts `accept` records and then fails every call.
#[derive(Debug)]
pub struct FailingSink {
    accept: usize,
    received: Mutex<Vec<Record>>,
}

impl FailingSink {
    pub fn after(accept: usize) -> Self {
        Self {
            accept,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<Record> {
        self.received.lock().expect("sink mutex poisoned").clone()
    }
}

impl RecordSink for FailingSink {
    fn receive(&self, record: Record) -> Result<()> {
        let mut received = self.received.lock().expect("sink mutex poisoned");
        if received.len() >= self.accept {
            return Err(SpantopoError::Sink("sink unavailable".to_string()));
        }
        received.push(record);
        Ok(())
    }
}

// Fixture mesh: User calls web-gateway, web-gateway calls order-service,
// order-service calls mysql (reachable at address 91) and consumes from a
// kafka broker (address 92).
pub const GATEWAY_SERVICE: i32 = 2;
pub const ORDER_SERVICE: i32 = 3;
pub const MYSQL_SERVICE: i32 = 4;
pub const KAFKA_SERVICE: i32 = 5;

pub const GATEWAY_INSTANCE: i32 = 21;
pub const ORDER_INSTANCE: i32 = 31;
pub const MYSQL_INSTANCE: i32 = 41;
pub const KAFKA_INSTANCE: i32 = 51;

pub const GATEWAY_ENDPOINT: i32 = 201;
pub const ORDER_ENDPOINT: i32 = 301;
pub const MYSQL_QUERY_ENDPOINT: i32 = 310;
pub const KAFKA_TOPIC_ENDPOINT: i32 = 510;

pub const MYSQL_ADDRESS: i32 = 91;
pub const KAFKA_ADDRESS: i32 = 92;

pub fn sample_registry() -> InMemoryInventory {
    let mut registry = InMemoryInventory::new();

    registry.register_service(GATEWAY_SERVICE, "web-gateway");
    registry.register_service(ORDER_SERVICE, "order-service");
    registry.register_service(MYSQL_SERVICE, "mysql");
    registry.register_service(KAFKA_SERVICE, "kafka-broker");

    registry.register_instance(GATEWAY_INSTANCE, "web-gateway-0", GATEWAY_SERVICE);
    registry.register_instance(ORDER_INSTANCE, "order-service-0", ORDER_SERVICE);
    registry.register_instance(MYSQL_INSTANCE, "mysql-0", MYSQL_SERVICE);
    registry.register_instance(KAFKA_INSTANCE, "kafka-broker-0", KAFKA_SERVICE);

    registry.register_endpoint(GATEWAY_ENDPOINT, "GET /api/orders");
    registry.register_endpoint(ORDER_ENDPOINT, "GET /orders");
    registry.register_endpoint(MYSQL_QUERY_ENDPOINT, "mysql/query");
    registry.register_endpoint(KAFKA_TOPIC_ENDPOINT, "kafka/orders/consume");

    registry.register_address(MYSQL_ADDRESS, MYSQL_SERVICE, MYSQL_INSTANCE);
    registry.register_address(KAFKA_ADDRESS, KAFKA_SERVICE, KAFKA_INSTANCE);

    registry
}

pub fn sample_segment() -> SegmentInfo {
    let start = Utc.with_ymd_and_hms(2026, 2, 1, 9, 41, 7).unwrap();
    SegmentInfo {
        segment_id: "seg-order-1".to_string(),
        service_id: ORDER_SERVICE,
        service_instance_id: ORDER_INSTANCE,
        start_time_ms: start.timestamp_millis(),
    }
}

pub fn entry_span(refs: Vec<SegmentReference>) -> SpanView {
    let segment = sample_segment();
    SpanView {
        span_id: 0,
        layer: SpanLayer::Http,
        start_time_ms: segment.start_time_ms,
        end_time_ms: segment.start_time_ms + 120,
        is_error: false,
        operation_id: ORDER_ENDPOINT,
        peer_id: spantopo_core::consts::NONE,
        component_id: 1,
        tags: Vec::new(),
        refs,
    }
}

pub fn gateway_reference() -> SegmentReference {
    SegmentReference {
        parent_endpoint_id: GATEWAY_ENDPOINT,
        parent_service_instance_id: GATEWAY_INSTANCE,
        network_address_id: spantopo_core::consts::NONE,
    }
}

pub fn db_exit_span(latency_ms: i64, tags: Vec<SpanTag>) -> SpanView {
    let segment = sample_segment();
    SpanView {
        span_id: 1,
        layer: SpanLayer::Database,
        start_time_ms: segment.start_time_ms + 10,
        end_time_ms: segment.start_time_ms + 10 + latency_ms,
        is_error: false,
        operation_id: MYSQL_QUERY_ENDPOINT,
        peer_id: MYSQL_ADDRESS,
        component_id: 33,
        tags,
        refs: Vec::new(),
    }
}
