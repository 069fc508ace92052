//! Identity-resolution capabilities.
//!
//! The caches behind these traits are long-lived and shared across segment
//! workers; this crate only reads them. A `None` from any lookup means the
//! id was never registered upstream, which callers treat as a data-integrity
//! violation rather than a recoverable condition.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub name: String,
    /// Substitute service id when this service should be reported as a
    /// different logical service (virtual/proxy folded into its backend);
    /// the NONE sentinel when no override is declared.
    pub mapping_service_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceEntry {
    pub name: String,
    pub service_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointEntry {
    pub name: String,
}

pub trait ServiceInventory: Send + Sync {
    fn get(&self, service_id: i32) -> Option<ServiceEntry>;

    /// Service registered for a peer/network address id.
    fn service_id_by_address(&self, address_id: i32) -> Option<i32>;
}

pub trait InstanceInventory: Send + Sync {
    fn get(&self, instance_id: i32) -> Option<InstanceEntry>;

    /// Instance of `service_id` reachable at the given network address.
    fn instance_id_by_address(&self, service_id: i32, address_id: i32) -> Option<i32>;
}

pub trait EndpointInventory: Send + Sync {
    fn get(&self, endpoint_id: i32) -> Option<EndpointEntry>;
}
