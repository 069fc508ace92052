/// Sentinel for an unset numeric id or response code.
pub const NONE: i32 = 0;

/// Synthetic identity assigned to externally-initiated calls, i.e. traffic
/// whose real caller is outside the monitored mesh.
pub const USER_SERVICE_ID: i32 = 1;
pub const USER_INSTANCE_ID: i32 = 1;
pub const USER_ENDPOINT_ID: i32 = 1;
