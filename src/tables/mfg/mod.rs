//! Manufacturer tables (MT n, table id 2048 + n).

pub mod comm_module;
pub mod device_status;
pub mod metrology_blurt;

pub use comm_module::{CommModuleStatus, LinkState};
pub use device_status::{BuildInfo, DeviceStatus, DeviceStatusFlags, ResetInfo};
pub use metrology_blurt::{BlurtFlags, MetrologyBlurt, PhaseReading};
