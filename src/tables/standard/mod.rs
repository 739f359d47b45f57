//! Standard (ANSI C12.19) tables.

pub mod actual_register;
pub mod clock;
pub mod data_selection;
pub mod end_device_status;
pub mod general_config;
pub mod manufacturer_ident;
pub mod present_register;
pub mod register_data;
pub mod self_read;

pub use actual_register::{ActualRegisters, RegFunc1, RegFunc2};
pub use clock::{Clock, TimeDateQual};
pub use data_selection::DataSelection;
pub use end_device_status::{EdMode, EdStdStatus1, EndDeviceStatus};
pub use general_config::GeneralConfig;
pub use manufacturer_ident::ManufacturerIdent;
pub use present_register::{PresentDemand, PresentRegisterData, PresentRegisterSelect};
pub use register_data::{CurrentRegisterData, PreviousDemandResetData, PreviousSeasonData};
pub use self_read::{ListStatus, SelfReadData};
