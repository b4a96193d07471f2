//! Background maintenance.

mod run_maintenance;

pub use run_maintenance::{
    spawn_maintenance, MaintenanceHandler, MaintenanceReport, MaintenanceSettings,
};
