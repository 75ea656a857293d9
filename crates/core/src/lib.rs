#![warn(clippy::all)]

//! Core domain logic for the fleet manager.
//!
//! This crate hosts the vehicle model, the fleet registry and its batch
//! operations, record persistence, and the configuration used by the
//! terminal UI and any future frontends.

pub mod config;
pub mod error;
pub mod factory;
pub mod fleet;
pub mod record;
pub mod sample;
pub mod store;
pub mod vehicle;

pub use config::AppConfig;
pub use error::{FleetError, FleetResult};
pub use factory::VehicleFactory;
pub use fleet::{
    BatchOutcome, Fleet, FleetReport, LoadSummary, SearchFilter, SharedFleet, SkippedLine,
    VehicleFailure,
};
pub use sample::sample_fleet;
pub use store::{BackupEntry, FleetStore};
pub use vehicle::{
    Airplane, Bus, Car, CargoShip, FuelConsumable, Maintainable, Truck, Vehicle, VehicleBehavior,
    VehicleKind,
};
