//! Vehicle model: the shared base entity, the per-kind behavior contract
//! and the closed [`Vehicle`] enum the registry stores.

mod airplane;
mod bus;
mod capability;
mod car;
mod cargo_ship;
mod truck;

use std::{cmp::Ordering, fmt, str::FromStr};

use tracing::debug;

use crate::error::{FleetError, FleetResult};

pub use airplane::Airplane;
pub use bus::Bus;
pub use capability::{Cabin, CargoHold, FuelConsumable, FuelTank, Maintainable, ServiceLog};
pub use car::Car;
pub use cargo_ship::CargoShip;
pub use truck::Truck;

/// Concrete vehicle variant, doubling as the record kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleKind {
    Car,
    Truck,
    Bus,
    Airplane,
    CargoShip,
}

impl VehicleKind {
    /// Every kind, in menu order.
    pub const ALL: [VehicleKind; 5] = [
        VehicleKind::Car,
        VehicleKind::Truck,
        VehicleKind::Bus,
        VehicleKind::Airplane,
        VehicleKind::CargoShip,
    ];

    /// Tag written as the first field of a persisted record.
    pub fn tag(self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::Truck => "Truck",
            VehicleKind::Bus => "Bus",
            VehicleKind::Airplane => "Airplane",
            VehicleKind::CargoShip => "CargoShip",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VehicleKind {
    type Err = FleetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        match needle.as_str() {
            "car" => Ok(VehicleKind::Car),
            "truck" => Ok(VehicleKind::Truck),
            "bus" => Ok(VehicleKind::Bus),
            "airplane" | "plane" => Ok(VehicleKind::Airplane),
            "cargoship" | "cargo ship" | "ship" => Ok(VehicleKind::CargoShip),
            _ => Err(FleetError::UnknownKind(value.trim().to_string())),
        }
    }
}

/// Attributes every kind shares. The identifier never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCore {
    id: String,
    model: String,
    max_speed: f64,
    mileage: f64,
}

impl VehicleCore {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
    ) -> FleetResult<Self> {
        Self::restore(id, model, max_speed, 0.0)
    }

    /// Rebuild a core with previously accumulated mileage.
    pub fn restore(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        mileage: f64,
    ) -> FleetResult<Self> {
        let id = id.into().trim().to_string();
        let model = model.into().trim().to_string();
        if id.is_empty() {
            return Err(FleetError::invalid("vehicle ID cannot be empty"));
        }
        ensure_record_safe("vehicle ID", &id)?;
        ensure_record_safe("model", &model)?;
        if !max_speed.is_finite() || max_speed <= 0.0 {
            return Err(FleetError::invalid(format!(
                "{id}: max speed must be positive, got {max_speed}"
            )));
        }
        if !mileage.is_finite() || mileage < 0.0 {
            return Err(FleetError::invalid(format!(
                "{id}: mileage must be non-negative, got {mileage}"
            )));
        }
        Ok(Self {
            id,
            model,
            max_speed,
            mileage,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    fn add_mileage(&mut self, distance: f64) {
        if distance > 0.0 {
            self.mileage += distance;
        }
    }
}

fn ensure_record_safe(field: &str, value: &str) -> FleetResult<()> {
    if value.contains([',', '\n', '\r']) {
        return Err(FleetError::invalid(format!(
            "{field} '{value}' may not contain commas or line breaks"
        )));
    }
    Ok(())
}

fn ensure_wheels(id: &str, wheels: u32) -> FleetResult<()> {
    if wheels == 0 {
        return Err(FleetError::invalid(format!("{id}: wheel count must be positive")));
    }
    Ok(())
}

/// Contract each kind implements. Capability hooks return `None` for kinds
/// that lack the capability.
pub trait VehicleBehavior {
    fn kind(&self) -> VehicleKind;

    fn core(&self) -> &VehicleCore;

    fn core_mut(&mut self) -> &mut VehicleCore;

    /// Distance per fuel unit in the current load state. Always positive.
    fn fuel_efficiency(&self) -> f64;

    /// Kind-specific record fields, in persisted order, after the shared prefix.
    fn kind_fields(&self) -> Vec<String>;

    fn fuel(&self) -> Option<&dyn FuelConsumable> {
        None
    }

    fn fuel_mut(&mut self) -> Option<&mut dyn FuelConsumable> {
        None
    }

    fn maintenance(&self) -> Option<&dyn Maintainable> {
        None
    }

    fn maintenance_mut(&mut self) -> Option<&mut dyn Maintainable> {
        None
    }

    fn cabin(&self) -> Option<&Cabin> {
        None
    }

    fn cabin_mut(&mut self) -> Option<&mut Cabin> {
        None
    }

    fn hold(&self) -> Option<&CargoHold> {
        None
    }

    fn hold_mut(&mut self) -> Option<&mut CargoHold> {
        None
    }

    /// Refuse to move while any load exceeds its limit.
    fn check_load(&self) -> FleetResult<()> {
        let id = self.core().id();
        if let Some(cabin) = self.cabin() {
            cabin.check(id)?;
        }
        if let Some(hold) = self.hold() {
            hold.check(id)?;
        }
        Ok(())
    }
}

/// A vehicle of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Vehicle {
    Car(Car),
    Truck(Truck),
    Bus(Bus),
    Airplane(Airplane),
    CargoShip(CargoShip),
}

impl Vehicle {
    pub fn behavior(&self) -> &dyn VehicleBehavior {
        match self {
            Vehicle::Car(car) => car,
            Vehicle::Truck(truck) => truck,
            Vehicle::Bus(bus) => bus,
            Vehicle::Airplane(airplane) => airplane,
            Vehicle::CargoShip(ship) => ship,
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn VehicleBehavior {
        match self {
            Vehicle::Car(car) => car,
            Vehicle::Truck(truck) => truck,
            Vehicle::Bus(bus) => bus,
            Vehicle::Airplane(airplane) => airplane,
            Vehicle::CargoShip(ship) => ship,
        }
    }

    pub fn kind(&self) -> VehicleKind {
        self.behavior().kind()
    }

    pub fn id(&self) -> &str {
        self.behavior().core().id()
    }

    pub fn model(&self) -> &str {
        self.behavior().core().model()
    }

    pub fn max_speed(&self) -> f64 {
        self.behavior().core().max_speed()
    }

    pub fn mileage(&self) -> f64 {
        self.behavior().core().mileage()
    }

    pub fn fuel_efficiency(&self) -> f64 {
        self.behavior().fuel_efficiency()
    }

    /// Travel `distance` km.
    ///
    /// Checks load limits, burns `distance / fuel_efficiency` from the tank of
    /// fuel-consumable kinds and only then adds the distance to the mileage and
    /// the maintenance counter. A failure leaves the vehicle unchanged.
    pub fn move_by(&mut self, distance: f64) -> FleetResult<()> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(FleetError::invalid(format!(
                "{}: distance must be positive, got {distance}",
                self.id()
            )));
        }

        let behavior = self.behavior_mut();
        behavior.check_load()?;
        let efficiency = behavior.fuel_efficiency();
        if let Some(fuel) = behavior.fuel_mut() {
            fuel.consume(distance / efficiency)?;
        }
        behavior.core_mut().add_mileage(distance);
        if let Some(service) = behavior.maintenance_mut() {
            service.service_log_mut().record(distance);
        }

        debug!(
            id = self.id(),
            distance,
            mileage = self.mileage(),
            "vehicle moved"
        );
        Ok(())
    }

    /// Hours needed to cover `distance` at max speed.
    pub fn estimate_journey_time(&self, distance: f64) -> f64 {
        if !distance.is_finite() || distance <= 0.0 {
            return 0.0;
        }
        distance / self.max_speed()
    }

    /// Orders by fuel efficiency, least efficient first.
    pub fn compare_efficiency(&self, other: &Vehicle) -> Ordering {
        self.fuel_efficiency().total_cmp(&other.fuel_efficiency())
    }

    /// Serialized fields: kind tag, id, model, max speed, mileage, then kind fields.
    pub fn to_record(&self) -> Vec<String> {
        let behavior = self.behavior();
        let core = behavior.core();
        let mut fields = vec![
            behavior.kind().tag().to_string(),
            core.id().to_string(),
            core.model().to_string(),
            core.max_speed().to_string(),
            core.mileage().to_string(),
        ];
        fields.extend(behavior.kind_fields());
        fields
    }

    /// The record joined into one comma-delimited line.
    pub fn to_record_line(&self) -> String {
        self.to_record().join(",")
    }

    pub fn fuel(&self) -> Option<&dyn FuelConsumable> {
        self.behavior().fuel()
    }

    pub fn fuel_mut(&mut self) -> Option<&mut dyn FuelConsumable> {
        self.behavior_mut().fuel_mut()
    }

    pub fn maintenance(&self) -> Option<&dyn Maintainable> {
        self.behavior().maintenance()
    }

    pub fn maintenance_mut(&mut self) -> Option<&mut dyn Maintainable> {
        self.behavior_mut().maintenance_mut()
    }

    pub fn is_fuel_consumable(&self) -> bool {
        self.fuel().is_some()
    }

    pub fn is_maintainable(&self) -> bool {
        self.maintenance().is_some()
    }

    /// `false` for kinds without maintenance tracking.
    pub fn needs_maintenance(&self) -> bool {
        self.maintenance()
            .map(|service| service.needs_maintenance())
            .unwrap_or(false)
    }

    pub fn refuel(&mut self, amount: f64) -> FleetResult<f64> {
        let id = self.id().to_string();
        match self.fuel_mut() {
            Some(fuel) => fuel.refuel(amount),
            None => Err(FleetError::invalid(format!("{id} does not consume fuel"))),
        }
    }

    pub fn board_passengers(&mut self, count: u32) -> FleetResult<()> {
        let id = self.id().to_string();
        match self.behavior_mut().cabin_mut() {
            Some(cabin) => cabin.board(&id, count),
            None => Err(FleetError::invalid(format!("{id} carries no passengers"))),
        }
    }

    pub fn disembark_passengers(&mut self, count: u32) -> FleetResult<()> {
        let id = self.id().to_string();
        match self.behavior_mut().cabin_mut() {
            Some(cabin) => cabin.disembark(&id, count),
            None => Err(FleetError::invalid(format!("{id} carries no passengers"))),
        }
    }

    pub fn load_cargo(&mut self, weight: f64) -> FleetResult<()> {
        let id = self.id().to_string();
        match self.behavior_mut().hold_mut() {
            Some(hold) => hold.add(&id, weight),
            None => Err(FleetError::invalid(format!("{id} carries no cargo"))),
        }
    }

    pub fn unload_cargo(&mut self, weight: f64) -> FleetResult<()> {
        let id = self.id().to_string();
        match self.behavior_mut().hold_mut() {
            Some(hold) => hold.remove(&id, weight),
            None => Err(FleetError::invalid(format!("{id} carries no cargo"))),
        }
    }

    /// `(occupied, seats)` for kinds with a cabin.
    pub fn passengers(&self) -> Option<(u32, u32)> {
        self.behavior()
            .cabin()
            .map(|cabin| (cabin.occupied(), cabin.seats()))
    }

    /// `(load, capacity)` in kilograms for kinds with a hold.
    pub fn cargo(&self) -> Option<(f64, f64)> {
        self.behavior()
            .hold()
            .map(|hold| (hold.load(), hold.capacity()))
    }

    /// One-line summary for listings.
    pub fn details(&self) -> String {
        format!(
            "{}: {} (ID: {}) - {:.1} km/h, {:.1} km mileage",
            self.kind(),
            self.model(),
            self.id(),
            self.max_speed(),
            self.mileage()
        )
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details())
    }
}

impl From<Car> for Vehicle {
    fn from(value: Car) -> Self {
        Vehicle::Car(value)
    }
}

impl From<Truck> for Vehicle {
    fn from(value: Truck) -> Self {
        Vehicle::Truck(value)
    }
}

impl From<Bus> for Vehicle {
    fn from(value: Bus) -> Self {
        Vehicle::Bus(value)
    }
}

impl From<Airplane> for Vehicle {
    fn from(value: Airplane) -> Self {
        Vehicle::Airplane(value)
    }
}

impl From<CargoShip> for Vehicle {
    fn from(value: CargoShip) -> Self {
        Vehicle::CargoShip(value)
    }
}
