//! Passenger and freight airplane.
//!
//! Airplanes carry both a cabin and a cargo hold, follow a stricter
//! maintenance interval than road vehicles and persist their wear counter.

use crate::{
    error::{FleetError, FleetResult},
    record::RecordFields,
};

use super::{
    Cabin, CargoHold, FuelConsumable, FuelTank, Maintainable, ServiceLog, Vehicle,
    VehicleBehavior, VehicleCore, VehicleKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Airplane {
    core: VehicleCore,
    tank: FuelTank,
    cabin: Cabin,
    hold: CargoHold,
    service: ServiceLog,
    altitude_ceiling: f64,
}

impl Airplane {
    pub const PASSENGER_CAPACITY: u32 = 200;
    pub const CARGO_CAPACITY: f64 = 10_000.0;
    pub const TANK_CAPACITY: f64 = 20_000.0;
    pub const EFFICIENCY: f64 = 5.0;
    pub const HEAVY_LOAD_FACTOR: f64 = 0.9;
    pub const MAINTENANCE_INTERVAL: f64 = 5_000.0;

    const RECORD_LEN: usize = 10;

    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        altitude_ceiling: f64,
    ) -> FleetResult<Self> {
        let core = VehicleCore::new(id, model, max_speed)?;
        ensure_altitude(core.id(), altitude_ceiling)?;
        let hold = CargoHold::new(core.id(), Self::CARGO_CAPACITY)?;
        Ok(Self {
            core,
            tank: FuelTank::new(Self::TANK_CAPACITY),
            cabin: Cabin::new(Self::PASSENGER_CAPACITY),
            hold,
            service: ServiceLog::new(Self::MAINTENANCE_INTERVAL),
            altitude_ceiling,
        })
    }

    /// Maximum altitude in feet.
    pub fn altitude_ceiling(&self) -> f64 {
        self.altitude_ceiling
    }

    /// `Airplane,id,model,maxSpeed,mileage,fuelLevel,altitudeCeiling,cargoLoad,passengerLoad,mileageSinceMaintenance`
    pub(crate) fn from_record(fields: &RecordFields<'_>) -> FleetResult<Vehicle> {
        fields.expect_len(VehicleKind::Airplane, Self::RECORD_LEN)?;
        let core = fields.core()?;
        let tank = FuelTank::with_level(Self::TANK_CAPACITY, fields.number(5, "fuel level")?)?;
        let altitude_ceiling = fields.number(6, "altitude ceiling")?;
        ensure_altitude(core.id(), altitude_ceiling)?;
        let hold = CargoHold::with_load(
            core.id(),
            Self::CARGO_CAPACITY,
            fields.number(7, "cargo load")?,
        )?;
        let cabin = Cabin::with_occupancy(
            core.id(),
            Self::PASSENGER_CAPACITY,
            fields.count(8, "passenger load")?,
        )?;
        let service = ServiceLog::restored(
            Self::MAINTENANCE_INTERVAL,
            fields.number(9, "mileage since maintenance")?,
        )?;
        Ok(Vehicle::Airplane(Self {
            core,
            tank,
            cabin,
            hold,
            service,
            altitude_ceiling,
        }))
    }
}

fn ensure_altitude(id: &str, altitude_ceiling: f64) -> FleetResult<()> {
    if !altitude_ceiling.is_finite() || altitude_ceiling <= 0.0 {
        return Err(FleetError::invalid(format!(
            "{id}: altitude ceiling must be positive, got {altitude_ceiling}"
        )));
    }
    Ok(())
}

impl VehicleBehavior for Airplane {
    fn kind(&self) -> VehicleKind {
        VehicleKind::Airplane
    }

    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VehicleCore {
        &mut self.core
    }

    fn fuel_efficiency(&self) -> f64 {
        if self.hold.fill_ratio() > 0.5 {
            Self::EFFICIENCY * Self::HEAVY_LOAD_FACTOR
        } else {
            Self::EFFICIENCY
        }
    }

    fn kind_fields(&self) -> Vec<String> {
        vec![
            self.tank.level().to_string(),
            self.altitude_ceiling.to_string(),
            self.hold.load().to_string(),
            self.cabin.occupied().to_string(),
            self.service.since_maintenance().to_string(),
        ]
    }

    fn fuel(&self) -> Option<&dyn FuelConsumable> {
        Some(self)
    }

    fn fuel_mut(&mut self) -> Option<&mut dyn FuelConsumable> {
        Some(self)
    }

    fn maintenance(&self) -> Option<&dyn Maintainable> {
        Some(self)
    }

    fn maintenance_mut(&mut self) -> Option<&mut dyn Maintainable> {
        Some(self)
    }

    fn cabin(&self) -> Option<&Cabin> {
        Some(&self.cabin)
    }

    fn cabin_mut(&mut self) -> Option<&mut Cabin> {
        Some(&mut self.cabin)
    }

    fn hold(&self) -> Option<&CargoHold> {
        Some(&self.hold)
    }

    fn hold_mut(&mut self) -> Option<&mut CargoHold> {
        Some(&mut self.hold)
    }
}

impl FuelConsumable for Airplane {
    fn tank(&self) -> &FuelTank {
        &self.tank
    }

    fn tank_mut(&mut self) -> &mut FuelTank {
        &mut self.tank
    }

    fn consume(&mut self, amount: f64) -> FleetResult<()> {
        self.tank.consume(self.core.id(), amount)
    }
}

impl Maintainable for Airplane {
    fn service_log(&self) -> &ServiceLog {
        &self.service
    }

    fn service_log_mut(&mut self) -> &mut ServiceLog {
        &mut self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_does_not_reset_the_counter() {
        let mut plane =
            Vehicle::from(Airplane::new("A001", "Boeing 737", 850.0, 35_000.0).unwrap());
        plane.refuel(5_000.0).unwrap();
        plane.board_passengers(100).unwrap();
        plane.load_cargo(2_000.0).unwrap();
        plane.move_by(500.0).unwrap();

        let service = plane.maintenance_mut().unwrap();
        service.schedule_maintenance();
        assert!(service.service_log().is_scheduled());
        assert_eq!(service.mileage_since_maintenance(), 500.0);
        assert!(!service.needs_maintenance());
    }

    #[test]
    fn stricter_interval_than_road_vehicles() {
        let mut plane =
            Vehicle::from(Airplane::new("A002", "Airbus A320", 830.0, 39_000.0).unwrap());
        plane.refuel(20_000.0).unwrap();
        plane.move_by(5_000.0).unwrap();
        assert!(plane.needs_maintenance());
        plane.maintenance_mut().unwrap().perform_maintenance();
        assert!(!plane.needs_maintenance());
        assert_eq!(plane.to_record().last().map(String::as_str), Some("0"));
    }

    #[test]
    fn heavy_cargo_lowers_efficiency() {
        let mut plane =
            Vehicle::from(Airplane::new("A004", "Boeing 777F", 900.0, 40_000.0).unwrap());
        plane.load_cargo(5_000.0).unwrap();
        assert_eq!(plane.fuel_efficiency(), 5.0);
        plane.load_cargo(1_000.0).unwrap();
        assert!((plane.fuel_efficiency() - 4.5).abs() < 1e-9);
        plane.unload_cargo(1_000.0).unwrap();
        assert_eq!(plane.fuel_efficiency(), 5.0);
    }

    #[test]
    fn rejects_non_positive_ceiling() {
        assert!(Airplane::new("A003", "Cessna", 300.0, 0.0).is_err());
    }
}
