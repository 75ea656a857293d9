//! Cargo truck. Efficiency drops once the hold is more than half full.

use crate::{error::FleetResult, record::RecordFields};

use super::{
    ensure_wheels, CargoHold, FuelConsumable, FuelTank, Maintainable, ServiceLog, Vehicle,
    VehicleBehavior, VehicleCore, VehicleKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Truck {
    core: VehicleCore,
    tank: FuelTank,
    hold: CargoHold,
    service: ServiceLog,
    wheels: u32,
}

impl Truck {
    pub const DEFAULT_CARGO_CAPACITY: f64 = 5_000.0;
    pub const TANK_CAPACITY: f64 = 200.0;
    pub const EFFICIENCY: f64 = 8.0;
    pub const HEAVY_LOAD_FACTOR: f64 = 0.9;
    pub const MAINTENANCE_INTERVAL: f64 = 10_000.0;

    const RECORD_LEN: usize = 9;

    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        wheels: u32,
    ) -> FleetResult<Self> {
        Self::with_capacity(id, model, max_speed, wheels, Self::DEFAULT_CARGO_CAPACITY)
    }

    pub fn with_capacity(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        wheels: u32,
        cargo_capacity: f64,
    ) -> FleetResult<Self> {
        let core = VehicleCore::new(id, model, max_speed)?;
        ensure_wheels(core.id(), wheels)?;
        let hold = CargoHold::new(core.id(), cargo_capacity)?;
        Ok(Self {
            core,
            tank: FuelTank::new(Self::TANK_CAPACITY),
            hold,
            service: ServiceLog::new(Self::MAINTENANCE_INTERVAL),
            wheels,
        })
    }

    pub fn wheels(&self) -> u32 {
        self.wheels
    }

    /// `Truck,id,model,maxSpeed,mileage,fuelLevel,wheels,cargoCapacity,currentCargo`
    pub(crate) fn from_record(fields: &RecordFields<'_>) -> FleetResult<Vehicle> {
        fields.expect_len(VehicleKind::Truck, Self::RECORD_LEN)?;
        let core = fields.core()?;
        let tank = FuelTank::with_level(Self::TANK_CAPACITY, fields.number(5, "fuel level")?)?;
        let wheels = fields.count(6, "wheels")?;
        ensure_wheels(core.id(), wheels)?;
        let hold = CargoHold::with_load(
            core.id(),
            fields.number(7, "cargo capacity")?,
            fields.number(8, "current cargo")?,
        )?;
        let service = ServiceLog::restored(Self::MAINTENANCE_INTERVAL, core.mileage())?;
        Ok(Vehicle::Truck(Self {
            core,
            tank,
            hold,
            service,
            wheels,
        }))
    }
}

impl VehicleBehavior for Truck {
    fn kind(&self) -> VehicleKind {
        VehicleKind::Truck
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
            self.wheels.to_string(),
            self.hold.capacity().to_string(),
            self.hold.load().to_string(),
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

    fn hold(&self) -> Option<&CargoHold> {
        Some(&self.hold)
    }

    fn hold_mut(&mut self) -> Option<&mut CargoHold> {
        Some(&mut self.hold)
    }
}

impl FuelConsumable for Truck {
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

impl Maintainable for Truck {
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
    use crate::error::FleetError;

    #[test]
    fn heavy_load_reduces_efficiency() {
        let mut truck = Vehicle::from(Truck::new("T001", "Ford F-150", 120.0, 6).unwrap());
        truck.load_cargo(2_000.0).unwrap();
        assert_eq!(truck.fuel_efficiency(), Truck::EFFICIENCY);
        truck.load_cargo(1_000.0).unwrap();
        assert!((truck.fuel_efficiency() - 7.2).abs() < 1e-9);
    }

    #[test]
    fn cargo_limits_are_enforced() {
        let mut truck = Vehicle::from(
            Truck::with_capacity("T002", "Volvo FH", 110.0, 10, 1_000.0).unwrap(),
        );
        assert!(matches!(truck.load_cargo(1_500.0), Err(FleetError::Overload(_))));
        truck.load_cargo(400.0).unwrap();
        assert!(matches!(
            truck.unload_cargo(500.0),
            Err(FleetError::InvalidOperation(_))
        ));
        assert_eq!(truck.cargo(), Some((400.0, 1_000.0)));
    }
}
