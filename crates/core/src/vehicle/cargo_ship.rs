//! Ocean cargo ship. A sail stretches the distance per unit of fuel.
//! Ships are not tracked for maintenance.

use crate::{error::FleetResult, record::RecordFields};

use super::{
    CargoHold, FuelConsumable, FuelTank, Vehicle, VehicleBehavior, VehicleCore, VehicleKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CargoShip {
    core: VehicleCore,
    tank: FuelTank,
    hold: CargoHold,
    has_sail: bool,
}

impl CargoShip {
    pub const DEFAULT_CARGO_CAPACITY: f64 = 50_000.0;
    pub const TANK_CAPACITY: f64 = 10_000.0;
    pub const EFFICIENCY: f64 = 4.0;
    pub const SAIL_FACTOR: f64 = 1.5;

    const RECORD_LEN: usize = 9;

    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        has_sail: bool,
    ) -> FleetResult<Self> {
        Self::with_capacity(id, model, max_speed, has_sail, Self::DEFAULT_CARGO_CAPACITY)
    }

    pub fn with_capacity(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        has_sail: bool,
        cargo_capacity: f64,
    ) -> FleetResult<Self> {
        let core = VehicleCore::new(id, model, max_speed)?;
        let hold = CargoHold::new(core.id(), cargo_capacity)?;
        Ok(Self {
            core,
            tank: FuelTank::new(Self::TANK_CAPACITY),
            hold,
            has_sail,
        })
    }

    pub fn has_sail(&self) -> bool {
        self.has_sail
    }

    /// `CargoShip,id,model,maxSpeed,mileage,fuelLevel,hasSail,cargoCapacity,currentCargo`
    pub(crate) fn from_record(fields: &RecordFields<'_>) -> FleetResult<Vehicle> {
        fields.expect_len(VehicleKind::CargoShip, Self::RECORD_LEN)?;
        let core = fields.core()?;
        let tank = FuelTank::with_level(Self::TANK_CAPACITY, fields.number(5, "fuel level")?)?;
        let has_sail = fields.flag(6, "sail flag")?;
        let hold = CargoHold::with_load(
            core.id(),
            fields.number(7, "cargo capacity")?,
            fields.number(8, "current cargo")?,
        )?;
        Ok(Vehicle::CargoShip(Self {
            core,
            tank,
            hold,
            has_sail,
        }))
    }
}

impl VehicleBehavior for CargoShip {
    fn kind(&self) -> VehicleKind {
        VehicleKind::CargoShip
    }

    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VehicleCore {
        &mut self.core
    }

    fn fuel_efficiency(&self) -> f64 {
        if self.has_sail {
            Self::EFFICIENCY * Self::SAIL_FACTOR
        } else {
            Self::EFFICIENCY
        }
    }

    fn kind_fields(&self) -> Vec<String> {
        vec![
            self.tank.level().to_string(),
            self.has_sail.to_string(),
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

    fn hold(&self) -> Option<&CargoHold> {
        Some(&self.hold)
    }

    fn hold_mut(&mut self) -> Option<&mut CargoHold> {
        Some(&mut self.hold)
    }
}

impl FuelConsumable for CargoShip {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sail_improves_efficiency() {
        let motor = Vehicle::from(CargoShip::new("S001", "Maersk Container", 50.0, false).unwrap());
        let sail = Vehicle::from(CargoShip::new("S002", "Clipper", 30.0, true).unwrap());
        assert_eq!(motor.fuel_efficiency(), 4.0);
        assert_eq!(sail.fuel_efficiency(), 6.0);
        assert!(sail.compare_efficiency(&motor).is_gt());
    }

    #[test]
    fn ships_are_never_due() {
        let mut ship =
            Vehicle::from(CargoShip::new("S001", "Maersk Container", 50.0, false).unwrap());
        ship.refuel(10_000.0).unwrap();
        ship.move_by(20_000.0).unwrap();
        assert!(!ship.is_maintainable());
        assert!(!ship.needs_maintenance());
    }
}
