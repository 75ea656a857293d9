//! Passenger car.

use crate::{error::FleetResult, record::RecordFields};

use super::{
    ensure_wheels, Cabin, FuelConsumable, FuelTank, Maintainable, ServiceLog, Vehicle,
    VehicleBehavior, VehicleCore, VehicleKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    core: VehicleCore,
    tank: FuelTank,
    cabin: Cabin,
    service: ServiceLog,
    wheels: u32,
}

impl Car {
    pub const SEATS: u32 = 5;
    pub const TANK_CAPACITY: f64 = 50.0;
    pub const EFFICIENCY: f64 = 15.0;
    pub const MAINTENANCE_INTERVAL: f64 = 10_000.0;

    const RECORD_LEN: usize = 8;

    /// A new car with an empty tank and no passengers.
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        wheels: u32,
    ) -> FleetResult<Self> {
        let core = VehicleCore::new(id, model, max_speed)?;
        ensure_wheels(core.id(), wheels)?;
        Ok(Self {
            core,
            tank: FuelTank::new(Self::TANK_CAPACITY),
            cabin: Cabin::new(Self::SEATS),
            service: ServiceLog::new(Self::MAINTENANCE_INTERVAL),
            wheels,
        })
    }

    pub fn wheels(&self) -> u32 {
        self.wheels
    }

    /// `Car,id,model,maxSpeed,mileage,fuelLevel,wheels,passengers`
    pub(crate) fn from_record(fields: &RecordFields<'_>) -> FleetResult<Vehicle> {
        fields.expect_len(VehicleKind::Car, Self::RECORD_LEN)?;
        let core = fields.core()?;
        let tank = FuelTank::with_level(Self::TANK_CAPACITY, fields.number(5, "fuel level")?)?;
        let wheels = fields.count(6, "wheels")?;
        ensure_wheels(core.id(), wheels)?;
        let cabin = Cabin::with_occupancy(core.id(), Self::SEATS, fields.count(7, "passengers")?)?;
        // Records carry no service history; assume none since the odometer started.
        let service = ServiceLog::restored(Self::MAINTENANCE_INTERVAL, core.mileage())?;
        Ok(Vehicle::Car(Self {
            core,
            tank,
            cabin,
            service,
            wheels,
        }))
    }
}

impl VehicleBehavior for Car {
    fn kind(&self) -> VehicleKind {
        VehicleKind::Car
    }

    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VehicleCore {
        &mut self.core
    }

    fn fuel_efficiency(&self) -> f64 {
        Self::EFFICIENCY
    }

    fn kind_fields(&self) -> Vec<String> {
        vec![
            self.tank.level().to_string(),
            self.wheels.to_string(),
            self.cabin.occupied().to_string(),
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
}

impl FuelConsumable for Car {
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

impl Maintainable for Car {
    fn service_log(&self) -> &ServiceLog {
        &self.service
    }

    fn service_log_mut(&mut self) -> &mut ServiceLog {
        &mut self.service
    }
}
