//! City or coach bus.

use crate::{
    error::{FleetError, FleetResult},
    record::RecordFields,
};

use super::{
    ensure_wheels, Cabin, FuelConsumable, FuelTank, Maintainable, ServiceLog, Vehicle,
    VehicleBehavior, VehicleCore, VehicleKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    core: VehicleCore,
    tank: FuelTank,
    cabin: Cabin,
    service: ServiceLog,
    wheels: u32,
}

impl Bus {
    pub const DEFAULT_PASSENGER_CAPACITY: u32 = 50;
    pub const TANK_CAPACITY: f64 = 300.0;
    pub const EFFICIENCY: f64 = 10.0;
    pub const CROWDED_FACTOR: f64 = 0.95;
    pub const MAINTENANCE_INTERVAL: f64 = 10_000.0;

    const RECORD_LEN: usize = 9;

    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        wheels: u32,
    ) -> FleetResult<Self> {
        Self::with_capacity(
            id,
            model,
            max_speed,
            wheels,
            Self::DEFAULT_PASSENGER_CAPACITY,
        )
    }

    pub fn with_capacity(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        wheels: u32,
        passenger_capacity: u32,
    ) -> FleetResult<Self> {
        let core = VehicleCore::new(id, model, max_speed)?;
        ensure_wheels(core.id(), wheels)?;
        ensure_seats(core.id(), passenger_capacity)?;
        Ok(Self {
            core,
            tank: FuelTank::new(Self::TANK_CAPACITY),
            cabin: Cabin::new(passenger_capacity),
            service: ServiceLog::new(Self::MAINTENANCE_INTERVAL),
            wheels,
        })
    }

    pub fn wheels(&self) -> u32 {
        self.wheels
    }

    /// `Bus,id,model,maxSpeed,mileage,fuelLevel,wheels,passengerCapacity,currentPassengers`
    pub(crate) fn from_record(fields: &RecordFields<'_>) -> FleetResult<Vehicle> {
        fields.expect_len(VehicleKind::Bus, Self::RECORD_LEN)?;
        let core = fields.core()?;
        let tank = FuelTank::with_level(Self::TANK_CAPACITY, fields.number(5, "fuel level")?)?;
        let wheels = fields.count(6, "wheels")?;
        ensure_wheels(core.id(), wheels)?;
        let seats = fields.count(7, "passenger capacity")?;
        ensure_seats(core.id(), seats)?;
        let occupied = fields.count(8, "current passengers")?;
        let cabin = Cabin::with_occupancy(core.id(), seats, occupied)?;
        let service = ServiceLog::restored(Self::MAINTENANCE_INTERVAL, core.mileage())?;
        Ok(Vehicle::Bus(Self {
            core,
            tank,
            cabin,
            service,
            wheels,
        }))
    }
}

fn ensure_seats(id: &str, seats: u32) -> FleetResult<()> {
    if seats == 0 {
        return Err(FleetError::invalid(format!("{id}: passenger capacity must be positive")));
    }
    Ok(())
}

impl VehicleBehavior for Bus {
    fn kind(&self) -> VehicleKind {
        VehicleKind::Bus
    }

    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VehicleCore {
        &mut self.core
    }

    fn fuel_efficiency(&self) -> f64 {
        if self.cabin.occupancy_ratio() > 0.5 {
            Self::EFFICIENCY * Self::CROWDED_FACTOR
        } else {
            Self::EFFICIENCY
        }
    }

    fn kind_fields(&self) -> Vec<String> {
        vec![
            self.tank.level().to_string(),
            self.wheels.to_string(),
            self.cabin.seats().to_string(),
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

impl FuelConsumable for Bus {
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

impl Maintainable for Bus {
    fn service_log(&self) -> &ServiceLog {
        &self.service
    }

    fn service_log_mut(&mut self) -> &mut ServiceLog {
        &mut self.service
    }
}
