//! Optional capabilities a vehicle kind composes: fuel, maintenance,
//! passenger cabins and cargo holds.
//!
//! The parts own the arithmetic and the invariants; kinds expose them
//! through the [`FuelConsumable`] and [`Maintainable`] traits or through
//! the cabin/hold hooks on [`super::VehicleBehavior`].

use crate::error::{FleetError, FleetResult};

/// Fuel storage with a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelTank {
    level: f64,
    capacity: f64,
}

impl FuelTank {
    /// An empty tank holding at most `capacity` units.
    pub fn new(capacity: f64) -> Self {
        Self {
            level: 0.0,
            capacity,
        }
    }

    /// A tank restored to a known level, rejecting levels outside `0..=capacity`.
    pub fn with_level(capacity: f64, level: f64) -> FleetResult<Self> {
        if !level.is_finite() || level < 0.0 || level > capacity {
            return Err(FleetError::invalid(format!(
                "fuel level {level} outside tank range 0..={capacity}"
            )));
        }
        Ok(Self { level, capacity })
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Add fuel, capping storage at capacity. Returns the amount actually taken.
    pub fn refuel(&mut self, amount: f64) -> FleetResult<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FleetError::invalid(format!(
                "refuel amount must be positive, got {amount}"
            )));
        }
        let accepted = amount.min(self.capacity - self.level);
        self.level = (self.level + accepted).min(self.capacity);
        Ok(accepted)
    }

    /// Burn `amount` units, leaving the tank untouched when it holds less.
    pub fn consume(&mut self, id: &str, amount: f64) -> FleetResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(FleetError::invalid(format!(
                "fuel consumption must be non-negative, got {amount}"
            )));
        }
        if amount > self.level {
            return Err(FleetError::InsufficientFuel {
                id: id.to_string(),
                needed: amount,
                available: self.level,
            });
        }
        self.level = (self.level - amount).max(0.0);
        Ok(())
    }
}

/// Distance-based wear counter for kinds that need periodic maintenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLog {
    since_maintenance: f64,
    interval: f64,
    scheduled: bool,
}

impl ServiceLog {
    pub fn new(interval: f64) -> Self {
        Self {
            since_maintenance: 0.0,
            interval,
            scheduled: false,
        }
    }

    /// A log restored with `since_maintenance` distance already accumulated.
    pub fn restored(interval: f64, since_maintenance: f64) -> FleetResult<Self> {
        if !since_maintenance.is_finite() || since_maintenance < 0.0 {
            return Err(FleetError::invalid(format!(
                "mileage since maintenance must be non-negative, got {since_maintenance}"
            )));
        }
        Ok(Self {
            since_maintenance,
            interval,
            scheduled: false,
        })
    }

    pub fn since_maintenance(&self) -> f64 {
        self.since_maintenance
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn is_due(&self) -> bool {
        self.since_maintenance >= self.interval
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn record(&mut self, distance: f64) {
        if distance > 0.0 {
            self.since_maintenance += distance;
        }
    }

    pub fn schedule(&mut self) {
        self.scheduled = true;
    }

    pub fn reset(&mut self) {
        self.since_maintenance = 0.0;
        self.scheduled = false;
    }
}

/// Passenger seating bounded by a seat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cabin {
    seats: u32,
    occupied: u32,
}

impl Cabin {
    pub fn new(seats: u32) -> Self {
        Self { seats, occupied: 0 }
    }

    pub fn with_occupancy(id: &str, seats: u32, occupied: u32) -> FleetResult<Self> {
        if occupied > seats {
            return Err(FleetError::overload(format!(
                "{id}: {occupied} passengers exceed {seats} seats"
            )));
        }
        Ok(Self { seats, occupied })
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    pub fn occupancy_ratio(&self) -> f64 {
        if self.seats == 0 {
            0.0
        } else {
            f64::from(self.occupied) / f64::from(self.seats)
        }
    }

    pub fn board(&mut self, id: &str, count: u32) -> FleetResult<()> {
        if count == 0 {
            return Err(FleetError::invalid("passenger count must be positive"));
        }
        let free = self.seats.saturating_sub(self.occupied);
        if count > free {
            return Err(FleetError::overload(format!(
                "{id}: cannot board {count} passengers, {free} seats free"
            )));
        }
        self.occupied += count;
        Ok(())
    }

    pub fn disembark(&mut self, id: &str, count: u32) -> FleetResult<()> {
        if count == 0 {
            return Err(FleetError::invalid("passenger count must be positive"));
        }
        if count > self.occupied {
            return Err(FleetError::invalid(format!(
                "{id}: cannot disembark {count} passengers, only {} aboard",
                self.occupied
            )));
        }
        self.occupied -= count;
        Ok(())
    }

    pub(crate) fn check(&self, id: &str) -> FleetResult<()> {
        if self.occupied > self.seats {
            return Err(FleetError::overload(format!(
                "{id}: {} passengers exceed {} seats",
                self.occupied, self.seats
            )));
        }
        Ok(())
    }
}

/// Cargo storage bounded by a weight capacity in kilograms.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoHold {
    capacity: f64,
    load: f64,
}

impl CargoHold {
    pub fn new(id: &str, capacity: f64) -> FleetResult<Self> {
        Self::with_load(id, capacity, 0.0)
    }

    pub fn with_load(id: &str, capacity: f64, load: f64) -> FleetResult<Self> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(FleetError::invalid(format!(
                "{id}: cargo capacity must be positive, got {capacity}"
            )));
        }
        if !load.is_finite() || load < 0.0 {
            return Err(FleetError::invalid(format!(
                "{id}: cargo load must be non-negative, got {load}"
            )));
        }
        if load > capacity {
            return Err(FleetError::overload(format!(
                "{id}: cargo {load} kg exceeds capacity {capacity} kg"
            )));
        }
        Ok(Self { capacity, load })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn fill_ratio(&self) -> f64 {
        if self.capacity > 0.0 {
            self.load / self.capacity
        } else {
            0.0
        }
    }

    pub fn add(&mut self, id: &str, weight: f64) -> FleetResult<()> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FleetError::invalid(format!(
                "cargo weight must be positive, got {weight}"
            )));
        }
        if self.load + weight > self.capacity {
            return Err(FleetError::overload(format!(
                "{id}: loading {weight} kg exceeds capacity ({} of {} kg used)",
                self.load, self.capacity
            )));
        }
        self.load += weight;
        Ok(())
    }

    pub fn remove(&mut self, id: &str, weight: f64) -> FleetResult<()> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FleetError::invalid(format!(
                "cargo weight must be positive, got {weight}"
            )));
        }
        if weight > self.load {
            return Err(FleetError::invalid(format!(
                "{id}: cannot unload {weight} kg, only {} kg loaded",
                self.load
            )));
        }
        self.load = (self.load - weight).max(0.0);
        Ok(())
    }

    pub(crate) fn check(&self, id: &str) -> FleetResult<()> {
        if self.load > self.capacity {
            return Err(FleetError::overload(format!(
                "{id}: cargo {} kg exceeds capacity {} kg",
                self.load, self.capacity
            )));
        }
        Ok(())
    }
}

/// Tank level, refuelling and consumption.
pub trait FuelConsumable {
    fn tank(&self) -> &FuelTank;

    fn tank_mut(&mut self) -> &mut FuelTank;

    /// Burn fuel, failing with [`FleetError::InsufficientFuel`] when the tank holds less.
    fn consume(&mut self, amount: f64) -> FleetResult<()>;

    fn fuel_level(&self) -> f64 {
        self.tank().level()
    }

    fn fuel_capacity(&self) -> f64 {
        self.tank().capacity()
    }

    /// Add fuel up to capacity; overfill is capped, not rejected.
    fn refuel(&mut self, amount: f64) -> FleetResult<f64> {
        self.tank_mut().refuel(amount)
    }
}

/// Maintenance-due tracking against a per-kind distance interval.
pub trait Maintainable {
    fn service_log(&self) -> &ServiceLog;

    fn service_log_mut(&mut self) -> &mut ServiceLog;

    fn needs_maintenance(&self) -> bool {
        self.service_log().is_due()
    }

    /// Reset the wear counter. Harmless when nothing is due.
    fn perform_maintenance(&mut self) {
        self.service_log_mut().reset();
    }

    /// Flag the vehicle for evaluation at the next opportunity without resetting anything.
    fn schedule_maintenance(&mut self) {
        self.service_log_mut().schedule();
    }

    fn mileage_since_maintenance(&self) -> f64 {
        self.service_log().since_maintenance()
    }

    fn maintenance_interval(&self) -> f64 {
        self.service_log().interval()
    }
}
