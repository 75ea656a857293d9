use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{error::FleetResult, vehicle::Vehicle};

use super::{BatchOutcome, Fleet, FleetReport, LoadSummary};

/// Cloneable handle to one fleet shared across threads.
///
/// Every operation holds the single lock for its whole duration, so bulk
/// iteration never interleaves with a concurrent add or remove.
#[derive(Debug, Clone, Default)]
pub struct SharedFleet {
    inner: Arc<Mutex<Fleet>>,
}

impl SharedFleet {
    pub fn new(fleet: Fleet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(fleet)),
        }
    }

    /// Run `f` against the fleet under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Fleet) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` against the fleet mutably under the lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Fleet) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn add(&self, vehicle: impl Into<Vehicle>) -> FleetResult<()> {
        self.inner.lock().add(vehicle)
    }

    pub fn remove(&self, id: &str) -> FleetResult<Vehicle> {
        self.inner.lock().remove(id)
    }

    pub fn run_journey(&self, distance: f64) -> FleetResult<BatchOutcome> {
        self.inner.lock().run_journey(distance)
    }

    pub fn refuel_all(&self, amount: f64) -> FleetResult<BatchOutcome> {
        self.inner.lock().refuel_all(amount)
    }

    pub fn maintain_all(&self) -> BatchOutcome {
        self.inner.lock().maintain_all()
    }

    pub fn generate_report(&self) -> FleetReport {
        self.inner.lock().generate_report()
    }

    pub fn save<W: Write>(&self, writer: W) -> FleetResult<usize> {
        self.inner.lock().save(writer)
    }

    pub fn load<R: BufRead>(&self, reader: R) -> FleetResult<LoadSummary> {
        self.inner.lock().load(reader)
    }

    /// Copy of the current fleet, taken under the lock.
    pub fn snapshot(&self) -> Fleet {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::vehicle::{Car, FuelConsumable};

    #[test]
    fn concurrent_adds_and_journeys_stay_consistent() {
        let shared = SharedFleet::default();
        thread::scope(|scope| {
            for worker in 0..4 {
                let shared = shared.clone();
                scope.spawn(move || {
                    for index in 0..25 {
                        let mut car =
                            Car::new(format!("C{worker}-{index}"), "Fiat Panda", 150.0, 4).unwrap();
                        car.refuel(50.0).unwrap();
                        shared.add(car).unwrap();
                        shared.run_journey(1.5).unwrap();
                    }
                });
            }
        });

        assert_eq!(shared.len(), 100);
        let report = shared.generate_report();
        assert_eq!(report.kind_counts.get("Car"), Some(&100));
        // Each journey moves every car present at that moment.
        let fleet = shared.snapshot();
        assert!(fleet.iter().all(|car| car.mileage() >= 1.5));
    }

    #[test]
    fn duplicate_add_is_rejected_through_the_handle() {
        let shared = SharedFleet::new(Fleet::new());
        shared.add(Car::new("C001", "Toyota Camry", 180.0, 4).unwrap()).unwrap();
        assert!(shared.add(Car::new("C001", "Toyota Camry", 180.0, 4).unwrap()).is_err());
        assert_eq!(shared.read(|fleet| fleet.len()), 1);
        let removed = shared.write(|fleet| fleet.remove("C001")).unwrap();
        assert_eq!(removed.id(), "C001");
        assert!(shared.is_empty());
    }
}
