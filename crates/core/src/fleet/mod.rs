//! The fleet registry: an insertion-ordered collection of uniquely
//! identified vehicles with bulk operations, search, reporting and flat
//! record persistence.

mod report;
mod shared;

use std::{
    collections::HashSet,
    io::{BufRead, Write},
};

use tracing::{debug, info, warn};

use crate::{
    error::{FleetError, FleetResult},
    factory::VehicleFactory,
    record,
    vehicle::{Vehicle, VehicleKind},
};

pub use report::FleetReport;
pub use shared::SharedFleet;

/// Selects vehicles by concrete kind or by capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    Kind(VehicleKind),
    FuelConsumable,
    Maintainable,
}

impl SearchFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        match self {
            SearchFilter::Kind(kind) => vehicle.kind() == *kind,
            SearchFilter::FuelConsumable => vehicle.is_fuel_consumable(),
            SearchFilter::Maintainable => vehicle.is_maintainable(),
        }
    }
}

impl From<VehicleKind> for SearchFilter {
    fn from(kind: VehicleKind) -> Self {
        SearchFilter::Kind(kind)
    }
}

/// A vehicle that failed during a bulk operation.
#[derive(Debug)]
pub struct VehicleFailure {
    pub id: String,
    pub error: FleetError,
}

/// Result of a best-effort bulk operation.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Vehicles the operation was applied to.
    pub succeeded: usize,
    /// Vehicles the operation did not apply to (missing capability, nothing due).
    pub skipped: usize,
    /// Vehicles that raised an error; the batch continued past them.
    pub failures: Vec<VehicleFailure>,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, operation: &str, id: &str, error: FleetError) {
        warn!(id, %error, "{operation} failed");
        self.failures.push(VehicleFailure {
            id: id.to_string(),
            error,
        });
    }
}

/// A record line that `load` could not turn into a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the source.
    pub line_number: usize,
    pub reason: String,
}

/// What a successful `load` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

/// Insertion-ordered registry of vehicles keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicles in their current order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|vehicle| vehicle.id() == id)
    }

    /// Append a vehicle, rejecting identifiers already in the fleet.
    pub fn add(&mut self, vehicle: impl Into<Vehicle>) -> FleetResult<()> {
        let vehicle = vehicle.into();
        if self.contains(vehicle.id()) {
            return Err(FleetError::DuplicateIdentifier(vehicle.id().to_string()));
        }
        debug!(id = vehicle.id(), kind = %vehicle.kind(), "vehicle added");
        self.vehicles.push(vehicle);
        Ok(())
    }

    /// Remove and return the vehicle with `id`.
    pub fn remove(&mut self, id: &str) -> FleetResult<Vehicle> {
        let index = self
            .vehicles
            .iter()
            .position(|vehicle| vehicle.id() == id)
            .ok_or_else(|| FleetError::NotFound(id.to_string()))?;
        debug!(id, "vehicle removed");
        Ok(self.vehicles.remove(index))
    }

    /// Move every vehicle `distance` km. Per-vehicle failures are collected, not fatal.
    pub fn run_journey(&mut self, distance: f64) -> FleetResult<BatchOutcome> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(FleetError::invalid(format!(
                "journey distance must be positive, got {distance}"
            )));
        }

        let mut outcome = BatchOutcome::default();
        for vehicle in &mut self.vehicles {
            match vehicle.move_by(distance) {
                Ok(()) => outcome.succeeded += 1,
                Err(error) => {
                    let id = vehicle.id().to_string();
                    outcome.record_failure("journey", &id, error);
                }
            }
        }
        info!(
            distance,
            moved = outcome.succeeded,
            failed = outcome.failed(),
            "journey finished"
        );
        Ok(outcome)
    }

    /// Fuel the fleet would burn covering `distance`. Vehicles short on fuel
    /// are left out and logged.
    pub fn fuel_required(&self, distance: f64) -> f64 {
        if !distance.is_finite() || distance <= 0.0 {
            return 0.0;
        }

        let mut total = 0.0;
        for vehicle in &self.vehicles {
            let Some(fuel) = vehicle.fuel() else {
                continue;
            };
            let needed = distance / vehicle.fuel_efficiency();
            if needed > fuel.fuel_level() {
                warn!(
                    id = vehicle.id(),
                    needed,
                    available = fuel.fuel_level(),
                    "insufficient fuel for journey estimate"
                );
                continue;
            }
            total += needed;
        }
        total
    }

    /// Refuel every fuel-consumable vehicle by `amount`, capping each tank.
    pub fn refuel_all(&mut self, amount: f64) -> FleetResult<BatchOutcome> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FleetError::invalid(format!(
                "refuel amount must be positive, got {amount}"
            )));
        }

        let mut outcome = BatchOutcome::default();
        for vehicle in &mut self.vehicles {
            let id = vehicle.id().to_string();
            let Some(fuel) = vehicle.fuel_mut() else {
                outcome.skipped += 1;
                continue;
            };
            match fuel.refuel(amount) {
                Ok(accepted) => {
                    debug!(id = %id, accepted, "vehicle refuelled");
                    outcome.succeeded += 1;
                }
                Err(error) => outcome.record_failure("refuel", &id, error),
            }
        }
        info!(
            amount,
            refuelled = outcome.succeeded,
            failed = outcome.failed(),
            "refuel finished"
        );
        Ok(outcome)
    }

    /// Service every maintainable vehicle that is due; others are skipped.
    pub fn maintain_all(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for vehicle in &mut self.vehicles {
            let id = vehicle.id().to_string();
            match vehicle.maintenance_mut() {
                Some(service) if service.needs_maintenance() => {
                    service.perform_maintenance();
                    debug!(id = %id, "maintenance performed");
                    outcome.succeeded += 1;
                }
                _ => outcome.skipped += 1,
            }
        }
        info!(maintained = outcome.succeeded, "maintenance finished");
        outcome
    }

    pub fn search(&self, filter: SearchFilter) -> Vec<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|vehicle| filter.matches(vehicle))
            .collect()
    }

    pub fn search_by_kind(&self, kind: VehicleKind) -> Vec<&Vehicle> {
        self.search(SearchFilter::Kind(kind))
    }

    /// Maintainable vehicles currently due. Other kinds never appear.
    pub fn vehicles_needing_maintenance(&self) -> Vec<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.needs_maintenance())
            .collect()
    }

    pub fn generate_report(&self) -> FleetReport {
        FleetReport::from_vehicles(&self.vehicles)
    }

    /// Stable in-place sort, most efficient first.
    pub fn sort_by_efficiency(&mut self) {
        self.vehicles.sort_by(|a, b| b.compare_efficiency(a));
    }

    /// Write one record line per vehicle. Returns the number written.
    pub fn save<W: Write>(&self, mut writer: W) -> FleetResult<usize> {
        for vehicle in &self.vehicles {
            writeln!(writer, "{}", vehicle.to_record_line())?;
        }
        writer.flush()?;
        info!(count = self.vehicles.len(), "fleet saved");
        Ok(self.vehicles.len())
    }

    /// Replace the whole collection with the vehicles parsed from `reader`.
    ///
    /// Unparseable lines (invalid UTF-8 included) and repeated identifiers are
    /// skipped and reported in the summary. A read failure aborts the load and
    /// keeps the current fleet.
    ///
    /// Car, Truck and Bus records carry no service counter, so those vehicles
    /// come back with the counter at their total mileage. A vehicle serviced
    /// before saving can therefore be due again after a reload.
    pub fn load<R: BufRead>(&mut self, reader: R) -> FleetResult<LoadSummary> {
        let (vehicles, summary) = Self::parse_records(reader)?;
        self.vehicles = vehicles;
        info!(
            loaded = summary.loaded,
            skipped = summary.skipped.len(),
            "fleet loaded"
        );
        Ok(summary)
    }

    /// Build a fresh fleet from a record stream.
    pub fn from_records<R: BufRead>(reader: R) -> FleetResult<(Self, LoadSummary)> {
        let mut fleet = Self::new();
        let summary = fleet.load(reader)?;
        Ok((fleet, summary))
    }

    fn parse_records<R: BufRead>(reader: R) -> FleetResult<(Vec<Vehicle>, LoadSummary)> {
        let mut vehicles: Vec<Vehicle> = Vec::new();
        let mut seen = HashSet::new();
        let mut summary = LoadSummary::default();

        for (index, raw) in reader.split(b'\n').enumerate() {
            let mut raw = raw?;
            let line_number = index + 1;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(error) => {
                    warn!(line_number, %error, "skipping record line");
                    summary.skipped.push(SkippedLine {
                        line_number,
                        reason: format!("record is not valid UTF-8: {error}"),
                    });
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let fields = record::split_line(&line);
            let parsed = if fields.len() < 2 {
                Err(FleetError::invalid(format!(
                    "record has {} field(s), expected at least 2",
                    fields.len()
                )))
            } else {
                VehicleFactory::create_from_record(fields[0], &fields)
            };

            let result = parsed.and_then(|vehicle| {
                if seen.contains(vehicle.id()) {
                    Err(FleetError::DuplicateIdentifier(vehicle.id().to_string()))
                } else {
                    Ok(vehicle)
                }
            });

            match result {
                Ok(vehicle) => {
                    seen.insert(vehicle.id().to_string());
                    vehicles.push(vehicle);
                }
                Err(error) => {
                    warn!(line_number, %error, "skipping record line");
                    summary.skipped.push(SkippedLine {
                        line_number,
                        reason: error.to_string(),
                    });
                }
            }
        }

        summary.loaded = vehicles.len();
        Ok((vehicles, summary))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use super::*;
    use crate::vehicle::{Airplane, Bus, Car, CargoShip, Truck};

    fn fleet_with(vehicles: Vec<Vehicle>) -> Fleet {
        let mut fleet = Fleet::new();
        for vehicle in vehicles {
            fleet.add(vehicle).unwrap();
        }
        fleet
    }

    fn car(id: &str, fuel: f64) -> Vehicle {
        let mut car = Vehicle::from(Car::new(id, "Toyota Camry", 180.0, 4).unwrap());
        car.refuel(fuel).unwrap();
        car
    }

    fn ship(id: &str, sail: bool) -> Vehicle {
        Vehicle::from(CargoShip::new(id, "Maersk Container", 50.0, sail).unwrap())
    }

    #[test]
    fn duplicate_add_leaves_size_unchanged() {
        let mut fleet = fleet_with(vec![car("C001", 10.0)]);
        let err = fleet.add(car("C001", 20.0)).unwrap_err();
        assert!(matches!(err, FleetError::DuplicateIdentifier(id) if id == "C001"));
        assert_eq!(fleet.len(), 1);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let mut fleet = fleet_with(vec![car("C001", 10.0), car("C002", 10.0)]);
        assert!(matches!(fleet.remove("X"), Err(FleetError::NotFound(_))));
        assert_eq!(fleet.len(), 2);
        let removed = fleet.remove("C001").unwrap();
        assert_eq!(removed.id(), "C001");
        assert_eq!(fleet.vehicles()[0].id(), "C002");
    }

    #[test]
    fn journey_continues_past_failures() {
        let mut fleet = fleet_with(vec![car("C001", 50.0), car("C002", 1.0), car("C003", 50.0)]);
        let outcome = fleet.run_journey(60.0).unwrap();
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.failures[0].id, "C002");
        assert!(matches!(
            outcome.failures[0].error,
            FleetError::InsufficientFuel { .. }
        ));
        assert_eq!(fleet.get("C003").unwrap().mileage(), 60.0);
        assert_eq!(fleet.get("C002").unwrap().mileage(), 0.0);
        assert!(fleet.run_journey(0.0).is_err());
    }

    #[test]
    fn refuel_rejects_non_positive_amount_up_front() {
        let mut fleet = fleet_with(vec![car("C001", 10.0), ship("S001", false)]);
        assert!(matches!(
            fleet.refuel_all(-5.0),
            Err(FleetError::InvalidOperation(_))
        ));
        assert_eq!(fleet.get("C001").unwrap().fuel().unwrap().fuel_level(), 10.0);
        assert_eq!(fleet.get("S001").unwrap().fuel().unwrap().fuel_level(), 0.0);
    }

    #[test]
    fn refuel_caps_each_tank() {
        let mut fleet = fleet_with(vec![car("C001", 45.0), ship("S001", false)]);
        let outcome = fleet.refuel_all(100.0).unwrap();
        assert_eq!(outcome.succeeded, 2);
        assert!(outcome.is_clean());
        assert_eq!(fleet.get("C001").unwrap().fuel().unwrap().fuel_level(), 50.0);
        assert_eq!(fleet.get("S001").unwrap().fuel().unwrap().fuel_level(), 100.0);
    }

    #[test]
    fn estimate_skips_vehicles_short_on_fuel() {
        let fleet = fleet_with(vec![car("C001", 50.0), car("C002", 1.0)]);
        assert!((fleet.fuel_required(150.0) - 10.0).abs() < 1e-9);
        assert_eq!(fleet.fuel_required(-1.0), 0.0);
    }

    #[test]
    fn search_by_kind_and_capability() {
        let truck = Vehicle::from(Truck::new("T001", "Ford F-150", 120.0, 6).unwrap());
        let fleet = fleet_with(vec![car("C001", 1.0), truck, ship("S001", true)]);
        assert_eq!(fleet.search_by_kind(VehicleKind::Truck).len(), 1);
        assert!(fleet.search_by_kind(VehicleKind::Bus).is_empty());
        assert_eq!(fleet.search(SearchFilter::FuelConsumable).len(), 3);
        let maintainable: Vec<_> = fleet
            .search(SearchFilter::Maintainable)
            .iter()
            .map(|vehicle| vehicle.id().to_string())
            .collect();
        assert_eq!(maintainable, vec!["C001", "T001"]);
    }

    #[test]
    fn maintain_all_resets_only_due_vehicles() {
        let plane = Vehicle::from(Airplane::new("A001", "Boeing 737", 850.0, 35_000.0).unwrap());
        let bus = Vehicle::from(Bus::new("B001", "Volvo Bus", 100.0, 6).unwrap());
        let mut fleet = fleet_with(vec![plane, bus, car("C001", 50.0)]);
        fleet.refuel_all(20_000.0).unwrap();
        fleet.get_mut("A001").unwrap().move_by(5_000.0).unwrap();
        fleet.get_mut("B001").unwrap().move_by(100.0).unwrap();
        fleet.get_mut("C001").unwrap().move_by(30.0).unwrap();
        assert_eq!(fleet.vehicles_needing_maintenance().len(), 1);

        let outcome = fleet.maintain_all();
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.skipped, 2);
        let since = |id: &str| {
            fleet
                .get(id)
                .and_then(|vehicle| vehicle.maintenance())
                .map(|service| service.mileage_since_maintenance())
        };
        assert_eq!(since("A001"), Some(0.0));
        assert_eq!(since("B001"), Some(100.0));
        assert_eq!(since("C001"), Some(30.0));
        assert!(fleet.vehicles_needing_maintenance().is_empty());
    }

    #[test]
    fn sort_puts_most_efficient_first_and_is_stable() {
        let mut fleet = fleet_with(vec![
            ship("S001", false),
            car("C001", 1.0),
            ship("S002", true),
            car("C002", 1.0),
        ]);
        fleet.sort_by_efficiency();
        let order: Vec<_> = fleet.iter().map(Vehicle::id).collect();
        assert_eq!(order, vec!["C001", "C002", "S002", "S001"]);
    }

    #[test]
    fn load_skips_bad_lines_and_duplicates() {
        let source = "\
Car,C001,Toyota Camry,180,60,46,4,2
Truck,T001,Ford F-150,120,100,87.5,6,5000

Car,C001,Duplicate,100,0,0,4,0
Submarine,U1,Nautilus,40,0
Car
";
        let mut fleet = fleet_with(vec![ship("S009", false)]);
        let summary = fleet.load(Cursor::new(source)).unwrap();
        assert_eq!(summary.loaded, 1);
        assert_eq!(fleet.len(), 1);
        assert!(fleet.contains("C001"));
        assert!(!fleet.contains("S009"));
        let lines: Vec<_> = summary.skipped.iter().map(|s| s.line_number).collect();
        assert_eq!(lines, vec![2, 4, 5, 6]);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let source: &[u8] = b"Car,C001,Camry,180,0,10,4,0\r\n\
Car,C002,Bad\xff\xfeModel,180,0,10,4,0\n\
Car,C003,Civic,170,0,10,4,0\n";
        let mut fleet = fleet_with(vec![ship("S009", false)]);
        let summary = fleet.load(Cursor::new(source)).unwrap();
        assert_eq!(summary.loaded, 2);
        assert!(fleet.contains("C001"));
        assert!(fleet.contains("C003"));
        assert!(!fleet.contains("S009"));
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].line_number, 2);
        assert!(summary.skipped[0].reason.contains("UTF-8"));
    }

    #[test]
    fn reloaded_car_counts_service_from_total_mileage() {
        let mut fleet = Fleet::new();
        fleet.load(Cursor::new("Car,C001,Camry,180,12000,20,4,0\n")).unwrap();
        assert_eq!(fleet.vehicles_needing_maintenance().len(), 1);
        fleet.maintain_all();
        assert!(fleet.vehicles_needing_maintenance().is_empty());

        let mut buffer = Vec::new();
        fleet.save(&mut buffer).unwrap();
        let mut reloaded = Fleet::new();
        reloaded.load(Cursor::new(buffer)).unwrap();
        assert_eq!(reloaded.vehicles_needing_maintenance().len(), 1);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn failed_load_keeps_previous_fleet() {
        let mut fleet = fleet_with(vec![car("C001", 5.0)]);
        let err = fleet.load(io::BufReader::new(FailingReader)).unwrap_err();
        assert!(matches!(err, FleetError::Io(_)));
        assert_eq!(fleet.len(), 1);
    }

    #[test]
    fn save_writes_one_line_per_vehicle() {
        let fleet = fleet_with(vec![car("C001", 50.0), ship("S001", true)]);
        let mut buffer = Vec::new();
        assert_eq!(fleet.save(&mut buffer).unwrap(), 2);
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            concat!(
                "Car,C001,Toyota Camry,180,0,50,4,0\n",
                "CargoShip,S001,Maersk Container,50,0,0,true,50000,0\n",
            )
        );
    }
}
