use std::collections::BTreeMap;

use serde::Serialize;

use crate::vehicle::Vehicle;

/// Aggregate statistics over a fleet, as plain data for presentation or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetReport {
    pub total_vehicles: usize,
    /// Vehicle count keyed by kind name.
    pub kind_counts: BTreeMap<String, usize>,
    /// Mean km per fuel unit over fuel-consumable vehicles, 0 when there are none.
    pub average_fuel_efficiency: f64,
    pub total_mileage: f64,
    pub needing_maintenance: usize,
}

impl FleetReport {
    pub fn from_vehicles<'a>(vehicles: impl IntoIterator<Item = &'a Vehicle>) -> Self {
        let mut total_vehicles = 0;
        let mut kind_counts = BTreeMap::new();
        let mut efficiency_sum = 0.0;
        let mut fuel_vehicles = 0usize;
        let mut total_mileage = 0.0;
        let mut needing_maintenance = 0;

        for vehicle in vehicles {
            total_vehicles += 1;
            *kind_counts.entry(vehicle.kind().to_string()).or_insert(0) += 1;
            if vehicle.is_fuel_consumable() {
                efficiency_sum += vehicle.fuel_efficiency();
                fuel_vehicles += 1;
            }
            total_mileage += vehicle.mileage();
            if vehicle.needs_maintenance() {
                needing_maintenance += 1;
            }
        }

        let average_fuel_efficiency = if fuel_vehicles > 0 {
            efficiency_sum / fuel_vehicles as f64
        } else {
            0.0
        };

        Self {
            total_vehicles,
            kind_counts,
            average_fuel_efficiency,
            total_mileage,
            needing_maintenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{Car, CargoShip, Truck};

    #[test]
    fn empty_fleet_has_zero_average() {
        let report = FleetReport::from_vehicles(std::iter::empty());
        assert_eq!(report.total_vehicles, 0);
        assert_eq!(report.average_fuel_efficiency, 0.0);
        assert!(report.kind_counts.is_empty());
    }

    #[test]
    fn aggregates_counts_efficiency_and_mileage() {
        let mut car = Vehicle::from(Car::new("C001", "Toyota Camry", 180.0, 4).unwrap());
        car.refuel(50.0).unwrap();
        car.move_by(60.0).unwrap();
        let vehicles = vec![
            car,
            Vehicle::from(Car::new("C002", "Honda Civic", 170.0, 4).unwrap()),
            Vehicle::from(Truck::new("T001", "Ford F-150", 120.0, 6).unwrap()),
            Vehicle::from(CargoShip::new("S001", "Clipper", 30.0, true).unwrap()),
        ];

        let report = FleetReport::from_vehicles(&vehicles);
        assert_eq!(report.total_vehicles, 4);
        assert_eq!(report.kind_counts.get("Car"), Some(&2));
        assert_eq!(report.kind_counts.get("CargoShip"), Some(&1));
        assert!((report.average_fuel_efficiency - (15.0 + 15.0 + 8.0 + 6.0) / 4.0).abs() < 1e-9);
        assert_eq!(report.total_mileage, 60.0);
        assert_eq!(report.needing_maintenance, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind_counts"]["Truck"], 1);
    }
}
