//! Demonstration fleet used to seed a fresh installation.

use tracing::debug;

use crate::{
    error::FleetResult,
    fleet::Fleet,
    vehicle::{Airplane, Bus, Car, CargoShip, Truck, Vehicle},
};

/// One vehicle of every kind, fuelled and taken on a short trip each.
pub fn sample_fleet() -> FleetResult<Fleet> {
    let mut car = Vehicle::from(Car::new("C001", "Toyota Camry", 180.0, 4)?);
    let mut truck = Vehicle::from(Truck::new("T001", "Ford F-150", 120.0, 6)?);
    let mut bus = Vehicle::from(Bus::new("B001", "Volvo Bus", 100.0, 6)?);
    let mut airplane = Vehicle::from(Airplane::new("A001", "Boeing 737", 850.0, 35_000.0)?);
    let mut ship = Vehicle::from(CargoShip::new("S001", "Maersk Container", 50.0, false)?);

    car.refuel(50.0)?;
    truck.refuel(100.0)?;
    bus.refuel(150.0)?;
    airplane.refuel(5_000.0)?;
    ship.refuel(2_000.0)?;

    car.board_passengers(3)?;
    car.move_by(60.0)?;
    car.disembark_passengers(1)?;

    truck.load_cargo(2_000.0)?;
    truck.move_by(100.0)?;
    truck.unload_cargo(500.0)?;

    bus.board_passengers(30)?;
    bus.move_by(50.0)?;
    bus.disembark_passengers(10)?;

    airplane.board_passengers(100)?;
    airplane.load_cargo(2_000.0)?;
    airplane.move_by(500.0)?;
    if let Some(service) = airplane.maintenance_mut() {
        service.schedule_maintenance();
        if service.needs_maintenance() {
            service.perform_maintenance();
        }
    }

    ship.load_cargo(10_000.0)?;
    ship.move_by(200.0)?;
    ship.unload_cargo(2_000.0)?;

    let mut fleet = Fleet::new();
    for vehicle in [car, truck, bus, airplane, ship] {
        fleet.add(vehicle)?;
    }
    debug!(vehicles = fleet.len(), "sample fleet built");
    Ok(fleet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleKind;

    #[test]
    fn holds_one_of_each_kind_after_trips() -> anyhow::Result<()> {
        let fleet = sample_fleet()?;
        assert_eq!(fleet.len(), VehicleKind::ALL.len());
        for kind in VehicleKind::ALL {
            assert_eq!(fleet.search_by_kind(kind).len(), 1, "{kind}");
        }

        let car = fleet.get("C001").expect("car");
        assert!((car.mileage() - 60.0).abs() < 1e-9);
        assert_eq!(car.passengers(), Some((2, 5)));

        let truck = fleet.get("T001").expect("truck");
        assert_eq!(truck.cargo(), Some((1_500.0, 5_000.0)));
        assert!((truck.fuel().expect("tank").fuel_level() - 87.5).abs() < 1e-9);

        let ship = fleet.get("S001").expect("ship");
        assert!((ship.fuel().expect("tank").fuel_level() - 1_950.0).abs() < 1e-9);
        assert!(fleet.vehicles_needing_maintenance().is_empty());
        Ok(())
    }
}
