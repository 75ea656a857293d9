//! Rebuilds vehicles from persisted records by dispatching on the kind tag.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    error::{FleetError, FleetResult},
    record::{self, RecordFields},
    vehicle::{Airplane, Bus, Car, CargoShip, Truck, Vehicle, VehicleKind},
};

/// Parses the full field list of one record (kind tag included).
pub type RecordParser = for<'a> fn(&RecordFields<'a>) -> FleetResult<Vehicle>;

static PARSERS: Lazy<HashMap<&'static str, RecordParser>> = Lazy::new(|| {
    let mut parsers: HashMap<&'static str, RecordParser> = HashMap::new();
    parsers.insert(VehicleKind::Car.tag(), Car::from_record);
    parsers.insert(VehicleKind::Truck.tag(), Truck::from_record);
    parsers.insert(VehicleKind::Bus.tag(), Bus::from_record);
    parsers.insert(VehicleKind::Airplane.tag(), Airplane::from_record);
    parsers.insert(VehicleKind::CargoShip.tag(), CargoShip::from_record);
    parsers
});

/// Entry point for turning records back into vehicles.
pub struct VehicleFactory;

impl VehicleFactory {
    /// Build a vehicle from `fields`, whose first entry must be `kind_tag`.
    pub fn create_from_record(kind_tag: &str, fields: &[&str]) -> FleetResult<Vehicle> {
        let parser = PARSERS
            .get(kind_tag)
            .ok_or_else(|| FleetError::UnknownKind(kind_tag.to_string()))?;
        if fields.first().copied() != Some(kind_tag) {
            return Err(FleetError::invalid(format!(
                "record does not start with kind tag {kind_tag}"
            )));
        }
        parser(&RecordFields::new(fields))
    }

    /// Split a persisted line and build the vehicle it describes.
    pub fn parse_line(line: &str) -> FleetResult<Vehicle> {
        let fields = record::split_line(line);
        if fields.len() < 2 {
            return Err(FleetError::invalid(format!(
                "record has {} field(s), expected at least 2",
                fields.len()
            )));
        }
        Self::create_from_record(fields[0], &fields)
    }

    /// Kind tags with a registered parser.
    pub fn known_tags() -> Vec<&'static str> {
        let mut tags: Vec<_> = PARSERS.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}
