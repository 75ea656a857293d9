//! Flat record helpers: splitting a persisted line into fields and reading
//! typed values out of them with descriptive errors.

use crate::{
    error::{FleetError, FleetResult},
    vehicle::{VehicleCore, VehicleKind},
};

/// Field delimiter of the persisted format.
pub const DELIMITER: char = ',';

/// Split one persisted line into trimmed fields.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split(DELIMITER).map(str::trim).collect()
}

/// Borrowed view over the fields of one record, kind tag included at index 0.
#[derive(Debug, Clone, Copy)]
pub struct RecordFields<'a> {
    fields: &'a [&'a str],
}

impl<'a> RecordFields<'a> {
    pub fn new(fields: &'a [&'a str]) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Identifier field, used to label errors once parsing gets that far.
    pub fn id(&self) -> &'a str {
        self.fields.get(1).copied().unwrap_or("?")
    }

    pub fn expect_len(&self, kind: VehicleKind, expected: usize) -> FleetResult<()> {
        if self.fields.len() != expected {
            return Err(FleetError::invalid(format!(
                "{kind} record needs {expected} fields, found {}",
                self.fields.len()
            )));
        }
        Ok(())
    }

    pub fn text(&self, index: usize, name: &str) -> FleetResult<&'a str> {
        self.fields
            .get(index)
            .copied()
            .ok_or_else(|| FleetError::invalid(format!("missing {name} field")))
    }

    pub fn number(&self, index: usize, name: &str) -> FleetResult<f64> {
        let raw = self.text(index, name)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(FleetError::invalid(format!(
                "{}: {name} '{raw}' is not a number",
                self.id()
            ))),
        }
    }

    pub fn count(&self, index: usize, name: &str) -> FleetResult<u32> {
        let raw = self.text(index, name)?;
        raw.parse::<u32>().map_err(|_| {
            FleetError::invalid(format!(
                "{}: {name} '{raw}' is not a whole number",
                self.id()
            ))
        })
    }

    pub fn flag(&self, index: usize, name: &str) -> FleetResult<bool> {
        let raw = self.text(index, name)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(FleetError::invalid(format!(
                "{}: {name} '{raw}' is not true/false",
                self.id()
            ))),
        }
    }

    /// Shared prefix: id, model, max speed and mileage at indices 1 through 4.
    pub fn core(&self) -> FleetResult<VehicleCore> {
        VehicleCore::restore(
            self.text(1, "id")?,
            self.text(2, "model")?,
            self.number(3, "max speed")?,
            self.number(4, "mileage")?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_typed_fields() {
        let fields = split_line("Car, C001 ,Camry,180,60.5,46,4,2");
        let record = RecordFields::new(&fields);
        assert_eq!(record.len(), 8);
        assert_eq!(record.id(), "C001");
        assert_eq!(record.number(5, "fuel level").unwrap(), 46.0);
        assert_eq!(record.count(6, "wheels").unwrap(), 4);
        let core = record.core().unwrap();
        assert_eq!(core.mileage(), 60.5);
        assert!(record.expect_len(VehicleKind::Car, 8).is_ok());
        assert!(record.expect_len(VehicleKind::Car, 9).is_err());
    }

    #[test]
    fn rejects_malformed_values() {
        let fields = ["CargoShip", "S1", "M", "50", "0", "x", "maybe", "-1"];
        let record = RecordFields::new(&fields);
        assert!(matches!(
            record.number(5, "fuel level"),
            Err(FleetError::InvalidOperation(_))
        ));
        assert!(record.flag(6, "sail").is_err());
        assert!(record.count(7, "count").is_err());
        assert!(record.text(9, "missing").is_err());
        assert!(RecordFields::new(&["Car", "X", "M", "NaN", "0"]).core().is_err());
    }
}
