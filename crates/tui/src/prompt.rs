//! Single-line input prompt and the multi-step add-vehicle wizard.

use std::str::FromStr;

use fleet_core::{Airplane, Bus, Car, CargoShip, FleetResult, Truck, Vehicle, VehicleKind};

pub const MAX_INPUT_LEN: usize = 64;

/// Editable single-line text input with a fallback value.
#[derive(Debug, Clone)]
pub struct InputPrompt {
    pub title: String,
    pub label: String,
    input: String,
    cursor: usize,
    default: String,
}

impl InputPrompt {
    pub fn new(
        title: impl Into<String>,
        label: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        let default = default.into();
        Self {
            title: title.into(),
            label: label.into(),
            input: default.clone(),
            cursor: default.len(),
            default,
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Trimmed input, or the default when the input is blank.
    pub fn value(&self) -> String {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            self.default.clone()
        } else {
            trimmed.to_string()
        }
    }
}

/// Parse a strictly positive, finite number.
pub fn parse_positive(raw: &str, what: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(format!("{what} must be a positive number, got '{raw}'")),
    }
}

/// Parse a whole number greater than zero.
pub fn parse_count(raw: &str, what: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("{what} must be a whole number above zero, got '{raw}'")),
    }
}

fn parse_yes_no(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" => Ok(false),
        _ => Err(format!("answer yes or no, got '{raw}'")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Kind,
    Id,
    Model,
    MaxSpeed,
    Parameter,
    Fuel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KindParameter {
    Wheels(u32),
    Altitude(f64),
    Sail(bool),
}

/// Outcome of submitting one wizard step.
#[derive(Debug)]
pub enum WizardProgress {
    Next,
    /// All fields collected. The second value is the initial fuel (may be zero).
    Done(Vehicle, f64),
}

/// Collects the fields needed to build a vehicle, one prompt at a time.
#[derive(Debug, Clone)]
pub struct AddWizard {
    step: WizardStep,
    prompt: InputPrompt,
    kind: VehicleKind,
    id: String,
    model: String,
    max_speed: f64,
    parameter: Option<KindParameter>,
}

impl Default for AddWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AddWizard {
    pub fn new() -> Self {
        let kinds: Vec<_> = VehicleKind::ALL.iter().map(|kind| kind.tag()).collect();
        Self {
            step: WizardStep::Kind,
            prompt: InputPrompt::new(
                "Add Vehicle",
                format!("Kind ({})", kinds.join(", ")),
                VehicleKind::Car.tag(),
            ),
            kind: VehicleKind::Car,
            id: String::new(),
            model: String::new(),
            max_speed: 0.0,
            parameter: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn prompt(&self) -> &InputPrompt {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut InputPrompt {
        &mut self.prompt
    }

    /// Validate the current input and advance. On error the step is kept
    /// so the user can correct the value.
    pub fn submit(&mut self) -> Result<WizardProgress, String> {
        let raw = self.prompt.value();
        match self.step {
            WizardStep::Kind => {
                self.kind = VehicleKind::from_str(&raw).map_err(|err| err.to_string())?;
                self.advance(WizardStep::Id, "ID", "");
            }
            WizardStep::Id => {
                if raw.is_empty() {
                    return Err("ID must not be empty".to_string());
                }
                if raw.contains(',') {
                    return Err("ID must not contain commas".to_string());
                }
                self.id = raw;
                self.advance(WizardStep::Model, "Model", "");
            }
            WizardStep::Model => {
                if raw.is_empty() {
                    return Err("model must not be empty".to_string());
                }
                if raw.contains(',') {
                    return Err("model must not contain commas".to_string());
                }
                self.model = raw;
                self.advance(WizardStep::MaxSpeed, "Max speed (km/h)", "");
            }
            WizardStep::MaxSpeed => {
                self.max_speed = parse_positive(&raw, "max speed")?;
                let (label, default) = self.parameter_prompt();
                self.advance(WizardStep::Parameter, label, default);
            }
            WizardStep::Parameter => {
                self.parameter = Some(match self.kind {
                    VehicleKind::Car | VehicleKind::Truck | VehicleKind::Bus => {
                        KindParameter::Wheels(parse_count(&raw, "wheels")?)
                    }
                    VehicleKind::Airplane => {
                        KindParameter::Altitude(parse_positive(&raw, "altitude ceiling")?)
                    }
                    VehicleKind::CargoShip => KindParameter::Sail(parse_yes_no(&raw)?),
                });
                self.advance(WizardStep::Fuel, "Initial fuel (litres, 0 for none)", "0");
            }
            WizardStep::Fuel => {
                let fuel = match raw.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() && value >= 0.0 => value,
                    _ => return Err(format!("initial fuel must be zero or more, got '{raw}'")),
                };
                let vehicle = self.build().map_err(|err| err.to_string())?;
                return Ok(WizardProgress::Done(vehicle, fuel));
            }
        }
        Ok(WizardProgress::Next)
    }

    fn advance(&mut self, step: WizardStep, label: &str, default: &str) {
        self.step = step;
        self.prompt = InputPrompt::new(format!("Add {}", self.kind), label, default);
    }

    fn parameter_prompt(&self) -> (&'static str, &'static str) {
        match self.kind {
            VehicleKind::Car => ("Wheels", "4"),
            VehicleKind::Truck | VehicleKind::Bus => ("Wheels", "6"),
            VehicleKind::Airplane => ("Altitude ceiling (ft)", "35000"),
            VehicleKind::CargoShip => ("Has sail? (y/n)", "n"),
        }
    }

    fn build(&self) -> FleetResult<Vehicle> {
        let id = self.id.as_str();
        let model = self.model.as_str();
        let speed = self.max_speed;
        let vehicle = match (self.kind, self.parameter) {
            (VehicleKind::Truck, Some(KindParameter::Wheels(wheels))) => {
                Truck::new(id, model, speed, wheels)?.into()
            }
            (VehicleKind::Bus, Some(KindParameter::Wheels(wheels))) => {
                Bus::new(id, model, speed, wheels)?.into()
            }
            (VehicleKind::Airplane, Some(KindParameter::Altitude(ceiling))) => {
                Airplane::new(id, model, speed, ceiling)?.into()
            }
            (VehicleKind::CargoShip, Some(KindParameter::Sail(sail))) => {
                CargoShip::new(id, model, speed, sail)?.into()
            }
            (_, Some(KindParameter::Wheels(wheels))) => Car::new(id, model, speed, wheels)?.into(),
            (kind, _) => {
                return Err(fleet_core::FleetError::InvalidOperation(format!(
                    "missing {kind} parameter"
                )))
            }
        };
        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(wizard: &mut AddWizard, text: &str) -> Result<WizardProgress, String> {
        let prompt = wizard.prompt_mut();
        prompt.move_home();
        while !prompt.input().is_empty() {
            prompt.delete();
        }
        for ch in text.chars() {
            prompt.insert(ch);
        }
        wizard.submit()
    }

    #[test]
    fn prompt_edits_at_cursor() {
        let mut prompt = InputPrompt::new("Save", "Path", "fleet.csv");
        assert_eq!(prompt.cursor(), 9);
        prompt.move_cursor(-4);
        prompt.insert('2');
        assert_eq!(prompt.input(), "fleet2.csv");
        prompt.backspace();
        prompt.delete();
        assert_eq!(prompt.input(), "fleetcsv");
        prompt.move_cursor(100);
        assert_eq!(prompt.cursor(), 8);
        prompt.insert('\n');
        assert_eq!(prompt.input(), "fleetcsv");
    }

    #[test]
    fn blank_prompt_falls_back_to_default() {
        let mut prompt = InputPrompt::new("Journey", "Distance", "100");
        prompt.move_end();
        for _ in 0..3 {
            prompt.backspace();
        }
        prompt.insert(' ');
        assert_eq!(prompt.value(), "100");
    }

    #[test]
    fn parses_numbers_strictly() {
        assert_eq!(parse_positive(" 12.5 ", "distance"), Ok(12.5));
        assert!(parse_positive("0", "distance").is_err());
        assert!(parse_positive("-3", "distance").is_err());
        assert!(parse_positive("inf", "distance").is_err());
        assert_eq!(parse_count("3", "passengers"), Ok(3));
        assert!(parse_count("0", "passengers").is_err());
        assert!(parse_count("2.5", "passengers").is_err());
    }

    #[test]
    fn wizard_builds_a_fuelled_truck() {
        let mut wizard = AddWizard::new();
        assert!(matches!(enter(&mut wizard, "truck"), Ok(WizardProgress::Next)));
        assert_eq!(wizard.kind(), VehicleKind::Truck);
        enter(&mut wizard, "T009").unwrap();
        enter(&mut wizard, "Volvo FH").unwrap();
        enter(&mut wizard, "110").unwrap();
        assert_eq!(wizard.step(), WizardStep::Parameter);
        assert_eq!(wizard.prompt().default_value(), "6");
        enter(&mut wizard, "").unwrap();
        match enter(&mut wizard, "120").unwrap() {
            WizardProgress::Done(vehicle, fuel) => {
                assert_eq!(vehicle.kind(), VehicleKind::Truck);
                assert_eq!(vehicle.id(), "T009");
                assert_eq!(fuel, 120.0);
            }
            WizardProgress::Next => panic!("wizard should be complete"),
        }
    }

    #[test]
    fn wizard_keeps_step_on_bad_input() {
        let mut wizard = AddWizard::new();
        assert!(enter(&mut wizard, "hovercraft").is_err());
        assert_eq!(wizard.step(), WizardStep::Kind);
        enter(&mut wizard, "cargoship").unwrap();
        assert!(enter(&mut wizard, "S,1").is_err());
        enter(&mut wizard, "S010").unwrap();
        enter(&mut wizard, "Clipper").unwrap();
        assert!(enter(&mut wizard, "fast").is_err());
        assert_eq!(wizard.step(), WizardStep::MaxSpeed);
        enter(&mut wizard, "30").unwrap();
        assert!(enter(&mut wizard, "maybe").is_err());
        enter(&mut wizard, "yes").unwrap();
        match enter(&mut wizard, "").unwrap() {
            WizardProgress::Done(vehicle, fuel) => {
                assert_eq!(vehicle.kind(), VehicleKind::CargoShip);
                assert_eq!(vehicle.fuel_efficiency(), 6.0);
                assert_eq!(fuel, 0.0);
            }
            WizardProgress::Next => panic!("wizard should be complete"),
        }
    }
}
