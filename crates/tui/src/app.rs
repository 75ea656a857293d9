use std::{
    collections::VecDeque,
    io,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fleet_core::{
    AppConfig, BatchOutcome, Fleet, FleetError, FleetResult, FleetStore, SearchFilter,
    SharedFleet, Vehicle, VehicleKind,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::{error, info, warn};

use crate::prompt::{
    parse_count, parse_positive, AddWizard, InputPrompt, WizardProgress, WizardStep,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const JOURNEY_PREVIEW_KM: f64 = 100.0;
const REPORT_FILE: &str = "fleet_report.json";

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

/// Which slice of the fleet the table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewFilter {
    All,
    Search(SearchFilter),
    NeedsMaintenance,
}

impl ViewFilter {
    fn order() -> Vec<ViewFilter> {
        let mut order = vec![ViewFilter::All];
        order.extend(
            VehicleKind::ALL
                .iter()
                .map(|kind| ViewFilter::Search(SearchFilter::Kind(*kind))),
        );
        order.push(ViewFilter::Search(SearchFilter::FuelConsumable));
        order.push(ViewFilter::Search(SearchFilter::Maintainable));
        order.push(ViewFilter::NeedsMaintenance);
        order
    }

    fn next(self) -> ViewFilter {
        let order = Self::order();
        let position = order.iter().position(|filter| *filter == self).unwrap_or(0);
        order[(position + 1) % order.len()]
    }

    fn label(self) -> String {
        match self {
            ViewFilter::All => "All vehicles".to_string(),
            ViewFilter::Search(SearchFilter::Kind(kind)) => kind.to_string(),
            ViewFilter::Search(SearchFilter::FuelConsumable) => "Fuel-consumable".to_string(),
            ViewFilter::Search(SearchFilter::Maintainable) => "Maintainable".to_string(),
            ViewFilter::NeedsMaintenance => "Needing maintenance".to_string(),
        }
    }

    fn select(self, fleet: &Fleet) -> Vec<Vehicle> {
        let matches = match self {
            ViewFilter::All => fleet.iter().collect(),
            ViewFilter::Search(filter) => fleet.search(filter),
            ViewFilter::NeedsMaintenance => fleet.vehicles_needing_maintenance(),
        };
        matches.into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptAction {
    Journey,
    RefuelAll,
    Board(String),
    Disembark(String),
    LoadCargo(String),
    UnloadCargo(String),
    Save,
    Load,
    Export,
}

enum Modal {
    Prompt(InputPrompt, PromptAction),
    Wizard(AddWizard),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct ActivityEntry {
    at: DateTime<Local>,
    level: ActivityLevel,
    message: String,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end driving a shared fleet.
pub struct FleetApp {
    config: AppConfig,
    fleet: SharedFleet,
    store: FleetStore,
    state: UiState,
    filter: ViewFilter,
    modal: Option<Modal>,
    activity: VecDeque<ActivityEntry>,
    theme: Theme,
}

impl FleetApp {
    pub fn new(config: AppConfig, fleet: SharedFleet, store: FleetStore) -> Self {
        Self {
            config,
            fleet,
            store,
            state: UiState::default(),
            filter: ViewFilter::All,
            modal: None,
            activity: VecDeque::new(),
            theme: Theme::default(),
        }
    }

    /// Record a message in the activity log before the UI starts.
    pub fn note(&mut self, message: impl Into<String>) {
        self.record(ActivityLevel::Info, message);
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
        spawn_input_thread(event_tx);

        let result = self.event_loop(&mut terminal, &event_rx);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        events: &mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            match events.recv() {
                Ok(AppEvent::Input(Event::Key(key))) => self.handle_key(key),
                Ok(AppEvent::Input(_)) | Ok(AppEvent::Tick) => {}
                Err(_) => break,
            }
        }
        Ok(())
    }

    fn visible(&self) -> Vec<Vehicle> {
        let filter = self.filter;
        self.fleet.read(|fleet| filter.select(fleet))
    }

    fn selected(&self) -> Option<Vehicle> {
        let visible = self.visible();
        visible.get(self.state.cursor).cloned()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Some(modal) = self.modal.take() {
            self.modal = self.handle_modal_key(modal, key);
            return;
        }

        let total = self.visible().len();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1, total),
            KeyCode::Down => self.state.move_cursor(1, total),
            KeyCode::PageUp => self.state.move_cursor(-10, total),
            KeyCode::PageDown => self.state.move_cursor(10, total),
            KeyCode::Home => self.state.move_cursor(isize::MIN / 2, total),
            KeyCode::End => self.state.move_cursor(isize::MAX / 2, total),
            KeyCode::Char('a') => {
                self.modal = Some(Modal::Wizard(AddWizard::new()));
            }
            KeyCode::Char('d') => self.remove_selected(),
            KeyCode::Char('j') => {
                let needed = self
                    .fleet
                    .read(|fleet| fleet.fuel_required(JOURNEY_PREVIEW_KM));
                self.state.set_status(format!(
                    "Fleet burns {needed:.1} l per {JOURNEY_PREVIEW_KM} km"
                ));
                self.open_prompt(PromptAction::Journey, "Journey", "Distance (km)", "100")
            }
            KeyCode::Char('r') => self.open_prompt(
                PromptAction::RefuelAll,
                "Refuel All",
                "Litres per vehicle",
                "50",
            ),
            KeyCode::Char('m') => self.maintain_all(),
            KeyCode::Char('s') => {
                let default = self.config.fleet_file.display().to_string();
                self.open_prompt(PromptAction::Save, "Save Fleet", "Save to file", default)
            }
            KeyCode::Char('l') => {
                let default = self.config.fleet_file.display().to_string();
                self.open_prompt(PromptAction::Load, "Load Fleet", "Load from file", default)
            }
            KeyCode::Char('x') => {
                let default = self.default_report_path().display().to_string();
                self.open_prompt(PromptAction::Export, "Export Report", "Write JSON to", default)
            }
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.state.cursor = 0;
                let shown = self.visible().len();
                self.state
                    .set_status(format!("Filter: {} ({shown} shown)", self.filter.label()));
            }
            KeyCode::Char('o') => {
                self.fleet.write(|fleet| fleet.sort_by_efficiency());
                self.record(ActivityLevel::Info, "Sorted fleet by fuel efficiency");
            }
            KeyCode::Char('p') => self.prompt_for_selected(PromptAction::Board),
            KeyCode::Char('P') => self.prompt_for_selected(PromptAction::Disembark),
            KeyCode::Char('c') => self.prompt_for_selected(PromptAction::LoadCargo),
            KeyCode::Char('C') => self.prompt_for_selected(PromptAction::UnloadCargo),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
        match modal {
            Modal::Prompt(mut prompt, action) => match key.code {
                KeyCode::Esc => {
                    self.state.set_status(format!("{} cancelled", prompt.title));
                    None
                }
                KeyCode::Enter => {
                    let value = prompt.value();
                    self.apply_prompt(action, &value);
                    None
                }
                code => {
                    edit_prompt(&mut prompt, code, key.modifiers);
                    Some(Modal::Prompt(prompt, action))
                }
            },
            Modal::Wizard(mut wizard) => match key.code {
                KeyCode::Esc => {
                    self.state.set_status("Add vehicle cancelled".to_string());
                    None
                }
                KeyCode::Enter => match wizard.submit() {
                    Ok(WizardProgress::Next) => Some(Modal::Wizard(wizard)),
                    Ok(WizardProgress::Done(vehicle, fuel)) => {
                        self.add_vehicle(vehicle, fuel);
                        None
                    }
                    Err(message) => {
                        self.state.set_status(message);
                        Some(Modal::Wizard(wizard))
                    }
                },
                code => {
                    edit_prompt(wizard.prompt_mut(), code, key.modifiers);
                    Some(Modal::Wizard(wizard))
                }
            },
        }
    }

    fn open_prompt(
        &mut self,
        action: PromptAction,
        title: &str,
        label: &str,
        default: impl Into<String>,
    ) {
        self.modal = Some(Modal::Prompt(InputPrompt::new(title, label, default), action));
    }

    fn prompt_for_selected(&mut self, make: fn(String) -> PromptAction) {
        let Some(vehicle) = self.selected() else {
            self.state.set_status("No vehicle selected".to_string());
            return;
        };
        let id = vehicle.id().to_string();
        let action = make(id.clone());
        let (title, label, default, supported) = match action {
            PromptAction::Board(_) => (
                "Board",
                "Passengers boarding",
                "1",
                vehicle.passengers().is_some(),
            ),
            PromptAction::Disembark(_) => (
                "Disembark",
                "Passengers leaving",
                "1",
                vehicle.passengers().is_some(),
            ),
            PromptAction::LoadCargo(_) => {
                ("Load Cargo", "Weight (kg)", "1000", vehicle.cargo().is_some())
            }
            PromptAction::UnloadCargo(_) => {
                ("Unload Cargo", "Weight (kg)", "1000", vehicle.cargo().is_some())
            }
            _ => return,
        };
        if !supported {
            let carries = if matches!(action, PromptAction::Board(_) | PromptAction::Disembark(_)) {
                "passengers"
            } else {
                "cargo"
            };
            self.state
                .set_status(format!("{id} ({}) carries no {carries}", vehicle.kind()));
            return;
        }
        self.open_prompt(action, &format!("{title} - {id}"), label, default);
    }

    fn apply_prompt(&mut self, action: PromptAction, value: &str) {
        match action {
            PromptAction::Journey => match parse_positive(value, "distance") {
                Ok(distance) => self.run_journey(distance),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::RefuelAll => match parse_positive(value, "fuel amount") {
                Ok(amount) => self.refuel_all(amount),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::Board(id) => match parse_count(value, "passenger count") {
                Ok(count) => self.update_vehicle(
                    &id,
                    |vehicle| vehicle.board_passengers(count),
                    || format!("{count} passenger(s) boarded {id}"),
                ),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::Disembark(id) => match parse_count(value, "passenger count") {
                Ok(count) => self.update_vehicle(
                    &id,
                    |vehicle| vehicle.disembark_passengers(count),
                    || format!("{count} passenger(s) left {id}"),
                ),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::LoadCargo(id) => match parse_positive(value, "cargo weight") {
                Ok(weight) => self.update_vehicle(
                    &id,
                    |vehicle| vehicle.load_cargo(weight),
                    || format!("Loaded {weight} kg onto {id}"),
                ),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::UnloadCargo(id) => match parse_positive(value, "cargo weight") {
                Ok(weight) => self.update_vehicle(
                    &id,
                    |vehicle| vehicle.unload_cargo(weight),
                    || format!("Unloaded {weight} kg from {id}"),
                ),
                Err(message) => self.record(ActivityLevel::Error, message),
            },
            PromptAction::Save => self.save_to(Path::new(value)),
            PromptAction::Load => self.load_from(Path::new(value)),
            PromptAction::Export => self.export_to(Path::new(value)),
        }
    }

    fn add_vehicle(&mut self, mut vehicle: Vehicle, fuel: f64) {
        if fuel > 0.0 {
            if let Err(err) = vehicle.refuel(fuel) {
                self.record(ActivityLevel::Error, err.to_string());
                return;
            }
        }
        let summary = vehicle.details();
        match self.fleet.add(vehicle) {
            Ok(()) => self.record(ActivityLevel::Info, format!("Added {summary}")),
            Err(err) => self.record(ActivityLevel::Error, err.to_string()),
        }
    }

    fn remove_selected(&mut self) {
        let Some(vehicle) = self.selected() else {
            self.state.set_status("No vehicle selected".to_string());
            return;
        };
        match self.fleet.remove(vehicle.id()) {
            Ok(removed) => {
                self.record(ActivityLevel::Info, format!("Removed {}", removed.details()));
                let total = self.visible().len();
                self.state.clamp_cursor(total);
            }
            Err(err) => self.record(ActivityLevel::Error, err.to_string()),
        }
    }

    fn run_journey(&mut self, distance: f64) {
        match self.fleet.run_journey(distance) {
            Ok(outcome) => self.record_batch(&format!("Journey of {distance} km"), outcome),
            Err(err) => self.record(ActivityLevel::Error, err.to_string()),
        }
    }

    fn refuel_all(&mut self, amount: f64) {
        match self.fleet.refuel_all(amount) {
            Ok(outcome) => self.record_batch(&format!("Refuel of {amount} l"), outcome),
            Err(err) => self.record(ActivityLevel::Error, err.to_string()),
        }
    }

    fn maintain_all(&mut self) {
        let outcome = self.fleet.maintain_all();
        self.record_batch("Maintenance", outcome);
    }

    fn update_vehicle(
        &mut self,
        id: &str,
        operation: impl FnOnce(&mut Vehicle) -> FleetResult<()>,
        success: impl FnOnce() -> String,
    ) {
        let result = self.fleet.write(|fleet| match fleet.get_mut(id) {
            Some(vehicle) => operation(vehicle),
            None => Err(FleetError::NotFound(id.to_string())),
        });
        match result {
            Ok(()) => self.record(ActivityLevel::Info, success()),
            Err(err) => self.record(ActivityLevel::Error, err.to_string()),
        }
    }

    fn save_to(&mut self, path: &Path) {
        let result = self.fleet.read(|fleet| self.store.save(fleet, path));
        match result {
            Ok(count) => self.record(
                ActivityLevel::Info,
                format!("Saved {count} vehicle(s) to {}", path.display()),
            ),
            Err(err) => self.record(ActivityLevel::Error, format!("{err:#}")),
        }
    }

    fn load_from(&mut self, path: &Path) {
        let backup = self.fleet.read(|fleet| self.store.backup(fleet));
        match backup {
            Ok(entry) => self.record(
                ActivityLevel::Info,
                format!("Backed up current fleet to {}", entry.path.display()),
            ),
            Err(err) => {
                self.record(
                    ActivityLevel::Error,
                    format!("Load aborted, backup failed: {err:#}"),
                );
                return;
            }
        }

        let result = self.fleet.write(|fleet| self.store.load(fleet, path));
        match result {
            Ok(summary) => {
                self.state.cursor = 0;
                let message = format!(
                    "Loaded {} vehicle(s) from {}",
                    summary.loaded,
                    path.display()
                );
                if summary.skipped.is_empty() {
                    self.record(ActivityLevel::Info, message);
                } else {
                    self.record(
                        ActivityLevel::Warning,
                        format!("{message}, {} line(s) skipped", summary.skipped.len()),
                    );
                    for skipped in summary.skipped {
                        self.record(
                            ActivityLevel::Warning,
                            format!("  line {}: {}", skipped.line_number, skipped.reason),
                        );
                    }
                }
            }
            Err(err) => self.record(ActivityLevel::Error, format!("{err:#}")),
        }
    }

    fn export_to(&mut self, path: &Path) {
        let report = self.fleet.generate_report();
        match self.store.export_report(&report, path) {
            Ok(()) => self.record(
                ActivityLevel::Info,
                format!("Exported report to {}", path.display()),
            ),
            Err(err) => self.record(ActivityLevel::Error, format!("{err:#}")),
        }
    }

    fn default_report_path(&self) -> PathBuf {
        self.config.fleet_file.with_file_name(REPORT_FILE)
    }

    fn record_batch(&mut self, label: &str, outcome: BatchOutcome) {
        let mut message = format!("{label}: {} done", outcome.succeeded);
        if outcome.skipped > 0 {
            message.push_str(&format!(", {} skipped", outcome.skipped));
        }
        if !outcome.is_clean() {
            message.push_str(&format!(", {} failed", outcome.failed()));
        }
        let level = if outcome.is_clean() {
            ActivityLevel::Info
        } else {
            ActivityLevel::Warning
        };
        self.record(level, message);
        for failure in outcome.failures {
            self.record(
                ActivityLevel::Error,
                format!("  {}: {}", failure.id, failure.error),
            );
        }
    }

    fn record(&mut self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ActivityLevel::Info => info!("{message}"),
            ActivityLevel::Warning => warn!("{message}"),
            ActivityLevel::Error => error!("{message}"),
        }
        self.state.set_status(message.trim().to_string());
        self.activity.push_front(ActivityEntry {
            at: Local::now(),
            level,
            message,
        });
        self.activity.truncate(self.config.activity_log_len.max(1));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let vehicles = self.visible();
        self.state.clamp_cursor(vehicles.len());

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(4),
            ])
            .split(frame.size());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        self.render_header(frame, rows[0], vehicles.len());
        self.render_table(frame, columns[0], &vehicles);
        self.render_details(frame, side[0], vehicles.get(self.state.cursor));
        self.render_report(frame, side[1]);
        self.render_activity(frame, rows[2]);
        self.render_status(frame, rows[3]);

        match &self.modal {
            Some(Modal::Prompt(prompt, _)) => self.render_prompt(frame, prompt, None),
            Some(Modal::Wizard(wizard)) => {
                let step = wizard_step_number(wizard.step());
                self.render_prompt(frame, wizard.prompt(), Some(step))
            }
            None => {}
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, shown: usize) {
        let total = self.fleet.len();
        let line = Line::from(vec![
            Span::styled(
                "Fleet Manager",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Filter: {}", self.filter.label()),
                Style::default().fg(self.theme.primary_fg),
            ),
            Span::styled(
                format!("  ({shown} of {total} shown)"),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, vehicles: &[Vehicle]) {
        let header = Row::new(["ID", "Kind", "Model", "Mileage", "Fuel", "km/l", "Service"]).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let rows: Vec<Row> = vehicles
            .iter()
            .map(|vehicle| {
                let fuel = vehicle
                    .fuel()
                    .map(|tank| format!("{:.0}/{:.0}", tank.fuel_level(), tank.fuel_capacity()))
                    .unwrap_or_else(|| "-".to_string());
                let (service, service_style) = match vehicle.maintenance() {
                    Some(log) if log.needs_maintenance() => {
                        ("DUE".to_string(), Style::default().fg(self.theme.warning))
                    }
                    Some(log) => (
                        format!(
                            "{:.0}/{:.0}",
                            log.mileage_since_maintenance(),
                            log.maintenance_interval()
                        ),
                        Style::default().fg(self.theme.success),
                    ),
                    None => ("-".to_string(), Style::default().fg(self.theme.muted)),
                };
                Row::new(vec![
                    Cell::from(vehicle.id().to_string()),
                    Cell::from(vehicle.kind().to_string()),
                    Cell::from(vehicle.model().to_string()),
                    Cell::from(format!("{:.1}", vehicle.mileage())),
                    Cell::from(fuel),
                    Cell::from(format!("{:.2}", vehicle.fuel_efficiency())),
                    Cell::from(service).style(service_style),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Vehicles"))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        if !vehicles.is_empty() {
            table_state.select(Some(self.state.cursor));
        }
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, vehicle: Option<&Vehicle>) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(vehicle) = vehicle else {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No vehicle selected. Press a to add one.",
                Style::default().fg(self.theme.muted),
            )))
            .block(block);
            frame.render_widget(empty, area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                vehicle.details(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "Efficiency: {:.2} km/l",
                vehicle.fuel_efficiency()
            )),
            Line::from(format!(
                "{JOURNEY_PREVIEW_KM} km takes {:.2} h at top speed",
                vehicle.estimate_journey_time(JOURNEY_PREVIEW_KM)
            )),
        ];
        if let Some(tank) = vehicle.fuel() {
            lines.push(Line::from(format!(
                "Fuel: {:.1} / {:.1} l",
                tank.fuel_level(),
                tank.fuel_capacity()
            )));
        }
        if let Some((occupied, seats)) = vehicle.passengers() {
            lines.push(Line::from(format!("Passengers: {occupied} / {seats}")));
        }
        if let Some((load, capacity)) = vehicle.cargo() {
            lines.push(Line::from(format!("Cargo: {load:.1} / {capacity:.1} kg")));
        }
        match vehicle.maintenance() {
            Some(log) => {
                let mut text = format!(
                    "Service: {:.1} of {:.0} km since last",
                    log.mileage_since_maintenance(),
                    log.maintenance_interval()
                );
                if log.service_log().is_scheduled() {
                    text.push_str(" (scheduled)");
                }
                let style = if log.needs_maintenance() {
                    Style::default().fg(self.theme.warning)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(text, style)));
            }
            None => lines.push(Line::from(Span::styled(
                "Service: not tracked",
                Style::default().fg(self.theme.muted),
            ))),
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_report(&self, frame: &mut Frame, area: Rect) {
        let report = self.fleet.generate_report();
        let mut lines = vec![
            Line::from(format!("Vehicles: {}", report.total_vehicles)),
            Line::from(format!(
                "Average efficiency: {:.2} km/l",
                report.average_fuel_efficiency
            )),
            Line::from(format!("Total mileage: {:.1} km", report.total_mileage)),
        ];
        let due_style = if report.needing_maintenance > 0 {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("Needing maintenance: {}", report.needing_maintenance),
            due_style,
        )));
        for (kind, count) in &report.kind_counts {
            lines.push(Line::from(Span::styled(
                format!("  {kind}: {count}"),
                Style::default().fg(self.theme.muted),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Report"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_activity(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .activity
            .iter()
            .map(|entry| {
                let color = match entry.level {
                    ActivityLevel::Info => self.theme.primary_fg,
                    ActivityLevel::Warning => self.theme.warning,
                    ActivityLevel::Error => self.theme.danger,
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        entry.at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::styled(entry.message.clone(), Style::default().fg(color)),
                ]))
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Activity"));
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = "a add  d remove  j journey  r refuel  m maintain  s save  l load  \
                    f filter  o sort  p/P board  c/C cargo  x export  q quit";
        let paragraph = Paragraph::new(vec![
            Line::from(self.state.status.clone()),
            Line::from(Span::styled(help, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &InputPrompt, step: Option<usize>) {
        let frame_area = frame.size();
        let width = 60_u16.min(frame_area.width.saturating_sub(4)).max(24);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5);
        let x = frame_area.x + (frame_area.width.saturating_sub(width)) / 2;
        let y = frame_area.y + (frame_area.height.saturating_sub(height)) / 2;
        let area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, area);

        let title = match step {
            Some(step) => format!("{} ({step}/{})", prompt.title, WIZARD_STEPS),
            None => prompt.title.clone(),
        };
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.input().to_string()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let mut lines = vec![Line::from(prompt.label.clone()), input_line, Line::from(""), helper];
        if !prompt.default_value().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Default: {}", prompt.default_value()),
                Style::default().fg(self.theme.muted),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + prompt.cursor() as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 2;
        frame.set_cursor(cursor_x, cursor_y);
    }
}

const WIZARD_STEPS: usize = 6;

fn wizard_step_number(step: WizardStep) -> usize {
    match step {
        WizardStep::Kind => 1,
        WizardStep::Id => 2,
        WizardStep::Model => 3,
        WizardStep::MaxSpeed => 4,
        WizardStep::Parameter => 5,
        WizardStep::Fuel => 6,
    }
}

fn edit_prompt(prompt: &mut InputPrompt, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Left => prompt.move_cursor(-1),
        KeyCode::Right => prompt.move_cursor(1),
        KeyCode::Home => prompt.move_home(),
        KeyCode::End => prompt.move_end(),
        KeyCode::Backspace => prompt.backspace(),
        KeyCode::Delete => prompt.delete(),
        KeyCode::Char(ch) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                prompt.insert(ch);
            }
        }
        _ => {}
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    cursor: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let last = total as isize - 1;
        self.cursor = (self.cursor as isize).saturating_add(delta).clamp(0, last) as usize;
    }

    fn clamp_cursor(&mut self, total: usize) {
        if total == 0 {
            self.cursor = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::sample_fleet;
    use tempfile::{tempdir, TempDir};

    fn app() -> (FleetApp, TempDir) {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            fleet_file: dir.path().join("fleet.csv"),
            backup_dir: dir.path().join("backups"),
            log_dir: dir.path().join("logs"),
            seed_sample_fleet: true,
            activity_log_len: 20,
        };
        let store = FleetStore::from_config(&config);
        let fleet = SharedFleet::new(sample_fleet().unwrap());
        (FleetApp::new(config, fleet, store), dir)
    }

    fn press(app: &mut FleetApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn replace_input(app: &mut FleetApp, text: &str) {
        press(app, KeyCode::End);
        for _ in 0..MAX_CLEAR {
            press(app, KeyCode::Backspace);
        }
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    const MAX_CLEAR: usize = 80;

    fn mileage(app: &FleetApp, id: &str) -> f64 {
        app.fleet
            .read(|fleet| fleet.get(id).map(Vehicle::mileage))
            .unwrap()
    }

    #[test]
    fn journey_prompt_moves_every_vehicle() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('j'));
        assert!(app.modal.is_some());
        replace_input(&mut app, "40");
        press(&mut app, KeyCode::Enter);

        assert!(app.modal.is_none());
        assert!((mileage(&app, "C001") - 100.0).abs() < 1e-9);
        assert!(app.state.status.starts_with("Journey of 40 km: 5 done"));
        assert_eq!(app.activity.len(), 1);
    }

    #[test]
    fn invalid_refuel_amount_changes_nothing() {
        let (mut app, _dir) = app();
        let before = app.fleet.snapshot();
        press(&mut app, KeyCode::Char('r'));
        replace_input(&mut app, "-5");
        press(&mut app, KeyCode::Enter);

        assert!(app.state.status.contains("positive"));
        let after = app.fleet.snapshot();
        assert_eq!(before.vehicles(), after.vehicles());
        assert_eq!(app.activity[0].level, ActivityLevel::Error);
    }

    #[test]
    fn escape_cancels_a_prompt() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('j'));
        assert!(app.state.status.starts_with("Fleet burns"));
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert!(!app.state.should_quit);
        assert!((mileage(&app, "C001") - 60.0).abs() < 1e-9);
    }

    #[test]
    fn save_then_load_restores_and_backs_up() {
        let (mut app, dir) = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert!(dir.path().join("fleet.csv").exists());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.fleet.len(), 4);

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.fleet.len(), 5);
        assert_eq!(app.store.backups().unwrap().len(), 1);
    }

    #[test]
    fn loading_a_missing_file_keeps_the_fleet() {
        let (mut app, dir) = app();
        press(&mut app, KeyCode::Char('l'));
        replace_input(&mut app, &dir.path().join("absent.csv").display().to_string());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.fleet.len(), 5);
        assert_eq!(app.activity[0].level, ActivityLevel::Error);
    }

    #[test]
    fn filter_cycles_through_kinds_and_wraps() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, ViewFilter::Search(SearchFilter::Kind(VehicleKind::Car)));
        assert_eq!(app.visible().len(), 1);

        let steps = ViewFilter::order().len() - 1;
        for _ in 0..steps {
            press(&mut app, KeyCode::Char('f'));
        }
        assert_eq!(app.filter, ViewFilter::All);
        assert_eq!(app.visible().len(), 5);
    }

    #[test]
    fn passenger_prompt_requires_a_cabin() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected().map(|v| v.id().to_string()), Some("T001".into()));
        press(&mut app, KeyCode::Char('p'));
        assert!(app.modal.is_none());
        assert!(app.state.status.contains("carries no passengers"));

        press(&mut app, KeyCode::Char('c'));
        replace_input(&mut app, "250");
        press(&mut app, KeyCode::Enter);
        let cargo = app.fleet.read(|fleet| fleet.get("T001").and_then(Vehicle::cargo));
        assert_eq!(cargo, Some((1_750.0, 5_000.0)));
    }

    #[test]
    fn wizard_adds_a_vehicle() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        for value in ["bus", "B777", "Setra", "95", "", "80"] {
            replace_input(&mut app, value);
            press(&mut app, KeyCode::Enter);
        }
        assert!(app.modal.is_none());
        let fuel = app.fleet.read(|fleet| {
            fleet
                .get("B777")
                .and_then(|bus| bus.fuel().map(|tank| tank.fuel_level()))
        });
        assert_eq!(fuel, Some(80.0));
    }

    #[test]
    fn activity_log_is_bounded() {
        let (mut app, _dir) = app();
        for _ in 0..30 {
            press(&mut app, KeyCode::Char('o'));
        }
        assert_eq!(app.activity.len(), 20);
    }
}
