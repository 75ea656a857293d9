//! File-backed fleet persistence: atomic saves, timestamped backups and
//! JSON report export.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    fleet::{Fleet, FleetReport, LoadSummary},
};

/// Prefix of backup file names.
pub const BACKUP_PREFIX: &str = "fleet_";
/// Extension of record files written by the store.
pub const RECORD_EXTENSION: &str = "csv";

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const STAMP_LEN: usize = 14;

/// A backup file found in the backup directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupEntry {
    /// Absolute path to the backup file.
    pub path: PathBuf,
    /// When the backup was taken, decoded from the file name.
    pub created_at: DateTime<Utc>,
}

/// Reads and writes fleets on disk.
#[derive(Debug, Clone)]
pub struct FleetStore {
    backup_dir: PathBuf,
}

impl FleetStore {
    /// Create a store whose backups land in `backup_dir`.
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    /// Store configured from the application settings.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.backup_dir.clone())
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Write `fleet` to `path` through a temporary file in the same directory,
    /// so a crash never leaves a half-written record file behind.
    pub fn save(&self, fleet: &Fleet, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let dir = parent_dir(path);
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        let count = fleet
            .save(BufWriter::new(tmp.as_file_mut()))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tmp.persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        info!(path = %path.display(), count, "fleet file written");
        Ok(count)
    }

    /// Replace the contents of `fleet` with the records in `path`.
    ///
    /// A missing or unreadable file is an error and leaves `fleet` untouched.
    pub fn load(&self, fleet: &mut Fleet, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let summary = fleet
            .load(BufReader::new(file))
            .with_context(|| format!("failed to read {}", path.display()))?;
        for skipped in &summary.skipped {
            warn!(
                path = %path.display(),
                line = skipped.line_number,
                reason = %skipped.reason,
                "record skipped"
            );
        }
        Ok(summary)
    }

    /// Read `path` into a new fleet.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<(Fleet, LoadSummary)> {
        let mut fleet = Fleet::new();
        let summary = self.load(&mut fleet, path)?;
        Ok((fleet, summary))
    }

    /// Write a timestamped copy of `fleet` into the backup directory.
    pub fn backup(&self, fleet: &Fleet) -> Result<BackupEntry> {
        let created_at = Utc::now();
        let stamp = created_at.format(STAMP_FORMAT).to_string();
        let mut path = self
            .backup_dir
            .join(format!("{BACKUP_PREFIX}{stamp}.{RECORD_EXTENSION}"));
        let mut suffix = 1;
        while path.exists() {
            path = self
                .backup_dir
                .join(format!("{BACKUP_PREFIX}{stamp}_{suffix}.{RECORD_EXTENSION}"));
            suffix += 1;
        }
        self.save(fleet, &path)?;
        Ok(BackupEntry {
            path,
            created_at: parse_stamp(&stamp).unwrap_or(created_at),
        })
    }

    /// Backups in the backup directory, newest first.
    pub fn backups(&self) -> Result<Vec<BackupEntry>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let listing = fs::read_dir(&self.backup_dir)
            .with_context(|| format!("failed to read {}", self.backup_dir.display()))?;
        for entry in listing {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let stamp = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(BACKUP_PREFIX))
                .and_then(|rest| rest.get(..STAMP_LEN))
                .and_then(parse_stamp);
            match stamp {
                Some(created_at) => entries.push(BackupEntry { path, created_at }),
                None => warn!("Ignoring unrecognised file in backup directory: {:?}", path),
            }
        }

        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    /// Most recent backup, if any.
    pub fn latest_backup(&self) -> Result<Option<BackupEntry>> {
        Ok(self.backups()?.into_iter().next())
    }

    /// Write `report` as pretty-printed JSON.
    pub fn export_report(&self, report: &FleetReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = parent_dir(path);
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let serialised = serde_json::to_vec_pretty(report)?;
        fs::write(path, serialised).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "report exported");
        Ok(())
    }
}

fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{Car, CargoShip, Vehicle};
    use tempfile::tempdir;

    fn small_fleet() -> Fleet {
        let mut fleet = Fleet::new();
        let mut car = Vehicle::from(Car::new("C001", "Toyota Camry", 180.0, 4).unwrap());
        car.refuel(40.0).unwrap();
        car.move_by(60.0).unwrap();
        fleet.add(car).unwrap();
        fleet
            .add(CargoShip::new("S001", "Maersk", 50.0, true).unwrap())
            .unwrap();
        fleet
    }

    #[test]
    fn save_and_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path().join("backups"));
        let path = dir.path().join("data").join("fleet.csv");

        assert_eq!(store.save(&small_fleet(), &path)?, 2);
        let (loaded, summary) = store.open(&path)?;
        assert_eq!(summary.loaded, 2);
        assert!(summary.skipped.is_empty());
        let car = loaded.get("C001").expect("car restored");
        assert!((car.mileage() - 60.0).abs() < 1e-6);
        assert!(loaded.get("S001").is_some());
        Ok(())
    }

    #[test]
    fn save_replaces_existing_file() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path());
        let path = dir.path().join("fleet.csv");
        fs::write(&path, "stale contents\n")?;

        store.save(&Fleet::new(), &path)?;
        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn missing_file_keeps_fleet() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path());
        let mut fleet = small_fleet();

        let err = store.load(&mut fleet, dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
        assert_eq!(fleet.len(), 2);
        Ok(())
    }

    #[test]
    fn backups_are_listed_newest_first() -> Result<()> {
        let dir = tempdir()?;
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups)?;
        fs::write(backups.join("fleet_20240101120000.csv"), "")?;
        fs::write(backups.join("fleet_20250301080000.csv"), "")?;
        fs::write(backups.join("notes.txt"), "")?;
        fs::write(backups.join("other.csv"), "")?;

        let store = FleetStore::new(&backups);
        let entry = store.backup(&small_fleet())?;
        assert!(entry.path.exists());

        let listed = store.backups()?;
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].path, entry.path);
        assert!(listed[1].path.ends_with("fleet_20250301080000.csv"));
        assert!(listed[2].path.ends_with("fleet_20240101120000.csv"));
        assert_eq!(store.latest_backup()?.map(|e| e.path), Some(entry.path));
        Ok(())
    }

    #[test]
    fn backups_in_same_second_do_not_collide() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path());
        let first = store.backup(&small_fleet())?;
        let second = store.backup(&Fleet::new())?;
        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
        Ok(())
    }

    #[test]
    fn missing_backup_dir_lists_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path().join("never-created"));
        assert!(store.backups()?.is_empty());
        Ok(())
    }

    #[test]
    fn report_is_exported_as_json() -> Result<()> {
        let dir = tempdir()?;
        let store = FleetStore::new(dir.path());
        let path = dir.path().join("reports").join("report.json");

        store.export_report(&small_fleet().generate_report(), &path)?;
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(value["total_vehicles"], 2);
        assert_eq!(value["kind_counts"]["Car"], 1);
        Ok(())
    }
}
