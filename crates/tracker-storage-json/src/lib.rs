//! tracker-storage-json
//!
//! Filesystem-backed JSON persistence for the bill collection and the
//! remembered session.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use tracker_core::{
    session_service::SessionStore,
    storage::{bill_warnings, BillStore},
    CoreError,
};
use tracker_domain::{Bill, User};

pub const SCHEMA_VERSION: u32 = 1;
const EXTENSION: &str = "json";
const BILLS_FILE: &str = "bills.json";
const SESSION_FILE: &str = "session.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "bills";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct BillDocument {
    schema_version: u32,
    #[serde(default)]
    bills: Vec<Bill>,
}

/// Describes a persisted backup of the bill document.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Distinguishes backups taken within the same second.
    pub sequence: u32,
    pub path: PathBuf,
}

/// Stores every bill in a single JSON document, backing up the previous
/// document before each write.
#[derive(Debug, Clone)]
pub struct JsonBillStore {
    bills_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonBillStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = root.join(BACKUP_DIR);
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            bills_path: root.join(BILLS_FILE),
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn bills_path(&self) -> &Path {
        &self.bills_path
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let stamp = parse_backup_stamp(file_name);
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: stamp.map(|(created_at, _)| created_at),
                    sequence: stamp.map(|(_, sequence)| sequence).unwrap_or(0),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.sequence)));
        Ok(entries)
    }

    /// Replaces the live document with the named backup and returns its bills.
    pub fn restore_backup(&self, backup_id: &str) -> Result<Vec<Bill>, CoreError> {
        let is_plain_name = Path::new(backup_id).file_name().and_then(|name| name.to_str())
            == Some(backup_id);
        let path = self.backups_dir.join(backup_id);
        if !is_plain_name || !path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup_id
            )));
        }
        let document = read_document(&path)?;
        self.write_document(&document.bills)?;
        Ok(document.bills)
    }

    fn load_bills(&self) -> Result<Vec<Bill>, CoreError> {
        if !self.bills_path.exists() {
            return Ok(Vec::new());
        }
        let document = read_document(&self.bills_path)?;
        if document.schema_version > SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "unsupported schema version {} (expected <= {})",
                document.schema_version, SCHEMA_VERSION
            )));
        }
        for bill in &document.bills {
            for warning in bill_warnings(bill) {
                warn!(%warning, "stored bill failed invariant check");
            }
        }
        Ok(document.bills)
    }

    fn write_document(&self, bills: &[Bill]) -> Result<(), CoreError> {
        self.backup_existing_file()?;
        let document = BillDocument {
            schema_version: SCHEMA_VERSION,
            bills: bills.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.bills_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.bills_path)?;
        Ok(())
    }

    fn backup_existing_file(&self) -> Result<(), CoreError> {
        if !self.bills_path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut target = self
            .backups_dir
            .join(format!("{}_{}.{}", BACKUP_PREFIX, timestamp, EXTENSION));
        let mut sequence = 0;
        while target.exists() {
            sequence += 1;
            target = self.backups_dir.join(format!(
                "{}_{}_{}.{}",
                BACKUP_PREFIX, timestamp, sequence, EXTENSION
            ));
        }
        fs::copy(&self.bills_path, target)?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl BillStore for JsonBillStore {
    fn list(&self) -> Result<Vec<Bill>, CoreError> {
        self.load_bills()
    }

    fn add(&self, bill: &Bill) -> Result<(), CoreError> {
        let mut bills = self.load_bills()?;
        if bills.iter().any(|stored| stored.id == bill.id) {
            return Err(CoreError::DuplicateBill(bill.id));
        }
        bills.push(bill.clone());
        self.write_document(&bills)
    }

    fn update(&self, bill: &Bill) -> Result<(), CoreError> {
        let mut bills = self.load_bills()?;
        let slot = bills
            .iter_mut()
            .find(|stored| stored.id == bill.id)
            .ok_or(CoreError::BillNotFound(bill.id))?;
        *slot = bill.clone();
        self.write_document(&bills)
    }

    fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        let mut bills = self.load_bills()?;
        let before = bills.len();
        bills.retain(|bill| bill.id != id);
        if bills.len() == before {
            return Ok(());
        }
        self.write_document(&bills)
    }
}

/// Remembers the signed-in user in a small JSON file.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(SESSION_FILE),
        }
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Option<User>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|err| CoreError::Serde(err.to_string()))
    }

    fn save(&self, user: &User) -> Result<(), CoreError> {
        let json =
            serde_json::to_string_pretty(user).map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<BillDocument, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Reads `bills_<date>_<time>[_<sequence>].json` into its timestamp and sequence.
fn parse_backup_stamp(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", EXTENSION))?;
    let mut segments = trimmed.strip_prefix(BACKUP_PREFIX)?.split('_').skip(1);
    let date = segments.next()?;
    let time = segments.next()?;
    let sequence = match segments.next() {
        Some(raw) if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) => {
            raw.parse().ok()?
        }
        Some(_) => return None,
        None => 0,
    };
    if segments.next().is_some() || !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    let raw = format!("{}{}", date, time);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| (DateTime::from_naive_utc_and_offset(naive, Utc), sequence))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
