use std::{path::PathBuf, sync::Mutex};

use bill_tracker::BillBook;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use tracker_config::{Config, ConfigManager};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a JSON-backed book and its config manager in an isolated directory.
#[allow(dead_code)]
pub fn setup_test_env() -> (BillBook, ConfigManager, Config) {
    let base = temp_root();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = Config {
        data_root: Some(base.join("data")),
        backup_retention: 3,
        ..Config::default()
    };
    config_manager.save(&config).expect("save config");
    let book = BillBook::open(&config).expect("open bill book");
    (book, config_manager, config)
}
