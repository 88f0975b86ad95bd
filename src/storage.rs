use crate::datekey::{format_date_key, parse_date_key};
use crate::errors::AppError;
use crate::models::GamificationLedger;
use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{error, warn};

pub const POINTS_KEY: &str = "points";
pub const STREAK_KEY: &str = "streak";
pub const LAST_CHECKIN_KEY: &str = "lastCheckinDate";
pub const ACHIEVEMENTS_SHOWN_KEY: &str = "achievementsShown";

/// String-valued persistent key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Key-value store kept in memory and flushed to a JSON file on `persist`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub async fn load(path: &Path) -> Self {
        let values = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn persist(&self) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(&self.values).map_err(AppError::internal)?;
        fs::write(&self.path, payload).await.map_err(AppError::internal)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

pub fn resolve_data_path() -> PathBuf {
    match env::var("APP_DATA_PATH") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from("data/state.json"),
    }
}

/// Reads the ledger scalars. Missing or corrupt values fall back to the
/// pristine defaults.
pub fn load_ledger(store: &impl KeyValueStore) -> GamificationLedger {
    GamificationLedger {
        points: read_number(store, POINTS_KEY),
        streak: read_number(store, STREAK_KEY),
        last_checkin_date: store.get(LAST_CHECKIN_KEY).and_then(|raw| {
            let parsed = parse_date_key(&raw);
            if parsed.is_none() && !raw.is_empty() {
                warn!("ignoring malformed {LAST_CHECKIN_KEY} value {raw:?}");
            }
            parsed
        }),
    }
}

/// Writes the ledger back. An absent date leaves any stored date untouched.
pub fn save_ledger(store: &mut impl KeyValueStore, ledger: &GamificationLedger) {
    store.set(POINTS_KEY, ledger.points.to_string());
    store.set(STREAK_KEY, ledger.streak.to_string());
    if let Some(date) = ledger.last_checkin_date {
        store.set(LAST_CHECKIN_KEY, format_date_key(date));
    }
}

fn read_number<T>(store: &impl KeyValueStore, key: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            // Whole numbers written in float form ("12.0") still count.
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
                    format!("{value:.0}").parse::<T>().unwrap_or_default()
                }
                _ => {
                    warn!("ignoring malformed {key} value {raw:?}");
                    T::default()
                }
            }
        }
    }
}
