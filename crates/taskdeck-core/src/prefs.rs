use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use taskdeck_client::PreferenceStore;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

pub const PREFS_FILE_NAME: &str = "prefs.json";

/// Preferences kept as one JSON object in the data directory.
#[derive(Debug, Clone)]
pub struct PreferenceFile {
    pub path: PathBuf,
}

impl PreferenceFile {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        let path = data_dir.join(PREFS_FILE_NAME);
        info!(prefs = %path.display(), "opened preference file");
        Ok(Self { path })
    }

    /// A missing file is empty; an unreadable or corrupt one is logged and
    /// treated as empty too.
    pub fn entries(&self) -> BTreeMap<String, String> {
        match load_entries(&self.path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(file = %self.path.display(), error = %format!("{err:#}"), "ignoring unreadable preference file");
                BTreeMap::new()
            }
        }
    }

    #[tracing::instrument(skip(self, value))]
    pub fn write_entry(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries();
        if entries.get(key).map(String::as_str) == Some(value) {
            debug!(key, "preference unchanged");
            return Ok(());
        }
        entries.insert(key.to_string(), value.to_string());
        save_entries_atomic(&self.path, &entries)
            .with_context(|| format!("failed to save {PREFS_FILE_NAME}"))
    }
}

impl PreferenceStore for PreferenceFile {
    fn load(&self, key: &str) -> Option<String> {
        self.entries().remove(key)
    }

    fn store(&self, key: &str, value: &str) {
        if let Err(err) = self.write_entry(key, value) {
            error!(key, error = %format!("{err:#}"), "failed to persist preference");
        }
    }
}

#[tracing::instrument(skip(path))]
fn load_entries(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    debug!(file = %path.display(), "loading preferences");
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

#[tracing::instrument(skip(path, entries))]
fn save_entries_atomic(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = entries.len(), "saving preferences atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, entries)?;
    writeln!(temp)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
