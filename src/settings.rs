//! User-editable report settings.
//!
//! The settings file lists, one per line, the field keys that filtered
//! reports should include. Lines starting with `#` are comments and blank
//! lines are ignored. Keys are not checked against a schema: anything that
//! looks like a key is kept, in file order.

use crate::core::record::Record;
use crate::sensor::SensorField;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// System snapshot keys written to the default settings file.
pub const DEFAULT_SYSTEM_KEYS: [&str; 3] = ["os", "cpu_core_count", "memory_total_bytes"];

/// Load snapshot keys written to the default settings file.
pub const DEFAULT_LOAD_KEYS: [&str; 2] = ["cpu_usage_percent", "memory_usage_percent"];

/// Ordered set of enabled field keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    keys: Vec<String>,
}

impl Settings {
    /// Build from keys, dropping duplicates but keeping first-seen order.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut settings = Self::default();
        for key in keys {
            settings.push(key.into());
        }
        settings
    }

    /// Parse settings file content.
    ///
    /// Malformed lines are skipped with a warning.
    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();

        for (index, raw) in content.lines().enumerate() {
            match parse_line(raw) {
                Line::Skip => {}
                Line::Key(key) => settings.push(key),
                Line::Disabled => {}
                Line::Malformed => {
                    warn!(line = index + 1, content = raw.trim(), "Skipping malformed settings line");
                }
            }
        }

        settings
    }

    fn push(&mut self, key: String) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    /// Enabled keys in file order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// True when no key is enabled, which means "report everything".
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of enabled keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check whether `key` is enabled.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Project `data` onto these settings.
    pub fn apply(&self, data: &Record) -> Record {
        filter_and_order(data, &self.keys)
    }
}

enum Line {
    Skip,
    Key(String),
    Disabled,
    Malformed,
}

fn parse_line(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Line::Skip;
    }

    // Earlier revisions of the file used `key=true|false`.
    if let Some((key, value)) = line.split_once('=') {
        let key = key.trim();
        if !is_key(key) {
            return Line::Malformed;
        }
        return match value.trim().to_lowercase().as_str() {
            "true" => Line::Key(key.to_string()),
            "false" => Line::Disabled,
            _ => Line::Malformed,
        };
    }

    if is_key(line) {
        Line::Key(line.to_string())
    } else {
        Line::Malformed
    }
}

fn is_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Keep only the keys present in both `data` and `keys`, in `keys` order.
///
/// An empty key list means "no filter": all of `data` is returned in its
/// own order.
pub fn filter_and_order(data: &Record, keys: &[String]) -> Record {
    if keys.is_empty() {
        return data.clone();
    }

    let mut out = Record::new();
    for key in keys {
        if let Some(value) = data.get(key) {
            out.insert(key.as_str(), value.clone());
        }
    }
    out
}

/// Contents of a freshly created settings file.
pub fn default_template() -> String {
    let mut out = String::new();
    out.push_str("# Mission computer report settings\n");
    out.push_str("# One field key per line. Remove or comment out a key to hide it.\n");
    out.push_str("# An empty file (no keys) shows every field.\n");
    out.push('\n');

    out.push_str("# Environment sensor\n");
    for field in SensorField::ALL {
        out.push_str(field.key());
        out.push('\n');
    }
    out.push('\n');

    out.push_str("# System information\n");
    for key in DEFAULT_SYSTEM_KEYS {
        out.push_str(key);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("# System load\n");
    for key in DEFAULT_LOAD_KEYS {
        out.push_str(key);
        out.push('\n');
    }
    out
}

/// Settings errors.
#[derive(Debug)]
pub enum SettingsError {
    IoError(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Loads the settings file, creating a default one when it is missing.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store for the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file.
    ///
    /// A missing file is replaced by the default template, but the empty
    /// set is returned for this call: the new file only takes effect on the
    /// next load. Any other read failure is reported and also yields the
    /// empty set.
    pub fn load(&self) -> Settings {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Settings::parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                match self.write_default() {
                    Ok(()) => info!(
                        path = %self.path.display(),
                        "Settings file not found, created default"
                    ),
                    Err(e) => warn!("Could not create default settings file: {e}"),
                }
                Settings::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Could not read settings file: {e}");
                Settings::default()
            }
        }
    }

    /// Write the default template, creating the parent directory if needed.
    pub fn write_default(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::IoError(e.to_string()))?;
            }
        }
        std::fs::write(&self.path, default_template())
            .map_err(|e| SettingsError::IoError(e.to_string()))
    }
}
