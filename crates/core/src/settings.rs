//! Loading and saving [`WidgetConfig`].

use std::fmt::{self, Display};
use std::io::{self, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use crate::config::WidgetConfig;

/// The file name used for settings when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "chat_widget_settings.json";

/// Error returned by a [`SettingsStore`].
#[derive(Debug)]
pub enum SettingsError {
    /// The settings could not be read or written.
    Io(io::Error),
    /// The stored settings are not valid.
    Format(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "settings I/O error: {err}"),
            SettingsError::Format(err) => {
                write!(f, "malformed settings: {err}")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Format(err) => Some(err),
        }
    }
}

impl From<io::Error> for SettingsError {
    #[inline]
    fn from(err: io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Format(err)
    }
}

/// A place where widget settings are kept between sessions.
pub trait SettingsStore {
    /// Loads the saved settings, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<WidgetConfig>, SettingsError>;

    /// Saves the settings, replacing what was saved before.
    fn save(&self, config: &WidgetConfig) -> Result<(), SettingsError>;

    /// Loads the saved settings, falling back to the defaults.
    fn load_or_default(&self) -> Result<WidgetConfig, SettingsError> {
        Ok(self.load()?.unwrap_or_default())
    }
}

/// Settings stored as a JSON file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    /// Uses the file at `path`.
    #[inline]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the settings file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSettings {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}

impl SettingsStore for JsonFileSettings {
    fn load(&self) -> Result<Option<WidgetConfig>, SettingsError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                debug!("no settings at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, config: &WidgetConfig) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(config)?;
        std::fs::write(&self.path, data)?;
        debug!("saved settings to {}", self.path.display());
        Ok(())
    }
}
