use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use deck_editor::{write_atomic, EditorOptions, PersistError, Size, Viewport};
use deck_logging::{deck_info, deck_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_SETTINGS_FILENAME: &str = "deck.ron";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// User-tunable editor and app settings, stored as RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub grid_size: f64,
    pub constrain_to_slide: bool,
    pub slide_width: f64,
    pub slide_height: f64,
    pub guide_threshold: f64,
    pub log_destination: LogDestination,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let options = EditorOptions::default();
        Self {
            grid_size: options.grid_size,
            constrain_to_slide: options.constrain_to_slide,
            slide_width: 1280.0,
            slide_height: 720.0,
            guide_threshold: options.guide_threshold,
            log_destination: LogDestination::default(),
        }
    }
}

impl EditorSettings {
    pub fn slide_size(&self) -> Size {
        Size::new(self.slide_width, self.slide_height)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            grid_size: self.grid_size,
            constrain_to_slide: self.constrain_to_slide,
            guide_threshold: self.guide_threshold,
            viewport: Viewport {
                width: self.slide_width,
                height: self.slide_height,
                scroll_left: 0.0,
                scroll_top: 0.0,
            },
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };
        positive("grid_size", self.grid_size)?;
        positive("slide_width", self.slide_width)?;
        positive("slide_height", self.slide_height)?;
        if !self.guide_threshold.is_finite() || self.guide_threshold < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "guide_threshold must not be negative, got {}",
                self.guide_threshold
            )));
        }
        Ok(())
    }
}

/// Load/save boundary for [`EditorSettings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the settings file; a missing file yields the defaults.
    pub fn load(&self) -> Result<EditorSettings, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                deck_info!("no settings at {:?}; using defaults", self.path);
                return Ok(EditorSettings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let settings: EditorSettings =
            ron::from_str(&content).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;
        settings.validate()?;
        deck_info!("loaded settings from {:?}", self.path);
        Ok(settings)
    }

    /// Like [`load`](Self::load), but falls back to defaults on any error.
    pub fn load_or_default(&self) -> EditorSettings {
        self.load().unwrap_or_else(|err| {
            deck_warn!("{err}; using default settings");
            EditorSettings::default()
        })
    }

    pub fn save(&self, settings: &EditorSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(settings, pretty)?;
        write_atomic(&self.path, &content)?;
        deck_info!("saved settings to {:?}", self.path);
        Ok(())
    }
}
