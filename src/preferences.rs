//! Display preferences persisted between runs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the terminal's light/dark setting
    #[default]
    System,
    Light,
    Dark,
    Focus,
    Chill,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::System,
        Theme::Light,
        Theme::Dark,
        Theme::Focus,
        Theme::Chill,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Focus => "focus",
            Theme::Chill => "chill",
        }
    }

    /// The theme actually applied; never `System`
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Theme::System if system_prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            other => other,
        }
    }

    /// Background color associated with the applied theme
    pub fn meta_color(self, system_prefers_dark: bool) -> &'static str {
        match self.resolve(system_prefers_dark) {
            Theme::Dark => "#1a1a1a",
            Theme::Focus => "#000000",
            Theme::Chill => "#1a1625",
            Theme::Light | Theme::System => "#f0f2f5",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == lowered)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown theme {0:?} (expected system, light, dark, focus or chill)")]
pub struct UnknownTheme(pub String);

/// Guess whether the terminal background is dark from a `COLORFGBG` value
/// such as `15;0`. Terminals that don't set it are assumed dark.
pub fn prefers_dark_from_colorfgbg(value: Option<&str>) -> bool {
    let Some(background) = value.and_then(|v| v.rsplit(';').next()) else {
        return true;
    };
    match background.trim().parse::<u8>() {
        Ok(color) => color <= 6 || color == 8,
        Err(_) => true,
    }
}

pub fn system_prefers_dark() -> bool {
    prefers_dark_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid preferences file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

impl Preferences {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(PreferencesError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        let io_error = |source| PreferencesError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_error)
    }
}
