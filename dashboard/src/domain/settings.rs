//! Persisted display settings.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::persisted::{load_state, save_state};
use super::ports::KeyValueStore;

/// Storage key for persisted settings.
pub const SETTINGS_KEY: &str = "settings-storage";

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Theme`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("theme must be 'light' or 'dark', got '{0}'")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseThemeError(value.to_owned())),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsState {
    #[serde(default)]
    theme: Theme,
}

/// Theme preference restored on start and persisted on every change.
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    theme: Mutex<Theme>,
}

impl SettingsStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let theme = load_state::<SettingsState>(store.as_ref(), SETTINGS_KEY)
            .unwrap_or_default()
            .theme;
        Self {
            store,
            theme: Mutex::new(theme),
        }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_theme(&self, theme: Theme) -> Theme {
        self.update(|_| theme)
    }

    pub fn toggle_theme(&self) -> Theme {
        self.update(Theme::toggled)
    }

    fn update(&self, transition: impl FnOnce(Theme) -> Theme) -> Theme {
        let mut current = self.theme.lock().unwrap_or_else(PoisonError::into_inner);
        *current = transition(*current);
        save_state(
            self.store.as_ref(),
            SETTINGS_KEY,
            &SettingsState { theme: *current },
        );
        info!(theme = %*current, "theme changed");
        *current
    }
}
