use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::store::KeyValueStore;

const PREFERENCES_KEY: &str = "preferences";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub sound_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Hacker,
    NeonLight,
    Matrix,
    Vaporwave,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Hacker, Theme::NeonLight, Theme::Matrix, Theme::Vaporwave];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Hacker => "hacker",
            Theme::NeonLight => "neon-light",
            Theme::Matrix => "matrix",
            Theme::Vaporwave => "vaporwave",
        }
    }

    /// Next theme in display order, wrapping to the first.
    pub fn cycle(self) -> Theme {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme: {s}"))
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Hacker,
            sound_enabled: false,
        }
    }
}

pub struct SettingsService;

impl SettingsService {
    pub async fn load(store: &dyn KeyValueStore) -> Preferences {
        match store.get(PREFERENCES_KEY).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Stored preferences are unreadable, using defaults: {}", e);
                Preferences::default()
            }),
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!("Failed to read preferences: {}", e);
                Preferences::default()
            }
        }
    }

    pub async fn save(store: &dyn KeyValueStore, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string(prefs)?;
        store.set(PREFERENCES_KEY, &json).await
    }

    pub async fn set_theme(store: &dyn KeyValueStore, theme: Theme) -> Result<Preferences> {
        let mut prefs = Self::load(store).await;
        prefs.theme = theme;
        Self::save(store, &prefs).await?;
        Ok(prefs)
    }

    pub async fn cycle_theme(store: &dyn KeyValueStore) -> Result<Preferences> {
        let current = Self::load(store).await.theme;
        Self::set_theme(store, current.cycle()).await
    }

    pub async fn set_sound_enabled(store: &dyn KeyValueStore, enabled: bool) -> Result<Preferences> {
        let mut prefs = Self::load(store).await;
        prefs.sound_enabled = enabled;
        Self::save(store, &prefs).await?;
        Ok(prefs)
    }
}
