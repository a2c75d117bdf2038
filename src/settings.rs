//! Music settings
//!
//! Persisted in LocalStorage as two plain keys so the page markup can read
//! them too. Missing or garbled values fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MUSIC_VOLUME;
use crate::platform::KeyValueStore;

/// Music preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Background music on/off
    pub music_enabled: bool,
    /// Music volume in percent (0 - 100)
    pub music_volume: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            music_volume: DEFAULT_MUSIC_VOLUME,
        }
    }
}

impl Settings {
    /// LocalStorage keys
    const ENABLED_KEY: &'static str = "musicEnabled";
    const VOLUME_KEY: &'static str = "musicVolume";

    /// Volume as an audio element gain (0.0 - 1.0)
    pub fn gain(&self) -> f32 {
        self.music_volume as f32 / 100.0
    }

    /// Parse a volume percent typed into / sent from the slider
    pub fn parse_volume(raw: &str) -> Option<u8> {
        let v: i64 = raw.trim().parse().ok()?;
        Some(v.clamp(0, 100) as u8)
    }

    /// Load settings from the store
    pub fn load(store: &impl KeyValueStore) -> Self {
        let defaults = Self::default();

        // Only an explicit "false" disables music
        let music_enabled = store
            .get(Self::ENABLED_KEY)
            .map(|v| v != "false")
            .unwrap_or(defaults.music_enabled);

        let music_volume = match store.get(Self::VOLUME_KEY) {
            Some(raw) => Self::parse_volume(&raw).unwrap_or_else(|| {
                log::warn!("Ignoring stored music volume {:?}", raw);
                defaults.music_volume
            }),
            None => defaults.music_volume,
        };

        Self {
            music_enabled,
            music_volume,
        }
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut impl KeyValueStore) {
        let enabled = store.set(Self::ENABLED_KEY, if self.music_enabled { "true" } else { "false" });
        let volume = store.set(Self::VOLUME_KEY, &self.music_volume.to_string());
        match enabled.and(volume) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store);
        assert!(settings.music_enabled);
        assert_eq!(settings.music_volume, 40);
        assert!((settings.gain() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_only_false_disables_music() {
        let store = MemoryStore::with_items([("musicEnabled", "false")]);
        assert!(!Settings::load(&store).music_enabled);

        let store = MemoryStore::with_items([("musicEnabled", "0")]);
        assert!(Settings::load(&store).music_enabled);
    }

    #[test]
    fn test_garbled_volume_falls_back() {
        let store = MemoryStore::with_items([("musicVolume", "loud")]);
        assert_eq!(Settings::load(&store).music_volume, 40);

        let store = MemoryStore::with_items([("musicVolume", "250")]);
        assert_eq!(Settings::load(&store).music_volume, 100);
    }

    #[test]
    fn test_save_roundtrip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            music_enabled: false,
            music_volume: 75,
        };
        settings.save(&mut store);
        assert_eq!(store.get("musicEnabled").as_deref(), Some("false"));
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(Settings::parse_volume(" 55 "), Some(55));
        assert_eq!(Settings::parse_volume("-3"), Some(0));
        assert_eq!(Settings::parse_volume("abc"), None);
        assert_eq!(Settings::parse_volume(""), None);
    }
}
