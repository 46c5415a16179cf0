//! Display settings and preferences
//!
//! Persisted as one JSON document, separately from progression.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, write_best_effort};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Segments used to approximate circles and ellipses
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 10,
            QualityPreset::Medium => 20,
            QualityPreset::High => 40,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Background grid lines
    pub show_grid: bool,
    /// Vehicle drop shadow
    pub shadows: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            show_grid: true,
            shadows: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "skydrive_settings";

    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops the extra geometry
        if preset == QualityPreset::Low {
            self.show_grid = false;
            self.shadows = false;
        }
    }

    pub fn load(storage: &impl KeyValueStore) -> Self {
        if let Some(json) = storage.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Unreadable settings, using defaults: {}", e),
            }
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &mut impl KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            write_best_effort(storage, Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_low_preset_disables_extras() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert!(!s.show_grid);
        assert!(!s.shadows);
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut s = Settings::default();
        s.show_fps = true;
        s.save(&mut store);
        assert_eq!(Settings::load(&store), s);
    }

    #[test]
    fn test_partial_and_corrupt_documents() {
        let store = MemoryStore::with_values([(Settings::STORAGE_KEY, r#"{"show_fps": true}"#)]);
        let s = Settings::load(&store);
        assert!(s.show_fps && s.show_grid);

        let store = MemoryStore::with_values([(Settings::STORAGE_KEY, "{{{")]);
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
