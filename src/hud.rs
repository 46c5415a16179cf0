//! Read-only HUD projection of the running game

use crate::sim::VehicleMode;

/// Values the HUD displays
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    /// Speed readout (|speed| x 10, rounded)
    pub speed: u32,
    /// Playtime as HH:MM:SS
    pub playtime: String,
    /// Whole currency units
    pub currency: u64,
    pub mode: VehicleMode,
}

impl HudSnapshot {
    pub fn new(speed: f32, playtime_secs: f64, currency: f64, mode: VehicleMode) -> Self {
        Self {
            speed: (speed * 10.0).round().abs() as u32,
            playtime: format_playtime(playtime_secs),
            currency: currency.max(0.0).floor() as u64,
            mode,
        }
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.as_str()
    }
}

/// Format seconds as zero-padded HH:MM:SS (hours are not wrapped)
pub fn format_playtime(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
