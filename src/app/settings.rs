use crate::error::Result;
use crate::grid::{MARGIN, ROW_HEIGHT};
use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    pub dashboard_path: String,
    pub catalog_path: String,
    pub data_path: String,
    pub row_height: f32,
    pub margin: [f32; 2],
    pub notice_seconds: f64,
    pub show_grid_lines: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dashboard_path: "dashboard.json".to_string(),
            catalog_path: "widgets.json".to_string(),
            data_path: "kpi-data.json".to_string(),
            row_height: ROW_HEIGHT,
            margin: [MARGIN.x, MARGIN.y],
            notice_seconds: 3.0,
            show_grid_lines: true,
        }
    }
}

impl AppSettings {
    pub fn margin_vec(&self) -> egui::Vec2 {
        egui::vec2(self.margin[0], self.margin[1])
    }

    /// Replaces out-of-range grid metrics with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            tracing::warn!(row_height = self.row_height, "invalid row_height, using default");
            self.row_height = defaults.row_height;
        }
        if self.margin.iter().any(|m| !m.is_finite() || *m < 0.0) {
            tracing::warn!(margin = ?self.margin, "invalid margin, using default");
            self.margin = defaults.margin;
        }
        if !(self.notice_seconds.is_finite() && self.notice_seconds > 0.0) {
            tracing::warn!(
                notice_seconds = self.notice_seconds,
                "invalid notice_seconds, using default"
            );
            self.notice_seconds = defaults.notice_seconds;
        }
        self
    }
}

fn parse_settings(path: &str, s: &str) -> Result<AppSettings> {
    if path.ends_with(".toml") {
        match toml::from_str::<AppSettings>(s) {
            Ok(settings) => Ok(settings),
            Err(e) => serde_json::from_str(s).map_err(|_| e.into()),
        }
    } else {
        match serde_json::from_str::<AppSettings>(s) {
            Ok(settings) => Ok(settings),
            Err(e) => toml::from_str(s).map_err(|_| e.into()),
        }
    }
}

pub(super) fn load_settings(path: &str) -> Option<AppSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    match parse_settings(path, &s) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path, "settings not loaded: {e}");
            None
        }
    }
}

pub(super) fn save_settings(path: &str, settings: &AppSettings) -> Result<()> {
    if path.ends_with(".toml") {
        let toml = toml::to_string_pretty(settings)?;
        std::fs::write(path, toml)?;
    } else {
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(path, json)?;
    }
    Ok(())
}
