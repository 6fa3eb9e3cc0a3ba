use crate::catalog::{Catalog, DataFeed};
use crate::error::{EditorError, Result};
use crate::interaction::GestureOutcome;
use crate::model::{self, WidgetId};
use std::path::Path;

use super::settings;
use super::{EditorApp, NoticeTone};

pub(super) const DEFAULT_DASHBOARD_NAME: &str = "Untitled dashboard";

pub(super) fn read_dashboard(path: impl AsRef<Path>) -> Result<model::Dashboard> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub(super) fn write_dashboard(
    path: impl AsRef<Path>,
    dashboard: &model::Dashboard,
) -> Result<()> {
    if dashboard.name.trim().is_empty() {
        return Err(EditorError::NameRequired);
    }
    let json = serde_json::to_string_pretty(dashboard)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub(super) fn read_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub(super) fn read_data_feed(path: impl AsRef<Path>) -> Result<DataFeed> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// The dashboard being edited plus its editing flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct DashboardDoc {
    pub dashboard: model::Dashboard,
    /// The name is still the generated default and has not been touched.
    pub name_pristine: bool,
    pub dirty: bool,
}

impl DashboardDoc {
    pub fn untitled() -> Self {
        Self {
            dashboard: model::Dashboard {
                name: DEFAULT_DASHBOARD_NAME.to_string(),
                ..model::Dashboard::default()
            },
            name_pristine: true,
            dirty: false,
        }
    }

    pub fn opened(dashboard: model::Dashboard) -> Self {
        Self {
            dashboard,
            name_pristine: false,
            dirty: false,
        }
    }

    /// A pristine default name is cleared the first time the field gets focus.
    pub fn focus_name(&mut self) {
        if self.name_pristine {
            self.dashboard.name.clear();
            self.name_pristine = false;
        }
    }

    pub fn name_edited(&mut self) {
        self.name_pristine = false;
        self.dirty = true;
    }

    pub fn layout_changed(&mut self, layout: model::Layout) {
        self.dashboard.layout = layout;
        self.dirty = true;
    }
}

/// Status line message for a finished gesture, if it needs one.
pub(super) fn gesture_notice(
    outcome: Option<&GestureOutcome>,
) -> Option<(&'static str, NoticeTone)> {
    match outcome {
        Some(GestureOutcome::RolledBack { .. }) => {
            Some(("Operation invalid: widgets cannot overlap", NoticeTone::Error))
        }
        _ => None,
    }
}

impl EditorApp {
    pub(super) fn set_notice(&mut self, text: impl Into<String>, tone: NoticeTone) {
        self.pending_notice = Some((text.into(), tone));
    }

    /// Reads the widget catalog and data feed. Either may be missing; the
    /// grid then shows placeholders.
    pub(super) fn reload_sources(&mut self) {
        match read_catalog(&self.catalog_path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %self.catalog_path,
                    widgets = catalog.len(),
                    "catalog loaded"
                );
                self.catalog = catalog;
            }
            Err(e) => {
                tracing::warn!(path = %self.catalog_path, "catalog not loaded: {e}");
                self.set_notice(format!("Widget catalog not loaded: {e}"), NoticeTone::Error);
            }
        }
        match read_data_feed(&self.data_path) {
            Ok(data) => {
                tracing::info!(path = %self.data_path, entries = data.len(), "data feed loaded");
                self.data = data;
            }
            Err(e) => {
                tracing::warn!(path = %self.data_path, "data feed not loaded: {e}");
            }
        }
    }

    pub(super) fn start_new_dashboard(&mut self) {
        self.doc = DashboardDoc::untitled();
        if let Err(e) = self.session.load(model::Layout::default()) {
            tracing::warn!("resetting layout failed: {e}");
        }
    }

    pub(super) fn open_dashboard(&mut self, path: &str) {
        let loaded = read_dashboard(path).and_then(|mut dashboard| {
            let layout = std::mem::take(&mut dashboard.layout);
            self.session.load(layout)?;
            dashboard.layout = self.session.layout().clone();
            Ok(dashboard)
        });
        match loaded {
            Ok(dashboard) => {
                self.doc = DashboardDoc::opened(dashboard);
                self.dashboard_path = path.to_string();
                if self.session.layout().is_empty() {
                    self.set_notice(format!("Loaded {path} (no widgets yet)"), NoticeTone::Info);
                } else {
                    self.set_notice(format!("Loaded {path}"), NoticeTone::Info);
                }
            }
            Err(e) => {
                tracing::warn!(path, "dashboard not loaded: {e}");
                self.set_notice(format!("Open failed: {e}"), NoticeTone::Error);
            }
        }
    }

    pub(super) fn open_dashboard_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.open_dashboard(&path.display().to_string());
        }
    }

    pub(super) fn save_dashboard_to(&mut self, path: &str) {
        self.doc.dashboard.layout = self.session.layout().clone();
        match write_dashboard(path, &self.doc.dashboard) {
            Ok(()) => {
                tracing::info!(path, items = self.doc.dashboard.layout.len(), "dashboard saved");
                self.dashboard_path = path.to_string();
                self.doc.dirty = false;
                self.set_notice(format!("Saved {}", self.doc.dashboard.name), NoticeTone::Info);
            }
            Err(e) => {
                tracing::warn!(path, "save failed: {e}");
                self.set_notice(format!("Save failed: {e}"), NoticeTone::Error);
            }
        }
    }

    pub(super) fn save_dashboard(&mut self) {
        let path = self.dashboard_path.clone();
        self.save_dashboard_to(&path);
    }

    pub(super) fn save_dashboard_dialog(&mut self) {
        let default_name = format!("{}.json", self.doc.dashboard.name.trim());
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.save_dashboard_to(&path.display().to_string());
        }
    }

    pub(super) fn add_widget(&mut self, id: WidgetId) {
        match self.session.add_widget(id.clone()) {
            Ok(item) => {
                let name = self
                    .catalog
                    .get(&id)
                    .map_or_else(|| id.to_string(), |w| w.name.clone());
                self.set_notice(
                    format!("Added {name} at column {}, row {}", item.x + 1, item.y + 1),
                    NoticeTone::Info,
                );
            }
            Err(e) => self.set_notice(format!("Cannot add widget: {e}"), NoticeTone::Error),
        }
    }

    pub(super) fn remove_widget(&mut self, id: &WidgetId) {
        self.session.remove_widget(id);
    }

    pub(super) fn undo(&mut self) {
        self.session.undo();
    }

    pub(super) fn finish_gesture(&mut self, outcome: Option<GestureOutcome>) {
        if let Some((text, tone)) = gesture_notice(outcome.as_ref()) {
            self.set_notice(text, tone);
        }
    }

    /// Picks up committed layout changes from the session.
    pub(super) fn apply_changes(&mut self) {
        for change in self.session.drain_changes() {
            tracing::debug!(kind = ?change.kind, items = change.layout.len(), "layout changed");
            self.doc.layout_changed(change.layout);
        }
    }

    pub(super) fn settings_snapshot(&self) -> settings::AppSettings {
        settings::AppSettings {
            dashboard_path: self.dashboard_path.clone(),
            catalog_path: self.catalog_path.clone(),
            data_path: self.data_path.clone(),
            row_height: self.row_height,
            margin: [self.margin.x, self.margin.y],
            notice_seconds: self.notice_seconds,
            show_grid_lines: self.show_grid_lines,
        }
    }

    pub(super) fn persist_settings(&mut self) {
        let snapshot = self.settings_snapshot();
        if let Err(e) = settings::save_settings(&self.settings_path, &snapshot) {
            self.set_notice(format!("Settings save failed: {e}"), NoticeTone::Error);
        }
    }
}
