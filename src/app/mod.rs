use crate::catalog::{Catalog, DataFeed};
use crate::grid::GridProjector;
use crate::session::EditorSession;
use eframe::egui;

mod actions;
mod help;
mod picker;
mod render;
mod settings;
mod update;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoticeTone {
    Info,
    Error,
}

/// Status line message that disappears on its own.
#[derive(Clone, Debug)]
struct Notice {
    text: String,
    tone: NoticeTone,
    expires_at: f64,
}

pub struct EditorApp {
    session: EditorSession,
    catalog: Catalog,
    data: DataFeed,
    doc: actions::DashboardDoc,
    dashboard_path: String,
    catalog_path: String,
    data_path: String,
    settings_path: String,
    row_height: f32,
    margin: egui::Vec2,
    notice_seconds: f64,
    show_grid_lines: bool,
    notice: Option<Notice>,
    pending_notice: Option<(String, NoticeTone)>,
    picker: picker::WidgetPicker,
    show_help: bool,
}

impl EditorApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home).join(".config").join("gridboard.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("settings.toml").exists() {
            return Some("settings.toml".to_string());
        }
        None
    }

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "settings.toml".to_string());
        let settings = settings::load_settings(&settings_path)
            .or_else(|| settings::load_settings("settings.json"))
            .unwrap_or_default()
            .validated();

        let projector =
            GridProjector::with_metrics(0.0, settings.row_height, settings.margin_vec());
        let mut app = Self {
            session: EditorSession::new(projector),
            catalog: Catalog::default(),
            data: DataFeed::new(),
            doc: actions::DashboardDoc::untitled(),
            dashboard_path: settings.dashboard_path.clone(),
            catalog_path: settings.catalog_path.clone(),
            data_path: settings.data_path.clone(),
            settings_path,
            row_height: settings.row_height,
            margin: settings.margin_vec(),
            notice_seconds: settings.notice_seconds,
            show_grid_lines: settings.show_grid_lines,
            notice: None,
            pending_notice: None,
            picker: picker::WidgetPicker::default(),
            show_help: false,
        };
        app.reload_sources();
        app.start_new_dashboard();
        if std::path::Path::new(&app.dashboard_path).exists() {
            let path = app.dashboard_path.clone();
            app.open_dashboard(&path);
        }
        app
    }
}
