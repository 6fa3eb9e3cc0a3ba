use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(420.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();
                help_row(ui, "⌘Z", "Undo the last add, move or resize");
                help_row(ui, "⌘S", "Save dashboard");
                help_row(ui, "⌘O", "Open dashboard");
                help_row(ui, "F1", "Show this window");

                ui.add_space(10.0);
                ui.label("Add widget dialog");
                help_row(ui, "↑ / ↓", "Move selection");
                help_row(ui, "Enter", "Add selected widget");
                help_row(ui, "Escape", "Close");

                ui.add_space(20.0);
                ui.heading("Editing the Grid");
                ui.separator();
                ui.label("• The grid has 12 columns; rows grow as widgets are added");
                ui.label("• Drag a widget to move it, drag its corner handle to resize");
                ui.label(
                    "• A red outline means the drop would overlap another widget; \
                     releasing there restores the widget",
                );
                ui.label("• New widgets take the first free 4×2 slot, scanning rows top to bottom");
                ui.label("• Up to 10 steps can be undone; removing a widget is not recorded");

                ui.add_space(20.0);
                ui.heading("Files");
                ui.separator();
                ui.label("Paths and grid metrics are read from settings.toml:");
                ui.add_space(5.0);
                ui.code(r#"dashboard_path = "dashboard.json"
catalog_path = "widgets.json"
data_path = "kpi-data.json"
row_height = 55.0
margin = [10.0, 10.0]
notice_seconds = 3.0
show_grid_lines = true"#);
                ui.add_space(5.0);
                ui.label("• Dashboards are saved as JSON with a name and a layout");
                ui.label("• Use File → Reload widgets and data after editing the catalog or feed");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized([90.0, 16.0], egui::Label::new(
            egui::RichText::new(shortcut).monospace().strong()
        ));
        ui.label(description);
    });
}
