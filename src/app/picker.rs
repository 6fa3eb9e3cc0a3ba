use crate::catalog::{self, Catalog, ContextFilter, WidgetQuery};
use crate::model::{Layout, WidgetId};
use eframe::egui;

/// Add-widget dialog: catalog entries not yet on the dashboard, narrowed by
/// keyword and supported context.
#[derive(Default)]
pub(super) struct WidgetPicker {
    pub open: bool,
    pub query: WidgetQuery,
    pub selected: usize,
    request_focus: bool,
}

impl WidgetPicker {
    pub fn open(&mut self) {
        self.open = true;
        self.selected = 0;
        self.request_focus = true;
    }

    /// Closing also resets the search so the next open starts clean.
    pub fn close(&mut self) {
        self.open = false;
        self.query = WidgetQuery::default();
        self.selected = 0;
        self.request_focus = false;
    }

    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        catalog: &Catalog,
        layout: &Layout,
    ) -> Option<WidgetId> {
        if !self.open {
            return None;
        }
        let available = catalog::available_widgets(catalog, layout);
        let contexts = catalog::context_options(&available);
        if let ContextFilter::Only(ctx_name) = &self.query.context {
            if !contexts.contains(ctx_name) {
                self.query.context = ContextFilter::All;
            }
        }
        let matches = catalog::filter_widgets(&available, &self.query);
        if self.selected >= matches.len() {
            self.selected = matches.len().saturating_sub(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return None;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) && !matches.is_empty() {
            self.selected = (self.selected + 1).min(matches.len() - 1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) && !matches.is_empty() {
            self.selected = self.selected.saturating_sub(1);
        }
        let mut pick_selected = ctx.input(|i| i.key_pressed(egui::Key::Enter));
        let mut clicked: Option<usize> = None;
        let mut open = self.open;

        egui::Window::new("Add widget")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(520.0)
            .default_height(420.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.query.keyword)
                            .desired_width(280.0)
                            .hint_text("Search widgets or keywords"),
                    );
                    if self.request_focus {
                        resp.request_focus();
                        self.request_focus = false;
                    }
                    ui.label("Context:");
                    let selected_text = match &self.query.context {
                        ContextFilter::All => "All contexts".to_string(),
                        ContextFilter::Only(c) => c.clone(),
                    };
                    egui::ComboBox::from_id_salt("widget_context_filter")
                        .selected_text(selected_text)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(
                                &mut self.query.context,
                                ContextFilter::All,
                                "All contexts",
                            );
                            for c in &contexts {
                                ui.selectable_value(
                                    &mut self.query.context,
                                    ContextFilter::Only(c.clone()),
                                    c.as_str(),
                                );
                            }
                        });
                });
                ui.small("Only widgets not already on the dashboard are listed.");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if matches.is_empty() {
                        ui.weak("No matching widgets. Try another keyword or context.");
                    }
                    for (idx, widget) in matches.iter().enumerate() {
                        let selected = idx == self.selected;
                        let frame = egui::Frame::new()
                            .inner_margin(6.0)
                            .corner_radius(egui::CornerRadius::same(6))
                            .stroke(egui::Stroke::new(
                                1.0,
                                if selected {
                                    egui::Color32::from_rgb(90, 160, 255)
                                } else {
                                    egui::Color32::from_gray(70)
                                },
                            ));
                        frame.show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.strong(widget.name.as_str());
                                ui.weak(format!("ID: {}", widget.id));
                                let right = egui::Layout::right_to_left(egui::Align::Center);
                                ui.with_layout(right, |ui| {
                                    if ui.button("Add").clicked() {
                                        clicked = Some(idx);
                                    }
                                });
                            });
                            if !widget.description.is_empty() {
                                ui.label(widget.description.as_str());
                            }
                            ui.horizontal_wrapped(|ui| {
                                for c in &widget.supported_contexts {
                                    ui.small(c.as_str());
                                }
                            });
                        });
                        ui.add_space(4.0);
                    }
                });
            });

        if !open {
            self.close();
            return None;
        }
        if let Some(idx) = clicked {
            self.selected = idx;
            pick_selected = true;
        }
        if pick_selected {
            if let Some(widget) = matches.get(self.selected) {
                let id = widget.id.clone();
                self.close();
                return Some(id);
            }
        }
        None
    }
}
