use crate::catalog;
use crate::interaction::GestureKind;
use crate::model::WidgetId;
use eframe::egui;

use super::render::{draw_background, draw_empty_state, draw_ghost, draw_widget};
use super::{EditorApp, Notice, NoticeTone};

#[derive(Default)]
struct Shortcuts {
    undo: bool,
    save: bool,
    open: bool,
}

impl EditorApp {
    fn tick_notice(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        if let Some((text, tone)) = self.pending_notice.take() {
            self.notice = Some(Notice {
                text,
                tone,
                expires_at: now + self.notice_seconds,
            });
        }
        if let Some(notice) = &self.notice {
            let remaining = notice.expires_at - now;
            if remaining <= 0.0 {
                self.notice = None;
            } else {
                ctx.request_repaint_after(std::time::Duration::from_secs_f64(remaining));
            }
        }
    }

    fn draw_grid(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let width = ui.available_width();
        self.session.set_container_width(width);
        let projector = *self.session.projector();
        let height = projector
            .content_height(self.session.layout(), 2)
            .max(ui.available_height());
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
        let origin = rect.min;
        let painter = ui.painter_at(rect);
        let rows = ((height - projector.margin.y) / projector.row_pitch()).floor().max(0.0) as u32;
        draw_background(&painter, rect, &projector, rows, self.show_grid_lines);

        if self.session.layout().is_empty() && self.session.interaction().is_idle() {
            let mut child = ui.new_child(egui::UiBuilder::new().max_rect(rect));
            if draw_empty_state(&mut child) {
                self.picker.open();
            }
            return;
        }

        let active_id = self.session.interaction().active_id().cloned();
        let mut pressed: Option<(GestureKind, WidgetId)> = None;
        let mut remove: Option<WidgetId> = None;

        for item in self.session.layout().items() {
            let item_rect = projector.project_at(origin, item);
            let interacting = active_id.as_ref() == Some(&item.id);
            let binding = catalog::resolve(item, &self.catalog, &self.data);
            let handle = draw_widget(&painter, item_rect, binding, interacting);

            let body = ui
                .interact(
                    item_rect,
                    egui::Id::new(("grid_item", item.id.as_str())),
                    egui::Sense::drag(),
                )
                .on_hover_cursor(egui::CursorIcon::Grab);
            let resize = ui
                .interact(
                    handle,
                    egui::Id::new(("grid_resize", item.id.as_str())),
                    egui::Sense::drag(),
                )
                .on_hover_cursor(egui::CursorIcon::ResizeSouthEast);

            let close_rect = egui::Rect::from_min_size(
                item_rect.right_top() + egui::vec2(-26.0, 6.0),
                egui::vec2(20.0, 20.0),
            );
            let close = ui
                .interact(
                    close_rect,
                    egui::Id::new(("grid_remove", item.id.as_str())),
                    egui::Sense::click(),
                )
                .on_hover_text("Remove widget");
            let close_color = if close.hovered() {
                egui::Color32::from_rgb(248, 113, 113)
            } else {
                egui::Color32::from_gray(150)
            };
            painter.text(
                close_rect.center(),
                egui::Align2::CENTER_CENTER,
                "✕",
                egui::FontId::proportional(13.0),
                close_color,
            );

            if close.clicked() {
                remove = Some(item.id.clone());
            } else if resize.drag_started() {
                pressed = Some((GestureKind::Resize, item.id.clone()));
            } else if body.drag_started() {
                pressed = Some((GestureKind::Drag, item.id.clone()));
            }
        }

        if let Some(id) = remove {
            self.remove_widget(&id);
        }
        if let Some((kind, id)) = pressed {
            let origin_pos = ctx.input(|i| i.pointer.press_origin().or(i.pointer.latest_pos()));
            if let Some(pos) = origin_pos {
                self.session.pointer_down(kind, &id, pos);
            }
        }

        // Pointer tracking runs only while a gesture is live.
        if self.session.interaction().is_active() {
            let (latest, released) =
                ctx.input(|i| (i.pointer.latest_pos(), i.pointer.any_released()));
            if let Some(pos) = latest {
                self.session.pointer_move(pos);
            }
            if let Some(active) = self
                .session
                .interaction()
                .active_id()
                .and_then(|id| self.session.layout().get(id))
            {
                let ghost = projector.project_at(origin, active);
                draw_ghost(&painter, ghost, self.session.active_collides());
            }
            let cursor = match self.session.interaction().kind() {
                Some(GestureKind::Resize) => egui::CursorIcon::ResizeSouthEast,
                _ => egui::CursorIcon::Grabbing,
            };
            ctx.set_cursor_icon(cursor);
            if released {
                let outcome = self.session.pointer_up();
                self.finish_gesture(outcome);
            }
            ctx.request_repaint();
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick_notice(ctx);

        let wants_keyboard = ctx.wants_keyboard_input();
        let mut shortcuts = Shortcuts::default();
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                shortcuts.save = true;
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                shortcuts.open = true;
            }
            if !wants_keyboard
                && !self.picker.open
                && i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)
            {
                shortcuts.undo = true;
            }
        });
        if shortcuts.undo {
            self.undo();
        }
        if shortcuts.save {
            self.save_dashboard();
        }
        if shortcuts.open {
            self.open_dashboard_dialog();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New dashboard").clicked() {
                        self.start_new_dashboard();
                        ui.close_menu();
                    }
                    if ui.button("Open… (⌘O)").clicked() {
                        self.open_dashboard_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save (⌘S)").clicked() {
                        self.save_dashboard();
                        ui.close_menu();
                    }
                    if ui.button("Save As…").clicked() {
                        self.save_dashboard_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Reload widgets and data").clicked() {
                        self.reload_sources();
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.show_grid_lines, "Grid cells").changed() {
                        self.persist_settings();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Show Help (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });
                ui.separator();

                let name = ui.add(
                    egui::TextEdit::singleline(&mut self.doc.dashboard.name)
                        .hint_text("Dashboard name")
                        .desired_width(220.0),
                );
                if name.gained_focus() {
                    self.doc.focus_name();
                }
                if name.changed() {
                    self.doc.name_edited();
                }

                if ui
                    .add_enabled(self.session.can_undo(), egui::Button::new("↶ Undo"))
                    .on_hover_text(format!(
                        "Undo (⌘Z), {} step(s) available",
                        self.session.history().len()
                    ))
                    .clicked()
                {
                    self.undo();
                }
                if ui.button("＋ Add widget").clicked() {
                    self.picker.open();
                }
                if ui.button("Save").clicked() {
                    self.save_dashboard();
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.notice {
                    Some(notice) if notice.tone == NoticeTone::Error => {
                        ui.colored_label(
                            egui::Color32::from_rgb(248, 113, 113),
                            notice.text.as_str(),
                        );
                    }
                    Some(notice) => {
                        ui.label(notice.text.as_str());
                    }
                    None => {
                        ui.label("Ready");
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.dashboard_path.as_str());
                    ui.separator();
                    ui.label(format!("Widgets: {}", self.session.layout().len()));
                    if self.doc.dirty {
                        ui.separator();
                        ui.label("● Unsaved");
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.draw_grid(ui, ctx);
                });
        });

        self.apply_changes();

        let picked = self.picker.ui(ctx, &self.catalog, self.session.layout());
        if let Some(id) = picked {
            self.add_widget(id);
            self.apply_changes();
        }

        super::help::draw_help_window(ctx, &mut self.show_help);

        if self.pending_notice.is_some() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.end();
    }
}
