use crate::catalog::{SegmentKind, WidgetBinding, segment_description};
use crate::grid::{COLS, GridProjector};
use crate::model::{DataEntry, Trend, Widget};
use eframe::egui;

const CARD_FILL: egui::Color32 = egui::Color32::from_rgb(30, 41, 59);
const CARD_STROKE: egui::Color32 = egui::Color32::from_rgb(71, 85, 105);
const ACTIVE_STROKE: egui::Color32 = egui::Color32::from_rgb(56, 189, 248);
const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(148, 163, 184);
const RISE: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
const FALL: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);

pub(super) fn draw_background(
    painter: &egui::Painter,
    rect: egui::Rect,
    projector: &GridProjector,
    rows: u32,
    show_grid_lines: bool,
) {
    painter.rect_filled(rect, 8.0, egui::Color32::from_rgb(15, 23, 42));
    if !show_grid_lines {
        return;
    }
    let cell_fill = egui::Color32::from_rgba_unmultiplied(148, 163, 184, 10);
    for row in 0..rows {
        for col in 0..COLS {
            let cell = crate::model::LayoutItem::new("", col, row, 1, 1);
            let r = projector.project_at(rect.min, &cell);
            painter.rect_filled(r, 4.0, cell_fill);
        }
    }
}

fn tone_color(tone: Option<&str>) -> egui::Color32 {
    match tone {
        Some("success") => RISE,
        Some("warning") => egui::Color32::from_rgb(250, 204, 21),
        Some("error") | Some("danger") => FALL,
        Some("info") | Some("primary") => ACTIVE_STROKE,
        _ => egui::Color32::WHITE,
    }
}

fn segment_color(kind: SegmentKind) -> egui::Color32 {
    match kind {
        SegmentKind::Plain => MUTED_TEXT,
        SegmentKind::Rise => RISE,
        SegmentKind::Fall | SegmentKind::Critical => FALL,
    }
}

/// Draws one placed widget. Returns the rectangle of its resize handle.
pub(super) fn draw_widget(
    painter: &egui::Painter,
    rect: egui::Rect,
    binding: WidgetBinding<'_>,
    interacting: bool,
) -> egui::Rect {
    let stroke = if interacting {
        egui::Stroke::new(2.0, ACTIVE_STROKE)
    } else {
        egui::Stroke::new(1.0, CARD_STROKE)
    };
    match binding {
        WidgetBinding::Missing => {
            draw_placeholder(painter, rect, "Missing widget configuration");
        }
        WidgetBinding::AwaitingData(widget) => {
            draw_placeholder(painter, rect, &format!("{} data not yet available", widget.name));
        }
        WidgetBinding::Ready(widget, entry) => {
            painter.rect_filled(rect, 10.0, CARD_FILL);
            draw_card_contents(painter, rect.shrink(12.0), widget, entry);
        }
    }
    painter.rect_stroke(rect, 10.0, stroke, egui::StrokeKind::Inside);

    let handle = egui::Rect::from_min_size(
        rect.right_bottom() - egui::vec2(24.0, 24.0),
        egui::vec2(18.0, 18.0),
    );
    let handle_fill = if interacting {
        egui::Color32::from_rgb(2, 132, 199)
    } else {
        egui::Color32::from_rgba_unmultiplied(15, 23, 42, 200)
    };
    painter.rect_filled(handle, 4.0, handle_fill);
    for i in 1..=3 {
        let o = i as f32 * 4.0;
        painter.line_segment(
            [
                handle.right_bottom() - egui::vec2(o, 2.0),
                handle.right_bottom() - egui::vec2(2.0, o),
            ],
            egui::Stroke::new(1.0, MUTED_TEXT),
        );
    }
    handle
}

fn draw_placeholder(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    painter.rect_filled(rect, 10.0, egui::Color32::from_rgba_unmultiplied(15, 23, 42, 160));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(13.0),
        MUTED_TEXT,
    );
}

fn draw_card_contents(
    painter: &egui::Painter,
    inner: egui::Rect,
    widget: &Widget,
    entry: &DataEntry,
) {
    painter.text(
        inner.left_top(),
        egui::Align2::LEFT_TOP,
        &widget.name,
        egui::FontId::proportional(13.0),
        MUTED_TEXT,
    );

    let value_color = tone_color(entry.color.as_deref());
    let value_font = egui::FontId::proportional(26.0);
    let value_pos = inner.left_top() + egui::vec2(0.0, 22.0);
    let value_galley = painter.layout_no_wrap(entry.value.to_string(), value_font, value_color);
    let value_width = value_galley.size().x;
    painter.galley(value_pos, value_galley, value_color);
    let mut x = value_pos.x + value_width + 4.0;
    if let Some(unit) = &entry.unit {
        let unit_galley =
            painter.layout_no_wrap(unit.clone(), egui::FontId::proportional(14.0), MUTED_TEXT);
        let w = unit_galley.size().x;
        painter.galley(egui::pos2(x, value_pos.y + 10.0), unit_galley, MUTED_TEXT);
        x += w + 8.0;
    }
    if let Some(trend) = entry.trend {
        let (arrow, color) = match trend {
            Trend::Up => ("▲", RISE),
            Trend::Down => ("▼", FALL),
            Trend::Flat => ("▶", MUTED_TEXT),
        };
        let label = match &entry.change {
            Some(change) => format!("{arrow} {change}"),
            None => arrow.to_string(),
        };
        painter.text(
            egui::pos2(x, value_pos.y + 10.0),
            egui::Align2::LEFT_TOP,
            label,
            egui::FontId::proportional(13.0),
            color,
        );
    }

    if let Some(description) = &entry.description {
        let mut job = egui::text::LayoutJob::default();
        for segment in segment_description(description) {
            job.append(
                &segment.text,
                0.0,
                egui::TextFormat {
                    font_id: egui::FontId::proportional(12.0),
                    color: segment_color(segment.kind),
                    ..Default::default()
                },
            );
        }
        job.wrap.max_width = inner.width();
        let galley = painter.layout_job(job);
        painter.galley(inner.left_top() + egui::vec2(0.0, 62.0), galley, MUTED_TEXT);
    }
}

/// Outline of the active item: blue when the drop is valid, red when it would overlap.
pub(super) fn draw_ghost(painter: &egui::Painter, rect: egui::Rect, colliding: bool) {
    let (fill, stroke) = if colliding {
        (
            egui::Color32::from_rgba_unmultiplied(239, 68, 68, 60),
            egui::Color32::from_rgb(248, 113, 113),
        )
    } else {
        (
            egui::Color32::from_rgba_unmultiplied(14, 165, 233, 45),
            ACTIVE_STROKE,
        )
    };
    painter.rect_filled(rect, 10.0, fill);
    painter.rect_stroke(rect, 10.0, egui::Stroke::new(2.0, stroke), egui::StrokeKind::Outside);
    if colliding {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "⚠ Position conflict",
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }
}

pub(super) fn draw_empty_state(ui: &mut egui::Ui) -> bool {
    let mut add_clicked = false;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.heading("This dashboard has no widgets yet");
        ui.label("Add widgets from the catalog, then drag to arrange and resize them.");
        ui.add_space(8.0);
        if ui.button("＋ Add widget").clicked() {
            add_clicked = true;
        }
    });
    add_clicked
}
