//! Grid geometry: pixel projection, collision tests and first-fit placement.

use eframe::egui;

use crate::error::{EditorError, Result};
use crate::model::{Layout, LayoutItem, WidgetId};

pub const COLS: u32 = 12;
pub const ROW_HEIGHT: f32 = 55.0;
pub const MARGIN: egui::Vec2 = egui::vec2(10.0, 10.0);

/// Hard stop for the placement scan. The scan never needs to go past the
/// layout's bottom edge, so this only trips on a corrupted layout.
pub const MAX_SCAN_ROWS: u32 = 10_000;

/// Maps grid units to pixels for a container of a given width. Holds no
/// layout state; recompute it whenever the container is remeasured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridProjector {
    pub container_width: f32,
    pub row_height: f32,
    pub margin: egui::Vec2,
}

impl Default for GridProjector {
    fn default() -> Self {
        Self {
            container_width: 0.0,
            row_height: ROW_HEIGHT,
            margin: MARGIN,
        }
    }
}

impl GridProjector {
    pub fn new(container_width: f32) -> Self {
        Self {
            container_width,
            ..Self::default()
        }
    }

    pub fn with_metrics(container_width: f32, row_height: f32, margin: egui::Vec2) -> Self {
        Self {
            container_width,
            row_height,
            margin,
        }
    }

    pub fn col_width(&self) -> f32 {
        (self.container_width - (COLS as f32 + 1.0) * self.margin.x) / COLS as f32
    }

    /// Pixel distance between the left edges of two adjacent columns.
    pub fn column_pitch(&self) -> f32 {
        self.col_width() + self.margin.x
    }

    pub fn row_pitch(&self) -> f32 {
        self.row_height + self.margin.y
    }

    /// Item rectangle relative to the container's top-left corner.
    pub fn project(&self, item: &LayoutItem) -> egui::Rect {
        let col_width = self.col_width();
        let left = item.x as f32 * self.column_pitch() + self.margin.x;
        let top = item.y as f32 * self.row_pitch() + self.margin.y;
        let width = item.w as f32 * col_width + item.w.saturating_sub(1) as f32 * self.margin.x;
        let height =
            item.h as f32 * self.row_height + item.h.saturating_sub(1) as f32 * self.margin.y;
        egui::Rect::from_min_size(egui::pos2(left, top), egui::vec2(width, height))
    }

    pub fn project_at(&self, origin: egui::Pos2, item: &LayoutItem) -> egui::Rect {
        self.project(item).translate(origin.to_vec2())
    }

    /// Converts a pointer displacement to whole grid units, rounding to the
    /// nearest unit. A degenerate container yields no movement.
    pub fn grid_delta(&self, pixels: egui::Vec2) -> (i32, i32) {
        let col_pitch = self.column_pitch();
        let row_pitch = self.row_pitch();
        let dx = if col_pitch > f32::EPSILON {
            (pixels.x / col_pitch).round() as i32
        } else {
            0
        };
        let dy = if row_pitch > f32::EPSILON {
            (pixels.y / row_pitch).round() as i32
        } else {
            0
        };
        (dx, dy)
    }

    /// Pixel height needed to show every row of the layout plus `spare_rows`.
    pub fn content_height(&self, layout: &Layout, spare_rows: u32) -> f32 {
        layout.bottom().saturating_add(spare_rows) as f32 * self.row_pitch() + self.margin.y
    }
}

pub fn overlaps(a: &LayoutItem, b: &LayoutItem) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// True if `item` overlaps any other item of the layout. The item's own
/// entry (same id) is skipped.
pub fn collides(item: &LayoutItem, layout: &Layout) -> bool {
    first_collision(item, layout).is_some()
}

pub fn first_collision<'a>(item: &LayoutItem, layout: &'a Layout) -> Option<&'a LayoutItem> {
    layout
        .iter()
        .find(|other| other.id != item.id && overlaps(item, other))
}

/// Topmost, then leftmost, position where a `w`x`h` item fits. `w` is clamped
/// to `1..=COLS` and `h` to at least 1.
pub fn find_slot(w: u32, h: u32, layout: &Layout) -> Result<(u32, u32)> {
    place(WidgetId::new(""), w, h, layout).map(|item| (item.x, item.y))
}

/// Builds the item a new widget gets: size clamped as in [`find_slot`],
/// positioned at the first free slot.
pub fn place(id: WidgetId, w: u32, h: u32, layout: &Layout) -> Result<LayoutItem> {
    let w = w.clamp(1, COLS);
    let h = h.max(1);
    let last_row = layout.bottom().min(MAX_SCAN_ROWS);
    let mut probe = LayoutItem::new(id, 0, 0, w, h);
    for y in 0..=last_row {
        for x in 0..=COLS - w {
            probe.x = x;
            probe.y = y;
            if !layout.iter().any(|other| overlaps(&probe, other)) {
                tracing::debug!(w, h, x, y, "placement slot found");
                return Ok(probe);
            }
        }
    }
    tracing::warn!(w, h, last_row, "placement scan exhausted");
    Err(EditorError::NoFreeSlot { w, h })
}

/// Checks the invariants of a committed layout: positive sizes, items inside
/// the column range and above the scan limit, unique ids and no overlaps.
pub fn validate_layout(layout: &Layout) -> Result<()> {
    for (idx, item) in layout.iter().enumerate() {
        if item.w == 0 || item.h == 0 {
            return Err(EditorError::InvalidItem {
                id: item.id.clone(),
                reason: format!("size {}x{} must be at least 1x1", item.w, item.h),
            });
        }
        let (Some(right), Some(bottom)) = (item.x.checked_add(item.w), item.y.checked_add(item.h))
        else {
            return Err(EditorError::InvalidItem {
                id: item.id.clone(),
                reason: format!(
                    "position {},{} with size {}x{} overflows",
                    item.x, item.y, item.w, item.h
                ),
            });
        };
        if right > COLS {
            return Err(EditorError::InvalidItem {
                id: item.id.clone(),
                reason: format!("spans columns {}..{right} past {COLS}", item.x),
            });
        }
        if bottom > MAX_SCAN_ROWS {
            return Err(EditorError::InvalidItem {
                id: item.id.clone(),
                reason: format!("extends to row {bottom} past {MAX_SCAN_ROWS}"),
            });
        }
        for other in &layout.items()[..idx] {
            if other.id == item.id {
                return Err(EditorError::DuplicateWidget(item.id.clone()));
            }
            if overlaps(item, other) {
                return Err(EditorError::Overlap {
                    a: other.id.clone(),
                    b: item.id.clone(),
                });
            }
        }
    }
    Ok(())
}
