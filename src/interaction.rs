//! Drag/resize state machine.
//!
//! Every transition takes the current state by value and returns the next
//! one, so the controller can be driven from tests without an input surface.
//! Only the active item is ever mutated; neighbours are never pushed aside.

use eframe::egui;

use crate::grid::{COLS, GridProjector, collides};
use crate::history::History;
use crate::model::{Layout, LayoutItem, WidgetId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// The item as it was when the gesture started, and where the pointer was.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionSnapshot {
    pub item: LayoutItem,
    pub pointer_start: egui::Pos2,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(InteractionSnapshot),
    Resizing(InteractionSnapshot),
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// The item ended somewhere new and does not overlap anything.
    Committed { kind: GestureKind, item: LayoutItem },
    /// The item ended where it started.
    Unchanged { kind: GestureKind },
    /// The item ended on top of another one and was put back.
    RolledBack { kind: GestureKind, item: LayoutItem },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// While active, the host must route every pointer move/up to this state
    /// regardless of what is under the pointer.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn kind(&self) -> Option<GestureKind> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging(_) => Some(GestureKind::Drag),
            InteractionState::Resizing(_) => Some(GestureKind::Resize),
        }
    }

    pub fn snapshot(&self) -> Option<&InteractionSnapshot> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging(s) | InteractionState::Resizing(s) => Some(s),
        }
    }

    pub fn active_id(&self) -> Option<&WidgetId> {
        self.snapshot().map(|s| &s.item.id)
    }

    /// Starts a gesture on `id`. Ignored unless idle or if the item is not in
    /// the layout. On start the whole layout is pushed to `history` once.
    pub fn on_pointer_down(
        self,
        kind: GestureKind,
        id: &WidgetId,
        pointer: egui::Pos2,
        layout: &Layout,
        history: &mut History,
    ) -> Self {
        if self.is_active() {
            tracing::debug!(%id, "pointer down ignored, gesture already active");
            return self;
        }
        let Some(item) = layout.get(id) else {
            tracing::debug!(%id, "pointer down on unknown item");
            return self;
        };
        history.push(layout);
        let snapshot = InteractionSnapshot {
            item: item.clone(),
            pointer_start: pointer,
        };
        tracing::debug!(%id, ?kind, "gesture started");
        match kind {
            GestureKind::Drag => InteractionState::Dragging(snapshot),
            GestureKind::Resize => InteractionState::Resizing(snapshot),
        }
    }

    /// Applies the pointer displacement since gesture start to the active item.
    pub fn on_pointer_move(
        self,
        pointer: egui::Pos2,
        projector: &GridProjector,
        layout: &mut Layout,
    ) -> Self {
        let Some(kind) = self.kind() else {
            return self;
        };
        let Some(snapshot) = self.snapshot() else {
            return self;
        };
        let start = &snapshot.item;
        let (dx, dy) = projector.grid_delta(pointer - snapshot.pointer_start);
        let Some(item) = layout.get_mut(&start.id) else {
            tracing::warn!(id = %start.id, "active item vanished mid-gesture");
            return InteractionState::Idle;
        };
        match kind {
            GestureKind::Drag => {
                item.x = offset(start.x, dx).min(COLS.saturating_sub(item.w));
                item.y = offset(start.y, dy);
            }
            GestureKind::Resize => {
                item.w = offset(start.w, dx).clamp(1, COLS.saturating_sub(item.x).max(1));
                item.h = offset(start.h, dy).max(1);
            }
        }
        self
    }

    /// Ends the gesture. A final position that overlaps another item is
    /// reverted to the snapshot.
    pub fn on_pointer_up(self, layout: &mut Layout) -> (Self, Option<GestureOutcome>) {
        let (kind, snapshot) = match self {
            InteractionState::Idle => return (InteractionState::Idle, None),
            InteractionState::Dragging(s) => (GestureKind::Drag, s),
            InteractionState::Resizing(s) => (GestureKind::Resize, s),
        };
        let Some(current) = layout.get(&snapshot.item.id).cloned() else {
            return (InteractionState::Idle, None);
        };
        let outcome = if collides(&current, layout) {
            tracing::warn!(
                id = %current.id,
                ?kind,
                "gesture overlaps another widget, rolling back"
            );
            layout.replace(snapshot.item.clone());
            GestureOutcome::RolledBack {
                kind,
                item: snapshot.item,
            }
        } else if current.same_rect(&snapshot.item) {
            GestureOutcome::Unchanged { kind }
        } else {
            tracing::debug!(
                id = %current.id,
                ?kind,
                x = current.x,
                y = current.y,
                w = current.w,
                h = current.h,
                "gesture committed"
            );
            GestureOutcome::Committed {
                kind,
                item: current,
            }
        };
        (InteractionState::Idle, Some(outcome))
    }

    /// Whether the active item currently overlaps another item.
    pub fn active_collides(&self, layout: &Layout) -> bool {
        self.active_id()
            .and_then(|id| layout.get(id))
            .is_some_and(|item| collides(item, layout))
    }
}

fn offset(base: u32, delta: i32) -> u32 {
    (i64::from(base) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32
}
