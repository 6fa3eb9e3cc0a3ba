//! One editing session over a dashboard layout: owns the layout model, the
//! undo history and the active gesture, and records every committed change
//! for the host to pick up.

use eframe::egui;

use crate::error::{EditorError, Result};
use crate::grid::{GridProjector, place, validate_layout};
use crate::history::History;
use crate::interaction::{GestureKind, GestureOutcome, InteractionState};
use crate::model::{Layout, LayoutItem, WidgetId};

pub const DEFAULT_WIDGET_SIZE: (u32, u32) = (4, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Moved,
    Resized,
    Undone,
}

/// A committed change together with the layout it produced.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutChange {
    pub kind: ChangeKind,
    pub layout: Layout,
}

#[derive(Debug, Default)]
pub struct EditorSession {
    layout: Layout,
    history: History,
    interaction: InteractionState,
    projector: GridProjector,
    changes: Vec<LayoutChange>,
}

impl EditorSession {
    pub fn new(projector: GridProjector) -> Self {
        Self {
            projector,
            ..Self::default()
        }
    }

    pub fn with_layout(layout: Layout, projector: GridProjector) -> Result<Self> {
        let mut session = Self::new(projector);
        session.load(layout)?;
        Ok(session)
    }

    /// Replaces the layout with a persisted one. History, any active gesture
    /// and pending changes are dropped. An invalid layout leaves the session
    /// untouched.
    pub fn load(&mut self, layout: Layout) -> Result<()> {
        validate_layout(&layout)?;
        tracing::info!(items = layout.len(), "layout loaded");
        self.layout = layout;
        self.history.clear();
        self.interaction = InteractionState::Idle;
        self.changes.clear();
        Ok(())
    }

    /// Ends the session: drops history and any gesture, keeps the layout.
    pub fn end(&mut self) {
        self.history.clear();
        self.interaction = InteractionState::Idle;
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn projector(&self) -> &GridProjector {
        &self.projector
    }

    pub fn set_container_width(&mut self, width: f32) {
        self.projector.container_width = width;
    }

    pub fn can_undo(&self) -> bool {
        self.interaction.is_idle() && self.history.can_undo()
    }

    /// Places a default-sized widget at the first free slot.
    pub fn add_widget(&mut self, id: WidgetId) -> Result<LayoutItem> {
        let (w, h) = DEFAULT_WIDGET_SIZE;
        self.add_widget_sized(id, w, h)
    }

    pub fn add_widget_sized(&mut self, id: WidgetId, w: u32, h: u32) -> Result<LayoutItem> {
        if self.interaction.is_active() {
            return Err(EditorError::GestureInProgress);
        }
        if self.layout.contains(&id) {
            return Err(EditorError::DuplicateWidget(id));
        }
        let item = place(id, w, h, &self.layout)?;
        self.history.push(&self.layout);
        self.layout.push(item.clone());
        tracing::info!(id = %item.id, x = item.x, y = item.y, "widget added");
        self.record(ChangeKind::Added);
        Ok(item)
    }

    /// Removes a widget. Removal cannot create an overlap, so history is not
    /// touched. The item under an active gesture cannot be removed.
    pub fn remove_widget(&mut self, id: &WidgetId) -> Option<LayoutItem> {
        if self.interaction.active_id() == Some(id) {
            tracing::warn!(%id, "refusing to remove the widget being manipulated");
            return None;
        }
        let removed = self.layout.remove(id)?;
        tracing::info!(%id, "widget removed");
        self.record(ChangeKind::Removed);
        Some(removed)
    }

    pub fn undo(&mut self) -> bool {
        if self.interaction.is_active() {
            return false;
        }
        if !self.history.undo(&mut self.layout) {
            return false;
        }
        tracing::info!(remaining = self.history.len(), "undo");
        self.record(ChangeKind::Undone);
        true
    }

    /// Returns whether a gesture started.
    pub fn pointer_down(&mut self, kind: GestureKind, id: &WidgetId, pointer: egui::Pos2) -> bool {
        let state = std::mem::take(&mut self.interaction);
        self.interaction =
            state.on_pointer_down(kind, id, pointer, &self.layout, &mut self.history);
        self.interaction.is_active()
    }

    pub fn pointer_move(&mut self, pointer: egui::Pos2) {
        let state = std::mem::take(&mut self.interaction);
        self.interaction = state.on_pointer_move(pointer, &self.projector, &mut self.layout);
    }

    pub fn pointer_up(&mut self) -> Option<GestureOutcome> {
        let state = std::mem::take(&mut self.interaction);
        let (state, outcome) = state.on_pointer_up(&mut self.layout);
        self.interaction = state;
        if let Some(GestureOutcome::Committed { kind, .. }) = &outcome {
            self.record(match kind {
                GestureKind::Drag => ChangeKind::Moved,
                GestureKind::Resize => ChangeKind::Resized,
            });
        }
        outcome
    }

    pub fn active_collides(&self) -> bool {
        self.interaction.active_collides(&self.layout)
    }

    /// Hands over the changes committed since the last call.
    pub fn drain_changes(&mut self) -> Vec<LayoutChange> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, kind: ChangeKind) {
        self.changes.push(LayoutChange {
            kind,
            layout: self.layout.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{find_slot, overlaps};
    use crate::history::HISTORY_LIMIT;
    use proptest::prelude::*;

    fn session() -> EditorSession {
        EditorSession::new(GridProjector::new(1330.0))
    }

    fn session_with(items: Vec<LayoutItem>) -> EditorSession {
        EditorSession::with_layout(Layout::new(items), GridProjector::new(1330.0)).unwrap()
    }

    fn pos(x: f32, y: f32) -> egui::Pos2 {
        egui::pos2(x, y)
    }

    fn assert_no_overlaps(layout: &Layout) {
        let items = layout.items();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_add_to_empty_layout() {
        let mut s = session();
        let item = s.add_widget("A".into()).unwrap();
        assert_eq!(item, LayoutItem::new("A", 0, 0, 4, 2));
        assert_eq!(s.layout().items(), &[LayoutItem::new("A", 0, 0, 4, 2)]);
    }

    #[test]
    fn test_add_next_to_existing() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        let item = s.add_widget("B".into()).unwrap();
        assert_eq!((item.x, item.y), (4, 0));
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        assert!(matches!(
            s.add_widget("A".into()),
            Err(EditorError::DuplicateWidget(_))
        ));
        assert_eq!(s.layout().len(), 1);
    }

    #[test]
    fn test_add_is_undoable() {
        let mut s = session();
        s.add_widget("A".into()).unwrap();
        assert!(s.undo());
        assert!(s.layout().is_empty());
    }

    #[test]
    fn test_drag_onto_neighbour_reverts() {
        let mut s = session_with(vec![
            LayoutItem::new("A", 0, 0, 4, 2),
            LayoutItem::new("B", 4, 0, 4, 2),
        ]);
        let before = s.layout().clone();
        assert!(s.pointer_down(GestureKind::Drag, &"A".into(), pos(50.0, 50.0)));
        s.pointer_move(pos(50.0 + 4.0 * 110.0, 50.0));
        assert!(s.active_collides());
        let outcome = s.pointer_up();
        assert!(matches!(outcome, Some(GestureOutcome::RolledBack { .. })));
        assert_eq!(s.layout(), &before);
        assert!(s.drain_changes().is_empty());
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn test_resize_into_neighbour_reverts() {
        let mut s = session_with(vec![
            LayoutItem::new("A", 0, 0, 4, 2),
            LayoutItem::new("B", 8, 0, 4, 2),
        ]);
        s.pointer_down(GestureKind::Resize, &"A".into(), pos(0.0, 0.0));
        s.pointer_move(pos(6.0 * 110.0, 0.0));
        assert_eq!(s.layout().get(&"A".into()).unwrap().w, 10);
        s.pointer_up();
        assert_eq!(s.layout().get(&"A".into()).unwrap().w, 4);
    }

    #[test]
    fn test_remove_leaves_history_alone() {
        let mut s = session_with(vec![
            LayoutItem::new("A", 0, 0, 4, 2),
            LayoutItem::new("B", 4, 0, 4, 2),
        ]);
        let removed = s.remove_widget(&"A".into());
        assert_eq!(removed.map(|i| i.id), Some(WidgetId::new("A")));
        assert_eq!(s.layout().items(), &[LayoutItem::new("B", 4, 0, 4, 2)]);
        assert!(s.history().is_empty());
        assert!(s.remove_widget(&"A".into()).is_none());
    }

    #[test]
    fn test_cannot_remove_active_item() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        s.pointer_down(GestureKind::Drag, &"A".into(), pos(0.0, 0.0));
        assert!(s.remove_widget(&"A".into()).is_none());
        assert!(matches!(
            s.add_widget("B".into()),
            Err(EditorError::GestureInProgress)
        ));
        assert!(!s.undo());
        s.pointer_up();
        assert!(s.remove_widget(&"A".into()).is_some());
    }

    #[test]
    fn test_undo_on_empty_history_keeps_layout() {
        let mut s = session_with(vec![LayoutItem::new("A", 2, 3, 4, 2)]);
        let before = s.layout().clone();
        assert!(!s.undo());
        assert_eq!(s.layout(), &before);
        assert!(s.drain_changes().is_empty());
    }

    #[test]
    fn test_eleven_gestures_keep_ten_snapshots() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        for step in 1..=11u32 {
            let start = pos(0.0, 0.0);
            s.pointer_down(GestureKind::Drag, &"A".into(), start);
            s.pointer_move(pos(0.0, 65.0));
            s.pointer_up();
            assert_eq!(s.layout().get(&"A".into()).unwrap().y, step);
        }
        assert_eq!(s.history().len(), HISTORY_LIMIT);
        // The snapshot taken before the first gesture (y = 0) is gone.
        assert_eq!(s.history().oldest().unwrap().get(&"A".into()).unwrap().y, 1);
    }

    #[test]
    fn test_changes_feed() {
        let mut s = session();
        s.add_widget("A".into()).unwrap();
        s.pointer_down(GestureKind::Drag, &"A".into(), pos(0.0, 0.0));
        s.pointer_move(pos(0.0, 130.0));
        s.pointer_up();
        s.pointer_down(GestureKind::Resize, &"A".into(), pos(0.0, 0.0));
        s.pointer_move(pos(110.0, 0.0));
        s.pointer_up();
        s.undo();
        s.remove_widget(&"A".into());

        let kinds: Vec<ChangeKind> = s.drain_changes().into_iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Added,
                ChangeKind::Moved,
                ChangeKind::Resized,
                ChangeKind::Undone,
                ChangeKind::Removed,
            ]
        );
        assert!(s.drain_changes().is_empty());
    }

    #[test]
    fn test_add_oversized_widget_is_clamped() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 1, 3)]);
        let item = s.add_widget_sized("B".into(), 40, 0).unwrap();
        assert_eq!(item, LayoutItem::new("B", 0, 3, 12, 1));
        assert_eq!(s.layout().get(&"B".into()), Some(&item));
    }

    #[test]
    fn test_load_rejects_out_of_range_coordinates() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        for json in [
            r#"[{"i":"a","x":4294967295,"y":0,"w":1,"h":1}]"#,
            r#"[{"i":"a","x":0,"y":4294967295,"w":1,"h":2}]"#,
            r#"[{"i":"a","x":0,"y":4294967000,"w":1,"h":1}]"#,
        ] {
            let layout: Layout = serde_json::from_str(json).unwrap();
            assert!(matches!(s.load(layout), Err(EditorError::InvalidItem { .. })));
        }
        // The session is untouched and still usable.
        assert!(s.layout().contains(&"A".into()));
        assert_eq!(s.add_widget("B".into()).unwrap().x, 4);
    }

    #[test]
    fn test_load_rejects_overlap_and_keeps_state() {
        let mut s = session_with(vec![LayoutItem::new("A", 0, 0, 4, 2)]);
        let bad = Layout::new(vec![
            LayoutItem::new("X", 0, 0, 4, 2),
            LayoutItem::new("Y", 1, 1, 4, 2),
        ]);
        assert!(matches!(s.load(bad), Err(EditorError::Overlap { .. })));
        assert!(s.layout().contains(&"A".into()));
    }

    #[test]
    fn test_load_clears_history() {
        let mut s = session();
        s.add_widget("A".into()).unwrap();
        assert!(s.can_undo());
        s.load(Layout::default()).unwrap();
        assert!(!s.can_undo());
        assert!(s.drain_changes().is_empty());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(u8),
        Remove(u8),
        Gesture { target: u8, resize: bool, dx: f32, dy: f32 },
        Undo,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Add),
            (0u8..8).prop_map(Op::Remove),
            (0u8..8, any::<bool>(), -800.0f32..800.0, -300.0f32..300.0).prop_map(
                |(target, resize, dx, dy)| Op::Gesture { target, resize, dx, dy }
            ),
            Just(Op::Undo),
        ]
    }

    proptest! {
        #[test]
        fn prop_committed_layouts_never_overlap(
            ops in prop::collection::vec(op_strategy(), 1..60)
        ) {
            let mut s = session();
            for op in ops {
                match op {
                    Op::Add(n) => {
                        let _ = s.add_widget(WidgetId::new(format!("w{n}")));
                    }
                    Op::Remove(n) => {
                        s.remove_widget(&WidgetId::new(format!("w{n}")));
                    }
                    Op::Gesture { target, resize, dx, dy } => {
                        let kind = if resize { GestureKind::Resize } else { GestureKind::Drag };
                        let id = WidgetId::new(format!("w{target}"));
                        s.pointer_down(kind, &id, pos(0.0, 0.0));
                        s.pointer_move(pos(dx, dy));
                        s.pointer_up();
                    }
                    Op::Undo => {
                        s.undo();
                    }
                }
                prop_assert!(s.interaction().is_idle());
                prop_assert!(s.history().len() <= HISTORY_LIMIT);
                assert_no_overlaps(s.layout());
                prop_assert!(validate_layout(s.layout()).is_ok());
            }
        }

        #[test]
        fn prop_find_slot_on_empty_is_origin(w in 0u32..30, h in 0u32..30) {
            prop_assert_eq!(find_slot(w, h, &Layout::default()).unwrap(), (0, 0));
        }
    }
}
