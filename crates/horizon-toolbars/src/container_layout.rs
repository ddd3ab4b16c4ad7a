//! The four trays around the central area.
//!
//! [`ContainerLayout`] owns one [`TrayLayout`] per [`ToolBarTray`], keeps
//! the ordered list of tracked toolbars together with the toolbar→tray map,
//! and lays the trays out around the central area:
//!
//! ```text
//! +--------------------------------+
//! |              Top               |
//! +------+------------------+------+
//! | Left |     central      | Right|
//! +------+------------------+------+
//! |             Bottom             |
//! +--------------------------------+
//! ```
//!
//! Every mutation leaves tray membership and the map consistent before it
//! returns, and marks the layout dirty. Geometry is recomputed on the next
//! [`activate`](ContainerLayout::activate).

use horizon_toolbars_core::logging::{span_names, targets};
use horizon_toolbars_core::{Margins, PerfSpan, Point, Rect, Signal, Size};
use slotmap::SecondaryMap;

use crate::action::ActionRegistry;
use crate::config::{DockConfig, ToolBarMetrics};
use crate::state::{LayoutState, TrayState};
use crate::tool_bar::{ToolBar, ToolBarId, ToolBarOptions};
use crate::tray::ToolBarTray;
use crate::tray_layout::{ToolBarAccess, TrayLayout};

/// Coordinates the trays of a window.
#[derive(Debug)]
pub struct ContainerLayout {
    trays: [TrayLayout; 4],
    /// Tracked toolbars in insertion order.
    tool_bars: Vec<ToolBarId>,
    tool_bar_tray: SecondaryMap<ToolBarId, ToolBarTray>,
    geometry: Rect,
    contents_margins: Margins,
    central_size_hint: Size,
    central_minimum_size: Size,
    central_rect: Rect,
    dirty: bool,

    /// Emitted before a toolbar is tracked, with the index it will get.
    pub tool_bar_about_to_be_inserted: Signal<(ToolBarId, usize)>,
    /// Emitted after a toolbar was tracked.
    pub tool_bar_inserted: Signal<ToolBarId>,
    /// Emitted before a toolbar stops being tracked, with its index.
    pub tool_bar_about_to_be_removed: Signal<(ToolBarId, usize)>,
    /// Emitted after a toolbar stopped being tracked.
    pub tool_bar_removed: Signal<()>,
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLayout {
    /// Create a container with four empty trays.
    pub fn new() -> Self {
        Self {
            trays: ToolBarTray::ALL.map(TrayLayout::new),
            tool_bars: Vec::new(),
            tool_bar_tray: SecondaryMap::new(),
            geometry: Rect::ZERO,
            contents_margins: Margins::ZERO,
            central_size_hint: Size::ZERO,
            central_minimum_size: Size::ZERO,
            central_rect: Rect::ZERO,
            dirty: true,
            tool_bar_about_to_be_inserted: Signal::new(),
            tool_bar_inserted: Signal::new(),
            tool_bar_about_to_be_removed: Signal::new(),
            tool_bar_removed: Signal::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn tray(&self, tray: ToolBarTray) -> &TrayLayout {
        &self.trays[tray.index()]
    }

    /// Number of tracked toolbars.
    pub fn tool_bar_count(&self) -> usize {
        self.tool_bars.len()
    }

    /// Tracked toolbar at `index`, in insertion order.
    pub fn tool_bar_at(&self, index: usize) -> Option<ToolBarId> {
        self.tool_bars.get(index).copied()
    }

    pub fn tool_bars(&self) -> &[ToolBarId] {
        &self.tool_bars
    }

    pub fn contains(&self, id: ToolBarId) -> bool {
        self.tool_bar_tray.contains_key(id)
    }

    /// Tray a toolbar belongs to, or `None` if it is not tracked.
    pub fn tool_bar_tray(&self, id: ToolBarId) -> Option<ToolBarTray> {
        self.tool_bar_tray.get(id).copied()
    }

    fn index_of(&self, id: ToolBarId) -> Option<usize> {
        self.tool_bars.iter().position(|&tracked| tracked == id)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Mark the geometry as needing recalculation.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute geometry if anything changed since the last pass.
    pub fn activate<S: ToolBarAccess>(&mut self, storage: &mut S) {
        if self.dirty {
            self.set_geometry(storage, self.geometry);
        }
    }

    // =========================================================================
    // Tracking
    // =========================================================================

    /// Dock a toolbar at the end of the last row of `tray`.
    ///
    /// A toolbar that is already tracked is removed first, so re-adding
    /// moves it.
    pub fn add_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        tray: ToolBarTray,
        id: ToolBarId,
    ) {
        self.insert_into(storage, tray, None, id);
    }

    /// Dock a toolbar just before `before`, in `before`'s tray.
    pub fn insert_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        before: ToolBarId,
        id: ToolBarId,
    ) {
        let Some(tray) = self.tool_bar_tray(before) else {
            tracing::warn!(
                target: targets::CONTAINER,
                "insert_tool_bar: the toolbar to insert before is not tracked"
            );
            return;
        };
        if before == id {
            tracing::warn!(
                target: targets::CONTAINER,
                "insert_tool_bar: cannot insert a toolbar before itself"
            );
            return;
        }
        self.insert_into(storage, tray, Some(before), id);
    }

    fn insert_into<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        tray: ToolBarTray,
        before: Option<ToolBarId>,
        id: ToolBarId,
    ) {
        if storage.tool_bar(id).is_none() {
            tracing::warn!(target: targets::CONTAINER, "insert_tool_bar: unknown toolbar");
            return;
        }
        if self.contains(id) {
            self.remove_tool_bar(id);
        }

        self.tool_bar_about_to_be_inserted
            .emit((id, self.tool_bars.len()));

        self.tool_bars.push(id);
        self.tool_bar_tray.insert(id, tray);
        if !self.trays[tray.index()].insert_tool_bar(storage, before, id) {
            // `before` was validated against the map, so the tray must know it
            tracing::warn!(
                target: targets::CONTAINER,
                ?tray,
                "toolbar map out of sync with tray rows, appending"
            );
            self.trays[tray.index()].insert_tool_bar(storage, None, id);
        }
        self.invalidate();

        tracing::debug!(
            target: targets::CONTAINER,
            ?tray,
            index = self.tool_bars.len() - 1,
            "toolbar inserted"
        );
        self.tool_bar_inserted.emit(id);
    }

    /// Stop tracking a toolbar and take it out of its tray.
    ///
    /// Returns `false` if the toolbar was not tracked.
    pub fn remove_tool_bar(&mut self, id: ToolBarId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.tool_bar_about_to_be_removed.emit((id, index));

        self.tool_bars.remove(index);
        if let Some(tray) = self.tool_bar_tray.remove(id) {
            self.trays[tray.index()].take_tool_bar(id);
        }
        self.invalidate();

        tracing::debug!(target: targets::CONTAINER, index, "toolbar removed");
        self.tool_bar_removed.emit(());
        true
    }

    /// Start a new row after the last row of `tray`.
    pub fn add_tool_bar_break(&mut self, tray: ToolBarTray) {
        self.trays[tray.index()].insert_tool_bar_break(None);
        self.invalidate();
    }

    /// Start a new row at `before`.
    pub fn insert_tool_bar_break(&mut self, before: ToolBarId) {
        let Some(tray) = self.tool_bar_tray(before) else {
            tracing::warn!(
                target: targets::CONTAINER,
                "insert_tool_bar_break: toolbar is not tracked"
            );
            return;
        };
        self.trays[tray.index()].insert_tool_bar_break(Some(before));
        self.invalidate();
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    /// Move a docked toolbar being dragged. See [`TrayLayout::move_tool_bar`].
    pub fn move_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        id: ToolBarId,
        pos: Point,
        cursor: Point,
        config: &DockConfig,
    ) {
        let Some(tray) = self.tool_bar_tray(id) else {
            return;
        };
        self.trays[tray.index()].move_tool_bar(storage, id, pos, cursor, config.dock_margin);
        self.invalidate();
    }

    /// Settle the row of a toolbar after its drag ended.
    pub fn adjust_tool_bar_row<S: ToolBarAccess>(&mut self, storage: &S, id: ToolBarId) {
        let Some(tray) = self.tool_bar_tray(id) else {
            return;
        };
        self.trays[tray.index()].adjust_tool_bar_row(storage, id);
        self.invalidate();
    }

    /// Offer a floating toolbar dragged to `cursor` to every allowed tray.
    ///
    /// The first tray that accepts it docks it in a new row. Returns whether
    /// the toolbar docked.
    pub fn hover_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        id: ToolBarId,
        cursor: Point,
        config: &DockConfig,
    ) -> bool {
        let Some(owner) = self.tool_bar_tray(id) else {
            return false;
        };
        let Some(allowed) = storage.tool_bar(id).map(ToolBar::allowed_trays) else {
            return false;
        };

        for tray in ToolBarTray::ALL {
            if !allowed.contains(tray) {
                continue;
            }
            let Some(docked_rect) = self.trays[tray.index()].can_dock(
                storage,
                id,
                cursor,
                config.empty_tray_extent,
            ) else {
                continue;
            };

            self.trays[owner.index()].take_tool_bar(id);
            self.trays[tray.index()].plug_tool_bar(storage, id, docked_rect);
            self.tool_bar_tray.insert(id, tray);
            self.invalidate();
            tracing::debug!(target: targets::CONTAINER, from = ?owner, to = ?tray, "toolbar hover-docked");
            return true;
        }
        false
    }

    // =========================================================================
    // Central area
    // =========================================================================

    pub fn set_central_size_hint(&mut self, size: Size) {
        self.central_size_hint = size;
        self.invalidate();
    }

    pub fn set_central_minimum_size(&mut self, size: Size) {
        self.central_minimum_size = size;
        self.invalidate();
    }

    /// Rectangle assigned to the central area by the last geometry pass.
    pub fn central_rect(&self) -> Rect {
        self.central_rect
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn contents_margins(&self) -> Margins {
        self.contents_margins
    }

    pub fn set_contents_margins(&mut self, margins: Margins) {
        self.contents_margins = margins;
        self.invalidate();
    }

    /// Lay out the trays and the central area in `rect`.
    ///
    /// Top and bottom trays take full-width strips at their preferred
    /// height. Left and right trays take the span between them at their
    /// preferred width. The central area gets the rest.
    pub fn set_geometry<S: ToolBarAccess>(&mut self, storage: &mut S, rect: Rect) {
        let _span = PerfSpan::new(span_names::GEOMETRY_PASS);
        self.geometry = rect;
        let contents = rect.margins_removed(self.contents_margins);

        let top = self.tray(ToolBarTray::Top).size_hint(storage).height;
        let bottom = self.tray(ToolBarTray::Bottom).size_hint(storage).height;
        let left = self.tray(ToolBarTray::Left).size_hint(storage).width;
        let right = self.tray(ToolBarTray::Right).size_hint(storage).width;

        let (x, y) = (contents.left(), contents.top());
        let width = contents.width();
        let center_width = (width - (left + right)).max(0);
        let center_height = (contents.height() - (top + bottom)).max(0);

        let rects = [
            (ToolBarTray::Top, Rect::new(x, y, width, top)),
            (ToolBarTray::Left, Rect::new(x, y + top, left, center_height)),
            (
                ToolBarTray::Right,
                Rect::new(x + width - right, y + top, right, center_height),
            ),
            (
                ToolBarTray::Bottom,
                Rect::new(x, y + top + center_height, width, bottom),
            ),
        ];
        for (tray, rect) in rects {
            self.trays[tray.index()].set_geometry(storage, rect);
        }

        self.central_rect = Rect::new(x + left, y + top, center_width, center_height);
        self.dirty = false;
    }

    /// Preferred size of trays and central area together.
    pub fn size_hint<S: ToolBarAccess>(&self, storage: &S) -> Size {
        self.layout_size(
            |tray| tray.size_hint(storage),
            self.central_size_hint,
        )
    }

    /// Minimum size of trays and central area together.
    pub fn minimum_size<S: ToolBarAccess>(&self, storage: &S) -> Size {
        self.layout_size(
            |tray| tray.minimum_size(storage),
            self.central_minimum_size,
        )
    }

    fn layout_size(&self, tray_size: impl Fn(&TrayLayout) -> Size, central: Size) -> Size {
        let [top, left, right, bottom] = [
            ToolBarTray::Top,
            ToolBarTray::Left,
            ToolBarTray::Right,
            ToolBarTray::Bottom,
        ]
        .map(|tray| tray_size(self.tray(tray)));

        let width = top
            .width
            .max(left.width + central.width + right.width)
            .max(bottom.width);
        let height =
            top.height + left.height.max(central.height).max(right.height) + bottom.height;
        Size::new(width, height).grown_by(self.contents_margins)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Persisted form of all trays.
    pub fn save_state<S: ToolBarAccess>(&self, storage: &S, registry: &ActionRegistry) -> LayoutState {
        LayoutState {
            trays: ToolBarTray::ALL.map(|tray| self.tray(tray).state(storage, registry)),
        }
    }

    /// Replace the layout of every tray with a decoded state.
    ///
    /// Custom toolbars are destroyed and recreated from the state. Other
    /// toolbars are matched by object name; entries without a match are
    /// skipped, and tracked toolbars the state does not mention go back to
    /// the end of their previous tray.
    pub fn restore_state<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        registry: &mut ActionRegistry,
        metrics: &ToolBarMetrics,
        state: &LayoutState,
    ) {
        let _span = PerfSpan::new(span_names::RESTORE);

        let custom: Vec<ToolBarId> = self
            .tool_bars
            .iter()
            .copied()
            .filter(|&id| storage.tool_bar(id).is_some_and(ToolBar::is_custom))
            .collect();
        for id in custom {
            self.tool_bars.retain(|&tracked| tracked != id);
            self.tool_bar_tray.remove(id);
            storage.remove_tool_bar(id);
        }

        let mut claimed = Vec::new();
        let mut resolved = Vec::with_capacity(ToolBarTray::ALL.len());
        for tray in ToolBarTray::ALL {
            resolved.push(self.resolve_tray(storage, metrics, state.tray(tray), &mut claimed));
        }
        for (tray, resolved) in ToolBarTray::ALL.into_iter().zip(&resolved) {
            self.trays[tray.index()].apply_state(storage, registry, state.tray(tray), resolved);
        }

        let previous = std::mem::take(&mut self.tool_bar_tray);
        for &id in &self.tool_bars {
            if self.trays.iter().any(|tray| tray.has_tool_bar(id)) {
                continue;
            }
            let tray = previous.get(id).copied().unwrap_or_default();
            self.trays[tray.index()].insert_tool_bar(storage, None, id);
            tracing::debug!(
                target: targets::STATE,
                ?tray,
                "toolbar missing from saved state, kept in its tray"
            );
        }

        for &id in &self.tool_bars {
            if let Some(tray) = self.trays.iter().find(|tray| tray.has_tool_bar(id)) {
                self.tool_bar_tray.insert(id, tray.tray());
            }
        }
        self.invalidate();

        tracing::debug!(
            target: targets::STATE,
            tool_bars = self.tool_bars.len(),
            "layout restored"
        );
    }

    /// Map every entry of a tray state to a live toolbar, creating custom
    /// toolbars as needed. A toolbar already in `claimed` is not matched
    /// again.
    fn resolve_tray<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        metrics: &ToolBarMetrics,
        state: &TrayState,
        claimed: &mut Vec<ToolBarId>,
    ) -> Vec<Vec<Option<ToolBarId>>> {
        state
            .rows
            .iter()
            .map(|row| {
                row.items
                    .iter()
                    .map(|item| {
                        if item.is_custom {
                            let tool_bar = ToolBar::new(item.name.clone(), metrics)
                                .with_options(ToolBarOptions::IS_CUSTOM);
                            let id = storage.insert_tool_bar(tool_bar);
                            self.tool_bars.push(id);
                            return Some(id);
                        }
                        if item.name.is_empty() {
                            return None;
                        }
                        let found = self.tool_bars.iter().copied().find(|&id| {
                            !claimed.contains(&id)
                                && storage
                                    .tool_bar(id)
                                    .is_some_and(|tool_bar| tool_bar.object_name() == item.name)
                        });
                        match found {
                            Some(id) => claimed.push(id),
                            None => tracing::debug!(
                                target: targets::STATE,
                                name = %item.name,
                                "no toolbar with this name, skipping"
                            ),
                        }
                        found
                    })
                    .collect()
            })
            .collect()
    }
}

static_assertions::assert_impl_all!(ContainerLayout: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionRegistry};
    use crate::tray::ToolBarTrays;
    use slotmap::SlotMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Storage = SlotMap<ToolBarId, ToolBar>;

    fn new_tool_bar(
        storage: &mut Storage,
        registry: &mut ActionRegistry,
        name: &str,
        buttons: usize,
    ) -> ToolBarId {
        let mut tool_bar = ToolBar::new(name, &ToolBarMetrics::default()).with_object_name(name);
        for i in 0..buttons {
            let action = Action::new(format!("{name}-{i}")).with_object_name(format!("{name}-{i}"));
            let id = registry.insert(action.clone());
            registry.mark_known(id);
            tool_bar.add_action(id, &action);
        }
        storage.insert(tool_bar)
    }

    #[test]
    fn test_add_tracks_tray_and_order() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Left, b);

        assert_eq!(container.tool_bar_count(), 2);
        assert_eq!(container.tool_bar_at(0), Some(a));
        assert_eq!(container.tool_bar_at(1), Some(b));
        assert_eq!(container.tool_bar_at(2), None);
        assert_eq!(container.tool_bar_tray(a), Some(ToolBarTray::Top));
        assert_eq!(container.tool_bar_tray(b), Some(ToolBarTray::Left));
        assert_eq!(
            storage[b].docked_orientation(),
            ToolBarTray::Left.orientation()
        );
    }

    #[test]
    fn test_readd_moves_with_one_notification_pair() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);

        let mut container = ContainerLayout::new();
        let inserted = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));
        let inserted_clone = inserted.clone();
        container.tool_bar_inserted.connect(move |_| {
            inserted_clone.fetch_add(1, Ordering::SeqCst);
        });
        let removed_clone = removed.clone();
        container.tool_bar_removed.connect(move |_| {
            removed_clone.fetch_add(1, Ordering::SeqCst);
        });

        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, a);

        assert_eq!(container.tool_bar_count(), 1);
        assert_eq!(container.tool_bar_tray(a), Some(ToolBarTray::Bottom));
        assert_eq!(container.tray(ToolBarTray::Top).count(), 0);
        assert_eq!(container.tray(ToolBarTray::Bottom).count(), 1);
        assert_eq!(inserted.load(Ordering::SeqCst), 2);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_about_to_be_signals_carry_index() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);

        let mut container = ContainerLayout::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        container
            .tool_bar_about_to_be_inserted
            .connect(move |&(_, index)| seen_clone.lock().push(("insert", index)));
        let seen_clone = seen.clone();
        container
            .tool_bar_about_to_be_removed
            .connect(move |&(_, index)| seen_clone.lock().push(("remove", index)));

        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Top, b);
        assert!(container.remove_tool_bar(a));
        assert!(!container.remove_tool_bar(a));

        assert_eq!(
            *seen.lock(),
            vec![("insert", 0), ("insert", 1), ("remove", 0)]
        );
        assert_eq!(container.tool_bar_at(0), Some(b));
        assert_eq!(container.tool_bar_tray(a), None);
    }

    #[test]
    fn test_insert_before_untracked_is_ignored() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);

        let mut container = ContainerLayout::new();
        container.insert_tool_bar(&mut storage, a, b);
        assert_eq!(container.tool_bar_count(), 0);

        container.add_tool_bar(&mut storage, ToolBarTray::Right, a);
        container.insert_tool_bar(&mut storage, a, b);
        assert_eq!(container.tool_bar_tray(b), Some(ToolBarTray::Right));
        let row = &container.tray(ToolBarTray::Right).rows()[0];
        assert_eq!(row.items[0].tool_bar, b);
        assert_eq!(row.items[1].tool_bar, a);
    }

    #[test]
    fn test_geometry_pass() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let top = new_tool_bar(&mut storage, &mut registry, "top", 2);
        let left = new_tool_bar(&mut storage, &mut registry, "left", 2);
        let bottom = new_tool_bar(&mut storage, &mut registry, "bottom", 1);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, top);
        container.add_tool_bar(&mut storage, ToolBarTray::Left, left);
        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, bottom);
        assert!(container.is_dirty());

        container.set_geometry(&mut storage, Rect::new(0, 0, 800, 600));
        assert!(!container.is_dirty());

        let left_width = storage[left].size_hint().width;
        // docked horizontal toolbars are 38 high
        assert_eq!(storage[top].geometry(), Rect::new(0, 0, 78, 38));
        assert_eq!(storage[left].pos(), Point::new(0, 38));
        assert_eq!(storage[bottom].geometry(), Rect::new(0, 562, 48, 38));
        assert_eq!(
            container.central_rect(),
            Rect::new(left_width, 38, 800 - left_width, 600 - 76)
        );
    }

    #[test]
    fn test_size_hint_includes_central_area() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let top = new_tool_bar(&mut storage, &mut registry, "top", 1);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, top);
        container.set_central_size_hint(Size::new(200, 100));
        container.set_contents_margins(Margins::uniform(5));

        assert_eq!(container.size_hint(&storage), Size::new(210, 148));
    }

    #[test]
    fn test_hover_docks_into_new_row() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Top, b);
        container.set_geometry(&mut storage, Rect::new(0, 0, 800, 600));

        storage[b].undock(Point::new(200, 200));
        // floating contents sit at (+4, +28), docked ones at (+14, +4): the
        // docked footprint of this position starts at y = 10
        storage[b].move_to(Point::new(100, -14));
        assert_eq!(storage[b].docked_rect(ToolBarTray::Top.orientation()).top(), 10);

        let config = DockConfig::default();
        assert!(container.hover_tool_bar(&mut storage, b, Point::new(110, 0), &config));
        assert!(!storage[b].is_floating());
        assert_eq!(container.tool_bar_tray(b), Some(ToolBarTray::Top));
        let rows = container.tray(ToolBarTray::Top).rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].items[0].tool_bar, b);
        assert_eq!(rows[1].items[0].tool_bar, a);
    }

    #[test]
    fn test_hover_respects_allowed_trays() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);
        storage[b].set_allowed_trays(ToolBarTrays::BOTTOM);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, b);
        container.set_geometry(&mut storage, Rect::new(0, 0, 800, 600));

        storage[b].undock(Point::new(200, 200));
        storage[b].move_to(Point::new(100, -14));
        let config = DockConfig::default();
        assert!(!container.hover_tool_bar(&mut storage, b, Point::new(110, 0), &config));
        assert!(storage[b].is_floating());
        assert_eq!(container.tool_bar_tray(b), Some(ToolBarTray::Bottom));
    }

    #[test]
    fn test_restore_moves_back_and_recreates_custom() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let metrics = ToolBarMetrics::default();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 2);
        let b = new_tool_bar(&mut storage, &mut registry, "b", 1);
        let custom = storage.insert(
            ToolBar::new("My Tools", &metrics).with_options(ToolBarOptions::IS_CUSTOM),
        );

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        container.add_tool_bar(&mut storage, ToolBarTray::Left, b);
        container.add_tool_bar(&mut storage, ToolBarTray::Right, custom);
        let state = container.save_state(&storage, &registry);

        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, a);
        container.remove_tool_bar(b);
        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, b);
        container.restore_state(&mut storage, &mut registry, &metrics, &state);

        assert_eq!(container.tool_bar_tray(a), Some(ToolBarTray::Top));
        assert_eq!(container.tool_bar_tray(b), Some(ToolBarTray::Left));
        assert_eq!(container.tool_bar_count(), 3);
        assert!(!storage.contains_key(custom));

        let recreated = container.tray(ToolBarTray::Right).rows()[0].items[0].tool_bar;
        assert!(storage[recreated].is_custom());
        assert_eq!(storage[recreated].title(), "My Tools");
        assert_eq!(container.tool_bar_tray(recreated), Some(ToolBarTray::Right));
    }

    #[test]
    fn test_restore_keeps_unmentioned_tool_bars() {
        let mut storage = Storage::with_key();
        let mut registry = ActionRegistry::new();
        let metrics = ToolBarMetrics::default();
        let a = new_tool_bar(&mut storage, &mut registry, "a", 1);

        let mut container = ContainerLayout::new();
        container.add_tool_bar(&mut storage, ToolBarTray::Top, a);
        let state = container.save_state(&storage, &registry);

        let late = new_tool_bar(&mut storage, &mut registry, "late", 1);
        container.add_tool_bar(&mut storage, ToolBarTray::Bottom, late);
        container.restore_state(&mut storage, &mut registry, &metrics, &state);

        assert_eq!(container.tool_bar_count(), 2);
        assert_eq!(container.tool_bar_tray(late), Some(ToolBarTray::Bottom));
        assert_eq!(container.tray(ToolBarTray::Bottom).count(), 1);
    }
}
