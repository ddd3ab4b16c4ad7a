//! Row management for one tray.
//!
//! A [`TrayLayout`] keeps the toolbars docked in one tray as a list of rows.
//! Each row holds toolbars with a position along the tray; positions are what
//! the user chose by dragging and are only clamped, never rewritten, when the
//! row is laid out. Floating and hidden toolbars keep their row membership
//! but take no space.
//!
//! Like the layouts it is modeled on, the tray does not own toolbars. It
//! reaches them through a [`ToolBarAccess`] storage passed to each call.

use horizon_toolbars_core::logging::targets;
use horizon_toolbars_core::{Margins, Orientation, Point, Rect, Size};
use slotmap::SlotMap;

use crate::action::ActionRegistry;
use crate::state::{TrayItemState, TrayRowState, TrayState};
use crate::tool_bar::{ToolBar, ToolBarId};
use crate::tray::ToolBarTray;

// ============================================================================
// ToolBarAccess
// ============================================================================

/// Access to toolbar storage for layout operations.
///
/// Layouts hold [`ToolBarId`]s only; the window owns the toolbars and lends
/// them out through this trait.
pub trait ToolBarAccess {
    /// Get a toolbar by its ID.
    fn tool_bar(&self, id: ToolBarId) -> Option<&ToolBar>;

    /// Get a mutable reference to a toolbar by its ID.
    fn tool_bar_mut(&mut self, id: ToolBarId) -> Option<&mut ToolBar>;

    /// Take ownership of a new toolbar and return its ID.
    fn insert_tool_bar(&mut self, tool_bar: ToolBar) -> ToolBarId;

    /// Destroy a toolbar.
    fn remove_tool_bar(&mut self, id: ToolBarId) -> Option<ToolBar>;
}

impl ToolBarAccess for SlotMap<ToolBarId, ToolBar> {
    fn tool_bar(&self, id: ToolBarId) -> Option<&ToolBar> {
        self.get(id)
    }

    fn tool_bar_mut(&mut self, id: ToolBarId) -> Option<&mut ToolBar> {
        self.get_mut(id)
    }

    fn insert_tool_bar(&mut self, tool_bar: ToolBar) -> ToolBarId {
        self.insert(tool_bar)
    }

    fn remove_tool_bar(&mut self, id: ToolBarId) -> Option<ToolBar> {
        self.remove(id)
    }
}

fn occupying_size_hint<S: ToolBarAccess>(storage: &S, id: ToolBarId) -> Size {
    storage
        .tool_bar(id)
        .filter(|tool_bar| tool_bar.occupies_tray())
        .map_or(Size::ZERO, ToolBar::size_hint)
}

fn occupying_minimum_size<S: ToolBarAccess>(storage: &S, id: ToolBarId) -> Size {
    storage
        .tool_bar(id)
        .filter(|tool_bar| tool_bar.occupies_tray())
        .map_or(Size::ZERO, ToolBar::minimum_size)
}

// ============================================================================
// Rows
// ============================================================================

/// A toolbar placed in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayItem {
    pub tool_bar: ToolBarId,
    /// Requested position along the tray.
    pub pos: i32,
    /// Extent along the tray assigned by the last layout pass.
    pub size: i32,
}

impl TrayItem {
    fn new(tool_bar: ToolBarId, pos: i32) -> Self {
        Self {
            tool_bar,
            pos,
            size: 0,
        }
    }
}

/// A row of toolbars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrayRow {
    pub items: Vec<TrayItem>,
    /// Offset of the row across the tray.
    pub pos: i32,
    pub size_hint: Size,
    pub minimum_size: Size,
}

impl TrayRow {
    fn position_of(&self, id: ToolBarId) -> Option<usize> {
        self.items.iter().position(|item| item.tool_bar == id)
    }
}

// ============================================================================
// TrayLayout
// ============================================================================

/// Rows of docked toolbars in one tray.
#[derive(Debug, Clone)]
pub struct TrayLayout {
    tray: ToolBarTray,
    orientation: Orientation,
    contents_margins: Margins,
    contents_rect: Rect,
    rows: Vec<TrayRow>,
}

impl TrayLayout {
    /// Create an empty tray.
    pub fn new(tray: ToolBarTray) -> Self {
        Self {
            tray,
            orientation: tray.orientation(),
            contents_margins: Margins::ZERO,
            contents_rect: Rect::ZERO,
            rows: Vec::new(),
        }
    }

    pub fn tray(&self) -> ToolBarTray {
        self.tray
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn contents_margins(&self) -> Margins {
        self.contents_margins
    }

    pub fn set_contents_margins(&mut self, margins: Margins) {
        self.contents_margins = margins;
    }

    /// Rectangle assigned by the last layout pass, minus margins.
    pub fn contents_rect(&self) -> Rect {
        self.contents_rect
    }

    pub fn rows(&self) -> &[TrayRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of toolbars in all rows.
    pub fn count(&self) -> usize {
        self.rows.iter().map(|row| row.items.len()).sum()
    }

    /// Toolbars in row order.
    pub fn tool_bars(&self) -> impl Iterator<Item = ToolBarId> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.items.iter().map(|item| item.tool_bar))
    }

    pub fn has_tool_bar(&self, id: ToolBarId) -> bool {
        self.find_item(id).is_some()
    }

    /// Row and index of a toolbar.
    pub fn find_item(&self, id: ToolBarId) -> Option<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .find_map(|(index, row)| row.position_of(id).map(|item| (index, item)))
    }

    fn docked_count<S: ToolBarAccess>(storage: &S, row: &TrayRow) -> usize {
        row.items
            .iter()
            .filter(|item| {
                storage
                    .tool_bar(item.tool_bar)
                    .is_some_and(ToolBar::occupies_tray)
            })
            .count()
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    fn measure_row<S: ToolBarAccess>(&self, storage: &S, row: &TrayRow) -> (Size, Size) {
        let o = self.orientation;
        let (mut along_hint, mut across_hint) = (0, 0);
        let (mut along_min, mut across_min) = (0, 0);
        for item in &row.items {
            let hint = occupying_size_hint(storage, item.tool_bar);
            along_hint += o.pick(hint);
            across_hint = across_hint.max(o.perp(hint));
            let minimum = occupying_minimum_size(storage, item.tool_bar);
            along_min += o.pick(minimum);
            across_min = across_min.max(o.perp(minimum));
        }
        (
            o.make_size(along_hint, across_hint),
            o.make_size(along_min, across_min),
        )
    }

    /// Refresh row size hints and stack the rows across the tray.
    pub fn update_row_sizes<S: ToolBarAccess>(&mut self, storage: &S) {
        let measured: Vec<(Size, Size)> = self
            .rows
            .iter()
            .map(|row| self.measure_row(storage, row))
            .collect();
        let mut pos = 0;
        for (row, (size_hint, minimum_size)) in self.rows.iter_mut().zip(measured) {
            row.size_hint = size_hint;
            row.minimum_size = minimum_size;
            row.pos = pos;
            pos += self.orientation.perp(size_hint);
        }
    }

    /// Preferred size: the widest row by the summed row depths.
    pub fn size_hint<S: ToolBarAccess>(&self, storage: &S) -> Size {
        self.stacked_size(storage, |(hint, _)| hint)
    }

    /// Minimum size: the widest row minimum by the summed row depths.
    pub fn minimum_size<S: ToolBarAccess>(&self, storage: &S) -> Size {
        self.stacked_size(storage, |(_, minimum)| minimum)
    }

    fn stacked_size<S: ToolBarAccess>(
        &self,
        storage: &S,
        select: impl Fn((Size, Size)) -> Size,
    ) -> Size {
        let o = self.orientation;
        let (mut along, mut across) = (0, 0);
        for row in &self.rows {
            let size = select(self.measure_row(storage, row));
            along = along.max(o.pick(size));
            across += o.perp(size);
        }
        o.make_size(along, across).grown_by(self.contents_margins)
    }

    fn total_depth(&self) -> i32 {
        self.rows
            .iter()
            .map(|row| self.orientation.perp(row.size_hint))
            .sum()
    }

    // =========================================================================
    // Geometry pass
    // =========================================================================

    /// Assign the tray rectangle and place every docked toolbar.
    pub fn set_geometry<S: ToolBarAccess>(&mut self, storage: &mut S, rect: Rect) {
        self.contents_rect = rect.margins_removed(self.contents_margins);
        self.do_layout(storage);
    }

    fn do_layout<S: ToolBarAccess>(&mut self, storage: &mut S) {
        self.update_row_sizes(storage);

        let o = self.orientation;
        let top_left = self.contents_rect.top_left();
        let available = o.pick(self.contents_rect.size);

        let mut placements = Vec::new();
        for row in &self.rows {
            let moving = row.items.iter().map(|item| item.tool_bar).find(|&id| {
                storage.tool_bar(id).is_some_and(ToolBar::is_moving)
            });
            let items = match moving {
                Some(pivot) => self.adjust_row(storage, row, pivot),
                None => {
                    let mut items = row.items.clone();
                    items.sort_by_key(|item| item.pos);
                    let mut used = Self::adjust_item_sizes(storage, o, &mut items, available);
                    let mut start = 0;
                    for item in &mut items {
                        used -= item.size;
                        item.pos = item.pos.min(available - used - item.size).max(start);
                        start = item.pos + item.size;
                    }
                    items
                }
            };
            placements.extend(items.into_iter().map(|item| (item, row.pos)));
        }

        for (item, row_pos) in placements {
            let Some(tool_bar) = storage.tool_bar_mut(item.tool_bar) else {
                continue;
            };
            if !tool_bar.occupies_tray() {
                continue;
            }
            let hint = tool_bar.size_hint();
            let size = o.make_size(item.size, o.perp(hint));
            let pos = top_left + o.make_point(item.pos, row_pos);
            tool_bar.set_geometry(Rect::from_origin_size(pos, size));
        }
    }

    /// Shrink items toward their minimum so the row fits `available`.
    /// Returns the total extent used.
    fn adjust_item_sizes<S: ToolBarAccess>(
        storage: &S,
        o: Orientation,
        items: &mut [TrayItem],
        available: i32,
    ) -> i32 {
        let minimum: i32 = items
            .iter()
            .map(|item| o.pick(occupying_minimum_size(storage, item.tool_bar)))
            .sum();
        let mut extra = (available - minimum).max(0);
        let mut used = 0;
        for item in items.iter_mut() {
            let item_minimum = o.pick(occupying_minimum_size(storage, item.tool_bar));
            let item_hint = o.pick(occupying_size_hint(storage, item.tool_bar));
            let item_extra = (item_hint - item_minimum).max(0).min(extra);
            item.size = item_minimum + item_extra;
            extra -= item_extra;
            used += item.size;
        }
        used
    }

    /// Lay out a row around `pivot`: the pivot keeps its requested position
    /// as far as the space used by its neighbors allows, and the neighbors
    /// are pushed aside so nothing overlaps.
    fn adjust_row<S: ToolBarAccess>(
        &self,
        storage: &S,
        row: &TrayRow,
        pivot: ToolBarId,
    ) -> Vec<TrayItem> {
        let o = self.orientation;
        let mut items = row.items.clone();
        items.sort_by_key(|item| item.pos);
        let Some(pivot_index) = items.iter().position(|item| item.tool_bar == pivot) else {
            return items;
        };

        let available = o.pick(self.contents_rect.size);
        Self::adjust_item_sizes(storage, o, &mut items, available);

        let used_before: i32 = items[..pivot_index].iter().map(|item| item.size).sum();
        let used_after: i32 = items[pivot_index + 1..].iter().map(|item| item.size).sum();
        let pivot_size = items[pivot_index].size;
        let mut pivot_pos = items[pivot_index].pos.max(used_before);
        pivot_pos = pivot_pos.min(available - used_after - pivot_size).max(0);
        items[pivot_index].pos = pivot_pos;

        let adjust_range = |items: &mut [TrayItem], mut left: i32, right: i32, mut used: i32| {
            for item in items {
                used -= item.size;
                item.pos = item.pos.min(right - used - item.size).max(left);
                left = item.pos + item.size;
            }
        };
        let (before, rest) = items.split_at_mut(pivot_index);
        adjust_range(before, 0, pivot_pos, used_before);
        adjust_range(&mut rest[1..], pivot_pos + pivot_size, available, used_after);

        items
    }

    /// Settle the row of a toolbar after a drag ended.
    pub fn adjust_tool_bar_row<S: ToolBarAccess>(&mut self, storage: &S, id: ToolBarId) {
        let Some((row, _)) = self.find_item(id) else {
            return;
        };
        let items = self.adjust_row(storage, &self.rows[row], id);
        self.rows[row].items = items;
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Dock a toolbar before `before`, or at the end of the last row.
    ///
    /// Returns `false` without changes when `before` is not in this tray.
    pub fn insert_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        before: Option<ToolBarId>,
        id: ToolBarId,
    ) -> bool {
        let (row, index) = match before {
            None => {
                if self.rows.is_empty() {
                    self.rows.push(TrayRow::default());
                }
                let row = self.rows.len() - 1;
                (row, self.rows[row].items.len())
            }
            Some(before) => match self.find_item(before) {
                Some(path) => path,
                None => return false,
            },
        };

        let o = self.orientation;
        let items = &mut self.rows[row].items;
        let pos = items[..index]
            .iter()
            .map(|item| o.pick(occupying_size_hint(storage, item.tool_bar)))
            .sum();
        items.insert(index, TrayItem::new(id, pos));
        let size = o.pick(occupying_size_hint(storage, id));
        for item in &mut items[index + 1..] {
            item.pos += size;
        }

        if let Some(tool_bar) = storage.tool_bar_mut(id) {
            tool_bar.set_docked_orientation(o);
            tool_bar.set_window_state(false, Point::ZERO);
        }
        true
    }

    /// Start a new row at `before`, or after the last row.
    ///
    /// Nothing happens when `before` already starts a row, or when the last
    /// row is empty.
    pub fn insert_tool_bar_break(&mut self, before: Option<ToolBarId>) {
        let Some(before) = before else {
            if self.rows.last().is_some_and(|row| !row.items.is_empty()) {
                self.rows.push(TrayRow::default());
            }
            return;
        };
        let Some((row, index)) = self.find_item(before) else {
            return;
        };
        if index == 0 {
            return;
        }
        let mut right = self.rows[row].items.split_off(index);
        let offset = right.first().map_or(0, |item| item.pos);
        for item in &mut right {
            item.pos -= offset;
        }
        self.rows.insert(
            row + 1,
            TrayRow {
                items: right,
                ..TrayRow::default()
            },
        );
    }

    /// Remove a toolbar from its row, dropping the row if it became empty.
    ///
    /// Returns whether a row was removed, or `None` if the toolbar is not in
    /// this tray.
    pub fn take_tool_bar(&mut self, id: ToolBarId) -> Option<bool> {
        let (row, index) = self.find_item(id)?;
        self.rows[row].items.remove(index);
        let row_removed = self.rows[row].items.is_empty();
        if row_removed {
            self.rows.remove(row);
        }
        Some(row_removed)
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    /// Move a docked toolbar being dragged so its corner is at `pos`.
    ///
    /// `cursor` is the live pointer position. The toolbar floats when the
    /// pointer leaves the tray along its length by more than `dock_margin`,
    /// or when it is dragged past the outermost row it alone occupies.
    /// Dragging past the outermost rows otherwise opens a new row, and
    /// dragging over another row moves the toolbar into it if it fits.
    pub fn move_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        id: ToolBarId,
        pos: Point,
        cursor: Point,
        dock_margin: i32,
    ) {
        let Some(tool_bar) = storage.tool_bar(id) else {
            return;
        };
        if tool_bar.is_floating() {
            return;
        }
        let Some((mut row_index, index)) = self.find_item(id) else {
            return;
        };
        let item_size = tool_bar.size_hint();
        let item_minimum = tool_bar.minimum_size();
        let initial_drag_pos = tool_bar.drag_controller().initial_drag_pos();

        self.update_row_sizes(storage);

        let o = self.orientation;
        let top_left = self.contents_rect.top_left();
        let available = self.contents_rect.size;

        let mut new_pos = o.pick_point(pos) - o.pick_point(top_left);
        let center = o.perp_point(pos) - o.perp_point(top_left) + o.perp(item_size) / 2;

        let cursor_along = o.pick_point(cursor);
        let tray_start = o.pick_point(top_left);
        let mut unplug = cursor_along < tray_start - dock_margin
            || cursor_along > tray_start + o.pick(available) + dock_margin;

        let mut top_row_created = false;
        let mut bottom_row_created = false;
        let mut new_row = None;

        // opening a row is pointless when it would only hold a toolbar that
        // is already alone in the outermost row
        if !unplug && center < 0 {
            let create = self
                .rows
                .iter()
                .position(|row| Self::docked_count(storage, row) > 0)
                .is_some_and(|outer| {
                    outer != row_index || Self::docked_count(storage, &self.rows[outer]) > 1
                });
            if create {
                self.rows.insert(0, TrayRow::default());
                row_index += 1;
                new_row = Some(0);
                top_row_created = true;
            } else {
                unplug = o.perp_point(pos) < o.perp_point(top_left) - o.perp(item_size);
            }
        }

        if new_row.is_none() && !unplug {
            let total = self.total_depth();
            if center > total {
                let create = self
                    .rows
                    .iter()
                    .rposition(|row| Self::docked_count(storage, row) > 0)
                    .is_some_and(|outer| {
                        outer != row_index || Self::docked_count(storage, &self.rows[outer]) > 1
                    });
                if create {
                    self.rows.push(TrayRow::default());
                    new_row = Some(self.rows.len() - 1);
                    bottom_row_created = true;
                } else {
                    unplug = o.perp_point(pos) > o.perp_point(top_left) + total;
                }
            }
        }

        if new_row.is_none() && !unplug {
            new_row = self.rows.iter().position(|row| {
                center >= row.pos && center < row.pos + o.perp(row.size_hint)
            });
        }

        if unplug {
            tracing::debug!(target: targets::TRAY, tray = ?self.tray, "unplugging dragged toolbar");
            if let Some(tool_bar) = storage.tool_bar_mut(id) {
                tool_bar.undock(cursor - initial_drag_pos);
            }
            return;
        }

        new_pos = new_pos.min(o.pick(available) - o.pick(item_size)).max(0);

        let target = new_row.filter(|&target| {
            target != row_index
                && o.pick(item_minimum) <= o.pick(available) - o.pick(self.rows[target].minimum_size)
        });
        let Some(mut target) = target else {
            self.rows[row_index].items[index].pos = new_pos;
            // drop a row opened above or below that nobody moved into
            if top_row_created {
                self.rows.remove(0);
            } else if bottom_row_created {
                self.rows.pop();
            }
            return;
        };

        self.rows[row_index].items.remove(index);
        let row_removed = self.rows[row_index].items.is_empty();
        if row_removed {
            self.rows.remove(row_index);
        }
        let moving_down = target > row_index;
        if row_removed && moving_down {
            target -= 1;
        }
        self.rows[target].items.push(TrayItem::new(id, new_pos));
        tracing::debug!(
            target: targets::TRAY,
            tray = ?self.tray,
            from = row_index,
            to = target,
            row_removed,
            "toolbar changed row"
        );

        // rows opening or closing before the toolbar shift it across the tray
        let offset = if !self.tray.is_bottom_up() {
            if top_row_created {
                -1
            } else if row_removed && moving_down {
                1
            } else {
                0
            }
        } else if bottom_row_created {
            1
        } else if row_removed && !moving_down {
            -1
        } else {
            0
        };
        if offset != 0
            && let Some(tool_bar) = storage.tool_bar_mut(id)
        {
            tool_bar.offset_drag_position(o.make_point(0, offset * o.perp(item_size)));
        }
    }

    /// Rectangle a floating toolbar would dock into, if the pointer at
    /// `cursor` is over this tray and the docked toolbar would touch it.
    pub fn can_dock<S: ToolBarAccess>(
        &mut self,
        storage: &S,
        id: ToolBarId,
        cursor: Point,
        empty_tray_extent: i32,
    ) -> Option<Rect> {
        let tool_bar = storage.tool_bar(id)?;
        if !tool_bar.is_floating() {
            return None;
        }
        self.update_row_sizes(storage);

        let o = self.orientation;
        let docked_rect = tool_bar.docked_rect(o);
        let top_left = self.contents_rect.top_left();

        let cursor_along = o.pick_point(cursor);
        let tray_start = o.pick_point(top_left);
        if cursor_along < tray_start || cursor_along > tray_start + o.pick(self.contents_rect.size)
        {
            return None;
        }

        let total = self.total_depth().max(empty_tray_extent);
        let mut pos = o.perp_point(docked_rect.top_left());
        if self.tray.is_bottom_up() {
            pos += o.perp(docked_rect.size);
        }
        let contents_pos = o.perp_point(top_left);
        (pos >= contents_pos && pos < contents_pos + total).then_some(docked_rect)
    }

    /// Dock a floating toolbar into a new row at `docked_rect`.
    ///
    /// The toolbar must already have been taken out of its previous tray.
    pub fn plug_tool_bar<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        id: ToolBarId,
        docked_rect: Rect,
    ) {
        self.update_row_sizes(storage);
        let o = self.orientation;
        let top_left = self.contents_rect.top_left();

        let mut pos = o.perp_point(docked_rect.top_left()) - o.perp_point(top_left);
        if self.tray.is_bottom_up() {
            pos += o.perp(docked_rect.size);
        }
        let plug_row = self
            .rows
            .iter()
            .enumerate()
            .find_map(|(i, row)| {
                let size = o.perp(row.size_hint);
                (pos >= row.pos && pos < row.pos + size)
                    .then(|| if pos > row.pos + size / 2 { i + 1 } else { i })
            })
            .unwrap_or(0);

        let along = o.pick_point(docked_rect.top_left()) - o.pick_point(top_left);
        self.rows.insert(
            plug_row,
            TrayRow {
                items: vec![TrayItem::new(id, along)],
                ..TrayRow::default()
            },
        );

        if let Some(tool_bar) = storage.tool_bar_mut(id) {
            tool_bar.set_docked_orientation(o);
            tool_bar.dock();
        }
        tracing::debug!(target: targets::TRAY, tray = ?self.tray, row = plug_row, "toolbar docked");
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Persisted form of the rows.
    pub fn state<S: ToolBarAccess>(&self, storage: &S, registry: &ActionRegistry) -> TrayState {
        let rows = self
            .rows
            .iter()
            .map(|row| TrayRowState {
                items: row
                    .items
                    .iter()
                    .filter_map(|item| {
                        let tool_bar = storage.tool_bar(item.tool_bar)?;
                        if !tool_bar.is_custom() && tool_bar.object_name().is_empty() {
                            tracing::warn!(
                                target: targets::STATE,
                                title = %tool_bar.title(),
                                "toolbar has no object name and will not be restored"
                            );
                        }
                        Some(TrayItemState {
                            is_custom: tool_bar.is_custom(),
                            pos: item.pos,
                            name: tool_bar.persisted_name().to_owned(),
                            is_hidden: tool_bar.is_hidden(),
                            is_floating: tool_bar.is_floating(),
                            floating_pos: if tool_bar.is_floating() {
                                tool_bar.pos()
                            } else {
                                Point::ZERO
                            },
                            tool_bar_state: tool_bar.state(registry),
                        })
                    })
                    .collect(),
            })
            .collect();
        TrayState { rows }
    }

    /// Replace all rows from persisted state.
    ///
    /// `resolved` holds, per row and item of `state`, the live toolbar the
    /// entry maps to; unresolved entries are skipped and rows left empty are
    /// dropped.
    pub fn apply_state<S: ToolBarAccess>(
        &mut self,
        storage: &mut S,
        registry: &mut ActionRegistry,
        state: &TrayState,
        resolved: &[Vec<Option<ToolBarId>>],
    ) {
        self.rows.clear();
        for (row_state, row_ids) in state.rows.iter().zip(resolved) {
            let mut items = Vec::new();
            for (item_state, &id) in row_state.items.iter().zip(row_ids) {
                let Some(id) = id else {
                    continue;
                };
                let Some(tool_bar) = storage.tool_bar_mut(id) else {
                    continue;
                };
                items.push(TrayItem::new(id, item_state.pos));

                tool_bar.set_docked_orientation(self.orientation);
                tool_bar.set_visible(!item_state.is_hidden);
                tool_bar.apply_state(&item_state.tool_bar_state, registry);
                tool_bar.set_window_state(item_state.is_floating, Point::ZERO);
                if item_state.is_floating {
                    tool_bar.move_to(item_state.floating_pos);
                }
            }
            if !items.is_empty() {
                self.rows.push(TrayRow {
                    items,
                    ..TrayRow::default()
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::config::ToolBarMetrics;

    // default metrics: 28px buttons, spacing 2, margins 4, handle 10, frame 1.
    // A docked horizontal toolbar with n buttons is 28n + 2(n-1) + 20 wide,
    // 38 high and at least 48 wide.
    fn add_tool_bar(
        storage: &mut SlotMap<ToolBarId, ToolBar>,
        registry: &mut ActionRegistry,
        buttons: usize,
    ) -> ToolBarId {
        let mut tool_bar = ToolBar::new("Tools", &ToolBarMetrics::default());
        for _ in 0..buttons {
            let action = Action::new("Action");
            let id = registry.insert(action.clone());
            tool_bar.add_action(id, &action);
        }
        storage.insert(tool_bar)
    }

    fn setup(
        widths: &[usize],
    ) -> (
        SlotMap<ToolBarId, ToolBar>,
        ActionRegistry,
        TrayLayout,
        Vec<ToolBarId>,
    ) {
        let mut storage = SlotMap::with_key();
        let mut registry = ActionRegistry::new();
        let mut tray = TrayLayout::new(ToolBarTray::Top);
        let ids: Vec<_> = widths
            .iter()
            .map(|&buttons| {
                let id = add_tool_bar(&mut storage, &mut registry, buttons);
                assert!(tray.insert_tool_bar(&mut storage, None, id));
                id
            })
            .collect();
        (storage, registry, tray, ids)
    }

    fn positions(tray: &TrayLayout, row: usize) -> Vec<i32> {
        tray.rows()[row].items.iter().map(|item| item.pos).collect()
    }

    #[test]
    fn test_insert_appends_to_last_row() {
        let (storage, _, tray, ids) = setup(&[2, 1]);
        assert_eq!(storage[ids[0]].size_hint(), Size::new(78, 38));
        assert_eq!(tray.row_count(), 1);
        assert_eq!(positions(&tray, 0), vec![0, 78]);
        assert_eq!(tray.tool_bars().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_insert_before_shifts_trailing() {
        let (mut storage, mut registry, mut tray, ids) = setup(&[2, 1]);
        let id = add_tool_bar(&mut storage, &mut registry, 1);
        assert!(tray.insert_tool_bar(&mut storage, Some(ids[1]), id));
        assert_eq!(positions(&tray, 0), vec![0, 78, 78 + 48]);
        assert_eq!(tray.find_item(id), Some((0, 1)));

        let stray = add_tool_bar(&mut storage, &mut registry, 1);
        let mut other = TrayLayout::new(ToolBarTray::Left);
        assert!(!other.insert_tool_bar(&mut storage, Some(ids[0]), stray));
        assert_eq!(other.count(), 0);
    }

    #[test]
    fn test_insert_sets_orientation_and_docks() {
        let mut storage = SlotMap::with_key();
        let mut registry = ActionRegistry::new();
        let id = add_tool_bar(&mut storage, &mut registry, 2);
        storage[id].undock(Point::new(10, 10));

        let mut tray = TrayLayout::new(ToolBarTray::Left);
        tray.insert_tool_bar(&mut storage, None, id);
        assert!(!storage[id].is_floating());
        assert_eq!(storage[id].docked_orientation(), Orientation::Vertical);
    }

    #[test]
    fn test_insert_break_splits_row() {
        let (_, _, mut tray, ids) = setup(&[2, 1, 1]);
        tray.insert_tool_bar_break(Some(ids[0]));
        assert_eq!(tray.row_count(), 1);

        tray.insert_tool_bar_break(Some(ids[1]));
        assert_eq!(tray.row_count(), 2);
        assert_eq!(positions(&tray, 0), vec![0]);
        assert_eq!(positions(&tray, 1), vec![0, 48]);

        tray.insert_tool_bar_break(None);
        tray.insert_tool_bar_break(None);
        assert_eq!(tray.row_count(), 3);
    }

    #[test]
    fn test_size_hint_stacks_rows() {
        let (storage, _, mut tray, ids) = setup(&[2, 1]);
        assert_eq!(tray.size_hint(&storage), Size::new(78 + 48, 38));
        tray.insert_tool_bar_break(Some(ids[1]));
        assert_eq!(tray.size_hint(&storage), Size::new(78, 76));
        assert_eq!(tray.minimum_size(&storage), Size::new(48, 76));
    }

    #[test]
    fn test_layout_places_toolbars() {
        let (mut storage, _, mut tray, ids) = setup(&[2, 1]);
        tray.insert_tool_bar_break(Some(ids[1]));
        tray.set_geometry(&mut storage, Rect::new(0, 10, 300, 76));
        assert_eq!(storage[ids[0]].geometry(), Rect::new(0, 10, 78, 38));
        assert_eq!(storage[ids[1]].geometry(), Rect::new(0, 48, 48, 38));
    }

    #[test]
    fn test_layout_shrinks_to_fit() {
        let (mut storage, _, mut tray, ids) = setup(&[2, 2]);
        // minimum total 96, 4 pixels of extra go to the first toolbar
        tray.set_geometry(&mut storage, Rect::new(0, 0, 100, 38));
        assert_eq!(storage[ids[0]].geometry(), Rect::new(0, 0, 52, 38));
        assert_eq!(storage[ids[1]].geometry(), Rect::new(52, 0, 48, 38));
        // requested positions are kept
        assert_eq!(positions(&tray, 0), vec![0, 78]);
    }

    #[test]
    fn test_layout_clamps_positions() {
        let (mut storage, _, mut tray, ids) = setup(&[1]);
        tray.rows[0].items[0].pos = 500;
        tray.set_geometry(&mut storage, Rect::new(0, 0, 200, 38));
        assert_eq!(storage[ids[0]].geometry().left(), 200 - 48);
    }

    #[test]
    fn test_hidden_toolbar_takes_no_space() {
        let (mut storage, _, mut tray, ids) = setup(&[2, 1]);
        storage[ids[0]].hide();
        assert_eq!(tray.size_hint(&storage), Size::new(48, 38));
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        assert_eq!(storage[ids[1]].geometry().left(), 78);
        assert!(tray.has_tool_bar(ids[0]));
    }

    #[test]
    fn test_move_within_row() {
        let (mut storage, _, mut tray, ids) = setup(&[1, 1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        tray.move_tool_bar(&mut storage, ids[0], Point::new(120, 0), Point::new(125, 5), 8);
        assert_eq!(positions(&tray, 0), vec![120, 48]);

        // clamped to the tray end
        tray.move_tool_bar(&mut storage, ids[0], Point::new(290, 0), Point::new(295, 5), 8);
        assert_eq!(positions(&tray, 0), vec![300 - 48, 48]);
    }

    #[test]
    fn test_move_past_tray_end_unplugs() {
        let (mut storage, _, mut tray, ids) = setup(&[1, 1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        storage[ids[0]]
            .drag_controller_mut()
            .start_drag(Point::new(5, 5));
        tray.move_tool_bar(&mut storage, ids[0], Point::new(305, 0), Point::new(310, 5), 8);
        assert!(storage[ids[0]].is_floating());
        // still a member of its row while floating
        assert!(tray.has_tool_bar(ids[0]));
    }

    #[test]
    fn test_move_below_creates_row() {
        let (mut storage, _, mut tray, ids) = setup(&[1, 1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        storage[ids[1]]
            .drag_controller_mut()
            .start_drag(Point::new(5, 5));
        tray.move_tool_bar(&mut storage, ids[1], Point::new(40, 30), Point::new(45, 35), 8);
        assert_eq!(tray.row_count(), 2);
        assert_eq!(tray.find_item(ids[1]), Some((1, 0)));
        assert_eq!(positions(&tray, 1), vec![40]);
    }

    #[test]
    fn test_move_alone_above_does_not_create_row() {
        let (mut storage, _, mut tray, ids) = setup(&[1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        tray.move_tool_bar(&mut storage, ids[0], Point::new(10, -25), Point::new(15, -20), 8);
        assert_eq!(tray.row_count(), 1);
        assert!(!storage[ids[0]].is_floating());
    }

    #[test]
    fn test_move_into_other_row_collapses_source() {
        let (mut storage, _, mut tray, ids) = setup(&[1, 1]);
        tray.insert_tool_bar_break(Some(ids[1]));
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 76));
        storage[ids[1]]
            .drag_controller_mut()
            .start_drag(Point::new(5, 5));
        // center of the dragged toolbar lands in the first row
        tray.move_tool_bar(&mut storage, ids[1], Point::new(100, 0), Point::new(105, 5), 8);
        assert_eq!(tray.row_count(), 1);
        assert_eq!(positions(&tray, 0), vec![0, 100]);
    }

    #[test]
    fn test_adjust_row_pushes_neighbors() {
        let (mut storage, _, mut tray, ids) = setup(&[1, 1, 1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));
        // drag the middle toolbar onto the first one
        tray.rows[0].items[1].pos = 10;
        tray.adjust_tool_bar_row(&storage, ids[1]);
        assert_eq!(positions(&tray, 0), vec![0, 48, 96]);

        // drag it to the far end: clamped, and now ordered after the last one
        let index = tray.find_item(ids[1]).map(|(_, i)| i).unwrap_or_default();
        tray.rows[0].items[index].pos = 290;
        tray.adjust_tool_bar_row(&storage, ids[1]);
        let order: Vec<_> = tray.rows[0].items.iter().map(|i| i.tool_bar).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[1]]);
        assert_eq!(positions(&tray, 0), vec![0, 96, 252]);
    }

    #[test]
    fn test_can_dock_and_plug() {
        let (mut storage, mut registry, mut tray, _) = setup(&[1]);
        tray.set_geometry(&mut storage, Rect::new(0, 0, 300, 38));

        let floating = add_tool_bar(&mut storage, &mut registry, 1);
        storage[floating].undock(Point::new(50, 20));
        let docked = storage[floating].docked_rect(Orientation::Horizontal);

        assert_eq!(tray.can_dock(&storage, floating, Point::new(400, 20), 4), None);
        let rect = tray.can_dock(&storage, floating, Point::new(60, 20), 4);
        assert_eq!(rect, Some(docked));

        tray.plug_tool_bar(&mut storage, floating, docked);
        assert!(!storage[floating].is_floating());
        // lower half of the only row: plugged below it
        assert_eq!(tray.row_count(), 2);
        assert_eq!(tray.find_item(floating), Some((1, 0)));
        assert_eq!(positions(&tray, 1), vec![docked.left()]);
    }

    #[test]
    fn test_take_tool_bar_drops_empty_row() {
        let (_, _, mut tray, ids) = setup(&[1, 1]);
        tray.insert_tool_bar_break(Some(ids[1]));
        assert_eq!(tray.take_tool_bar(ids[0]), Some(true));
        assert_eq!(tray.take_tool_bar(ids[0]), None);
        assert_eq!(tray.row_count(), 1);
    }
}
