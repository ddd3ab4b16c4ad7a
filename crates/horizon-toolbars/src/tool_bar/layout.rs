//! Item packing for a single toolbar.
//!
//! `ToolBarLayout` arranges a toolbar's items (buttons, separators, custom
//! widgets) using one of four strategies, picked from the toolbar's state:
//!
//! - [`LayoutType::Horizontal`]: a single row, used while docked in a
//!   horizontal tray
//! - [`LayoutType::Vertical`]: a single column of uniform width, used while
//!   docked in a vertical tray
//! - [`LayoutType::Columns`]: a grid with a fixed number of columns where
//!   separators always occupy a row of their own
//! - [`LayoutType::Dynamic`]: rows chosen by a row-break optimizer, used
//!   while floating so the toolbar can be resized
//!
//! The dynamic strategy precomputes, for every possible row count, the
//! narrowest achievable layout ([`compute_dynamic_layouts`]). Resizing then
//! only selects an entry of that table ([`ToolBarLayout::adjust_to_width`],
//! [`ToolBarLayout::adjust_to_height`]).
//!
//! All rectangles produced here are in the coordinate space of the layout
//! geometry passed to [`ToolBarLayout::set_geometry`].

use std::borrow::Cow;

use horizon_toolbars_core::logging::{span_names, targets};
use horizon_toolbars_core::{Margins, Orientation, PerfSpan, Point, Rect, Size};

use crate::state::ToolBarLayoutState;

// ============================================================================
// Types
// ============================================================================

/// Packing strategy of a toolbar layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutType {
    /// Single row.
    Horizontal,
    /// Single column.
    Vertical,
    /// Fixed-column grid.
    Columns,
    /// Optimized multi-row layout.
    Dynamic,
}

/// One item to pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackItem {
    /// Preferred size of the item.
    pub size: Size,
    /// Whether the item is a separator.
    pub is_separator: bool,
}

impl PackItem {
    /// Create a regular item.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            is_separator: false,
        }
    }

    /// Create a separator item.
    pub fn separator(size: Size) -> Self {
        Self {
            size,
            is_separator: true,
        }
    }
}

/// An item placed by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedItem {
    /// Index of the item in the layout.
    pub index: usize,
    /// Rectangle relative to the top-left corner of the contents area.
    pub rect: Rect,
    /// For separators, the orientation of the line of items the separator
    /// divides. A separator that spans a full row on its own is `Vertical`.
    pub separator: Option<Orientation>,
}

/// A packed row of items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemRow {
    /// Offset of the row across the packing direction.
    pub pos: i32,
    /// Extent of the row across the packing direction.
    pub extent: i32,
    /// Placed items, in order.
    pub items: Vec<PackedItem>,
}

/// Result of a packing pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packing {
    /// Packed rows. Vertical layouts produce a single column stored as one row.
    pub rows: Vec<ItemRow>,
    /// Bounding size of all rows.
    pub contents_size: Size,
}

/// One entry of the dynamic layout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicLayout {
    /// Contents size of the layout.
    pub size: Size,
    /// Row breaks: strictly increasing end indices, the last one equal to the
    /// item count.
    pub row_breaks: Vec<usize>,
}

/// Insertion point for a dragged item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSite {
    /// Index the item would be inserted at.
    pub index: usize,
    /// Top-left corner of the insertion gap.
    pub top_left: Point,
    /// Extent of the row the gap belongs to.
    pub extent: i32,
}

// ============================================================================
// Row-break optimizer
// ============================================================================

#[derive(Debug, Clone)]
struct Candidate {
    row_breaks: Vec<usize>,
    width: i32,
}

/// Compute the narrowest layout for every row count.
///
/// Entry `k` of the result is the layout that minimizes the widest row when
/// the items are split into `k + 1` rows. Row counts that cannot be achieved
/// (a break may never directly follow a separator) are skipped, so the table
/// can be shorter than the item count.
///
/// A row that starts with a separator does not count the separator toward
/// its width; the separator is placed in a row of its own instead.
pub fn compute_dynamic_layouts(items: &[PackItem], spacing: i32) -> Vec<DynamicLayout> {
    let count = items.len();
    if count == 0 {
        return Vec::new();
    }
    let _span = PerfSpan::new(span_names::DYNAMIC_LAYOUT);

    // cache[start][rows]: best layout of items[start..] using exactly `rows` rows
    let mut cache: Vec<Vec<Option<Candidate>>> = vec![vec![None; count + 1]; count];

    for rows in 1..=count {
        for start in (0..=count - rows).rev() {
            let starts_with_separator = items[start].is_separator;

            let result = if rows == 1 {
                let mut width = 0;
                let mut first = true;
                for (i, item) in items.iter().enumerate().skip(start) {
                    if starts_with_separator && i == start {
                        continue;
                    }
                    width += item.size.width;
                    if !first {
                        width += spacing;
                    }
                    first = false;
                }
                let mut row_breaks = Vec::with_capacity(2);
                if starts_with_separator && start + 1 < count {
                    row_breaks.push(start + 1);
                }
                row_breaks.push(count);
                Some(Candidate { row_breaks, width })
            } else {
                let mut best: Option<Candidate> = None;
                let mut width = 0;
                let mut first = true;
                for i in start..=count - rows {
                    if !(starts_with_separator && i == start) {
                        width += items[i].size.width;
                        if !first {
                            width += spacing;
                        }
                        first = false;
                    }
                    // never break right after a separator
                    if items[i].is_separator {
                        continue;
                    }
                    let Some(next) = &cache[i + 1][rows - 1] else {
                        continue;
                    };
                    let candidate_width = width.max(next.width);
                    if best.as_ref().is_none_or(|best| candidate_width <= best.width) {
                        let mut row_breaks = Vec::with_capacity(next.row_breaks.len() + 2);
                        if starts_with_separator {
                            row_breaks.push(start + 1);
                        }
                        row_breaks.push(i + 1);
                        row_breaks.extend_from_slice(&next.row_breaks);
                        best = Some(Candidate {
                            row_breaks,
                            width: candidate_width,
                        });
                    }
                }
                best
            };

            cache[start][rows] = result;
        }
    }

    let mut layouts = Vec::new();
    for rows in 1..=count {
        let Some(candidate) = cache[0][rows].take() else {
            continue;
        };
        let mut height = 0;
        let mut row_start = 0;
        for (row, &row_end) in candidate.row_breaks.iter().enumerate() {
            if row > 0 {
                height += spacing;
            }
            height += items[row_start..row_end]
                .iter()
                .map(|item| item.size.height)
                .max()
                .unwrap_or(0);
            row_start = row_end;
        }
        layouts.push(DynamicLayout {
            size: Size::new(candidate.width, height),
            row_breaks: candidate.row_breaks,
        });
    }

    tracing::trace!(
        target: targets::PACKER,
        item_count = count,
        layout_count = layouts.len(),
        "computed dynamic layouts"
    );

    layouts
}

/// Check that row breaks are usable for `item_count` items.
pub fn is_valid_row_breaks(row_breaks: &[usize], item_count: usize) -> bool {
    let Some(&last) = row_breaks.last() else {
        return false;
    };
    last == item_count
        && row_breaks[0] >= 1
        && row_breaks.windows(2).all(|pair| pair[0] < pair[1])
}

/// Lay items out in rows ending at the given breaks.
///
/// Items in a row share the row's height. A separator alone in its row is
/// stretched to the widest row.
pub fn layout_rows(items: &[PackItem], row_breaks: &[usize], spacing: i32) -> Packing {
    let mut max_row_width = 0;
    let mut row_start = 0;
    for &row_end in row_breaks {
        let row = &items[row_start..row_end];
        let width: i32 = row.iter().map(|item| item.size.width).sum::<i32>()
            + spacing * (row.len() as i32 - 1);
        max_row_width = max_row_width.max(width);
        row_start = row_end;
    }

    let mut rows = Vec::with_capacity(row_breaks.len());
    let mut row_pos = 0;
    row_start = 0;
    for (row_index, &row_end) in row_breaks.iter().enumerate() {
        let row_height = items[row_start..row_end]
            .iter()
            .map(|item| item.size.height)
            .max()
            .unwrap_or(0);

        let mut row = ItemRow {
            pos: row_pos,
            extent: row_height,
            items: Vec::with_capacity(row_end - row_start),
        };
        let mut x = 0;
        for index in row_start..row_end {
            let item = items[index];
            let mut size = Size::new(item.size.width, row_height);
            let mut separator = None;
            if item.is_separator {
                if row_end - row_start == 1 {
                    size = Size::new(max_row_width, item.size.height);
                    separator = Some(Orientation::Vertical);
                } else {
                    separator = Some(Orientation::Horizontal);
                }
            }
            row.items.push(PackedItem {
                index,
                rect: Rect::from_origin_size(Point::new(x, row_pos), size),
                separator,
            });
            if index + 1 < row_end {
                x += item.size.width + spacing;
            }
        }
        rows.push(row);

        row_pos += row_height;
        if row_index + 1 < row_breaks.len() {
            row_pos += spacing;
        }
        row_start = row_end;
    }

    Packing {
        rows,
        contents_size: Size::new(max_row_width, row_pos),
    }
}

fn layout_line(items: &[PackItem], orientation: Orientation, spacing: i32) -> Packing {
    let cross = items
        .iter()
        .map(|item| orientation.perp(item.size))
        .max()
        .unwrap_or(0);

    let mut row = ItemRow {
        pos: 0,
        extent: cross,
        items: Vec::with_capacity(items.len()),
    };
    let mut pos = 0;
    for (index, item) in items.iter().enumerate() {
        let extent = orientation.pick(item.size);
        row.items.push(PackedItem {
            index,
            rect: Rect::from_origin_size(
                orientation.make_point(pos, 0),
                orientation.make_size(extent, cross),
            ),
            separator: item.is_separator.then_some(orientation),
        });
        pos += extent;
        if index + 1 < items.len() {
            pos += spacing;
        }
    }

    Packing {
        rows: vec![row],
        contents_size: orientation.make_size(pos, cross),
    }
}

fn column_row_breaks(items: &[PackItem], columns: usize) -> Vec<usize> {
    let mut row_breaks = Vec::new();
    let mut column = 0;
    for (i, item) in items.iter().enumerate() {
        if column == columns || item.is_separator || (i > 0 && items[i - 1].is_separator) {
            row_breaks.push(i);
            column = 0;
        }
        column += 1;
    }
    // a leading separator would open with an empty row
    row_breaks.retain(|&end| end > 0);
    row_breaks.push(items.len());
    row_breaks
}

// ============================================================================
// ToolBarLayout
// ============================================================================

/// Packer for a single toolbar's items.
///
/// Geometry queries (`size_hint`, `minimum_size`, `find_drop_site`) are
/// available on a shared reference and compute the packing on the fly when
/// it is stale; [`update_geometries`](Self::update_geometries) and
/// [`set_geometry`](Self::set_geometry) cache it.
#[derive(Debug, Clone)]
pub struct ToolBarLayout {
    items: Vec<PackItem>,
    spacing: i32,
    contents_margins: Margins,
    columns: usize,
    column_layout: bool,
    floating: bool,
    docked_orientation: Orientation,
    /// Title bar height used while floating.
    title_height: i32,
    /// Handle extent used while docked.
    handle_extent: i32,
    /// Lower bound for the contents size.
    minimum_size: Size,
    /// Row breaks of the dynamic layout. Empty means "use the single row".
    row_breaks: Vec<usize>,
    geometry: Rect,
    packing: Option<Packing>,
    dynamic_layouts: Option<Vec<DynamicLayout>>,
}

impl Default for ToolBarLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolBarLayout {
    /// Create an empty docked horizontal layout.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            spacing: 0,
            contents_margins: Margins::ZERO,
            columns: 1,
            column_layout: false,
            floating: false,
            docked_orientation: Orientation::Horizontal,
            title_height: 0,
            handle_extent: 0,
            minimum_size: Size::ZERO,
            row_breaks: Vec::new(),
            geometry: Rect::ZERO,
            packing: None,
            dynamic_layouts: None,
        }
    }

    /// Set the spacing between items and rows.
    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the margins around the items.
    pub fn with_contents_margins(mut self, margins: Margins) -> Self {
        self.contents_margins = margins;
        self
    }

    /// Set the title bar height used while floating.
    pub fn with_title_height(mut self, height: i32) -> Self {
        self.title_height = height;
        self
    }

    /// Set the handle extent used while docked.
    pub fn with_handle_extent(mut self, extent: i32) -> Self {
        self.handle_extent = extent;
        self
    }

    /// Set the number of columns of the column layout.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    // ------------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------------

    /// Mark the packing and the dynamic layout table as stale.
    pub fn invalidate(&mut self) {
        self.packing = None;
        self.dynamic_layouts = None;
    }

    /// Whether the packing must be recomputed before use.
    pub fn is_dirty(&self) -> bool {
        self.packing.is_none()
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    /// Number of items.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Items in order.
    pub fn items(&self) -> &[PackItem] {
        &self.items
    }

    /// Insert an item. Clears the row breaks.
    pub fn insert_item(&mut self, index: usize, item: PackItem) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.row_breaks.clear();
        self.invalidate();
    }

    /// Append an item. Clears the row breaks.
    pub fn add_item(&mut self, item: PackItem) {
        self.insert_item(self.items.len(), item);
    }

    /// Remove an item. Clears the row breaks.
    pub fn remove_item(&mut self, index: usize) -> Option<PackItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.row_breaks.clear();
        self.invalidate();
        Some(item)
    }

    /// Replace the preferred size of an item.
    pub fn set_item_size(&mut self, index: usize, size: Size) {
        if let Some(item) = self.items.get_mut(index)
            && item.size != size
        {
            item.size = size;
            self.invalidate();
        }
    }

    /// Replace all items at once. Clears the row breaks.
    pub fn set_items(&mut self, items: Vec<PackItem>) {
        self.items = items;
        self.row_breaks.clear();
        self.invalidate();
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        if self.spacing != spacing {
            self.spacing = spacing;
            self.invalidate();
        }
    }

    pub fn contents_margins(&self) -> Margins {
        self.contents_margins
    }

    pub fn set_contents_margins(&mut self, margins: Margins) {
        if self.contents_margins != margins {
            self.contents_margins = margins;
            self.invalidate();
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Set the number of columns of the column layout. Values below one are
    /// raised to one.
    pub fn set_columns(&mut self, columns: usize) {
        let columns = columns.max(1);
        if self.columns != columns {
            self.columns = columns;
            self.invalidate();
        }
    }

    pub fn column_layout(&self) -> bool {
        self.column_layout
    }

    pub fn set_column_layout(&mut self, column_layout: bool) {
        if self.column_layout != column_layout {
            self.column_layout = column_layout;
            self.invalidate();
        }
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn set_floating(&mut self, floating: bool) {
        if self.floating != floating {
            self.floating = floating;
            self.invalidate();
        }
    }

    pub fn docked_orientation(&self) -> Orientation {
        self.docked_orientation
    }

    pub fn set_docked_orientation(&mut self, orientation: Orientation) {
        if self.docked_orientation != orientation {
            self.docked_orientation = orientation;
            self.invalidate();
        }
    }

    pub fn set_title_height(&mut self, height: i32) {
        if self.title_height != height {
            self.title_height = height;
            self.invalidate();
        }
    }

    pub fn set_handle_extent(&mut self, extent: i32) {
        if self.handle_extent != extent {
            self.handle_extent = extent;
            self.invalidate();
        }
    }

    /// Lower bound for the contents size.
    pub fn set_minimum_size(&mut self, size: Size) {
        self.minimum_size = size;
    }

    /// Current row breaks of the dynamic layout.
    pub fn row_breaks(&self) -> &[usize] {
        &self.row_breaks
    }

    // ------------------------------------------------------------------------
    // Layout type and decorations
    // ------------------------------------------------------------------------

    /// Strategy for the current state.
    pub fn layout_type(&self) -> LayoutType {
        self.layout_type_for(self.floating, self.docked_orientation)
    }

    /// Strategy the layout would use in the given state.
    pub fn layout_type_for(&self, floating: bool, docked_orientation: Orientation) -> LayoutType {
        if self.column_layout {
            LayoutType::Columns
        } else if floating {
            LayoutType::Dynamic
        } else if docked_orientation == Orientation::Horizontal {
            LayoutType::Horizontal
        } else {
            LayoutType::Vertical
        }
    }

    /// Title bar height in the current state.
    pub fn title_height(&self) -> i32 {
        self.title_height_for(self.floating)
    }

    /// Title bar height in the given state. Zero while docked.
    pub fn title_height_for(&self, floating: bool) -> i32 {
        if floating { self.title_height } else { 0 }
    }

    /// Handle extent in the current state.
    pub fn handle_extent(&self) -> i32 {
        self.handle_extent_for(self.floating)
    }

    /// Handle extent in the given state. Zero while floating.
    pub fn handle_extent_for(&self, floating: bool) -> i32 {
        if floating { 0 } else { self.handle_extent }
    }

    /// Contents margins plus room for the title bar or handle.
    pub fn inner_contents_margins(&self) -> Margins {
        self.inner_contents_margins_for(self.floating, self.docked_orientation)
    }

    /// Contents margins plus decorations in the given state.
    pub fn inner_contents_margins_for(
        &self,
        floating: bool,
        docked_orientation: Orientation,
    ) -> Margins {
        let mut margins = self.contents_margins;
        if floating {
            margins.top += self.title_height_for(floating);
        } else {
            match self.layout_type_for(floating, docked_orientation) {
                LayoutType::Vertical | LayoutType::Columns => {
                    margins.top += self.handle_extent_for(floating);
                }
                LayoutType::Horizontal | LayoutType::Dynamic => {
                    margins.left += self.handle_extent_for(floating);
                }
            }
        }
        margins
    }

    /// Title bar rectangle.
    pub fn title_area(&self) -> Rect {
        let m = self.contents_margins;
        Rect::new(
            self.geometry.left() + m.left,
            self.geometry.top() + m.top,
            self.geometry.width() - m.horizontal(),
            self.title_height(),
        )
    }

    /// Drag handle rectangle.
    pub fn handle_area(&self) -> Rect {
        let m = self.contents_margins;
        let left = self.geometry.left() + m.left;
        let top = self.geometry.top() + m.top;
        let extent = self.handle_extent();
        match self.layout_type() {
            LayoutType::Vertical | LayoutType::Columns => {
                Rect::new(left, top, self.geometry.width() - m.horizontal(), extent)
            }
            LayoutType::Horizontal | LayoutType::Dynamic => {
                Rect::new(left, top, extent, self.geometry.height() - m.vertical())
            }
        }
    }

    /// Close button rectangle for a button of `size`, centered vertically in
    /// the title bar against the right margin. `None` while docked.
    pub fn close_button_rect(&self, size: Size) -> Option<Rect> {
        if !self.floating {
            return None;
        }
        let m = self.contents_margins;
        Some(Rect::new(
            self.geometry.right() - m.right - size.width,
            self.geometry.top() + m.top + (self.title_height() - size.height) / 2,
            size.width,
            size.height,
        ))
    }

    // ------------------------------------------------------------------------
    // Sizes
    // ------------------------------------------------------------------------

    /// Preferred size including margins and decorations.
    pub fn size_hint(&self) -> Size {
        self.packing()
            .contents_size
            .expanded_to(self.minimum_size)
            .grown_by(self.inner_contents_margins())
    }

    /// Minimum size including margins and decorations.
    pub fn minimum_size(&self) -> Size {
        self.minimum_size.grown_by(self.inner_contents_margins())
    }

    /// Contents size the items would need when docked with `orientation`.
    pub fn docked_contents_size(&self, orientation: Orientation) -> Size {
        if self.items.is_empty() {
            return Size::ZERO;
        }
        let spacing = self.spacing;

        if self.column_layout {
            let (mut width, mut height) = (0, 0);
            let mut first_row = true;
            let (mut column, mut row_width, mut row_height) = (0, 0, 0);
            for item in &self.items {
                if column == self.columns || item.is_separator {
                    width = width.max(row_width);
                    height += row_height;
                    if !first_row {
                        height += spacing;
                    }
                    first_row = false;
                    column = 0;
                    row_width = 0;
                    row_height = 0;
                }
                if item.is_separator {
                    height += item.size.height + spacing;
                } else {
                    row_width += item.size.width;
                    if column > 0 {
                        row_width += spacing;
                    }
                    row_height = row_height.max(item.size.height);
                    column += 1;
                }
            }
            if column > 0 {
                width = width.max(row_width);
                height += row_height;
                if !first_row {
                    height += spacing;
                }
            }
            return Size::new(width, height);
        }

        let along: i32 = self
            .items
            .iter()
            .map(|item| orientation.pick(item.size))
            .sum::<i32>()
            + spacing * (self.items.len() as i32 - 1);
        let across = self
            .items
            .iter()
            .map(|item| orientation.perp(item.size))
            .max()
            .unwrap_or(0);
        orientation.make_size(along, across)
    }

    // ------------------------------------------------------------------------
    // Packing
    // ------------------------------------------------------------------------

    fn packing(&self) -> Cow<'_, Packing> {
        match &self.packing {
            Some(packing) => Cow::Borrowed(packing),
            None => Cow::Owned(self.compute_packing()),
        }
    }

    fn compute_packing(&self) -> Packing {
        if self.items.is_empty() {
            return Packing::default();
        }
        match self.layout_type() {
            LayoutType::Horizontal => {
                layout_line(&self.items, Orientation::Horizontal, self.spacing)
            }
            LayoutType::Vertical => layout_line(&self.items, Orientation::Vertical, self.spacing),
            LayoutType::Columns => {
                let row_breaks = column_row_breaks(&self.items, self.columns);
                layout_rows(&self.items, &row_breaks, self.spacing)
            }
            LayoutType::Dynamic => {
                let row_breaks = self.effective_row_breaks();
                layout_rows(&self.items, &row_breaks, self.spacing)
            }
        }
    }

    fn effective_row_breaks(&self) -> Cow<'_, [usize]> {
        if is_valid_row_breaks(&self.row_breaks, self.items.len()) {
            return Cow::Borrowed(&self.row_breaks);
        }
        let front = match &self.dynamic_layouts {
            Some(layouts) => layouts.first().map(|layout| layout.row_breaks.clone()),
            None => compute_dynamic_layouts(&self.items, self.spacing)
                .into_iter()
                .next()
                .map(|layout| layout.row_breaks),
        };
        Cow::Owned(front.unwrap_or_else(|| vec![self.items.len()]))
    }

    fn ensure_dynamic_layouts(&mut self) -> &[DynamicLayout] {
        if self.dynamic_layouts.is_none() {
            self.dynamic_layouts = Some(compute_dynamic_layouts(&self.items, self.spacing));
        }
        self.dynamic_layouts.as_deref().unwrap_or_default()
    }

    /// Recompute and cache the packing if it is stale.
    pub fn update_geometries(&mut self) {
        if self.packing.is_some() {
            return;
        }
        if self.layout_type() == LayoutType::Dynamic && !self.items.is_empty() {
            let item_count = self.items.len();
            if !is_valid_row_breaks(&self.row_breaks, item_count) {
                let front = self
                    .ensure_dynamic_layouts()
                    .first()
                    .map(|layout| layout.row_breaks.clone());
                if let Some(front) = front {
                    self.row_breaks = front;
                }
            }
        }
        self.packing = Some(self.compute_packing());
    }

    /// Dynamic layout table, one entry per achievable row count.
    pub fn dynamic_layouts(&mut self) -> &[DynamicLayout] {
        self.ensure_dynamic_layouts()
    }

    /// Assign the layout rectangle and cache the packing.
    pub fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
        self.update_geometries();
    }

    /// Current layout rectangle.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Rectangle of the contents area (geometry minus margins and decorations).
    pub fn contents_rect(&self) -> Rect {
        self.geometry.margins_removed(self.inner_contents_margins())
    }

    /// Placed items with rectangles in layout coordinates.
    pub fn item_rects(&self) -> Vec<PackedItem> {
        let offset = self.contents_rect().top_left();
        self.packing()
            .rows
            .iter()
            .flat_map(|row| row.items.iter())
            .map(|item| PackedItem {
                rect: item.rect.translated(offset),
                ..*item
            })
            .collect()
    }

    /// Rectangle of one item in layout coordinates.
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        let offset = self.contents_rect().top_left();
        self.packing()
            .rows
            .iter()
            .flat_map(|row| row.items.iter())
            .find(|item| item.index == index)
            .map(|item| item.rect.translated(offset))
    }

    /// Number of packed rows.
    pub fn row_count(&self) -> usize {
        self.packing().rows.len()
    }

    // ------------------------------------------------------------------------
    // Adjusting the dynamic layout
    // ------------------------------------------------------------------------

    /// Pick the layout that best fits `width` and return the resulting size
    /// including margins and decorations.
    ///
    /// The layout with the fewest rows whose width fits is used; when none
    /// fits, the narrowest layout is used.
    pub fn adjust_to_width(&mut self, width: i32) -> Size {
        let available = width - self.contents_margins.horizontal();
        let chosen = {
            let layouts = self.ensure_dynamic_layouts();
            let Some(last) = layouts.last() else {
                return Size::ZERO;
            };
            layouts[..layouts.len() - 1]
                .iter()
                .find(|layout| layout.size.width <= available)
                .unwrap_or(last)
                .clone()
        };
        self.apply_dynamic_layout(chosen)
    }

    /// Pick the layout that best fits `height` and return the resulting size
    /// including margins and decorations.
    ///
    /// The layout with the most rows whose height fits is used; when none
    /// fits, the single-row layout is used.
    pub fn adjust_to_height(&mut self, height: i32) -> Size {
        let available = height - (self.contents_margins.vertical() + self.title_height());
        let chosen = {
            let layouts = self.ensure_dynamic_layouts();
            let Some(first) = layouts.first() else {
                return Size::ZERO;
            };
            layouts[1..]
                .iter()
                .rev()
                .find(|layout| layout.size.height <= available)
                .unwrap_or(first)
                .clone()
        };
        self.apply_dynamic_layout(chosen)
    }

    fn apply_dynamic_layout(&mut self, layout: DynamicLayout) -> Size {
        if layout.row_breaks != self.row_breaks {
            tracing::trace!(
                target: targets::PACKER,
                rows = layout.row_breaks.len(),
                "switching dynamic layout"
            );
            self.row_breaks = layout.row_breaks;
            self.packing = None;
        }
        layout
            .size
            .expanded_to(self.minimum_size)
            .grown_by(self.inner_contents_margins())
    }

    // ------------------------------------------------------------------------
    // Drop sites
    // ------------------------------------------------------------------------

    /// Map a point to the insertion index for a dragged item.
    ///
    /// Returns `None` when the point is outside the contents area. The row is
    /// chosen by the point's position across rows, then the item whose center
    /// is nearest along the row. A point on or before that center inserts
    /// before the item, otherwise after it.
    pub fn find_drop_site(&self, point: Point) -> Option<DropSite> {
        let contents_rect = self.contents_rect();
        if !contents_rect.contains(point) {
            return None;
        }

        let contents_top_left = contents_rect.top_left();
        let packing = self.packing();
        if packing.rows.is_empty() {
            return Some(DropSite {
                index: 0,
                top_left: contents_top_left,
                extent: self.minimum_size.height,
            });
        }

        // packed rows run horizontally except in the vertical layout
        let along = match self.layout_type() {
            LayoutType::Vertical => Orientation::Vertical,
            _ => Orientation::Horizontal,
        };
        let local = point - contents_top_left;

        let across = along.perp_point(local);
        let row_index = packing
            .rows
            .iter()
            .skip(1)
            .position(|row| across < row.pos)
            .unwrap_or(packing.rows.len() - 1);
        let row = &packing.rows[row_index];

        let coord = along.pick_point(local);
        let nearest = row
            .items
            .iter()
            .enumerate()
            .min_by_key(|(_, item)| (coord - along.pick_point(item.rect.center())).abs())?;
        let (position, item) = nearest;

        let site = if coord <= along.pick_point(item.rect.center()) {
            DropSite {
                index: item.index,
                top_left: item.rect.top_left(),
                extent: row.extent,
            }
        } else if let Some(next) = row.items.get(position + 1) {
            DropSite {
                index: next.index,
                top_left: next.rect.top_left(),
                extent: row.extent,
            }
        } else {
            let end = along.make_point(along.pick(item.rect.size), 0);
            DropSite {
                index: item.index + 1,
                top_left: item.rect.top_left() + end,
                extent: row.extent,
            }
        };

        Some(DropSite {
            top_left: site.top_left + contents_top_left,
            ..site
        })
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Persisted form of the layout.
    pub fn state(&self) -> ToolBarLayoutState {
        ToolBarLayoutState {
            row_breaks: self.row_breaks.iter().map(|&end| end as i32).collect(),
        }
    }

    /// Apply persisted row breaks.
    ///
    /// Empty break lists are ignored. Break lists that are not strictly
    /// increasing or do not end at the item count are rejected and the
    /// current breaks are kept.
    pub fn apply_state(&mut self, state: &ToolBarLayoutState) {
        if state.row_breaks.is_empty() {
            return;
        }
        let row_breaks: Option<Vec<usize>> = state
            .row_breaks
            .iter()
            .map(|&end| usize::try_from(end).ok())
            .collect();
        match row_breaks {
            Some(row_breaks) if is_valid_row_breaks(&row_breaks, self.items.len()) => {
                self.row_breaks = row_breaks;
                self.packing = None;
            }
            _ => {
                tracing::warn!(
                    target: targets::PACKER,
                    row_breaks = ?state.row_breaks,
                    item_count = self.items.len(),
                    "ignoring invalid row breaks"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons(count: usize, size: Size) -> Vec<PackItem> {
        vec![PackItem::new(size); count]
    }

    fn floating_layout(items: Vec<PackItem>) -> ToolBarLayout {
        let mut layout = ToolBarLayout::new()
            .with_spacing(2)
            .with_contents_margins(Margins::uniform(4))
            .with_title_height(20)
            .with_handle_extent(10);
        layout.set_floating(true);
        layout.set_items(items);
        layout
    }

    #[test]
    fn test_dynamic_layouts_equal_buttons() {
        let items = buttons(6, Size::new(10, 10));
        let layouts = compute_dynamic_layouts(&items, 2);
        assert_eq!(layouts.len(), 6);
        assert_eq!(layouts[0].size, Size::new(70, 10));
        assert_eq!(layouts[0].row_breaks, vec![6]);
        assert_eq!(layouts[1].size, Size::new(34, 22));
        assert_eq!(layouts[1].row_breaks, vec![3, 6]);
        assert_eq!(layouts[5].size, Size::new(10, 70));
    }

    #[test]
    fn test_dynamic_layouts_never_break_after_separator() {
        let items = vec![
            PackItem::new(Size::new(10, 10)),
            PackItem::separator(Size::new(4, 4)),
            PackItem::new(Size::new(10, 10)),
        ];
        let layouts = compute_dynamic_layouts(&items, 0);
        // three rows would need a break right after the separator
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].row_breaks, vec![3]);
        assert_eq!(layouts[0].size, Size::new(24, 10));
        // [button] [separator alone] [button]
        assert_eq!(layouts[1].row_breaks, vec![1, 2, 3]);
        assert_eq!(layouts[1].size, Size::new(10, 24));
    }

    #[test]
    fn test_dynamic_layouts_trailing_separator() {
        let items = vec![
            PackItem::new(Size::new(10, 10)),
            PackItem::separator(Size::new(4, 4)),
        ];
        let layouts = compute_dynamic_layouts(&items, 0);
        for layout in &layouts {
            assert!(is_valid_row_breaks(&layout.row_breaks, 2), "{layout:?}");
        }
    }

    #[test]
    fn test_layout_rows_stretches_lone_separator() {
        let items = vec![
            PackItem::new(Size::new(10, 10)),
            PackItem::new(Size::new(10, 10)),
            PackItem::separator(Size::new(4, 4)),
            PackItem::new(Size::new(10, 12)),
        ];
        let packing = layout_rows(&items, &[2, 3, 4], 2);
        assert_eq!(packing.rows.len(), 3);
        assert_eq!(packing.contents_size, Size::new(22, 10 + 2 + 4 + 2 + 12));
        let separator = packing.rows[1].items[0];
        assert_eq!(separator.rect, Rect::new(0, 12, 22, 4));
        assert_eq!(separator.separator, Some(Orientation::Vertical));
        assert_eq!(packing.rows[2].pos, 18);
    }

    #[test]
    fn test_horizontal_layout() {
        let mut layout = ToolBarLayout::new()
            .with_spacing(2)
            .with_contents_margins(Margins::uniform(4))
            .with_handle_extent(10);
        layout.set_items(vec![
            PackItem::new(Size::new(20, 20)),
            PackItem::separator(Size::new(6, 6)),
            PackItem::new(Size::new(30, 24)),
        ]);
        assert_eq!(layout.layout_type(), LayoutType::Horizontal);
        // handle on the left
        assert_eq!(layout.inner_contents_margins(), Margins::new(14, 4, 4, 4));
        assert_eq!(layout.size_hint(), Size::new(20 + 6 + 30 + 4 + 18, 24 + 8));

        layout.set_geometry(Rect::from_origin_size(Point::ZERO, layout.size_hint()));
        let rects = layout.item_rects();
        assert_eq!(rects[0].rect, Rect::new(14, 4, 20, 24));
        assert_eq!(rects[1].rect, Rect::new(36, 4, 6, 24));
        assert_eq!(rects[2].rect, Rect::new(44, 4, 30, 24));
    }

    #[test]
    fn test_vertical_layout_uniform_width() {
        let mut layout = ToolBarLayout::new().with_spacing(2).with_handle_extent(10);
        layout.set_docked_orientation(Orientation::Vertical);
        layout.set_items(vec![
            PackItem::new(Size::new(20, 20)),
            PackItem::new(Size::new(30, 10)),
        ]);
        assert_eq!(layout.layout_type(), LayoutType::Vertical);
        assert_eq!(layout.inner_contents_margins(), Margins::new(0, 10, 0, 0));
        assert_eq!(layout.size_hint(), Size::new(30, 32 + 10));
        layout.set_geometry(Rect::new(0, 0, 30, 42));
        assert_eq!(layout.item_rect(1), Some(Rect::new(0, 32, 30, 10)));
    }

    #[test]
    fn test_column_layout_breaks() {
        let mut items = buttons(5, Size::new(10, 10));
        items.insert(2, PackItem::separator(Size::new(4, 4)));
        assert_eq!(column_row_breaks(&items, 2), vec![2, 3, 5, 6]);
        assert_eq!(column_row_breaks(&buttons(5, Size::new(1, 1)), 2), vec![2, 4, 5]);
    }

    #[test]
    fn test_adjust_to_width_picks_fewest_rows() {
        let mut layout = floating_layout(buttons(6, Size::new(10, 10)));
        // one row needs 70 + 8 of margins
        assert_eq!(layout.adjust_to_width(78), Size::new(78, 10 + 28));
        assert_eq!(layout.row_breaks(), &[6]);

        let size = layout.adjust_to_width(50);
        assert_eq!(layout.row_breaks(), &[3, 6]);
        assert_eq!(size, Size::new(34 + 8, 22 + 28));

        // nothing fits: narrowest
        layout.adjust_to_width(1);
        assert_eq!(layout.row_breaks(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_adjust_to_height_picks_most_rows() {
        let mut layout = floating_layout(buttons(6, Size::new(10, 10)));
        // 3 rows: 34 of contents + 8 margins + 20 title
        layout.adjust_to_height(62);
        assert_eq!(layout.row_breaks(), &[2, 4, 6]);
        // nothing fits: single row
        layout.adjust_to_height(0);
        assert_eq!(layout.row_breaks(), &[6]);
    }

    #[test]
    fn test_adjust_empty_layout() {
        let mut layout = floating_layout(Vec::new());
        assert_eq!(layout.adjust_to_width(100), Size::ZERO);
        assert_eq!(layout.adjust_to_height(100), Size::ZERO);
    }

    #[test]
    fn test_minimum_size_bounds_hint() {
        let mut layout = floating_layout(Vec::new());
        layout.set_minimum_size(Size::new(16, 16));
        assert_eq!(layout.size_hint(), Size::new(24, 44));
        assert_eq!(layout.minimum_size(), Size::new(24, 44));
    }

    #[test]
    fn test_find_drop_site() {
        let mut layout = ToolBarLayout::new();
        layout.set_items(buttons(3, Size::new(10, 10)));
        layout.set_geometry(Rect::new(0, 0, 30, 10));

        // outside
        assert_eq!(layout.find_drop_site(Point::new(30, 5)), None);
        assert_eq!(layout.find_drop_site(Point::new(5, -1)), None);

        // exactly on the center of the second item: before it
        let site = layout.find_drop_site(Point::new(15, 5)).unwrap();
        assert_eq!(site.index, 1);
        assert_eq!(site.top_left, Point::new(10, 0));
        assert_eq!(site.extent, 10);

        // right half of the second item: before the third
        assert_eq!(layout.find_drop_site(Point::new(17, 5)).unwrap().index, 2);

        // right half of the last item: after it
        let site = layout.find_drop_site(Point::new(28, 5)).unwrap();
        assert_eq!(site.index, 3);
        assert_eq!(site.top_left, Point::new(30, 0));
    }

    #[test]
    fn test_find_drop_site_empty_layout() {
        let mut layout = ToolBarLayout::new();
        layout.set_minimum_size(Size::new(8, 8));
        layout.set_geometry(Rect::new(5, 5, 8, 8));
        let site = layout.find_drop_site(Point::new(6, 6)).unwrap();
        assert_eq!(site.index, 0);
        assert_eq!(site.top_left, Point::new(5, 5));
        assert_eq!(site.extent, 8);
    }

    #[test]
    fn test_find_drop_site_picks_row() {
        let mut layout = floating_layout(buttons(4, Size::new(10, 10)));
        layout.set_title_height(0);
        layout.set_contents_margins(Margins::ZERO);
        layout.adjust_to_width(22);
        assert_eq!(layout.row_breaks(), &[2, 4]);
        layout.set_geometry(Rect::new(0, 0, 22, 22));

        // second row starts at y = 12, the spacing gap belongs to the first
        assert_eq!(layout.find_drop_site(Point::new(1, 11)).unwrap().index, 0);
        assert_eq!(layout.find_drop_site(Point::new(1, 12)).unwrap().index, 2);
    }

    #[test]
    fn test_apply_state_validates_breaks() {
        let mut layout = floating_layout(buttons(4, Size::new(10, 10)));
        layout.apply_state(&ToolBarLayoutState {
            row_breaks: vec![2, 4],
        });
        assert_eq!(layout.row_breaks(), &[2, 4]);

        for invalid in [vec![2, 2, 4], vec![3, 2, 4], vec![0, 4], vec![2, 5], vec![2]] {
            layout.apply_state(&ToolBarLayoutState {
                row_breaks: invalid,
            });
            assert_eq!(layout.row_breaks(), &[2, 4]);
        }

        layout.apply_state(&ToolBarLayoutState {
            row_breaks: Vec::new(),
        });
        assert_eq!(layout.row_breaks(), &[2, 4]);
        assert_eq!(layout.state().row_breaks, vec![2, 4]);
    }

    #[test]
    fn test_insert_clears_row_breaks() {
        let mut layout = floating_layout(buttons(4, Size::new(10, 10)));
        layout.adjust_to_width(22);
        assert!(!layout.row_breaks().is_empty());
        layout.add_item(PackItem::new(Size::new(10, 10)));
        assert!(layout.row_breaks().is_empty());
        // falls back to the single row
        assert_eq!(layout.row_count(), 1);
    }

    #[test]
    fn test_title_and_handle_areas() {
        let mut layout = floating_layout(buttons(2, Size::new(10, 10)));
        layout.set_geometry(Rect::new(1, 1, 60, 40));
        assert_eq!(layout.title_area(), Rect::new(5, 5, 52, 20));
        assert_eq!(
            layout.close_button_rect(Size::new(16, 16)),
            Some(Rect::new(41, 7, 16, 16))
        );

        layout.set_floating(false);
        layout.set_geometry(Rect::new(1, 1, 60, 40));
        assert_eq!(layout.handle_area(), Rect::new(5, 5, 10, 32));
        assert_eq!(layout.close_button_rect(Size::new(16, 16)), None);
    }

    #[test]
    fn test_docked_contents_size() {
        let mut layout = ToolBarLayout::new().with_spacing(2);
        layout.set_items(vec![
            PackItem::new(Size::new(10, 12)),
            PackItem::new(Size::new(20, 8)),
        ]);
        assert_eq!(
            layout.docked_contents_size(Orientation::Horizontal),
            Size::new(32, 12)
        );
        assert_eq!(
            layout.docked_contents_size(Orientation::Vertical),
            Size::new(20, 22)
        );
        assert_eq!(
            ToolBarLayout::new().docked_contents_size(Orientation::Horizontal),
            Size::ZERO
        );
    }
}
