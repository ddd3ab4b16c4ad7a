//! Dockable toolbars.
//!
//! A [`ToolBar`] holds an ordered list of actions and packs them with a
//! [`ToolBarLayout`]. While docked it sits in one row of a tray and shows a
//! drag handle; while floating it is positioned freely, shows a title bar
//! and can be resized, which re-flows its items into more or fewer rows.
//!
//! Toolbars live in an arena owned by the window and are referred to by
//! [`ToolBarId`] everywhere else. Geometry is in window coordinates; the
//! packer works in toolbar-local coordinates.

mod drag;
mod layout;

use std::ops::{BitAnd, BitOr, BitOrAssign};

use cursor_icon::CursorIcon;
use horizon_toolbars_core::logging::targets;
use horizon_toolbars_core::{Margins, Orientation, Point, Rect, Signal, Size};
use slotmap::new_key_type;

use crate::action::{Action, ActionId, ActionKind, ActionRegistry, ToolButtonStyle};
use crate::config::{DockConfig, ToolBarMetrics};
use crate::state::ToolBarState;
use crate::tray::ToolBarTrays;

pub use drag::{DockDragController, DockState, DragController, ResizeMargin};
pub use layout::{
    DropSite, DynamicLayout, ItemRow, LayoutType, PackItem, PackedItem, Packing, ToolBarLayout,
    compute_dynamic_layouts, is_valid_row_breaks, layout_rows,
};

new_key_type! {
    /// Handle to a [`ToolBar`] stored in the window's toolbar arena.
    pub struct ToolBarId;
}

// ============================================================================
// ToolBarOptions
// ============================================================================

/// Creation options of a toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ToolBarOptions(u8);

impl ToolBarOptions {
    /// No options.
    pub const NONE: ToolBarOptions = ToolBarOptions(0);
    /// The toolbar was created by the user at runtime. Custom toolbars are
    /// persisted by title and recreated on restore.
    pub const IS_CUSTOM: ToolBarOptions = ToolBarOptions(1 << 0);

    /// Check if all options in `other` are set.
    pub fn contains(&self, other: ToolBarOptions) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ToolBarOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        ToolBarOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for ToolBarOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ToolBarOptions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        ToolBarOptions(self.0 & rhs.0)
    }
}

// ============================================================================
// ToolBarItem
// ============================================================================

/// An action placed on a toolbar, with the data needed to size it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ToolBarItem {
    action: ActionId,
    kind: ActionKind,
    visible: bool,
}

impl ToolBarItem {
    fn new(action: ActionId, data: &Action) -> Self {
        Self {
            action,
            kind: data.kind(),
            visible: data.is_visible(),
        }
    }
}

/// Size of a toolbar item.
///
/// Standard buttons are sized from the icon and label according to `style`,
/// plus the tool button margin on both axes. Separators are square.
pub fn item_size(
    kind: ActionKind,
    icon_size: Size,
    style: ToolButtonStyle,
    metrics: &ToolBarMetrics,
) -> Size {
    match kind {
        ActionKind::Separator => Size::new(metrics.separator_extent, metrics.separator_extent),
        ActionKind::Widget { size_hint } => size_hint,
        ActionKind::Button { label_size } => {
            let spacing = metrics.tool_button_label_spacing;
            let contents = match style {
                ToolButtonStyle::IconOnly => icon_size,
                ToolButtonStyle::TextOnly => label_size,
                ToolButtonStyle::TextBesideIcon => Size::new(
                    icon_size.width + spacing + label_size.width,
                    icon_size.height.max(label_size.height),
                ),
                ToolButtonStyle::TextUnderIcon => Size::new(
                    icon_size.width.max(label_size.width),
                    icon_size.height + spacing + label_size.height,
                ),
            };
            Size::new(
                contents.width + metrics.tool_button_margin,
                contents.height + metrics.tool_button_margin,
            )
        }
    }
}

// ============================================================================
// ToolBar
// ============================================================================

/// A dockable, floatable toolbar.
///
/// # Signals
///
/// - `is_floating_changed(bool)`: the toolbar docked or undocked
/// - `actions_customized(())`: the user changed the action list by drag and drop
/// - `icon_size_changed(Size)`
/// - `tool_button_style_changed(ToolButtonStyle)`
pub struct ToolBar {
    title: String,
    object_name: String,
    options: ToolBarOptions,
    items: Vec<ToolBarItem>,
    metrics: ToolBarMetrics,
    icon_size: Size,
    explicit_icon_size: bool,
    tool_button_style: ToolButtonStyle,
    explicit_tool_button_style: bool,
    allowed_trays: ToolBarTrays,
    floating: bool,
    hidden: bool,
    /// Geometry in window coordinates.
    geometry: Rect,
    layout: ToolBarLayout,
    drag: DragController,

    /// Emitted when the toolbar docks or undocks.
    pub is_floating_changed: Signal<bool>,
    /// Emitted after an action was dropped on or dragged off the toolbar.
    pub actions_customized: Signal<()>,
    /// Emitted when the icon size changes.
    pub icon_size_changed: Signal<Size>,
    /// Emitted when the tool button style changes.
    pub tool_button_style_changed: Signal<ToolButtonStyle>,
}

impl std::fmt::Debug for ToolBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBar")
            .field("title", &self.title)
            .field("object_name", &self.object_name)
            .field("options", &self.options)
            .field("items", &self.items.len())
            .field("floating", &self.floating)
            .field("hidden", &self.hidden)
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl ToolBar {
    /// Create an empty docked toolbar.
    pub fn new(title: impl Into<String>, metrics: &ToolBarMetrics) -> Self {
        let layout = ToolBarLayout::new()
            .with_spacing(metrics.spacing)
            .with_contents_margins(metrics.contents_margins())
            .with_title_height(metrics.title_height())
            .with_handle_extent(metrics.handle_extent)
            .with_columns(usize::try_from(metrics.columns).unwrap_or(1));

        let mut tool_bar = Self {
            title: title.into(),
            object_name: String::new(),
            options: ToolBarOptions::NONE,
            items: Vec::new(),
            metrics: *metrics,
            icon_size: metrics.icon_size(),
            explicit_icon_size: false,
            tool_button_style: ToolButtonStyle::default(),
            explicit_tool_button_style: false,
            allowed_trays: ToolBarTrays::ALL,
            floating: false,
            hidden: false,
            geometry: Rect::ZERO,
            layout,
            drag: DragController::new(),
            is_floating_changed: Signal::new(),
            actions_customized: Signal::new(),
            icon_size_changed: Signal::new(),
            tool_button_style_changed: Signal::new(),
        };
        tool_bar.update_minimum_size();
        tool_bar
    }

    /// Set the stable identity name used for persistence.
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    /// Set creation options.
    pub fn with_options(mut self, options: ToolBarOptions) -> Self {
        self.options = options;
        self
    }

    /// Restrict the trays the toolbar may dock into.
    pub fn with_allowed_trays(mut self, trays: ToolBarTrays) -> Self {
        self.allowed_trays = trays;
        self
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Stable identity name.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn set_object_name(&mut self, name: impl Into<String>) {
        self.object_name = name.into();
    }

    pub fn options(&self) -> ToolBarOptions {
        self.options
    }

    /// Whether the toolbar was created by the user at runtime.
    pub fn is_custom(&self) -> bool {
        self.options.contains(ToolBarOptions::IS_CUSTOM)
    }

    /// Name the toolbar is persisted under: the title for custom toolbars,
    /// the object name otherwise.
    pub fn persisted_name(&self) -> &str {
        if self.is_custom() {
            &self.title
        } else {
            &self.object_name
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Actions in order, including hidden ones.
    pub fn actions(&self) -> Vec<ActionId> {
        self.items.iter().map(|item| item.action).collect()
    }

    /// Number of actions, including hidden ones.
    pub fn action_count(&self) -> usize {
        self.items.len()
    }

    pub fn contains_action(&self, action: ActionId) -> bool {
        self.position_of(action).is_some()
    }

    fn position_of(&self, action: ActionId) -> Option<usize> {
        self.items.iter().position(|item| item.action == action)
    }

    /// Append an action.
    pub fn add_action(&mut self, id: ActionId, action: &Action) {
        self.insert_action(None, id, action);
    }

    /// Insert an action before `before`, or append it when `before` is
    /// `None` or not on this toolbar. An action already on the toolbar is
    /// moved.
    pub fn insert_action(&mut self, before: Option<ActionId>, id: ActionId, action: &Action) {
        if let Some(existing) = self.position_of(id) {
            self.items.remove(existing);
        }
        let index = before
            .and_then(|before| self.position_of(before))
            .unwrap_or(self.items.len());
        self.items.insert(index, ToolBarItem::new(id, action));
        self.rebuild_layout_items();
    }

    /// Remove an action. Returns `false` if it was not on the toolbar.
    pub fn remove_action(&mut self, id: ActionId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.items.remove(index);
        self.rebuild_layout_items();
        true
    }

    /// Remove all actions.
    pub fn clear(&mut self) {
        self.items.clear();
        self.rebuild_layout_items();
    }

    /// Refresh the cached kind and visibility of an action after it changed.
    pub fn action_changed(&mut self, id: ActionId, action: &Action) {
        let Some(index) = self.position_of(id) else {
            return;
        };
        let updated = ToolBarItem::new(id, action);
        let item = &mut self.items[index];
        if *item == updated {
            return;
        }
        let structural = item.visible != updated.visible
            || item.kind.is_separator() != updated.kind.is_separator();
        *item = updated;
        if structural {
            self.rebuild_layout_items();
        } else {
            self.refresh_item_sizes();
        }
    }

    fn visible_items(&self) -> impl Iterator<Item = &ToolBarItem> {
        self.items.iter().filter(|item| item.visible)
    }

    fn pack_item(&self, item: &ToolBarItem) -> PackItem {
        let size = item_size(
            item.kind,
            self.icon_size,
            self.tool_button_style,
            &self.metrics,
        );
        PackItem {
            size,
            is_separator: item.kind.is_separator(),
        }
    }

    fn rebuild_layout_items(&mut self) {
        let items = self.visible_items().map(|item| self.pack_item(item)).collect();
        self.layout.set_items(items);
        self.update_floating_geometry();
    }

    fn refresh_item_sizes(&mut self) {
        let sizes: Vec<Size> = self
            .visible_items()
            .map(|item| self.pack_item(item).size)
            .collect();
        for (index, size) in sizes.into_iter().enumerate() {
            self.layout.set_item_size(index, size);
        }
        self.update_floating_geometry();
    }

    /// Action shown at a packed item index.
    pub fn action_at_item(&self, item_index: usize) -> Option<ActionId> {
        self.visible_items().nth(item_index).map(|item| item.action)
    }

    /// Position in the action list of the packed item index, where an index
    /// past the last item maps to the end of the list.
    fn action_position_for_item(&self, item_index: usize) -> usize {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.visible)
            .nth(item_index)
            .map_or(self.items.len(), |(position, _)| position)
    }

    // =========================================================================
    // Appearance
    // =========================================================================

    pub fn metrics(&self) -> &ToolBarMetrics {
        &self.metrics
    }

    /// Replace the metrics. Resets an inherited icon size to the new default.
    pub fn set_metrics(&mut self, metrics: &ToolBarMetrics) {
        self.metrics = *metrics;
        self.layout.set_spacing(metrics.spacing);
        self.layout.set_contents_margins(metrics.contents_margins());
        self.layout.set_title_height(metrics.title_height());
        self.layout.set_handle_extent(metrics.handle_extent);
        if !self.explicit_icon_size {
            self.icon_size = metrics.icon_size();
        }
        self.update_minimum_size();
        self.refresh_item_sizes();
    }

    pub fn icon_size(&self) -> Size {
        self.icon_size
    }

    /// Set the icon size explicitly. An empty size restores the default
    /// icon size. Explicit sizes are not overridden by the window.
    pub fn set_icon_size(&mut self, size: Size) {
        self.explicit_icon_size = true;
        self.apply_icon_size(size);
    }

    /// Inherit the window's icon size unless one was set explicitly.
    pub fn update_icon_size(&mut self, size: Size) {
        if self.explicit_icon_size {
            return;
        }
        self.apply_icon_size(size);
    }

    fn apply_icon_size(&mut self, size: Size) {
        let size = if size.is_empty() {
            self.metrics.icon_size()
        } else {
            size
        };
        if size == self.icon_size {
            return;
        }
        self.icon_size = size;
        self.update_minimum_size();
        self.refresh_item_sizes();
        self.icon_size_changed.emit(size);
    }

    pub fn tool_button_style(&self) -> ToolButtonStyle {
        self.tool_button_style
    }

    /// Set the button style explicitly. Explicit styles are not overridden
    /// by the window.
    pub fn set_tool_button_style(&mut self, style: ToolButtonStyle) {
        self.explicit_tool_button_style = true;
        self.apply_tool_button_style(style);
    }

    /// Inherit the window's button style unless one was set explicitly.
    pub fn update_tool_button_style(&mut self, style: ToolButtonStyle) {
        if self.explicit_tool_button_style {
            return;
        }
        self.apply_tool_button_style(style);
    }

    fn apply_tool_button_style(&mut self, style: ToolButtonStyle) {
        if style == self.tool_button_style {
            return;
        }
        self.tool_button_style = style;
        self.refresh_item_sizes();
        self.tool_button_style_changed.emit(style);
    }

    fn update_minimum_size(&mut self) {
        // one icon-only button
        let button = Size::new(
            self.icon_size.width + self.metrics.tool_button_margin,
            self.icon_size.height + self.metrics.tool_button_margin,
        );
        self.layout.set_minimum_size(button);
    }

    pub fn column_layout(&self) -> bool {
        self.layout.column_layout()
    }

    pub fn set_column_layout(&mut self, column_layout: bool) {
        self.layout.set_column_layout(column_layout);
        self.update_floating_geometry();
    }

    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    pub fn set_columns(&mut self, columns: usize) {
        self.layout.set_columns(columns);
        self.update_floating_geometry();
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        self.layout.set_spacing(spacing);
        self.update_floating_geometry();
    }

    // =========================================================================
    // Docking properties
    // =========================================================================

    pub fn docked_orientation(&self) -> Orientation {
        self.layout.docked_orientation()
    }

    pub fn set_docked_orientation(&mut self, orientation: Orientation) {
        self.layout.set_docked_orientation(orientation);
    }

    pub fn allowed_trays(&self) -> ToolBarTrays {
        self.allowed_trays
    }

    pub fn set_allowed_trays(&mut self, trays: ToolBarTrays) {
        self.allowed_trays = trays;
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.hidden = !visible;
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    /// Whether the toolbar takes up space in its tray row.
    pub fn occupies_tray(&self) -> bool {
        !self.hidden && !self.floating
    }

    /// Floating toolbars can be resized unless they use the column layout.
    pub fn is_resizable(&self) -> bool {
        !self.layout.column_layout()
    }

    /// Whether the toolbar is being dragged inside its tray.
    pub fn is_moving(&self) -> bool {
        !self.floating && self.drag.is_dragging()
    }

    /// Current drag/resize state.
    pub fn dock_state(&self) -> DockState {
        self.drag.dock_state(self.floating)
    }

    pub fn drag_controller(&self) -> &DragController {
        &self.drag
    }

    pub(crate) fn drag_controller_mut(&mut self) -> &mut DragController {
        &mut self.drag
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Layout used to pack the items.
    pub fn layout(&self) -> &ToolBarLayout {
        &self.layout
    }

    fn frame_margins(&self) -> Margins {
        self.metrics.frame_margins()
    }

    /// Preferred size including the frame.
    pub fn size_hint(&self) -> Size {
        self.layout.size_hint().grown_by(self.frame_margins())
    }

    /// Minimum size including the frame.
    pub fn minimum_size(&self) -> Size {
        self.layout.minimum_size().grown_by(self.frame_margins())
    }

    /// Geometry in window coordinates.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn pos(&self) -> Point {
        self.geometry.origin
    }

    /// Assign the geometry of a docked toolbar.
    pub fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
        self.update_layout_geometry();
    }

    /// Move a floating toolbar. Its size always follows the size hint.
    pub fn move_to(&mut self, pos: Point) {
        self.geometry.origin = pos;
        self.update_floating_geometry();
    }

    fn update_floating_geometry(&mut self) {
        if self.floating {
            self.geometry.size = self.size_hint();
        }
        self.update_layout_geometry();
    }

    fn update_layout_geometry(&mut self) {
        let frame = self.frame_margins();
        self.layout.set_geometry(Rect::from_origin_size(
            frame.top_left(),
            self.geometry.size.shrunk_by(frame),
        ));
    }

    /// Size the toolbar would have when docked with `orientation`.
    pub fn docked_size(&self, orientation: Orientation) -> Size {
        self.layout
            .docked_contents_size(orientation)
            .grown_by(self.layout.inner_contents_margins_for(false, orientation))
            .grown_by(self.frame_margins())
    }

    /// Rectangle the toolbar would cover if docked with `orientation`, with
    /// its items kept in place.
    pub fn docked_rect(&self, orientation: Orientation) -> Rect {
        let current = self.layout.inner_contents_margins();
        let docked = self.layout.inner_contents_margins_for(false, orientation);
        Rect::from_origin_size(
            self.geometry.origin + current.top_left() - docked.top_left(),
            self.docked_size(orientation),
        )
    }

    /// Title bar rectangle in window coordinates.
    pub fn title_area(&self) -> Rect {
        self.layout.title_area().translated(self.geometry.origin)
    }

    /// Drag handle rectangle in window coordinates.
    pub fn handle_area(&self) -> Rect {
        self.layout.handle_area().translated(self.geometry.origin)
    }

    /// Close button rectangle in window coordinates, while floating.
    pub fn close_button_rect(&self) -> Option<Rect> {
        self.layout
            .close_button_rect(self.metrics.close_button_size())
            .map(|rect| rect.translated(self.geometry.origin))
    }

    /// Rectangles of the shown actions in window coordinates.
    pub fn item_rects(&self) -> Vec<(ActionId, Rect)> {
        self.layout
            .item_rects()
            .into_iter()
            .filter_map(|item| {
                self.action_at_item(item.index)
                    .map(|action| (action, item.rect.translated(self.geometry.origin)))
            })
            .collect()
    }

    /// Action under a point in window coordinates.
    pub fn action_at(&self, pos: Point) -> Option<ActionId> {
        self.item_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(action, _)| action)
    }

    // =========================================================================
    // Dock state transitions
    // =========================================================================

    /// Switch between docked and floating presentation.
    ///
    /// When floating, `pos` is where the items should stay: the toolbar is
    /// offset by the change in decoration so the contents do not jump. An
    /// active drag is re-anchored by the same offset.
    pub fn set_window_state(&mut self, floating: bool, pos: Point) {
        let was_floating = self.floating;
        let previous = self.layout.inner_contents_margins();

        self.floating = floating;
        self.layout.set_floating(floating);
        if !floating {
            self.drag.end_resize();
        }

        let margins = self.layout.inner_contents_margins();
        let offset = margins.top_left() - previous.top_left();
        if floating {
            self.geometry = Rect::from_origin_size(pos - offset, self.size_hint());
        }
        self.drag.rebase(offset);
        self.update_layout_geometry();

        if was_floating != floating {
            tracing::debug!(
                target: targets::DRAG,
                title = %self.title,
                floating,
                "toolbar window state changed"
            );
            self.is_floating_changed.emit(floating);
        }
    }

    /// Float the toolbar at `pos`. No effect if already floating.
    pub fn undock(&mut self, pos: Point) {
        if self.floating {
            return;
        }
        self.set_window_state(true, pos);
    }

    /// Dock the toolbar back into its row. No effect if already docked.
    pub fn dock(&mut self) {
        if !self.floating {
            return;
        }
        self.set_window_state(false, Point::ZERO);
    }

    /// Shift the drag anchor, used when rows above the toolbar appear or
    /// disappear during a drag.
    pub fn offset_drag_position(&mut self, offset: Point) {
        self.drag.offset_drag_position(offset);
    }

    // =========================================================================
    // Resizing
    // =========================================================================

    /// Resize margin under a point in window coordinates.
    pub fn margin_at(&self, pos: Point, band: i32) -> ResizeMargin {
        let local = pos - self.geometry.origin;
        if local.x < band {
            ResizeMargin::Left
        } else if local.x > self.geometry.width() - band {
            ResizeMargin::Right
        } else if local.y < band {
            ResizeMargin::Top
        } else if local.y > self.geometry.height() - band {
            ResizeMargin::Bottom
        } else {
            ResizeMargin::None
        }
    }

    /// Reflow a floating toolbar for a pointer at `pos` dragging `margin`.
    ///
    /// Dragging the left or top edge keeps the opposite edge in place.
    pub fn drag_margin(&mut self, margin: ResizeMargin, pos: Point) {
        let geometry = self.geometry;
        let frame = self.frame_margins();
        match margin {
            ResizeMargin::Left => {
                let width = geometry.right() - pos.x;
                let size = self
                    .layout
                    .adjust_to_width(width - frame.horizontal())
                    .grown_by(frame);
                if size.width != geometry.width() {
                    self.geometry.origin.x += geometry.width() - size.width;
                }
            }
            ResizeMargin::Right => {
                let width = pos.x - geometry.left() + 1;
                self.layout.adjust_to_width(width - frame.horizontal());
            }
            ResizeMargin::Top => {
                let height = geometry.bottom() - pos.y;
                let size = self
                    .layout
                    .adjust_to_height(height - frame.vertical())
                    .grown_by(frame);
                if size.height != geometry.height() {
                    self.geometry.origin.y += geometry.height() - size.height;
                }
            }
            ResizeMargin::Bottom => {
                let height = pos.y - geometry.top() + 1;
                self.layout.adjust_to_height(height - frame.vertical());
            }
            ResizeMargin::None => return,
        }
        self.update_floating_geometry();
    }

    // =========================================================================
    // Feedback
    // =========================================================================

    /// Cursor to show for a pointer at `pos` (window coordinates).
    pub fn cursor_at(&self, pos: Point, config: &DockConfig) -> CursorIcon {
        let margin = if self.drag.is_resizing() {
            self.drag.resize_margin()
        } else if self.floating && self.is_resizable() {
            self.margin_at(pos, config.resize_margin)
        } else {
            ResizeMargin::None
        };
        match margin {
            ResizeMargin::Left | ResizeMargin::Right => CursorIcon::EwResize,
            ResizeMargin::Top | ResizeMargin::Bottom => CursorIcon::NsResize,
            ResizeMargin::None => {
                if self.drag.is_dragging() || (!self.floating && self.handle_area().contains(pos))
                {
                    CursorIcon::Move
                } else {
                    CursorIcon::Default
                }
            }
        }
    }

    /// Insertion point for an action dropped at `pos` (window coordinates).
    ///
    /// The returned index is a position in [`actions`](Self::actions) and
    /// the corner is in window coordinates.
    pub fn find_drop_site(&self, pos: Point) -> Option<DropSite> {
        let site = self.layout.find_drop_site(pos - self.geometry.origin)?;
        Some(DropSite {
            index: self.action_position_for_item(site.index),
            top_left: site.top_left + self.geometry.origin,
            extent: site.extent,
        })
    }

    /// Thin rectangle marking where an action dropped at `pos` would go.
    pub fn drop_indicator_rect(&self, pos: Point, config: &DockConfig) -> Option<Rect> {
        let site = self.find_drop_site(pos)?;
        let margin = config.drop_indicator_margin;
        let width = config.drop_indicator_width;
        let across_row = self.floating
            || self.column_layout()
            || self.docked_orientation() == Orientation::Horizontal;
        Some(if across_row {
            Rect::from_origin_size(
                site.top_left + Point::new(-width / 2, margin),
                Size::new(width, site.extent - 2 * margin),
            )
        } else {
            Rect::from_origin_size(
                site.top_left + Point::new(margin, width / 2),
                Size::new(site.extent - 2 * margin, width),
            )
        })
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Persisted form of the item layout and action list.
    pub fn state(&self, registry: &ActionRegistry) -> ToolBarState {
        ToolBarState {
            layout: self.layout.state(),
            actions: self
                .items
                .iter()
                .filter_map(|item| registry.action_state(item.action))
                .collect(),
        }
    }

    /// Replace the action list and row breaks from persisted state.
    ///
    /// The toolbar's current separators are reused in order and only missing
    /// ones are created. Named actions are resolved through the registry and
    /// skipped when unknown.
    pub fn apply_state(&mut self, state: &ToolBarState, registry: &mut ActionRegistry) {
        let mut separators = self
            .items
            .iter()
            .filter(|item| item.kind.is_separator())
            .map(|item| item.action)
            .filter(|&id| registry.get(id).is_some_and(Action::is_separator))
            .collect::<Vec<_>>()
            .into_iter();

        let mut items = Vec::with_capacity(state.actions.len());
        for action_state in &state.actions {
            let reused = if action_state.is_separator {
                separators.next()
            } else {
                None
            };
            let Some(id) = reused.or_else(|| registry.resolve(action_state)) else {
                tracing::debug!(
                    target: targets::STATE,
                    name = %action_state.name,
                    "skipping unknown action"
                );
                continue;
            };
            if items.iter().any(|item: &ToolBarItem| item.action == id) {
                continue;
            }
            if let Some(action) = registry.get(id) {
                items.push(ToolBarItem::new(id, action));
            }
        }
        self.items = items;
        self.rebuild_layout_items();
        self.layout.apply_state(&state.layout);
        self.update_floating_geometry();
    }
}

static_assertions::assert_impl_all!(ToolBar: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActionState, ToolBarLayoutState};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metrics() -> ToolBarMetrics {
        ToolBarMetrics {
            icon_extent: 16,
            tool_button_margin: 4,
            separator_extent: 6,
            handle_extent: 10,
            frame_width: 1,
            contents_margin: 2,
            spacing: 2,
            ..ToolBarMetrics::default()
        }
    }

    fn tool_bar_with_buttons(registry: &mut ActionRegistry, count: usize) -> ToolBar {
        let mut tool_bar = ToolBar::new("Tools", &metrics());
        for i in 0..count {
            let action = Action::new(format!("Action {i}")).with_object_name(format!("a{i}"));
            let id = registry.insert(action.clone());
            registry.mark_known(id);
            tool_bar.add_action(id, &action);
        }
        tool_bar
    }

    #[test]
    fn test_item_size_by_style() {
        let m = metrics();
        let kind = ActionKind::Button {
            label_size: Size::new(30, 12),
        };
        let icon = Size::new(16, 16);
        assert_eq!(
            item_size(kind, icon, ToolButtonStyle::IconOnly, &m),
            Size::new(20, 20)
        );
        assert_eq!(
            item_size(kind, icon, ToolButtonStyle::TextOnly, &m),
            Size::new(34, 16)
        );
        assert_eq!(
            item_size(kind, icon, ToolButtonStyle::TextBesideIcon, &m),
            Size::new(16 + 4 + 30 + 4, 20)
        );
        assert_eq!(
            item_size(kind, icon, ToolButtonStyle::TextUnderIcon, &m),
            Size::new(34, 16 + 4 + 12 + 4)
        );
        assert_eq!(
            item_size(ActionKind::Separator, icon, ToolButtonStyle::IconOnly, &m),
            Size::new(6, 6)
        );
    }

    #[test]
    fn test_docked_size_hint() {
        let mut registry = ActionRegistry::new();
        let tool_bar = tool_bar_with_buttons(&mut registry, 3);
        // 3 buttons of 20 with spacing 2, handle 10, margins 2, frame 1
        assert_eq!(
            tool_bar.size_hint(),
            Size::new(64 + 10 + 4 + 2, 20 + 4 + 2)
        );
    }

    #[test]
    fn test_insert_action_before() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 2);
        let first = tool_bar.actions()[0];
        let extra = Action::separator();
        let id = registry.insert(extra.clone());
        tool_bar.insert_action(Some(first), id, &extra);
        assert_eq!(tool_bar.actions()[0], id);

        // re-inserting moves instead of duplicating
        tool_bar.insert_action(None, id, &extra);
        assert_eq!(tool_bar.action_count(), 3);
        assert_eq!(tool_bar.actions()[2], id);

        assert!(tool_bar.remove_action(id));
        assert!(!tool_bar.remove_action(id));
    }

    #[test]
    fn test_hidden_actions_are_not_packed() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 3);
        let second = tool_bar.actions()[1];
        let action = registry.get_mut(second).unwrap();
        action.set_visible(false);
        let action = action.clone();
        tool_bar.action_changed(second, &action);

        assert_eq!(tool_bar.layout().count(), 2);
        assert_eq!(tool_bar.action_count(), 3);
        assert_eq!(tool_bar.action_at_item(1), Some(tool_bar.actions()[2]));
    }

    #[test]
    fn test_icon_size_inheritance() {
        let mut tool_bar = ToolBar::new("Tools", &metrics());
        let changes = Arc::new(AtomicUsize::new(0));
        let changes_clone = changes.clone();
        tool_bar.icon_size_changed.connect(move |_| {
            changes_clone.fetch_add(1, Ordering::SeqCst);
        });

        tool_bar.update_icon_size(Size::new(32, 32));
        assert_eq!(tool_bar.icon_size(), Size::new(32, 32));

        tool_bar.set_icon_size(Size::new(24, 24));
        tool_bar.update_icon_size(Size::new(48, 48));
        assert_eq!(tool_bar.icon_size(), Size::new(24, 24));
        assert_eq!(changes.load(Ordering::SeqCst), 2);

        // an empty explicit size restores the default
        tool_bar.set_icon_size(Size::ZERO);
        assert_eq!(tool_bar.icon_size(), Size::new(16, 16));
    }

    #[test]
    fn test_tool_button_style_inheritance() {
        let mut tool_bar = ToolBar::new("Tools", &metrics());
        tool_bar.update_tool_button_style(ToolButtonStyle::TextOnly);
        assert_eq!(tool_bar.tool_button_style(), ToolButtonStyle::TextOnly);
        tool_bar.set_tool_button_style(ToolButtonStyle::IconOnly);
        tool_bar.update_tool_button_style(ToolButtonStyle::TextUnderIcon);
        assert_eq!(tool_bar.tool_button_style(), ToolButtonStyle::IconOnly);
    }

    #[test]
    fn test_undock_keeps_contents_in_place() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 2);
        let floating = Arc::new(AtomicUsize::new(0));
        let floating_clone = floating.clone();
        tool_bar.is_floating_changed.connect(move |_| {
            floating_clone.fetch_add(1, Ordering::SeqCst);
        });

        tool_bar.undock(Point::new(100, 100));
        assert!(tool_bar.is_floating());
        // handle (10 on the left) replaced by title (24 on top)
        let title = metrics().title_height();
        assert_eq!(tool_bar.pos(), Point::new(110, 100 - title));
        assert_eq!(tool_bar.geometry().size, tool_bar.size_hint());

        tool_bar.undock(Point::new(0, 0));
        assert_eq!(floating.load(Ordering::SeqCst), 1);

        tool_bar.dock();
        assert!(!tool_bar.is_floating());
        assert_eq!(floating.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_margin_at() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 4);
        tool_bar.undock(Point::new(50, 50));
        let geometry = tool_bar.geometry();
        let center = geometry.center();
        assert_eq!(
            tool_bar.margin_at(Point::new(geometry.left() + 1, center.y), 4),
            ResizeMargin::Left
        );
        assert_eq!(
            tool_bar.margin_at(Point::new(geometry.right() - 1, center.y), 4),
            ResizeMargin::Right
        );
        assert_eq!(
            tool_bar.margin_at(Point::new(center.x, geometry.top()), 4),
            ResizeMargin::Top
        );
        assert_eq!(
            tool_bar.margin_at(Point::new(center.x, geometry.bottom() - 1), 4),
            ResizeMargin::Bottom
        );
        assert_eq!(tool_bar.margin_at(center, 4), ResizeMargin::None);
    }

    #[test]
    fn test_drag_left_margin_keeps_right_edge() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 4);
        tool_bar.undock(Point::new(100, 100));
        let before = tool_bar.geometry();

        // drag the left edge far to the right: narrowest layout
        tool_bar.drag_margin(ResizeMargin::Left, Point::new(before.right() - 5, 120));
        let after = tool_bar.geometry();
        assert_eq!(after.right(), before.right());
        assert!(after.width() < before.width());
        assert!(after.height() > before.height());
        assert_eq!(tool_bar.layout().row_breaks(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_cursor_feedback() {
        let config = DockConfig {
            metrics: metrics(),
            ..DockConfig::default()
        };
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 2);
        tool_bar.set_geometry(Rect::from_origin_size(Point::ZERO, tool_bar.size_hint()));
        let handle = tool_bar.handle_area();
        assert_eq!(tool_bar.cursor_at(handle.center(), &config), CursorIcon::Move);
        let (_, item) = tool_bar.item_rects()[0];
        assert_eq!(tool_bar.cursor_at(item.center(), &config), CursorIcon::Default);

        tool_bar.undock(Point::new(40, 40));
        let geometry = tool_bar.geometry();
        assert_eq!(
            tool_bar.cursor_at(Point::new(geometry.left(), geometry.center().y), &config),
            CursorIcon::EwResize
        );
        assert_eq!(
            tool_bar.cursor_at(Point::new(geometry.center().x, geometry.bottom() - 1), &config),
            CursorIcon::NsResize
        );
    }

    #[test]
    fn test_drop_indicator_rect() {
        let config = DockConfig::default();
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 2);
        tool_bar.set_geometry(Rect::from_origin_size(Point::new(10, 0), tool_bar.size_hint()));

        let (_, first) = tool_bar.item_rects()[0];
        let rect = tool_bar.drop_indicator_rect(first.origin, &config).unwrap();
        assert_eq!(rect.origin, first.origin + Point::new(-1, 4));
        assert_eq!(rect.size, Size::new(2, first.height() - 8));

        assert_eq!(tool_bar.drop_indicator_rect(Point::new(0, 0), &config), None);
    }

    #[test]
    fn test_state_round_trip() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 3);
        tool_bar.undock(Point::ZERO);
        tool_bar.drag_margin(ResizeMargin::Right, Point::new(30, 10));
        let state = tool_bar.state(&registry);
        assert_eq!(state.actions.len(), 3);
        assert!(!state.layout.row_breaks.is_empty());

        let original = tool_bar.actions();
        let mut reversed = state.clone();
        reversed.actions.reverse();
        reversed.layout = ToolBarLayoutState::default();
        tool_bar.apply_state(&reversed, &mut registry);
        assert_eq!(tool_bar.actions(), original.iter().rev().copied().collect::<Vec<_>>());

        tool_bar.apply_state(&state, &mut registry);
        assert_eq!(tool_bar.actions(), original);
        assert_eq!(tool_bar.state(&registry), state);
    }

    #[test]
    fn test_apply_state_reuses_separators() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 1);
        let separator = Action::separator();
        let separator_id = registry.insert(separator.clone());
        registry.mark_known(separator_id);
        tool_bar.add_action(separator_id, &separator);

        let state = tool_bar.state(&registry);
        let before = registry.len();
        for _ in 0..10 {
            tool_bar.apply_state(&state, &mut registry);
        }
        assert_eq!(registry.len(), before);
        assert_eq!(tool_bar.actions()[1], separator_id);

        // a second separator in the saved state is created once
        let mut doubled = state.clone();
        doubled.actions.push(state.actions[1].clone());
        tool_bar.apply_state(&doubled, &mut registry);
        assert_eq!(registry.len(), before + 1);
        assert_eq!(tool_bar.action_count(), 3);
        assert_eq!(tool_bar.actions()[1], separator_id);
    }

    #[test]
    fn test_apply_state_skips_unknown_actions() {
        let mut registry = ActionRegistry::new();
        let mut tool_bar = tool_bar_with_buttons(&mut registry, 1);
        let state = ToolBarState {
            layout: ToolBarLayoutState::default(),
            actions: vec![
                ActionState {
                    is_separator: false,
                    name: "missing".into(),
                },
                ActionState {
                    is_separator: true,
                    name: String::new(),
                },
                ActionState {
                    is_separator: false,
                    name: "a0".into(),
                },
            ],
        };
        tool_bar.apply_state(&state, &mut registry);
        assert_eq!(tool_bar.action_count(), 2);
        let separator = tool_bar.actions()[0];
        assert!(registry.get(separator).unwrap().is_separator());
    }
}
