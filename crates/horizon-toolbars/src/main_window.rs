//! The window that owns toolbars and routes pointer input to them.
//!
//! [`MainWindow`] owns the toolbar arena and the [`ActionRegistry`], and
//! places toolbars in the four trays of its [`ContainerLayout`] around a
//! central area sized by the host.
//!
//! # Example
//!
//! ```
//! use horizon_toolbars::{Action, MainWindow, ToolBarTray};
//!
//! let mut window = MainWindow::new();
//! let file = window.create_tool_bar("File");
//! window.tool_bar_mut(file).unwrap().set_object_name("file");
//!
//! let open = window.actions_mut().insert(Action::new("&Open").with_object_name("open"));
//! window.add_action(file, open);
//! window.add_tool_bar_to_tray(ToolBarTray::Left, file);
//!
//! assert_eq!(window.tool_bar_tray(file), Some(ToolBarTray::Left));
//! let saved = window.save_state();
//! assert!(window.restore_state(&saved));
//! ```
//!
//! # Input routing
//!
//! [`dispatch`](MainWindow::dispatch) consults a single routing table per
//! event: an active toolbar drag or resize, or an action being dragged while
//! customizing, captures every pointer event until release. Otherwise the
//! topmost toolbar under the pointer receives it, floating toolbars first.

use cursor_icon::CursorIcon;
use horizon_toolbars_core::logging::targets;
use horizon_toolbars_core::{Point, Rect, Signal, Size};
use slotmap::SlotMap;

use crate::action::{Action, ActionId, ActionRegistry, ToolButtonStyle};
use crate::config::DockConfig;
use crate::container_layout::ContainerLayout;
use crate::error::Result;
use crate::input::{MouseButton, PointerEvent};
use crate::state::LayoutState;
use crate::tool_bar::{DockDragController, ToolBar, ToolBarId, ToolBarOptions};
use crate::tray::ToolBarTray;

/// How a dropped action is placed on its target toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DropMode {
    /// Take the action off its source toolbar.
    #[default]
    Move,
    /// Leave the action on its source toolbar as well.
    Copy,
}

/// Current owner of pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grab {
    /// A toolbar is being dragged or resized.
    ToolBar(ToolBarId),
    /// An action is being dragged off a toolbar while customizing.
    Action {
        source: ToolBarId,
        action: ActionId,
        pos: Point,
    },
}

/// A window with four toolbar trays around a central area.
///
/// # Signals
///
/// - `icon_size_changed(Size)`: the window icon size changed
/// - `tool_button_style_changed(ToolButtonStyle)`: the window button style changed
///
/// Toolbar insertion and removal notifications come from the container, see
/// [`tool_bar_inserted`](Self::tool_bar_inserted) and friends.
#[derive(Debug)]
pub struct MainWindow {
    tool_bars: SlotMap<ToolBarId, ToolBar>,
    actions: ActionRegistry,
    container: ContainerLayout,
    config: DockConfig,

    icon_size: Size,
    tool_button_style: ToolButtonStyle,
    customizing: bool,
    grab: Option<Grab>,

    /// Emitted when the window icon size changes.
    pub icon_size_changed: Signal<Size>,
    /// Emitted when the window button style changes.
    pub tool_button_style_changed: Signal<ToolButtonStyle>,
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl MainWindow {
    /// Create a window with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DockConfig::default())
    }

    /// Create a window with a custom configuration.
    pub fn with_config(config: DockConfig) -> Self {
        let mut container = ContainerLayout::new();
        container.set_contents_margins(config.container_margins);
        Self {
            tool_bars: SlotMap::with_key(),
            actions: ActionRegistry::new(),
            container,
            icon_size: config.metrics.icon_size(),
            tool_button_style: ToolButtonStyle::default(),
            customizing: false,
            grab: None,
            config,
            icon_size_changed: Signal::new(),
            tool_button_style_changed: Signal::new(),
        }
    }

    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn container(&self) -> &ContainerLayout {
        &self.container
    }

    // =========================================================================
    // Toolbars
    // =========================================================================

    /// Create a toolbar owned by this window. It is not placed in a tray
    /// until added.
    pub fn create_tool_bar(&mut self, title: impl Into<String>) -> ToolBarId {
        self.tool_bars
            .insert(ToolBar::new(title, &self.config.metrics))
    }

    /// Create a user-defined toolbar, persisted by title.
    pub fn create_custom_tool_bar(&mut self, title: impl Into<String>) -> ToolBarId {
        self.tool_bars.insert(
            ToolBar::new(title, &self.config.metrics).with_options(ToolBarOptions::IS_CUSTOM),
        )
    }

    /// Remove a toolbar from its tray and destroy it.
    pub fn destroy_tool_bar(&mut self, id: ToolBarId) -> Option<ToolBar> {
        self.remove_tool_bar(id);
        self.tool_bars.remove(id)
    }

    pub fn tool_bar(&self, id: ToolBarId) -> Option<&ToolBar> {
        self.tool_bars.get(id)
    }

    pub fn tool_bar_mut(&mut self, id: ToolBarId) -> Option<&mut ToolBar> {
        self.container.invalidate();
        self.tool_bars.get_mut(id)
    }

    /// Add a toolbar to the top tray.
    pub fn add_tool_bar(&mut self, id: ToolBarId) {
        self.add_tool_bar_to_tray(ToolBarTray::Top, id);
    }

    /// Add a toolbar at the end of `tray`. A toolbar already in a tray is
    /// moved.
    pub fn add_tool_bar_to_tray(&mut self, tray: ToolBarTray, id: ToolBarId) {
        if !self.prepare_insert(id) {
            return;
        }
        self.container.add_tool_bar(&mut self.tool_bars, tray, id);
    }

    /// Insert a toolbar before `before`, in the same tray.
    pub fn insert_tool_bar(&mut self, before: ToolBarId, id: ToolBarId) {
        if !self.prepare_insert(id) {
            return;
        }
        self.container.insert_tool_bar(&mut self.tool_bars, before, id);
    }

    fn prepare_insert(&mut self, id: ToolBarId) -> bool {
        let Some(tool_bar) = self.tool_bars.get_mut(id) else {
            tracing::warn!(target: targets::CONTAINER, "add_tool_bar: unknown toolbar");
            return false;
        };
        tool_bar.update_icon_size(self.icon_size);
        tool_bar.update_tool_button_style(self.tool_button_style);
        tool_bar.show();
        for action in tool_bar.actions() {
            self.actions.mark_known(action);
        }
        true
    }

    /// Take a toolbar out of its tray and hide it. The toolbar stays owned
    /// by the window.
    pub fn remove_tool_bar(&mut self, id: ToolBarId) {
        if matches!(self.grab, Some(Grab::ToolBar(grabbed)) if grabbed == id)
            || matches!(self.grab, Some(Grab::Action { source, .. }) if source == id)
        {
            self.grab = None;
        }
        self.container.remove_tool_bar(id);
        if let Some(tool_bar) = self.tool_bars.get_mut(id) {
            tool_bar.drag_controller_mut().cancel();
            tool_bar.hide();
        }
    }

    /// Start a new row after the last row of `tray`.
    pub fn add_tool_bar_break(&mut self, tray: ToolBarTray) {
        self.container.add_tool_bar_break(tray);
    }

    /// Start a new row at `before`.
    pub fn insert_tool_bar_break(&mut self, before: ToolBarId) {
        self.container.insert_tool_bar_break(before);
    }

    pub fn tool_bar_count(&self) -> usize {
        self.container.tool_bar_count()
    }

    pub fn tool_bar_at(&self, index: usize) -> Option<ToolBarId> {
        self.container.tool_bar_at(index)
    }

    /// Tray of a toolbar, or `None` if it is not in any tray.
    pub fn tool_bar_tray(&self, id: ToolBarId) -> Option<ToolBarTray> {
        self.container.tool_bar_tray(id)
    }

    pub fn tool_bar_about_to_be_inserted(&self) -> &Signal<(ToolBarId, usize)> {
        &self.container.tool_bar_about_to_be_inserted
    }

    pub fn tool_bar_inserted(&self) -> &Signal<ToolBarId> {
        &self.container.tool_bar_inserted
    }

    pub fn tool_bar_about_to_be_removed(&self) -> &Signal<(ToolBarId, usize)> {
        &self.container.tool_bar_about_to_be_removed
    }

    pub fn tool_bar_removed(&self) -> &Signal<()> {
        &self.container.tool_bar_removed
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Mutable access to the registry. Call
    /// [`action_changed`](Self::action_changed) after editing an action that
    /// is on a toolbar.
    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    /// Append an action to a toolbar.
    pub fn add_action(&mut self, tool_bar: ToolBarId, action: ActionId) {
        self.insert_action(tool_bar, None, action);
    }

    /// Insert an action before `before` on a toolbar, or append it.
    pub fn insert_action(
        &mut self,
        tool_bar: ToolBarId,
        before: Option<ActionId>,
        action: ActionId,
    ) {
        let (Some(target), Some(data)) = (self.tool_bars.get_mut(tool_bar), self.actions.get(action))
        else {
            return;
        };
        target.insert_action(before, action, data);
        self.actions.mark_known(action);
        self.container.invalidate();
    }

    /// Append a new separator to a toolbar.
    pub fn add_separator(&mut self, tool_bar: ToolBarId) -> Option<ActionId> {
        if !self.tool_bars.contains_key(tool_bar) {
            return None;
        }
        let separator = self.actions.insert(Action::separator());
        self.add_action(tool_bar, separator);
        Some(separator)
    }

    /// Take an action off a toolbar. The action stays in the registry.
    pub fn remove_action(&mut self, tool_bar: ToolBarId, action: ActionId) -> bool {
        let removed = self
            .tool_bars
            .get_mut(tool_bar)
            .is_some_and(|target| target.remove_action(action));
        if removed {
            self.container.invalidate();
        }
        removed
    }

    /// Refresh every toolbar showing `action` after it was edited.
    pub fn action_changed(&mut self, action: ActionId) {
        let Some(data) = self.actions.get(action) else {
            return;
        };
        for tool_bar in self.tool_bars.values_mut() {
            tool_bar.action_changed(action, data);
        }
        self.container.invalidate();
    }

    // =========================================================================
    // Appearance
    // =========================================================================

    pub fn icon_size(&self) -> Size {
        self.icon_size
    }

    /// Set the icon size inherited by toolbars without their own.
    pub fn set_icon_size(&mut self, size: Size) {
        let size = if size.is_empty() {
            self.config.metrics.icon_size()
        } else {
            size
        };
        if size == self.icon_size {
            return;
        }
        self.icon_size = size;
        for &id in self.container.tool_bars() {
            if let Some(tool_bar) = self.tool_bars.get_mut(id) {
                tool_bar.update_icon_size(size);
            }
        }
        self.container.invalidate();
        self.icon_size_changed.emit(size);
    }

    pub fn tool_button_style(&self) -> ToolButtonStyle {
        self.tool_button_style
    }

    /// Set the button style inherited by toolbars without their own.
    pub fn set_tool_button_style(&mut self, style: ToolButtonStyle) {
        if style == self.tool_button_style {
            return;
        }
        self.tool_button_style = style;
        for &id in self.container.tool_bars() {
            if let Some(tool_bar) = self.tool_bars.get_mut(id) {
                tool_bar.update_tool_button_style(style);
            }
        }
        self.container.invalidate();
        self.tool_button_style_changed.emit(style);
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn set_central_size_hint(&mut self, size: Size) {
        self.container.set_central_size_hint(size);
    }

    pub fn set_central_minimum_size(&mut self, size: Size) {
        self.container.set_central_minimum_size(size);
    }

    /// Area left for the central widget by the last layout pass.
    pub fn central_rect(&self) -> Rect {
        self.container.central_rect()
    }

    /// Lay out trays and toolbars in `rect`.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.container.set_geometry(&mut self.tool_bars, rect);
    }

    pub fn geometry(&self) -> Rect {
        self.container.geometry()
    }

    /// Run a pending layout pass.
    pub fn activate_layout(&mut self) {
        self.container.activate(&mut self.tool_bars);
    }

    pub fn size_hint(&self) -> Size {
        self.container.size_hint(&self.tool_bars)
    }

    pub fn minimum_size(&self) -> Size {
        self.container.minimum_size(&self.tool_bars)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Encode the layout of every tray.
    pub fn save_state(&self) -> Vec<u8> {
        self.layout_state().encode()
    }

    /// Layout of every tray, before encoding.
    pub fn layout_state(&self) -> LayoutState {
        self.container.save_state(&self.tool_bars, &self.actions)
    }

    /// Restore a layout saved by [`save_state`](Self::save_state).
    ///
    /// Returns `false` without changing anything if the data is malformed
    /// or from another format version.
    pub fn restore_state(&mut self, data: &[u8]) -> bool {
        match self.try_restore_state(data) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(target: targets::STATE, %error, "failed to restore toolbar state");
                false
            }
        }
    }

    /// Like [`restore_state`](Self::restore_state), with the reason for a
    /// failure.
    pub fn try_restore_state(&mut self, data: &[u8]) -> Result<()> {
        let state = LayoutState::decode(data)?;
        self.apply_layout_state(&state);
        Ok(())
    }

    /// Apply a decoded layout.
    pub fn apply_layout_state(&mut self, state: &LayoutState) {
        self.grab = None;
        for &id in self.container.tool_bars() {
            if let Some(tool_bar) = self.tool_bars.get_mut(id) {
                tool_bar.drag_controller_mut().cancel();
                for action in tool_bar.actions() {
                    self.actions.mark_known(action);
                }
            }
        }

        self.container.restore_state(
            &mut self.tool_bars,
            &mut self.actions,
            &self.config.metrics,
            state,
        );

        for &id in self.container.tool_bars() {
            if let Some(tool_bar) = self.tool_bars.get_mut(id) {
                tool_bar.update_icon_size(self.icon_size);
                tool_bar.update_tool_button_style(self.tool_button_style);
            }
        }
        self.activate_layout();
    }

    // =========================================================================
    // Customization
    // =========================================================================

    pub fn is_customizing(&self) -> bool {
        self.customizing
    }

    /// While customizing, pressing an action starts dragging it to another
    /// place or toolbar instead of triggering it.
    pub fn set_customizing(&mut self, customizing: bool) {
        self.customizing = customizing;
        if !customizing && matches!(self.grab, Some(Grab::Action { .. })) {
            self.grab = None;
        }
    }

    /// Drop `action`, dragged from `source`, on the toolbar `target` at
    /// `pos`. Returns whether the drop landed on an insertion point.
    pub fn drop_action(
        &mut self,
        source: ToolBarId,
        action: ActionId,
        target: ToolBarId,
        pos: Point,
        mode: DropMode,
    ) -> bool {
        let Some(data) = self.actions.get(action) else {
            return false;
        };
        let Some(target_bar) = self.tool_bars.get(target) else {
            return false;
        };
        let Some(site) = target_bar.find_drop_site(pos) else {
            return false;
        };
        let before = target_bar.actions().get(site.index).copied();

        match mode {
            DropMode::Move => {
                if before == Some(action) {
                    return true;
                }
                if let Some(source_bar) = self.tool_bars.get_mut(source)
                    && source_bar.remove_action(action)
                {
                    source_bar.actions_customized.emit(());
                }
            }
            DropMode::Copy => {}
        }
        if let Some(target_bar) = self.tool_bars.get_mut(target) {
            target_bar.insert_action(before, action, data);
            target_bar.actions_customized.emit(());
        }
        self.actions.mark_known(action);
        self.container.invalidate();
        tracing::debug!(target: targets::CUSTOMIZE, ?mode, index = site.index, "action dropped");
        true
    }

    /// An action dragged off `source` was dropped outside every toolbar:
    /// take it off `source`.
    pub fn discard_dragged_action(&mut self, source: ToolBarId, action: ActionId) {
        if let Some(source_bar) = self.tool_bars.get_mut(source)
            && source_bar.remove_action(action)
        {
            source_bar.actions_customized.emit(());
            self.container.invalidate();
            tracing::debug!(target: targets::CUSTOMIZE, "dragged action discarded");
        }
    }

    /// Indicator for the action currently being dragged, in window
    /// coordinates.
    pub fn drop_indicator_rect(&self) -> Option<Rect> {
        let Some(Grab::Action { pos, .. }) = self.grab else {
            return None;
        };
        let target = self.tool_bar_at_point(pos)?;
        self.tool_bars.get(target)?.drop_indicator_rect(pos, &self.config)
    }

    /// Action being dragged while customizing, with its source toolbar.
    pub fn dragged_action(&self) -> Option<(ToolBarId, ActionId)> {
        match self.grab {
            Some(Grab::Action { source, action, .. }) => Some((source, action)),
            _ => None,
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Toolbar drawn at `pos`: floating toolbars first, later ones on top.
    pub fn tool_bar_at_point(&self, pos: Point) -> Option<ToolBarId> {
        let shown = |floating: bool| {
            self.container.tool_bars().iter().rev().copied().find(|&id| {
                self.tool_bars.get(id).is_some_and(|tool_bar| {
                    tool_bar.is_visible()
                        && tool_bar.is_floating() == floating
                        && tool_bar.geometry().contains(pos)
                })
            })
        };
        shown(true).or_else(|| shown(false))
    }

    /// Toolbar currently capturing the pointer.
    pub fn grabber(&self) -> Option<ToolBarId> {
        match self.grab {
            Some(Grab::ToolBar(id)) => Some(id),
            Some(Grab::Action { source, .. }) => Some(source),
            None => None,
        }
    }

    /// Cursor to show for the pointer at `pos`.
    pub fn cursor(&self, pos: Point) -> CursorIcon {
        match self.grab {
            Some(Grab::ToolBar(id)) => self
                .tool_bars
                .get(id)
                .map_or(CursorIcon::Default, |tool_bar| tool_bar.cursor_at(pos, &self.config)),
            Some(Grab::Action { .. }) => CursorIcon::Grabbing,
            None => {
                let Some(tool_bar) = self
                    .tool_bar_at_point(pos)
                    .and_then(|id| self.tool_bars.get(id))
                else {
                    return CursorIcon::Default;
                };
                if self.customizing && tool_bar.action_at(pos).is_some() {
                    CursorIcon::Grab
                } else {
                    tool_bar.cursor_at(pos, &self.config)
                }
            }
        }
    }

    /// Route a pointer event. Returns whether it was consumed.
    pub fn dispatch(&mut self, event: PointerEvent) -> bool {
        let handled = match self.grab {
            Some(Grab::ToolBar(id)) => self.dispatch_to_grabber(id, event),
            Some(Grab::Action { source, action, .. }) => {
                self.dispatch_action_drag(source, action, event)
            }
            None => self.dispatch_to_hit(event),
        };
        self.activate_layout();
        handled
    }

    fn dispatch_to_grabber(&mut self, id: ToolBarId, event: PointerEvent) -> bool {
        let mut controller =
            DockDragController::new(&mut self.container, &mut self.tool_bars, &self.config);
        match event {
            PointerEvent::Move { pos } => controller.handle_mouse_move(id, pos),
            PointerEvent::Release { pos, button } => {
                let handled = controller.handle_mouse_release(id, pos, button);
                if button == MouseButton::Left {
                    self.grab = None;
                }
                handled
            }
            PointerEvent::CaptureLost => {
                controller.handle_capture_lost(id);
                self.grab = None;
                true
            }
            // the grab owns the pointer until release
            PointerEvent::Press { .. }
            | PointerEvent::DoubleClick { .. }
            | PointerEvent::Hover { .. } => true,
        }
    }

    fn dispatch_action_drag(
        &mut self,
        source: ToolBarId,
        action: ActionId,
        event: PointerEvent,
    ) -> bool {
        match event {
            PointerEvent::Move { pos } | PointerEvent::Hover { pos } => {
                self.grab = Some(Grab::Action {
                    source,
                    action,
                    pos,
                });
            }
            PointerEvent::Release { pos, button } => {
                if button != MouseButton::Left {
                    return true;
                }
                self.grab = None;
                match self.tool_bar_at_point(pos) {
                    Some(target) => {
                        self.drop_action(source, action, target, pos, DropMode::Move);
                    }
                    None => self.discard_dragged_action(source, action),
                }
            }
            PointerEvent::CaptureLost => {
                self.grab = None;
            }
            PointerEvent::Press { .. } | PointerEvent::DoubleClick { .. } => {}
        }
        true
    }

    fn dispatch_to_hit(&mut self, event: PointerEvent) -> bool {
        let Some(pos) = event.pos() else {
            return false;
        };
        let Some(id) = self.tool_bar_at_point(pos) else {
            return false;
        };

        match event {
            PointerEvent::Press { pos, button } => {
                if self.customizing
                    && button == MouseButton::Left
                    && let Some(action) = self.tool_bars.get(id).and_then(|t| t.action_at(pos))
                {
                    self.grab = Some(Grab::Action {
                        source: id,
                        action,
                        pos,
                    });
                    tracing::debug!(target: targets::CUSTOMIZE, "action drag started");
                    return true;
                }

                let mut controller =
                    DockDragController::new(&mut self.container, &mut self.tool_bars, &self.config);
                let handled = controller.handle_mouse_press(id, pos, button);
                let captured = self.tool_bars.get(id).is_some_and(|tool_bar| {
                    let drag = tool_bar.drag_controller();
                    drag.is_dragging() || drag.is_resizing()
                });
                if captured {
                    self.grab = Some(Grab::ToolBar(id));
                }
                handled
            }
            PointerEvent::DoubleClick { pos, button } => {
                DockDragController::new(&mut self.container, &mut self.tool_bars, &self.config)
                    .handle_double_click(id, pos, button)
            }
            PointerEvent::Move { .. } | PointerEvent::Release { .. } | PointerEvent::Hover { .. } => {
                false
            }
            PointerEvent::CaptureLost => false,
        }
    }
}

static_assertions::assert_impl_all!(MainWindow: Send, Sync);
