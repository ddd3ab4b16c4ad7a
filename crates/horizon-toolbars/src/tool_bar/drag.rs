//! Interactive drag, resize and dock/undock of a toolbar.
//!
//! [`DragController`] is the per-toolbar bookkeeping: whether a drag or a
//! margin resize is in progress and where the pointer grabbed the toolbar.
//! [`DockDragController`] drives it from pointer events and calls into the
//! container to reflow rows and re-dock floating toolbars.

use horizon_toolbars_core::logging::targets;
use horizon_toolbars_core::Point;

use super::ToolBarId;
use crate::config::DockConfig;
use crate::container_layout::ContainerLayout;
use crate::input::MouseButton;
use crate::tray_layout::ToolBarAccess;

// ============================================================================
// DockState
// ============================================================================

/// Presentation and interaction state of a toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockState {
    /// Docked in a tray row.
    Docked,
    /// Docked and being dragged by its handle.
    DraggingDocked,
    /// Floating over the window.
    Floating,
    /// Floating and being dragged by its title bar.
    DraggingFloating,
    /// Floating and being resized by one of its margins.
    Resizing,
}

/// Edge of a floating toolbar grabbed for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeMargin {
    #[default]
    None,
    Left,
    Right,
    Top,
    Bottom,
}

// ============================================================================
// DragController
// ============================================================================

/// Drag and resize bookkeeping of a single toolbar.
///
/// Positions are offsets from the toolbar's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragController {
    dragging: bool,
    drag_pos: Point,
    initial_drag_pos: Point,
    resize_margin: ResizeMargin,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_resizing(&self) -> bool {
        self.resize_margin != ResizeMargin::None
    }

    pub fn resize_margin(&self) -> ResizeMargin {
        self.resize_margin
    }

    /// Where the pointer holds the toolbar.
    pub fn drag_pos(&self) -> Point {
        self.drag_pos
    }

    /// Where the pointer grabbed the toolbar when the drag started.
    pub fn initial_drag_pos(&self) -> Point {
        self.initial_drag_pos
    }

    /// Combine with the floating flag into a [`DockState`].
    pub fn dock_state(&self, floating: bool) -> DockState {
        match (floating, self.dragging, self.is_resizing()) {
            (true, _, true) => DockState::Resizing,
            (true, true, false) => DockState::DraggingFloating,
            (true, false, false) => DockState::Floating,
            (false, true, _) => DockState::DraggingDocked,
            (false, false, _) => DockState::Docked,
        }
    }

    pub fn start_drag(&mut self, local: Point) {
        self.dragging = true;
        self.drag_pos = local;
        self.initial_drag_pos = local;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn start_resize(&mut self, margin: ResizeMargin) {
        self.resize_margin = margin;
    }

    pub fn end_resize(&mut self) {
        self.resize_margin = ResizeMargin::None;
    }

    /// End any drag or resize.
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.resize_margin = ResizeMargin::None;
    }

    /// Re-anchor an active drag after the decoration changed by `offset`.
    pub fn rebase(&mut self, offset: Point) {
        if !self.dragging {
            return;
        }
        self.drag_pos = self.initial_drag_pos + offset;
        self.initial_drag_pos = self.drag_pos;
    }

    pub fn offset_drag_position(&mut self, offset: Point) {
        self.drag_pos += offset;
    }
}

// ============================================================================
// DockDragController
// ============================================================================

/// Pointer handling for one toolbar.
///
/// Borrowed for the duration of a single event: the toolbar arena, the
/// container that owns the trays and the configuration.
pub struct DockDragController<'a, S: ToolBarAccess> {
    container: &'a mut ContainerLayout,
    tool_bars: &'a mut S,
    config: &'a DockConfig,
}

impl<'a, S: ToolBarAccess> DockDragController<'a, S> {
    pub fn new(
        container: &'a mut ContainerLayout,
        tool_bars: &'a mut S,
        config: &'a DockConfig,
    ) -> Self {
        Self {
            container,
            tool_bars,
            config,
        }
    }

    /// Start a resize on a floating margin, or a drag on the title bar
    /// (floating) or handle (docked). Pressing the close button hides a
    /// floating toolbar.
    pub fn handle_mouse_press(&mut self, id: ToolBarId, pos: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        let band = self.config.resize_margin;
        let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) else {
            return false;
        };

        if tool_bar.is_floating() && !tool_bar.drag_controller().is_resizing() {
            if tool_bar
                .close_button_rect()
                .is_some_and(|rect| rect.contains(pos))
            {
                tool_bar.hide();
                self.container.invalidate();
                return true;
            }
            if tool_bar.is_resizable() {
                let margin = tool_bar.margin_at(pos, band);
                if margin != ResizeMargin::None {
                    tool_bar.drag_controller_mut().start_resize(margin);
                    return true;
                }
            }
        }

        let grab_area = if tool_bar.is_floating() {
            tool_bar.title_area()
        } else {
            tool_bar.handle_area()
        };
        if !grab_area.contains(pos) {
            return false;
        }
        let local = pos - tool_bar.pos();
        tool_bar.drag_controller_mut().start_drag(local);
        tracing::debug!(
            target: targets::DRAG,
            title = %tool_bar.title(),
            floating = tool_bar.is_floating(),
            "drag started"
        );
        true
    }

    /// Resize, move a floating toolbar, or move a docked toolbar within
    /// its tray.
    pub fn handle_mouse_move(&mut self, id: ToolBarId, pos: Point) -> bool {
        let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) else {
            return false;
        };
        let drag = *tool_bar.drag_controller();

        if tool_bar.is_floating() && drag.is_resizing() {
            tool_bar.drag_margin(drag.resize_margin(), pos);
            return true;
        }
        if !drag.is_dragging() {
            return false;
        }

        if tool_bar.is_floating() {
            tool_bar.move_to(pos - drag.drag_pos());
            self.container
                .hover_tool_bar(self.tool_bars, id, pos, self.config);
        } else {
            self.container
                .move_tool_bar(self.tool_bars, id, pos - drag.drag_pos(), pos, self.config);
        }
        true
    }

    /// Finish a resize or a drag. A docked toolbar settles its row.
    pub fn handle_mouse_release(&mut self, id: ToolBarId, _pos: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) else {
            return false;
        };
        if tool_bar.drag_controller().is_resizing() {
            tool_bar.drag_controller_mut().end_resize();
            return true;
        }
        if !tool_bar.drag_controller().is_dragging() {
            return false;
        }
        let docked = !tool_bar.is_floating();
        if docked {
            self.container.adjust_tool_bar_row(self.tool_bars, id);
        }
        if let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) {
            tool_bar.drag_controller_mut().end_drag();
            tracing::debug!(target: targets::DRAG, title = %tool_bar.title(), "drag ended");
        }
        self.container.invalidate();
        true
    }

    /// Double-clicking the title bar of a floating toolbar docks it back.
    pub fn handle_double_click(&mut self, id: ToolBarId, pos: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) else {
            return false;
        };
        if !tool_bar.is_floating() || !tool_bar.title_area().contains(pos) {
            return false;
        }
        tool_bar.dock();
        self.container.invalidate();
        true
    }

    /// Pointer capture was lost: abandon any drag or resize where it is.
    pub fn handle_capture_lost(&mut self, id: ToolBarId) {
        let Some(tool_bar) = self.tool_bars.tool_bar_mut(id) else {
            return;
        };
        let drag = *tool_bar.drag_controller();
        tool_bar.drag_controller_mut().cancel();
        if drag.is_dragging() && !tool_bar.is_floating() {
            self.container.adjust_tool_bar_row(self.tool_bars, id);
        }
        self.container.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dock_state() {
        let mut drag = DragController::new();
        assert_eq!(drag.dock_state(false), DockState::Docked);
        assert_eq!(drag.dock_state(true), DockState::Floating);

        drag.start_drag(Point::new(3, 4));
        assert_eq!(drag.dock_state(false), DockState::DraggingDocked);
        assert_eq!(drag.dock_state(true), DockState::DraggingFloating);
        drag.end_drag();

        drag.start_resize(ResizeMargin::Left);
        assert_eq!(drag.dock_state(true), DockState::Resizing);
        drag.cancel();
        assert_eq!(drag.dock_state(true), DockState::Floating);
    }

    #[test]
    fn test_rebase_only_while_dragging() {
        let mut drag = DragController::new();
        drag.rebase(Point::new(10, 10));
        assert_eq!(drag.drag_pos(), Point::ZERO);

        drag.start_drag(Point::new(5, 5));
        drag.offset_drag_position(Point::new(0, 20));
        assert_eq!(drag.drag_pos(), Point::new(5, 25));

        // rebase starts from the initial grab point
        drag.rebase(Point::new(-10, 24));
        assert_eq!(drag.drag_pos(), Point::new(-5, 29));
        assert_eq!(drag.initial_drag_pos(), Point::new(-5, 29));
    }
}
