//! Pointer input delivered by the host window.
//!
//! All positions are in window coordinates, the same space as toolbar and
//! tray geometry.

use horizon_toolbars_core::Point;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left,
    /// Secondary button (usually right).
    Right,
    /// Middle button (scroll wheel click).
    Middle,
}

/// A pointer event routed through [`MainWindow::dispatch`](crate::MainWindow::dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// A button was pressed.
    Press { pos: Point, button: MouseButton },
    /// The pointer moved with a button held.
    Move { pos: Point },
    /// A button was released.
    Release { pos: Point, button: MouseButton },
    /// A button was double-clicked.
    DoubleClick { pos: Point, button: MouseButton },
    /// The pointer moved with no button held.
    Hover { pos: Point },
    /// The window lost pointer capture.
    CaptureLost,
}

impl PointerEvent {
    /// Pointer position, if the event carries one.
    pub fn pos(&self) -> Option<Point> {
        match *self {
            PointerEvent::Press { pos, .. }
            | PointerEvent::Move { pos }
            | PointerEvent::Release { pos, .. }
            | PointerEvent::DoubleClick { pos, .. }
            | PointerEvent::Hover { pos } => Some(pos),
            PointerEvent::CaptureLost => None,
        }
    }
}
