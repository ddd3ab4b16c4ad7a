//! Horizon Toolbars - docking and floating toolbars for Horizon Lattice
//! windows.
//!
//! The engine places toolbars in four trays around a central area, packs
//! their actions into rows, lets the user drag them between rows and trays
//! or float them over the window, and saves the whole arrangement into a
//! compact binary record.
//!
//! - [`ToolBarLayout`] packs a toolbar's items and finds the row breaks
//!   that fit a floating toolbar's size best
//! - [`TrayLayout`] keeps the rows of one tray
//! - [`ContainerLayout`] lays out the four trays and tracks toolbars
//! - [`DockDragController`] turns pointer input into drags, resizes, docks
//!   and undocks
//! - [`LayoutState`] is the persisted form
//!
//! [`MainWindow`] owns the toolbars and actions and is the usual entry
//! point. Pointer events go through [`MainWindow::dispatch`].
//!
//! # Example
//!
//! ```
//! use horizon_toolbars::prelude::*;
//!
//! let mut window = MainWindow::new();
//! let edit = window.create_tool_bar("Edit");
//! for name in ["cut", "copy", "paste"] {
//!     let action = window.actions_mut().insert(Action::new(name).with_object_name(name));
//!     window.add_action(edit, action);
//! }
//! window.add_tool_bar(edit);
//! window.set_geometry(Rect::new(0, 0, 800, 600));
//!
//! let tool_bar = window.tool_bar(edit).unwrap();
//! assert_eq!(tool_bar.pos(), Point::new(0, 0));
//! assert!(window.central_rect().top() >= tool_bar.geometry().bottom());
//! ```

pub mod action;
pub mod config;
pub mod container_layout;
pub mod error;
pub mod input;
pub mod main_window;
pub mod prelude;
pub mod state;
pub mod tool_bar;
pub mod tray;
pub mod tray_layout;

pub use horizon_toolbars_core::logging;
pub use horizon_toolbars_core::{
    ConnectionId, Margins, Orientation, PerfSpan, Point, Rect, Signal, Size,
};

pub use action::{Action, ActionId, ActionKind, ActionRegistry, ToolButtonStyle};
pub use config::{DockConfig, ToolBarMetrics};
pub use container_layout::ContainerLayout;
pub use error::{ConfigError, Result, StateError};
pub use input::{MouseButton, PointerEvent};
pub use main_window::{DropMode, MainWindow};
pub use state::{
    ActionState, LayoutState, STATE_VERSION, ToolBarLayoutState, ToolBarState, TrayItemState,
    TrayRowState, TrayState,
};
pub use tool_bar::{
    DockDragController, DockState, DragController, DropSite, LayoutType, ResizeMargin, ToolBar,
    ToolBarId, ToolBarLayout, ToolBarOptions,
};
pub use tray::{ToolBarTray, ToolBarTrays};
pub use tray_layout::{ToolBarAccess, TrayItem, TrayLayout, TrayRow};
