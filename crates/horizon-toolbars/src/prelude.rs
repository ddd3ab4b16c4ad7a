//! Prelude module for Horizon Toolbars.
//!
//! ```
//! use horizon_toolbars::prelude::*;
//! ```
//!
//! This provides access to:
//! - The window facade (`MainWindow`) and pointer input
//! - Toolbars, actions and trays
//! - Geometry types (`Point`, `Size`, `Rect`, `Margins`)

// ============================================================================
// Window and Input
// ============================================================================

pub use crate::input::{MouseButton, PointerEvent};
pub use crate::main_window::{DropMode, MainWindow};

// ============================================================================
// Toolbars and Actions
// ============================================================================

pub use crate::action::{Action, ActionId, ToolButtonStyle};
pub use crate::tool_bar::{DockState, ToolBar, ToolBarId, ToolBarOptions};
pub use crate::tray::{ToolBarTray, ToolBarTrays};

// ============================================================================
// Configuration
// ============================================================================

pub use crate::config::{DockConfig, ToolBarMetrics};

// ============================================================================
// Geometry and Signals
// ============================================================================

pub use horizon_toolbars_core::{Margins, Orientation, Point, Rect, Signal, Size};
