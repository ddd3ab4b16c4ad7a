//! Core types for Horizon Toolbars.
//!
//! This crate provides the foundation shared by the docking engine:
//!
//! - **Geometry**: integer [`Point`], [`Size`], [`Rect`] and [`Margins`]
//! - **Orientation**: primary/secondary axis mapping for trays and rows
//! - **Signals**: synchronous observer notifications
//! - **Logging**: `tracing` target and span names per subsystem
//!
//! # Example
//!
//! ```
//! use horizon_toolbars_core::{Orientation, Size};
//!
//! let size = Size::new(120, 30);
//! assert_eq!(Orientation::Horizontal.pick(size), 120);
//! assert_eq!(Orientation::Vertical.pick(size), 30);
//! ```

pub mod logging;
pub mod signal;
mod types;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use types::{Margins, Orientation, Point, Rect, Size};
