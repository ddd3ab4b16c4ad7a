//! Logging facilities for Horizon Toolbars.
//!
//! Horizon Toolbars uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_toolbars::tray=debug")
//!     .init();
//! ```
//!
//! The engine logs dock/undock transitions, row creation and collapse, and
//! state restore at debug level. Violated internal invariants that were
//! converted into no-ops are logged at warn level.

/// Span names used throughout Horizon Toolbars for tracing.
pub mod span_names {
    /// Geometry pass over the whole container.
    pub const GEOMETRY_PASS: &str = "horizon_toolbars::geometry_pass";
    /// Dynamic row-break optimization for one toolbar.
    pub const DYNAMIC_LAYOUT: &str = "horizon_toolbars::dynamic_layout";
    /// State restore.
    pub const RESTORE: &str = "horizon_toolbars::restore";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "horizon_toolbars_core";
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_toolbars_core::signal";
    /// Toolbar item packing.
    pub const PACKER: &str = "horizon_toolbars::packer";
    /// Tray row management.
    pub const TRAY: &str = "horizon_toolbars::tray";
    /// Container coordination and notifications.
    pub const CONTAINER: &str = "horizon_toolbars::container";
    /// Drag, resize and dock state machine.
    pub const DRAG: &str = "horizon_toolbars::drag";
    /// State save and restore.
    pub const STATE: &str = "horizon_toolbars::state";
    /// Action customization (drag and drop of individual actions).
    pub const CUSTOMIZE: &str = "horizon_toolbars::customize";
}

/// A span guard for timing engine passes.
///
/// The span stays entered until the guard is dropped. Use the names in
/// [`span_names`].
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new span for `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_toolbars::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
