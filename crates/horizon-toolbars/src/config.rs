//! Configuration for the docking engine.
//!
//! The engine never queries a style system directly. Every metric it needs
//! (icon extent, separator thickness, handle thickness, title font height and
//! so on) comes from a [`DockConfig`], which can be built in code or loaded
//! from TOML.
//!
//! # Example
//!
//! ```
//! use horizon_toolbars::DockConfig;
//!
//! let config = DockConfig::from_toml_str(r#"
//!     dock_margin = 12
//!
//!     [metrics]
//!     icon_extent = 32
//!     spacing = 4
//! "#).unwrap();
//!
//! assert_eq!(config.dock_margin, 12);
//! assert_eq!(config.metrics.icon_extent, 32);
//! // unspecified values keep their defaults
//! assert_eq!(config.metrics.handle_extent, 10);
//! ```

use std::path::Path;

use horizon_toolbars_core::{Margins, Size};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Size metrics for toolbars and their items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolBarMetrics {
    /// Default square icon extent for tool buttons.
    pub icon_extent: i32,
    /// Extra width and height a tool button adds around its contents.
    pub tool_button_margin: i32,
    /// Spacing between icon and label inside a tool button.
    pub tool_button_label_spacing: i32,
    /// Thickness of a separator.
    pub separator_extent: i32,
    /// Thickness of the drag handle of a docked toolbar.
    pub handle_extent: i32,
    /// Line height of the floating title font.
    pub title_font_height: i32,
    /// Margin above and below the title text.
    pub title_margin: i32,
    /// Margin above and below the close button in the title bar.
    pub title_button_margin: i32,
    /// Icon extent of the title bar close button.
    pub close_icon_extent: i32,
    /// Width of the toolbar frame on each side.
    pub frame_width: i32,
    /// Margin between the toolbar frame and its items on each side.
    pub contents_margin: i32,
    /// Spacing between items and between item rows.
    pub spacing: i32,
    /// Number of columns used by the fixed-column layout.
    pub columns: i32,
}

impl Default for ToolBarMetrics {
    fn default() -> Self {
        Self {
            icon_extent: 24,
            tool_button_margin: 4,
            tool_button_label_spacing: 4,
            separator_extent: 6,
            handle_extent: 10,
            title_font_height: 14,
            title_margin: 3,
            title_button_margin: 2,
            close_icon_extent: 16,
            frame_width: 1,
            contents_margin: 4,
            spacing: 2,
            columns: 4,
        }
    }
}

impl ToolBarMetrics {
    /// Default icon size derived from [`icon_extent`](Self::icon_extent).
    pub fn icon_size(&self) -> Size {
        Size::new(self.icon_extent, self.icon_extent)
    }

    /// Size of the title bar close button.
    pub fn close_button_size(&self) -> Size {
        Size::new(
            self.close_icon_extent + self.tool_button_margin,
            self.close_icon_extent + self.tool_button_margin,
        )
    }

    /// Margins occupied by the toolbar frame.
    pub fn frame_margins(&self) -> Margins {
        Margins::uniform(self.frame_width)
    }

    /// Margins between the frame and the item area.
    pub fn contents_margins(&self) -> Margins {
        Margins::uniform(self.contents_margin)
    }

    /// Height of the floating title bar.
    pub fn title_height(&self) -> i32 {
        (self.close_button_size().height + 2 * self.title_button_margin)
            .max(self.title_font_height + 2 * self.title_margin)
    }
}

/// Engine-wide docking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Distance a dragged docked toolbar's cursor may leave its tray along
    /// the tray's primary axis before the toolbar undocks.
    pub dock_margin: i32,
    /// Dockable depth of a tray that has no rows.
    pub empty_tray_extent: i32,
    /// Width of the grab band along a floating toolbar's edges.
    pub resize_margin: i32,
    /// Inset of the drop indicator from the row edges.
    pub drop_indicator_margin: i32,
    /// Thickness of the drop indicator.
    pub drop_indicator_width: i32,
    /// Margins around the whole container.
    pub container_margins: Margins,
    /// Toolbar and item metrics.
    pub metrics: ToolBarMetrics,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            dock_margin: 8,
            empty_tray_extent: 4,
            resize_margin: 4,
            drop_indicator_margin: 4,
            drop_indicator_width: 2,
            container_margins: Margins::ZERO,
            metrics: ToolBarMetrics::default(),
        }
    }
}

impl DockConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: DockConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(
            target: horizon_toolbars_core::logging::targets::CORE,
            path = %path.display(),
            "loaded dock configuration"
        );
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        // every field is a plain integer table, serialization cannot fail
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Check that all values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("dock_margin", self.dock_margin),
            ("empty_tray_extent", self.empty_tray_extent),
            ("resize_margin", self.resize_margin),
            ("drop_indicator_margin", self.drop_indicator_margin),
            ("drop_indicator_width", self.drop_indicator_width),
            ("metrics.tool_button_margin", self.metrics.tool_button_margin),
            ("metrics.separator_extent", self.metrics.separator_extent),
            ("metrics.handle_extent", self.metrics.handle_extent),
            ("metrics.frame_width", self.metrics.frame_width),
            ("metrics.contents_margin", self.metrics.contents_margin),
            ("metrics.spacing", self.metrics.spacing),
        ];
        for (field, value) in non_negative {
            if value < 0 {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("must not be negative, got {value}"),
                ));
            }
        }
        if self.metrics.icon_extent <= 0 {
            return Err(ConfigError::invalid_value(
                "metrics.icon_extent",
                "must be positive",
            ));
        }
        if self.metrics.columns <= 0 {
            return Err(ConfigError::invalid_value(
                "metrics.columns",
                "must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_title_height() {
        let metrics = ToolBarMetrics::default();
        // close button 16 + 4, plus 2 * 2 around it; font 14 + 2 * 3
        assert_eq!(metrics.title_height(), 24);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DockConfig::from_toml_str("resize_margin = 6").unwrap();
        assert_eq!(config.resize_margin, 6);
        assert_eq!(config.dock_margin, 8);
        assert_eq!(config.metrics, ToolBarMetrics::default());
    }

    #[test]
    fn test_rejects_negative_values() {
        let err = DockConfig::from_toml_str("[metrics]\nspacing = -1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "metrics.spacing",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "empty_tray_extent = 10").unwrap();
        writeln!(file, "[container_margins]").unwrap();
        writeln!(file, "left = 1\ntop = 2\nright = 3\nbottom = 4").unwrap();

        let config = DockConfig::load(file.path()).unwrap();
        assert_eq!(config.empty_tray_extent, 10);
        assert_eq!(config.container_margins, Margins::new(1, 2, 3, 4));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DockConfig::load("/nonexistent/dock.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DockConfig::default();
        config.metrics.columns = 3;
        let text = config.to_toml_string();
        assert_eq!(DockConfig::from_toml_str(&text).unwrap(), config);
    }
}
