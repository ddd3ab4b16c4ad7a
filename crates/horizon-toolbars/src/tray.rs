//! Tray identifiers.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use horizon_toolbars_core::Orientation;

// ============================================================================
// ToolBarTray
// ============================================================================

/// One of the four docking zones around the central area.
///
/// The declaration order is the persisted order of tray blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolBarTray {
    /// Above the central area.
    #[default]
    Top,
    /// Left of the central area.
    Left,
    /// Right of the central area.
    Right,
    /// Below the central area.
    Bottom,
}

impl ToolBarTray {
    /// All trays in persisted order.
    pub const ALL: [ToolBarTray; 4] = [
        ToolBarTray::Top,
        ToolBarTray::Left,
        ToolBarTray::Right,
        ToolBarTray::Bottom,
    ];

    /// Returns all trays as an iterator, in persisted order.
    pub fn all() -> impl Iterator<Item = ToolBarTray> {
        Self::ALL.into_iter()
    }

    /// Slot index of this tray inside a container.
    pub fn index(self) -> usize {
        match self {
            ToolBarTray::Top => 0,
            ToolBarTray::Left => 1,
            ToolBarTray::Right => 2,
            ToolBarTray::Bottom => 3,
        }
    }

    /// Orientation of the rows in this tray.
    pub fn orientation(self) -> Orientation {
        match self {
            ToolBarTray::Top | ToolBarTray::Bottom => Orientation::Horizontal,
            ToolBarTray::Left | ToolBarTray::Right => Orientation::Vertical,
        }
    }

    /// Whether docked positions are measured from the far edge of the
    /// window (bottom and right trays).
    pub fn is_bottom_up(self) -> bool {
        matches!(self, ToolBarTray::Bottom | ToolBarTray::Right)
    }
}

// ============================================================================
// ToolBarTrays (bitflags)
// ============================================================================

/// A set of trays represented as bit flags.
///
/// # Example
///
/// ```
/// use horizon_toolbars::{ToolBarTray, ToolBarTrays};
///
/// let trays = ToolBarTrays::TOP | ToolBarTrays::BOTTOM;
/// assert!(trays.contains(ToolBarTray::Top));
/// assert!(!trays.contains(ToolBarTray::Left));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolBarTrays(u8);

impl ToolBarTrays {
    /// No trays.
    pub const NONE: ToolBarTrays = ToolBarTrays(0);
    /// Top tray.
    pub const TOP: ToolBarTrays = ToolBarTrays(1 << 0);
    /// Left tray.
    pub const LEFT: ToolBarTrays = ToolBarTrays(1 << 1);
    /// Right tray.
    pub const RIGHT: ToolBarTrays = ToolBarTrays(1 << 2);
    /// Bottom tray.
    pub const BOTTOM: ToolBarTrays = ToolBarTrays(1 << 3);
    /// All trays.
    pub const ALL: ToolBarTrays = ToolBarTrays(0b1111);

    /// Create from a single tray.
    pub fn from_tray(tray: ToolBarTray) -> Self {
        match tray {
            ToolBarTray::Top => Self::TOP,
            ToolBarTray::Left => Self::LEFT,
            ToolBarTray::Right => Self::RIGHT,
            ToolBarTray::Bottom => Self::BOTTOM,
        }
    }

    /// Check if this set contains the specified tray.
    pub fn contains(&self, tray: ToolBarTray) -> bool {
        (self.0 & Self::from_tray(tray).0) != 0
    }

    /// Check if this set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained trays in persisted order.
    pub fn iter(&self) -> impl Iterator<Item = ToolBarTray> + '_ {
        ToolBarTray::all().filter(|&tray| self.contains(tray))
    }
}

impl Default for ToolBarTrays {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<ToolBarTray> for ToolBarTrays {
    fn from(tray: ToolBarTray) -> Self {
        Self::from_tray(tray)
    }
}

impl BitOr for ToolBarTrays {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        ToolBarTrays(self.0 | rhs.0)
    }
}

impl BitOrAssign for ToolBarTrays {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ToolBarTrays {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        ToolBarTrays(self.0 & rhs.0)
    }
}

impl BitOr for ToolBarTray {
    type Output = ToolBarTrays;

    fn bitor(self, rhs: Self) -> Self::Output {
        ToolBarTrays::from_tray(self) | ToolBarTrays::from_tray(rhs)
    }
}

impl BitOr<ToolBarTray> for ToolBarTrays {
    type Output = Self;

    fn bitor(self, rhs: ToolBarTray) -> Self::Output {
        self | Self::from_tray(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tray_bitflags() {
        let trays = ToolBarTray::Top | ToolBarTray::Left;
        assert!(trays.contains(ToolBarTray::Top));
        assert!(trays.contains(ToolBarTray::Left));
        assert!(!trays.contains(ToolBarTray::Right));
        assert!(!trays.contains(ToolBarTray::Bottom));
        assert!(!ToolBarTrays::NONE.contains(ToolBarTray::Top));
        assert!(ToolBarTrays::NONE.is_empty());
    }

    #[test]
    fn test_trays_iter_in_persisted_order() {
        let trays = ToolBarTrays::BOTTOM | ToolBarTrays::TOP | ToolBarTray::Right;
        let collected: Vec<_> = trays.iter().collect();
        assert_eq!(
            collected,
            vec![ToolBarTray::Top, ToolBarTray::Right, ToolBarTray::Bottom]
        );
    }

    #[test]
    fn test_tray_orientation() {
        assert_eq!(ToolBarTray::Top.orientation(), Orientation::Horizontal);
        assert_eq!(ToolBarTray::Bottom.orientation(), Orientation::Horizontal);
        assert_eq!(ToolBarTray::Left.orientation(), Orientation::Vertical);
        assert_eq!(ToolBarTray::Right.orientation(), Orientation::Vertical);
    }

    #[test]
    fn test_tray_index_matches_all() {
        for (i, tray) in ToolBarTray::all().enumerate() {
            assert_eq!(tray.index(), i);
        }
    }
}
