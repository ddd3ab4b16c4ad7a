//! Integer geometry types used by the docking engine.
//!
//! All toolbar, tray and container geometry lives in a single integer
//! coordinate space (the host window's client area). Sizes persisted by the
//! state codec are 32-bit integers, so the geometry is integral throughout.
//!
//! [`Orientation`] carries the axis mapping shared by trays and toolbar
//! layouts: the *primary* axis runs along a row, the *secondary* axis runs
//! across rows. [`Orientation::pick`] and [`Orientation::perp`] read those
//! components from points and sizes.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

// ============================================================================
// Size
// ============================================================================

/// A size in 2D space (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Component-wise maximum of two sizes.
    #[inline]
    pub fn expanded_to(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum of two sizes.
    #[inline]
    pub fn bounded_to(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Grow the size by the given margins.
    #[inline]
    pub fn grown_by(self, margins: Margins) -> Size {
        Size::new(
            self.width + margins.horizontal(),
            self.height + margins.vertical(),
        )
    }

    /// Shrink the size by the given margins.
    #[inline]
    pub fn shrunk_by(self, margins: Margins) -> Size {
        Size::new(
            self.width - margins.horizontal(),
            self.height - margins.vertical(),
        )
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self { width, height }
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.width + rhs.width, self.height + rhs.height)
    }
}

// ============================================================================
// Margins
// ============================================================================

/// Margins around the four sides of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    /// Create margins from explicit values.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create uniform margins.
    #[inline]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// No margins.
    pub const ZERO: Self = Self::uniform(0);

    /// Total horizontal margin (left + right).
    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Total vertical margin (top + bottom).
    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Offset of the contents' top-left corner.
    #[inline]
    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

impl Add for Margins {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by origin and size.
///
/// The right and bottom edges are exclusive: a rectangle at x = 0 with a
/// width of 10 contains x = 9 but not x = 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size components.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Create a rectangle from a top-left point and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    pub fn left(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.origin.y
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// Top-left corner.
    #[inline]
    pub fn top_left(&self) -> Point {
        self.origin
    }

    /// Center point of the rectangle, rounded toward the origin.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2,
            self.origin.y + self.size.height / 2,
        )
    }

    /// Check if the rectangle is empty (zero or negative size).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Offset the rectangle by the given vector.
    #[inline]
    pub fn translated(&self, offset: Point) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }

    /// Move the rectangle so its top-left corner is at `origin`.
    #[inline]
    pub fn moved_to(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }

    /// Remove margins from the rectangle's edges.
    #[inline]
    pub fn margins_removed(&self, margins: Margins) -> Rect {
        Rect::new(
            self.origin.x + margins.left,
            self.origin.y + margins.top,
            self.size.width - margins.horizontal(),
            self.size.height - margins.vertical(),
        )
    }

    /// Add margins around the rectangle's edges.
    #[inline]
    pub fn margins_added(&self, margins: Margins) -> Rect {
        Rect::new(
            self.origin.x - margins.left,
            self.origin.y - margins.top,
            self.size.width + margins.horizontal(),
            self.size.height + margins.vertical(),
        )
    }
}

// ============================================================================
// Orientation
// ============================================================================

/// Layout orientation.
///
/// For a tray this is the direction its rows run in: top and bottom trays
/// are horizontal, left and right trays are vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other orientation.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Primary-axis component of a size.
    #[inline]
    pub fn pick(self, size: Size) -> i32 {
        match self {
            Orientation::Horizontal => size.width,
            Orientation::Vertical => size.height,
        }
    }

    /// Secondary-axis component of a size.
    #[inline]
    pub fn perp(self, size: Size) -> i32 {
        self.flipped().pick(size)
    }

    /// Primary-axis coordinate of a point.
    #[inline]
    pub fn pick_point(self, point: Point) -> i32 {
        match self {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    /// Secondary-axis coordinate of a point.
    #[inline]
    pub fn perp_point(self, point: Point) -> i32 {
        self.flipped().pick_point(point)
    }

    /// Build a size from primary and secondary components.
    #[inline]
    pub fn make_size(self, primary: i32, secondary: i32) -> Size {
        match self {
            Orientation::Horizontal => Size::new(primary, secondary),
            Orientation::Vertical => Size::new(secondary, primary),
        }
    }

    /// Build a point from primary and secondary coordinates.
    #[inline]
    pub fn make_point(self, primary: i32, secondary: i32) -> Point {
        match self {
            Orientation::Horizontal => Point::new(primary, secondary),
            Orientation::Vertical => Point::new(secondary, primary),
        }
    }
}

static_assertions::assert_impl_all!(Point: Send, Sync, Copy);
static_assertions::assert_impl_all!(Size: Send, Sync, Copy);
static_assertions::assert_impl_all!(Margins: Send, Sync, Copy);
static_assertions::assert_impl_all!(Rect: Send, Sync, Copy);
static_assertions::assert_impl_all!(Orientation: Send, Sync, Copy);
