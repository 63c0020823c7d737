//! # FlexKit Style
//!
//! Style inputs for the FlexKit layout engine.
//!
//! ## Design Goals
//!
//! 1. **Semantic values**: Styles arrive already parsed; nothing here reads text
//! 2. **Explicit "not set"**: `Length::Auto` is distinct from `Length::Px(0.0)`
//! 3. **Two default profiles**: Engine defaults (`Style::default`) and CSS
//!    defaults (`Style::web`)
//! 4. **Validation**: Reject values the layout algorithm cannot honor

use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a style.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Negative value for {property}: {value}")]
    NegativeValue { property: &'static str, value: f32 },

    #[error("Non-finite value for {property}")]
    NonFinite { property: &'static str },
}

/// A length value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Percentage of the owner's inner size on the same axis.
    Percent(f32),
    /// Not set.
    #[default]
    Auto,
}

impl Length {
    /// Resolve against the owner size. `None` means undefined.
    pub fn resolve(self, owner_size: Option<f32>) -> Option<f32> {
        match self {
            Length::Px(px) => Some(px),
            Length::Percent(pct) => owner_size.map(|size| pct / 100.0 * size),
            Length::Auto => None,
        }
    }

    /// Resolve, treating undefined as zero. Used for margins, padding and borders.
    pub fn resolve_or_zero(self, owner_size: Option<f32>) -> f32 {
        self.resolve(owner_size).unwrap_or(0.0)
    }

    /// Check if this length is set.
    pub fn is_defined(self) -> bool {
        !matches!(self, Length::Auto)
    }

    fn raw(self) -> Option<f32> {
        match self {
            Length::Px(v) | Length::Percent(v) => Some(v),
            Length::Auto => None,
        }
    }
}

impl From<f32> for Length {
    fn from(px: f32) -> Self {
        Length::Px(px)
    }
}

/// Display property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Display {
    #[default]
    Flex,
    None,
}

/// Layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

impl Direction {
    /// Resolve `Inherit` against the parent's resolved direction.
    ///
    /// A parent that is itself `Inherit` (only possible at the root) resolves to LTR.
    pub fn resolve(self, parent: Direction) -> Direction {
        match self {
            Direction::Inherit => match parent {
                Direction::Rtl => Direction::Rtl,
                _ => Direction::Ltr,
            },
            resolved => resolved,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }
}

// ==================== Flexbox Types ====================

/// Flex direction property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    /// Check if this direction is reversed.
    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    /// Check if this is a row direction.
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    /// Check if this is a column direction.
    pub fn is_column(self) -> bool {
        matches!(self, FlexDirection::Column | FlexDirection::ColumnReverse)
    }
}

/// Flex wrap property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

impl FlexWrap {
    pub fn is_wrapping(self) -> bool {
        !matches!(self, FlexWrap::NoWrap)
    }
}

/// Justify content property (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items property (cross axis alignment for all items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
}

/// Align content property (multi-line cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AlignContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align self property (cross axis alignment for individual item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AlignSelf {
    #[default]
    Auto,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    Stretch,
}

impl AlignSelf {
    /// Resolve against the container's `align-items`.
    pub fn resolve(self, align_items: AlignItems) -> AlignItems {
        match self {
            AlignSelf::Auto => align_items,
            AlignSelf::FlexStart => AlignItems::FlexStart,
            AlignSelf::FlexEnd => AlignItems::FlexEnd,
            AlignSelf::Center => AlignItems::Center,
            AlignSelf::Baseline => AlignItems::Baseline,
            AlignSelf::Stretch => AlignItems::Stretch,
        }
    }
}

/// Flex basis property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FlexBasis {
    /// Use the item's main size property (width or height).
    #[default]
    Auto,
    /// Size based on content.
    Content,
    /// Explicit length.
    Length(f32),
    /// Percentage of container.
    Percent(f32),
}

impl FlexBasis {
    /// Resolve a definite basis. `Auto` and `Content` are never definite.
    pub fn resolve(self, container_main: Option<f32>) -> Option<f32> {
        match self {
            FlexBasis::Length(len) => Some(len),
            FlexBasis::Percent(pct) => container_main.map(|size| pct / 100.0 * size),
            FlexBasis::Auto | FlexBasis::Content => None,
        }
    }
}

/// Physical edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

/// Per-edge lengths for margin, padding and border.
///
/// `start` and `end` are direction-relative. When set they override the
/// physical edge they resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Edges {
    pub left: Length,
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub start: Length,
    pub end: Length,
}

impl Edges {
    /// Same length on every physical edge.
    pub fn all(length: impl Into<Length>) -> Self {
        let length = length.into();
        Self {
            left: length,
            top: length,
            right: length,
            bottom: length,
            ..Default::default()
        }
    }

    /// Left/right and top/bottom pairs.
    pub fn symmetric(horizontal: impl Into<Length>, vertical: impl Into<Length>) -> Self {
        let horizontal = horizontal.into();
        let vertical = vertical.into();
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
            ..Default::default()
        }
    }

    /// Direction-relative inline edges.
    pub fn logical(start: impl Into<Length>, end: impl Into<Length>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            ..Default::default()
        }
    }

    /// The length that applies to a physical edge under a resolved direction.
    pub fn get(&self, edge: Edge, direction: Direction) -> Length {
        let rtl = direction.is_rtl();
        let (logical, physical) = match edge {
            Edge::Left => (if rtl { self.end } else { self.start }, self.left),
            Edge::Right => (if rtl { self.start } else { self.end }, self.right),
            Edge::Top => (Length::Auto, self.top),
            Edge::Bottom => (Length::Auto, self.bottom),
        };
        if logical.is_defined() {
            logical
        } else {
            physical
        }
    }

    fn lengths(&self) -> [Length; 6] {
        [self.left, self.top, self.right, self.bottom, self.start, self.end]
    }
}

/// Style inputs of one layout node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    pub display: Display,
    pub direction: Direction,

    // Flexbox Container
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
    pub row_gap: f32,
    pub column_gap: f32,

    // Flexbox Item
    pub align_self: AlignSelf,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: FlexBasis,

    // Box model
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            display: Display::Flex,
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_content: AlignContent::FlexStart,
            row_gap: 0.0,
            column_gap: 0.0,
            align_self: AlignSelf::Auto,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: FlexBasis::Auto,
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            min_height: Length::Auto,
            max_width: Length::Auto,
            max_height: Length::Auto,
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
        }
    }
}

impl Style {
    /// Create a style with the engine defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a style with CSS defaults (row, `flex-shrink: 1`, `align-content: stretch`).
    pub fn web() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: AlignContent::Stretch,
            flex_shrink: 1.0,
            ..Self::default()
        }
    }

    /// Fixed size in pixels on both axes.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Length::Px(width);
        self.height = Length::Px(height);
        self
    }

    /// Reject values the layout algorithm cannot honor.
    pub fn validate(&self) -> Result<(), StyleError> {
        let sizes = [
            ("width", self.width),
            ("height", self.height),
            ("min-width", self.min_width),
            ("min-height", self.min_height),
            ("max-width", self.max_width),
            ("max-height", self.max_height),
        ];
        for (property, length) in sizes {
            check_non_negative(property, length.raw())?;
        }

        for length in self.padding.lengths() {
            check_non_negative("padding", length.raw())?;
        }
        for length in self.border.lengths() {
            check_non_negative("border", length.raw())?;
        }
        for length in self.margin.lengths() {
            if let Some(value) = length.raw() {
                if !value.is_finite() {
                    return Err(StyleError::NonFinite { property: "margin" });
                }
            }
        }

        let basis = match self.flex_basis {
            FlexBasis::Length(v) | FlexBasis::Percent(v) => Some(v),
            FlexBasis::Auto | FlexBasis::Content => None,
        };
        check_non_negative("flex-basis", basis)?;
        check_non_negative("flex-grow", Some(self.flex_grow))?;
        check_non_negative("flex-shrink", Some(self.flex_shrink))?;
        check_non_negative("row-gap", Some(self.row_gap))?;
        check_non_negative("column-gap", Some(self.column_gap))?;

        debug!(display = ?self.display, "Style validated");
        Ok(())
    }
}

fn check_non_negative(property: &'static str, value: Option<f32>) -> Result<(), StyleError> {
    match value {
        Some(v) if !v.is_finite() => Err(StyleError::NonFinite { property }),
        Some(v) if v < 0.0 => Err(StyleError::NegativeValue { property, value: v }),
        _ => Ok(()),
    }
}
