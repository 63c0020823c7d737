//! # FlexKit Layout
//!
//! Flexbox layout engine for trees of abstract layout nodes.
//!
//! ## Design Goals
//!
//! 1. **Arena tree**: Nodes live in a `SlotMap` and are addressed by `NodeId`
//! 2. **Two-pass recursion**: Constraints flow down, intrinsic sizes flow up
//! 3. **Bidirectional**: LTR and RTL resolve through one axis resolver
//! 4. **Incremental**: Dirty tracking plus a per-node constraint cache
//!
//! ## Example
//!
//! ```
//! use flexkit_layout::{LayoutTree, Direction};
//! use flexkit_style::{FlexDirection, Style};
//!
//! let mut tree = LayoutTree::new();
//! let child = tree.new_node(Style::default().with_size(30.0, 30.0)).unwrap();
//! let root = tree.new_node(Style {
//!     flex_direction: FlexDirection::Row,
//!     ..Style::default()
//! }).unwrap();
//! tree.add_child(root, child).unwrap();
//! tree.compute_layout(root, Some(100.0), Some(100.0), Direction::Ltr).unwrap();
//! assert_eq!(tree.layout(child).unwrap().width, 30.0);
//! ```

pub mod axis;
pub mod basis;
pub mod cache;
pub mod compute;
pub mod cross_axis;
pub mod line;
pub mod main_axis;
pub mod measure;
pub mod round;
pub mod tree;

pub use flexkit_style::{Direction, Style};
pub use measure::{Baseline, Measure, MeasureMode};
pub use tree::{LayoutTree, NodeId};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can occur in layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Device pixels per layout unit. Results snap to a `1 / point_scale_factor`
    /// grid; `0.0` disables rounding.
    pub point_scale_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Configuration that keeps fractional results.
    pub fn unrounded() -> Self {
        Self {
            point_scale_factor: 0.0,
        }
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// A 2D rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Edge sizes (margin, padding, border).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn get(&self, edge: flexkit_style::Edge) -> f32 {
        use flexkit_style::Edge;
        match edge {
            Edge::Left => self.left,
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }
}

impl std::ops::Add for EdgeSizes {
    type Output = EdgeSizes;

    fn add(self, other: EdgeSizes) -> EdgeSizes {
        EdgeSizes {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}

/// Computed layout of one node.
///
/// `x`/`y` are relative to the parent's content box; `width`/`height` are
/// the border-box size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Layout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Resolved layout direction.
    pub direction: Direction,
    pub margin: EdgeSizes,
    pub border: EdgeSizes,
    pub padding: EdgeSizes,
}

impl Layout {
    /// The border box, relative to the parent's content box.
    pub fn border_box(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Get the padding box (border box minus border).
    pub fn padding_box(&self) -> Rect {
        let bb = self.border_box();
        Rect {
            x: bb.x + self.border.left,
            y: bb.y + self.border.top,
            width: (bb.width - self.border.horizontal()).max(0.0),
            height: (bb.height - self.border.vertical()).max(0.0),
        }
    }

    /// Get the content box (padding box minus padding).
    pub fn content_box(&self) -> Rect {
        let pb = self.padding_box();
        Rect {
            x: pb.x + self.padding.left,
            y: pb.y + self.padding.top,
            width: (pb.width - self.padding.horizontal()).max(0.0),
            height: (pb.height - self.padding.vertical()).max(0.0),
        }
    }

    /// Get the margin box (border box plus margin).
    pub fn margin_box(&self) -> Rect {
        let bb = self.border_box();
        Rect {
            x: bb.x - self.margin.left,
            y: bb.y - self.margin.top,
            width: bb.width + self.margin.horizontal(),
            height: bb.height + self.margin.vertical(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
