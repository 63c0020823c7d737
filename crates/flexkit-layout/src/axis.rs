//! Axis resolution.
//!
//! Maps a flex direction and a layout direction onto physical edges. Every
//! other stage works in logical main/cross offsets and asks this module where
//! "start" is.

use flexkit_style::{Direction, Edge, FlexDirection, FlexWrap};

/// Resolve a flex direction under a layout direction.
///
/// RTL mirrors any horizontal direction; vertical directions are untouched.
pub fn resolve_flex_direction(flex_direction: FlexDirection, direction: Direction) -> FlexDirection {
    if !direction.is_rtl() {
        return flex_direction;
    }
    match flex_direction {
        FlexDirection::Row => FlexDirection::RowReverse,
        FlexDirection::RowReverse => FlexDirection::Row,
        column => column,
    }
}

/// The cross direction for a resolved main direction.
pub fn cross_flex_direction(main: FlexDirection, direction: Direction) -> FlexDirection {
    if main.is_column() {
        resolve_flex_direction(FlexDirection::Row, direction)
    } else {
        FlexDirection::Column
    }
}

/// The physical edge where a direction starts.
pub fn leading_edge(flex_direction: FlexDirection) -> Edge {
    match flex_direction {
        FlexDirection::Row => Edge::Left,
        FlexDirection::RowReverse => Edge::Right,
        FlexDirection::Column => Edge::Top,
        FlexDirection::ColumnReverse => Edge::Bottom,
    }
}

/// The physical edge where a direction ends.
pub fn trailing_edge(flex_direction: FlexDirection) -> Edge {
    match flex_direction {
        FlexDirection::Row => Edge::Right,
        FlexDirection::RowReverse => Edge::Left,
        FlexDirection::Column => Edge::Bottom,
        FlexDirection::ColumnReverse => Edge::Top,
    }
}

/// Resolved axes of one flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexAxes {
    /// Main direction after RTL mirroring.
    pub main: FlexDirection,
    /// Cross direction after RTL mirroring and `wrap-reverse`.
    pub cross: FlexDirection,
}

impl FlexAxes {
    pub fn new(flex_direction: FlexDirection, wrap: FlexWrap, direction: Direction) -> Self {
        let main = resolve_flex_direction(flex_direction, direction);
        let mut cross = cross_flex_direction(main, direction);
        if wrap == FlexWrap::WrapReverse {
            cross = reverse(cross);
        }
        Self { main, cross }
    }

    pub fn is_row(&self) -> bool {
        self.main.is_row()
    }

    pub fn main_start(&self) -> Edge {
        leading_edge(self.main)
    }

    pub fn main_end(&self) -> Edge {
        trailing_edge(self.main)
    }

    pub fn cross_start(&self) -> Edge {
        leading_edge(self.cross)
    }

    pub fn cross_end(&self) -> Edge {
        trailing_edge(self.cross)
    }

    /// Map a logical offset from main-start to a physical offset from the
    /// left/top content edge.
    pub fn main_to_physical(&self, offset: f32, size: f32, container: f32) -> f32 {
        flip(self.main.is_reverse(), offset, size, container)
    }

    /// Map a logical offset from cross-start to a physical offset.
    pub fn cross_to_physical(&self, offset: f32, size: f32, container: f32) -> f32 {
        flip(self.cross.is_reverse(), offset, size, container)
    }

    /// Pick (main, cross) out of a physical (width, height) pair.
    pub fn split<T>(&self, width: T, height: T) -> (T, T) {
        if self.is_row() {
            (width, height)
        } else {
            (height, width)
        }
    }

    /// Build a physical (width, height) pair from (main, cross).
    pub fn join<T>(&self, main: T, cross: T) -> (T, T) {
        if self.is_row() {
            (main, cross)
        } else {
            (cross, main)
        }
    }
}

fn reverse(flex_direction: FlexDirection) -> FlexDirection {
    match flex_direction {
        FlexDirection::Row => FlexDirection::RowReverse,
        FlexDirection::RowReverse => FlexDirection::Row,
        FlexDirection::Column => FlexDirection::ColumnReverse,
        FlexDirection::ColumnReverse => FlexDirection::Column,
    }
}

fn flip(reversed: bool, offset: f32, size: f32, container: f32) -> f32 {
    if reversed {
        container - offset - size
    } else {
        offset
    }
}
