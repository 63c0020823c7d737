//! # FlexKit Bench
//!
//! Tree generators shared by the criterion benches.
//!
//! Run with: cargo bench -p flexkit-bench

use flexkit_layout::{LayoutTree, MeasureMode, NodeId, Result, Size};
use flexkit_style::{FlexDirection, FlexWrap, Length, Style};
use tracing::debug;

/// Width of one character in the synthetic text measure.
const CHAR_WIDTH: f32 = 7.0;
const LINE_HEIGHT: f32 = 16.0;

/// A wrapping row of `count` fixed-size items.
pub fn wrapping_row(tree: &mut LayoutTree, count: usize) -> Result<NodeId> {
    let mut children = Vec::with_capacity(count);
    for i in 0..count {
        let width = 20.0 + (i % 7) as f32 * 10.0;
        children.push(tree.new_node(Style::default().with_size(width, 20.0))?);
    }
    let root = tree.new_node(Style {
        flex_direction: FlexDirection::Row,
        flex_wrap: FlexWrap::Wrap,
        width: Length::Px(800.0),
        ..Style::default()
    })?;
    tree.set_children(root, &children)?;
    debug!(count, "Built wrapping row");
    Ok(root)
}

/// A chain of `depth` nested containers, alternating row and column, each
/// with a growing sibling.
pub fn nested(tree: &mut LayoutTree, depth: usize) -> Result<NodeId> {
    let mut inner = tree.new_node(Style::default().with_size(10.0, 10.0))?;
    for level in 0..depth {
        let flex_direction = if level % 2 == 0 {
            FlexDirection::Row
        } else {
            FlexDirection::Column
        };
        let sibling = tree.new_node(Style {
            flex_grow: 1.0,
            ..Style::default()
        })?;
        let node = tree.new_node(Style {
            flex_direction,
            ..Style::default()
        })?;
        tree.set_children(node, &[inner, sibling])?;
        inner = node;
    }
    debug!(depth, "Built nested tree");
    Ok(inner)
}

/// Synthetic text: `chars` characters wrapped greedily to the width limit.
pub fn text_measure(chars: usize) -> impl Fn(NodeId, MeasureMode, MeasureMode) -> Size {
    move |_: NodeId, width: MeasureMode, _: MeasureMode| {
        let natural = chars as f32 * CHAR_WIDTH;
        let line_width = width.size().map_or(natural, |w| w.min(natural)).max(CHAR_WIDTH);
        let per_line = (line_width / CHAR_WIDTH).floor().max(1.0);
        let lines = (chars as f32 / per_line).ceil().max(1.0);
        Size::new(line_width, lines * LINE_HEIGHT)
    }
}

/// A column of `count` paragraphs of synthetic text.
pub fn paragraphs(tree: &mut LayoutTree, count: usize) -> Result<NodeId> {
    let mut children = Vec::with_capacity(count);
    for i in 0..count {
        children.push(tree.new_leaf_with_measure(Style::default(), text_measure(40 + i % 200))?);
    }
    let root = tree.new_node(Style::default())?;
    tree.set_children(root, &children)?;
    Ok(root)
}
