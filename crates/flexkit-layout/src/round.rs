//! Pixel-grid rounding of computed layouts.
//!
//! Edges are rounded in absolute coordinates and sizes are derived from the
//! rounded edges, so adjacent boxes never overlap or leave gaps after
//! snapping. Measured leaves round outward so their content is never clipped.

use crate::{EdgeSizes, Layout, LayoutTree, NodeId, Result};

const ROUNDING_EPSILON: f64 = 0.0001;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < ROUNDING_EPSILON
}

/// Snap `value` to a `1 / scale` grid.
///
/// `force_ceil` and `force_floor` override round-half-up for values that
/// are not already on the grid.
pub fn round_value_to_pixel_grid(value: f32, scale: f32, force_ceil: bool, force_floor: bool) -> f32 {
    let scale = f64::from(scale);
    let mut scaled = f64::from(value) * scale;
    let mut fraction = scaled % 1.0;
    if fraction < 0.0 {
        fraction += 1.0;
    }

    if approx_eq(fraction, 0.0) {
        scaled -= fraction;
    } else if approx_eq(fraction, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        let round_up = fraction > 0.5 || approx_eq(fraction, 0.5);
        scaled = scaled - fraction + if round_up { 1.0 } else { 0.0 };
    }

    (scaled / scale) as f32
}

fn has_fraction(value: f32, scale: f32) -> bool {
    let fraction = (f64::from(value) * f64::from(scale)) % 1.0;
    !approx_eq(fraction, 0.0) && !approx_eq(fraction, 1.0)
}

fn round_edges(edges: EdgeSizes, scale: f32) -> EdgeSizes {
    EdgeSizes {
        top: round_value_to_pixel_grid(edges.top, scale, false, false),
        right: round_value_to_pixel_grid(edges.right, scale, false, false),
        bottom: round_value_to_pixel_grid(edges.bottom, scale, false, false),
        left: round_value_to_pixel_grid(edges.left, scale, false, false),
    }
}

/// Write the rounded layout of every node under `root` from its unrounded
/// layout.
pub(crate) fn round_layout(tree: &mut LayoutTree, root: NodeId) -> Result<()> {
    let scale = tree.config.point_scale_factor;
    round_node(tree, root, scale, 0.0, 0.0)
}

fn round_node(tree: &mut LayoutTree, node: NodeId, scale: f32, absolute_left: f32, absolute_top: f32) -> Result<()> {
    let data = tree.node_mut(node)?;
    let unrounded = data.unrounded;

    let absolute_left = absolute_left + unrounded.x;
    let absolute_top = absolute_top + unrounded.y;

    data.layout = if scale > 0.0 {
        let text = data.measure.is_some();
        let absolute_right = absolute_left + unrounded.width;
        let absolute_bottom = absolute_top + unrounded.height;
        let fractional_width = has_fraction(unrounded.width, scale);
        let fractional_height = has_fraction(unrounded.height, scale);

        Layout {
            x: round_value_to_pixel_grid(unrounded.x, scale, false, text),
            y: round_value_to_pixel_grid(unrounded.y, scale, false, text),
            width: round_value_to_pixel_grid(
                absolute_right,
                scale,
                text && fractional_width,
                text && !fractional_width,
            ) - round_value_to_pixel_grid(absolute_left, scale, false, text),
            height: round_value_to_pixel_grid(
                absolute_bottom,
                scale,
                text && fractional_height,
                text && !fractional_height,
            ) - round_value_to_pixel_grid(absolute_top, scale, false, text),
            direction: unrounded.direction,
            margin: round_edges(unrounded.margin, scale),
            border: round_edges(unrounded.border, scale),
            padding: round_edges(unrounded.padding, scale),
        }
    } else {
        unrounded
    };

    let children = data.children.clone();
    let content_left = absolute_left + unrounded.border.left + unrounded.padding.left;
    let content_top = absolute_top + unrounded.border.top + unrounded.padding.top;
    for child in children {
        round_node(tree, child, scale, content_left, content_top)?;
    }
    Ok(())
}
