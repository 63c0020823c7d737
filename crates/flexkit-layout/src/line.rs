//! Flex items and line formation.

use flexkit_style::{AlignItems, FlexWrap};
use tracing::trace;

use crate::{EdgeSizes, NodeId};

/// One child of a flex container, as seen by the line and flexing steps.
#[derive(Debug, Clone)]
pub struct FlexItem {
    /// The child node.
    pub node: NodeId,

    /// Flex grow factor.
    pub flex_grow: f32,

    /// Flex shrink factor.
    pub flex_shrink: f32,

    /// Resolved flex basis in pixels.
    pub flex_basis: f32,

    /// Flex basis clamped by the item's min/max.
    pub hypothetical_main_size: f32,

    /// Main size after grow/shrink.
    pub target_main_size: f32,

    /// Set once the item's main size is final.
    pub frozen: bool,

    /// Cross size (border box).
    pub cross_size: f32,

    /// Definite cross size from the item's style, if any.
    pub definite_cross_size: Option<f32>,

    /// Main position, from the container's main-start content edge.
    pub main_position: f32,

    /// Cross position, from the line's cross-start edge.
    pub cross_position: f32,

    /// Minimum main size, never below padding + border.
    pub min_main_size: f32,
    pub max_main_size: f32,
    pub min_cross_size: f32,
    pub max_cross_size: f32,

    /// Resolved `align-self`.
    pub align: AlignItems,

    /// Distance from the top border edge to the baseline.
    pub baseline: f32,

    /// Physical margins.
    pub margin: EdgeSizes,

    pub main_margin_start: f32,
    pub main_margin_end: f32,
    pub cross_margin_start: f32,
    pub cross_margin_end: f32,
}

impl FlexItem {
    /// Margin-box main size after flexing.
    pub fn outer_main_size(&self) -> f32 {
        self.target_main_size + self.main_margin_start + self.main_margin_end
    }

    /// Margin-box hypothetical main size.
    pub fn outer_hypothetical_main_size(&self) -> f32 {
        self.hypothetical_main_size + self.main_margin_start + self.main_margin_end
    }

    /// Margin-box cross size.
    pub fn outer_cross_size(&self) -> f32 {
        self.cross_size + self.cross_margin_start + self.cross_margin_end
    }

    /// Clamp a main size to this item's min/max.
    pub fn clamp_main(&self, size: f32) -> f32 {
        clamp(size, self.min_main_size, self.max_main_size)
    }

    /// Clamp a cross size to this item's min/max.
    pub fn clamp_cross(&self, size: f32) -> f32 {
        clamp(size, self.min_cross_size, self.max_cross_size)
    }
}

/// Clamp where `min` wins over `max`.
pub(crate) fn clamp(size: f32, min: f32, max: f32) -> f32 {
    size.min(max).max(min)
}

/// Items that share one run along the main axis.
#[derive(Debug, Clone, Default)]
pub struct FlexLine {
    /// Items in this line.
    pub items: Vec<FlexItem>,

    /// Extent of the line on the cross axis.
    pub cross_size: f32,

    /// Offset of the line from the cross-start content edge.
    pub cross_position: f32,

    /// Largest distance from a baseline-aligned item's cross-start margin edge
    /// to its baseline.
    pub max_ascent: f32,
}

impl FlexLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total outer hypothetical main size of the items, including gaps.
    pub fn hypothetical_main_size(&self, main_gap: f32) -> f32 {
        self.items
            .iter()
            .map(|item| item.outer_hypothetical_main_size())
            .sum::<f32>()
            + self.total_gaps(main_gap)
    }

    /// Total outer main size of the items after flexing, including gaps.
    pub fn used_main_size(&self, main_gap: f32) -> f32 {
        self.items.iter().map(|item| item.outer_main_size()).sum::<f32>() + self.total_gaps(main_gap)
    }

    pub fn total_gaps(&self, gap: f32) -> f32 {
        gap * self.items.len().saturating_sub(1) as f32
    }
}

/// Break items into lines.
///
/// A line breaks when wrapping is enabled, the available main size is known,
/// and the next item (plus a gap) would overflow a non-empty line.
pub fn collect_flex_lines(
    items: Vec<FlexItem>,
    available_main: Option<f32>,
    main_gap: f32,
    wrap: FlexWrap,
) -> Vec<FlexLine> {
    if items.is_empty() {
        return Vec::new();
    }

    let limit = match available_main {
        Some(limit) if wrap.is_wrapping() => limit,
        _ => {
            // Single line
            let mut line = FlexLine::new();
            line.items = items;
            return vec![line];
        }
    };

    let mut lines = Vec::new();
    let mut current_line = FlexLine::new();
    let mut line_main_size = 0.0f32;

    for item in items {
        let item_size = item.outer_hypothetical_main_size();
        let gap = if current_line.items.is_empty() { 0.0 } else { main_gap };

        if !current_line.items.is_empty() && line_main_size + gap + item_size > limit {
            lines.push(std::mem::take(&mut current_line));
            line_main_size = item_size;
        } else {
            line_main_size += gap + item_size;
        }
        current_line.items.push(item);
    }

    if !current_line.items.is_empty() {
        lines.push(current_line);
    }

    trace!(lines = lines.len(), limit, "Flex lines collected");
    lines
}
