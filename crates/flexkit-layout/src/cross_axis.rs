//! Cross-axis resolution: line sizes, `align-content` and `align-self`.

use flexkit_style::{AlignContent, AlignItems};

use crate::line::FlexLine;

/// Calculate the cross size of a line from its items.
///
/// Baseline-aligned items contribute their ascent and descent separately so
/// the line can fit them all on one baseline.
pub fn calculate_line_cross_size(line: &mut FlexLine) {
    let mut max_ascent = 0.0f32;
    let mut max_descent = 0.0f32;
    let mut max_outer = 0.0f32;

    for item in &line.items {
        if item.align == AlignItems::Baseline {
            let ascent = item.baseline + item.cross_margin_start;
            let descent = item.outer_cross_size() - ascent;
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);
        } else {
            max_outer = max_outer.max(item.outer_cross_size());
        }
    }

    line.max_ascent = max_ascent;
    line.cross_size = max_outer.max(max_ascent + max_descent);
}

/// Distribute lines according to align-content.
///
/// Line positions are logical offsets from the cross-start content edge.
pub fn distribute_lines(
    lines: &mut [FlexLine],
    container_cross: f32,
    cross_gap: f32,
    align_content: AlignContent,
) {
    if lines.is_empty() {
        return;
    }

    let count = lines.len() as f32;
    let total_line_size: f32 = lines.iter().map(|l| l.cross_size).sum();
    let total_gaps = cross_gap * (lines.len() - 1) as f32;
    let free_space = container_cross - total_line_size - total_gaps;

    let (initial_offset, spacing) = match align_content {
        AlignContent::FlexStart => (0.0, 0.0),
        AlignContent::FlexEnd => (free_space, 0.0),
        AlignContent::Center => (free_space / 2.0, 0.0),
        // Negative free space falls back to flex-start
        _ if free_space <= 0.0 => (0.0, 0.0),
        AlignContent::SpaceBetween => {
            if lines.len() > 1 {
                (0.0, free_space / (count - 1.0))
            } else {
                (0.0, 0.0)
            }
        }
        AlignContent::SpaceAround => {
            let space = free_space / count;
            (space / 2.0, space)
        }
        AlignContent::SpaceEvenly => {
            let space = free_space / (count + 1.0);
            (space, space)
        }
        AlignContent::Stretch => {
            let extra_per_line = free_space / count;
            for line in lines.iter_mut() {
                line.cross_size += extra_per_line;
            }
            (0.0, 0.0)
        }
    };

    let mut cross_pos = initial_offset;
    for line in lines.iter_mut() {
        line.cross_position = cross_pos;
        cross_pos += line.cross_size + spacing + cross_gap;
    }
}

/// Align items on cross axis within line.
///
/// Stretched items without a definite cross size take the line's size minus
/// their margins, clamped by their min/max.
pub fn align_cross_axis(line: &mut FlexLine) {
    let line_cross = line.cross_size;
    let max_ascent = line.max_ascent;

    for item in &mut line.items {
        if item.align == AlignItems::Stretch && item.definite_cross_size.is_none() {
            let stretched = line_cross - item.cross_margin_start - item.cross_margin_end;
            item.cross_size = item.clamp_cross(stretched);
        }

        item.cross_position = match item.align {
            AlignItems::FlexStart | AlignItems::Stretch => item.cross_margin_start,
            AlignItems::FlexEnd => line_cross - item.cross_size - item.cross_margin_end,
            AlignItems::Center => {
                item.cross_margin_start + (line_cross - item.outer_cross_size()) / 2.0
            }
            AlignItems::Baseline => max_ascent - item.baseline,
        };
    }
}
