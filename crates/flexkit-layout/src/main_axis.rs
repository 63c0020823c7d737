//! Main-axis distribution: flexible lengths and `justify-content`.

use flexkit_style::JustifyContent;
use smallvec::SmallVec;
use tracing::trace;

use crate::line::FlexLine;
use crate::MeasureMode;

const EPSILON: f32 = 0.001;

/// Main space the items of a line may flex into.
///
/// An exact container size is used as-is. Otherwise the container's own
/// min/max (or an `AtMost` limit) can force a size; when nothing does, the
/// line keeps its content size and no flexing happens.
pub fn available_main_space(
    inner_main: MeasureMode,
    min_inner: Option<f32>,
    max_inner: Option<f32>,
    used: f32,
) -> Option<f32> {
    match inner_main {
        MeasureMode::Exactly(size) => Some(size),
        _ if min_inner.is_some_and(|min| used < min) => min_inner,
        _ if max_inner.is_some_and(|max| used > max) => max_inner,
        MeasureMode::AtMost(limit) if used > limit => Some(limit),
        _ => None,
    }
}

/// Resolve flexible lengths (grow/shrink) for a line.
///
/// Items that violate their min/max are clamped and frozen, and the free
/// space is redistributed among the rest until no item is clamped.
pub fn resolve_flexible_lengths(line: &mut FlexLine, available_main: Option<f32>, main_gap: f32) {
    for item in &mut line.items {
        item.frozen = false;
        item.target_main_size = item.hypothetical_main_size;
    }

    let Some(available) = available_main else {
        return;
    };
    if line.items.is_empty() {
        return;
    }

    let total_gaps = line.total_gaps(main_gap);
    let initial_free = available - line.hypothetical_main_size(main_gap);
    if initial_free.abs() < EPSILON {
        // No adjustment needed
        return;
    }
    let growing = initial_free > 0.0;

    // Inflexible items keep their hypothetical size
    for item in &mut line.items {
        let factor = if growing { item.flex_grow } else { item.flex_shrink };
        if factor <= 0.0
            || (growing && item.flex_basis > item.hypothetical_main_size)
            || (!growing && item.flex_basis < item.hypothetical_main_size)
        {
            item.frozen = true;
        }
    }

    let max_rounds = line.items.len() + 1;
    for round in 0..max_rounds {
        if line.items.iter().all(|item| item.frozen) {
            break;
        }

        let occupied: f32 = line
            .items
            .iter()
            .map(|item| {
                let margins = item.main_margin_start + item.main_margin_end;
                if item.frozen {
                    item.target_main_size + margins
                } else {
                    item.flex_basis + margins
                }
            })
            .sum();
        let remaining = available - total_gaps - occupied;

        if growing {
            grow_items(line, remaining);
        } else {
            shrink_items(line, remaining);
        }

        // Clamp and collect violations
        let mut total_violation = 0.0;
        let mut violations: SmallVec<[f32; 8]> = SmallVec::from_elem(0.0, line.items.len());
        for (item, violation) in line.items.iter_mut().zip(violations.iter_mut()) {
            if item.frozen {
                continue;
            }
            let clamped = item.clamp_main(item.target_main_size).max(0.0);
            *violation = clamped - item.target_main_size;
            total_violation += *violation;
            item.target_main_size = clamped;
        }
        trace!(round, remaining, total_violation, "Flex round");

        if total_violation.abs() < EPSILON {
            for item in &mut line.items {
                item.frozen = true;
            }
            break;
        }

        // Positive total: freeze min violators; negative: freeze max violators
        for (item, &violation) in line.items.iter_mut().zip(violations.iter()) {
            if !item.frozen && violation * total_violation > 0.0 {
                item.frozen = true;
            }
        }
    }
}

/// Grow unfrozen items into positive free space.
fn grow_items(line: &mut FlexLine, free_space: f32) {
    let total_grow: f32 = line
        .items
        .iter()
        .filter(|i| !i.frozen)
        .map(|i| i.flex_grow)
        .sum();

    // Factors summing below 1 take only their share of the space
    let denominator = total_grow.max(1.0);

    for item in line.items.iter_mut().filter(|i| !i.frozen) {
        let grow = if total_grow > 0.0 {
            free_space * item.flex_grow / denominator
        } else {
            0.0
        };
        item.target_main_size = item.flex_basis + grow;
    }
}

/// Shrink unfrozen items to remove overflow (`free_space` is negative).
fn shrink_items(line: &mut FlexLine, free_space: f32) {
    let total_shrink_scaled: f32 = line
        .items
        .iter()
        .filter(|i| !i.frozen)
        .map(|i| i.flex_shrink * i.flex_basis)
        .sum();

    for item in line.items.iter_mut().filter(|i| !i.frozen) {
        let shrink = if total_shrink_scaled > 0.0 {
            free_space * (item.flex_shrink * item.flex_basis) / total_shrink_scaled
        } else {
            0.0
        };
        item.target_main_size = item.flex_basis + shrink;
    }
}

/// Distribute items along main axis (justify-content).
///
/// Positions are logical: offsets from the main-start content edge to each
/// item's border box, in source order.
pub fn distribute_main_axis(
    line: &mut FlexLine,
    container_main: f32,
    main_gap: f32,
    justify_content: JustifyContent,
) {
    if line.items.is_empty() {
        return;
    }

    let count = line.items.len() as f32;
    let free_space = container_main - line.used_main_size(main_gap);

    let (initial_offset, spacing) = match justify_content {
        JustifyContent::FlexStart => (0.0, 0.0),
        JustifyContent::FlexEnd => (free_space, 0.0),
        JustifyContent::Center => (free_space / 2.0, 0.0),
        // Negative free space falls back to flex-start
        _ if free_space <= 0.0 => (0.0, 0.0),
        JustifyContent::SpaceBetween => {
            if line.items.len() > 1 {
                (0.0, free_space / (count - 1.0))
            } else {
                (0.0, 0.0)
            }
        }
        JustifyContent::SpaceAround => {
            let space = free_space / count;
            (space / 2.0, space)
        }
        JustifyContent::SpaceEvenly => {
            let space = free_space / (count + 1.0);
            (space, space)
        }
    };

    let mut main_pos = initial_offset;
    for item in &mut line.items {
        item.main_position = main_pos + item.main_margin_start;
        main_pos += item.outer_main_size() + spacing + main_gap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::tests::item;
    use crate::line::FlexItem;

    fn line_of(items: Vec<FlexItem>) -> FlexLine {
        FlexLine {
            items,
            ..FlexLine::default()
        }
    }

    fn targets(line: &FlexLine) -> Vec<f32> {
        line.items.iter().map(|i| i.target_main_size).collect()
    }

    fn growing(basis: f32, grow: f32) -> FlexItem {
        let mut item = item(basis);
        item.flex_grow = grow;
        item
    }

    fn shrinking(basis: f32, shrink: f32) -> FlexItem {
        let mut item = item(basis);
        item.flex_shrink = shrink;
        item
    }

    #[test]
    fn test_flex_grow_equal_share() {
        let mut line = line_of(vec![growing(0.0, 1.0), growing(0.0, 1.0)]);
        resolve_flexible_lengths(&mut line, Some(400.0), 0.0);
        assert_eq!(targets(&line), vec![200.0, 200.0]);
    }

    #[test]
    fn test_flex_grow_fractional_sum() {
        let mut line = line_of(vec![growing(0.0, 0.25), growing(0.0, 0.25)]);
        resolve_flexible_lengths(&mut line, Some(100.0), 0.0);
        assert_eq!(targets(&line), vec![25.0, 25.0]);
    }

    #[test]
    fn test_zero_grow_sum_does_not_distribute() {
        let mut line = line_of(vec![item(10.0), item(20.0)]);
        resolve_flexible_lengths(&mut line, Some(100.0), 0.0);
        assert_eq!(targets(&line), vec![10.0, 20.0]);
    }

    #[test]
    fn test_flex_shrink_scaled_by_basis() {
        let mut line = line_of(vec![shrinking(100.0, 1.0), shrinking(200.0, 1.0)]);
        resolve_flexible_lengths(&mut line, Some(150.0), 0.0);
        assert_eq!(targets(&line), vec![50.0, 100.0]);
    }

    #[test]
    fn test_zero_shrink_never_shrinks() {
        let mut line = line_of(vec![shrinking(100.0, 0.0), shrinking(100.0, 1.0)]);
        resolve_flexible_lengths(&mut line, Some(150.0), 0.0);
        assert_eq!(targets(&line), vec![100.0, 50.0]);
    }

    #[test]
    fn test_shrink_respects_min_and_redistributes() {
        let mut a = shrinking(100.0, 1.0);
        a.min_main_size = 90.0;
        let mut line = line_of(vec![a, shrinking(100.0, 1.0)]);
        resolve_flexible_lengths(&mut line, Some(150.0), 0.0);
        assert_eq!(targets(&line), vec![90.0, 60.0]);
    }

    #[test]
    fn test_violations_resolve_over_multiple_rounds() {
        let mut a = growing(0.0, 1.0);
        a.max_main_size = 60.0;
        let mut b = growing(0.0, 1.0);
        b.min_main_size = 150.0;
        b.hypothetical_main_size = 150.0;
        let c = growing(0.0, 1.0);

        let mut line = line_of(vec![a, b, c]);
        resolve_flexible_lengths(&mut line, Some(300.0), 0.0);
        assert_eq!(targets(&line), vec![60.0, 150.0, 90.0]);
        assert!(line.items.iter().all(|i| i.frozen));
    }

    #[test]
    fn test_undefined_space_keeps_hypothetical_sizes() {
        let mut line = line_of(vec![growing(10.0, 1.0), shrinking(20.0, 1.0)]);
        resolve_flexible_lengths(&mut line, None, 0.0);
        assert_eq!(targets(&line), vec![10.0, 20.0]);
    }

    #[test]
    fn test_gaps_reduce_free_space() {
        let mut line = line_of(vec![growing(0.0, 1.0), growing(0.0, 1.0)]);
        resolve_flexible_lengths(&mut line, Some(110.0), 10.0);
        assert_eq!(targets(&line), vec![50.0, 50.0]);
    }

    #[test]
    fn test_available_main_space() {
        assert_eq!(
            available_main_space(MeasureMode::Exactly(100.0), None, None, 300.0),
            Some(100.0)
        );
        assert_eq!(
            available_main_space(MeasureMode::Undefined, Some(50.0), None, 30.0),
            Some(50.0)
        );
        assert_eq!(
            available_main_space(MeasureMode::Undefined, None, Some(50.0), 80.0),
            Some(50.0)
        );
        assert_eq!(
            available_main_space(MeasureMode::AtMost(60.0), None, None, 80.0),
            Some(60.0)
        );
        assert_eq!(available_main_space(MeasureMode::AtMost(60.0), None, None, 40.0), None);
        assert_eq!(available_main_space(MeasureMode::Undefined, None, None, 40.0), None);
    }

    fn positions(line: &FlexLine) -> Vec<f32> {
        line.items.iter().map(|i| i.main_position).collect()
    }

    #[test]
    fn test_justify_content_center() {
        let mut line = line_of(vec![item(100.0)]);
        distribute_main_axis(&mut line, 400.0, 0.0, JustifyContent::Center);
        assert_eq!(positions(&line), vec![150.0]);
    }

    #[test]
    fn test_justify_content_space_variants() {
        let mut line = line_of(vec![item(20.0), item(20.0), item(20.0)]);
        distribute_main_axis(&mut line, 120.0, 0.0, JustifyContent::SpaceBetween);
        assert_eq!(positions(&line), vec![0.0, 50.0, 100.0]);

        distribute_main_axis(&mut line, 120.0, 0.0, JustifyContent::SpaceAround);
        assert_eq!(positions(&line), vec![10.0, 50.0, 90.0]);

        distribute_main_axis(&mut line, 140.0, 0.0, JustifyContent::SpaceEvenly);
        assert_eq!(positions(&line), vec![20.0, 60.0, 100.0]);
    }

    #[test]
    fn test_justify_negative_free_space() {
        let mut line = line_of(vec![item(60.0), item(60.0)]);
        distribute_main_axis(&mut line, 100.0, 0.0, JustifyContent::SpaceAround);
        assert_eq!(positions(&line), vec![0.0, 60.0]);

        distribute_main_axis(&mut line, 100.0, 0.0, JustifyContent::FlexEnd);
        assert_eq!(positions(&line), vec![-20.0, 40.0]);

        distribute_main_axis(&mut line, 100.0, 0.0, JustifyContent::Center);
        assert_eq!(positions(&line), vec![-10.0, 50.0]);
    }

    #[test]
    fn test_main_positions_include_margins_and_gaps() {
        let mut first = item(10.0);
        first.main_margin_start = 5.0;
        first.main_margin_end = 5.0;
        let mut line = line_of(vec![first, item(10.0)]);
        distribute_main_axis(&mut line, 100.0, 3.0, JustifyContent::FlexStart);
        assert_eq!(positions(&line), vec![5.0, 23.0]);
    }
}
