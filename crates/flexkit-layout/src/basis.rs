//! Flex basis and hypothetical main size of each item.

use flexkit_style::{AlignItems, Display, FlexBasis, FlexWrap, Style};
use tracing::trace;

use crate::compute::{resolve_edges, NodeBox};
use crate::line::{clamp, FlexItem};
use crate::{EdgeSizes, LayoutTree, MeasureMode, NodeId, Result};

/// Child style values resolved against the container's inner size.
struct ChildSizes {
    width: Option<f32>,
    height: Option<f32>,
    max_width: Option<f32>,
    max_height: Option<f32>,
    margin: EdgeSizes,
    padding_border_main: f32,
}

impl LayoutTree {
    /// Build the flex item for one child of `container`.
    pub(crate) fn create_flex_item(&mut self, container: &NodeBox, child: NodeId) -> Result<FlexItem> {
        let style = self.node(child)?.style.clone();
        debug_assert!(style.display != Display::None);

        let axes = container.axes;
        let owner_width = container.inner_width.size();
        let owner_height = container.inner_height.size();
        let direction = style.direction.resolve(container.direction);

        let margin = resolve_edges(&style.margin, direction, owner_width);
        let padding_border = resolve_edges(&style.padding, direction, owner_width)
            + resolve_edges(&style.border, direction, owner_width);
        let (pb_main, pb_cross) =
            axes.split(padding_border.horizontal(), padding_border.vertical());

        let sizes = ChildSizes {
            width: style.width.resolve(owner_width),
            height: style.height.resolve(owner_height),
            max_width: style.max_width.resolve(owner_width),
            max_height: style.max_height.resolve(owner_height),
            margin,
            padding_border_main: pb_main,
        };
        let (min_main, min_cross) = axes.split(
            style.min_width.resolve(owner_width),
            style.min_height.resolve(owner_height),
        );
        let (max_main, max_cross) = axes.split(sizes.max_width, sizes.max_height);
        let (_, definite_cross) = axes.split(sizes.width, sizes.height);

        let mut align = style.align_self.resolve(container.style.align_items);
        if align == AlignItems::Baseline && !container.supports_baseline() {
            align = AlignItems::FlexStart;
        }

        let flex_basis = self.compute_flex_basis(container, child, &style, &sizes, align)?;
        let min_main_size = min_main.unwrap_or(0.0).max(pb_main);
        let max_main_size = max_main.unwrap_or(f32::INFINITY);
        let hypothetical_main_size = clamp(flex_basis, min_main_size, max_main_size);

        trace!(?child, flex_basis, hypothetical_main_size, "Flex item");

        Ok(FlexItem {
            node: child,
            flex_grow: style.flex_grow,
            flex_shrink: style.flex_shrink,
            flex_basis,
            hypothetical_main_size,
            target_main_size: hypothetical_main_size,
            frozen: false,
            cross_size: 0.0,
            definite_cross_size: definite_cross,
            main_position: 0.0,
            cross_position: 0.0,
            min_main_size,
            max_main_size,
            min_cross_size: min_cross.unwrap_or(0.0).max(pb_cross),
            max_cross_size: max_cross.unwrap_or(f32::INFINITY),
            align,
            baseline: 0.0,
            margin,
            main_margin_start: margin.get(axes.main_start()),
            main_margin_end: margin.get(axes.main_end()),
            cross_margin_start: margin.get(axes.cross_start()),
            cross_margin_end: margin.get(axes.cross_end()),
        })
    }

    /// Flex basis of a child, floored at its main-axis padding + border.
    ///
    /// 1. A definite `flex-basis`.
    /// 2. A definite main size (skipped for `flex-basis: content`).
    /// 3. The child's content size from a measure-only layout.
    fn compute_flex_basis(
        &mut self,
        container: &NodeBox,
        child: NodeId,
        style: &Style,
        sizes: &ChildSizes,
        align: AlignItems,
    ) -> Result<f32> {
        let axes = container.axes;
        let owner_width = container.inner_width.size();
        let owner_height = container.inner_height.size();
        let margin = sizes.margin;
        let pb_main = sizes.padding_border_main;

        let (inner_main, _) = axes.split(owner_width, owner_height);
        if let Some(basis) = style.flex_basis.resolve(inner_main) {
            return Ok(basis.max(pb_main));
        }

        let content_basis = style.flex_basis == FlexBasis::Content;
        let (main_size, _) = axes.split(sizes.width, sizes.height);
        if let (Some(main), false) = (main_size, content_basis) {
            return Ok(main.max(pb_main));
        }

        // Measure the content
        let mut width = measure_constraint(sizes.width, margin.horizontal(), owner_width);
        let mut height = measure_constraint(sizes.height, margin.vertical(), owner_height);
        if content_basis {
            if axes.is_row() {
                width = owner_width.map_or(MeasureMode::Undefined, MeasureMode::AtMost);
            } else {
                height = owner_height.map_or(MeasureMode::Undefined, MeasureMode::AtMost);
            }
        }

        // A stretched child of a single-line container is measured at the
        // container's exact cross size
        let single_line = container.style.flex_wrap == FlexWrap::NoWrap;
        if align == AlignItems::Stretch && single_line {
            if axes.is_row() && sizes.height.is_none() {
                if let MeasureMode::Exactly(h) = container.inner_height {
                    height = MeasureMode::Exactly(h);
                }
            } else if !axes.is_row() && sizes.width.is_none() {
                if let MeasureMode::Exactly(w) = container.inner_width {
                    width = MeasureMode::Exactly(w);
                }
            }
        }

        let width = width.constrain_max(sizes.max_width.map(|max| max + margin.horizontal()));
        let height = height.constrain_max(sizes.max_height.map(|max| max + margin.vertical()));

        let size = self.layout_node(
            child,
            width,
            height,
            owner_width,
            owner_height,
            container.direction,
            false,
        )?;
        let (measured_main, _) = axes.split(size.width, size.height);
        Ok(measured_main.max(pb_main))
    }
}

/// Constraint for one axis of a child being measured for its basis.
fn measure_constraint(style_size: Option<f32>, margin: f32, owner: Option<f32>) -> MeasureMode {
    match (style_size, owner) {
        (Some(size), _) => MeasureMode::Exactly(size + margin),
        (None, Some(owner)) => MeasureMode::AtMost(owner),
        (None, None) => MeasureMode::Undefined,
    }
}
