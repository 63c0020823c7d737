//! Layout driver.
//!
//! The flexbox algorithm runs per container in these steps:
//! 1. Resolve the box model and the axes
//! 2. Calculate flex base sizes (measuring content where needed)
//! 3. Collect items into flex lines
//! 4. Resolve flexible lengths (grow/shrink)
//! 5. Measure cross sizes at the resolved main sizes
//! 6. Size lines and the container
//! 7. Multi-line alignment (align-content)
//! 8. Main axis alignment (justify-content)
//! 9. Cross axis alignment (align-items, align-self)
//! 10. Lay out children at their final sizes and map positions to physical
//!     coordinates
//!
//! Every call is either a measure-only pass, which returns a size and writes
//! nothing, or a full layout, which also writes the node's layout and lays
//! out its subtree.

use flexkit_style::{AlignItems, Direction, Display, Edge, Edges, FlexWrap, Length, Style};
use tracing::{debug, trace};

use crate::axis::FlexAxes;
use crate::cache::CacheKey;
use crate::cross_axis::{align_cross_axis, calculate_line_cross_size, distribute_lines};
use crate::line::{collect_flex_lines, FlexItem};
use crate::main_axis::{available_main_space, distribute_main_axis, resolve_flexible_lengths};
use crate::measure::{sanitize, sanitize_size};
use crate::round::round_layout;
use crate::tree::ChildList;
use crate::{EdgeSizes, Layout, LayoutError, LayoutTree, MeasureMode, NodeId, Result, Size};

/// Resolve per-edge lengths to pixels. Percentages resolve against the
/// owner's width on every edge.
pub(crate) fn resolve_edges(edges: &Edges, direction: Direction, owner_width: Option<f32>) -> EdgeSizes {
    EdgeSizes {
        top: edges.get(Edge::Top, direction).resolve_or_zero(owner_width),
        right: edges.get(Edge::Right, direction).resolve_or_zero(owner_width),
        bottom: edges.get(Edge::Bottom, direction).resolve_or_zero(owner_width),
        left: edges.get(Edge::Left, direction).resolve_or_zero(owner_width),
    }
}

fn clamp_option(size: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let size = max.map_or(size, |max| size.min(max));
    min.map_or(size, |min| size.max(min))
}

/// Box model of a node under one set of constraints.
pub(crate) struct NodeBox {
    pub(crate) style: Style,
    pub(crate) direction: Direction,
    pub(crate) axes: FlexAxes,
    pub(crate) margin: EdgeSizes,
    pub(crate) padding: EdgeSizes,
    pub(crate) border: EdgeSizes,
    /// Border-box limits.
    pub(crate) min_width: Option<f32>,
    pub(crate) max_width: Option<f32>,
    pub(crate) min_height: Option<f32>,
    pub(crate) max_height: Option<f32>,
    /// Content-box constraints, clamped by the node's own min/max.
    pub(crate) inner_width: MeasureMode,
    pub(crate) inner_height: MeasureMode,
}

impl NodeBox {
    fn new(
        style: Style,
        direction: Direction,
        width: MeasureMode,
        height: MeasureMode,
        owner_width: Option<f32>,
        owner_height: Option<f32>,
    ) -> Self {
        let margin = resolve_edges(&style.margin, direction, owner_width);
        let padding = resolve_edges(&style.padding, direction, owner_width);
        let border = resolve_edges(&style.border, direction, owner_width);
        let pb = padding + border;

        let min_width = style.min_width.resolve(owner_width);
        let max_width = style.max_width.resolve(owner_width);
        let min_height = style.min_height.resolve(owner_height);
        let max_height = style.max_height.resolve(owner_height);

        let inner = |available: f32, margin: f32, pb: f32, min: Option<f32>, max: Option<f32>| {
            let size = available - margin - pb;
            clamp_option(size, min.map(|m| m - pb), max.map(|m| m - pb)).max(0.0)
        };
        let inner_width = width.map(|w| inner(w, margin.horizontal(), pb.horizontal(), min_width, max_width));
        let inner_height =
            height.map(|h| inner(h, margin.vertical(), pb.vertical(), min_height, max_height));

        let axes = FlexAxes::new(style.flex_direction, style.flex_wrap, direction);

        Self {
            style,
            direction,
            axes,
            margin,
            padding,
            border,
            min_width,
            max_width,
            min_height,
            max_height,
            inner_width,
            inner_height,
        }
    }

    pub(crate) fn padding_border(&self) -> EdgeSizes {
        self.padding + self.border
    }

    /// Clamp a border-box width to min/max, never below padding + border.
    fn bound_width(&self, width: f32) -> f32 {
        clamp_option(width, self.min_width, self.max_width).max(self.padding_border().horizontal())
    }

    fn bound_height(&self, height: f32) -> f32 {
        clamp_option(height, self.min_height, self.max_height).max(self.padding_border().vertical())
    }

    fn bound_main(&self, size: f32) -> f32 {
        if self.axes.is_row() {
            self.bound_width(size)
        } else {
            self.bound_height(size)
        }
    }

    fn bound_cross(&self, size: f32) -> f32 {
        if self.axes.is_row() {
            self.bound_height(size)
        } else {
            self.bound_width(size)
        }
    }

    fn main_gap(&self) -> f32 {
        if self.axes.is_row() {
            self.style.column_gap
        } else {
            self.style.row_gap
        }
    }

    fn cross_gap(&self) -> f32 {
        if self.axes.is_row() {
            self.style.row_gap
        } else {
            self.style.column_gap
        }
    }

    /// Baseline alignment applies to rows that are not wrap-reversed; other
    /// containers treat it as flex-start.
    pub(crate) fn supports_baseline(&self) -> bool {
        self.axes.is_row() && self.style.flex_wrap != FlexWrap::WrapReverse
    }
}

/// Size of a node on one axis: the exact constraint minus margins, or the
/// content size.
fn own_size(mode: MeasureMode, margin: f32, content: f32) -> f32 {
    match mode {
        MeasureMode::Exactly(available) => available - margin,
        _ => content,
    }
}

/// Constraint for the root on one axis.
fn root_constraint(size: Length, max: Length, available: Option<f32>, margin: f32) -> MeasureMode {
    if let Some(size) = size.resolve(available) {
        MeasureMode::Exactly(size + margin)
    } else if let Some(available) = available {
        MeasureMode::Exactly(available)
    } else if let Some(max) = max.resolve(available) {
        MeasureMode::AtMost(max + margin)
    } else {
        MeasureMode::Undefined
    }
}

impl LayoutTree {
    /// Compute the layout of the subtree rooted at `root`.
    ///
    /// `None` for an available size leaves that axis unconstrained. The root
    /// is positioned at its own top/left margin.
    pub fn compute_layout(
        &mut self,
        root: NodeId,
        available_width: Option<f32>,
        available_height: Option<f32>,
        direction: Direction,
    ) -> Result<()> {
        let style = self.node(root)?.style.clone();
        debug!(?root, ?available_width, ?available_height, ?direction, "Computing layout");

        if style.display == Display::None {
            self.hide_subtree(root)?;
            return round_layout(self, root);
        }

        let resolved = style.direction.resolve(direction);
        let margin = resolve_edges(&style.margin, resolved, available_width);
        let width = root_constraint(style.width, style.max_width, available_width, margin.horizontal());
        let height = root_constraint(style.height, style.max_height, available_height, margin.vertical());

        let size = self.layout_node(
            root,
            width,
            height,
            available_width,
            available_height,
            direction,
            true,
        )?;

        let data = self.node_mut(root)?;
        data.unrounded.x = margin.left;
        data.unrounded.y = margin.top;

        round_layout(self, root)?;
        debug!(?root, width = size.width, height = size.height, "Layout computed");
        Ok(())
    }

    /// Lay out or measure one node, consulting its cache.
    ///
    /// `width`/`height` constrain the node's margin box. Returns the
    /// border-box size.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn layout_node(
        &mut self,
        node: NodeId,
        width: MeasureMode,
        height: MeasureMode,
        owner_width: Option<f32>,
        owner_height: Option<f32>,
        parent_direction: Direction,
        perform_layout: bool,
    ) -> Result<Size> {
        let data = self.node_mut(node)?;
        if data.computing {
            return Err(LayoutError::InvalidTree(format!(
                "{:?} re-entered while computing",
                node
            )));
        }

        let direction = data.style.direction.resolve(parent_direction);
        if data.dirty {
            data.cache.clear();
            data.dirty = false;
        }

        let key = CacheKey {
            width,
            height,
            owner_width,
            owner_height,
            direction,
        };
        if let Some(size) = data.cache.get(&key, perform_layout) {
            return Ok(size);
        }

        data.computing = true;
        let result = self.compute_node(
            node,
            direction,
            width,
            height,
            owner_width,
            owner_height,
            perform_layout,
        );

        let data = self.node_mut(node)?;
        data.computing = false;
        let size = result?;
        data.cache.store(key, size, perform_layout);
        Ok(size)
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_node(
        &mut self,
        node: NodeId,
        direction: Direction,
        width: MeasureMode,
        height: MeasureMode,
        owner_width: Option<f32>,
        owner_height: Option<f32>,
        perform_layout: bool,
    ) -> Result<Size> {
        let (style, children, measured) = {
            let data = self.node(node)?;
            (data.style.clone(), data.children.clone(), data.measure.is_some())
        };
        let node_box = NodeBox::new(style, direction, width, height, owner_width, owner_height);

        if perform_layout {
            let data = self.node_mut(node)?;
            data.unrounded.direction = direction;
            data.unrounded.margin = node_box.margin;
            data.unrounded.padding = node_box.padding;
            data.unrounded.border = node_box.border;
        }

        let mut visible = ChildList::new();
        for &child in &children {
            if self.node(child)?.style.display == Display::None {
                if perform_layout {
                    self.hide_subtree(child)?;
                }
            } else {
                visible.push(child);
            }
        }

        let margin = node_box.margin;
        let size = if measured {
            self.measure_leaf(node, &node_box, width, height)?
        } else if visible.is_empty() {
            Size::new(
                node_box.bound_width(own_size(width, margin.horizontal(), 0.0)),
                node_box.bound_height(own_size(height, margin.vertical(), 0.0)),
            )
        } else if let (false, MeasureMode::Exactly(w), MeasureMode::Exactly(h)) =
            (perform_layout, width, height)
        {
            Size::new(
                node_box.bound_width(w - margin.horizontal()),
                node_box.bound_height(h - margin.vertical()),
            )
        } else {
            self.layout_flex_container(node, &node_box, &visible, perform_layout)?
        };

        if perform_layout {
            let data = self.node_mut(node)?;
            data.unrounded.width = size.width;
            data.unrounded.height = size.height;
        }

        trace!(
            ?node,
            ?width,
            ?height,
            perform_layout,
            result_width = size.width,
            result_height = size.height,
            "Node computed"
        );
        Ok(size)
    }

    fn measure_leaf(
        &self,
        node: NodeId,
        node_box: &NodeBox,
        width: MeasureMode,
        height: MeasureMode,
    ) -> Result<Size> {
        let margin = node_box.margin;
        if let (MeasureMode::Exactly(w), MeasureMode::Exactly(h)) = (width, height) {
            return Ok(Size::new(
                node_box.bound_width(w - margin.horizontal()),
                node_box.bound_height(h - margin.vertical()),
            ));
        }

        let measured = match &self.node(node)?.measure {
            Some(measure) => sanitize_size(measure.measure(
                node,
                node_box.inner_width,
                node_box.inner_height,
            )),
            None => Size::zero(),
        };
        trace!(
            ?node,
            width = ?node_box.inner_width,
            height = ?node_box.inner_height,
            measured_width = measured.width,
            measured_height = measured.height,
            "Measured leaf"
        );

        let pb = node_box.padding_border();
        Ok(Size::new(
            node_box.bound_width(own_size(width, margin.horizontal(), measured.width + pb.horizontal())),
            node_box.bound_height(own_size(height, margin.vertical(), measured.height + pb.vertical())),
        ))
    }

    fn layout_flex_container(
        &mut self,
        node: NodeId,
        nb: &NodeBox,
        children: &[NodeId],
        perform_layout: bool,
    ) -> Result<Size> {
        let axes = nb.axes;
        let style = &nb.style;
        let pb = nb.padding_border();
        let (pb_main, pb_cross) = axes.split(pb.horizontal(), pb.vertical());
        let (inner_main, inner_cross) = axes.split(nb.inner_width, nb.inner_height);
        let (min_main, _) = axes.split(nb.min_width, nb.min_height);
        let (max_main, _) = axes.split(nb.max_width, nb.max_height);
        let main_gap = nb.main_gap();
        let cross_gap = nb.cross_gap();

        // Flex base sizes
        let mut items = Vec::with_capacity(children.len());
        for &child in children {
            items.push(self.create_flex_item(nb, child)?);
        }

        // Flex lines
        let mut lines = collect_flex_lines(items, inner_main.size(), main_gap, style.flex_wrap);

        // Flexible lengths
        for line in &mut lines {
            let used = line.hypothetical_main_size(main_gap);
            let available = available_main_space(
                inner_main,
                min_main.map(|min| min - pb_main),
                max_main.map(|max| max - pb_main),
                used,
            );
            resolve_flexible_lengths(line, available, main_gap);
        }

        // Cross sizes at the resolved main sizes
        let single_line = lines.len() == 1;
        let mut performed_children = false;
        for line in &mut lines {
            for item in &mut line.items {
                performed_children |= self.measure_item_cross(nb, item, single_line)?;
            }
            calculate_line_cross_size(line);
        }

        // Container cross size
        let lines_cross = lines.iter().map(|line| line.cross_size).sum::<f32>()
            + cross_gap * lines.len().saturating_sub(1) as f32;
        let cross_size = match inner_cross {
            MeasureMode::Exactly(inner) => inner + pb_cross,
            MeasureMode::AtMost(limit) => nb
                .bound_cross(lines_cross + pb_cross)
                .min(limit + pb_cross)
                .max(pb_cross),
            MeasureMode::Undefined => nb.bound_cross(lines_cross + pb_cross),
        };
        let container_inner_cross = cross_size - pb_cross;

        // A single line fills a definite or unwrapped container
        if single_line && (inner_cross.is_exact() || !style.flex_wrap.is_wrapping()) {
            lines[0].cross_size = container_inner_cross;
        }

        // Container main size
        let longest_line = lines
            .iter()
            .map(|line| line.used_main_size(main_gap))
            .fold(0.0, f32::max);
        let main_size = match inner_main {
            MeasureMode::Exactly(inner) => inner + pb_main,
            MeasureMode::AtMost(limit) if lines.len() > 1 => limit + pb_main,
            MeasureMode::AtMost(limit) => nb
                .bound_main(longest_line + pb_main)
                .min(limit + pb_main)
                .max(pb_main),
            MeasureMode::Undefined => nb.bound_main(longest_line + pb_main),
        };
        let container_inner_main = main_size - pb_main;
        let (width, height) = axes.join(main_size, cross_size);

        trace!(
            ?node,
            lines = lines.len(),
            main_size,
            cross_size,
            perform_layout,
            "Flex container sized"
        );

        if !perform_layout {
            if performed_children {
                // Baseline measurement laid out descendants under
                // measure-only constraints
                self.invalidate_layout_upwards(node)?;
            }
            return Ok(Size::new(width, height));
        }

        if lines.len() > 1 {
            distribute_lines(&mut lines, container_inner_cross, cross_gap, style.align_content);
        }
        for line in &mut lines {
            distribute_main_axis(line, container_inner_main, main_gap, style.justify_content);
            align_cross_axis(line);
        }

        // Final layout of children at exact sizes
        let owner_width = nb.inner_width.size();
        let owner_height = nb.inner_height.size();
        for line in &lines {
            for item in &line.items {
                let (w, h) = axes.join(item.target_main_size, item.cross_size);
                let size = self.layout_node(
                    item.node,
                    MeasureMode::Exactly(w + item.margin.horizontal()),
                    MeasureMode::Exactly(h + item.margin.vertical()),
                    owner_width,
                    owner_height,
                    nb.direction,
                    true,
                )?;

                let (child_main, child_cross) = axes.split(size.width, size.height);
                let main_offset =
                    axes.main_to_physical(item.main_position, child_main, container_inner_main);
                let cross_offset = axes.cross_to_physical(
                    line.cross_position + item.cross_position,
                    child_cross,
                    container_inner_cross,
                );
                let (x, y) = axes.join(main_offset, cross_offset);

                let data = self.node_mut(item.node)?;
                data.unrounded.x = x;
                data.unrounded.y = y;
            }
        }

        Ok(Size::new(width, height))
    }

    /// Measure an item's cross size at its resolved main size.
    ///
    /// Baseline-aligned items are also laid out so their baseline can be
    /// read; returns whether that happened.
    fn measure_item_cross(&mut self, nb: &NodeBox, item: &mut FlexItem, single_line: bool) -> Result<bool> {
        let axes = nb.axes;
        let (_, inner_cross) = axes.split(nb.inner_width, nb.inner_height);
        let (margin_main, margin_cross) =
            axes.split(item.margin.horizontal(), item.margin.vertical());

        let main = MeasureMode::Exactly(item.target_main_size + margin_main);
        let cross = match (item.definite_cross_size, inner_cross) {
            (Some(size), _) => MeasureMode::Exactly(size + margin_cross),
            (None, MeasureMode::Exactly(size)) if single_line && item.align == AlignItems::Stretch => {
                MeasureMode::Exactly(size)
            }
            (None, mode) => mode.size().map_or(MeasureMode::Undefined, MeasureMode::AtMost),
        };
        let max_cross = item.max_cross_size;
        let cross = cross.constrain_max(max_cross.is_finite().then_some(max_cross + margin_cross));

        let (width, height) = axes.join(main, cross);
        let owner_width = nb.inner_width.size();
        let owner_height = nb.inner_height.size();
        let size = self.layout_node(
            item.node,
            width,
            height,
            owner_width,
            owner_height,
            nb.direction,
            false,
        )?;
        item.cross_size = axes.split(size.width, size.height).1;

        if item.align != AlignItems::Baseline {
            return Ok(false);
        }

        self.layout_node(
            item.node,
            MeasureMode::Exactly(size.width + item.margin.horizontal()),
            MeasureMode::Exactly(size.height + item.margin.vertical()),
            owner_width,
            owner_height,
            nb.direction,
            true,
        )?;
        item.baseline = self.node_baseline(item.node)?;
        Ok(true)
    }

    /// Distance from a node's top border edge to its baseline.
    ///
    /// Uses the baseline callback when set, else the first baseline-aligned
    /// child (or the first child), else the node's height.
    pub(crate) fn node_baseline(&self, node: NodeId) -> Result<f32> {
        let data = self.node(node)?;
        let layout = data.unrounded;
        if let Some(baseline) = &data.baseline {
            return Ok(sanitize(baseline.baseline(node, layout.width, layout.height)));
        }

        let align_items = data.style.align_items;
        let mut reference = None;
        for &child in &data.children {
            let child_style = &self.node(child)?.style;
            if child_style.display == Display::None {
                continue;
            }
            if child_style.align_self.resolve(align_items) == AlignItems::Baseline {
                reference = Some(child);
                break;
            }
            if reference.is_none() {
                reference = Some(child);
            }
        }

        match reference {
            Some(child) => {
                let child_y = self.node(child)?.unrounded.y;
                Ok(self.node_baseline(child)? + child_y + layout.padding.top + layout.border.top)
            }
            None => Ok(layout.height),
        }
    }

    /// Zero the layout of a `display: none` subtree.
    fn hide_subtree(&mut self, node: NodeId) -> Result<()> {
        let data = self.node_mut(node)?;
        data.unrounded = Layout::default();
        data.cache.invalidate_layout();
        let children = data.children.clone();
        for child in children {
            self.hide_subtree(child)?;
        }
        Ok(())
    }

    fn invalidate_layout_upwards(&mut self, node: NodeId) -> Result<()> {
        let mut current = Some(node);
        while let Some(id) = current {
            let data = self.node_mut(id)?;
            data.cache.invalidate_layout();
            current = data.parent;
        }
        Ok(())
    }
}
