//! Fixture format and tree construction.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use flexkit_layout::{LayoutConfig, LayoutTree, MeasureMode, NodeId, Size};
use flexkit_style::{Direction, Style};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TestError;

/// Intrinsic content of a measured leaf.
///
/// The leaf reports its natural size, fit into `AtMost` limits and
/// overridden by `Exactly` ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub width: f32,
    pub height: f32,
}

impl MeasureSpec {
    pub fn measure(&self, width: MeasureMode, height: MeasureMode) -> Size {
        Size::new(fit(self.width, width), fit(self.height, height))
    }
}

fn fit(natural: f32, mode: MeasureMode) -> f32 {
    match mode {
        MeasureMode::Exactly(size) => size,
        MeasureMode::AtMost(limit) => natural.min(limit),
        MeasureMode::Undefined => natural,
    }
}

/// One node of a fixture tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureNode {
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<MeasureSpec>,
    /// Fixed baseline offset reported by the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FixtureNode>,
}

/// Layout of a node and its children, as stored in fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutSnapshot>,
}

impl LayoutSnapshot {
    /// Capture the rounded layout of `node` and its subtree.
    pub fn capture(tree: &LayoutTree, node: NodeId) -> Result<Self, TestError> {
        let layout = tree.layout(node)?;
        let children = tree
            .children(node)?
            .iter()
            .map(|&child| Self::capture(tree, child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            x: layout.x,
            y: layout.y,
            width: layout.width,
            height: layout.height,
            children,
        })
    }

    /// Indented text form, one node per line.
    pub fn format(&self) -> String {
        let mut output = String::new();
        self.format_into(&mut output, 0);
        output
    }

    fn format_into(&self, output: &mut String, depth: usize) {
        let _ = writeln!(
            output,
            "{}node: x={} y={} w={} h={}",
            "  ".repeat(depth),
            self.x,
            self.y,
            self.width,
            self.height
        );
        for child in &self.children {
            child.format_into(output, depth + 1);
        }
    }
}

/// A layout fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub available_width: Option<f32>,
    #[serde(default)]
    pub available_height: Option<f32>,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    #[serde(default)]
    pub config: LayoutConfig,
    pub root: FixtureNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<LayoutSnapshot>,
}

fn default_direction() -> Direction {
    Direction::Ltr
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self, TestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, TestError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build the fixture tree, returning the tree and its root.
    pub fn build(&self) -> Result<(LayoutTree, NodeId), TestError> {
        let mut tree = LayoutTree::with_config(self.config);
        let root = build_node(&mut tree, &self.root)?;
        debug!(name = %self.name, nodes = tree.len(), "Fixture built");
        Ok((tree, root))
    }

    /// Build and lay out the tree.
    pub fn compute(&self) -> Result<(LayoutTree, NodeId), TestError> {
        let (mut tree, root) = self.build()?;
        tree.compute_layout(
            root,
            self.available_width,
            self.available_height,
            self.direction,
        )?;
        Ok((tree, root))
    }

    /// Computed layout of the whole tree.
    pub fn actual(&self) -> Result<LayoutSnapshot, TestError> {
        let (tree, root) = self.compute()?;
        LayoutSnapshot::capture(&tree, root)
    }
}

fn build_node(tree: &mut LayoutTree, spec: &FixtureNode) -> Result<NodeId, TestError> {
    let node = match spec.measure {
        Some(measure) => {
            if !spec.children.is_empty() {
                return Err(TestError::InvalidFixture(
                    "measured nodes cannot have children".into(),
                ));
            }
            tree.new_leaf_with_measure(
                spec.style.clone(),
                move |_: NodeId, width: MeasureMode, height: MeasureMode| {
                    measure.measure(width, height)
                },
            )?
        }
        None => tree.new_node(spec.style.clone())?,
    };

    if let Some(baseline) = spec.baseline {
        tree.set_baseline(node, move |_: NodeId, _: f32, _: f32| baseline)?;
    }

    for child in &spec.children {
        let child = build_node(tree, child)?;
        tree.add_child(node, child)?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAP_ROW: &str = r#"{
        "name": "wrap_row",
        "root": {
            "style": {"flex_direction": "row", "flex_wrap": "wrap", "width": {"px": 100}},
            "children": [
                {"style": {"width": {"px": 60}, "height": {"px": 10}}},
                {"style": {"width": {"px": 60}, "height": {"px": 10}}}
            ]
        },
        "expected": {
            "x": 0, "y": 0, "width": 100, "height": 20,
            "children": [
                {"x": 0, "y": 0, "width": 60, "height": 10},
                {"x": 0, "y": 10, "width": 60, "height": 10}
            ]
        }
    }"#;

    #[test]
    fn test_parse_fixture_defaults() {
        let fixture = Fixture::from_json(WRAP_ROW).unwrap();
        assert_eq!(fixture.direction, Direction::Ltr);
        assert_eq!(fixture.available_width, None);
        assert_eq!(fixture.config, LayoutConfig::default());
        assert_eq!(fixture.root.children.len(), 2);
    }

    #[test]
    fn test_actual_matches_expected() {
        let fixture = Fixture::from_json(WRAP_ROW).unwrap();
        assert_eq!(fixture.actual().unwrap(), fixture.expected.unwrap());
    }

    #[test]
    fn test_measure_spec_fits_constraints() {
        let text = MeasureSpec {
            width: 80.0,
            height: 12.0,
        };
        assert_eq!(
            text.measure(MeasureMode::AtMost(50.0), MeasureMode::Undefined),
            Size::new(50.0, 12.0)
        );
        assert_eq!(
            text.measure(MeasureMode::Exactly(100.0), MeasureMode::AtMost(20.0)),
            Size::new(100.0, 12.0)
        );
    }

    #[test]
    fn test_measured_node_with_children_is_rejected() {
        let fixture = Fixture::from_json(
            r#"{"name": "bad", "root": {"measure": {"width": 1, "height": 1}, "children": [{}]}}"#,
        )
        .unwrap();
        assert!(matches!(fixture.build(), Err(TestError::InvalidFixture(_))));
    }

    #[test]
    fn test_format_indents_children() {
        let snapshot = LayoutSnapshot {
            width: 10.0,
            height: 5.0,
            children: vec![LayoutSnapshot {
                x: 1.0,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            snapshot.format(),
            "node: x=0 y=0 w=10 h=5\n  node: x=1 y=0 w=0 h=0\n"
        );
    }
}
