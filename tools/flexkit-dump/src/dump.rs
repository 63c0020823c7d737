//! Text rendering of a computed layout tree.

use std::fmt::Write as _;

use flexkit_layout::{EdgeSizes, LayoutTree, NodeId, Result};

/// Render the layout of `root` and its subtree, one node per line.
pub fn format_tree(tree: &LayoutTree, root: NodeId) -> Result<String> {
    let mut output = String::new();
    format_node(tree, root, 0, &mut output)?;
    Ok(output)
}

fn format_node(tree: &LayoutTree, node: NodeId, depth: usize, output: &mut String) -> Result<()> {
    let layout = tree.layout(node)?;
    let kind = if tree.is_measured(node)? { "leaf" } else { "node" };

    let _ = write!(
        output,
        "{}{} x={} y={} w={} h={} dir={:?}",
        "  ".repeat(depth),
        kind,
        layout.x,
        layout.y,
        layout.width,
        layout.height,
        layout.direction
    );
    for (name, edges) in [
        ("margin", layout.margin),
        ("border", layout.border),
        ("padding", layout.padding),
    ] {
        if edges != EdgeSizes::default() {
            let _ = write!(
                output,
                " {}=[{} {} {} {}]",
                name, edges.top, edges.right, edges.bottom, edges.left
            );
        }
    }
    output.push('\n');

    for &child in tree.children(node)? {
        format_node(tree, child, depth + 1, output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexkit_layout::Direction;
    use flexkit_style::{Edges, Style};

    #[test]
    fn test_format_tree() {
        let mut tree = LayoutTree::new();
        let child = tree.new_node(Style::default().with_size(10.0, 10.0)).unwrap();
        let root = tree
            .new_node(Style {
                padding: Edges::all(2.0),
                ..Style::default()
            })
            .unwrap();
        tree.add_child(root, child).unwrap();
        tree.compute_layout(root, Some(50.0), None, Direction::Ltr)
            .unwrap();

        assert_eq!(
            format_tree(&tree, root).unwrap(),
            "node x=0 y=0 w=50 h=14 dir=Ltr padding=[2 2 2 2]\n  node x=0 y=0 w=10 h=10 dir=Ltr\n"
        );
    }
}
