//! Caching, dirty tracking and tree validation

use std::cell::Cell;
use std::rc::Rc;

use flexkit_layout::{Direction, LayoutError, LayoutTree, MeasureMode, NodeId, Size};
use flexkit_style::{Display, FlexDirection, Length, Style};

fn counting_leaf(tree: &mut LayoutTree, calls: &Rc<Cell<usize>>, width: f32) -> NodeId {
    let calls = Rc::clone(calls);
    tree.new_leaf_with_measure(
        Style::default(),
        move |_: NodeId, _: MeasureMode, _: MeasureMode| {
            calls.set(calls.get() + 1);
            Size::new(width, 10.0)
        },
    )
    .unwrap()
}

fn row(tree: &mut LayoutTree, children: &[NodeId]) -> NodeId {
    let root = tree
        .new_node(Style {
            flex_direction: FlexDirection::Row,
            ..Style::default()
        })
        .unwrap();
    tree.set_children(root, children).unwrap();
    root
}

#[test]
fn test_second_compute_does_not_measure() {
    let mut tree = LayoutTree::new();
    let calls = Rc::new(Cell::new(0));
    let a = counting_leaf(&mut tree, &calls, 50.0);
    let b = counting_leaf(&mut tree, &calls, 30.0);
    let root = row(&mut tree, &[a, b]);

    tree.compute_layout(root, Some(200.0), None, Direction::Ltr)
        .unwrap();
    assert!(calls.get() > 0);
    assert!(!tree.is_dirty(root).unwrap());

    calls.set(0);
    tree.compute_layout(root, Some(200.0), None, Direction::Ltr)
        .unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(tree.layout(b).unwrap().x, 50.0);
}

#[test]
fn test_dirty_leaf_is_the_only_one_remeasured() {
    let mut tree = LayoutTree::new();
    let a_calls = Rc::new(Cell::new(0));
    let b_calls = Rc::new(Cell::new(0));
    let a = counting_leaf(&mut tree, &a_calls, 50.0);
    let b = counting_leaf(&mut tree, &b_calls, 30.0);
    let root = row(&mut tree, &[a, b]);
    tree.compute_layout(root, Some(200.0), None, Direction::Ltr)
        .unwrap();

    a_calls.set(0);
    b_calls.set(0);
    tree.mark_dirty(a).unwrap();
    assert!(tree.is_dirty(a).unwrap());
    assert!(tree.is_dirty(root).unwrap());
    assert!(!tree.is_dirty(b).unwrap());

    tree.compute_layout(root, Some(200.0), None, Direction::Ltr)
        .unwrap();
    assert!(a_calls.get() > 0);
    assert_eq!(b_calls.get(), 0);
}

#[test]
fn test_new_constraints_remeasure() {
    let mut tree = LayoutTree::new();
    let calls = Rc::new(Cell::new(0));
    let leaf = counting_leaf(&mut tree, &calls, 50.0);
    let root = row(&mut tree, &[leaf]);

    tree.compute_layout(root, Some(200.0), None, Direction::Ltr)
        .unwrap();
    calls.set(0);
    tree.compute_layout(root, Some(120.0), None, Direction::Ltr)
        .unwrap();

    assert!(calls.get() > 0);
    assert_eq!(tree.layout(root).unwrap().width, 120.0);
}

#[test]
fn test_unchanged_style_keeps_cache() {
    let mut tree = LayoutTree::new();
    let leaf = tree.new_node(Style::default().with_size(10.0, 10.0)).unwrap();
    let root = row(&mut tree, &[leaf]);
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();

    tree.set_style(leaf, Style::default().with_size(10.0, 10.0))
        .unwrap();
    assert!(!tree.is_dirty(root).unwrap());

    tree.set_style(leaf, Style::default().with_size(20.0, 10.0))
        .unwrap();
    assert!(tree.is_dirty(root).unwrap());
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(tree.layout(root).unwrap().width, 20.0);
}

#[test]
fn test_structure_changes_relayout() {
    let mut tree = LayoutTree::new();
    let a = tree.new_node(Style::default().with_size(10.0, 10.0)).unwrap();
    let b = tree.new_node(Style::default().with_size(15.0, 10.0)).unwrap();
    let root = row(&mut tree, &[a]);
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(tree.layout(root).unwrap().width, 10.0);

    tree.insert_child(root, 0, b).unwrap();
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(tree.layout(root).unwrap().width, 25.0);
    assert_eq!(tree.layout(a).unwrap().x, 15.0);

    tree.remove_child(root, b).unwrap();
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(tree.layout(root).unwrap().width, 10.0);
    assert_eq!(tree.layout(a).unwrap().x, 0.0);
}

#[test]
fn test_hidden_subtree_is_restored() {
    let mut tree = LayoutTree::new();
    let grandchild = tree.new_node(Style::default().with_size(20.0, 20.0)).unwrap();
    let child = tree.new_node(Style::default()).unwrap();
    tree.add_child(child, grandchild).unwrap();
    let root = row(&mut tree, &[child]);
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    let visible = *tree.layout(grandchild).unwrap();

    let hidden = Style {
        display: Display::None,
        ..Style::default()
    };
    tree.set_style(child, hidden).unwrap();
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(tree.layout(grandchild).unwrap().width, 0.0);
    assert_eq!(tree.layout(root).unwrap().width, 0.0);

    tree.set_style(child, Style::default()).unwrap();
    tree.compute_layout(root, None, None, Direction::Ltr).unwrap();
    assert_eq!(*tree.layout(grandchild).unwrap(), visible);
}

#[test]
fn test_reject_malformed_trees() {
    let mut tree = LayoutTree::new();
    let a = tree.new_node(Style::default()).unwrap();
    let b = tree.new_node(Style::default()).unwrap();
    let c = tree.new_node(Style::default()).unwrap();
    tree.add_child(a, b).unwrap();
    tree.add_child(b, c).unwrap();

    assert!(matches!(tree.add_child(c, a), Err(LayoutError::InvalidTree(_))));
    assert!(matches!(tree.add_child(a, a), Err(LayoutError::InvalidTree(_))));
    assert!(matches!(tree.add_child(c, b), Err(LayoutError::InvalidTree(_))));

    let leaf = tree
        .new_leaf_with_measure(Style::default(), |_: NodeId, _: MeasureMode, _: MeasureMode| {
            Size::zero()
        })
        .unwrap();
    let orphan = tree.new_node(Style::default()).unwrap();
    assert!(matches!(
        tree.add_child(leaf, orphan),
        Err(LayoutError::InvalidTree(_))
    ));
    assert!(matches!(
        tree.set_measure(a, |_: NodeId, _: MeasureMode, _: MeasureMode| Size::zero()),
        Err(LayoutError::InvalidTree(_))
    ));
}

#[test]
fn test_reject_negative_sizes() {
    let mut tree = LayoutTree::new();
    let negative = Style {
        width: Length::Px(-1.0),
        ..Style::default()
    };
    assert!(matches!(
        tree.new_node(negative.clone()),
        Err(LayoutError::InvalidTree(_))
    ));

    let node = tree.new_node(Style::default()).unwrap();
    assert!(matches!(
        tree.set_style(node, negative),
        Err(LayoutError::InvalidTree(_))
    ));
}

#[test]
fn test_removed_node_handle_is_stale() {
    let mut tree = LayoutTree::new();
    let child = tree.new_node(Style::default()).unwrap();
    let root = row(&mut tree, &[child]);

    tree.remove_node(child).unwrap();
    assert_eq!(tree.child_count(root).unwrap(), 0);
    assert_eq!(tree.layout(child), Err(LayoutError::NodeNotFound(child)));
    assert_eq!(
        tree.compute_layout(child, None, None, Direction::Ltr),
        Err(LayoutError::NodeNotFound(child))
    );
}

#[test]
fn test_cached_relayout_under_trace_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut tree = LayoutTree::new();
        let calls = Rc::new(Cell::new(0));
        let a = counting_leaf(&mut tree, &calls, 50.0);
        let root = row(&mut tree, &[a]);

        tree.compute_layout(root, Some(100.0), None, Direction::Ltr)
            .unwrap();
        tree.mark_dirty(a).unwrap();
        tree.compute_layout(root, Some(100.0), None, Direction::Ltr)
            .unwrap();
        assert_eq!(tree.layout(a).unwrap().width, 50.0);
    });
}
