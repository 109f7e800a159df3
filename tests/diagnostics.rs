//! Integration tests for rejected layouts and their diagnostics

use insta::assert_snapshot;
use mudblood_layout::layout::{
    solve, solve_with_config, Attribute, EquationOrigin, LayoutError, LayoutNode, SolverConfig,
    SolverError, Variable,
};

/// A fully pinned root that tests hang children off
fn page() -> LayoutNode {
    LayoutNode::new("page", "Rect")
        .with(Attribute::X, 0)
        .with(Attribute::Y, 0)
        .with(Attribute::W, 800)
        .with(Attribute::H, 600)
}

#[test]
fn test_inconsistent_width_and_right() {
    let tree = LayoutNode::new("a", "Rect")
        .with(Attribute::X, 0)
        .with(Attribute::Y, 0)
        .with(Attribute::W, 100)
        .with(Attribute::H, 10)
        .with(Attribute::Right, 50);
    let err = solve(&tree).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::Solver(SolverError::Contradiction { .. })
    ));
    assert_snapshot!(
        err.to_string(),
        @"contradictory constraints: a.x = 0; a.w = 100; a.right = 50; a.right = a.x + a.w"
    );
}

#[test]
fn test_missing_width_is_named() {
    let tree = page().with_child(
        LayoutNode::new("sidebar", "Rect")
            .with(Attribute::X, "parent.x")
            .with(Attribute::Y, "parent.y")
            .with(Attribute::H, "parent.h"),
    );
    match solve(&tree).unwrap_err() {
        LayoutError::Solver(SolverError::Underdetermined { free }) => {
            assert_eq!(free, vec![Variable::new("sidebar", Attribute::W)]);
        }
        other => panic!("expected Underdetermined, got {:?}", other),
    }
}

#[test]
fn test_unconstrained_tree_lists_free_variables() {
    let err = solve(&LayoutNode::new("a", "Rect")).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"underdetermined layout, no unique value for: a.x, a.y, a.w, a.h"
    );
}

#[test]
fn test_unknown_reference_suggests_similar_id() {
    let tree = page()
        .with_child(
            LayoutNode::new("rect1", "Rect")
                .with(Attribute::X, 0)
                .with(Attribute::Y, 0)
                .with(Attribute::W, 10)
                .with(Attribute::H, 10),
        )
        .with_child(LayoutNode::new("rect2", "Rect").with(Attribute::X, "rectl.right + 4"));
    let err = solve(&tree).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"rect2.x: unknown node 'rectl' (did you mean: rect1, rect2?)"
    );
    assert_eq!(err.span(), Some(&(0..11)));
}

#[test]
fn test_invalid_attribute() {
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::W, "parent.width"));
    let err = solve(&tree).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::InvalidAttribute { ref name, .. } if name == "width"
    ));
    assert_snapshot!(
        err.to_string(),
        @"a.w: 'width' is not an attribute (expected one of: x, y, w, h, right, bottom)"
    );
}

#[test]
fn test_parent_on_root() {
    let tree = LayoutNode::new("root", "Rect").with(Attribute::W, "parent.w");
    let err = solve(&tree).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::NoParent { ref node, attribute: Attribute::W, .. } if node == "root"
    ));
}

#[test]
fn test_malformed_expression_keeps_source() {
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::X, "parent.x +"));
    match solve(&tree).unwrap_err() {
        LayoutError::Parse {
            node,
            attribute,
            expression,
            error,
        } => {
            assert_eq!(node, "a");
            assert_eq!(attribute, Attribute::X);
            assert_eq!(expression, "parent.x +");
            assert!(error.format(&expression, "a.x").contains("a.x"));
        }
        other => panic!("expected Parse, got {:?}", other),
    }
}

#[test]
fn test_non_linear_rejected() {
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::H, "parent.w * parent.h"));
    let err = solve(&tree).unwrap_err();
    assert_snapshot!(err.to_string(), @"a.h: expression 'parent.w * parent.h' is not linear");
}

#[test]
fn test_division_by_zero_rejected() {
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::W, "parent.w / (3 - 3)"));
    assert!(matches!(
        solve(&tree).unwrap_err(),
        LayoutError::DivisionByZero { .. }
    ));
}

#[test]
fn test_duplicate_ids_rejected() {
    let tree = page()
        .with_child(LayoutNode::new("box", "Rect"))
        .with_child(LayoutNode::new("box", "Text"));
    assert_snapshot!(solve(&tree).unwrap_err().to_string(), @"duplicate node id 'box'");
}

#[test]
fn test_variable_cap_checked_before_solving() {
    // The reference error would surface if equations were built first
    let tree = page()
        .with_child(LayoutNode::new("a", "Rect").with(Attribute::X, "nowhere.x"))
        .with_child(LayoutNode::new("b", "Rect"));
    let config = SolverConfig::new().with_max_variables(12);
    let err = solve_with_config(&tree, &config).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::TooManyVariables {
            variables: 18,
            limit: 12
        }
    ));
}

#[test]
fn test_constant_overflow_names_declaration() {
    let tree = page().with_child(
        LayoutNode::new("a", "Rect").with(Attribute::W, "170141183460469231731687303715884105727 * 2"),
    );
    match solve(&tree).unwrap_err() {
        LayoutError::ArithmeticOverflow {
            node,
            attribute,
            expression,
        } => {
            assert_eq!(node, "a");
            assert_eq!(attribute, Attribute::W);
            assert_eq!(expression, "170141183460469231731687303715884105727 * 2");
        }
        other => panic!("expected ArithmeticOverflow, got {:?}", other),
    }
}

#[test]
fn test_elimination_overflow_names_equation() {
    // Each level thirds the width; 3^81 no longer fits a denominator
    let mut node: Option<LayoutNode> = None;
    for k in (1..90).rev() {
        let mut current = LayoutNode::new(format!("n{}", k), "Rect")
            .with(Attribute::X, "parent.x")
            .with(Attribute::Y, "parent.y")
            .with(Attribute::W, "parent.w / 3")
            .with(Attribute::H, 1);
        if let Some(child) = node.take() {
            current = current.with_child(child);
        }
        node = Some(current);
    }
    let mut tree = LayoutNode::new("n0", "Rect")
        .with(Attribute::X, 0)
        .with(Attribute::Y, 0)
        .with(Attribute::W, 1)
        .with(Attribute::H, 1);
    if let Some(child) = node {
        tree = tree.with_child(child);
    }

    let err = solve(&tree).unwrap_err();
    match &err {
        LayoutError::Solver(SolverError::Overflow {
            equation: EquationOrigin::Declared {
                node, attribute, ..
            },
        }) => {
            assert_eq!(node, "n81");
            assert_eq!(*attribute, Attribute::W);
        }
        other => panic!("expected Overflow, got {:?}", other),
    }
    assert_snapshot!(
        err.to_string(),
        @"arithmetic overflow while eliminating 'n81.w = parent.w / 3'"
    );
}

#[test]
fn test_overlong_expression_rejected() {
    let mut source = String::from("0");
    for _ in 0..50_000 {
        source.push_str(" + 1");
    }
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::W, &source));
    match solve(&tree).unwrap_err() {
        LayoutError::Parse {
            node,
            attribute,
            error,
            ..
        } => {
            assert_eq!((node.as_str(), attribute), ("a", Attribute::W));
            assert_snapshot!(error.to_string(), @"Parse error at 2048..2049: Expression is longer than 1024 tokens");
        }
        other => panic!("expected Parse, got {:?}", other),
    }
}

#[test]
fn test_deep_nesting_rejected() {
    let source = format!("{}parent.w{}", "(".repeat(40), ")".repeat(40));
    let tree = page().with_child(LayoutNode::new("a", "Rect").with(Attribute::W, &source));
    match solve(&tree).unwrap_err() {
        LayoutError::Parse { error, .. } => {
            assert_snapshot!(error.to_string(), @"Parse error at 32..33: Parentheses nested deeper than 32 levels");
        }
        other => panic!("expected Parse, got {:?}", other),
    }

    let config = SolverConfig::new().with_max_expression_nesting(64);
    let layout = solve_with_config(&tree, &config);
    assert!(matches!(
        layout,
        Err(LayoutError::Solver(SolverError::Underdetermined { .. }))
    ));
}
