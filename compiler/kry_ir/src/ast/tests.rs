use super::*;
use pretty_assertions::assert_eq;

fn text_component(ast: &mut Ast) -> NodeId {
    let text = ast.intern("text");
    let hello = ast.intern("Hello");
    let value = ast.alloc_value(Value::String(hello));
    let prop = ast.alloc_node(
        NodeKind::Property { name: text, value },
        Span::new(7, 21),
        LineCol::new(1, 8),
    );

    let name = ast.intern("Text");
    let component = ast.alloc_node(
        NodeKind::Component {
            name,
            args: None,
            params: ParamRange::EMPTY,
            children: NodeRange::EMPTY,
            is_definition: false,
            extends: None,
        },
        Span::new(0, 23),
        LineCol::START,
    );
    let children = ast.alloc_children(component, &[prop]);
    if let NodeKind::Component { name, .. } = ast.node(component).kind {
        ast.set_kind(
            component,
            NodeKind::Component {
                name,
                args: None,
                params: ParamRange::EMPTY,
                children,
                is_definition: false,
                extends: None,
            },
        );
    }
    component
}

#[test]
fn children_record_their_parent() {
    let mut ast = Ast::new();
    let component = text_component(&mut ast);

    let NodeKind::Component { children, .. } = ast.node(component).kind else {
        panic!("expected component");
    };
    let kids = ast.children(children);
    assert_eq!(kids.len(), 1);
    assert_eq!(ast.node(kids[0]).parent, Some(component));
    assert_eq!(ast.node(component).parent, None);
}

#[test]
fn node_cannot_be_adopted_twice() {
    let mut ast = Ast::new();
    let component = text_component(&mut ast);
    let root = ast.alloc_node(
        NodeKind::Root {
            items: NodeRange::EMPTY,
        },
        Span::DUMMY,
        LineCol::START,
    );

    let first = ast.alloc_children(root, &[component]);
    let second = ast.alloc_children(root, &[component]);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[test]
fn dump_renders_nested_structure() {
    let mut ast = Ast::new();
    let component = text_component(&mut ast);
    let root = ast.alloc_node(
        NodeKind::Root {
            items: NodeRange::EMPTY,
        },
        Span::DUMMY,
        LineCol::START,
    );
    let items = ast.alloc_children(root, &[component]);
    ast.set_kind(root, NodeKind::Root { items });
    ast.set_root(root);

    assert_eq!(ast.items(), &[component]);
    assert_eq!(
        ast.dump(),
        "Root\n  Component Text\n    Property text = \"Hello\"\n"
    );
}

#[test]
fn display_value_handles_composites() {
    let mut ast = Ast::new();
    let one = ast.alloc_value(Value::Number {
        value: 1.0,
        is_percentage: false,
    });
    let half = ast.alloc_value(Value::Number {
        value: 50.0,
        is_percentage: true,
    });
    let items = ast.alloc_values(&[one, half]);
    let array = ast.alloc_value(Value::Array(items));
    assert_eq!(ast.display_value(array), "[1, 50%]");

    let range = ast.alloc_value(Value::Range {
        start: one,
        end: half,
    });
    assert_eq!(ast.display_value(range), "1..50%");
}

#[test]
fn empty_ranges_resolve_to_empty_slices() {
    let ast = Ast::new();
    assert!(ast.children(NodeRange::EMPTY).is_empty());
    assert!(ast.entries(EntryRange::EMPTY).is_empty());
    assert!(ast.items().is_empty());
}

#[test]
fn adopt_links_single_child_once() {
    let mut ast = Ast::new();
    let outer = text_component(&mut ast);
    let inner = text_component(&mut ast);

    assert!(ast.adopt(outer, inner));
    assert_eq!(ast.node(inner).parent, Some(outer));
    assert!(!ast.adopt(outer, inner));
    assert!(!ast.adopt(outer, outer));
}
