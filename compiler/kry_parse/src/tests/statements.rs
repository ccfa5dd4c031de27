use kry_ir::{ElseBranch, NodeKind, VarQualifier};
use pretty_assertions::assert_eq;

use super::{dump, parse_clean};

#[test]
fn component_with_string_property() {
    assert_eq!(
        dump(r#"Text { text = "Hello" }"#),
        "Root\n  Component Text\n    Property text = \"Hello\"\n"
    );
}

#[test]
fn nested_components_and_separators() {
    let source = r#"
App {
    title = "Demo"; width = 800,
    Column {
        Text { text = "a" }
        Text { text = "b" }
    }
}
"#;
    assert_eq!(
        dump(source),
        "Root
  Component App
    Property title = \"Demo\"
    Property width = 800
    Component Column
      Component Text
        Property text = \"a\"
      Component Text
        Property text = \"b\"
"
    );
}

#[test]
fn dashed_property_names() {
    assert_eq!(
        dump("Box { font-size = 14 }"),
        "Root\n  Component Box\n    Property font-size = 14\n"
    );
}

#[test]
fn keyword_followed_by_assign_is_a_property() {
    assert_eq!(
        dump(r#"Box { style = "primary" }"#),
        "Root\n  Component Box\n    Property style = \"primary\"\n"
    );
}

#[test]
fn component_arguments_with_and_without_body() {
    assert_eq!(
        dump(
            r#"Row {
    Button("Save")
    Icon(name, 24) { size = 2 }
}"#
        ),
        "Root
  Component Row
    Component Button(\"Save\")
    Component Icon(name, 24)
      Property size = 2
"
    );
}

#[test]
fn for_loop_over_array() {
    let source = "for item in [1, 2, 3] {\n    Text { text = item }\n}";
    assert_eq!(
        dump(source),
        "Root\n  ForLoop item in [1, 2, 3]\n    Component Text\n      Property text = item\n"
    );
}

#[test]
fn for_each_and_variable_named_each() {
    assert_eq!(
        dump("for each row in rows { Item {} }"),
        "Root\n  ForLoop each row in rows\n    Component Item\n"
    );
    assert_eq!(dump("for each in items { }"), "Root\n  ForLoop each in items\n");
    let output = parse_clean("for each in items { }");
    let items = output.ast.items();
    let NodeKind::ForLoop { kind, iterator, .. } = output.ast.node(items[0]).kind else {
        panic!("expected a loop");
    };
    assert_eq!(kind, kry_ir::ForKind::In);
    assert_eq!(output.ast.str(iterator), "each");
}

#[test]
fn for_loop_over_range() {
    assert_eq!(dump("for i in 0..5 { }"), "Root\n  ForLoop i in 0..5\n");
}

#[test]
fn if_else_if_else_chain() {
    let source = "if a { Text {} } else if b { Label {} } else { Button {} }";
    assert_eq!(
        dump(source),
        "Root
  If a
    Component Text
  Else
    If b
      Component Label
    Else
      Component Button
"
    );
}

#[test]
fn else_if_node_is_parented_to_outer_if() {
    let output = parse_clean("if a { } else if b { }");
    let outer = output.ast.items()[0];
    let NodeKind::If { else_branch, .. } = output.ast.node(outer).kind else {
        panic!("expected if");
    };
    let ElseBranch::If(inner) = else_branch else {
        panic!("expected else-if, got {else_branch:?}");
    };
    assert_eq!(output.ast.node(inner).parent, Some(outer));
    assert_eq!(output.ast.node(outer).parent, None);
}

#[test]
fn if_condition_may_be_an_expression() {
    assert_eq!(
        dump("if count > 3 && visible { Text {} }"),
        "Root\n  If {count > 3 && visible}\n    Component Text\n"
    );
}

#[test]
fn state_and_plain_declarations() {
    let source = "state count: int = 0\nconst LIMIT = 10\nlet label: string\nvar ratio = 0.5";
    assert_eq!(
        dump(source),
        "Root
  VarDecl state count: int = 0
  VarDecl const LIMIT = 10
  VarDecl let label: string
  VarDecl var ratio = 0.5
"
    );
    let output = parse_clean("state open: bool = false");
    let NodeKind::VarDecl { qualifier, .. } = output.ast.node(output.ast.items()[0]).kind else {
        panic!("expected declaration");
    };
    assert_eq!(qualifier, VarQualifier::State);
}

#[test]
fn generic_and_optional_type_names() {
    assert_eq!(
        dump("let lookup: Map<string, int[]>? = {}"),
        "Root\n  VarDecl let lookup: Map<string, int[]>? = { }\n"
    );
}

#[test]
fn component_definition_with_params_and_parent() {
    let source =
        "component Card(title: string, width = 200) extends Panel {\n    Text { text = title }\n}";
    assert_eq!(
        dump(source),
        "Root
  Component def Card(title: string, width = 200) param:title param:width=200 extends Panel
    Component Text
      Property text = title
"
    );
}

#[test]
fn component_definition_without_params() {
    assert_eq!(
        dump("component Spacer { height = 8 }"),
        "Root\n  Component def Spacer\n    Property height = 8\n"
    );
}

#[test]
fn function_with_return_value() {
    let source = "function double(x: int) -> int {\n    return x * 2\n}";
    assert_eq!(
        dump(source),
        "Root\n  FunctionDecl double(x) -> int\n    Return {x * 2}\n"
    );
}

#[test]
fn calls_and_path_assignments_inside_functions() {
    let source = r#"func bump() {
    count.value = count.value + 1
    items[0] = "first"
    items.push(4)
    log("bumped")
    delete cache.entry
    return
}"#;
    assert_eq!(
        dump(source),
        "Root
  FunctionDecl bump()
    ExpressionStmt count.value = count.value + 1
    ExpressionStmt items[0] = \"first\"
    ExpressionStmt items.push(4)
    ExpressionStmt log(\"bumped\")
    Delete cache.entry
    Return
"
    );
}

#[test]
fn module_return_exports_names() {
    assert_eq!(
        dump("return { Card, Button }"),
        "Root\n  ModuleReturn { Card, Button }\n"
    );
}

#[test]
fn return_of_object_inside_function_is_a_value() {
    assert_eq!(
        dump("function pair() { return { a: 1 } }"),
        "Root\n  FunctionDecl pair()\n    Return { a: 1 }\n"
    );
}

#[test]
fn imports() {
    let source = concat!(
        "import { Button, Card } from \"./widgets\"\n",
        "import Theme from ui.theme\n",
        "import \"reset\"",
    );
    assert_eq!(
        dump(source),
        "Root
  Import { Button, Card } from \"./widgets\"
  Import Theme from \"ui.theme\"
  Import from \"reset\"
"
    );
}

#[test]
fn struct_declaration_and_instantiation() {
    let source = "struct Point { x: int = 0; y: int }\nPoint { x = 1; y = 2 }";
    assert_eq!(
        dump(source),
        "Root
  StructDecl Point
    field x: int = 0
    field y: int
  StructInst Point
    x = 1
    y = 2
"
    );
}

#[test]
fn struct_literal_in_property_value() {
    let source = "struct Point { x: int }\nShape { origin = Point { x = 3 } }";
    assert_eq!(
        dump(source),
        "Root
  StructDecl Point
    field x: int
  Component Shape
    Property origin = Point { x = 3; }
"
    );
}

#[test]
fn undeclared_name_with_block_is_a_component() {
    assert_eq!(
        dump("Point { x = 1 }"),
        "Root\n  Component Point\n    Property x = 1\n"
    );
}

#[test]
fn style_blocks() {
    let source = "style \".card:hover\" { color = \"#fff\" }\nstyle header { padding = 4 }";
    assert_eq!(
        dump(source),
        "Root
  StyleBlock \".card:hover\"
    Property color = \"#fff\"
  StyleBlock \"header\"
    Property padding = 4
"
    );
}

#[test]
fn static_block() {
    assert_eq!(
        dump("static { Text {} }"),
        "Root\n  StaticBlock\n    Component Text\n"
    );
}

#[test]
fn code_block_is_kept_verbatim() {
    let output = parse_clean("@lua { print(\"}\") }\nText {}");
    assert_eq!(
        output.ast.dump(),
        "Root\n  CodeBlock @lua (12 bytes)\n  Component Text\n"
    );
    let NodeKind::CodeBlock { source, .. } = output.ast.node(output.ast.items()[0]).kind else {
        panic!("expected code block");
    };
    assert_eq!(output.ast.str(source), " print(\"}\") ");
}

#[test]
fn comments_are_ignored() {
    let source = "// header\nText { /* inline */ text = \"x\" // trailing\n}";
    assert_eq!(
        dump(source),
        "Root\n  Component Text\n    Property text = \"x\"\n"
    );
}

#[test]
fn node_positions_are_one_based() {
    let output = parse_clean("\n  Text {\n    text = \"x\"\n  }");
    let component = output.ast.items()[0];
    let node = output.ast.node(component);
    assert_eq!((node.pos.line, node.pos.column), (2, 3));
    let NodeKind::Component { children, .. } = node.kind else {
        panic!("expected component");
    };
    let property = output.ast.node(output.ast.children(children)[0]);
    assert_eq!((property.pos.line, property.pos.column), (3, 5));
    assert_eq!(property.parent, Some(component));
}

#[test]
fn empty_source_is_an_empty_root() {
    assert_eq!(dump(""), "Root\n");
    assert_eq!(dump("  // nothing\n"), "Root\n");
}
