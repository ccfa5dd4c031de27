use kry_ir::{BinaryOp, BuiltinFn, Callee, IrArrowBody, IrExpr, UnaryOp};
use kry_parse::parse_expression;
use pretty_assertions::assert_eq;

use super::lower_expr;
use crate::ConvertError;

fn lower(text: &str) -> Result<IrExpr, ConvertError> {
    let tree = parse_expression(text).unwrap_or_else(|err| panic!("`{text}`: {err}"));
    lower_expr(&tree)
}

fn lowered(text: &str) -> IrExpr {
    lower(text).unwrap_or_else(|err| panic!("`{text}`: {err}"))
}

#[test]
fn literals_map_one_to_one() {
    assert_eq!(lowered("42"), IrExpr::int(42));
    assert_eq!(lowered("2.5"), IrExpr::float(2.5));
    assert_eq!(lowered("'hi'"), IrExpr::string("hi"));
    assert_eq!(lowered("true"), IrExpr::bool(true));
    assert_eq!(lowered("null"), IrExpr::null());
}

#[test]
fn identifiers_become_variables() {
    assert_eq!(lowered("count"), IrExpr::var("count"));
}

#[test]
fn operators_keep_their_shape() {
    assert_eq!(
        lowered("-a + b * 2"),
        IrExpr::binary(
            BinaryOp::Add,
            IrExpr::unary(UnaryOp::Neg, IrExpr::var("a")),
            IrExpr::binary(BinaryOp::Mul, IrExpr::var("b"), IrExpr::int(2)),
        )
    );
    assert_eq!(
        lowered("typeof x"),
        IrExpr::unary(UnaryOp::TypeOf, IrExpr::var("x"))
    );
}

#[test]
fn assignment_is_rejected() {
    assert_eq!(lower("a = 1"), Err(ConvertError::Assignment));
    assert_eq!(lower("[1, b = 2]"), Err(ConvertError::Assignment));
}

#[test]
fn access_forms() {
    assert_eq!(
        lowered("user.name"),
        IrExpr::Property {
            object: Box::new(IrExpr::var("user")),
            name: "name".to_owned(),
        }
    );
    assert_eq!(
        lowered("row[\"id\"]"),
        IrExpr::Property {
            object: Box::new(IrExpr::var("row")),
            name: "id".to_owned(),
        }
    );
    assert_eq!(
        lowered("items[i + 1]"),
        IrExpr::Index {
            object: Box::new(IrExpr::var("items")),
            index: Box::new(IrExpr::binary(
                BinaryOp::Add,
                IrExpr::var("i"),
                IrExpr::int(1)
            )),
        }
    );
}

#[test]
fn call_names_resolve_once() {
    assert_eq!(
        lowered("string_toUpper(name)"),
        IrExpr::call(
            Callee::Builtin(BuiltinFn::StringToUpper),
            vec![IrExpr::var("name")]
        )
    );
    assert_eq!(
        lowered("format(a)"),
        IrExpr::call(Callee::Named("format".to_owned()), vec![IrExpr::var("a")])
    );
    assert_eq!(
        lowered("__range__(0, 3)"),
        IrExpr::call(Callee::Range, vec![IrExpr::int(0), IrExpr::int(3)])
    );
}

#[test]
fn member_calls_become_method_calls() {
    assert_eq!(
        lowered("items.join(\", \")"),
        IrExpr::MethodCall {
            receiver: Box::new(IrExpr::var("items")),
            method: "join".to_owned(),
            args: vec![IrExpr::string(", ")],
        }
    );
}

#[test]
fn calling_a_call_result_is_unsupported() {
    assert_eq!(
        lower("make(1)(2)"),
        Err(ConvertError::UnsupportedCallee("make(1)".to_owned()))
    );
}

#[test]
fn collections_and_arrows() {
    assert_eq!(
        lowered("{ a: [1, x] }"),
        IrExpr::Object(vec![(
            "a".to_owned(),
            IrExpr::Array(vec![IrExpr::int(1), IrExpr::var("x")])
        )])
    );
    assert_eq!(
        lowered("(a, b) => a + b"),
        IrExpr::Arrow {
            params: vec!["a".to_owned(), "b".to_owned()],
            body: IrArrowBody::Expr(Box::new(IrExpr::binary(
                BinaryOp::Add,
                IrExpr::var("a"),
                IrExpr::var("b")
            ))),
        }
    );
    assert_eq!(
        lowered("() => { count = count + 1 }"),
        IrExpr::Arrow {
            params: Vec::new(),
            body: IrArrowBody::Block("count = count + 1".to_owned()),
        }
    );
}

#[test]
fn conditional_becomes_ternary() {
    assert_eq!(
        lowered("ok ? 1 : 2"),
        IrExpr::Ternary {
            condition: Box::new(IrExpr::var("ok")),
            then_expr: Box::new(IrExpr::int(1)),
            else_expr: Box::new(IrExpr::int(2)),
        }
    );
}

#[test]
fn templates_become_concatenation_chains() {
    assert_eq!(
        lowered("`Hi ${name}!`"),
        IrExpr::binary(
            BinaryOp::Add,
            IrExpr::binary(BinaryOp::Add, IrExpr::string("Hi "), IrExpr::var("name")),
            IrExpr::string("!"),
        )
    );
    assert_eq!(
        lowered("`${n}`"),
        IrExpr::binary(BinaryOp::Add, IrExpr::string(""), IrExpr::var("n"))
    );
    assert_eq!(lowered("``"), IrExpr::string(""));
}
