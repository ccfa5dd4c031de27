//! Lowering every dynamic site of a parsed module.

use kry_diagnostic::{Category, Diagnostic, DiagnosticList};
use kry_ir::{Ast, ElseBranch, Name, NodeId, NodeKind, NodeRange, ValueId, RANGE_CONSTRUCTOR};
use kry_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::binding::is_constant;
use crate::{lower_property, lower_value, ConvertError, LowerOptions, PropertyBinding};

/// Where a lowered expression came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SiteKind {
    Property(String),
    ForCollection,
    IfCondition,
    /// Initializer of a declaration or struct-field default.
    Initializer(String),
    Return,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Site {
    pub node: NodeId,
    pub kind: SiteKind,
    pub binding: PropertyBinding,
}

#[derive(Debug, Default)]
pub struct LowerOutput {
    pub sites: Vec<Site>,
    pub diagnostics: DiagnosticList,
}

impl LowerOutput {
    /// Bindings of the properties of `node`, in source order.
    pub fn properties_of(&self, node: NodeId) -> impl Iterator<Item = (&str, &PropertyBinding)> {
        self.sites.iter().filter_map(move |site| match &site.kind {
            SiteKind::Property(name) if site.node == node => Some((name.as_str(), &site.binding)),
            _ => None,
        })
    }
}

/// Lower every value site under the root of `ast`.
///
/// A site that fails to convert records one Conversion diagnostic and is
/// skipped; the walk continues.
#[tracing::instrument(level = "debug", skip_all, fields(mode = ?options.mode))]
pub fn lower_module(ast: &Ast, options: &LowerOptions) -> LowerOutput {
    let mut lowerer = Lowerer {
        ast,
        options,
        scope: Vec::new(),
        output: LowerOutput::default(),
    };
    if let Some(root) = ast.root() {
        lowerer.lower_node(root);
    }
    debug!(
        sites = lowerer.output.sites.len(),
        diagnostics = lowerer.output.diagnostics.len(),
        "lowering finished"
    );
    lowerer.output
}

struct Lowerer<'a> {
    ast: &'a Ast,
    options: &'a LowerOptions,
    /// Names bound by enclosing definitions and loops.
    scope: Vec<String>,
    output: LowerOutput,
}

impl Lowerer<'_> {
    fn lower_list(&mut self, range: NodeRange) {
        for &child in self.ast.children(range) {
            self.lower_node(child);
        }
    }

    fn lower_node(&mut self, id: NodeId) {
        ensure_sufficient_stack(|| self.lower_node_inner(id));
    }

    fn lower_node_inner(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.node(id).kind {
            NodeKind::Root { items } => self.lower_list(items),
            NodeKind::Component {
                params,
                children,
                is_definition,
                ..
            } => {
                let mark = self.scope.len();
                if is_definition {
                    for param in ast.params(params) {
                        if let Some(default) = param.default {
                            self.initializer(id, param.name, default);
                        }
                        self.scope.push(ast.str(param.name).to_owned());
                    }
                }
                self.lower_list(children);
                self.scope.truncate(mark);
            }
            NodeKind::Property { name, value } => {
                let name = ast.str(name);
                match lower_property(ast, name, value, self.options, &self.scope) {
                    Ok(binding) => self.push(id, SiteKind::Property(name.to_owned()), binding),
                    Err(err) => self.conversion_error(id, name, &err),
                }
            }
            NodeKind::VarDecl { name, value, .. } => {
                if let Some(value) = value {
                    self.initializer(id, name, value);
                }
            }
            NodeKind::StaticBlock { children } | NodeKind::StyleBlock { children, .. } => {
                self.lower_list(children);
            }
            NodeKind::ForLoop {
                iterator,
                collection,
                body,
                ..
            } => {
                self.site(id, SiteKind::ForCollection, collection);
                self.scope.push(ast.str(iterator).to_owned());
                self.lower_list(body);
                self.scope.pop();
            }
            NodeKind::If {
                condition,
                then_body,
                else_branch,
            } => {
                self.site(id, SiteKind::IfCondition, condition);
                self.lower_list(then_body);
                match else_branch {
                    ElseBranch::None => {}
                    ElseBranch::Block(block) => self.lower_list(block),
                    ElseBranch::If(nested) => self.lower_node(nested),
                }
            }
            NodeKind::FunctionDecl {
                name, params, body, ..
            } => {
                self.check_reserved(id, name);
                let mark = self.scope.len();
                self.scope
                    .extend(ast.params(params).iter().map(|p| ast.str(p.name).to_owned()));
                self.lower_list(body);
                self.scope.truncate(mark);
            }
            NodeKind::Return { value: Some(value) } => self.site(id, SiteKind::Return, value),
            NodeKind::StructDecl { fields, .. } => {
                for field in ast.fields(fields) {
                    if let Some(default) = field.default {
                        self.initializer(id, field.name, default);
                    }
                }
            }
            NodeKind::StructInst { fields, .. } => {
                for entry in ast.entries(fields) {
                    self.initializer(id, entry.key, entry.value);
                }
            }
            NodeKind::Return { value: None }
            | NodeKind::CodeBlock { .. }
            | NodeKind::ModuleReturn { .. }
            | NodeKind::Import { .. }
            | NodeKind::Delete { .. }
            | NodeKind::ExpressionStmt { .. } => {}
        }
    }

    /// Lower a non-property value. These never get hybrid fallbacks.
    fn site(&mut self, node: NodeId, kind: SiteKind, value: ValueId) {
        match lower_value(self.ast, value) {
            Ok(expr) => {
                let binding = if is_constant(&expr) {
                    PropertyBinding::Static(expr)
                } else {
                    PropertyBinding::Dynamic(expr)
                };
                self.push(node, kind, binding);
            }
            Err(err) => {
                let what = match &kind {
                    SiteKind::Property(name) | SiteKind::Initializer(name) => name.as_str(),
                    SiteKind::ForCollection => "loop collection",
                    SiteKind::IfCondition => "condition",
                    SiteKind::Return => "return value",
                };
                self.conversion_error(node, what, &err);
            }
        }
    }

    fn initializer(&mut self, node: NodeId, name: Name, value: ValueId) {
        let name = self.ast.str(name).to_owned();
        self.site(node, SiteKind::Initializer(name), value);
    }

    fn push(&mut self, node: NodeId, kind: SiteKind, binding: PropertyBinding) {
        self.output.sites.push(Site { node, kind, binding });
    }

    fn conversion_error(&mut self, node: NodeId, what: &str, err: &ConvertError) {
        let node = self.ast.node(node);
        self.output.diagnostics.add(
            Diagnostic::error(Category::Conversion, format!("cannot convert `{what}`: {err}"))
                .at(node.pos, node.span),
        );
    }

    fn check_reserved(&mut self, id: NodeId, name: Name) {
        if self.ast.str(name) == RANGE_CONSTRUCTOR {
            let node = self.ast.node(id);
            self.output.diagnostics.add(
                Diagnostic::error(
                    Category::Validation,
                    format!("`{RANGE_CONSTRUCTOR}` is reserved and cannot be redefined"),
                )
                .at(node.pos, node.span),
            );
        }
    }
}
