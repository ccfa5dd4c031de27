//! Indented text rendering of a syntax tree, used by `kryc parse` and tests.

use std::fmt::Write;

use super::{Ast, ElseBranch, ForKind, NodeId, NodeKind, NodeRange, Value, ValueId};

impl Ast {
    /// Render the whole tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            self.dump_node(&mut out, root, 0);
        }
        out
    }

    /// Render a single value in source-like form.
    pub fn display_value(&self, id: ValueId) -> String {
        let mut out = String::new();
        self.write_value(&mut out, id);
        out
    }

    fn dump_list(&self, out: &mut String, range: NodeRange, depth: usize) {
        for &child in self.children(range) {
            self.dump_node(out, child, depth);
        }
    }

    fn dump_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        let node = self.node(id);
        let _ = write!(out, "{indent}{}", node.kind.tag());

        match node.kind {
            NodeKind::Root { items } => {
                out.push('\n');
                self.dump_list(out, items, depth + 1);
            }
            NodeKind::Component {
                name,
                args,
                params,
                children,
                is_definition,
                extends,
            } => {
                if is_definition {
                    out.push_str(" def");
                }
                let _ = write!(out, " {}", self.str(name));
                if let Some(args) = args {
                    let _ = write!(out, "({})", self.str(args));
                }
                for param in self.params(params) {
                    let _ = write!(out, " param:{}", self.str(param.name));
                    if let Some(default) = param.default {
                        out.push('=');
                        self.write_value(out, default);
                    }
                }
                if let Some(parent) = extends {
                    let _ = write!(out, " extends {}", self.str(parent));
                }
                out.push('\n');
                self.dump_list(out, children, depth + 1);
            }
            NodeKind::Property { name, value } => {
                let _ = write!(out, " {} = ", self.str(name));
                self.write_value(out, value);
                out.push('\n');
            }
            NodeKind::VarDecl {
                name,
                ty,
                value,
                qualifier,
            } => {
                let _ = write!(out, " {} {}", qualifier.as_str(), self.str(name));
                if let Some(ty) = ty {
                    let _ = write!(out, ": {}", self.str(ty));
                }
                if let Some(value) = value {
                    out.push_str(" = ");
                    self.write_value(out, value);
                }
                out.push('\n');
            }
            NodeKind::StaticBlock { children } => {
                out.push('\n');
                self.dump_list(out, children, depth + 1);
            }
            NodeKind::ForLoop {
                kind,
                iterator,
                collection,
                body,
            } => {
                if kind == ForKind::Each {
                    out.push_str(" each");
                }
                let _ = write!(out, " {} in ", self.str(iterator));
                self.write_value(out, collection);
                out.push('\n');
                self.dump_list(out, body, depth + 1);
            }
            NodeKind::If {
                condition,
                then_body,
                else_branch,
            } => {
                out.push(' ');
                self.write_value(out, condition);
                out.push('\n');
                self.dump_list(out, then_body, depth + 1);
                match else_branch {
                    ElseBranch::None => {}
                    ElseBranch::Block(block) => {
                        let _ = writeln!(out, "{indent}Else");
                        self.dump_list(out, block, depth + 1);
                    }
                    ElseBranch::If(nested) => {
                        let _ = writeln!(out, "{indent}Else");
                        self.dump_node(out, nested, depth + 1);
                    }
                }
            }
            NodeKind::StyleBlock { selector, children } => {
                let _ = writeln!(out, " {:?}", self.str(selector));
                self.dump_list(out, children, depth + 1);
            }
            NodeKind::CodeBlock { language, source } => {
                let _ = writeln!(
                    out,
                    " @{} ({} bytes)",
                    self.str(language),
                    self.str(source).len()
                );
            }
            NodeKind::FunctionDecl {
                name,
                params,
                return_type,
                body,
            } => {
                let names: Vec<&str> = self
                    .params(params)
                    .iter()
                    .map(|param| self.str(param.name))
                    .collect();
                let _ = write!(out, " {}({})", self.str(name), names.join(", "));
                if let Some(ret) = return_type {
                    let _ = write!(out, " -> {}", self.str(ret));
                }
                out.push('\n');
                self.dump_list(out, body, depth + 1);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    out.push(' ');
                    self.write_value(out, value);
                }
                out.push('\n');
            }
            NodeKind::ModuleReturn { exports } => {
                let names: Vec<&str> = self
                    .names(exports)
                    .iter()
                    .map(|&name| self.str(name))
                    .collect();
                let _ = writeln!(out, " {{ {} }}", names.join(", "));
            }
            NodeKind::Import {
                names,
                module,
                destructured,
            } => {
                let names: Vec<&str> = self
                    .names(names)
                    .iter()
                    .map(|&name| self.str(name))
                    .collect();
                if destructured {
                    let _ = write!(out, " {{ {} }}", names.join(", "));
                } else if !names.is_empty() {
                    let _ = write!(out, " {}", names.join(", "));
                }
                let _ = writeln!(out, " from {:?}", self.str(module));
            }
            NodeKind::StructDecl { name, fields } => {
                let _ = writeln!(out, " {}", self.str(name));
                for field in self.fields(fields) {
                    let _ = write!(out, "{indent}  field {}", self.str(field.name));
                    if let Some(ty) = field.ty {
                        let _ = write!(out, ": {}", self.str(ty));
                    }
                    if let Some(default) = field.default {
                        out.push_str(" = ");
                        self.write_value(out, default);
                    }
                    out.push('\n');
                }
            }
            NodeKind::StructInst { type_name, fields } => {
                let _ = writeln!(out, " {}", self.str(type_name));
                for entry in self.entries(fields) {
                    let _ = write!(out, "{indent}  {} = ", self.str(entry.key));
                    self.write_value(out, entry.value);
                    out.push('\n');
                }
            }
            NodeKind::Delete { target } => {
                let _ = writeln!(out, " {}", self.str(target));
            }
            NodeKind::ExpressionStmt { expr } => {
                let _ = writeln!(out, " {}", self.str(expr));
            }
        }
    }

    fn write_value(&self, out: &mut String, id: ValueId) {
        match *self.value(id) {
            Value::String(s) => {
                let _ = write!(out, "{:?}", self.str(s));
            }
            Value::Number {
                value,
                is_percentage,
            } => {
                let _ = write!(out, "{value}");
                if is_percentage {
                    out.push('%');
                }
            }
            Value::Identifier(name) => out.push_str(self.str(name)),
            Value::Expression(text) => {
                let _ = write!(out, "{{{}}}", self.str(text));
            }
            Value::Array(items) => {
                out.push('[');
                for (i, &item) in self.values(items).iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, item);
                }
                out.push(']');
            }
            Value::Object(entries) => {
                out.push('{');
                for (i, entry) in self.entries(entries).iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, " {}: ", self.str(entry.key));
                    self.write_value(out, entry.value);
                }
                out.push_str(" }");
            }
            Value::StructInstance { type_name, fields } => {
                let _ = write!(out, "{} {{", self.str(type_name));
                for entry in self.entries(fields) {
                    let _ = write!(out, " {} = ", self.str(entry.key));
                    self.write_value(out, entry.value);
                    out.push(';');
                }
                out.push_str(" }");
            }
            Value::Range { start, end } => {
                self.write_value(out, start);
                out.push_str("..");
                self.write_value(out, end);
            }
        }
    }
}
