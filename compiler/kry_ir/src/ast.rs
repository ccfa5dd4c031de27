//! Flat syntax tree for KRY source.
//!
//! Nodes and values live in vectors owned by [`Ast`] and refer to each other
//! through [`NodeId`]/[`ValueId`] handles. Child lists are contiguous slices of
//! shared side tables addressed by [`ListRange`]. All strings are [`Name`]s in
//! the tree's [`StringArena`]; dropping the `Ast` frees everything at once.

mod dump;
mod value;

use std::fmt;
use std::marker::PhantomData;

use crate::arena::{Name, StringArena};
use crate::span::{LineCol, Span};

pub use value::{Entry, Value};

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// Handle to a [`Node`] in an [`Ast`].
    NodeId
);
define_index!(
    /// Handle to a [`Value`] in an [`Ast`].
    ValueId
);

/// Contiguous run of items in one of the [`Ast`] side tables.
pub struct ListRange<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListRange<T> {
    pub const EMPTY: Self = ListRange {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn as_range(self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + self.len as usize
    }
}

impl<T> Clone for ListRange<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ListRange<T> {}

impl<T> PartialEq for ListRange<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for ListRange<T> {}

impl<T> Default for ListRange<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> fmt::Debug for ListRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}; {}]", self.start, self.len)
    }
}

pub type NodeRange = ListRange<NodeId>;
pub type ValueRange = ListRange<ValueId>;
pub type EntryRange = ListRange<Entry>;
pub type ParamRange = ListRange<Param>;
pub type FieldRange = ListRange<StructField>;
pub type NameRange = ListRange<Name>;

/// Storage class of a variable declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarQualifier {
    Const,
    Let,
    Var,
    /// Reactive component state (`state count: int = 0`).
    State,
}

impl VarQualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            VarQualifier::Const => "const",
            VarQualifier::Let => "let",
            VarQualifier::Var => "var",
            VarQualifier::State => "state",
        }
    }
}

/// `for x in xs` versus `for each x in xs`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ForKind {
    In,
    Each,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ElseBranch {
    None,
    Block(NodeRange),
    /// `else if ...`, always an [`NodeKind::If`] node.
    If(NodeId),
}

/// Parameter of a component definition or function.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Option<Name>,
    pub default: Option<ValueId>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct StructField {
    pub name: Name,
    pub ty: Option<Name>,
    pub default: Option<ValueId>,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum NodeKind {
    /// Synthetic top-level container. Never a child.
    Root { items: NodeRange },
    Component {
        name: Name,
        /// Raw argument text of `Name(args) { ... }`.
        args: Option<Name>,
        params: ParamRange,
        children: NodeRange,
        is_definition: bool,
        extends: Option<Name>,
    },
    Property {
        name: Name,
        value: ValueId,
    },
    VarDecl {
        name: Name,
        ty: Option<Name>,
        value: Option<ValueId>,
        qualifier: VarQualifier,
    },
    StaticBlock {
        children: NodeRange,
    },
    ForLoop {
        kind: ForKind,
        iterator: Name,
        collection: ValueId,
        body: NodeRange,
    },
    If {
        condition: ValueId,
        then_body: NodeRange,
        else_branch: ElseBranch,
    },
    StyleBlock {
        selector: Name,
        children: NodeRange,
    },
    CodeBlock {
        language: Name,
        source: Name,
    },
    FunctionDecl {
        name: Name,
        params: ParamRange,
        return_type: Option<Name>,
        body: NodeRange,
    },
    Return {
        value: Option<ValueId>,
    },
    ModuleReturn {
        exports: NameRange,
    },
    Import {
        names: NameRange,
        module: Name,
        destructured: bool,
    },
    StructDecl {
        name: Name,
        fields: FieldRange,
    },
    StructInst {
        type_name: Name,
        fields: EntryRange,
    },
    Delete {
        target: Name,
    },
    /// Path assignment, indexed assignment or call statement kept as text.
    ExpressionStmt {
        expr: Name,
    },
}

impl NodeKind {
    /// Short tag used in dumps and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Root { .. } => "Root",
            NodeKind::Component { .. } => "Component",
            NodeKind::Property { .. } => "Property",
            NodeKind::VarDecl { .. } => "VarDecl",
            NodeKind::StaticBlock { .. } => "StaticBlock",
            NodeKind::ForLoop { .. } => "ForLoop",
            NodeKind::If { .. } => "If",
            NodeKind::StyleBlock { .. } => "StyleBlock",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::FunctionDecl { .. } => "FunctionDecl",
            NodeKind::Return { .. } => "Return",
            NodeKind::ModuleReturn { .. } => "ModuleReturn",
            NodeKind::Import { .. } => "Import",
            NodeKind::StructDecl { .. } => "StructDecl",
            NodeKind::StructInst { .. } => "StructInst",
            NodeKind::Delete { .. } => "Delete",
            NodeKind::ExpressionStmt { .. } => "ExpressionStmt",
        }
    }

    /// Every child list this node owns, in source order.
    pub fn child_lists(&self) -> impl Iterator<Item = NodeRange> {
        let lists: [Option<NodeRange>; 2] = match *self {
            NodeKind::Root { items } => [Some(items), None],
            NodeKind::Component { children, .. }
            | NodeKind::StaticBlock { children }
            | NodeKind::StyleBlock { children, .. } => [Some(children), None],
            NodeKind::ForLoop { body, .. } | NodeKind::FunctionDecl { body, .. } => {
                [Some(body), None]
            }
            NodeKind::If {
                then_body,
                else_branch,
                ..
            } => match else_branch {
                ElseBranch::Block(block) => [Some(then_body), Some(block)],
                ElseBranch::None | ElseBranch::If(_) => [Some(then_body), None],
            },
            _ => [None, None],
        };
        lists.into_iter().flatten()
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub pos: LineCol,
    pub parent: Option<NodeId>,
}

/// Owner of every node, value and string produced by one parse.
#[derive(Default)]
pub struct Ast {
    strings: StringArena,
    nodes: Vec<Node>,
    values: Vec<Value>,
    node_lists: Vec<NodeId>,
    value_lists: Vec<ValueId>,
    entries: Vec<Entry>,
    params: Vec<Param>,
    fields: Vec<StructField>,
    names: Vec<Name>,
    root: Option<NodeId>,
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "table sizes are bounded by source length, far below u32::MAX"
)]
fn list_range<T, U>(table: &mut Vec<T>, items: &[T]) -> ListRange<U>
where
    T: Copy,
{
    if items.is_empty() {
        return ListRange::EMPTY;
    }
    let start = table.len() as u32;
    table.extend_from_slice(items);
    ListRange {
        start,
        len: items.len() as u32,
        _marker: PhantomData,
    }
}

fn slice_of<T, U>(table: &[T], range: ListRange<U>) -> &[T] {
    table.get(range.as_range()).unwrap_or(&[])
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Name {
        self.strings.alloc(s)
    }

    #[inline]
    pub fn str(&self, name: Name) -> &str {
        self.strings.get(name)
    }

    pub fn strings(&self) -> &StringArena {
        &self.strings
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "node count is bounded by source length"
    )]
    pub fn alloc_node(&mut self, kind: NodeKind, span: Span, pos: LineCol) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            pos,
            parent: None,
        });
        id
    }

    /// Replace the kind of an existing node, keeping its location.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.kind = kind;
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "value count is bounded by source length"
    )]
    pub fn alloc_value(&mut self, value: Value) -> ValueId {
        let id = ValueId::new(self.values.len() as u32);
        self.values.push(value);
        id
    }

    #[inline]
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    /// Record `children` as the child list of `parent`.
    ///
    /// Sets the parent link on each child; a node that already has a parent
    /// keeps it, so a node can never be listed under two parents.
    pub fn alloc_children(&mut self, parent: NodeId, children: &[NodeId]) -> NodeRange {
        let mut owned: Vec<NodeId> = Vec::with_capacity(children.len());
        for &child in children {
            if let Some(node) = self.nodes.get_mut(child.index()) {
                if node.parent.is_none() && child != parent {
                    node.parent = Some(parent);
                    owned.push(child);
                }
            }
        }
        list_range(&mut self.node_lists, &owned)
    }

    /// Link a single child outside any child list (an `else if` branch).
    /// Returns `false` if `child` already has a parent.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.nodes.get_mut(child.index()) {
            Some(node) if node.parent.is_none() && child != parent => {
                node.parent = Some(parent);
                true
            }
            _ => false,
        }
    }

    pub fn children(&self, range: NodeRange) -> &[NodeId] {
        slice_of(&self.node_lists, range)
    }

    pub fn alloc_values(&mut self, values: &[ValueId]) -> ValueRange {
        list_range(&mut self.value_lists, values)
    }

    pub fn values(&self, range: ValueRange) -> &[ValueId] {
        slice_of(&self.value_lists, range)
    }

    pub fn alloc_entries(&mut self, entries: &[Entry]) -> EntryRange {
        list_range(&mut self.entries, entries)
    }

    pub fn entries(&self, range: EntryRange) -> &[Entry] {
        slice_of(&self.entries, range)
    }

    pub fn alloc_params(&mut self, params: &[Param]) -> ParamRange {
        list_range(&mut self.params, params)
    }

    pub fn params(&self, range: ParamRange) -> &[Param] {
        slice_of(&self.params, range)
    }

    pub fn alloc_fields(&mut self, fields: &[StructField]) -> FieldRange {
        list_range(&mut self.fields, fields)
    }

    pub fn fields(&self, range: FieldRange) -> &[StructField] {
        slice_of(&self.fields, range)
    }

    pub fn alloc_names(&mut self, names: &[Name]) -> NameRange {
        list_range(&mut self.names, names)
    }

    pub fn names(&self, range: NameRange) -> &[Name] {
        slice_of(&self.names, range)
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Top-level items under the root, in source order.
    pub fn items(&self) -> &[NodeId] {
        match self.root.map(|root| self.node(root).kind) {
            Some(NodeKind::Root { items }) => self.children(items),
            _ => &[],
        }
    }
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("nodes", &self.nodes.len())
            .field("values", &self.values.len())
            .field("strings", &self.strings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
