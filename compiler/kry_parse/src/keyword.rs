//! Statement keywords.
//!
//! A statement starts with one identifier, which is looked up here. Keywords
//! are contextual: `style = "x"` is still a property, because a keyword is
//! only treated as one when it is not directly assigned to.

use kry_ir::VarQualifier;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Keyword {
    Decl(VarQualifier),
    Static,
    For,
    If,
    Style,
    Component,
    Function,
    Struct,
    Import,
    Return,
    Delete,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("state", Keyword::Decl(VarQualifier::State)),
    ("const", Keyword::Decl(VarQualifier::Const)),
    ("let", Keyword::Decl(VarQualifier::Let)),
    ("var", Keyword::Decl(VarQualifier::Var)),
    ("static", Keyword::Static),
    ("for", Keyword::For),
    ("if", Keyword::If),
    ("style", Keyword::Style),
    ("component", Keyword::Component),
    ("function", Keyword::Function),
    ("func", Keyword::Function),
    ("struct", Keyword::Struct),
    ("import", Keyword::Import),
    ("return", Keyword::Return),
    ("delete", Keyword::Delete),
];

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|&(_, keyword)| keyword)
    }

    /// Keywords that open control flow. A brace body starting with one of
    /// these is a statement block, never a struct literal.
    pub fn is_control(word: &str) -> bool {
        matches!(
            Keyword::lookup(word),
            Some(Keyword::For | Keyword::If | Keyword::Return | Keyword::Delete)
        ) || word == "else"
    }
}
