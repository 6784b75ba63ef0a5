//! Top-level declarations and the compilation unit.

use crate::{ExprId, Name, ParsedType, Span, Spanned};

/// A parsed compilation unit: the declarations of one source file.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Unit {
    pub decls: Vec<Decl>,
}

impl Unit {
    pub fn new() -> Self {
        Unit { decls: Vec::new() }
    }

    /// All function declarations, for per-function elaboration.
    pub fn functions(&self) -> impl Iterator<Item = &FnDecl> {
        self.decls.iter().filter_map(|d| match &d.kind {
            DeclKind::Fn(f) => Some(f),
            _ => None,
        })
    }
}

/// A top-level declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

impl Spanned for Decl {
    fn span(&self) -> Span {
        self.span
    }
}

/// A named field of a struct or union declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub span: Span,
}

/// A case of a `sum` declaration, with optional payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SumVariantDecl {
    pub name: Name,
    pub payload: Option<ParsedType>,
    pub span: Span,
}

/// A case of an `enum` declaration with its integral value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumVariantDecl {
    pub name: Name,
    pub value: i64,
    pub span: Span,
}

/// A function declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FnDecl {
    pub name: Name,
    pub generics: Vec<Name>,
    pub params: Vec<(Name, ParsedType)>,
    pub ret: Option<ParsedType>,
    /// Body block expression.
    pub body: ExprId,
    pub span: Span,
}

/// Declaration variants.
///
/// `newtype` inserts a name into an existing type set; `subtype` starts a
/// new child set. Every named aggregate is sugar for a `newtype` over its
/// freshly built inline structural type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// `newtype Name = T`
    Newtype { name: Name, underlying: ParsedType },

    /// `subtype Name = T`
    Subtype { name: Name, parent: ParsedType },

    /// `struct Name { fields }`
    Struct {
        name: Name,
        fields: Vec<FieldDecl>,
    },

    /// `tuple Name = (T1, T2)`
    TupleStruct { name: Name, elems: Vec<ParsedType> },

    /// `enum Name { Case = 0, ... }`
    Enum {
        name: Name,
        variants: Vec<EnumVariantDecl>,
    },

    /// `sum Name { Case(T) | Other }`
    Sum {
        name: Name,
        variants: Vec<SumVariantDecl>,
    },

    /// `union Name { fields }`
    Union {
        name: Name,
        fields: Vec<FieldDecl>,
    },

    /// `fn name(params) -> T { body }`
    Fn(FnDecl),
}
