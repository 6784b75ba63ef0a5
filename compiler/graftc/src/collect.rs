//! Declaration collection.
//!
//! The single-threaded pass that builds the type-relation engine: every
//! type declaration across every compilation unit is folded into one
//! `TypeForest`, then the forest is sealed. Function signatures resolve
//! against the sealed forest afterwards.
//!
//! Declarations may reference each other in any order (a struct field can
//! name a type declared later, in this unit or another), so collection
//! runs a work-list to a fixpoint: a declaration whose types do not
//! resolve yet is retried after the others; whatever still fails at the
//! fixpoint is an unknown-type error.

use graft_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use graft_ir::{
    Decl, DeclKind, ExprArena, ExprKind, FnDecl, Name, ParsedType, ParsedTypeArg, Span,
    StringInterner, Unit,
};
use graft_types::{
    resolve_parsed_type, DeclareError, Primitives, ResolveError, SealedForest, Type, TypeForest,
    TypeId, TypeLookup, TypePool,
};
use rustc_hash::FxHashMap;
use tracing::{debug, info_span};

/// A resolved function signature.
#[derive(Clone, Debug)]
pub struct FnSig {
    pub name: Name,
    pub generics: Vec<Name>,
    pub params: Vec<(Name, TypeId)>,
    pub ret: TypeId,
    pub span: Span,
}

/// The sealed output of declaration collection, shared read-only by all
/// elaboration workers.
pub struct Declarations {
    pub forest: SealedForest,
    pub functions: FxHashMap<Name, FnSig>,
}

impl Declarations {
    pub fn function(&self, name: Name) -> Option<&FnSig> {
        self.functions.get(&name)
    }
}

/// Lookup that layers a function's generic parameters over the forest.
pub struct ScopedLookup<'a> {
    pub forest: &'a dyn TypeLookup,
    pub params: &'a FxHashMap<Name, TypeId>,
}

impl TypeLookup for ScopedLookup<'_> {
    fn lookup_type(&self, name: Name) -> Option<TypeId> {
        self.params
            .get(&name)
            .copied()
            .or_else(|| self.forest.lookup_type(name))
    }
}

/// Evaluate a const generic argument during collection: integer literals
/// only.
pub(crate) fn const_arg_eval(arena: &ExprArena) -> impl Fn(&ParsedTypeArg) -> Option<i64> + '_ {
    move |arg| match arg {
        ParsedTypeArg::Const(expr) => match arena.expr(*expr).kind {
            ExprKind::Int(v) => Some(v),
            _ => None,
        },
        ParsedTypeArg::Type(_) => None,
    }
}

/// Collect type declarations from all units into a sealed forest and
/// resolve function signatures.
///
/// `units` pairs each parsed unit with its arena; `queues` receives
/// per-unit diagnostics at matching indices.
pub fn collect_declarations(
    units: &[(Unit, ExprArena)],
    queues: &mut [DiagnosticQueue],
    pool: &TypePool,
    interner: &StringInterner,
    primitives: &Primitives,
) -> Declarations {
    let span = info_span!("collect_declarations");
    let _enter = span.enter();

    let mut forest = TypeForest::new();

    let mut pending: Vec<(usize, &Decl)> = Vec::new();
    for (unit_idx, (unit, _)) in units.iter().enumerate() {
        for decl in &unit.decls {
            if !matches!(decl.kind, DeclKind::Fn(_)) {
                pending.push((unit_idx, decl));
            }
        }
    }

    // Fixpoint: declare what resolves, retry the rest.
    loop {
        let mut progressed = false;
        let mut still_pending = Vec::new();

        for (unit_idx, decl) in pending {
            let arena = &units[unit_idx].1;
            match try_declare(decl, &mut forest, pool, interner, primitives, arena) {
                Ok(()) => progressed = true,
                Err(Retry::NotYet) => still_pending.push((unit_idx, decl)),
                Err(Retry::Fatal(diag)) => {
                    progressed = true;
                    queues[unit_idx].push(*diag);
                }
            }
        }

        if still_pending.is_empty() {
            break;
        }
        if !progressed {
            // Whatever is left refers to unknown (or cyclic) types.
            for (unit_idx, decl) in still_pending {
                queues[unit_idx].push(unknown_type_diag(decl));
            }
            break;
        }
        pending = still_pending;
    }

    let forest = forest.seal();
    debug!("type forest sealed");

    // Function signatures resolve against the sealed forest; generic
    // parameters become opaque `Param` types.
    let mut functions = FxHashMap::default();
    for (unit_idx, (unit, arena)) in units.iter().enumerate() {
        for decl in &unit.decls {
            let DeclKind::Fn(f) = &decl.kind else { continue };
            match resolve_signature(f, &forest, pool, interner, primitives, arena) {
                Ok(sig) => {
                    if functions.insert(f.name, sig).is_some() {
                        queues[unit_idx].push(
                            Diagnostic::error(ErrorCode::E2002)
                                .with_message(format!(
                                    "function `{}` is declared more than once",
                                    interner.lookup(f.name)
                                ))
                                .with_label(f.span, "redeclared here"),
                        );
                    }
                }
                Err(err) => queues[unit_idx].push(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(err.to_string())
                        .with_label(f.span, "in this signature"),
                ),
            }
        }
    }

    Declarations { forest, functions }
}

enum Retry {
    /// A referenced type is not declared yet; try again next round.
    NotYet,
    /// A real error (duplicate name, bad const argument).
    Fatal(Box<Diagnostic>),
}

impl Retry {
    fn fatal(diag: Diagnostic) -> Self {
        Retry::Fatal(Box::new(diag))
    }
}

fn resolve_decl_type(
    parsed: &ParsedType,
    decl_span: Span,
    forest: &TypeForest,
    pool: &TypePool,
    interner: &StringInterner,
    primitives: &Primitives,
    arena: &ExprArena,
) -> Result<TypeId, Retry> {
    resolve_parsed_type(
        parsed,
        forest,
        primitives,
        pool,
        interner,
        &const_arg_eval(arena),
    )
    .map_err(|err| match err {
        ResolveError::UnknownType { .. } => Retry::NotYet,
        ResolveError::UnsupportedConstArg => Retry::fatal(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(err.to_string())
                .with_label(decl_span, "in this declaration"),
        ),
    })
}

fn try_declare(
    decl: &Decl,
    forest: &mut TypeForest,
    pool: &TypePool,
    interner: &StringInterner,
    primitives: &Primitives,
    arena: &ExprArena,
) -> Result<(), Retry> {
    // Resolve every referenced type before touching the forest, so a
    // deferred declaration leaves no partial state behind.
    macro_rules! resolve {
        ($parsed:expr) => {
            resolve_decl_type($parsed, decl.span, forest, pool, interner, primitives, arena)?
        };
    }

    let result = match &decl.kind {
        DeclKind::Newtype { name, underlying } => {
            let underlying = resolve!(underlying);
            forest.declare_newtype(*name, underlying, pool)
        }
        DeclKind::Subtype { name, parent } => {
            let parent = resolve!(parent);
            forest.declare_subtype(*name, parent, pool)
        }
        DeclKind::Struct { name, fields } => {
            let mut resolved = Vec::with_capacity(fields.len());
            for field in fields {
                resolved.push((field.name, resolve!(&field.ty)));
            }
            let inline = pool.intern(Type::Struct(resolved));
            forest.declare_aggregate(*name, inline, pool)
        }
        DeclKind::TupleStruct { name, elems } => {
            let mut resolved = Vec::with_capacity(elems.len());
            for elem in elems {
                resolved.push(resolve!(elem));
            }
            let inline = pool.intern(Type::Tuple(resolved));
            forest.declare_aggregate(*name, inline, pool)
        }
        DeclKind::Enum { name, variants } => {
            let inline = pool.intern(Type::Enum(
                variants.iter().map(|v| (v.name, v.value)).collect(),
            ));
            forest.declare_aggregate(*name, inline, pool)
        }
        DeclKind::Sum { name, variants } => {
            let mut resolved = Vec::with_capacity(variants.len());
            for variant in variants {
                let payload = match &variant.payload {
                    Some(parsed) => Some(resolve!(parsed)),
                    None => None,
                };
                resolved.push((variant.name, payload));
            }
            let inline = pool.intern(Type::Sum(resolved));
            forest.declare_aggregate(*name, inline, pool)
        }
        DeclKind::Union { name, fields } => {
            let mut resolved = Vec::with_capacity(fields.len());
            for field in fields {
                resolved.push((field.name, resolve!(&field.ty)));
            }
            let inline = pool.intern(Type::Union(resolved));
            forest.declare_aggregate(*name, inline, pool)
        }
        DeclKind::Fn(_) => unreachable!("functions are collected separately"),
    };

    result.map(|_| ()).map_err(|err| {
        let DeclareError::DuplicateTypeName { name } = err;
        Retry::fatal(
            Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "type `{}` is declared more than once",
                    interner.lookup(name)
                ))
                .with_label(decl.span, "redeclared here"),
        )
    })
}

fn unknown_type_diag(decl: &Decl) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("declaration references an unknown or cyclic type")
        .with_label(decl.span, "could not resolve")
}

fn resolve_signature(
    f: &FnDecl,
    forest: &SealedForest,
    pool: &TypePool,
    interner: &StringInterner,
    primitives: &Primitives,
    arena: &ExprArena,
) -> Result<FnSig, ResolveError> {
    let mut params_map = FxHashMap::default();
    for &generic in &f.generics {
        params_map.insert(generic, pool.intern(Type::Param(generic)));
    }
    let lookup = ScopedLookup {
        forest,
        params: &params_map,
    };

    let mut params = Vec::with_capacity(f.params.len());
    for (pname, pty) in &f.params {
        let ty = resolve_parsed_type(
            pty,
            &lookup,
            primitives,
            pool,
            interner,
            &const_arg_eval(arena),
        )?;
        params.push((*pname, ty));
    }
    let ret = match &f.ret {
        Some(parsed) => resolve_parsed_type(
            parsed,
            &lookup,
            primitives,
            pool,
            interner,
            &const_arg_eval(arena),
        )?,
        None => TypePool::UNIT,
    };

    Ok(FnSig {
        name: f.name,
        generics: f.generics.clone(),
        params,
        ret,
        span: f.span,
    })
}
