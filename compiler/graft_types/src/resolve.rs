//! Resolution of syntactic types to semantic types.
//!
//! Maps `ParsedType` trees from the parser onto interned `TypeId`s, looking
//! declared names up in the forest. Used both during declaration collection
//! (against the growing `TypeForest`) and during elaboration (against the
//! sealed forest), so lookup goes through the [`TypeLookup`] trait.

use graft_ir::{Name, ParsedType, ParsedTypeArg, StringInterner};
use thiserror::Error;

use crate::forest::{SealedForest, TypeForest};
use crate::pool::TypePool;
use crate::ty::{GenArg, Type, TypeId};

/// Name lookup over either forest state.
pub trait TypeLookup {
    fn lookup_type(&self, name: Name) -> Option<TypeId>;
}

impl TypeLookup for TypeForest {
    fn lookup_type(&self, name: Name) -> Option<TypeId> {
        self.lookup(name)
    }
}

impl TypeLookup for SealedForest {
    fn lookup_type(&self, name: Name) -> Option<TypeId> {
        self.lookup(name)
    }
}

/// Type resolution failures.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum ResolveError {
    #[error("unknown type name `{name}`")]
    UnknownType { name: String },

    #[error("const generic arguments must be integer literals here")]
    UnsupportedConstArg,
}

/// Pre-interned primitive type names.
pub struct Primitives {
    entries: Vec<(Name, TypeId)>,
}

impl Primitives {
    /// Intern the primitive names once per compilation.
    pub fn intern(interner: &StringInterner) -> Self {
        let entries = vec![
            (interner.intern("i8"), TypePool::I8),
            (interner.intern("i16"), TypePool::I16),
            (interner.intern("i32"), TypePool::I32),
            (interner.intern("i64"), TypePool::I64),
            (interner.intern("u8"), TypePool::U8),
            (interner.intern("u16"), TypePool::U16),
            (interner.intern("u32"), TypePool::U32),
            (interner.intern("u64"), TypePool::U64),
            (interner.intern("f32"), TypePool::F32),
            (interner.intern("f64"), TypePool::F64),
            (interner.intern("bool"), TypePool::BOOL),
            (interner.intern("char"), TypePool::CHAR),
        ];
        Primitives { entries }
    }

    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.entries
            .iter()
            .find(|&&(n, _)| n == name)
            .map(|&(_, id)| id)
    }
}

/// Resolve a parsed type expression to an interned semantic type.
///
/// Const generic arguments are restricted to what declaration collection
/// can evaluate: integer literals. Richer const evaluation is a later
/// phase's concern.
pub fn resolve_parsed_type(
    parsed: &ParsedType,
    lookup: &dyn TypeLookup,
    primitives: &Primitives,
    pool: &TypePool,
    interner: &StringInterner,
    const_eval: &dyn Fn(&ParsedTypeArg) -> Option<i64>,
) -> Result<TypeId, ResolveError> {
    match parsed {
        ParsedType::Named { name, args } => {
            let base = primitives
                .lookup(*name)
                .or_else(|| lookup.lookup_type(*name))
                .ok_or_else(|| ResolveError::UnknownType {
                    name: interner.lookup(*name).to_owned(),
                })?;
            if args.is_empty() {
                return Ok(base);
            }
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    ParsedTypeArg::Type(ty) => {
                        resolved.push(GenArg::Type(resolve_parsed_type(
                            ty, lookup, primitives, pool, interner, const_eval,
                        )?));
                    }
                    ParsedTypeArg::Const(_) => {
                        let value =
                            const_eval(arg).ok_or(ResolveError::UnsupportedConstArg)?;
                        resolved.push(GenArg::Const(value));
                    }
                }
            }
            Ok(pool.intern(Type::Instance {
                base,
                args: resolved,
            }))
        }
        ParsedType::Ptr(target) => {
            let target =
                resolve_parsed_type(target, lookup, primitives, pool, interner, const_eval)?;
            Ok(pool.intern(Type::Ptr(target)))
        }
        ParsedType::RawPtr => Ok(TypePool::RAWPTR),
        ParsedType::Array { elem, len } => {
            let elem = resolve_parsed_type(elem, lookup, primitives, pool, interner, const_eval)?;
            Ok(pool.intern(Type::Array { elem, len: *len }))
        }
        ParsedType::Slice(elem) => {
            let elem = resolve_parsed_type(elem, lookup, primitives, pool, interner, const_eval)?;
            Ok(pool.intern(Type::Slice(elem)))
        }
        ParsedType::Tuple(elems) => {
            let elems = elems
                .iter()
                .map(|e| resolve_parsed_type(e, lookup, primitives, pool, interner, const_eval))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(pool.intern(Type::Tuple(elems)))
        }
        ParsedType::Unit => Ok(TypePool::UNIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_consts(_: &ParsedTypeArg) -> Option<i64> {
        None
    }

    #[test]
    fn test_resolve_primitives() {
        let interner = StringInterner::new();
        let pool = TypePool::new();
        let forest = TypeForest::new();
        let primitives = Primitives::intern(&interner);

        let parsed = ParsedType::name(interner.intern("i32"));
        let resolved = resolve_parsed_type(
            &parsed,
            &forest,
            &primitives,
            &pool,
            &interner,
            &no_consts,
        )
        .unwrap();
        assert_eq!(resolved, TypePool::I32);
    }

    #[test]
    fn test_resolve_compound() {
        let interner = StringInterner::new();
        let pool = TypePool::new();
        let forest = TypeForest::new();
        let primitives = Primitives::intern(&interner);

        let parsed = ParsedType::Ptr(Box::new(ParsedType::Array {
            elem: Box::new(ParsedType::name(interner.intern("u8"))),
            len: 16,
        }));
        let resolved = resolve_parsed_type(
            &parsed,
            &forest,
            &primitives,
            &pool,
            &interner,
            &no_consts,
        )
        .unwrap();
        let expected_elem = pool.intern(Type::Array {
            elem: TypePool::U8,
            len: 16,
        });
        assert_eq!(resolved, pool.intern(Type::Ptr(expected_elem)));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let interner = StringInterner::new();
        let pool = TypePool::new();
        let forest = TypeForest::new();
        let primitives = Primitives::intern(&interner);

        let parsed = ParsedType::name(interner.intern("Mystery"));
        let err = resolve_parsed_type(
            &parsed,
            &forest,
            &primitives,
            &pool,
            &interner,
            &no_consts,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownType {
                name: "Mystery".to_owned()
            }
        );
    }

    #[test]
    fn test_resolve_declared_name() {
        let interner = StringInterner::new();
        let pool = TypePool::new();
        let mut forest = TypeForest::new();
        let primitives = Primitives::intern(&interner);

        let meters = forest
            .declare_newtype(interner.intern("Meters"), TypePool::F64, &pool)
            .unwrap();
        let parsed = ParsedType::name(interner.intern("Meters"));
        let resolved = resolve_parsed_type(
            &parsed,
            &forest,
            &primitives,
            &pool,
            &interner,
            &no_consts,
        )
        .unwrap();
        assert_eq!(resolved, meters);
    }
}
