//! Expression elaboration.
//!
//! Walks each function body after the sealing barrier, resolving a
//! concrete type for every expression and a `CastNode` for every cast.
//! Pattern constructs delegate to `graft_patterns`; cast legality
//! delegates to `graft_types::resolve_cast`.
//!
//! Elaboration never aborts a unit on the first problem: errors become
//! diagnostics, the offending expression gets a recovery type, and the
//! walk continues so diagnostics batch per unit.

use graft_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, Suggestion};
use graft_ir::{
    BinaryOp, CastOp, ExprArena, ExprId, ExprKind, FnDecl, Name, ParsedType, PatternKind, Span,
    StmtKind, StringInterner, UnaryOp,
};
use graft_patterns::{
    check_diverges, elaborate_fallback, elaborate_let_chain, elaborate_match, lower_condition,
    Binding, CondClause, MatchOutcome, PatternCx, PatternError,
};
use graft_types::{
    resolve_cast, resolve_parsed_type, CastError, CastNode, Primitives, Type, TypeId, TypePool,
};
use rustc_hash::FxHashMap;
use tracing::info_span;

use crate::collect::{const_arg_eval, Declarations, ScopedLookup};

/// The typed output for one function: a resolved type per expression and
/// a resolved cast per cast expression, keyed by arena id.
#[derive(Debug, Default)]
pub struct TypedFunction {
    pub name: Name,
    pub expr_types: FxHashMap<ExprId, TypeId>,
    pub casts: FxHashMap<ExprId, CastNode>,
}

/// A lexical scope frame.
#[derive(Default)]
struct Scope {
    vars: FxHashMap<Name, VarInfo>,
}

#[derive(Copy, Clone)]
struct VarInfo {
    ty: TypeId,
    mutable: bool,
}

/// Per-function elaborator.
pub struct Elaborator<'a> {
    pub decls: &'a Declarations,
    pub pool: &'a TypePool,
    pub interner: &'a StringInterner,
    pub primitives: &'a Primitives,
    pub arena: &'a ExprArena,
    pub queue: &'a mut DiagnosticQueue,
    scopes: Vec<Scope>,
    generics: FxHashMap<Name, TypeId>,
    ret: TypeId,
    output: TypedFunction,
}

impl<'a> Elaborator<'a> {
    pub fn new(
        decls: &'a Declarations,
        pool: &'a TypePool,
        interner: &'a StringInterner,
        primitives: &'a Primitives,
        arena: &'a ExprArena,
        queue: &'a mut DiagnosticQueue,
    ) -> Self {
        Elaborator {
            decls,
            pool,
            interner,
            primitives,
            arena,
            queue,
            scopes: vec![Scope::default()],
            generics: FxHashMap::default(),
            ret: TypePool::UNIT,
            output: TypedFunction::default(),
        }
    }

    /// Elaborate one function body.
    pub fn elaborate_fn(mut self, f: &FnDecl) -> TypedFunction {
        let span = info_span!("elaborate_fn");
        let _enter = span.enter();

        self.output.name = f.name;
        for &generic in &f.generics {
            self.generics
                .insert(generic, self.pool.intern(Type::Param(generic)));
        }

        let sig = self.decls.function(f.name).cloned();
        if let Some(sig) = sig {
            self.ret = sig.ret;
            for (pname, pty) in sig.params {
                self.define(pname, pty, false);
            }
        }

        let body_ty = self.infer(f.body, Some(self.ret));
        if !self.unify(body_ty, self.ret) {
            self.type_mismatch(self.arena.expr(f.body).span, self.ret, body_ty);
        }
        self.output
    }

    /// Seed an outer scope, for macro fragment elaboration.
    pub fn with_bindings(mut self, bindings: &[(Name, TypeId)]) -> Self {
        for &(name, ty) in bindings {
            self.define(name, ty, false);
        }
        self
    }

    /// Elaborate a bare expression (macro fragments, tests).
    pub fn elaborate_expr(mut self, expr: ExprId) -> (TypedFunction, TypeId) {
        let ty = self.infer(expr, None);
        (self.output, ty)
    }

    fn pattern_cx(&self) -> PatternCx<'a> {
        PatternCx {
            arena: self.arena,
            interner: self.interner,
            forest: &self.decls.forest,
            pool: self.pool,
            primitives: self.primitives,
        }
    }

    fn define(&mut self, name: Name, ty: TypeId, mutable: bool) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .vars
            .insert(name, VarInfo { ty, mutable });
    }

    fn lookup_var(&self, name: Name) -> Option<VarInfo> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(&name).copied())
    }

    /// Assignment targets must be places rooted in a mutable binding.
    fn check_assignable(&mut self, target: ExprId) {
        let node = self.arena.expr(target);
        match &node.kind {
            ExprKind::Ident(name) => {
                if let Some(info) = self.lookup_var(*name) {
                    if !info.mutable {
                        self.queue.push(
                            Diagnostic::error(ErrorCode::E2004)
                                .with_message(format!(
                                    "cannot assign to immutable binding `{}`",
                                    self.interner.lookup(*name)
                                ))
                                .with_label(node.span, "not declared `mut`"),
                        );
                    }
                }
            }
            ExprKind::Field { receiver, .. } | ExprKind::Index { receiver, .. } => {
                self.check_assignable(*receiver);
            }
            _ => {
                self.queue.push(
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message("invalid assignment target")
                        .with_label(node.span, "not an assignable place"),
                );
            }
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn unify(&self, a: TypeId, b: TypeId) -> bool {
        self.decls.forest.are_parallel(a, b, self.pool)
    }

    fn shape(&self, ty: TypeId) -> Type {
        self.pool
            .get(self.decls.forest.structural_of(ty, self.pool))
    }

    fn resolve_type(&mut self, parsed: &ParsedType, span: Span) -> TypeId {
        let lookup = ScopedLookup {
            forest: &self.decls.forest,
            params: &self.generics,
        };
        match resolve_parsed_type(
            parsed,
            &lookup,
            self.primitives,
            self.pool,
            self.interner,
            &const_arg_eval(self.arena),
        ) {
            Ok(ty) => ty,
            Err(err) => {
                self.queue.push(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(err.to_string())
                        .with_label(span, "in this type"),
                );
                TypePool::UNIT
            }
        }
    }

    /// Resolve a type silently; the caller reports failures elsewhere.
    fn try_resolve_type(&self, parsed: &ParsedType) -> Option<TypeId> {
        let lookup = ScopedLookup {
            forest: &self.decls.forest,
            params: &self.generics,
        };
        resolve_parsed_type(
            parsed,
            &lookup,
            self.primitives,
            self.pool,
            self.interner,
            &const_arg_eval(self.arena),
        )
        .ok()
    }

    fn type_mismatch(&mut self, span: Span, expected: TypeId, found: TypeId) {
        self.queue.push(
            Diagnostic::error(ErrorCode::E2004)
                .with_message(format!(
                    "type mismatch: expected {}, found {}",
                    self.display_type(expected),
                    self.display_type(found)
                ))
                .with_label(span, "here"),
        );
    }

    fn display_type(&self, ty: TypeId) -> String {
        match self.pool.get(ty) {
            Type::Named { name, .. } | Type::Param(name) => {
                format!("`{}`", self.interner.lookup(name))
            }
            other => format!("`{other:?}`"),
        }
    }

    fn pattern_error(&mut self, err: &PatternError) {
        self.queue.push(err.to_diagnostic());
    }

    /// Infer the type of `expr`, recording it in the output table.
    fn infer(&mut self, expr: ExprId, expected: Option<TypeId>) -> TypeId {
        let ty = self.infer_uncached(expr, expected);
        self.output.expr_types.insert(expr, ty);
        ty
    }

    fn infer_uncached(&mut self, expr: ExprId, expected: Option<TypeId>) -> TypeId {
        let node = self.arena.expr(expr);
        let span = node.span;

        match &node.kind {
            ExprKind::Int(_) => expected
                .filter(|&ty| self.shape(ty).is_integer())
                .unwrap_or(TypePool::I64),
            ExprKind::Float(_) => expected
                .filter(|&ty| self.shape(ty).is_float())
                .unwrap_or(TypePool::F64),
            ExprKind::Bool(_) => TypePool::BOOL,
            ExprKind::Char(_) => TypePool::CHAR,
            ExprKind::Str(_) => self.pool.intern(Type::Slice(TypePool::U8)),
            ExprKind::Unit => TypePool::UNIT,

            ExprKind::Ident(name) => match self.lookup_var(*name) {
                Some(info) => info.ty,
                None => {
                    self.queue.push(
                        Diagnostic::error(ErrorCode::E2003)
                            .with_message(format!(
                                "unknown identifier `{}`",
                                self.interner.lookup(*name)
                            ))
                            .with_label(span, "not found in this scope"),
                    );
                    TypePool::UNIT
                }
            },

            ExprKind::Binary { op, lhs, rhs } => self.infer_binary(*op, *lhs, *rhs, span),

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.infer(*operand, expected);
                match op {
                    UnaryOp::Neg | UnaryOp::BitNot => operand_ty,
                    UnaryOp::Not => {
                        if !self.unify(operand_ty, TypePool::BOOL) {
                            self.type_mismatch(span, TypePool::BOOL, operand_ty);
                        }
                        TypePool::BOOL
                    }
                }
            }

            ExprKind::Call { callee, args, .. } => self.infer_call(*callee, args, span),

            ExprKind::Instantiate { base, .. } => {
                // A standalone instantiation names a generic function;
                // its value type is opaque until called.
                self.infer(*base, None)
            }

            ExprKind::Field { receiver, field } => {
                let receiver_ty = self.infer(*receiver, None);
                match self.shape(receiver_ty) {
                    Type::Struct(fields) => fields
                        .iter()
                        .find(|&&(n, _)| n == *field)
                        .map(|&(_, ty)| ty)
                        .unwrap_or_else(|| {
                            self.queue.push(
                                Diagnostic::error(ErrorCode::E2004)
                                    .with_message(format!(
                                        "type has no field `{}`",
                                        self.interner.lookup(*field)
                                    ))
                                    .with_label(span, "unknown field"),
                            );
                            TypePool::UNIT
                        }),
                    _ => {
                        self.queue.push(
                            Diagnostic::error(ErrorCode::E2004)
                                .with_message("field access on a non-struct value")
                                .with_label(span, "has no fields"),
                        );
                        TypePool::UNIT
                    }
                }
            }

            ExprKind::Index { receiver, index } => {
                let receiver_ty = self.infer(*receiver, None);
                let index_ty = self.infer(*index, Some(TypePool::U64));
                if !self.shape(index_ty).is_integer() {
                    self.type_mismatch(span, TypePool::U64, index_ty);
                }
                match self.shape(receiver_ty) {
                    Type::Array { elem, .. } | Type::Slice(elem) => elem,
                    _ => {
                        self.queue.push(
                            Diagnostic::error(ErrorCode::E2004)
                                .with_message("indexing a non-indexable value")
                                .with_label(span, "not an array or slice"),
                        );
                        TypePool::UNIT
                    }
                }
            }

            ExprKind::Cast { operand, op, ty } => {
                self.infer_cast(expr, *operand, *op, ty.as_ref(), expected, span)
            }

            ExprKind::If {
                cond,
                then_block,
                else_expr,
            } => self.infer_if(*cond, *then_block, *else_expr, expected),

            ExprKind::While { cond, body } => {
                self.push_scope();
                self.infer_condition(*cond);
                self.infer(*body, None);
                self.pop_scope();
                TypePool::UNIT
            }

            ExprKind::Loop { body } => {
                self.infer(*body, None);
                TypePool::UNIT
            }

            ExprKind::Block { stmts, tail } => {
                self.push_scope();
                for &stmt in stmts {
                    self.elaborate_stmt(stmt);
                }
                let ty = match tail {
                    Some(tail) => self.infer(*tail, expected),
                    None => TypePool::UNIT,
                };
                self.pop_scope();
                ty
            }

            ExprKind::Match { scrutinee, arms } => {
                let scrutinee_ty = self.infer(*scrutinee, None);
                let mut result: Option<TypeId> = None;
                for arm in arms {
                    let cx = self.pattern_cx();
                    let outcome = match elaborate_match(&cx, arm.pattern, scrutinee_ty) {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            self.pattern_error(&err);
                            MatchOutcome::Unmatched
                        }
                    };
                    self.push_scope();
                    if let MatchOutcome::Bound(set) = outcome {
                        let bindings: Vec<Binding> = set.iter().copied().collect();
                        for binding in bindings {
                            self.define(binding.name, binding.ty, binding.mutable);
                        }
                    }
                    if let Some(guard) = arm.guard {
                        let guard_ty = self.infer(guard, Some(TypePool::BOOL));
                        if !self.unify(guard_ty, TypePool::BOOL) {
                            self.type_mismatch(
                                self.arena.expr(guard).span,
                                TypePool::BOOL,
                                guard_ty,
                            );
                        }
                    }
                    let body_ty = self.infer(arm.body, result.or(expected));
                    self.pop_scope();
                    match result {
                        Some(previous) if !self.unify(previous, body_ty) => {
                            self.type_mismatch(arm.span, previous, body_ty);
                        }
                        None => result = Some(body_ty),
                        _ => {}
                    }
                }
                result.unwrap_or(TypePool::UNIT)
            }

            ExprKind::Return(value) => {
                let ret = self.ret;
                let value_ty = match value {
                    Some(value) => self.infer(*value, Some(ret)),
                    None => TypePool::UNIT,
                };
                if !self.unify(value_ty, ret) {
                    self.type_mismatch(span, ret, value_ty);
                }
                TypePool::UNIT
            }
            ExprKind::Break | ExprKind::Continue => TypePool::UNIT,

            ExprKind::TupleLit(elems) => {
                let elem_tys = elems.iter().map(|&e| self.infer(e, None)).collect();
                self.pool.intern(Type::Tuple(elem_tys))
            }

            ExprKind::ArrayLit(elems) => {
                let mut elem_ty = None;
                for &elem in elems {
                    let ty = self.infer(elem, elem_ty);
                    match elem_ty {
                        Some(previous) if !self.unify(previous, ty) => {
                            self.type_mismatch(self.arena.expr(elem).span, previous, ty);
                        }
                        None => elem_ty = Some(ty),
                        _ => {}
                    }
                }
                let elem = elem_ty.unwrap_or(TypePool::UNIT);
                self.pool.intern(Type::Array {
                    elem,
                    len: elems.len() as u64,
                })
            }

            ExprKind::StructLit { name, fields } => {
                let Some(struct_ty) = self.decls.forest.lookup(*name) else {
                    self.queue.push(
                        Diagnostic::error(ErrorCode::E2001)
                            .with_message(format!(
                                "unknown type `{}`",
                                self.interner.lookup(*name)
                            ))
                            .with_label(span, "not declared"),
                    );
                    return TypePool::UNIT;
                };
                let Type::Struct(decl_fields) = self.shape(struct_ty) else {
                    self.queue.push(
                        Diagnostic::error(ErrorCode::E2004)
                            .with_message(format!(
                                "`{}` is not a struct type",
                                self.interner.lookup(*name)
                            ))
                            .with_label(span, "not constructible with braces"),
                    );
                    return struct_ty;
                };
                for &(field_name, value) in fields {
                    match decl_fields.iter().find(|&&(n, _)| n == field_name) {
                        Some(&(_, field_ty)) => {
                            let value_ty = self.infer(value, Some(field_ty));
                            if !self.unify(value_ty, field_ty) {
                                self.type_mismatch(
                                    self.arena.expr(value).span,
                                    field_ty,
                                    value_ty,
                                );
                            }
                        }
                        None => {
                            self.queue.push(
                                Diagnostic::error(ErrorCode::E2004)
                                    .with_message(format!(
                                        "type has no field `{}`",
                                        self.interner.lookup(field_name)
                                    ))
                                    .with_label(span, "unknown field"),
                            );
                        }
                    }
                }
                struct_ty
            }

            ExprKind::LetCond { .. } => {
                // Only reachable through a malformed tree; conditions are
                // lowered by `infer_condition`.
                self.queue.push(
                    Diagnostic::error(ErrorCode::E1002)
                        .with_message("`let` condition outside an `if` or `while`")
                        .with_label(span, "not a condition position"),
                );
                TypePool::BOOL
            }
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, span: Span) -> TypeId {
        use BinaryOp::*;
        let lhs_ty = self.infer(lhs, None);
        let rhs_ty = self.infer(rhs, Some(lhs_ty));

        match op {
            And | Or => {
                for (ty, expr) in [(lhs_ty, lhs), (rhs_ty, rhs)] {
                    if !self.unify(ty, TypePool::BOOL) {
                        self.type_mismatch(self.arena.expr(expr).span, TypePool::BOOL, ty);
                    }
                }
                TypePool::BOOL
            }
            Eq | NotEq | Lt | LtEq | Gt | GtEq => {
                if !self.unify(lhs_ty, rhs_ty) {
                    self.type_mismatch(span, lhs_ty, rhs_ty);
                }
                TypePool::BOOL
            }
            Shl | Shr => {
                if !self.shape(lhs_ty).is_integer() || !self.shape(rhs_ty).is_integer() {
                    self.type_mismatch(span, TypePool::I64, lhs_ty);
                }
                lhs_ty
            }
            Add | Sub | Mul | Div | Mod | BitAnd | BitOr | BitXor => {
                if !self.unify(lhs_ty, rhs_ty) {
                    self.type_mismatch(span, lhs_ty, rhs_ty);
                }
                lhs_ty
            }
        }
    }

    fn infer_call(&mut self, callee: ExprId, args: &[ExprId], span: Span) -> TypeId {
        // Calls resolve through a function name, possibly instantiated.
        let callee_name = match &self.arena.expr(callee).kind {
            ExprKind::Ident(name) => Some(*name),
            ExprKind::Instantiate { base, .. } => match &self.arena.expr(*base).kind {
                ExprKind::Ident(name) => Some(*name),
                _ => None,
            },
            _ => None,
        };

        let Some(name) = callee_name else {
            self.queue.push(
                Diagnostic::error(ErrorCode::E2003)
                    .with_message("only named functions are callable")
                    .with_label(span, "not a function name"),
            );
            for &arg in args {
                self.infer(arg, None);
            }
            return TypePool::UNIT;
        };

        let Some(sig) = self.decls.function(name).cloned() else {
            self.queue.push(
                Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "unknown function `{}`",
                        self.interner.lookup(name)
                    ))
                    .with_label(span, "not declared"),
            );
            for &arg in args {
                self.infer(arg, None);
            }
            return TypePool::UNIT;
        };

        if args.len() != sig.params.len() {
            self.queue.push(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "`{}` takes {} arguments, {} given",
                        self.interner.lookup(name),
                        sig.params.len(),
                        args.len()
                    ))
                    .with_label(span, "in this call"),
            );
        }

        for (&arg, (_, param_ty)) in args.iter().zip(sig.params.iter()) {
            let arg_ty = self.infer(arg, Some(*param_ty));
            // Generic parameters accept anything; concrete parameters
            // must unify.
            let is_param = matches!(self.pool.get(*param_ty), Type::Param(_));
            if !is_param && !self.unify(arg_ty, *param_ty) {
                self.type_mismatch(self.arena.expr(arg).span, *param_ty, arg_ty);
            }
        }
        sig.ret
    }

    fn infer_cast(
        &mut self,
        expr: ExprId,
        operand: ExprId,
        op: CastOp,
        ty: Option<&ParsedType>,
        expected: Option<TypeId>,
        span: Span,
    ) -> TypeId {
        let source = self.infer(operand, None);
        // An omitted destination falls back to the contextually expected
        // type (assignment target, parameter type).
        let dest = match ty {
            Some(parsed) => Some(self.resolve_type(parsed, span)),
            None => expected,
        };

        match resolve_cast(source, dest, op, &self.decls.forest, self.pool) {
            Ok(node) => {
                self.output.casts.insert(expr, node);
                node.dest
            }
            Err(err) => {
                self.push_cast_error(&err, span);
                dest.unwrap_or(source)
            }
        }
    }

    fn push_cast_error(&mut self, err: &CastError, span: Span) {
        let code = match err {
            CastError::NoReliableCast { .. } => ErrorCode::E4001,
            CastError::InvalidOperand { .. } => ErrorCode::E4002,
            CastError::UnresolvedCastTarget { .. } => ErrorCode::E4003,
            CastError::WidthMismatch { .. } => ErrorCode::E4004,
        };
        let mut diag = Diagnostic::error(code)
            .with_message(err.to_string())
            .with_label(span, "in this cast");
        if let CastError::NoReliableCast {
            suggestion: Some(op),
            ..
        } = err
        {
            diag = diag.with_suggestion(Suggestion::text(format!(
                "the `{}` operator permits this conversion",
                op.as_symbol()
            )));
        }
        self.queue.push(diag);
    }

    fn infer_if(
        &mut self,
        cond: ExprId,
        then_block: ExprId,
        else_expr: Option<ExprId>,
        expected: Option<TypeId>,
    ) -> TypeId {
        self.push_scope();
        self.infer_condition(cond);
        let then_ty = self.infer(then_block, expected);
        self.pop_scope();

        match else_expr {
            Some(else_expr) => {
                let else_ty = self.infer(else_expr, expected.or(Some(then_ty)));
                if !self.unify(then_ty, else_ty) {
                    self.type_mismatch(self.arena.expr(else_expr).span, then_ty, else_ty);
                }
                then_ty
            }
            None => TypePool::UNIT,
        }
    }

    /// Elaborate an `if`/`while` condition: ordered clauses, left to
    /// right, each `let` clause extending the scope seen by later
    /// clauses and the body.
    fn infer_condition(&mut self, cond: ExprId) {
        let clauses = match lower_condition(self.arena, cond) {
            Ok(clauses) => clauses,
            Err(err) => {
                self.pattern_error(&err);
                return;
            }
        };

        for clause in clauses {
            match clause {
                CondClause::Bool(expr) => {
                    let ty = self.infer(expr, Some(TypePool::BOOL));
                    if !self.unify(ty, TypePool::BOOL) {
                        self.type_mismatch(self.arena.expr(expr).span, TypePool::BOOL, ty);
                    }
                }
                CondClause::Let {
                    pattern,
                    init,
                    fallbacks,
                    span,
                } => {
                    let mut sources = Vec::with_capacity(1 + fallbacks.len());
                    sources.push(self.infer(init, None));
                    for fallback in fallbacks {
                        sources.push(self.infer(fallback, None));
                    }
                    let cx = self.pattern_cx();
                    match elaborate_fallback(&cx, pattern, &sources, span) {
                        Ok((scope, _provable)) => {
                            let bindings: Vec<Binding> = scope.iter().copied().collect();
                            for binding in bindings {
                                self.define(binding.name, binding.ty, binding.mutable);
                            }
                        }
                        Err(err) => self.pattern_error(&err),
                    }
                }
            }
        }
    }

    fn elaborate_stmt(&mut self, stmt: graft_ir::StmtId) {
        let stmt_node = self.arena.stmt(stmt);
        match &stmt_node.kind {
            StmtKind::Expr(expr) => {
                self.infer(*expr, None);
            }
            StmtKind::Assign { target, value } => {
                let target_ty = self.infer(*target, None);
                let value_ty = self.infer(*value, Some(target_ty));
                if !self.unify(value_ty, target_ty) {
                    self.type_mismatch(self.arena.expr(*value).span, target_ty, value_ty);
                }
                self.check_assignable(*target);
            }
            StmtKind::Let { arms, terminal } => {
                // A whole-binding annotation provides the expected type,
                // which is what lets `let y: i64 = x #;` infer the
                // omitted cast destination.
                let sources: Vec<TypeId> = arms
                    .iter()
                    .map(|arm| {
                        // The expected type comes from the whole-binding
                        // annotation, or from an annotation on a
                        // top-level binding pattern.
                        let annotation = arm.ty.as_ref().or_else(|| {
                            match &self.arena.pattern(arm.pattern).kind {
                                PatternKind::Binding { ty, .. } => ty.as_ref(),
                                _ => None,
                            }
                        });
                        let expected =
                            annotation.and_then(|parsed| self.try_resolve_type(parsed));
                        self.infer(arm.init, expected)
                    })
                    .collect();
                // The terminal block is elaborated like any block; its
                // divergence is checked by the chain elaboration.
                if let Some(terminal) = terminal {
                    self.infer(*terminal, None);
                }
                let cx = self.pattern_cx();
                match elaborate_let_chain(&cx, arms, &sources, *terminal) {
                    Ok(scope) => {
                        let bindings: Vec<Binding> = scope.iter().copied().collect();
                        for binding in bindings {
                            self.define(binding.name, binding.ty, binding.mutable);
                        }
                    }
                    Err(err) => self.pattern_error(&err),
                }
            }
        }
    }
}

/// Check a standalone block for guaranteed divergence; used by tests and
/// the fragment API. Thin wrapper so callers outside the crate do not
/// need `graft_patterns` directly.
pub fn block_diverges(arena: &ExprArena, block: ExprId) -> Result<(), Span> {
    check_diverges(arena, block)
}
