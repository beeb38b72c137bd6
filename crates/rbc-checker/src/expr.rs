//! Pass 2 — literals, blocks, predicates, and lambdas.

use rbc_ast::{
    Block, Conversion, Expr, Lambda, MetaArena, MetaId, Node, Predicate, PredicateKind, TypeRef,
    Value, ValueExpr,
};
use rbc_common::{CompileError, SourceLoc};
use rbc_solver::{LangType, Primitive, TypeId, TypeTable, WideningConversion};
use smallvec::SmallVec;

use crate::state::{CheckPass, Ty};

impl CheckPass<'_> {
    pub(crate) fn check_value(
        &mut self,
        value: &ValueExpr,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let ty = match &value.value {
            Value::I32(_) => Ty::Known(TypeId::I32),
            Value::I64(_) => Ty::Known(TypeId::I64),
            Value::F32(_) => Ty::Known(TypeId::F32),
            Value::F64(_) => Ty::Known(TypeId::F64),
            Value::Bool(_) => Ty::Known(TypeId::BOOL),
            Value::Str(_) => Ty::Known(TypeId::STR),
            Value::Nil => Ty::Known(TypeId::NIL),
            // Quoted code is data; its interior is not resolved.
            Value::Quote(_) => Ty::Known(TypeId::QUOTE),
            Value::Identifier(name) => {
                let loc = meta.loc(value.meta);
                return self.check_identifier_use(name, value.meta, loc, meta);
            }
            Value::Array(elems) => {
                let tys = self.check_elements(elems, meta)?;
                self.array_from_elements(elems, &tys, meta)?
            }
            Value::Tuple(elems) => {
                let tys = self.check_elements(elems, meta)?;
                self.tuple_from_elements(&tys)
            }
        };
        self.record(value.meta, ty, meta)
    }

    /// Resolve an identifier use against the lexical environment and
    /// link it to its declaration.
    fn check_identifier_use(
        &mut self,
        name: &str,
        id: MetaId,
        loc: SourceLoc,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let Some(sym) = self.env.lookup(self.table, name) else {
            self.record_missing_symbol(name, loc);
            return self.record(id, Ty::PENDING, meta);
        };
        // A leftover stub means the declaration never arrived.
        let ty = self.table.data(sym).map(|data| match &data.type_ref {
            TypeRef::Resolved(type_id) => Ty::Known(*type_id),
            TypeRef::Unresolved(lang) => Ty::Unresolved(lang.clone()),
        });
        let Some(ty) = ty else {
            self.record_missing_symbol(name, loc);
            return self.record(id, Ty::PENDING, meta);
        };
        meta.link_symbol(id, sym)?;
        self.record(id, ty, meta)
    }

    pub(crate) fn check_elements(
        &mut self,
        elems: &[Expr],
        meta: &mut MetaArena,
    ) -> Result<SmallVec<[Ty; 4]>, CompileError> {
        let mut tys = SmallVec::new();
        for elem in elems {
            tys.push(self.check_expr(elem, meta)?);
        }
        Ok(tys)
    }

    /// Element typing shared by array literals and the `List` operation:
    /// widest numeric element, or structural equality for everything
    /// else. An empty list stays `Array(Undefined)` until a surrounding
    /// declared type adopts it.
    pub(crate) fn array_from_elements(
        &mut self,
        elems: &[Expr],
        tys: &[Ty],
        meta: &MetaArena,
    ) -> Result<Ty, CompileError> {
        if tys.is_empty() {
            return Ok(Ty::Unresolved(LangType::array(LangType::Undefined)));
        }
        let mut ids = SmallVec::<[TypeId; 4]>::new();
        for ty in tys {
            match ty.known() {
                Some(id) => ids.push(id),
                None => return Ok(Ty::Unresolved(LangType::array(LangType::Undefined))),
            }
        }

        let first = ids[0];
        let elem = if ids.iter().all(|&id| id == first) {
            first
        } else {
            // Mixed element types widen only when every element is a
            // numeric primitive; otherwise the first differing element
            // is the mismatch.
            let prims: Option<SmallVec<[Primitive; 4]>> = ids
                .iter()
                .map(|&id| self.types.primitive_of(id).filter(Primitive::is_numeric))
                .collect();
            match prims {
                Some(prims) => {
                    let widest = TypeTable::widest_primitive(prims)
                        .ok_or_else(|| CompileError::internal("widest_primitive on numeric elements"))?;
                    self.primitive_id(widest)
                }
                None => {
                    let (off_id, off_expr) = ids
                        .iter()
                        .zip(elems)
                        .find(|&(&id, _)| id != first)
                        .map(|(&id, e)| (id, e))
                        .unwrap_or_else(|| unreachable!("unequal ids exist"));
                    return Err(CompileError::type_mismatch(
                        self.display_type(&Ty::Known(first)),
                        self.display_type(&Ty::Known(off_id)),
                        meta.loc(off_expr.meta()),
                    ));
                }
            }
        };

        let elem_lang = self
            .types
            .lang_type(elem)
            .cloned()
            .ok_or_else(|| CompileError::internal("element type missing from the table"))?;
        let id = self
            .types
            .resolve_id(&LangType::array(elem_lang))
            .ok_or_else(|| CompileError::internal("array over a resolved element must resolve"))?;
        Ok(Ty::Known(id))
    }

    fn tuple_from_elements(&mut self, tys: &[Ty]) -> Ty {
        let mut members = Vec::with_capacity(tys.len());
        let mut all_known = true;
        for ty in tys {
            match ty.known() {
                Some(id) => match self.types.lang_type(id) {
                    Some(lang) => members.push(lang.clone()),
                    None => {
                        all_known = false;
                        members.push(LangType::Undefined);
                    }
                },
                None => {
                    all_known = false;
                    members.push(LangType::Undefined);
                }
            }
        }
        let tuple = LangType::tuple(members);
        if all_known
            && let Some(id) = self.types.resolve_id(&tuple)
        {
            Ty::Known(id)
        } else {
            Ty::Unresolved(tuple)
        }
    }

    pub(crate) fn check_block(
        &mut self,
        block: &Block,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        self.env.enter_scope();
        let mut last: Option<(Ty, bool)> = None;
        for item in &block.items {
            let ty = self.check_node(item, meta)?;
            last = Some((ty, matches!(item, Node::Expr(_))));
        }
        self.env.exit_scope()?;

        let ty = match last {
            Some((ty, true)) => ty,
            // Empty block, or a trailing statement.
            _ => Ty::Known(TypeId::NIL),
        };
        self.record(block.meta, ty, meta)
    }

    pub(crate) fn check_predicate(
        &mut self,
        pred: &Predicate,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let cond_ty = self.check_expr(&pred.condition, meta)?;
        if let Some(cond_id) = cond_ty.known()
            && cond_id != TypeId::BOOL
        {
            return Err(CompileError::type_mismatch(
                "Bool",
                self.display_type(&cond_ty),
                meta.loc(pred.condition.meta()),
            ));
        }

        let kind = pred
            .form
            .kind()
            .ok_or_else(|| CompileError::internal("predicate with no branches"))?;

        let ty = match kind {
            PredicateKind::ThenElse => {
                let then = pred.form.then_branch.as_deref().unwrap_or_else(|| unreachable!());
                let otherwise = pred.form.else_branch.as_deref().unwrap_or_else(|| unreachable!());
                let then_ty = self.check_expr(then, meta)?;
                let else_ty = self.check_expr(otherwise, meta)?;
                match (then_ty.known(), else_ty.known()) {
                    (Some(t), Some(e)) if cond_ty.known().is_some() => {
                        self.widen_branches(t, e, then, otherwise, meta)?
                    }
                    _ => Ty::PENDING,
                }
            }
            PredicateKind::Match => {
                let then = pred.form.then_branch.as_deref().unwrap_or_else(|| unreachable!());
                let then_ty = self.check_expr(then, meta)?;
                match then_ty.known() {
                    Some(t) if cond_ty.known().is_some() => {
                        let inner = self
                            .types
                            .lang_type(t)
                            .cloned()
                            .ok_or_else(|| CompileError::internal("branch type missing from the table"))?;
                        let id = self
                            .types
                            .resolve_id(&LangType::optional(inner))
                            .ok_or_else(|| CompileError::internal("optional over a resolved type must resolve"))?;
                        Ty::Known(id)
                    }
                    _ => Ty::PENDING,
                }
            }
            PredicateKind::Coalesce => {
                let otherwise = pred.form.else_branch.as_deref().unwrap_or_else(|| unreachable!());
                let else_ty = self.check_expr(otherwise, meta)?;
                match else_ty.known() {
                    Some(e) if cond_ty.known().is_some() => Ty::Known(e),
                    _ => Ty::PENDING,
                }
            }
        };
        self.record(pred.meta, ty, meta)
    }

    /// Common type of two branches: equal, or the wider of two numeric
    /// primitives, with the conversion recorded on the narrower branch.
    fn widen_branches(
        &mut self,
        then_id: TypeId,
        else_id: TypeId,
        then: &Expr,
        otherwise: &Expr,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let forward = self.types.check_compatibility(then_id, else_id);
        if forward.compatible {
            if let WideningConversion::Primitive(target) = forward.conversion {
                meta.set_conversion(then.meta(), Conversion::Primitive(target))?;
            }
            return Ok(Ty::Known(else_id));
        }
        let backward = self.types.check_compatibility(else_id, then_id);
        if backward.compatible {
            if let WideningConversion::Primitive(target) = backward.conversion {
                meta.set_conversion(otherwise.meta(), Conversion::Primitive(target))?;
            }
            return Ok(Ty::Known(then_id));
        }
        Err(CompileError::type_mismatch(
            self.display_type(&Ty::Known(then_id)),
            self.display_type(&Ty::Known(else_id)),
            meta.loc(otherwise.meta()),
        ))
    }

    pub(crate) fn check_lambda(
        &mut self,
        lambda: &Lambda,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        self.env.enter_scope();

        let mut param_tys = Vec::with_capacity(lambda.params.len());
        let mut all_known = true;
        for param in &lambda.params {
            if matches!(param.ty, LangType::Undefined) {
                self.env.exit_scope()?;
                return Err(CompileError::invalid_parameter(
                    format!("parameter '{}' has no declared type", param.name),
                    param.loc,
                ));
            }
            match self.types.resolve_id(&param.ty) {
                Some(id) => {
                    let sym = self
                        .table
                        .lookup_in(self.env.current_ns_scope(), &param.name)
                        .ok_or_else(|| CompileError::internal("parameter missing from Pass 1"))?;
                    self.table.finalize_type(sym, id)?;
                }
                // An undeclared user type: retried next attempt.
                None => all_known = false,
            }
            param_tys.push(param.ty.clone());
        }

        let body_ty = self.check_expr(&lambda.body, meta)?;

        let ret = match &lambda.ret {
            Some(declared) => {
                match self.types.resolve_id(declared) {
                    Some(ret_id) => {
                        if let Some(body_id) = body_ty.known() {
                            let compat = self.types.check_compatibility(body_id, ret_id);
                            if !compat.compatible {
                                self.env.exit_scope()?;
                                return Err(CompileError::type_mismatch(
                                    declared.to_string(),
                                    self.display_type(&body_ty),
                                    meta.loc(lambda.body.meta()),
                                ));
                            }
                            if let WideningConversion::Primitive(target) = compat.conversion {
                                meta.set_conversion(lambda.body.meta(), Conversion::Primitive(target))?;
                            }
                        }
                        // The declared return fixes the signature even
                        // while the body is still pending.
                    }
                    None => all_known = false,
                }
                declared.clone()
            }
            None => match body_ty.known() {
                Some(body_id) => self
                    .types
                    .lang_type(body_id)
                    .cloned()
                    .ok_or_else(|| CompileError::internal("body type missing from the table"))?,
                None => {
                    all_known = false;
                    LangType::Undefined
                }
            },
        };

        self.env.exit_scope()?;

        let fn_ty = LangType::function(param_tys, ret);
        let ty = if all_known {
            match self.types.resolve_id(&fn_ty) {
                Some(id) => Ty::Known(id),
                None => Ty::Unresolved(fn_ty),
            }
        } else {
            Ty::Unresolved(fn_ty)
        };
        self.record(lambda.meta, ty, meta)
    }

    /// Fixed id of a primitive.
    pub(crate) fn primitive_id(&self, p: Primitive) -> TypeId {
        match p {
            Primitive::Nil => TypeId::NIL,
            Primitive::Bool => TypeId::BOOL,
            Primitive::I32 => TypeId::I32,
            Primitive::I64 => TypeId::I64,
            Primitive::F32 => TypeId::F32,
            Primitive::F64 => TypeId::F64,
        }
    }
}
