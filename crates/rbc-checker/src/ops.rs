//! Pass 2 — built-in operation typing.

use rbc_ast::{Conversion, Expr, MemberChain, MetaArena, Op, OpCategory, OpExpr, Value, ValueExpr};
use rbc_binder::SymbolKind;
use rbc_common::{CompileError, SourceLoc};
use rbc_solver::{LangType, Primitive, TypeId, TypeTable, WideningConversion};
use smallvec::SmallVec;

use crate::state::{CheckPass, Ty};

impl CheckPass<'_> {
    pub(crate) fn check_op(
        &mut self,
        op_expr: &OpExpr,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let loc = meta.loc(op_expr.meta);
        if op_expr.op == Op::ReAssign {
            return self.check_reassign(op_expr, loc, meta);
        }

        let tys = self.check_elements(&op_expr.operands, meta)?;
        let ty = match op_expr.op.category() {
            OpCategory::List => self.array_from_elements(&op_expr.operands, &tys, meta)?,
            OpCategory::Arithmetic => self.arithmetic_result(op_expr, &tys, loc, meta)?,
            OpCategory::Comparison => self.comparison_result(op_expr, &tys, loc, meta)?,
            OpCategory::Logical => self.logical_result(op_expr, &tys, meta)?,
            OpCategory::Reassign => unreachable!("handled above"),
        };
        self.record(op_expr.meta, ty, meta)
    }

    /// Arithmetic: every operand numeric, result = widest primitive.
    fn arithmetic_result(
        &mut self,
        op_expr: &OpExpr,
        tys: &[Ty],
        loc: SourceLoc,
        meta: &MetaArena,
    ) -> Result<Ty, CompileError> {
        if tys.is_empty() {
            return Err(CompileError::invalid_operation(
                op_expr.op.symbol(),
                "requires at least one operand",
                loc,
            ));
        }

        let mut prims = SmallVec::<[Primitive; 4]>::new();
        let mut pending = false;
        for (ty, operand) in tys.iter().zip(&op_expr.operands) {
            match ty.known() {
                Some(id) => match self.types.primitive_of(id) {
                    Some(p) if p.is_numeric() => prims.push(p),
                    _ => {
                        return Err(CompileError::type_mismatch(
                            "a numeric type",
                            self.display_type(ty),
                            meta.loc(operand.meta()),
                        ));
                    }
                },
                None => pending = true,
            }
        }
        if pending {
            return Ok(Ty::PENDING);
        }

        let widest = TypeTable::widest_primitive(prims)
            .ok_or_else(|| CompileError::internal("widest_primitive on numeric operands"))?;
        Ok(Ty::Known(self.primitive_id(widest)))
    }

    /// Comparison: operands mutually widenable, result `Bool`.
    fn comparison_result(
        &mut self,
        op_expr: &OpExpr,
        tys: &[Ty],
        loc: SourceLoc,
        meta: &MetaArena,
    ) -> Result<Ty, CompileError> {
        if tys.len() < 2 {
            return Err(CompileError::invalid_operation(
                op_expr.op.symbol(),
                "requires at least two operands",
                loc,
            ));
        }

        let mut ids = SmallVec::<[TypeId; 4]>::new();
        for ty in tys {
            match ty.known() {
                Some(id) => ids.push(id),
                None => return Ok(Ty::PENDING),
            }
        }

        let mut common = ids[0];
        for (&id, operand) in ids[1..].iter().zip(&op_expr.operands[1..]) {
            if self.types.check_compatibility(id, common).compatible {
                continue;
            }
            if self.types.check_compatibility(common, id).compatible {
                common = id;
                continue;
            }
            return Err(CompileError::type_mismatch(
                self.display_type(&Ty::Known(common)),
                self.display_type(&Ty::Known(id)),
                meta.loc(operand.meta()),
            ));
        }
        Ok(Ty::Known(TypeId::BOOL))
    }

    /// Logical: every operand `Bool`, result `Bool`.
    fn logical_result(
        &mut self,
        op_expr: &OpExpr,
        tys: &[Ty],
        meta: &MetaArena,
    ) -> Result<Ty, CompileError> {
        let mut pending = false;
        for (ty, operand) in tys.iter().zip(&op_expr.operands) {
            match ty.known() {
                Some(id) if id == TypeId::BOOL => {}
                Some(_) => {
                    return Err(CompileError::type_mismatch(
                        "Bool",
                        self.display_type(ty),
                        meta.loc(operand.meta()),
                    ));
                }
                None => pending = true,
            }
        }
        if pending {
            Ok(Ty::PENDING)
        } else {
            Ok(Ty::Known(TypeId::BOOL))
        }
    }

    /// `ReAssign`: the left operand must be a mutable lvalue — a member
    /// chain terminating in a mutable field, or a local identifier
    /// declared `MUTABLE` — and the right operand must be
    /// assignment-compatible. The operation itself is `Nil`.
    fn check_reassign(
        &mut self,
        op_expr: &OpExpr,
        loc: SourceLoc,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let [target, value] = op_expr.operands.as_slice() else {
            return Err(CompileError::invalid_operation(
                "assignment",
                "expected a target and a value",
                loc,
            ));
        };

        let target_ty = self.check_expr(target, meta)?;
        let value_ty = self.check_expr(value, meta)?;

        let via_chain = matches!(target, Expr::M(_));
        let target_sym = match target {
            Expr::V(ValueExpr {
                meta: id,
                value: Value::Identifier(_),
            }) => meta.get(*id).symbol(),
            Expr::M(MemberChain { meta: id, .. }) => meta.get(*id).symbol(),
            _ => {
                return Err(CompileError::invalid_operation(
                    "assignment",
                    "target is not assignable",
                    loc,
                ));
            }
        };
        let Some(target_sym) = target_sym else {
            // Target did not resolve this attempt.
            return self.record(op_expr.meta, Ty::PENDING, meta);
        };

        let (reassignable, is_field) = self
            .table
            .data(target_sym)
            .map(|data| (data.modifiers.is_reassignable(), data.kind == SymbolKind::Field))
            .ok_or_else(|| CompileError::internal("reassign target links to a stub"))?;
        if via_chain && !is_field {
            return Err(CompileError::invalid_operation(
                "assignment",
                "target is not assignable",
                loc,
            ));
        }
        if !reassignable {
            return Err(CompileError::invalid_operation(
                "assignment",
                "Symbol is not mutable",
                loc,
            ));
        }

        let ty = match (value_ty, target_ty.known()) {
            (Ty::Known(value_id), Some(target_id)) => {
                let compat = self.types.check_compatibility(value_id, target_id);
                if !compat.compatible {
                    return Err(CompileError::type_mismatch(
                        self.display_type(&Ty::Known(target_id)),
                        self.display_type(&Ty::Known(value_id)),
                        meta.loc(value.meta()),
                    ));
                }
                if let WideningConversion::Primitive(t) = compat.conversion {
                    meta.set_conversion(value.meta(), Conversion::Primitive(t))?;
                }
                Ty::Known(TypeId::NIL)
            }
            (Ty::Unresolved(lang), Some(target_id)) if !matches!(lang, LangType::Undefined) => {
                // Deferred structural value (empty list) adopting the
                // target's type.
                let compat = self.types.check_deferred(&lang, target_id);
                if compat.compatible {
                    meta.resolve_type(value.meta(), target_id)?;
                    meta.set_conversion(value.meta(), Conversion::Composite(target_id))?;
                    self.settle_pending();
                    Ty::Known(TypeId::NIL)
                } else {
                    return Err(CompileError::type_mismatch(
                        self.display_type(&Ty::Known(target_id)),
                        lang.to_string(),
                        meta.loc(value.meta()),
                    ));
                }
            }
            _ => Ty::PENDING,
        };
        self.record(op_expr.meta, ty, meta)
    }
}
