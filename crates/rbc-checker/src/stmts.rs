//! Pass 2 — let bindings and local reassignment statements.

use rbc_ast::{AssignStmt, Conversion, LetStmt, MetaArena, TypeRef};
use rbc_common::CompileError;
use rbc_solver::{LangType, TypeId, WideningConversion};

use crate::state::{CheckPass, Ty};

impl CheckPass<'_> {
    /// `let <id> [: <type>] = <expr>` — resolve the initializer, check
    /// it against the declared type (recording any widening conversion
    /// on the initializer's metadata), and finalize the symbol's type.
    pub(crate) fn check_let(
        &mut self,
        stmt: &LetStmt,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let loc = meta.loc(stmt.meta);
        let value_ty = self.check_expr(&stmt.value, meta)?;
        let sym = self
            .table
            .lookup_in(self.env.current_ns_scope(), &stmt.name)
            .ok_or_else(|| CompileError::internal("let binding missing from Pass 1"))?;

        let complete = match &stmt.declared_ty {
            Some(declared) => match self.types.resolve_id(declared) {
                Some(declared_id) => {
                    // The declared type is authoritative for the symbol,
                    // even while the initializer is still pending.
                    self.table.finalize_type(sym, declared_id)?;
                    match &value_ty {
                        Ty::Known(value_id) => {
                            let compat = self.types.check_compatibility(*value_id, declared_id);
                            if !compat.compatible {
                                return Err(CompileError::type_mismatch(
                                    declared.to_string(),
                                    self.display_type(&value_ty),
                                    loc,
                                ));
                            }
                            if let WideningConversion::Primitive(t) = compat.conversion {
                                meta.set_conversion(stmt.value.meta(), Conversion::Primitive(t))?;
                            }
                            true
                        }
                        Ty::Unresolved(LangType::Undefined) => false,
                        Ty::Unresolved(lang) => {
                            // Structurally known value with undefined
                            // leaves (empty list): adopt the declared
                            // type or fail.
                            let compat = self.types.check_deferred(lang, declared_id);
                            if !compat.compatible {
                                return Err(CompileError::type_mismatch(
                                    declared.to_string(),
                                    lang.to_string(),
                                    loc,
                                ));
                            }
                            meta.resolve_type(stmt.value.meta(), declared_id)?;
                            meta.set_conversion(stmt.value.meta(), Conversion::Composite(declared_id))?;
                            self.settle_pending();
                            true
                        }
                    }
                }
                // Declared type names a user type that is not declared
                // yet; retried next attempt.
                None => false,
            },
            None => match value_ty.known() {
                Some(value_id) => {
                    self.table.finalize_type(sym, value_id)?;
                    true
                }
                None => false,
            },
        };

        let ty = if complete { Ty::Known(TypeId::NIL) } else { Ty::PENDING };
        self.record(stmt.meta, ty, meta)
    }

    /// `<id> := <expr>` as a statement — the target must exist, be
    /// `MUTABLE` and not `CONST`; the value must be
    /// assignment-compatible.
    pub(crate) fn check_assign(
        &mut self,
        stmt: &AssignStmt,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let loc = meta.loc(stmt.meta);
        let value_ty = self.check_expr(&stmt.value, meta)?;

        let Some(sym) = self.env.lookup(self.table, &stmt.target) else {
            self.record_missing_symbol(&stmt.target, loc);
            return self.record(stmt.meta, Ty::PENDING, meta);
        };
        let view = self
            .table
            .data(sym)
            .map(|data| (data.modifiers, data.type_ref.clone()));
        let Some((modifiers, type_ref)) = view else {
            self.record_missing_symbol(&stmt.target, loc);
            return self.record(stmt.meta, Ty::PENDING, meta);
        };

        if !modifiers.is_reassignable() {
            return Err(CompileError::invalid_assignment("Symbol is not mutable", loc));
        }
        meta.link_symbol(stmt.meta, sym)?;

        let ty = match (&value_ty, &type_ref) {
            (Ty::Known(value_id), TypeRef::Resolved(target_id)) => {
                let compat = self.types.check_compatibility(*value_id, *target_id);
                if !compat.compatible {
                    return Err(CompileError::type_mismatch(
                        self.display_type(&Ty::Known(*target_id)),
                        self.display_type(&value_ty),
                        meta.loc(stmt.value.meta()),
                    ));
                }
                if let WideningConversion::Primitive(t) = compat.conversion {
                    meta.set_conversion(stmt.value.meta(), Conversion::Primitive(t))?;
                }
                Ty::Known(TypeId::NIL)
            }
            (Ty::Unresolved(lang), TypeRef::Resolved(target_id))
                if !matches!(lang, LangType::Undefined) =>
            {
                let compat = self.types.check_deferred(lang, *target_id);
                if !compat.compatible {
                    return Err(CompileError::type_mismatch(
                        self.display_type(&Ty::Known(*target_id)),
                        lang.to_string(),
                        meta.loc(stmt.value.meta()),
                    ));
                }
                meta.resolve_type(stmt.value.meta(), *target_id)?;
                meta.set_conversion(stmt.value.meta(), Conversion::Composite(*target_id))?;
                self.settle_pending();
                Ty::Known(TypeId::NIL)
            }
            _ => Ty::PENDING,
        };
        self.record(stmt.meta, ty, meta)
    }
}
