//! Pass 2 — s-expression calls and member/namespace chains.

use rbc_ast::{Accessor, Conversion, Expr, MemberChain, MetaArena, Modifiers, SExpr, SymbolId, TypeRef};
use rbc_binder::NamespaceId;
use rbc_common::{CompileError, NamespaceErrorKind, SourceLoc, limits};
use rbc_solver::{CompositeType, LangType, WideningConversion};

use crate::state::{CheckPass, Ty};

/// Cloned view of a resolved symbol, so chain logic can keep borrowing
/// the checker mutably.
struct SymbolView {
    sym: SymbolId,
    modifiers: Modifiers,
    type_ref: TypeRef,
}

impl CheckPass<'_> {
    /// `S` — the callee is an arbitrary expression that must resolve to
    /// a function type; operands are checked like call arguments.
    pub(crate) fn check_sexpr(
        &mut self,
        call: &SExpr,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let loc = meta.loc(call.meta);
        let callee_ty = self.check_expr(&call.callee, meta)?;
        let arg_tys = self.check_elements(&call.operands, meta)?;

        let ty = match callee_ty.known() {
            Some(callee_id) => {
                let fn_ty = self.types.lang_type(callee_id).cloned();
                match fn_ty {
                    Some(LangType::Composite(CompositeType::Function { params, ret })) => {
                        let args_done =
                            self.check_call_args(&params, &call.operands, &arg_tys, loc, meta)?;
                        if args_done {
                            match self.types.resolve_id(&ret) {
                                Some(ret_id) => Ty::Known(ret_id),
                                None => Ty::Unresolved(*ret),
                            }
                        } else {
                            Ty::PENDING
                        }
                    }
                    _ => {
                        return Err(CompileError::invalid_operation(
                            "call",
                            "callee is not a function",
                            loc,
                        ));
                    }
                }
            }
            None => Ty::PENDING,
        };
        self.record(call.meta, ty, meta)
    }

    /// Arity (exact) and argument compatibility, recording widening
    /// conversions on argument metadata. Returns `false` when something
    /// is still pending.
    pub(crate) fn check_call_args(
        &mut self,
        params: &[LangType],
        args: &[Expr],
        arg_tys: &[Ty],
        call_loc: SourceLoc,
        meta: &mut MetaArena,
    ) -> Result<bool, CompileError> {
        if params.len() != args.len() {
            return Err(CompileError::invalid_parameter(
                format!("expected {} arguments, found {}", params.len(), args.len()),
                call_loc,
            ));
        }

        let mut all_known = true;
        for ((param, arg), arg_ty) in params.iter().zip(args).zip(arg_tys) {
            let Some(param_id) = self.types.resolve_id(param) else {
                all_known = false;
                continue;
            };
            match arg_ty {
                Ty::Known(arg_id) => {
                    let compat = self.types.check_compatibility(*arg_id, param_id);
                    if !compat.compatible {
                        return Err(CompileError::type_mismatch(
                            param.to_string(),
                            self.display_type(arg_ty),
                            meta.loc(arg.meta()),
                        ));
                    }
                    if let WideningConversion::Primitive(t) = compat.conversion {
                        meta.set_conversion(arg.meta(), Conversion::Primitive(t))?;
                    }
                }
                Ty::Unresolved(lang) if !matches!(lang, LangType::Undefined) => {
                    // Deferred structural argument (empty list).
                    let compat = self.types.check_deferred(lang, param_id);
                    if compat.compatible {
                        meta.resolve_type(arg.meta(), param_id)?;
                        meta.set_conversion(arg.meta(), Conversion::Composite(param_id))?;
                        self.settle_pending();
                    } else {
                        return Err(CompileError::type_mismatch(
                            param.to_string(),
                            lang.to_string(),
                            meta.loc(arg.meta()),
                        ));
                    }
                }
                Ty::Unresolved(_) => all_known = false,
            }
        }
        Ok(all_known)
    }

    /// `M` — accessors resolve left to right. Namespace accessors switch
    /// the lookup root; the single value accessor (identifier or call)
    /// gives the chain its type.
    pub(crate) fn check_member(
        &mut self,
        chain: &MemberChain,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let loc = meta.loc(chain.meta);
        if chain.accessors.is_empty() {
            return Err(CompileError::internal("member chain with no accessors"));
        }
        if chain.accessors.len() > limits::MAX_ACCESS_CHAIN_LEN {
            return Err(CompileError::internal("member chain exceeds the accessor limit"));
        }

        let mut ctx_ns: Option<NamespaceId> = None;
        let mut result: Option<Ty> = None;
        let mut terminal: Option<SymbolId> = None;

        for accessor in &chain.accessors {
            match accessor {
                Accessor::Namespace { name } => {
                    if result.is_some() {
                        return Err(CompileError::invalid_operation(
                            "member access",
                            "namespace accessor after a value",
                            loc,
                        ));
                    }
                    ctx_ns = Some(self.resolve_namespace_segment(ctx_ns, name, loc)?);
                }
                Accessor::Identifier { name } => {
                    if result.is_some() {
                        return Err(CompileError::invalid_operation(
                            "member access",
                            "chained access on a value is not supported",
                            loc,
                        ));
                    }
                    match self.chain_lookup(ctx_ns, name, loc)? {
                        Some(view) => {
                            terminal = Some(view.sym);
                            result = Some(match view.type_ref {
                                TypeRef::Resolved(id) => Ty::Known(id),
                                TypeRef::Unresolved(lang) => Ty::Unresolved(lang),
                            });
                        }
                        None => result = Some(Ty::PENDING),
                    }
                }
                Accessor::Call { name, args } => {
                    if result.is_some() {
                        return Err(CompileError::invalid_operation(
                            "member access",
                            "chained access on a value is not supported",
                            loc,
                        ));
                    }
                    // Arguments are always walked so lexical scopes they
                    // contain keep their Pass 1 numbering.
                    let arg_tys = self.check_elements(args, meta)?;
                    match self.chain_lookup(ctx_ns, name, loc)? {
                        Some(view) => {
                            terminal = Some(view.sym);
                            result = Some(self.check_chain_call(
                                name, &view, args, &arg_tys, loc, meta,
                            )?);
                        }
                        None => result = Some(Ty::PENDING),
                    }
                }
            }
        }

        let Some(result) = result else {
            return Err(CompileError::invalid_operation(
                "member access",
                "namespace path is not a value",
                loc,
            ));
        };
        if let Some(sym) = terminal {
            meta.link_symbol(chain.meta, sym)?;
        }
        self.record(chain.meta, result, meta)
    }

    fn check_chain_call(
        &mut self,
        name: &str,
        view: &SymbolView,
        args: &[Expr],
        arg_tys: &[Ty],
        loc: SourceLoc,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        let TypeRef::Resolved(fn_id) = view.type_ref else {
            return Ok(Ty::PENDING);
        };
        let fn_ty = self.types.lang_type(fn_id).cloned();
        let Some(LangType::Composite(CompositeType::Function { params, ret })) = fn_ty else {
            return Err(CompileError::invalid_operation(
                "call",
                format!("'{name}' is not a function"),
                loc,
            ));
        };
        if self.check_call_args(&params, args, arg_tys, loc, meta)? {
            match self.types.resolve_id(&ret) {
                Some(ret_id) => Ok(Ty::Known(ret_id)),
                None => Ok(Ty::Unresolved(*ret)),
            }
        } else {
            Ok(Ty::PENDING)
        }
    }

    /// Resolve one namespace segment: from the current context, or for
    /// the leading segment, a child of the current namespace or of the
    /// root. A missing namespace is positively wrong — the tree is
    /// complete before resolution starts.
    fn resolve_namespace_segment(
        &self,
        ctx_ns: Option<NamespaceId>,
        name: &str,
        loc: SourceLoc,
    ) -> Result<NamespaceId, CompileError> {
        let found = match ctx_ns {
            Some(ns) => self.tree.child_of(ns, name),
            None => self
                .tree
                .child_of(self.env.ns(), name)
                .or_else(|| self.tree.child_of(NamespaceId::ROOT, name)),
        };
        found.ok_or_else(|| CompileError::namespace(NamespaceErrorKind::PathNotFound, name, loc))
    }

    /// Look a chain name up lexically (no namespace accessor yet) or in
    /// the target namespace's global scope. Crossing a namespace
    /// boundary requires the symbol to be `PUBLIC`.
    fn chain_lookup(
        &mut self,
        ctx_ns: Option<NamespaceId>,
        name: &str,
        loc: SourceLoc,
    ) -> Result<Option<SymbolView>, CompileError> {
        let found = match ctx_ns {
            None => self.env.lookup(self.table, name),
            Some(ns) => self.env.lookup_global(self.table, ns, name),
        };
        let Some(sym) = found else {
            self.record_missing_symbol(name, loc);
            return Ok(None);
        };
        let view = self.table.data(sym).map(|data| SymbolView {
            sym,
            modifiers: data.modifiers,
            type_ref: data.type_ref.clone(),
        });
        let Some(view) = view else {
            self.record_missing_symbol(name, loc);
            return Ok(None);
        };

        let crossing = ctx_ns.is_some_and(|ns| ns != self.env.ns());
        if crossing && !view.modifiers.contains(Modifiers::PUBLIC) {
            return Err(CompileError::invalid_symbol(
                format!("symbol '{name}' is not public"),
                loc,
            ));
        }
        Ok(Some(view))
    }
}
