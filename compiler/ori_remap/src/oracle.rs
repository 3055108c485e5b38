//! Transformation oracle.
//!
//! Decides whether a declaration's signature is affected by the annotation
//! and therefore needs a fresh symbol in the copy.
//!
//! | Declaration | Transformed iff |
//! |---|---|
//! | constructor | placeholder symbol, or a value parameter type is annotated |
//! | function | placeholder symbol, or a value parameter type or the return type is annotated |
//! | value / receiver parameter | placeholder symbol, or its own type is annotated, or its function/constructor is transformed |
//! | type parameter | placeholder symbol, or its function/constructor is transformed |
//! | class | never |
//!
//! "Annotated" means [`contains_annotated`]: the type or one of its direct
//! generic arguments satisfies the [`TypePredicate`].
//!
//! Status propagates from a signature down to the parameters it declares,
//! never upward: a function is transformed only by its own signature.
//! Placeholder symbols (`SymbolOrigin::Wrapped`) left by an earlier pass are
//! always transformed again, so rerunning the pass over partially lowered
//! trees keeps every placeholder attached to the node it labels.

use ori_decl::{Decl, DeclId, DeclKind, DeclTree, SymbolTable, TypeDesc};
use rustc_hash::FxHashMap;

use crate::predicate::{contains_annotated, TypePredicate};
use crate::RemapError;

/// Memoizing transformation oracle over one input tree.
pub struct TransformOracle<'a, P: ?Sized> {
    tree: &'a DeclTree,
    predicate: &'a P,
    decisions: FxHashMap<DeclId, bool>,
}

impl<'a, P: TypePredicate + ?Sized> TransformOracle<'a, P> {
    pub fn new(tree: &'a DeclTree, predicate: &'a P) -> Self {
        TransformOracle {
            tree,
            predicate,
            decisions: FxHashMap::default(),
        }
    }

    /// The tree decisions are made over.
    #[inline]
    pub fn tree(&self) -> &'a DeclTree {
        self.tree
    }

    /// Decide whether `id` must be duplicated with a new symbol.
    pub fn is_transformed(&mut self, symbols: &SymbolTable, id: DeclId) -> Result<bool, RemapError> {
        if let Some(&decision) = self.decisions.get(&id) {
            return Ok(decision);
        }

        let tree = self.tree;
        let decl = tree.decl(id)?;
        let placeholder = symbols.get(decl.symbol)?.is_wrapped();

        let decision = match &decl.kind {
            DeclKind::Class { .. } => false,
            DeclKind::Constructor { params, .. } => {
                placeholder || self.any_param_annotated(id, params)?
            }
            DeclKind::Function {
                params,
                return_type,
                ..
            } => {
                placeholder
                    || self.any_param_annotated(id, params)?
                    || self.return_annotated(id, return_type.as_ref())?
            }
            DeclKind::ValueParameter { ty, .. } | DeclKind::ReceiverParameter { ty } => {
                placeholder
                    || self.annotated(id, ty)?
                    || self.container_transformed(symbols, decl)?
            }
            DeclKind::TypeParameter { .. } => {
                placeholder || self.container_transformed(symbols, decl)?
            }
        };

        tracing::trace!(
            decl = id.raw(),
            kind = decl.kind.describe(),
            placeholder,
            decision,
            "transformation decided"
        );
        self.decisions.insert(id, decision);
        Ok(decision)
    }

    fn annotated(&self, decl: DeclId, ty: &TypeDesc) -> Result<bool, RemapError> {
        contains_annotated(self.predicate, ty).map_err(|source| RemapError::Predicate { decl, source })
    }

    fn any_param_annotated(&self, owner: DeclId, params: &[DeclId]) -> Result<bool, RemapError> {
        for &param in params {
            if let DeclKind::ValueParameter { ty, .. } = &self.tree.decl(param)?.kind {
                if self.annotated(owner, ty)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// An absent return type never triggers a rewrite.
    fn return_annotated(&self, owner: DeclId, ty: Option<&TypeDesc>) -> Result<bool, RemapError> {
        match ty {
            Some(ty) => self.annotated(owner, ty),
            None => Ok(false),
        }
    }

    fn container_transformed(&mut self, symbols: &SymbolTable, decl: &Decl) -> Result<bool, RemapError> {
        let Some(container) = decl.container else {
            return Ok(false);
        };
        match self.tree.decl(container)?.kind {
            DeclKind::Function { .. } | DeclKind::Constructor { .. } => {
                self.is_transformed(symbols, container)
            }
            _ => Ok(false),
        }
    }
}
