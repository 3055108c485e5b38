//! Binding patcher.
//!
//! Second pass over a copied tree. Every placeholder symbol owned by a
//! declaration is bound to that declaration unless it already is. The pass
//! only reads the tree, so it can run any number of times, in any traversal
//! order, with the same result.
//!
//! Both walks recurse once per nesting level, like the copier, and grow the
//! stack the same way.

use ori_decl::visit::{walk_decl, walk_tree, DeclVisitor};
use ori_decl::{BindOutcome, DeclId, DeclRef, DeclTree, SymbolTable};

use crate::stack::ensure_sufficient_stack;
use crate::RemapError;

/// Counts from one [`patch_bindings`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Declarations reached from the roots.
    pub visited: usize,
    /// Placeholders bound by this run.
    pub bound: usize,
    /// Placeholders that were bound before this run.
    pub already_bound: usize,
}

/// Bind every unbound placeholder in `tree` to the node that owns it.
///
/// A placeholder whose kind cannot label its node is an error: it could
/// never be bound, and the unit would carry a dangling symbol.
#[tracing::instrument(level = "debug", skip_all, fields(tree = tree.id().raw()))]
pub fn patch_bindings(tree: &DeclTree, symbols: &mut SymbolTable) -> Result<PatchStats, RemapError> {
    let mut patcher = Patcher {
        symbols,
        stats: PatchStats::default(),
    };
    walk_tree(&mut patcher, tree)?;
    let stats = patcher.stats;
    tracing::debug!(
        visited = stats.visited,
        bound = stats.bound,
        already_bound = stats.already_bound,
        "bindings patched"
    );
    Ok(stats)
}

struct Patcher<'a> {
    symbols: &'a mut SymbolTable,
    stats: PatchStats,
}

impl DeclVisitor for Patcher<'_> {
    type Error = RemapError;

    fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), RemapError> {
        ensure_sufficient_stack(|| {
            self.stats.visited += 1;
            let decl = tree.decl(id)?;
            let data = self.symbols.get(decl.symbol)?;
            let (kind, wrapped) = (data.kind, data.is_wrapped());

            if wrapped && kind.is_remappable() {
                if !decl.kind.accepts(kind) {
                    return Err(RemapError::KindMismatch {
                        symbol: decl.symbol,
                        decl: id,
                        symbol_kind: kind.describe(),
                        decl_kind: decl.kind.describe(),
                    });
                }
                let at = DeclRef {
                    tree: tree.id(),
                    decl: id,
                };
                match self.symbols.bind_if_needed(decl.symbol, at, decl.span)? {
                    BindOutcome::Bound => {
                        self.stats.bound += 1;
                        tracing::trace!(symbol = decl.symbol.raw(), decl = id.raw(), "bound");
                    }
                    BindOutcome::AlreadyBound => self.stats.already_bound += 1,
                }
            }

            walk_decl(self, tree, id)
        })
    }
}

/// Check that every symbol declared in `tree` is bound.
///
/// Fails on the first unbound symbol in traversal order. Symbols bound to
/// a different tree are accepted: untransformed declarations keep the
/// symbols of the tree they were copied from.
#[tracing::instrument(level = "debug", skip_all, fields(tree = tree.id().raw()))]
pub fn verify_bindings(tree: &DeclTree, symbols: &SymbolTable) -> Result<(), RemapError> {
    walk_tree(&mut Verifier { symbols }, tree)
}

struct Verifier<'a> {
    symbols: &'a SymbolTable,
}

impl DeclVisitor for Verifier<'_> {
    type Error = RemapError;

    fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), RemapError> {
        ensure_sufficient_stack(|| {
            let decl = tree.decl(id)?;
            let data = self.symbols.get(decl.symbol)?;
            if !data.is_bound() {
                return Err(RemapError::UnboundSymbol {
                    symbol: decl.symbol,
                    decl: id,
                    kind: data.kind.describe(),
                });
            }
            walk_decl(self, tree, id)
        })
    }
}

#[cfg(test)]
mod tests;
