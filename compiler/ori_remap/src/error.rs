//! Errors raised while remapping a declaration tree.

use ori_decl::{DeclId, SymbolError, SymbolId, TreeError};

use crate::predicate::PredicateError;

/// Failure of a remapping pass.
///
/// None of these are recoverable within a lowering unit: the surrounding
/// pipeline reports them as internal errors and abandons the unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemapError {
    /// The type predicate failed while deciding whether `decl` is transformed.
    #[error("type predicate failed for {decl:?}: {source}")]
    Predicate {
        decl: DeclId,
        #[source]
        source: PredicateError,
    },

    /// A symbol was still unbound after patching.
    #[error("{kind} symbol {symbol:?} of {decl:?} was never bound to its declaration")]
    UnboundSymbol {
        symbol: SymbolId,
        decl: DeclId,
        kind: &'static str,
    },

    /// A placeholder labels a declaration it can never be bound to.
    #[error("{symbol_kind} placeholder {symbol:?} is owned by {decl_kind} {decl:?}")]
    KindMismatch {
        symbol: SymbolId,
        decl: DeclId,
        symbol_kind: &'static str,
        decl_kind: &'static str,
    },

    /// Two declarations in one tree claim the same symbol.
    #[error("symbol {symbol:?} is declared by both {first:?} and {second:?}")]
    DuplicateDeclaration {
        symbol: SymbolId,
        first: DeclId,
        second: DeclId,
    },

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
