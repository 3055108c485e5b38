//! Remapping pipeline: copy, then patch, then (optionally) verify.
//!
//! Symbols allocated by the copier are only usable after the patcher has
//! run over the complete copy. These entry points keep the two passes in
//! that order so callers never see a half-bound tree.

use ori_decl::{DeclTree, SymbolTable};
use rayon::prelude::*;

use crate::copy::{copy_tree, RemapTable};
use crate::patch::{patch_bindings, verify_bindings, PatchStats};
use crate::predicate::TypePredicate;
use crate::RemapError;

/// Knobs for [`remap_tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemapOptions {
    /// Check that every declared symbol is bound after patching.
    pub verify_bindings: bool,
}

impl Default for RemapOptions {
    fn default() -> Self {
        RemapOptions {
            verify_bindings: cfg!(debug_assertions),
        }
    }
}

/// A fully remapped and bound tree.
#[derive(Clone, Debug)]
pub struct RemapOutput {
    pub tree: DeclTree,
    pub table: RemapTable,
    pub stats: PatchStats,
}

/// Copy `input` with selective symbol substitution and bind the result.
pub fn remap_tree<P: TypePredicate + ?Sized>(
    input: &DeclTree,
    symbols: &mut SymbolTable,
    predicate: &P,
    options: &RemapOptions,
) -> Result<RemapOutput, RemapError> {
    let copy = copy_tree(input, symbols, predicate)?;
    let stats = patch_bindings(&copy.tree, symbols)?;
    if options.verify_bindings {
        verify_bindings(&copy.tree, symbols)?;
    }
    Ok(RemapOutput {
        tree: copy.tree,
        table: copy.table,
        stats,
    })
}

/// One independently lowered compilation unit.
///
/// Units never share symbols, so each carries its own table.
#[derive(Clone, Debug)]
pub struct LoweringUnit {
    pub symbols: SymbolTable,
    pub tree: DeclTree,
}

impl LoweringUnit {
    pub fn new(symbols: SymbolTable, tree: DeclTree) -> Self {
        LoweringUnit { symbols, tree }
    }

    /// Replace this unit's tree with its remapped copy.
    pub fn remap<P: TypePredicate + ?Sized>(
        &mut self,
        predicate: &P,
        options: &RemapOptions,
    ) -> Result<(RemapTable, PatchStats), RemapError> {
        let out = remap_tree(&self.tree, &mut self.symbols, predicate, options)?;
        self.tree = out.tree;
        Ok((out.table, out.stats))
    }
}

/// Remap every unit in parallel.
///
/// Results are in unit order. A failing unit keeps its input tree; the
/// others are unaffected.
#[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
pub fn remap_units<P: TypePredicate + Sync + ?Sized>(
    units: &mut [LoweringUnit],
    predicate: &P,
    options: &RemapOptions,
) -> Vec<Result<(RemapTable, PatchStats), RemapError>> {
    units
        .par_iter_mut()
        .map(|unit| unit.remap(predicate, options))
        .collect()
}
