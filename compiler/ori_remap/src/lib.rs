//! Selective symbol remapping for annotation-driven signature lowering.
//!
//! When an annotation on a parameter or return type changes a function's
//! calling convention, lowering needs a copy of the declaration tree in
//! which exactly the affected declarations own fresh symbols. This crate
//! produces that copy in two passes:
//!
//! 1. [`copy_tree`] rebuilds the tree, asking the [`TransformOracle`] which
//!    declarations are affected and the [`new_symbol_for`] factory for their
//!    replacement symbols. References are rewritten through a memoized
//!    [`RemapTable`]. New symbols are left unbound.
//! 2. [`patch_bindings`] binds each new symbol to the copied declaration
//!    that owns it. Binding is at-most-once, so the pass is idempotent.
//!
//! [`remap_tree`] runs both passes (and, by default in debug builds,
//! [`verify_bindings`]) in the required order; [`remap_units`] does so for
//! independent units in parallel.
//!
//! # Tracing
//!
//! Set `RUST_LOG=ori_remap=debug` and call [`init_tracing`] to see pass
//! summaries; `trace` adds one event per oracle decision and binding. Set
//! `ORI_LOG_TREE=1` for indented span output.

mod copy;
mod error;
mod factory;
mod oracle;
mod patch;
mod pipeline;
pub mod predicate;
mod stack;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use copy::{
    copy_tree, copy_tree_with, CopyOutput, DeclRemapper, IdentityRemapper, RemapTable,
    SelectiveRemapper,
};
pub use error::RemapError;
pub use factory::new_symbol_for;
pub use oracle::TransformOracle;
pub use patch::{patch_bindings, verify_bindings, PatchStats};
pub use pipeline::{remap_tree, remap_units, LoweringUnit, RemapOptions, RemapOutput};
pub use predicate::{contains_annotated, AnnotationPredicate, PredicateError, TypePredicate};

static TRACING_INIT: Once = Once::new();

/// Install a global tracing subscriber.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once, and
/// leaves an already installed subscriber in place.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(filter);

        let installed = if std::env::var("ORI_LOG_TREE").is_ok() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::default()
                        .with_indent_amount(2)
                        .with_indent_lines(true)
                        .with_targets(true),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}
