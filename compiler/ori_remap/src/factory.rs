//! Symbol factory.
//!
//! Allocates the replacement symbol for a transformed declaration. The new
//! symbol keeps the variant of the original, including the provenance of
//! accessors and container-sourced functions, and starts unbound; the
//! binding patcher attaches it to its copied declaration later.

use ori_decl::{FunctionKind, SymbolError, SymbolId, SymbolKind, SymbolTable};

/// Replacement symbol for `original`.
///
/// Untransformed declarations keep their symbol: no allocation, and later
/// passes and diagnostics keep pointing at the same symbol.
pub fn new_symbol_for(
    symbols: &mut SymbolTable,
    original: SymbolId,
    transformed: bool,
) -> Result<SymbolId, SymbolError> {
    if !transformed {
        return Ok(original);
    }

    let data = symbols.get(original)?;
    let (kind, source) = match data.kind {
        SymbolKind::Class => return Ok(original),
        SymbolKind::Function(FunctionKind::Plain) => {
            // Nothing else identifies a plain function until it is bound, so
            // the source tag travels with the new symbol for diagnostics.
            (SymbolKind::Function(FunctionKind::Plain), data.source)
        }
        SymbolKind::Function(
            kind @ (FunctionKind::PropertyGetter { .. }
            | FunctionKind::PropertySetter { .. }
            | FunctionKind::ContainerSource { .. }),
        ) => (SymbolKind::Function(kind), None),
        kind @ (SymbolKind::Constructor
        | SymbolKind::ValueParameter
        | SymbolKind::ReceiverParameter
        | SymbolKind::TypeParameter) => (kind, None),
    };

    let fresh = symbols.alloc_wrapped(kind, source);
    tracing::debug!(
        original = original.raw(),
        fresh = fresh.raw(),
        kind = kind.describe(),
        "allocated replacement symbol"
    );
    Ok(fresh)
}
