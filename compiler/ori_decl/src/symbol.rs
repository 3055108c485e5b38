//! Symbols and their binding state.
//!
//! A [`SymbolTable`] owns every symbol of one lowering unit. Symbols are
//! addressed by [`SymbolId`]; two ids are equal exactly when they name the
//! same symbol, which is what "reference-equal" means for passes that keep
//! an original symbol instead of allocating a new one.

use std::fmt;

use crate::{DeclRef, Name, Span, TreeId};

/// Handle to a symbol in a [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create a symbol ID from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Function symbol sub-variants.
///
/// Accessors and container-sourced functions carry provenance that a
/// replacement symbol must keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionKind {
    /// Ordinary function, local function or lambda.
    Plain,
    /// Getter of `property`.
    PropertyGetter { property: Name },
    /// Setter of `property`.
    PropertySetter { property: Name },
    /// Function whose definition comes from an external container (a
    /// compiled library facade or file class).
    ContainerSource { container: Name },
}

/// The closed set of symbol variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    /// A class. Classes are containers only and are never remapped.
    Class,
    Constructor,
    Function(FunctionKind),
    ValueParameter,
    ReceiverParameter,
    TypeParameter,
}

impl SymbolKind {
    /// Human-readable variant name for logs and errors.
    pub fn describe(self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Function(FunctionKind::Plain) => "function",
            SymbolKind::Function(FunctionKind::PropertyGetter { .. }) => "property getter",
            SymbolKind::Function(FunctionKind::PropertySetter { .. }) => "property setter",
            SymbolKind::Function(FunctionKind::ContainerSource { .. }) => {
                "function with container source"
            }
            SymbolKind::ValueParameter => "value parameter",
            SymbolKind::ReceiverParameter => "receiver parameter",
            SymbolKind::TypeParameter => "type parameter",
        }
    }

    /// Returns `true` for variants a signature rewrite may replace.
    pub fn is_remappable(self) -> bool {
        !matches!(self, SymbolKind::Class)
    }
}

/// Where a symbol came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolOrigin {
    /// Declared in source and bound when the tree was built.
    Declared,
    /// Synthetic placeholder allocated by a lowering pass.
    Wrapped,
}

/// Binding state of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BindState {
    Unbound,
    Bound(DeclRef),
}

/// Result of [`SymbolTable::bind_if_needed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// The symbol was unbound and is now bound.
    Bound,
    /// The symbol was already bound; nothing changed.
    AlreadyBound,
}

/// Per-symbol data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolData {
    pub kind: SymbolKind,
    pub origin: SymbolOrigin,
    /// Source-location tag. Provisional until the symbol is bound.
    pub source: Option<Span>,
    state: BindState,
}

impl SymbolData {
    /// Current binding state.
    #[inline]
    pub fn state(&self) -> BindState {
        self.state
    }

    /// Returns `true` once the symbol names a declaration.
    #[inline]
    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindState::Bound(_))
    }

    /// Returns `true` for placeholders allocated by a lowering pass.
    #[inline]
    pub fn is_wrapped(&self) -> bool {
        self.origin == SymbolOrigin::Wrapped
    }
}

/// Errors from symbol lookups and binding.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// The id does not belong to this table.
    #[error("unknown symbol {0:?}")]
    Unknown(SymbolId),
    /// The symbol has been allocated but not yet bound to a declaration.
    #[error("symbol {0:?} is not bound to a declaration")]
    Unbound(SymbolId),
}

/// All symbols of one lowering unit.
///
/// Each unit owns its table; units processed in parallel never share one.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolTable {
    symbols: Vec<SymbolData>,
    next_tree: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an unbound symbol.
    pub fn alloc(
        &mut self,
        kind: SymbolKind,
        origin: SymbolOrigin,
        source: Option<Span>,
    ) -> SymbolId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "symbol counts always fit u32"
        )]
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(SymbolData {
            kind,
            origin,
            source,
            state: BindState::Unbound,
        });
        id
    }

    /// Allocate an unbound placeholder symbol for a rewritten declaration.
    pub fn alloc_wrapped(&mut self, kind: SymbolKind, source: Option<Span>) -> SymbolId {
        self.alloc(kind, SymbolOrigin::Wrapped, source)
    }

    /// Look up a symbol.
    pub fn get(&self, id: SymbolId) -> Result<&SymbolData, SymbolError> {
        self.symbols.get(id.index()).ok_or(SymbolError::Unknown(id))
    }

    /// Variant of a symbol.
    pub fn kind(&self, id: SymbolId) -> Result<SymbolKind, SymbolError> {
        self.get(id).map(|data| data.kind)
    }

    /// Returns `true` if `id` exists and is bound.
    pub fn is_bound(&self, id: SymbolId) -> bool {
        self.get(id).is_ok_and(SymbolData::is_bound)
    }

    /// The declaration a symbol names.
    ///
    /// Fails with [`SymbolError::Unbound`] while the symbol is still a
    /// placeholder.
    pub fn declaration(&self, id: SymbolId) -> Result<DeclRef, SymbolError> {
        match self.get(id)?.state {
            BindState::Bound(decl) => Ok(decl),
            BindState::Unbound => Err(SymbolError::Unbound(id)),
        }
    }

    /// Bind `id` to `at` unless it is already bound.
    ///
    /// Binding is at-most-once: a second call leaves the first binding in
    /// place and reports [`BindOutcome::AlreadyBound`]. A symbol without a
    /// source tag takes `span` from the declaration it is bound to.
    pub fn bind_if_needed(
        &mut self,
        id: SymbolId,
        at: DeclRef,
        span: Span,
    ) -> Result<BindOutcome, SymbolError> {
        let data = self
            .symbols
            .get_mut(id.index())
            .ok_or(SymbolError::Unknown(id))?;
        if data.is_bound() {
            return Ok(BindOutcome::AlreadyBound);
        }
        data.state = BindState::Bound(at);
        if data.source.is_none() {
            data.source = Some(span);
        }
        Ok(BindOutcome::Bound)
    }

    /// Allocate the id of a new declaration tree.
    pub fn fresh_tree_id(&mut self) -> TreeId {
        let id = TreeId::new(self.next_tree);
        self.next_tree += 1;
        id
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no symbol was allocated.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate all symbols with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolData)> {
        self.symbols.iter().enumerate().map(|(i, data)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "symbol counts always fit u32"
            )]
            let id = SymbolId::new(i as u32);
            (id, data)
        })
    }
}
