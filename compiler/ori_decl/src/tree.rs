//! Declaration trees.
//!
//! A [`DeclTree`] is an arena of [`Decl`] nodes addressed by [`DeclId`].
//! Containment is the only structural relation: each node lists its child
//! declarations (type parameters, receivers, value parameters, members,
//! declarations nested in bodies) and records its container.
//!
//! Containers are wired by [`DeclTree::alloc`], which requires children to
//! be allocated before their parent. Both the builder and the tree copier
//! work bottom-up for that reason.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::symbol::{BindOutcome, SymbolOrigin};
use crate::{Body, Expr, Name, Span, SymbolId, SymbolKind, SymbolTable, TypeDesc};

/// Index of a declaration within one [`DeclTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Identity of a declaration tree, unique within a [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TreeId(u32);

impl TreeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({})", self.0)
    }
}

/// A declaration in a specific tree: what a bound symbol points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclRef {
    pub tree: TreeId,
    pub decl: DeclId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

bitflags! {
    /// Declaration modifiers. Carried through copies unchanged.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u16 {
        const INLINE = 1 << 0;
        const OVERRIDE = 1 << 1;
        const ABSTRACT = 1 << 2;
        const OPEN = 1 << 3;
        const SUSPEND = 1 << 4;
        const EXTERNAL = 1 << 5;
        const OPERATOR = 1 << 6;
        const VARARG = 1 << 7;
        const NOINLINE = 1 << 8;
        const CROSSINLINE = 1 << 9;
        const REIFIED = 1 << 10;
    }
}

/// Kind-specific payload of a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    Class {
        name: Name,
        type_params: Vec<DeclId>,
        this_receiver: Option<DeclId>,
        members: Vec<DeclId>,
    },
    Constructor {
        type_params: Vec<DeclId>,
        params: Vec<DeclId>,
        body: Option<Body>,
    },
    Function {
        name: Name,
        type_params: Vec<DeclId>,
        receiver: Option<DeclId>,
        params: Vec<DeclId>,
        /// `None` when the return type is absent or unresolved.
        return_type: Option<TypeDesc>,
        body: Option<Body>,
    },
    ValueParameter {
        name: Name,
        ty: TypeDesc,
        default: Option<Expr>,
    },
    ReceiverParameter {
        ty: TypeDesc,
    },
    TypeParameter {
        name: Name,
        bounds: Vec<TypeDesc>,
    },
}

impl DeclKind {
    /// A plain function signature without type parameters, receiver or body.
    pub fn function(name: Name, params: Vec<DeclId>, return_type: Option<TypeDesc>) -> Self {
        DeclKind::Function {
            name,
            type_params: Vec::new(),
            receiver: None,
            params,
            return_type,
            body: None,
        }
    }

    /// A value parameter without a default.
    pub fn value_param(name: Name, ty: TypeDesc) -> Self {
        DeclKind::ValueParameter {
            name,
            ty,
            default: None,
        }
    }

    /// A type parameter with the given upper bounds.
    pub fn type_param(name: Name, bounds: Vec<TypeDesc>) -> Self {
        DeclKind::TypeParameter { name, bounds }
    }

    /// Short label for logs and errors.
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Class { .. } => "class",
            DeclKind::Constructor { .. } => "constructor",
            DeclKind::Function { .. } => "function",
            DeclKind::ValueParameter { .. } => "value parameter",
            DeclKind::ReceiverParameter { .. } => "receiver parameter",
            DeclKind::TypeParameter { .. } => "type parameter",
        }
    }

    /// Returns `true` if a symbol of `kind` may label a declaration of this kind.
    pub fn accepts(&self, kind: SymbolKind) -> bool {
        matches!(
            (self, kind),
            (DeclKind::Class { .. }, SymbolKind::Class)
                | (DeclKind::Constructor { .. }, SymbolKind::Constructor)
                | (DeclKind::Function { .. }, SymbolKind::Function(_))
                | (DeclKind::ValueParameter { .. }, SymbolKind::ValueParameter)
                | (DeclKind::ReceiverParameter { .. }, SymbolKind::ReceiverParameter)
                | (DeclKind::TypeParameter { .. }, SymbolKind::TypeParameter)
        )
    }

    /// Child declarations in source order: type parameters, receiver,
    /// value parameters, members, then declarations nested in bodies and
    /// default values.
    pub fn children(&self) -> SmallVec<[DeclId; 8]> {
        let mut out = SmallVec::new();
        match self {
            DeclKind::Class {
                type_params,
                this_receiver,
                members,
                ..
            } => {
                out.extend(type_params.iter().copied());
                out.extend(*this_receiver);
                out.extend(members.iter().copied());
            }
            DeclKind::Constructor {
                type_params,
                params,
                body,
            } => {
                out.extend(type_params.iter().copied());
                out.extend(params.iter().copied());
                if let Some(body) = body {
                    body.for_each_nested_decl(&mut |d| out.push(d));
                }
            }
            DeclKind::Function {
                type_params,
                receiver,
                params,
                body,
                ..
            } => {
                out.extend(type_params.iter().copied());
                out.extend(*receiver);
                out.extend(params.iter().copied());
                if let Some(body) = body {
                    body.for_each_nested_decl(&mut |d| out.push(d));
                }
            }
            DeclKind::ValueParameter { default, .. } => {
                if let Some(default) = default {
                    default.for_each_nested_decl(&mut |d| out.push(d));
                }
            }
            DeclKind::ReceiverParameter { .. } | DeclKind::TypeParameter { .. } => {}
        }
        out
    }
}

/// A declaration node. Owns exactly one symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Decl {
    pub symbol: SymbolId,
    pub kind: DeclKind,
    /// Set when the containing declaration is allocated.
    pub container: Option<DeclId>,
    pub span: Span,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub annotations: SmallVec<[Name; 1]>,
}

impl Decl {
    pub fn new(symbol: SymbolId, kind: DeclKind) -> Self {
        Decl {
            symbol,
            kind,
            container: None,
            span: Span::DUMMY,
            visibility: Visibility::Public,
            modifiers: Modifiers::empty(),
            annotations: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Structural errors in a declaration tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("{decl:?} is not a declaration of tree {tree:?}")]
    UnknownDecl { tree: TreeId, decl: DeclId },
}

/// Arena of declarations with a list of roots.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclTree {
    id: TreeId,
    decls: Vec<Decl>,
    roots: Vec<DeclId>,
}

impl DeclTree {
    /// Create an empty tree.
    pub fn new(id: TreeId) -> Self {
        DeclTree {
            id,
            decls: Vec::new(),
            roots: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Add a declaration and make it the container of its children.
    ///
    /// Children must already be allocated.
    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena indices always fit u32"
        )]
        let id = DeclId::new(self.decls.len() as u32);
        for child in decl.kind.children() {
            if let Some(child) = self.decls.get_mut(child.index()) {
                child.container = Some(id);
            }
        }
        self.decls.push(decl);
        id
    }

    /// Register a top-level declaration.
    pub fn add_root(&mut self, id: DeclId) {
        self.roots.push(id);
    }

    /// Look up a declaration.
    #[inline]
    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    /// Look up a declaration, reporting unknown ids as an error.
    pub fn decl(&self, id: DeclId) -> Result<&Decl, TreeError> {
        self.get(id).ok_or(TreeError::UnknownDecl {
            tree: self.id,
            decl: id,
        })
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        self.decls.get_mut(id.index())
    }

    /// Top-level declarations in source order.
    #[inline]
    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// All declarations with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls.iter().enumerate().map(|(i, decl)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "arena indices always fit u32"
            )]
            let id = DeclId::new(i as u32);
            (id, decl)
        })
    }

    /// The declaration containing `id`, if any.
    pub fn container_of(&self, id: DeclId) -> Option<&Decl> {
        self.get(id)?.container.and_then(|c| self.get(c))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Builds a source-level tree: every declaration gets a fresh symbol that is
/// bound to it immediately.
///
/// Upstream phases use this to hand a tree to lowering passes; tests use it
/// to set up fixtures, including placeholders left by an earlier pass
/// (see [`DeclTreeBuilder::add_with`]).
pub struct DeclTreeBuilder<'s> {
    tree: DeclTree,
    symbols: &'s mut SymbolTable,
}

impl<'s> DeclTreeBuilder<'s> {
    pub fn new(symbols: &'s mut SymbolTable) -> Self {
        let id = symbols.fresh_tree_id();
        DeclTreeBuilder {
            tree: DeclTree::new(id),
            symbols,
        }
    }

    /// Add a declared node with a new symbol of `symbol_kind`.
    pub fn add(&mut self, symbol_kind: SymbolKind, kind: DeclKind) -> DeclId {
        self.add_with(SymbolOrigin::Declared, symbol_kind, kind, Span::DUMMY)
    }

    /// Add a node whose symbol has the given origin and source span.
    pub fn add_with(
        &mut self,
        origin: SymbolOrigin,
        symbol_kind: SymbolKind,
        kind: DeclKind,
        span: Span,
    ) -> DeclId {
        let symbol = self.symbols.alloc(symbol_kind, origin, Some(span));
        let id = self.tree.alloc(Decl::new(symbol, kind).with_span(span));
        let outcome = self.symbols.bind_if_needed(
            symbol,
            DeclRef {
                tree: self.tree.id,
                decl: id,
            },
            span,
        );
        debug_assert_eq!(outcome, Ok(BindOutcome::Bound));
        id
    }

    /// Symbol of an already added declaration.
    pub fn symbol(&self, id: DeclId) -> Option<SymbolId> {
        self.tree.get(id).map(|d| d.symbol)
    }

    /// Mutable access for setting visibility, modifiers or annotations.
    pub fn decl_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        self.tree.get_mut(id)
    }

    /// Mark a declaration as top-level.
    pub fn root(&mut self, id: DeclId) {
        self.tree.add_root(id);
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.symbols
    }

    pub fn finish(self) -> DeclTree {
        self.tree
    }
}
