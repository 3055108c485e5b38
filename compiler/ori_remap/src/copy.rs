//! Deep copy of a declaration tree with selective symbol substitution.
//!
//! The copier rebuilds every node of the input tree in a new arena. At each
//! declaration it asks a [`DeclRemapper`] for the symbol the copy should
//! own; every symbol reference inside the tree (type-parameter heads, reads,
//! calls, constructions) is rewritten through the same [`RemapTable`].
//!
//! # Consistency
//!
//! The remapper runs at most once per original symbol. A reference to a
//! symbol declared later in the tree (a call to a function below the
//! caller, say) resolves that declaration's replacement on the spot and
//! memoizes it, so the declaration and every reference agree. Symbols not
//! declared under the tree's roots map to themselves.
//!
//! The copier allocates but never binds: new symbols come out unbound and
//! stay that way until [`patch_bindings`](crate::patch_bindings) runs over
//! the complete output.

use ori_decl::visit::{walk_decl, walk_tree, DeclVisitor};
use ori_decl::{
    Body, Decl, DeclId, DeclKind, DeclTree, Expr, Stmt, SymbolId, SymbolTable, TypeDesc, TypeHead,
};
use rustc_hash::FxHashMap;

use crate::factory::new_symbol_for;
use crate::oracle::TransformOracle;
use crate::predicate::TypePredicate;
use crate::stack::ensure_sufficient_stack;
use crate::RemapError;

// ── Remap table ─────────────────────────────────────────────────────

/// Original → replacement symbol map for one copy.
///
/// Holds an entry for every symbol the copier encountered, identity
/// entries included. Scoped to a single [`copy_tree`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemapTable {
    map: FxHashMap<SymbolId, SymbolId>,
}

impl RemapTable {
    /// Replacement recorded for `original`.
    #[inline]
    pub fn get(&self, original: SymbolId) -> Option<SymbolId> {
        self.map.get(&original).copied()
    }

    /// Returns `true` if `original` was given a new symbol.
    pub fn is_replaced(&self, original: SymbolId) -> bool {
        self.get(original).is_some_and(|new| new != original)
    }

    /// Entries whose replacement differs from the original.
    pub fn replacements(&self) -> impl Iterator<Item = (SymbolId, SymbolId)> + '_ {
        self.map
            .iter()
            .filter(|(old, new)| old != new)
            .map(|(&old, &new)| (old, new))
    }

    /// All entries, identity ones included.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, SymbolId)> + '_ {
        self.map.iter().map(|(&old, &new)| (old, new))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn record(&mut self, original: SymbolId, replacement: SymbolId) {
        let previous = self.map.insert(original, replacement);
        debug_assert!(
            previous.map_or(true, |p| p == replacement),
            "symbol {original:?} remapped twice: {previous:?} then {replacement:?}"
        );
    }
}

// ── Remapper seam ───────────────────────────────────────────────────

/// Chooses the symbol a copied declaration owns.
pub trait DeclRemapper {
    /// Symbol for the copy of input declaration `decl`, which owns `original`.
    ///
    /// Called at most once per declared symbol.
    fn remap_declared(
        &mut self,
        symbols: &mut SymbolTable,
        decl: DeclId,
        original: SymbolId,
    ) -> Result<SymbolId, RemapError>;
}

/// Oracle + factory: fresh symbols exactly for transformed declarations.
pub struct SelectiveRemapper<'a, P: ?Sized> {
    oracle: TransformOracle<'a, P>,
}

impl<'a, P: TypePredicate + ?Sized> SelectiveRemapper<'a, P> {
    pub fn new(tree: &'a DeclTree, predicate: &'a P) -> Self {
        SelectiveRemapper {
            oracle: TransformOracle::new(tree, predicate),
        }
    }
}

impl<P: TypePredicate + ?Sized> DeclRemapper for SelectiveRemapper<'_, P> {
    fn remap_declared(
        &mut self,
        symbols: &mut SymbolTable,
        decl: DeclId,
        original: SymbolId,
    ) -> Result<SymbolId, RemapError> {
        let transformed = self.oracle.is_transformed(symbols, decl)?;
        Ok(new_symbol_for(symbols, original, transformed)?)
    }
}

/// Keeps every symbol. A plain structural copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityRemapper;

impl DeclRemapper for IdentityRemapper {
    fn remap_declared(
        &mut self,
        _symbols: &mut SymbolTable,
        _decl: DeclId,
        original: SymbolId,
    ) -> Result<SymbolId, RemapError> {
        Ok(original)
    }
}

// ── Copier ──────────────────────────────────────────────────────────

/// Output of [`copy_tree`].
#[derive(Clone, Debug)]
pub struct CopyOutput {
    /// The copied tree. New symbols in it are still unbound.
    pub tree: DeclTree,
    pub table: RemapTable,
}

/// Copy `input`, giving fresh symbols to declarations whose signature the
/// annotation affects.
#[tracing::instrument(level = "debug", skip_all, fields(tree = input.id().raw(), decls = input.len()))]
pub fn copy_tree<P: TypePredicate + ?Sized>(
    input: &DeclTree,
    symbols: &mut SymbolTable,
    predicate: &P,
) -> Result<CopyOutput, RemapError> {
    copy_tree_with(input, symbols, SelectiveRemapper::new(input, predicate))
}

/// Copy `input` with a caller-supplied remapper.
pub fn copy_tree_with<R: DeclRemapper>(
    input: &DeclTree,
    symbols: &mut SymbolTable,
    remapper: R,
) -> Result<CopyOutput, RemapError> {
    let declared = index_declarations(input)?;
    let out = DeclTree::new(symbols.fresh_tree_id());
    let mut copier = TreeCopier {
        input,
        symbols,
        remapper,
        declared,
        table: RemapTable::default(),
        out,
    };

    for &root in input.roots() {
        let copied = copier.copy_decl(root)?;
        copier.out.add_root(copied);
    }

    let TreeCopier { table, out, .. } = copier;
    tracing::debug!(
        entries = table.len(),
        replaced = table.replacements().count(),
        "tree copied"
    );
    Ok(CopyOutput { tree: out, table })
}

/// Map each symbol declared under the roots of `tree` to its declaration.
///
/// Arena nodes outside the roots are not part of the copy; their symbols
/// are treated like any other external reference.
fn index_declarations(tree: &DeclTree) -> Result<FxHashMap<SymbolId, DeclId>, RemapError> {
    let mut index = DeclIndex {
        declared: FxHashMap::default(),
    };
    walk_tree(&mut index, tree)?;
    Ok(index.declared)
}

struct DeclIndex {
    declared: FxHashMap<SymbolId, DeclId>,
}

impl DeclVisitor for DeclIndex {
    type Error = RemapError;

    fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), RemapError> {
        ensure_sufficient_stack(|| {
            let symbol = tree.decl(id)?.symbol;
            if let Some(first) = self.declared.insert(symbol, id) {
                return Err(RemapError::DuplicateDeclaration {
                    symbol,
                    first,
                    second: id,
                });
            }
            walk_decl(self, tree, id)
        })
    }
}

struct TreeCopier<'a, R> {
    input: &'a DeclTree,
    symbols: &'a mut SymbolTable,
    remapper: R,
    /// Where each symbol is declared in the input.
    declared: FxHashMap<SymbolId, DeclId>,
    table: RemapTable,
    out: DeclTree,
}

impl<R: DeclRemapper> TreeCopier<'_, R> {
    /// Replacement for the symbol declared by input node `decl`.
    fn declared_symbol(&mut self, decl: DeclId) -> Result<SymbolId, RemapError> {
        let original = self.input.decl(decl)?.symbol;
        if let Some(done) = self.table.get(original) {
            return Ok(done);
        }
        let replacement = self.remapper.remap_declared(self.symbols, decl, original)?;
        self.table.record(original, replacement);
        Ok(replacement)
    }

    /// Replacement for a symbol used inside the tree.
    fn referenced_symbol(&mut self, symbol: SymbolId) -> Result<SymbolId, RemapError> {
        if let Some(done) = self.table.get(symbol) {
            return Ok(done);
        }
        match self.declared.get(&symbol) {
            Some(&decl) => self.declared_symbol(decl),
            None => {
                self.table.record(symbol, symbol);
                Ok(symbol)
            }
        }
    }

    fn copy_decl(&mut self, id: DeclId) -> Result<DeclId, RemapError> {
        ensure_sufficient_stack(|| self.copy_decl_inner(id))
    }

    fn copy_decl_inner(&mut self, id: DeclId) -> Result<DeclId, RemapError> {
        let input = self.input;
        let decl = input.decl(id)?;
        let symbol = self.declared_symbol(id)?;

        let kind = match &decl.kind {
            DeclKind::Class {
                name,
                type_params,
                this_receiver,
                members,
            } => DeclKind::Class {
                name: *name,
                type_params: self.copy_decls(type_params)?,
                this_receiver: self.copy_opt_decl(*this_receiver)?,
                members: self.copy_decls(members)?,
            },
            DeclKind::Constructor {
                type_params,
                params,
                body,
            } => DeclKind::Constructor {
                type_params: self.copy_decls(type_params)?,
                params: self.copy_decls(params)?,
                body: self.copy_opt_body(body.as_ref())?,
            },
            DeclKind::Function {
                name,
                type_params,
                receiver,
                params,
                return_type,
                body,
            } => DeclKind::Function {
                name: *name,
                type_params: self.copy_decls(type_params)?,
                receiver: self.copy_opt_decl(*receiver)?,
                params: self.copy_decls(params)?,
                return_type: return_type.as_ref().map(|ty| self.copy_type(ty)).transpose()?,
                body: self.copy_opt_body(body.as_ref())?,
            },
            DeclKind::ValueParameter { name, ty, default } => DeclKind::ValueParameter {
                name: *name,
                ty: self.copy_type(ty)?,
                default: default.as_ref().map(|e| self.copy_expr(e)).transpose()?,
            },
            DeclKind::ReceiverParameter { ty } => DeclKind::ReceiverParameter {
                ty: self.copy_type(ty)?,
            },
            DeclKind::TypeParameter { name, bounds } => DeclKind::TypeParameter {
                name: *name,
                bounds: self.copy_types(bounds)?,
            },
        };

        Ok(self.out.alloc(Decl {
            symbol,
            kind,
            container: None,
            span: decl.span,
            visibility: decl.visibility,
            modifiers: decl.modifiers,
            annotations: decl.annotations.clone(),
        }))
    }

    fn copy_decls(&mut self, ids: &[DeclId]) -> Result<Vec<DeclId>, RemapError> {
        ids.iter().map(|&id| self.copy_decl(id)).collect()
    }

    fn copy_opt_decl(&mut self, id: Option<DeclId>) -> Result<Option<DeclId>, RemapError> {
        id.map(|id| self.copy_decl(id)).transpose()
    }

    fn copy_type(&mut self, ty: &TypeDesc) -> Result<TypeDesc, RemapError> {
        let head = match ty.head {
            TypeHead::Param(symbol) => TypeHead::Param(self.referenced_symbol(symbol)?),
            head @ (TypeHead::Named(_) | TypeHead::Function) => head,
        };
        Ok(TypeDesc {
            head,
            args: self.copy_types(&ty.args)?,
            annotations: ty.annotations.clone(),
            nullable: ty.nullable,
        })
    }

    fn copy_types(&mut self, tys: &[TypeDesc]) -> Result<Vec<TypeDesc>, RemapError> {
        tys.iter().map(|ty| self.copy_type(ty)).collect()
    }

    fn copy_opt_body(&mut self, body: Option<&Body>) -> Result<Option<Body>, RemapError> {
        body.map(|b| self.copy_stmts(&b.stmts).map(Body::new))
            .transpose()
    }

    fn copy_stmts(&mut self, stmts: &[Stmt]) -> Result<Vec<Stmt>, RemapError> {
        stmts.iter().map(|s| self.copy_stmt(s)).collect()
    }

    fn copy_stmt(&mut self, stmt: &Stmt) -> Result<Stmt, RemapError> {
        Ok(match stmt {
            Stmt::Decl(decl) => Stmt::Decl(self.copy_decl(*decl)?),
            Stmt::Expr(expr) => Stmt::Expr(self.copy_expr(expr)?),
            Stmt::Return(value) => Stmt::Return(value.as_ref().map(|e| self.copy_expr(e)).transpose()?),
        })
    }

    fn copy_exprs(&mut self, exprs: &[Expr]) -> Result<Vec<Expr>, RemapError> {
        exprs.iter().map(|e| self.copy_expr(e)).collect()
    }

    fn copy_expr(&mut self, expr: &Expr) -> Result<Expr, RemapError> {
        ensure_sufficient_stack(|| {
            Ok(match expr {
                Expr::Literal(lit) => Expr::Literal(lit.clone()),
                Expr::Read(symbol) => Expr::Read(self.referenced_symbol(*symbol)?),
                Expr::Call {
                    callee,
                    type_args,
                    receiver,
                    args,
                } => Expr::Call {
                    callee: self.referenced_symbol(*callee)?,
                    type_args: self.copy_types(type_args)?,
                    receiver: receiver
                        .as_deref()
                        .map(|r| self.copy_expr(r).map(Box::new))
                        .transpose()?,
                    args: self.copy_exprs(args)?,
                },
                Expr::Construct {
                    ctor,
                    type_args,
                    args,
                } => Expr::Construct {
                    ctor: self.referenced_symbol(*ctor)?,
                    type_args: self.copy_types(type_args)?,
                    args: self.copy_exprs(args)?,
                },
                Expr::Lambda(decl) => Expr::Lambda(self.copy_decl(*decl)?),
                Expr::Block(stmts) => Expr::Block(self.copy_stmts(stmts)?),
            })
        })
    }
}
