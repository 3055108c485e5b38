//! Declaration visitor.
//!
//! Walks every declaration reachable from a tree's roots: class members,
//! type parameters, receivers, value parameters, and declarations nested in
//! bodies and default values. Passes override [`DeclVisitor::visit_decl`]
//! and call [`walk_decl`] to continue into children.
//!
//! # Example
//!
//! ```text
//! struct CountParams { count: usize }
//!
//! impl DeclVisitor for CountParams {
//!     type Error = TreeError;
//!
//!     fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), TreeError> {
//!         if matches!(tree.decl(id)?.kind, DeclKind::ValueParameter { .. }) {
//!             self.count += 1;
//!         }
//!         walk_decl(self, tree, id)
//!     }
//! }
//! ```

use crate::{DeclId, DeclTree, TreeError};

/// Visitor over declarations. The tree itself is not mutated.
pub trait DeclVisitor {
    type Error: From<TreeError>;

    /// Visit one declaration.
    fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), Self::Error> {
        walk_decl(self, tree, id)
    }
}

/// Visit every root of `tree`.
pub fn walk_tree<V: DeclVisitor + ?Sized>(visitor: &mut V, tree: &DeclTree) -> Result<(), V::Error> {
    for &root in tree.roots() {
        visitor.visit_decl(tree, root)?;
    }
    Ok(())
}

/// Visit the children of `id`.
pub fn walk_decl<V: DeclVisitor + ?Sized>(
    visitor: &mut V,
    tree: &DeclTree,
    id: DeclId,
) -> Result<(), V::Error> {
    let decl = tree.decl(id)?;
    for child in decl.kind.children() {
        visitor.visit_decl(tree, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        DeclKind, DeclTreeBuilder, FunctionKind, Name, SymbolKind, SymbolTable, TypeDesc,
    };

    use super::*;

    struct Collect(Vec<DeclId>);

    impl DeclVisitor for Collect {
        type Error = TreeError;

        fn visit_decl(&mut self, tree: &DeclTree, id: DeclId) -> Result<(), TreeError> {
            self.0.push(id);
            walk_decl(self, tree, id)
        }
    }

    #[test]
    fn visits_members_and_parameters_preorder() {
        let mut symbols = SymbolTable::new();
        let mut b = DeclTreeBuilder::new(&mut symbols);
        let int = TypeDesc::named(Name::from_raw(1));

        let p = b.add(
            SymbolKind::ValueParameter,
            DeclKind::value_param(Name::from_raw(2), int.clone()),
        );
        let ctor = b.add(
            SymbolKind::Constructor,
            DeclKind::Constructor {
                type_params: vec![],
                params: vec![p],
                body: None,
            },
        );
        let this = b.add(
            SymbolKind::ReceiverParameter,
            DeclKind::ReceiverParameter { ty: int },
        );
        let m = b.add(
            SymbolKind::Function(FunctionKind::Plain),
            DeclKind::function(Name::from_raw(3), vec![], None),
        );
        let class = b.add(
            SymbolKind::Class,
            DeclKind::Class {
                name: Name::from_raw(4),
                type_params: vec![],
                this_receiver: Some(this),
                members: vec![ctor, m],
            },
        );
        b.root(class);
        let tree = b.finish();

        let mut collect = Collect(Vec::new());
        assert_eq!(walk_tree(&mut collect, &tree), Ok(()));
        assert_eq!(collect.0, vec![class, this, ctor, p, m]);
    }
}
