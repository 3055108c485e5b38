//! Shared fixtures for remapping tests.
//!
//! Builders take a [`DeclTreeBuilder`] and return the new declaration's id,
//! so a test reads top-down like the signature it models:
//!
//! ```text
//! let cb = param(&mut b, annotated_closure());   // cb: @Marked () -> Unit
//! let f = func(&mut b, vec![cb], Some(unit()));  // fun f(cb) -> Unit
//! ```

use ori_decl::{
    Body, DeclId, DeclKind, DeclTree, DeclTreeBuilder, FunctionKind, Name, Span, SymbolId,
    SymbolKind, SymbolOrigin, TypeDesc,
};

use crate::predicate::AnnotationPredicate;

/// The triggering annotation used throughout the tests.
pub(crate) const MARKER: Name = Name::from_raw(100);

pub(crate) fn predicate() -> AnnotationPredicate {
    AnnotationPredicate::new(MARKER)
}

pub(crate) fn int() -> TypeDesc {
    TypeDesc::named(Name::from_raw(1))
}

pub(crate) fn unit() -> TypeDesc {
    TypeDesc::named(Name::from_raw(2))
}

pub(crate) fn list(arg: TypeDesc) -> TypeDesc {
    TypeDesc::named(Name::from_raw(3)).with_args(vec![arg])
}

/// `@Marked () -> Unit`
pub(crate) fn annotated_closure() -> TypeDesc {
    TypeDesc::function(vec![], unit()).annotated(MARKER)
}

pub(crate) fn param(b: &mut DeclTreeBuilder<'_>, ty: TypeDesc) -> DeclId {
    b.add(
        SymbolKind::ValueParameter,
        DeclKind::value_param(Name::from_raw(10), ty),
    )
}

pub(crate) fn receiver(b: &mut DeclTreeBuilder<'_>, ty: TypeDesc) -> DeclId {
    b.add(SymbolKind::ReceiverParameter, DeclKind::ReceiverParameter { ty })
}

pub(crate) fn type_param(b: &mut DeclTreeBuilder<'_>, bounds: Vec<TypeDesc>) -> DeclId {
    b.add(
        SymbolKind::TypeParameter,
        DeclKind::type_param(Name::from_raw(11), bounds),
    )
}

pub(crate) fn func(b: &mut DeclTreeBuilder<'_>, params: Vec<DeclId>, ret: Option<TypeDesc>) -> DeclId {
    func_of_kind(b, FunctionKind::Plain, params, ret)
}

pub(crate) fn func_of_kind(
    b: &mut DeclTreeBuilder<'_>,
    kind: FunctionKind,
    params: Vec<DeclId>,
    ret: Option<TypeDesc>,
) -> DeclId {
    b.add_with(
        SymbolOrigin::Declared,
        SymbolKind::Function(kind),
        DeclKind::function(Name::from_raw(12), params, ret),
        Span::new(40, 60),
    )
}

/// A function with every signature part spelled out.
pub(crate) fn full_func(
    b: &mut DeclTreeBuilder<'_>,
    type_params: Vec<DeclId>,
    receiver: Option<DeclId>,
    params: Vec<DeclId>,
    ret: Option<TypeDesc>,
    body: Option<Body>,
) -> DeclId {
    b.add(
        SymbolKind::Function(FunctionKind::Plain),
        DeclKind::Function {
            name: Name::from_raw(13),
            type_params,
            receiver,
            params,
            return_type: ret,
            body,
        },
    )
}

pub(crate) fn ctor(b: &mut DeclTreeBuilder<'_>, params: Vec<DeclId>) -> DeclId {
    b.add(
        SymbolKind::Constructor,
        DeclKind::Constructor {
            type_params: vec![],
            params,
            body: None,
        },
    )
}

pub(crate) fn class(b: &mut DeclTreeBuilder<'_>, type_params: Vec<DeclId>, members: Vec<DeclId>) -> DeclId {
    b.add(
        SymbolKind::Class,
        DeclKind::Class {
            name: Name::from_raw(14),
            type_params,
            this_receiver: None,
            members,
        },
    )
}

/// Symbol owned by `id`.
pub(crate) fn sym(tree: &DeclTree, id: DeclId) -> SymbolId {
    tree.get(id).map(|d| d.symbol).unwrap_or_else(|| panic!("no declaration {id:?}"))
}
