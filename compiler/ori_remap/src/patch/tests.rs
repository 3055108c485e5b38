#![allow(clippy::unwrap_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;

use ori_decl::{
    Body, Decl, DeclKind, DeclRef, DeclTree, DeclTreeBuilder, Expr, FunctionKind, Name, Span,
    Stmt, SymbolKind, SymbolTable,
};

use crate::copy::{copy_tree, CopyOutput};
use crate::test_helpers::{
    annotated_closure, full_func, func, func_of_kind, int, param, predicate, sym, type_param,
    unit,
};
use crate::RemapError;

use super::{patch_bindings, verify_bindings, PatchStats};

/// `fun <T> f(cb: @Marked () -> Unit, x: Int): Unit`, copied but not patched.
fn copied_f(symbols: &mut SymbolTable) -> CopyOutput {
    let mut b = DeclTreeBuilder::new(symbols);
    let t = type_param(&mut b, vec![]);
    let cb = param(&mut b, annotated_closure());
    let x = param(&mut b, int());
    let f = full_func(&mut b, vec![t], None, vec![cb, x], Some(unit()), None);
    b.root(f);
    let input = b.finish();
    copy_tree(&input, symbols, &predicate()).unwrap()
}

fn decl_ref(tree: &DeclTree, decl: ori_decl::DeclId) -> DeclRef {
    DeclRef {
        tree: tree.id(),
        decl,
    }
}

#[test]
fn binds_every_new_symbol_to_its_copy() {
    let mut symbols = SymbolTable::new();
    let out = copied_f(&mut symbols);

    let stats = patch_bindings(&out.tree, &mut symbols).unwrap();
    assert_eq!(
        stats,
        PatchStats {
            visited: 4,
            bound: 4,
            already_bound: 0,
        }
    );

    for (id, decl) in out.tree.iter() {
        assert_eq!(symbols.declaration(decl.symbol), Ok(decl_ref(&out.tree, id)));
    }
    assert_eq!(verify_bindings(&out.tree, &symbols), Ok(()));
}

#[test]
fn second_run_changes_nothing() {
    let mut symbols = SymbolTable::new();
    let out = copied_f(&mut symbols);

    patch_bindings(&out.tree, &mut symbols).unwrap();
    let snapshot: Vec<_> = symbols.iter().map(|(id, d)| (id, d.clone())).collect();

    let again = patch_bindings(&out.tree, &mut symbols).unwrap();
    assert_eq!(again.bound, 0);
    assert_eq!(again.already_bound, 4);
    let after: Vec<_> = symbols.iter().map(|(id, d)| (id, d.clone())).collect();
    assert_eq!(after, snapshot);
}

#[test]
fn partially_bound_tree_ends_in_the_same_state() {
    let mut fresh = SymbolTable::new();
    let out_a = copied_f(&mut fresh);
    patch_bindings(&out_a.tree, &mut fresh).unwrap();

    // Same input in a second table, with one parameter bound up front.
    let mut partial = SymbolTable::new();
    let out_b = copied_f(&mut partial);
    let (param_decl, param_sym) = out_b
        .tree
        .iter()
        .find(|(_, d)| matches!(d.kind, DeclKind::ValueParameter { .. }))
        .map(|(id, d)| (id, d.symbol))
        .unwrap();
    partial
        .bind_if_needed(param_sym, decl_ref(&out_b.tree, param_decl), Span::DUMMY)
        .unwrap();

    let stats = patch_bindings(&out_b.tree, &mut partial).unwrap();
    assert_eq!(stats.bound, 3);
    assert_eq!(stats.already_bound, 1);

    let states = |table: &SymbolTable| -> Vec<_> {
        table.iter().map(|(id, d)| (id, d.kind, d.state())).collect()
    };
    assert_eq!(states(&partial), states(&fresh));
}

#[test]
fn nested_lambda_symbols_are_bound() {
    let mut symbols = SymbolTable::new();
    let mut b = DeclTreeBuilder::new(&mut symbols);
    let cb = param(&mut b, annotated_closure());
    let lambda = func(&mut b, vec![cb], Some(unit()));
    let host = full_func(
        &mut b,
        vec![],
        None,
        vec![],
        None,
        Some(Body::new(vec![Stmt::Expr(Expr::Block(vec![Stmt::Expr(
            Expr::Lambda(lambda),
        )]))])),
    );
    b.root(host);
    let input = b.finish();

    let out = copy_tree(&input, &mut symbols, &predicate()).unwrap();
    let stats = patch_bindings(&out.tree, &mut symbols).unwrap();
    assert_eq!(stats.visited, 3);
    assert_eq!(stats.bound, 2);
    assert_eq!(verify_bindings(&out.tree, &symbols), Ok(()));
}

#[test]
fn accessor_takes_its_source_from_the_declaration() {
    let mut symbols = SymbolTable::new();
    let mut b = DeclTreeBuilder::new(&mut symbols);
    let cb = param(&mut b, annotated_closure());
    let getter = func_of_kind(
        &mut b,
        FunctionKind::PropertyGetter {
            property: Name::from_raw(3),
        },
        vec![cb],
        Some(unit()),
    );
    b.root(getter);
    let input = b.finish();

    let out = copy_tree(&input, &mut symbols, &predicate()).unwrap();
    let getter2 = out.tree.roots()[0];
    let new_sym = sym(&out.tree, getter2);
    assert_eq!(symbols.get(new_sym).map(|d| d.source), Ok(None));

    patch_bindings(&out.tree, &mut symbols).unwrap();
    assert_eq!(
        symbols.get(new_sym).map(|d| d.source),
        Ok(Some(Span::new(40, 60)))
    );
}

#[test]
fn verify_reports_unpatched_copy() {
    let mut symbols = SymbolTable::new();
    let out = copied_f(&mut symbols);
    let f2 = out.tree.roots()[0];

    assert_eq!(
        verify_bindings(&out.tree, &symbols),
        Err(RemapError::UnboundSymbol {
            symbol: sym(&out.tree, f2),
            decl: f2,
            kind: "function",
        })
    );
}

#[test]
fn mismatched_placeholder_is_an_error() {
    let mut symbols = SymbolTable::new();
    let stray = symbols.alloc_wrapped(SymbolKind::Function(FunctionKind::Plain), None);
    let mut tree = DeclTree::new(symbols.fresh_tree_id());
    let p = tree.alloc(Decl::new(stray, DeclKind::value_param(Name::EMPTY, int())));
    tree.add_root(p);

    assert_eq!(
        patch_bindings(&tree, &mut symbols),
        Err(RemapError::KindMismatch {
            symbol: stray,
            decl: p,
            symbol_kind: "function",
            decl_kind: "value parameter",
        })
    );
    assert!(!symbols.is_bound(stray));
}

#[test]
fn deeply_nested_lambdas_are_patched_and_verified() {
    const DEPTH: usize = 10_000;

    // { { { ... { cb: @Marked () -> Unit -> } ... } } }
    let mut symbols = SymbolTable::new();
    let mut b = DeclTreeBuilder::new(&mut symbols);
    let cb = param(&mut b, annotated_closure());
    let mut inner = func(&mut b, vec![cb], Some(unit()));
    for _ in 0..DEPTH {
        inner = full_func(
            &mut b,
            vec![],
            None,
            vec![],
            None,
            Some(Body::new(vec![Stmt::Expr(Expr::Lambda(inner))])),
        );
    }
    b.root(inner);
    let input = b.finish();

    let out = copy_tree(&input, &mut symbols, &predicate()).unwrap();
    let stats = patch_bindings(&out.tree, &mut symbols).unwrap();
    assert_eq!(
        stats,
        PatchStats {
            visited: DEPTH + 2,
            bound: 2,
            already_bound: 0,
        }
    );
    assert_eq!(verify_bindings(&out.tree, &symbols), Ok(()));
}
