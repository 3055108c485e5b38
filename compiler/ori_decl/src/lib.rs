//! Declaration trees and symbol tables for Ori lowering passes.
//!
//! This crate holds the data model shared by signature-rewriting passes:
//!
//! - **Symbols** ([`SymbolId`], [`SymbolTable`]): opaque handles naming a
//!   declaration independently of where it is stored. Every symbol carries a
//!   closed [`SymbolKind`], an origin ([`SymbolOrigin`]) and an explicit
//!   [`BindState`]: a symbol is allocated `Unbound` and later bound, at most
//!   once, to the declaration it names.
//!
//! - **Declaration trees** ([`DeclTree`], [`Decl`], [`DeclKind`]): an arena of
//!   classes, constructors, functions, parameters and type parameters. Each
//!   node owns exactly one symbol and records its container.
//!
//! - **Type descriptors** ([`TypeDesc`]): a type head plus generic arguments
//!   and the annotations attached to it.
//!
//! - **Bodies** ([`Body`], [`Stmt`], [`Expr`]): a small statement/expression
//!   language whose symbol references are rewritten when a tree is copied.
//!
//! # Binding Protocol
//!
//! ```text
//! alloc_wrapped() ──► Unbound ──bind_if_needed(decl)──► Bound(DeclRef)
//!                                                          │
//!                      bind_if_needed(..) again ───────────┘ (no-op)
//! ```
//!
//! Reading the declaration of an unbound symbol is a checked error
//! ([`SymbolError::Unbound`]) rather than a crash.

mod body;
mod name;
mod span;
mod symbol;
mod tree;
mod types;
pub mod visit;

pub use body::{Body, Expr, Literal, Stmt};
pub use name::{Name, StringInterner};
pub use span::Span;
pub use symbol::{
    BindOutcome, BindState, FunctionKind, SymbolData, SymbolError, SymbolId, SymbolKind,
    SymbolOrigin, SymbolTable,
};
pub use tree::{
    Decl, DeclId, DeclKind, DeclRef, DeclTree, DeclTreeBuilder, Modifiers, TreeError, TreeId,
    Visibility,
};
pub use types::{TypeDesc, TypeHead};
