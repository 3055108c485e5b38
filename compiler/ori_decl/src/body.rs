//! Function bodies.
//!
//! Bodies only matter to symbol remapping for the references they hold
//! (reads, calls, constructions, explicit type arguments) and for the
//! declarations nested in them (local functions and lambdas).

use crate::{DeclId, Name, SymbolId, TypeDesc};

/// A function or constructor body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub stmts: Vec<Stmt>,
}

impl Body {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Body { stmts }
    }

    /// Call `f` for every declaration nested directly in this body.
    ///
    /// Stops at nested declarations: their own bodies belong to them.
    pub fn for_each_nested_decl(&self, f: &mut impl FnMut(DeclId)) {
        for stmt in &self.stmts {
            stmt.for_each_nested_decl(f);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Stmt {
    /// A local declaration (local function or class).
    Decl(DeclId),
    Expr(Expr),
    Return(Option<Expr>),
}

impl Stmt {
    fn for_each_nested_decl(&self, f: &mut impl FnMut(DeclId)) {
        match self {
            Stmt::Decl(decl) => f(*decl),
            Stmt::Expr(expr) | Stmt::Return(Some(expr)) => expr.for_each_nested_decl(f),
            Stmt::Return(None) => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Unit,
    Bool(bool),
    Int(i64),
    Str(Name),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Literal(Literal),
    /// Read of a parameter or receiver.
    Read(SymbolId),
    Call {
        callee: SymbolId,
        type_args: Vec<TypeDesc>,
        receiver: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    Construct {
        ctor: SymbolId,
        type_args: Vec<TypeDesc>,
        args: Vec<Expr>,
    },
    /// A function literal; the declaration holds its parameters and body.
    Lambda(DeclId),
    Block(Vec<Stmt>),
}

impl Expr {
    /// Call `f` for every declaration nested directly in this expression.
    pub fn for_each_nested_decl(&self, f: &mut impl FnMut(DeclId)) {
        match self {
            Expr::Literal(_) | Expr::Read(_) => {}
            Expr::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    receiver.for_each_nested_decl(f);
                }
                for arg in args {
                    arg.for_each_nested_decl(f);
                }
            }
            Expr::Construct { args, .. } => {
                for arg in args {
                    arg.for_each_nested_decl(f);
                }
            }
            Expr::Lambda(decl) => f(*decl),
            Expr::Block(stmts) => {
                for stmt in stmts {
                    stmt.for_each_nested_decl(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_decls_are_found_through_blocks_and_calls() {
        let body = Body::new(vec![
            Stmt::Decl(DeclId::new(1)),
            Stmt::Expr(Expr::Call {
                callee: SymbolId::new(0),
                type_args: vec![],
                receiver: None,
                args: vec![Expr::Lambda(DeclId::new(2))],
            }),
            Stmt::Return(Some(Expr::Block(vec![Stmt::Expr(Expr::Lambda(
                DeclId::new(3),
            ))]))),
        ]);

        let mut found = Vec::new();
        body.for_each_nested_decl(&mut |d| found.push(d));
        assert_eq!(found, vec![DeclId::new(1), DeclId::new(2), DeclId::new(3)]);
    }
}
