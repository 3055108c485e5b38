//! Type descriptors as they appear in declaration signatures.

use smallvec::SmallVec;

use crate::{Name, SymbolId};

/// What a [`TypeDesc`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeHead {
    /// A nominal type such as `Int`, `Unit` or `List`.
    Named(Name),
    /// A use of a type parameter, by its symbol.
    Param(SymbolId),
    /// A function type. The last generic argument is the return type.
    Function,
}

/// A type as written in a signature: head, generic arguments, annotations.
///
/// Descriptors are immutable values owned by the declaration mentioning
/// them. Copying a tree rebuilds them so that [`TypeHead::Param`] heads
/// follow the remapped type-parameter symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDesc {
    pub head: TypeHead,
    pub args: Vec<TypeDesc>,
    pub annotations: SmallVec<[Name; 1]>,
    pub nullable: bool,
}

impl TypeDesc {
    /// A nominal type without arguments.
    pub fn named(name: Name) -> Self {
        Self::with_head(TypeHead::Named(name))
    }

    /// A reference to a type parameter.
    pub fn param(symbol: SymbolId) -> Self {
        Self::with_head(TypeHead::Param(symbol))
    }

    /// A function type `(params) -> ret`.
    pub fn function(params: Vec<TypeDesc>, ret: TypeDesc) -> Self {
        let mut args = params;
        args.push(ret);
        TypeDesc {
            head: TypeHead::Function,
            args,
            annotations: SmallVec::new(),
            nullable: false,
        }
    }

    fn with_head(head: TypeHead) -> Self {
        TypeDesc {
            head,
            args: Vec::new(),
            annotations: SmallVec::new(),
            nullable: false,
        }
    }

    /// Replace the generic argument list.
    #[must_use]
    pub fn with_args(mut self, args: Vec<TypeDesc>) -> Self {
        self.args = args;
        self
    }

    /// Attach an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: Name) -> Self {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    /// Mark the type as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns `true` if this type itself (not its arguments) carries `annotation`.
    pub fn has_annotation(&self, annotation: Name) -> bool {
        self.annotations.contains(&annotation)
    }

    /// Call `f` for every type-parameter symbol mentioned anywhere in this type.
    pub fn for_each_param(&self, f: &mut impl FnMut(SymbolId)) {
        if let TypeHead::Param(symbol) = self.head {
            f(symbol);
        }
        for arg in &self.args {
            arg.for_each_param(f);
        }
    }
}
