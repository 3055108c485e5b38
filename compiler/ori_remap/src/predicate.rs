//! The type predicate: "does this type carry the triggering annotation?"
//!
//! The predicate is supplied by the phase that owns annotation resolution.
//! This module only defines the seam ([`TypePredicate`]), a ready-made
//! marker-annotation implementation, and the one-level argument lookup the
//! oracle applies on top of it.

use ori_decl::{Name, StringInterner, TypeDesc};

/// The predicate could not classify a type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        PredicateError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Oracle over type descriptors.
///
/// Implementations must be pure: the same descriptor always yields the
/// same answer. Failures propagate; remapping never guesses.
pub trait TypePredicate {
    /// Returns `true` if `ty` itself carries the annotation.
    fn has_annotation(&self, ty: &TypeDesc) -> Result<bool, PredicateError>;
}

impl<F> TypePredicate for F
where
    F: Fn(&TypeDesc) -> Result<bool, PredicateError>,
{
    fn has_annotation(&self, ty: &TypeDesc) -> Result<bool, PredicateError> {
        self(ty)
    }
}

/// Predicate matching types annotated with a specific marker name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationPredicate {
    marker: Name,
}

impl AnnotationPredicate {
    pub fn new(marker: Name) -> Self {
        AnnotationPredicate { marker }
    }

    /// Predicate for the annotation spelled `marker`, interned in `interner`.
    ///
    /// Types must be built against the same interner for names to match.
    pub fn named(interner: &StringInterner, marker: &str) -> Self {
        AnnotationPredicate::new(interner.intern(marker))
    }

    pub fn marker(&self) -> Name {
        self.marker
    }
}

impl TypePredicate for AnnotationPredicate {
    fn has_annotation(&self, ty: &TypeDesc) -> Result<bool, PredicateError> {
        Ok(ty.has_annotation(self.marker))
    }
}

/// Returns `true` if `ty` or one of its direct generic arguments carries
/// the annotation.
///
/// Deeper arguments are not inspected: `List<List<@A () -> Unit>>` does not
/// change the calling convention of a function taking it.
pub fn contains_annotated<P: TypePredicate + ?Sized>(
    predicate: &P,
    ty: &TypeDesc,
) -> Result<bool, PredicateError> {
    if predicate.has_annotation(ty)? {
        return Ok(true);
    }
    for arg in &ty.args {
        if predicate.has_annotation(arg)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: Name = Name::from_raw(100);

    fn closure() -> TypeDesc {
        TypeDesc::function(vec![], TypeDesc::named(Name::from_raw(2)))
    }

    #[test]
    fn direct_annotation() {
        let p = AnnotationPredicate::new(MARKER);
        assert_eq!(contains_annotated(&p, &closure().annotated(MARKER)), Ok(true));
        assert_eq!(contains_annotated(&p, &closure()), Ok(false));
    }

    #[test]
    fn first_level_argument_counts() {
        let p = AnnotationPredicate::new(MARKER);
        let list = TypeDesc::named(Name::from_raw(3)).with_args(vec![closure().annotated(MARKER)]);
        assert_eq!(contains_annotated(&p, &list), Ok(true));
    }

    #[test]
    fn nested_argument_does_not_count() {
        let p = AnnotationPredicate::new(MARKER);
        let inner = TypeDesc::named(Name::from_raw(3)).with_args(vec![closure().annotated(MARKER)]);
        let outer = TypeDesc::named(Name::from_raw(3)).with_args(vec![inner]);
        assert_eq!(contains_annotated(&p, &outer), Ok(false));
    }

    #[test]
    fn named_marker_matches_interned_annotation() {
        let interner = StringInterner::new();
        let p = AnnotationPredicate::named(&interner, "Composable");
        assert_eq!(p.marker(), interner.intern("Composable"));

        let other = interner.intern("ReadOnly");
        assert_eq!(contains_annotated(&p, &closure().annotated(p.marker())), Ok(true));
        assert_eq!(contains_annotated(&p, &closure().annotated(other)), Ok(false));
    }

    #[test]
    fn failures_propagate() {
        let failing = |_: &TypeDesc| -> Result<bool, PredicateError> {
            Err(PredicateError::new("unresolved annotation class"))
        };
        let err = contains_annotated(&failing, &closure());
        assert_eq!(err, Err(PredicateError::new("unresolved annotation class")));
    }
}
