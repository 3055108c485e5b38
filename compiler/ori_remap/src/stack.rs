//! Stack growth for deeply nested declarations.
//!
//! Lambdas nested in lambdas recurse once per level in the copier. On native
//! targets the stack is grown on demand; WASM manages its own stack.

/// Grow when less than this remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each additional stack segment.
const SEGMENT: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
