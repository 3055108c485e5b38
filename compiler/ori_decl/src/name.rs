//! Interned identifiers for declaration and annotation names.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Interned string identifier.
///
/// Compact 32-bit handle; resolve it back to text with
/// [`StringInterner::lookup`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

struct Interned {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// String interner shared by every lowering unit of a compilation.
///
/// Interning takes `&self` so one interner can back units remapped on
/// different threads. Strings live for the rest of the process.
pub struct StringInterner {
    inner: RwLock<Interned>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", Name::EMPTY);
        Self {
            inner: RwLock::new(Interned {
                map,
                strings: vec![""],
            }),
        }
    }

    /// Intern a string, returning the existing name if already present.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.inner.read().map.get(s) {
            return name;
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race between the two locks.
        if let Some(&name) = inner.map.get(s) {
            return name;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a single compilation never interns 4 billion names"
        )]
        let name = Name(inner.strings.len() as u32);
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        inner.strings.push(leaked);
        inner.map.insert(leaked, name);
        name
    }

    /// Resolve a name to its text.
    pub fn lookup(&self, name: Name) -> Option<&'static str> {
        self.inner.read().strings.get(name.0 as usize).copied()
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Returns `true` if only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}
