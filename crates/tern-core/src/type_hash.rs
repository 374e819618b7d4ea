//! Deterministic hashes identifying classes and members.
//!
//! [`TypeHash`] is a 64-bit XXHash of a class name or of a member signature.
//! The host registry keeps the hashes of every registered member signature
//! to reject duplicates; classes themselves are keyed by name.
//!
//! ```
//! use tern_core::TypeHash;
//!
//! let object = TypeHash::from_name("java.lang.Object");
//! assert_eq!(object, TypeHash::from_name("java.lang.Object"));
//!
//! let a = TypeHash::from_method("java.io.PrintStream", "println", &[TypeHash::from_name("int")]);
//! let b = TypeHash::from_method("java.io.PrintStream", "println", &[TypeHash::from_name("long")]);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain mixing constants so that a class and a member with the same text
/// never collide.
pub mod hash_constants {
    /// Domain marker for class and interface hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructor hashes.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Separator mixed in between the owner and member name.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
}

/// A deterministic 64-bit hash identifying a class or a member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a fully qualified class name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a method signature. Parameter order matters.
    pub fn from_method(owner: &str, name: &str, params: &[TypeHash]) -> Self {
        let mut hash = hash_constants::METHOD ^ xxh64(owner.as_bytes(), 0);
        hash = hash.rotate_left(5) ^ hash_constants::SEP ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(hash, params))
    }

    /// Hash of a constructor signature.
    pub fn from_constructor(owner: &str, params: &[TypeHash]) -> Self {
        let hash = hash_constants::CONSTRUCTOR ^ xxh64(owner.as_bytes(), 0);
        TypeHash(mix_params(hash, params))
    }

    /// Whether this is the empty hash.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

fn mix_params(mut hash: u64, params: &[TypeHash]) -> u64 {
    for (index, param) in params.iter().enumerate() {
        hash = hash
            .rotate_left(7)
            .wrapping_add(param.0.wrapping_mul(index as u64 * 2 + 1));
    }
    hash ^ params.len() as u64
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
