//! Field access flags.

use bitflags::bitflags;
use strum::EnumIter;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    /// Access flags of a field, using the Dalvik `access_flags` bit values.
    pub struct AccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible only to the defining class
        const PRIVATE = 0x0002;
        /// Visible to the package and subclasses
        const PROTECTED = 0x0004;
        /// Class-level storage rather than per-instance
        const STATIC = 0x0008;
        /// Not assignable after construction
        const FINAL = 0x0010;
        /// Volatile memory semantics
        const VOLATILE = 0x0040;
        /// Not serialized
        const TRANSIENT = 0x0080;
        /// Compiler generated
        const SYNTHETIC = 0x1000;
        /// Enum constant
        const ENUM = 0x4000;
    }
}

/// Visibility derived from [`AccessFlags`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Visibility {
    /// `public`
    Public,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// No modifier: package-private
    Package,
}

impl AccessFlags {
    /// Returns the visibility encoded in these flags.
    ///
    /// `PUBLIC` wins over the other visibility bits; flags with no visibility bit are
    /// package-private.
    #[must_use]
    pub fn visibility(self) -> Visibility {
        if self.contains(AccessFlags::PUBLIC) {
            Visibility::Public
        } else if self.contains(AccessFlags::PRIVATE) {
            Visibility::Private
        } else if self.contains(AccessFlags::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Package
        }
    }

    /// Returns `true` if the `STATIC` bit is set.
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Returns `true` if the field is `public`.
    #[must_use]
    pub fn is_public(self) -> bool {
        self.visibility() == Visibility::Public
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Package => "package-private",
        };
        f.write_str(name)
    }
}
