//! `java.lang.reflect.Field` emulated methods.
//!
//! Obfuscators read configuration and decryption keys through reflection so that the field
//! access never appears as a plain `sget`/`iget`. These handlers reproduce the reads, with the
//! platform's visibility checks and static-initialization side effects.
//!
//! # Emulated Methods
//!
//! | Method | Handler | Description |
//! |--------|---------|-------------|
//! | `Field.get(Object)` | [`FieldGet`] | Read a static or instance field |
//! | `Field.getName()` | [`FieldGetName`] | Name of the field |
//! | `Field.getModifiers()` | [`FieldGetModifiers`] | Java modifier bits of the field |
//!
//! # Field Handles
//!
//! Parameter 0 of every handler is a [`FieldHandle`]: a [`LocalFieldHandle`] for fields of
//! classes in the artifact, an [`OpaqueFieldHandle`] for everything else. Opaque handles are
//! described by the VM's [`PlatformReflection`] fallback.
//!
//! # Deobfuscation Use Cases
//!
//! ```java
//! // Key hidden behind reflection
//! Field f = Config.class.getDeclaredField("KEY");
//! int key = (Integer) f.get(null);
//! ```
//!
//! # Limitations
//!
//! - No access override: `setAccessible(true)` is not modeled, every non-public field is
//!   inaccessible
//! - Fields of non-local classes are only as precise as the fallback

mod fallback;
mod field_get;
mod field_info;
mod handle;

use std::sync::Arc;

use crate::emulation::EmulatedMethods;

pub use fallback::{PlatformReflection, ReflectionTable, UnavailableReflection};
pub use field_get::FieldGet;
pub use field_info::{FieldGetModifiers, FieldGetName};
pub use handle::{FieldHandle, LocalFieldHandle, OpaqueFieldHandle};

/// `Field.get(Object)`
pub const FIELD_GET: &str = "Ljava/lang/reflect/Field;->get(Ljava/lang/Object;)Ljava/lang/Object;";
/// `Field.getName()`
pub const FIELD_GET_NAME: &str = "Ljava/lang/reflect/Field;->getName()Ljava/lang/String;";
/// `Field.getModifiers()`
pub const FIELD_GET_MODIFIERS: &str = "Ljava/lang/reflect/Field;->getModifiers()I";

/// Registers all `java.lang.reflect.Field` handlers.
pub fn register(methods: &mut EmulatedMethods) {
    methods.register(Arc::new(FieldGet));
    methods.register(Arc::new(FieldGetName));
    methods.register(Arc::new(FieldGetModifiers));
}
