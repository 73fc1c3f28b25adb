//! # dexscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dexscope library. Import this module to get quick access to the essential
//! types for emulating Dalvik code.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dexscope operations
pub use crate::Error;

/// The result type used throughout dexscope
pub use crate::Result;

// ================================================================================================
// Metadata
// ================================================================================================

/// Dalvik type descriptors
pub use crate::metadata::{Primitive, TypeDescriptor};

/// Field identity, declaration and access flags
pub use crate::metadata::{AccessFlags, FieldDescriptor, FieldId, Visibility};

/// Local class definitions
pub use crate::metadata::{ClassDef, ClassRegistry};

// ================================================================================================
// Emulation
// ================================================================================================

/// Register values
pub use crate::emulation::{Instance, Payload, Value};

/// Registers, static fields and execution contexts
pub use crate::emulation::{ClassInitializer, ExecutionContext, RegisterFile, StaticFieldStore};

/// Errors raised while emulating
pub use crate::emulation::{EmulationError, InvalidInstanceReason};

/// Virtual machine and configuration
pub use crate::emulation::{InitOrder, TracingConfig, VirtualMachine, VmBuilder, VmConfig};

/// Emulated methods
pub use crate::emulation::{
    reflect, EmulatedMethod, EmulatedMethods, InvokeOutcome, ReturnBuilder,
};

/// Reflective field handles and the platform fallback
pub use crate::emulation::{
    FieldHandle, LocalFieldHandle, OpaqueFieldHandle, PlatformReflection, ReflectionTable,
};
