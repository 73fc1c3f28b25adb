//! Dalvik emulation layer for static analysis and deobfuscation.
//!
//! This module provides the state an abstract interpreter tracks while executing a method, and
//! the emulated methods that stand in for platform API calls the interpreter cannot execute
//! (reflection, native code, I/O). The opcode loop itself, and the dex parser feeding it, live
//! outside this crate.
//!
//! # Architecture
//!
//! - Value representation: known/unknown tagged values that always carry a declared type
//! - Memory model: per-invocation register files and static field access
//! - Execution state: contexts threading static initialization through a call lineage
//! - Runtime: the emulated-method contract, its registry and the reflection handlers
//! - Process model: the shared virtual machine and its configuration
//!
//! # Key Components
//!
//! ## Value System
//! - [`crate::emulation::Value`] - Known or unknown register value with a declared type
//! - [`crate::emulation::Payload`] - Concrete content of a known value
//! - [`crate::emulation::Instance`] - Field state of an emulated object
//!
//! ## Memory Model
//! - [`crate::emulation::RegisterFile`] - Registers, parameter window and return slot
//! - [`crate::emulation::StaticFieldStore`] - Static fields with initialization side effects
//!
//! ## Execution State
//! - [`crate::emulation::ExecutionContext`] - Registers plus lineage-owned static state
//! - [`crate::emulation::EmulationError`] - Conditions raised during emulation
//!
//! ## Emulated Methods
//! - [`crate::emulation::EmulatedMethod`] - Handler contract
//! - [`crate::emulation::EmulatedMethods`] - Signature-keyed registry and dispatch
//! - [`crate::emulation::ReturnBuilder`] - Seed-then-commit return register writes
//! - [`crate::emulation::reflect`] - `java.lang.reflect.Field` handlers
//!
//! ## Process Model
//! - [`crate::emulation::VirtualMachine`] - Shared read-only state
//! - [`crate::emulation::VmBuilder`] - Fluent construction
//! - [`crate::emulation::VmConfig`] - Configuration with presets
//!
//! # Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dexscope::emulation::{
//!     reflect, InvokeOutcome, LocalFieldHandle, RegisterFile, Value, VirtualMachine,
//! };
//! use dexscope::metadata::{AccessFlags, ClassDef, ClassRegistry, FieldId, TypeDescriptor};
//!
//! let registry = ClassRegistry::from_definitions(vec![
//!     ClassDef::new(TypeDescriptor::class("LC;"))
//!         .static_field("F", TypeDescriptor::int(), AccessFlags::PUBLIC, Value::int(1)),
//! ])?;
//! let vm = VirtualMachine::builder(Arc::new(registry)).build();
//!
//! let handle = Arc::new(LocalFieldHandle::new(FieldId::parse("LC;->F:I")?));
//! let mut context = vm.new_context(RegisterFile::with_parameters(vec![
//!     Value::field_handle(handle),
//!     Value::null(TypeDescriptor::object())?,
//! ]));
//!
//! assert_eq!(vm.invoke(reflect::FIELD_GET, &mut context)?, InvokeOutcome::Completed);
//! let result = context.registers_mut().take_return_register().unwrap();
//! assert_eq!(result.unboxed(), &Value::int(1));
//! # Ok::<(), dexscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`crate::emulation::VirtualMachine`] is `Send + Sync` and shared by reference across
//! concurrently explored paths. Each [`crate::emulation::ExecutionContext`] is owned by exactly
//! one path.

mod engine;
mod memory;
mod process;
mod runtime;
mod value;

// Re-export primary types from value module
pub use value::{Instance, Payload, Value};

// Re-export primary types from memory module
pub use memory::{ClassInitializer, RegisterFile, StaticFieldStore};

// Re-export primary types from engine module
pub use engine::{platform_exception, EmulationError, ExecutionContext, InvalidInstanceReason};

// Re-export primary types from process module
pub use process::{InitOrder, TracingConfig, VirtualMachine, VmBuilder, VmConfig};

// Re-export primary types from runtime module
pub use runtime::{
    reflect, EmulatedMethod, EmulatedMethods, FieldHandle, InvokeOutcome, LocalFieldHandle,
    OpaqueFieldHandle, PlatformReflection, ReflectionTable, ReturnBuilder, UnavailableReflection,
};
