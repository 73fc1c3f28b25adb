// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dexscope
//!
//! Value tracking and platform-API emulation for abstract interpretation of Dalvik bytecode.
//! Built for static analysis and deobfuscation of Android applications: an interpreter built on
//! `dexscope` executes methods while tracking, for every register, whether its value is known
//! exactly or unknown, and reproduces platform side effects such as class static
//! initialization faithfully enough for constant propagation.
//!
//! ## Features
//!
//! - **Known/unknown values** - every register value carries its declared type, determined or not
//! - **Static initialization per lineage** - `<clinit>` side effects happen once per hypothetical
//!   run, never leaking between explored paths
//! - **Emulated methods** - a uniform handler contract for platform calls the interpreter cannot
//!   execute, with the `java.lang.reflect.Field` family built in
//! - **Local and non-local classes** - classes of the artifact are resolved from their
//!   definitions, framework classes through a pluggable reflection fallback
//! - **Parallel path exploration** - the shared virtual machine is `Send + Sync`
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! dexscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use std::sync::Arc;
//! use dexscope::prelude::*;
//!
//! let registry = ClassRegistry::from_definitions(vec![
//!     ClassDef::new(TypeDescriptor::class("Lcom/example/Config;")).static_field(
//!         "KEY",
//!         TypeDescriptor::int(),
//!         AccessFlags::PUBLIC | AccessFlags::FINAL,
//!         Value::int(0x5a),
//!     ),
//! ])?;
//! let vm = VirtualMachine::builder(Arc::new(registry)).build();
//!
//! let key = FieldId::parse("Lcom/example/Config;->KEY:I")?;
//! let mut context = vm.new_context(RegisterFile::with_parameters(vec![
//!     Value::field_handle(Arc::new(LocalFieldHandle::new(key))),
//!     Value::null(TypeDescriptor::object())?,
//! ]));
//!
//! vm.invoke(reflect::FIELD_GET, &mut context)?;
//! let result = context.registers_mut().take_return_register().unwrap();
//! assert_eq!(result.unboxed().as_int(), Some(0x5a));
//! # Ok::<(), dexscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Type descriptors, access flags, fields and the class registry
//! - [`emulation`] - Values, registers, execution contexts and emulated methods
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! `dexscope` logs through the [`log`](https://docs.rs/log) facade and never installs a logger.
//! Static initialization, lineage changes and handler failures are logged at `debug`;
//! register and dispatch traces at `trace`, gated by
//! [`TracingConfig`](emulation::TracingConfig).
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use dexscope::{emulation::EmulationError, metadata::FieldId};
//!
//! match FieldId::parse("not a field") {
//!     Ok(_) => unreachable!(),
//!     Err(EmulationError::InvalidDescriptor { descriptor }) => assert_eq!(descriptor, "not a field"),
//!     Err(e) => panic!("unexpected: {e}"),
//! }
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! RUST_LOG=dexscope=trace cargo test -- --nocapture
//! ```

mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dexscope::prelude::*;
///
/// let value = Value::unknown(TypeDescriptor::int());
/// assert!(value.is_unknown());
/// ```
pub mod prelude;

/// Static description of the analyzed artifact.
///
/// # Key Components
///
/// - [`metadata::TypeDescriptor`] - Dalvik type descriptors
/// - [`metadata::AccessFlags`] - Field access flags
/// - [`metadata::FieldId`] / [`metadata::FieldDescriptor`] - Field identity and declaration
/// - [`metadata::ClassRegistry`] - Local classes of the artifact
pub mod metadata;

/// Abstract-interpretation state and emulated platform methods.
///
/// See the module documentation for an end-to-end example.
pub mod emulation;

/// `dexscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dexscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dexscope::{emulation::EmulationError, Error};
///
/// let err: Error = EmulationError::ParameterOutOfRange { index: 1, count: 1 }.into();
/// assert!(matches!(err, Error::Emulation(_)));
/// ```
pub use error::Error;
