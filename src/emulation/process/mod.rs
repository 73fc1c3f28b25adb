//! Virtual machine construction and configuration.
//!
//! - [`VmBuilder`] - Fluent API for configuring and creating virtual machines
//! - [`VirtualMachine`] - Shared read-only state emulated methods run against
//! - [`VmConfig`] - Configuration with presets
//!
//! # Workflow
//!
//! 1. Build a [`ClassRegistry`](crate::metadata::ClassRegistry) from the artifact's classes
//! 2. Create a [`VmBuilder`] with [`VirtualMachine::builder`] and configure it
//! 3. Call [`build()`](VmBuilder::build)
//! 4. Create a context per explored path with [`VirtualMachine::new_context`]
//! 5. Dispatch non-interpretable calls with [`VirtualMachine::invoke`]
//!
//! # Configuration Presets
//!
//! - [`VmConfig::analysis()`] - Defaults
//! - [`VmConfig::strict_jdk()`] - Access check before static initialization
//! - [`VmConfig::minimal()`] - Shallow, quiet

mod builder;
mod config;
mod machine;

pub use builder::VmBuilder;
pub use config::{InitOrder, TracingConfig, VmConfig};
pub use machine::VirtualMachine;
