use thiserror::Error;

use crate::emulation::EmulationError;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Emulation Errors
/// - [`Error::Emulation`] - A condition raised while emulating code: failures of emulated
///   platform calls (no such field, illegal access, invalid instance) as well as analysis
///   failures (register out of range, call depth exceeded, ...)
///
/// ## Other Errors
/// - [`Error::Error`] - Failures reported by external collaborators (class initializers,
///   platform-reflection backends)
///
/// # Examples
///
/// ```rust
/// use dexscope::{emulation::EmulationError, Error};
///
/// let err: Error = EmulationError::ParameterOutOfRange { index: 3, count: 2 }.into();
/// match err.emulation() {
///     Some(EmulationError::ParameterOutOfRange { index, .. }) => assert_eq!(*index, 3),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An emulation condition.
    ///
    /// Use [`EmulationError::is_platform_exception`] to tell conditions the emulated program
    /// would observe as a thrown exception from failures of the analysis itself.
    #[error("{0}")]
    Emulation(#[from] EmulationError),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories, such as failures reported by
    /// an external class initializer.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns the emulation condition, if this is [`Error::Emulation`].
    #[must_use]
    pub fn emulation(&self) -> Option<&EmulationError> {
        match self {
            Error::Emulation(err) => Some(err),
            _ => None,
        }
    }
}
