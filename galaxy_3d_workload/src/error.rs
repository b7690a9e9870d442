//! Error types for the Galaxy3D workload
//!
//! Only two conditions are ever surfaced as errors: the index allocator
//! running out of identifiers, and a configuration rejected at construction.
//! Stale identifiers in transactions are not errors (they are ignored when
//! the frame is applied).

use std::fmt;

/// Result type for Galaxy3D workload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D workload errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The index allocator cannot issue another index without exceeding `max`
    CapacityExhausted {
        /// Configured maximum number of indices
        max: i32,
    },

    /// Construction-time configuration was rejected
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExhausted { max } => {
                write!(f, "Capacity exhausted: cannot allocate more than {} indices", max)
            }
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`] and log it at ERROR severity with file:line.
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_workload::engine_err;
/// # use galaxy_3d_workload::galaxy3d::Error;
/// let err = engine_err!("galaxy3d::Collection", Error::InvalidConfig("max_proxies is 0".to_string()));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $error:expr) => {{
        let error: $crate::galaxy3d::Error = $error;
        $crate::engine_error!($source, "{}", error);
        error
    }};
}

/// Log an error and return it from the enclosing function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $error:expr) => {
        return Err($crate::engine_err!($source, $error))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
