// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime errors.
//!
//! Unsupported record shapes and out-of-range indices are compile-time
//! errors and never reach this type.

use crate::registry::declaration::DeclarationError;

/// Errors returned by the registry.
///
/// # Example
///
/// ```
/// use fieldwise::{Error, FieldDescriptor, NamedTypeVisitor, Record, Registry};
///
/// #[derive(Record)]
/// struct Never {
///     a: u8,
/// }
///
/// struct Noop;
///
/// impl NamedTypeVisitor for Noop {
///     type Error = Error;
///
///     fn visit_named_type<F: std::any::Any>(&mut self, _: &FieldDescriptor) -> Result<(), Error> {
///         Ok(())
///     }
/// }
///
/// let registry = Registry::new();
/// let err = registry.for_each_named_type::<Never, _>(&mut Noop).unwrap_err();
/// assert!(matches!(err, Error::Unregistered { .. }));
/// assert!(err.to_string().contains("Never"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A name-aware operation was used on a type that was never registered.
    Unregistered {
        /// `std::any::type_name` of the type.
        type_name: &'static str,
    },
    /// The declaration text could not be parsed (strict name policy only).
    Declaration {
        type_name: &'static str,
        source: DeclarationError,
    },
    /// The number of field names differs from the arity (strict name
    /// policy only).
    NameCountMismatch {
        type_name: &'static str,
        arity: usize,
        names: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Unregistered { type_name } => {
                write!(f, "Type is not registered: {}", type_name)
            }
            Error::Declaration { type_name, source } => {
                write!(f, "Invalid declaration for {}: {}", type_name, source)
            }
            Error::NameCountMismatch {
                type_name,
                arity,
                names,
            } => write!(
                f,
                "Field name count mismatch for {}: {} fields, {} names",
                type_name, arity, names
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Declaration { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenient alias for registry results.
pub type Result<T> = core::result::Result<T, Error>;
