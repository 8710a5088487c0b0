// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fieldwise - positional reflection for plain structs
//!
//! `#[derive(Record)]` gives a struct a compile-time arity, positional
//! access to every field, field-by-field iteration and value/reference
//! hybrid tuples. An optional registry attaches field names, binding types
//! and byte offsets at runtime.
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldwise::{Record, Visitor};
//! use std::any::Any;
//! use std::convert::Infallible;
//!
//! #[derive(Record)]
//! struct Sample {
//!     id: u32,
//!     temperature: f64,
//!     label: String,
//! }
//!
//! struct Count(usize);
//!
//! impl Visitor for Count {
//!     type Error = Infallible;
//!
//!     fn visit<F: Any>(&mut self, _position: usize, _field: &F) -> Result<(), Infallible> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! let sample = Sample { id: 7, temperature: 21.5, label: "inlet".into() };
//! assert_eq!(fieldwise::arity::<Sample>(), 3);
//! assert_eq!(*fieldwise::get::<0, _>(&sample), 7);
//!
//! let mut count = Count(0);
//! fieldwise::for_each(&sample, &mut count).unwrap();
//! assert_eq!(count.0, 3);
//!
//! let (id, temperature, label) = fieldwise::tie(&sample);
//! assert!(std::ptr::eq(label, &sample.label));
//! # let _ = (id, temperature);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  #[derive(Record)]  (fieldwise-codegen)                             |
//! |   arity | reference classification | names | offsets | FieldAt<I>  |
//! +---------------------------------------------------------------------+
//! |  Positional layer (no runtime state)                                |
//! |   for_each | for_each_mut | into_each | for_each_type | tie | get    |
//! |   make_tuple | make_tuple_mut | into_tuple                          |
//! +---------------------------------------------------------------------+
//! |  Registry (optional)                                                |
//! |   register | register_declaration | lookup | for_each_named*        |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Record`] | Derived positional reflection |
//! | [`Visitable`] | Visitor-driven iteration (`'static` bindings) |
//! | [`FieldAt`] | Compile-time indexed access |
//! | [`Visitor`] | Per-field callback (one trait per binding category) |
//! | [`Registry`] | Field names, types and offsets by type |
//!
//! ## Binding rule
//!
//! A field of type `&mut U` is a reference position: iteration, `tie` and
//! `get` bind the referent `U`, and hybrid tuples keep it a reference.
//! Every other field (including `&U`) is a value position.

// Allow the derive macro to work inside this crate's tests
extern crate self as fieldwise;

/// Compile-time limits and runtime registry configuration.
pub mod config;

/// Registry errors.
pub mod error;

/// The `Record` trait and positional entry points.
pub mod record;

/// Name/offset registry and declaration parser.
pub mod registry;

/// Value/reference hybrid tuples.
pub mod tuple;

/// Visitor traits.
pub mod visit;

pub use config::{NamePolicy, RegistryConfig, MAX_ARITY};
pub use error::{Error, Result};
pub use record::{
    arity, classify_references, detect_arity, for_each, for_each_mut, for_each_type, get,
    get_mut, into_each, tie, tie_mut, tuple_size, FieldAt, Record, TupleElement, Visitable,
};
pub use registry::{
    FieldDescriptor, NamedTypeVisitor, NamedVisitor, NamedVisitorMut, RegistrationToken,
    Registry, RegistryEntry, TypeIdentity,
};
pub use tuple::{into_tuple, make_tuple, make_tuple_mut};
pub use visit::{Consumer, TypeVisitor, Visitor, VisitorMut};

pub use fieldwise_codegen::Record; // Derive macro (for #[derive(fieldwise::Record)])

use std::any::TypeId;
use std::sync::Arc;

/// Register `T` in the global registry under its declared field names.
///
/// # Errors
///
/// See [`Registry::register`].
pub fn register<T: Visitable + 'static>() -> Result<RegistrationToken> {
    Registry::global().register::<T>()
}

/// Register `T` in the global registry with names parsed from
/// `declaration`.
///
/// # Errors
///
/// See [`Registry::register_declaration`].
pub fn register_declaration<T: Visitable + 'static>(
    declaration: &str,
) -> Result<RegistrationToken> {
    Registry::global().register_declaration::<T>(declaration)
}

/// Look `id` up in the global registry.
pub fn lookup(id: TypeId) -> Option<Arc<RegistryEntry>> {
    Registry::global().lookup(id)
}

/// Named iteration through the global registry.
///
/// # Errors
///
/// [`Error::Unregistered`] (as `V::Error`) if `T` was never registered
/// globally, otherwise the first error returned by `visitor`.
pub fn for_each_named<T, V>(obj: &T, visitor: &mut V) -> std::result::Result<(), V::Error>
where
    T: Visitable + 'static,
    V: NamedVisitor,
{
    Registry::global().for_each_named(obj, visitor)
}

/// Exclusive named iteration through the global registry.
///
/// # Errors
///
/// [`Error::Unregistered`] (as `V::Error`) if `T` was never registered
/// globally, otherwise the first error returned by `visitor`.
pub fn for_each_named_mut<T, V>(obj: &mut T, visitor: &mut V) -> std::result::Result<(), V::Error>
where
    T: Visitable + 'static,
    V: NamedVisitorMut,
{
    Registry::global().for_each_named_mut(obj, visitor)
}

/// Type-only named iteration through the global registry.
///
/// # Errors
///
/// [`Error::Unregistered`] (as `V::Error`) if `T` was never registered
/// globally, otherwise the first error returned by `visitor`.
pub fn for_each_named_type<T, V>(visitor: &mut V) -> std::result::Result<(), V::Error>
where
    T: Visitable + 'static,
    V: NamedTypeVisitor,
{
    Registry::global().for_each_named_type::<T, V>(visitor)
}
