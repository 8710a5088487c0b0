// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Visitor traits for positional field iteration.
//!
//! Rust closures cannot be generic, so a visitor is a type with a generic
//! method. One trait per binding category:
//!
//! | Trait | Entry point | Binding |
//! |-------|-------------|---------|
//! | [`Visitor`] | [`for_each`](crate::for_each) | `&F` |
//! | [`VisitorMut`] | [`for_each_mut`](crate::for_each_mut) | `&mut F` |
//! | [`Consumer`] | [`into_each`](crate::into_each) | `F` or `&mut F` |
//! | [`TypeVisitor`] | [`for_each_type`](crate::for_each_type) | type only |
//!
//! `F` is the binding type of the position: the field type for value
//! fields, the referent for `&mut` fields. It is always `'static`, so a
//! visitor can use [`TypeId`](std::any::TypeId), [`std::any::type_name`]
//! or downcast through [`Any`].
//!
//! Every call returns a `Result`. The first `Err` stops the iteration and
//! is returned by the entry point; later positions are not visited.
//! Visitors that cannot fail use [`Infallible`](std::convert::Infallible).

use std::any::Any;

/// Visits shared bindings of a record, in declaration order.
pub trait Visitor {
    type Error;

    /// Called once per field until one returns `Err`.
    fn visit<F: Any>(&mut self, position: usize, field: &F) -> Result<(), Self::Error>;
}

/// Visits exclusive bindings of a record, in declaration order.
pub trait VisitorMut {
    type Error;

    /// Called once per field until one returns `Err`.
    fn visit_mut<F: Any>(&mut self, position: usize, field: &mut F) -> Result<(), Self::Error>;
}

/// Takes a record apart by value.
///
/// Value fields are moved into [`consume`](Consumer::consume). A `&mut U`
/// field cannot be moved out of its referent, so it is handed to
/// [`consume_ref`](Consumer::consume_ref) instead. Fields not yet consumed
/// when an error is returned are dropped.
pub trait Consumer {
    type Error;

    /// Called for value fields.
    fn consume<F: Any>(&mut self, position: usize, field: F) -> Result<(), Self::Error>;

    /// Called for `&mut` reference fields.
    fn consume_ref<F: Any>(&mut self, position: usize, field: &mut F) -> Result<(), Self::Error>;
}

/// Visits the binding types of a record without an instance.
pub trait TypeVisitor {
    type Error;

    /// Called once per field with its binding type.
    fn visit_type<F: Any>(&mut self, position: usize) -> Result<(), Self::Error>;
}
