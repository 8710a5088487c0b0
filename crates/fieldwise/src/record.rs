// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Positional record reflection.
//!
//! [`Record`] is implemented by `#[derive(Record)]` and carries everything
//! that can be known from the struct definition alone: the arity, which
//! positions are `&mut` references, the derived field names and offsets,
//! and the positional decomposition in both borrow modes and by value.
//! [`Visitable`] adds visitor-driven iteration for records whose bindings
//! are all `'static`.
//!
//! # Binding rule
//!
//! | Field type | Classified as | Binding |
//! |------------|---------------|---------|
//! | `T` | value | `T` |
//! | `&'a T` | value (copied reference) | `&'a T` |
//! | `&'a mut U` | reference | `U` (the referent) |
//!
//! Shared references accept a copy exactly like a value does, so they are
//! never reported as reference positions. Copying a shared reference still
//! aliases the same referent.

use crate::visit::{Consumer, TypeVisitor, Visitor, VisitorMut};

/// Positional reflection over a plain struct.
///
/// Implement through `#[derive(Record)]`; the associated items are tied
/// together (tuple lengths, position indices, `ARITY`) and are not meant
/// to be written by hand.
pub trait Record: Sized {
    /// Number of fields, at most [`MAX_ARITY`](crate::MAX_ARITY).
    const ARITY: usize;

    /// `true` at every `&mut` reference position. Length is `ARITY`.
    const REFERENCE_FIELDS: &'static [bool];

    /// Declared field names (`"0"`, `"1"`, ... for tuple structs).
    const FIELD_NAMES: &'static [&'static str];

    /// `(&F0, &F1, ...)`
    type Tie<'r>
    where
        Self: 'r;

    /// `(&mut F0, &mut F1, ...)`
    type TieMut<'r>
    where
        Self: 'r;

    /// Binding markers seen through `&self`; see [`crate::tuple`].
    type Bindings<'r>
    where
        Self: 'r;

    /// Binding markers seen through `&mut self`; see [`crate::tuple`].
    type BindingsMut<'r>
    where
        Self: 'r;

    /// Declared field types, in order.
    type Fields;

    /// Borrow every binding.
    fn tie(&self) -> Self::Tie<'_>;

    /// Borrow every binding exclusively.
    fn tie_mut(&mut self) -> Self::TieMut<'_>;

    fn bindings(&self) -> Self::Bindings<'_>;

    fn bindings_mut(&mut self) -> Self::BindingsMut<'_>;

    /// Move every field out.
    fn into_fields(self) -> Self::Fields;

    /// Byte offset of the field at `position` inside `Self`.
    fn field_offset(position: usize) -> Option<usize>;
}

/// Field iteration through [`Any`](std::any::Any) bindings.
///
/// Also implemented by `#[derive(Record)]`, but only where every binding
/// type is `'static`. A record borrowing non-`'static` data keeps the rest
/// of [`Record`] (`tie`, `get`, `make_tuple`, ...).
///
/// Each method stops at the first visitor error and returns it.
pub trait Visitable: Record {
    fn for_each_field<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error>;

    fn for_each_field_mut<V: VisitorMut>(&mut self, visitor: &mut V) -> Result<(), V::Error>;

    fn into_each_field<V: Consumer>(self, consumer: &mut V) -> Result<(), V::Error>;

    fn for_each_field_type<V: TypeVisitor>(visitor: &mut V) -> Result<(), V::Error>;
}

/// Indexed access to position `I`.
///
/// Implemented by the derive for every `I < ARITY`; any other index has no
/// implementation and is rejected at compile time:
///
/// ```compile_fail
/// use fieldwise::Record;
///
/// #[derive(Record)]
/// struct Pair {
///     a: i32,
///     b: i32,
/// }
///
/// let pair = Pair { a: 1, b: 2 };
/// let _ = fieldwise::get::<2, _>(&pair);
/// ```
pub trait FieldAt<const I: usize>: Record {
    /// Binding type at `I`.
    type Type: ?Sized;

    fn field(&self) -> &Self::Type;

    fn field_mut(&mut self) -> &mut Self::Type;
}

/// Binding type of position `I` of `T`.
pub type TupleElement<T, const I: usize> = <T as FieldAt<I>>::Type;

/// Field count of `T`.
///
/// Enums, unions and structs with more than
/// [`MAX_ARITY`](crate::MAX_ARITY) fields are rejected by the derive:
///
/// ```compile_fail
/// use fieldwise::Record;
///
/// #[derive(Record)]
/// enum Shape {
///     Circle,
///     Square,
/// }
/// ```
///
/// ```compile_fail
/// use fieldwise::Record;
///
/// #[derive(Record)]
/// struct Wide(
///     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
///     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
///     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
///     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
///     u8,
/// );
/// ```
#[inline]
#[must_use]
pub const fn detect_arity<T: Record>() -> usize {
    T::ARITY
}

/// Alias of [`detect_arity`].
#[inline]
#[must_use]
pub const fn arity<T: Record>() -> usize {
    T::ARITY
}

/// Tuple-style name for the arity of `T`.
#[inline]
#[must_use]
pub const fn tuple_size<T: Record>() -> usize {
    T::ARITY
}

/// Which positions of `T` are `&mut` references.
#[inline]
#[must_use]
pub const fn classify_references<T: Record>() -> &'static [bool] {
    T::REFERENCE_FIELDS
}

/// Visit every field of `obj` through shared bindings.
///
/// Visits happen in declaration order on the calling thread. The first
/// visitor error ends the iteration and is returned; a panic propagates.
///
/// # Errors
///
/// The first error returned by `visitor`.
#[inline]
pub fn for_each<T: Visitable, V: Visitor>(obj: &T, visitor: &mut V) -> Result<(), V::Error> {
    obj.for_each_field(visitor)
}

/// Visit every field of `obj` through exclusive bindings.
///
/// # Errors
///
/// The first error returned by `visitor`.
#[inline]
pub fn for_each_mut<T: Visitable, V: VisitorMut>(
    obj: &mut T,
    visitor: &mut V,
) -> Result<(), V::Error> {
    obj.for_each_field_mut(visitor)
}

/// Take `obj` apart, handing each field to `consumer`.
///
/// # Errors
///
/// The first error returned by `consumer`; the remaining fields are dropped.
#[inline]
pub fn into_each<T: Visitable, V: Consumer>(obj: T, consumer: &mut V) -> Result<(), V::Error> {
    obj.into_each_field(consumer)
}

/// Visit the binding type of every field of `T`.
///
/// # Errors
///
/// The first error returned by `visitor`.
#[inline]
pub fn for_each_type<T: Visitable, V: TypeVisitor>(visitor: &mut V) -> Result<(), V::Error> {
    T::for_each_field_type(visitor)
}

/// Shared tuple of every binding of `obj`.
#[inline]
pub fn tie<T: Record>(obj: &T) -> T::Tie<'_> {
    obj.tie()
}

/// Exclusive tuple of every binding of `obj`.
#[inline]
pub fn tie_mut<T: Record>(obj: &mut T) -> T::TieMut<'_> {
    obj.tie_mut()
}

/// Binding at position `I`.
///
/// ```
/// use fieldwise::Record;
///
/// #[derive(Record)]
/// struct Pair(i32, String);
///
/// let pair = Pair(1, "one".to_string());
/// assert_eq!(*fieldwise::get::<0, _>(&pair), 1);
/// assert_eq!(fieldwise::get::<1, _>(&pair), "one");
/// ```
#[inline]
pub fn get<const I: usize, T: FieldAt<I>>(obj: &T) -> &T::Type {
    obj.field()
}

/// Exclusive binding at position `I`.
#[inline]
pub fn get_mut<const I: usize, T: FieldAt<I>>(obj: &mut T) -> &mut T::Type {
    obj.field_mut()
}
