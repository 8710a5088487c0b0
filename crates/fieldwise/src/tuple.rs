// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value/reference hybrid tuples.
//!
//! [`Record::bindings`] returns a tuple of markers, one per position:
//! [`Value`] for value fields and [`Reference`] / [`ReferenceMut`] for
//! `&mut` fields. [`Decay`] turns that tuple into the hybrid shape: value
//! positions become clones, reference positions stay references to the
//! same referent.
//!
//! ```text
//! struct Reading<'a> { id: u32, label: String, total: &'a mut u64 }
//!
//! bindings()      -> (Value<u32>, Value<String>, Reference<u64>)
//! make_tuple()    -> (u32, String, &u64)
//! make_tuple_mut()-> (u32, String, &mut u64)
//! ```
//!
//! `Decay` is implemented for tuples of every length up to
//! [`MAX_ARITY`](crate::MAX_ARITY). `Clone` is only required by the
//! positions that are actually decayed, and only where `make_tuple` is
//! called.

use crate::record::Record;

/// Converts a binding (or a tuple of bindings) into its decayed form.
pub trait Decay {
    /// Decayed form.
    type Output;

    /// Perform the conversion.
    fn decay(self) -> Self::Output;
}

/// Output of [`Decay`] for `B`.
pub type Decayed<B> = <B as Decay>::Output;

/// Value position: decays to a clone of the field.
#[derive(Debug)]
pub struct Value<'r, T>(&'r T);

impl<'r, T> Value<'r, T> {
    #[inline]
    #[must_use]
    pub const fn new(field: &'r T) -> Self {
        Self(field)
    }

    /// Borrow the field without decaying it.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> &'r T {
        self.0
    }
}

impl<T: Clone> Decay for Value<'_, T> {
    type Output = T;

    #[inline]
    fn decay(self) -> T {
        self.0.clone()
    }
}

/// Reference position seen through a shared borrow: decays to `&U`.
#[derive(Debug)]
pub struct Reference<'r, U: ?Sized>(&'r U);

impl<'r, U: ?Sized> Reference<'r, U> {
    #[inline]
    #[must_use]
    pub const fn new(referent: &'r U) -> Self {
        Self(referent)
    }
}

impl<'r, U: ?Sized> Decay for Reference<'r, U> {
    type Output = &'r U;

    #[inline]
    fn decay(self) -> &'r U {
        self.0
    }
}

/// Reference position seen through an exclusive borrow: decays to `&mut U`.
#[derive(Debug)]
pub struct ReferenceMut<'r, U: ?Sized>(&'r mut U);

impl<'r, U: ?Sized> ReferenceMut<'r, U> {
    #[inline]
    #[must_use]
    pub fn new(referent: &'r mut U) -> Self {
        Self(referent)
    }
}

impl<'r, U: ?Sized> Decay for ReferenceMut<'r, U> {
    type Output = &'r mut U;

    #[inline]
    fn decay(self) -> &'r mut U {
        self.0
    }
}

macro_rules! decay_tuple {
    () => {
        impl Decay for () {
            type Output = ();

            #[inline]
            fn decay(self) {}
        }
    };
    ($head:ident $(, $tail:ident)*) => {
        impl<$head: Decay $(, $tail: Decay)*> Decay for ($head, $($tail,)*) {
            type Output = (<$head as Decay>::Output, $(<$tail as Decay>::Output,)*);

            #[inline]
            #[allow(non_snake_case)]
            fn decay(self) -> Self::Output {
                let ($head, $($tail,)*) = self;
                ($head.decay(), $($tail.decay(),)*)
            }
        }

        decay_tuple!($($tail),*);
    };
}

// One identifier per supported position (MAX_ARITY = 40).
decay_tuple!(
    E0, E1, E2, E3, E4, E5, E6, E7, E8, E9, E10, E11, E12, E13, E14, E15, E16, E17, E18, E19,
    E20, E21, E22, E23, E24, E25, E26, E27, E28, E29, E30, E31, E32, E33, E34, E35, E36, E37,
    E38, E39
);

/// Build the hybrid tuple of a shared record: clones for value fields,
/// `&U` for `&mut` fields.
///
/// ```
/// use fieldwise::Record;
///
/// #[derive(Record)]
/// struct Counter<'a> {
///     label: String,
///     hits: &'a mut u32,
/// }
///
/// let mut hits = 3;
/// let counter = Counter { label: "io".to_string(), hits: &mut hits };
/// let (label, hits_ref): (String, &u32) = fieldwise::make_tuple(&counter);
/// assert_eq!(label, "io");
/// assert_eq!(*hits_ref, 3);
/// ```
#[inline]
pub fn make_tuple<'r, T>(obj: &'r T) -> Decayed<T::Bindings<'r>>
where
    T: Record,
    T::Bindings<'r>: Decay,
{
    obj.bindings().decay()
}

/// Build the hybrid tuple of an exclusively borrowed record: clones for
/// value fields, `&mut U` for `&mut` fields.
#[inline]
pub fn make_tuple_mut<'r, T>(obj: &'r mut T) -> Decayed<T::BindingsMut<'r>>
where
    T: Record,
    T::BindingsMut<'r>: Decay,
{
    obj.bindings_mut().decay()
}

/// Move every field out as a tuple. Value fields move, `&mut` fields keep
/// pointing at their referents.
#[inline]
pub fn into_tuple<T: Record>(obj: T) -> T::Fields {
    obj.into_fields()
}
