// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name/offset registry.
//!
//! Positional iteration needs nothing at runtime. Field names and byte
//! offsets are attached by registering the type once, after which the
//! named entry points pair each position with its [`FieldDescriptor`].
//!
//! # Architecture
//!
//! ```text
//! Registry
//! +-- entries: ArcSwap<HashMap<TypeId, Arc<RegistryEntry>>>   (lock-free reads)
//! +-- write_lock: Mutex<()>                                   (first insertion)
//! +-- sequence: AtomicU64                                     (token counter)
//! +-- config: RegistryConfig                                  (name policy)
//! ```
//!
//! Entries are immutable once published; a registration swaps in a new
//! map snapshot. Repeat registrations of a type are no-ops that still
//! return a token.
//!
//! # Example
//!
//! ```
//! use fieldwise::{FieldDescriptor, NamedVisitor, Record, Registry};
//! use std::any::Any;
//!
//! #[derive(Record)]
//! struct S {
//!     a: i32,
//!     b: f32,
//!     c: String,
//! }
//!
//! struct Names(Vec<String>);
//!
//! impl NamedVisitor for Names {
//!     type Error = fieldwise::Error;
//!
//!     fn visit_named<F: Any>(
//!         &mut self,
//!         _field: &F,
//!         descriptor: &FieldDescriptor,
//!     ) -> Result<(), Self::Error> {
//!         self.0.push(descriptor.name.clone().unwrap_or_default());
//!         Ok(())
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register_declaration::<S>("struct S { int a; float b; string c; };")
//!     .unwrap();
//!
//! let mut names = Names(Vec::new());
//! let s = S { a: 1, b: 3.5, c: "x".into() };
//! registry.for_each_named(&s, &mut names).unwrap();
//! assert_eq!(names.0, ["a", "b", "c"]);
//! ```

pub mod declaration;

#[cfg(test)]
mod tests;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::config::{NamePolicy, RegistryConfig};
use crate::error::{Error, Result};
use crate::record::Visitable;
use crate::visit::{TypeVisitor, Visitor, VisitorMut};
use declaration::parse_field_names;

// ============================================================================
// Metadata
// ============================================================================

/// Runtime identity of a type: its [`TypeId`] plus a printable name.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Debug, Clone, Copy)]
pub struct TypeIdentity {
    pub id: TypeId,
    /// `std::any::type_name`; for diagnostics only.
    pub name: &'static str,
}

impl TypeIdentity {
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Whether this identity is `T`.
    #[must_use]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Registered metadata of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Zero-based declaration position.
    pub position: usize,
    /// `None` when the declaration did not provide a name for this position.
    pub name: Option<String>,
    /// Binding type (the referent for `&mut` fields).
    pub type_identity: TypeIdentity,
    /// Offset of the field inside the record.
    pub byte_offset: Option<usize>,
}

/// Everything registered for one type. `fields.len()` equals its arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub type_identity: TypeIdentity,
    pub fields: Vec<FieldDescriptor>,
}

impl RegistryEntry {
    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn field(&self, position: usize) -> Option<&FieldDescriptor> {
        self.fields.get(position)
    }

    /// First field carrying `name`.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name.as_deref() == Some(name))
    }
}

/// Receipt of a registration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationToken {
    sequence: u64,
    first_registration: bool,
}

impl RegistrationToken {
    /// Per-registry call counter, starting at 1.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// `false` when the type was already registered.
    #[must_use]
    pub fn is_first_registration(&self) -> bool {
        self.first_registration
    }
}

// ============================================================================
// Named visitors
// ============================================================================

/// Visits shared bindings paired with their descriptors.
///
/// `Error` must absorb the registry's [`Error`] so that an unregistered
/// type and a failing visitor reach the caller through the same `Result`.
/// Visitors without failures of their own use `type Error = fieldwise::Error`.
pub trait NamedVisitor {
    type Error: From<Error>;

    fn visit_named<F: Any>(
        &mut self,
        field: &F,
        descriptor: &FieldDescriptor,
    ) -> std::result::Result<(), Self::Error>;
}

/// Visits exclusive bindings paired with their descriptors.
pub trait NamedVisitorMut {
    type Error: From<Error>;

    fn visit_named_mut<F: Any>(
        &mut self,
        field: &mut F,
        descriptor: &FieldDescriptor,
    ) -> std::result::Result<(), Self::Error>;
}

/// Visits binding types paired with their descriptors, without an instance.
pub trait NamedTypeVisitor {
    type Error: From<Error>;

    fn visit_named_type<F: Any>(
        &mut self,
        descriptor: &FieldDescriptor,
    ) -> std::result::Result<(), Self::Error>;
}

struct Named<'a, V> {
    fields: &'a [FieldDescriptor],
    visitor: &'a mut V,
}

impl<V: NamedVisitor> Visitor for Named<'_, V> {
    type Error = V::Error;

    fn visit<F: Any>(&mut self, position: usize, field: &F) -> std::result::Result<(), V::Error> {
        match self.fields.get(position) {
            Some(descriptor) => self.visitor.visit_named(field, descriptor),
            None => Ok(()),
        }
    }
}

impl<V: NamedVisitorMut> VisitorMut for Named<'_, V> {
    type Error = V::Error;

    fn visit_mut<F: Any>(
        &mut self,
        position: usize,
        field: &mut F,
    ) -> std::result::Result<(), V::Error> {
        match self.fields.get(position) {
            Some(descriptor) => self.visitor.visit_named_mut(field, descriptor),
            None => Ok(()),
        }
    }
}

impl<V: NamedTypeVisitor> TypeVisitor for Named<'_, V> {
    type Error = V::Error;

    fn visit_type<F: Any>(&mut self, position: usize) -> std::result::Result<(), V::Error> {
        match self.fields.get(position) {
            Some(descriptor) => self.visitor.visit_named_type::<F>(descriptor),
            None => Ok(()),
        }
    }
}

/// Collects binding type identities in order.
struct TypeCollector(Vec<TypeIdentity>);

impl TypeVisitor for TypeCollector {
    type Error = Infallible;

    fn visit_type<F: Any>(&mut self, _position: usize) -> std::result::Result<(), Infallible> {
        self.0.push(TypeIdentity::of::<F>());
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Type-keyed store of field names, binding types and offsets.
pub struct Registry {
    entries: ArcSwap<HashMap<TypeId, Arc<RegistryEntry>>>,
    write_lock: Mutex<()>,
    sequence: AtomicU64,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Registry {
    /// Empty registry with the default (lenient) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
            sequence: AtomicU64::new(0),
            config,
        }
    }

    /// Process-wide registry, configured from the environment on first use
    /// (see [`RegistryConfig::from_env`]).
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| Registry::with_config(RegistryConfig::from_env()))
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `T` under its declared field names.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches [`register_declaration`](Self::register_declaration).
    pub fn register<T: Visitable + 'static>(&self) -> Result<RegistrationToken> {
        let sequence = self.next_sequence();
        if self.is_registered::<T>() {
            return Ok(RegistrationToken {
                sequence,
                first_registration: false,
            });
        }
        let names = T::FIELD_NAMES
            .iter()
            .map(|name| Some((*name).to_string()))
            .collect();
        Ok(self.insert::<T>(sequence, names))
    }

    /// Register `T` with names parsed from `declaration`.
    ///
    /// Positions pair with names in order. How unparsable text or a name
    /// count different from `T::ARITY` is handled depends on the
    /// [`NamePolicy`].
    ///
    /// # Errors
    ///
    /// With [`NamePolicy::Strict`] only: [`Error::Declaration`] or
    /// [`Error::NameCountMismatch`]; nothing is registered.
    pub fn register_declaration<T: Visitable + 'static>(
        &self,
        declaration: &str,
    ) -> Result<RegistrationToken> {
        let sequence = self.next_sequence();
        if self.is_registered::<T>() {
            return Ok(RegistrationToken {
                sequence,
                first_registration: false,
            });
        }

        let type_name = std::any::type_name::<T>();
        let strict = self.config.name_policy == NamePolicy::Strict;

        let parsed = match parse_field_names(declaration) {
            Ok(names) => names,
            Err(source) if strict => return Err(Error::Declaration { type_name, source }),
            Err(source) => {
                log::warn!(
                    "[Registry] {}: {}, registering without field names",
                    type_name,
                    source
                );
                Vec::new()
            }
        };

        if parsed.len() != T::ARITY {
            if strict {
                return Err(Error::NameCountMismatch {
                    type_name,
                    arity: T::ARITY,
                    names: parsed.len(),
                });
            }
            log::warn!(
                "[Registry] {}: {} fields but {} names in declaration",
                type_name,
                T::ARITY,
                parsed.len()
            );
        }

        let mut names: Vec<Option<String>> =
            parsed.into_iter().take(T::ARITY).map(Some).collect();
        names.resize(T::ARITY, None);

        Ok(self.insert::<T>(sequence, names))
    }

    /// Entry registered for `id`.
    #[must_use]
    pub fn lookup(&self, id: TypeId) -> Option<Arc<RegistryEntry>> {
        self.entries.load().get(&id).cloned()
    }

    #[must_use]
    pub fn lookup_type<T: Any>(&self) -> Option<Arc<RegistryEntry>> {
        self.lookup(TypeId::of::<T>())
    }

    #[must_use]
    pub fn is_registered<T: Any>(&self) -> bool {
        self.entries.load().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Visit every field of `obj` with its descriptor, in declaration order.
    ///
    /// # Errors
    ///
    /// [`Error::Unregistered`] (converted into `V::Error`) if `T` was never
    /// registered, otherwise the first error returned by `visitor`.
    pub fn for_each_named<T, V>(
        &self,
        obj: &T,
        visitor: &mut V,
    ) -> std::result::Result<(), V::Error>
    where
        T: Visitable + 'static,
        V: NamedVisitor,
    {
        let entry = self.entry::<T>()?;
        obj.for_each_field(&mut Named {
            fields: &entry.fields,
            visitor,
        })
    }

    /// Exclusive variant of [`for_each_named`](Self::for_each_named).
    ///
    /// # Errors
    ///
    /// As [`for_each_named`](Self::for_each_named).
    pub fn for_each_named_mut<T, V>(
        &self,
        obj: &mut T,
        visitor: &mut V,
    ) -> std::result::Result<(), V::Error>
    where
        T: Visitable + 'static,
        V: NamedVisitorMut,
    {
        let entry = self.entry::<T>()?;
        obj.for_each_field_mut(&mut Named {
            fields: &entry.fields,
            visitor,
        })
    }

    /// Visit every binding type of `T` with its descriptor.
    ///
    /// # Errors
    ///
    /// As [`for_each_named`](Self::for_each_named).
    pub fn for_each_named_type<T, V>(&self, visitor: &mut V) -> std::result::Result<(), V::Error>
    where
        T: Visitable + 'static,
        V: NamedTypeVisitor,
    {
        let entry = self.entry::<T>()?;
        T::for_each_field_type(&mut Named {
            fields: &entry.fields,
            visitor,
        })
    }

    fn entry<T: Any>(&self) -> Result<Arc<RegistryEntry>> {
        self.lookup_type::<T>().ok_or(Error::Unregistered {
            type_name: std::any::type_name::<T>(),
        })
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Build and publish the entry for `T` unless a concurrent caller got
    /// there first. `names.len()` must equal `T::ARITY`.
    fn insert<T: Visitable + 'static>(
        &self,
        sequence: u64,
        names: Vec<Option<String>>,
    ) -> RegistrationToken {
        let type_identity = TypeIdentity::of::<T>();
        let _guard = self.write_lock.lock();

        let current = self.entries.load_full();
        if current.contains_key(&type_identity.id) {
            return RegistrationToken {
                sequence,
                first_registration: false,
            };
        }

        let mut types = TypeCollector(Vec::with_capacity(T::ARITY));
        if let Err(never) = T::for_each_field_type(&mut types) {
            match never {}
        }

        let fields: Vec<FieldDescriptor> = types
            .0
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(position, (type_identity, name))| FieldDescriptor {
                position,
                name,
                type_identity,
                byte_offset: T::field_offset(position),
            })
            .collect();

        log::debug!(
            "[Registry] registered {} ({} fields, sequence {})",
            type_identity.name,
            fields.len(),
            sequence
        );

        let mut next = HashMap::clone(&current);
        next.insert(
            type_identity.id,
            Arc::new(RegistryEntry {
                type_identity,
                fields,
            }),
        );
        self.entries.store(Arc::new(next));

        RegistrationToken {
            sequence,
            first_registration: true,
        }
    }
}
