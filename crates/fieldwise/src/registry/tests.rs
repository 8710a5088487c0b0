// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for Registry.

use super::*;
use crate::Record;
use std::sync::Barrier;
use std::thread;

#[derive(Record)]
struct Sample {
    a: i32,
    b: f32,
    c: String,
}

#[derive(Record)]
struct Pair(u8, u64);

#[derive(Record)]
struct Unit;

#[derive(Default)]
struct Names(Vec<Option<String>>);

impl NamedVisitor for Names {
    type Error = Error;

    fn visit_named<F: Any>(&mut self, _field: &F, descriptor: &FieldDescriptor) -> Result<()> {
        self.0.push(descriptor.name.clone());
        Ok(())
    }
}

fn strict() -> Registry {
    Registry::with_config(RegistryConfig::new().name_policy(NamePolicy::Strict))
}

#[test]
fn test_register_declaration_names() {
    let registry = Registry::new();
    let token = registry
        .register_declaration::<Sample>("struct S { int a; float b; string c; };")
        .unwrap();
    assert!(token.is_first_registration());
    assert_eq!(token.sequence(), 1);

    let entry = registry.lookup_type::<Sample>().unwrap();
    assert_eq!(entry.arity(), 3);
    assert!(entry.type_identity.is::<Sample>());
    let names: Vec<_> = entry.fields.iter().map(|f| f.name.as_deref()).collect();
    assert_eq!(names, [Some("a"), Some("b"), Some("c")]);
}

#[test]
fn test_descriptor_types_and_offsets() {
    let registry = Registry::new();
    registry.register::<Sample>().unwrap();
    let entry = registry.lookup(TypeId::of::<Sample>()).unwrap();

    assert!(entry.fields[0].type_identity.is::<i32>());
    assert!(entry.fields[1].type_identity.is::<f32>());
    assert!(entry.fields[2].type_identity.is::<String>());

    for (position, field) in entry.fields.iter().enumerate() {
        assert_eq!(field.position, position);
        assert!(field.byte_offset.unwrap() < std::mem::size_of::<Sample>());
    }
    assert_eq!(
        entry.field_named("c").unwrap().byte_offset,
        Some(std::mem::offset_of!(Sample, c))
    );
}

#[test]
fn test_register_uses_declared_names() {
    let registry = Registry::new();
    registry.register::<Pair>().unwrap();
    registry.register::<Unit>().unwrap();

    let pair = registry.lookup_type::<Pair>().unwrap();
    assert_eq!(pair.field(1).unwrap().name.as_deref(), Some("1"));
    assert_eq!(registry.lookup_type::<Unit>().unwrap().arity(), 0);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_repeat_registration_is_noop() {
    let registry = Registry::new();
    let first = registry
        .register_declaration::<Sample>("struct S { int a; float b; string c; };")
        .unwrap();
    let second = registry
        .register_declaration::<Sample>("struct S { int x; float y; string z; };")
        .unwrap();
    let third = registry.register::<Sample>().unwrap();

    assert!(first.is_first_registration());
    assert!(!second.is_first_registration());
    assert!(!third.is_first_registration());
    assert!(first.sequence() < second.sequence());
    assert!(second.sequence() < third.sequence());

    let entry = registry.lookup_type::<Sample>().unwrap();
    assert_eq!(entry.fields[0].name.as_deref(), Some("a"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_lenient_short_declaration() {
    let registry = Registry::new();
    registry
        .register_declaration::<Sample>("struct S { int a; };")
        .unwrap();

    let mut names = Names::default();
    let sample = Sample {
        a: 1,
        b: 2.0,
        c: String::new(),
    };
    registry.for_each_named(&sample, &mut names).unwrap();
    assert_eq!(names.0, [Some("a".to_string()), None, None]);
}

#[test]
fn test_lenient_long_and_broken_declarations() {
    let registry = Registry::new();
    registry
        .register_declaration::<Pair>("struct P { char x; long y; int extra; };")
        .unwrap();
    let pair = registry.lookup_type::<Pair>().unwrap();
    assert_eq!(pair.arity(), 2);
    assert_eq!(pair.fields[1].name.as_deref(), Some("y"));

    registry
        .register_declaration::<Sample>("struct S { int a; /* ")
        .unwrap();
    let sample = registry.lookup_type::<Sample>().unwrap();
    assert_eq!(sample.arity(), 3);
    assert!(sample.fields.iter().all(|f| f.name.is_none()));
}

#[test]
fn test_strict_policy_rejects() {
    let registry = strict();
    let err = registry
        .register_declaration::<Sample>("struct S { int a; };")
        .unwrap_err();
    assert_eq!(
        err,
        Error::NameCountMismatch {
            type_name: std::any::type_name::<Sample>(),
            arity: 3,
            names: 1,
        }
    );

    let err = registry
        .register_declaration::<Sample>("struct S;")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Declaration {
            source: declaration::DeclarationError::MissingBody,
            ..
        }
    ));
    assert!(std::error::Error::source(&err).is_some());
    assert!(registry.is_empty());

    registry
        .register_declaration::<Sample>("struct S { int a; float b; string c; };")
        .unwrap();
    assert!(registry.is_registered::<Sample>());
}

#[test]
fn test_unregistered_type() {
    let registry = Registry::new();
    let mut names = Names::default();
    let err = registry
        .for_each_named(&Pair(1, 2), &mut names)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Unregistered {
            type_name: std::any::type_name::<Pair>(),
        }
    );
    assert!(names.0.is_empty());
    assert!(registry.lookup_type::<Pair>().is_none());
}

#[test]
fn test_named_mut_and_type_visitors() {
    struct Bump;

    impl NamedVisitorMut for Bump {
        type Error = Error;

        fn visit_named_mut<F: Any>(
            &mut self,
            field: &mut F,
            descriptor: &FieldDescriptor,
        ) -> Result<()> {
            if let Some(n) = (field as &mut dyn Any).downcast_mut::<i32>() {
                assert_eq!(descriptor.name.as_deref(), Some("a"));
                *n += 10;
            }
            Ok(())
        }
    }

    struct Layout(Vec<(String, &'static str, usize)>);

    impl NamedTypeVisitor for Layout {
        type Error = Error;

        fn visit_named_type<F: Any>(&mut self, descriptor: &FieldDescriptor) -> Result<()> {
            self.0.push((
                descriptor.name.clone().unwrap_or_default(),
                std::any::type_name::<F>(),
                descriptor.byte_offset.unwrap_or_default(),
            ));
            Ok(())
        }
    }

    let registry = Registry::new();
    registry.register::<Sample>().unwrap();

    let mut sample = Sample {
        a: 1,
        b: 3.5,
        c: "x".to_string(),
    };
    registry.for_each_named_mut(&mut sample, &mut Bump).unwrap();
    assert_eq!(sample.a, 11);

    let mut layout = Layout(Vec::new());
    registry
        .for_each_named_type::<Sample, _>(&mut layout)
        .unwrap();
    let names: Vec<_> = layout.0.iter().map(|(n, t, _)| (n.as_str(), *t)).collect();
    assert_eq!(
        names,
        [
            ("a", std::any::type_name::<i32>()),
            ("b", std::any::type_name::<f32>()),
            ("c", std::any::type_name::<String>()),
        ]
    );
}

#[test]
fn test_concurrent_first_registration() {
    const THREADS: usize = 8;

    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry
                    .register_declaration::<Sample>("struct S { int a; float b; string c; };")
                    .unwrap()
            })
        })
        .collect();

    let tokens: Vec<RegistrationToken> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(tokens.iter().filter(|t| t.is_first_registration()).count(), 1);

    let mut sequences: Vec<u64> = tokens.iter().map(RegistrationToken::sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=THREADS as u64).collect::<Vec<_>>());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_type_identity_equality() {
    let a = TypeIdentity::of::<u32>();
    let b = TypeIdentity {
        id: TypeId::of::<u32>(),
        name: "renamed",
    };
    assert_eq!(a, b);
    assert_ne!(a, TypeIdentity::of::<i32>());
}
