// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Positional iteration: ordering, binding category and reference handling.

use fieldwise::{Consumer, Record, TypeVisitor, Visitor, VisitorMut};
use std::any::{type_name, Any};
use std::convert::Infallible;

#[derive(Record)]
struct Sample {
    a: i32,
    b: f64,
    c: String,
}

#[derive(Record)]
struct Counter<'a> {
    label: String,
    hits: &'a mut u32,
}

#[derive(Record)]
struct Nothing;

fn describe<F: Any>(field: &F) -> String {
    let any = field as &dyn Any;
    if let Some(v) = any.downcast_ref::<i32>() {
        v.to_string()
    } else if let Some(v) = any.downcast_ref::<u32>() {
        v.to_string()
    } else if let Some(v) = any.downcast_ref::<f64>() {
        v.to_string()
    } else if let Some(v) = any.downcast_ref::<String>() {
        v.clone()
    } else {
        type_name::<F>().to_string()
    }
}

#[derive(Default)]
struct Describe(Vec<(usize, String)>);

impl Visitor for Describe {
    type Error = Infallible;

    fn visit<F: Any>(&mut self, position: usize, field: &F) -> Result<(), Infallible> {
        self.0.push((position, describe(field)));
        Ok(())
    }
}

/// Fails once `limit` is reached, recording every position it was shown.
struct StopAt {
    limit: usize,
    seen: Vec<usize>,
}

#[derive(Debug, PartialEq)]
struct Rejected(usize);

impl StopAt {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: Vec::new(),
        }
    }

    fn check(&mut self, position: usize) -> Result<(), Rejected> {
        self.seen.push(position);
        if position == self.limit {
            return Err(Rejected(position));
        }
        Ok(())
    }
}

impl Visitor for StopAt {
    type Error = Rejected;

    fn visit<F: Any>(&mut self, position: usize, _field: &F) -> Result<(), Rejected> {
        self.check(position)
    }
}

impl VisitorMut for StopAt {
    type Error = Rejected;

    fn visit_mut<F: Any>(&mut self, position: usize, field: &mut F) -> Result<(), Rejected> {
        self.check(position)?;
        if let Some(n) = (field as &mut dyn Any).downcast_mut::<i32>() {
            *n = -1;
        }
        Ok(())
    }
}

impl Consumer for StopAt {
    type Error = Rejected;

    fn consume<F: Any>(&mut self, position: usize, _field: F) -> Result<(), Rejected> {
        self.check(position)
    }

    fn consume_ref<F: Any>(&mut self, position: usize, _field: &mut F) -> Result<(), Rejected> {
        self.check(position)
    }
}

impl TypeVisitor for StopAt {
    type Error = Rejected;

    fn visit_type<F: Any>(&mut self, position: usize) -> Result<(), Rejected> {
        self.check(position)
    }
}

#[test]
fn test_visits_in_declaration_order() {
    let sample = Sample {
        a: 1,
        b: 3.5,
        c: "x".to_string(),
    };
    let mut visitor = Describe::default();
    fieldwise::for_each(&sample, &mut visitor).unwrap();

    assert_eq!(
        visitor.0,
        [
            (0, "1".to_string()),
            (1, "3.5".to_string()),
            (2, "x".to_string())
        ]
    );
}

#[test]
fn test_empty_record_is_never_visited() {
    let mut visitor = Describe::default();
    fieldwise::for_each(&Nothing, &mut visitor).unwrap();
    assert!(visitor.0.is_empty());
}

#[test]
fn test_reference_fields_bind_the_referent() {
    let mut hits = 41_u32;
    let counter = Counter {
        label: "io".to_string(),
        hits: &mut hits,
    };

    let mut visitor = Describe::default();
    fieldwise::for_each(&counter, &mut visitor).unwrap();
    assert_eq!(visitor.0[1], (1, "41".to_string()));
}

#[test]
fn test_mutable_iteration_writes_through() {
    struct Bump;

    impl VisitorMut for Bump {
        type Error = Infallible;

        fn visit_mut<F: Any>(&mut self, _position: usize, field: &mut F) -> Result<(), Infallible> {
            let any = field as &mut dyn Any;
            if let Some(n) = any.downcast_mut::<u32>() {
                *n += 1;
            } else if let Some(s) = any.downcast_mut::<String>() {
                s.push('!');
            }
            Ok(())
        }
    }

    let mut hits = 41_u32;
    let mut counter = Counter {
        label: "io".to_string(),
        hits: &mut hits,
    };
    fieldwise::for_each_mut(&mut counter, &mut Bump).unwrap();
    assert_eq!(counter.label, "io!");
    drop(counter);
    assert_eq!(hits, 42);
}

#[test]
fn test_owned_iteration() {
    #[derive(Default)]
    struct Collect {
        owned: Vec<(usize, String)>,
        borrowed: Vec<usize>,
    }

    impl Consumer for Collect {
        type Error = Infallible;

        fn consume<F: Any>(&mut self, position: usize, field: F) -> Result<(), Infallible> {
            self.owned.push((position, describe(&field)));
            Ok(())
        }

        fn consume_ref<F: Any>(
            &mut self,
            position: usize,
            field: &mut F,
        ) -> Result<(), Infallible> {
            if let Some(n) = (field as &mut dyn Any).downcast_mut::<u32>() {
                *n = 0;
            }
            self.borrowed.push(position);
            Ok(())
        }
    }

    let mut hits = 9_u32;
    let counter = Counter {
        label: "net".to_string(),
        hits: &mut hits,
    };
    let mut collect = Collect::default();
    fieldwise::into_each(counter, &mut collect).unwrap();

    assert_eq!(collect.owned, [(0, "net".to_string())]);
    assert_eq!(collect.borrowed, [1]);
    assert_eq!(hits, 0);
}

#[test]
fn test_type_only_iteration() {
    #[derive(Default)]
    struct Types(Vec<&'static str>);

    impl TypeVisitor for Types {
        type Error = Infallible;

        fn visit_type<F: Any>(&mut self, position: usize) -> Result<(), Infallible> {
            assert_eq!(position, self.0.len());
            self.0.push(type_name::<F>());
            Ok(())
        }
    }

    let mut types = Types::default();
    fieldwise::for_each_type::<Counter<'_>, _>(&mut types).unwrap();
    assert_eq!(types.0, [type_name::<String>(), type_name::<u32>()]);

    let mut types = Types::default();
    fieldwise::for_each_type::<Sample, _>(&mut types).unwrap();
    assert_eq!(
        types.0,
        [
            type_name::<i32>(),
            type_name::<f64>(),
            type_name::<String>()
        ]
    );
}

#[test]
fn test_field_offsets() {
    assert_eq!(
        Sample::field_offset(0),
        Some(std::mem::offset_of!(Sample, a))
    );
    assert_eq!(
        Sample::field_offset(2),
        Some(std::mem::offset_of!(Sample, c))
    );
    assert_eq!(Sample::field_offset(3), None);
    assert_eq!(Nothing::field_offset(0), None);
}

#[test]
fn test_visitor_panic_propagates() {
    struct Explode;

    impl Visitor for Explode {
        type Error = Infallible;

        fn visit<F: Any>(&mut self, position: usize, _field: &F) -> Result<(), Infallible> {
            assert!(position < 1, "stop at {position}");
            Ok(())
        }
    }

    let sample = Sample {
        a: 0,
        b: 0.0,
        c: String::new(),
    };
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = fieldwise::for_each(&sample, &mut Explode);
    }));
    assert!(result.is_err());
}

#[test]
fn test_first_error_stops_iteration() {
    let sample = Sample {
        a: 1,
        b: 3.5,
        c: "x".to_string(),
    };

    let mut visitor = StopAt::new(1);
    assert_eq!(fieldwise::for_each(&sample, &mut visitor), Err(Rejected(1)));
    assert_eq!(visitor.seen, [0, 1]);

    let mut visitor = StopAt::new(3);
    assert_eq!(fieldwise::for_each(&sample, &mut visitor), Ok(()));
    assert_eq!(visitor.seen, [0, 1, 2]);

    let mut visitor = StopAt::new(0);
    assert_eq!(
        fieldwise::for_each_type::<Sample, _>(&mut visitor),
        Err(Rejected(0))
    );
    assert_eq!(visitor.seen, [0]);
}

#[test]
fn test_error_leaves_later_fields_untouched() {
    #[derive(Record)]
    struct Triple {
        first: i32,
        second: i32,
        third: i32,
    }

    let mut triple = Triple {
        first: 1,
        second: 2,
        third: 3,
    };
    let mut visitor = StopAt::new(1);
    assert_eq!(
        fieldwise::for_each_mut(&mut triple, &mut visitor),
        Err(Rejected(1))
    );
    assert_eq!((triple.first, triple.second, triple.third), (-1, 2, 3));
}

#[test]
fn test_consumer_error_drops_remaining_fields() {
    let mut hits = 5_u32;
    let counter = Counter {
        label: "rx".to_string(),
        hits: &mut hits,
    };
    let mut visitor = StopAt::new(0);
    assert_eq!(
        fieldwise::into_each(counter, &mut visitor),
        Err(Rejected(0))
    );
    assert_eq!(visitor.seen, [0]);
    assert_eq!(hits, 5);
}
