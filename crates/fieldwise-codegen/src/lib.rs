// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[derive(Record)]` for the `fieldwise` crate.
//!
//! The derive is the arity detector and the reference classifier: it reads
//! the struct definition once and emits the positional decomposition
//! (`tie`, bindings, owned destructuring), the visitor-driven iteration,
//! one `FieldAt<I>` impl per position and the derived field names and
//! offsets.

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, Member, Type};

/// Largest supported field count. Mirrors `fieldwise::MAX_ARITY`; the
/// generated code re-checks against the runtime constant.
const MAX_ARITY: usize = 40;

/// How a position is bound when the record is decomposed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// Bound as the field itself (includes shared `&U` fields).
    Value,
    /// `&mut U` field, bound as its referent `U`.
    Reference,
}

struct FieldInfo {
    member: Member,
    name: String,
    ty: Type,
    binding: Type,
    kind: FieldKind,
}

impl FieldInfo {
    /// `&self.x` or `&*self.x`
    fn shared_access(&self) -> TokenStream2 {
        let member = &self.member;
        match self.kind {
            FieldKind::Value => quote! { &self.#member },
            FieldKind::Reference => quote! { &*self.#member },
        }
    }

    /// `&mut self.x` or `&mut *self.x`
    fn exclusive_access(&self) -> TokenStream2 {
        let member = &self.member;
        match self.kind {
            FieldKind::Value => quote! { &mut self.#member },
            FieldKind::Reference => quote! { &mut *self.#member },
        }
    }
}

/// `#[derive(Record)]`: positional reflection for plain structs.
///
/// Supports named, tuple and unit structs with at most 40 fields. A field
/// of type `&mut U` is classified as a reference and bound to its
/// referent; every other field (including `&U`) is bound as a value.
/// `Record` and `FieldAt<I>` are unbounded. `Visitable` is emitted with a
/// `'static` bound on every binding type, so visitors can inspect bindings
/// through [`std::any::Any`].
///
/// Example:
/// ```ignore
/// use fieldwise::Record;
///
/// #[derive(Record, Default)]
/// struct Sample {
///     id: u32,
///     temperature: f64,
///     label: String,
/// }
/// ```
#[proc_macro_derive(Record)]
#[allow(clippy::too_many_lines)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) | Data::Union(_) => {
            return syn::Error::new_spanned(
                &input,
                "unsupported record: not aggregate-like (only structs are supported)",
            )
            .to_compile_error()
            .into()
        }
    };

    let field_infos: Vec<FieldInfo> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| {
                let ident = f.ident.as_ref()?;
                Some(field_info(
                    Member::Named(ident.clone()),
                    ident.unraw().to_string(),
                    &f.ty,
                ))
            })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(idx, f)| field_info(Member::Unnamed(idx.into()), idx.to_string(), &f.ty))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let arity = field_infos.len();
    if arity > MAX_ARITY {
        return syn::Error::new_spanned(
            &input,
            format!(
                "unsupported record: {arity} fields exceeds the maximum of {MAX_ARITY}"
            ),
        )
        .to_compile_error()
        .into();
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Visitors require `Any` bindings; only the `Visitable` impl is bounded
    let mut visitable_generics = input.generics.clone();
    {
        let visitable_where = visitable_generics.make_where_clause();
        for f in &field_infos {
            let binding = &f.binding;
            visitable_where
                .predicates
                .push(parse_quote! { #binding: 'static });
        }
    }
    let (visitable_impl_generics, _, visitable_where_clause) =
        visitable_generics.split_for_impl();

    let positions: Vec<Literal> = (0..arity).map(Literal::usize_unsuffixed).collect();
    let members: Vec<&Member> = field_infos.iter().map(|f| &f.member).collect();
    let locals: Vec<syn::Ident> = (0..arity).map(|i| format_ident!("__field{}", i)).collect();
    let types: Vec<&Type> = field_infos.iter().map(|f| &f.ty).collect();
    let bindings: Vec<&Type> = field_infos.iter().map(|f| &f.binding).collect();
    let names: Vec<&str> = field_infos.iter().map(|f| f.name.as_str()).collect();
    let reference_flags: Vec<bool> = field_infos
        .iter()
        .map(|f| f.kind == FieldKind::Reference)
        .collect();
    let shared: Vec<TokenStream2> = field_infos.iter().map(FieldInfo::shared_access).collect();
    let exclusive: Vec<TokenStream2> = field_infos
        .iter()
        .map(FieldInfo::exclusive_access)
        .collect();

    let binding_types: Vec<TokenStream2> = field_infos
        .iter()
        .map(|f| {
            let (ty, binding) = (&f.ty, &f.binding);
            match f.kind {
                FieldKind::Value => quote! { ::fieldwise::tuple::Value<'__fw, #ty> },
                FieldKind::Reference => quote! { ::fieldwise::tuple::Reference<'__fw, #binding> },
            }
        })
        .collect();
    let binding_types_mut: Vec<TokenStream2> = field_infos
        .iter()
        .map(|f| {
            let (ty, binding) = (&f.ty, &f.binding);
            match f.kind {
                FieldKind::Value => quote! { ::fieldwise::tuple::Value<'__fw, #ty> },
                FieldKind::Reference => {
                    quote! { ::fieldwise::tuple::ReferenceMut<'__fw, #binding> }
                }
            }
        })
        .collect();
    let binding_values: Vec<TokenStream2> = field_infos
        .iter()
        .map(|f| {
            let access = f.shared_access();
            match f.kind {
                FieldKind::Value => quote! { ::fieldwise::tuple::Value::new(#access) },
                FieldKind::Reference => quote! { ::fieldwise::tuple::Reference::new(#access) },
            }
        })
        .collect();
    let binding_values_mut: Vec<TokenStream2> = field_infos
        .iter()
        .map(|f| match f.kind {
            FieldKind::Value => {
                let access = f.shared_access();
                quote! { ::fieldwise::tuple::Value::new(#access) }
            }
            FieldKind::Reference => {
                let access = f.exclusive_access();
                quote! { ::fieldwise::tuple::ReferenceMut::new(#access) }
            }
        })
        .collect();
    let consume_calls: Vec<TokenStream2> = field_infos
        .iter()
        .zip(&locals)
        .zip(&positions)
        .map(|((f, local), position)| match f.kind {
            FieldKind::Value => quote! { consumer.consume(#position, #local)?; },
            FieldKind::Reference => quote! { consumer.consume_ref(#position, #local)?; },
        })
        .collect();

    let field_at_impls: Vec<TokenStream2> = field_infos
        .iter()
        .zip(&positions)
        .map(|(f, position)| {
            let binding = &f.binding;
            let shared = f.shared_access();
            let exclusive = f.exclusive_access();
            quote! {
                impl #impl_generics ::fieldwise::FieldAt<#position> for #name #ty_generics #where_clause {
                    type Type = #binding;

                    #[inline]
                    fn field(&self) -> &Self::Type {
                        #shared
                    }

                    #[inline]
                    fn field_mut(&mut self) -> &mut Self::Type {
                        #exclusive
                    }
                }
            }
        })
        .collect();

    let arity_lit = Literal::usize_unsuffixed(arity);
    let type_name = name.to_string();

    let expanded = quote! {
        const _: () = ::core::assert!(
            #arity_lit <= ::fieldwise::MAX_ARITY,
            ::core::concat!("unsupported record: ", #type_name, " has too many fields"),
        );

        impl #impl_generics ::fieldwise::Record for #name #ty_generics #where_clause {
            const ARITY: usize = #arity_lit;
            const REFERENCE_FIELDS: &'static [bool] = &[#(#reference_flags),*];
            const FIELD_NAMES: &'static [&'static str] = &[#(#names),*];

            type Tie<'__fw> = (#(&'__fw #bindings,)*) where Self: '__fw;
            type TieMut<'__fw> = (#(&'__fw mut #bindings,)*) where Self: '__fw;
            type Bindings<'__fw> = (#(#binding_types,)*) where Self: '__fw;
            type BindingsMut<'__fw> = (#(#binding_types_mut,)*) where Self: '__fw;
            type Fields = (#(#types,)*);

            #[inline]
            fn tie(&self) -> Self::Tie<'_> {
                (#(#shared,)*)
            }

            #[inline]
            fn tie_mut(&mut self) -> Self::TieMut<'_> {
                (#(#exclusive,)*)
            }

            #[inline]
            fn bindings(&self) -> Self::Bindings<'_> {
                (#(#binding_values,)*)
            }

            #[inline]
            fn bindings_mut(&mut self) -> Self::BindingsMut<'_> {
                (#(#binding_values_mut,)*)
            }

            #[inline]
            fn into_fields(self) -> Self::Fields {
                let Self { #(#members: #locals,)* } = self;
                (#(#locals,)*)
            }

            #[allow(clippy::match_single_binding)]
            fn field_offset(position: usize) -> ::core::option::Option<usize> {
                match position {
                    #( #positions => ::core::option::Option::Some(::core::mem::offset_of!(Self, #members)), )*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #visitable_impl_generics ::fieldwise::Visitable for #name #ty_generics #visitable_where_clause {
            #[allow(unused_variables)]
            fn for_each_field<V: ::fieldwise::Visitor>(
                &self,
                visitor: &mut V,
            ) -> ::core::result::Result<(), V::Error> {
                #( visitor.visit(#positions, #shared)?; )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn for_each_field_mut<V: ::fieldwise::VisitorMut>(
                &mut self,
                visitor: &mut V,
            ) -> ::core::result::Result<(), V::Error> {
                #( visitor.visit_mut(#positions, #exclusive)?; )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn into_each_field<V: ::fieldwise::Consumer>(
                self,
                consumer: &mut V,
            ) -> ::core::result::Result<(), V::Error> {
                let Self { #(#members: #locals,)* } = self;
                #(#consume_calls)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn for_each_field_type<V: ::fieldwise::TypeVisitor>(
                visitor: &mut V,
            ) -> ::core::result::Result<(), V::Error> {
                #( visitor.visit_type::<#bindings>(#positions)?; )*
                ::core::result::Result::Ok(())
            }
        }

        #(#field_at_impls)*
    };

    TokenStream::from(expanded)
}

/// Classify one field and compute its binding type.
fn field_info(member: Member, name: String, ty: &Type) -> FieldInfo {
    let (kind, binding) = classify(ty);
    FieldInfo {
        member,
        name,
        ty: ty.clone(),
        binding,
        kind,
    }
}

/// Only `&mut U` is a reference position. A shared `&U` accepts a copy
/// just like a value, so it stays on the value path.
fn classify(ty: &Type) -> (FieldKind, Type) {
    match strip_groups(ty) {
        Type::Reference(reference) if reference.mutability.is_some() => {
            (FieldKind::Reference, (*reference.elem).clone())
        }
        _ => (FieldKind::Value, ty.clone()),
    }
}

/// Unwrap `(T)` and invisible macro groups.
fn strip_groups(ty: &Type) -> &Type {
    match ty {
        Type::Paren(paren) => strip_groups(&paren.elem),
        Type::Group(group) => strip_groups(&group.elem),
        other => other,
    }
}
