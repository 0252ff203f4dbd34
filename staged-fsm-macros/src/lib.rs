// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2026 staged-fsm Contributors

//! Proc-macro helpers for `staged-fsm`.
//!
//! This crate is an implementation detail of `staged-fsm`. End users should depend on
//! `staged-fsm` and use the re-exported derive from that crate:
//! - `#[derive(staged_fsm::StateId)]`

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derive `::staged_fsm::StateId` for a fieldless enum.
///
/// The generated `name()` returns the variant identifier as a `&'static str` and `all()`
/// lists every variant in declaration order. State identifiers form a closed set of plain
/// symbols, so variants carrying data are rejected.
#[proc_macro_derive(StateId)]
pub fn derive_state_id(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_ident = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data_enum = match input.data {
        syn::Data::Enum(e) => e,
        _ => {
            return syn::Error::new_spanned(enum_ident, "StateId can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if data_enum.variants.is_empty() {
        return syn::Error::new_spanned(enum_ident, "StateId requires at least one variant")
            .to_compile_error()
            .into();
    }

    if let Some(variant) = data_enum
        .variants
        .iter()
        .find(|variant| !matches!(variant.fields, syn::Fields::Unit))
    {
        return syn::Error::new_spanned(
            &variant.ident,
            "StateId variants must not carry data",
        )
        .to_compile_error()
        .into();
    }

    let idents: Vec<_> = data_enum.variants.iter().map(|v| &v.ident).collect();

    let expanded = quote! {
        impl #impl_generics ::staged_fsm::StateId for #enum_ident #ty_generics #where_clause {
            fn name(&self) -> &str {
                match self {
                    #( Self::#idents => stringify!(#idents), )*
                }
            }

            fn all() -> ::std::vec::Vec<Self> {
                ::std::vec![ #( Self::#idents ),* ]
            }
        }
    };

    TokenStream::from(expanded)
}
