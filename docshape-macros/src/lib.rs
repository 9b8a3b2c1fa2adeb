//! `#[derive(Describe)]` for docshape.
//!
//! Accepts non-generic structs with named fields and enums whose variants
//! carry no data. Recognised attributes:
//!
//! - `#[docshape(id)]` on one field marks the entity identifier
//! - `#[docshape(rename = "..")]` on a field or variant sets its wire name
//! - `#[docshape(rename_all = "..")]` on the type converts every field or
//!   variant name that has no explicit rename
//!
//! Doc comments are kept on the generated shapes.

mod emit;
mod parse;
mod rename_rule;
mod unescape;

use proc_macro2::TokenStream;

/// Derives `docshape::Describe`.
#[proc_macro_derive(Describe, attributes(docshape))]
pub fn describe(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    derive_describe(input.into()).into()
}

fn derive_describe(input: TokenStream) -> TokenStream {
    match parse::parse_container(input) {
        Ok(container) => emit::emit(&container),
        Err(err) => err.to_compile_error(),
    }
}
