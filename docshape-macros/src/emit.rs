use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, quote_spanned};

use crate::parse::{Body, Container, Error, NamedField, UnitVariant};

impl Error {
    pub(crate) fn to_compile_error(&self) -> TokenStream {
        let message = &self.message;
        quote_spanned! { self.span => ::core::compile_error!(#message); }
    }
}

fn doc_call(doc: &[String]) -> TokenStream {
    if doc.is_empty() {
        quote! {}
    } else {
        quote! { .doc(&[#(#doc),*]) }
    }
}

/// Wire name for a field or variant: explicit rename, then `rename_all`, then
/// nothing (the Rust name is used as is).
fn wire_rename(
    explicit: Option<&String>,
    name: &str,
    container: &Container,
) -> Option<String> {
    explicit.cloned().or_else(|| {
        container
            .rename_all
            .map(|rule| rule.apply(name))
            .filter(|renamed| renamed != name)
    })
}

fn emit_field(field: &NamedField, container: &Container) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = field.name();
    let rename = wire_rename(field.rename.as_ref(), &name, container)
        .map(|rename| quote! { .rename(#rename) });
    let flags = field
        .id
        .then(|| quote! { .flags(::docshape::FieldFlags::IDENTIFIER) });
    let doc = doc_call(&field.doc);

    quote! {
        ::docshape::Field::new(
            #name,
            || <#ty as ::docshape::Describe>::SHAPE,
            |owner| {
                let value: &dyn ::core::any::Any = &::docshape::peek::<Self>(owner)?.#ident;
                ::core::result::Result::Ok(value)
            },
        )
        #rename
        #flags
        #doc
    }
}

fn emit_variant(variant: &UnitVariant, container: &Container) -> TokenStream {
    let name = variant.name();
    let rename = wire_rename(variant.rename.as_ref(), &name, container)
        .map(|rename| quote! { .rename(#rename) });
    let doc = doc_call(&variant.doc);
    quote! {
        ::docshape::Variant::new(#name) #rename #doc
    }
}

fn emit_def(container: &Container) -> TokenStream {
    match &container.body {
        Body::Struct(fields) => {
            let fields = fields.iter().map(|field| emit_field(field, container));
            quote! {
                ::docshape::Def::Struct(::docshape::StructDef::new(&const { [#(#fields),*] }))
            }
        }
        Body::Enum(variants) => {
            let descriptors = variants
                .iter()
                .map(|variant| emit_variant(variant, container));
            let idents: Vec<&Ident> = variants.iter().map(|variant| &variant.ident).collect();
            let indices = 0..variants.len();
            let value = format_ident!("value");
            // an uninhabited enum never reaches `Ok`
            let index = if variants.is_empty() {
                quote! { match *::docshape::peek::<Self>(#value)? {} }
            } else {
                quote! {
                    ::core::result::Result::Ok(match ::docshape::peek::<Self>(#value)? {
                        #(Self::#idents => #indices,)*
                    })
                }
            };
            quote! {
                ::docshape::Def::Enum(::docshape::EnumDef::new(
                    &const { [#(#descriptors),*] },
                    |#value| #index,
                ))
            }
        }
    }
}

/// Emits the `Describe` impl for a parsed container.
pub(crate) fn emit(container: &Container) -> TokenStream {
    let name = &container.name;
    let name_str = name.to_string();
    let def = emit_def(container);
    let doc = doc_call(&container.doc);

    quote! {
        #[automatically_derived]
        impl ::docshape::Describe for #name {
            const SHAPE: &'static ::docshape::Shape = &const {
                ::docshape::Shape::builder::<Self>(#name_str)
                    .def(#def)
                    #doc
                    .build()
            };
        }
    }
}
