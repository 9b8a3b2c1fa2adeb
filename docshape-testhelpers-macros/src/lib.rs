//! The `#[docshape_testhelpers::test]` attribute.

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    /// Attributes, visibility and qualifiers in front of `fn`.
    struct UntilFn {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    /// Generics, parameters and return type.
    struct UntilBody {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct FunctionDecl {
        until_fn: UntilFn,
        _fn: KFn,
        name: Ident,
        until_body: UntilBody,
        body: BraceGroup,
        _end: EndOfStream,
    }
}

/// Test attribute that installs tracing and backtrace output before running
/// the test.
///
/// ```ignore
/// #[docshape_testhelpers::test]
/// fn builds_order_encoder() {
///     // tracing is set up
/// }
/// ```
///
/// Another harness attribute can be named as argument, e.g.
/// `#[docshape_testhelpers::test(tokio::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = TokenStream::from(attr);
    let item = TokenStream::from(item);

    let mut iter = item.to_token_iter();
    let FunctionDecl {
        until_fn,
        name,
        until_body,
        body,
        ..
    } = match iter.parse::<FunctionDecl>() {
        Ok(decl) => decl,
        Err(err) => {
            let message =
                format!("`#[docshape_testhelpers::test]` expects a function with a body: {err}");
            return quote::quote! { ::core::compile_error!(#message); }.into();
        }
    };

    let test_attr = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        quote::quote! { #[#attr] }
    };
    let until_fn = until_fn.to_token_stream();
    let until_body = until_body.to_token_stream();
    let body = body.0.stream();

    quote::quote! {
        #test_attr
        #until_fn fn #name #until_body {
            ::docshape_testhelpers::setup();

            #body
        }
    }
    .into()
}
