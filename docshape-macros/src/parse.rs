//! Grammar for the subset of item syntax the derive accepts.
//!
//! The item is parsed permissively first; anything the derive cannot describe
//! (generics, tuple and unit structs, data-carrying variants) is reported
//! afterwards with a dedicated message.

use proc_macro2::{Delimiter, Group, Ident, Span, TokenStream, TokenTree};
use unsynn::*;

use crate::rename_rule::RenameRule;
use crate::unescape::unescape;

keyword! {
    KPub = "pub";
    KWhere = "where";
    KDoc = "doc";
    KDocshape = "docshape";
}

operator! {
    Equals = "=";
    LAngle = "<";
    RAngle = ">";
    RArrow = "->";
}

unsynn! {
    /// `pub`, `pub(crate)`, `pub(in path)`
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// `#[...]`
    struct Attribute {
        _pound: Pound,
        body: BracketGroupContaining<AttributeInner>,
    }

    enum AttributeInner {
        Docshape(DocshapeAttr),
        Doc(DocAttr),
        Other(Vec<TokenTree>),
    }

    /// Arguments are parsed separately so malformed ones can be reported.
    struct DocshapeAttr {
        keyword: KDocshape,
        rest: Vec<TokenTree>,
    }

    struct DocAttr {
        _doc: KDoc,
        _eq: Equals,
        value: LiteralString,
    }

    struct DocshapeArgs {
        args: ParenthesisGroupContaining<CommaDelimitedVec<DocshapeArg>>,
        _end: EndOfStream,
    }

    /// `id`, `rename = ".."`, `rename_all = ".."`
    struct DocshapeArg {
        key: Ident,
        value: Option<ArgValue>,
    }

    struct ArgValue {
        _eq: Equals,
        literal: LiteralString,
    }

    /// A token tree where `<..>` pairs, and `->`, count as one unit, so commas
    /// inside generic arguments do not end a field type.
    enum AngleTokenTree {
        Arrow(RArrow),
        Angled(AngleBracketed),
        Token(TokenTree),
    }

    struct AngleBracketed {
        _open: LAngle,
        inner: Vec<Cons<Except<RAngle>, AngleTokenTree>>,
        _close: RAngle,
    }

    struct Item {
        attributes: Vec<Attribute>,
        _vis: Option<Vis>,
        keyword: Ident,
        name: Ident,
        body: ItemBody,
        _rest: Vec<TokenTree>,
    }

    enum ItemBody {
        Named(BraceGroup),
        Tuple(ParenthesisGroup),
        Generic(LAngle),
        Where(KWhere),
        Unit(Semicolon),
    }

    struct FieldList {
        fields: CommaDelimitedVec<FieldDecl>,
        _end: EndOfStream,
    }

    struct FieldDecl {
        attributes: Vec<Attribute>,
        _vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        ty: Any<Cons<Except<Comma>, AngleTokenTree>>,
    }

    struct VariantList {
        variants: CommaDelimitedVec<VariantDecl>,
        _end: EndOfStream,
    }

    struct VariantDecl {
        attributes: Vec<Attribute>,
        name: Ident,
        data: Option<VariantData>,
        _discriminant: Option<Discriminant>,
    }

    enum VariantData {
        Tuple(ParenthesisGroup),
        Struct(BraceGroup),
    }

    /// `= expr`; the expression runs to the next top-level comma.
    struct Discriminant {
        _eq: Equals,
        _expr: Any<Cons<Except<Comma>, TokenTree>>,
    }
}

/// A parse failure, reported as `compile_error!` at `span`.
#[derive(Debug)]
pub(crate) struct Error {
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl Error {
    fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

pub(crate) type Result<T> = core::result::Result<T, Error>;

pub(crate) struct Container {
    pub(crate) name: Ident,
    pub(crate) doc: Vec<String>,
    pub(crate) rename_all: Option<RenameRule>,
    pub(crate) body: Body,
}

pub(crate) enum Body {
    Struct(Vec<NamedField>),
    Enum(Vec<UnitVariant>),
}

pub(crate) struct NamedField {
    pub(crate) ident: Ident,
    pub(crate) ty: TokenStream,
    pub(crate) doc: Vec<String>,
    pub(crate) rename: Option<String>,
    pub(crate) id: bool,
}

impl NamedField {
    /// Rust name without a raw-identifier prefix.
    pub(crate) fn name(&self) -> String {
        unraw(&self.ident)
    }
}

pub(crate) struct UnitVariant {
    pub(crate) ident: Ident,
    pub(crate) doc: Vec<String>,
    pub(crate) rename: Option<String>,
}

impl UnitVariant {
    pub(crate) fn name(&self) -> String {
        unraw(&self.ident)
    }
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Span of the first token of a parsed node.
fn span_of(node: &impl ToTokens) -> Span {
    node.to_token_stream()
        .into_iter()
        .next()
        .map_or_else(Span::call_site, |tt| tt.span())
}

/// Removes `Delimiter::None` groups, which `macro_rules!` wraps around
/// interpolated fragments such as `$vis:vis`.
pub(crate) fn flatten_transparent_groups(input: TokenStream) -> TokenStream {
    input
        .into_iter()
        .flat_map(|tt| match tt {
            TokenTree::Group(group) if group.delimiter() == Delimiter::None => {
                flatten_transparent_groups(group.stream())
            }
            TokenTree::Group(group) => {
                let mut new_group =
                    Group::new(group.delimiter(), flatten_transparent_groups(group.stream()));
                new_group.set_span(group.span());
                core::iter::once(TokenTree::Group(new_group)).collect()
            }
            other => core::iter::once(other).collect(),
        })
        .collect()
}

/// Contents of a string literal, escapes resolved.
fn string_value(literal: &LiteralString, span: Span) -> Result<String> {
    let repr = literal.value().to_string();
    if let Some(body) = repr.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return unescape(body)
            .map_err(|err| Error::new(span, format!("invalid string literal: {err}")));
    }
    if let Some(raw) = repr.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let quoted = &raw[hashes..raw.len() - hashes];
        return Ok(quoted.trim_matches('"').to_string());
    }
    unescape(&repr).map_err(|err| Error::new(span, format!("invalid string literal: {err}")))
}

/// Attributes collected from `#[doc = ".."]` and `#[docshape(..)]`.
#[derive(Default)]
struct Attrs {
    doc: Vec<String>,
    id: Option<Span>,
    rename: Option<(String, Span)>,
    rename_all: Option<(RenameRule, Span)>,
}

fn parse_attrs(attributes: &[Attribute]) -> Result<Attrs> {
    let mut attrs = Attrs::default();
    for attribute in attributes {
        match &attribute.body.content {
            AttributeInner::Doc(doc) => {
                attrs.doc.push(string_value(&doc.value, span_of(attribute))?);
            }
            AttributeInner::Docshape(docshape) => parse_docshape_args(docshape, &mut attrs)?,
            AttributeInner::Other(_) => {}
        }
    }
    Ok(attrs)
}

fn parse_docshape_args(attr: &DocshapeAttr, attrs: &mut Attrs) -> Result<()> {
    let rest: TokenStream = attr.rest.iter().cloned().collect();
    let mut iter = rest.to_token_iter();
    let parsed = iter.parse::<DocshapeArgs>().map_err(|_| {
        Error::new(
            span_of(&attr.keyword),
            "expected `#[docshape(...)]` with comma-separated `id`, `rename = \"..\"` or `rename_all = \"..\"`",
        )
    })?;

    for arg in parsed.args.content.iter().map(|d| &d.value) {
        let key = &arg.key;
        if key == "id" {
            if let Some(value) = &arg.value {
                return Err(Error::new(span_of(value), "`id` takes no value"));
            }
            attrs.id = Some(key.span());
        } else if key == "rename" || key == "rename_all" {
            let Some(value) = &arg.value else {
                return Err(Error::new(
                    key.span(),
                    format!("expected `{key} = \"..\"`"),
                ));
            };
            let span = span_of(&value.literal);
            let text = string_value(&value.literal, span)?;
            if key == "rename" {
                attrs.rename = Some((text, span));
            } else {
                let rule = RenameRule::parse(&text).ok_or_else(|| {
                    Error::new(
                        span,
                        format!(
                            "unknown rename_all rule `{text}`, expected one of: {}",
                            RenameRule::ACCEPTED
                        ),
                    )
                })?;
                attrs.rename_all = Some((rule, span));
            }
        } else {
            return Err(Error::new(
                key.span(),
                format!("unknown docshape attribute `{key}`, expected `id`, `rename` or `rename_all`"),
            ));
        }
    }
    Ok(())
}

fn convert_field(decl: &FieldDecl) -> Result<NamedField> {
    let attrs = parse_attrs(&decl.attributes)?;
    if let Some((_, span)) = attrs.rename_all {
        return Err(Error::new(span, "`rename_all` is only valid on the type"));
    }
    let ty = decl.ty.to_token_stream();
    if ty.is_empty() {
        return Err(Error::new(decl.name.span(), "expected a field type"));
    }
    Ok(NamedField {
        ident: decl.name.clone(),
        ty,
        doc: attrs.doc,
        rename: attrs.rename.map(|(name, _)| name),
        id: attrs.id.is_some(),
    })
}

fn convert_variant(decl: &VariantDecl) -> Result<UnitVariant> {
    let attrs = parse_attrs(&decl.attributes)?;
    if let Some(span) = attrs.id {
        return Err(Error::new(span, "`id` is only valid on struct fields"));
    }
    if let Some((_, span)) = attrs.rename_all {
        return Err(Error::new(span, "`rename_all` is only valid on the type"));
    }
    if let Some(data) = &decl.data {
        return Err(Error::new(
            span_of(data),
            format!(
                "variant `{}` carries data; only unit variants can be described",
                decl.name
            ),
        ));
    }
    Ok(UnitVariant {
        ident: decl.name.clone(),
        doc: attrs.doc,
        rename: attrs.rename.map(|(name, _)| name),
    })
}

fn parse_fields(group: &BraceGroup) -> Result<Vec<NamedField>> {
    let stream = group.0.stream();
    let mut iter = stream.to_token_iter();
    let list = iter
        .parse::<FieldList>()
        .map_err(|err| Error::new(group.0.span(), format!("could not parse fields: {err}")))?;
    list.fields
        .iter()
        .map(|d| convert_field(&d.value))
        .collect()
}

fn parse_variants(group: &BraceGroup) -> Result<Vec<UnitVariant>> {
    let stream = group.0.stream();
    let mut iter = stream.to_token_iter();
    let list = iter
        .parse::<VariantList>()
        .map_err(|err| Error::new(group.0.span(), format!("could not parse variants: {err}")))?;
    list.variants
        .iter()
        .map(|d| convert_variant(&d.value))
        .collect()
}

/// Parses a `struct` or `enum` item.
pub(crate) fn parse_container(input: TokenStream) -> Result<Container> {
    let input = flatten_transparent_groups(input);
    let mut iter = input.to_token_iter();
    let item = iter.parse::<Item>().map_err(|err| {
        Error::new(
            Span::call_site(),
            format!("`Describe` can only be derived for structs and enums: {err}"),
        )
    })?;

    let attrs = parse_attrs(&item.attributes)?;
    if let Some(span) = attrs.id {
        return Err(Error::new(span, "`id` is only valid on struct fields"));
    }
    if let Some((_, span)) = attrs.rename {
        return Err(Error::new(
            span,
            "`rename` is only valid on fields and variants",
        ));
    }

    let is_struct = if item.keyword == "struct" {
        true
    } else if item.keyword == "enum" {
        false
    } else {
        return Err(Error::new(
            item.keyword.span(),
            "`Describe` can only be derived for structs and enums",
        ));
    };

    let name = &item.name;
    let body = match &item.body {
        ItemBody::Generic(_) | ItemBody::Where(_) => {
            return Err(Error::new(
                span_of(&item.body),
                format!("`{name}` is generic; `Describe` can only be derived for non-generic types"),
            ));
        }
        ItemBody::Named(group) if is_struct => Body::Struct(parse_fields(group)?),
        ItemBody::Named(group) => Body::Enum(parse_variants(group)?),
        ItemBody::Tuple(group) if is_struct => {
            return Err(Error::new(
                group.0.span(),
                format!("`{name}` is a tuple struct; only structs with named fields can be described"),
            ));
        }
        ItemBody::Unit(semi) if is_struct => {
            return Err(Error::new(
                span_of(semi),
                format!("`{name}` is a unit struct; only structs with named fields can be described"),
            ));
        }
        other => return Err(Error::new(span_of(other), "expected enum variants")),
    };

    Ok(Container {
        name: name.clone(),
        doc: attrs.doc,
        rename_all: attrs.rename_all.map(|(rule, _)| rule),
        body,
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn parse(input: TokenStream) -> Container {
        match parse_container(input) {
            Ok(container) => container,
            Err(err) => panic!("unexpected parse error: {}", err.message),
        }
    }

    fn parse_err(input: TokenStream) -> String {
        match parse_container(input) {
            Ok(_) => panic!("expected a parse error"),
            Err(err) => err.message,
        }
    }

    fn field_names(container: Container) -> Vec<String> {
        let Body::Struct(fields) = container.body else {
            panic!("expected a struct");
        };
        fields.iter().map(NamedField::name).collect()
    }

    fn variant_names(container: Container) -> Vec<String> {
        let Body::Enum(variants) = container.body else {
            panic!("expected an enum");
        };
        variants.iter().map(UnitVariant::name).collect()
    }

    #[test]
    fn reads_fields_with_generic_types() {
        let container = parse(quote! {
            /// An order.
            #[derive(Debug)]
            pub struct Order {
                #[docshape(id)]
                pub id: ObjectId,
                pub(crate) totals: HashMap<String, Vec<Vec<f64>>>,
                #[docshape(rename = "cb")]
                callback: Option<Box<dyn Fn(u8) -> u8>>,
                hooks: HashMap<Box<dyn Fn() -> u8>, i32>,
                last: [u8; 1 << 2],
            }
        });
        assert_eq!(container.name, "Order");
        assert_eq!(container.doc, [" An order."]);
        let Body::Struct(fields) = container.body else {
            panic!("expected a struct");
        };
        let names: Vec<String> = fields.iter().map(NamedField::name).collect();
        assert_eq!(names, ["id", "totals", "callback", "hooks", "last"]);
        assert!(fields[0].id);
        assert!(!fields[1].id);
        assert_eq!(fields[2].rename.as_deref(), Some("cb"));
    }

    #[test]
    fn reads_unit_variants() {
        let container = parse(quote! {
            #[docshape(rename_all = "snake_case")]
            enum Status {
                #[docshape(rename = "P")]
                Pending,
                OnHold = 4,
                r#Done,
            }
        });
        assert_eq!(container.rename_all, Some(RenameRule::SnakeCase));
        let Body::Enum(variants) = &container.body else {
            panic!("expected an enum");
        };
        assert_eq!(variants[0].rename.as_deref(), Some("P"));
        assert_eq!(variant_names(container), ["Pending", "OnHold", "Done"]);
    }

    #[test]
    fn discriminants_with_shifts_keep_every_variant() {
        let container = parse(quote! {
            enum Flag {
                A = 1 << 0,
                B = 1 << 1,
                C = 4,
            }
        });
        assert_eq!(variant_names(container), ["A", "B", "C"]);

        let container = parse(quote! {
            enum Mask { Low = (1 << 4) - 1, High = 0xf0 }
        });
        assert_eq!(variant_names(container), ["Low", "High"]);
    }

    #[test]
    fn empty_bodies() {
        assert!(field_names(parse(quote! { struct Nothing {} })).is_empty());
        assert!(variant_names(parse(quote! { enum Never {} })).is_empty());
    }

    #[test]
    fn unescapes_attribute_strings() {
        let container = parse(quote! {
            struct S {
                #[docshape(rename = "a\"b")]
                #[doc = "tab\there"]
                x: i32,
            }
        });
        let Body::Struct(fields) = container.body else {
            panic!("expected a struct");
        };
        assert_eq!(fields[0].rename.as_deref(), Some("a\"b"));
        assert_eq!(fields[0].doc, ["tab\there"]);
    }

    #[test]
    fn rejects_unsupported_items() {
        assert!(parse_err(quote! { struct Wrapper<T> { inner: T } }).contains("generic"));
        assert!(parse_err(quote! { struct Pair(i32, i32); }).contains("tuple struct"));
        assert!(parse_err(quote! { struct Marker; }).contains("unit struct"));
        assert!(parse_err(quote! { enum Shape { Circle(f64) } }).contains("carries data"));
        assert!(parse_err(quote! { enum Shape { Square { side: f64 } } }).contains("carries data"));
        assert!(parse_err(quote! { union U { a: u8 } }).contains("structs and enums"));
    }

    #[test]
    fn rejects_unknown_attributes() {
        let message = parse_err(quote! {
            struct S {
                #[docshape(skip)]
                x: i32,
            }
        });
        assert!(message.contains("unknown docshape attribute `skip`"));

        let message = parse_err(quote! {
            #[docshape(rename_all = "Train-Case")]
            struct S { x: i32 }
        });
        assert!(message.contains("unknown rename_all rule"));

        let message = parse_err(quote! {
            struct S {
                #[docshape = "x"]
                x: i32,
            }
        });
        assert!(message.contains("expected `#[docshape(...)]`"));

        let message = parse_err(quote! {
            struct S {
                #[docshape(rename)]
                x: i32,
            }
        });
        assert!(message.contains("expected `rename = \"..\"`"));
    }
}
