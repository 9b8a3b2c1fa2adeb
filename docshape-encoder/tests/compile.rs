use std::collections::{BTreeMap, HashMap};

use docshape::Describe;
use docshape_encoder::{BuildError, EncoderRegistry, Error, ShapeSignature, to_document};
use docshape_format::Bson;

#[derive(Describe)]
#[allow(dead_code)]
struct Customer {
    #[docshape(id)]
    id: i64,
    home: Address,
    work: Option<Address>,
    previous: Vec<Address>,
    shipping: Option<Vec<Address>>,
    by_label: BTreeMap<String, Address>,
    by_code: HashMap<String, Address>,
    archive: Option<BTreeMap<String, Address>>,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Address {
    street: String,
    city: String,
}

#[docshape_testhelpers::test]
fn shared_shapes_get_one_routine() {
    let registry = EncoderRegistry::new();
    let unit = registry.get_or_build(Customer::SHAPE).unwrap();

    assert_eq!(unit.routine_count(), 4);
    assert!(
        unit.routine_for(ShapeSignature::Entity(Address::SHAPE))
            .is_some()
    );
    let list = unit
        .routine_for(ShapeSignature::ListOf(Address::SHAPE))
        .unwrap();
    assert_eq!(list.name(), "encode_list_address_2");

    // ordered, hashed and optional maps of the same value share a routine
    let maps: Vec<_> = unit
        .routines()
        .iter()
        .filter(|r| matches!(r.signature(), ShapeSignature::MapOf(_)))
        .collect();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].name(), "encode_map_address_3");
    assert_eq!(maps[0].signature(), ShapeSignature::MapOf(Address::SHAPE));
    assert_eq!(
        unit.routine("encode_address_1").map(|r| r.signature()),
        Some(ShapeSignature::Entity(Address::SHAPE))
    );

    // a second request reuses the unit
    let again = registry.get_or_build(Customer::SHAPE).unwrap();
    assert!(std::sync::Arc::ptr_eq(&unit, &again));
    assert_eq!(registry.builds(), 1);
}

#[derive(Describe)]
struct Node {
    #[docshape(id)]
    name: String,
    children: Vec<Node>,
}

#[docshape_testhelpers::test]
fn self_referencing_entities_terminate() {
    let unit = EncoderRegistry::new().get_or_build(Node::SHAPE).unwrap();
    assert_eq!(unit.routine_count(), 2);

    let tree = Node {
        name: "root".into(),
        children: vec![Node {
            name: "leaf".into(),
            children: vec![],
        }],
    };
    let doc = to_document(&tree).unwrap();
    let children = doc.get("children").and_then(Bson::as_array).unwrap();
    assert_eq!(children.len(), 1);
    let leaf = children[0].as_document().unwrap();
    assert_eq!(leaf.get("_id").and_then(Bson::as_str), Some("leaf"));
    assert_eq!(leaf.get("children"), Some(&Bson::Array(vec![])));
}

#[derive(Describe)]
#[allow(dead_code)]
struct Order {
    #[docshape(id)]
    id: i64,
    total: f64,
    items: Vec<Item>,
    status: Status,
    notes: Option<BTreeMap<String, String>>,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Item {
    sku: String,
    qty: i32,
}

#[derive(Describe)]
#[allow(dead_code)]
enum Status {
    #[docshape(rename = "P")]
    Pending,
    #[docshape(rename = "S")]
    Shipped,
    Cancelled,
}

#[docshape_testhelpers::test]
fn listing_shows_every_routine_and_codec() {
    let unit = EncoderRegistry::new().get_or_build(Order::SHAPE).unwrap();
    insta::assert_snapshot!(unit.listing(), @r#"
    routine encode_order_0 (Entity(Order))
      _id: int64
      total: double
      items: list encode_list_item_1
      status: enum enum_codec_status_3
      notes: null or map encode_map_string_4
    routine encode_list_item_1 (ListOf(Item))
      []: call encode_item_2
    routine encode_item_2 (Entity(Item))
      sku: string
      qty: int32
    routine encode_map_string_4 (MapOf(String, String))
      {}: string
    codec enum_codec_status_3 (Status)
      Pending => "P"
      Shipped => "S"
      Cancelled => "Cancelled"
    "#);
}

#[derive(Describe)]
struct Inventory {
    #[docshape(id)]
    id: i32,
    stock: BTreeMap<i32, i32>,
}

#[docshape_testhelpers::test]
fn non_string_map_keys_fail_the_build() {
    let registry = EncoderRegistry::new();
    let err = registry.get_or_build(Inventory::SHAPE).unwrap_err();
    assert_eq!(
        err,
        BuildError::NonStringMapKey {
            path: "Inventory.stock".into(),
            key: i32::SHAPE,
        }
    );
    assert_eq!(
        err.to_string(),
        "map at `Inventory.stock` has keys of type `i32`, but map keys must be strings"
    );
    assert_eq!(registry.builds(), 0);

    let inventory = Inventory {
        id: 1,
        stock: BTreeMap::new(),
    };
    assert!(matches!(
        to_document(&inventory),
        Err(Error::Build(BuildError::NonStringMapKey { .. }))
    ));
}

#[derive(Describe)]
#[allow(dead_code)]
struct Ledger {
    #[docshape(id)]
    id: i32,
    lines: Vec<Line>,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Line {
    #[docshape(id)]
    first: i32,
    #[docshape(id)]
    second: i32,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Counter {
    #[docshape(id)]
    id: i32,
    hits: u64,
}

#[docshape_testhelpers::test]
fn schema_errors_name_their_source() {
    let registry = EncoderRegistry::new();

    let err = registry.get_or_build(Ledger::SHAPE).unwrap_err();
    assert_eq!(
        err.to_string(),
        "`Line` marks both `first` and `second` as identifier"
    );

    let err = registry.get_or_build(Counter::SHAPE).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported type `u64` at `Counter.hits`: the type has no document representation"
    );
}
