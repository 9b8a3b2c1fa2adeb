#![deny(unreachable_code)]

use std::collections::BTreeMap;

use docshape::{Def, Describe, FieldFlags, ObjectId, ScalarType, Shape, StructDef};

/// A customer order.
#[derive(Describe)]
#[allow(dead_code)]
struct Order {
    #[docshape(id)]
    id: ObjectId,
    /// Sum of all item prices.
    total: f64,
    items: Vec<Item>,
    notes: Option<BTreeMap<String, String>>,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Item {
    sku: String,
    qty: i32,
}

#[derive(Describe, Debug, Clone, Copy, PartialEq)]
#[docshape(rename_all = "SCREAMING_SNAKE_CASE")]
enum Status {
    #[docshape(rename = "P")]
    Pending,
    OnHold,
    Shipped = 10,
}

#[derive(Describe)]
#[allow(dead_code)]
struct Category {
    name: String,
    children: Vec<Category>,
    parent: Option<Box<Self>>,
}

#[derive(Describe)]
#[docshape(rename_all = "camelCase")]
#[allow(dead_code)]
struct Audit {
    created_at: jiff::Timestamp,
    #[docshape(rename = "by")]
    created_by: String,
    r#type: Status,
}

#[derive(Describe)]
enum Never {}

#[derive(Describe, Clone, Copy)]
#[docshape(rename_all = "lowercase")]
enum Permission {
    Read = 1 << 0,
    Write = 1 << 1,
    Admin = 1 << 7,
}

fn struct_def(shape: &'static Shape) -> StructDef {
    match shape.def {
        Def::Struct(struct_def) => struct_def,
        other => panic!("{shape} is not a struct: {other:?}"),
    }
}

#[docshape_testhelpers::test]
fn fields_keep_declaration_order() {
    let order = struct_def(Order::SHAPE);
    let names: Vec<_> = order.fields.iter().map(|f| f.wire_name()).collect();
    assert_eq!(names, ["_id", "total", "items", "notes"]);

    assert_eq!(order.fields[0].flags, FieldFlags::IDENTIFIER);
    assert_eq!(order.fields[1].doc, [" Sum of all item prices."]);
    assert_eq!(order.fields[2].shape(), Vec::<Item>::SHAPE);
    assert_eq!(Order::SHAPE.doc, [" A customer order."]);
    assert_eq!(Order::SHAPE.to_string(), "Order");
}

#[docshape_testhelpers::test]
fn field_accessors_reach_values() {
    let item = Item {
        sku: "A1".into(),
        qty: 2,
    };
    let fields = struct_def(Item::SHAPE).fields;

    let sku = (fields[0].get)(&item).unwrap();
    assert_eq!(sku.downcast_ref::<String>().unwrap(), "A1");
    let qty = (fields[1].get)(&item).unwrap();
    assert_eq!(qty.downcast_ref::<i32>(), Some(&2));

    let err = (fields[0].get)(&42_u8).unwrap_err();
    assert_eq!(err.expected, Item::SHAPE);
}

#[docshape_testhelpers::test]
fn enum_variants_carry_wire_codes() {
    let Def::Enum(status) = Status::SHAPE.def else {
        panic!("Status should be an enum");
    };
    let codes: Vec<_> = status.variants.iter().map(|v| v.wire_code()).collect();
    assert_eq!(codes, ["P", "ON_HOLD", "SHIPPED"]);

    assert_eq!((status.variant_index)(&Status::Pending).unwrap(), 0);
    assert_eq!((status.variant_index)(&Status::Shipped).unwrap(), 2);
    assert!((status.variant_index)(&"Shipped").is_err());
}

#[docshape_testhelpers::test]
fn self_referential_types_describe_lazily() {
    let category = struct_def(Category::SHAPE);
    let Def::List(children) = category.fields[1].shape().def else {
        panic!("children should be a list");
    };
    assert_eq!(children.t, Category::SHAPE);

    let Def::Option(parent) = category.fields[2].shape().def else {
        panic!("parent should be an option");
    };
    let Def::Pointer(boxed) = parent.t.def else {
        panic!("parent should be boxed");
    };
    assert_eq!(boxed.pointee, Category::SHAPE);
}

#[docshape_testhelpers::test]
fn rename_all_and_raw_identifiers() {
    let audit = struct_def(Audit::SHAPE);
    let names: Vec<_> = audit.fields.iter().map(|f| f.wire_name()).collect();
    assert_eq!(names, ["createdAt", "by", "type"]);
    assert_eq!(
        audit.fields[0].shape().scalar_type(),
        Some(ScalarType::Timestamp)
    );
}

#[docshape_testhelpers::test]
fn empty_enums_have_no_variants() {
    let Def::Enum(never) = Never::SHAPE.def else {
        panic!("Never should be an enum");
    };
    assert!(never.variants.is_empty());
}

#[docshape_testhelpers::test]
fn shifted_discriminants_keep_every_variant() {
    let Def::Enum(permission) = Permission::SHAPE.def else {
        panic!("Permission should be an enum");
    };
    let codes: Vec<_> = permission.variants.iter().map(|v| v.wire_code()).collect();
    assert_eq!(codes, ["read", "write", "admin"]);
    assert_eq!((permission.variant_index)(&Permission::Admin).unwrap(), 2);
    assert_eq!(Permission::Write as u8, 2);
}
