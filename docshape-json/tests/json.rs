use std::collections::BTreeMap;
use std::io;

use docshape::{Describe, ObjectId};
use docshape_encoder::{EncodeError, Error};
use docshape_format::WriteError;
use docshape_json::{
    JsonOptions, to_json_string, to_json_string_pretty, to_json_string_with_options, to_json_writer,
};
use indoc::indoc;

#[derive(Describe)]
#[docshape(rename_all = "camelCase")]
struct Shipment {
    #[docshape(id)]
    id: ObjectId,
    tracking_code: String,
    shipped_at: jiff::Timestamp,
    carrier: Carrier,
    parcels: Vec<Parcel>,
    customs: Option<BTreeMap<String, f64>>,
}

#[derive(Describe)]
struct Parcel {
    weight: f64,
    fragile: bool,
}

#[derive(Describe)]
#[docshape(rename_all = "SCREAMING_SNAKE_CASE")]
enum Carrier {
    #[allow(dead_code)]
    LaPoste,
    Dhl,
}

fn shipment() -> Shipment {
    Shipment {
        id: "5627b47d54b92d03adb9e9cf".parse().unwrap(),
        tracking_code: "LP-001".into(),
        shipped_at: jiff::Timestamp::from_millisecond(1_700_000_000_000).unwrap(),
        carrier: Carrier::Dhl,
        parcels: vec![
            Parcel {
                weight: 1.0,
                fragile: false,
            },
            Parcel {
                weight: 0.25,
                fragile: true,
            },
        ],
        customs: None,
    }
}

#[docshape_testhelpers::test]
fn compact_rendering() {
    let json = to_json_string(&shipment()).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"_id":{"$oid":"5627b47d54b92d03adb9e9cf"},"trackingCode":"LP-001","#,
            r#""shippedAt":{"$date":1700000000000},"carrier":"DHL","#,
            r#""parcels":[{"weight":1.0,"fragile":false},{"weight":0.25,"fragile":true}],"#,
            r#""customs":null}"#
        )
    );
}

#[docshape_testhelpers::test]
fn pretty_rendering() {
    insta::assert_snapshot!(to_json_string_pretty(&shipment()).unwrap(), @r#"
    {
      "_id": {"$oid": "5627b47d54b92d03adb9e9cf"},
      "trackingCode": "LP-001",
      "shippedAt": {"$date": 1700000000000},
      "carrier": "DHL",
      "parcels": [
        {
          "weight": 1.0,
          "fragile": false
        },
        {
          "weight": 0.25,
          "fragile": true
        }
      ],
      "customs": null
    }
    "#);
}

#[docshape_testhelpers::test]
fn custom_indentation() {
    let mut value = shipment();
    value.parcels.clear();
    value.customs = Some(BTreeMap::from([("duty".to_owned(), 3.5)]));
    let json = to_json_string_with_options(&value, JsonOptions::new().indent("\t")).unwrap();
    assert_eq!(
        json,
        indoc! {r#"
            {
            	"_id": {"$oid": "5627b47d54b92d03adb9e9cf"},
            	"trackingCode": "LP-001",
            	"shippedAt": {"$date": 1700000000000},
            	"carrier": "DHL",
            	"parcels": [],
            	"customs": {
            		"duty": 3.5
            	}
            }"#}
    );
}

#[docshape_testhelpers::test]
fn sink_failures_are_reported() {
    #[derive(Debug)]
    struct Full;

    impl io::Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let err = to_json_writer(Full, &shipment()).unwrap_err();
    match err {
        Error::Encode(EncodeError::Write(WriteError::Io(io))) => {
            assert_eq!(io.kind(), io::ErrorKind::StorageFull);
        }
        other => panic!("unexpected error: {other}"),
    }
}
