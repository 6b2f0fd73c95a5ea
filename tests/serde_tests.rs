//! Tests for the serde boundary of tagged values.
//!
//! Decoded values have no compile-time exhaustiveness; an unknown variant
//! surfaces as `UnionError::InvalidTag` when dispatched.

#![cfg(all(feature = "serde", feature = "tagged"))]

use deferral::tagged::{MatchTable, TaggedValue, UnionError};
use rstest::rstest;
use serde_json::json;

fn shape_table() -> MatchTable<'static, Vec<f64>, f64> {
    MatchTable::new("Shape")
        .on("Circle", |dimensions| std::f64::consts::PI * dimensions[0] * dimensions[0])
        .on("Rectangle", |dimensions| dimensions[0] * dimensions[1])
}

#[rstest]
fn tagged_value_serializes_type_tag_and_payload() {
    let value = TaggedValue::variant("Shape", "Rectangle", vec![2.0, 3.0]);
    let encoded = serde_json::to_value(&value).unwrap();

    assert_eq!(
        encoded,
        json!({ "type": "Shape", "tag": "Rectangle", "payload": [2.0, 3.0] })
    );
}

#[rstest]
fn record_value_omits_tag() {
    let encoded = serde_json::to_value(TaggedValue::single("Name", "ada")).unwrap();
    assert_eq!(encoded, json!({ "type": "Name", "payload": "ada" }));
}

#[rstest]
fn decoded_value_dispatches_like_a_constructed_one() {
    let decoded: TaggedValue<Vec<f64>> =
        serde_json::from_str(r#"{"type":"Shape","tag":"Rectangle","payload":[2.0,4.5]}"#).unwrap();

    assert_eq!(shape_table().dispatch(decoded), Ok(9.0));
}

#[rstest]
#[case(r#"{"type":"Shape","tag":"Hexagon","payload":[1.0]}"#, "Hexagon")]
#[case(r#"{"type":"Shape","payload":[1.0]}"#, "Shape")]
fn decoded_unknown_variant_is_invalid_tag(#[case] input: &str, #[case] tag: &str) {
    let decoded: TaggedValue<Vec<f64>> = serde_json::from_str(input).unwrap();

    assert_eq!(
        shape_table().dispatch(decoded),
        Err(UnionError::InvalidTag {
            type_name: "Shape",
            tag: tag.to_string(),
        })
    );
}

#[rstest]
fn decoded_foreign_type_is_invalid_type() {
    let decoded: TaggedValue<Vec<f64>> =
        serde_json::from_str(r#"{"type":"Polygon","tag":"Circle","payload":[1.0]}"#).unwrap();

    assert!(matches!(
        shape_table().dispatch(decoded),
        Err(UnionError::InvalidType { expected: "Shape", .. })
    ));
}

#[cfg(feature = "control")]
#[rstest]
fn step_round_trips_through_json() {
    use deferral::control::Step;

    let step: Step<u32, (u32, u32)> = Step::Continue((1, 2));
    let encoded = serde_json::to_string(&step).unwrap();
    assert_eq!(encoded, r#"{"Continue":[1,2]}"#);
    assert_eq!(serde_json::from_str::<Step<u32, (u32, u32)>>(&encoded).unwrap(), step);
}
