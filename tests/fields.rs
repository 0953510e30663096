//! Attribute-driven usage: mapping fields inside derived structs.

use std::collections::HashMap;

use json_keyed_map::{KeyedMap, OrderedMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct SampleKey {
	x: i32,
	y: String,
}

fn sample_key(x: i32, y: &str) -> SampleKey {
	SampleKey { x, y: y.to_owned() }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
struct Document {
	#[serde(with = "json_keyed_map::keyed")]
	by_position: HashMap<SampleKey, String>,

	labels: KeyedMap<SampleKey, String>,

	#[serde(
		default,
		with = "json_keyed_map::keyed_option",
		skip_serializing_if = "Option::is_none"
	)]
	annotations: Option<HashMap<SampleKey, String>>,
}

fn sample_document() -> Document {
	Document {
		by_position: HashMap::from([
			(sample_key(1, "abc"), "qwerty".to_owned()),
			(sample_key(-5, "qwe"), "abcdef".to_owned()),
		]),
		labels: [(sample_key(13, "def"), "uvw".to_owned())].into_iter().collect(),
		annotations: None,
	}
}

#[test]
fn documents_roundtrip() {
	let mut document = sample_document();
	document.annotations = Some(HashMap::from([(
		sample_key(42, "qty"),
		"xyz".to_owned(),
	)]));

	let json = serde_json::to_string(&document).unwrap();
	assert_eq!(serde_json::from_str::<Document>(&json).unwrap(), document);
}

#[test]
fn absent_optional_mappings_stay_none() {
	let document = sample_document();
	let json = serde_json::to_string(&document).unwrap();

	assert!(!json.contains("annotations"));
	assert_eq!(serde_json::from_str::<Document>(&json).unwrap(), document);
}

#[test]
fn null_optional_mappings_decode_to_none() {
	let json = r#"{"by_position":{},"labels":{},"annotations":null}"#;
	let document: Document = serde_json::from_str(json).unwrap();
	assert_eq!(document.annotations, None);
}

#[test]
fn null_is_not_a_mapping() {
	let json = r#"{"by_position":null,"labels":{}}"#;
	assert!(serde_json::from_str::<Document>(json).is_err());
}

#[test]
fn string_keyed_fields_match_unconverted_output() {
	#[derive(Serialize, Deserialize)]
	struct Converted {
		#[serde(with = "json_keyed_map::keyed")]
		entries: HashMap<String, String>,
	}

	#[derive(Serialize, Deserialize)]
	struct Plain {
		entries: HashMap<String, String>,
	}

	let entries = HashMap::from([("key1".to_owned(), "value1".to_owned())]);

	let converted = serde_json::to_string(&Converted {
		entries: entries.clone(),
	})
	.unwrap();
	let plain = serde_json::to_string(&Plain { entries }).unwrap();

	assert_eq!(converted, plain);
	assert_eq!(converted, r#"{"entries":{"key1":"value1"}}"#);
}

#[test]
fn interface_typed_fields_roundtrip() {
	#[derive(Serialize, Deserialize)]
	struct Registry {
		#[serde(with = "json_keyed_map::keyed")]
		entries: Box<dyn OrderedMap<SampleKey, String>>,
	}

	let mut entries: Box<dyn OrderedMap<SampleKey, String>> = Box::new(KeyedMap::new());
	entries.insert(sample_key(1, "abc"), "qwerty".to_owned());
	entries.insert(sample_key(-5, "qwe"), "abcdef".to_owned());

	let json = serde_json::to_string(&Registry { entries }).unwrap();
	let back: Registry = serde_json::from_str(&json).unwrap();

	assert_eq!(back.entries.len(), 2);
	assert_eq!(
		back.entries.get(&sample_key(1, "abc")),
		Some(&"qwerty".to_owned())
	);
	assert_eq!(
		back.entries.get(&sample_key(-5, "qwe")),
		Some(&"abcdef".to_owned())
	);
}

#[cfg(feature = "dashmap")]
#[test]
fn concurrent_fields_roundtrip() {
	use dashmap::DashMap;

	#[derive(Serialize, Deserialize)]
	struct Tracker {
		#[serde(with = "json_keyed_map::keyed")]
		entries: DashMap<SampleKey, String>,
	}

	let tracker = Tracker {
		entries: DashMap::new(),
	};
	tracker
		.entries
		.insert(sample_key(1, "abc"), "qwerty".to_owned());
	tracker
		.entries
		.insert(sample_key(-5, "qwe"), "abcdef".to_owned());

	let json = serde_json::to_string(&tracker).unwrap();
	let back: Tracker = serde_json::from_str(&json).unwrap();

	assert_eq!(back.entries.len(), 2);
	assert_eq!(
		back.entries.get(&sample_key(1, "abc")).as_deref(),
		Some(&"qwerty".to_owned())
	);
}

#[test]
fn keyed_maps_serialize_directly() {
	let map: KeyedMap<SampleKey, String> =
		[(sample_key(1, "abc"), "qwerty".to_owned())].into_iter().collect();

	let json = serde_json::to_string(&map).unwrap();
	assert_eq!(json, r#"{"{\"x\":1,\"y\":\"abc\"}":"qwerty"}"#);

	let back: KeyedMap<SampleKey, String> = serde_json::from_str(&json).unwrap();
	assert_eq!(back, map);
}
