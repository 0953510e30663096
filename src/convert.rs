use std::any::{Any, TypeId};
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, DeserializeSeed, Unexpected};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::mapping::{DefaultConstruction, Mapping};

/// Converter construction failed because the mapping type cannot be
/// built without help.
///
/// Raised by [`KeyedMapConverter::new`] when the mapping type resolves
/// to [`DefaultConstruction::OpaqueInterface`]: there is no safe
/// default implementation to substitute, so the converter refuses the
/// configuration up front instead of failing on the first read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("mapping type `{type_name}` cannot be constructed by the converter; use a factory")]
pub struct UnsupportedMappingType {
	type_name: &'static str,
}

impl UnsupportedMappingType {
	fn of<M>() -> Self {
		Self {
			type_name: std::any::type_name::<M>(),
		}
	}

	/// Name of the rejected mapping type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

/// The strategy used to materialize the result mapping on read, fixed
/// for the lifetime of the converter.
enum Construct<M> {
	/// Parameterless strategy, resolved to a pre-sizing constructor.
	Resolved(fn(usize) -> M),

	/// Caller-supplied zero-argument factory, used verbatim.
	Factory(Box<dyn Fn() -> M + Send + Sync>),

	/// Caller-supplied factory receiving the decoded entry count.
	CapacityFactory(Box<dyn Fn(usize) -> M + Send + Sync>),
}

/// Bidirectional transform between a mapping with non-string keys and
/// a JSON object whose property names are the JSON encodings of the
/// keys.
///
/// On write, each key is serialized to its JSON text fragment and the
/// fragment is used verbatim as the property name; values use their
/// regular serialization. On read, the object is buffered, property
/// names are parsed back into the key type and entries are inserted
/// into a mapping built by the converter's construction strategy.
///
/// `String` keys short-circuit both directions: output is identical to
/// the plain serialization of the mapping and no key parsing happens
/// on read. Distinct keys must serialize to distinct fragments; the
/// converter does not detect colliding encodings.
///
/// The converter holds no per-call state and may be shared freely
/// between threads once built.
pub struct KeyedMapConverter<M, K, V> {
	construct: Construct<M>,
	types: PhantomData<fn() -> (K, V)>,
}

impl<M, K, V> KeyedMapConverter<M, K, V>
where
	M: Mapping<K, V>,
{
	/// Creates a converter using the parameterless construction
	/// strategy.
	///
	/// Fails immediately when `M` is an abstract mapping with no safe
	/// default. The generic ordered mapping interface is the one
	/// exception: a default ordered implementation is substituted,
	/// capacity hint included.
	pub fn new() -> Result<Self, UnsupportedMappingType> {
		match M::default_construction() {
			DefaultConstruction::Concrete(build)
			| DefaultConstruction::OrderedInterface(build) => Ok(Self::resolved(build)),
			DefaultConstruction::OpaqueInterface => Err(UnsupportedMappingType::of::<M>()),
		}
	}

	/// Creates a converter calling `factory` for every decoded mapping.
	pub fn with_factory<F>(factory: F) -> Self
	where
		F: Fn() -> M + Send + Sync + 'static,
	{
		Self {
			construct: Construct::Factory(Box::new(factory)),
			types: PhantomData,
		}
	}

	/// Creates a converter calling `factory` with the decoded entry
	/// count, so the result can be pre-sized.
	pub fn with_capacity_factory<F>(factory: F) -> Self
	where
		F: Fn(usize) -> M + Send + Sync + 'static,
	{
		Self {
			construct: Construct::CapacityFactory(Box::new(factory)),
			types: PhantomData,
		}
	}

	fn resolved(build: fn(usize) -> M) -> Self {
		Self {
			construct: Construct::Resolved(build),
			types: PhantomData,
		}
	}

	fn build(&self, capacity: usize) -> M {
		match &self.construct {
			Construct::Resolved(build) => build(capacity),
			Construct::Factory(factory) => factory(),
			Construct::CapacityFactory(factory) => factory(capacity),
		}
	}
}

impl<M, K, V> KeyedMapConverter<M, K, V>
where
	M: Mapping<K, V>,
	K: Serialize + 'static,
	V: Serialize,
{
	/// Writes `map` as a JSON object with serialized property names.
	pub fn serialize<S>(&self, map: &M, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serialize_object(map, serializer)
	}

	/// Serializes `map` to a JSON string.
	pub fn to_json_string(&self, map: &M) -> Result<String, serde_json::Error> {
		serde_json::to_string(&AsJsonObject(map, PhantomData::<fn() -> (K, V)>))
	}
}

impl<M, K, V> KeyedMapConverter<M, K, V>
where
	M: Mapping<K, V>,
	K: DeserializeOwned + 'static,
	V: DeserializeOwned,
{
	/// Deserializes a mapping from a JSON string.
	///
	/// Returns `None` for the JSON `null` document.
	pub fn from_json_str(&self, json: &str) -> Result<Option<M>, serde_json::Error> {
		let mut deserializer = serde_json::Deserializer::from_str(json);
		let map = self.deserialize(&mut deserializer)?;
		deserializer.end()?;
		Ok(map)
	}
}

impl<'de, M, K, V> DeserializeSeed<'de> for &KeyedMapConverter<M, K, V>
where
	M: Mapping<K, V>,
	K: DeserializeOwned + 'static,
	V: DeserializeOwned,
{
	type Value = Option<M>;

	fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
	where
		D: Deserializer<'de>,
	{
		// The object is buffered whole before any key is parsed, so a
		// malformed document never yields a partially filled mapping.
		let object = match serde_json::Value::deserialize(deserializer)? {
			serde_json::Value::Null => return Ok(None),
			serde_json::Value::Object(object) => object,
			other => {
				return Err(serde::de::Error::invalid_type(
					unexpected_kind(&other),
					&"a JSON object",
				))
			}
		};

		let mut result = self.build(object.len());

		for (name, value) in object {
			let value: V =
				serde_json::from_value(value).map_err(serde::de::Error::custom)?;

			// Property names that do not parse as the key type are
			// dropped, not reported. Silent loss is the documented
			// policy for foreign keys in otherwise well-formed input.
			if let Some(key) = parse_key::<K>(name) {
				result.insert_entry(key, value)
			}
		}

		Ok(Some(result))
	}
}

impl<M, K, V> std::fmt::Debug for KeyedMapConverter<M, K, V> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let strategy = match &self.construct {
			Construct::Resolved(_) => "parameterless",
			Construct::Factory(_) => "factory",
			Construct::CapacityFactory(_) => "capacity factory",
		};

		f.debug_struct("KeyedMapConverter")
			.field("strategy", &strategy)
			.finish()
	}
}

struct AsJsonObject<'a, M, K, V>(&'a M, PhantomData<fn() -> (K, V)>);

impl<M, K, V> Serialize for AsJsonObject<'_, M, K, V>
where
	M: Mapping<K, V>,
	K: Serialize + 'static,
	V: Serialize,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serialize_object(self.0, serializer)
	}
}

fn key_is_string<K: 'static>() -> bool {
	TypeId::of::<K>() == TypeId::of::<String>()
}

fn serialize_object<M, K, V, S>(map: &M, serializer: S) -> Result<S::Ok, S::Error>
where
	M: Mapping<K, V>,
	K: Serialize + 'static,
	V: Serialize,
	S: Serializer,
{
	let string_keys = key_is_string::<K>();
	let mut object = serializer.serialize_map(Some(map.len()))?;
	let mut failed: Option<S::Error> = None;

	map.visit_entries(&mut |key, value| {
		if failed.is_some() {
			return;
		}

		let written = if string_keys {
			// `String` keys already serialize as property names;
			// encoding them again would quote them twice.
			object.serialize_entry(key, value)
		} else {
			match serde_json::to_string(key) {
				Ok(name) => object.serialize_entry(&name, value),
				Err(e) => Err(serde::ser::Error::custom(e)),
			}
		};

		if let Err(e) = written {
			failed = Some(e)
		}
	});

	match failed {
		Some(e) => Err(e),
		None => object.end(),
	}
}

fn parse_key<K>(name: String) -> Option<K>
where
	K: DeserializeOwned + 'static,
{
	if key_is_string::<K>() {
		let name: Box<dyn Any> = Box::new(name);
		return name.downcast().ok().map(|key| *key);
	}

	match serde_json::from_str(&name) {
		Ok(key) => Some(key),
		Err(e) => {
			log::debug!("dropping entry with unparseable key `{name}`: {e}");
			None
		}
	}
}

fn unexpected_kind(value: &serde_json::Value) -> Unexpected<'_> {
	match value {
		serde_json::Value::Null => Unexpected::Unit,
		serde_json::Value::Bool(b) => Unexpected::Bool(*b),
		serde_json::Value::Number(_) => Unexpected::Other("number"),
		serde_json::Value::String(s) => Unexpected::Str(s),
		serde_json::Value::Array(_) => Unexpected::Seq,
		serde_json::Value::Object(_) => Unexpected::Map,
	}
}

/// Serde field attribute support for mapping types with non-string
/// keys, using the parameterless construction strategy.
///
/// ```
/// use std::collections::HashMap;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Scene {
/// 	#[serde(with = "json_keyed_map::keyed")]
/// 	labels: HashMap<Point, String>,
/// }
///
/// let scene = Scene {
/// 	labels: HashMap::from([(Point { x: 1, y: 2 }, "origin-ish".to_owned())]),
/// };
///
/// let json = serde_json::to_string(&scene).unwrap();
/// assert_eq!(json, r#"{"labels":{"{\"x\":1,\"y\":2}":"origin-ish"}}"#);
/// assert_eq!(serde_json::from_str::<Scene>(&json).unwrap(), scene);
/// ```
pub mod keyed {
	use serde::de::{DeserializeOwned, DeserializeSeed, Unexpected};
	use serde::{Deserializer, Serialize, Serializer};

	use super::KeyedMapConverter;
	use crate::mapping::Mapping;

	pub fn serialize<M, K, V, S>(map: &M, serializer: S) -> Result<S::Ok, S::Error>
	where
		M: Mapping<K, V>,
		K: Serialize + 'static,
		V: Serialize,
		S: Serializer,
	{
		super::serialize_object(map, serializer)
	}

	pub fn deserialize<'de, M, K, V, D>(deserializer: D) -> Result<M, D::Error>
	where
		M: Mapping<K, V>,
		K: DeserializeOwned + 'static,
		V: DeserializeOwned,
		D: Deserializer<'de>,
	{
		let converter =
			KeyedMapConverter::<M, K, V>::new().map_err(serde::de::Error::custom)?;

		match converter.deserialize(deserializer)? {
			Some(map) => Ok(map),
			None => Err(serde::de::Error::invalid_type(
				Unexpected::Other("null"),
				&"a JSON object",
			)),
		}
	}
}

/// Like [`keyed`], for optional mapping fields.
///
/// JSON `null` reads back as `None`; pair with
/// `#[serde(default, skip_serializing_if = "Option::is_none")]` so a
/// `None` field is omitted on write and tolerated when absent on read.
pub mod keyed_option {
	use serde::de::{DeserializeOwned, DeserializeSeed};
	use serde::{Deserializer, Serialize, Serializer};

	use super::KeyedMapConverter;
	use crate::mapping::Mapping;

	pub fn serialize<M, K, V, S>(map: &Option<M>, serializer: S) -> Result<S::Ok, S::Error>
	where
		M: Mapping<K, V>,
		K: Serialize + 'static,
		V: Serialize,
		S: Serializer,
	{
		match map {
			Some(map) => super::serialize_object(map, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, M, K, V, D>(deserializer: D) -> Result<Option<M>, D::Error>
	where
		M: Mapping<K, V>,
		K: DeserializeOwned + 'static,
		V: DeserializeOwned,
		D: Deserializer<'de>,
	{
		let converter =
			KeyedMapConverter::<M, K, V>::new().map_err(serde::de::Error::custom)?;

		converter.deserialize(deserializer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn string_keys_are_recognized() {
		assert!(key_is_string::<String>());
		assert!(!key_is_string::<i32>());
		assert!(!key_is_string::<&'static str>());
	}

	#[test]
	fn string_keys_bypass_the_fragment_parser() {
		let key: Option<String> = parse_key("not json at all".to_owned());
		assert_eq!(key, Some("not json at all".to_owned()));
	}

	#[test]
	fn unparseable_fragments_yield_no_key() {
		assert_eq!(parse_key::<i32>("17".to_owned()), Some(17));
		assert_eq!(parse_key::<i32>("seventeen".to_owned()), None);
		// `null` parses to no key at all, like a failed parse.
		assert_eq!(parse_key::<i32>("null".to_owned()), None);
	}
}
