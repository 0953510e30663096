//! JSON round-trips for maps keyed by arbitrary serializable types.
//!
//! JSON objects only admit string property names, so serde_json
//! rejects maps whose keys do not serialize as strings ("key must be a
//! string"). This crate encodes each key to its JSON text fragment and
//! uses the fragment verbatim as the property name, then parses the
//! names back into the key type on read. Plain `String` keys are left
//! untouched, so for them the output is byte-for-byte identical to the
//! default map serialization.
//!
//! The simplest entry point is [`KeyedMap`], an insertion-ordered map
//! that round-trips out of the box:
//!
//! ```
//! use json_keyed_map::KeyedMap;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
//! struct Point {
//! 	x: i32,
//! 	y: i32,
//! }
//!
//! let mut map = KeyedMap::new();
//! map.insert(Point { x: 1, y: 2 }, "origin-ish".to_string());
//!
//! let json = serde_json::to_string(&map).unwrap();
//! assert_eq!(json, r#"{"{\"x\":1,\"y\":2}":"origin-ish"}"#);
//!
//! let back: KeyedMap<Point, String> = serde_json::from_str(&json).unwrap();
//! assert_eq!(back, map);
//! ```
//!
//! Fields of other mapping types (`HashMap`, `IndexMap`, `DashMap`,
//! `Box<dyn OrderedMap>`) opt in with
//! `#[serde(with = "json_keyed_map::keyed")]`, or go through a
//! [`KeyedMapConverter`] directly when the result mapping must be
//! built by a custom factory.
//!
//! Two caveats carry over from the wire format. Distinct keys must
//! serialize to distinct fragments; the converter does not check for
//! colliding encodings. And on read, a property name that fails to
//! parse as the key type drops that entry silently instead of failing
//! the document, so foreign properties mixed into an object do not
//! poison the entries that do belong.

mod convert;
mod map;
mod mapping;

pub use convert::{keyed, keyed_option, KeyedMapConverter, UnsupportedMappingType};
pub use map::KeyedMap;
pub use mapping::{DefaultConstruction, Mapping, OrderedMap};
