use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use indexmap::{Equivalent, IndexMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::convert::keyed;
use crate::mapping::Mapping;

/// An insertion-ordered mapping whose serialized form keeps non-string
/// keys intact.
///
/// Behaviorally this is a plain [`IndexMap`]; the distinct type exists
/// so that its `Serialize`/`Deserialize` impls route through
/// [`KeyedMapConverter`] instead of the default map serialization,
/// which rejects keys that do not serialize as strings.
///
/// [`KeyedMapConverter`]: crate::KeyedMapConverter
pub struct KeyedMap<K, V, S = RandomState>(IndexMap<K, V, S>);

impl<K, V> KeyedMap<K, V> {
	pub fn new() -> Self {
		Self(IndexMap::new())
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self(IndexMap::with_capacity(capacity))
	}
}

impl<K, V, S> KeyedMap<K, V, S> {
	pub fn with_hasher(hasher: S) -> Self {
		Self(IndexMap::with_hasher(hasher))
	}

	pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
		Self(IndexMap::with_capacity_and_hasher(capacity, hasher))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Entries in insertion order.
	pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
		self.0.iter()
	}

	pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, K, V> {
		self.0.iter_mut()
	}

	pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
		self.0.keys()
	}

	pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
		self.0.values()
	}

	pub fn clear(&mut self) {
		self.0.clear()
	}

	pub fn as_index_map(&self) -> &IndexMap<K, V, S> {
		&self.0
	}

	pub fn into_index_map(self) -> IndexMap<K, V, S> {
		self.0
	}
}

impl<K, V, S> KeyedMap<K, V, S>
where
	K: Hash + Eq,
	S: BuildHasher,
{
	/// Inserts an entry, returning the previous value for the key.
	///
	/// New keys go to the end of the order; existing keys keep their
	/// position.
	pub fn insert(&mut self, key: K, value: V) -> Option<V> {
		self.0.insert(key, value)
	}

	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		Q: ?Sized + Hash + Equivalent<K>,
	{
		self.0.get(key)
	}

	pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
	where
		Q: ?Sized + Hash + Equivalent<K>,
	{
		self.0.get_mut(key)
	}

	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		Q: ?Sized + Hash + Equivalent<K>,
	{
		self.0.contains_key(key)
	}

	/// Removes an entry, preserving the order of the remaining ones.
	pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
	where
		Q: ?Sized + Hash + Equivalent<K>,
	{
		self.0.shift_remove(key)
	}
}

impl<K, V, S: Default> Default for KeyedMap<K, V, S> {
	fn default() -> Self {
		Self(IndexMap::default())
	}
}

impl<K: Clone, V: Clone, S: Clone> Clone for KeyedMap<K, V, S> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for KeyedMap<K, V, S> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Order-independent entry equality, like [`IndexMap`]'s.
impl<K, V, S> PartialEq for KeyedMap<K, V, S>
where
	K: Hash + Eq,
	V: PartialEq,
	S: BuildHasher,
{
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl<K, V, S> Eq for KeyedMap<K, V, S>
where
	K: Hash + Eq,
	V: Eq,
	S: BuildHasher,
{
}

impl<K, V, S> From<IndexMap<K, V, S>> for KeyedMap<K, V, S> {
	fn from(map: IndexMap<K, V, S>) -> Self {
		Self(map)
	}
}

impl<K, V, S> From<KeyedMap<K, V, S>> for IndexMap<K, V, S> {
	fn from(map: KeyedMap<K, V, S>) -> Self {
		map.0
	}
}

impl<K, V, S> FromIterator<(K, V)> for KeyedMap<K, V, S>
where
	K: Hash + Eq,
	S: BuildHasher + Default,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(IndexMap::from_iter(iter))
	}
}

impl<K, V, S> Extend<(K, V)> for KeyedMap<K, V, S>
where
	K: Hash + Eq,
	S: BuildHasher,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		self.0.extend(iter)
	}
}

impl<K, V, S> IntoIterator for KeyedMap<K, V, S> {
	type Item = (K, V);
	type IntoIter = indexmap::map::IntoIter<K, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a, K, V, S> IntoIterator for &'a KeyedMap<K, V, S> {
	type Item = (&'a K, &'a V);
	type IntoIter = indexmap::map::Iter<'a, K, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl<'a, K, V, S> IntoIterator for &'a mut KeyedMap<K, V, S> {
	type Item = (&'a K, &'a mut V);
	type IntoIter = indexmap::map::IterMut<'a, K, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter_mut()
	}
}

impl<K, V, S> Serialize for KeyedMap<K, V, S>
where
	Self: Mapping<K, V>,
	K: Serialize + 'static,
	V: Serialize,
{
	fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
	where
		Ser: Serializer,
	{
		keyed::serialize(self, serializer)
	}
}

impl<'de, K, V, S> Deserialize<'de> for KeyedMap<K, V, S>
where
	Self: Mapping<K, V>,
	K: DeserializeOwned + 'static,
	V: DeserializeOwned,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		keyed::deserialize(deserializer)
	}
}
