use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use crate::KeyedMap;

/// Resolution of the parameterless construction strategy for a mapping
/// type, computed once when a converter is created.
pub enum DefaultConstruction<M> {
	/// Concrete, default-constructible type. The function builds an
	/// instance pre-sized for the given number of entries.
	Concrete(fn(usize) -> M),

	/// The generic ordered mapping interface. No concrete type was
	/// named, so the function substitutes a default ordered
	/// implementation ([`KeyedMap`]), honoring the capacity hint.
	OrderedInterface(fn(usize) -> M),

	/// An abstract mapping with no safe default. Parameterless
	/// converter construction is rejected; a factory must be supplied.
	OpaqueInterface,
}

/// A key→value container usable by [`KeyedMapConverter`].
///
/// Implemented for [`KeyedMap`], [`HashMap`], [`IndexMap`],
/// [`dashmap::DashMap`] (under the `dashmap` feature) and
/// `Box<dyn OrderedMap>`. Implementors with unique keys and value
/// semantics matching these get round-trip behavior for free.
///
/// [`KeyedMapConverter`]: crate::KeyedMapConverter
pub trait Mapping<K, V>: Sized {
	/// How a converter with no factory may build this type.
	fn default_construction() -> DefaultConstruction<Self>;

	/// Number of entries.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Inserts an entry, replacing any previous value for the key.
	fn insert_entry(&mut self, key: K, value: V);

	/// Calls `f` once per entry.
	///
	/// The traversal sees a snapshot of the container; callers must not
	/// mutate the mapping concurrently, matching the enumeration
	/// contract of the underlying container.
	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V));
}

/// Object-safe view of an ordered key→value mapping.
///
/// This is the one abstract mapping type the converter knows how to
/// build on its own: a `Box<dyn OrderedMap>` produced by the
/// parameterless strategy is backed by a [`KeyedMap`].
pub trait OrderedMap<K, V> {
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get(&self, key: &K) -> Option<&V>;

	/// Inserts an entry, returning the previous value for the key.
	fn insert(&mut self, key: K, value: V) -> Option<V>;

	fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V));
}

impl<K, V, S> Mapping<K, V> for KeyedMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Default,
{
	fn default_construction() -> DefaultConstruction<Self> {
		DefaultConstruction::Concrete(|capacity| {
			KeyedMap::with_capacity_and_hasher(capacity, S::default())
		})
	}

	fn len(&self) -> usize {
		KeyedMap::len(self)
	}

	fn insert_entry(&mut self, key: K, value: V) {
		self.insert(key, value);
	}

	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V)) {
		for (key, value) in self.iter() {
			f(key, value)
		}
	}
}

impl<K, V, S> Mapping<K, V> for HashMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Default,
{
	fn default_construction() -> DefaultConstruction<Self> {
		DefaultConstruction::Concrete(|capacity| {
			HashMap::with_capacity_and_hasher(capacity, S::default())
		})
	}

	fn len(&self) -> usize {
		HashMap::len(self)
	}

	fn insert_entry(&mut self, key: K, value: V) {
		self.insert(key, value);
	}

	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V)) {
		for (key, value) in self {
			f(key, value)
		}
	}
}

impl<K, V, S> Mapping<K, V> for IndexMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Default,
{
	fn default_construction() -> DefaultConstruction<Self> {
		DefaultConstruction::Concrete(|capacity| {
			IndexMap::with_capacity_and_hasher(capacity, S::default())
		})
	}

	fn len(&self) -> usize {
		IndexMap::len(self)
	}

	fn insert_entry(&mut self, key: K, value: V) {
		self.insert(key, value);
	}

	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V)) {
		for (key, value) in self {
			f(key, value)
		}
	}
}

#[cfg(feature = "dashmap")]
impl<K, V, S> Mapping<K, V> for dashmap::DashMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Clone + Default,
{
	fn default_construction() -> DefaultConstruction<Self> {
		DefaultConstruction::Concrete(|capacity| {
			dashmap::DashMap::with_capacity_and_hasher(capacity, S::default())
		})
	}

	fn len(&self) -> usize {
		dashmap::DashMap::len(self)
	}

	fn insert_entry(&mut self, key: K, value: V) {
		self.insert(key, value);
	}

	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V)) {
		for entry in self.iter() {
			f(entry.key(), entry.value())
		}
	}
}

impl<K, V, S> OrderedMap<K, V> for KeyedMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher,
{
	fn len(&self) -> usize {
		KeyedMap::len(self)
	}

	fn get(&self, key: &K) -> Option<&V> {
		KeyedMap::get(self, key)
	}

	fn insert(&mut self, key: K, value: V) -> Option<V> {
		KeyedMap::insert(self, key, value)
	}

	fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V)) {
		for (key, value) in self.iter() {
			f(key, value)
		}
	}
}

impl<K, V, S> OrderedMap<K, V> for IndexMap<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher,
{
	fn len(&self) -> usize {
		IndexMap::len(self)
	}

	fn get(&self, key: &K) -> Option<&V> {
		IndexMap::get(self, key)
	}

	fn insert(&mut self, key: K, value: V) -> Option<V> {
		IndexMap::insert(self, key, value)
	}

	fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V)) {
		for (key, value) in self {
			f(key, value)
		}
	}
}

impl<K, V> Mapping<K, V> for Box<dyn OrderedMap<K, V>>
where
	K: Eq + Hash + 'static,
	V: 'static,
{
	fn default_construction() -> DefaultConstruction<Self> {
		DefaultConstruction::OrderedInterface(|capacity| {
			Box::new(KeyedMap::with_capacity(capacity))
		})
	}

	fn len(&self) -> usize {
		(**self).len()
	}

	fn insert_entry(&mut self, key: K, value: V) {
		(**self).insert(key, value);
	}

	fn visit_entries(&self, f: &mut dyn FnMut(&K, &V)) {
		(**self).for_each_entry(f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn boxed_ordered_mapping_substitutes_a_keyed_map() {
		let construction = <Box<dyn OrderedMap<String, u32>>>::default_construction();

		let mut map = match construction {
			DefaultConstruction::OrderedInterface(build) => build(4),
			_ => panic!("expected the ordered interface resolution"),
		};

		assert!(map.is_empty());
		map.insert_entry("a".to_owned(), 1);
		assert_eq!(Mapping::len(&map), 1);
		assert_eq!(map.get(&"a".to_owned()), Some(&1));
	}

	#[test]
	fn concrete_construction_is_pre_sized() {
		let DefaultConstruction::Concrete(build) =
			HashMap::<String, u32>::default_construction()
		else {
			panic!("expected a concrete resolution")
		};

		let map = build(16);
		assert!(map.capacity() >= 16);
	}
}
