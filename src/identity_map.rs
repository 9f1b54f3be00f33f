use core::hash::Hash;
use hashbrown::HashMap;

/// Maps ephemeral node identities to the long-lived values representing them.
pub struct IdentityMap<K, V>(HashMap<K, V>)
where
	K: Hash + Eq;
impl<K, V> Default for IdentityMap<K, V>
where
	K: Hash + Eq,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, V> IdentityMap<K, V>
where
	K: Hash + Eq,
{
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	pub fn insert(&mut self, key: K, value: V) -> Option<V> {
		self.0.insert(key, value)
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.0.get(key)
	}

	pub fn contains(&self, key: &K) -> bool {
		self.0.contains_key(key)
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		self.0.remove(key)
	}

	/// Moves the value registered under `old` to `new`, keeping it live across an identity
	/// change. Returns `false` if `old` had no entry.
	pub fn rekey(&mut self, old: &K, new: K) -> bool {
		match self.0.remove(old) {
			Some(value) => {
				self.0.insert(new, value);
				true
			}
			None => false,
		}
	}

	pub fn clear(&mut self) {
		self.0.clear();
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
