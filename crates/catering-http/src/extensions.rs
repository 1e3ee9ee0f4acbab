//! Typed per-request storage.
//!
//! Middleware stashes request-scoped context here (the verified session
//! identity, the request start time) for handlers further down the chain.

use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Map from type to a single value of that type.
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value`, replacing any previous value of the same type.
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		self.map.lock().insert(TypeId::of::<T>(), Box::new(value));
	}

	/// Returns a clone of the stored value of type `T`.
	pub fn get<T>(&self) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		self.map
			.lock()
			.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
			.cloned()
	}

	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		self.map.lock().contains_key(&TypeId::of::<T>())
	}

	pub fn remove<T: Send + Sync + 'static>(&self) -> Option<T> {
		let boxed = self.map.lock().remove(&TypeId::of::<T>())?;
		boxed.downcast::<T>().ok().map(|value| *value)
	}
}

impl std::fmt::Debug for Extensions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Extensions")
			.field("len", &self.map.lock().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Clone, Debug, PartialEq)]
	struct Marker(&'static str);

	#[rstest]
	fn test_insert_get_remove() {
		let extensions = Extensions::new();
		extensions.insert(Marker("first"));
		extensions.insert(Marker("second"));

		assert_eq!(extensions.get::<Marker>(), Some(Marker("second")));
		assert_eq!(extensions.remove::<Marker>(), Some(Marker("second")));
		assert!(!extensions.contains::<Marker>());
	}

	#[rstest]
	fn test_clones_share_storage() {
		let extensions = Extensions::new();
		let other = extensions.clone();
		other.insert(7u8);

		assert_eq!(extensions.get::<u8>(), Some(7));
		assert_eq!(extensions.get::<u16>(), None);
	}
}
