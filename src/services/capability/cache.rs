//! Keyed cache that runs at most one query per key at a time.
//!
//! Each key maps to a slot that is either ready or in flight. The first caller to
//! find no slot runs the query and publishes its outcome to every caller that
//! joined while it was running, errors included. A failed query is removed from
//! the map once published, so the next caller retries. If the caller running a
//! query is dropped, the next waiter takes it over. Stored values never expire.

use futures::Future;
use std::{collections::HashMap, fmt::Debug, hash::Hash, sync::Arc};
use tokio::sync::{watch, RwLock};
use tracing::{instrument, trace, Level};

use crate::utils::metrics::record_cache_lookup;

/// Result shared by every caller of one query
pub type Shared<V, E> = Result<Arc<V>, Arc<E>>;

struct InFlight<V, E> {
	outcome: watch::Receiver<Option<Shared<V, E>>>,
}

enum Slot<V, E> {
	Ready(Arc<V>),
	InFlight(Arc<InFlight<V, E>>),
}

enum Claim<V, E> {
	Ready(Arc<V>),
	Join(Arc<InFlight<V, E>>),
	Lead(watch::Sender<Option<Shared<V, E>>>, Arc<InFlight<V, E>>),
}

pub struct CoalescingCache<K, V, E> {
	name: &'static str,
	slots: RwLock<HashMap<K, Slot<V, E>>>,
}

impl<K, V, E> CoalescingCache<K, V, E>
where
	K: Clone + Hash + Eq + Debug + Send + Sync,
	V: Send + Sync,
	E: Send + Sync,
{
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			slots: RwLock::new(HashMap::new()),
		}
	}

	/// Returns the stored value for `key`, or the outcome of the query in flight
	/// for it. Runs `fetch` only when neither exists.
	#[instrument(level = Level::TRACE, skip(self, fetch), fields(cache = self.name))]
	pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Shared<V, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V, E>>,
	{
		if let Some(value) = self.stored(&key).await {
			trace!("CacheHit");
			record_cache_lookup(self.name, true);
			return Ok(value);
		}

		loop {
			match self.claim(&key).await {
				Claim::Ready(value) => {
					trace!("CacheHit");
					record_cache_lookup(self.name, true);
					return Ok(value);
				}
				Claim::Join(flight) => {
					let mut outcome = flight.outcome.clone();
					let published = outcome
						.wait_for(Option::is_some)
						.await
						.map(|published| published.clone());

					if let Ok(Some(shared)) = published {
						trace!(ok = shared.is_ok(), "CacheJoined");
						record_cache_lookup(self.name, true);
						return shared;
					}

					// The running caller was dropped before publishing
					trace!("CacheTakeover");
					self.remove_in_flight(&key, &flight).await;
				}
				Claim::Lead(publisher, flight) => {
					trace!("CacheMiss");
					record_cache_lookup(self.name, false);

					let shared = fetch().await.map(Arc::new).map_err(Arc::new);
					self.settle(&key, &flight, &shared).await;
					publisher.send_replace(Some(shared.clone()));
					return shared;
				}
			}
		}
	}

	/// Stored value for `key`, without waiting on an in-flight query.
	pub async fn stored(&self, key: &K) -> Option<Arc<V>> {
		match self.slots.read().await.get(key) {
			Some(Slot::Ready(value)) => Some(value.clone()),
			_ => None,
		}
	}

	/// Drops the slot for `key`. An in-flight query still completes for its
	/// waiters but its result is not kept.
	pub async fn invalidate(&self, key: &K) {
		self.slots.write().await.remove(key);
	}

	/// Drops every slot whose key matches `predicate`.
	pub async fn invalidate_where<P>(&self, predicate: P)
	where
		P: Fn(&K) -> bool,
	{
		self.slots.write().await.retain(|key, _| !predicate(key));
	}

	pub async fn clear(&self) {
		self.slots.write().await.clear();
	}

	/// Number of slots, including in-flight ones.
	pub async fn len(&self) -> usize {
		self.slots.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.slots.read().await.is_empty()
	}

	async fn claim(&self, key: &K) -> Claim<V, E> {
		let mut slots = self.slots.write().await;
		match slots.get(key) {
			Some(Slot::Ready(value)) => Claim::Ready(value.clone()),
			Some(Slot::InFlight(flight)) => Claim::Join(flight.clone()),
			None => {
				let (publisher, outcome) = watch::channel(None);
				let flight = Arc::new(InFlight { outcome });
				slots.insert(key.clone(), Slot::InFlight(flight.clone()));
				Claim::Lead(publisher, flight)
			}
		}
	}

	/// Stores a successful outcome and forgets a failed one, unless the slot was
	/// invalidated or replaced meanwhile.
	async fn settle(&self, key: &K, flight: &Arc<InFlight<V, E>>, shared: &Shared<V, E>) {
		let mut slots = self.slots.write().await;
		if !Self::is_current(&slots, key, flight) {
			return;
		}
		match shared {
			Ok(value) => {
				slots.insert(key.clone(), Slot::Ready(value.clone()));
			}
			Err(_) => {
				slots.remove(key);
			}
		}
	}

	async fn remove_in_flight(&self, key: &K, flight: &Arc<InFlight<V, E>>) {
		let mut slots = self.slots.write().await;
		if Self::is_current(&slots, key, flight) {
			slots.remove(key);
		}
	}

	fn is_current(slots: &HashMap<K, Slot<V, E>>, key: &K, flight: &Arc<InFlight<V, E>>) -> bool {
		matches!(slots.get(key), Some(Slot::InFlight(current)) if Arc::ptr_eq(current, flight))
	}
}
