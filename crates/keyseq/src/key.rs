//! The opaque sequence key.
//!
//! The system never inspects a key's content; it is used only for equality
//! and hashing (§3, §9 "opaque key typing"). Rather than force callers
//! through a wrapper type, the key type is a generic parameter bounded by
//! exactly what the design requires.

use std::fmt::Debug;
use std::hash::Hash;

/// Bound satisfied by any type usable as a sequence key.
///
/// `Debug` is required only for observability (tracing span fields, §3.1);
/// it has no bearing on equality or scheduling.
pub trait SequenceKey: Eq + Hash + Clone + Send + Sync + Debug + 'static {}

impl<T> SequenceKey for T where T: Eq + Hash + Clone + Send + Sync + Debug + 'static {}

/// The key actually used inside the registry.
///
/// An unbounded-keys factory stores lanes under the caller's own key
/// (`Direct`). A bounded-keys factory (§4.7) instead hashes the caller's key
/// into one of `N` buckets and stores the lane under the bucket index
/// (`Bucket`), so colliding keys share a lane and serialize with each other.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Slot<K> {
    Direct(K),
    Bucket(usize),
}

pub(crate) fn bucket_of<K: Hash>(key: &K, bucket_count: usize) -> usize {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % bucket_count
}
