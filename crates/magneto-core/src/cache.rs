// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Location Cache
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Memoization of field results by exact location.
//!
//! Keys are the bit patterns of the three coordinates, so only bitwise
//! identical locations hit (−0.0 is folded onto 0.0). Entries are evicted
//! least-recently-used once the capacity is exceeded, in amortized constant
//! time per access. Errors are never cached.

use crate::field::{DifferentiableField, Differential, VectorField};
use magneto_math::vector::Vec3;
use magneto_types::error::{MagnetoError, MagnetoResult};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LocationKey([u64; 3]);

impl LocationKey {
    fn new(location: &Vec3) -> Self {
        // adding 0.0 turns −0.0 into +0.0
        LocationKey([
            (location.x + 0.0).to_bits(),
            (location.y + 0.0).to_bits(),
            (location.z + 0.0).to_bits(),
        ])
    }
}

struct Slot<V> {
    value: V,
    last_used: AtomicU64,
}

/// Use order of the keys, oldest first.
///
/// A key may appear several times; only the entry whose stamp equals the
/// slot's `last_used` is live; the others are skipped on eviction and
/// dropped on compaction.
struct Recency {
    clock: u64,
    order: VecDeque<(u64, LocationKey)>,
}

impl Recency {
    fn touch(&mut self, key: LocationKey) -> u64 {
        let stamp = self.clock;
        self.clock += 1;
        self.order.push_back((stamp, key));
        stamp
    }
}

/// Bounded LRU map shared between threads.
///
/// Lock order is `entries` first, then `recency`.
struct LruTable<V> {
    entries: RwLock<HashMap<LocationKey, Slot<V>>>,
    recency: Mutex<Recency>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

fn is_live<V>(entries: &HashMap<LocationKey, Slot<V>>, stamp: u64, key: &LocationKey) -> bool {
    entries
        .get(key)
        .is_some_and(|slot| slot.last_used.load(Ordering::Relaxed) == stamp)
}

impl<V: Copy> LruTable<V> {
    fn new(capacity: usize) -> Self {
        LruTable {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(4096))),
            recency: Mutex::new(Recency {
                clock: 0,
                order: VecDeque::with_capacity(capacity.min(4096)),
            }),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stale entries allowed in the order queue before it is compacted.
    fn compaction_threshold(&self) -> usize {
        2 * self.capacity + 16
    }

    fn compact(&self, entries: &HashMap<LocationKey, Slot<V>>, recency: &mut Recency) {
        if recency.order.len() > self.compaction_threshold() {
            recency
                .order
                .retain(|(stamp, key)| is_live(entries, *stamp, key));
        }
    }

    fn get(&self, key: &LocationKey) -> Option<V> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(slot) => {
                let mut recency = self.recency.lock();
                slot.last_used.store(recency.touch(*key), Ordering::Relaxed);
                self.compact(&entries, &mut recency);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(slot.value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn insert(&self, key: LocationKey, value: V) {
        let mut entries = self.entries.write();
        let mut recency = self.recency.lock();
        let stamp = recency.touch(key);
        entries.insert(
            key,
            Slot {
                value,
                last_used: AtomicU64::new(stamp),
            },
        );
        while entries.len() > self.capacity {
            let Some((stamp, oldest)) = recency.order.pop_front() else {
                break;
            };
            if is_live(&entries, stamp, &oldest) {
                entries.remove(&oldest);
                trace!(capacity = self.capacity, "evicted least recently used location");
            }
        }
        self.compact(&entries, &mut recency);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) {
        let mut entries = self.entries.write();
        let mut recency = self.recency.lock();
        entries.clear();
        recency.order.clear();
    }
}

/// Hit/miss counters of a [`Cached`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// A field that remembers its results for recently seen locations.
///
/// Values and differentials are kept in separate tables, so calling
/// `evaluate` does not fill the differential table or the other way round.
pub struct Cached<F> {
    field: F,
    values: LruTable<Vec3>,
    differentials: LruTable<Differential>,
}

/// Wrap `field` in an LRU cache holding up to `capacity` locations.
pub fn cache<F: VectorField>(field: F, capacity: usize) -> MagnetoResult<Cached<F>> {
    if capacity == 0 {
        return Err(MagnetoError::ConfigError(
            "cache capacity must be >= 1".to_string(),
        ));
    }
    Ok(Cached {
        field,
        values: LruTable::new(capacity),
        differentials: LruTable::new(capacity),
    })
}

impl<F> Cached<F> {
    pub fn inner(&self) -> &F {
        &self.field
    }

    /// Counters of the value table.
    pub fn stats(&self) -> CacheStats {
        self.table_stats(&self.values)
    }

    /// Counters of the differential table.
    pub fn differential_stats(&self) -> CacheStats {
        self.table_stats(&self.differentials)
    }

    fn table_stats<V: Copy>(&self, table: &LruTable<V>) -> CacheStats {
        CacheStats {
            hits: table.hits.load(Ordering::Relaxed),
            misses: table.misses.load(Ordering::Relaxed),
            entries: table.len(),
            capacity: table.capacity,
        }
    }

    pub fn clear(&self) {
        self.values.clear();
        self.differentials.clear();
    }
}

impl<F: VectorField> VectorField for Cached<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let key = LocationKey::new(location);
        if let Some(v) = self.values.get(&key) {
            return Ok(v);
        }
        let v = self.field.evaluate(location)?;
        self.values.insert(key, v);
        Ok(v)
    }
}

impl<F: DifferentiableField> DifferentiableField for Cached<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let key = LocationKey::new(location);
        if let Some(d) = self.differentials.get(&key) {
            return Ok(d);
        }
        let d = self.field.differentiate(location)?;
        self.differentials.insert(key, d);
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::identity;
    use crate::sources::Dipole;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        calls: AtomicUsize,
    }

    impl VectorField for Counting {
        fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(location * 2.0)
        }
    }

    fn counting() -> Counting {
        Counting {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_repeat_location_hits() {
        let f = cache(counting(), 8).unwrap();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(f.evaluate(&p).unwrap(), p * 2.0);
        assert_eq!(f.evaluate(&p).unwrap(), p * 2.0);
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), 1);
        let stats = f.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_negative_zero_shares_key() {
        let f = cache(counting(), 8).unwrap();
        f.evaluate(&Vec3::new(0.0, 1.0, 0.0)).unwrap();
        f.evaluate(&Vec3::new(-0.0, 1.0, -0.0)).unwrap();
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let f = cache(counting(), 2).unwrap();
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);
        let c = Vec3::new(3.0, 0.0, 0.0);
        f.evaluate(&a).unwrap();
        f.evaluate(&b).unwrap();
        f.evaluate(&a).unwrap(); // a is now newer than b
        f.evaluate(&c).unwrap(); // evicts b
        assert_eq!(f.stats().entries, 2);
        f.evaluate(&a).unwrap();
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), 3);
        f.evaluate(&b).unwrap();
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_eviction_order_at_large_capacity() {
        let f = cache(counting(), 1000).unwrap();
        let at = |i: usize| Vec3::new(i as f64, 0.0, 0.0);
        for i in 0..1000 {
            f.evaluate(&at(i)).unwrap();
        }
        // refresh the even half, then push 500 new locations through
        for i in (0..1000).step_by(2) {
            f.evaluate(&at(i)).unwrap();
        }
        for i in 1000..1500 {
            f.evaluate(&at(i)).unwrap();
        }
        let calls = f.inner().calls.load(Ordering::SeqCst);
        for i in (0..1000).step_by(2) {
            f.evaluate(&at(i)).unwrap();
        }
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), calls, "refreshed entries survive");
        f.evaluate(&at(1)).unwrap();
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), calls + 1, "stale entries evicted");
        assert_eq!(f.stats().entries, 1000);
    }

    #[test]
    fn test_repeated_hits_keep_order_queue_bounded() {
        let f = cache(counting(), 4).unwrap();
        let p = Vec3::new(1.0, 2.0, 3.0);
        for _ in 0..10_000 {
            f.evaluate(&p).unwrap();
        }
        let queued = f.values.recency.lock().order.len();
        assert!(queued <= f.values.compaction_threshold() + 1, "queue length {queued}");
        assert_eq!(f.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_access_matches_direct_field() {
        let dipole = Dipole::earth(0.25).unwrap();
        let f = cache(dipole, 64).unwrap();
        // 200 locations shared between 8 threads, each walking them in its own order
        let points: Vec<Vec3> = (0..200)
            .map(|i| {
                let t = i as f64;
                Vec3::new(3.0 + (0.7 * t).sin(), 4.0 * (0.3 * t).cos(), -2.0 + 0.02 * t)
            })
            .collect();
        std::thread::scope(|scope| {
            for worker in 0..8usize {
                let (f, points) = (&f, &points);
                scope.spawn(move || {
                    for step in 0..5000usize {
                        let p = &points[(step * (worker + 1) + 7 * worker) % points.len()];
                        assert_eq!(f.evaluate(p).unwrap(), dipole.evaluate(p).unwrap());
                        if step % 3 == 0 {
                            assert_eq!(f.differentiate(p).unwrap(), dipole.differentiate(p).unwrap());
                        }
                        assert!(f.stats().entries <= 64);
                    }
                });
            }
        });
        let stats = f.stats();
        assert_eq!(stats.hits + stats.misses, 8 * 5000);
        assert!(stats.entries <= 64);
        assert!(f.differential_stats().entries <= 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(cache(counting(), 0).err().unwrap().is_configuration());
    }

    #[test]
    fn test_differentials_cached_separately() {
        let f = cache(identity(), 4).unwrap();
        let p = Vec3::new(0.5, 0.5, 0.5);
        let d1 = f.differentiate(&p).unwrap();
        let d2 = f.differentiate(&p).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(f.differential_stats().hits, 1);
        assert_eq!(f.stats().entries, 0);
        f.clear();
        assert_eq!(f.differential_stats().entries, 0);
    }
}
