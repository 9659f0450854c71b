use crate::bemt::BemtResult;
use crate::geometry::{Environment, OperatingPoint, RotorGeometry, SolverConfig};
use crate::utils::math::fnv1a64;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-field quantization steps (spec §5 "Quantization steps for each
/// field are configurable and chosen so that tiny optimizer-induced jitter
/// collapses into a single key").
#[derive(Debug, Clone, Copy)]
pub struct QuantizeConfig {
    pub length_step: f64,
    pub angle_step_rad: f64,
    pub speed_step: f64,
    pub density_step: f64,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self { length_step: 1.0e-5, angle_step_rad: 1.0e-5, speed_step: 1.0e-4, density_step: 1.0e-5 }
    }
}

fn quantize(value: f64, step: f64) -> i64 {
    if step <= 0.0 || !value.is_finite() {
        return value.to_bits() as i64;
    }
    (value / step).round() as i64
}

/// Two independent 64-bit hashes of the same quantized fingerprint string
/// (spec §5 "an LRU over 64-bit hashes (two independent hashes for
/// collision resistance)"). `secondary` salts the byte stream rather than
/// reusing `primary`'s digest, so the two keys do not collide together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub primary: u64,
    pub secondary: u64,
}

fn fingerprint_of(text: &str) -> Fingerprint {
    let primary = fnv1a64(text.as_bytes());
    let mut salted = Vec::with_capacity(text.len() + 8);
    salted.extend_from_slice(b"salt2::");
    salted.extend_from_slice(text.as_bytes());
    let secondary = fnv1a64(&salted);
    Fingerprint { primary, secondary }
}

/// Build the canonical, quantized fingerprint for one BEMT solve: station
/// geometry, environment, operating point, solver configuration, and a
/// `polar_id` string (spec §5 "An optional evaluation cache memoizes hover
/// and forward BEMT results keyed by a quantized fingerprint of inputs").
pub fn bemt_fingerprint(
    geometry: &RotorGeometry,
    environment: &Environment,
    op: &OperatingPoint,
    config: &SolverConfig,
    polar_id: &str,
    quantize_config: &QuantizeConfig,
) -> Fingerprint {
    let q = quantize_config;
    let mut s = String::new();
    s.push_str(&format!("hub={};R={};B={};tip={:?};", quantize(geometry.hub_radius, q.length_step), quantize(geometry.radius, q.length_step), geometry.blade_count, geometry.tip_loss));
    for st in &geometry.stations {
        s.push_str(&format!(
            "[r={};c={};tw={};af={}]",
            quantize(st.r, q.length_step),
            quantize(st.chord, q.length_step),
            quantize(st.twist_rad, q.angle_step_rad),
            st.airfoil_id
        ));
    }
    s.push_str(&format!(
        ";rho={};mu={};a={};",
        quantize(environment.rho, q.density_step),
        quantize(environment.mu, q.density_step),
        quantize(environment.speed_of_sound, q.speed_step)
    ));
    s.push_str(&format!(
        "mode={:?};Vinf={};omega={};coll={};Ttgt={};phi0={};",
        op.mode,
        quantize(op.freestream_speed, q.speed_step),
        quantize(op.omega, q.speed_step),
        quantize(op.collective_offset_rad, q.angle_step_rad),
        op.target_thrust_n.map_or(i64::MIN, |t| quantize(t, q.speed_step)),
        quantize(op.inflow_angle_rad, q.angle_step_rad)
    ));
    s.push_str(&format!(
        "maxiterI={};tolI={};relax={};maxiterT={};tolT={};collmin={};collmax={};npsi={};maxmach={};polar={}",
        config.max_iter_inflow,
        quantize(config.tol_inflow, q.speed_step),
        quantize(config.relaxation, q.angle_step_rad),
        config.max_iter_trim,
        quantize(config.tol_trim_n, q.speed_step),
        quantize(config.collective_min_rad, q.angle_step_rad),
        quantize(config.collective_max_rad, q.angle_step_rad),
        config.n_psi,
        quantize(config.max_mach, q.speed_step),
        polar_id
    ));
    fingerprint_of(&s)
}

struct Node {
    key: Fingerprint,
    value: BemtResult,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An LRU cache over `Fingerprint` keys, backed by a slab of nodes and an
/// intrusive doubly linked list of indices rather than raw pointers (spec
/// §9 "Cache graph": "index-and-arena pattern...rather than raw
/// back-pointers"). Eviction is strictly least-recently-used.
pub struct EvalCache {
    capacity: usize,
    index: HashMap<Fingerprint, usize>,
    slab: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl EvalCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), index: HashMap::new(), slab: Vec::new(), free: Vec::new(), head: None, tail: None }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.slab[idx].as_ref().unwrap();
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.slab[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slab[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.slab[idx].as_mut().unwrap();
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            self.slab[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &Fingerprint) -> Option<&BemtResult> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        self.slab[idx].as_ref().map(|n| &n.value)
    }

    /// Insert or overwrite `key`, evicting the least-recently-used entry
    /// if at capacity (spec §8 property 10, "LRU invariant").
    pub fn put(&mut self, key: Fingerprint, value: BemtResult) {
        if let Some(&idx) = self.index.get(&key) {
            self.slab[idx].as_mut().unwrap().value = value;
            self.touch(idx);
            return;
        }

        if self.index.len() >= self.capacity {
            if let Some(tail) = self.tail {
                let evicted_key = self.slab[tail].as_ref().unwrap().key;
                self.detach(tail);
                self.index.remove(&evicted_key);
                self.slab[tail] = None;
                self.free.push(tail);
            }
        }

        let idx = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slab.push(None);
                self.slab.len() - 1
            }
        };
        self.slab[idx] = Some(Node { key, value, prev: None, next: None });
        self.push_front(idx);
        self.index.insert(key, idx);
    }
}

/// A single-lock-guarded cache shared across a work-stealing pool (spec §5
/// "When shared across threads, the cache acquires a single lock around
/// lookup and insertion; reads never leak unfinished values").
pub struct SharedEvalCache(Mutex<EvalCache>);

impl SharedEvalCache {
    pub fn new(capacity: usize) -> Self {
        Self(Mutex::new(EvalCache::new(capacity)))
    }

    /// Holds the lock across the whole miss-compute-insert sequence so two
    /// threads racing on the same key never both run `compute` (spec §5
    /// "a single lock around lookup and insertion").
    pub fn get_or_insert_with(&self, key: Fingerprint, compute: impl FnOnce() -> BemtResult) -> BemtResult {
        let mut guard = self.0.lock().expect("eval cache mutex poisoned");
        if let Some(hit) = guard.get(&key) {
            return hit.clone();
        }
        let value = compute();
        guard.put(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.0.lock().expect("eval cache mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bemt::BemtStatus;

    fn dummy(thrust: f64) -> BemtResult {
        let mut r = BemtResult::unset(BemtStatus::Ok, 0.0);
        r.thrust_n = thrust;
        r
    }

    fn key(n: u64) -> Fingerprint {
        fingerprint_of(&format!("key-{}", n))
    }

    #[test]
    fn lru_invariant_evicts_least_recently_used() {
        let mut cache = EvalCache::new(2);
        cache.put(key(1), dummy(1.0));
        cache.put(key(2), dummy(2.0));
        cache.get(&key(1));
        cache.put(key(3), dummy(3.0));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn overwriting_existing_key_does_not_grow_cache() {
        let mut cache = EvalCache::new(2);
        cache.put(key(1), dummy(1.0));
        cache.put(key(1), dummy(2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)).unwrap().thrust_n, 2.0);
    }

    #[test]
    fn distinct_fingerprints_have_distinct_primary_and_secondary() {
        let a = fingerprint_of("aaa");
        let b = fingerprint_of("aab");
        assert_ne!(a.primary, b.primary);
        assert_ne!(a.secondary, b.secondary);
        assert_ne!(a.primary, a.secondary);
    }

    #[test]
    fn shared_cache_computes_once_per_key() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let shared = SharedEvalCache::new(4);
        let calls = AtomicUsize::new(0);
        let k = key(42);
        let v1 = shared.get_or_insert_with(k, || {
            calls.fetch_add(1, Ordering::SeqCst);
            dummy(7.0)
        });
        let v2 = shared.get_or_insert_with(k, || {
            calls.fetch_add(1, Ordering::SeqCst);
            dummy(9.0)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(v1.thrust_n, v2.thrust_n);
    }
}
