use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    hash::Hash,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::debug;

/// Intervalo mínimo entre barridos pasivos de entradas expiradas
const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Entrada de cache con expiración absoluta
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Estadísticas del cache, expuestas por la API
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
}

/// Cache acotado con TTL por entrada.
///
/// Al llenarse, `set` desaloja la entrada con la expiración más temprana
/// (no LRU). `get` elimina entradas vencidas al leerlas y dispara un
/// barrido completo cuando pasó suficiente tiempo desde el último,
/// independientemente de la clave consultada. Los shards de DashMap dan
/// last-writer-wins sin transacciones entre get y set.
#[derive(Debug)]
pub struct TtlCache<K: Clone + Eq + Hash, V> {
    data: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    max_size: usize,
    last_sweep: Arc<Mutex<Instant>>,
    sweep_interval: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl_seconds: u64, max_size: usize) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
            max_size,
            last_sweep: Arc::new(Mutex::new(Instant::now())),
            sweep_interval: SWEEP_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.maybe_sweep();

        if let Some(entry) = self.data.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.data.remove(key);
                None
            } else {
                Some(entry.value.clone())
            }
        } else {
            None
        }
    }

    pub fn set(&self, key: K, value: V) {
        // Al estar lleno se desaloja la entrada que expira antes, incluso
        // cuando la clave entrante ya existe
        if self.data.len() >= self.max_size {
            self.evict_earliest();
        }

        self.data.insert(key, CacheEntry::new(value, self.ttl));
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.data.len(),
            max_size: self.max_size,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Limpia entradas expiradas y retorna cuántas se removieron
    pub fn cleanup_expired(&self) -> usize {
        let expired_keys: Vec<K> = self
            .data
            .iter()
            .filter_map(|entry| {
                if entry.value().is_expired() {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect();

        let mut removed = 0;
        for key in expired_keys {
            if self.data.remove(&key).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Limpiadas {} entradas expiradas del cache", removed);
        }

        removed
    }

    /// Desaloja la entrada con la expiración más temprana
    fn evict_earliest(&self) {
        let earliest = self
            .data
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = earliest {
            self.data.remove(&key);
        }
    }

    /// Barrido pasivo: solo cuando pasó `sweep_interval` desde el anterior
    fn maybe_sweep(&self) {
        {
            let mut last_sweep = self.last_sweep.lock();
            if last_sweep.elapsed() <= self.sweep_interval {
                return;
            }
            *last_sweep = Instant::now();
        }

        self.cleanup_expired();
    }
}

impl<K, V> Clone for TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            ttl: self.ttl,
            max_size: self.max_size,
            last_sweep: self.last_sweep.clone(),
            sweep_interval: self.sweep_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_creation_and_stats() {
        let cache: TtlCache<String, String> = TtlCache::new(3600, 100);
        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.ttl_seconds, 3600);
    }

    #[test]
    fn test_set_and_get() {
        let cache = TtlCache::new(3600, 100);
        cache.set("key".to_string(), "value".to_string());

        assert_eq!(cache.get(&"key".to_string()), Some("value".to_string()));
        assert_eq!(cache.get(&"missing".to_string()), None);
    }

    #[test]
    fn test_clear() {
        let cache = TtlCache::new(3600, 100);
        cache.set("key".to_string(), 1u32);
        cache.clear();

        assert_eq!(cache.get(&"key".to_string()), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let cache = TtlCache::new(0, 100);
        cache.set("key".to_string(), 1u32);

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.get(&"key".to_string()), None);
        // Removida físicamente, no solo oculta
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_capacity_evicts_earliest_expiring_entry() {
        let cache = TtlCache::new(3600, 2);

        cache.set("first".to_string(), 1u32);
        std::thread::sleep(Duration::from_millis(5));
        cache.set("second".to_string(), 2u32);
        std::thread::sleep(Duration::from_millis(5));
        cache.set("third".to_string(), 3u32);

        assert_eq!(cache.stats().size, 2);
        assert_eq!(cache.get(&"first".to_string()), None);
        assert_eq!(cache.get(&"second".to_string()), Some(2));
        assert_eq!(cache.get(&"third".to_string()), Some(3));
    }

    #[test]
    fn test_passive_sweep_removes_unrelated_expired_entries() {
        let cache = TtlCache::new(0, 100).with_sweep_interval(Duration::ZERO);
        cache.set("a".to_string(), 1u32);
        cache.set("b".to_string(), 2u32);

        std::thread::sleep(Duration::from_millis(10));

        // Consultar una clave ajena dispara el barrido completo
        assert_eq!(cache.get(&"zzz".to_string()), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_cleanup_expired_counts_removals() {
        let cache = TtlCache::new(0, 100);
        cache.set("a".to_string(), 1u32);
        cache.set("b".to_string(), 2u32);

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.stats().size, 0);
    }
}
