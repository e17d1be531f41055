// ============================================================================
// Pool Module
// Decimal interning pools and the process-wide shared pool handle
// ============================================================================
//
// Every completed top-level computation passes its result through the
// shared pool before returning it. The default policy is CachingDecimalPool;
// callers who do not want the canonicalization overhead can install
// NoOpDecimalPool (or any custom DecimalPool implementation) process-wide.

mod decimal_pool;

pub use decimal_pool::{CachingDecimalPool, DecimalPool, NoOpDecimalPool};

use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

static SHARED_POOL: LazyLock<RwLock<Arc<dyn DecimalPool>>> =
    LazyLock::new(|| RwLock::new(Arc::new(CachingDecimalPool::new()) as Arc<dyn DecimalPool>));

/// Get the process-wide pool used by all chains and expressions.
pub fn shared_pool() -> Arc<dyn DecimalPool> {
    SHARED_POOL.read().clone()
}

/// Install a pool process-wide. `None` installs [`NoOpDecimalPool`],
/// disabling canonicalization entirely.
///
/// This is an administrative action: swapping the pool while computations
/// run on other threads is safe, but those computations may canonicalize
/// through either pool.
pub fn set_shared_pool(pool: Option<Arc<dyn DecimalPool>>) {
    let pool = pool.unwrap_or_else(|| Arc::new(NoOpDecimalPool) as Arc<dyn DecimalPool>);
    *SHARED_POOL.write() = pool;
}

/// Evict all entries from the currently-installed pool.
pub fn clear_shared_pool() {
    SHARED_POOL.read().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::cmp::Ordering;

    #[test]
    fn test_shared_pool_canonicalizes() {
        let v = dec!(42.50);
        let canonical = shared_pool().get(v);
        assert_eq!(canonical.cmp(&v), Ordering::Equal);
    }

    #[test]
    fn test_install_custom_pool() {
        let custom = Arc::new(CachingDecimalPool::new());
        set_shared_pool(Some(custom.clone()));
        shared_pool().get(dec!(7.25));
        assert!(custom.len() >= 1);

        // None falls back to the no-op pool
        set_shared_pool(None);
        let v = dec!(3.1400);
        assert_eq!(shared_pool().get(v).to_string(), "3.1400");

        // Restore the default for other tests
        set_shared_pool(Some(Arc::new(CachingDecimalPool::new())));
    }
}
