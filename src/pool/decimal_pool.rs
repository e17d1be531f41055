// ============================================================================
// Decimal Pool
// Value-interning cache for canonical decimal representations
// ============================================================================

use crossbeam_skiplist::SkipMap;
use rust_decimal::Decimal;

/// A value-interning cache mapping a decimal value to a canonical
/// representation. Implementations decide, per value, whether caching is
/// safe and beneficial.
///
/// Contract: the returned value always compares numerically equal to the
/// input (`pool.get(v).cmp(&v) == Ordering::Equal`), but its scale may
/// differ. Trailing fractional zeros are typically stripped, so a
/// representation-sensitive comparison such as `to_string()` equality is
/// not guaranteed.
///
/// Implementations must support concurrent `get` calls from independent
/// chains running on separate threads.
pub trait DecimalPool: Send + Sync {
    /// Return the canonical representation for `value`.
    fn get(&self, value: Decimal) -> Decimal {
        value
    }

    /// Evict all cached entries.
    fn clear(&self) {}
}

/// Pass-through pool that caches nothing. Use when the canonicalization
/// overhead is unwanted.
pub struct NoOpDecimalPool;

impl DecimalPool for NoOpDecimalPool {}

/// Finest scale (fractional digits after normalization) still worth caching.
const MAX_CACHED_SCALE: u32 = 3;

/// Default interning pool.
///
/// A value is cached only when, after stripping trailing zeros, it has at
/// most three fractional digits and lies within [-10000, 10000]. Values at
/// the bounds resolve to preallocated singletons; everything outside the
/// range or finer than the scale cutoff is returned normalized but
/// uncached, so unbounded-magnitude workloads cannot grow the cache without
/// limit.
///
/// The backing store is a lock-free skip map: insertion is atomic per key,
/// so a race between two chains canonicalizing the same value can never
/// produce two distinct canonical entries.
pub struct CachingDecimalPool {
    cache: SkipMap<Decimal, Decimal>,
    upper_bound: Decimal,
    lower_bound: Decimal,
}

impl CachingDecimalPool {
    pub fn new() -> Self {
        Self {
            cache: SkipMap::new(),
            upper_bound: Decimal::from(10_000),
            lower_bound: Decimal::from(-10_000),
        }
    }

    /// Number of distinct values currently interned.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for CachingDecimalPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DecimalPool for CachingDecimalPool {
    fn get(&self, value: Decimal) -> Decimal {
        let value = value.normalize();

        // Too many distinct values at finer scales for caching to pay off
        if value.scale() > MAX_CACHED_SCALE {
            return value;
        }

        if value == self.upper_bound {
            return self.upper_bound;
        }
        if value == self.lower_bound {
            return self.lower_bound;
        }
        if value > self.upper_bound || value < self.lower_bound {
            return value;
        }

        *self.cache.get_or_insert(value, value).value()
    }

    fn clear(&self) {
        while self.cache.pop_front().is_some() {}
    }
}
