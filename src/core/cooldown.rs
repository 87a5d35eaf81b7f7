//! Per-symbol cooldown tracking.
//!
//! A symbol is marked after a failed or force-unwound trade so it does not
//! reappear in scan results straight away. State is process-local and
//! starts empty after a restart.
//!
//! The map is the only mutable state shared between concurrent scan and
//! position-lifecycle paths, so every access goes through one mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::core::types::current_time_ms;

/// Time source for cooldown windows.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_ms(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        current_time_ms()
    }
}

/// Manually advanced clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_minutes(&self, minutes: u64) {
        self.advance_ms(minutes * 60_000);
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Symbol → last time it was marked.
pub struct CooldownManager {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<Arc<str>, u64>>,
}

impl CooldownManager {
    /// Create a manager backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a manager with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A poisoned lock only means another thread panicked mid-update of a
    /// plain timestamp map; the data is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Arc<str>, u64>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[inline]
    fn window_ms(cooldown_minutes: u64) -> u64 {
        cooldown_minutes.saturating_mul(60_000)
    }

    /// True while `now - last_marked < cooldown_minutes`.
    ///
    /// An expired entry is evicted as part of the check.
    pub fn is_in_cooldown(&self, symbol: &str, cooldown_minutes: u64) -> bool {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        let Some(&marked_at) = entries.get(symbol) else {
            return false;
        };
        if now.saturating_sub(marked_at) < Self::window_ms(cooldown_minutes) {
            true
        } else {
            entries.remove(symbol);
            debug!(symbol = symbol, "[COOLDOWN] Expired");
            false
        }
    }

    /// Start (or restart) the cooldown window for `symbol`.
    pub fn mark(&self, symbol: &str) {
        let now = self.clock.now_ms();
        self.lock().insert(Arc::from(symbol), now);
        debug!(symbol = symbol, marked_at_ms = now, "[COOLDOWN] Marked");
    }

    /// Remove any cooldown for `symbol` unconditionally.
    pub fn clear(&self, symbol: &str) -> bool {
        let removed = self.lock().remove(symbol).is_some();
        if removed {
            debug!(symbol = symbol, "[COOLDOWN] Cleared");
        }
        removed
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn cleanup_expired(&self, cooldown_minutes: u64) -> usize {
        let now = self.clock.now_ms();
        let window = Self::window_ms(cooldown_minutes);
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, marked_at| now.saturating_sub(*marked_at) < window);
        before - entries.len()
    }

    /// Number of tracked entries (expired ones included until evicted)
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for CooldownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CooldownManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownManager")
            .field("entries", &self.len())
            .finish()
    }
}
