use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-host politeness and backoff state
///
/// Created lazily on first access to a host; lives for the process.
#[derive(Debug, Clone)]
pub struct HostPoliteness {
    /// The reserved time of the most recently scheduled request to this host
    pub last_request_at: Option<Instant>,

    /// Current backoff delay applied after fetch-layer infrastructure errors
    pub backoff_level: Duration,

    /// Consecutive infrastructure errors since the last success
    pub consecutive_cache_errors: u32,
}

/// Global per-host politeness tracker shared by every worker
///
/// Politeness is enforced per host, across the whole pool: a host never
/// receives two requests spaced closer than the minimum interval, no matter
/// which workers carry URLs for it. `acquire` serializes concurrent callers
/// for one host into a total order by reserving request slots under a single
/// lock.
pub struct PolitenessTracker {
    hosts: Mutex<HashMap<String, HostPoliteness>>,
    min_delay: Duration,
    backoff_floor: Duration,
    backoff_cap: Duration,
}

impl PolitenessTracker {
    /// Creates a tracker
    ///
    /// # Arguments
    ///
    /// * `min_delay` - Minimum spacing between requests to the same host
    /// * `backoff_floor` - Starting backoff delay after an infrastructure error
    /// * `backoff_cap` - Upper bound on the backoff delay
    pub fn new(min_delay: Duration, backoff_floor: Duration, backoff_cap: Duration) -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
            min_delay,
            backoff_floor,
            backoff_cap,
        }
    }

    /// Reserves the next request slot for a host and returns the wait
    ///
    /// The returned duration is computed, not executed: the caller must
    /// suspend for it before issuing the request. The host's
    /// `last_request_at` advances to `now + wait` inside the lock, so
    /// concurrent acquirers each receive a later slot, spaced at least
    /// `min_delay` apart.
    pub fn acquire(&self, host: &str) -> Duration {
        let mut hosts = self.hosts.lock().unwrap();
        let state = hosts
            .entry(host.to_string())
            .or_insert_with(|| self.new_host_state());

        let now = Instant::now();
        let wait = match state.last_request_at {
            Some(last) => (last + self.min_delay).saturating_duration_since(now),
            None => Duration::ZERO,
        };

        state.last_request_at = Some(now + wait);
        wait
    }

    /// Records a fetch-layer infrastructure error and returns the backoff wait
    ///
    /// The caller suspends for the returned duration before retrying. The
    /// delay is the host's current backoff level plus random jitter of up to
    /// a quarter of the level, which desynchronizes workers retrying the same
    /// host; the stored level then doubles, capped at the configured maximum.
    /// Because jitter never exceeds 25% and the level doubles, consecutive
    /// pre-cap delays are strictly increasing.
    pub fn record_cache_error(&self, host: &str) -> Duration {
        let mut hosts = self.hosts.lock().unwrap();
        let state = hosts
            .entry(host.to_string())
            .or_insert_with(|| self.new_host_state());

        let level = state.backoff_level;
        state.backoff_level = (level * 2).min(self.backoff_cap);
        state.consecutive_cache_errors += 1;

        level + jitter(level)
    }

    /// Resets a host's backoff after a successful fetch
    pub fn record_success(&self, host: &str) {
        let mut hosts = self.hosts.lock().unwrap();
        if let Some(state) = hosts.get_mut(host) {
            state.backoff_level = self.backoff_floor;
            state.consecutive_cache_errors = 0;
        }
    }

    /// Snapshot of a host's state, if any requests have been scheduled for it
    pub fn host_state(&self, host: &str) -> Option<HostPoliteness> {
        self.hosts.lock().unwrap().get(host).cloned()
    }

    fn new_host_state(&self) -> HostPoliteness {
        HostPoliteness {
            last_request_at: None,
            backoff_level: self.backoff_floor,
            consecutive_cache_errors: 0,
        }
    }
}

/// Random additive jitter in `0..=base/4`
fn jitter(base: Duration) -> Duration {
    let quarter = (base.as_millis() / 4) as u64;
    if quarter == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=quarter))
}
