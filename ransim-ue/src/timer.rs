//! UE Timer Management
//!
//! Timers are allocated from a [`TimerManager`] owned by one entity. Each
//! carries an opaque context telling its owner what to do on expiry.
//! Nothing is pushed: the owner polls [`TimerManager::check_expired`], which
//! hands out each expired timer exactly once and forgets it.
//!
//! # NAS Timer Definitions (3GPP TS 24.501)
//!
//! - T3510: Registration procedure timer
//! - T3512: Periodic registration update timer (value from Registration Accept)
//! - T3580: PDU session establishment timer

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

// ============================================================================
// NAS Timer Constants (3GPP TS 24.501)
// ============================================================================

/// Timer code for T3510 (Registration procedure)
pub const TIMER_T3510: u16 = 3510;
/// Timer code for T3512 (Periodic registration update)
pub const TIMER_T3512: u16 = 3512;
/// Timer code for T3580 (PDU session establishment)
pub const TIMER_T3580: u16 = 3580;

/// Default T3510 interval: 15 seconds
pub const DEFAULT_T3510_INTERVAL: u32 = 15;
/// Default T3580 interval: 16 seconds
pub const DEFAULT_T3580_INTERVAL: u32 = 16;

/// Registration Request transmissions before giving up
pub const MAX_T3510_RETRIES: u32 = 5;
/// PDU Session Establishment Request transmissions before giving up
pub const MAX_T3580_RETRIES: u32 = 5;

/// Identifier handed out by [`TimerManager::allocate`]
pub type TimerId = u64;

// ============================================================================
// GPRS Timer 3
// ============================================================================

/// Unit field of a GPRS Timer 3 IE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GprsTimer3Unit {
    MultiplesOf10Min,
    MultiplesOf1Hour,
    MultiplesOf10Hour,
    MultiplesOf2Sec,
    MultiplesOf30Sec,
    MultiplesOf1Min,
    MultiplesOf320Hour,
    Deactivated,
}

impl GprsTimer3Unit {
    /// Unit from the 3-bit field (TS 24.008 10.5.7.4a).
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => GprsTimer3Unit::MultiplesOf10Min,
            1 => GprsTimer3Unit::MultiplesOf1Hour,
            2 => GprsTimer3Unit::MultiplesOf10Hour,
            3 => GprsTimer3Unit::MultiplesOf2Sec,
            4 => GprsTimer3Unit::MultiplesOf30Sec,
            5 => GprsTimer3Unit::MultiplesOf1Min,
            6 => GprsTimer3Unit::MultiplesOf320Hour,
            _ => GprsTimer3Unit::Deactivated,
        }
    }

    fn seconds_per_unit(self) -> u32 {
        match self {
            GprsTimer3Unit::MultiplesOf10Min => 600,
            GprsTimer3Unit::MultiplesOf1Hour => 3600,
            GprsTimer3Unit::MultiplesOf10Hour => 36_000,
            GprsTimer3Unit::MultiplesOf2Sec => 2,
            GprsTimer3Unit::MultiplesOf30Sec => 30,
            GprsTimer3Unit::MultiplesOf1Min => 60,
            GprsTimer3Unit::MultiplesOf320Hour => 1_152_000,
            GprsTimer3Unit::Deactivated => 0,
        }
    }
}

/// GPRS Timer 3 value: unit in bits 8-6, value in bits 5-1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GprsTimer3 {
    pub unit: GprsTimer3Unit,
    pub timer_value: u8,
}

impl GprsTimer3 {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            unit: GprsTimer3Unit::from_bits(byte >> 5),
            timer_value: byte & 0x1F,
        }
    }

    /// Interval in seconds, `None` when deactivated.
    pub fn to_seconds(&self) -> Option<u32> {
        match self.unit {
            GprsTimer3Unit::Deactivated => None,
            unit => Some(unit.seconds_per_unit() * u32::from(self.timer_value)),
        }
    }
}

// ============================================================================
// Timer
// ============================================================================

/// One timer owned by a [`TimerManager`].
///
/// Running iff it has a start instant; expired iff running and at least
/// `timeout` has elapsed since then (or it was force-expired).
#[derive(Debug, Clone)]
pub struct Timer<C> {
    id: TimerId,
    timeout: Duration,
    started_at: Option<Instant>,
    forced: bool,
    context: C,
}

impl<C> Timer<C> {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.started_at {
            Some(started) => self.forced || now.saturating_duration_since(started) >= self.timeout,
            None => false,
        }
    }

    /// Time left before expiry, zero once expired or when stopped.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(_) if self.forced => Duration::ZERO,
            Some(started) => self.timeout.saturating_sub(now.saturating_duration_since(started)),
            None => Duration::ZERO,
        }
    }
}

impl<C: fmt::Debug> fmt::Display for Timer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}#{}: rem[{}ms] int[{}ms]",
            self.context,
            self.id,
            self.remaining(Instant::now()).as_millis(),
            self.timeout.as_millis()
        )
    }
}

// ============================================================================
// Timer Manager
// ============================================================================

/// Allocates and polls the timers of one entity.
#[derive(Debug)]
pub struct TimerManager<C> {
    timers: BTreeMap<TimerId, Timer<C>>,
    next_id: TimerId,
}

impl<C> Default for TimerManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerManager<C> {
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Creates a stopped timer. Ids start at 1 and are never reused until
    /// [`clear`](Self::clear).
    pub fn allocate(&mut self, timeout: Duration, context: C) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                id,
                timeout,
                started_at: None,
                forced: false,
                context,
            },
        );
        id
    }

    /// (Re)starts a timer from now. `false` for an unknown id.
    pub fn start(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) => {
                timer.started_at = Some(Instant::now());
                timer.forced = false;
                true
            }
            None => false,
        }
    }

    /// Stops a timer without removing it. `false` for an unknown id.
    pub fn stop(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) => {
                timer.started_at = None;
                timer.forced = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer<C>> {
        self.timers.get(&id)
    }

    /// Marks a timer as expired right away, starting it if needed.
    pub fn expire(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) => {
                timer.started_at.get_or_insert_with(Instant::now);
                timer.forced = true;
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.timers.get(&id).is_some_and(Timer::is_running)
    }

    pub fn running(&self) -> Vec<&Timer<C>> {
        self.timers.values().filter(|t| t.is_running()).collect()
    }

    /// Removes and returns every expired timer, in id order.
    pub fn check_expired(&mut self) -> Vec<Timer<C>> {
        let now = Instant::now();
        let expired: Vec<TimerId> = self
            .timers
            .values()
            .filter(|t| t.is_expired(now))
            .map(Timer::id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.timers.remove(&id))
            .collect()
    }

    /// Drops a timer whether or not it is running.
    pub fn remove(&mut self, id: TimerId) -> Option<Timer<C>> {
        self.timers.remove(&id)
    }

    /// Drops every timer and restarts ids at 1.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
