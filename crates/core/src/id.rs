//! Strongly-typed identifiers and identifier allocation.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Numeric identifier of a user (actor identity).
///
/// Allocation is owned by the caller (see [`IdGenerator`]); the credential
/// layer only signs and verifies it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("UserId: {e}")))?;
        Ok(Self(value))
    }
}

/// Source of process-wide unique user identifiers.
///
/// Treated as infallible: implementations must always hand out an id.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> UserId;
}

const TIME_UNIT_MS: i64 = 10;
const BITS_SEQUENCE: u32 = 8;
const BITS_MACHINE: u32 = 16;
const BITS_TIME: u32 = 39;
const SEQUENCE_MASK: u16 = (1 << BITS_SEQUENCE) - 1;
const TIME_MASK: u64 = (1 << BITS_TIME) - 1;

/// 2024-01-01T00:00:00Z in Unix milliseconds.
const DEFAULT_EPOCH_MS: i64 = 1_704_067_200_000;

#[derive(Debug, Default)]
struct TickState {
    elapsed: u64,
    sequence: u16,
}

/// Time-ordered 64-bit id generator.
///
/// Layout (high to low): 39 bits of 10 ms ticks since the epoch, 8 bits of
/// sequence within a tick, 16 bits of machine id. Ids are strictly increasing
/// within one instance; when a tick's sequence is exhausted the generator
/// moves on to the next tick instead of sleeping.
#[derive(Debug)]
pub struct TimeOrderedIdGenerator {
    epoch_ms: i64,
    machine_id: u16,
    state: Mutex<TickState>,
}

impl TimeOrderedIdGenerator {
    pub fn new(machine_id: u16) -> Self {
        Self::with_epoch(machine_id, DEFAULT_EPOCH_MS)
    }

    /// Create a generator counting ticks from `epoch_ms` (Unix milliseconds).
    pub fn with_epoch(machine_id: u16, epoch_ms: i64) -> Self {
        Self {
            epoch_ms,
            machine_id,
            state: Mutex::new(TickState::default()),
        }
    }

    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    fn ticks_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed_ms = (now.timestamp_millis() - self.epoch_ms).max(0);
        (elapsed_ms / TIME_UNIT_MS) as u64
    }

    fn compose(&self, elapsed: u64, sequence: u16) -> UserId {
        let id = ((elapsed & TIME_MASK) << (BITS_SEQUENCE + BITS_MACHINE))
            | (u64::from(sequence) << BITS_MACHINE)
            | u64::from(self.machine_id);
        UserId(id)
    }

    /// Allocate the next id as of `now`.
    pub fn next_id_at(&self, now: DateTime<Utc>) -> UserId {
        let current = self.ticks_at(now);
        let mut state = self.state.lock();

        if state.elapsed < current {
            state.elapsed = current;
            state.sequence = 0;
        } else {
            // Clock did not advance (or went backwards): stay monotonic.
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                state.elapsed += 1;
            }
        }

        self.compose(state.elapsed, state.sequence)
    }
}

impl Default for TimeOrderedIdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator for TimeOrderedIdGenerator {
    fn next_id(&self) -> UserId {
        self.next_id_at(Utc::now())
    }
}
