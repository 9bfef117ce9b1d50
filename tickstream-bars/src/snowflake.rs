use parking_lot::Mutex;
use std::{
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

/// Custom epoch (ms since Unix epoch) the generator measures `now_ms` against.
pub const EPOCH_MS: i64 = 1_288_834_974_657;

const MACHINE_ID_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const MAX_MACHINE_ID: i64 = (1 << MACHINE_ID_BITS) - 1;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_SHIFT: u32 = MACHINE_ID_BITS + SEQUENCE_BITS;
const MACHINE_ID_SHIFT: u32 = SEQUENCE_BITS;

#[derive(Debug)]
struct State {
    last_timestamp_ms: i64,
    sequence: i64,
}

/// Monotonic 64-bit id allocator for volume bars: `((now_ms - epoch) << 22) | (machine_id << 12)
/// | sequence`.
///
/// `sequence` wraps within a millisecond and busy-waits for the next millisecond boundary on
/// overflow. `last_timestamp_ms` and `sequence` are mutated together under one lock - the single-
/// writer discipline the concurrency model requires, since two mutators could otherwise each
/// observe the same `now_ms` and hand out a colliding id.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    machine_id: i64,
    state: Mutex<State>,
}

impl SnowflakeGenerator {
    pub fn new(machine_id: i64) -> Self {
        assert!(
            (0..=MAX_MACHINE_ID).contains(&machine_id),
            "machine_id must fit in {MACHINE_ID_BITS} bits"
        );

        Self {
            machine_id,
            state: Mutex::new(State {
                last_timestamp_ms: -1,
                sequence: 0,
            }),
        }
    }

    /// Allocate the next monotonically increasing id.
    pub fn next_id(&self) -> i64 {
        let mut state = self.state.lock();
        let mut now_ms = current_millis();

        if now_ms < state.last_timestamp_ms {
            // Clock moved backwards; stall until it catches back up rather than risk a
            // duplicate id.
            now_ms = wait_for_millis(state.last_timestamp_ms);
        }

        if now_ms == state.last_timestamp_ms {
            state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
            if state.sequence == 0 {
                now_ms = wait_for_millis(now_ms);
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp_ms = now_ms;

        ((now_ms - EPOCH_MS) << TIMESTAMP_SHIFT)
            | (self.machine_id << MACHINE_ID_SHIFT)
            | state.sequence
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as i64
}

fn wait_for_millis(after_ms: i64) -> i64 {
    loop {
        let now = current_millis();
        if now > after_ms {
            return now;
        }
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_is_monotonic() {
        let generator = SnowflakeGenerator::new(1);
        let mut previous = generator.next_id();
        for _ in 0..1_000 {
            let id = generator.next_id();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_sequence_wraps_within_same_millisecond() {
        let generator = SnowflakeGenerator::new(1);
        let ids: Vec<i64> = (0..(MAX_SEQUENCE + 5)).map(|_| generator.next_id()).collect();
        assert!(ids.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    #[should_panic]
    fn test_rejects_machine_id_out_of_range() {
        SnowflakeGenerator::new(MAX_MACHINE_ID + 1);
    }
}
