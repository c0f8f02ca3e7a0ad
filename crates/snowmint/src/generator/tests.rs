use crate::{
    DEFAULT_EPOCH, Error, GeneratorState, Poll, SnowflakeGenerator, SnowflakeId,
    SnowflakeOptions, SystemClock, TimeSource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread::scope;

const NOW: u64 = DEFAULT_EPOCH + 42;

struct FixedTime {
    millis: u64,
}

impl TimeSource for FixedTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
struct ManualTime {
    millis: AtomicU64,
}

impl ManualTime {
    fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Reads `before` for the first `switch_after` samples, `after` from then on.
struct SwitchTime {
    before: u64,
    after: u64,
    switch_after: usize,
    reads: AtomicUsize,
}

impl TimeSource for SwitchTime {
    fn current_millis(&self) -> u64 {
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.switch_after {
            self.before
        } else {
            self.after
        }
    }
}

/// Advances by one millisecond every `reads_per_tick` samples, so the readings
/// are strictly ordered by the sample that took them.
struct SteppingTime {
    start: u64,
    reads_per_tick: u64,
    reads: AtomicU64,
}

impl TimeSource for SteppingTime {
    fn current_millis(&self) -> u64 {
        self.start + self.reads.fetch_add(1, Ordering::SeqCst) / self.reads_per_tick
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = SnowflakeGenerator::new(FixedTime { millis: NOW });
    let options = SnowflakeOptions::default();

    let id1 = generator.next_id(&options).unwrap();
    let id2 = generator.next_id(&options).unwrap();
    let id3 = generator.next_id(&options).unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn sequence_resets_when_millisecond_advances() {
    let clock = ManualTime::new(NOW);
    let generator = SnowflakeGenerator::new(&clock);
    let options = SnowflakeOptions::default();

    for _ in 0..3 {
        generator.next_id(&options).unwrap();
    }
    clock.set(NOW + 1);

    let id = generator.next_id(&options).unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn initial_sequence_seeds_each_new_millisecond() {
    let clock = ManualTime::new(NOW);
    let generator = SnowflakeGenerator::new(&clock);
    let options = SnowflakeOptions::default().with_sequence(10);

    assert_eq!(generator.next_id(&options).unwrap().sequence(), 10);
    assert_eq!(generator.next_id(&options).unwrap().sequence(), 11);

    clock.set(NOW + 1);
    assert_eq!(generator.next_id(&options).unwrap().sequence(), 10);
}

#[test]
fn lower_initial_sequence_never_moves_backwards() {
    let generator = SnowflakeGenerator::new(FixedTime { millis: NOW });

    let ids: Vec<SnowflakeId> = (0..5)
        .map(|_| generator.next_id(&SnowflakeOptions::default()).unwrap())
        .collect();
    let last = ids[4];
    assert_eq!(last.sequence(), 4);

    let id = generator
        .next_id(&SnowflakeOptions::default().with_sequence(2))
        .unwrap();
    assert_eq!(id.sequence(), 5);
    assert!(id > last);
}

#[test]
fn wraparound_waits_for_next_millisecond() {
    const CALLS: usize = 4097;
    let generator = SnowflakeGenerator::new(SwitchTime {
        before: NOW,
        after: NOW + 1,
        switch_after: CALLS,
        reads: AtomicUsize::new(0),
    });
    let options = SnowflakeOptions::default();

    let ids: Vec<SnowflakeId> = (0..CALLS)
        .map(|_| generator.next_id(&options).unwrap())
        .collect();

    let first = ids[0];
    let last = ids[CALLS - 1];
    assert_eq!(first.timestamp(), 42);
    assert_eq!(first.sequence(), 0);
    assert_eq!(ids[CALLS - 2].timestamp(), 42);
    assert_eq!(ids[CALLS - 2].sequence(), 4095);
    assert!(last.timestamp() >= first.timestamp() + 1);
    assert_eq!(last.sequence(), 0);

    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(
        generator.state().unwrap(),
        GeneratorState {
            last_timestamp: NOW + 1,
            sequence: 0,
        }
    );
}

#[test]
fn poll_returns_pending_when_sequence_exhausted() {
    let exhausted = GeneratorState {
        last_timestamp: NOW,
        sequence: SnowflakeId::MAX_SEQUENCE,
    };
    let generator = SnowflakeGenerator::from_state(exhausted, FixedTime { millis: NOW });

    let status = generator.try_poll_id(&SnowflakeOptions::default()).unwrap();
    assert_eq!(status, Poll::Pending { yield_until: NOW + 1 });
    assert_eq!(generator.state().unwrap(), exhausted);
}

#[test]
fn poll_resumes_after_clock_advances() {
    let clock = ManualTime::new(NOW);
    let exhausted = GeneratorState {
        last_timestamp: NOW,
        sequence: SnowflakeId::MAX_SEQUENCE,
    };
    let generator = SnowflakeGenerator::from_state(exhausted, &clock);
    let options = SnowflakeOptions::default();

    assert!(matches!(
        generator.try_poll_id(&options).unwrap(),
        Poll::Pending { .. }
    ));

    clock.set(NOW + 1);
    match generator.try_poll_id(&options).unwrap() {
        Poll::Ready { id } => {
            assert_eq!(id.timestamp(), 43);
            assert_eq!(id.sequence(), 0);
        }
        Poll::Pending { yield_until } => panic!("unexpected pending until {yield_until}"),
    }
}

#[test]
fn clock_regression_is_rejected_without_mutating_state() {
    #[cfg(feature = "tracing")]
    init_tracing();

    let clock = ManualTime::new(NOW);
    let generator = SnowflakeGenerator::new(&clock);
    let options = SnowflakeOptions::default();

    generator.next_id(&options).unwrap();
    let before = generator.state().unwrap();

    clock.set(NOW - 5);
    assert_eq!(
        generator.next_id(&options),
        Err(Error::ClockRegression {
            last: NOW,
            now: NOW - 5,
        })
    );
    assert_eq!(
        generator.try_poll_id(&options),
        Err(Error::ClockRegression {
            last: NOW,
            now: NOW - 5,
        })
    );
    assert_eq!(generator.state().unwrap(), before);

    clock.set(NOW);
    assert_eq!(generator.next_id(&options).unwrap().sequence(), 1);
}

#[test]
fn invalid_options_are_rejected_before_state_changes() {
    let generator = SnowflakeGenerator::new(SystemClock);
    let now = SystemClock.current_millis();

    let cases = [
        SnowflakeOptions::default().with_node_id(-1),
        SnowflakeOptions::default().with_node_id(1024),
        SnowflakeOptions::default().with_epoch(-1),
        SnowflakeOptions::default().with_epoch((now + 1_000) as i64),
        SnowflakeOptions::default().with_sequence(4096),
    ];
    let errors: Vec<Error> = cases
        .iter()
        .map(|options| generator.next_id(options).unwrap_err())
        .collect();

    assert!(matches!(errors[0], Error::InvalidNodeId { node_id: -1 }));
    assert!(matches!(errors[1], Error::InvalidNodeId { node_id: 1024 }));
    assert!(matches!(errors[2], Error::InvalidEpoch { epoch: -1, .. }));
    assert!(matches!(errors[3], Error::InvalidEpoch { .. }));
    assert!(matches!(errors[4], Error::InvalidSequence { sequence: 4096 }));
    assert_eq!(generator.state().unwrap(), GeneratorState::default());
}

#[test]
fn timestamp_overflow_is_rejected() {
    let generator = SnowflakeGenerator::new(FixedTime {
        millis: SnowflakeId::TIMESTAMP_MASK + 1,
    });
    let options = SnowflakeOptions::default().with_epoch(0);

    assert_eq!(
        generator.next_id(&options),
        Err(Error::TimestampOverflow {
            delta: SnowflakeId::TIMESTAMP_MASK + 1,
        })
    );
    assert_eq!(generator.state().unwrap(), GeneratorState::default());
}

#[test]
fn round_trip_recovers_fields() {
    let generator = SnowflakeGenerator::new(SystemClock);
    let now = SystemClock.current_millis();

    for (epoch, node_id, sequence) in [
        (DEFAULT_EPOCH, 0, None),
        (DEFAULT_EPOCH, 1023, Some(4000)),
        (0, 512, Some(0)),
        (now - 10_000, 7, None),
    ] {
        let mut options = SnowflakeOptions::default()
            .with_epoch(epoch as i64)
            .with_node_id(node_id);
        options.sequence = sequence;

        let text = generator.next_id(&options).unwrap().to_string();
        let parsed = SnowflakeId::parse(&text, epoch).unwrap();
        let after = SystemClock.current_millis();

        assert_eq!(i64::from(parsed.node_id), node_id);
        assert!(parsed.sequence <= SnowflakeId::MAX_SEQUENCE);
        assert!(parsed.unix_millis() >= epoch);
        assert!(parsed.unix_millis() <= after);
    }
}

#[test]
fn system_clock_ids_are_strictly_increasing() {
    const TOTAL_IDS: usize = 4096 * 64;
    let generator = SnowflakeGenerator::new(SystemClock);
    let options = SnowflakeOptions::default().with_node_id(9);

    let mut previous = generator.next_id(&options).unwrap();
    for _ in 1..TOTAL_IDS {
        let id = generator.next_id(&options).unwrap();
        assert!(id > previous, "{id} <= {previous}");
        assert!(id.is_valid());
        assert_eq!(id.node_id(), 9);
        assert!(id.sequence() <= SnowflakeId::MAX_SEQUENCE);
        previous = id;
    }
}

#[test]
fn generators_with_different_nodes_do_not_collide() {
    let a = SnowflakeGenerator::new(FixedTime { millis: NOW });
    let b = SnowflakeGenerator::new(FixedTime { millis: NOW });

    let id_a = a.next_id(&SnowflakeOptions::default().with_node_id(1)).unwrap();
    let id_b = b.next_id(&SnowflakeOptions::default().with_node_id(2)).unwrap();

    assert_eq!(id_a.timestamp(), id_b.timestamp());
    assert_eq!(id_a.sequence(), id_b.sequence());
    assert_ne!(id_a, id_b);
}

#[test]
fn threaded_generation_is_unique_and_ordered_per_thread() {
    const IDS_PER_THREAD: usize = 4096 * 8;
    let threads = num_cpus::get().clamp(2, 8);

    let generator = Arc::new(SnowflakeGenerator::new(SystemClock));
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(threads * IDS_PER_THREAD)));

    scope(|s| {
        for _ in 0..threads {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let options = SnowflakeOptions::default();
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(generator.next_id(&options).unwrap());
                }
                assert!(local.windows(2).all(|w| w[0] < w[1]));

                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, threads * IDS_PER_THREAD);
}

#[test]
fn racing_callers_never_observe_a_stale_clock() {
    let generator = SnowflakeGenerator::new(SwitchTime {
        before: NOW,
        after: NOW + 1,
        switch_after: 1,
        reads: AtomicUsize::new(0),
    });
    let barrier = Barrier::new(2);

    let mut ids: Vec<SnowflakeId> = scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    generator.next_id(&SnowflakeOptions::default())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });
    ids.sort();

    assert_eq!(ids[0].timestamp(), 42);
    assert_eq!(ids[1].timestamp(), 43);
    assert_eq!(ids[1].sequence(), 0);
    assert_eq!(
        generator.state().unwrap(),
        GeneratorState {
            last_timestamp: NOW + 1,
            sequence: 0,
        }
    );
}

#[test]
fn contended_monotonic_clock_never_reports_regression() {
    const IDS_PER_THREAD: usize = 20_000;
    let threads = num_cpus::get().clamp(2, 8);

    let generator = SnowflakeGenerator::new(SteppingTime {
        start: NOW,
        reads_per_tick: 3,
        reads: AtomicU64::new(0),
    });
    let barrier = Barrier::new(threads);

    let results: Vec<Vec<Result<SnowflakeId, Error>>> = scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let options = SnowflakeOptions::default();
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.next_id(&options))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(threads * IDS_PER_THREAD);
    for local in results {
        let local: Vec<SnowflakeId> = local
            .into_iter()
            .map(|r| r.expect("monotonic clock must not regress"))
            .collect();
        assert!(local.windows(2).all(|w| w[0] < w[1]));
        for id in local {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), threads * IDS_PER_THREAD);
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn poisoned_lock_is_reported() {
    let generator = SnowflakeGenerator::new(FixedTime { millis: NOW });

    scope(|s| {
        let handle = s.spawn(|| {
            let _guard = generator.state.lock().unwrap();
            panic!("poison the generator lock");
        });
        assert!(handle.join().is_err());
    });

    assert_eq!(
        generator.next_id(&SnowflakeOptions::default()),
        Err(Error::LockPoisoned)
    );
}
