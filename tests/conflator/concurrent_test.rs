/*!
 * Concurrent Conflation Tests
 * Multi-producer workloads checking ordering, loss, and duplication
 */

use conflux_engine::{
    Conflator, ConflatorConfig, IngressKind, Mergeable, SequentialCharacterMessage,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SEQUENCE: &str = "0123456789";

fn spawn_senders(
    conflator: &Arc<Conflator<SequentialCharacterMessage>>,
    keys: usize,
    repetitions: usize,
) -> Vec<thread::JoinHandle<()>> {
    (0..keys)
        .map(|k| {
            let conflator = conflator.clone();
            thread::spawn(move || {
                let key = format!("key{}", k);
                for _ in 0..repetitions {
                    for c in SEQUENCE.chars() {
                        conflator.put(SequentialCharacterMessage::new(key.clone(), c.to_string()));
                    }
                }
            })
        })
        .collect()
}

/// Single receiver reassembling each key's stream in take order
///
/// Returns (complete sequences, sum of merge_count + 1) per key.
fn receive_words(
    conflator: &Conflator<SequentialCharacterMessage>,
    expected_words: usize,
) -> HashMap<String, (usize, usize)> {
    let mut buffers: HashMap<String, String> = HashMap::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut total = 0;

    while total < expected_words {
        let message = conflator
            .take_timeout(Duration::from_secs(30))
            .expect("receiver starved");
        assert!(message.is_valid(), "corrupted body {}", message.body());

        let entry = counts.entry(message.key().clone()).or_default();
        entry.1 += message.merge_count() + 1;

        let buffer = buffers.entry(message.key().clone()).or_default();
        buffer.push_str(message.body());
        while buffer.len() >= SEQUENCE.len() {
            assert_eq!(&buffer[..SEQUENCE.len()], SEQUENCE);
            buffer.drain(..SEQUENCE.len());
            entry.0 += 1;
            total += 1;
        }
    }

    for (key, rest) in &buffers {
        assert!(rest.is_empty(), "leftover characters for {}: {}", key, rest);
    }
    counts
}

fn run_sequence_workload(config: ConflatorConfig, keys: usize, repetitions: usize) {
    let conflator = Arc::new(Conflator::new(config).unwrap());
    let senders = spawn_senders(&conflator, keys, repetitions);

    let counts = receive_words(&conflator, keys * repetitions);
    for handle in senders {
        handle.join().unwrap();
    }

    assert_eq!(counts.len(), keys);
    for (key, (words, values)) in &counts {
        assert_eq!(*words, repetitions, "sequence count for {}", key);
        assert_eq!(*values, repetitions * SEQUENCE.len(), "value count for {}", key);
    }

    assert_eq!(conflator.size(), 0);
    let stats = conflator.stats();
    assert_eq!(stats.submitted, (keys * repetitions * SEQUENCE.len()) as u64);
    assert_eq!(stats.delivered + stats.merges, stats.submitted);
    conflator.stop();
}

#[test]
fn test_receive_100_000_words_sent_on_10_threads() {
    run_sequence_workload(ConflatorConfig::default(), 10, 10_000);
}

#[test]
fn test_lockfree_ingress_sequence_workload() {
    run_sequence_workload(
        ConflatorConfig::default().with_ingress(IngressKind::LockFree),
        4,
        2_000,
    );
}

#[test]
fn test_concurrent_consumers_lose_nothing() {
    const KEYS: usize = 8;
    const REPETITIONS: usize = 1_000;
    const CONSUMERS: usize = 4;

    let conflator = Arc::new(Conflator::daemonized().unwrap());
    let senders = spawn_senders(&conflator, KEYS, REPETITIONS);
    for handle in senders {
        handle.join().unwrap();
    }

    let expected = KEYS * REPETITIONS * SEQUENCE.len();
    let delivered = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let conflator = conflator.clone();
            let delivered = delivered.clone();
            thread::spawn(move || {
                let mut chars: HashMap<String, usize> = HashMap::new();
                while delivered.load(std::sync::atomic::Ordering::SeqCst) < expected {
                    let Some(message) = conflator.try_take() else {
                        thread::yield_now();
                        continue;
                    };
                    assert!(message.is_valid());
                    *chars.entry(message.key().clone()).or_default() += message.body().len();
                    delivered.fetch_add(
                        message.merge_count() + 1,
                        std::sync::atomic::Ordering::SeqCst,
                    );
                }
                chars
            })
        })
        .collect();

    let mut totals: HashMap<String, usize> = HashMap::new();
    for handle in consumers {
        for (key, count) in handle.join().unwrap() {
            *totals.entry(key).or_default() += count;
        }
    }

    assert_eq!(totals.len(), KEYS);
    assert!(totals.values().all(|&n| n == REPETITIONS * SEQUENCE.len()));
    assert_eq!(conflator.size(), 0);
    conflator.stop();
}
