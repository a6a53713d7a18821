/*!
 * Conflux Demo Driver
 *
 * Runs the multi-producer sequence workload against a configured engine:
 * - One producer thread per key, each emitting the cyclic sequence
 *   character by character
 * - One consumer reassembling bodies and counting complete sequences
 *
 * Configuration comes from the environment (see `ConflatorConfig::from_env`).
 */

use conflux_engine::core::limits::{DEMO_PRODUCERS, DEMO_REPETITIONS, DEMO_SEQUENCE};
use conflux_engine::{
    init_tracing, Conflator, ConflatorConfig, Mergeable, Mode, SequentialCharacterMessage,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = ConflatorConfig::from_env();
    if config.mode == Mode::Synchronous {
        error!("The demo needs a daemonized engine; unset CONFLUX_MODE or set it to 'daemon'");
        return Err("synchronous mode not supported by the demo".into());
    }

    info!(
        producers = DEMO_PRODUCERS,
        repetitions = DEMO_REPETITIONS,
        ingress = ?config.ingress,
        pause_ms = config.pause.as_millis() as u64,
        "Starting conflation demo"
    );

    let conflator = Arc::new(Conflator::<SequentialCharacterMessage>::new(config)?);
    let start = Instant::now();

    let producers: Vec<_> = (0..DEMO_PRODUCERS)
        .map(|p| {
            let conflator = conflator.clone();
            thread::Builder::new()
                .name(format!("producer-{}", p))
                .spawn(move || {
                    let key = format!("key{}", p);
                    for _ in 0..DEMO_REPETITIONS {
                        for c in DEMO_SEQUENCE.chars() {
                            conflator.put(SequentialCharacterMessage::new(key.clone(), c.to_string()));
                        }
                    }
                })
        })
        .collect::<Result<_, _>>()?;

    let expected_words = DEMO_PRODUCERS * DEMO_REPETITIONS;
    let mut buffers: HashMap<String, String> = HashMap::new();
    let mut words: HashMap<String, usize> = HashMap::new();
    let mut takes = 0usize;
    let mut completed = 0usize;

    while completed < expected_words {
        let message = conflator.take();
        takes += 1;
        if !message.is_valid() {
            return Err(format!("corrupted body for {}: {}", message.key(), message.body()).into());
        }

        let buffer = buffers.entry(message.key().clone()).or_default();
        buffer.push_str(message.body());
        while buffer.len() >= DEMO_SEQUENCE.len() {
            if &buffer[..DEMO_SEQUENCE.len()] != DEMO_SEQUENCE {
                return Err(format!("out-of-order sequence for {}", message.key()).into());
            }
            buffer.drain(..DEMO_SEQUENCE.len());
            *words.entry(message.key().clone()).or_default() += 1;
            completed += 1;
        }
    }

    for handle in producers {
        handle.join().map_err(|_| "producer thread panicked")?;
    }

    let elapsed = start.elapsed();
    let stats = conflator.stats();
    conflator.stop();

    for (key, count) in &words {
        info!(key = %key, sequences = count, "Key complete");
    }
    info!(
        takes,
        submitted = stats.submitted,
        merges = stats.merges,
        republished = stats.republished,
        elapsed_ms = elapsed.as_millis() as u64,
        "Demo finished"
    );
    Ok(())
}
