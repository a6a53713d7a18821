/*!
 * Synchronous Mode Tests
 * Caller-driven indexing through conflate(n)
 */

use conflux_engine::{Conflator, ConflatorConfig, Mergeable, Mode, SequentialCharacterMessage};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_merge_count_matches_run_length() {
    let conflator = Conflator::synchronous();
    for c in "0123456789".chars() {
        conflator.put(SequentialCharacterMessage::new("seq", c.to_string()));
    }

    assert_eq!(conflator.conflate(10).unwrap(), 10);
    let message = conflator.take();

    assert_eq!(message.body(), "0123456789");
    assert_eq!(message.merge_count(), 9);
    assert!(message.is_valid());
    assert_eq!(conflator.size(), 0);
}

#[test]
fn test_partial_conflate_leaves_ingress_pending() {
    let conflator = Conflator::synchronous();
    for c in ["a", "b", "c"] {
        conflator.put(SequentialCharacterMessage::new("seq", c));
    }

    conflator.conflate(2).unwrap();
    assert_eq!(conflator.size(), 3);
    assert_eq!(conflator.take().body(), "ab");
    assert_eq!(conflator.size(), 1);

    conflator.conflate(1).unwrap();
    assert_eq!(conflator.take().body(), "c");
    assert_eq!(conflator.size(), 0);
}

#[test]
fn test_broken_sequence_delivers_in_order() {
    let conflator = Conflator::synchronous();
    for c in ["1", "2", "7", "8", "3"] {
        conflator.put(SequentialCharacterMessage::new("seq", c));
    }
    conflator.conflate(5).unwrap();

    let bodies: Vec<String> = (0..3).map(|_| conflator.take().body().to_string()).collect();
    assert_eq!(bodies, vec!["12", "78", "3"]);
    assert!(conflator.try_take().is_none());
}

#[test]
fn test_synchronous_mode_from_config() {
    let conflator =
        Conflator::<SequentialCharacterMessage>::new(ConflatorConfig::default().with_mode(Mode::Synchronous))
            .unwrap();
    assert!(!conflator.is_daemonized());
    assert_eq!(conflator.config().mode, Mode::Synchronous);
    assert!(conflator.take_timeout(Duration::from_millis(10)).is_err());
}
