/*!
 * Daemonized Mode Tests
 * Grouping behavior driven by the background indexer
 */

use super::common::{wait_indexed, wait_until};
use conflux_engine::{Conflator, ConflatorConfig, Mergeable, TextMessage, Trade};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_put_and_take() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.put(TextMessage::new("1", "a"));

    let message = conflator.take();
    assert_eq!(message.body(), "a");
    assert_eq!(message.merge_count(), 0);

    conflator.stop();
}

#[test]
fn test_merge_messages_on_same_key() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.put(TextMessage::new("1", "a"));
    conflator.put(TextMessage::new("1", "b"));

    wait_indexed(&conflator, 2);
    let message = conflator.take();

    assert_eq!(message.body(), "ab");
    assert_eq!(message.merge_count(), 1);
    assert!(message.is_merged());
    assert_eq!(conflator.size(), 0);

    conflator.stop();
}

#[test]
fn test_long_pause_separates_same_key_values() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.pause(Duration::from_millis(500));
    conflator.put(TextMessage::new("1", "a"));
    conflator.put(TextMessage::new("1", "b"));

    let first = conflator.take();
    let second = conflator.take();

    assert_eq!((first.body(), first.merge_count()), ("a", 0));
    assert_eq!((second.body(), second.merge_count()), ("b", 0));

    conflator.stop();
}

#[test]
fn test_throttled_config_applies_initial_pause() {
    let conflator = Conflator::new(ConflatorConfig::throttled(Duration::from_millis(300))).unwrap();
    conflator.put(TextMessage::new("1", "a"));
    conflator.put(TextMessage::new("1", "b"));

    assert_eq!(conflator.take().body(), "a");
    assert_eq!(conflator.take().body(), "b");

    conflator.stop();
}

#[test]
fn test_put_and_take_on_two_keys() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.put(TextMessage::new("1", "a"));
    conflator.put(TextMessage::new("2", "A"));

    let mut bodies = vec![
        conflator.take().body().to_string(),
        conflator.take().body().to_string(),
    ];
    bodies.sort();

    assert_eq!(bodies, vec!["A".to_string(), "a".to_string()]);
    conflator.stop();
}

#[test]
fn test_trades_merge_on_same_ticker() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.put(Trade::new("GOOG", 100));
    conflator.put(Trade::new("GOOG", 120));

    wait_indexed(&conflator, 2);
    let trade = conflator.take();

    assert_eq!(*trade.body(), 220);
    assert!(trade.is_merged());
    conflator.stop();
}

#[test]
fn test_trades_on_different_tickers_stay_apart() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.put(Trade::new("GOOG", 100));
    conflator.put(Trade::new("AAPL", 120));

    wait_indexed(&conflator, 2);
    let mut quantities = vec![conflator.take(), conflator.take()]
        .into_iter()
        .map(|t| {
            assert!(!t.is_merged());
            t.current_quantity()
        })
        .collect::<Vec<_>>();
    quantities.sort();

    assert_eq!(quantities, vec![100, 120]);
    conflator.stop();
}

#[test]
fn test_size_reaches_zero_after_drain() {
    let conflator = Conflator::daemonized().unwrap();
    for i in 0..50 {
        conflator.put(TextMessage::new(format!("k{}", i % 5), "x"));
    }

    wait_indexed(&conflator, 50);
    let mut delivered = 0;
    while delivered < 50 {
        delivered += conflator.take().merge_count() + 1;
    }

    assert!(wait_until(Duration::from_secs(1), || conflator.size() == 0));
    assert!(conflator.try_take().is_none());
    conflator.stop();
}

#[test]
fn test_stop_then_restart_keeps_queued_values() {
    let conflator = Conflator::daemonized().unwrap();
    conflator.stop();
    assert!(!conflator.is_daemonized());

    conflator.put(TextMessage::new("1", "a"));
    assert_eq!(conflator.size(), 1);
    assert!(conflator.try_take().is_none());

    conflator.daemonize().unwrap();
    assert_eq!(conflator.take_timeout(Duration::from_secs(5)).unwrap().body(), "a");
    conflator.stop();
}
