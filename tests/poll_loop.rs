mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use common::{received, sent, FakeGateway};
use freedata_bot::bot::{Responder, TickOutcome, Verdict};
use freedata_bot::config::BotConfig;
use freedata_bot::gateway::MessageId;
use freedata_bot::errors::StateError;
use freedata_bot::storage::{KeyValueStore, LastReplied, MemoryStore, ReplyState};
use tokio::sync::watch;

fn jan1() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn responder(gateway: FakeGateway) -> Responder<FakeGateway, MemoryStore> {
    let state = ReplyState::new(MemoryStore::new(), "last_replied");
    Responder::new(BotConfig::default(), gateway, state)
}

#[tokio::test]
async fn replies_once_then_dedups() {
    let gateway = FakeGateway::new(vec![received(
        "1",
        "2024-01-01T10:00",
        "N0CALL",
        "hello there",
    )]);
    let bot = responder(gateway);

    match bot.tick(jan1()).await {
        TickOutcome::Sent { id, destination } => {
            assert_eq!(id, MessageId::new("1"));
            assert_eq!(destination, "N0CALL");
        }
        other => panic!("expected Sent, got {other:?}"),
    }
    assert_eq!(bot.state().load(), LastReplied::Id(MessageId::new("1")));

    match bot.tick(jan1()).await {
        TickOutcome::Suppressed { id, verdict } => {
            assert_eq!(id, MessageId::new("1"));
            assert_eq!(verdict, Verdict::AlreadyReplied);
        }
        other => panic!("expected dedup, got {other:?}"),
    }
    assert_eq!(bot.gateway().sent().len(), 1);
    assert_eq!(bot.state().load(), LastReplied::Id(MessageId::new("1")));
}

#[tokio::test]
async fn deferred_candidate_is_sent_once_link_returns() {
    let gateway = FakeGateway::new(vec![received("5", "2024-01-01T09:00:00", "K1ABC", "HELLO")]);
    gateway.set_radio(false);
    let bot = responder(gateway);

    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Deferred { .. }));
    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Deferred { .. }));
    assert_eq!(bot.state().load(), LastReplied::None);

    bot.gateway().set_radio(true);
    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Sent { .. }));
    assert_eq!(bot.gateway().sent().len(), 1);
}

#[tokio::test]
async fn our_own_reply_after_the_question_is_skipped() {
    let gateway = FakeGateway::new(vec![
        received("1", "2024-01-01T10:00:00", "N0CALL", "hello"),
        sent("2", "2024-01-01T10:01:00", "my FreeData BOT says Hello Back!"),
    ]);
    let bot = responder(gateway);
    match bot.tick(jan1()).await {
        TickOutcome::Sent { id, .. } => assert_eq!(id, MessageId::new("1")),
        other => panic!("expected Sent, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_failure_abandons_tick_and_recovers() {
    let gateway = FakeGateway::new(vec![received("1", "2024-01-01T10:00:00", "N0CALL", "hello")]);
    gateway.fail_messages.store(true, Ordering::SeqCst);
    let bot = responder(gateway);

    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Failed(_)));
    assert_eq!(bot.state().load(), LastReplied::None);

    bot.gateway().fail_messages.store(false, Ordering::SeqCst);
    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Sent { .. }));
}

/// Store whose writes always fail, like a read-only data directory.
struct UnwritableStore;

impl KeyValueStore for UnwritableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StateError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &str) -> Result<(), StateError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only data dir").into())
    }
}

#[tokio::test]
async fn unwritable_state_still_sends_only_once() {
    let gateway = FakeGateway::new(vec![received("1", "2024-01-01T10:00:00", "N0CALL", "hello")]);
    let bot = Responder::new(
        BotConfig::default(),
        gateway,
        ReplyState::new(UnwritableStore, "last_replied"),
    );

    assert!(matches!(bot.tick(jan1()).await, TickOutcome::Failed(_)));
    for _ in 0..2 {
        match bot.tick(jan1()).await {
            TickOutcome::Suppressed { verdict, .. } => assert_eq!(verdict, Verdict::AlreadyReplied),
            other => panic!("expected dedup, got {other:?}"),
        }
    }
    assert_eq!(bot.gateway().sent().len(), 1);
}

#[tokio::test]
async fn non_matching_and_empty_days_take_no_action() {
    let bot = responder(FakeGateway::new(vec![]));
    assert!(matches!(bot.tick(jan1()).await, TickOutcome::NoCandidate));

    bot.gateway()
        .push(received("9", "2024-01-01T12:00:00", "N0CALL", "73, good night"));
    match bot.tick(jan1()).await {
        TickOutcome::Suppressed { verdict, .. } => assert_eq!(verdict, Verdict::NoTrigger),
        other => panic!("expected Suppressed, got {other:?}"),
    }
    assert!(bot.gateway().sent().is_empty());
}

#[tokio::test]
async fn shutdown_before_start_runs_no_tick() {
    let today = Local::now().format("%Y-%m-%dT10:00:00").to_string();
    let bot = responder(FakeGateway::new(vec![received("1", &today, "N0CALL", "hello")]));
    let (_tx, rx) = watch::channel(true);

    bot.run_until(rx).await;
    assert!(bot.gateway().sent().is_empty());
}

#[tokio::test]
async fn shutdown_interrupts_the_inter_tick_sleep() {
    let today = Local::now().format("%Y-%m-%dT10:00:00").to_string();
    let gateway = FakeGateway::new(vec![received("1", &today, "N0CALL", "hello")]);
    let mut config = BotConfig::default();
    config.poll_interval_seconds = 3600;
    let bot = Responder::new(
        config,
        gateway,
        ReplyState::new(MemoryStore::new(), "last_replied"),
    );
    let (tx, rx) = watch::channel(false);

    let stopper = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
    };
    let run = tokio::time::timeout(Duration::from_secs(5), bot.run_until(rx));
    let (finished, _) = tokio::join!(run, stopper);

    assert!(finished.is_ok(), "loop did not stop on shutdown");
    assert_eq!(bot.gateway().sent().len(), 1);
}
