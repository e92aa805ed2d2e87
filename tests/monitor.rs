mod common;

use async_trait::async_trait;
use common::*;
use jupiter_arb_monitor::arbitrage::ArbitrageDetector;
use jupiter_arb_monitor::dedupe::DedupeState;
use jupiter_arb_monitor::idl::Side;
use jupiter_arb_monitor::monitor::{Monitor, MonitorError, MonitoredProgram};
use jupiter_arb_monitor::notify::{NotificationSink, Notifier};
use jupiter_arb_monitor::token_registry::short_mint;
use solana_sdk::pubkey::Pubkey;
use std::sync::{Arc, Mutex};

struct Setup {
    source: Arc<MemorySource>,
    monitor: Monitor,
    v2: Pubkey,
    v3: Pubkey,
}

fn setup() -> Setup {
    setup_with_horizon(0)
}

fn setup_with_horizon(horizon_cycles: u64) -> Setup {
    let (v2, v3) = (Pubkey::new_unique(), Pubkey::new_unique());
    let source = Arc::new(MemorySource::default());
    let monitor = Monitor::new(
        source.clone(),
        Arc::new(registry()),
        vec![
            MonitoredProgram {
                label: "v2".to_string(),
                program_id: v2,
            },
            MonitoredProgram {
                label: "v3".to_string(),
                program_id: v3,
            },
        ],
        ArbitrageDetector::default(),
        DedupeState::new(horizon_cycles),
    );
    Setup {
        source,
        monitor,
        v2,
        v3,
    }
}

#[tokio::test]
async fn test_single_leg_round_trip_is_reported() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(500), 600)]),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.cycle, 1);
    assert_eq!(report.transactions, 1);
    assert_eq!(report.candidates, 1);
    assert_eq!(report.new_events.len(), 1);

    let labeled = &report.new_events[0];
    assert_eq!(labeled.event.signature, "sig-1");
    assert_eq!(labeled.event.profit, 100);
    assert_eq!(labeled.event.legs.len(), 1);
    assert!(!labeled.event.fee_was_elevated);
    assert_eq!(labeled.program_label, "v2");
    assert_eq!(labeled.token.symbol, "USDC");
    assert_eq!(labeled.mint, usdc_mint());
}

#[tokio::test]
async fn test_two_leg_chain_with_elevated_fee() {
    let mut s = setup();
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    s.source.set_mint(a, usdc_mint());
    s.source.push_transaction(
        s.v3,
        transaction(
            "sig-2",
            10_000,
            vec![
                token_swap(s.v3, a, b, Some(500), 40),
                token_swap(s.v3, b, a, Some(40), 700),
            ],
        ),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.new_events.len(), 1);
    let event = &report.new_events[0].event;
    assert_eq!(event.profit, 200);
    assert_eq!(event.fee, 10_000);
    assert!(event.fee_was_elevated);
    assert_eq!(event.program_id, s.v3);
    assert_eq!(report.new_events[0].program_label, "v3");
}

#[tokio::test]
async fn test_events_are_reported_once() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(1), 2)]),
    );

    assert_eq!(s.monitor.run_cycle().await.unwrap().new_events.len(), 1);
    let lookups = s.source.mint_lookups();

    let second = s.monitor.run_cycle().await.unwrap();
    assert_eq!(second.candidates, 1);
    assert!(second.new_events.is_empty());
    // already reported candidates are not labelled again
    assert_eq!(s.source.mint_lookups(), lookups);
    assert!(s.monitor.dedupe().contains(&s.v2, "sig-1"));
}

#[tokio::test]
async fn test_same_signature_on_both_programs() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    for program in [s.v2, s.v3] {
        s.source.push_transaction(
            program,
            transaction("shared", 5_000, vec![token_swap(program, account, account, Some(1), 2)]),
        );
    }

    let report = s.monitor.run_cycle().await.unwrap();
    let labels: Vec<&str> = report
        .new_events
        .iter()
        .map(|e| e.program_label.as_str())
        .collect();
    assert_eq!(labels, vec!["v2", "v3"]);
}

#[tokio::test]
async fn test_label_failure_retries_next_cycle() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(1), 2)]),
    );

    let first = s.monitor.run_cycle().await.unwrap();
    assert_eq!(first.candidates, 1);
    assert_eq!(first.dropped, 1);
    assert!(first.new_events.is_empty());
    assert!(!s.monitor.dedupe().contains(&s.v2, "sig-1"));

    s.source.set_mint(account, usdc_mint());
    let second = s.monitor.run_cycle().await.unwrap();
    assert_eq!(second.new_events.len(), 1);
    assert_eq!(second.dropped, 0);
}

#[tokio::test]
async fn test_unlisted_mint_uses_on_chain_decimals() {
    let mut s = setup();
    let (account, mint) = (Pubkey::new_unique(), Pubkey::new_unique());
    s.source.set_mint(account, mint);
    s.source.set_decimals(mint, 9);
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(1), 2)]),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    let labeled = &report.new_events[0];
    assert_eq!(labeled.token.symbol, short_mint(&mint));
    assert_eq!(labeled.token.decimals, 9);
}

#[tokio::test]
async fn test_fetch_failure_commits_nothing() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(1), 2)]),
    );
    s.source.set_failing(s.v3, true);

    let err = s.monitor.run_cycle().await.unwrap_err();
    assert!(matches!(err, MonitorError::Source { program_id, .. } if program_id == s.v3));
    assert_eq!(s.monitor.dedupe().cycle(), 0);
    assert!(s.monitor.dedupe().is_empty());

    s.source.set_failing(s.v3, false);
    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.new_events.len(), 1);
    assert_eq!(report.cycle, 1);
}

#[tokio::test]
async fn test_unprofitable_and_long_routes_are_ignored() {
    let mut s = setup();
    let (a, b, c) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    for account in [a, b, c] {
        s.source.set_mint(account, usdc_mint());
    }
    s.source.push_transaction(
        s.v2,
        transaction("break-even", 5_000, vec![token_swap(s.v2, a, a, Some(700), 700)]),
    );
    s.source.push_transaction(
        s.v2,
        transaction(
            "three-legs",
            5_000,
            vec![
                token_swap(s.v2, a, b, Some(1), 2),
                token_swap(s.v2, b, c, Some(2), 3),
                token_swap(s.v2, c, a, Some(3), 100),
            ],
        ),
    );
    s.source.push_transaction(
        s.v2,
        transaction("no-amount", 5_000, vec![token_swap(s.v2, a, a, None, 100)]),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.transactions, 3);
    assert_eq!(report.candidates, 0);
    assert!(report.new_events.is_empty());
}

#[tokio::test]
async fn test_other_programs_instructions_are_skipped() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    let elsewhere = Pubkey::new_unique();
    s.source.push_transaction(
        s.v2,
        transaction(
            "sig-1",
            5_000,
            vec![token_swap(elsewhere, account, account, Some(1), 2)],
        ),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.candidates, 0);
}

struct Recording(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl NotificationSink for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    async fn push(&self, message: &str) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_cycle_notification_text() {
    let mut s = setup();
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(500), 600)]),
    );

    let messages = Arc::new(Mutex::new(Vec::new()));
    let notifier = Notifier::new().with_sink(Box::new(Recording(messages.clone())));

    let report = s.monitor.run_cycle().await.unwrap();
    notifier.dispatch(&report.new_events).await;
    let report = s.monitor.run_cycle().await.unwrap();
    notifier.dispatch(&report.new_events).await;

    let messages = messages.lock().unwrap();
    assert_eq!(
        *messages,
        vec!["📈 📉 New arbitrage trade made on Jupiter v2 for a profit of 0.0001 USDC.".to_string()]
    );
}

#[tokio::test]
async fn test_order_book_then_pool_round_trip() {
    let mut s = setup();
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    s.source.set_mint(a, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction(
            "serum-aldrin",
            5_000,
            vec![
                // a -> b on the book, then a bid on the pool brings b back into a
                serum_swap(s.v2, a, a, b, Side::Ask, 1_000, 990),
                aldrin_swap(s.v2, a, b, Side::Bid, 990, 1_040),
            ],
        ),
    );

    let report = s.monitor.run_cycle().await.unwrap();
    assert_eq!(report.new_events.len(), 1);
    let event = &report.new_events[0].event;
    assert_eq!(event.legs.len(), 2);
    assert_eq!(event.legs[0].instruction, "serumSwap");
    assert_eq!(event.legs[1].instruction, "aldrinSwap");
    assert_eq!(event.profit, 40);
}

#[tokio::test]
async fn test_short_horizon_does_not_repeat_visible_events() {
    let mut s = setup_with_horizon(1);
    let account = Pubkey::new_unique();
    s.source.set_mint(account, usdc_mint());
    s.source.push_transaction(
        s.v2,
        transaction("sig-1", 5_000, vec![token_swap(s.v2, account, account, Some(1), 2)]),
    );

    let mut reported = 0;
    for _ in 0..4 {
        reported += s.monitor.run_cycle().await.unwrap().new_events.len();
    }
    assert_eq!(reported, 1);
    assert!(s.monitor.dedupe().contains(&s.v2, "sig-1"));
}
