use anyhow::Result;
use clap::Parser;
use colored::*;
use jupiter_arb_monitor::arb_logger::ArbitrageLogger;
use jupiter_arb_monitor::arbitrage::ArbitrageDetector;
use jupiter_arb_monitor::config::{load_config, load_tokens};
use jupiter_arb_monitor::dedupe::DedupeState;
use jupiter_arb_monitor::monitor::{CycleReport, Monitor};
use jupiter_arb_monitor::notify::{format_units, LogSink, Notifier, WebhookSink};
use jupiter_arb_monitor::sources::RpcTransactionSource;
use jupiter_arb_monitor::token_registry::TokenRegistry;
use log::{info, warn};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Reports profitable round-trip swaps routed through Jupiter")]
struct Args {
    /// Path to the monitor configuration
    #[clap(short, long, default_value = "config/monitor.toml")]
    config: String,

    /// Run a single polling cycle and exit
    #[clap(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("🚀 Starting Jupiter arbitrage monitor");

    let mut config = load_config(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;

    let tokens = TokenRegistry::new(load_tokens(&config.monitor.tokens_file)?);
    let programs = config.monitored_programs()?;

    info!("✅ Loaded {} tokens", tokens.len());
    for program in &programs {
        info!("✅ Watching Jupiter {} ({})", program.label, program.program_id);
    }
    info!("🔗 RPC endpoint: {}", config.monitor.rpc_url);

    let mut notifier = Notifier::new().with_sink(Box::new(LogSink));
    match (&config.notify.webhook_url, config.notify.dry_run) {
        (Some(url), false) => notifier = notifier.with_sink(Box::new(WebhookSink::new(url)?)),
        (Some(_), true) => warn!("⚠️  Dry run: webhook notifications disabled"),
        (None, _) => {}
    }
    if let Some(log_file) = &config.notify.log_file {
        let journal = ArbitrageLogger::new(log_file)?;
        info!("📝 Log file: {}", journal.path());
        notifier = notifier.with_journal(journal);
    }
    info!("📣 Notification sinks: {}", notifier.sink_names().join(", "));

    let source = RpcTransactionSource::new(&config.monitor.rpc_url, config.fetch_settings());
    let mut monitor = Monitor::new(
        Arc::new(source),
        Arc::new(tokens),
        programs,
        ArbitrageDetector::new(config.monitor.standard_fee_lamports),
        DedupeState::new(config.monitor.dedupe_horizon_cycles),
    );

    if args.once {
        let report = monitor.run_cycle().await?;
        handle_report(&notifier, &report).await;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("🛑 Shutting down after {} cycle(s)", monitor.dedupe().cycle());
                break;
            }
            _ = ticker.tick() => {
                match monitor.run_cycle().await {
                    Ok(report) => handle_report(&notifier, &report).await,
                    Err(e) => warn!("⚠️  Cycle failed, retrying next tick: {}", e),
                }
            }
        }
    }

    Ok(())
}

async fn handle_report(notifier: &Notifier, report: &CycleReport) {
    info!(
        "📊 Cycle #{}: {} transactions | {} candidates | {} new | {} dropped | {:?}",
        report.cycle,
        report.transactions,
        report.candidates,
        report.new_events.len(),
        report.dropped,
        report.elapsed
    );
    print_results(report);
    notifier.dispatch(&report.new_events).await;
}

fn print_results(report: &CycleReport) {
    if report.new_events.is_empty() {
        return;
    }

    println!("\n{}", "=".repeat(80).bright_black());
    println!(
        "{} Cycle #{} | {} | Duration: {:?}",
        "📊".bright_cyan(),
        report.cycle.to_string().bright_white().bold(),
        chrono::Local::now().format("%H:%M:%S").to_string().bright_black(),
        report.elapsed
    );
    println!("{}", "=".repeat(80).bright_black());

    for (idx, labeled) in report.new_events.iter().enumerate() {
        let event = &labeled.event;
        println!(
            "{}. 💰 [ARB] {} {} | Jupiter {} | {} leg(s) | {}",
            (idx + 1).to_string().bright_white(),
            format!("+{}", format_units(event.profit, labeled.token.decimals))
                .bright_green()
                .bold(),
            labeled.token.symbol.bright_cyan().bold(),
            labeled.program_label,
            event.legs.len(),
            event.signature.bright_black(),
        );
        if event.fee_was_elevated {
            println!(
                "   {} fee {} SOL",
                "🚀".yellow(),
                format_units(event.fee, 9).yellow()
            );
        }
    }

    println!();
}
