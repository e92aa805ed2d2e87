pub mod message;
pub mod webhook;

use crate::arb_logger::ArbitrageLogger;
use crate::monitor::LabeledEvent;
use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};

pub use message::{format_units, render_cycle, render_event};
pub use webhook::WebhookSink;

/// Destination for the plain-text cycle message. Delivery is fire-and-forget.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn push(&self, message: &str) -> Result<()>;
}

/// Writes the message to the log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn push(&self, message: &str) -> Result<()> {
        info!("{}", message);
        Ok(())
    }
}

/// Fans a cycle's new events out to the journal and every sink.
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn NotificationSink>>,
    journal: Option<ArbitrageLogger>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_journal(mut self, journal: ArbitrageLogger) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub async fn dispatch(&self, events: &[LabeledEvent]) {
        if let Some(journal) = &self.journal {
            for event in events {
                if let Err(e) = journal.log_event(event) {
                    error!("Failed to journal {}: {:#}", event.event.signature, e);
                }
            }
        }

        let Some(message) = render_cycle(events) else {
            return;
        };

        info!(
            "Pushing notification with {} arb(s) to {} sink(s). {}",
            events.len(),
            self.sinks.len(),
            events[0].event.signature
        );
        for sink in &self.sinks {
            if let Err(e) = sink.push(&message).await {
                warn!("⚠️  {} sink failed: {:#}", sink.name(), e);
            }
        }
    }
}
