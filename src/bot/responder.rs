//! Poll loop: fetch → select → evaluate → dispatch, once per interval.
//!
//! ```text
//! Idle ──tick──▶ Polled ──▶ NoCandidate | Suppressed | Deferred | Sent | Failed ──sleep──▶ Idle
//!   └──────────────── shutdown observed at a tick boundary ──────────────▶ Stopped
//! ```
//!
//! Exactly one tick runs at a time. Every collaborator failure inside a tick
//! is converted into [`TickOutcome::Failed`]; the loop itself never sees an
//! error and simply tries again after the normal interval.

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use tokio::sync::watch;

use super::dispatcher::{dispatch, Outcome};
use super::evaluator::{evaluate, Verdict};
use super::selector::select_candidate;
use crate::config::BotConfig;
use crate::errors::BotError;
use crate::gateway::{Gateway, MessageId};
use crate::logutil::escape_log;
use crate::metrics;
use crate::storage::{KeyValueStore, ReplyState};

/// Result of a single poll cycle.
#[derive(Debug)]
pub enum TickOutcome {
    NoCandidate,
    Suppressed { id: MessageId, verdict: Verdict },
    Deferred { id: MessageId },
    Sent { id: MessageId, destination: String },
    /// Tick abandoned; state untouched, retried next interval.
    Failed(BotError),
}

pub struct Responder<G: Gateway, S: KeyValueStore> {
    config: BotConfig,
    gateway: G,
    state: ReplyState<S>,
}

impl<G: Gateway, S: KeyValueStore> Responder<G, S> {
    pub fn new(config: BotConfig, gateway: G, state: ReplyState<S>) -> Self {
        Self {
            config,
            gateway,
            state,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> &ReplyState<S> {
        &self.state
    }

    /// One cycle against the local calendar date.
    pub async fn poll_once(&self) -> TickOutcome {
        self.tick(Local::now().date_naive()).await
    }

    /// One fault-isolated cycle treating `today` as the current date.
    pub async fn tick(&self, today: NaiveDate) -> TickOutcome {
        metrics::inc_ticks();
        let outcome = match self.try_tick(today).await {
            Ok(outcome) => outcome,
            Err(e) => TickOutcome::Failed(e),
        };
        self.record(&outcome);
        outcome
    }

    async fn try_tick(&self, today: NaiveDate) -> Result<TickOutcome, BotError> {
        let messages = self.gateway.messages().await?;
        let candidate = select_candidate(&messages, today);
        let last_replied = self.state.load();

        let verdict = evaluate(
            candidate,
            &last_replied,
            &self.config.trigger,
            &self.config.self_signature,
        );
        let candidate = match (verdict, candidate) {
            (Verdict::Respond, Some(c)) => c,
            (_, Some(c)) => {
                return Ok(TickOutcome::Suppressed {
                    id: c.id.clone(),
                    verdict,
                })
            }
            (_, None) => return Ok(TickOutcome::NoCandidate),
        };

        info!(
            "Trigger matched message {} from {}: {}",
            candidate.id,
            candidate.origin,
            escape_log(&candidate.body)
        );

        match dispatch(candidate, &self.config.response, &self.gateway, &self.state).await? {
            Outcome::Sent { id, destination } => Ok(TickOutcome::Sent { id, destination }),
            Outcome::Deferred => Ok(TickOutcome::Deferred {
                id: candidate.id.clone(),
            }),
        }
    }

    fn record(&self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::NoCandidate => {
                metrics::inc_no_candidate();
                debug!("No received message today");
            }
            TickOutcome::Suppressed { id, verdict } => {
                metrics::inc_suppressed();
                debug!("Message {} suppressed: {}", id, verdict);
            }
            TickOutcome::Deferred { id } => {
                metrics::inc_deferred();
                info!("No radio link; reply to message {} deferred to next poll", id);
            }
            TickOutcome::Sent { .. } => metrics::inc_sent(),
            TickOutcome::Failed(e) => {
                metrics::inc_failed();
                warn!("Poll tick failed, retrying next cycle: {}", e);
            }
        }
    }

    /// Tick, then sleep `poll_interval`, until `shutdown` flips to `true`.
    ///
    /// Shutdown is checked between ticks; a signal during the sleep ends the
    /// wait immediately, a signal during a tick lets that tick finish first.
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.config.poll_interval();
        info!(
            "Responder polling every {}s for trigger '{}'",
            interval.as_secs(),
            self.config.trigger
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.poll_once().await;

            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    // Dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("Responder stopped ({})", metrics::snapshot());
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received shutdown signal");
                    let _ = tx.send(true);
                }
                Err(e) => {
                    warn!("Unable to listen for Ctrl-C: {}", e);
                    // Keep the sender alive so the loop does not read this as a shutdown.
                    std::future::pending::<()>().await;
                    drop(tx);
                }
            }
        });
        self.run_until(rx).await;
    }
}
