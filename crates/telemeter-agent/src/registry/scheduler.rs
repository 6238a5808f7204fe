//! Periodic gather-and-send loop.
//!
//! States are `Stopped` (zero interval) and `Running(d)`. New intervals
//! arrive over the control channel and rebuild the ticker. The loop holds a
//! weak registry reference and exits once the registry (and with it the
//! control sender) is gone.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::{Registry, RegistryInner};

pub(crate) async fn run(
    registry: Weak<RegistryInner>,
    mut control: mpsc::UnboundedReceiver<Duration>,
    initial: Duration,
) {
    let mut ticker = ticker_for(initial);
    tracing::debug!(interval_ms = initial.as_millis() as u64, "scheduler started");

    loop {
        tokio::select! {
            _ = next_tick(&mut ticker) => {
                let Some(inner) = registry.upgrade() else { break };
                if let Err(e) = (Registry { inner }).gather_and_send().await {
                    tracing::warn!(error = %e, failures = e.failure_count(), "scheduled send failed");
                }
            }
            msg = control.recv() => match msg {
                Some(interval) => {
                    ticker = ticker_for(interval);
                    if interval.is_zero() {
                        tracing::debug!("scheduler stopped");
                    } else {
                        tracing::debug!(interval_ms = interval.as_millis() as u64, "scheduler running");
                    }
                }
                None => break,
            },
        }
    }

    tracing::debug!("scheduler exited");
}

fn ticker_for(interval: Duration) -> Option<Interval> {
    if interval.is_zero() {
        return None;
    }
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
