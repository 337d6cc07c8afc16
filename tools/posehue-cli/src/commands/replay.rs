//! Replay a recorded session through the throttled scheduler.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use posehue_common::clock::SessionClock;
use posehue_frame_model::{load_session, CoordinateSpace, DetectionConfig, Frame};
use posehue_vision::{FrameScheduler, TickOutcome};

pub async fn run(
    session: PathBuf,
    space: CoordinateSpace,
    realtime: bool,
    json: bool,
    config: DetectionConfig,
) -> anyhow::Result<()> {
    let ticks = load_session(&session)?;
    if !json {
        println!("Replaying session: {}", session.display());
        println!("  Loaded {} ticks", ticks.len());
    }
    if ticks.is_empty() {
        if !json {
            println!("  Nothing to replay.");
        }
        return Ok(());
    }

    let mut scheduler = FrameScheduler::new(config, space)?;

    // Ctrl-C stops the scheduler; the cycle in flight always finishes.
    let stop = scheduler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping replay");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let clock = SessionClock::start();
    let first_ms = ticks[0].timestamp_ms;
    tracing::info!(
        session = %session.display(),
        ticks = ticks.len(),
        %space,
        started = clock.epoch_wall(),
        "Replay started"
    );

    for tick in &ticks {
        if realtime {
            let target = tick.timestamp_ms.saturating_sub(first_ms);
            let elapsed = clock.elapsed_ms();
            if target > elapsed {
                tokio::time::sleep(Duration::from_millis(target - elapsed)).await;
            }
        }

        // Only decode frames the scheduler would actually look at.
        let frame = if scheduler.is_due(tick.timestamp_ms) {
            tick.frame.as_deref().and_then(decode_or_warn)
        } else {
            None
        };

        match scheduler.tick(tick.timestamp_ms, frame.as_ref(), &tick.landmarks) {
            TickOutcome::Completed(output) => {
                if json {
                    println!("{}", serde_json::to_string(&output)?);
                } else {
                    println!("  {}", super::summarize(&output));
                }
            }
            TickOutcome::Stopped => break,
            TickOutcome::Throttled | TickOutcome::Skipped(_) => {}
        }
    }

    let stats = scheduler.stats();
    tracing::info!(
        ticks = stats.ticks,
        cycles = stats.cycles,
        throttled = stats.throttled,
        skipped = stats.skipped,
        elapsed_secs = clock.elapsed_secs(),
        "Replay finished"
    );

    if !json {
        println!();
        if scheduler.is_stopped() {
            println!("Replay interrupted.");
        }
        println!(
            "Ticks: {}  Cycles: {}  Throttled: {}  Skipped: {}",
            stats.ticks, stats.cycles, stats.throttled, stats.skipped
        );
        if let Some(latest) = scheduler.latest() {
            println!("Last cycle: {}", super::summarize(latest));
        }
    }

    Ok(())
}

fn decode_or_warn(path: &Path) -> Option<Frame> {
    match super::load_frame(path) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}
