use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use flexcounter_core::{
    duration_from_parts, parse_duration, Config, CoreError, LifecycleSignal, TimerStatus,
};

use super::print_json;
use crate::host::Host;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a countdown, or continue a paused one
    Start {
        /// Duration as SS, MM:SS, H:MM:SS or 1h30m (default: timer.default_duration)
        #[arg(allow_negative_numbers = true)]
        duration: Option<String>,
        /// Hours, combined with --minutes/--seconds
        #[arg(long, conflicts_with = "duration")]
        hours: Option<u64>,
        /// Minutes, combined with --hours/--seconds
        #[arg(long, conflicts_with = "duration")]
        minutes: Option<u64>,
        /// Seconds, combined with --hours/--minutes
        #[arg(long, conflicts_with = "duration")]
        seconds: Option<u64>,
    },
    /// Freeze the countdown
    Pause,
    /// Continue a paused countdown
    Resume,
    /// Back to idle at zero (saved results are kept)
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Tick in the foreground until interrupted
    Run {
        /// Start this countdown first if the timer is idle
        #[arg(allow_negative_numbers = true)]
        duration: Option<String>,
    },
    /// Deliver a host lifecycle signal (hidden, unload, freeze, blur, shown, load, focus)
    Signal { signal: LifecycleSignal },
}

fn resolve_target(
    duration: Option<&str>,
    hours: Option<u64>,
    minutes: Option<u64>,
    seconds: Option<u64>,
    config: &Config,
) -> Result<u64, CoreError> {
    match duration {
        Some(input) => parse_duration(input),
        None if hours.is_some() || minutes.is_some() || seconds.is_some() => duration_from_parts(
            hours.unwrap_or(0),
            minutes.unwrap_or(0),
            seconds.unwrap_or(0),
        ),
        None => config.default_target_secs(),
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = Host::open()?;
    let result = handle(&mut host, action);
    host.close()?;
    result
}

fn handle(host: &mut Host, action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start {
            duration,
            hours,
            minutes,
            seconds,
        } => {
            let event = if host.engine.status() == TimerStatus::Paused {
                host.engine.resume()?
            } else {
                let target = resolve_target(duration.as_deref(), hours, minutes, seconds, &host.config)?;
                host.engine.start(target)?
            };
            match event {
                Some(event) => print_json(&event)?,
                None => print_json(&host.engine.snapshot())?,
            }
        }
        TimerAction::Pause => match host.engine.pause()? {
            Some(event) => print_json(&event)?,
            None => return Err(format!("timer is {}, not running", host.engine.status()).into()),
        },
        TimerAction::Resume => match host.engine.resume()? {
            Some(event) => print_json(&event)?,
            None => return Err(format!("timer is {}, not paused", host.engine.status()).into()),
        },
        TimerAction::Reset => {
            if let Some(event) = host.engine.reset()? {
                print_json(&event)?;
            }
        }
        TimerAction::Status => {
            print_json(&host.engine.snapshot())?;
            if host.expired_on_load() {
                if let Some(event) = &host.reconciled {
                    print_json(event)?;
                }
            }
        }
        TimerAction::Run { duration } => {
            match host.engine.status() {
                TimerStatus::Idle => {
                    let target = resolve_target(duration.as_deref(), None, None, None, &host.config)?;
                    host.engine.start(target)?;
                }
                TimerStatus::Paused => return Err("timer is paused, resume it first".into()),
                TimerStatus::Running => {}
            }
            run_foreground(host)?;
        }
        TimerAction::Signal { signal } => {
            if let Some(event) = flexcounter_core::dispatch(&mut host.engine, signal)? {
                print_json(&event)?;
            }
        }
    }
    Ok(())
}

/// Drive the engine from a 1 Hz interval until Ctrl-C (or SIGTERM). The
/// caller's `Host::close` suspends the engine afterwards.
fn run_foreground(host: &mut Host) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(host))
}

async fn drive(host: &mut Host) -> Result<(), Box<dyn std::error::Error>> {
    let period = Duration::from_secs(1);
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    if host.expired_on_load() {
        println!("Time's up!");
    }
    render(host)?;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(handle) = host.engine.tick_handle() else {
                    println!();
                    tracing::info!(status = %host.engine.status(), "timer is not running");
                    return Ok(());
                };
                if let Some(event) = host.engine.fire(handle) {
                    if event.is_expiry() {
                        println!("\nTime's up!");
                    }
                }
                render(host)?;
            }
            _ = &mut shutdown => {
                println!();
                tracing::debug!("interrupted");
                return Ok(());
            }
        }
    }
}

fn render(host: &Host) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\r{:>10}", host.display(host.engine.remaining_secs()))?;
    stdout.flush()
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
