//! Host lifecycle signals.
//!
//! Hosts report many different "going away" and "back again" signals. They
//! all collapse onto the two calls of [`Lifecycle`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::TimerEvent;

/// The two inbound calls a host makes around foreground loss.
pub trait Lifecycle {
    /// The host is about to lose foreground execution. Must finish
    /// synchronously.
    fn suspend(&mut self) -> Result<Option<TimerEvent>>;

    /// The host has regained foreground execution.
    fn reconcile(&mut self) -> Result<Option<TimerEvent>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleSignal {
    /// View no longer visible.
    Hidden,
    /// Process or page is being torn down.
    Unload,
    /// Host froze the process.
    Freeze,
    /// Window lost focus.
    Blur,
    /// View visible again.
    Shown,
    /// Process or page (re)started.
    Load,
    /// Window regained focus.
    Focus,
}

impl LifecycleSignal {
    pub const ALL: [LifecycleSignal; 7] = [
        LifecycleSignal::Hidden,
        LifecycleSignal::Unload,
        LifecycleSignal::Freeze,
        LifecycleSignal::Blur,
        LifecycleSignal::Shown,
        LifecycleSignal::Load,
        LifecycleSignal::Focus,
    ];

    pub fn is_suspend(self) -> bool {
        matches!(
            self,
            LifecycleSignal::Hidden
                | LifecycleSignal::Unload
                | LifecycleSignal::Freeze
                | LifecycleSignal::Blur
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleSignal::Hidden => "hidden",
            LifecycleSignal::Unload => "unload",
            LifecycleSignal::Freeze => "freeze",
            LifecycleSignal::Blur => "blur",
            LifecycleSignal::Shown => "shown",
            LifecycleSignal::Load => "load",
            LifecycleSignal::Focus => "focus",
        }
    }
}

impl fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleSignal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|signal| signal.as_str() == wanted)
            .ok_or_else(|| format!("unknown lifecycle signal: {s}"))
    }
}

/// Route a host signal to the matching lifecycle call.
pub fn dispatch<L: Lifecycle + ?Sized>(
    target: &mut L,
    signal: LifecycleSignal,
) -> Result<Option<TimerEvent>> {
    tracing::debug!(%signal, "lifecycle signal");
    if signal.is_suspend() {
        target.suspend()
    } else {
        target.reconcile()
    }
}
