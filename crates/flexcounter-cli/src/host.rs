//! The CLI as a lifecycle host.
//!
//! Each invocation is one "page load": open the store, reconcile, run one
//! command, suspend before exiting.

use std::rc::Rc;

use flexcounter_core::{
    dispatch, format_reading, Config, Database, Ledger, LifecycleSignal, SystemClock,
    TimerEngine, TimerEvent,
};

pub type Engine = TimerEngine<Rc<Database>, SystemClock>;

pub struct Host {
    pub config: Config,
    pub engine: Engine,
    pub ledger: Ledger<Rc<Database>>,
    /// What the load-time reconcile found, if there was a snapshot.
    pub reconciled: Option<TimerEvent>,
}

impl Host {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Rc::new(Database::open()?);

        let mut engine = TimerEngine::new(Rc::clone(&db), SystemClock);
        let reconciled = dispatch(&mut engine, LifecycleSignal::Load)?;
        if let Some(event) = &reconciled {
            tracing::debug!(?event, "reconciled on load");
        }

        let ledger = Ledger::load(db)?;
        Ok(Self {
            config,
            engine,
            ledger,
            reconciled,
        })
    }

    /// Suspend the engine. Runs on every exit path that reaches it.
    pub fn close(mut self) -> Result<(), Box<dyn std::error::Error>> {
        dispatch(&mut self.engine, LifecycleSignal::Unload)?;
        Ok(())
    }

    /// Format a reading according to the display settings.
    pub fn display(&self, secs: i64) -> String {
        format_reading(secs, self.config.display.show_overtime_sign)
    }

    /// Whether the load-time reconcile ran the countdown past zero.
    pub fn expired_on_load(&self) -> bool {
        self.reconciled.as_ref().is_some_and(TimerEvent::is_expiry)
    }
}
