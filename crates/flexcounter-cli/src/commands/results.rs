use chrono::Local;
use clap::Subcommand;
use serde_json::json;

use super::print_json;
use crate::host::Host;

#[derive(Subcommand)]
pub enum ResultsAction {
    /// Save the current reading as a finished session and reset the timer
    Save {
        /// Session label (default: ledger.default_label)
        label: Option<String>,
    },
    /// List saved sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Session count, over/under totals and balance as JSON
    Summary,
    /// Delete every saved session and zero the balance
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: ResultsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = Host::open()?;
    let result = handle(&mut host, action);
    host.close()?;
    result
}

fn handle(host: &mut Host, action: ResultsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ResultsAction::Save { label } => {
            let label = label.unwrap_or_else(|| host.config.ledger.default_label.clone());
            let entry = host.ledger.save(&mut host.engine, &label)?;
            print_json(&json!({
                "type": "SessionSaved",
                "entry": entry,
                "balance": host.ledger.balance(),
            }))?;
        }
        ResultsAction::List { json } => {
            if json {
                print_json(host.ledger.entries())?;
                return Ok(());
            }
            if host.ledger.entries().is_empty() {
                println!("No saved sessions.");
                return Ok(());
            }
            for (i, entry) in host.ledger.entries().iter().enumerate() {
                println!(
                    "{:>3}  {}  {:>10}  {}",
                    i + 1,
                    entry.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    host.display(entry.seconds_over_under),
                    entry.label,
                );
            }
            println!("balance: {}", host.display(host.ledger.balance()));
        }
        ResultsAction::Summary => {
            print_json(&host.ledger.summary())?;
        }
        ResultsAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear results without --yes".into());
            }
            host.ledger.clear()?;
            println!("results cleared");
        }
    }
    Ok(())
}
