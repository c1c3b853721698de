//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pursuit_core` linkage and run one full ledger lifecycle.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `pursuit_cli [DB_PATH]`. Without a path the ledger lives in memory.
//! `PURSUIT_LOG_DIR` enables file logging; `PURSUIT_LOG_LEVEL` overrides the
//! default level.

use pursuit_core::db::{open_db, open_db_in_memory};
use pursuit_core::{
    default_log_level, init_logging, CallContext, Identity, PursuitLedger, SqliteLedgerRepository,
};
use std::error::Error;
use std::process::ExitCode;

const DEMO_CALLER: &str = "smoke.runner";
const DEMO_BLOCK_HEIGHT: u64 = 1_000;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pursuit_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("PURSUIT_LOG_DIR") {
        let level = std::env::var("PURSUIT_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().as_str().to_string());
        init_logging(&level, &log_dir)?;
    }

    println!("pursuit_core ping={}", pursuit_core::ping());
    println!("pursuit_core version={}", pursuit_core::core_version());

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let mut ledger = PursuitLedger::new(SqliteLedgerRepository::try_new(&conn)?);
    let ctx = CallContext::new(Identity::new(DEMO_CALLER)?, DEMO_BLOCK_HEIGHT);

    // Start from a clean slate when pointed at an existing database.
    if ledger.validate_presence(&ctx)?.present {
        ledger.eliminate(&ctx)?;
    }
    for confirmation in [
        ledger.inscribe(&ctx, "Run a marathon")?,
        ledger.classify_weight(&ctx, 2)?,
        ledger.establish_deadline(&ctx, 50)?,
        ledger.modify(&ctx, "Run a marathon this year", true)?,
    ] {
        println!("ok: {confirmation}");
    }

    let report = ledger.validate_presence(&ctx)?;
    println!("presence={}", serde_json::to_string(&report)?);
    log::info!(
        "event=cli_smoke module=cli status=ok present={} description_length={}",
        report.present,
        report.description_length
    );
    Ok(())
}
