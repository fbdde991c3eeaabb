//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `localestore_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use localestore_core::db::migrations::latest_version;
use localestore_core::{open_session_in_memory, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("localestore_core ping={}", localestore_core::ping());
    println!("localestore_core version={}", localestore_core::core_version());
    println!("localestore_core schema_version={}", latest_version());

    let config = CoreConfig::default();
    match open_session_in_memory(&config) {
        Ok(session) => {
            println!(
                "localestore_core default_locale={} pending={}",
                config.default_locale,
                session.pending_changes()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("localestore_core open failed: {err}");
            ExitCode::FAILURE
        }
    }
}
