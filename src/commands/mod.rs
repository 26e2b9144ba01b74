//! Command handlers module.
//!
//! - `route.rs`: Triple routing command
//! - `dedupe.rs`: Merge deduplication command
//! - `config.rs`: Configuration display command

mod config;
mod dedupe;
mod route;

pub use config::cmd_config;
pub use dedupe::cmd_dedupe;
pub use route::cmd_route;

use serde::Serialize;

/// Prints a summary as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
