//! Config command handler.
//!
//! Prints the effective configuration after file and environment layers are
//! applied.

use triplecull::config::TripleCullConfig;

/// Config command.
pub fn cmd_config(config: &TripleCullConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return super::print_json(config);
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Router:");
    println!("  Progress Interval: {}", config.router.progress_interval);
    println!(
        "  Blocked Predicates: {}",
        config.filter_policy().blocked_len()
    );
    for predicate in &config.router.extra_blocked_predicates {
        println!("    + {predicate}");
    }
    println!();

    println!("Sort:");
    println!("  Chunk Bytes: {}", config.sort.chunk_bytes);
    println!("  Merge Fan-In: {}", config.sort.merge_fan_in);
    println!("  Scratch Dir: {}", config.scratch_dir().display());
    println!();

    println!("Logging:");
    println!(
        "  Level: {}",
        config.logging.level.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    match &config.logging.file {
        Some(file) => println!("  File: {}", file.display()),
        None => println!("  File: (stderr)"),
    }

    Ok(())
}
