//! Route command handler.

use anyhow::Context;
use std::path::Path;
use triplecull::config::TripleCullConfig;
use triplecull::io::open_source;
use triplecull::router::{ChannelSinks, RouteProgress};

/// Route command.
///
/// Text output prints `<kept> <intervals>` at every progress interval, then
/// `<kept> <total>` and `saved` once the channels are flushed.
pub fn cmd_route(
    config: &TripleCullConfig,
    input: &Path,
    generic: &Path,
    types: &Path,
    labels: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let router = config.triple_router();
    let mut source =
        open_source(input).with_context(|| format!("opening {}", input.display()))?;
    let mut sinks = ChannelSinks::create(generic, types, labels)
        .context("creating output channels")?;

    let mut print_progress = |p: &RouteProgress| println!("{} {}", p.kept, p.intervals);
    let progress: Option<&mut dyn FnMut(&RouteProgress)> = if json {
        None
    } else {
        Some(&mut print_progress)
    };

    let stats = router
        .route(&mut source, &mut sinks, progress)
        .with_context(|| format!("routing {}", input.display()))?;
    sinks.finish().context("closing output channels")?;

    if json {
        super::print_json(&stats)?;
    } else {
        println!("{} {}", stats.kept, stats.total);
        println!("saved");
    }
    Ok(())
}
