//! Cache command - list or clear cache partitions

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::HostEnv;
use crate::error::SwcacheResult;
use crate::storage::{CacheStorage, EntryInfo};
use crate::ui::{self, PartitionProgress, UiContext};
use crate::worker::RegistrationRecord;
use console::style;
use serde::Serialize;
use tracing::{debug, warn};

/// One partition and its entries
#[derive(Debug, Serialize)]
struct PartitionListing {
    name: String,
    entries: Vec<EntryInfo>,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, env: &HostEnv) -> SwcacheResult<()> {
    let storage = env.storage();

    match args.action {
        CacheAction::List { format } => list_partitions(&*storage, format).await,
        CacheAction::Clear { yes } => clear_partitions(&*storage, env, yes).await,
    }
}

async fn list_partitions(storage: &dyn CacheStorage, format: OutputFormat) -> SwcacheResult<()> {
    let mut listings = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entries(&name).await?;
        listings.push(PartitionListing { name, entries });
    }

    if listings.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::step_info(&UiContext::detect(), "No cache partitions"),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&listings),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
        OutputFormat::Plain => print_plain(&listings),
    }

    Ok(())
}

fn print_table(listings: &[PartitionListing]) {
    println!(
        "{:<14} {:<6} {:>10} {:<17} {}",
        style("PARTITION").bold(),
        style("STATUS").bold(),
        style("SIZE").bold(),
        style("CACHED").bold(),
        style("KEY").bold()
    );
    println!("{}", "-".repeat(80));

    let mut total = 0;
    for listing in listings {
        if listing.entries.is_empty() {
            println!("{:<14} {}", listing.name, style("(empty)").dim());
        }
        for entry in &listing.entries {
            let status = if (200..300).contains(&entry.status) {
                style(entry.status).green()
            } else {
                style(entry.status).yellow()
            };
            println!(
                "{:<14} {:<6} {:>10} {:<17} {}",
                listing.name,
                status,
                format_size(entry.size),
                entry.cached_at.format("%Y-%m-%d %H:%M"),
                entry.key
            );
        }
        total += listing.entries.len();
    }

    println!();
    println!("{} partition(s), {} entr(ies)", listings.len(), total);
}

fn print_plain(listings: &[PartitionListing]) {
    for listing in listings {
        for entry in &listing.entries {
            println!("{}\t{}", listing.name, entry.key);
        }
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    match bytes {
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}

/// Delete every partition, then forget the registration
async fn clear_partitions(
    storage: &dyn CacheStorage,
    env: &HostEnv,
    yes: bool,
) -> SwcacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let partitions = storage.keys().await?;

    if partitions.is_empty() {
        ui::step_info(&ctx, "No cache partitions to clear");
        return Ok(());
    }

    println!("This will delete {} partition(s):", partitions.len());
    for name in &partitions {
        println!("  {} {}", style("•").red(), name);
    }
    println!();

    let confirmed = ui::confirm(
        &ctx,
        &format!("Delete {} partition(s)?", partitions.len()),
        false,
    )
    .await?;
    if !confirmed {
        ui::remark(&ctx, "Aborted. Pass --yes to skip confirmation");
        return Ok(());
    }

    let progress = PartitionProgress::new(&ctx, "Deleting", partitions.len());
    let mut failed = 0;
    for name in &partitions {
        match storage.delete(name).await {
            Ok(_) => {
                debug!("Deleted partition {}", name);
                progress.advance(name, true);
            }
            Err(e) => {
                warn!("Failed to delete partition {}: {}", name, e);
                progress.advance(name, false);
                failed += 1;
            }
        }
    }
    progress.finish();

    RegistrationRecord::delete(env.state_dir()).await?;

    if failed == 0 {
        ui::outro_success(
            &ctx,
            &format!("Cleared {} partition(s); registration removed", partitions.len()),
        );
    } else {
        ui::outro_warn(&ctx, &format!("{} partition(s) could not be deleted", failed));
    }

    Ok(())
}
