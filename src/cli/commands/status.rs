//! Status command - show the registration and its partitions

use crate::cli::HostEnv;
use crate::error::SwcacheResult;
use crate::storage::CacheStorage;
use crate::ui::{self, UiContext};
use crate::worker::RegistrationRecord;

/// Execute the status command
pub async fn execute(env: &HostEnv) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "swcache status");

    ui::section(&ctx, "Paths");
    ui::key_value(&ctx, "Config", &env.config_path().display().to_string());
    ui::key_value(&ctx, "State", &env.state_dir().display().to_string());
    ui::key_value(&ctx, "Storage", &env.storage_dir().display().to_string());

    ui::section(&ctx, "Registration");
    let record = env.record().await?;
    match record {
        Some(ref record) => print_record(&ctx, record),
        None => ui::step_warn_hint(&ctx, "No controller registered", "Run: swcache install"),
    }

    ui::section(&ctx, "Partitions");
    let storage = env.storage();
    let partitions = storage.keys().await?;
    if partitions.is_empty() {
        ui::step_info(&ctx, "No cache partitions");
    }
    for name in &partitions {
        let count = storage.entries(name).await?.len();
        let current = record
            .as_ref()
            .map(|r| is_current(name, r))
            .unwrap_or(false);
        let label = if current { "current" } else { "stale" };
        ui::key_value_status(
            &ctx,
            name,
            &format!("{} entries ({})", count, label),
            current,
        );
    }

    Ok(())
}

fn print_record(ctx: &UiContext, record: &RegistrationRecord) {
    ui::key_value(ctx, "Origin", &record.origin);
    ui::key_value(ctx, "Version", record.version.as_str());
    ui::key_value_status(ctx, "State", &record.state.to_string(), record.is_active());
    ui::key_value(ctx, "Controller", &record.controller_id.to_string());
    if let Some(ref url) = record.registration_url {
        ui::key_value(ctx, "Registration URL", url);
    }
    ui::key_value(
        ctx,
        "Navigation preload",
        if record.navigation_preload { "enabled" } else { "disabled" },
    );
    ui::key_value(
        ctx,
        "Installed",
        &record.installed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    if let Some(activated) = record.activated_at {
        ui::key_value(
            ctx,
            "Activated",
            &activated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    }
}

fn is_current(partition: &str, record: &RegistrationRecord) -> bool {
    partition == format!("static-{}", record.version)
        || partition == format!("runtime-{}", record.version)
}
