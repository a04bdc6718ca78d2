//! Install command - register a controller version and precache the origin

use crate::cli::args::InstallArgs;
use crate::cli::HostEnv;
use crate::config::ConfigManager;
use crate::controller::{CacheVersion, ControllerState};
use crate::error::SwcacheResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::RegistrationRecord;
use chrono::Utc;
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, env: &HostEnv) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    let origin = env.origin(args.origin.as_deref())?;
    let registration_url = args
        .registration_url
        .clone()
        .or_else(|| env.config().controller.registration_url.clone());

    let version = match (&args.cache_version, &args.registration_url) {
        (Some(version), _) => CacheVersion::new(version.as_str()),
        (None, Some(url)) => CacheVersion::from_registration_url(url),
        (None, None) => env.config().controller.cache_version(),
    };

    ConfigManager::ensure_state_dirs(env.state_dir(), env.storage_dir()).await?;
    let registration = env.registration(&origin, false).await?;
    let manifest_len = env.config().controller.precache.len();

    ui::intro(&ctx, &format!("Installing version {} for {}", version, origin));

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Precaching {} resource(s)...", manifest_len));

    let outcome = match registration.register_version(version).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.stop_error("Install failed");
            return Err(e);
        }
    };
    spinner.stop(&format!(
        "Cached {} resource(s) in static-{}",
        outcome.install.cached, outcome.install.version
    ));

    let now = Utc::now();
    let state = if outcome.activate.is_some() {
        ControllerState::Activated
    } else {
        ControllerState::Installed
    };
    let record = RegistrationRecord {
        controller_id: outcome.controller_id,
        origin: origin.clone(),
        version: outcome.install.version.clone(),
        registration_url,
        state,
        navigation_preload: registration.navigation_preload_enabled(),
        installed_at: now,
        activated_at: outcome.activate.as_ref().map(|_| now),
    };
    record.save(env.state_dir()).await?;
    debug!("Saved registration record for {}", record.controller_id);

    match outcome.activate {
        Some(report) => {
            for partition in &report.deleted {
                ui::step_ok_detail(&ctx, "Deleted stale partition", partition);
            }
            for partition in &report.failed {
                ui::step_warn_hint(
                    &ctx,
                    &format!("Could not delete {}", partition),
                    "Run: swcache cache clear",
                );
            }
            ui::key_value(&ctx, "Controller", &record.controller_id.to_string());
            ui::key_value_status(
                &ctx,
                "Navigation preload",
                if report.navigation_preload { "enabled" } else { "unavailable" },
                report.navigation_preload,
            );
            ui::outro_success(&ctx, &format!("Version {} is active", record.version));
        }
        None => {
            ui::outro_warn(
                &ctx,
                &format!("Version {} installed, waiting to activate", record.version),
            );
        }
    }

    Ok(())
}
