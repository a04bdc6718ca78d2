//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::HostEnv;
use crate::config::{Config, ConfigManager};
use crate::error::SwcacheResult;
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, env: &HostEnv) -> SwcacheResult<()> {
    let manager = ConfigManager::with_path(env.config_path().to_path_buf());

    match args.action {
        None | Some(ConfigAction::Show) => show_config(env.config())?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(&manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SwcacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if manager.exists().await && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    ui::remark(&ctx, "Set [controller] origin, then run: swcache install");

    Ok(())
}
