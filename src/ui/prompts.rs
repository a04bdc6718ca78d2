//! Confirmation prompt with non-interactive fallback

use super::context::UiContext;
use crate::error::{SwcacheError, SwcacheResult};

/// Ask a yes/no question.
///
/// Auto-yes answers true; a non-interactive context answers `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> SwcacheResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| SwcacheError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| SwcacheError::User(format!("Prompt failed: {}", e)))
}
