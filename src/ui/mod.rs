//! Terminal output for the CLI
//!
//! Uses `cliclack` for styled steps and prompts, with plain `[OK]` style
//! lines when stdout is not a terminal or a CI variable is set.
//!
//! ```rust,ignore
//! use swcache::ui::{self, TaskSpinner, UiContext};
//!
//! let ctx = UiContext::detect();
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Precaching https://example.com ...");
//! spinner.stop("Cached 16 resources");
//! ui::key_value(&ctx, "Version", "2");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, section, step_info,
    step_ok, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{PartitionProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, SwcacheTheme};
