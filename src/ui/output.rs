//! Step and summary output
//!
//! Every line has two renderings: cliclack log lines on a terminal, and
//! bracketed tags (`[OK]`, `[WARN]`, `[INFO]`) for CI logs and pipes.

use super::context::UiContext;
use console::{style, Style};

/// Tag printed in front of a plain-mode step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Ok,
    Warn,
    Info,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Tag::Ok => "[OK]",
            Tag::Warn => "[WARN]",
            Tag::Info => "[INFO]",
        }
    }

    fn style(self) -> Style {
        match self {
            Tag::Ok => Style::new().green(),
            Tag::Warn => Style::new().yellow(),
            Tag::Info => Style::new().cyan(),
        }
    }

    fn plain(self) -> String {
        self.style().apply_to(self.label()).to_string()
    }
}

fn step(ctx: &UiContext, tag: Tag, message: &str) {
    if !ctx.use_fancy_output() {
        println!("  {} {}", tag.plain(), message);
        return;
    }

    let shown = match tag {
        Tag::Ok => cliclack::log::success(message),
        Tag::Warn => cliclack::log::warning(message),
        Tag::Info => cliclack::log::info(message),
    };
    shown.ok();
}

fn outro(ctx: &UiContext, tag: Tag, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(tag.style().bold().apply_to(message)).ok();
    } else {
        println!();
        println!("{} {}", tag.plain(), message);
    }
}

/// Command banner, e.g. `swcache status`
pub fn intro(ctx: &UiContext, title: &str) {
    let banner = style(title).blue().bold();
    if ctx.use_fancy_output() {
        cliclack::intro(banner).ok();
    } else {
        println!("{}\n", banner);
    }
}

pub fn outro_success(ctx: &UiContext, message: &str) {
    outro(ctx, Tag::Ok, message);
}

/// Closing line for a command that finished with partial failures
pub fn outro_warn(ctx: &UiContext, message: &str) {
    outro(ctx, Tag::Warn, message);
}

/// Blank line, then a bold heading such as "Partitions"
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    let heading = style(title).bold();
    if ctx.use_fancy_output() {
        cliclack::log::info(heading).ok();
    } else {
        println!("{}", heading);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Ok, message);
}

/// Success line with a dimmed detail, typically a path or a count
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Tag::Ok, &format!("{} ({})", message, detail));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Warn, message);
}

/// Warning followed by the command that resolves it
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    let hint = if ctx.use_fancy_output() {
        style(hint).dim().to_string()
    } else {
        hint.to_string()
    };
    step(ctx, Tag::Warn, &format!("{} - {}", message, hint));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Info, message);
}

/// Dimmed follow-up line
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim().to_string()
    } else {
        key.to_string()
    };
    println!("  {}: {}", key, value);
}

/// Key-value pair marked by whether the value is current, e.g. a partition
/// of the active version versus a stale one
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let tag = if ok { Tag::Ok } else { Tag::Warn };
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), tag.style().apply_to(value));
    } else {
        println!("  {} {}: {}", tag.label(), key, value);
    }
}
