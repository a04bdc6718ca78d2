//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Blue bars, green on submit
#[derive(Debug, Clone, Default)]
pub struct SwcacheTheme;

impl cliclack::Theme for SwcacheTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for every later prompt
pub fn init_theme() {
    cliclack::set_theme(SwcacheTheme);
}
