//! Terminal and JSON rendering of controller state.

use console::Style;
use serde::Serialize;
use themekeeper::{ColorMode, ThemePreference};

/// Snapshot printed by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub preference: ThemePreference,
    pub appearance: ColorMode,
    pub class: String,
}

impl Status {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let label = Style::new().dim();
        format!(
            "{} {}\n{} {}\n{} {}\n",
            label.apply_to("preference:"),
            preference_style(self.preference).apply_to(self.preference),
            label.apply_to("appearance:"),
            mode_style(self.appearance).apply_to(self.appearance),
            label.apply_to("class:     "),
            self.class,
        )
    }
}

/// A single mode on its own line, styled.
pub fn mode_line(mode: ColorMode) -> String {
    format!("{}\n", mode_style(mode).apply_to(mode))
}

fn mode_style(mode: ColorMode) -> Style {
    match mode {
        ColorMode::Dark => Style::new().bold().blue(),
        ColorMode::Light => Style::new().bold().yellow(),
    }
}

fn preference_style(preference: ThemePreference) -> Style {
    match preference.concrete() {
        Some(mode) => mode_style(mode),
        None => Style::new().bold().cyan(),
    }
}
