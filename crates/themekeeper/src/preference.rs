//! Theme preference and resolved color mode.
//!
//! A [`ThemePreference`] is what the user asked for; a [`ColorMode`] is what
//! actually gets rendered. `System` only exists on the preference side: it is
//! always resolved against the OS signal before it reaches a surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The user's stored intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always render dark.
    Dark,
    /// Always render light.
    Light,
    /// Follow the operating system's color scheme.
    #[default]
    System,
}

impl ThemePreference {
    /// Every valid preference, in their canonical order.
    pub const ALL: [ThemePreference; 3] = [Self::Dark, Self::Light, Self::System];

    /// Parses a stored value.
    ///
    /// Total: every input maps to `Some` valid preference or `None`. Matching
    /// is exact, so `"Dark"` or `" dark"` are not preferences.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// The storage form of this preference.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::System => "system",
        }
    }

    /// The concrete mode this preference pins, or `None` for `System`.
    pub fn concrete(self) -> Option<ColorMode> {
        match self {
            Self::Dark => Some(ColorMode::Dark),
            Self::Light => Some(ColorMode::Light),
            Self::System => None,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `dark`, `light` or `system`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme preference '{0}' (expected dark, light or system)")]
pub struct ParsePreferenceError(pub String);

impl FromStr for ThemePreference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParsePreferenceError(s.to_string()))
    }
}

/// The appearance actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light mode (light background, dark text).
    Light,
    /// Dark mode (dark background, light text).
    Dark,
}

impl ColorMode {
    /// Maps the OS "prefers dark" signal to a mode.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// The other mode.
    pub fn flipped(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ColorMode> for ThemePreference {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Dark => ThemePreference::Dark,
            ColorMode::Light => ThemePreference::Light,
        }
    }
}
