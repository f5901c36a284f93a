//! Light/dark/system theme persistence.
//!
//! `themekeeper` decides, stores and displays a user's color-scheme
//! preference and keeps the rendered appearance in step with the operating
//! system's dark-mode signal.
//!
//! # Concepts
//!
//! - [`ThemePreference`]: what the user asked for: `dark`, `light` or `system`
//! - [`ColorMode`]: what is rendered: `dark` or `light`, never `system`
//! - [`ThemeController`]: reads, applies, persists and toggles the preference
//!
//! # Ports
//!
//! The controller touches the outside world only through three traits, each
//! with a real and an in-memory implementation:
//!
//! | Trait | Real | Testing |
//! |-------|------|---------|
//! | [`PreferenceStore`] | [`FileStore`] | [`MemoryStore`] |
//! | [`AppearanceSurface`] | [`ClassList`] | [`ClassList`] |
//! | [`ColorSchemeSignal`] | [`OsSignal`] | [`ManualSignal`] |
//!
//! # Quick Start
//!
//! ```no_run
//! use themekeeper::{ClassList, FileStore, OsSignal, ThemeConfig, ThemeController};
//!
//! let config = ThemeConfig::default().with_env_overrides()?;
//! let mut controller = ThemeController::new(
//!     FileStore::new(config.resolved_state_file()?),
//!     ClassList::new(),
//!     OsSignal::new().with_poll_interval(config.poll_interval()),
//! )
//! .with_key(config.storage_key.clone());
//!
//! controller.initialize()?;
//! controller.toggle()?;
//! # Ok::<(), themekeeper::ThemeError>(())
//! ```
//!
//! # Invalid storage
//!
//! A stored value other than `dark`, `light` or `system` is treated as
//! absent: the preference reads as `system` and the OS-resolved appearance is
//! rendered. This is not reported as an error.

pub mod config;
mod controller;
mod error;
mod preference;
pub mod signal;
pub mod store;
pub mod surface;

pub use config::ThemeConfig;
pub use controller::ThemeController;
pub use error::ThemeError;
pub use preference::{ColorMode, ParsePreferenceError, ThemePreference};

pub use signal::{ChangeHandler, ColorSchemeSignal, ManualSignal, OsSignal, Subscription};
pub use store::{FileStore, MemoryStore, PreferenceStore};
pub use surface::{AppearanceSurface, ClassList, DARK_CLASS};
