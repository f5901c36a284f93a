//! The theme controller.
//!
//! [`ThemeController`] owns the preference and mediates between the three
//! ports: the durable [`PreferenceStore`], the rendered
//! [`AppearanceSurface`] and the OS [`ColorSchemeSignal`].
//!
//! ## Rendered state
//!
//! The surface is always either dark or light. `System` is an input that is
//! resolved against the OS signal before marking; it is never rendered and
//! never written by [`apply`](ThemeController::apply).
//!
//! ```text
//!            toggle
//!   Dark  <---------->  Light
//!     ^                   ^
//!     +---- apply(System) / OS change ----+
//! ```
//!
//! ## Example
//!
//! ```rust
//! use themekeeper::{ClassList, ColorMode, ManualSignal, MemoryStore, ThemeController, ThemePreference};
//!
//! let store = MemoryStore::new();
//! let os = ManualSignal::new(true);
//! let mut controller = ThemeController::new(store.clone(), ClassList::new(), os.clone());
//!
//! assert_eq!(controller.initialize().unwrap(), ThemePreference::System);
//! assert_eq!(controller.appearance(), ColorMode::Dark);
//! assert!(store.is_empty());
//!
//! assert_eq!(controller.toggle().unwrap(), ColorMode::Light);
//! assert_eq!(store.get("theme").as_deref(), Some("light"));
//! ```

use std::sync::Arc;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::signal::{ColorSchemeSignal, Subscription};
use crate::store::PreferenceStore;
use crate::surface::AppearanceSurface;
use crate::{ColorMode, ThemeError, ThemePreference};

/// Owns the theme preference for one page or session.
///
/// Generic over the store `S`, the rendered surface `V` and the OS signal
/// `O`. The surface is shared with the OS-change listener registered by
/// [`initialize`](Self::initialize), hence the `Arc`.
pub struct ThemeController<S, V, O> {
    store: S,
    surface: Arc<V>,
    signal: O,
    key: String,
    bootstrap: Option<Subscription>,
}

impl<S, V, O> ThemeController<S, V, O>
where
    S: PreferenceStore,
    V: AppearanceSurface + 'static,
    O: ColorSchemeSignal,
{
    /// Create a controller storing the preference under `"theme"`.
    pub fn new(store: S, surface: V, signal: O) -> Self {
        Self {
            store,
            surface: Arc::new(surface),
            signal,
            key: DEFAULT_STORAGE_KEY.to_string(),
            bootstrap: None,
        }
    }

    /// Store the preference under `key` instead.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The key the preference is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The durable store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The surface the appearance is rendered on.
    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// The OS color scheme signal.
    pub fn signal(&self) -> &O {
        &self.signal
    }

    /// The mode currently rendered.
    pub fn appearance(&self) -> ColorMode {
        self.surface.appearance()
    }

    /// Reads the stored preference.
    ///
    /// A missing or unrecognized value yields `System`, and the OS-resolved
    /// appearance is applied on the spot. The bad value is left in storage
    /// untouched until a concrete choice overwrites it.
    pub fn preference(&self) -> Result<ThemePreference, ThemeError> {
        let stored = self.store.load(&self.key)?;
        match stored.as_deref().and_then(ThemePreference::parse) {
            Some(preference) => Ok(preference),
            None => {
                let preference = ThemePreference::default();
                self.apply(preference)?;
                Ok(preference)
            }
        }
    }

    /// Renders `mode`.
    ///
    /// `Dark` and `Light` are persisted, then marked; if the write fails the
    /// surface is left as it was. `System` reads the OS signal once, marks
    /// the result and persists nothing, so the "follow the OS" intent
    /// survives. Returns the mode now rendered.
    pub fn apply(&self, mode: ThemePreference) -> Result<ColorMode, ThemeError> {
        match mode.concrete() {
            Some(concrete) => {
                self.persist(mode)?;
                self.surface.mark(concrete);
                Ok(concrete)
            }
            None => {
                let resolved = self.signal.resolve();
                self.surface.mark(resolved);
                Ok(resolved)
            }
        }
    }

    /// Writes `mode` to storage verbatim.
    pub fn persist(&self, mode: ThemePreference) -> Result<(), ThemeError> {
        self.store.save(&self.key, mode.as_str())?;
        tracing::debug!(key = %self.key, %mode, "persisted preference");
        Ok(())
    }

    /// Flips the rendered appearance and records the result.
    ///
    /// Looks only at the surface, never at storage.
    pub fn toggle(&self) -> Result<ColorMode, ThemeError> {
        let next = self.appearance().flipped();
        self.apply(next.into())
    }

    /// Makes `preference` the user's choice.
    ///
    /// Same as [`apply`](Self::apply) for `Dark` and `Light`. For `System`
    /// the stored concrete choice is removed first, so later sessions follow
    /// the OS too.
    pub fn select(&self, preference: ThemePreference) -> Result<ColorMode, ThemeError> {
        if preference == ThemePreference::System {
            self.store.remove(&self.key)?;
            tracing::debug!(key = %self.key, "cleared stored preference");
        }
        self.apply(preference)
    }

    /// Registers `on_change` for OS color scheme transitions.
    ///
    /// The registration is permanent unless the returned handle is
    /// unsubscribed.
    pub fn subscribe_to_system_changes<F>(&self, on_change: F) -> Subscription
    where
        F: FnMut(ColorMode) + Send + 'static,
    {
        self.signal.subscribe(Box::new(on_change))
    }

    /// Page-load bootstrap.
    ///
    /// Reads the preference, starts marking the surface directly on OS
    /// changes (never persisting them), then applies the preference. A
    /// second call replaces the listener from the first one instead of
    /// adding another.
    pub fn initialize(&mut self) -> Result<ThemePreference, ThemeError> {
        let preference = self.preference()?;

        if let Some(previous) = self.bootstrap.take() {
            previous.unsubscribe();
        }
        let surface = Arc::clone(&self.surface);
        self.bootstrap = Some(self.subscribe_to_system_changes(move |mode| surface.mark(mode)));

        self.apply(preference)?;
        tracing::debug!(%preference, appearance = %self.appearance(), "initialized theme");
        Ok(preference)
    }
}

impl<S, V, O> std::fmt::Debug for ThemeController<S, V, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeController")
            .field("key", &self.key)
            .field("initialized", &self.bootstrap.is_some())
            .finish_non_exhaustive()
    }
}
