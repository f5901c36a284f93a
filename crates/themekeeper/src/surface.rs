//! The visual state the controller drives.
//!
//! A surface carries a single "is dark" marker. Everything else about the
//! look of a page (palette, typography) keys off that marker and is not
//! this crate's concern.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ColorMode;

/// The class name that marks the document root as dark.
pub const DARK_CLASS: &str = "dark";

/// Abstraction over the rendered appearance.
///
/// Takes `&self` so the OS-change listener can mark the surface from the
/// signal's delivery thread while the controller holds it too.
pub trait AppearanceSurface: Send + Sync {
    /// Render `mode`.
    fn mark(&self, mode: ColorMode);

    /// Whether the surface currently renders dark.
    fn is_dark(&self) -> bool;

    /// The mode currently rendered.
    fn appearance(&self) -> ColorMode {
        ColorMode::from_prefers_dark(self.is_dark())
    }
}

impl<S: AppearanceSurface + ?Sized> AppearanceSurface for Arc<S> {
    fn mark(&self, mode: ColorMode) {
        (**self).mark(mode)
    }

    fn is_dark(&self) -> bool {
        (**self).is_dark()
    }
}

/// The class list of a document root.
///
/// `dark` present means dark; absent means light. Other classes placed by
/// page shells are left alone.
#[derive(Debug, Default)]
pub struct ClassList {
    classes: Mutex<BTreeSet<String>>,
}

impl ClassList {
    /// Create an empty class list (renders light).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a class list from a whitespace-separated `class` attribute.
    pub fn from_attribute(attr: &str) -> Self {
        Self {
            classes: Mutex::new(attr.split_whitespace().map(str::to_string).collect()),
        }
    }

    pub fn add(&self, class: &str) {
        self.lock().insert(class.to_string());
    }

    pub fn remove(&self, class: &str) {
        self.lock().remove(class);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.lock().contains(class)
    }

    /// Renders the `class` attribute value: sorted, space-separated.
    pub fn to_attribute(&self) -> String {
        self.lock()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppearanceSurface for ClassList {
    fn mark(&self, mode: ColorMode) {
        match mode {
            ColorMode::Dark => self.add(DARK_CLASS),
            ColorMode::Light => self.remove(DARK_CLASS),
        }
        tracing::debug!(%mode, "marked surface");
    }

    fn is_dark(&self) -> bool {
        self.contains(DARK_CLASS)
    }
}
