//! The operating system's color-scheme signal.
//!
//! [`ColorSchemeSignal`] exposes the current "prefers dark" value and change
//! notifications. [`OsSignal`] asks the OS through the `dark-light` crate and
//! watches it from a background thread; [`ManualSignal`] is driven by hand
//! for tests and for hosts that receive scheme changes from elsewhere.
//!
//! ```rust
//! use themekeeper::{ColorMode, ColorSchemeSignal, ManualSignal};
//! use std::sync::{Arc, Mutex};
//!
//! let signal = ManualSignal::new(false);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let _subscription = signal.subscribe(Box::new(move |mode| sink.lock().unwrap().push(mode)));
//!
//! signal.set_prefers_dark(true);
//! assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::Duration;

use dark_light::Mode as OsThemeMode;

use crate::ColorMode;

/// Callback invoked with the new appearance on every OS transition.
pub type ChangeHandler = Box<dyn FnMut(ColorMode) + Send + 'static>;

/// Abstraction over the OS "prefers dark color scheme" signal.
pub trait ColorSchemeSignal: Send + Sync {
    /// Whether the OS prefers dark right now.
    fn prefers_dark(&self) -> bool;

    /// Register `handler` for scheme transitions.
    ///
    /// The handler fires once per transition with the new mode. The
    /// registration lasts until [`Subscription::unsubscribe`] is called;
    /// dropping the handle leaves it in place.
    fn subscribe(&self, handler: ChangeHandler) -> Subscription;

    /// The current OS preference as a mode.
    fn resolve(&self) -> ColorMode {
        ColorMode::from_prefers_dark(self.prefers_dark())
    }
}

impl<S: ColorSchemeSignal + ?Sized> ColorSchemeSignal for Arc<S> {
    fn prefers_dark(&self) -> bool {
        (**self).prefers_dark()
    }

    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        (**self).subscribe(handler)
    }
}

/// Handle to a registered change handler.
///
/// Registrations are permanent by default: dropping a `Subscription` does
/// nothing. Call [`unsubscribe`](Self::unsubscribe) to end one.
#[must_use = "dropping a Subscription keeps the handler registered forever"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a handle that runs `cancel` when unsubscribed.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// Stop delivering changes to the handler.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// === Real implementation ===

/// Function used to read the OS color scheme.
pub type Detector = fn() -> ColorMode;

/// Default period between OS polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Signal backed by the operating system.
///
/// The OS has no portable change notification, so each subscription runs a
/// watcher thread that polls the detector and fires only on transitions.
/// Once [`Subscription::unsubscribe`] returns the handler is never called
/// again; a call already in progress finishes first, so a handler must not
/// unsubscribe its own subscription.
#[derive(Debug, Clone)]
pub struct OsSignal {
    detector: Detector,
    poll_interval: Duration,
}

impl Default for OsSignal {
    fn default() -> Self {
        Self {
            detector: os_theme_detector,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl OsSignal {
    /// Create a signal that asks the OS through `dark-light`, polling every
    /// [`DEFAULT_POLL_INTERVAL`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the period between polls of the detector.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Replace the OS query, e.g. to force a mode.
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detector = detector;
        self
    }

    /// The period between polls of the detector.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl ColorSchemeSignal for OsSignal {
    fn prefers_dark(&self) -> bool {
        (self.detector)() == ColorMode::Dark
    }

    fn subscribe(&self, mut handler: ChangeHandler) -> Subscription {
        let detector = self.detector;
        let interval = self.poll_interval;
        // Held while the handler runs, so unsubscribing waits for an
        // in-flight call and no call starts after it.
        let stopped = Arc::new(Mutex::new(false));
        let gate = stopped.clone();
        let mut last = detector();

        let spawned = thread::Builder::new()
            .name("themekeeper-watch".into())
            .spawn(move || loop {
                thread::sleep(interval);
                let now = detector();
                let stopped = gate.lock().unwrap_or_else(PoisonError::into_inner);
                if *stopped {
                    break;
                }
                if now != last {
                    tracing::debug!(from = %last, to = %now, "OS color scheme changed");
                    last = now;
                    handler(now);
                }
            });

        match spawned {
            Ok(_) => Subscription::new(move || {
                *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
            }),
            Err(e) => {
                tracing::warn!(error = %e, "could not start color scheme watcher");
                Subscription::inert()
            }
        }
    }
}

fn os_theme_detector() -> ColorMode {
    match dark_light::detect() {
        Ok(OsThemeMode::Dark) => ColorMode::Dark,
        Ok(OsThemeMode::Light) | Ok(OsThemeMode::Unspecified) => ColorMode::Light,
        Err(e) => {
            tracing::debug!(error = %e, "OS color scheme detection failed, assuming light");
            ColorMode::Light
        }
    }
}

// === Manual implementation ===

type SharedHandler = Arc<Mutex<ChangeHandler>>;

#[derive(Default)]
struct ManualState {
    prefers_dark: bool,
    next_id: u64,
    handlers: Vec<(u64, SharedHandler)>,
}

/// Signal whose value is set by the caller.
///
/// Clones share state: keep one handle to drive changes while the
/// controller owns another. Handlers run synchronously inside
/// [`set_prefers_dark`](Self::set_prefers_dark), one at a time, with no
/// internal lock held. A handler may change the signal again; that nested
/// change skips the handler that is still running.
#[derive(Clone, Default)]
pub struct ManualSignal {
    state: Arc<Mutex<ManualState>>,
}

impl ManualSignal {
    /// Create a signal reporting `prefers_dark`, with no listeners.
    pub fn new(prefers_dark: bool) -> Self {
        let signal = Self::default();
        signal.lock().prefers_dark = prefers_dark;
        signal
    }

    /// Change the OS preference.
    ///
    /// Notifies every handler if the value actually changed and returns how
    /// many were notified. Setting the current value again notifies nobody.
    /// Handlers that are already running (because this call is nested inside
    /// one of them, or another thread is delivering) are skipped.
    pub fn set_prefers_dark(&self, prefers_dark: bool) -> usize {
        let handlers: Vec<SharedHandler> = {
            let mut state = self.lock();
            if state.prefers_dark == prefers_dark {
                return 0;
            }
            state.prefers_dark = prefers_dark;
            state.handlers.iter().map(|(_, h)| h.clone()).collect()
        };

        let mode = ColorMode::from_prefers_dark(prefers_dark);
        let mut notified = 0;
        for handler in &handlers {
            let mut handler = match handler.try_lock() {
                Ok(handler) => handler,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            };
            (&mut *handler)(mode);
            notified += 1;
        }
        notified
    }

    /// Number of live registrations.
    pub fn listener_count(&self) -> usize {
        self.lock().handlers.len()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ColorSchemeSignal for ManualSignal {
    fn prefers_dark(&self) -> bool {
        self.lock().prefers_dark
    }

    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        let id = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.handlers.push((id, Arc::new(Mutex::new(handler))));
            id
        };

        let state = self.state.clone();
        Subscription::new(move || {
            state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handlers
                .retain(|(other, _)| *other != id);
        })
    }
}

impl fmt::Debug for ManualSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualSignal")
            .field("prefers_dark", &state.prefers_dark)
            .field("listeners", &state.handlers.len())
            .finish()
    }
}
