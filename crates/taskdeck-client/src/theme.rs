//! Theme preference handling.
//!
//! The resolver owns the user's [`ThemePreference`], persists it through a
//! [`PreferenceStore`] and derives the [`EffectiveTheme`] from it and the
//! OS color-scheme signal exposed by a [`SystemScheme`]. While the preference
//! is `system` it holds a subscription to OS changes; the subscription is a
//! guard value that is released by dropping it, either on leaving `system` or
//! when the resolver itself is dropped.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use taskdeck_shared::{EffectiveTheme, THEME_STORAGE_KEY, ThemePreference, resolve_theme};
use tracing::{debug, warn};

/// Key-value persistence for client preferences.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str);
}

impl<T: PreferenceStore> PreferenceStore for Rc<T> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) {
        (**self).store(key, value)
    }
}

/// Source of the OS color-scheme preference.
pub trait SystemScheme {
    /// Dropping the subscription stops notifications.
    type Subscription;

    fn current(&self) -> EffectiveTheme;

    fn subscribe(&self, on_change: Rc<dyn Fn(EffectiveTheme)>) -> Self::Subscription;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeSnapshot {
    pub preference: ThemePreference,
    pub effective: EffectiveTheme,
}

pub fn load_preference<P: PreferenceStore>(store: &P) -> ThemePreference {
    match store.load(THEME_STORAGE_KEY) {
        None => ThemePreference::default(),
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring stored theme preference");
            ThemePreference::default()
        }),
    }
}

struct ThemeState<P> {
    store: P,
    snapshot: ThemeSnapshot,
    apply: Rc<dyn Fn(ThemeSnapshot)>,
}

impl<P: PreferenceStore> ThemeState<P> {
    fn recompute(state: &RefCell<Self>, preference: ThemePreference, system: EffectiveTheme) {
        let (snapshot, apply) = {
            let mut state = state.borrow_mut();
            state.snapshot = ThemeSnapshot {
                preference,
                effective: resolve_theme(preference, system),
            };
            state.store.store(THEME_STORAGE_KEY, preference.as_str());
            (state.snapshot, Rc::clone(&state.apply))
        };

        debug!(
            preference = %snapshot.preference,
            effective = %snapshot.effective,
            "theme recomputed"
        );
        apply(snapshot);
    }

    fn on_system_change(state: &RefCell<Self>, system: EffectiveTheme) {
        let preference = state.borrow().snapshot.preference;
        if preference == ThemePreference::System {
            Self::recompute(state, preference, system);
        }
    }
}

pub struct ThemeResolver<P, S: SystemScheme> {
    state: Rc<RefCell<ThemeState<P>>>,
    scheme: S,
    subscription: Option<S::Subscription>,
}

impl<P, S> ThemeResolver<P, S>
where
    P: PreferenceStore + 'static,
    S: SystemScheme,
{
    /// Loads the stored preference (default `system`) and applies the
    /// resulting theme once before returning.
    pub fn new(store: P, scheme: S, apply: impl Fn(ThemeSnapshot) + 'static) -> Self {
        let preference = load_preference(&store);
        let state = Rc::new(RefCell::new(ThemeState {
            store,
            snapshot: ThemeSnapshot {
                preference,
                effective: resolve_theme(preference, scheme.current()),
            },
            apply: Rc::new(apply),
        }));

        let mut resolver = Self {
            state,
            scheme,
            subscription: None,
        };
        resolver.transition(preference);
        resolver
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        self.state.borrow().snapshot
    }

    pub fn preference(&self) -> ThemePreference {
        self.snapshot().preference
    }

    pub fn effective(&self) -> EffectiveTheme {
        self.snapshot().effective
    }

    pub fn is_following_system(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn set_preference(&mut self, preference: ThemePreference) {
        self.transition(preference);
    }

    fn transition(&mut self, preference: ThemePreference) {
        if preference == ThemePreference::System {
            if self.subscription.is_none() {
                let weak: Weak<RefCell<ThemeState<P>>> = Rc::downgrade(&self.state);
                let on_change: Rc<dyn Fn(EffectiveTheme)> = Rc::new(move |system| {
                    if let Some(state) = weak.upgrade() {
                        ThemeState::on_system_change(&state, system);
                    }
                });
                self.subscription = Some(self.scheme.subscribe(on_change));
                debug!("subscribed to system color scheme");
            }
        } else if self.subscription.take().is_some() {
            debug!("released system color scheme subscription");
        }

        ThemeState::recompute(&self.state, preference, self.scheme.current());
    }
}

/// In-memory store, used where no persistent storage is available.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.store(key, value);
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

type Listener = Rc<dyn Fn(EffectiveTheme)>;

#[derive(Default)]
struct ManualSchemeInner {
    current: Cell<EffectiveTheme>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

/// A color-scheme signal whose value is set by its owner, for environments
/// without a live OS notification channel (terminals, tests).
#[derive(Clone, Default)]
pub struct ManualScheme {
    inner: Rc<ManualSchemeInner>,
}

impl ManualScheme {
    pub fn new(initial: EffectiveTheme) -> Self {
        let scheme = Self::default();
        scheme.inner.current.set(initial);
        scheme
    }

    pub fn set(&self, theme: EffectiveTheme) {
        self.inner.current.set(theme);
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(theme);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

pub struct ManualSubscription {
    id: u64,
    scheme: Weak<ManualSchemeInner>,
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.scheme.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl SystemScheme for ManualScheme {
    type Subscription = ManualSubscription;

    fn current(&self) -> EffectiveTheme {
        self.inner.current.get()
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(EffectiveTheme)>) -> ManualSubscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, on_change));
        ManualSubscription {
            id,
            scheme: Rc::downgrade(&self.inner),
        }
    }
}
