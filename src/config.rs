//! Generic validate → diff → notify → commit engine for option snapshots.
//!
//! A [`ConfigStore`] owns the current snapshot of a [`Configurable`] type and a listener.
//! Every mutation is expressed as a [`Patch`] (a batch of `key → value | clear` entries).
//! A batch is processed against a private copy of the snapshot:
//!
//! 1. clearing a required key fails with [`WaterboxError::Required`];
//! 2. every proposed value runs through [`Configurable::validate`]; failures are re-raised
//!    with the key name prefixed ([`WaterboxError::InvalidOption`]);
//! 3. the listener is notified exactly once with the changed keys and the new snapshot;
//! 4. only then is the copy committed.
//!
//! Any failure in steps 1-3 leaves the stored snapshot untouched (batches are atomic).

use std::fmt;

use crate::foundation::error::{WaterboxError, WaterboxResult};

/// A typed option snapshot with a closed set of keys.
pub trait Configurable: Clone + fmt::Debug {
    /// Field identifier.
    type Key: Copy + Eq + fmt::Debug + fmt::Display + 'static;
    /// Dynamically typed field value.
    type Value: Clone + fmt::Debug;

    /// Every configured field, in notification order.
    fn keys() -> &'static [Self::Key];

    /// Whether `key` may be absent from the snapshot.
    fn is_optional(key: Self::Key) -> bool;

    /// Current value of `key`, `None` when an optional field is absent.
    fn get(&self, key: Self::Key) -> Option<Self::Value>;

    /// Check `value` for `key`, returning the (possibly normalized) value to store.
    fn validate(key: Self::Key, value: Self::Value) -> WaterboxResult<Self::Value>;

    /// Store an already validated value, or clear the field when `value` is `None`.
    fn apply(&mut self, key: Self::Key, value: Option<Self::Value>) -> WaterboxResult<()>;
}

/// Receives the outcome of every successful batch before it is committed.
///
/// Returning an error aborts the batch; the store keeps its previous snapshot.
pub trait UpdateListener<T: Configurable> {
    fn on_update(&mut self, changed: &[T::Key], snapshot: &T) -> WaterboxResult<()>;
}

impl<T, F> UpdateListener<T> for F
where
    T: Configurable,
    F: FnMut(&[T::Key], &T) -> WaterboxResult<()>,
{
    fn on_update(&mut self, changed: &[T::Key], snapshot: &T) -> WaterboxResult<()> {
        self(changed, snapshot)
    }
}

/// Listener that ignores notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl<T: Configurable> UpdateListener<T> for NoopListener {
    fn on_update(&mut self, _changed: &[T::Key], _snapshot: &T) -> WaterboxResult<()> {
        Ok(())
    }
}

/// An ordered batch of proposed mutations.
///
/// Setting the same key twice keeps the last value; the key is reported once.
pub struct Patch<T: Configurable> {
    entries: Vec<(T::Key, Option<T::Value>)>,
}

impl<T: Configurable> Patch<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Propose `value` for `key`.
    pub fn set(self, key: T::Key, value: T::Value) -> Self {
        self.entry(key, Some(value))
    }

    /// Propose removing `key`.
    pub fn clear(self, key: T::Key) -> Self {
        self.entry(key, None)
    }

    /// Propose `value` for `key`, or removal when `None`.
    pub fn entry(mut self, key: T::Key, value: Option<T::Value>) -> Self {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Keys touched by this patch, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patch that re-proposes every field of `snapshot`, absent optionals as clears.
    pub fn full(snapshot: &T) -> Self {
        T::keys()
            .iter()
            .fold(Self::new(), |patch, &key| patch.entry(key, snapshot.get(key)))
    }
}

impl<T: Configurable> Default for Patch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Configurable> Clone for Patch<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: Configurable> fmt::Debug for Patch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Owner of a validated snapshot plus the listener reacting to its changes.
#[derive(Debug)]
pub struct ConfigStore<T: Configurable, L> {
    current: T,
    listener: L,
}

impl<T: Configurable, L: UpdateListener<T>> ConfigStore<T, L> {
    /// Validate every field of `defaults` as one batch.
    ///
    /// The listener sees exactly one notification listing every configured key, including
    /// optional fields that are absent from `defaults`.
    pub fn new(defaults: T, listener: L) -> WaterboxResult<Self> {
        let patch = Patch::full(&defaults);
        let mut store = Self {
            current: defaults,
            listener,
        };
        store.update(patch)?;
        Ok(store)
    }

    /// Current snapshot.
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Current value of a single field.
    pub fn value(&self, key: T::Key) -> Option<T::Value> {
        self.current.get(key)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Snapshot and listener borrowed together.
    pub fn parts_mut(&mut self) -> (&T, &mut L) {
        (&self.current, &mut self.listener)
    }

    /// Apply one batch atomically and return the changed keys.
    pub fn update(&mut self, patch: Patch<T>) -> WaterboxResult<Vec<T::Key>> {
        let mut next = self.current.clone();
        let mut changed = Vec::with_capacity(patch.entries.len());

        for (key, value) in patch.entries {
            match value {
                None => {
                    if !T::is_optional(key) {
                        return Err(WaterboxError::required(key.to_string()));
                    }
                    next.apply(key, None)
                        .map_err(|e| e.for_option(key.to_string()))?;
                }
                Some(value) => {
                    let value =
                        T::validate(key, value).map_err(|e| e.for_option(key.to_string()))?;
                    next.apply(key, Some(value))
                        .map_err(|e| e.for_option(key.to_string()))?;
                }
            }
            changed.push(key);
        }

        self.listener.on_update(&changed, &next)?;
        self.current = next;
        Ok(changed)
    }
}
