//! Typed property store with per-key change notification
//!
//! Every piece of shared editor state (active tool, selected tiles, tileset,
//! layer visibility, ...) lives in a [`PropertyStore`] under a typed
//! [`PropertyKey`]. Listeners registered on a key run synchronously whenever
//! a `set` actually changes the value.
//!
//! The store is single-threaded and reentrant: listeners receive the store by
//! shared reference and may read or `set` other keys. There is no cycle
//! protection, so callers must not build update loops.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Callback invoked after a key's value changed
pub type Listener = Rc<dyn Fn(&PropertyStore)>;

/// Identity of a key inside the store (name plus optional index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId {
    pub name: &'static str,
    pub index: Option<i32>,
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A typed token naming a slot in the store
///
/// Keys are plain values and can be declared as constants:
///
/// ```
/// use mapkit_core::PropertyKey;
///
/// const ZOOM: PropertyKey<u32> = PropertyKey::new("Zoom");
/// let visible = PropertyKey::<bool>::new("LayerVisible").indexed(2);
/// assert_eq!(visible.id().index, Some(2));
/// # let _ = ZOOM;
/// ```
pub struct PropertyKey<T> {
    id: KeyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PropertyKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            id: KeyId { name, index: None },
            _marker: PhantomData,
        }
    }

    /// Derive a distinct key for `(self, index)`, e.g. one per map layer
    pub const fn indexed(&self, index: i32) -> Self {
        Self {
            id: KeyId {
                name: self.id.name,
                index: Some(index),
            },
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name
    }
}

impl<T> Clone for PropertyKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> PartialEq for PropertyKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for PropertyKey<T> {}

impl<T> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyKey<{}>({})", type_name::<T>(), self.id)
    }
}

/// Wiring errors raised by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key was never added
    UnknownKey(String),
    /// `add` was called twice for the same key
    DuplicateKey(String),
    /// The key exists but holds a value of another type
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnknownKey(key) => write!(f, "Unknown property key: {}", key),
            StoreError::DuplicateKey(key) => write!(f, "Property key already present: {}", key),
            StoreError::TypeMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "Property {} holds {} but was accessed as {}",
                key, found, expected
            ),
        }
    }
}

impl std::error::Error for StoreError {}

struct Slot {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any>,
}

impl Slot {
    fn new<T: 'static>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    fn check<T: 'static>(&self, id: KeyId) -> Result<(), StoreError> {
        if self.type_id == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(StoreError::TypeMismatch {
                key: id.to_string(),
                expected: type_name::<T>(),
                found: self.type_name,
            })
        }
    }
}

/// Token-keyed, type-checked associative store
#[derive(Default)]
pub struct PropertyStore {
    slots: RefCell<HashMap<KeyId, Slot>>,
    listeners: RefCell<HashMap<KeyId, Vec<Listener>>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key with its initial value
    pub fn add<T: 'static>(&self, key: PropertyKey<T>, initial: T) -> Result<(), StoreError> {
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(&key.id) {
            return Err(StoreError::DuplicateKey(key.id.to_string()));
        }
        slots.insert(key.id, Slot::new(initial));
        Ok(())
    }

    /// Remove a key and its listeners. Absent keys are ignored.
    pub fn remove<T: 'static>(&self, key: PropertyKey<T>) {
        self.slots.borrow_mut().remove(&key.id);
        self.listeners.borrow_mut().remove(&key.id);
    }

    pub fn contains<T: 'static>(&self, key: PropertyKey<T>) -> bool {
        self.slots.borrow().contains_key(&key.id)
    }

    /// Read a copy of the current value
    pub fn get<T: Clone + 'static>(&self, key: PropertyKey<T>) -> Result<T, StoreError> {
        self.with(key, T::clone)
    }

    /// Borrow the current value without cloning it
    ///
    /// `f` must not call `set` on this store.
    pub fn with<T: 'static, R>(
        &self,
        key: PropertyKey<T>,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, StoreError> {
        let slots = self.slots.borrow();
        let slot = slots
            .get(&key.id)
            .ok_or_else(|| StoreError::UnknownKey(key.id.to_string()))?;
        slot.check::<T>(key.id)?;
        let value = slot
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::UnknownKey(key.id.to_string()))?;
        Ok(f(value))
    }

    /// Overwrite a value, notifying listeners when it changed
    ///
    /// Returns whether the value changed. Listeners run after the store
    /// releases its internal borrows, so they may freely read and write.
    pub fn set<T: PartialEq + 'static>(
        &self,
        key: PropertyKey<T>,
        value: T,
    ) -> Result<bool, StoreError> {
        {
            let mut slots = self.slots.borrow_mut();
            let slot = slots
                .get_mut(&key.id)
                .ok_or_else(|| StoreError::UnknownKey(key.id.to_string()))?;
            slot.check::<T>(key.id)?;
            let Some(current) = slot.value.downcast_mut::<T>() else {
                return Err(StoreError::UnknownKey(key.id.to_string()));
            };
            if *current == value {
                return Ok(false);
            }
            *current = value;
        }

        tracing::trace!("property {} changed", key.id);
        self.notify(key.id);
        Ok(true)
    }

    /// Register a listener for `key`. Adding the same handle twice is a no-op.
    pub fn add_listener<T: 'static>(&self, key: PropertyKey<T>, listener: Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let entry = listeners.entry(key.id).or_default();
        if !entry.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            entry.push(listener);
        }
    }

    /// Unregister a listener. Unknown handles are ignored.
    pub fn remove_listener<T: 'static>(&self, key: PropertyKey<T>, listener: &Listener) {
        if let Some(entry) = self.listeners.borrow_mut().get_mut(&key.id) {
            entry.retain(|l| !Rc::ptr_eq(l, listener));
        }
    }

    pub fn listener_count<T: 'static>(&self, key: PropertyKey<T>) -> usize {
        self.listeners
            .borrow()
            .get(&key.id)
            .map(|l| l.len())
            .unwrap_or(0)
    }

    fn notify(&self, id: KeyId) {
        // Snapshot so listeners can add/remove listeners while running
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(&id)
            .cloned()
            .unwrap_or_default();
        for listener in snapshot {
            listener(self);
        }
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut keys: Vec<String> = slots.keys().map(|k| k.to_string()).collect();
        keys.sort();
        f.debug_struct("PropertyStore").field("keys", &keys).finish()
    }
}
