//! Process-scoped reactive state tree.
//!
//! Values live in a nested JSON mapping addressed by dot-separated paths.
//! Listeners subscribe to an exact path and are invoked synchronously, in
//! registration order, after every `set` of that path. Subscriptions are
//! permanent.
//!
//! Reentrancy: a `set` issued from inside a listener is applied at once,
//! but its notification waits until the current listener pass is done.
//! Within one outermost `set`, each path is notified at most once; a nested
//! `set` of a path already notified or queued in that chain is rejected
//! with [`Error::ReentrantSet`] and changes nothing.
//!
//! The store assumes one logical thread of control. It is `Send + Sync` so
//! it can be shared with async tasks, but concurrent `set` calls from
//! different threads would be treated as nested.

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::util::{lock, panic_message};
use crate::{plog_debug, plog_error, plog_warn};

/// What a listener returns. Errors are logged and otherwise ignored.
pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Listener = Arc<dyn Fn(&Value, Option<&Value>) -> ListenerResult + Send + Sync>;

struct Notification {
    key: String,
    new_value: Value,
    old_value: Option<Value>,
}

#[derive(Default)]
struct Dispatch {
    active: bool,
    chain: HashSet<String>,
    queue: VecDeque<Notification>,
}

struct Inner {
    state: Mutex<Value>,
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    dispatch: Mutex<Dispatch>,
}

/// Cloneable handle; clones share the same tree and listeners.
#[derive(Clone)]
pub struct ReactiveStore {
    inner: Arc<Inner>,
}

impl Default for ReactiveStore {
    fn default() -> Self {
        Self::with_state(Value::Object(Map::new()))
    }
}

impl std::fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("state", &*lock(&self.inner.state))
            .field("listener_keys", &lock(&self.inner.listeners).len())
            .finish()
    }
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

impl ReactiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tree. A non-mapping seed is replaced by an empty mapping.
    pub fn with_state(state: Value) -> Self {
        let state = if state.is_object() {
            state
        } else {
            plog_warn!("store: seed state is not a mapping, starting empty");
            Value::Object(Map::new())
        };
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                listeners: Mutex::new(HashMap::new()),
                dispatch: Mutex::new(Dispatch::default()),
            }),
        }
    }

    /// A store seeded with the planning application's defaults.
    pub fn with_app_defaults() -> Self {
        Self::with_state(json!({
            "currentSystem": null,
            "currentView": null,
            "ui": {
                "mode": "NAVIGATION",
                "loading": false
            },
            "planning": {
                "capacityScenario": "effective",
                "chartTeamId": "__ORG_VIEW__",
                "draggedInitiativeId": null
            }
        }))
    }

    /// Value at `path`, or `None` if any segment is absent.
    ///
    /// An explicitly stored `null` is returned as `Some(Value::Null)`.
    pub fn get(&self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        let state = lock(&self.inner.state);
        let mut node: &Value = &state;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node.clone())
    }

    /// Deserialize the value at `path`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.get(path)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    /// A deep copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        lock(&self.inner.state).clone()
    }

    /// Register `listener` for exact-path updates of `key`.
    pub fn subscribe<F>(&self, key: &str, listener: F)
    where
        F: Fn(&Value, Option<&Value>) -> ListenerResult + Send + Sync + 'static,
    {
        lock(&self.inner.listeners)
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Store `value` at `path`, creating intermediate mappings (and
    /// replacing intermediate nulls), then notify subscribers of `path`.
    ///
    /// Fails without touching the tree when the path is malformed, crosses
    /// a non-mapping value, or is a rejected reentrant set. Listener
    /// failures never fail the set.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let segments = split_path(path)?;

        let nested = {
            let dispatch = lock(&self.inner.dispatch);
            if dispatch.active && dispatch.chain.contains(path) {
                plog_warn!("store: reentrant set of {:?} rejected", path);
                return Err(Error::ReentrantSet(path.to_string()));
            }
            dispatch.active
        };

        let old_value = self.write(path, &segments, value.clone())?;
        let notification = Notification {
            key: path.to_string(),
            new_value: value,
            old_value,
        };

        {
            let mut dispatch = lock(&self.inner.dispatch);
            if !nested {
                dispatch.active = true;
                dispatch.chain.clear();
            }
            dispatch.chain.insert(path.to_string());
            dispatch.queue.push_back(notification);
        }

        if nested {
            plog_debug!("store: notification for {:?} queued", path);
        } else {
            self.drain();
        }
        Ok(())
    }

    fn write(&self, path: &str, segments: &[&str], value: Value) -> Result<Option<Value>> {
        let conflict = |segment: &str| Error::PathConflict {
            path: path.to_string(),
            segment: segment.to_string(),
        };

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;

        let mut state = lock(&self.inner.state);
        let mut node: &mut Value = &mut state;
        for segment in parents {
            let map = node.as_object_mut().ok_or_else(|| conflict(""))?;
            let child = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            if !child.is_object() {
                return Err(conflict(segment));
            }
            node = child;
        }

        let map = node.as_object_mut().ok_or_else(|| conflict(""))?;
        Ok(map.insert(last.to_string(), value))
    }

    fn drain(&self) {
        loop {
            let next = lock(&self.inner.dispatch).queue.pop_front();
            match next {
                Some(notification) => self.notify(&notification),
                None => break,
            }
        }
        let mut dispatch = lock(&self.inner.dispatch);
        dispatch.active = false;
        dispatch.chain.clear();
    }

    fn notify(&self, notification: &Notification) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .get(&notification.key)
            .cloned()
            .unwrap_or_default();

        for listener in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| {
                listener(&notification.new_value, notification.old_value.as_ref())
            }));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    plog_error!("store: listener for {:?} failed: {}", notification.key, err);
                }
                Err(payload) => {
                    plog_error!(
                        "store: listener for {:?} panicked: {}",
                        notification.key,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }
}
