//! Open kind registries.
//!
//! Every entity category (header, payload, packet, node, link, event) has
//! one [`Registry`] mapping a kind name to a constructor. Constructors are
//! registered once when a [`World`](crate::World) is built; nothing is
//! registered through static initializers, so two worlds never share kinds.
//!
//! The registry is generic over the constructor signature `F`, which lets
//! each category take the arguments it needs:
//!
//! ```rust
//! use geosim::registry::Registry;
//!
//! let mut squares: Registry<dyn Fn(u32) -> u32> = Registry::new("square");
//! squares.register("plain", Box::new(|n| n * n));
//!
//! let build = squares.get("plain").unwrap();
//! assert_eq!(build(7), 49);
//! assert!(squares.get("cubic").is_err());
//! ```

use std::collections::BTreeMap;

use log::warn;

use crate::error::{SimError, SimResult};

/// Kind name → constructor table for one entity category.
pub struct Registry<F: ?Sized> {
    category: &'static str,
    entries: BTreeMap<String, Box<F>>,
}

impl<F: ?Sized> Registry<F> {
    /// Create an empty registry for `category` (used in diagnostics).
    pub fn new(category: &'static str) -> Self {
        Registry {
            category,
            entries: BTreeMap::new(),
        }
    }

    /// Register `ctor` under `kind`. Re-registering a kind replaces it.
    pub fn register(&mut self, kind: impl Into<String>, ctor: Box<F>) {
        self.entries.insert(kind.into(), ctor);
    }

    /// Look up the constructor for `kind`.
    ///
    /// An unknown kind is logged and returned as `UnknownKind`; the caller
    /// decides what to do with the missing instance.
    pub fn get(&self, kind: &str) -> SimResult<&F> {
        match self.entries.get(kind) {
            Some(ctor) => Ok(ctor.as_ref()),
            None => {
                warn!("no such {} type: {:?}", self.category, kind);
                Err(SimError::UnknownKind {
                    category: self.category,
                    kind: kind.to_string(),
                })
            }
        }
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// The category this registry serves.
    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> std::fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("category", &self.category)
            .field("kinds", &self.kinds())
            .finish()
    }
}
