//! # Global/local entity registries
//!
//! The same target or instrument setup is described independently — and slightly
//! inconsistently — by every file of a collection. An [`EntityRegistry`] recognizes
//! those near-duplicates and resolves every *local* record onto one canonical
//! *global* entity, minting a collision-free synthetic identifier (UID) for each
//! global it creates.
//!
//! ## Handles instead of object identity
//!
//! Every registered local receives a [`LocalHandle`]: a dense index into an arena
//! owned by the registry. The local→global correspondence is a handle-indexed
//! vector, so nothing depends on pointer identity and the whole structure is
//! trivially serializable. Two locals that are content-equal but were registered
//! separately (the same target name parsed from two files) get distinct handles and
//! appear as distinct entries in their global's local list.
//!
//! ## Resolution
//!
//! [`EntityRegistry::resolve`] scans the existing globals **in creation order** and
//! reuses the first one accepted by the matching policy; when several globals fall
//! within a fuzzy matcher's tolerance, the earliest-created one wins. This keeps
//! resolution deterministic for a given registration sequence. The scan is linear in
//! the number of globals — a documented ceiling, acceptable because real collections
//! hold few distinct targets and setups.
//!
//! ## Lifecycle
//!
//! A registry is scoped to one collection merge: built by a single owner, cleared
//! (and re-seeded with its UNDEFINED global, when it has one) when the collection is
//! reset. Once registration is complete, all lookups are pure reads.
//!
//! ## See also
//! ------------
//! * [`TargetRegistry`](crate::registry::TargetRegistry) – Target specialization.
//! * [`InstrumentModeRegistry`](crate::registry::InstrumentModeRegistry) – Instrument-mode specialization.
//! * [`Matcher`](crate::matcher::Matcher) – The pluggable equivalence policies.

pub mod instruments;
pub mod targets;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::matcher::Matcher;

pub use instruments::InstrumentModeRegistry;
pub use targets::TargetRegistry;

/// Opaque handle of one registered local entity (dense arena index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalHandle(u32);

impl LocalHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of one canonical global entity (creation order index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(u32);

impl GlobalId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hooks a domain entity supplies to the generic registry.
pub trait RegistryEntity: Clone {
    /// The display name of the entity; for globals this is the synthetic UID.
    fn display_name(&self) -> &str;

    /// Clone this local into a canonical global carrying the given UID.
    fn clone_with_uid(&self, uid: &str) -> Self;

    /// Domain ordering used by [`EntityRegistry::sorted_globals`].
    fn cmp_listing(&self, other: &Self) -> Ordering;
}

/// Generic global/local dedup engine, parameterized by entity type and matching policy.
#[derive(Debug, Clone)]
pub struct EntityRegistry<K, M> {
    matcher: M,
    undefined: Option<Arc<K>>,
    /// Arena of registered locals, indexed by [`LocalHandle`].
    locals: Vec<Arc<K>>,
    /// Resolved global of each local, indexed by [`LocalHandle`].
    resolved: Vec<Option<GlobalId>>,
    /// Canonical globals in creation order, indexed by [`GlobalId`].
    globals: Vec<Arc<K>>,
    /// Local lists of each global, indexed by [`GlobalId`].
    locals_of: Vec<SmallVec<[LocalHandle; 4]>>,
    /// UID → global (bijection onto the global set).
    uids: HashMap<String, GlobalId, RandomState>,
}

impl<K: RegistryEntity, M: Matcher<K>> EntityRegistry<K, M> {
    /// Build an empty registry with the given matching policy.
    pub fn new(matcher: M) -> Self {
        EntityRegistry {
            matcher,
            undefined: None,
            locals: Vec::new(),
            resolved: Vec::new(),
            globals: Vec::new(),
            locals_of: Vec::new(),
            uids: HashMap::default(),
        }
    }

    /// Build a registry seeded with a designated UNDEFINED global.
    ///
    /// The seed survives [`clear`](EntityRegistry::clear): resolution always needs a
    /// fallback bucket for records with missing data.
    pub fn with_undefined(matcher: M, undefined: Arc<K>) -> Self {
        let mut registry = Self::new(matcher);
        registry.undefined = Some(undefined);
        registry.seed_undefined();
        registry
    }

    fn seed_undefined(&mut self) {
        if let Some(undefined) = self.undefined.clone() {
            let uid = undefined.display_name().to_owned();
            self.insert_global(uid, undefined);
        }
    }

    /// Register a local entity and resolve it onto its canonical global.
    ///
    /// Arguments
    /// ---------
    /// * `local`: the entity as parsed from one file
    ///
    /// Return
    /// ------
    /// * The handle of the new arena entry. Every call allocates a fresh handle:
    ///   content-equal locals registered separately stay distinct.
    pub fn register(&mut self, local: K) -> LocalHandle {
        let handle = LocalHandle(self.locals.len() as u32);
        self.locals.push(Arc::new(local));
        self.resolved.push(None);
        self.resolve(handle);
        handle
    }

    /// Register a possibly-missing local entity; `None` is a silent no-op.
    pub fn register_optional(&mut self, local: Option<K>) -> Option<LocalHandle> {
        local.map(|local| self.register(local))
    }

    /// Resolve a handle onto its global, creating the global on first sight.
    ///
    /// Idempotent: resolving an already-resolved handle returns the recorded global
    /// without touching the local lists.
    ///
    /// Return
    /// ------
    /// * The id of the matched or newly created global.
    pub fn resolve(&mut self, handle: LocalHandle) -> GlobalId {
        if let Some(gid) = self.resolved[handle.index()] {
            return gid;
        }
        let local = Arc::clone(&self.locals[handle.index()]);

        // First-created global accepted by the policy wins.
        let found = self
            .globals
            .iter()
            .position(|global| self.matcher.matches(global.as_ref(), local.as_ref()));

        let gid = match found {
            Some(index) => GlobalId(index as u32),
            None => self.create_global(local.as_ref()),
        };

        self.resolved[handle.index()] = Some(gid);
        let list = &mut self.locals_of[gid.index()];
        if !list.contains(&handle) {
            list.push(handle);
        }
        gid
    }

    fn create_global(&mut self, local: &K) -> GlobalId {
        let uid = self.make_unique_uid(local.display_name());
        let global = Arc::new(local.clone_with_uid(&uid));
        self.insert_global(uid, global)
    }

    fn insert_global(&mut self, uid: String, global: Arc<K>) -> GlobalId {
        let gid = GlobalId(self.globals.len() as u32);
        self.globals.push(global);
        self.locals_of.push(SmallVec::new());
        self.uids.insert(uid, gid);
        gid
    }

    /// Mint a collision-free UID: the base name, suffixed with `_1`, `_2`, … while taken.
    fn make_unique_uid(&self, base: &str) -> String {
        if !self.uids.contains_key(base) {
            return base.to_owned();
        }
        let mut n = 1_usize;
        loop {
            let uid = format!("{base}_{n}");
            if !self.uids.contains_key(&uid) {
                return uid;
            }
            n += 1;
        }
    }

    /// O(1) lookup of a global by its UID.
    pub fn global_by_uid(&self, uid: &str) -> Option<&Arc<K>> {
        self.uids.get(uid).map(|gid| &self.globals[gid.index()])
    }

    /// O(1) lookup of the global a local was resolved onto.
    pub fn global_of(&self, handle: LocalHandle) -> Option<&Arc<K>> {
        self.global_id_of(handle)
            .map(|gid| &self.globals[gid.index()])
    }

    /// The id of the global a local was resolved onto.
    pub fn global_id_of(&self, handle: LocalHandle) -> Option<GlobalId> {
        self.resolved.get(handle.index()).copied().flatten()
    }

    /// The local entity behind a handle.
    pub fn local(&self, handle: LocalHandle) -> Option<&Arc<K>> {
        self.locals.get(handle.index())
    }

    /// The global entity behind a global id.
    pub fn global(&self, gid: GlobalId) -> Option<&Arc<K>> {
        self.globals.get(gid.index())
    }

    /// Handles of the locals resolved onto a global; `None` if the global is unknown.
    pub fn local_handles_of(&self, global: &K) -> Option<&[LocalHandle]> {
        let gid = self.uids.get(global.display_name())?;
        Some(self.locals_of[gid.index()].as_slice())
    }

    /// The locals resolved onto a global; `None` if the global is unknown.
    pub fn locals_of(&self, global: &K) -> Option<impl Iterator<Item = &Arc<K>>> {
        let handles = self.local_handles_of(global)?;
        Some(handles.iter().map(move |h| &self.locals[h.index()]))
    }

    /// True if at least one local was resolved onto this global.
    pub fn has_local(&self, global: &K) -> bool {
        self.local_handles_of(global)
            .is_some_and(|handles| !handles.is_empty())
    }

    /// Distinct local display names of a global, excluding the global's own name,
    /// sorted lexicographically. `None` when the global is unknown or the set is empty.
    pub fn sorted_unique_aliases(&self, global: &K) -> Option<Vec<String>> {
        let handles = self.local_handles_of(global)?;
        let aliases: Vec<String> = handles
            .iter()
            .map(|h| self.locals[h.index()].display_name())
            .filter(|name| *name != global.display_name())
            .unique()
            .sorted()
            .map(str::to_owned)
            .collect();
        if aliases.is_empty() {
            None
        } else {
            Some(aliases)
        }
    }

    /// Drop all mappings, re-seeding the UNDEFINED global when one was configured.
    pub fn clear(&mut self) {
        self.locals.clear();
        self.resolved.clear();
        self.globals.clear();
        self.locals_of.clear();
        self.uids.clear();
        self.seed_undefined();
    }

    /// All globals ordered by the entity's domain comparator.
    pub fn sorted_globals(&self) -> Vec<Arc<K>> {
        self.globals
            .iter()
            .cloned()
            .sorted_by(|a, b| a.cmp_listing(b))
            .collect()
    }

    /// All globals in creation order.
    pub fn globals(&self) -> impl Iterator<Item = &Arc<K>> {
        self.globals.iter()
    }

    /// The configured UNDEFINED global, if any.
    pub fn undefined(&self) -> Option<&Arc<K>> {
        self.undefined.as_ref()
    }

    /// Number of globals.
    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    /// Number of registered locals.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}
