//! Drop target registry.
//!
//! Containers register a hit-testable region when they mount and unregister
//! when they unmount. The registry only holds weak references, so a container
//! that goes away without unregistering simply stops matching.
//!
//! # Usage
//! ```rust,ignore
//! use std::rc::Rc;
//! use planboard_core::dnd::{DropTargetRegistry, RectRegion, Rect, Point};
//!
//! let mut registry = DropTargetRegistry::new();
//! let week = Rc::new(RectRegion::new(Rect::new(0.0, 0.0, 300.0, 600.0)));
//! let registration = registry.register("week-1", &week);
//!
//! assert_eq!(registry.hit_test(Point::new(10.0, 10.0))?, Some("week-1".into()));
//! registry.unregister(&registration);
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::geometry::{Point, Rect};
use crate::calendar::ContainerId;
use crate::error::HitTestError;

/// A region that can answer point-containment queries.
pub trait DropRegion {
    /// Whether `point` lies inside the region.
    ///
    /// # Errors
    /// Fails when the region cannot be measured any more.
    fn contains(&self, point: Point) -> Result<bool, HitTestError>;

    /// Structural nesting depth. When several regions contain a point the
    /// deepest one wins.
    fn depth(&self) -> usize {
        0
    }
}

/// Rectangle-backed region whose bounds follow layout changes.
#[derive(Debug)]
pub struct RectRegion {
    bounds: Cell<Rect>,
    depth: usize,
    detached: Cell<bool>,
}

impl RectRegion {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: Cell::new(bounds),
            depth: 0,
            detached: Cell::new(false),
        }
    }

    /// Region nested `depth` levels inside other containers.
    pub fn nested(bounds: Rect, depth: usize) -> Self {
        Self {
            depth,
            ..Self::new(bounds)
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
    }

    /// Mark the backing element as gone while references remain.
    pub fn detach(&self) {
        self.detached.set(true);
    }
}

impl DropRegion for RectRegion {
    fn contains(&self, point: Point) -> Result<bool, HitTestError> {
        if self.detached.get() {
            return Err(HitTestError::Stale(format!("{:?}", self.bounds.get())));
        }
        let bounds = self.bounds.get();
        if !bounds.is_valid() {
            return Err(HitTestError::InvalidBounds(format!("{bounds:?}")));
        }
        Ok(bounds.contains(point))
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// Handle returned by [`DropTargetRegistry::register`].
///
/// Unregistering with a handle from a replaced registration does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "keep the registration to unregister the container on unmount"]
pub struct Registration {
    id: ContainerId,
    generation: u64,
}

impl Registration {
    pub fn id(&self) -> &ContainerId {
        &self.id
    }
}

struct Entry {
    region: Weak<dyn DropRegion>,
    generation: u64,
}

/// Container id to region map used for hit-testing.
#[derive(Default)]
pub struct DropTargetRegistry {
    entries: BTreeMap<ContainerId, Entry>,
    next_generation: u64,
}

impl DropTargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the region for `id`.
    pub fn register<R>(&mut self, id: impl Into<ContainerId>, region: &Rc<R>) -> Registration
    where
        R: DropRegion + 'static,
    {
        let id = id.into();
        let shared: Rc<dyn DropRegion> = region.clone();
        self.next_generation += 1;
        let generation = self.next_generation;

        let replaced = self
            .entries
            .insert(
                id.clone(),
                Entry {
                    region: Rc::downgrade(&shared),
                    generation,
                },
            )
            .is_some();
        tracing::trace!(container = %id, generation, replaced, "drop target registered");

        Registration { id, generation }
    }

    /// Remove the registration if it is still the current one for its id.
    pub fn unregister(&mut self, registration: &Registration) -> bool {
        let current = self
            .entries
            .get(&registration.id)
            .is_some_and(|e| e.generation == registration.generation);
        if current {
            self.entries.remove(&registration.id);
        }
        current
    }

    /// Remove whatever is registered under `id`.
    pub fn unregister_id(&mut self, id: &ContainerId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop entries whose region no longer exists. Returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.region.strong_count() > 0);
        before - self.entries.len()
    }

    pub fn is_registered(&self, id: &ContainerId) -> bool {
        self.entries
            .get(id)
            .is_some_and(|e| e.region.strong_count() > 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ContainerId> {
        self.entries.keys()
    }

    /// Innermost live container under `point`.
    ///
    /// Deeper regions beat shallower ones; equal depth goes to the most
    /// recent registration. Regions whose owner is gone are skipped.
    ///
    /// A region that fails to answer is skipped and the scan goes on.
    ///
    /// # Errors
    /// Returns the first region error only when no other region matched.
    pub fn hit_test(&self, point: Point) -> Result<Option<ContainerId>, HitTestError> {
        let mut best: Option<(&ContainerId, usize, u64)> = None;
        let mut failure = None;
        for (id, entry) in &self.entries {
            let Some(region) = entry.region.upgrade() else {
                continue;
            };
            match region.contains(point) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(container = %id, error = %e, "skipping unmeasurable drop target");
                    failure.get_or_insert(e);
                    continue;
                }
            }
            let rank = (region.depth(), entry.generation);
            if best.map_or(true, |(_, d, g)| rank > (d, g)) {
                best = Some((id, rank.0, rank.1));
            }
        }
        match (best, failure) {
            (Some((id, _, _)), _) => Ok(Some(id.clone())),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }
}
