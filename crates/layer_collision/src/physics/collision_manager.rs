//! Layered collision manager
//!
//! Shapes are grouped into integer layers and only shapes sharing a layer
//! are tested against each other. Each tick runs in two phases:
//!
//! 1. **Reconcile**: membership changes queued since the last tick through
//!    [`add_child`](CollisionManager::add_child),
//!    [`remove_child`](CollisionManager::remove_child) and
//!    [`remove_all_children`](CollisionManager::remove_all_children) are
//!    applied, layer by layer, removals before additions.
//! 2. **Sweep**: for every layer, every pair `(i, j)` with `i < j` in live
//!    order runs `shapes[i].test_collision(&shapes[j], delta)`.
//!
//! Live lists are only ever written during reconciliation, so listeners may
//! queue membership changes from inside `on_collide`; they take effect on
//! the next tick.

use crate::config::CollisionConfig;
use crate::physics::collision::{CollisionShape, ShapeId, ShapeRef};
use log::{debug, trace};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

/// Layer identifier
pub type LayerId = i32;

/// Counters from one [`check_for_collisions`](CollisionManager::check_for_collisions) call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Layers that were swept
    pub layers_swept: usize,
    /// Pairs handed to `test_collision`
    pub pairs_tested: usize,
    /// Pairs whose listener reported a collision
    pub collisions: usize,
}

/// Membership changes waiting for the next reconciliation
#[derive(Default)]
struct PendingChanges {
    add: BTreeMap<LayerId, Vec<ShapeRef>>,
    remove: BTreeMap<LayerId, Vec<ShapeId>>,
    dirty: BTreeSet<LayerId>,
}

/// State shared between manager handles; shapes point back here weakly
pub(crate) struct ManagerShared {
    layers: RefCell<BTreeMap<LayerId, Vec<ShapeRef>>>,
    pending: RefCell<PendingChanges>,
    config: RefCell<CollisionConfig>,
    scene: RefCell<Option<Rc<dyn Any>>>,
    last_stats: Cell<FrameStats>,
}

/// Owns layer membership and runs the per-tick pairwise sweep
///
/// Cloning produces another handle to the same manager.
#[derive(Clone)]
pub struct CollisionManager {
    shared: Rc<ManagerShared>,
}

impl CollisionManager {
    /// Create an empty manager with default configuration
    pub fn new() -> Self {
        Self::with_config(CollisionConfig::default())
    }

    /// Create an empty manager with the given configuration
    pub fn with_config(config: CollisionConfig) -> Self {
        Self {
            shared: Rc::new(ManagerShared {
                layers: RefCell::new(BTreeMap::new()),
                pending: RefCell::new(PendingChanges::default()),
                config: RefCell::new(config),
                scene: RefCell::new(None),
                last_stats: Cell::new(FrameStats::default()),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Rc<ManagerShared>) -> Self {
        Self { shared }
    }

    fn downgrade(&self) -> Weak<ManagerShared> {
        Rc::downgrade(&self.shared)
    }

    /// True if both handles refer to the same manager
    pub fn ptr_eq(&self, other: &CollisionManager) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Current configuration
    pub fn config(&self) -> CollisionConfig {
        self.shared.config.borrow().clone()
    }

    /// Replace the configuration
    pub fn set_config(&self, config: CollisionConfig) {
        *self.shared.config.borrow_mut() = config;
    }

    /// Builder-style scene reference
    pub fn with_scene(self, scene: Rc<dyn Any>) -> Self {
        self.set_scene(Some(scene));
        self
    }

    /// Opaque scene reference stored for callers
    pub fn scene(&self) -> Option<Rc<dyn Any>> {
        self.shared.scene.borrow().clone()
    }

    /// Store an opaque scene reference
    pub fn set_scene(&self, scene: Option<Rc<dyn Any>>) {
        *self.shared.scene.borrow_mut() = scene;
    }

    /// Queue `shape` for insertion into `layer`
    pub fn add_child(&self, shape: &ShapeRef, layer: LayerId) {
        let mut pending = self.shared.pending.borrow_mut();
        pending.add.entry(layer).or_default().push(Rc::clone(shape));
        pending.dirty.insert(layer);
    }

    /// Queue `shape` for removal from `layer`
    pub fn remove_child(&self, shape: &CollisionShape, layer: LayerId) {
        let mut pending = self.shared.pending.borrow_mut();
        pending.remove.entry(layer).or_default().push(shape.id());
        pending.dirty.insert(layer);
    }

    /// Queue removal of every shape live in `layer` right now
    pub fn remove_all_children(&self, layer: LayerId) {
        let layers = self.shared.layers.borrow();
        let Some(live) = layers.get(&layer) else {
            return;
        };

        let mut pending = self.shared.pending.borrow_mut();
        pending
            .remove
            .entry(layer)
            .or_default()
            .extend(live.iter().map(|shape| shape.id()));
        pending.dirty.insert(layer);
    }

    /// Live shapes in `layer`, in sweep order. Unknown layers are empty
    pub fn get_children(&self, layer: LayerId) -> Vec<ShapeRef> {
        self.shared
            .layers
            .borrow()
            .get(&layer)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of live shapes in `layer`
    pub fn get_child_count(&self, layer: LayerId) -> usize {
        self.shared.layers.borrow().get(&layer).map_or(0, Vec::len)
    }

    /// True if `shape` is live in `layer`
    pub fn contains(&self, shape: &CollisionShape, layer: LayerId) -> bool {
        self.shared
            .layers
            .borrow()
            .get(&layer)
            .is_some_and(|live| live.iter().any(|s| s.id() == shape.id()))
    }

    /// Ids of every layer created so far, ascending
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.shared.layers.borrow().keys().copied().collect()
    }

    /// True if membership changes are waiting for the next tick
    pub fn has_pending(&self) -> bool {
        !self.shared.pending.borrow().dirty.is_empty()
    }

    /// Stats from the most recent tick
    pub fn last_stats(&self) -> FrameStats {
        self.shared.last_stats.get()
    }

    /// Swept prediction using the configured segment count
    pub fn predict(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32) -> bool {
        let segments =
            i32::try_from(self.shared.config.borrow().swept_segments).unwrap_or(i32::MAX);
        shape1.will_intersect(shape2, delta, segments)
    }

    /// Run one tick: apply queued membership changes, then test every
    /// same-layer pair
    pub fn check_for_collisions(&self, delta: f32) -> FrameStats {
        self.reconcile();

        // Listeners may read the manager mid-sweep; iterate a snapshot
        let snapshot: Vec<(LayerId, Vec<ShapeRef>)> = self
            .shared
            .layers
            .borrow()
            .iter()
            .map(|(layer, shapes)| (*layer, shapes.clone()))
            .collect();
        let trace_pairs = self.shared.config.borrow().trace_pairs;

        let mut stats = FrameStats::default();
        for (layer, shapes) in &snapshot {
            stats.layers_swept += 1;
            for (i, shape1) in shapes.iter().enumerate() {
                for shape2 in &shapes[i + 1..] {
                    if trace_pairs {
                        trace!("layer {}: testing {} against {}", layer, shape1.id(), shape2.id());
                    }
                    stats.pairs_tested += 1;
                    if shape1.test_collision(shape2, delta) {
                        stats.collisions += 1;
                    }
                }
            }
        }

        self.shared.last_stats.set(stats);
        stats
    }

    /// Apply queued changes for every dirty layer
    fn reconcile(&self) {
        let (dirty, mut additions, mut removals) = {
            let mut pending = self.shared.pending.borrow_mut();
            if pending.dirty.is_empty() {
                return;
            }
            (
                std::mem::take(&mut pending.dirty),
                std::mem::take(&mut pending.add),
                std::mem::take(&mut pending.remove),
            )
        };

        let weak = self.downgrade();
        for layer in dirty {
            let removed = removals.remove(&layer).unwrap_or_default();
            let added = additions.remove(&layer).unwrap_or_default();
            self.reconcile_layer(layer, &removed, added, &weak);
        }
    }

    fn reconcile_layer(
        &self,
        layer: LayerId,
        removals: &[ShapeId],
        additions: Vec<ShapeRef>,
        weak: &Weak<ManagerShared>,
    ) {
        let mut detached = Vec::new();
        let mut added_count = 0;
        {
            let mut layers = self.shared.layers.borrow_mut();
            if !layers.contains_key(&layer) && additions.is_empty() {
                return;
            }
            let live = layers.entry(layer).or_default();

            for id in removals {
                if let Some(index) = live.iter().position(|shape| shape.id() == *id) {
                    detached.push(live.remove(index));
                }
            }

            for shape in additions {
                if live.iter().any(|existing| existing.id() == shape.id()) {
                    continue;
                }
                shape.attach_manager(weak);
                live.push(shape);
                added_count += 1;
            }
        }

        let removed_count = detached.len();
        for shape in detached {
            if !self.is_live_anywhere(shape.id()) {
                shape.detach_manager(weak);
            }
        }

        debug!(
            "layer {}: reconciled (+{}, -{}), {} live",
            layer,
            added_count,
            removed_count,
            self.get_child_count(layer)
        );
    }

    fn is_live_anywhere(&self, id: ShapeId) -> bool {
        self.shared
            .layers
            .borrow()
            .values()
            .any(|live| live.iter().any(|shape| shape.id() == id))
    }
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollisionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: BTreeMap<LayerId, usize> = self
            .shared
            .layers
            .borrow()
            .iter()
            .map(|(layer, shapes)| (*layer, shapes.len()))
            .collect();
        f.debug_struct("CollisionManager")
            .field("layers", &layers)
            .field("pending", &self.has_pending())
            .field("config", &*self.shared.config.borrow())
            .finish()
    }
}
