//! Whole-tick behaviour of the manager, shapes and listeners together

use crate::entity::{Body, Entity, EntityRef};
use crate::foundation::math::Vec3;
use crate::physics::collision::{CollisionListener, CollisionShape, ShapeId, ShapeRef};
use crate::physics::CollisionManager;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    IsCollide(ShapeId, ShapeId),
    OnCollide(ShapeId, ShapeId),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

/// Records every callback; answers with geometry or a fixed value
struct Recorder {
    log: CallLog,
    answer: Option<bool>,
}

impl Recorder {
    fn geometric(log: &CallLog) -> Rc<Self> {
        Rc::new(Self { log: log.clone(), answer: None })
    }

    fn fixed(log: &CallLog, answer: bool) -> Rc<Self> {
        Rc::new(Self { log: log.clone(), answer: Some(answer) })
    }
}

impl CollisionListener for Recorder {
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) -> bool {
        self.log.borrow_mut().push(Call::IsCollide(shape1.id(), shape2.id()));
        self.answer.unwrap_or_else(|| shape1.is_intersect(shape2))
    }

    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) {
        self.log.borrow_mut().push(Call::OnCollide(shape1.id(), shape2.id()));
    }
}

fn new_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &CallLog) -> Vec<Call> {
    std::mem::take(&mut *log.borrow_mut())
}

fn on_collides(calls: &[Call]) -> Vec<(ShapeId, ShapeId)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::OnCollide(a, b) => Some((*a, *b)),
            Call::IsCollide(..) => None,
        })
        .collect()
}

fn is_collides(calls: &[Call]) -> Vec<(ShapeId, ShapeId)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::IsCollide(a, b) => Some((*a, *b)),
            Call::OnCollide(..) => None,
        })
        .collect()
}

fn body_at(x: f32, y: f32) -> EntityRef {
    Body::at(Vec3::new(x, y, 0.0)).into_ref()
}

#[test]
fn test_sphere_round_trip_touching_is_not_collision() {
    let log = new_log();
    let manager = CollisionManager::new();
    let body_b = body_at(1.9, 0.0);
    let a = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(Recorder::geometric(&log))
        .into_ref();
    let b = CollisionShape::sphere(body_b.clone(), 1.0).into_ref();
    manager.add_child(&a, 0);
    manager.add_child(&b, 0);

    manager.check_for_collisions(0.016);
    assert_eq!(on_collides(&take(&log)), vec![(a.id(), b.id())]);

    body_b.borrow_mut().set_position(Vec3::new(2.0, 0.0, 0.0));
    manager.check_for_collisions(0.016);
    let calls = take(&log);
    assert_eq!(is_collides(&calls), vec![(a.id(), b.id())]);
    assert!(on_collides(&calls).is_empty());
}

#[test]
fn test_boxes_touching_edges_collide() {
    let log = new_log();
    let manager = CollisionManager::new();
    let a = CollisionShape::new_box(body_at(0.0, 0.0), 2.0, 2.0)
        .with_listener(Recorder::geometric(&log))
        .into_ref();
    let b = CollisionShape::new_box(body_at(2.0, 0.0), 2.0, 2.0).into_ref();
    manager.add_child(&a, 0);
    manager.add_child(&b, 0);

    let stats = manager.check_for_collisions(0.016);
    assert_eq!(stats.collisions, 1);
    assert_eq!(on_collides(&take(&log)), vec![(a.id(), b.id())]);
}

#[test]
fn test_layers_are_isolated() {
    let log = new_log();
    let manager = CollisionManager::new();
    // Every shape overlaps every other shape geometrically
    let shapes: Vec<ShapeRef> = (0..4)
        .map(|_| {
            CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
                .with_listener(Recorder::fixed(&log, true))
                .into_ref()
        })
        .collect();
    manager.add_child(&shapes[0], 1);
    manager.add_child(&shapes[1], 2);
    manager.add_child(&shapes[2], 1);
    manager.add_child(&shapes[3], 2);

    manager.check_for_collisions(0.016);
    let tested = is_collides(&take(&log));
    assert_eq!(
        tested,
        vec![(shapes[0].id(), shapes[2].id()), (shapes[1].id(), shapes[3].id())]
    );
}

#[test]
fn test_pair_order_follows_insertion_and_is_stable() {
    let log = new_log();
    let manager = CollisionManager::new();
    let shapes: Vec<ShapeRef> = (0..4)
        .map(|i| {
            CollisionShape::sphere(body_at(i as f32, 0.0), 0.1)
                .with_listener(Recorder::fixed(&log, true))
                .into_ref()
        })
        .collect();
    for shape in shapes.iter().rev() {
        manager.add_child(shape, 0);
    }
    manager.check_for_collisions(0.016);
    let first = take(&log);

    let order: Vec<ShapeId> = shapes.iter().rev().map(|s| s.id()).collect();
    let mut expected = Vec::new();
    for i in 0..order.len() {
        for j in i + 1..order.len() {
            expected.push((order[i], order[j]));
        }
    }
    assert_eq!(is_collides(&first), expected);
    assert_eq!(on_collides(&first), expected);

    for _ in 0..3 {
        manager.check_for_collisions(0.016);
        assert_eq!(take(&log), first);
    }
}

/// On its first collision, queues a new shape and the removal of shape2
struct Spawner {
    log: CallLog,
    spawn: ShapeRef,
    fired: Cell<bool>,
}

impl CollisionListener for Spawner {
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) -> bool {
        self.log.borrow_mut().push(Call::IsCollide(shape1.id(), shape2.id()));
        true
    }

    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) {
        if self.fired.replace(true) {
            return;
        }
        let manager = shape1.manager().expect("live shape has a manager");
        manager.add_child(&self.spawn, 0);
        manager.remove_child(shape2, 0);
        assert!(manager.has_pending());
    }
}

#[test]
fn test_membership_changes_during_sweep_apply_next_tick() {
    let log = new_log();
    let manager = CollisionManager::new();
    let recorder = Recorder::fixed(&log, false);

    let spawned = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(recorder.clone())
        .into_ref();
    let a = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(Rc::new(Spawner {
            log: log.clone(),
            spawn: spawned.clone(),
            fired: Cell::new(false),
        }))
        .into_ref();
    let b = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(recorder.clone())
        .into_ref();
    let c = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(recorder)
        .into_ref();
    manager.add_child(&a, 0);
    manager.add_child(&b, 0);
    manager.add_child(&c, 0);

    manager.check_for_collisions(0.016);
    assert_eq!(
        is_collides(&take(&log)),
        vec![(a.id(), b.id()), (a.id(), c.id()), (b.id(), c.id())]
    );
    assert_eq!(manager.get_child_count(0), 3);
    assert!(manager.contains(&b, 0));
    assert!(spawned.manager().is_none());

    manager.check_for_collisions(0.016);
    assert_eq!(
        is_collides(&take(&log)),
        vec![(a.id(), c.id()), (a.id(), spawned.id()), (c.id(), spawned.id())]
    );
    assert!(b.manager().is_none());
    assert!(spawned.manager().is_some());
}

#[test]
fn test_compound_shape_tests_children_before_response() {
    let log = new_log();
    let manager = CollisionManager::new();
    let child = CollisionShape::sphere(body_at(50.0, 50.0), 0.1)
        .with_listener(Recorder::fixed(&log, false));
    let child_id = child.id();
    let a = CollisionShape::sphere(body_at(0.0, 0.0), 1.0)
        .with_listener(Recorder::fixed(&log, true))
        .with_child(child)
        .into_ref();
    let b = CollisionShape::sphere(body_at(0.0, 0.0), 1.0).into_ref();
    manager.add_child(&a, 0);
    manager.add_child(&b, 0);

    let stats = manager.check_for_collisions(0.016);
    assert_eq!(stats.collisions, 1);
    assert_eq!(
        take(&log),
        vec![
            Call::IsCollide(a.id(), b.id()),
            Call::IsCollide(child_id, b.id()),
            Call::OnCollide(a.id(), b.id()),
        ]
    );
}

#[test]
fn test_two_dirty_layers_reconcile_in_one_tick() {
    let manager = CollisionManager::new();
    let a0 = CollisionShape::sphere(body_at(0.0, 0.0), 1.0).into_ref();
    let b0 = CollisionShape::sphere(body_at(0.0, 0.0), 1.0).into_ref();
    let a1 = CollisionShape::sphere(body_at(0.0, 0.0), 1.0).into_ref();
    let b1 = CollisionShape::sphere(body_at(0.0, 0.0), 1.0).into_ref();

    manager.add_child(&a0, 0);
    manager.add_child(&b0, 0);
    manager.add_child(&a1, 1);
    manager.add_child(&b1, 1);
    manager.check_for_collisions(0.016);
    assert_eq!(manager.get_child_count(0), 2);
    assert_eq!(manager.get_child_count(1), 2);

    manager.remove_child(&a0, 0);
    manager.remove_child(&a1, 1);
    manager.check_for_collisions(0.016);
    assert_eq!(manager.get_child_count(0), 1);
    assert_eq!(manager.get_child_count(1), 1);
    assert!(a0.manager().is_none());
    assert!(a1.manager().is_none());
    assert!(!manager.has_pending());
}

/// Looks ahead from inside the sweep before reporting
struct LookAhead {
    predicted: Cell<Option<bool>>,
}

impl CollisionListener for LookAhead {
    fn is_collide(&self, _shape1: &CollisionShape, _shape2: &CollisionShape, _delta: f32) -> bool {
        true
    }

    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32) {
        self.predicted.set(Some(shape1.will_intersect(shape2, delta, 10)));
    }
}

#[test]
fn test_prediction_inside_sweep_leaves_entities_untouched() {
    let manager = CollisionManager::new();
    let body_a: EntityRef = Body::moving(Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0)).into_ref();
    let body_b: EntityRef =
        Body::moving(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)).into_ref();
    let listener = Rc::new(LookAhead { predicted: Cell::new(None) });
    let a = CollisionShape::sphere(body_a.clone(), 1.0)
        .with_listener(listener.clone())
        .into_ref();
    let b = CollisionShape::sphere(body_b.clone(), 1.0).into_ref();
    manager.add_child(&a, 0);
    manager.add_child(&b, 0);

    manager.check_for_collisions(1.0);
    assert_eq!(listener.predicted.get(), Some(true));
    assert!(Rc::ptr_eq(&a.entity().unwrap(), &body_a));
    assert!(Rc::ptr_eq(&b.entity().unwrap(), &body_b));
    assert_eq!(body_a.borrow().position(), Vec3::zeros());
    assert_eq!(body_b.borrow().velocity(), Vec3::new(-10.0, 0.0, 0.0));
}

#[test]
fn test_swap_velocity_bounce() {
    use crate::physics::collision::SwapVelocityListener;

    let manager = CollisionManager::new();
    let body_a: EntityRef = Body::moving(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0)).into_ref();
    let body_b: EntityRef =
        Body::moving(Vec3::new(1.5, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)).into_ref();
    let a = CollisionShape::sphere(body_a.clone(), 1.0)
        .with_listener(Rc::new(SwapVelocityListener))
        .into_ref();
    let b = CollisionShape::sphere(body_b.clone(), 1.0).into_ref();
    manager.add_child(&a, 3);
    manager.add_child(&b, 3);

    manager.check_for_collisions(0.016);
    assert_eq!(body_a.borrow().velocity(), Vec3::new(-2.0, 0.0, 0.0));
    assert_eq!(body_b.borrow().velocity(), Vec3::new(1.0, 0.0, 0.0));
}
