//! Bouncing Balls Demo
//!
//! Headless frame loop driving a `CollisionManager`:
//! - Balls share layer 0 and exchange velocities when they touch
//! - Walls and listener-less ball hulls share layer 1; walls reflect balls
//!   back into the arena
//! - Every simulated second logs the tick stats and a look-ahead probe
//!
//! Usage: `bounce_demo [config.toml|config.ron]`

use layer_collision::foundation::logging::{self, error, info};
use layer_collision::prelude::*;
use rand::Rng;
use std::rc::Rc;
use thiserror::Error;

// Arena settings
const ARENA_HALF_SIZE: f32 = 20.0;
const WALL_THICKNESS: f32 = 2.0;

// Ball settings
const NUM_BALLS: usize = 24;
const BALL_RADIUS: f32 = 0.75;
const BALL_MAX_SPEED: f32 = 8.0;

// Simulation settings
const TICK_RATE: u32 = 60;
const SIMULATED_SECONDS: u32 = 10;

const BALL_LAYER: LayerId = 0;
const WALL_LAYER: LayerId = 1;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

/// Reflects the ball's velocity component pointing into the wall
struct WallListener {
    normal: Vec3,
}

impl CollisionListener for WallListener {
    fn is_collide(&self, wall: &CollisionShape, ball: &CollisionShape, _delta: f32) -> bool {
        // Neighbouring walls meet at the corners
        matches!(ball.kind(), ShapeKind::Sphere { .. }) && wall.is_intersect(ball)
    }

    fn on_collide(&self, _wall: &CollisionShape, ball: &CollisionShape, _delta: f32) {
        let Some(entity) = ball.entity() else {
            return;
        };
        let velocity = entity.borrow().velocity();
        let into_wall = velocity.dot(&self.normal);
        if into_wall < 0.0 {
            entity.borrow_mut().set_velocity(velocity - self.normal * (2.0 * into_wall));
        }
    }
}

/// Four walls enclosing the arena, each reflecting along its inward normal
fn arena_walls() -> Vec<ShapeRef> {
    let span = ARENA_HALF_SIZE * 2.0 + WALL_THICKNESS * 2.0;
    let edge = ARENA_HALF_SIZE + WALL_THICKNESS * 0.5;
    [
        (Vec3::new(0.0, edge, 0.0), span, WALL_THICKNESS, Vec3::new(0.0, -1.0, 0.0)),
        (Vec3::new(0.0, -edge, 0.0), span, WALL_THICKNESS, Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(edge, 0.0, 0.0), WALL_THICKNESS, span, Vec3::new(-1.0, 0.0, 0.0)),
        (Vec3::new(-edge, 0.0, 0.0), WALL_THICKNESS, span, Vec3::new(1.0, 0.0, 0.0)),
    ]
    .into_iter()
    .map(|(position, width, height, normal)| {
        CollisionShape::new_box(Body::at(position).into_ref(), width, height)
            .with_listener(Rc::new(WallListener { normal }))
            .into_ref()
    })
    .collect()
}

struct BounceDemo {
    manager: CollisionManager,
    balls: Vec<ShapeRef>,
    _walls: Vec<ShapeRef>,
    _hulls: Vec<ShapeRef>,
    entities: Vec<EntityRef>,
}

impl BounceDemo {
    fn new(config: CollisionConfig) -> Self {
        let manager = CollisionManager::with_config(config);
        let mut rng = rand::thread_rng();

        // Walls go in first so they are always shape1 against a ball
        let walls = arena_walls();
        for wall in &walls {
            manager.add_child(wall, WALL_LAYER);
        }

        let limit = ARENA_HALF_SIZE - BALL_RADIUS;
        let mut balls = Vec::with_capacity(NUM_BALLS);
        let mut hulls = Vec::with_capacity(NUM_BALLS);
        let mut entities = Vec::with_capacity(NUM_BALLS);
        for _ in 0..NUM_BALLS {
            let position = Vec3::new(
                rng.gen_range(-limit..limit),
                rng.gen_range(-limit..limit),
                0.0,
            );
            let velocity = Vec3::new(
                rng.gen_range(-BALL_MAX_SPEED..BALL_MAX_SPEED),
                rng.gen_range(-BALL_MAX_SPEED..BALL_MAX_SPEED),
                0.0,
            );
            let entity = Body::moving(position, velocity).into_ref();
            let ball = CollisionShape::sphere(entity.clone(), BALL_RADIUS)
                .with_listener(Rc::new(SwapVelocityListener))
                .into_ref();
            // Hull has no listener so hull pairs in the wall layer stay quiet
            let hull = CollisionShape::sphere(entity.clone(), BALL_RADIUS).into_ref();
            manager.add_child(&ball, BALL_LAYER);
            manager.add_child(&hull, WALL_LAYER);
            balls.push(ball);
            hulls.push(hull);
            entities.push(entity);
        }

        Self {
            manager,
            balls,
            _walls: walls,
            _hulls: hulls,
            entities,
        }
    }

    fn integrate(&self, dt: f32) {
        for entity in &self.entities {
            let mut entity = entity.borrow_mut();
            let velocity = entity.velocity() + entity.acceleration() * dt;
            entity.set_velocity(velocity);
            let position = entity.position() + velocity * dt;
            entity.set_position(position);
        }
    }

    fn run(&self) -> Result<(), DemoError> {
        let dt = 1.0 / TICK_RATE as f32;
        let mut total_collisions = 0;

        for tick in 0..TICK_RATE * SIMULATED_SECONDS {
            self.integrate(dt);
            let stats = self.manager.check_for_collisions(dt);
            total_collisions += stats.collisions;

            if tick % TICK_RATE == 0 {
                let probe = self.probe(1.0);
                info!(
                    "t={:>2}s pairs={} collisions={} probe_hits_within_1s={}",
                    tick / TICK_RATE,
                    stats.pairs_tested,
                    stats.collisions,
                    probe
                );
            }
        }

        info!(
            "Simulated {}s at {} Hz: {} collisions",
            SIMULATED_SECONDS,
            TICK_RATE,
            total_collisions
        );
        Ok(())
    }

    /// How many other balls the first ball is predicted to touch within `horizon`
    fn probe(&self, horizon: f32) -> usize {
        let Some((first, rest)) = self.balls.split_first() else {
            return 0;
        };
        rest.iter()
            .filter(|other| self.manager.predict(first, other, horizon))
            .count()
    }
}

fn load_config() -> Result<CollisionConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading collision config from {}", path);
            let config = CollisionConfig::load_from_file(&path).map_err(CollisionError::from)?;
            Ok(config)
        }
        None => Ok(CollisionConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init();

    info!("Starting Bouncing Balls Demo");

    let config = load_config()?;
    let demo = BounceDemo::new(config);
    let result = demo.run();

    match result {
        Ok(()) => {
            info!("Bounce demo completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Bounce demo failed: {:?}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walls_alone_report_no_collisions() {
        let manager = CollisionManager::new();
        for wall in &arena_walls() {
            manager.add_child(wall, WALL_LAYER);
        }
        let stats = manager.check_for_collisions(1.0 / TICK_RATE as f32);
        assert_eq!(stats.pairs_tested, 6);
        assert_eq!(stats.collisions, 0);
    }

    #[test]
    fn test_wall_reflects_ball() {
        let manager = CollisionManager::new();
        let walls = arena_walls();
        for wall in &walls {
            manager.add_child(wall, WALL_LAYER);
        }
        let entity = Body::moving(
            Vec3::new(0.0, ARENA_HALF_SIZE - 0.5 * BALL_RADIUS, 0.0),
            Vec3::new(1.0, 3.0, 0.0),
        )
        .into_ref();
        let hull = CollisionShape::sphere(entity.clone(), BALL_RADIUS).into_ref();
        manager.add_child(&hull, WALL_LAYER);

        let stats = manager.check_for_collisions(1.0 / TICK_RATE as f32);
        assert_eq!(stats.collisions, 1);
        assert_eq!(entity.borrow().velocity(), Vec3::new(1.0, -3.0, 0.0));
    }
}
