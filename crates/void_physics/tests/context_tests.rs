//! Integration tests for void_physics
//!
//! Tests context lifecycle, id stability, and the snapshot protocol

use approx::assert_relative_eq;
use std::collections::HashSet;
use void_physics::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn context() -> PhysicsContext {
    PhysicsContext::new(PhysicsConfig::default().with_thread_count(2)).unwrap()
}

#[test]
fn test_falling_box_scenario() {
    let mut physics = PhysicsContext::new(
        PhysicsConfig::default()
            .with_max_bodies(1024)
            .with_thread_count(0),
    )
    .unwrap();

    let id = physics
        .create_box(BoxRequest::dynamic().with_position(0.0, 10.0, 0.0))
        .unwrap();
    assert_eq!(id, StableBodyId(1));

    let mut buf = vec![0u8; buffer_size(1)];
    assert_eq!(physics.step(DT, &mut buf), 1);

    let record = records(&buf, 1).next().unwrap();
    assert_eq!(record.id(), id);
    assert!(record.position()[1] < 10.0);

    physics.destroy(id);
    assert_eq!(physics.step(DT, &mut buf), 0);

    physics.shutdown();
}

#[test]
fn test_ids_unique_and_positive() {
    let mut physics = context();
    let mut seen = HashSet::new();

    for i in 0..200 {
        let request = match i % 3 {
            0 => BoxRequest::fixed(),
            1 => BoxRequest::kinematic(),
            _ => BoxRequest::dynamic(),
        };
        let id = physics
            .create_box(request.with_position(i as f64 * 2.0, 0.0, 0.0))
            .unwrap();
        assert!(id.raw() >= 1);
        assert!(seen.insert(id), "id {id} issued twice");

        if i % 5 == 0 {
            physics.destroy(id);
        }
    }
}

#[test]
fn test_resolve_after_create_matches_pose() {
    let mut physics = PhysicsContext::new(
        PhysicsConfig::default()
            .with_gravity(0.0, 0.0, 0.0)
            .with_thread_count(1),
    )
    .unwrap();

    let half_turn = std::f64::consts::FRAC_1_SQRT_2;
    let id = physics
        .create_box(
            BoxRequest::dynamic()
                .with_position(1.5, -2.0, 4.25)
                .with_orientation(0.0, half_turn, 0.0, half_turn),
        )
        .unwrap();
    assert!(physics.resolve(id).is_ok());

    // No forces act on the body, so one step leaves it where it was created
    let mut buf = vec![0u8; buffer_size(1)];
    assert_eq!(physics.step(DT, &mut buf), 1);
    let record = records(&buf, 1).next().unwrap();

    let position = record.position();
    let rotation = record.rotation();
    assert_relative_eq!(position[0], 1.5, epsilon = 1e-5);
    assert_relative_eq!(position[1], -2.0, epsilon = 1e-5);
    assert_relative_eq!(position[2], 4.25, epsilon = 1e-5);
    assert_relative_eq!(rotation[1], half_turn as f32, epsilon = 1e-5);
    assert_relative_eq!(rotation[3], half_turn as f32, epsilon = 1e-5);
}

#[test]
fn test_destroy_then_absent() {
    let mut physics = context();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            physics
                .create_box(BoxRequest::dynamic().with_position(i as f64 * 3.0, 0.0, 0.0))
                .unwrap()
        })
        .collect();

    physics.destroy(ids[1]);
    physics.destroy(ids[1]);
    assert!(matches!(physics.resolve(ids[1]), Err(PhysicsError::UnknownId(_))));

    let mut buf = vec![0u8; buffer_size(8)];
    for _ in 0..5 {
        let n = physics.step(DT, &mut buf);
        assert!(records(&buf, n).all(|r| r.id() != ids[1]));
    }
    assert_eq!(physics.body_count(), 3);
}

#[test]
fn test_buffer_sized_for_active_count() {
    let mut physics = context();
    for i in 0..10 {
        physics
            .create_box(BoxRequest::dynamic().with_position(0.0, i as f64 * 3.0, 0.0))
            .unwrap();
    }
    physics
        .create_box(BoxRequest::fixed().with_position(0.0, -10.0, 0.0))
        .unwrap();

    let mut buf = vec![0u8; buffer_size(10)];
    let n = physics.step(DT, &mut buf);

    assert_eq!(n, 10);
    assert_eq!(physics.stats().dropped_records, 0);
    assert_eq!(physics.stats().records_written, 10);
    let ids: HashSet<_> = records(&buf, n).map(|r| r.id()).collect();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_capacity_sentinel() {
    let mut physics = PhysicsContext::new(
        PhysicsConfig::default()
            .with_max_bodies(2)
            .with_thread_count(1),
    )
    .unwrap();

    physics.create_box(BoxRequest::dynamic()).unwrap();
    physics.create_box(BoxRequest::fixed()).unwrap();
    assert!(matches!(
        physics.create_box(BoxRequest::dynamic()),
        Err(PhysicsError::EngineCreation(_))
    ));
}

#[test]
fn test_box_lands_on_ground() {
    let mut physics = context();
    physics
        .create_box(BoxRequest::fixed().with_half_extents(20.0, 0.5, 20.0))
        .unwrap();
    let id = physics
        .create_box(BoxRequest::dynamic().with_position(0.0, 3.0, 0.0))
        .unwrap();

    let mut buf = vec![0u8; buffer_size(2)];
    for _ in 0..240 {
        physics.step(DT, &mut buf);
    }

    // Ground top is at y = 0.5, box half height is 0.5
    let y = physics.transform(id).unwrap().position[1];
    assert!(y > 0.8 && y < 1.2, "box rests on the ground, got y = {y}");
    assert!(physics.stats().contact_pairs >= 1);
}

#[test]
fn test_config_from_json() {
    let config = PhysicsConfig::from_json(r#"{ "max_bodies": 3, "thread_count": 1 }"#).unwrap();
    let mut physics = PhysicsContext::new(config).unwrap();

    assert_eq!(physics.config().max_bodies, 3);
    assert_eq!(physics.thread_count(), 1);
    for _ in 0..3 {
        physics.create_box(BoxRequest::fixed()).unwrap();
    }
    assert!(physics.create_box(BoxRequest::fixed()).is_err());
}
