use std::f32::consts::FRAC_PI_2;

use cgmath::Point3;
use flow_spotlight::camera::{Camera, CameraController, INITIAL_POSITION, OrbitLimits, TARGET};
use winit::event::MouseScrollDelta;

use crate::common::test_utils::{EPSILON, approx_eq};
mod common;

#[test]
fn camera_starts_inside_its_limits() {
    let camera = Camera::default();
    let limits = OrbitLimits::default();
    assert_eq!(camera.position, Point3::from(INITIAL_POSITION));
    assert_eq!(camera.target, Point3::from(TARGET));
    assert!(camera.distance() >= limits.min_distance && camera.distance() <= limits.max_distance);
    assert!(camera.polar_angle() <= limits.max_polar);
}

#[test]
fn zoom_is_clamped() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 500.0));
    controller.update(&mut camera);
    assert!(approx_eq(camera.distance(), 2.0, EPSILON));

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, -500.0));
    controller.update(&mut camera);
    assert!(approx_eq(camera.distance(), 10.0, EPSILON));
}

#[test]
fn camera_never_dips_below_the_horizon() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();

    controller.handle_mouse(0.0, -100_000.0);
    controller.update(&mut camera);
    assert!(camera.polar_angle() <= FRAC_PI_2 + EPSILON);
    assert!(approx_eq(camera.position.y, camera.target.y, 1e-3));

    controller.handle_mouse(0.0, 100_000.0);
    controller.update(&mut camera);
    assert!(camera.polar_angle() >= 0.0);
    assert!(camera.position.y > camera.target.y);
}

#[test]
fn horizontal_drag_keeps_distance_and_height() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    let distance = camera.distance();
    let height = camera.position.y;

    controller.handle_mouse(420.0, 0.0);
    controller.update(&mut camera);

    assert!(approx_eq(camera.distance(), distance, 1e-3));
    assert!(approx_eq(camera.position.y, height, 1e-3));
}

#[test]
fn input_is_consumed_by_update() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    controller.handle_mouse(100.0, 30.0);
    controller.update(&mut camera);
    let moved = camera;

    controller.update(&mut camera);
    assert!(approx_eq(camera.position.x, moved.position.x, EPSILON));
    assert!(approx_eq(camera.position.y, moved.position.y, EPSILON));
    assert!(approx_eq(camera.position.z, moved.position.z, EPSILON));
}
