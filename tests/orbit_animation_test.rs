use std::f64::consts::TAU;

use flow_spotlight::{
    animation::{ORBIT_RADIUS, ORBIT_TIME_SCALE_MS, orbit_position},
    light::INITIAL_POSITION,
    scene::SceneState,
};

use crate::common::test_utils::{EPSILON, approx_eq, length};
mod common;

const PERIOD_MS: f64 = ORBIT_TIME_SCALE_MS * TAU;

#[test]
fn orbit_stays_on_the_circle() {
    for step in 0..500 {
        let t = step as f64 * 137.0;
        let p = orbit_position(t, 5.0);
        let r2 = p.x * p.x + p.z * p.z;
        assert!(
            approx_eq(r2, ORBIT_RADIUS * ORBIT_RADIUS, 1e-3),
            "t = {t}: x² + z² = {r2}"
        );
        assert_eq!(p.y, 5.0);
    }
}

#[test]
fn orbit_is_periodic() {
    for t in [0.0, 1234.5, 9000.0, 40_000.0] {
        let a = orbit_position(t, 0.0);
        let b = orbit_position(t + PERIOD_MS, 0.0);
        assert!(approx_eq(a.x, b.x, 1e-3), "x differs at t = {t}");
        assert!(approx_eq(a.z, b.z, 1e-3), "z differs at t = {t}");
    }
}

#[test]
fn orbit_starts_on_the_x_axis() {
    let p = orbit_position(0.0, 1.0);
    assert!(approx_eq(p.x, ORBIT_RADIUS, EPSILON));
    assert!(approx_eq(p.z, 0.0, EPSILON));

    let quarter = orbit_position(PERIOD_MS / 4.0, 1.0);
    assert!(approx_eq(quarter.x, 0.0, 1e-3));
    assert!(approx_eq(quarter.z, ORBIT_RADIUS, 1e-3));
}

#[test]
fn frame_moves_the_light_and_its_helper() {
    let mut state = SceneState::new();

    state.frame_at(PERIOD_MS / 2.0);

    assert!(approx_eq(state.light.position.x, -ORBIT_RADIUS, 1e-3));
    assert!(approx_eq(state.light.position.z, 0.0, 1e-3));
    // height is kept from the initial placement
    assert_eq!(state.light.position.y, INITIAL_POSITION[1]);

    let apex = state.helper.apex();
    assert!(approx_eq(apex[0], state.light.position.x, EPSILON));
    assert!(approx_eq(apex[1], state.light.position.y, EPSILON));
    assert!(approx_eq(apex[2], state.light.position.z, EPSILON));
}

#[test]
fn helper_axis_points_at_the_target() {
    let mut state = SceneState::new();
    state.frame_at(2500.0);

    let apex = state.helper.apex();
    let base = state.helper.base_center();
    let axis = [base[0] - apex[0], base[1] - apex[1], base[2] - apex[2]];
    let length_of_axis = length(axis);
    assert!(approx_eq(length_of_axis, state.light.cone_length(), 0.5));

    let direction = state.light.direction();
    let dot = (axis[0] * direction.x + axis[1] * direction.y + axis[2] * direction.z) / length_of_axis;
    assert!(approx_eq(dot, 1.0, 1e-3));
}

#[test]
fn helper_takes_the_light_colour() {
    let mut state = mounted_scene_with_red_light();
    state.frame_at(0.0);
    let red = state.light.color_linear();
    assert!(state.helper.vertices().iter().all(|v| v.color == red));
}

fn mounted_scene_with_red_light() -> SceneState {
    let mut state = common::test_utils::mounted_scene();
    state.handle_panel_change(flow_spotlight::light::LightParam::Color(0xff0000));
    state
}
