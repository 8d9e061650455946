use std::f32::consts::PI;

use flow_spotlight::{
    light::{LightParam, LightParameters, SpotLight},
    pipelines::light::SpotLightUniform,
    resources::{NONE, TextureHandle, TextureRegistry},
    scene::{LUCY_MATERIAL, PLANE_MATERIAL, SceneState},
};

use crate::common::test_utils::{full_registry, handle_of, mounted_scene};
mod common;

/// The light property a change targets, read back from the live light.
fn light_value(light: &SpotLight, change: &LightParam) -> LightParam {
    match change {
        LightParam::Map(_) => unreachable!("maps are compared through handles"),
        LightParam::Color(_) => LightParam::Color(light.color),
        LightParam::Intensity(_) => LightParam::Intensity(light.intensity),
        LightParam::Distance(_) => LightParam::Distance(light.distance),
        LightParam::Angle(_) => LightParam::Angle(light.angle),
        LightParam::Penumbra(_) => LightParam::Penumbra(light.penumbra),
        LightParam::Decay(_) => LightParam::Decay(light.decay),
        LightParam::Focus(_) => LightParam::Focus(light.shadow.focus),
        LightParam::Shadows(_) => LightParam::Shadows(light.cast_shadow),
    }
}

fn record_value(params: &LightParameters, change: &LightParam) -> LightParam {
    match change {
        LightParam::Map(_) => LightParam::Map(params.map.clone()),
        LightParam::Color(_) => LightParam::Color(params.color),
        LightParam::Intensity(_) => LightParam::Intensity(params.intensity),
        LightParam::Distance(_) => LightParam::Distance(params.distance),
        LightParam::Angle(_) => LightParam::Angle(params.angle),
        LightParam::Penumbra(_) => LightParam::Penumbra(params.penumbra),
        LightParam::Decay(_) => LightParam::Decay(params.decay),
        LightParam::Focus(_) => LightParam::Focus(params.focus),
        LightParam::Shadows(_) => LightParam::Shadows(params.shadows),
    }
}

#[test]
fn mount_applies_defaults_to_the_light() {
    let state = mounted_scene();
    let defaults = LightParameters::default();

    assert_eq!(state.controller.params(), &defaults);
    assert_eq!(state.light.map, Some(handle_of("disturb.jpg")));
    assert_eq!(state.light.color, 0xffffff);
    assert_eq!(state.light.intensity, 100.0);
    assert_eq!(state.light.distance, 0.0);
    assert_eq!(state.light.angle, PI / 6.0);
    assert_eq!(state.light.penumbra, 1.0);
    assert_eq!(state.light.decay, 2.0);
    assert_eq!(state.light.shadow.focus, 1.0);
    assert!(state.light.cast_shadow);
    assert!(state.shading.shadow_map_enabled);
}

#[test]
fn record_and_light_agree_after_every_edit() {
    let mut state = mounted_scene();
    let changes = [
        LightParam::Color(0x336699),
        LightParam::Intensity(250.0),
        LightParam::Distance(12.5),
        LightParam::Angle(PI / 4.0),
        LightParam::Penumbra(0.3),
        LightParam::Decay(1.5),
        LightParam::Focus(0.4),
        LightParam::Shadows(false),
        LightParam::Intensity(0.0),
        LightParam::Shadows(true),
    ];

    for change in changes {
        state.handle_panel_change(change.clone());
        assert_eq!(record_value(state.controller.params(), &change), change);
        assert_eq!(light_value(&state.light, &change), change);
    }
}

#[test]
fn an_edit_only_touches_its_own_field() {
    let mut state = mounted_scene();
    let before = state.controller.params().clone();

    state.handle_panel_change(LightParam::Decay(1.25));

    let after = state.controller.params();
    assert_eq!(after.decay, 1.25);
    assert_eq!(
        LightParameters {
            decay: before.decay,
            ..after.clone()
        },
        before
    );
}

#[test]
fn selecting_colors_png_projects_its_texture() {
    let mut state = mounted_scene();
    let colors = handle_of("colors.png");

    let change = state
        .panel
        .panel_mut()
        .and_then(|panel| panel.select_map("colors.png"))
        .expect("colors.png is a panel option");
    state.handle_panel_change(change);

    assert_eq!(state.light.map, Some(colors));
    assert_eq!(state.controller.params().map, "colors.png");
}

#[test]
fn selecting_none_removes_the_projected_texture() {
    let mut state = mounted_scene();

    state.handle_panel_change(LightParam::Map(NONE.to_string()));

    assert_eq!(state.light.map, None);
    assert_eq!(state.controller.params().map, NONE);
}

#[test]
fn every_loaded_name_maps_to_its_handle() {
    let mut state = mounted_scene();
    let names: Vec<String> = state.textures.names().map(str::to_string).collect();
    assert_eq!(names.first().map(String::as_str), Some(NONE));

    for name in names {
        state.handle_panel_change(LightParam::Map(name.clone()));
        assert_eq!(state.light.map, state.textures.get(&name));
    }
}

#[test]
fn missing_default_texture_starts_without_a_gobo() {
    let mut state = SceneState::new();
    state.textures_ready(TextureRegistry::from_loaded([("colors.png", TextureHandle(0))]));

    assert_eq!(state.light.map, None);
    assert_eq!(state.controller.params().map, NONE);
    let panel = state.panel.panel().expect("panel is built");
    assert_eq!(panel.values().map, NONE);
    assert_eq!(panel.values(), state.controller.params());
}

#[test]
fn shadow_toggle_flags_every_material() {
    let mut state = mounted_scene();
    assert!(state.shading.take_material_updates().is_empty());

    state.handle_panel_change(LightParam::Shadows(false));
    assert!(!state.shading.shadow_map_enabled);
    assert!(!state.light.cast_shadow);
    assert!(state.shading.materials().iter().all(|m| m.needs_update));
    assert!(!state.shading.receives_shadow(LUCY_MATERIAL));
    assert!(!state.shading.casts_shadow(LUCY_MATERIAL));
    let updated = state.shading.take_material_updates();
    assert_eq!(updated.len(), state.shading.materials().len());

    state.handle_panel_change(LightParam::Shadows(true));
    assert!(state.shading.shadow_map_enabled);
    assert!(state.light.cast_shadow);
    assert!(state.shading.materials().iter().all(|m| m.needs_update));
    assert!(state.shading.receives_shadow(PLANE_MATERIAL));
    assert!(state.shading.casts_shadow(LUCY_MATERIAL));
    assert!(!state.shading.casts_shadow(PLANE_MATERIAL));
}

#[test]
fn panel_clamps_and_filters_edits() {
    let mut state = SceneState::new();
    state.textures_ready(full_registry());
    let panel = state.panel.panel_mut().expect("panel is built");

    assert_eq!(
        panel.edit(LightParam::Intensity(900.0)),
        Some(LightParam::Intensity(500.0))
    );
    assert_eq!(
        panel.edit(LightParam::Decay(0.0)),
        Some(LightParam::Decay(1.0))
    );
    assert_eq!(panel.edit(LightParam::Angle(f32::NAN)), None);
    assert_eq!(panel.edit(LightParam::Map("lava.png".to_string())), None);
    assert_eq!(
        panel.edit(LightParam::Color(0x7f_ff00ff)),
        Some(LightParam::Color(0xff00ff))
    );
    assert_eq!(panel.values().intensity, 500.0);
    assert_eq!(panel.values().color, 0xff00ff);
}

#[test]
fn materials_are_registered_under_fixed_ids() {
    let state = SceneState::new();
    let plane = state.shading.material(PLANE_MATERIAL).expect("plane material");
    let lucy = state.shading.material(LUCY_MATERIAL).expect("lucy material");
    assert_eq!(plane.name, "plane");
    assert!(!plane.cast_shadow && plane.receive_shadow);
    assert_eq!(lucy.name, "lucy");
    assert!(lucy.cast_shadow && lucy.receive_shadow);
    assert_eq!(state.shading.materials().len(), 2);
}

#[test]
fn fresh_helper_matches_a_default_light() {
    let state = SceneState::new();
    let helper = flow_spotlight::helper::SpotLightHelper::new(&SpotLight::new());
    assert_eq!(helper.vertices(), state.helper.vertices());
}

#[test]
fn panel_edit_reaches_the_light_uniform_in_the_same_frame() {
    let mut state = mounted_scene();
    assert!(state.light_uniform().shadow_enabled());

    state.handle_panel_change(LightParam::Shadows(false));
    assert!(!state.light_uniform().shadow_enabled());
    assert_eq!(
        state.light_uniform(),
        SpotLightUniform::from_light(&state.light, false)
    );

    state.handle_panel_change(LightParam::Intensity(42.0));
    assert_eq!(
        state.light_uniform(),
        SpotLightUniform::from_light(&state.light, false)
    );
}

#[test]
fn showing_the_panel_without_input_changes_nothing() {
    let mut state = mounted_scene();
    let before = state.controller.params().clone();
    let gui = egui::Context::default();
    for _ in 0..2 {
        let _ = gui.run(egui::RawInput::default(), |ctx| state.show_panel(ctx));
    }
    assert_eq!(state.controller.params(), &before);
    assert!(state.shading.take_material_updates().is_empty());
    let panel = state.panel.panel().expect("panel is built");
    assert_eq!(panel.values(), &before);
}

#[test]
fn showing_before_textures_is_a_no_op() {
    let mut state = SceneState::new();
    let gui = egui::Context::default();
    let _ = gui.run(egui::RawInput::default(), |ctx| state.show_panel(ctx));
    assert!(!state.panel.is_present());
    assert_eq!(state.controller.params(), &LightParameters::default());
}
