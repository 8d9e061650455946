use flow_spotlight::{
    SceneError,
    light::LightParameters,
    panel::{ControlKind, DebugPanel, Field, PanelBinder},
    resources::{NONE, TEXTURE_FILES, TextureHandle, TextureRegistry},
};

use crate::common::test_utils::full_registry;
mod common;

#[test]
fn binder_waits_for_textures() {
    let mut binder = PanelBinder::new();
    assert!(!binder.is_present());

    binder.sync(&TextureRegistry::new(), &LightParameters::default());
    assert!(!binder.is_present());
    assert_eq!(binder.builds(), 0);

    binder.sync(&full_registry(), &LightParameters::default());
    assert!(binder.is_present());
    assert_eq!(binder.builds(), 1);
}

#[test]
fn binder_rebuilds_only_when_the_options_change() {
    let params = LightParameters::default();
    let mut registry = full_registry();
    let mut binder = PanelBinder::new();

    binder.sync(&registry, &params);
    binder.sync(&registry, &params);
    binder.sync(&registry, &params);
    assert_eq!(binder.builds(), 1);

    registry.populate([("disturb.jpg", TextureHandle(0))]);
    binder.sync(&registry, &params);
    assert_eq!(binder.builds(), 2);
    let options = match &binder.panel().map(|p| p.control(Field::Map).map(|c| c.kind.clone())) {
        Some(Some(ControlKind::Enum(options))) => options.clone(),
        other => panic!("map control is missing: {other:?}"),
    };
    assert_eq!(options, vec![NONE.to_string(), "disturb.jpg".to_string()]);
}

#[test]
fn unmount_removes_the_panel() {
    let registry = full_registry();
    let mut binder = PanelBinder::new();
    binder.sync(&registry, &LightParameters::default());

    binder.unmount();
    assert!(!binder.is_present());
    assert!(binder.panel().is_none());

    // mounting again builds a fresh panel
    binder.sync(&registry, &LightParameters::default());
    assert!(binder.is_present());
    assert_eq!(binder.builds(), 2);
}

#[test]
fn panel_has_one_control_per_parameter() {
    let panel = DebugPanel::new(&full_registry(), &LightParameters::default()).expect("valid panel");
    let fields: Vec<Field> = panel.controls().iter().map(|c| c.field).collect();
    assert_eq!(
        fields,
        vec![
            Field::Map,
            Field::Color,
            Field::Intensity,
            Field::Distance,
            Field::Angle,
            Field::Penumbra,
            Field::Decay,
            Field::Focus,
            Field::Shadows,
        ]
    );

    match &panel.controls()[0].kind {
        ControlKind::Enum(options) => {
            assert_eq!(options.len(), TEXTURE_FILES.len() + 1);
            assert_eq!(options[0], NONE);
        }
        other => panic!("map should be an enum, got {other:?}"),
    }
    assert_eq!(
        panel.control(Field::Intensity).map(|c| c.kind.clone()),
        Some(ControlKind::Float { min: 0.0, max: 500.0 })
    );
    assert_eq!(panel.values(), &LightParameters::default());
}

#[test]
fn panel_needs_texture_options() {
    let result = DebugPanel::new(&TextureRegistry::new(), &LightParameters::default());
    assert!(matches!(result, Err(SceneError::PanelInitFailure { .. })));
}

#[test]
fn panel_rejects_out_of_range_defaults() {
    let params = LightParameters {
        intensity: 1000.0,
        ..Default::default()
    };
    let result = DebugPanel::new(&full_registry(), &params);
    assert!(matches!(result, Err(SceneError::PanelInitFailure { .. })));

    let mut binder = PanelBinder::new();
    binder.sync(&full_registry(), &params);
    assert!(!binder.is_present());
    assert_eq!(binder.builds(), 0);
}

#[test]
fn headless_show_returns_no_edits() {
    let mut panel =
        DebugPanel::new(&full_registry(), &LightParameters::default()).expect("valid panel");
    let gui = egui::Context::default();
    let mut edits = Vec::new();
    for _ in 0..3 {
        let _ = gui.run(egui::RawInput::default(), |ctx| edits = panel.show(ctx));
        assert!(edits.is_empty());
    }
    assert_eq!(panel.values(), &LightParameters::default());
}
