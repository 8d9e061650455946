use flow_spotlight::{
    resources::{MeshData, TEXTURE_FILES, TextureHandle, TextureRegistry},
    scene::SceneState,
};

pub(crate) const EPSILON: f32 = 1e-4;

pub(crate) fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

/// The registry as it looks after all three textures loaded: none, disturb, colors, uv grid.
pub(crate) fn full_registry() -> TextureRegistry {
    TextureRegistry::from_loaded(
        TEXTURE_FILES
            .iter()
            .enumerate()
            .map(|(idx, name)| (*name, TextureHandle(idx))),
    )
}

pub(crate) fn handle_of(name: &str) -> TextureHandle {
    let idx = TEXTURE_FILES
        .iter()
        .position(|file| *file == name)
        .unwrap_or_else(|| panic!("{name} is not a scene texture"));
    TextureHandle(idx)
}

/// Scene state after the textures resolved, with material update flags drained.
pub(crate) fn mounted_scene() -> SceneState {
    let mut state = SceneState::new();
    state.textures_ready(full_registry());
    state.shading.take_material_updates();
    state
}

/// A `columns` x `rows` vertex grid in the XZ plane, one unit apart, wound to face +Y.
pub(crate) fn grid_mesh(columns: u32, rows: u32) -> MeshData {
    let positions = (0..rows)
        .flat_map(|row| (0..columns).map(move |col| [col as f32, 0.0, row as f32]))
        .collect();
    let mut indices = Vec::new();
    for row in 0..rows - 1 {
        for col in 0..columns - 1 {
            let i = row * columns + col;
            indices.extend_from_slice(&[i, i + columns, i + 1, i + 1, i + columns, i + columns + 1]);
        }
    }
    MeshData::new(positions, indices)
}

pub(crate) fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
