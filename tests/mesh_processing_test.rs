use flow_spotlight::{
    SceneError,
    resources::{LUCY_SCALE, MeshData, load_binary, parse_ply},
    scene::prepare_mesh,
};

use crate::common::test_utils::{EPSILON, approx_eq, grid_mesh, length};
mod common;

const ASCII_QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";

#[test]
fn lucy_sized_mesh_is_scaled_and_shaded() {
    let raw = grid_mesh(400, 250);
    assert_eq!(raw.vertex_count(), 100_000);

    let mesh = prepare_mesh(raw.clone());

    assert_eq!(mesh.vertex_count(), raw.vertex_count());
    assert_eq!(mesh.normals.len(), mesh.vertex_count());
    for (scaled, original) in mesh.positions.iter().zip(&raw.positions) {
        for axis in 0..3 {
            assert_eq!(scaled[axis], original[axis] * LUCY_SCALE);
        }
    }
    for normal in &mesh.normals {
        assert!(approx_eq(length(*normal), 1.0, EPSILON));
    }
}

#[test]
fn flat_grid_normals_point_up() {
    let mut mesh = grid_mesh(8, 8);
    mesh.compute_vertex_normals();
    for normal in &mesh.normals {
        assert!(approx_eq(normal[0], 0.0, EPSILON));
        assert!(approx_eq(normal[1], 1.0, EPSILON));
        assert!(approx_eq(normal[2], 0.0, EPSILON));
    }
}

#[test]
fn isolated_and_degenerate_vertices_get_a_default_normal() {
    let mut mesh = MeshData::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [5.0, 5.0, 5.0],
        ],
        // collinear, so zero area
        vec![0, 1, 2],
    );
    mesh.compute_vertex_normals();
    assert_eq!(mesh.normals, vec![[0.0, 1.0, 0.0]; 4]);
}

#[test]
fn larger_faces_weigh_more() {
    // a big triangle facing +z and a small one facing +x share vertex 0
    let mut mesh = MeshData::new(
        vec![
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        vec![0, 1, 2, 0, 3, 4],
    );
    mesh.compute_vertex_normals();
    let shared = mesh.normals[0];
    assert!(shared[2] > shared[0]);
    assert!(approx_eq(length(shared), 1.0, EPSILON));
}

#[test]
fn ascii_quad_is_fan_triangulated() {
    let mesh = parse_ply(ASCII_QUAD.as_bytes(), "quad.ply").expect("valid ply");
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.positions[2], [1.0, 1.0, 0.0]);
    assert!(mesh.normals.is_empty());
}

#[test]
fn out_of_range_face_is_a_decode_failure() {
    let broken = ASCII_QUAD.replace("4 0 1 2 3", "4 0 1 2 9");
    match parse_ply(broken.as_bytes(), "broken.ply") {
        Err(SceneError::AssetDecodeFailure { path, .. }) => assert_eq!(path, "broken.ply"),
        other => panic!("expected a decode failure, got {other:?}"),
    }
}

#[test]
fn garbage_is_a_decode_failure() {
    let result = parse_ply(b"definitely not a ply file", "garbage.ply");
    assert!(matches!(result, Err(SceneError::AssetDecodeFailure { .. })));
}

#[test]
fn plane_faces_up_its_local_z() {
    let plane = MeshData::plane(200.0, 200.0);
    assert_eq!(plane.triangle_count(), 2);
    assert!(plane.positions.iter().all(|p| p[0].abs() == 100.0 && p[1].abs() == 100.0));

    let mut recomputed = plane.clone();
    recomputed.compute_vertex_normals();
    assert_eq!(recomputed.normals, plane.normals);
}

#[tokio::test]
async fn missing_asset_is_reported_as_not_found() {
    match load_binary("models/ply/binary/does_not_exist.ply").await {
        Err(SceneError::AssetNotFound { path, .. }) => assert!(path.ends_with("does_not_exist.ply")),
        other => panic!("expected a missing asset, got {other:?}"),
    }
}
