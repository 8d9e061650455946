use std::io::Cursor;

use cgmath::{InnerSpace, Vector3, Zero};
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Property},
};

use crate::{error::SceneError, resources::texture::load_binary};

/// Decoded triangle geometry. Normals are empty until [`MeshData::compute_vertex_normals`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// A `width` x `height` quad in the XY plane, centred on the origin and facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        Self {
            positions: vec![[-w, -h, 0.0], [w, -h, 0.0], [w, h, 0.0], [-w, h, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Uniform scale around the origin.
    pub fn scale(&mut self, factor: f32) {
        self.positions
            .iter_mut()
            .flat_map(|p| p.iter_mut())
            .for_each(|c| *c *= factor);
    }

    /// Area-weighted smooth normals.
    ///
    /// Every face adds its unnormalised cross product to its three corners, so large
    /// faces dominate. Vertices that no non-degenerate face touches point up.
    pub fn compute_vertex_normals(&mut self) {
        let mut accumulated = vec![Vector3::<f32>::zero(); self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa: Vector3<f32> = self.positions[a].into();
            let pb: Vector3<f32> = self.positions[b].into();
            let pc: Vector3<f32> = self.positions[c].into();
            let face = (pb - pa).cross(pc - pa);
            accumulated[a] += face;
            accumulated[b] += face;
            accumulated[c] += face;
        }
        self.normals = accumulated
            .into_iter()
            .map(|n| {
                let len = n.magnitude();
                if len > 0.0 && len.is_finite() {
                    (n / len).into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect();
    }
}

/// Reads and decodes a PLY file. Decoding runs on tokio's blocking pool.
pub async fn load_ply(file_name: &str) -> Result<MeshData, SceneError> {
    let bytes = load_binary(file_name).await?;
    let path = file_name.to_string();
    let mesh = tokio::task::spawn_blocking(move || parse_ply(&bytes, &path))
        .await
        .map_err(|e| SceneError::decode(file_name, e))??;
    log::info!(
        "loaded {}: {} vertices, {} triangles",
        file_name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Decodes a PLY file (ascii or binary) into triangles.
///
/// Polygonal faces are fan-triangulated. A file without a `face` element is read
/// as a plain triangle list over its vertices.
pub fn parse_ply(bytes: &[u8], path: &str) -> Result<MeshData, SceneError> {
    let parser = Parser::<DefaultElement>::new();
    let mut cursor = Cursor::new(bytes);
    let ply = parser
        .read_ply(&mut cursor)
        .map_err(|e| SceneError::decode(path, e))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| SceneError::decode(path, "no vertex element"))?;
    let positions = vertices
        .iter()
        .enumerate()
        .map(|(idx, vertex)| {
            match (scalar(vertex, "x"), scalar(vertex, "y"), scalar(vertex, "z")) {
                (Some(x), Some(y), Some(z)) => Ok([x, y, z]),
                _ => Err(SceneError::decode(
                    path,
                    format!("vertex {idx} has no numeric x/y/z"),
                )),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let indices = match ply.payload.get("face") {
        Some(faces) => {
            let mut indices = Vec::with_capacity(faces.len() * 3);
            for (idx, face) in faces.iter().enumerate() {
                let polygon = index_list(face).ok_or_else(|| {
                    SceneError::decode(path, format!("face {idx} has no vertex_indices"))
                })?;
                // fan around the first corner
                for i in 1..polygon.len().saturating_sub(1) {
                    indices.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            indices
        }
        None => (0..(positions.len() / 3 * 3) as u32).collect(),
    };

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(SceneError::decode(
            path,
            format!("index {bad} out of range for {} vertices", positions.len()),
        ));
    }

    Ok(MeshData::new(positions, indices))
}

fn scalar(element: &DefaultElement, key: &str) -> Option<f32> {
    match element.get(key)? {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        Property::Char(v) => Some(*v as f32),
        Property::UChar(v) => Some(*v as f32),
        Property::Short(v) => Some(*v as f32),
        Property::UShort(v) => Some(*v as f32),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        _ => None,
    }
}

fn index_list(element: &DefaultElement) -> Option<Vec<u32>> {
    let property = element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))?;
    match property {
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListInt(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
        Property::ListUChar(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListChar(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
        Property::ListUShort(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListShort(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
        _ => None,
    }
}
