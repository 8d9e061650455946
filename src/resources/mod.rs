//! Loading of everything the scene reads from `./assets/`.
//!
//! - `texture` reads and uploads images and keeps the [`TextureRegistry`] of projectable maps
//! - `mesh` decodes PLY geometry into [`MeshData`] and derives smooth normals

pub mod mesh;
pub mod texture;

pub use mesh::{MeshData, load_ply, parse_ply};
pub use texture::{NONE, TextureHandle, TextureRegistry, load_binary, load_texture};

/// Gobo textures offered in the debug panel, registered under their file name.
pub const TEXTURE_FILES: [&str; 3] = ["disturb.jpg", "colors.png", "uv_grid_opengl.jpg"];
pub const TEXTURE_DIR: &str = "textures";
pub const LUCY_PATH: &str = "models/ply/binary/Lucy100k.ply";
pub const LUCY_SCALE: f32 = 0.0024;
