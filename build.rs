use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Textures and the Lucy scan are fetched separately, the scene starts without them.
const REQUIRED_ASSETS: [&str; 4] = [
    "textures/disturb.jpg",
    "textures/colors.png",
    "textures/uv_grid_opengl.jpg",
    "models/ply/binary/Lucy100k.ply",
];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets/");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        println!("cargo:warning=no assets/ directory, the scene will render without textures and mesh");
        return Ok(());
    }

    for asset in REQUIRED_ASSETS {
        if !assets_src.join(asset).exists() {
            println!("cargo:warning=missing asset assets/{asset}");
        }
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[assets_src], out_dir, &copy_options)?;

    Ok(())
}
