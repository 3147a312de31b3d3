use anyhow::{bail, Context};
use image::ImageReader;
use log::info;
use stagehand_engine::logging;
use stagehand_scene_assets::load_config;
use stagehand_scene_input::ReplayScript;
use stagehand_scene_ui::{RunState, SceneManager};
use std::fs;
use std::path::{Path, PathBuf};

const TOLERANCE: u8 = 3;

fn compare_with_tolerance(a_path: &Path, b_path: &Path, tolerance: u8) -> anyhow::Result<bool> {
    let a = ImageReader::open(a_path)
        .with_context(|| format!("read {}", a_path.display()))?
        .decode()?
        .to_rgba8();
    let b = ImageReader::open(b_path)
        .with_context(|| format!("read {}", b_path.display()))?
        .decode()?
        .to_rgba8();

    if a.dimensions() != b.dimensions() {
        return Ok(false);
    }
    Ok(a.pixels().zip(b.pixels()).all(|(pa, pb)| {
        let da = pa.0;
        let db = pb.0;
        (0..4).all(|i| da[i].abs_diff(db[i]) <= tolerance)
    }))
}

fn golden_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out.with_file_name(format!("{stem}.golden.png"))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("usage: scene_snapshot <config.toml> <scene-id> <out.png> [replay.json]");
    }
    let config = load_config(Path::new(&args[0]))?;
    logging::init(&config.logging.level);

    let mut manager = SceneManager::from_config(config)?;
    manager.load_index()?;
    manager.set_current_scene(&args[1])?;

    if let Some(replay) = args.get(3) {
        let text = fs::read_to_string(replay).with_context(|| format!("read {replay}"))?;
        let script = ReplayScript::from_json(&text)?;
        for (n, frame) in script.frames.iter().enumerate() {
            if manager.update(frame)? == RunState::Stopped {
                info!("replay stopped at frame {n}");
                break;
            }
        }
    }

    let out = Path::new(&args[2]);
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    manager.rasterize()?.save(out)?;
    println!(
        "scene '{}' written to {}",
        manager.current_scene()?.id,
        out.display()
    );

    let golden = golden_path(out);
    if golden.exists() {
        if !compare_with_tolerance(out, &golden, TOLERANCE)? {
            bail!("snapshot mismatch against {}", golden.display());
        }
        println!("snapshot OK against {}", golden.display());
    }
    manager.destroy_current_scene()?;
    Ok(())
}
