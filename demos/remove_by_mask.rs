//! Remove mesh polygons by mask from the command line
//!
//! Reads a mesh and a remove-by-mask settings file (both JSON), loads the
//! referenced mask images relative to the settings file and writes the mesh
//! with rebuilt index buffers.
//!
//! ```text
//! remove_by_mask --mesh body.json --settings body.mask.json --out body.masked.json
//! ```

use anyhow::Context;
use clap::Parser;
use meshmask_algorithms::{
    init_thread_pool, MaskRemover, NeverCancel, ParallelConfig, SubmeshStatus,
};
use meshmask_core::MaskSource;
use meshmask_io::{read_mesh_json, read_settings_json, write_mesh_json, FileMaskSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "remove_by_mask", about = "Remove mesh polygons selected by texture masks")]
struct Args {
    /// Input mesh (JSON)
    #[arg(long)]
    mesh: PathBuf,

    /// Remove-by-mask settings (JSON)
    #[arg(long)]
    settings: PathBuf,

    /// Output mesh; defaults to `<mesh>.masked.json`
    #[arg(long)]
    out: Option<PathBuf>,

    /// Worker threads for classification
    #[arg(long)]
    threads: Option<usize>,

    /// Primitives per work unit
    #[arg(long, default_value_t = meshmask_algorithms::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Classify on the calling thread only
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = ParallelConfig::default()
        .with_batch_size(args.batch_size)
        .with_enabled(!args.sequential);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    init_thread_pool(&config)?;

    let mut mesh = read_mesh_json(&args.mesh)
        .with_context(|| format!("reading {}", args.mesh.display()))?;
    let settings = read_settings_json(&args.settings)
        .with_context(|| format!("reading {}", args.settings.display()))?;
    let mask_dir = args
        .settings
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let masks = FileMaskSource::new(mask_dir);
    for asset in settings.referenced_masks() {
        log::debug!("mask '{}' -> {}", asset, masks.path_of(asset).display());
    }

    log::info!(
        "'{}': {} vertices, {} submeshes, {} settings",
        mesh.name,
        mesh.vertex_count(),
        mesh.submesh_count(),
        settings.materials.len()
    );

    let report = MaskRemover::new(config).apply(
        &mut mesh,
        &settings,
        |submesh, asset| match masks.load_mask(asset) {
            Ok(mask) => Some(mask),
            Err(e) => {
                log::debug!("submesh {}: cannot load mask '{}': {}", submesh, asset, e);
                None
            }
        },
        &NeverCancel,
    )?;

    for (index, status) in report.submeshes.iter().enumerate() {
        match status {
            SubmeshStatus::Rebuilt { kept, removed } => {
                log::info!("submesh {}: kept {}, removed {}", index, kept, removed)
            }
            SubmeshStatus::Skipped(reason) => {
                log::info!("submesh {}: skipped ({:?})", index, reason)
            }
        }
    }

    let out = args
        .out
        .unwrap_or_else(|| args.mesh.with_extension("masked.json"));
    write_mesh_json(&mesh, &out).with_context(|| format!("writing {}", out.display()))?;
    log::info!("removed {} primitives, wrote {}", report.removed_primitives(), out.display());
    Ok(())
}
