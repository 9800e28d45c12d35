//! JSON serialization for meshes and remove-by-mask settings

use crate::error::IoError;
use meshmask_core::{Mesh, RemoveMeshByMask, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into(),
        _ => e.into(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(open(path)?);
    serde_json::from_reader(reader).map_err(|e| {
        IoError::ParseError {
            message: format!("{}: {}", path.display(), e),
        }
        .into()
    })
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| IoError::WriteError {
        message: format!("{}: {}", path.display(), e),
    })?;
    writer.flush()?;
    Ok(())
}

/// Read a mesh and check its attribute/index consistency
pub fn read_mesh_json<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let mesh: Mesh = read_json(path.as_ref())?;
    mesh.validate()?;
    Ok(mesh)
}

pub fn write_mesh_json<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    write_json(mesh, path.as_ref())
}

pub fn read_settings_json<P: AsRef<Path>>(path: P) -> Result<RemoveMeshByMask> {
    read_json(path.as_ref())
}

pub fn write_settings_json<P: AsRef<Path>>(settings: &RemoveMeshByMask, path: P) -> Result<()> {
    write_json(settings, path.as_ref())
}
