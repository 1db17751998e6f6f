//! Gzipped-tar backup of a registry base directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use varve_core::{now_millis, VarveResult};

/// Archive `base_dir` into `<output_dir>/backup-<epoch_ms>.tar.gz` and
/// return the archive path. Both directories are created if absent.
pub(crate) fn create_archive(base_dir: &Path, output_dir: &Path) -> VarveResult<PathBuf> {
    fs::create_dir_all(base_dir)?;
    fs::create_dir_all(output_dir)?;

    let archive_path = output_dir.join(format!("backup-{}.tar.gz", now_millis()));
    let encoder = GzEncoder::new(File::create(&archive_path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let archive_root = base_dir
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    builder.append_dir_all(&archive_root, base_dir)?;
    builder.into_inner()?.finish()?;

    debug!(path = %archive_path.display(), "wrote backup archive");
    Ok(archive_path)
}
