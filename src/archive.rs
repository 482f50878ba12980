//! Archive extraction
//!
//! Unpacks downloaded distributions with native readers (`tar` + `flate2`,
//! `zip`), no external tools required. The archive is checked to exist and
//! be a regular file before any reader is opened.

use crate::error::{SetupError, SetupResult};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionKind {
    /// gzip-compressed tarball (`.tar.gz`, `.tgz`)
    TarGz,
    /// uncompressed tarball (`.tar`)
    Tar,
    /// zip archive (`.zip`)
    Zip,
}

impl CompressionKind {
    /// Parse an extension token; the leading dot is optional
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "tar.gz" | "tgz" => Some(Self::TarGz),
            "tar" => Some(Self::Tar),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    /// Canonical file extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::Tar => ".tar",
            Self::Zip => ".zip",
        }
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Extract `archive` into `dest`, parsing the format from `extension`.
///
/// An unrecognized extension fails after the destination has been created
/// and the archive checked, but before any reader touches the file.
pub fn extract_as(archive: &Path, extension: &str, dest: &Path) -> SetupResult<()> {
    prepare(archive, dest)?;

    let kind =
        CompressionKind::from_extension(extension).ok_or_else(|| SetupError::UnsupportedFormat {
            path: archive.to_path_buf(),
            extension: extension.to_string(),
        })?;

    unpack(archive, kind, dest)
}

/// Create the destination and check the archive is a regular file
fn prepare(archive: &Path, dest: &Path) -> SetupResult<()> {
    fs::create_dir_all(dest)
        .map_err(|e| SetupError::io(format!("creating directory {}", dest.display()), e))?;
    ensure_regular_file(archive)
}

/// Fail unless `path` exists and is a regular file
pub fn ensure_regular_file(path: &Path) -> SetupResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(SetupError::ArchiveNotFile(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SetupError::ArchiveNotFound(path.to_path_buf()))
        }
        Err(e) => Err(SetupError::io(format!("reading metadata of {}", path.display()), e)),
    }
}

fn unpack(archive: &Path, kind: CompressionKind, dest: &Path) -> SetupResult<()> {
    debug!("Extracting {} ({}) into {}", archive.display(), kind, dest.display());

    let file = File::open(archive)
        .map_err(|e| SetupError::io(format!("opening {}", archive.display()), e))?;
    let reader = BufReader::new(file);

    match kind {
        CompressionKind::TarGz => {
            extract_tar(archive, flate2::read::GzDecoder::new(reader), dest)
        }
        CompressionKind::Tar => extract_tar(archive, reader, dest),
        CompressionKind::Zip => extract_zip(archive, reader, dest),
    }
}

fn extract_tar<R: Read>(archive_path: &Path, reader: R, dest: &Path) -> SetupResult<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| SetupError::extraction(archive_path, format!("tar read error: {}", e)))?;

    for entry in entries {
        let mut entry = entry
            .map_err(|e| SetupError::extraction(archive_path, format!("tar entry error: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| SetupError::extraction(archive_path, format!("tar path error: {}", e)))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(SetupError::extraction(
                archive_path,
                format!("unsafe path in archive: {}", path.display()),
            ));
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let target = entry
                .link_name()
                .map_err(|e| SetupError::extraction(archive_path, e))?
                .ok_or_else(|| {
                    SetupError::extraction(
                        archive_path,
                        format!("link without target: {}", path.display()),
                    )
                })?
                .into_owned();

            // Hard link targets are archive-relative, symlinks are relative
            // to the link's own directory.
            let base = if entry_type == tar::EntryType::Link {
                PathBuf::new()
            } else {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            };
            if !stays_within(&base, &target) {
                return Err(SetupError::extraction(
                    archive_path,
                    format!(
                        "link escapes destination: {} -> {}",
                        path.display(),
                        target.display()
                    ),
                ));
            }
        }

        entry.unpack_in(dest).map_err(|e| {
            SetupError::extraction(archive_path, format!("unpack error for {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}

/// Lexically check that `base/target` does not climb out of the archive root
fn stays_within(base: &Path, target: &Path) -> bool {
    if target.is_absolute() {
        return false;
    }

    let mut depth: usize = 0;
    for component in base.join(target).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

fn extract_zip<R: Read + std::io::Seek>(
    archive_path: &Path,
    reader: R,
    dest: &Path,
) -> SetupResult<()> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| SetupError::extraction(archive_path, format!("zip read error: {}", e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| SetupError::extraction(archive_path, format!("zip entry error: {}", e)))?;

        let outpath = match file.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                return Err(SetupError::extraction(
                    archive_path,
                    format!("unsafe path in archive: {}", file.name()),
                ))
            }
        };

        if file.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| {
                SetupError::io(format!("creating directory {}", outpath.display()), e)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SetupError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let mut outfile = File::create(&outpath)
            .map_err(|e| SetupError::io(format!("creating {}", outpath.display()), e))?;
        std::io::copy(&mut file, &mut outfile)
            .map_err(|e| SetupError::io(format!("writing {}", outpath.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(|e| {
                    SetupError::io(format!("setting permissions on {}", outpath.display()), e)
                })?;
            }
        }
    }

    Ok(())
}

/// Names of the top-level entries in `dir`, sorted
pub fn top_level_entries(dir: &Path) -> SetupResult<Vec<PathBuf>> {
    let read = fs::read_dir(dir)
        .map_err(|e| SetupError::io(format!("reading directory {}", dir.display()), e))?;

    let mut entries = Vec::new();
    for entry in read {
        let entry =
            entry.map_err(|e| SetupError::io(format!("reading directory {}", dir.display()), e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}
