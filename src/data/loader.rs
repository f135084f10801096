// ============================================================
// Layer 4 — Utterance Loader
// ============================================================
// Loads one utterance per .npz file from a directory.
//
// What is inside each file:
//   An .npz file is a ZIP archive of .npy arrays (numpy.savez).
//   Each utterance file holds two arrays:
//
//     x  — [frames, 26] acoustic features
//     y  — [frames, 61] one-hot phoneme labels
//
//   numpy stores them as "x.npy" / "y.npy" inside the archive;
//   ndarray-npy's NpzWriter stores them as "x" / "y". Both
//   spellings are accepted. Element type may be f32 or f64.
//
// Files are visited in sorted filename order so that the
// positional validation split is the same on every platform.
//
// Unlike a best-effort corpus reader, a bad file here is never
// skipped: a silently dropped utterance would shift the
// validation split. Every problem is a LoadError.
//
// Reference: ndarray-npy crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use ndarray::Array2;
use ndarray_npy::{NpzReader, ReadNpzError};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::domain::traits::UtteranceSource;
use crate::domain::utterance::{Utterance, UtteranceError, N_CLASSES, N_FEATURES};

/// Everything that can be wrong with a data directory or file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory '{0}' does not exist")]
    MissingDir(PathBuf),

    #[error("cannot open '{path}': {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a readable .npz archive: {source}")]
    Archive {
        path:   PathBuf,
        #[source]
        source: ReadNpzError,
    },

    #[error("'{path}' has no array named '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("array '{key}' in '{path}' is not a 2-D f32/f64 matrix: {source}")]
    BadArray {
        path:   PathBuf,
        key:    &'static str,
        #[source]
        source: ReadNpzError,
    },

    #[error("array '{key}' in '{path}' has width {found}, expected {expected}")]
    Width {
        path:     PathBuf,
        key:      &'static str,
        found:    usize,
        expected: usize,
    },

    #[error("label row {row} in '{path}' is not one-hot")]
    NotOneHot { path: PathBuf, row: usize },

    #[error("'{path}': {source}")]
    Misaligned {
        path:   PathBuf,
        #[source]
        source: UtteranceError,
    },
}

/// Loads every .npz utterance file in a directory.
pub struct NpzLoader {
    dir: PathBuf,
}

impl NpzLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sorted paths of all .npz files in the directory
    fn utterance_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(LoadError::MissingDir(self.dir.clone()).into());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("npz") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl UtteranceSource for NpzLoader {
    fn load_all(&self) -> Result<Vec<Utterance>> {
        let files = self.utterance_files()?;
        let total = files.len();
        tracing::info!("Loading {} utterances from '{}'", total, self.dir.display());

        let mut utterances = Vec::with_capacity(total);
        for (i, path) in files.iter().enumerate() {
            let utterance = load_utterance(path)?;
            tracing::debug!(
                "Loaded: {} ({} frames)",
                path.display(),
                utterance.frames()
            );
            utterances.push(utterance);
            println!("{}/{}", i + 1, total);
        }

        Ok(utterances)
    }
}

/// Read and validate a single utterance file.
pub fn load_utterance(path: &Path) -> Result<Utterance, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut npz = NpzReader::new(file).map_err(|source| LoadError::Archive {
        path: path.to_path_buf(),
        source,
    })?;

    let features = read_matrix(&mut npz, path, "x")?;
    let labels   = read_matrix(&mut npz, path, "y")?;

    check_width(path, "x", features.ncols(), N_FEATURES)?;
    check_width(path, "y", labels.ncols(), N_CLASSES)?;

    let utterance = Utterance::new(features, labels).map_err(|source| LoadError::Misaligned {
        path: path.to_path_buf(),
        source,
    })?;

    for (row, label) in utterance.labels().rows().into_iter().enumerate() {
        let ones  = label.iter().filter(|&&v| v == 1.0).count();
        let zeros = label.iter().filter(|&&v| v == 0.0).count();
        if ones != 1 || ones + zeros != label.len() {
            return Err(LoadError::NotOneHot { path: path.to_path_buf(), row });
        }
    }

    Ok(utterance)
}

/// Look up `key` (or `key.npy`) and read it as an f32 matrix,
/// widening from f64 storage if necessary.
fn read_matrix(
    npz:  &mut NpzReader<File>,
    path: &Path,
    key:  &'static str,
) -> Result<Array2<f32>, LoadError> {
    let names = npz.names().map_err(|source| LoadError::Archive {
        path: path.to_path_buf(),
        source,
    })?;
    let suffixed = format!("{key}.npy");
    let name = names
        .into_iter()
        .find(|n| n == key || *n == suffixed)
        .ok_or_else(|| LoadError::MissingKey { path: path.to_path_buf(), key })?;

    match npz.by_name::<_, ndarray::Ix2>(&name) {
        Ok(m) => Ok(m),
        Err(f32_err) => npz
            .by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix2>(&name)
            .map(|m| m.mapv(|v| v as f32))
            .map_err(|_| LoadError::BadArray {
                path: path.to_path_buf(),
                key,
                source: f32_err,
            }),
    }
}

fn check_width(path: &Path, key: &'static str, found: usize, expected: usize) -> Result<(), LoadError> {
    if found != expected {
        return Err(LoadError::Width { path: path.to_path_buf(), key, found, expected });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ndarray_npy::NpzWriter;

    fn one_hot(frames: usize, class: usize) -> Array2<f32> {
        let mut y = Array2::zeros((frames, N_CLASSES));
        for t in 0..frames {
            y[[t, class]] = 1.0;
        }
        y
    }

    fn write_npz(path: &Path, x: &Array2<f32>, y: &Array2<f32>) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array("x", x).unwrap();
        npz.add_array("y", y).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn test_loads_sorted_and_aligned() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order: loader must sort by filename
        write_npz(&dir.path().join("b.npz"), &Array2::zeros((5, N_FEATURES)), &one_hot(5, 2));
        write_npz(&dir.path().join("a.npz"), &Array2::ones((3, N_FEATURES)), &one_hot(3, 7));
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let utterances = NpzLoader::new(dir.path()).load_all().unwrap();
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].frames(), 3);
        assert_eq!(utterances[1].frames(), 5);
        for u in &utterances {
            assert_eq!(u.features().nrows(), u.labels().nrows());
        }
    }

    #[test]
    fn test_numpy_style_names_and_f64() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("x.npy", &Array2::<f64>::zeros((2, N_FEATURES))).unwrap();
        npz.add_array("y.npy", &one_hot(2, 0).mapv(f64::from)).unwrap();
        npz.finish().unwrap();

        let u = load_utterance(&path).unwrap();
        assert_eq!(u.frames(), 2);
        assert_eq!(u.labels()[[1, 0]], 1.0);
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.npz");
        write_npz(&path, &Array2::zeros((4, N_FEATURES)), &one_hot(3, 1));

        let err = load_utterance(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Misaligned { source: UtteranceError::LengthMismatch { features: 4, labels: 3 }, .. }
        ));
    }

    #[test]
    fn test_mismatch_fails_whole_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_npz(&dir.path().join("a.npz"), &Array2::zeros((2, N_FEATURES)), &one_hot(2, 0));
        write_npz(&dir.path().join("b.npz"), &Array2::zeros((2, N_FEATURES)), &one_hot(1, 0));

        let err = NpzLoader::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Misaligned { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_widths() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.npz");
        write_npz(&path, &Array2::zeros((2, 13)), &one_hot(2, 0));
        assert!(matches!(
            load_utterance(&path).unwrap_err(),
            LoadError::Width { key: "x", found: 13, expected: N_FEATURES, .. }
        ));
    }

    #[test]
    fn test_rejects_missing_key() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nolabels.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("x", &Array2::<f32>::zeros((2, N_FEATURES))).unwrap();
        npz.finish().unwrap();

        assert!(matches!(
            load_utterance(&path).unwrap_err(),
            LoadError::MissingKey { key: "y", .. }
        ));
    }

    #[test]
    fn test_rejects_non_one_hot_labels() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("soft.npz");
        let mut y = one_hot(3, 4);
        y[[1, 5]] = 1.0;
        write_npz(&path, &Array2::zeros((3, N_FEATURES)), &y);

        assert!(matches!(
            load_utterance(&path).unwrap_err(),
            LoadError::NotOneHot { row: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_corrupt_archive() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.npz");
        fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(
            load_utterance(&path).unwrap_err(),
            LoadError::Archive { .. }
        ));
    }

    #[test]
    fn test_rejects_non_matrix_array() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("x", &ndarray::Array1::<f32>::zeros(N_FEATURES)).unwrap();
        npz.add_array("y", &one_hot(1, 0)).unwrap();
        npz.finish().unwrap();

        assert!(matches!(
            load_utterance(&path).unwrap_err(),
            LoadError::BadArray { key: "x", .. }
        ));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = NpzLoader::new(dir.path().join("nope")).load_all().unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::MissingDir(_))));
    }
}
