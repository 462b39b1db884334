//! Source collection for auxiliary libraries

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::libraries::{AuxLibrary, LibraryManifest, LibrarySources};
use crate::error::{ArtifactError, FilesystemError, JennicError};

/// Extensions compiled into auxiliary libraries
const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "S", "s"];

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// All source files below `root`, sorted
pub fn collect_tree(root: &Path) -> Result<Vec<PathBuf>, JennicError> {
    if !root.is_dir() {
        return Err(ArtifactError::missing("SDK source directory", root).into());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| FilesystemError::Walk {
            path: root.to_path_buf(),
            error: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_source(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Sources of one library, in compile order
pub fn library_sources(library: &AuxLibrary) -> Result<Vec<PathBuf>, JennicError> {
    match &library.sources {
        LibrarySources::Tree(root) => collect_tree(root),
        LibrarySources::Files(files) => {
            if let Some(missing) = files.iter().find(|f| !f.is_file()) {
                return Err(ArtifactError::missing("Generated source", missing).into());
            }
            Ok(files.clone())
        }
    }
}

/// Sources of every library in the manifest
pub fn collect_manifest(manifest: &LibraryManifest) -> Result<Vec<(String, Vec<PathBuf>)>, JennicError> {
    manifest
        .libraries
        .iter()
        .map(|lib| {
            let files = library_sources(lib)?;
            tracing::debug!("{}: {} source files", lib.name, files.len());
            Ok((lib.name.clone(), files))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::libraries::archive_path;

    #[test]
    fn test_collects_sources_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        for file in ["z.c", "a.cpp", "b/start.S", "b/low.s", "README.txt", "a.h"] {
            std::fs::write(root.join(file), "").unwrap();
        }
        let files = collect_tree(root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.cpp", "b/low.s", "b/start.S", "z.c"]);
    }

    #[test]
    fn test_missing_tree_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_tree(&dir.path().join("Utilities/Source")).unwrap_err();
        assert!(matches!(err, JennicError::Artifact(_)));
        assert!(err.to_string().contains("Utilities/Source"));
    }

    #[test]
    fn test_file_list_requires_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("os_gen.c");
        std::fs::write(&present, "").unwrap();
        let lib = AuxLibrary {
            name: "Gen".to_string(),
            sources: LibrarySources::Files(vec![present.clone(), dir.path().join("zps_gen.c")]),
            archive: archive_path(dir.path(), "Gen"),
        };
        assert!(matches!(library_sources(&lib), Err(JennicError::Artifact(_))));

        let lib = AuxLibrary {
            sources: LibrarySources::Files(vec![present.clone()]),
            ..lib
        };
        assert_eq!(library_sources(&lib).unwrap(), vec![present]);
    }
}
