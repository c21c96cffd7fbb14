pub mod config;

use crate::rewrite::{rewrite_source, Notice, Options, RewriteError};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    ffi::OsStr,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("{}: {error}", .path.display())]
    Rewrite {
        path: PathBuf,
        /// Input text, kept for rendering syntax errors.
        text: String,
        #[source]
        error: RewriteError,
    },
    #[error("failed to write {}: {error}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl ProcessError {
    pub fn path(&self) -> &Path {
        match self {
            ProcessError::Io { path, .. }
            | ProcessError::Rewrite { path, .. }
            | ProcessError::Persist { path, .. } => path,
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub notices: Vec<Notice>,
    pub changed: bool,
}

/// Go files named by `paths`, directories walked recursively.
///
/// Hidden directories and `vendor/` are skipped. Files named explicitly are
/// kept whatever their extension.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    let mut seen = HashSet::new();
    files.retain(|file| seen.insert(file.clone()));
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ProcessError> {
    let io_error = |error| ProcessError::Io {
        path: dir.to_path_buf(),
        error,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();

    for path in entries {
        let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
        if path.is_dir() {
            if name.starts_with('.') || name == "vendor" {
                debug!(dir = %path.display(), "skipping directory");
                continue;
            }
            walk_dir(&path, files)?;
        } else if path.extension() == Some(OsStr::new("go")) {
            files.push(path);
        }
    }
    Ok(())
}

/// Rewrites every file in parallel; results come back in input order.
pub fn process_paths(
    files: &[PathBuf],
    options: &Options,
    dry_run: bool,
) -> Vec<Result<FileReport, ProcessError>> {
    files
        .par_iter()
        .map(|path| process_file(path, options, dry_run))
        .collect()
}

pub fn process_file(path: &Path, options: &Options, dry_run: bool) -> Result<FileReport, ProcessError> {
    let text = fs::read_to_string(path).map_err(|error| ProcessError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let rewrite = match rewrite_source(&text, options) {
        Ok(rewrite) => rewrite,
        Err(error) => {
            warn!(path = %path.display(), %error, "rewrite failed");
            return Err(ProcessError::Rewrite {
                path: path.to_path_buf(),
                text,
                error,
            });
        }
    };

    if rewrite.changed && !dry_run {
        write_atomic(path, &rewrite.output)?;
        info!(
            path = %path.display(),
            changes = rewrite.notices.iter().filter(|n| n.is_change()).count(),
            "rewrote file"
        );
    }
    Ok(FileReport {
        path: path.to_path_buf(),
        notices: rewrite.notices,
        changed: rewrite.changed,
    })
}

/// Replaces `path` with `contents` through a temporary file in the same
/// directory, keeping the original permissions.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ProcessError> {
    let persist_error = |error: std::io::Error| ProcessError::Persist {
        path: path.to_path_buf(),
        error,
    };
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(persist_error)?;
    file.write_all(contents.as_bytes()).map_err(persist_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(persist_error)?;
    }
    file.persist(path).map_err(|err| persist_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HANDLER: &str = "package svc\n\nimport \"context\"\n\nfunc f(ctx context.Context) {\n\tg(context.TODO())\n}\n";

    #[test]
    fn discovers_go_files_and_skips_hidden_and_vendor() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        for sub in ["a", "a/b", ".git", "vendor/x"] {
            fs::create_dir_all(root.join(sub)).expect("mkdir");
        }
        for file in ["a/one.go", "a/b/two.go", "a/notes.txt", ".git/three.go", "vendor/x/four.go"] {
            fs::write(root.join(file), "package p\n").expect("write");
        }

        let files = discover(&[root.to_path_buf()]).expect("discover");
        assert_eq!(files, vec![root.join("a/b/two.go"), root.join("a/one.go")]);
    }

    #[test]
    fn rewrites_in_place() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("h.go");
        fs::write(&path, HANDLER).expect("write");

        let report = process_file(&path, &Options::default(), false).expect("process");
        assert!(report.changed);
        assert_eq!(report.notices.len(), 1);
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.contains("\tg(ctx)\n"));
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("h.go");
        fs::write(&path, HANDLER).expect("write");

        let report = process_file(&path, &Options::default(), true).expect("process");
        assert!(report.changed);
        assert_eq!(fs::read_to_string(&path).expect("read"), HANDLER);
    }

    #[test]
    fn syntax_errors_leave_the_file_untouched() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.go");
        let broken = "package svc\n\nfunc f( {\n\tg(context.TODO())\n";
        fs::write(&path, broken).expect("write");

        let err = process_file(&path, &Options::default(), false).expect_err("syntax");
        assert!(matches!(
            err,
            ProcessError::Rewrite {
                error: RewriteError::Syntax(_),
                ..
            }
        ));
        assert_eq!(err.path(), path.as_path());
        assert_eq!(fs::read_to_string(&path).expect("read"), broken);
    }

    #[test]
    fn results_keep_input_order() {
        let dir = tempdir().expect("tempdir");
        let paths: Vec<PathBuf> = (0..8).map(|i| dir.path().join(format!("f{i}.go"))).collect();
        for path in &paths {
            fs::write(path, HANDLER).expect("write");
        }
        let missing = dir.path().join("missing.go");
        let mut inputs = paths.clone();
        inputs.insert(3, missing.clone());

        let results = process_paths(&inputs, &Options::default(), true);
        assert_eq!(results.len(), 9);
        assert!(matches!(&results[3], Err(ProcessError::Io { path, .. }) if *path == missing));
        for (result, path) in results.iter().filter_map(|r| r.as_ref().ok()).zip(&paths) {
            assert_eq!(&result.path, path);
        }
    }
}
