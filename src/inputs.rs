use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::output;

pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Expands directories recursively (entries sorted by name) and keeps the
/// WAV files, in argument order. Missing paths and other files are reported
/// and skipped.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            output!("{} does not exist, skipping", input.display());
            continue;
        }
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        push_if_wav(&mut files, entry.into_path())
                    }
                    Ok(_) => {}
                    Err(err) => output!("{}: {}", input.display(), err),
                }
            }
        } else {
            push_if_wav(&mut files, input.clone());
        }
    }
    files
}

fn push_if_wav(files: &mut Vec<PathBuf>, path: PathBuf) {
    if is_wav(&path) {
        files.push(path);
    } else {
        output!("{} is not a wav, go next", path.display());
    }
}
