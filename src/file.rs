// src/file.rs

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

use crate::csv::write_row;
use crate::error::StoreError;

pub fn ensure_directory(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() && !dir.is_dir() {
        return Err(StoreError::io(
            dir,
            std::io::Error::other(format!("path exists but is not a directory: {}", dir.display())),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    Ok(())
}

pub fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

/// Append rows; the header goes in first when the file is new or empty.
/// Existing content is never touched.
pub fn append_rows(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
    sep: char,
) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let fresh = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let io = |e| StoreError::io(path, e);

    if fresh {
        write_row(&mut out, headers, sep).map_err(io)?;
    }
    for row in rows {
        write_row(&mut out, row, sep).map_err(io)?;
    }
    out.flush().map_err(io)?;
    Ok(())
}

/// Whole-file replace: written to a sibling temp file, then renamed over.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let mut f = File::create(tmp).map_err(|e| StoreError::io(tmp, e))?;
    f.write_all(contents).map_err(|e| StoreError::io(tmp, e))?;
    f.sync_all().map_err(|e| StoreError::io(tmp, e))?;
    drop(f);
    fs::rename(tmp, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
