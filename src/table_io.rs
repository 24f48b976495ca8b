// src/table_io.rs

//! Reading and writing dense lookup table files.
//!
//! A table file is the raw 16,777,216-byte index array with no header. Writes
//! go to a temporary sibling and are renamed into place, so a failed run never
//! leaves a truncated table under the target name.

use log::{debug, info};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use crate::lut::{NearestIndexTable, TABLE_LEN};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".tmp.{}", std::process::id()));
    path.with_file_name(name)
}

/// Writes `bytes` to `path` via a temporary file and rename, creating parent
/// directories first.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if path.file_name().is_none() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path.display()),
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    debug!("Writing {} bytes to {}", bytes.len(), tmp_path.display());
    let written = fs::File::create(&tmp_path).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    let renamed = fs::rename(&tmp_path, path).or_else(|err| {
        // Windows will not rename over an existing file.
        if cfg!(windows) && path.is_file() {
            fs::remove_file(path).and_then(|()| fs::rename(&tmp_path, path))
        } else {
            Err(err)
        }
    });
    if renamed.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    renamed
}

/// Writes a table to `path`, replacing any existing file.
pub fn write_table(path: &Path, table: &NearestIndexTable) -> io::Result<()> {
    write_atomic(path, table.as_bytes())?;
    info!("Wrote lookup table to {}", path.display());
    Ok(())
}

/// Reads a table file, rejecting anything that is not exactly one table long.
pub fn read_table(path: &Path) -> io::Result<NearestIndexTable> {
    let bytes = fs::read(path)?;
    NearestIndexTable::from_bytes(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", path.display(), e)))
}

/// Outcome of comparing a freshly built table against a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Matches,
    /// The file exists but differs; `first_difference` is the first
    /// mismatching offset, or `None` when only the length differs.
    Differs {
        existing_len: usize,
        first_difference: Option<usize>,
    },
    Missing,
}

/// Compares `table` with the file at `path` without modifying it.
pub fn check_table(path: &Path, table: &NearestIndexTable) -> io::Result<CheckOutcome> {
    let existing = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(CheckOutcome::Missing),
        Err(err) => return Err(err),
    };
    if existing == table.as_bytes() {
        return Ok(CheckOutcome::Matches);
    }
    let first_difference = if existing.len() == TABLE_LEN {
        existing
            .iter()
            .zip(table.as_bytes())
            .position(|(a, b)| a != b)
    } else {
        None
    };
    Ok(CheckOutcome::Differs {
        existing_len: existing.len(),
        first_difference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::cube_offset;

    fn sample_table(fill: u8) -> NearestIndexTable {
        let mut bytes = vec![fill; TABLE_LEN];
        bytes[cube_offset(10, 20, 30)] = fill.wrapping_add(1);
        NearestIndexTable::from_bytes(bytes).unwrap()
    }

    #[test_log::test]
    fn test_write_creates_parents_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted").join("nested").join("table.dat");
        let table = sample_table(5);
        write_table(&path, &table).unwrap();

        let read_back = read_table(&path).unwrap();
        assert!(read_back == table);
        assert_eq!(fs::metadata(&path).unwrap().len(), TABLE_LEN as u64);
        // No temporary file is left behind.
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test_log::test]
    fn test_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.dat");
        fs::write(&path, vec![0xAA; TABLE_LEN + 100]).unwrap();
        write_table(&path, &sample_table(1)).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), TABLE_LEN as u64);
        assert_eq!(read_table(&path).unwrap().get(10, 20, 30), 2);
    }

    #[test_log::test]
    fn test_failed_write_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file in place of the parent directory makes create_dir_all fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let path = blocker.join("table.dat");
        assert!(write_table(&path, &sample_table(0)).is_err());
        assert_eq!(fs::read(&blocker).unwrap(), b"file");
    }

    #[test_log::test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory under the target name cannot be replaced.
        let path = dir.path().join("table.dat");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_table(&path, &sample_table(0)).is_err());
        assert!(path.is_dir());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("table.dat")]);
    }

    #[test_log::test]
    fn test_read_rejects_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.dat");
        fs::write(&path, [0u8; 16]).unwrap();
        let err = read_table(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test_log::test]
    fn test_check_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.dat");
        let table = sample_table(3);
        assert_eq!(check_table(&path, &table).unwrap(), CheckOutcome::Missing);

        write_table(&path, &table).unwrap();
        assert_eq!(check_table(&path, &table).unwrap(), CheckOutcome::Matches);

        let other = sample_table(4);
        assert_eq!(
            check_table(&path, &other).unwrap(),
            CheckOutcome::Differs {
                existing_len: TABLE_LEN,
                first_difference: Some(0)
            }
        );

        fs::write(&path, [3u8; 8]).unwrap();
        assert_eq!(
            check_table(&path, &table).unwrap(),
            CheckOutcome::Differs {
                existing_len: 8,
                first_difference: None
            }
        );
    }
}
