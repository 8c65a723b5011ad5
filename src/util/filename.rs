//! Table and memo file naming conventions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Extension of table files.
pub const TABLE_EXTENSION: &str = "dbf";

/// Strip the last extension from a file name.
///
/// Names without a dot, with a leading dot only, or ending in a dot are
/// returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => &name[..pos],
        _ => name,
    }
}

/// Find the memo file accompanying a table file.
///
/// The base name and `extension` are compared case-insensitively. Returns
/// `Ok(None)` when no candidate exists and `CorruptedTable` when more than
/// one does (e.g. `x.dbt` and `x.DBT` on a case-sensitive file system).
pub fn find_memo_file(table_path: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let dir = parent_dir(table_path);
    let base = file_name(table_path);
    let base = strip_extension(&base).to_lowercase();
    let suffix = format!(".{}", extension.to_lowercase());

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let lower = name.to_lowercase();
        if lower.ends_with(&suffix) && strip_extension(&lower) == base {
            found.push(entry.path());
        }
    }

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        n => Err(Error::corrupted(format!(
            "{} candidate memo files for {}",
            n,
            table_path.display()
        ))),
    }
}

/// Path of a new memo file next to `table_path`.
///
/// The extension is upper-cased when the table's own extension is.
pub fn memo_file_path(table_path: &Path, extension: &str) -> PathBuf {
    let upper = table_path
        .extension()
        .map(|e| {
            let e = e.to_string_lossy();
            e.chars().any(|c| c.is_ascii_alphabetic())
                && !e.chars().any(|c| c.is_ascii_lowercase())
        })
        .unwrap_or(false);
    let ext = if upper {
        extension.to_uppercase()
    } else {
        extension.to_lowercase()
    };
    table_path.with_extension(ext)
}

/// True when `name` has a `.dbf` extension (any case) and a non-empty base.
pub fn is_table_file(name: &str) -> bool {
    let suffix = TABLE_EXTENSION.len() + 1;
    name.len() > suffix
        && name.is_char_boundary(name.len() - suffix)
        && name[name.len() - suffix..].eq_ignore_ascii_case(".dbf")
}

/// List the table files in a directory.
pub fn list_tables(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_table_file(&name) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Delete a file, ignoring "not found" errors.
pub fn delete_file(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Create directory if it doesn't exist.
pub fn create_dir_if_missing(path: &Path) -> std::io::Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("table.dbf"), "table");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("trailing."), "trailing.");
    }

    #[test]
    fn test_is_table_file() {
        assert!(is_table_file("a.dbf"));
        assert!(is_table_file("CUSTOMERS.DBF"));
        assert!(is_table_file("x.DbF"));
        assert!(!is_table_file(".dbf"));
        assert!(!is_table_file("a.dbt"));
        assert!(!is_table_file("dbf"));
    }

    #[test]
    fn test_memo_file_path_follows_case() {
        assert_eq!(
            memo_file_path(Path::new("/d/T.DBF"), "dbt"),
            Path::new("/d/T.DBT")
        );
        assert_eq!(
            memo_file_path(Path::new("/d/t.dbf"), "fpt"),
            Path::new("/d/t.fpt")
        );
    }

    #[test]
    fn test_find_memo_file() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let table = dir.join("Data.dbf");

        assert!(find_memo_file(&table, "dbt").unwrap().is_none());

        std::fs::write(dir.join("DATA.DBT"), "").unwrap();
        std::fs::write(dir.join("data.fpt"), "").unwrap();
        std::fs::write(dir.join("other.dbt"), "").unwrap();

        let found = find_memo_file(&table, "dbt").unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "DATA.DBT");
        let found = find_memo_file(&table, "fpt").unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "data.fpt");
    }

    #[test]
    fn test_find_memo_file_ambiguous() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let table = dir.join("notes.dbf");

        std::fs::write(dir.join("notes.dbt"), "").unwrap();
        std::fs::write(dir.join("NOTES.DBT"), "").unwrap();

        let err = find_memo_file(&table, "dbt").unwrap_err();
        assert!(err.is_corruption());
        // other extensions are unaffected
        assert!(find_memo_file(&table, "fpt").unwrap().is_none());
    }

    #[test]
    fn test_list_tables() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();

        std::fs::write(dir.join("a.dbf"), "").unwrap();
        std::fs::write(dir.join("B.DBF"), "").unwrap();
        std::fs::write(dir.join("a.dbt"), "").unwrap();
        std::fs::write(dir.join(".dbf"), "").unwrap();
        std::fs::create_dir(dir.join("sub.dbf")).unwrap();

        let names: Vec<_> = list_tables(dir).unwrap().into_iter().collect();
        assert_eq!(names, vec!["B.DBF".to_string(), "a.dbf".to_string()]);
    }

    #[test]
    fn test_delete_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("t.dbf");

        assert!(delete_file(&path).is_ok());

        std::fs::write(&path, "x").unwrap();
        delete_file(&path).unwrap();
        assert!(!path.exists());
    }
}
