//! Database - a directory of tables.
//!
//! An xBase database is a directory holding `.dbf` table files next to their
//! memo files. `Database` keeps a registry of closed `Table` handles keyed by
//! file name (extension included). Registering or removing a table never
//! touches the disk; use `Table::open` and `Table::delete` for that.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::field::Field;
use crate::options::Options;
use crate::table::Table;
use crate::util::filename::{create_dir_if_missing, list_tables};
use crate::version::Version;
use crate::{Error, Result};

/// A directory of DBF tables.
#[derive(Debug)]
pub struct Database {
    /// Database directory path.
    dir: PathBuf,
    /// Options handed to every registered table.
    options: Options,
    tables: BTreeMap<String, Table>,
}

impl Database {
    /// Open the database in `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(dir, Options::default())
    }

    /// Open with custom table options.
    pub fn open_with_options(dir: impl AsRef<Path>, options: Options) -> Result<Self> {
        options.validate()?;
        let dir = dir.as_ref().to_path_buf();
        if dir.is_file() {
            return Err(Error::InvalidConfiguration(format!(
                "{} is a file, not a database directory",
                dir.display()
            )));
        }
        create_dir_if_missing(&dir)?;

        let mut db = Self {
            dir,
            options,
            tables: BTreeMap::new(),
        };
        for name in list_tables(&db.dir)? {
            db.add_table(name);
        }
        debug!(
            "opened database {} with {} tables",
            db.dir.display(),
            db.tables.len()
        );
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Names of the registered tables, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Register a table by file name and return it. An existing registration
    /// is returned unchanged. The file need not exist.
    pub fn add_table(&mut self, name: impl Into<String>) -> &mut Table {
        let name = name.into();
        let path = self.dir.join(&name);
        let options = &self.options;
        self.tables
            .entry(name)
            .or_insert_with(|| Table::with_options(path, options.clone()))
    }

    /// Register a new table with a definition, ready for
    /// `open(IfNonExistent::Create)`.
    pub fn add_table_definition(
        &mut self,
        name: impl Into<String>,
        version: Version,
        fields: Vec<Field>,
    ) -> Result<&mut Table> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::AlreadyExists(name));
        }
        let table =
            Table::create_with_options(self.dir.join(&name), version, fields, self.options.clone());
        Ok(self.tables.entry(name).or_insert(table))
    }

    /// Unregister a table. The file is left alone.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }
}
