//! Catalog directories: many saved tables under one root.
//!
//! [`walk`] discovers table folders lazily. A folder is a table folder when
//! it directly holds `metadata.json` or `data.parquet`; the walk keeps
//! descending into it regardless, so a table folder may also hold nested
//! tables. Symlinks are not followed.

use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::{
    storage::layout,
    table::{InvalidTableNameSnafu, Table, TableError},
};

/// Lazy iterator over the tables saved under a root directory.
///
/// Each table is loaded with [`Table::load`] when the iterator reaches its
/// folder. Unreadable directory entries are logged and skipped.
#[derive(Debug)]
pub struct CatalogWalker {
    inner: walkdir::IntoIter,
}

impl Iterator for CatalogWalker {
    type Item = Table;

    fn next(&mut self) -> Option<Table> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable catalog entry: {e}");
                    continue;
                }
            };

            if entry.file_type().is_dir() && layout::is_table_dir(entry.path()) {
                debug!("loading table folder {}", entry.path().display());
                return Some(Table::load(entry.path()));
            }
        }
    }
}

/// Walk the catalog under `root`, including `root` itself.
///
/// Siblings are visited in file-name order.
pub fn walk(root: impl AsRef<Path>) -> CatalogWalker {
    CatalogWalker {
        inner: WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
    }
}

/// Load the table saved in `folder`. Never fails; see [`Table::load`].
pub fn load_table(folder: impl AsRef<Path>) -> Table {
    Table::load(folder.as_ref())
}

/// Eagerly load every table under `root`.
pub fn load_tables_from(root: impl AsRef<Path>) -> Vec<Table> {
    walk(root).collect()
}

/// Save `table` into `folder`.
pub fn save_table(table: &Table, folder: impl AsRef<Path>) -> Result<(), TableError> {
    table.save(folder.as_ref())
}

/// Save each table under `root/<table name>`.
///
/// A name containing `/` yields nested folders (`II/246/out` becomes
/// `root/II/246/out`). Every name is checked before anything is written.
pub fn save_tables(tables: &[Table], root: impl AsRef<Path>) -> Result<(), TableError> {
    let root = root.as_ref();
    let folders = tables
        .iter()
        .map(|t| table_folder(root, t.name()))
        .collect::<Result<Vec<_>, _>>()?;

    for (table, folder) in tables.iter().zip(&folders) {
        table.save(folder)?;
    }
    Ok(())
}

/// `root/<name>`, rejecting names that would escape `root`.
pub fn table_folder(root: &Path, name: &str) -> Result<PathBuf, TableError> {
    let invalid = |reason: &str| {
        InvalidTableNameSnafu {
            name,
            reason: reason.to_string(),
        }
        .build()
    };

    if name.is_empty() {
        return Err(invalid("empty name"));
    }
    if name.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }

    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid(&format!("invalid path segment {segment:?}")));
        }
    }

    let mut folder = root.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => folder.push(part),
            _ => return Err(invalid("not a plain relative path")),
        }
    }
    Ok(folder)
}
