use std::io::Write;
use std::{fs, io, path};

use pathstore_core::{Document, Error, Result};

use crate::config::WriteMode;

/// Read a document from `file_path`, or `None` if the file does not exist.
///
/// The root must be a JSON object; anything else is a parse error.
pub fn read_document(file_path: &path::Path) -> Result<Option<Document>> {
    log::debug!("Reading {}...", file_path.display());

    let contents = match fs::read_to_string(file_path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::io(file_path, err)),
    };

    let document = serde_json::from_str::<Document>(&contents).map_err(|source| Error::Parse {
        path: file_path.to_path_buf(),
        source,
    })?;
    Ok(Some(document))
}

/// Serialize `document` with 2-space indentation and replace `file_path` with it.
///
/// A file that does not exist yet is created with a plain write and the
/// default permissions.
pub fn write_document(
    file_path: &path::Path,
    document: &Document,
    mode: WriteMode,
) -> Result<()> {
    let encoded = serde_json::to_string_pretty(document).map_err(Error::Serialize)?;
    log::debug!("Writing {}...", file_path.display());

    match mode {
        WriteMode::Overwrite => {
            fs::write(file_path, encoded.as_bytes()).map_err(|err| Error::io(file_path, err))
        }
        WriteMode::Atomic => {
            // The rename lands on the file a symlink points at, and the
            // staged copy takes over the replaced file's permissions.
            let (target, permissions) = match fs::canonicalize(file_path) {
                Ok(resolved) => {
                    let permissions = fs::metadata(&resolved)
                        .map_err(|err| Error::io(&resolved, err))?
                        .permissions();
                    (resolved, permissions)
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    return fs::write(file_path, encoded.as_bytes())
                        .map_err(|err| Error::io(file_path, err));
                }
                Err(err) => return Err(Error::io(file_path, err)),
            };

            let dir = match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => path::Path::new("."),
            };
            let mut staged =
                tempfile::NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;
            staged
                .write_all(encoded.as_bytes())
                .and_then(|()| staged.as_file().set_permissions(permissions))
                .and_then(|()| staged.as_file().sync_all())
                .map_err(|err| Error::io(staged.path(), err))?;
            staged
                .persist(&target)
                .map_err(|err| Error::io(&target, err.error))?;
            Ok(())
        }
    }
}
