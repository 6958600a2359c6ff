//! Folder import: turns an upload folder into print slots.
//!
//! Import is split in two so it can never lose an update:
//! - [`fetch_batch`] does the asynchronous part and returns an
//!   [`ImportBatch`] without looking at any queue.
//! - [`apply_import`] is a pure function of the queue it is given, and the
//!   session calls it with the queue that is current when the fetch resolves.

use tracing::{error, info, warn};

use crate::contract::{DesignFile, FileQuery, FileStore, Folder};
use crate::error::ImportError;
use crate::queue::{PrintCategory, PrintQueue, SheetFamily};
use crate::slot::PrintSlot;

/// Files fetched for one folder, ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub folder: Folder,
    pub files: Vec<DesignFile>,
}

/// List the folder's files. An empty folder is an [`ImportError::EmptyFolder`].
pub async fn fetch_batch<S>(store: &S, folder: &Folder) -> Result<ImportBatch, ImportError>
where
    S: FileStore + ?Sized,
{
    info!(folder_id = %folder.id, folder_name = %folder.folder_name, "Fetching folder for import");
    let files = store
        .get_files(FileQuery {
            folder_id: folder.id.clone(),
        })
        .await
        .map_err(|source| {
            error!(folder_id = %folder.id, error = ?source, "Failed to list folder files");
            ImportError::Store {
                folder_id: folder.id.clone(),
                source,
            }
        })?;

    if files.is_empty() {
        warn!(folder_id = %folder.id, folder_name = %folder.folder_name, "Folder has no files");
        return Err(ImportError::EmptyFolder {
            folder_id: folder.id.clone(),
            folder_name: folder.folder_name.clone(),
        });
    }

    Ok(ImportBatch {
        folder: folder.clone(),
        files,
    })
}

/// One fresh slot per file. Only lanyard imports keep the master flag on
/// the first slot of the batch.
pub fn build_slots(batch: &ImportBatch, category: PrintCategory) -> Vec<PrintSlot> {
    let keep_master = category.family() == SheetFamily::Lanyard;
    batch
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| PrintSlot::from_file(file, &batch.folder, keep_master && i == 0))
        .collect()
}

/// Append the batch's slots to the sequence of `category`.
pub fn apply_import(queue: &PrintQueue, batch: &ImportBatch, category: PrintCategory) -> PrintQueue {
    let family = category.family();
    let slots = build_slots(batch, category);
    let added = slots.len();
    let next = queue.edit(family, |seq| seq.extend(slots));
    info!(
        folder_id = %batch.folder.id,
        %family,
        added,
        len = next.len(family),
        "Imported folder into print queue"
    );
    next
}
