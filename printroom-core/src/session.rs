//! Queue session: the single owner of the current [`PrintQueue`].
//!
//! Every change is a [`QueueCommand`] run through the pure reducer
//! [`apply`] against whatever queue is current at that moment, and then
//! appended to the session's log. Asynchronous workflows do their fetching
//! without holding the lock and only dispatch once the result is in, so two
//! imports that finish in either order both land.
//!
//! Commands that address a slot by id are logged with the position the id
//! resolved to, so [`replay`] reproduces the layout even though every replayed
//! slot gets a fresh id.

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::config::LayoutConfig;
use crate::contract::{FileQuery, FileStore, Folder, Order};
use crate::error::{CardCopyError, ImportError, QueueError};
use crate::import::{apply_import, fetch_batch, ImportBatch};
use crate::mutation::{clear_queue, clone_slot, insert_copies, remove_slot, update_hook_color};
use crate::orders::{card_front_folder, copies_needed, is_two_sided};
use crate::paginate::{SheetPage, SheetView};
use crate::queue::{PrintCategory, PrintQueue, SheetFamily};
use crate::slot::SlotId;
use crate::surface::PrintPayload;

/// Address of a lanyard slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRef {
    At(usize),
    Id(SlotId),
}

impl SlotRef {
    fn resolve(self, queue: &PrintQueue) -> Result<usize, QueueError> {
        let family = SheetFamily::Lanyard;
        match self {
            SlotRef::At(index) if index < queue.len(family) => Ok(index),
            SlotRef::At(index) => Err(QueueError::SlotOutOfRange {
                family,
                index,
                len: queue.len(family),
            }),
            SlotRef::Id(id) => queue.position(family, id).ok_or(QueueError::SlotNotFound(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueueCommand {
    SelectCategory(PrintCategory),
    /// Append a fetched folder to the sequence of `category`.
    Import {
        category: PrintCategory,
        batch: ImportBatch,
    },
    Remove {
        category: PrintCategory,
        index: usize,
    },
    Clone {
        index: usize,
    },
    InsertCopies {
        after: SlotRef,
        count: usize,
    },
    UpdateHookColor {
        slot: SlotRef,
        color: String,
    },
    Clear {
        category: PrintCategory,
    },
}

impl QueueCommand {
    /// Same command with slot ids replaced by their position in `queue`.
    fn resolved(self, queue: &PrintQueue) -> Result<Self, QueueError> {
        Ok(match self {
            QueueCommand::InsertCopies { after, count } => QueueCommand::InsertCopies {
                after: SlotRef::At(after.resolve(queue)?),
                count,
            },
            QueueCommand::UpdateHookColor { slot, color } => QueueCommand::UpdateHookColor {
                slot: SlotRef::At(slot.resolve(queue)?),
                color,
            },
            other => other,
        })
    }
}

/// Next queue for `command`. `queue` is never modified.
pub fn apply(queue: &PrintQueue, command: &QueueCommand) -> Result<PrintQueue, QueueError> {
    match command {
        QueueCommand::SelectCategory(category) => Ok(queue.with_category(*category)),
        QueueCommand::Import { batch, .. } if batch.files.is_empty() => {
            Err(QueueError::EmptyImport {
                folder_id: batch.folder.id.clone(),
            })
        }
        QueueCommand::Import { category, batch } => Ok(apply_import(queue, batch, *category)),
        QueueCommand::Remove { category, index } => remove_slot(queue, *category, *index),
        QueueCommand::Clone { index } => clone_slot(queue, *index),
        QueueCommand::InsertCopies { after, count } => {
            insert_copies(queue, after.resolve(queue)?, *count)
        }
        QueueCommand::UpdateHookColor { slot, color } => {
            let index = slot.resolve(queue)?;
            let id = queue.slots(SheetFamily::Lanyard)[index].id;
            update_hook_color(queue, id, color)
        }
        QueueCommand::Clear { category } => Ok(clear_queue(queue, *category)),
    }
}

/// Rebuild a queue from a command log.
pub fn replay(category: PrintCategory, commands: &[QueueCommand]) -> Result<PrintQueue, QueueError> {
    commands
        .iter()
        .try_fold(PrintQueue::new(category), |queue, command| apply(&queue, command))
}

#[derive(Debug)]
struct SessionState {
    initial: PrintCategory,
    queue: PrintQueue,
    log: Vec<QueueCommand>,
    view: SheetView,
}

impl SessionState {
    fn commit(&mut self, next: PrintQueue, command: QueueCommand) -> PrintQueue {
        self.queue = next;
        self.log.push(command);
        self.queue.clone()
    }
}

#[derive(Debug)]
pub struct QueueSession {
    state: Mutex<SessionState>,
}

impl Default for QueueSession {
    fn default() -> Self {
        Self::new(PrintCategory::default())
    }
}

impl QueueSession {
    pub fn new(category: PrintCategory) -> Self {
        Self {
            state: Mutex::new(SessionState {
                initial: category,
                queue: PrintQueue::new(category),
                log: Vec::new(),
                view: SheetView::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> PrintQueue {
        self.state.lock().queue.clone()
    }

    pub fn category(&self) -> PrintCategory {
        self.state.lock().queue.category()
    }

    /// Category the session started with; the first state [`replay`] needs.
    pub fn initial_category(&self) -> PrintCategory {
        self.state.lock().initial
    }

    pub fn history(&self) -> Vec<QueueCommand> {
        self.state.lock().log.clone()
    }

    /// Apply `command` to the current queue. On error nothing changes and
    /// nothing is logged.
    pub fn dispatch(&self, command: QueueCommand) -> Result<PrintQueue, QueueError> {
        let mut state = self.state.lock();
        let command = command.resolved(&state.queue)?;
        let next = apply(&state.queue, &command).map_err(|e| {
            debug!(error = %e, ?command, "Rejected queue command");
            e
        })?;
        Ok(state.commit(next, command))
    }

    pub fn select_category(&self, category: PrintCategory) -> PrintQueue {
        let mut state = self.state.lock();
        let next = state.queue.with_category(category);
        info!(%category, "Selected print category");
        state.commit(next, QueueCommand::SelectCategory(category))
    }

    /// Laid-out sheets of `family`, cached until the sequence changes.
    pub fn sheets(&self, family: SheetFamily, layout: &LayoutConfig) -> Vec<SheetPage> {
        let mut guard = self.state.lock();
        let SessionState { queue, view, .. } = &mut *guard;
        view.pages(queue, family, layout).to_vec()
    }

    /// Print payload for the active category.
    pub fn payload(&self, layout: &LayoutConfig, title: impl Into<String>) -> PrintPayload {
        let category = self.category();
        PrintPayload {
            category,
            sheets: self.sheets(category.family(), layout),
            title: title.into(),
        }
    }

    /// Import one folder into the category active when the import started.
    /// Returns the number of slots added.
    pub async fn import_folder<S>(&self, store: &S, folder: &Folder) -> Result<usize, ImportError>
    where
        S: FileStore + ?Sized,
    {
        let category = self.category();
        let batch = fetch_batch(store, folder).await?;
        let added = batch.files.len();

        let mut state = self.state.lock();
        let next = apply_import(&state.queue, &batch, category);
        state.commit(next, QueueCommand::Import { category, batch });
        Ok(added)
    }

    /// Import several folders concurrently. Each result is applied as soon
    /// as its fetch resolves; failures are reported per folder.
    pub async fn import_folders<S>(&self, store: &S, folders: &[Folder]) -> Vec<Result<usize, ImportError>>
    where
        S: FileStore + ?Sized,
    {
        let results = join_all(folders.iter().map(|folder| self.import_folder(store, folder))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(folders = folders.len(), failed, "Batch import finished");
        results
    }

    /// Synchronized copy for the lanyard slot `slot`: insert one copy per
    /// ID-card face of its order, minus the slot itself. Copies go after the
    /// slot's position at the time the file count arrives; if the slot is
    /// gone by then nothing is inserted. Returns the number of copies added.
    pub async fn copy_by_card_file_count<S>(
        &self,
        store: &S,
        slot: SlotId,
        orders: &[Order],
    ) -> Result<usize, CardCopyError>
    where
        S: FileStore + ?Sized,
    {
        let source = {
            let state = self.state.lock();
            let index = SlotRef::Id(slot).resolve(&state.queue)?;
            state.queue.slots(SheetFamily::Lanyard)[index].clone()
        };

        let Some(order) = orders.iter().find(|o| o.order_number == source.order_number) else {
            debug!(order_number = %source.order_number, "No order for slot; nothing to copy");
            return Ok(0);
        };
        let folder = card_front_folder(order).ok_or_else(|| CardCopyError::MissingCardFolder {
            order_number: order.order_number.clone(),
        })?;
        let files = store
            .get_files(FileQuery {
                folder_id: folder.id.clone(),
            })
            .await
            .map_err(|source| {
                error!(folder_id = %folder.id, error = ?source, "Failed to count ID card files");
                CardCopyError::Store {
                    folder_id: folder.id.clone(),
                    source,
                }
            })?;
        let count = copies_needed(files.len(), is_two_sided(order));
        if count == 0 {
            return Ok(0);
        }

        let mut state = self.state.lock();
        let Some(index) = state.queue.position(SheetFamily::Lanyard, slot) else {
            info!(%slot, "Source slot removed before copy resolved; skipping");
            return Ok(0);
        };
        let next = insert_copies(&state.queue, index, count)?;
        state.commit(
            next,
            QueueCommand::InsertCopies {
                after: SlotRef::At(index),
                count,
            },
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::DesignFile;

    fn batch(folder_id: &str, n: usize) -> ImportBatch {
        ImportBatch {
            folder: Folder {
                id: folder_id.into(),
                folder_name: format!("Folder {folder_id}"),
                order_number: "SO-1".into(),
            },
            files: (0..n)
                .map(|i| DesignFile {
                    id: format!("{folder_id}-{i}"),
                    name: format!("{folder_id}-{i}.png"),
                    file_url: format!("/files/{folder_id}-{i}.png"),
                    folder_id: folder_id.into(),
                })
                .collect(),
        }
    }

    fn source_ids(queue: &PrintQueue, family: SheetFamily) -> Vec<String> {
        queue
            .slots(family)
            .iter()
            .map(|s| s.source_file_id.clone())
            .collect()
    }

    #[test]
    fn rejected_commands_are_not_logged() {
        let session = QueueSession::new(PrintCategory::Lanyard);
        let err = session.dispatch(QueueCommand::Clone { index: 0 }).unwrap_err();
        assert!(matches!(err, QueueError::SlotOutOfRange { index: 0, len: 0, .. }));
        assert!(session.history().is_empty());
    }

    #[test]
    fn empty_import_is_rejected_without_a_new_revision() {
        let session = QueueSession::new(PrintCategory::Lanyard);
        let before = session.snapshot().revision(SheetFamily::Lanyard);
        let err = session
            .dispatch(QueueCommand::Import {
                category: PrintCategory::Lanyard,
                batch: batch("E", 0),
            })
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::EmptyImport {
                folder_id: "E".into()
            }
        );
        assert!(session.history().is_empty());
        assert_eq!(session.snapshot().revision(SheetFamily::Lanyard), before);
    }

    #[test]
    fn id_commands_are_logged_by_position() {
        let session = QueueSession::new(PrintCategory::Lanyard);
        session
            .dispatch(QueueCommand::Import {
                category: PrintCategory::Lanyard,
                batch: batch("A", 2),
            })
            .unwrap();
        let second = session.snapshot().slots(SheetFamily::Lanyard)[1].id;
        session
            .dispatch(QueueCommand::UpdateHookColor {
                slot: SlotRef::Id(second),
                color: "#ff0000".into(),
            })
            .unwrap();
        assert_eq!(
            session.history().last(),
            Some(&QueueCommand::UpdateHookColor {
                slot: SlotRef::At(1),
                color: "#ff0000".into()
            })
        );
    }

    #[test]
    fn replay_reproduces_layout() {
        let session = QueueSession::new(PrintCategory::Lanyard);
        session
            .dispatch(QueueCommand::Import {
                category: PrintCategory::Lanyard,
                batch: batch("A", 3),
            })
            .unwrap();
        let middle = session.snapshot().slots(SheetFamily::Lanyard)[1].id;
        session
            .dispatch(QueueCommand::InsertCopies {
                after: SlotRef::Id(middle),
                count: 2,
            })
            .unwrap();
        session
            .dispatch(QueueCommand::Remove {
                category: PrintCategory::Lanyard,
                index: 0,
            })
            .unwrap();
        session.select_category(PrintCategory::IdCard);
        session
            .dispatch(QueueCommand::Import {
                category: PrintCategory::IdCard,
                batch: batch("B", 1),
            })
            .unwrap();

        let live = session.snapshot();
        let rebuilt = replay(session.initial_category(), &session.history()).unwrap();
        assert_eq!(rebuilt.category(), PrintCategory::IdCard);
        for family in SheetFamily::ALL {
            assert_eq!(source_ids(&rebuilt, family), source_ids(&live, family));
        }
        assert_eq!(
            source_ids(&live, SheetFamily::Lanyard),
            ["A-1", "A-1", "A-1", "A-2"]
        );
        assert_ne!(
            rebuilt.slots(SheetFamily::Lanyard)[0].id,
            live.slots(SheetFamily::Lanyard)[0].id
        );
    }

    #[test]
    fn sheets_follow_the_current_queue() {
        let layout = LayoutConfig::default();
        let session = QueueSession::new(PrintCategory::IdCard);
        assert_eq!(session.sheets(SheetFamily::IdCard, &layout).len(), 1);
        session
            .dispatch(QueueCommand::Import {
                category: PrintCategory::IdCard,
                batch: batch("C", 10),
            })
            .unwrap();
        let payload = session.payload(&layout, "Order C");
        assert_eq!(payload.sheets.len(), 2);
        assert_eq!(payload.category, PrintCategory::IdCard);
    }
}
