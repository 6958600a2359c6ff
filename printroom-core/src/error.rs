//! Error types surfaced by the print-production core.

use thiserror::Error;

use crate::contract::StoreError;
use crate::queue::SheetFamily;
use crate::slot::SlotId;

/// How an error should reach the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Modal message; the operator has to acknowledge it.
    Blocking,
    /// Toast-level notice.
    Notice,
}

/// Structurally invalid queue input. The queue is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("no slot at index {index} in {family} sheet queue of length {len}")]
    SlotOutOfRange {
        family: SheetFamily,
        index: usize,
        len: usize,
    },

    #[error("slot {0} is not in the lanyard queue")]
    SlotNotFound(SlotId),

    #[error("folder {folder_id} has no files to import")]
    EmptyImport { folder_id: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("folder '{folder_name}' has no files")]
    EmptyFolder {
        folder_id: String,
        folder_name: String,
    },

    #[error("failed to list files of folder {folder_id}: {source}")]
    Store {
        folder_id: String,
        source: StoreError,
    },
}

impl ImportError {
    pub fn severity(&self) -> Severity {
        match self {
            ImportError::EmptyFolder { .. } => Severity::Blocking,
            ImportError::Store { .. } => Severity::Notice,
        }
    }
}

/// Failure of the synchronized lanyard copy.
#[derive(Debug, Error)]
pub enum CardCopyError {
    #[error("order {order_number} has no ID card front folder")]
    MissingCardFolder { order_number: String },

    #[error("failed to count files of folder {folder_id}: {source}")]
    Store {
        folder_id: String,
        source: StoreError,
    },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl CardCopyError {
    pub fn severity(&self) -> Severity {
        Severity::Notice
    }
}

/// The mobile print window could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the print window was blocked; allow pop-ups for this site and try again")]
pub struct PopupBlockedError;

impl PopupBlockedError {
    pub fn severity(&self) -> Severity {
        Severity::Blocking
    }
}
