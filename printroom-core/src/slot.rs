use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::{DesignFile, Folder};

/// Hook fill used until the operator picks a color.
pub const DEFAULT_HOOK_COLOR: &str = "#000000";

/// Opaque slot identifier. Freshly minted for every slot, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(Uuid);

impl SlotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// One placed design instance, destined for exactly one cell on a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSlot {
    pub id: SlotId,
    pub source_file_id: String,
    pub file_name: String,
    pub order_number: String,
    pub parent_folder_id: String,
    /// URL of the image rendered into the cell.
    pub image_ref: String,
    /// Vestigial: always 1, and pagination places one cell per slot anyway.
    pub quantity_needed: u32,
    /// Fill of the hook zone. Only lanyard sheets render it.
    pub hook_color: String,
    /// Advisory: the UI only offers the color control on master slots.
    pub is_master_color: bool,
}

impl PrintSlot {
    /// Build a fresh slot for `file`, imported from `folder`.
    pub fn from_file(file: &DesignFile, folder: &Folder, is_master_color: bool) -> Self {
        Self {
            id: SlotId::new(),
            source_file_id: file.id.clone(),
            file_name: file.name.clone(),
            order_number: folder.order_number.clone(),
            parent_folder_id: folder.id.clone(),
            image_ref: file.file_url.clone(),
            quantity_needed: 1,
            hook_color: DEFAULT_HOOK_COLOR.to_string(),
            is_master_color,
        }
    }

    /// Copy with a fresh id. Copies are never masters, and keep the hook
    /// color the source had at this moment.
    pub fn duplicate(&self) -> Self {
        Self {
            id: SlotId::new(),
            is_master_color: false,
            ..self.clone()
        }
    }
}
