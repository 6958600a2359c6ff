//! The in-memory print queue: one ordered slot sequence per sheet family.
//!
//! A [`PrintQueue`] is a value. Operations in [`crate::mutation`] take a
//! queue by reference and return the next one, so a caller always derives
//! the new state from whatever queue is current when it applies a change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slot::{PrintSlot, SlotId};

/// Product type currently being laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrintCategory {
    #[default]
    #[serde(rename = "idcard")]
    IdCard,
    #[serde(rename = "lanyard")]
    Lanyard,
    /// Reserved product line. Lays out on ID-card sheets.
    #[serde(rename = "prod3")]
    Prod3,
}

impl PrintCategory {
    /// The slot sequence this category reads from and writes to.
    pub fn family(self) -> SheetFamily {
        match self {
            PrintCategory::Lanyard => SheetFamily::Lanyard,
            PrintCategory::IdCard | PrintCategory::Prod3 => SheetFamily::IdCard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrintCategory::IdCard => "idcard",
            PrintCategory::Lanyard => "lanyard",
            PrintCategory::Prod3 => "prod3",
        }
    }
}

impl fmt::Display for PrintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown print category '{0}' (expected idcard, lanyard or prod3)")]
pub struct ParseCategoryError(String);

impl FromStr for PrintCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idcard" | "id-card" | "id_card" => Ok(PrintCategory::IdCard),
            "lanyard" => Ok(PrintCategory::Lanyard),
            "prod3" => Ok(PrintCategory::Prod3),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Physical sheet type. Each family owns one independent slot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFamily {
    IdCard,
    Lanyard,
}

impl SheetFamily {
    pub const ALL: [SheetFamily; 2] = [SheetFamily::IdCard, SheetFamily::Lanyard];
}

impl fmt::Display for SheetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetFamily::IdCard => f.write_str("idcard"),
            SheetFamily::Lanyard => f.write_str("lanyard"),
        }
    }
}

/// Identity of one state of a slot sequence. Every change mints a new one,
/// process-wide, so equal revisions always mean identical content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision(u64);

impl Revision {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
struct Sequence {
    slots: Vec<PrintSlot>,
    revision: Revision,
}

impl Sequence {
    fn empty() -> Self {
        Self {
            slots: Vec::new(),
            revision: Revision::next(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrintQueue {
    category: PrintCategory,
    sequences: BTreeMap<SheetFamily, Sequence>,
}

impl Default for PrintQueue {
    fn default() -> Self {
        Self::new(PrintCategory::default())
    }
}

impl PrintQueue {
    pub fn new(category: PrintCategory) -> Self {
        let sequences = SheetFamily::ALL
            .into_iter()
            .map(|family| (family, Sequence::empty()))
            .collect();
        Self {
            category,
            sequences,
        }
    }

    pub fn category(&self) -> PrintCategory {
        self.category
    }

    /// Same slots, different active category.
    pub fn with_category(&self, category: PrintCategory) -> Self {
        Self {
            category,
            sequences: self.sequences.clone(),
        }
    }

    pub fn slots(&self, family: SheetFamily) -> &[PrintSlot] {
        self.sequences
            .get(&family)
            .map(|seq| seq.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Slots of the active category's family.
    pub fn active_slots(&self) -> &[PrintSlot] {
        self.slots(self.category.family())
    }

    pub fn revision(&self, family: SheetFamily) -> Option<Revision> {
        self.sequences.get(&family).map(|seq| seq.revision)
    }

    pub fn len(&self, family: SheetFamily) -> usize {
        self.slots(family).len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.values().all(|seq| seq.slots.is_empty())
    }

    pub fn position(&self, family: SheetFamily, id: SlotId) -> Option<usize> {
        self.slots(family).iter().position(|slot| slot.id == id)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        SheetFamily::ALL
            .into_iter()
            .any(|family| self.position(family, id).is_some())
    }

    /// Next queue with `edit` applied to one family's sequence.
    pub(crate) fn edit<F>(&self, family: SheetFamily, edit: F) -> Self
    where
        F: FnOnce(&mut Vec<PrintSlot>),
    {
        let mut next = self.clone();
        let seq = next.sequences.entry(family).or_insert_with(Sequence::empty);
        edit(&mut seq.slots);
        seq.revision = Revision::next();
        debug_assert!(next.ids_unique(), "duplicate slot id in print queue");
        next
    }

    fn ids_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.sequences
            .values()
            .flat_map(|seq| seq.slots.iter())
            .all(|slot| seen.insert(slot.id))
    }
}
