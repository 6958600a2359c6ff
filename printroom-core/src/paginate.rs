//! Sheet paginator: slices a slot sequence into fixed-capacity sheets and
//! places every slot on its physical cell.

use tracing::debug;

use crate::config::{IdCardLayout, LanyardLayout, LayoutConfig};
use crate::queue::{PrintQueue, Revision, SheetFamily};
use crate::slot::PrintSlot;

/// Split `slots` into windows of `capacity`. An empty input still yields one
/// (empty) page, so there is always a sheet to show.
pub fn paginate<T>(slots: &[T], capacity: usize) -> Vec<&[T]> {
    if slots.is_empty() {
        return vec![&slots[..0]];
    }
    slots.chunks(capacity.max(1)).collect()
}

/// Position of one card on an ID-card sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardCell {
    pub index: usize,
    pub column: usize,
    pub row: usize,
    /// Top-left corner before the registration offsets.
    pub left_mm: f32,
    pub top_mm: f32,
    /// Press-registration compensation.
    pub offset_x_mm: f32,
    pub offset_y_mm: f32,
}

/// Position of one lane on a lanyard sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanyardLane {
    pub lane: usize,
    pub left_mm: f32,
    pub top_mm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Card(CardCell),
    Lane(LanyardLane),
}

pub fn card_cell(index: usize, layout: &IdCardLayout) -> CardCell {
    let columns = layout.columns.max(1);
    let column = index % columns;
    let row = index / columns;
    let (origin_x, origin_y) = layout.grid_origin_mm();

    let offset_x_mm = if columns < 2 {
        0.0
    } else if column == 0 {
        -layout.outer_column_shift_mm
    } else if column == columns - 1 {
        layout.outer_column_shift_mm
    } else {
        0.0
    };

    CardCell {
        index,
        column,
        row,
        left_mm: origin_x + column as f32 * layout.card_width_mm,
        top_mm: origin_y + row as f32 * layout.card_height_mm,
        offset_x_mm,
        offset_y_mm: if row == 0 {
            0.0
        } else {
            row as f32 * layout.row_shift_mm
        },
    }
}

pub fn lanyard_lane(index: usize, layout: &LanyardLayout) -> LanyardLane {
    LanyardLane {
        lane: index,
        left_mm: layout.margin_mm + index as f32 * (layout.lane_width_mm + layout.lane_gap_mm),
        top_mm: layout.margin_mm,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSlot {
    pub slot: PrintSlot,
    pub placement: Placement,
}

/// One physical sheet. Derived from the queue; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPage {
    /// 1-based sheet number.
    pub number: usize,
    pub family: SheetFamily,
    pub cells: Vec<PlacedSlot>,
}

impl SheetPage {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Paginate `slots` for `family` and place each slot on its sheet.
pub fn layout_sheets(family: SheetFamily, slots: &[PrintSlot], layout: &LayoutConfig) -> Vec<SheetPage> {
    let pages = paginate(slots, layout.capacity(family));
    debug!(%family, slots = slots.len(), pages = pages.len(), "Laid out sheets");
    pages
        .into_iter()
        .enumerate()
        .map(|(page, window)| SheetPage {
            number: page + 1,
            family,
            cells: window
                .iter()
                .enumerate()
                .map(|(j, slot)| PlacedSlot {
                    slot: slot.clone(),
                    placement: match family {
                        SheetFamily::IdCard => Placement::Card(card_cell(j, &layout.id_card)),
                        SheetFamily::Lanyard => Placement::Lane(lanyard_lane(j, &layout.lanyard)),
                    },
                })
                .collect(),
        })
        .collect()
}

/// Memoised sheets per family. Recomputes only when the sequence revision
/// or the layout changes.
#[derive(Debug, Default)]
pub struct SheetView {
    cached: Vec<CachedSheets>,
}

#[derive(Debug)]
struct CachedSheets {
    family: SheetFamily,
    revision: Revision,
    layout: LayoutConfig,
    pages: Vec<SheetPage>,
}

impl SheetView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&mut self, queue: &PrintQueue, family: SheetFamily, layout: &LayoutConfig) -> &[SheetPage] {
        let revision = queue.revision(family);
        let hit = self.cached.iter().position(|entry| {
            entry.family == family && Some(entry.revision) == revision && entry.layout == *layout
        });
        let index = match hit {
            Some(index) => index,
            None => {
                let pages = layout_sheets(family, queue.slots(family), layout);
                self.cached.retain(|entry| entry.family != family);
                self.cached.push(CachedSheets {
                    family,
                    revision: revision.unwrap_or_else(Revision::next),
                    layout: layout.clone(),
                    pages,
                });
                self.cached.len() - 1
            }
        };
        &self.cached[index].pages
    }
}
