//! Slot mutation operations.
//!
//! Every operation is a function `(&PrintQueue, args) -> next queue`. On
//! error the input queue is simply not replaced, so there is no partial
//! mutation to roll back.
//!
//! Clone, synchronized copy and hook-color updates only ever address the
//! lanyard sequence.

use tracing::{debug, info};

use crate::contract::{Folder, Order};
use crate::error::{CardCopyError, QueueError};
use crate::orders::{card_front_folder, copies_needed, is_two_sided};
use crate::queue::{PrintCategory, PrintQueue, SheetFamily};
use crate::slot::{PrintSlot, SlotId};

fn slot_at(queue: &PrintQueue, family: SheetFamily, index: usize) -> Result<&PrintSlot, QueueError> {
    let slots = queue.slots(family);
    slots.get(index).ok_or(QueueError::SlotOutOfRange {
        family,
        index,
        len: slots.len(),
    })
}

/// Drop the slot at `index` from the category's sequence.
pub fn remove_slot(
    queue: &PrintQueue,
    category: PrintCategory,
    index: usize,
) -> Result<PrintQueue, QueueError> {
    let family = category.family();
    let removed = slot_at(queue, family, index)?.id;
    let next = queue.edit(family, |slots| {
        slots.remove(index);
    });
    debug!(%family, index, slot = %removed, len = next.len(family), "Removed slot");
    Ok(next)
}

/// Insert a copy of the lanyard slot at `index` right after it.
pub fn clone_slot(queue: &PrintQueue, index: usize) -> Result<PrintQueue, QueueError> {
    let copy = slot_at(queue, SheetFamily::Lanyard, index)?.duplicate();
    let next = queue.edit(SheetFamily::Lanyard, |slots| {
        slots.insert(index + 1, copy);
    });
    debug!(index, len = next.len(SheetFamily::Lanyard), "Cloned lanyard slot");
    Ok(next)
}

/// Insert `count` copies of the lanyard slot at `index` right after it.
pub fn insert_copies(
    queue: &PrintQueue,
    index: usize,
    count: usize,
) -> Result<PrintQueue, QueueError> {
    let source = slot_at(queue, SheetFamily::Lanyard, index)?;
    if count == 0 {
        return Ok(queue.clone());
    }
    let copies: Vec<PrintSlot> = (0..count).map(|_| source.duplicate()).collect();
    let next = queue.edit(SheetFamily::Lanyard, |slots| {
        let tail = slots.split_off(index + 1);
        slots.extend(copies);
        slots.extend(tail);
    });
    info!(index, count, len = next.len(SheetFamily::Lanyard), "Inserted lanyard copies");
    Ok(next)
}

/// Bring the lanyard count for the slot at `index` in line with the number
/// of ID-card faces of its order.
///
/// `order_lookup` resolves an order number; an unknown order is a no-op.
/// `folder_file_count` counts the files of the ID-card front folder.
pub fn copy_by_card_file_count<'a, O, F>(
    queue: &PrintQueue,
    index: usize,
    order_lookup: O,
    folder_file_count: F,
) -> Result<PrintQueue, CardCopyError>
where
    O: Fn(&str) -> Option<&'a Order>,
    F: Fn(&Folder) -> usize,
{
    let slot = slot_at(queue, SheetFamily::Lanyard, index)?;
    let Some(order) = order_lookup(&slot.order_number) else {
        debug!(order_number = %slot.order_number, "No order for slot; nothing to copy");
        return Ok(queue.clone());
    };
    let folder = card_front_folder(order).ok_or_else(|| CardCopyError::MissingCardFolder {
        order_number: order.order_number.clone(),
    })?;
    let count = copies_needed(folder_file_count(folder), is_two_sided(order));
    Ok(insert_copies(queue, index, count)?)
}

/// Overwrite the hook color of one lanyard slot. Master status is not
/// checked here; non-master slots accept the change too.
pub fn update_hook_color(
    queue: &PrintQueue,
    slot_id: SlotId,
    color: &str,
) -> Result<PrintQueue, QueueError> {
    let index = queue
        .position(SheetFamily::Lanyard, slot_id)
        .ok_or(QueueError::SlotNotFound(slot_id))?;
    let color = color.to_string();
    Ok(queue.edit(SheetFamily::Lanyard, |slots| {
        slots[index].hook_color = color;
    }))
}

/// Empty the category's sequence. The other family is left alone.
pub fn clear_queue(queue: &PrintQueue, category: PrintCategory) -> PrintQueue {
    let family = category.family();
    info!(%family, dropped = queue.len(family), "Cleared print queue");
    queue.edit(family, Vec::clear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{DesignFile, OrderItem, PrintStatus};

    fn folder(id: &str, name: &str) -> Folder {
        Folder {
            id: id.into(),
            folder_name: name.into(),
            order_number: "SO-42".into(),
        }
    }

    fn lanyard_queue(n: usize) -> PrintQueue {
        let src = folder("F-L", "Lanyard");
        let queue = PrintQueue::new(PrintCategory::Lanyard);
        queue.edit(SheetFamily::Lanyard, |slots| {
            for i in 0..n {
                let file = DesignFile {
                    id: format!("file-{i}"),
                    name: format!("lanyard-{i}.png"),
                    file_url: format!("/files/lanyard-{i}.png"),
                    folder_id: "F-L".into(),
                };
                slots.push(PrintSlot::from_file(&file, &src, i == 0));
            }
        })
    }

    fn order(card_folder: Option<&str>, variant: &str) -> Order {
        let mut folders = vec![folder("F-L", "Lanyard")];
        if let Some(name) = card_folder {
            folders.push(folder("F-C", name));
        }
        Order {
            id: "ORD-42".into(),
            institution_name: "Universitas Contoh".into(),
            order_number: "SO-42".into(),
            status_printed: PrintStatus::NotPrinted,
            order_items: vec![OrderItem {
                item_name: "ID Card".into(),
                variant_name: variant.into(),
                qty: 1,
            }],
            order_upload_folders: folders,
        }
    }

    #[test]
    fn remove_out_of_range_is_an_error() {
        let queue = lanyard_queue(2);
        let err = remove_slot(&queue, PrintCategory::Lanyard, 2).unwrap_err();
        assert_eq!(
            err,
            QueueError::SlotOutOfRange {
                family: SheetFamily::Lanyard,
                index: 2,
                len: 2
            }
        );
    }

    #[test]
    fn clone_of_last_slot_appends() {
        let queue = lanyard_queue(2);
        let next = clone_slot(&queue, 1).unwrap();
        let slots = next.slots(SheetFamily::Lanyard);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2].source_file_id, "file-1");
    }

    #[test]
    fn copy_without_order_is_a_no_op() {
        let queue = lanyard_queue(1);
        let next = copy_by_card_file_count(&queue, 0, |_| None, |_| 5).unwrap();
        assert_eq!(next.slots(SheetFamily::Lanyard), queue.slots(SheetFamily::Lanyard));
    }

    #[test]
    fn copy_without_card_folder_fails_and_leaves_queue() {
        let queue = lanyard_queue(1);
        let orders = [order(None, "1 Sisi")];
        let err = copy_by_card_file_count(
            &queue,
            0,
            |number| orders.iter().find(|o| o.order_number == number),
            |_| 5,
        )
        .unwrap_err();
        assert!(matches!(err, CardCopyError::MissingCardFolder { ref order_number } if order_number == "SO-42"));
        assert_eq!(queue.len(SheetFamily::Lanyard), 1);
    }

    #[test]
    fn copy_counts_the_card_front_folder() {
        let queue = lanyard_queue(1);
        let orders = [order(Some("ID Card Depan"), "2 Sisi")];
        let next = copy_by_card_file_count(
            &queue,
            0,
            |number| orders.iter().find(|o| o.order_number == number),
            |f| if f.id == "F-C" { 3 } else { 99 },
        )
        .unwrap();
        assert_eq!(next.len(SheetFamily::Lanyard), 6);
    }

    #[test]
    fn hook_color_on_non_master_slot_succeeds() {
        let queue = lanyard_queue(2);
        let target = queue.slots(SheetFamily::Lanyard)[1].clone();
        assert!(!target.is_master_color);
        let next = update_hook_color(&queue, target.id, "#00ff00").unwrap();
        assert_eq!(next.slots(SheetFamily::Lanyard)[1].hook_color, "#00ff00");
        assert_ne!(next.slots(SheetFamily::Lanyard)[0].hook_color, "#00ff00");
    }

    #[test]
    fn hook_color_for_unknown_slot_is_an_error() {
        let queue = lanyard_queue(1);
        let missing = SlotId::new();
        assert_eq!(
            update_hook_color(&queue, missing, "#fff").unwrap_err(),
            QueueError::SlotNotFound(missing)
        );
    }

    #[test]
    fn clones_keep_the_color_they_were_copied_with() {
        let queue = lanyard_queue(1);
        let master = queue.slots(SheetFamily::Lanyard)[0].id;
        let queue = update_hook_color(&queue, master, "#123456").unwrap();
        let queue = clone_slot(&queue, 0).unwrap();
        let queue = update_hook_color(&queue, master, "#abcdef").unwrap();
        let slots = queue.slots(SheetFamily::Lanyard);
        assert_eq!(slots[0].hook_color, "#abcdef");
        assert_eq!(slots[1].hook_color, "#123456");
    }

    #[test]
    fn clear_leaves_other_family() {
        let queue = lanyard_queue(3);
        let queue = queue.edit(SheetFamily::IdCard, |slots| {
            slots.push(queue.slots(SheetFamily::Lanyard)[0].duplicate())
        });
        let cleared = clear_queue(&queue, PrintCategory::IdCard);
        assert_eq!(cleared.len(SheetFamily::IdCard), 0);
        assert_eq!(cleared.len(SheetFamily::Lanyard), 3);
    }
}
