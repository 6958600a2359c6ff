//! Order rules the print workflow depends on, plus the two order-store calls
//! it makes: listing orders waiting for print and marking one printed.

use tracing::{debug, info};

use crate::contract::{Folder, Order, OrderFilter, OrderStore, PrintStatus, StoreError};
use crate::queue::SheetFamily;

/// Production stages in which an order may have sheets to print.
pub const PRINTABLE_STAGES: [&str; 2] = ["design", "printing"];

/// The upload folder holding the front faces of the order's ID cards.
pub fn card_front_folder(order: &Order) -> Option<&Folder> {
    order.order_upload_folders.iter().find(|folder| {
        let name = folder.folder_name.to_lowercase();
        name.contains("id card") && name.contains("depan")
    })
}

/// Sheet family an upload folder's designs are made for, judged by its name.
pub fn folder_family(folder: &Folder) -> Option<SheetFamily> {
    let name = folder.folder_name.to_lowercase();
    if name.contains("lanyard") {
        Some(SheetFamily::Lanyard)
    } else if name.contains("id card") {
        Some(SheetFamily::IdCard)
    } else {
        None
    }
}

/// True if any line item is the two-sided card variant.
pub fn is_two_sided(order: &Order) -> bool {
    order
        .order_items
        .iter()
        .any(|item| item.variant_name.to_lowercase().contains("2 sisi"))
}

/// Lanyard copies still needed so that every printed card face gets one,
/// given that one lanyard slot already exists.
pub fn copies_needed(card_files: usize, two_sided: bool) -> usize {
    let faces = if two_sided { 2 } else { 1 };
    (card_files * faces).saturating_sub(1)
}

pub fn pending_print_filter() -> OrderFilter {
    OrderFilter {
        order_number: None,
        production_status: PRINTABLE_STAGES.iter().map(|s| s.to_string()).collect(),
        status_printed: Some(PrintStatus::NotPrinted),
    }
}

/// Orders in a printable stage that have not been printed yet.
pub async fn pending_orders<S>(store: &S) -> Result<Vec<Order>, StoreError>
where
    S: OrderStore + ?Sized,
{
    let orders = store.query_orders(pending_print_filter()).await?;
    info!(count = orders.len(), "Fetched orders waiting for print");
    Ok(orders)
}

/// Look up a single order by its order number.
pub async fn find_order<S>(store: &S, order_number: &str) -> Result<Option<Order>, StoreError>
where
    S: OrderStore + ?Sized,
{
    let filter = OrderFilter {
        order_number: Some(order_number.to_string()),
        ..OrderFilter::default()
    };
    let order = store
        .query_orders(filter)
        .await?
        .into_iter()
        .find(|order| order.order_number == order_number);
    debug!(order_number, found = order.is_some(), "Order lookup");
    Ok(order)
}

pub async fn mark_printed<S>(store: &S, order_id: &str) -> Result<(), StoreError>
where
    S: OrderStore + ?Sized,
{
    store
        .update_print_status(order_id.to_string(), PrintStatus::Printed)
        .await?;
    info!(order_id, "Marked order as printed");
    Ok(())
}
