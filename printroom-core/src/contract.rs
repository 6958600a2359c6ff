//! # contract: collaborators the print-production core talks to
//!
//! Orders, upload folders and design files are owned by the dashboard
//! backend. The render surface and the print host are owned by whatever
//! environment shows the sheets to the operator. This module declares the
//! read/write contracts the core consumes and the plain data crossing them.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`. With the `test-export-mocks`
//!   feature (on by default) downstream crates get `MockOrderStore`,
//!   `MockFileStore`, `MockRenderSurface`, `MockPrintHost` and
//!   `MockPrintWindow` as well.
//!
//! ## Errors
//! - Store and host failures are boxed trait objects. The core never
//!   inspects them, it only logs them and leaves the queue as it was.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::surface::PrintPayload;

/// Error type for the order/folder/file stores.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for host print primitives.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Whether an order's design work has been sent to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintStatus {
    #[default]
    NotPrinted,
    Printed,
}

impl PrintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintStatus::NotPrinted => "not_printed",
            PrintStatus::Printed => "printed",
        }
    }
}

/// One line item of an order. Only the variant name matters to the core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub variant_name: String,
    #[serde(default)]
    pub qty: u32,
}

/// An upload folder holding the design files of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub folder_name: String,
    #[serde(default)]
    pub order_number: String,
}

/// A design file stored in an upload folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignFile {
    pub id: String,
    pub name: String,
    pub file_url: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub institution_name: String,
    pub order_number: String,
    #[serde(default)]
    pub status_printed: PrintStatus,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub order_upload_folders: Vec<Folder>,
}

/// Filter passed to [`OrderStore::query_orders`]. Empty fields do not filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub order_number: Option<String>,
    pub production_status: Vec<String>,
    pub status_printed: Option<PrintStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderQuery {
    pub order_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub folder_id: String,
}

/// Request handed to the host's native print function.
///
/// The host must print only the surface named by `surface_id`, styled with
/// `stylesheet`, under `title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub stylesheet: String,
    pub surface_id: String,
    pub title: String,
}

/// Read/write access to orders.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// List orders matching `filter`.
    async fn query_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Set the order's `status_printed` field.
    async fn update_print_status(
        &self,
        order_id: String,
        status: PrintStatus,
    ) -> Result<(), StoreError>;
}

/// Read access to upload folders and the files inside them.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn get_folders(&self, query: FolderQuery) -> Result<Vec<Folder>, StoreError>;

    async fn get_files(&self, query: FileQuery) -> Result<Vec<DesignFile>, StoreError>;
}

/// The element that displays the paginated sheets.
///
/// Implementations use interior mutability: the dispatcher only holds a
/// shared reference.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait RenderSurface: Send + Sync {
    /// Identifier the host print function is scoped to.
    fn surface_id(&self) -> String;

    /// Make the surface reflect `payload`.
    fn show(&self, payload: &PrintPayload);

    /// Current markup of the surface, if it has rendered anything.
    fn markup(&self) -> Option<String>;
}

/// A surface shared with the host that prints it.
impl<S: RenderSurface + ?Sized> RenderSurface for std::sync::Arc<S> {
    fn surface_id(&self) -> String {
        (**self).surface_id()
    }

    fn show(&self, payload: &PrintPayload) {
        (**self).show(payload)
    }

    fn markup(&self) -> Option<String> {
        (**self).markup()
    }
}

/// A spawned top-level window.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait PrintWindow: Send {
    /// Replace the window's document with `html`.
    fn write_document(&mut self, html: &str) -> Result<(), HostError>;
}

/// Native print primitives of the environment.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait PrintHost: Send + Sync {
    /// Invoke native print for a single surface.
    fn print_scoped(&self, job: &PrintJob) -> Result<(), HostError>;

    /// Open a new top-level window. `None` means the host blocked it.
    fn open_window(&self) -> Option<Box<dyn PrintWindow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_deserialises_with_missing_optional_fields() {
        let raw = r#"{
            "id": "ORD-0001",
            "order_number": "SO-2024-118",
            "order_items": [{"variant_name": "ID Card 2 Sisi"}],
            "order_upload_folders": [{"id": "F1", "folder_name": "ID Card Depan"}]
        }"#;
        let order: Order = serde_json::from_str(raw).expect("order should parse");
        assert_eq!(order.status_printed, PrintStatus::NotPrinted);
        assert_eq!(order.institution_name, "");
        assert_eq!(order.order_items[0].qty, 0);
        assert_eq!(order.order_upload_folders[0].order_number, "");
    }

    #[test]
    fn print_status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&PrintStatus::NotPrinted).unwrap();
        assert_eq!(json, "\"not_printed\"");
        assert_eq!(PrintStatus::Printed.as_str(), "printed");
    }
}
