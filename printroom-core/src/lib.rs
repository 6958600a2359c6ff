#![doc = "printroom-core: print-production logic for the printroom dashboard."]

//! This crate holds the part of the dashboard that has to be right on paper:
//! the ordered print queue, the sheet layout for ID-card and lanyard sheets,
//! and the device-aware hand-off to the printer.
//!
//! Record screens, sessions and reports live elsewhere; this crate only talks
//! to them through the traits in [`contract`].
//!
//! # Usage
//! - Build a [`session::QueueSession`], import folders into it and apply
//!   mutations through [`session::QueueCommand`]s.
//! - Lay the queue out with [`paginate`] and render it with [`surface`].
//! - Hand the result to a [`dispatch::PrintDispatcher`].

pub mod config;
pub mod contract;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod import;
pub mod mutation;
pub mod orders;
pub mod paginate;
pub mod queue;
pub mod session;
pub mod slot;
pub mod style;
pub mod surface;

pub use config::{DispatchConfig, IdCardLayout, LanyardLayout, LayoutConfig, PrintroomConfig};
pub use error::{CardCopyError, ImportError, PopupBlockedError, QueueError, Severity};
pub use queue::{PrintCategory, PrintQueue, SheetFamily};
pub use dispatch::{DesktopPrint, MobilePrint, PrintDispatcher, PrintOutcome};
pub use session::{QueueCommand, QueueSession, SlotRef};
pub use slot::{PrintSlot, SlotId};
