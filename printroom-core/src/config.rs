//! Physical layout table and dispatch timings.
//!
//! The layout numbers are press and paper dimensions. They are kept here so
//! they can change per printer without touching layout code. Every field
//! has a default, so a config file only needs to name what differs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::queue::SheetFamily;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Value for a CSS `@page { size: ... }` rule.
    pub fn css_size(&self) -> String {
        if *self == PageSize::A4 {
            "A4".to_string()
        } else {
            format!("{:.2}mm {:.2}mm", self.width_mm, self.height_mm)
        }
    }
}

/// ID-card sheet: a grid of portrait cards on A4 with press-registration
/// offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCardLayout {
    pub page: PageSize,
    pub columns: usize,
    pub rows: usize,
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    /// Vertical shift added once per row below the first.
    pub row_shift_mm: f32,
    /// Horizontal shift of the outer columns: first column moves by
    /// `-outer_column_shift_mm`, last column by `+outer_column_shift_mm`.
    pub outer_column_shift_mm: f32,
}

impl Default for IdCardLayout {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            columns: 3,
            rows: 3,
            card_width_mm: 54.0,
            card_height_mm: 85.6,
            row_shift_mm: -7.2,
            outer_column_shift_mm: 9.6,
        }
    }
}

impl IdCardLayout {
    pub fn capacity(&self) -> usize {
        (self.columns * self.rows).max(1)
    }

    /// Left/top margin that centers the unshifted grid on the page.
    pub fn grid_origin_mm(&self) -> (f32, f32) {
        let grid_w = self.columns as f32 * self.card_width_mm;
        let grid_h = self.rows as f32 * self.card_height_mm;
        (
            ((self.page.width_mm - grid_w) / 2.0).max(0.0),
            ((self.page.height_mm - grid_h) / 2.0).max(0.0),
        )
    }
}

/// Lanyard sheet: parallel lanes on a narrow, very tall page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanyardLayout {
    pub lanes: usize,
    pub lane_width_mm: f32,
    pub lane_gap_mm: f32,
    pub margin_mm: f32,
    /// Printed length of the design strip.
    pub strip_length_mm: f32,
    pub fold_line_mm: f32,
    pub hook_height_mm: f32,
}

impl Default for LanyardLayout {
    fn default() -> Self {
        Self {
            lanes: 8,
            lane_width_mm: 20.0,
            lane_gap_mm: 5.0,
            margin_mm: 2.5,
            strip_length_mm: 900.0,
            fold_line_mm: 0.5,
            hook_height_mm: 60.0,
        }
    }
}

impl LanyardLayout {
    pub fn capacity(&self) -> usize {
        self.lanes.max(1)
    }

    pub fn lane_height_mm(&self) -> f32 {
        self.strip_length_mm + self.fold_line_mm + self.hook_height_mm
    }

    pub fn page(&self) -> PageSize {
        let lanes = self.capacity() as f32;
        PageSize {
            width_mm: lanes * self.lane_width_mm
                + (lanes - 1.0) * self.lane_gap_mm
                + 2.0 * self.margin_mm,
            height_mm: self.lane_height_mm() + 2.0 * self.margin_mm,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub id_card: IdCardLayout,
    pub lanyard: LanyardLayout,
}

impl LayoutConfig {
    pub fn capacity(&self, family: SheetFamily) -> usize {
        match family {
            SheetFamily::IdCard => self.id_card.capacity(),
            SheetFamily::Lanyard => self.lanyard.capacity(),
        }
    }

    pub fn page(&self, family: SheetFamily) -> PageSize {
        match family {
            SheetFamily::IdCard => self.id_card.page,
            SheetFamily::Lanyard => self.lanyard.page(),
        }
    }
}

/// Settle delays of the print dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Wait before reading the surface on mobile devices.
    pub mobile_settle_ms: u64,
    /// Wait before invoking native print on desktop.
    pub desktop_settle_ms: u64,
    /// Wait inside the spawned window before it prints itself.
    pub auto_print_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mobile_settle_ms: 300,
            desktop_settle_ms: 200,
            auto_print_delay_ms: 500,
        }
    }
}

impl DispatchConfig {
    pub fn mobile_settle(&self) -> Duration {
        Duration::from_millis(self.mobile_settle_ms)
    }

    pub fn desktop_settle(&self) -> Duration {
        Duration::from_millis(self.desktop_settle_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintroomConfig {
    pub layout: LayoutConfig,
    pub dispatch: DispatchConfig,
}

impl PrintroomConfig {
    pub fn trace_loaded(&self) {
        info!(
            idcard_capacity = self.layout.id_card.capacity(),
            lanyard_capacity = self.layout.lanyard.capacity(),
            mobile_settle_ms = self.dispatch.mobile_settle_ms,
            desktop_settle_ms = self.dispatch.desktop_settle_ms,
            "Loaded print configuration"
        );
        debug!(?self, "Print configuration (full debug)");
    }
}
