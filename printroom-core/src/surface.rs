//! Render surface: the markup of the paginated sheets and the print job that
//! points the host at it.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{LanyardLayout, LayoutConfig};
use crate::contract::{PrintJob, RenderSurface};
use crate::paginate::{layout_sheets, CardCell, LanyardLane, Placement, SheetPage};
use crate::queue::{PrintCategory, PrintQueue, SheetFamily};
use crate::slot::{PrintSlot, DEFAULT_HOOK_COLOR};
use crate::style::stylesheet;

/// Element id of the surface the default implementation renders into.
pub const DEFAULT_SURFACE_ID: &str = "print-surface";

/// What the operator asked to print.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintPayload {
    pub category: PrintCategory,
    pub sheets: Vec<SheetPage>,
    pub title: String,
}

impl PrintPayload {
    /// Sheets of the queue's active category.
    pub fn from_queue(queue: &PrintQueue, layout: &LayoutConfig, title: impl Into<String>) -> Self {
        let category = queue.category();
        Self {
            category,
            sheets: layout_sheets(category.family(), queue.active_slots(), layout),
            title: title.into(),
        }
    }
}

/// Stylesheet, surface reference and title for the host's print call.
pub fn build_print_job<S>(
    category: PrintCategory,
    surface: &S,
    title: &str,
    layout: &LayoutConfig,
) -> PrintJob
where
    S: RenderSurface + ?Sized,
{
    PrintJob {
        stylesheet: stylesheet(category, layout),
        surface_id: surface.surface_id(),
        title: title.to_string(),
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

static CSS_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#[0-9a-fA-F]{3,4}|#[0-9a-fA-F]{6}|#[0-9a-fA-F]{8}|[a-zA-Z]+)$")
        .expect("hook color pattern is valid")
});

/// Hook color as a CSS value: a hex or named color, otherwise the default.
fn hook_color_css(raw: &str) -> &str {
    let color = raw.trim();
    if CSS_COLOR.is_match(color) {
        color
    } else {
        warn!(color = raw, "Unusable hook color; printing the default");
        DEFAULT_HOOK_COLOR
    }
}

/// Markup for the sheets, one block per physical sheet. Layout is carried
/// in inline styles so the markup prints correctly on its own.
pub fn render_sheets(category: PrintCategory, sheets: &[SheetPage], layout: &LayoutConfig) -> String {
    let family = category.family();
    let page = layout.page(family);
    let mut html = String::new();
    for sheet in sheets {
        let class = match family {
            SheetFamily::IdCard => "idcard-sheet",
            SheetFamily::Lanyard => "lanyard-sheet",
        };
        let _ = write!(
            html,
            "<div class=\"sheet {class}\" data-sheet=\"{number}\" style=\"position:relative;overflow:hidden;width:{w:.2}mm;height:{h:.2}mm;\">",
            number = sheet.number,
            w = page.width_mm,
            h = page.height_mm,
        );
        for cell in &sheet.cells {
            match cell.placement {
                Placement::Card(card) => render_card(&mut html, &cell.slot, &card, layout),
                Placement::Lane(lane) => render_lane(&mut html, &cell.slot, &lane, &layout.lanyard),
            }
        }
        html.push_str("</div>");
    }
    html
}

fn render_card(html: &mut String, slot: &PrintSlot, cell: &CardCell, layout: &LayoutConfig) {
    let card = &layout.id_card;
    let _ = write!(
        html,
        "<div class=\"idcard-cell\" data-slot=\"{id}\" style=\"position:absolute;left:{left:.2}mm;top:{top:.2}mm;width:{w:.2}mm;height:{h:.2}mm;transform:translate({dx:.2}mm,{dy:.2}mm);\">\
         <img src=\"{src}\" alt=\"{alt}\" style=\"display:block;width:100%;height:100%;object-fit:cover;\"></div>",
        id = slot.id,
        left = cell.left_mm,
        top = cell.top_mm,
        w = card.card_width_mm,
        h = card.card_height_mm,
        dx = cell.offset_x_mm,
        dy = cell.offset_y_mm,
        src = escape_html(&slot.image_ref),
        alt = escape_html(&slot.file_name),
    );
}

/// Lane: the design strip rotated a quarter turn into the lane, then the
/// fold line, then the hook block.
fn render_lane(html: &mut String, slot: &PrintSlot, lane: &LanyardLane, layout: &LanyardLayout) {
    let _ = write!(
        html,
        "<div class=\"lanyard-lane\" data-slot=\"{id}\" style=\"position:absolute;left:{left:.2}mm;top:{top:.2}mm;width:{w:.2}mm;height:{lane_h:.2}mm;\">\
         <div class=\"lanyard-strip\" style=\"position:relative;overflow:hidden;width:{w:.2}mm;height:{strip:.2}mm;\">\
         <img src=\"{src}\" alt=\"{alt}\" style=\"position:absolute;top:50%;left:50%;width:{strip:.2}mm;height:{w:.2}mm;object-fit:cover;transform:translate(-50%,-50%) rotate(90deg);\"></div>\
         <div class=\"lanyard-fold\" style=\"width:{w:.2}mm;height:{fold:.2}mm;background:#000000;\"></div>\
         <div class=\"lanyard-hook\" style=\"width:{w:.2}mm;height:{hook:.2}mm;background:{color};\"></div></div>",
        id = slot.id,
        left = lane.left_mm,
        top = lane.top_mm,
        w = layout.lane_width_mm,
        lane_h = layout.lane_height_mm(),
        strip = layout.strip_length_mm,
        fold = layout.fold_line_mm,
        hook = layout.hook_height_mm,
        src = escape_html(&slot.image_ref),
        alt = escape_html(&slot.file_name),
        color = hook_color_css(&slot.hook_color),
    );
}

/// Standalone HTML document printing `markup` with the job's stylesheet.
pub fn print_document(job: &PrintJob, markup: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n<div id=\"{id}\">{markup}</div>\n</body>\n</html>\n",
        title = escape_html(&job.title),
        css = job.stylesheet,
        id = escape_html(&job.surface_id),
    )
}

/// In-memory render surface producing the sheet markup itself.
#[derive(Debug)]
pub struct HtmlSurface {
    id: String,
    layout: LayoutConfig,
    markup: RwLock<Option<String>>,
}

impl HtmlSurface {
    pub fn new(layout: LayoutConfig) -> Self {
        Self::with_id(DEFAULT_SURFACE_ID, layout)
    }

    pub fn with_id(id: impl Into<String>, layout: LayoutConfig) -> Self {
        Self {
            id: id.into(),
            layout,
            markup: RwLock::new(None),
        }
    }
}

impl RenderSurface for HtmlSurface {
    fn surface_id(&self) -> String {
        self.id.clone()
    }

    fn show(&self, payload: &PrintPayload) {
        let markup = render_sheets(payload.category, &payload.sheets, &self.layout);
        debug!(surface = %self.id, sheets = payload.sheets.len(), bytes = markup.len(), "Surface rendered");
        *self.markup.write() = Some(markup);
    }

    fn markup(&self) -> Option<String> {
        self.markup.read().clone()
    }
}
