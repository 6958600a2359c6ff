//! Print-media stylesheets per category.

use crate::config::LayoutConfig;
use crate::queue::{PrintCategory, SheetFamily};

const COLOR_EXACT: &str = "-webkit-print-color-adjust: exact !important; \
print-color-adjust: exact !important; color-adjust: exact !important;";

/// The `@media print` stylesheet for `category`.
pub fn stylesheet(category: PrintCategory, layout: &LayoutConfig) -> String {
    match category.family() {
        SheetFamily::IdCard => id_card_stylesheet(layout),
        SheetFamily::Lanyard => lanyard_stylesheet(layout),
    }
}

fn id_card_stylesheet(layout: &LayoutConfig) -> String {
    format!(
        "@media print {{\n\
         \x20 @page {{ size: {size}; margin: 0; }}\n\
         \x20 html, body {{ margin: 0; padding: 0; }}\n\
         \x20 * {{ {COLOR_EXACT} }}\n\
         \x20 .idcard-sheet {{ page-break-after: always; break-after: page; }}\n\
         \x20 .idcard-sheet:last-child {{ page-break-after: auto; break-after: auto; }}\n\
         }}\n",
        size = layout.id_card.page.css_size(),
    )
}

fn lanyard_stylesheet(layout: &LayoutConfig) -> String {
    format!(
        "@media print {{\n\
         \x20 @page {{ size: {size}; margin: 0; }}\n\
         \x20 html, body {{ margin: 0; padding: 0; }}\n\
         \x20 * {{ {COLOR_EXACT} }}\n\
         \x20 button, input, select, textarea, nav, .no-print {{ display: none !important; }}\n\
         \x20 .lanyard-sheet {{ page-break-after: always; break-after: page; }}\n\
         \x20 .lanyard-sheet:last-child {{ page-break-after: auto; break-after: auto; }}\n\
         }}\n",
        size = layout.lanyard.page().css_size(),
    )
}
