//! Device-aware print dispatch.
//!
//! The requesting device picks exactly one of two strategies:
//! - **Desktop**: wait for the surface to settle, then call the host's
//!   native print scoped to the surface.
//! - **Mobile**: wait a little longer, read the surface markup and write it
//!   into a freshly spawned window that prints itself (or offers a button,
//!   if the window finds itself on a mobile browser).
//!
//! Only the mobile branch can fail visibly, with [`PopupBlockedError`]; the
//! outcome type makes that explicit. Everything else is logged and dropped.

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{DispatchConfig, LayoutConfig};
use crate::contract::{PrintHost, RenderSurface};
use crate::device::{classify, DeviceClass, MOBILE_UA_PATTERN};
use crate::error::PopupBlockedError;
use crate::surface::{build_print_job, escape_html, PrintPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopPrint {
    Printed,
    /// Host print failed; logged, nothing else happens.
    HostFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobilePrint {
    /// Print document written into the spawned window.
    WindowSpawned,
    /// Window opened but writing the document failed; logged.
    WriteFailed,
    /// Surface had no markup after settling; nothing was opened.
    SurfaceEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Desktop(DesktopPrint),
    Mobile(Result<MobilePrint, PopupBlockedError>),
}

impl PrintOutcome {
    /// The one failure that must be shown to the operator.
    pub fn popup_blocked(&self) -> Option<PopupBlockedError> {
        match self {
            PrintOutcome::Mobile(Err(e)) => Some(*e),
            _ => None,
        }
    }
}

pub struct PrintDispatcher<H, S> {
    host: H,
    surface: S,
    config: DispatchConfig,
    layout: LayoutConfig,
}

impl<H, S> PrintDispatcher<H, S>
where
    H: PrintHost,
    S: RenderSurface,
{
    pub fn new(host: H, surface: S, config: DispatchConfig, layout: LayoutConfig) -> Self {
        Self {
            host,
            surface,
            config,
            layout,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Show `payload` on the surface and print it the way `user_agent`'s
    /// device can.
    pub async fn prepare_and_print(&self, user_agent: &str, payload: &PrintPayload) -> PrintOutcome {
        self.surface.show(payload);
        let device = classify(user_agent);
        info!(%device, category = %payload.category, sheets = payload.sheets.len(), title = %payload.title, "Dispatching print");

        match device {
            DeviceClass::Mobile => {
                sleep(self.config.mobile_settle()).await;
                match self.surface.markup().filter(|m| !m.trim().is_empty()) {
                    Some(markup) => PrintOutcome::Mobile(self.mobile_print(&markup, &payload.title)),
                    None => {
                        warn!(surface = %self.surface.surface_id(), "Render surface empty after settle; skipping mobile print");
                        PrintOutcome::Mobile(Ok(MobilePrint::SurfaceEmpty))
                    }
                }
            }
            DeviceClass::Desktop => {
                sleep(self.config.desktop_settle()).await;
                let job = build_print_job(payload.category, &self.surface, &payload.title, &self.layout);
                match self.host.print_scoped(&job) {
                    Ok(()) => {
                        info!(surface = %job.surface_id, "Native print invoked");
                        PrintOutcome::Desktop(DesktopPrint::Printed)
                    }
                    Err(e) => {
                        error!(error = %e, surface = %job.surface_id, "Native print failed");
                        PrintOutcome::Desktop(DesktopPrint::HostFailed)
                    }
                }
            }
        }
    }

    /// Spawn a window and write a self-printing document for `markup` into it.
    pub fn mobile_print(&self, markup: &str, title: &str) -> Result<MobilePrint, PopupBlockedError> {
        let Some(mut window) = self.host.open_window() else {
            warn!("Print window blocked by host");
            return Err(PopupBlockedError);
        };
        let document = mobile_document(markup, title, &self.config);
        match window.write_document(&document) {
            Ok(()) => {
                info!(bytes = document.len(), "Print document written to spawned window");
                Ok(MobilePrint::WindowSpawned)
            }
            Err(e) => {
                error!(error = %e, "Failed to write print document to spawned window");
                Ok(MobilePrint::WriteFailed)
            }
        }
    }
}

/// Self-contained document for the spawned window.
///
/// On a desktop browser the window prints itself after the configured delay
/// and closes once the dialog is dismissed. On a mobile browser it shows a
/// floating button instead, since unattended print is unreliable there.
pub fn mobile_document(markup: &str, title: &str, config: &DispatchConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
* {{ -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; color-adjust: exact !important; }}
@page {{ size: A4; margin: 0; }}
html, body {{ margin: 0; padding: 0; }}
.print-fab {{ position: fixed; right: 16px; bottom: 16px; z-index: 9999; padding: 12px 20px; border: 0; border-radius: 24px; background: #1677ff; color: #ffffff; font-size: 16px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.3); }}
@media print {{ .print-fab {{ display: none !important; }} }}
</style>
</head>
<body>
{markup}
<script>
(function () {{
  var mobile = /{pattern}/i.test(navigator.userAgent);
  if (!mobile) {{
    window.onafterprint = function () {{ window.close(); }};
    setTimeout(function () {{ window.print(); }}, {delay});
  }} else {{
    var button = document.createElement('button');
    button.className = 'print-fab';
    button.textContent = 'Print / Save as PDF';
    button.onclick = function () {{ window.print(); }};
    document.body.appendChild(button);
  }}
}})();
</script>
</body>
</html>
"#,
        title = escape_html(title),
        pattern = MOBILE_UA_PATTERN,
        delay = config.auto_print_delay_ms,
    )
}
