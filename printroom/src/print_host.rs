//! File-backed print host.
//!
//! Native print writes a standalone document for the scoped surface into the
//! output directory. Each spawned window is a new HTML file there; if the
//! file cannot be created the window counts as blocked.

use parking_lot::Mutex;
use printroom_core::contract::{HostError, PrintHost, PrintJob, PrintWindow, RenderSurface};
use printroom_core::surface::print_document;
use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};

pub struct FileHost<S: ?Sized> {
    out_dir: PathBuf,
    surface: Arc<S>,
    written: Arc<Mutex<Vec<PathBuf>>>,
    windows: AtomicUsize,
}

impl<S: RenderSurface + ?Sized> FileHost<S> {
    pub fn new(out_dir: impl Into<PathBuf>, surface: Arc<S>) -> Self {
        Self {
            out_dir: out_dir.into(),
            surface,
            written: Arc::default(),
            windows: AtomicUsize::new(0),
        }
    }

    /// Documents written so far, in order.
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().clone()
    }
}

impl<S: RenderSurface + ?Sized> PrintHost for FileHost<S> {
    fn print_scoped(&self, job: &PrintJob) -> Result<(), HostError> {
        let markup = self.surface.markup().unwrap_or_default();
        let path = self.out_dir.join(format!("{}.html", job.surface_id));
        fs::create_dir_all(&self.out_dir)?;
        fs::write(&path, print_document(job, &markup)).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to write print document");
            e
        })?;
        info!(path = %path.display(), title = %job.title, "Wrote scoped print document");
        self.written.lock().push(path);
        Ok(())
    }

    fn open_window(&self) -> Option<Box<dyn PrintWindow>> {
        let number = self.windows.fetch_add(1, Ordering::Relaxed) + 1;
        let path = self.out_dir.join(format!("print-window-{number}.html"));
        let file = match fs::create_dir_all(&self.out_dir).and_then(|()| File::create(&path)) {
            Ok(file) => file,
            Err(e) => {
                error!(error = ?e, path = %path.display(), "Could not open print window file");
                return None;
            }
        };
        info!(path = %path.display(), "Opened print window");
        Some(Box::new(FileWindow {
            path,
            file,
            written: self.written.clone(),
        }))
    }
}

struct FileWindow {
    path: PathBuf,
    file: File,
    written: Arc<Mutex<Vec<PathBuf>>>,
}

impl PrintWindow for FileWindow {
    fn write_document(&mut self, html: &str) -> Result<(), HostError> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(html.as_bytes())?;
        self.file.flush()?;
        let mut written = self.written.lock();
        if !written.contains(&self.path) {
            written.push(self.path.clone());
        }
        Ok(())
    }
}
