/// # printroom CLI
///
/// Command parsing and orchestration for the `printroom` binary. All queue,
/// layout and dispatch logic lives in [`printroom_core`]; this module wires
/// it to the HTTP store and the file-backed print host.
///
/// ## How To Use
/// - From the shell: `printroom --help`.
/// - From tests: build a [`Cli`] and call [`run`].
use crate::http_store::HttpStore;
use crate::load_config::{load_config, CliConfig};
use crate::print_host::FileHost;
use anyhow::Result;
use clap::{Parser, Subcommand};
use printroom_core::contract::{FileStore, Folder, FolderQuery, Order, OrderStore, RenderSurface};
use printroom_core::device::classify;
use printroom_core::orders::{find_order, folder_family, mark_printed, pending_orders};
use printroom_core::style::stylesheet;
use printroom_core::surface::{build_print_job, print_document, HtmlSurface};
use printroom_core::{
    LayoutConfig, PrintCategory, PrintDispatcher, QueueSession, Severity, SheetFamily,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI for printroom: lay out and print ID-card and lanyard sheets.
#[derive(Parser)]
#[clap(
    name = "printroom",
    version,
    about = "Lay out ID-card and lanyard print sheets from dashboard orders"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Where the sheets come from.
#[derive(clap::Args, Debug, Clone)]
pub struct SheetSource {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,
    /// Order number whose upload folders are imported
    #[clap(long)]
    pub order: String,
    /// Print category: idcard, lanyard or prod3
    #[clap(long, default_value = "idcard")]
    pub category: PrintCategory,
    /// Folder ids to import; if omitted, every folder of the order except
    /// those made for the other sheet family
    #[clap(long = "folder")]
    pub folders: Vec<String>,
    /// Copy each master lanyard once per ID-card face of the order
    #[clap(long)]
    pub sync_lanyards: bool,
    /// Document title; defaults to the order number
    #[clap(long)]
    pub title: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the print-media stylesheet of a category
    Stylesheet {
        #[clap(long, default_value = "idcard")]
        category: PrintCategory,
    },
    /// Show which print strategy a user agent gets
    Classify {
        #[clap(long)]
        user_agent: String,
    },
    /// List orders waiting to be printed
    Pending {
        #[clap(long)]
        config: PathBuf,
    },
    /// Import an order's folders and write a standalone print document
    Sheets {
        #[clap(flatten)]
        source: SheetSource,
        /// Output HTML file
        #[clap(long)]
        out: PathBuf,
    },
    /// Import an order's folders and print them for a given device
    Print {
        #[clap(flatten)]
        source: SheetSource,
        /// User agent of the requesting device
        #[clap(long)]
        user_agent: String,
        /// Directory receiving the print documents
        #[clap(long)]
        out_dir: PathBuf,
    },
    /// Mark an order as printed
    MarkPrinted {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        order_id: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Stylesheet { category } => {
            let layout = LayoutConfig::default();
            print!("{}", stylesheet(category, &layout));
            Ok(())
        }
        Commands::Classify { user_agent } => {
            let device = classify(&user_agent);
            tracing::info!(command = "classify", %device, "Classified user agent");
            println!("{device}");
            Ok(())
        }
        Commands::Pending { config } => {
            let config = load_config(config)?;
            let store = HttpStore::from_config(&config.api);
            let orders = pending_orders(&store)
                .await
                .map_err(|e| anyhow::Error::msg(format!("Failed to list orders: {e}")))?;
            for order in &orders {
                println!("{}\t{}\t{}", order.order_number, order.id, order.institution_name);
            }
            Ok(())
        }
        Commands::Sheets { source, out } => {
            let config = load_config(&source.config)?;
            let store = HttpStore::from_config(&config.api);
            let session = build_session(&store, &source).await?;
            let title = source.title.clone().unwrap_or_else(|| source.order.clone());

            let sheets = write_sheets(&session, &config.layout, &title, &out)?;
            tracing::info!(command = "sheets", path = %out.display(), sheets, "Sheets written");
            println!("{sheets} sheet(s) written to {}", out.display());
            Ok(())
        }
        Commands::Print {
            source,
            user_agent,
            out_dir,
        } => {
            let config = load_config(&source.config)?;
            let store = HttpStore::from_config(&config.api);
            let session = build_session(&store, &source).await?;
            let title = source.title.clone().unwrap_or_else(|| source.order.clone());
            for path in print_session(&session, &config, &title, &user_agent, out_dir).await? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::MarkPrinted { config, order_id } => {
            let config = load_config(config)?;
            let store = HttpStore::from_config(&config.api);
            mark_printed(&store, &order_id)
                .await
                .map_err(|e| anyhow::Error::msg(format!("Failed to mark {order_id} printed: {e}")))?;
            println!("order {order_id} marked printed");
            Ok(())
        }
    }
}

/// Folders to import: the requested ids if any were given, otherwise every
/// folder not made for the other sheet family.
pub fn import_targets(folders: Vec<Folder>, requested: &[String], family: SheetFamily) -> Vec<Folder> {
    folders
        .into_iter()
        .filter(|folder| {
            if requested.is_empty() {
                folder_family(folder).map_or(true, |f| f == family)
            } else {
                requested.contains(&folder.id)
            }
        })
        .collect()
}

/// Import the requested folders of the order into a fresh session.
pub async fn build_session<S>(store: &S, source: &SheetSource) -> Result<QueueSession>
where
    S: OrderStore + FileStore + ?Sized,
{
    let order = find_order(store, &source.order)
        .await
        .map_err(|e| anyhow::Error::msg(format!("Failed to look up order {}: {e}", source.order)))?
        .ok_or_else(|| anyhow::anyhow!("Order {} not found", source.order))?;

    let folders = store
        .get_folders(FolderQuery {
            order_number: Some(order.order_number.clone()),
        })
        .await
        .map_err(|e| anyhow::Error::msg(format!("Failed to list folders: {e}")))?;
    let family = source.category.family();
    let folders = import_targets(folders, &source.folders, family);
    if folders.is_empty() {
        anyhow::bail!("No matching folders for order {}", order.order_number);
    }
    tracing::info!(order = %order.order_number, %family, folders = folders.len(), "Importing order folders");

    let session = QueueSession::new(source.category);
    for result in session.import_folders(store, &folders).await {
        if let Err(e) = result {
            report(e.severity(), &e);
        }
    }

    if source.sync_lanyards && family == SheetFamily::Lanyard {
        sync_lanyards(&session, store, &order).await;
    }
    Ok(session)
}

async fn sync_lanyards<S>(session: &QueueSession, store: &S, order: &Order)
where
    S: FileStore + ?Sized,
{
    let masters: Vec<_> = session
        .snapshot()
        .slots(SheetFamily::Lanyard)
        .iter()
        .filter(|slot| slot.is_master_color)
        .map(|slot| slot.id)
        .collect();
    for master in masters {
        match session
            .copy_by_card_file_count(store, master, std::slice::from_ref(order))
            .await
        {
            Ok(added) => tracing::info!(slot = %master, added, "Synchronized lanyard copies"),
            Err(e) => report(e.severity(), &e),
        }
    }
}

/// Write the session's active sheets as one standalone print document.
/// Returns the number of sheets written.
pub fn write_sheets(
    session: &QueueSession,
    layout: &LayoutConfig,
    title: &str,
    out: &Path,
) -> Result<usize> {
    let surface = HtmlSurface::new(layout.clone());
    let payload = session.payload(layout, title);
    surface.show(&payload);
    let job = build_print_job(payload.category, &surface, title, layout);
    let document = print_document(&job, &surface.markup().unwrap_or_default());
    std::fs::write(out, document).map_err(|e| {
        tracing::error!(error = ?e, path = %out.display(), "Failed to write sheets");
        anyhow::anyhow!("Failed to write {}: {e}", out.display())
    })?;
    Ok(payload.sheets.len())
}

/// Print the session's active sheets for `user_agent` into `out_dir`.
/// Returns the documents the host wrote.
pub async fn print_session(
    session: &QueueSession,
    config: &CliConfig,
    title: &str,
    user_agent: &str,
    out_dir: PathBuf,
) -> Result<Vec<PathBuf>> {
    let surface = Arc::new(HtmlSurface::new(config.layout.clone()));
    let host = FileHost::new(out_dir, surface.clone());
    let dispatcher = PrintDispatcher::new(host, surface, config.dispatch.clone(), config.layout.clone());

    let payload = session.payload(&config.layout, title);
    let outcome = dispatcher.prepare_and_print(user_agent, &payload).await;
    if let Some(blocked) = outcome.popup_blocked() {
        report(blocked.severity(), &blocked);
        return Err(blocked.into());
    }
    tracing::info!(command = "print", ?outcome, "Print dispatched");
    Ok(dispatcher.host().written())
}

fn report(severity: Severity, error: &dyn std::error::Error) {
    match severity {
        Severity::Blocking => {
            tracing::error!(error = %error, "Blocking error");
            eprintln!("error: {error}");
        }
        Severity::Notice => {
            tracing::warn!(error = %error, "Notice");
            eprintln!("warning: {error}");
        }
    }
}
