use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use printroom_core::contract::{
    DesignFile, FileQuery, FileStore, Folder, FolderQuery, MockFileStore, Order, OrderItem,
    PrintStatus, StoreError,
};
use printroom_core::{
    CardCopyError, ImportError, PrintCategory, QueueCommand, QueueSession, Severity, SheetFamily,
};

fn folder(id: &str, name: &str) -> Folder {
    Folder {
        id: id.to_string(),
        folder_name: name.to_string(),
        order_number: "SO-7".to_string(),
    }
}

fn files(folder_id: &str, n: usize) -> Vec<DesignFile> {
    (0..n)
        .map(|i| DesignFile {
            id: format!("{folder_id}-{i}"),
            name: format!("{folder_id}-{i}.png"),
            file_url: format!("https://files.example/{folder_id}/{i}.png"),
            folder_id: folder_id.to_string(),
        })
        .collect()
}

/// File store whose listings only resolve once the test opens their gate.
struct GatedStore {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    listings: HashMap<String, Vec<DesignFile>>,
}

impl GatedStore {
    fn new(listings: &[(&str, usize)]) -> (Self, HashMap<String, oneshot::Sender<()>>) {
        let mut gates = HashMap::new();
        let mut senders = HashMap::new();
        for (id, _) in listings {
            let (tx, rx) = oneshot::channel();
            gates.insert(id.to_string(), rx);
            senders.insert(id.to_string(), tx);
        }
        let store = Self {
            gates: Mutex::new(gates),
            listings: listings
                .iter()
                .map(|(id, n)| (id.to_string(), files(id, *n)))
                .collect(),
        };
        (store, senders)
    }
}

#[async_trait]
impl FileStore for GatedStore {
    async fn get_folders(&self, _query: FolderQuery) -> Result<Vec<Folder>, StoreError> {
        Ok(vec![])
    }

    async fn get_files(&self, query: FileQuery) -> Result<Vec<DesignFile>, StoreError> {
        let gate = self.gates.lock().remove(&query.folder_id);
        if let Some(gate) = gate {
            gate.await?;
        }
        Ok(self
            .listings
            .get(&query.folder_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn sources(session: &QueueSession, family: SheetFamily) -> Vec<String> {
    session
        .snapshot()
        .slots(family)
        .iter()
        .map(|s| s.source_file_id.clone())
        .collect()
}

#[tokio::test]
async fn imports_resolving_in_reverse_order_both_land() {
    let session = QueueSession::new(PrintCategory::Lanyard);
    let (store, mut gates) = GatedStore::new(&[("A", 2), ("B", 3)]);
    let gate_a = gates.remove("A").unwrap();
    let gate_b = gates.remove("B").unwrap();
    let (folder_a, folder_b) = (folder("A", "Lanyard A"), folder("B", "Lanyard B"));

    let release = async {
        gate_b.send(()).unwrap();
        while session.snapshot().len(SheetFamily::Lanyard) == 0 {
            tokio::task::yield_now().await;
        }
        gate_a.send(()).unwrap();
    };

    let (a, b, ()) = tokio::join!(
        session.import_folder(&store, &folder_a),
        session.import_folder(&store, &folder_b),
        release
    );
    assert_eq!(a.unwrap(), 2);
    assert_eq!(b.unwrap(), 3);
    assert_eq!(
        sources(&session, SheetFamily::Lanyard),
        ["B-0", "B-1", "B-2", "A-0", "A-1"]
    );
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn import_lands_in_the_category_active_when_it_started() {
    let session = QueueSession::new(PrintCategory::Lanyard);
    let (store, mut gates) = GatedStore::new(&[("A", 2)]);
    let gate = gates.remove("A").unwrap();
    let target = folder("A", "Lanyard A");

    let switch = async {
        tokio::task::yield_now().await;
        session.select_category(PrintCategory::IdCard);
        gate.send(()).unwrap();
    };
    let (added, ()) = tokio::join!(session.import_folder(&store, &target), switch);

    assert_eq!(added.unwrap(), 2);
    assert_eq!(session.category(), PrintCategory::IdCard);
    assert_eq!(session.snapshot().len(SheetFamily::Lanyard), 2);
    assert_eq!(session.snapshot().len(SheetFamily::IdCard), 0);
}

#[tokio::test]
async fn batch_import_reports_empty_folders_individually() {
    let session = QueueSession::new(PrintCategory::IdCard);
    let mut store = MockFileStore::new();
    store.expect_get_files().returning(|query| match query.folder_id.as_str() {
        "EMPTY" => Ok(vec![]),
        "DOWN" => Err("503 Service Unavailable".into()),
        other => Ok(files(other, 4)),
    });
    let folders = [
        folder("A", "ID Card Depan"),
        folder("EMPTY", "ID Card Belakang"),
        folder("DOWN", "Desain"),
    ];

    let results = session.import_folders(&store, &folders).await;
    assert_eq!(results.len(), 3);
    assert_eq!(*results[0].as_ref().unwrap(), 4);

    let empty = results[1].as_ref().unwrap_err();
    assert!(matches!(empty, ImportError::EmptyFolder { folder_name, .. } if folder_name == "ID Card Belakang"));
    assert_eq!(empty.severity(), Severity::Blocking);
    assert_eq!(results[2].as_ref().unwrap_err().severity(), Severity::Notice);

    assert_eq!(session.snapshot().len(SheetFamily::IdCard), 4);
    assert_eq!(session.history().len(), 1);
}

fn order(folders: Vec<Folder>, variant: &str) -> Order {
    Order {
        id: "ORD-7".to_string(),
        institution_name: "Politeknik Contoh".to_string(),
        order_number: "SO-7".to_string(),
        status_printed: PrintStatus::NotPrinted,
        order_items: vec![OrderItem {
            item_name: "Paket ID Card + Lanyard".to_string(),
            variant_name: variant.to_string(),
            qty: 1,
        }],
        order_upload_folders: folders,
    }
}

async fn lanyard_session() -> QueueSession {
    let session = QueueSession::new(PrintCategory::Lanyard);
    let mut store = MockFileStore::new();
    store
        .expect_get_files()
        .returning(|_| Ok(files("LAN", 2)));
    session
        .import_folder(&store, &folder("LAN", "Lanyard"))
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn async_copy_inserts_after_the_source() {
    let session = lanyard_session().await;
    let master = session.snapshot().slots(SheetFamily::Lanyard)[0].id;
    let orders = [order(
        vec![folder("LAN", "Lanyard"), folder("CARD", "id card DEPAN")],
        "ID Card 2 Sisi",
    )];

    let mut store = MockFileStore::new();
    store
        .expect_get_files()
        .withf(|q| q.folder_id == "CARD")
        .times(1)
        .returning(|_| Ok(files("CARD", 3)));

    let added = session
        .copy_by_card_file_count(&store, master, &orders)
        .await
        .unwrap();
    assert_eq!(added, 5);
    assert_eq!(
        sources(&session, SheetFamily::Lanyard),
        ["LAN-0", "LAN-0", "LAN-0", "LAN-0", "LAN-0", "LAN-0", "LAN-1"]
    );
}

#[tokio::test]
async fn async_copy_without_card_folder_is_a_notice() {
    let session = lanyard_session().await;
    let master = session.snapshot().slots(SheetFamily::Lanyard)[0].id;
    let orders = [order(vec![folder("LAN", "Lanyard")], "1 Sisi")];
    let store = MockFileStore::new();

    let err = session
        .copy_by_card_file_count(&store, master, &orders)
        .await
        .unwrap_err();
    assert!(matches!(err, CardCopyError::MissingCardFolder { .. }));
    assert_eq!(err.severity(), Severity::Notice);
    assert_eq!(session.snapshot().len(SheetFamily::Lanyard), 2);
}

#[tokio::test]
async fn async_copy_for_unknown_order_is_a_no_op() {
    let session = lanyard_session().await;
    let master = session.snapshot().slots(SheetFamily::Lanyard)[0].id;
    let store = MockFileStore::new();
    let added = session
        .copy_by_card_file_count(&store, master, &[])
        .await
        .unwrap();
    assert_eq!(added, 0);
    assert_eq!(session.snapshot().len(SheetFamily::Lanyard), 2);
}

#[tokio::test]
async fn async_copy_follows_the_source_after_concurrent_edits() {
    let session = lanyard_session().await;
    let second = session.snapshot().slots(SheetFamily::Lanyard)[1].id;
    let orders = [order(vec![folder("CARD", "ID Card Depan")], "1 Sisi")];
    let (store, mut gates) = GatedStore::new(&[("CARD", 3)]);
    let gate = gates.remove("CARD").unwrap();

    let edit = async {
        tokio::task::yield_now().await;
        session
            .dispatch(QueueCommand::Remove {
                category: PrintCategory::Lanyard,
                index: 0,
            })
            .unwrap();
        gate.send(()).unwrap();
    };
    let (added, ()) = tokio::join!(session.copy_by_card_file_count(&store, second, &orders), edit);

    assert_eq!(added.unwrap(), 2);
    assert_eq!(sources(&session, SheetFamily::Lanyard), ["LAN-1", "LAN-1", "LAN-1"]);
}

#[tokio::test]
async fn async_copy_of_a_removed_slot_does_nothing() {
    let session = lanyard_session().await;
    let first = session.snapshot().slots(SheetFamily::Lanyard)[0].id;
    let orders = [order(vec![folder("CARD", "ID Card Depan")], "1 Sisi")];
    let (store, mut gates) = GatedStore::new(&[("CARD", 4)]);
    let gate = gates.remove("CARD").unwrap();

    let edit = async {
        tokio::task::yield_now().await;
        session
            .dispatch(QueueCommand::Remove {
                category: PrintCategory::Lanyard,
                index: 0,
            })
            .unwrap();
        gate.send(()).unwrap();
    };
    let (added, ()) = tokio::join!(session.copy_by_card_file_count(&store, first, &orders), edit);

    assert_eq!(added.unwrap(), 0);
    assert_eq!(sources(&session, SheetFamily::Lanyard), ["LAN-1"]);
}
