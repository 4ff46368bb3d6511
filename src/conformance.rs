//! Behavioural checks any [`Store`] implementation should pass.
//!
//! ```ignore
//! #[test]
//! fn my_backend_conforms() {
//!     let store = RecordStore::new(StoreConfig::new(MyDatastore::open()?));
//!     indexed_rust::conformance::run_suite(&store, Level::Advanced);
//! }
//! ```
//!
//! Every check works in a fresh random namespace, so the suite can run
//! against a store that already holds data. Failures panic.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{ListOptions, SortOrder, Store};
use crate::Record;

/// How much of the suite to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Create/read/update/delete.
    Basic,
    /// Basic plus natural, sorted and filtered listings.
    Advanced,
}

/// Timestamp-tracked record used by the suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
pub struct SuiteRecord {
    #[record(namespace)]
    pub namespace: String,
    #[record(id, generated)]
    pub id: String,
    pub label: String,
    #[record(created)]
    pub created_at: i64,
    #[record(updated)]
    pub updated_at: i64,
}

impl SuiteRecord {
    fn in_namespace(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }
}

/// Record without timestamps; sorted listings must refuse it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
pub struct UntrackedRecord {
    #[record(namespace)]
    pub namespace: String,
    pub id: String,
}

/// Run the suite at `level` against `store`.
pub fn run_suite<S: Store>(store: &S, level: Level) {
    check_create_read(store);
    check_update(store);
    check_delete(store);
    check_create_overwrites(store);

    if level == Level::Advanced {
        check_natural_pages(store);
        check_sorted_symmetry(store);
        check_uniform_filter(store);
        check_indexing_unsupported(store);
    }
}

fn fresh_namespace() -> String {
    format!("suite-{}", Uuid::new_v4().simple())
}

fn create_labelled<S: Store>(store: &S, namespace: &str, labels: &[&str]) -> Vec<SuiteRecord> {
    labels
        .iter()
        .map(|label| {
            let mut record = SuiteRecord::in_namespace(namespace);
            record.label = label.to_string();
            store.create(&mut record).expect("create");
            record
        })
        .collect()
}

fn list_all<S: Store>(store: &S, namespace: &str, options: ListOptions<SuiteRecord>) -> Vec<SuiteRecord> {
    let namespace = namespace.to_string();
    store
        .list(move || SuiteRecord::in_namespace(&namespace), options)
        .expect("list")
        .collect::<Result<Vec<_>, _>>()
        .expect("list entries")
}

fn check_create_read<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    let created = create_labelled(store, &namespace, &["alpha"]).remove(0);

    assert!(!created.id.is_empty(), "create assigns an id");
    assert_eq!(created.created_at, created.updated_at, "create stamps created == updated");

    let mut loaded = SuiteRecord::in_namespace(&namespace);
    loaded.id = created.id.clone();
    store.read(&mut loaded).expect("read");
    assert_eq!(loaded, created);
}

fn check_update<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    let mut record = create_labelled(store, &namespace, &["before"]).remove(0);
    let created = record.created_at;
    let previous = record.updated_at;

    record.label = "after".into();
    store.update(&mut record).expect("update");
    assert!(record.updated_at > previous, "updated strictly increases");
    assert_eq!(record.created_at, created, "created is untouched");

    let mut loaded = SuiteRecord::in_namespace(&namespace);
    loaded.id = record.id.clone();
    store.read(&mut loaded).expect("read after update");
    assert_eq!(loaded.label, "after");

    let by_updated = list_all(store, &namespace, ListOptions::new().sort(SortOrder::UpdatedAsc));
    assert_eq!(by_updated.len(), 1, "stale updated index entry was removed");
    assert_eq!(by_updated[0].updated_at, record.updated_at);
}

fn check_delete<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    let record = create_labelled(store, &namespace, &["doomed"]).remove(0);

    store.delete(&record).expect("delete");
    let mut loaded = SuiteRecord::in_namespace(&namespace);
    loaded.id = record.id.clone();
    let err = store.read(&mut loaded).expect_err("read after delete");
    assert!(matches!(err, StoreError::NotFound { .. }), "got {:?}", err);

    store.delete(&record).expect("delete is idempotent");
    assert!(list_all(store, &namespace, ListOptions::new().sort(SortOrder::CreatedAsc)).is_empty());
}

fn check_create_overwrites<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    let first = create_labelled(store, &namespace, &["first"]).remove(0);

    let mut second = SuiteRecord::in_namespace(&namespace);
    second.id = first.id.clone();
    second.label = "second".into();
    store.create(&mut second).expect("create over existing key");

    let mut loaded = SuiteRecord::in_namespace(&namespace);
    loaded.id = first.id.clone();
    store.read(&mut loaded).expect("read");
    assert_eq!(loaded.label, "second", "create overwrites");

    for sort in [SortOrder::CreatedAsc, SortOrder::UpdatedAsc] {
        let listed = list_all(store, &namespace, ListOptions::new().sort(sort));
        assert_eq!(listed.len(), 1, "overwrite leaves one {:?} entry", sort);
    }
}

fn check_natural_pages<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    create_labelled(store, &namespace, &["a", "b", "c", "d", "e"]);

    let everything = list_all(store, &namespace, ListOptions::new());
    assert_eq!(everything.len(), 5);

    let mut paged = Vec::new();
    for page in 0..3 {
        paged.extend(list_all(store, &namespace, ListOptions::new().page(page).limit(2)));
    }
    assert_eq!(paged, everything, "pages partition the natural order");
    assert!(list_all(store, &namespace, ListOptions::new().page(5).limit(2)).is_empty());
}

fn check_sorted_symmetry<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    create_labelled(store, &namespace, &["a", "b", "c", "d"]);

    for (asc, desc) in [
        (SortOrder::CreatedAsc, SortOrder::CreatedDesc),
        (SortOrder::UpdatedAsc, SortOrder::UpdatedDesc),
    ] {
        let ascending = list_all(store, &namespace, ListOptions::new().sort(asc));
        let mut descending = list_all(store, &namespace, ListOptions::new().sort(desc));
        assert_eq!(ascending.len(), 4);
        assert!(ascending.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        descending.reverse();
        assert_eq!(ascending, descending, "{:?} is the reverse of {:?}", desc, asc);
    }
}

fn check_uniform_filter<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    create_labelled(store, &namespace, &["keep", "drop", "keep", "drop", "keep"]);

    for sort in [
        SortOrder::Natural,
        SortOrder::CreatedAsc,
        SortOrder::CreatedDesc,
        SortOrder::UpdatedAsc,
        SortOrder::UpdatedDesc,
    ] {
        let kept = list_all(
            store,
            &namespace,
            ListOptions::new()
                .sort(sort)
                .limit(2)
                .filter(|r: &SuiteRecord| r.label == "keep"),
        );
        assert_eq!(kept.len(), 2, "filter then limit under {:?}", sort);
        assert!(kept.iter().all(|r| r.label == "keep"));
    }
}

fn check_indexing_unsupported<S: Store>(store: &S) {
    let namespace = fresh_namespace();
    for sort in [
        SortOrder::CreatedAsc,
        SortOrder::CreatedDesc,
        SortOrder::UpdatedAsc,
        SortOrder::UpdatedDesc,
    ] {
        let ns = namespace.clone();
        let result = store.list(
            move || UntrackedRecord {
                namespace: ns.clone(),
                ..Default::default()
            },
            ListOptions::new().sort(sort),
        );
        assert!(
            matches!(result, Err(StoreError::IndexingUnsupported { .. })),
            "sorted listing of untracked records must fail"
        );
    }
}
