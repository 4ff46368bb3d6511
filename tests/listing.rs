//! Integration tests for natural, sorted and filtered listings.

mod support;

use indexed_rust::conformance::{run_suite, Level};
use indexed_rust::key::{index_key, primary_key, IndexKind};
use indexed_rust::{Datastore, ListOptions, RecordStore, SortOrder, Store, StoreError};
use proptest::prelude::*;
use support::{store_at, File, Item, Note};

fn list_items<D: Datastore>(
    store: &RecordStore<D>,
    namespace: &str,
    options: ListOptions<Item>,
) -> Vec<Item> {
    let namespace = namespace.to_string();
    store
        .list(move || Item::new(&namespace, ""), options)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn created_order_scenario() {
    let (store, clock) = store_at(1_000);

    store.create(&mut Item::new("X", "A")).unwrap();
    clock.advance(1);
    store.create(&mut Item::new("X", "B")).unwrap();
    store.create(&mut Item::new("Y", "C")).unwrap();

    let asc = list_items(
        &store,
        "X",
        ListOptions::new().sort(SortOrder::CreatedAsc).limit(10).page(0),
    );
    assert_eq!(ids(&asc), vec!["A", "B"]);
    assert_eq!(asc[0].created, 1_000);
    assert_eq!(asc[1].created, 1_001);

    let desc = list_items(
        &store,
        "X",
        ListOptions::new().sort(SortOrder::CreatedDesc).limit(1).page(0),
    );
    assert_eq!(ids(&desc), vec!["B"]);
}

#[test]
fn descending_is_exact_reverse_of_ascending() {
    let (store, clock) = store_at(0);

    // Two records per second exercise the id tie-break.
    for i in 0..10 {
        if i % 2 == 0 {
            clock.advance(1);
        }
        store.create(&mut Item::new("ns", &format!("item-{}", i))).unwrap();
    }

    let asc = list_items(&store, "ns", ListOptions::new().sort(SortOrder::CreatedAsc));
    let mut desc = list_items(&store, "ns", ListOptions::new().sort(SortOrder::CreatedDesc));
    assert_eq!(asc.len(), 10);
    assert!(asc.windows(2).all(|w| w[0].created <= w[1].created));

    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn updated_order_follows_latest_update() {
    let (store, clock) = store_at(10);

    let mut a = Item::new("ns", "a");
    store.create(&mut a).unwrap();
    clock.advance(1);
    store.create(&mut Item::new("ns", "b")).unwrap();
    clock.advance(1);
    store.create(&mut Item::new("ns", "c")).unwrap();

    clock.advance(1);
    store.update(&mut a).unwrap();

    let asc = list_items(&store, "ns", ListOptions::new().sort(SortOrder::UpdatedAsc));
    assert_eq!(ids(&asc), vec!["b", "c", "a"]);
    let desc = list_items(&store, "ns", ListOptions::new().sort(SortOrder::UpdatedDesc));
    assert_eq!(ids(&desc), vec!["a", "c", "b"]);

    // Created order is unaffected by the update.
    let created = list_items(&store, "ns", ListOptions::new().sort(SortOrder::CreatedAsc));
    assert_eq!(ids(&created), vec!["a", "b", "c"]);
}

#[test]
fn natural_listing_pages_and_isolates_namespaces() {
    let (store, _clock) = store_at(1);
    for id in ["e", "a", "d", "b", "c"] {
        store.create(&mut Item::new("mine", id)).unwrap();
    }
    for id in ["z", "y"] {
        store.create(&mut Item::new("other", id)).unwrap();
    }

    let all = list_items(&store, "mine", ListOptions::new());
    assert_eq!(ids(&all), vec!["a", "b", "c", "d", "e"]);
    assert!(all.iter().all(|i| i.namespace == "mine"));

    let page1 = list_items(&store, "mine", ListOptions::new().limit(2).page(1));
    assert_eq!(ids(&page1), vec!["c", "d"]);
    let last = list_items(&store, "mine", ListOptions::new().limit(2).page(2));
    assert_eq!(ids(&last), vec!["e"]);
    assert!(list_items(&store, "mine", ListOptions::new().limit(2).page(3)).is_empty());
}

#[test]
fn zero_limit_lists_nothing() {
    let (store, _clock) = store_at(1);
    store.create(&mut Item::new("ns", "1")).unwrap();

    assert!(list_items(&store, "ns", ListOptions::new().limit(0)).is_empty());
    assert!(list_items(&store, "ns", ListOptions::new().limit(0).sort(SortOrder::CreatedAsc)).is_empty());
}

#[test]
fn filter_applies_uniformly_before_paging() {
    let (store, clock) = store_at(1);
    for (i, tag) in ["red", "blue", "red", "red", "blue", "red"].iter().enumerate() {
        clock.advance(1);
        store
            .create(&mut Item::tagged("ns", &format!("{}", i), tag))
            .unwrap();
    }

    let red = |item: &Item| item.tag == "red";
    let natural = list_items(&store, "ns", ListOptions::new().filter(red).limit(2).page(1));
    assert_eq!(ids(&natural), vec!["3", "5"]);

    let asc = list_items(
        &store,
        "ns",
        ListOptions::new().sort(SortOrder::CreatedAsc).filter(red).limit(2).page(1),
    );
    assert_eq!(ids(&asc), vec!["3", "5"]);

    let desc = list_items(
        &store,
        "ns",
        ListOptions::new().sort(SortOrder::UpdatedDesc).filter(red).limit(3),
    );
    assert_eq!(ids(&desc), vec!["5", "3", "2"]);
}

#[test]
fn sorted_listing_requires_timestamps() {
    let (store, _clock) = store_at(1);
    store
        .create(&mut Note {
            id: "n".into(),
            body: "text".into(),
        })
        .unwrap();

    let natural: Vec<Note> = store
        .list(Note::default, ListOptions::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(natural.len(), 1);

    for sort in [
        SortOrder::CreatedAsc,
        SortOrder::CreatedDesc,
        SortOrder::UpdatedAsc,
        SortOrder::UpdatedDesc,
    ] {
        let err = store.list(Note::default, ListOptions::new().sort(sort)).err();
        assert_eq!(
            err,
            Some(StoreError::IndexingUnsupported {
                namespace: "notes".into()
            })
        );
    }
}

#[test]
fn deleted_records_drop_out_of_listings() {
    let (store, clock) = store_at(1);
    let mut doomed = File::named("doomed");
    store.create(&mut doomed).unwrap();
    clock.advance(1);
    store.create(&mut File::named("kept")).unwrap();

    store.delete(&doomed).unwrap();
    let mut reread = File::with_id(&doomed.id);
    assert!(store.read(&mut reread).unwrap_err().is_not_found());

    let listed: Vec<File> = store
        .list(File::default, ListOptions::new().sort(SortOrder::CreatedAsc))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "kept");
    assert!(listed.iter().all(|f| f.id != doomed.id));
}

#[test]
fn orphaned_index_entries_are_skipped_without_using_the_limit() {
    let (store, clock) = store_at(1);
    for id in ["a", "b", "c", "d"] {
        clock.advance(1);
        store.create(&mut Item::new("ns", id)).unwrap();
    }

    // Remove primaries behind the store's back, leaving their index entries.
    let ds = store.datastore();
    ds.delete(&primary_key("ns", "a")).unwrap();
    ds.delete(&primary_key("ns", "c")).unwrap();
    assert!(ds.has(&index_key("ns", IndexKind::Created, 2, "a")).unwrap());

    let listed = list_items(&store, "ns", ListOptions::new().sort(SortOrder::CreatedAsc).limit(2));
    assert_eq!(ids(&listed), vec!["b", "d"]);
}

#[test]
fn records_deleted_mid_listing_are_skipped() {
    let (store, clock) = store_at(1);
    for id in ["a", "b", "c"] {
        clock.advance(1);
        store.create(&mut Item::new("ns", id)).unwrap();
    }

    let mut listing = store
        .list(
            || Item::new("ns", ""),
            ListOptions::new().sort(SortOrder::CreatedAsc),
        )
        .unwrap();
    let first = listing.next().unwrap().unwrap();
    assert_eq!(first.id, "a");

    let mut b = Item::new("ns", "b");
    store.read(&mut b).unwrap();
    store.delete(&b).unwrap();

    let rest: Vec<Item> = listing.collect::<Result<_, _>>().unwrap();
    assert_eq!(ids(&rest), vec!["c"]);
}

#[test]
fn manual_clock_store_passes_conformance_suite() {
    let (store, _clock) = store_at(1_700_000_000);
    run_suite(&store, Level::Advanced);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn natural_pages_are_slices_of_the_full_listing(
        count in 0usize..15,
        limit in 1usize..6,
        page in 0usize..6,
    ) {
        let (store, _clock) = store_at(1);
        for i in 0..count {
            store.create(&mut Item::new("ns", &format!("{:03}", i))).unwrap();
        }

        let all = list_items(&store, "ns", ListOptions::new().limit(usize::MAX));
        let paged = list_items(&store, "ns", ListOptions::new().limit(limit).page(page));

        let start = (page * limit).min(count);
        let end = ((page + 1) * limit).min(count);
        prop_assert_eq!(&paged[..], &all[start..end]);
    }
}
