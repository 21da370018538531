use chrono::{Duration, NaiveDate};
use junk_journal::datekey::local_date_key;
use junk_journal::stats::{self, FoodTotal};
use junk_journal::{Backend, EntryStore, FileBackend, FoodSuggestions, NewEntry, StoreError};
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_journal_survives_reopen_and_feeds_stats() {
    let dir = tempdir().unwrap();
    {
        let mut store = EntryStore::new(FileBackend::new(dir.path()));
        store.create(NewEntry::new("2024-02-20", "Tea", 100.0)).unwrap();
        store.create(NewEntry::new("2024-03-01", "Pizza", 200.0)).unwrap();
        store.create(NewEntry::new(day(2024, 3, 1), "Pizza", 50.0)).unwrap();
        store.create(NewEntry::new("2024-03-02", "Burger", 100.0)).unwrap();
    }

    let store = EntryStore::new(FileBackend::new(dir.path()));
    let all = store.all();
    assert_eq!(all.len(), 4);
    assert_eq!(store.query_by_date("2024-03-01").len(), 2);

    assert_eq!(stats::latest_month(&all), "2024-03");
    let march = stats::entries_in_month(&all, "2024-03");
    assert_eq!(stats::monthly_total(march.iter().copied()), 350.0);
    assert_eq!(
        stats::top_item(march),
        Some(FoodTotal { name: "Pizza".to_string(), total: 250.0 })
    );

    let comparison = stats::month_over_month_delta(&all, "2024-03").unwrap();
    assert_eq!(comparison.previous_month, "2024-02");
    assert_eq!(comparison.delta, 250.0);
    assert_eq!(comparison.percent_change, Some(250.0));
}

#[test]
fn test_streaks_over_stored_entries() {
    let dir = tempdir().unwrap();
    let mut store = EntryStore::new(FileBackend::new(dir.path()));
    let today = day(2024, 8, 15);
    for back in 0..3 {
        let date = today - Duration::days(back);
        store.create(NewEntry::new(date, "Fries", 60.0)).unwrap();
    }
    store
        .create(NewEntry::new(local_date_key(today - Duration::days(10)), "Fries", 60.0))
        .unwrap();

    let all = store.all();
    assert_eq!(stats::junk_streak(&all, today), 3);
    assert_eq!(stats::no_junk_streak(&all, today), 0);
    assert_eq!(stats::best_no_junk_streak(&all, today), 7);
}

#[test]
fn test_entries_and_suggestions_share_one_quota() {
    let dir = tempdir().unwrap();
    let mut backend = FileBackend::new(dir.path()).with_quota(300);

    let entry = EntryStore::new(&mut backend)
        .create(NewEntry::new("2024-03-01", "Pizza", 200.0))
        .unwrap();
    FoodSuggestions::new(&mut backend).add(&entry.food_name).unwrap();

    let oversized = NewEntry::new("2024-03-02", "Cake", 90.0).with_image("z".repeat(400));
    let result = EntryStore::new(&mut backend).create(oversized);
    assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));

    let store = EntryStore::new(&mut backend);
    assert_eq!(store.all(), vec![entry]);
    assert!(backend.read("junk-journal-food-suggestions").unwrap().is_some());
}
