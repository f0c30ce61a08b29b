//! Tests for history stores.

use super::*;
use tempfile::TempDir;

fn loaded(path: PathBuf) -> HistoryStore<String> {
    let mut store = HistoryStore::spawn_load(path);
    store.wait_loaded();
    store
}

fn add_and_wait(store: &mut HistoryStore<String>, value: &str) {
    if let Some(handle) = store.add(value.to_string()) {
        handle.join().unwrap();
    }
}

fn on_disk(path: &Path) -> Vec<String> {
    read_history::<String>(path)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.value)
        .collect()
}

#[test]
fn missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = loaded(dir.path().join("none.json"));

    assert!(store.is_ready());
    assert!(store.is_empty());
}

#[test]
fn additions_are_saved_and_reloaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join(COMMAND_HISTORY_FILE);

    let mut store = loaded(path.clone());
    add_and_wait(&mut store, "goto 100");
    add_and_wait(&mut store, "print $");

    let reloaded = loaded(path);
    let values: Vec<&String> = reloaded.values().collect();
    assert_eq!(values, ["goto 100", "print $"]);
}

#[test]
fn blank_and_repeated_values_are_skipped() {
    let mut store = HistoryStore::<String>::in_memory();

    store.add("set cols=16".to_string());
    store.add("set cols=16".to_string());
    store.add("   ".to_string());
    store.add("beep".to_string());
    store.add("set cols=16".to_string());

    let values: Vec<&String> = store.values().collect();
    assert_eq!(values, ["set cols=16", "beep", "set cols=16"]);
}

#[test]
fn cursor_walks_back_and_forward() {
    let mut store = HistoryStore::<String>::in_memory();
    for v in ["a", "b", "c"] {
        store.add(v.to_string());
    }

    assert_eq!(store.prev().cloned(), Some("c".to_string()));
    assert_eq!(store.prev().cloned(), Some("b".to_string()));
    assert_eq!(store.prev().cloned(), Some("a".to_string()));
    assert_eq!(store.prev(), None);
    assert_eq!(store.next().cloned(), Some("b".to_string()));
    assert_eq!(store.next().cloned(), Some("c".to_string()));
    assert_eq!(store.next(), None);

    store.reset_cursor();
    assert_eq!(store.prev().cloned(), Some("c".to_string()));
}

#[test]
fn concurrent_writers_merge() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(COMMAND_HISTORY_FILE);

    let mut first = loaded(path.clone());
    let mut second = loaded(path.clone());

    add_and_wait(&mut first, "from first");
    add_and_wait(&mut second, "from second");

    let saved = on_disk(&path);
    assert_eq!(saved.len(), 2);
    assert!(saved.contains(&"from first".to_string()));
    assert!(saved.contains(&"from second".to_string()));
}

#[test]
fn saved_history_is_capped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(COMMAND_HISTORY_FILE);
    let existing: Vec<HistoryEntry<String>> = (0..MAX_HISTORY_ENTRIES as i64 + 5)
        .map(|i| HistoryEntry {
            value: format!("print {i}"),
            timestamp: i + 1,
        })
        .collect();
    write_history(&path, &existing).unwrap();

    let mut store = loaded(path.clone());
    add_and_wait(&mut store, "last");

    let saved = on_disk(&path);
    assert_eq!(saved.len(), MAX_HISTORY_ENTRIES);
    assert_eq!(saved.last().map(String::as_str), Some("last"));
}

#[test]
fn corrupt_file_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(COMMAND_HISTORY_FILE);
    fs::write(&path, "not json").unwrap();

    assert!(matches!(
        read_history::<String>(&path),
        Err(HistoryError::Json { .. })
    ));
    let store = loaded(path);
    assert!(store.is_empty());
}

#[test]
fn search_records_keep_their_mode() {
    let dir = TempDir::new().unwrap();
    let mut store = search_history(dir.path());
    store.wait_loaded();

    let record = SearchRecord {
        mode: PatternMode::Text,
        pattern: Pattern::new(b"MZ".to_vec()).unwrap(),
    };
    if let Some(handle) = store.add(record.clone()) {
        handle.join().unwrap();
    }

    let mut reloaded = search_history(dir.path());
    reloaded.wait_loaded();
    assert_eq!(reloaded.prev(), Some(&record));
}

#[test]
fn merge_drops_duplicate_timestamps() {
    let mut entries = vec![
        HistoryEntry {
            value: "b".to_string(),
            timestamp: 2,
        },
        HistoryEntry {
            value: "a".to_string(),
            timestamp: 1,
        },
        HistoryEntry {
            value: "b".to_string(),
            timestamp: 2,
        },
    ];

    sort_dedup_cap(&mut entries, 10);

    let stamps: Vec<i64> = entries.iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, [1, 2]);
}
