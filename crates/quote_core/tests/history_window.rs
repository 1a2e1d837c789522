use quote_core::HistoryWindow;

#[test]
fn recent_is_most_recent_first() {
    let mut window = HistoryWindow::new(10);
    window.record("first", None);
    window.record("second", None);
    window.record("third", None);

    assert_eq!(window.recent(2), vec!["third", "second"]);
    assert_eq!(window.recent(100), vec!["third", "second", "first"]);
}

#[test]
fn size_never_exceeds_capacity() {
    let mut window = HistoryWindow::new(3);
    for i in 0..20 {
        window.record(format!("quote {i}"), None);
        assert!(window.len() <= window.capacity());
    }
    assert_eq!(window.len(), 3);
}

#[test]
fn fifty_one_records_evict_only_the_first() {
    let mut window = HistoryWindow::new(50);
    let mut evicted = Vec::new();
    for i in 1..=51 {
        if let Some(old) = window.record(format!("quote {i}"), None) {
            evicted.push(old.text);
        }
    }

    assert_eq!(window.len(), 50);
    assert_eq!(evicted, vec!["quote 1"]);
    let texts = window.recent(50);
    assert_eq!(texts.first().map(String::as_str), Some("quote 51"));
    assert!(!texts.contains(&"quote 1".to_string()));
    assert!(texts.contains(&"quote 2".to_string()));
}

#[test]
fn duplicate_texts_are_kept_separately() {
    let mut window = HistoryWindow::new(5);
    window.record("same", None);
    window.record("same", None);

    assert_eq!(window.len(), 2);
    let sequences: Vec<_> = window.records().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![2, 1]);
}

#[test]
fn shrinking_capacity_drops_oldest() {
    let mut window = HistoryWindow::new(5);
    for text in ["a", "b", "c", "d"] {
        window.record(text, Some("2024-01-01T00:00:00Z".to_string()));
    }
    let window = window.with_capacity(2);
    assert_eq!(window.recent(10), vec!["d", "c"]);
}

#[test]
fn zero_capacity_still_keeps_latest() {
    let mut window = HistoryWindow::new(0);
    window.record("a", None);
    window.record("b", None);
    assert_eq!(window.recent(10), vec!["b"]);
}
