use insta::assert_json_snapshot;
use quickcheck_macros::quickcheck;
use stock_chart_wasm::domain::history::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
use stock_chart_wasm::domain::market_data::StockCode;

fn code(raw: &str) -> StockCode {
    StockCode::new(raw).unwrap()
}

#[test]
fn repeated_code_moves_to_front() {
    let mut history = HistoryStore::default();
    history.record(code("2330"), "TSMC");
    history.record(code("2317"), "Hon Hai");
    history.record(code("2330"), "TSMC");

    assert_eq!(history.codes(), vec!["2330", "2317"]);
    assert_eq!(history.latest().unwrap().name, "TSMC");
}

#[test]
fn latest_name_wins() {
    let mut history = HistoryStore::default();
    history.record(code("0050"), "0050");
    history.record(code("0050"), "Yuanta Taiwan 50");

    assert_eq!(history.len(), 1);
    assert_eq!(history.get(&code("0050")).unwrap().name, "Yuanta Taiwan 50");
}

#[test]
fn oldest_entry_is_evicted() {
    let mut history = HistoryStore::default();
    for n in 0..12 {
        history.record(code(&format!("{}", 1100 + n)), format!("Stock {}", n));
    }

    assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(history.latest().unwrap().code.value(), "1111");
    assert!(history.get(&code("1101")).is_none());
    assert!(history.get(&code("1102")).is_some());
}

#[test]
fn zero_capacity_keeps_one_entry() {
    let mut history = HistoryStore::new(0);
    history.record(code("2330"), "TSMC");
    history.record(code("2317"), "Hon Hai");

    assert_eq!(history.capacity(), 1);
    assert_eq!(history.codes(), vec!["2317"]);
}

#[test]
fn oversized_capacity_is_capped() {
    let mut history = HistoryStore::new(usize::MAX);
    for n in 0..11 {
        history.record(code(&format!("{}", 2300 + n)), "name");
    }

    assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
    assert!(history.get(&code("2300")).is_none());
}

#[test]
fn entries_snapshot() {
    let mut history = HistoryStore::default();
    history.record(code("2330"), "TSMC");
    history.record(code("2317"), "Hon Hai");
    history.record(code("0050.tw"), "0050.TW");

    let entries: Vec<_> = history.entries().collect();
    assert_json_snapshot!("recent_entries", entries);
}

#[quickcheck]
fn history_stays_bounded_and_unique(picks: Vec<u8>, capacity: u8) -> bool {
    let capacity = usize::from(capacity) % DEFAULT_HISTORY_CAPACITY + 1;
    let mut history = HistoryStore::new(capacity);
    for pick in &picks {
        history.record(code(&format!("{}", pick % 16)), "name");
    }

    let codes = history.codes();
    let mut unique = codes.clone();
    unique.sort_unstable();
    unique.dedup();

    let head_ok = match picks.last() {
        Some(last) => codes.first() == Some(&format!("{}", last % 16).as_str()),
        None => codes.is_empty(),
    };
    codes.len() <= capacity && unique.len() == codes.len() && head_ok
}
