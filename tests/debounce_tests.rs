use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use spendbook::core::{Debouncer, NewTransaction, Store, search};

#[tokio::test(start_paused = true)]
async fn burst_of_queries_runs_only_the_last() {
    let mut store = Store::default();
    for description in ["Morning coffee run", "Bus fare to town", "Iced latte to go"] {
        store.add(
            NewTransaction {
                description: description.into(),
                amount: 1.0,
                category: "Misc".into(),
                date: "2024-03-15".into(),
            },
            Utc::now(),
        );
    }
    let list = Arc::new(store.list().to_vec());
    let runs: Arc<Mutex<Vec<(String, usize)>>> = Arc::default();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));

    for query in ["c", "co", "cof", "coffee|latte"] {
        let list = Arc::clone(&list);
        let runs = Arc::clone(&runs);
        let query = query.to_string();
        debouncer.schedule(async move {
            let matches = search(&list, &query).iter().filter(|h| h.is_match).count();
            runs.lock().unwrap().push((query, matches));
        });
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    assert!(debouncer.is_pending());
    debouncer.flush().await;

    let runs = runs.lock().unwrap();
    assert_eq!(runs.as_slice(), &[("coffee|latte".to_string(), 2)]);
}
