//! # Freshet Quickstart
//!
//! Subscribes to a public JSON endpoint, watches the session move through
//! loading → data, then demonstrates cache hits, optimistic mutation, and
//! signal-driven revalidation.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use std::time::Duration;

use serde_json::{json, Value};

use freshet_client::{FetchClient, FetchConfig, FetchSession};

const URL: &str = "https://httpbin.org/json";

async fn await_settled(session: &FetchSession<Value>) -> bool {
    let mut rx = session.watch();
    loop {
        {
            let state = rx.borrow_and_update();
            if state.data.is_some() {
                return true;
            }
            if let Some(err) = &state.error {
                println!("   ❌ fetch failed: {err}");
                return false;
            }
        }
        if rx.changed().await.is_err() {
            return false;
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("═══════════════════════════════════════════════════════════");
    println!("                    Freshet Quickstart");
    println!("═══════════════════════════════════════════════════════════\n");

    let config = FetchConfig::new()
        .cache_ttl(Duration::from_secs(30))
        .deduping_interval(Duration::from_millis(100))
        .retry_count(2)
        .retry_delay(Duration::from_millis(500));
    let client = FetchClient::with_config(config);

    println!("📋 STEP 1: Subscribe and wait for the first fetch\n");

    let session: FetchSession<Value> = client.subscribe(URL);
    println!("   key:        {}", session.key());
    println!("   loading:    {}", session.is_loading());

    if !await_settled(&session).await {
        return;
    }
    println!("   ✅ data arrived:");
    println!("   └─ {}", session.data().unwrap_or(Value::Null));
    println!();

    println!("📋 STEP 2: A second subscription is served from the cache\n");

    let cached: FetchSession<Value> = client.subscribe(URL);
    await_settled(&cached).await;
    let remaining = client
        .cache()
        .remaining_ttl(session.key())
        .unwrap_or_default();
    println!("   ✅ resolved without a network round trip");
    println!("   └─ entry stays fresh for another {remaining:?}");
    println!();

    println!("📋 STEP 3: Optimistic mutation, no network call\n");

    session.mutate(json!({ "slideshow": { "title": "edited locally" } }));
    println!("   ✅ session data and cache entry overwritten:");
    println!("   └─ {}", session.data().unwrap_or(Value::Null));
    println!();

    println!("📋 STEP 4: Focus regained: stale data shown, refresh behind it\n");

    client.signals().emit_focus();
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("   validating: {}", session.is_validating());
    let mut rx = session.watch();
    while rx.borrow_and_update().is_validating {
        if rx.changed().await.is_err() {
            break;
        }
    }
    println!("   ✅ revalidated:");
    println!("   └─ {}", session.data().unwrap_or(Value::Null));
    println!();

    println!("═══════════════════════════════════════════════════════════");
    println!("Done. Dropping the sessions tears down their listeners.");
}
