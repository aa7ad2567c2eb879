//! Example: Build dork URLs for every enabled engine without opening them.

use std::sync::Arc;

use dorkforge::{storage::MemoryStorage, DorkQuery, Dorker};

fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    // Nothing is persisted: the store lives for this run only
    let dorker = Dorker::new(Arc::new(MemoryStorage::new()));
    dorker.registry().set_engine_enabled("yandex", true)?;

    println!(
        "Enabled engines: {}",
        dorker.registry().enabled_engine_ids().join(", ")
    );

    let query = DorkQuery::new("admin login")
        .include("example.com")
        .exclude("blog.example.com")
        .with_file_type("pdf");

    println!("Building dorks for: {}", query.query);
    println!();

    for built in dorker.preview(&query, &[])? {
        println!("{:<12} {}", built.engine_id, built.url);
    }

    Ok(())
}
