use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod query;
mod store;

use config::AppConfig;
use domain::order::Address;
use query::{FetchStrategy, OrderQueryService};
use store::{OrderFilter, Page, PgOrderStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering; override with
    // RUST_LOG, e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_query=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order query demo");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to Postgres...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let store = Arc::new(PgOrderStore::new(pool));
    store.init_schema().await?;

    if !store.has_orders().await? {
        seed_demo_data(&store).await?;
    }

    let service = OrderQueryService::new(store, config.batch_chunk_size);
    let filter = OrderFilter::default();

    for strategy in [
        FetchStrategy::RootsOnly,
        FetchStrategy::SingleValuedJoin,
        FetchStrategy::PagedBatch,
        FetchStrategy::FlatProjection,
    ] {
        let page =
            (strategy == FetchStrategy::PagedBatch).then_some(Page { offset: 0, limit: 100 });

        let orders = service.list_orders(strategy, &filter, page).await?;

        tracing::info!(strategy = ?strategy, count = orders.len(), "✅ Strategy returned orders");
        for order in &orders {
            tracing::debug!(order_id = %order.id, total_price = order.total_price(), "Order total");
        }
        println!("--- {strategy:?} ---");
        println!("{}", serde_json::to_string_pretty(&orders)?);
    }

    tracing::info!("🎉 Demo complete");
    Ok(())
}

/// Two buyers with one order each: userA with BookX x1 and BookY x2,
/// userB with BookZ x3.
async fn seed_demo_data(store: &PgOrderStore) -> anyhow::Result<()> {
    tracing::info!("Seeding demo orders");

    let seoul = Address::new("Seoul", "1", "12345");
    let user_a = store.insert_buyer("userA", &seoul).await?;
    let book_x = store.insert_product("BookX", 10_000, 100).await?;
    let book_y = store.insert_product("BookY", 20_000, 200).await?;
    store
        .insert_order(
            user_a,
            &seoul,
            &[(book_x, 10_000, 1), (book_y, 20_000, 2)],
        )
        .await?;

    let busan = Address::new("Busan", "2", "54321");
    let user_b = store.insert_buyer("userB", &busan).await?;
    let book_z = store.insert_product("BookZ", 30_000, 300).await?;
    store
        .insert_order(user_b, &busan, &[(book_z, 30_000, 3)])
        .await?;

    Ok(())
}
