//! Demo datasets and their adapter wiring.
//!
//! Each dataset stands in for one storage technology of the full demo
//! deployment: a column-family store for world GDP, a document store for
//! European population, a key-value store for population density, and a
//! relational store (behind both a blocking and a non-blocking driver) for
//! US district sales. The numbers are small representative samples; the
//! shapes and latencies are what matter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::io_pool::IoPool;
use crate::repository::{BlockingRepository, MemoryRepository};
use crate::router::StoreRouter;

fn world_gdp() -> HashMap<String, f64> {
    [
        ("US", 20494.1),
        ("DE", 3996.76),
        ("GB", 2825.21),
        ("FR", 2777.54),
        ("UA", 130.83),
        ("PL", 585.78),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn europe_population() -> HashMap<String, f64> {
    [
        ("DE", 83.02),
        ("FR", 67.03),
        ("GB", 66.65),
        ("PL", 37.97),
        ("UA", 44.39),
        ("ES", 46.94),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn world_pop_density() -> HashMap<String, f64> {
    [
        ("US", 36.0),
        ("DE", 240.0),
        ("GB", 281.0),
        ("FR", 119.0),
        ("UA", 75.0),
        ("NL", 508.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn us_district_sales() -> HashMap<String, f64> {
    [
        ("CA", 8234.7),
        ("TX", 6120.3),
        ("NY", 5877.9),
        ("FL", 4410.2),
        ("WA", 2954.8),
        ("IL", 2761.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Builds the demo router with every dataset registered under its study.
///
/// The blocking variants share the given [`IoPool`]; the non-blocking ones
/// run directly on the calling task. `usa-districts-all-blocking` reuses
/// the sales dataset behind a blocking driver so both execution modes can
/// be exercised against the same data.
pub fn demo_router(pool: Arc<IoPool>) -> StoreRouter {
    let document_latency = Duration::from_millis(2500);
    let driver_latency = Duration::from_millis(500);

    let mut router = StoreRouter::new();
    router
        .register(
            "world-gdp",
            "Cassandra",
            Arc::new(MemoryRepository::new(world_gdp(), driver_latency)),
        )
        .register(
            "europe-pop",
            "Mongo",
            Arc::new(MemoryRepository::new(europe_population(), document_latency)),
        )
        .register(
            "world-pop-dens",
            "Couchbase",
            Arc::new(MemoryRepository::new(world_pop_density(), driver_latency)),
        )
        .register(
            "usa-districts-jdbc",
            "JDBC",
            Arc::new(BlockingRepository::new(
                us_district_sales(),
                driver_latency,
                Arc::clone(&pool),
            )),
        )
        .register(
            "usa-districts-r2dbc",
            "R2DBC",
            Arc::new(MemoryRepository::new(us_district_sales(), driver_latency)),
        )
        .register(
            "usa-districts-all-blocking",
            "JDBC",
            Arc::new(BlockingRepository::new(
                us_district_sales(),
                driver_latency,
                pool,
            )),
        );
    router
}
