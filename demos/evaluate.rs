//! Hierarchical WRMSSE Example
//!
//! Scores a small two-state, two-category panel against a flat forecast at
//! every M5 hierarchy level.
//!
//! Run with: RUST_LOG=m5_eval=debug cargo run --example evaluate

use chrono::{DateTime, Duration, TimeZone, Utc};
use m5_eval::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn days(from: usize, n: usize) -> Vec<DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2016, 3, 28, 0, 0, 0).unwrap();
    (from..from + n)
        .map(|i| base + Duration::days(i as i64))
        .collect()
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "m5_eval=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Hierarchical WRMSSE Example ===\n");

    let attributes = ["item_id", "store_id", "state_id", "cat_id", "dept_id"];
    let series = [
        (["FOODS_3_090", "CA_1", "CA", "FOODS", "FOODS_3"], 1.25, 40.0),
        (["FOODS_3_090", "TX_1", "TX", "FOODS", "FOODS_3"], 1.25, 25.0),
        (["HOBBIES_1_234", "CA_1", "CA", "HOBBIES", "HOBBIES_1"], 9.97, 2.0),
        (["HOBBIES_1_234", "TX_1", "TX", "HOBBIES", "HOBBIES_1"], 9.97, 0.0),
    ];

    let mut train = Panel::builder().dates(days(0, 14)).attributes(attributes);
    let mut valid = Panel::builder().dates(days(14, 7)).attributes(attributes);

    for (key, price, level) in series {
        let weekly = |d: usize| level * (1.0 + 0.3 * ((d % 7) as f64 / 6.0));
        let history: Vec<f64> = (0..14).map(|d| weekly(d).round()).collect();
        let actual: Vec<f64> = (14..21).map(|d| weekly(d).round()).collect();
        let forecast = vec![level * 1.15; 7];

        train = train.series(
            SeriesKey::new(key),
            [("sales", history), ("price", vec![price; 14])],
        );
        valid = valid.series(
            SeriesKey::new(key),
            [("sales", actual), ("sales_hat", forecast)],
        );
    }

    let (train, valid) = match (train.build(), valid.build()) {
        (Ok(train), Ok(valid)) => (train, valid),
        (Err(e), _) | (_, Err(e)) => {
            println!("Error building panels: {}", e);
            return;
        }
    };

    println!(
        "Training: {} series x {} dates, validation: {} dates\n",
        train.n_series(),
        train.len(),
        valid.len()
    );

    let config = EvalConfig::default().with_window_length(7);

    // =========================================================================
    // Per-series pieces
    // =========================================================================
    println!("--- Per-Series RMSSE ---\n");

    match (
        normalized_error_ratio(&train, &valid, &config),
        series_weights(&train, &config),
    ) {
        (Ok(ratios), Ok(weights)) => {
            for ((key, ratio), weight) in ratios.iter().zip(weights.values()) {
                println!("{:<40} ratio {:>8.4}  weight {:.4}", key, ratio, weight);
            }
        }
        (Err(e), _) | (_, Err(e)) => println!("Error computing ratios: {}", e),
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================
    println!("\n--- Per-Level WRMSSE ---\n");

    match evaluate(&train, &valid, &Hierarchy::m5(), &config) {
        Ok(report) => {
            for level in &report.levels {
                println!(
                    "{:<15} {:>8.4}  ({} groups, {} undefined)",
                    level.name, level.score, level.groups, level.missing
                );
            }
            println!("\nOverall WRMSSE: {:.4}", report.overall);
        }
        Err(e) => println!("Error evaluating hierarchy: {}", e),
    }
}
