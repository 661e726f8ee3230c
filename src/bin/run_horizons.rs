//! Run the prognosis for several horizons from one input load
//!
//! Usage: cargo run --bin run_horizons -- accounts.csv transactions.csv [out_dir]
//!
//! Writes one report per horizon for side-by-side comparison. Accounts are
//! independent and horizons share nothing, so the runs execute in parallel.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use budget_prognosis::projection::ProjectionConfig;
use budget_prognosis::{report, PrognosisRunner};
use rayon::prelude::*;

/// (years, months) horizons to compare
const HORIZONS: [(u32, u32); 3] = [(1, 0), (2, 0), (5, 0)];

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let accounts_path = args.next().expect("missing accounts CSV path");
    let transactions_path = args.next().expect("missing transactions CSV path");
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| String::from(".")));

    let start = Instant::now();
    println!("Loading input sheets...");
    let runner = PrognosisRunner::from_csv_paths(&accounts_path, &transactions_path)
        .expect("Failed to load input sheets");
    println!(
        "Loaded {} accounts and {} transactions in {:?}",
        runner.accounts().len(),
        runner.transactions().len(),
        start.elapsed()
    );

    let today = chrono::Local::now().date_naive();

    println!("Running {} projections...", HORIZONS.len());
    let projection_start = Instant::now();
    let results: Vec<_> = HORIZONS
        .par_iter()
        .map(|&(years, months)| {
            let result = runner
                .run(ProjectionConfig::new(years, months, today))
                .expect("Projection failed");
            (years, months, result)
        })
        .collect();
    println!("Projections complete in {:?}", projection_start.elapsed());

    for (years, months, result) in &results {
        let path = report::compose_filename(&out_dir, today, *years, *months);
        let file = File::create(&path).expect("Failed to create report file");
        report::write_csv(file, result).expect("Failed to write report");

        let summary = result.summary();
        println!(
            "  {}y{}m -> {} ({} postings, {} live, {} checkpoints, {} warnings)",
            years,
            months,
            path.display(),
            summary.postings,
            summary.live_postings,
            summary.checkpoints,
            summary.warnings
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
}
