//! rfm-runner: headless RFM scoring runner.
//!
//! Usage:
//!   rfm-runner --data-dir ./data
//!   rfm-runner --data-dir ./data --config rfm.json --json
//!   rfm-runner --seed 12345 --customers 500

use anyhow::{Context, Result};
use rfm_core::{
    config::RfmConfig,
    dataset::Dataset,
    summary::DashboardReport,
    synthetic::generate_dataset,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 500usize);
    let json = args.iter().any(|a| a == "--json");
    let data_dir = string_arg(&args, "--data-dir");
    let config_path = string_arg(&args, "--config");

    let config = match config_path {
        Some(path) => RfmConfig::load(path)?,
        None => RfmConfig::default(),
    };

    let dataset = match data_dir {
        Some(dir) => Dataset::load(dir, &config)
            .with_context(|| format!("loading dataset from {dir}"))?,
        None => {
            log::info!("no --data-dir given, generating synthetic dataset (seed={seed})");
            generate_dataset(seed, customers)
        }
    };

    let report = DashboardReport::build(&dataset, &config).context("scoring customers")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, data_dir.unwrap_or("<synthetic>"));
    }

    Ok(())
}

fn print_summary(report: &DashboardReport, source: &str) {
    let o = &report.overview;

    println!("=== DATASET OVERVIEW ===");
    println!("  source:          {source}");
    println!("  orders:          {}", o.total_orders);
    println!("  customers:       {}", o.total_customers);
    println!("  total payment:   ${:.0}", o.total_payment);
    if let Some(p) = &report.payment_value_summary {
        println!(
            "  payment value:   mean {:.2} | median {:.2} | max {:.2}",
            p.mean, p.p50, p.max
        );
    }
    if let (Some(first), Some(last)) = (report.orders_per_month.first(), report.orders_per_month.last()) {
        println!("  months:          {} .. {}", first.month, last.month);
    }

    println!();
    println!("=== PAYMENT TYPES ===");
    for t in &report.payment_types {
        println!("  {:<14} {}", t.label, t.count);
    }

    println!();
    println!("=== RFM SEGMENTS ===");
    for s in &report.segments {
        println!("  {:<16} {}", s.segment.label(), s.count);
    }

    println!();
    println!("=== RFM TABLE (first 5) ===");
    for c in report.customers.iter().take(5) {
        println!(
            "  {} | R={:>3}d F={} M={:>9.2} | {}{}{} = {:>2} | {}",
            c.customer_id,
            c.recency,
            c.frequency,
            c.monetary,
            c.r_score,
            c.f_score,
            c.m_score,
            c.rfm_score,
            c.segment,
        );
    }

    if !report.top_cities.is_empty() {
        println!();
        println!("=== TOP CITIES ===");
        for c in &report.top_cities {
            println!("  {:<20} {}", c.label, c.count);
        }
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    string_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
