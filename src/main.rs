// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;

use office_coverage::{init_logging, AppContext, Config};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "summary" {
        init_logging("info");
        run_summary()?;
    } else {
        // Log lines would tear the alternate screen
        init_logging("error");
        run_ui_mode()?;
    }

    Ok(())
}

fn run_summary() -> Result<()> {
    println!("🗺️  Office Coverage - Load & Join Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::discover()?;
    println!("\n📂 Sources");
    println!("   Boundaries: {:?}", config.data.boundaries);
    println!("   Offices:    {:?}", config.data.offices);

    let context = AppContext::load(&config.data);

    if let Some(warning) = &context.warning {
        println!("\n⚠️  Using built-in sample data");
        println!("   {}", warning);
    }

    let metrics = context.metrics();
    println!("\n📊 Metrics");
    println!("   Total offices:            {}", metrics.total_offices);
    println!("   Departments with offices: {}", metrics.covered_regions);
    println!("   Departments in table:     {}", context.regions.len());
    println!("   Min / max per department: {} / {}", metrics.min_offices, metrics.max_offices);

    let report = &context.report;
    println!("\n🔗 Join");
    println!("   Tallied offices:   {}", report.tallied_offices);
    println!("   Matched offices:   {}", report.matched_offices);
    println!("   Unmatched offices: {}", report.unmatched_offices());
    for row in &report.unmatched {
        println!("   ✗ {} ({}) from {}", row.region, row.count, row.spellings.join(" / "));
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if let Some(fingerprint) = &context.fingerprint {
        println!("Fingerprint: {}", fingerprint);
    }
    println!("Loaded at:   {}", context.loaded_at.to_rfc3339());

    if report.is_complete() && !context.is_fallback() {
        println!("✅ Every department name matched a boundary");
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Office Coverage dashboard...\n");

    let config = Config::discover()?;
    let context = AppContext::load(&config.data);

    println!("✓ Loaded {} departments\n", context.regions.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(context);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: office-coverage summary");
    eprintln!("   Or the web UI: cargo run --bin coverage-server --features server");
    std::process::exit(1);
}
