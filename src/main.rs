// Entry point and high-level CLI flow.
//
// - Loads and cleans the vendor CSV, printing diagnostics.
// - Runs every aggregation once and previews each deck table.
// - Exports the tables as CSV and the whole bundle as summary.json.
use anyhow::{Context, Result};
use std::path::Path;
use supply_risk_report::cli::Args;
use supply_risk_report::config::{Config, DEFAULT_CONFIG_FILE};
use supply_risk_report::report::{build_report, DeckReport};
use supply_risk_report::{loader, output, util};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);
    info!("supply_risk_report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.merge_with_args(&args);
    let categories = config.validate()?;

    let (vendors, load_report) = loader::load_vendors(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    println!(
        "Processing dataset... ({} rows read, {} vendors loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(load_report.parse_errors)
        );
    }
    if load_report.coerced_values > 0 {
        println!(
            "Info: {} malformed amounts treated as 0.",
            util::format_int(load_report.coerced_values)
        );
    }
    println!();

    let report = build_report(&vendors, &config, &categories);
    print_previews(&report, config.output.preview_rows);

    let dir = &config.output.dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    if args.format.csv() {
        export_csv(dir, &report);
    }
    if args.format.json() {
        export(dir, "summary.json", |p| output::write_json(p, &report));
    }
    println!("Outputs saved to {}", dir.display());
    Ok(())
}

/// Handle --init-config: generate a default .supply_risk.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
    }
    let content = Config::default_toml().context("Failed to serialize default config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;
    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(args.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn print_previews(report: &DeckReport, rows: usize) {
    let rate_pct = format!("{}%", util::format_number(report.tariff_rate * 100.0, 0));
    let origin = &report.summary.origin_country;

    println!(
        "Vendors: {} | Total spend: {} | {} share: {}%\n",
        util::format_int(report.summary.total_vendors),
        util::format_number(report.summary.total_spend, 2),
        origin,
        util::format_number(report.summary.origin_share_pct, 1)
    );

    output::preview_pivot(
        "Critical Category Spend by Country",
        Some("Top 8 countries by total spend"),
        &report.critical_categories,
        &report.critical_spend_by_country,
        rows,
    );
    output::preview_pivot(
        "Alternative Source Spend by Country",
        Some("Excluding the origin country"),
        &report.critical_categories,
        &report.alternative_spend_by_country,
        rows,
    );
    output::preview_table(
        "Lead Time vs Spend by Category",
        Some("Top 15 by spend; risk from supplier count"),
        &report.lead_time_vs_spend,
        rows,
    );
    let tariff_note = format!("{} tariff on {} spend, top 5 categories", rate_pct, origin);
    output::preview_table(
        "Tariff Impact",
        Some(&tariff_note),
        &report.tariff_impact,
        rows,
    );
    output::preview_table("Country Spend Ranking", None, &report.country_ranking, rows);
    output::preview_table("Top Vendors by Spend", None, &report.vendor_ranking, rows);
    output::preview_table(
        "Alternative Sources",
        Some("Ranked by logistics performance"),
        &report.alternative_sources,
        rows,
    );
    output::preview_table(
        "Data Completeness",
        None,
        &report.completeness,
        report.completeness.len(),
    );
    output::preview_table(
        "Projected Flow Trend",
        None,
        &report.flow_trend,
        report.flow_trend.len(),
    );
}

fn export_csv(dir: &Path, report: &DeckReport) {
    let cats = &report.critical_categories;
    export(dir, "critical_spend_by_country.csv", |p| {
        output::write_pivot_csv(p, cats, &report.critical_spend_by_country)
    });
    export(dir, "alternative_spend_by_country.csv", |p| {
        output::write_pivot_csv(p, cats, &report.alternative_spend_by_country)
    });
    export(dir, "lead_time_vs_spend.csv", |p| {
        output::write_csv(p, &report.lead_time_vs_spend)
    });
    export(dir, "tariff_impact.csv", |p| output::write_csv(p, &report.tariff_impact));
    export(dir, "country_ranking.csv", |p| output::write_csv(p, &report.country_ranking));
    export(dir, "vendor_ranking.csv", |p| output::write_csv(p, &report.vendor_ranking));
    export(dir, "alternative_sources.csv", |p| {
        output::write_csv(p, &report.alternative_sources)
    });
    export(dir, "completeness.csv", |p| output::write_csv(p, &report.completeness));
}

/// A failed write is logged and the remaining exports still run.
fn export<F>(dir: &Path, file: &str, write: F)
where
    F: FnOnce(&Path) -> Result<()>,
{
    let path = dir.join(file);
    match write(&path) {
        Ok(()) => info!("Wrote {}", path.display()),
        Err(e) => error!("Write error for {}: {:#}", path.display(), e),
    }
}
