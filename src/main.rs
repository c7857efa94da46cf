use anyhow::{Context, Result};
use clap::Parser;
use eudefense::{
    chart, chart_path, dataset, dataset_path, insights_path,
    menu::{self, Selection},
    profile::Catalogue,
    report::{self, Insights},
    simulate,
    timeline::{Timeline, DEFAULT_END, DEFAULT_START},
};
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Simulate European defense-integration metrics for one country or force component.
#[derive(Parser, Debug)]
#[command(name = "eudefense")]
struct Args {
    /// Menu number or profile name; skips the interactive prompt
    #[arg(long)]
    select: Option<String>,

    /// Directory the CSV/PNG (and optional Parquet/JSON) files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_START)]
    start_year: i32,

    #[arg(long, default_value_t = DEFAULT_END)]
    end_year: i32,

    /// YAML file with extra or overriding profiles
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Also write the dataset as Parquet
    #[arg(long)]
    parquet: bool,

    /// Also write the insights as JSON
    #[arg(long)]
    insights_json: bool,

    /// Skip rendering the PNG panel
    #[arg(long)]
    no_chart: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    info!(?args, "startup");

    // ─── 2) catalogue + timeline ─────────────────────────────────────
    let mut catalogue = Catalogue::builtin()?;
    if let Some(path) = &args.profiles {
        catalogue.merge_file(path)?;
    }
    let timeline = Timeline::new(args.start_year, args.end_year)?;
    let options = catalogue.names();

    println!(
        "EUROPEAN MILITARY INTEGRATION ANALYSIS ({}-{})",
        timeline.start, timeline.end
    );
    println!("{}", "=".repeat(70));

    // ─── 3) pick a profile ───────────────────────────────────────────
    let selection = match menu::select(args.select.as_deref(), &options) {
        Some(sel) => sel,
        None => {
            let stdin = io::stdin();
            menu::prompt(&options, &mut stdin.lock(), &mut io::stdout())?
        }
    };
    if let Selection::Fallback(name) = &selection {
        warn!(fallback = %name, "menu input unusable");
    }
    let profile = catalogue.resolve(selection.name());
    let name = profile.name.clone();

    // ─── 4) generate ─────────────────────────────────────────────────
    println!("Generating military integration data for {}...", name);
    let table = simulate::generate_dataset(&profile, &timeline)?;

    // ─── 5) write data ───────────────────────────────────────────────
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {:?}", args.output_dir))?;

    let csv_path = dataset_path(&args.output_dir, &name, &timeline, "csv");
    dataset::write_csv(&table, &csv_path)?;
    println!("Data saved: {}", csv_path.display());

    if args.parquet {
        let pq_path = dataset_path(&args.output_dir, &name, &timeline, "parquet");
        dataset::write_parquet(&table, &pq_path)?;
        println!("Data saved: {}", pq_path.display());
    }

    println!("\nData preview:");
    print!("{}", table.preview(dataset::PREVIEW_COLUMNS, 5));

    // ─── 6) chart ────────────────────────────────────────────────────
    if args.no_chart {
        info!("chart rendering skipped");
    } else {
        println!("\nCreating military integration analysis...");
        let png_path = chart_path(&args.output_dir, &name);
        chart::render_png(&table, &name, &timeline, &png_path)?;
        println!("Chart saved: {}", png_path.display());
    }

    // ─── 7) insights ─────────────────────────────────────────────────
    let insights = Insights::compute(&profile, &timeline, &table)?;
    println!();
    print!("{}", insights.render());

    if args.insights_json {
        let json_path = insights_path(&args.output_dir, &name);
        report::write_json(&insights, &json_path)?;
        println!("\nInsights saved: {}", json_path.display());
    }

    println!("\nAnalysis for {} complete.", name);
    println!("Period: {}-{}", timeline.start, timeline.end);
    println!("Data: cooperation, capabilities, interoperability, economies");

    info!("all done");
    Ok(())
}
