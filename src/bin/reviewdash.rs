use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use reviewdash::{
    date_bounds, snapshot_at, Dashboard, DashboardView, Error, FilterCriteria, PeriodSpec,
    RestStore, SortOrder, SourceFilter, StoreConfig,
};

#[derive(Parser)]
#[command(name = "reviewdash", about = "Customer review analytics CLI")]
struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Row cap for the store query (default: 100)
    #[arg(long)]
    limit: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute summary metrics and the daily series
    Metrics {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List matching reviews as a table
    Query {
        #[command(flatten)]
        filter: FilterArgs,
        /// Sort order: date-desc, rating-asc, rating-desc
        #[arg(long, default_value = "date-desc")]
        sort: String,
        /// Maximum rows to display
        #[arg(long, default_value = "10")]
        rows: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Output as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Export matching reviews to a timestamped CSV file
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Directory to write the export into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// List source channels with review counts
    Sources,
    /// Check store connectivity and show row counts
    Status,
}

#[derive(Args)]
struct FilterArgs {
    /// Period: today, yesterday, 7d, this-week, this-month, all,
    /// 2025-01-01..2025-03-31, or a relative offset like 3w-back
    #[arg(long, default_value = "all")]
    period: String,

    /// Restrict to a source channel (repeatable). Omitting the flag means
    /// no source restriction.
    #[arg(long = "source", value_name = "SOURCE")]
    sources: Vec<String>,

    /// Minimum rating, inclusive
    #[arg(long, default_value = "1")]
    rating_min: i32,

    /// Maximum rating, inclusive
    #[arg(long, default_value = "5")]
    rating_max: i32,
}

impl FilterArgs {
    fn period(&self) -> anyhow::Result<PeriodSpec> {
        Ok(PeriodSpec::parse(&self.period)?)
    }

    fn criteria(&self) -> FilterCriteria {
        let sources = if self.sources.is_empty() {
            SourceFilter::Any
        } else {
            SourceFilter::only(self.sources.iter().cloned())
        };
        FilterCriteria {
            sources,
            rating: (self.rating_min, self.rating_max),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = StoreConfig::from_env()?;
    if let Some(limit) = cli.limit {
        config = config.with_limit(limit);
    }
    let dash = Dashboard::new(RestStore::new(config)?);

    match cli.command {
        Commands::Metrics { filter, json } => {
            let view = render(&dash, &filter, SortOrder::DateDesc).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_metrics(&view);
            }
        }
        Commands::Query {
            filter,
            sort,
            rows,
            json,
            csv,
        } => {
            let sort = SortOrder::parse(&sort)
                .ok_or_else(|| anyhow::anyhow!("unknown sort order: {sort}"))?;
            let mut view = render(&dash, &filter, sort).await?;
            view.rows.truncate(rows);
            if json {
                println!("{}", serde_json::to_string_pretty(&view.rows)?);
            } else if csv {
                print!("{}", reviewdash::export::to_csv(&view.rows));
            } else {
                print_table(&view);
            }
        }
        Commands::Export { filter, out } => {
            let view = render(&dash, &filter, SortOrder::DateDesc).await?;
            let now = chrono::Local::now().naive_local();
            let path = reviewdash::export::write_csv(&view.rows, &out, now)?;
            println!("Exported {} rows to {}", view.rows.len(), path.display());
        }
        Commands::Sources => {
            let args = FilterArgs {
                period: "all".to_string(),
                sources: Vec::new(),
                rating_min: 1,
                rating_max: 5,
            };
            let view = render(&dash, &args, SortOrder::DateDesc).await?;
            if view.sources.is_empty() {
                println!("No source data.");
            } else {
                for sc in &view.sources {
                    println!("{:<12} {}", sc.source, sc.count);
                }
            }
        }
        Commands::Status => {
            print_status(&dash).await;
        }
    }

    Ok(())
}

/// One render pass. A gateway failure degrades to the empty "no data"
/// state with a warning, mirroring how the dashboard page behaves.
async fn render(
    dash: &Dashboard<RestStore>,
    filter: &FilterArgs,
    sort: SortOrder,
) -> anyhow::Result<DashboardView> {
    let period = filter.period()?;
    let criteria = filter.criteria();
    match dash.snapshot(&period, &criteria, sort).await {
        Ok(view) => Ok(view),
        Err(e) => {
            warn_unreachable(&e);
            let now = chrono::Local::now().naive_local();
            Ok(snapshot_at(&[], &period, &criteria, sort, now))
        }
    }
}

fn warn_unreachable(e: &Error) {
    log::warn!("Could not load reviews: {e}");
    eprintln!("Check that:");
    eprintln!("  1. REVIEWDASH_URL and REVIEWDASH_KEY are set");
    eprintln!("  2. The key grants read access to the store");
    eprintln!("  3. The reviews table exists at the endpoint");
}

fn print_metrics(view: &DashboardView) {
    println!("Review Metrics ({})", view.period);
    if view.metrics.total_reviews == 0 {
        println!("  No reviews in the selected period.");
        return;
    }
    let m = &view.metrics;
    println!("  Total reviews:  {}", m.total_reviews);
    println!("  Average rating: {:.1}", m.avg_rating);
    println!("  Positive:       {:.1}%", m.positive_pct);
    println!("  Response rate:  {:.1}%", m.response_rate);
    println!("  Unique authors: {}", m.unique_authors);
    println!("  NPS (proxy):    {:.1}", m.nps_like);

    if !view.daily.is_empty() {
        println!();
        println!("  Date         Count  Avg");
        for point in &view.daily {
            println!(
                "  {}   {:>5}  {:.1}",
                point.date, point.count, point.avg_rating
            );
        }
    }
}

fn print_table(view: &DashboardView) {
    if view.rows.is_empty() {
        println!("No reviews in the selected period.");
        return;
    }
    println!(
        "{:<20} {:<20} {:>6}  {}",
        "Date", "Author", "Rating", "Source"
    );
    for row in &view.rows {
        println!(
            "{:<20} {:<20} {:>6}  {}",
            row.review_date.as_deref().unwrap_or("-"),
            row.author.as_deref().unwrap_or("-"),
            row.rating.map_or("-".to_string(), |r| r.to_string()),
            row.source.as_deref().unwrap_or("-"),
        );
    }
}

async fn print_status(dash: &Dashboard<RestStore>) {
    match dash.load().await {
        Ok(records) => {
            let today = chrono::Local::now().date_naive();
            let (min, max) = date_bounds(&records, today);
            println!("Store Status");
            println!("  Reachable: yes");
            println!("  Rows:      {}", records.len());
            if records.is_empty() {
                println!("  (no data in the reviews table)");
            } else {
                println!("  Dates:     {min} .. {max}");
            }
        }
        Err(e) => {
            println!("Store Status");
            println!("  Reachable: no");
            warn_unreachable(&e);
        }
    }
}
