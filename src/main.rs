use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use paperbot::backtest::{BacktestJob, MarketScenario, SyntheticDataGenerator};
use paperbot::config::Settings;
use paperbot::data::{load_price_series, save_price_series};
use paperbot::{
    BacktestRequest, BacktestResult, Backtester, ParamValue, PricePoint, StrategyDescriptor,
    StrategyKind,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "paperbot")]
#[command(about = "Paper trading strategy backtester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Backtest a single strategy
    Run(RunArgs),
    /// Compare strategies and RSI thresholds on one series
    Sweep(SeriesArgs),
    /// Write a synthetic price series to a JSON file
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// JSON file of {timestamp, price} points; synthetic data when omitted
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Synthetic market scenario
    #[arg(long, value_enum, default_value = "sawtooth")]
    scenario: MarketScenario,

    /// Seed for synthetic data
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of synthetic points
    #[arg(long, default_value_t = 500)]
    points: usize,

    /// Initial balance (overrides settings)
    #[arg(long)]
    initial_balance: Option<f64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    series: SeriesArgs,

    /// Strategy type: trend-following, mean-reversion, breakout
    #[arg(long, default_value = "trend-following")]
    strategy: String,

    /// Strategy parameter, e.g. --param shortPeriod=5 (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,

    /// Result label start date (RFC 3339); defaults to the first bar
    #[arg(long)]
    start: Option<chrono::DateTime<chrono::Utc>>,

    /// Result label end date (RFC 3339); defaults to the last bar
    #[arg(long)]
    end: Option<chrono::DateTime<chrono::Utc>>,

    /// Print the result as JSON instead of a report
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, value_enum)]
    scenario: MarketScenario,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 500)]
    points: usize,

    /// Minutes between points
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i64).range(1..))]
    interval: i64,

    #[arg(long)]
    output: PathBuf,
}

fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got {}", raw))?;
    Ok((key.trim().to_string(), value.parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    setup_logging(&settings);

    let backtester = Backtester::new(settings.engine_config());

    match cli.command {
        Commands::Run(args) => run(&backtester, &settings, args),
        Commands::Sweep(args) => sweep(&backtester, &settings, args).await,
        Commands::Generate(args) => generate(args),
    }
}

fn setup_logging(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_series(args: &SeriesArgs) -> anyhow::Result<(Vec<PricePoint>, String)> {
    match &args.prices {
        Some(path) => Ok((load_price_series(path)?, path.display().to_string())),
        None => {
            let mut generator = SyntheticDataGenerator::new(args.seed);
            let series = generator.generate(args.scenario, args.points, 5);
            Ok((series, args.scenario.label().to_string()))
        }
    }
}

fn run(backtester: &Backtester, settings: &Settings, args: RunArgs) -> anyhow::Result<()> {
    let (series, name) = load_series(&args.series)?;
    let initial_balance = args.series.initial_balance.unwrap_or(settings.initial_balance);

    let kind: StrategyKind = args.strategy.parse()?;
    let descriptor = args.params.into_iter().fold(
        StrategyDescriptor::new(args.strategy.clone(), kind),
        |descriptor, (key, value)| descriptor.with_param(key, value),
    );

    let spanning = BacktestRequest::spanning(&series, initial_balance)
        .context("Price series is empty or has out-of-range timestamps")?;
    let request = BacktestRequest::new(
        initial_balance,
        args.start.unwrap_or(spanning.start_date),
        args.end.unwrap_or(spanning.end_date),
    );

    if args.json {
        let result = backtester.run(&descriptor, &series, &request)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        backtester.run_and_report(&descriptor, &series, &request, &name)?;
    }

    Ok(())
}

async fn sweep(
    backtester: &Backtester,
    settings: &Settings,
    args: SeriesArgs,
) -> anyhow::Result<()> {
    let (series, name) = load_series(&args)?;
    let initial_balance = args.initial_balance.unwrap_or(settings.initial_balance);
    let request = BacktestRequest::spanning(&series, initial_balance)
        .context("Price series is empty or has out-of-range timestamps")?;
    let series = Arc::new(series);

    println!("\n╔══════════════════════════════════════════════════════╗");
    println!("║     STRATEGY SWEEP                                   ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!("   Data: {} ({} bars)", name, series.len());

    let mut descriptors = vec![
        StrategyDescriptor::new("trend-following", StrategyKind::TrendFollowing),
        StrategyDescriptor::new("breakout", StrategyKind::Breakout),
    ];
    for oversold in [20.0, 25.0, 30.0, 35.0, 40.0] {
        descriptors.push(
            StrategyDescriptor::new(
                format!("mean-reversion-rsi{}", oversold),
                StrategyKind::MeanReversion,
            )
            .with_param("oversold", ParamValue::Number(oversold)),
        );
    }

    let jobs = descriptors
        .into_iter()
        .map(|descriptor| BacktestJob {
            descriptor,
            series: series.clone(),
            request: request.clone(),
        })
        .collect();

    let mut results = Vec::new();
    for outcome in backtester.run_many(jobs).await {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => eprintln!("❌ Backtest failed: {}", e),
        }
    }

    print_summary_comparison(&results);
    Ok(())
}

fn print_summary_comparison(results: &[BacktestResult]) {
    println!(
        "\n{:<26} {:>10} {:>9} {:>7} {:>7} {:>8} {:>8}",
        "Strategy", "Profit", "Return%", "Trips", "Win%", "MaxDD%", "Sharpe"
    );
    println!("{}", "─".repeat(81));

    for result in results {
        println!(
            "{:<26} {:>10.2} {:>9.2} {:>7} {:>7.1} {:>8.2} {:>8.2}",
            result.strategy_id,
            result.profit,
            result.profit_percentage,
            result.total_trades,
            result.win_rate,
            result.max_drawdown,
            result.sharpe_ratio
        );
    }

    if let Some(best) = results
        .iter()
        .max_by(|a, b| a.profit_percentage.total_cmp(&b.profit_percentage))
    {
        println!(
            "\n🏆 Best Strategy: {} ({:+.2}%)",
            best.strategy_id, best.profit_percentage
        );
    }
    println!();
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut generator = SyntheticDataGenerator::new(args.seed);
    let series = generator.generate(args.scenario, args.points, args.interval);
    save_price_series(&args.output, &series)?;

    tracing::info!(
        "Wrote {} {:?} points to {}",
        series.len(),
        args.scenario,
        args.output.display()
    );
    Ok(())
}
