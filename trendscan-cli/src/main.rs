//! trendscan CLI — streak, signal, profit and indicator reports for daily prices.
//!
//! Commands:
//! - `streaks` — up/down streak statistics and the longest streaks
//! - `signal` — BUY/SELL/NEUTRAL recommendation at a date
//! - `profit` — hindsight max profit with unlimited round trips
//! - `sma` — simple moving average at a date
//! - `returns` — simple daily return at a date
//! - `analyze` — streaks, signal and profit in one report

mod logging;

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use logging::{init_tracing, LogFormat};
use trendscan_core::currency::{CurrencyRequest, FrankfurterConverter, PriceConversion};
use trendscan_core::data::{CircuitBreaker, CsvProvider, DataProvider, YahooProvider};
use trendscan_core::indicators::{daily_returns, Indicator, Sma, SmaPolicy};
use trendscan_core::signal::SignalResult;
use trendscan_core::streaks::{DatedStreak, Direction, DirectionSummary};
use trendscan_core::{
    analyze, detect_streaks, AnalysisConfig, AnalysisReport, FlatPolicy, PriceSeries, ProfitReport,
    SignalGenerator, StreakSummary,
};

#[derive(Parser)]
#[command(
    name = "trendscan",
    about = "trendscan — streak, signal and hindsight-profit analysis of daily prices"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Start date (YYYY-MM-DD). Defaults to the config's start_date.
    #[arg(long, global = true)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to the config's end_date, or today.
    #[arg(long, global = true)]
    end: Option<String>,

    /// Read <DIR>/<SYMBOL>.csv instead of querying Yahoo Finance.
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Path to a TOML analysis config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// How unchanged closes affect a streak: skip or break.
    #[arg(long, global = true)]
    flat_policy: Option<FlatPolicy>,

    /// Log level or EnvFilter directive (TRENDSCAN_LOG takes precedence).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Up/down streak statistics.
    Streaks {
        /// Symbols to scan (e.g., SPY QQQ AAPL). Defaults to the config's symbols.
        symbols: Vec<String>,

        /// Longest streaks to list per direction.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Buy/sell signal at a date.
    Signal {
        symbol: String,

        /// Target date (YYYY-MM-DD); non-trading days snap to the nearest session.
        #[arg(long)]
        date: String,

        /// Also quote the price in this currency (ISO 4217, e.g. EUR).
        #[arg(long)]
        currency: Option<String>,
    },
    /// Maximum hindsight profit and the trades that realize it.
    Profit {
        symbols: Vec<String>,
    },
    /// Simple moving average at a date.
    Sma {
        symbol: String,

        /// Date (YYYY-MM-DD); non-trading days use the previous session.
        #[arg(long)]
        date: String,

        #[arg(long, default_value_t = 30)]
        window: usize,

        /// Require a full window; early dates report insufficient history
        /// instead of a partial-window mean.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Simple daily return at a date.
    Returns {
        symbols: Vec<String>,

        /// Date (YYYY-MM-DD); non-trading days use the previous session.
        #[arg(long)]
        date: String,
    },
    /// Streaks, signal and profit in one report.
    Analyze {
        symbol: String,

        /// Signal date (YYYY-MM-DD). Without it the signal section is omitted.
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        currency: Option<String>,
    },
}

/// Resolved configuration and data source shared by every command.
struct Context {
    config: AnalysisConfig,
    start: NaiveDate,
    end: NaiveDate,
    provider: Box<dyn DataProvider>,
    json: bool,
}

impl Context {
    fn build(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => AnalysisConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(policy) = cli.flat_policy {
            config.streaks.flat_policy = policy;
        }

        let today = chrono::Local::now().date_naive();
        let (default_start, default_end) = config.date_range(today);
        let start = cli.start.as_deref().map(parse_date).transpose()?.unwrap_or(default_start);
        let end = cli.end.as_deref().map(parse_date).transpose()?.unwrap_or(default_end);
        if end < start {
            bail!("--end {end} is before --start {start}");
        }

        let provider: Box<dyn DataProvider> = match &cli.csv_dir {
            Some(dir) => Box::new(CsvProvider::new(dir)),
            None => Box::new(YahooProvider::new(Arc::new(CircuitBreaker::for_remote_provider()))?),
        };

        Ok(Self {
            config,
            start,
            end,
            provider,
            json: cli.json,
        })
    }

    fn load(&self, symbol: &str) -> Result<PriceSeries> {
        tracing::info!(
            symbol,
            provider = self.provider.name(),
            start = %self.start,
            end = %self.end,
            "loading prices"
        );
        self.provider
            .fetch(symbol, self.start, self.end)
            .with_context(|| format!("fetching {symbol} from {}", self.provider.name()))
    }

    fn symbols_or_default(&self, symbols: Vec<String>) -> Vec<String> {
        if symbols.is_empty() {
            self.config.symbols.clone()
        } else {
            symbols
        }
    }

    fn currency(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.config.target_currency.clone())
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;
    let mut ctx = Context::build(&cli)?;

    match cli.command {
        Commands::Streaks { symbols, top } => {
            if let Some(top) = top {
                ctx.config.streaks.top = top;
            }
            run_streaks(&ctx, symbols)
        }
        Commands::Signal {
            symbol,
            date,
            currency,
        } => run_signal(&ctx, &symbol, &date, currency),
        Commands::Profit { symbols } => run_profit(&ctx, symbols),
        Commands::Sma {
            symbol,
            date,
            window,
            strict,
        } => run_sma(&ctx, &symbol, &date, window, strict),
        Commands::Returns { symbols, date } => run_returns(&ctx, symbols, &date),
        Commands::Analyze {
            symbol,
            date,
            currency,
        } => run_analyze(&ctx, &symbol, date.as_deref(), currency),
    }
}

/// Run `job` for every symbol on the rayon pool, keeping input order.
///
/// Failures are reported on stderr; the process exits non-zero only when every symbol failed.
fn for_each_symbol<T, F>(ctx: &Context, symbols: Vec<String>, job: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&PriceSeries) -> Result<T> + Sync,
{
    let symbols = ctx.symbols_or_default(symbols);
    if symbols.is_empty() {
        bail!("no symbols given and none configured");
    }

    let results: Vec<(String, Result<T>)> = symbols
        .into_par_iter()
        .map(|symbol| {
            let outcome = ctx.load(&symbol).and_then(|series| job(&series));
            (symbol, outcome)
        })
        .collect();

    let mut ok = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (symbol, outcome) in results {
        match outcome {
            Ok(value) => ok.push(value),
            Err(e) => {
                eprintln!("Error for {symbol}: {e:#}");
                failed += 1;
            }
        }
    }
    if ok.is_empty() && failed > 0 {
        std::process::exit(1);
    }
    Ok(ok)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── streaks ──

#[derive(Serialize)]
struct StreaksOutput {
    symbol: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    trading_days: usize,
    flat_policy: FlatPolicy,
    summary: StreakSummary,
    longest_up: Vec<DatedStreak>,
    longest_down: Vec<DatedStreak>,
}

fn run_streaks(ctx: &Context, symbols: Vec<String>) -> Result<()> {
    let policy = ctx.config.streaks.flat_policy;
    let top = ctx.config.streaks.top;

    let outputs = for_each_symbol(ctx, symbols, |series| {
        let report = detect_streaks(&series.closes(), policy);
        let dated = |direction| {
            report
                .top(direction, top)
                .into_iter()
                .map(|s| DatedStreak::attach(s.clone(), series))
                .collect::<Vec<_>>()
        };
        Ok(StreaksOutput {
            symbol: series.symbol().to_string(),
            start_date: series.first_date(),
            end_date: series.last_date(),
            trading_days: series.len(),
            flat_policy: policy,
            summary: report.summary(),
            longest_up: dated(Direction::Up),
            longest_down: dated(Direction::Down),
        })
    })?;

    if ctx.json {
        return print_json(&outputs);
    }
    for out in &outputs {
        print_header(&out.symbol, out.start_date, out.end_date, out.trading_days);
        println!("Flat policy:    {}", flat_policy_label(out.flat_policy));
        print_direction_summary(&out.summary.up);
        print_direction_summary(&out.summary.down);
        print_streak_list(Direction::Up, &out.longest_up);
        print_streak_list(Direction::Down, &out.longest_down);
        println!();
    }
    Ok(())
}

fn flat_policy_label(policy: FlatPolicy) -> &'static str {
    match policy {
        FlatPolicy::Skip => "skip",
        FlatPolicy::Break => "break",
    }
}

fn print_header(symbol: &str, start: Option<NaiveDate>, end: Option<NaiveDate>, bars: usize) {
    println!();
    println!("=== {symbol} ===");
    match (start, end) {
        (Some(s), Some(e)) => println!("Period:         {s} to {e} ({bars} trading days)"),
        _ => println!("Period:         (no data)"),
    }
}

fn print_direction_summary(summary: &DirectionSummary) {
    let label = match summary.direction {
        Direction::Up => "Up streaks:",
        Direction::Down => "Down streaks:",
    };
    match (summary.longest, summary.average) {
        (Some(longest), Some(average)) => println!(
            "{label:<15} {} (longest {longest}, average {average:.2})",
            summary.count
        ),
        _ => println!("{label:<15} none"),
    }
}

fn print_streak_list(direction: Direction, streaks: &[DatedStreak]) {
    if streaks.is_empty() {
        return;
    }
    println!("Longest {}:", direction.label());
    for s in streaks {
        println!(
            "  {} to {}  {:>3} steps  {:>+8.2}%",
            s.start_date,
            s.end_date,
            s.streak.length,
            s.streak.return_pct()
        );
    }
}

// ── signal ──

fn run_signal(ctx: &Context, symbol: &str, date: &str, currency: Option<String>) -> Result<()> {
    let series = ctx.load(symbol)?;
    let generator = SignalGenerator::new(ctx.config.signal.clone())?;
    let target = ctx.currency(currency);
    let converter = match &target {
        Some(_) => Some(FrankfurterConverter::new()?),
        None => None,
    };
    let request = target
        .as_deref()
        .zip(converter.as_ref())
        .map(|(code, conv)| CurrencyRequest::new(code, conv));

    let result = generator.generate(date, &series, request)?;
    if ctx.json {
        return print_json(&result);
    }
    print_signal(&result);
    Ok(())
}

fn print_signal(result: &SignalResult) {
    println!();
    println!("=== {} signal ===", result.symbol);
    if result.was_snapped() {
        println!(
            "Date:           {} (requested {}, not a trading day)",
            result.target_date, result.requested_date
        );
    } else {
        println!("Date:           {}", result.target_date);
    }
    println!("Price:          {:.2}", result.price);
    match &result.conversion {
        PriceConversion::Native => {}
        PriceConversion::Converted { currency, amount } => {
            println!("Price ({currency}):    {amount:.2}")
        }
        PriceConversion::Unavailable { currency, reason } => {
            println!("Price ({currency}):    unavailable ({reason})")
        }
    }
    println!();
    for line in &result.signals {
        println!("  - {line}");
    }
    println!();
    println!("Recommendation: {}", result.recommendation);
    println!(
        "Confidence:     {}% ({}), score {:+}",
        result.confidence_pct,
        result.confidence_label(),
        result.score
    );
    if let Some(check) = &result.hindsight {
        let verdict = match check.outcome {
            Some(o) => format!("{o:?}").to_lowercase(),
            None => "move too small to judge".to_string(),
        };
        println!(
            "Hindsight:      {:+.2}% after {} sessions ({}): {verdict}",
            check.future_return_pct, check.lookahead_days, check.future_date
        );
    }
    println!();
}

// ── profit ──

fn run_profit(ctx: &Context, symbols: Vec<String>) -> Result<()> {
    let reports = for_each_symbol(ctx, symbols, |series| Ok(ProfitReport::from_series(series)))?;
    if ctx.json {
        return print_json(&reports);
    }
    for report in &reports {
        print_profit(report);
    }
    Ok(())
}

fn print_profit(report: &ProfitReport) {
    print_header(&report.symbol, report.start_date, report.end_date, report.trading_days);
    println!("Max profit:     {:.2} per share", report.total_profit);
    println!("Buy and hold:   {:+.2} per share", report.buy_and_hold);
    println!("Transactions:   {}", report.transaction_count());
    for t in report.transactions.iter().take(10) {
        println!(
            "  buy {} @ {:.2}  sell {} @ {:.2}  {:+.2}",
            t.buy_date,
            t.transaction.buy_price,
            t.sell_date,
            t.transaction.sell_price,
            t.transaction.gain
        );
    }
    if report.transaction_count() > 10 {
        println!("  ... {} more", report.transaction_count() - 10);
    }
    println!();
}

// ── sma ──

#[derive(Serialize)]
struct SmaOutput {
    symbol: String,
    requested_date: NaiveDate,
    date: NaiveDate,
    close: f64,
    window: usize,
    policy: SmaPolicy,
    sma: Option<f64>,
}

fn run_sma(ctx: &Context, symbol: &str, date: &str, window: usize, strict: bool) -> Result<()> {
    if window == 0 {
        bail!("--window must be at least 1");
    }
    let requested = parse_date(date)?;
    let series = ctx.load(symbol)?;
    let Some((idx, on)) = series.on_or_before(requested) else {
        bail!("no trading day on or before {requested} for {symbol}");
    };

    let policy = if strict {
        SmaPolicy::Strict
    } else {
        SmaPolicy::Permissive
    };
    let values = Sma::with_policy(window, policy).compute(series.bars());
    let value = values[idx];
    let out = SmaOutput {
        symbol: series.symbol().to_string(),
        requested_date: requested,
        date: on,
        close: series.bars()[idx].close,
        window,
        policy,
        sma: (!value.is_nan()).then_some(value),
    };

    if ctx.json {
        return print_json(&out);
    }
    match out.sma {
        Some(v) => println!(
            "{} {}-day SMA on {}: {v:.2} (close {:.2})",
            out.symbol, window, out.date, out.close
        ),
        None => println!(
            "{} {}-day SMA on {}: insufficient history ({} bars available)",
            out.symbol,
            window,
            out.date,
            idx + 1
        ),
    }
    Ok(())
}

// ── returns ──

#[derive(Serialize)]
struct ReturnOutput {
    symbol: String,
    date: NaiveDate,
    close: f64,
    return_pct: Option<f64>,
}

fn run_returns(ctx: &Context, symbols: Vec<String>, date: &str) -> Result<()> {
    let requested = parse_date(date)?;
    let outputs = for_each_symbol(ctx, symbols, |series| {
        let Some((idx, on)) = series.on_or_before(requested) else {
            bail!("no trading day on or before {requested}");
        };
        let r = daily_returns(&series.closes())[idx];
        Ok(ReturnOutput {
            symbol: series.symbol().to_string(),
            date: on,
            close: series.bars()[idx].close,
            return_pct: (!r.is_nan()).then_some(r * 100.0),
        })
    })?;

    if ctx.json {
        return print_json(&outputs);
    }
    for out in &outputs {
        match out.return_pct {
            Some(r) => println!(
                "{:<8} {}  close {:>10.2}  return {r:>+7.2}%",
                out.symbol, out.date, out.close
            ),
            None => println!(
                "{:<8} {}  close {:>10.2}  return n/a (no prior session)",
                out.symbol, out.date, out.close
            ),
        }
    }
    Ok(())
}

// ── analyze ──

fn run_analyze(
    ctx: &Context,
    symbol: &str,
    date: Option<&str>,
    currency: Option<String>,
) -> Result<()> {
    let series = ctx.load(symbol)?;
    let target = ctx.currency(currency);
    let converter = match (&target, date) {
        (Some(_), Some(_)) => Some(FrankfurterConverter::new()?),
        _ => None,
    };
    let request = target
        .as_deref()
        .zip(converter.as_ref())
        .map(|(code, conv)| CurrencyRequest::new(code, conv));

    let report = analyze(&series, &ctx.config, date, request)?;
    if ctx.json {
        return print_json(&report);
    }
    print_analysis(&report);
    Ok(())
}

fn print_analysis(report: &AnalysisReport) {
    print_header(&report.symbol, report.start_date, report.end_date, report.trading_days);
    println!("Flat policy:    {}", flat_policy_label(report.flat_policy));
    print_direction_summary(&report.streaks.up);
    print_direction_summary(&report.streaks.down);
    print_streak_list(Direction::Up, &report.longest_up);
    print_streak_list(Direction::Down, &report.longest_down);
    println!(
        "Max profit:     {:.2} per share over {} transactions",
        report.profit.total_profit,
        report.profit.transaction_count()
    );
    if let Some(signal) = &report.signal {
        print_signal(signal);
    } else {
        println!();
    }
}
