//! Blackjack Sim CLI - run simulations and read bankroll analytics

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use blackjack_sim::analytics::{AnalyticsSettings, ResultsReport, Stat};
use blackjack_sim::config::freeze::DEFAULT_COUNT_RANGE;
use blackjack_sim::config::{
    betting_table, validate, BetSource, FreezeBetSchedule, RawField, RawInput, SimulationConfig,
};
use blackjack_sim::models::SimulationResult;
use blackjack_sim::{EngineClient, EngineConfig, RunOutcome, Session};

#[derive(Parser)]
#[command(name = "bjsim")]
#[command(author, version, about = "Blackjack card-counting bankroll simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Base URL of the simulation engine
    #[arg(long, env = "ENGINE_URL", default_value = "http://localhost:8000")]
    engine_url: String,

    /// Engine request timeout in seconds
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value = "120")]
    timeout: u64,

    /// Attempts per run, including the first
    #[arg(long, env = "ENGINE_MAX_ATTEMPTS", default_value = "2")]
    max_attempts: u32,

    /// Rounds played per hour
    #[arg(long, env = "ROUNDS_PER_HOUR", default_value = "100")]
    rounds_per_hour: f64,

    /// Profit over the initial bankroll that counts as reaching the target
    #[arg(long, env = "TARGET_PROFIT", default_value = "1000")]
    target_profit: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation on the engine and print the report
    Simulate {
        /// Starting bankroll
        #[arg(long, default_value = "10000")]
        bankroll: String,

        /// Minimum bet of the spread
        #[arg(long, default_value = "10")]
        spread_min: String,

        /// Maximum bet of the spread
        #[arg(long, default_value = "100")]
        spread_max: String,

        /// Number of decks (1, 2, 4, 6 or 8)
        #[arg(long, default_value = "6")]
        decks: String,

        /// Fraction of the shoe dealt before a reshuffle
        #[arg(long, default_value = "0.75")]
        penetration: String,

        /// Number of hands to play
        #[arg(long, default_value = "1000")]
        hands: String,

        /// Dealer hits soft 17
        #[arg(long)]
        h17: bool,

        /// Blackjack payout multiplier
        #[arg(long, default_value = "1.5")]
        payout: String,

        /// JSON file with freeze bet rows (default schedule if omitted)
        #[arg(long)]
        freeze_bets: Option<PathBuf>,

        /// Send no freeze bets; the engine uses its ramp for every count
        #[arg(long, conflicts_with = "freeze_bets")]
        no_freeze_bets: bool,

        /// Save the raw engine result to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a saved engine result without contacting the engine
    Summarize {
        /// Path to a result JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the freeze bet schedule next to the spread ramp
    FreezeBets {
        /// Minimum bet of the spread
        #[arg(long, default_value = "10")]
        spread_min: String,

        /// Maximum bet of the spread
        #[arg(long, default_value = "100")]
        spread_max: String,

        /// JSON file with freeze bet rows (default schedule if omitted)
        #[arg(long)]
        freeze_bets: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!(
        "{}",
        format!("Blackjack Sim CLI v{}", env!("CARGO_PKG_VERSION"))
            .as_str()
            .cyan()
            .bold()
    );
    println!();

    let analytics = AnalyticsSettings {
        rounds_per_hour: cli.rounds_per_hour,
        target_profit: cli.target_profit,
    };
    if !analytics.rounds_per_hour.is_finite() || analytics.rounds_per_hour <= 0.0 {
        bail!("--rounds-per-hour must be positive, got {}", analytics.rounds_per_hour);
    }

    let engine = EngineConfig {
        base_url: cli.engine_url.clone(),
        timeout_secs: cli.timeout,
        max_attempts: cli.max_attempts,
        ..Default::default()
    };

    if cli.interactive {
        run_interactive(engine, &analytics)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Simulate {
                bankroll,
                spread_min,
                spread_max,
                decks,
                penetration,
                hands,
                h17,
                payout,
                freeze_bets,
                no_freeze_bets,
                output,
            } => {
                let freeze_rows = match freeze_bets {
                    Some(ref path) => Some(load_json(path)?),
                    None if no_freeze_bets => Some(Vec::new()),
                    None => None,
                };
                let raw = RawInput {
                    bankroll: bankroll.into(),
                    spread_min: spread_min.into(),
                    spread_max: spread_max.into(),
                    decks: decks.into(),
                    penetration: penetration.into(),
                    hands: hands.into(),
                    dealer_hits_soft_17: Some(RawField::Bool(h17)),
                    blackjack_payout: Some(payout.into()),
                    freeze_bets: freeze_rows,
                };
                run_simulate(engine, &raw, &analytics, output.as_deref())?;
            }
            Commands::Summarize { input } => {
                run_summarize(&input, &analytics)?;
            }
            Commands::FreezeBets {
                spread_min,
                spread_max,
                freeze_bets,
            } => {
                let raw = RawInput {
                    spread_min: spread_min.into(),
                    spread_max: spread_max.into(),
                    freeze_bets: match freeze_bets {
                        Some(ref path) => Some(load_json(path)?),
                        None => None,
                    },
                    ..Default::default()
                };
                let config = validate(&raw).context("Invalid parameters")?;
                print_freeze_bets(&config);
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode");
    }

    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn spinner(message: String) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

/// Run one simulation through `session`; the previous result survives a failure
fn run_once(
    rt: &tokio::runtime::Runtime,
    client: &EngineClient,
    session: &mut Session,
    config: SimulationConfig,
) -> Result<()> {
    let ticket = session.begin_run();
    let pb = spinner(format!(
        "Simulating {} hands on {}...",
        config.hands,
        client.config().base_url
    ))?;

    let outcome = rt.block_on(client.simulate(&config));
    pb.finish_and_clear();

    match outcome {
        Ok(result) => {
            if session.complete_run(ticket, config, result) == RunOutcome::Stale {
                bail!("Run {} was superseded", ticket.id());
            }
            Ok(())
        }
        Err(e) => {
            session.fail_run(ticket);
            Err(e).context("Simulation failed - check that the backend is reachable")
        }
    }
}

fn run_simulate(
    engine: EngineConfig,
    raw: &RawInput,
    analytics: &AnalyticsSettings,
    output: Option<&Path>,
) -> Result<()> {
    let config = validate(raw).context("Invalid parameters")?;
    print_config(&config);

    let client = EngineClient::new(engine)?;
    let rt = runtime()?;
    let mut session = Session::new();
    run_once(&rt, &client, &mut session, config)?;

    if let (Some(path), Some(run)) = (output, session.latest()) {
        let json = serde_json::to_string_pretty(&run.result)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        println!("{}: {:?}", "Saved".green(), path);
        println!();
    }

    print_report(&session.report(analytics));
    Ok(())
}

fn run_summarize(input: &Path, analytics: &AnalyticsSettings) -> Result<()> {
    let result: SimulationResult = load_json(input)?;
    println!("Loaded {} hands from {:?}", result.hands_played, input);
    println!();

    print_report(&ResultsReport::build(&result, analytics));
    Ok(())
}

fn print_config(config: &SimulationConfig) {
    println!("{}", "Parameters".yellow().bold());
    println!("  Bankroll:     {}", config.bankroll);
    println!("  Spread:       {}-{}", config.spread_min, config.spread_max);
    println!("  Decks:        {}", config.decks.get());
    println!("  Penetration:  {:.0}%", config.penetration * 100.0);
    println!("  Hands:        {}", config.hands);
    println!(
        "  Rules:        {}, blackjack pays {}",
        if config.dealer_hits_soft_17 { "H17" } else { "S17" },
        config.blackjack_payout
    );
    println!("  Freeze bets:  {}", config.freeze_bets.len());
    println!();
}

/// Default count range widened to cover every scheduled bucket
fn table_range(schedule: &FreezeBetSchedule) -> std::ops::RangeInclusive<i32> {
    let counts = schedule.counts();
    let low = counts.first().map_or(*DEFAULT_COUNT_RANGE.start(), |&c| {
        c.min(*DEFAULT_COUNT_RANGE.start())
    });
    let high = counts.last().map_or(*DEFAULT_COUNT_RANGE.end(), |&c| {
        c.max(*DEFAULT_COUNT_RANGE.end())
    });
    low..=high
}

fn print_freeze_bets(config: &SimulationConfig) {
    println!("{}", "Betting schedule".yellow().bold());
    println!(
        "{:>6} {:>10} {:>10} {:>8}",
        "Count", "Bet", "Hands cap", "Source"
    );
    println!("{}", "-".repeat(38));

    for row in betting_table(config, table_range(&config.freeze_bets)) {
        let source = match row.source {
            BetSource::Freeze => "freeze".cyan(),
            BetSource::Ramp => "ramp".normal(),
        };
        let cap = if row.hands_cap == 0 {
            "-".to_string()
        } else {
            row.hands_cap.to_string()
        };
        let bet = if row.bet == 0 && row.source == BetSource::Freeze {
            "sit out".dimmed().to_string()
        } else {
            row.bet.to_string()
        };
        println!("{:>6} {:>10} {:>10} {:>8}", row.count_index, bet, cap, source);
    }
    println!();
}

fn print_report(report: &ResultsReport) {
    let stats = &report.statistics;

    if stats.is_placeholder() {
        println!("{}", "Reference values (no simulation run yet)".yellow());
    } else if let Some(id) = report.request_id {
        println!("{}", format!("Run #{}", id).as_str().dimmed());
    }

    println!("{}", "Summary".yellow().bold());
    println!("  Initial bankroll:    {}", fmt_stat(&stats.initial_bankroll, 2, ""));
    println!("  Final bankroll:      {}", fmt_stat(&stats.final_bankroll, 2, ""));

    let change = fmt_stat(&stats.absolute_change, 2, "");
    let pct = fmt_stat(&stats.percent_change, 2, "%");
    let framed = format!("{} ({})", change, pct);
    let framed = match stats.is_profit {
        Stat::Value(true) => framed.as_str().green(),
        Stat::Value(false) => framed.as_str().red(),
        Stat::NotApplicable(_) => framed.as_str().normal(),
    };
    println!("  Change:              {}", framed);
    println!("  EV per hour:         {:.2}", stats.expected_hourly_value);
    println!("  SD per hour:         {}", fmt_stat(&stats.standard_deviation, 2, ""));
    let ruin_pct = match stats.risk_of_ruin {
        Stat::Value(r) => Stat::Value(r * 100.0),
        other => other,
    };
    println!("  Risk of ruin:        {}", fmt_stat(&ruin_pct, 2, "%"));
    println!(
        "  Hours to target:     {} (target {})",
        fmt_stat(&stats.hours_to_target, 2, ""),
        fmt_stat(&stats.target_bankroll, 0, "")
    );
    println!("  Rounds per hour:     {}", stats.rounds_per_hour);

    if let Some(ref m) = report.metrics {
        println!();
        println!("{}", "Trajectory".yellow().bold());
        println!(
            "  Hands:               {} (win {:.1}%, loss {:.1}%, push {:.1}%, blackjack {:.1}%)",
            m.hands_played,
            m.hit_rate * 100.0,
            m.loss_rate * 100.0,
            m.push_rate * 100.0,
            m.blackjack_rate * 100.0
        );
        println!("  Total bet:           {:.2} (avg {:.2})", m.total_bet, m.average_bet);
        println!("  ROI:                 {:.2}%", m.roi * 100.0);
        println!(
            "  Peak / trough:       {:.2} / {:.2}",
            m.peak_bankroll, m.trough_bankroll
        );
        println!(
            "  Max drawdown:        {:.2} ({:.1}%)",
            m.max_drawdown,
            m.max_drawdown_pct * 100.0
        );
        if m.busted {
            println!("  {}", "Bankroll busted before the run finished".red().bold());
        }
    }

    if !report.hourly.is_empty() {
        println!();
        println!("{}", "By hour".yellow().bold());
        println!(
            "{:>6} {:>8} {:>12} {:>12}",
            "Hour", "Hands", "Net", "End"
        );
        println!("{}", "-".repeat(42));
        for seg in report.hourly.iter().take(24) {
            let net = format!("{:>12.2}", seg.profit);
            let net = if seg.profit >= 0.0 {
                net.as_str().green()
            } else {
                net.as_str().red()
            };
            println!(
                "{:>6} {:>8} {} {:>12.2}",
                seg.index + 1,
                seg.end_hand - seg.start_hand,
                net,
                seg.end_bankroll
            );
        }
        if report.hourly.len() > 24 {
            println!("  ... {} more hours", report.hourly.len() - 24);
        }
    }
}

/// Format a statistic with thousands separators, or its not-applicable reason
fn fmt_stat(stat: &Stat<f64>, decimals: usize, suffix: &str) -> String {
    match stat {
        Stat::Value(v) => format!("{}{}", with_commas(*v, decimals), suffix),
        Stat::NotApplicable(reason) => {
            let reason = serde_json::to_value(reason)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            format!("n/a ({})", reason.replace('_', " "))
        }
    }
}

fn with_commas(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn run_interactive(engine: EngineConfig, analytics: &AnalyticsSettings) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Engine: {}\n", engine.base_url);

    let theme = ColorfulTheme::default();
    let client = EngineClient::new(engine)?;
    let rt = runtime()?;
    let mut session = Session::new();
    let mut params = RawInput::default();

    loop {
        let options = vec![
            "Run simulation",
            "Show summary",
            "Show freeze bets",
            "Set freeze bet",
            "Remove freeze bet",
            "Reset freeze bets",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                params = prompt_params(&theme, &params)?;
                let config = match validate(&params) {
                    Ok(c) => c.with_freeze_bets(session.freeze_bets().clone()),
                    Err(e) => {
                        println!("{}: {}\n", "Invalid parameters".red(), e);
                        continue;
                    }
                };

                println!();
                match run_once(&rt, &client, &mut session, config) {
                    Ok(()) => print_report(&session.report(analytics)),
                    // Notify and keep the session usable
                    Err(e) => println!("{}: {:#}", "Failed".red(), e),
                }
                println!();
            }
            1 => {
                println!();
                print_report(&session.report(analytics));
                println!();
            }
            2 => {
                println!();
                print_freeze_bets(&current_config(&params, &session));
            }
            3 => {
                let count: i32 = Input::with_theme(&theme)
                    .with_prompt("Count index")
                    .interact_text()?;
                let bet: u64 = Input::with_theme(&theme)
                    .with_prompt("Bet (0 to sit out)")
                    .interact_text()?;
                let cap: u32 = Input::with_theme(&theme)
                    .with_prompt("Hands cap (0 for none)")
                    .default(0)
                    .interact_text()?;

                session.upsert_freeze_bet(count, bet, cap);
                println!();
                print_freeze_bets(&current_config(&params, &session));
            }
            4 => {
                let counts = session.freeze_bets().counts();
                if counts.is_empty() {
                    println!("No freeze bets to remove\n");
                    continue;
                }
                let labels: Vec<String> = counts.iter().map(|c| format!("Count {}", c)).collect();
                let idx = Select::with_theme(&theme)
                    .with_prompt("Remove which bucket?")
                    .items(&labels)
                    .default(0)
                    .interact()?;

                session.remove_freeze_bet(counts[idx]);
                println!();
                print_freeze_bets(&current_config(&params, &session));
            }
            5 => {
                session.reset_freeze_bets();
                println!("Freeze bets reset to defaults\n");
            }
            6 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Config for previews; falls back to defaults while the form is invalid
fn current_config(params: &RawInput, session: &Session) -> SimulationConfig {
    validate(params)
        .unwrap_or_default()
        .with_freeze_bets(session.freeze_bets().clone())
}

fn prompt_params(theme: &ColorfulTheme, current: &RawInput) -> Result<RawInput> {
    let ask = |prompt: &str, field: &RawField| -> Result<RawField> {
        let text: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .default(field.as_text())
            .interact_text()?;
        Ok(text.into())
    };

    let bankroll = ask("Bankroll", &current.bankroll)?;
    let spread_min = ask("Spread min", &current.spread_min)?;
    let spread_max = ask("Spread max", &current.spread_max)?;
    let decks = ask("Decks (1, 2, 4, 6, 8)", &current.decks)?;
    let penetration = ask("Penetration (0-1)", &current.penetration)?;
    let hands = ask("Hands", &current.hands)?;

    let h17 = Select::with_theme(theme)
        .with_prompt("Dealer on soft 17")
        .items(&["Stands (S17)", "Hits (H17)"])
        .default(match current.dealer_hits_soft_17 {
            Some(RawField::Bool(true)) => 1,
            _ => 0,
        })
        .interact()?
        == 1;

    Ok(RawInput {
        bankroll,
        spread_min,
        spread_max,
        decks,
        penetration,
        hands,
        dealer_hits_soft_17: Some(RawField::Bool(h17)),
        blackjack_payout: current.blackjack_payout.clone(),
        freeze_bets: None,
    })
}
