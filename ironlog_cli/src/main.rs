use clap::{Args, Parser, Subcommand};
use ironlog_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ironlog")]
#[command(about = "Guided strength workout tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guided workout for one plan day (default)
    Start(StartArgs),

    /// List built-in plan templates
    Plans {
        /// Number of training days to build templates with
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show recent workouts
    History {
        /// Window size in days, ending today
        #[arg(long, default_value_t = 7)]
        days: i64,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every recorded set to CSV
    Export {
        /// Destination file (defaults to <data-dir>/sets.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct StartArgs {
    /// Template name (fbw, split) or path to a plan JSON file
    #[arg(long)]
    plan: Option<String>,

    /// Training days for built-in templates
    #[arg(long)]
    days: Option<u32>,

    /// Plan day to train (1-based)
    #[arg(long, default_value_t = 1)]
    day: u32,

    /// Rest between sets in seconds
    #[arg(long)]
    rest: Option<i64>,

    /// Auto-complete (for testing) - submit target reps and skip rests
    #[arg(long)]
    auto: bool,

    /// Dry run - show the day without starting a session
    #[arg(long)]
    dry_run: bool,
}

impl Default for StartArgs {
    fn default() -> Self {
        Self {
            plan: None,
            days: None,
            day: 1,
            rest: None,
            auto: false,
            dry_run: false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    ironlog_core::logging::init_verbose(cli.verbose);

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Start(args)) => cmd_start(&data_dir, args, &config),
        Some(Commands::Plans { days }) => cmd_plans(days.unwrap_or(config.session.template_days)),
        Some(Commands::History { days, json }) => cmd_history(&data_dir, days, json),
        Some(Commands::Export { out }) => cmd_export(&data_dir, out),
        None => {
            // Default to "start" command
            cmd_start(&data_dir, StartArgs::default(), &config)
        }
    }
}

fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join("journal.json")
}

fn resolve_plan(spec: &str, days: u32) -> Result<Plan> {
    match spec.parse::<TemplateKind>() {
        Ok(kind) => BuiltinPlan::new(kind, days).load_plan(),
        Err(_) => JsonPlanFile::new(spec).load_plan(),
    }
}

fn cmd_start(data_dir: &Path, args: StartArgs, config: &Config) -> Result<()> {
    let spec = args
        .plan
        .clone()
        .unwrap_or_else(|| config.session.default_template.clone());
    let days = args.days.unwrap_or(config.session.template_days);

    let plan = resolve_plan(&spec, days)?;
    let plan_day = plan.day(args.day)?;
    tracing::debug!(
        "Resolved plan '{}' day {} ({} sets)",
        plan.id,
        plan_day.day,
        plan_day.total_sets()
    );

    display_day(&plan_day);

    if args.dry_run {
        println!("\n[Dry run - not starting session]");
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)?;
    let dispatcher = EffectDispatcher::spawn(JournalStore::new(journal_path(data_dir)));

    let mut engine =
        WorkoutEngine::new(plan_day).with_default_rest(config.session.default_rest_seconds);
    dispatcher.dispatch(engine.start_session());

    let lines = if args.auto {
        None
    } else {
        Some(spawn_stdin_reader())
    };

    let mut quit = false;
    let mut pending: Option<String> = None;
    while !engine.is_finished() && !quit {
        match engine.phase() {
            EnginePhase::Lifting => {
                let input = match &lines {
                    None => auto_set(&engine, args.rest),
                    Some(lines) => match prompt_set(&engine, lines, &mut pending, args.rest)? {
                        Some(input) => input,
                        None => {
                            quit = true;
                            continue;
                        }
                    },
                };

                let reps = input.reps;
                match engine.submit_set(input) {
                    Ok(effects) => {
                        dispatcher.dispatch(effects);
                        let snapshot = engine.snapshot();
                        println!(
                            "  ✓ {} reps logged ({}/{} sets, {:.0}%)",
                            reps,
                            snapshot.completed_sets,
                            snapshot.total_sets,
                            snapshot.progress * 100.0
                        );
                    }
                    Err(Error::InvalidInput(msg)) => {
                        eprintln!("  ✗ {}", msg);
                    }
                    Err(e) => return Err(e),
                }
            }
            EnginePhase::Resting => match &lines {
                None => engine.end_rest(),
                Some(lines) => pending = run_rest(&mut engine, lines)?,
            },
            EnginePhase::Idle | EnginePhase::Finished => break,
        }
    }

    let snapshot = engine.snapshot();
    if snapshot.is_finished {
        println!(
            "\n✓ Workout complete! {} sets in {}",
            snapshot.completed_sets,
            format_duration(snapshot.elapsed_seconds)
        );
    } else {
        println!(
            "\nWorkout ended early: {}/{} sets logged",
            snapshot.completed_sets, snapshot.total_sets
        );
    }
    engine.reset();

    let report = dispatcher.shutdown();
    tracing::info!(
        "Session writes: {} applied, {} failed",
        report.applied,
        report.failed
    );
    if report.failed > 0 {
        eprintln!(
            "warning: {} of {} writes failed; see log for details",
            report.failed,
            report.applied + report.failed
        );
    }

    Ok(())
}

fn cmd_plans(days: u32) -> Result<()> {
    for kind in TemplateKind::all() {
        let plan = build_template(kind, days);
        println!("{:<6} {}", kind.id(), kind.description());
        for day in plan.days() {
            let plan_day = plan.day(day)?;
            let names: Vec<_> = plan_day
                .items
                .iter()
                .map(|item| item.exercise_name.as_str())
                .collect();
            println!("       Day {}: {}", day, names.join(", "));
        }
        println!();
    }
    Ok(())
}

fn cmd_history(data_dir: &Path, days: i64, json: bool) -> Result<()> {
    let today = Clock::System.today();
    let summaries = load_recent_sessions(&journal_path(data_dir), today, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No workouts in the last {} days.", days);
        return Ok(());
    }

    for summary in &summaries {
        let duration = summary
            .duration_seconds
            .map(format_duration)
            .unwrap_or_else(|| "unfinished".into());
        println!(
            "{}  {:>3} sets  {:>2} exercises  volume {:>8.1}  {}",
            summary.date_key, summary.sets, summary.exercises, summary.volume, duration
        );
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, out: Option<PathBuf>) -> Result<()> {
    let csv_path = out.unwrap_or_else(|| data_dir.join("sets.csv"));
    let count = export_sets_csv(&journal_path(data_dir), &csv_path)?;

    println!("✓ Exported {} sets", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn display_day(day: &PlanDay) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} · Day {}", day.plan_name, day.day);
    println!("╰─────────────────────────────────────────╯");
    println!();

    if day.items.is_empty() {
        println!("  (no exercises)");
    }
    for (i, item) in day.items.iter().enumerate() {
        println!(
            "  {}. {:<28} {} × {}",
            i + 1,
            item.exercise_name,
            item.target_sets,
            item.target_reps
        );
    }
}

fn auto_set(engine: &WorkoutEngine, rest: Option<i64>) -> SetInput {
    let reps = engine
        .current_exercise()
        .and_then(|item| item.target_reps.minimum())
        .filter(|r| *r > 0)
        .unwrap_or(1);
    SetInput {
        weight: None,
        reps: i64::from(reps),
        rest_seconds: rest,
    }
}

/// Read stdin on a helper thread so the rest countdown can keep ticking
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

enum ParsedLine {
    Quit,
    Set { reps: i64, weight: Option<f64> },
    Invalid(String),
}

/// Parse `"<reps> [weight]"`; an empty line takes the target reps
fn parse_set_line(line: &str, default_reps: Option<u32>) -> ParsedLine {
    let mut parts = line.split_whitespace();
    let Some(first) = parts.next() else {
        return match default_reps {
            Some(reps) => ParsedLine::Set {
                reps: i64::from(reps),
                weight: None,
            },
            None => ParsedLine::Invalid("enter the reps you did".into()),
        };
    };

    if first.eq_ignore_ascii_case("q") {
        return ParsedLine::Quit;
    }

    let Ok(reps) = first.parse::<i64>() else {
        return ParsedLine::Invalid(format!("'{}' is not a rep count", first));
    };

    let weight = match parts.next() {
        None => None,
        Some(w) => match w.parse::<f64>() {
            Ok(w) => Some(w),
            Err(_) => return ParsedLine::Invalid(format!("'{}' is not a weight", w)),
        },
    };

    ParsedLine::Set { reps, weight }
}

/// Ask for the current set; `pending` holds a line already typed during rest
fn prompt_set(
    engine: &WorkoutEngine,
    lines: &Receiver<String>,
    pending: &mut Option<String>,
    rest: Option<i64>,
) -> Result<Option<SetInput>> {
    let (Some(item), Some(cursor)) = (engine.current_exercise(), engine.cursor()) else {
        return Ok(None);
    };

    println!("─────────────────────────────────────────");
    println!(
        "{}  set {}/{}  target {}",
        item.exercise_name, cursor.set_number, item.target_sets, item.target_reps
    );
    let default_reps = item.target_reps.minimum().filter(|r| *r > 0);

    loop {
        print!("reps [weight] ('q' to quit) > ");
        io::stdout().flush()?;

        let line = match pending.take() {
            Some(line) => {
                println!("{}", line);
                line
            }
            None => match lines.recv() {
                Ok(line) => line,
                Err(_) => return Ok(None),
            },
        };

        match parse_set_line(&line, default_reps) {
            ParsedLine::Quit => return Ok(None),
            ParsedLine::Set { reps, weight } => {
                return Ok(Some(SetInput {
                    weight,
                    reps,
                    rest_seconds: rest,
                }))
            }
            ParsedLine::Invalid(msg) => eprintln!("  ✗ {}", msg),
        }
    }
}

/// Count down the rest. Any line ends it early; a non-blank line is
/// returned so it can be used as the next set entry.
fn run_rest(engine: &mut WorkoutEngine, lines: &Receiver<String>) -> Result<Option<String>> {
    let mut carried = None;
    while let Some(handle) = engine.rest_handle() {
        print!(
            "\r  Rest: {:>3}s (Enter to skip, or type the next set) ",
            engine.seconds_remaining()
        );
        io::stdout().flush()?;

        match lines.recv_timeout(Duration::from_secs(1)) {
            Ok(line) => {
                engine.end_rest();
                if !line.trim().is_empty() {
                    carried = Some(line);
                }
            }
            Err(RecvTimeoutError::Disconnected) => engine.end_rest(),
            Err(RecvTimeoutError::Timeout) => {
                engine.tick(handle);
            }
        }
    }
    println!();
    Ok(carried)
}

fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
