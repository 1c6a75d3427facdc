mod loader;

use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use std::process;
use tmsim::{
    build, check_input, parse, simulate_all, to_dot, BuiltMachine, Mode, ProgramManager,
    RunSummary, Simulation, Statistics, TuringMachineError,
};
use tracing_subscriber::EnvFilter;

/// Exit code when every input was simulated.
const EXIT_OK: i32 = 0;
/// Exit code when the machine has outstanding validation issues.
const EXIT_INVALID: i32 = 1;
/// Exit code when the configuration could not be read or parsed.
const EXIT_ERROR: i32 = 2;

/// Simulate a Turing machine with a cache cell from a YAML-like configuration
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The configuration file; `-` or nothing reads standard input
    config: Option<String>,

    /// Use a built-in program instead of a configuration file
    #[clap(short, long, conflicts_with = "config")]
    example: Option<String>,

    /// List the built-in programs and exit
    #[clap(long)]
    list_examples: bool,

    /// Additional input strings, simulated after `simulation_strings`
    #[clap(short, long)]
    input: Vec<String>,

    /// The step bound for each simulation
    #[clap(short, long, default_value_t = 1000)]
    max_steps: usize,

    /// Match transitions exactly, without blank wildcards
    #[clap(long)]
    strict: bool,

    /// Print every instantaneous description
    #[clap(short, long)]
    trace: bool,

    /// Print a machine-readable JSON report
    #[clap(long)]
    json: bool,

    /// Print the state diagram in Graphviz DOT format and exit
    #[clap(long)]
    dot: bool,

    /// Print the parsed configuration tree as JSON and exit
    #[clap(long)]
    dump_tree: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    process::exit(run(&cli));
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> i32 {
    if cli.list_examples {
        list_examples();
        return EXIT_OK;
    }

    let text = match load_text(cli) {
        Ok(text) => text,
        Err(e) => return fail(&e),
    };

    let tree = match parse(&text) {
        Ok(tree) => tree,
        Err(e) => return fail(&e.into()),
    };

    if cli.dump_tree {
        match serde_json::to_string_pretty(&tree) {
            Ok(dump) => println!("{}", dump),
            Err(e) => return fail(&TuringMachineError::SerializationError(e.to_string())),
        }
        return EXIT_OK;
    }

    let mode = if cli.strict { Mode::Strict } else { Mode::Normal };
    let built = build(&tree, mode);

    if cli.dot {
        print!("{}", to_dot(&built.machine));
        return EXIT_OK;
    }

    let mut issues = built.issues();
    issues.extend(
        cli.input
            .iter()
            .filter_map(|input| check_input(&built.machine, input))
            .map(|issue| issue.to_string()),
    );

    if !issues.is_empty() {
        report_issues(cli, &issues);
        return EXIT_INVALID;
    }

    simulate(cli, &built);
    EXIT_OK
}

/// Picks the configuration source: a built-in program, a file, or standard input. Without any
/// of them on an interactive terminal, the first built-in program is used.
fn load_text(cli: &Cli) -> Result<String, TuringMachineError> {
    if let Some(name) = &cli.example {
        return ProgramManager::text_by_name(name).map(str::to_string);
    }

    match cli.config.as_deref() {
        Some("-") => loader::read_stdin(),
        Some(path) => loader::read_config(Path::new(path)),
        None if atty::isnt(atty::Stream::Stdin) => loader::read_stdin(),
        None => {
            let name = ProgramManager::names()
                .first()
                .copied()
                .ok_or_else(|| TuringMachineError::ProgramNotFound("default".to_string()))?;
            tracing::debug!(program = name, "no configuration given, using built-in program");
            ProgramManager::text_by_name(name).map(str::to_string)
        }
    }
}

fn list_examples() {
    for index in 0..ProgramManager::count() {
        match ProgramManager::info(index) {
            Ok(info) => println!(
                "{}. {} ({} states, {} transitions, {} inputs)",
                index + 1,
                info.name.bold(),
                info.state_count,
                info.transition_count,
                info.input_count
            ),
            Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
        }
    }
}

fn fail(error: &TuringMachineError) -> i32 {
    eprintln!("{} {}", "error:".red().bold(), error);
    EXIT_ERROR
}

fn report_issues(cli: &Cli, issues: &[String]) {
    if cli.json {
        println!("{}", json!({ "issues": issues }));
        return;
    }

    eprintln!(
        "{} {} issue(s) found, not simulating",
        "invalid:".yellow().bold(),
        issues.len()
    );
    for issue in issues {
        eprintln!("  - {}", issue);
    }
}

fn simulate(cli: &Cli, built: &BuiltMachine) {
    let inputs: Vec<String> = built
        .inputs
        .iter()
        .chain(cli.input.iter())
        .cloned()
        .collect();

    let runs = simulate_all(&built.machine, &inputs, cli.max_steps);
    let summaries: Vec<RunSummary> = runs
        .iter()
        .map(|(input, simulation)| RunSummary::new(input.as_str(), simulation))
        .collect();
    let stats = Statistics::from_runs(&summaries);

    if cli.json {
        let runs: Vec<_> = runs
            .iter()
            .zip(&summaries)
            .map(|((_, simulation), summary)| {
                let mut run = json!(summary);
                if cli.trace {
                    run["trace"] = json!(simulation.trace);
                    run["last_transition"] = json!(simulation.last_transition);
                }
                run
            })
            .collect();
        println!("{}", json!({ "runs": runs, "statistics": stats }));
        return;
    }

    for (input, simulation) in &runs {
        print_run(input, simulation, cli.trace);
    }
    print_statistics(&stats);
}

fn print_run(input: &str, simulation: &Simulation, trace: bool) {
    let verdict = if simulation.accepted() {
        simulation.outcome.to_string().green().bold()
    } else {
        simulation.outcome.to_string().red().bold()
    };
    println!("{:?}: {} in {} step(s)", input, verdict, simulation.steps());

    if trace {
        for id in &simulation.trace {
            println!("  {}", id);
        }
        if let Some(transition) = &simulation.last_transition {
            println!("  last: {}", transition);
        }
    }
}

fn print_statistics(stats: &Statistics) {
    println!();
    println!(
        "{} {} run(s), {} accepted ({:.1}%), {} rejected ({:.1}%)",
        "Summary:".bold(),
        stats.total,
        stats.accepted,
        stats.accepted_percent,
        stats.rejected,
        stats.rejected_percent
    );
    println!(
        "Average steps: {:.1} accepted, {:.1} rejected",
        stats.avg_steps_accepted, stats.avg_steps_rejected
    );
}
