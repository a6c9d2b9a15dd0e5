use beaver::{
    ChampionManager, Enumerator, Limits, LogLoader, Machine, Record, Seed, Simulator,
    BB5_SEED_DIGEST,
};
use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Number of states to enumerate (4 or 5)
    #[clap(short, long, default_value_t = 5)]
    states: u8,

    /// Log file to write, defaults to `<root encoding>.txt`
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print results as JSON
    #[clap(long)]
    json: bool,

    /// Increase diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one machine: a decimal encoding, a standard text machine or a champion name
    Simulate { machine: String },

    /// Compute the seed database digest of enumeration logs (files or directories)
    Digest {
        #[clap(required = true)]
        logs: Vec<PathBuf>,

        /// Expected digest; `bb5` stands for the published 5-state seed
        #[clap(long)]
        expect: Option<String>,
    },
}

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match &cli.command {
        None => enumerate(&cli),
        Some(Command::Simulate { machine }) => simulate(&cli, machine),
        Some(Command::Digest { logs, expect }) => digest(&cli, logs, expect.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

fn enumerate(cli: &Cli) -> CliResult {
    let limits = Limits::for_states(cli.states)?;
    let mut enumerator = Enumerator::new(limits);

    let states = enumerator.limits().states;
    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.txt", Machine::root(states).raw())));
    let file = File::create(&path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;

    log::info!("Writing log to {}", path.display());
    let summary = enumerator.run(BufWriter::new(file))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(ExitCode::SUCCESS)
}

fn simulate(cli: &Cli, input: &str) -> CliResult {
    let limits = Limits::for_states(cli.states)?;
    let machine = match ChampionManager::get_champion_by_name(input) {
        Ok(champion) => champion.machine,
        Err(_) => Machine::parse(input)?,
    };

    let simulation = Simulator::new(limits).simulate(machine)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&simulation)?);
    } else {
        println!("{}", Record::new(machine, simulation.status()));
        println!("Machine: {}", machine);
        match simulation.outcome.halting_slot() {
            Some(slot) => println!("Halted on {} after {} steps", slot, simulation.steps),
            None => println!("{:?} after {} steps", simulation.status(), simulation.steps),
        }
        println!("Span: {}", simulation.span);
    }

    Ok(ExitCode::SUCCESS)
}

fn digest(cli: &Cli, paths: &[PathBuf], expect: Option<&str>) -> CliResult {
    let mut records = Vec::new();

    for path in paths {
        let logs = if path.is_dir() {
            LogLoader::load_logs(path)
        } else {
            vec![LogLoader::load_log(path).map(|log| (path.clone(), log))]
        };

        for entry in logs {
            let (file, loaded) = entry?;
            if !loaded.complete {
                log::warn!("{} has no final done line", file.display());
            }
            records.extend(loaded.records);
        }
    }

    let seed = Seed::collect(&records);
    let digest = seed.digest();

    if cli.json {
        let report = serde_json::json!({
            "undecided_time": seed.undecided_time.len(),
            "undecided_space": seed.undecided_space.len(),
            "digest": digest,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} undecided (time), {} undecided (space)",
            seed.undecided_time.len(),
            seed.undecided_space.len()
        );
        println!("{}", digest);
    }

    let expected = match expect {
        Some(e) if e.eq_ignore_ascii_case("bb5") => Some(BB5_SEED_DIGEST),
        other => other,
    };

    match expected {
        Some(e) if !e.eq_ignore_ascii_case(&digest) => {
            eprintln!("Digest mismatch: expected {}", e);
            Ok(ExitCode::FAILURE)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}
