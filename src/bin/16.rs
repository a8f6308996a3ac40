#![doc = include_str!("../puzzles/16.md")]

use std::fs;
use std::path::PathBuf;
use std::process;

use once_cell::unsync::OnceCell;
use valve_planner::debugln;
use valve_planner::valves::{self, Optimum, ValveGraph, ValveName};

const DEFAULT_START: ValveName = ValveName('A', 'A');
const DEFAULT_MINUTES: i32 = 30;
const DEFAULT_DUAL_MINUTES: i32 = 26;

const HELP: &str = "\
Usage: 16 [--input PATH] [--start VALVE] [--minutes N] [--dual-minutes N]

  --input PATH        read the scan from PATH instead of src/inputs/16.txt
  --start VALVE       valve both agents start at (default: AA)
  --minutes N         time budget when working alone (default: 30)
  --dual-minutes N    time budget for each agent when working in pairs (default: 26)
";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    pub input: Option<PathBuf>,
    pub start: ValveName,
    pub minutes: i32,
    pub dual_minutes: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            start: DEFAULT_START,
            minutes: DEFAULT_MINUTES,
            dual_minutes: DEFAULT_DUAL_MINUTES,
        }
    }
}

impl Config {
    fn parse(mut args: pico_args::Arguments) -> Result<Self, pico_args::Error> {
        let defaults = Self::default();
        let config = Self {
            input: args.opt_value_from_str("--input")?,
            start: args.opt_value_from_str("--start")?.unwrap_or(defaults.start),
            minutes: args
                .opt_value_from_str("--minutes")?
                .unwrap_or(defaults.minutes),
            dual_minutes: args
                .opt_value_from_str("--dual-minutes")?
                .unwrap_or(defaults.dual_minutes),
        };

        let remaining = args.finish();
        if !remaining.is_empty() {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unexpected arguments: {remaining:?}"),
            });
        }

        Ok(config)
    }
}

struct Puzzle {
    pub graph: ValveGraph,
    pub start: ValveName,
    pub minutes: i32,
    pub dual_minutes: i32,
    single_agent: OnceCell<Optimum>,
}

impl Puzzle {
    fn new(input: &str, config: &Config) -> Result<Self, valves::Error> {
        Ok(Self {
            graph: input.parse()?,
            start: config.start,
            minutes: config.minutes,
            dual_minutes: config.dual_minutes,
            single_agent: OnceCell::new(),
        })
    }

    /// The single-agent optimum, searched for on first use only.
    fn single_agent(&self) -> Result<&Optimum, valves::Error> {
        self.single_agent.get_or_try_init(|| {
            valves::optimal_sequence(&self.graph, self.start, self.minutes, None)
        })
    }
}

fn part_one(puzzle: &Puzzle) -> Option<u64> {
    let optimum = puzzle.single_agent().ok()?;
    debugln!("Best sequence: {}", optimum.sequence);
    Some(optimum.score)
}

fn part_two(puzzle: &Puzzle) -> Option<u64> {
    let optimum =
        valves::optimal_dual_sequence(&puzzle.graph, puzzle.start, puzzle.dual_minutes).ok()?;
    debugln!("Helper: {}", optimum.helper);
    debugln!("Human:  {}", optimum.human);
    Some(optimum.score)
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let input = match &config.input {
        Some(path) => fs::read_to_string(path)?,
        None => valve_planner::read_file("inputs", 16),
    };
    let puzzle = Puzzle::new(&input, config)?;

    valve_planner::solve!(1, part_one, &puzzle);
    valve_planner::solve!(2, part_two, &puzzle);

    let plan = puzzle.single_agent()?;
    plan.sequence.table(&puzzle.graph)?.printstd();

    Ok(())
}

fn main() {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return;
    }

    let config = match Config::parse(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
