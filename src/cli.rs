//! CLI definitions and entry point

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use sort_by_priority::config::RulesConfig;
use sort_by_priority::core::models::{Record, Rule, RuleSet};
use sort_by_priority::core::services::{prioritize, sort_by_priority};
use sort_by_priority::expr::{DEFAULT_DATE_FORMAT, Env, parse_time};
use sort_by_priority::input;
use sort_by_priority::output::{OutputMode, Ranking};

/// sort-by-priority - Rank CI packages by user-defined priority rules
#[derive(Parser, Debug)]
#[command(
    name = "sort-by-priority",
    version,
    about = "Sort CI packages by user-defined priority rules",
    long_about = "Sort CI packages by user-defined priority rules.\n\n\
                  Reads the output of `debci status --all --json` on stdin, gives each\n\
                  package the priority of the first rule it matches (highest first,\n\
                  0 if none match) and prints package names, highest priority first."
)]
pub struct Cli {
    /// Rule of the form "<int>=<expression>" (repeatable)
    ///
    /// <int> is the priority (0-10, highest is queued first) given to every
    /// package matching <expression>.
    ///
    /// Examples:
    ///   -r '5="{package}".startswith("r")'
    ///   -r '4=re.search(r"kali", "{version}")'
    ///   -r '3="{status}" == "fail" and "{previous_status}" in ("unknown", "pass")'
    ///   -r '8=now() - date("{date}") > days(30)'
    #[arg(
        short = 'r',
        long = "priority-rule",
        visible_alias = "priority",
        value_name = "RULE",
        allow_hyphen_values = true,
        verbatim_doc_comment
    )]
    pub priority_rules: Vec<String>,

    /// TOML file with [[rule]] tables, applied before command-line rules
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read records from FILE instead of stdin ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print the priority after each package name
    #[arg(long)]
    pub show_priority: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long)]
    pub json: bool,

    /// Default format for date helpers [default: "%Y-%m-%d %H:%M:%S"]
    #[arg(long, value_name = "FMT")]
    pub date_format: Option<String>,

    /// Reference time for date helpers, in the date format [default: now]
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = match &cli.config {
        Some(path) => RulesConfig::load(path)?,
        None => RulesConfig::default(),
    };

    let rules = build_rules(&cli, &config)?;
    log::debug!("{} rule(s) loaded", rules.len());

    let env = build_env(&cli, &config)?;

    let mut records = read_input(cli.input.as_deref())?;
    log::debug!("{} record(s) read", records.len());

    let report = prioritize(&mut records, &rules, &env);
    if report.failed > 0 {
        log::warn!("{} rule evaluation(s) failed", report.failed);
    }
    log::debug!(
        "{} of {} record(s) matched a rule, {} regex pattern(s) compiled",
        report.matched,
        records.len(),
        env.compiled_patterns()
    );
    sort_by_priority(&mut records);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    Ranking::from_records(&records)
        .render(mode, cli.show_priority)
        .context("failed to write output")
}

/// Rules file entries first, then command-line rules, sorted by priority
fn build_rules(cli: &Cli, config: &RulesConfig) -> anyhow::Result<RuleSet> {
    let mut rules = match &cli.config {
        Some(path) => config.build_rules_from(path)?,
        None => config.build_rules()?,
    };
    for spec in &cli.priority_rules {
        rules.push(Rule::parse(spec)?);
    }
    Ok(RuleSet::new(rules))
}

fn build_env(cli: &Cli, config: &RulesConfig) -> anyhow::Result<Env> {
    let date_format = cli
        .date_format
        .as_deref()
        .or(config.date_format.as_deref())
        .unwrap_or(DEFAULT_DATE_FORMAT);

    let env = match &cli.now {
        Some(now) => {
            let now = parse_time(now, date_format).context("invalid --now")?;
            Env::new(now)
        },
        None => Env::local(),
    };
    Ok(env.with_date_format(date_format))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<Record>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            input::read_records(BufReader::new(file))
                .with_context(|| format!("failed to read records from {}", path.display()))
        },
        _ => input::read_records(io::stdin().lock()).context("failed to read records from stdin"),
    }
}
