use anyhow::{Context, Result, anyhow};
use cfsim::{
    CfError, ENZYMES, SimulationParameters, SimulationReport, Simulator,
    enzymes::Enzymes,
    input::load_construction_file,
    parser::ParseReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

/// Construction File parser and cloning simulator
#[derive(Parser)]
#[command(name = "cfsim")]
#[command(version)]
#[command(about = "Parse and simulate Construction Files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Tsv,
    Json,
    Fasta,
}

#[derive(clap::Args)]
struct SimulationArgs {
    /// Simulation parameters as JSON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Restriction enzyme table replacing the built-in one
    #[arg(long)]
    enzymes: Option<PathBuf>,
    /// Accept linear homology assembly products
    #[arg(long)]
    allow_linear: bool,
    /// Fail on lines that are neither an operation nor a sequence
    #[arg(long)]
    strict: bool,
    /// Output format for the product table
    #[arg(long, value_enum, default_value = "tsv")]
    format: OutputFormat,
    /// Print every step's messages to stderr
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse input files into one construction file and print it
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print JSON instead of CF text
        #[arg(long)]
        json: bool,
        /// Fail on lines that are neither an operation nor a sequence
        #[arg(long)]
        strict: bool,
    },

    /// Simulate all input files as one construction file
    Simulate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        args: SimulationArgs,
    },

    /// Simulate every input file as its own construction file, in parallel
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        args: SimulationArgs,
    },

    /// List the restriction enzymes
    Enzymes {
        /// Restriction enzyme table replacing the built-in one
        #[arg(long)]
        enzymes: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ProductRow<'a> {
    name: &'a str,
    length: usize,
    sequence: &'a str,
}

fn load_enzymes(path: &Option<PathBuf>) -> Result<Enzymes> {
    match path {
        Some(path) => Enzymes::from_path(path),
        None => Ok((*ENZYMES).clone()),
    }
}

fn load_parameters(args: &SimulationArgs) -> Result<SimulationParameters> {
    let mut parameters = match &args.config {
        Some(path) => SimulationParameters::load_from_path(path)
            .with_context(|| format!("Could not load parameters from '{}'", path.display()))?,
        None => SimulationParameters::default(),
    };
    if args.allow_linear {
        parameters.require_circular_assembly = false;
    }
    if args.strict {
        parameters.strict_parsing = true;
    }
    Ok(parameters)
}

fn load_report(files: &[PathBuf], strict: bool) -> Result<ParseReport> {
    let report = load_construction_file(files, strict)?;
    for skipped in &report.skipped {
        eprintln!("Skipped line {}: {}", skipped.line, skipped.text);
    }
    for name in &report.redefined {
        eprintln!("Sequence '{name}' is defined more than once; using the last definition");
    }
    Ok(report)
}

fn print_journal(report: &SimulationReport, verbose: bool) {
    for record in &report.records {
        if verbose {
            for message in &record.result.messages {
                eprintln!("[{}] {message}", record.result.output);
            }
        }
        for warning in &record.result.warnings {
            eprintln!("[{}] Warning: {warning}", record.result.output);
        }
    }
}

fn write_products(report: &SimulationReport, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    match format {
        OutputFormat::Tsv => {
            let mut wtr = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(stdout.lock());
            for product in &report.products {
                wtr.serialize(ProductRow {
                    name: &product.name,
                    length: product.len(),
                    sequence: &product.sequence,
                })?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.products)?);
        }
        OutputFormat::Fasta => {
            let mut out = stdout.lock();
            for product in &report.products {
                writeln!(out, ">{}", product.name.replace(' ', "_"))?;
                for chunk in product.as_bytes().chunks(80) {
                    out.write_all(chunk)?;
                    out.write_all(b"\n")?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CfError>() {
                Some(err) => eprintln!("Error [{:?}]: {e:#}", err.code()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse {
            files,
            json,
            strict,
        } => {
            let report = load_report(&files, strict)?;
            if json {
                println!("{}", report.construction_file.to_json()?);
            } else {
                print!("{}", report.construction_file.to_text());
            }
        }

        Commands::Simulate { files, args } => {
            let enzymes = load_enzymes(&args.enzymes)?;
            let parameters = load_parameters(&args)?;
            let report = load_report(&files, parameters.strict_parsing)?;
            let simulator = Simulator::with_parameters(&enzymes, parameters);
            let simulation = simulator.simulate_with_journal(&report.construction_file)?;
            print_journal(&simulation, args.verbose);
            write_products(&simulation, args.format)?;
        }

        Commands::Batch { files, args } => {
            let enzymes = load_enzymes(&args.enzymes)?;
            let parameters = load_parameters(&args)?;
            let cfs = files
                .iter()
                .map(|file| {
                    load_report(std::slice::from_ref(file), parameters.strict_parsing)
                        .map(|report| report.construction_file)
                        .with_context(|| format!("Could not read '{}'", file.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let simulator = Simulator::with_parameters(&enzymes, parameters);
            let mut failures = 0;
            for (file, result) in files.iter().zip(simulator.simulate_batch(&cfs)) {
                match result {
                    Ok(simulation) => {
                        eprintln!("== {}", file.display());
                        print_journal(&simulation, args.verbose);
                        write_products(&simulation, args.format)?;
                    }
                    Err(e) => {
                        failures += 1;
                        eprintln!("{}: [{:?}] {e}", file.display(), e.code());
                    }
                }
            }
            if failures > 0 {
                return Err(anyhow!("{failures} of {} construction file(s) failed", files.len()));
            }
        }

        Commands::Enzymes { enzymes } => {
            let enzymes = load_enzymes(&enzymes)?;
            let mut wtr = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(io::stdout().lock());
            wtr.write_record(["name", "sequence", "cut5", "cut3", "overhang"])?;
            for re in enzymes.restriction_enzymes() {
                let (cut5, cut3) = (re.cut5.to_string(), re.cut3.to_string());
                let overhang = match (re.is_blunt(), re.is_five_prime()) {
                    (true, _) => "blunt",
                    (false, true) => "5'",
                    (false, false) => "3'",
                };
                wtr.write_record([
                    re.name.as_str(),
                    re.sequence.as_str(),
                    cut5.as_str(),
                    cut3.as_str(),
                    overhang,
                ])?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}
