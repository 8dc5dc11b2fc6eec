//! Command-line front end for the lattice exploration engine

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use lattice_explorer::{
    features, BudgetStatus, EngineParams, GenerationReport, LatticeConfig, LatticeEngine,
    LatticeError, Matrix, Point3, SamplingMode, DEFAULT_SUM_LIMIT,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Identity dimension when neither `--input` nor `--dimension` is given
const DEFAULT_DIMENSION: usize = 3;

/// Lattice point, dual basis and fundamental cell explorer
#[derive(Parser, Debug)]
#[clap(name = "lattice-explorer")]
#[clap(about = "Enumerate lattice points, compute dual bases and sample fundamental cells")]
#[clap(version)]
struct Args {
    /// Input file containing the basis (JSON or plain rows)
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Dimension of the identity basis used when no input file is given;
    /// with an input file it must match the file's basis
    #[clap(short, long)]
    dimension: Option<usize>,

    /// Coefficient range L: every coefficient lies in [-L, L]
    #[clap(short = 'L', long, default_value_t = DEFAULT_SUM_LIMIT)]
    sum_limit: u32,

    /// Maximum number of points to materialize
    #[clap(long)]
    budget: Option<usize>,

    /// Engine parameters as a JSON file
    #[clap(long)]
    params: Option<PathBuf>,

    /// Output file for results
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Output format (plain, json, csv)
    #[clap(long, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,

    /// Set logging level (error, warn, info, debug, trace)
    #[clap(long, default_value = "info")]
    log_level: String,

    /// Seed for random offsets and interior samples
    #[clap(long)]
    seed: Option<u64>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Enumerate lattice points c·B for c in [-L, L]^d
    Points {
        /// Use the dual basis instead of the primal one
        #[clap(long)]
        dual: bool,

        /// Print only the first three components of each point
        #[clap(long)]
        project: bool,
    },

    /// Compute the dual basis B·(BᵗB)⁻¹
    Dual,

    /// Sample the fundamental parallelepiped
    Cell {
        /// Draw one random interior point instead of listing corners
        #[clap(long)]
        interior: bool,

        /// Cell offset (comma-separated values)
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        offset: Option<Vec<f64>>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Plain,
    Json,
    Csv,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_logging(&args)?;
    lattice_explorer::validate_features()?;

    let engine = build_engine(&args)?;
    let config = load_input_lattice(&args)?;
    log::info!(
        "Loaded {}-dimensional basis with sum limit {}",
        config.dimension(),
        config.sum_limit()
    );

    let start = Instant::now();
    let content = match &args.command {
        Commands::Points { dual, project } => {
            let report = if *dual {
                engine.generate_dual_points(&config)?
            } else if features::parallel_available() {
                generate_parallel(&engine, &config)?
            } else {
                engine.generate_points(&config)?
            };
            if report.status != BudgetStatus::Complete {
                log::warn!(
                    "Returned {} of {} points ({:?})",
                    report.materialized,
                    report.count_before_cap,
                    report.status
                );
            }
            if *project {
                format_projected(&report.projected(), args.format)?
            } else {
                format_report(&report, args.format)?
            }
        }
        Commands::Dual => {
            let dual = engine.dual_basis(&config)?;
            format_matrix(&dual, args.format)?
        }
        Commands::Cell { interior, offset } => {
            let mode = sampling_mode(*interior, offset.as_deref())?;
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let points = engine.sample_parallelepiped(&config, &mode, &mut rng)?;
            format_projected(&points, args.format)?
        }
    };
    log::info!("Finished in {:?}", start.elapsed());

    save_result(&args, &content)
}

#[cfg(feature = "parallel")]
fn generate_parallel(
    engine: &LatticeEngine,
    config: &LatticeConfig,
) -> lattice_explorer::Result<GenerationReport> {
    engine.generate_points_parallel(config)
}

#[cfg(not(feature = "parallel"))]
fn generate_parallel(
    engine: &LatticeEngine,
    config: &LatticeConfig,
) -> lattice_explorer::Result<GenerationReport> {
    engine.generate_points(config)
}

fn setup_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    use env_logger::Builder;
    use log::LevelFilter;

    let level_filter = if args.verbose {
        LevelFilter::Debug
    } else {
        match args.log_level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    };

    let mut builder = Builder::from_default_env();
    builder.filter_level(level_filter);
    builder.init();

    Ok(())
}

fn build_engine(args: &Args) -> Result<LatticeEngine, Box<dyn std::error::Error>> {
    let mut params = match &args.params {
        Some(path) => EngineParams::load_from_file(path)?,
        None => EngineParams::default(),
    };
    if let Some(budget) = args.budget {
        params.point_budget = budget;
    }
    Ok(LatticeEngine::with_params(params)?)
}

fn load_input_lattice(args: &Args) -> Result<LatticeConfig, Box<dyn std::error::Error>> {
    let basis = match &args.input {
        Some(path) => {
            log::info!("Loading basis from {}", path.display());
            Some(lattice_explorer::utils::load_basis_from_file(path)?)
        }
        None => None,
    };
    Ok(resolve_config(basis, args.dimension, args.sum_limit)?)
}

fn resolve_config(
    basis: Option<Matrix>,
    dimension: Option<usize>,
    sum_limit: u32,
) -> lattice_explorer::Result<LatticeConfig> {
    match basis {
        Some(basis) => {
            if let Some(d) = dimension {
                if basis.dimension() != (d, d) {
                    return Err(LatticeError::invalid_basis_shape((d, d), basis.dimension()));
                }
            }
            LatticeConfig::from_basis(basis, sum_limit)
        }
        None => LatticeConfig::new(dimension.unwrap_or(DEFAULT_DIMENSION))?.with_sum_limit(sum_limit),
    }
}

fn sampling_mode(interior: bool, offset: Option<&[f64]>) -> lattice_explorer::Result<SamplingMode> {
    if interior {
        return Ok(SamplingMode::RandomInterior {
            offset: offset.map(<[f64]>::to_vec),
        });
    }
    let offset = match offset {
        Some(values) => Some(
            values
                .iter()
                .map(|&v| {
                    if v.fract() == 0.0 && v.is_finite() {
                        Ok(v as i64)
                    } else {
                        Err(LatticeError::invalid_parameters(format!(
                            "Corner offsets must be integers, got {}",
                            v
                        )))
                    }
                })
                .collect::<lattice_explorer::Result<Vec<i64>>>()?,
        ),
        None => None,
    };
    Ok(SamplingMode::Corners { offset })
}

fn save_result(args: &Args, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match args.output {
        Some(ref path) => std::fs::write(path, content)
            .map_err(|e| format!("Failed to write output to {}: {}", path.display(), e).into()),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn join_row(row: &[f64], sep: &str) -> String {
    row.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

fn format_report(
    report: &GenerationReport,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Plain => {
            let mut output = format!(
                "Lattice points: {} of {} ({:?})\n",
                report.materialized, report.count_before_cap, report.status
            );
            for point in &report.points {
                output.push_str(&format!("{}\n", point));
            }
            Ok(output)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => {
            let header: Vec<String> = (0..report.dimension).map(|i| format!("x{}", i)).collect();
            let mut csv = header.join(",");
            csv.push('\n');
            for point in &report.points {
                csv.push_str(&join_row(point.as_slice(), ","));
                csv.push('\n');
            }
            Ok(csv)
        }
    }
}

fn format_projected(
    points: &[Point3],
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Plain => Ok(points
            .iter()
            .map(|p| join_row(p, " "))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(points)?),
        OutputFormat::Csv => {
            let mut csv = String::from("x,y,z\n");
            for p in points {
                csv.push_str(&join_row(p, ","));
                csv.push('\n');
            }
            Ok(csv)
        }
    }
}

fn format_matrix(matrix: &Matrix, format: OutputFormat) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Plain => Ok(matrix.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(matrix)?),
        OutputFormat::Csv => Ok(matrix
            .row_iter()
            .map(|row| join_row(row, ","))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
