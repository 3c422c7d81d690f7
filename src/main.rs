use anyhow::{bail, Context};
use clap::Parser;
use rfqmatch_core::{ColumnPolicy, RecordTable};
use rfqmatch_similarity::{run_ablation, EngineConfig, MatchStats, MatchTable, Mode, SimilarityEngine};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Rank every RFQ against all others and keep the top matches
#[derive(Parser, Debug)]
#[command(name = "rfqmatch")]
#[command(about = "Top-k similarity matching for enriched RFQ records", long_about = None)]
struct Args {
    /// Enriched RFQ records (JSON array or one JSON object per line)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (a directory with --ablation); stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Engine configuration file (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Similarity mode: all, dimensions, categorical, grade, cosine_jaccard
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Matches kept per RFQ
    #[arg(short)]
    k: Option<usize>,

    /// Weight of the dimension family in `all` mode
    #[arg(long)]
    dim_weight: Option<f64>,

    /// Weight of the categorical family in `all` mode
    #[arg(long)]
    cat_weight: Option<f64>,

    /// Weight of the grade family in `all` mode
    #[arg(long)]
    grade_weight: Option<f64>,

    /// Weight of cosine similarity in `cosine_jaccard` mode
    #[arg(long)]
    cosine_weight: Option<f64>,

    /// Weight of Jaccard similarity in `cosine_jaccard` mode
    #[arg(long)]
    jaccard_weight: Option<f64>,

    /// Fail when a feature column is missing from the whole input
    #[arg(long)]
    strict_columns: bool,

    /// Rank sources on all cores
    #[arg(long)]
    parallel: bool,

    /// Include per-family scores in the output
    #[arg(long)]
    explain: bool,

    /// Run dimensions, grade, categorical and all modes, one file each
    #[arg(long)]
    ablation: bool,

    /// Log level (falls back to RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(log_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => {
            let level = match level {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };
            EnvFilter::new(level.to_string())
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json_str(&text)?
        }
        None => EngineConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(k) = args.k {
        config.k = k;
    }
    if let Some(w) = args.dim_weight {
        config.weights.dim = w;
    }
    if let Some(w) = args.cat_weight {
        config.weights.cat = w;
    }
    if let Some(w) = args.grade_weight {
        config.weights.grade = w;
    }
    if let Some(w) = args.cosine_weight {
        config.hybrid_weights.cosine = w;
    }
    if let Some(w) = args.jaccard_weight {
        config.hybrid_weights.jaccard = w;
    }
    if args.strict_columns {
        config.column_policy = ColumnPolicy::Strict;
    }
    if args.parallel {
        config.parallel = true;
    }

    config.validate()?;
    Ok(config)
}

fn log_stats(mode: Mode, matches: &MatchTable) {
    let stats = MatchStats::compute(matches);
    info!(
        "[{}] Ranked {} records: {} matches, avg score {:.4}, best {:.4}",
        mode, stats.sources, stats.matches, stats.avg_score, stats.best_score
    );
}

fn emit(
    engine: &SimilarityEngine,
    table: &RecordTable,
    matches: &MatchTable,
    explain: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let json = if explain {
        serde_json::to_string_pretty(&engine.explain(table.records(), matches))?
    } else {
        matches.to_json_string()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Saved {} matches to {}", matches.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    let config = build_config(&args)?;
    info!("Starting rfqmatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", args.input);

    let table = RecordTable::from_path(&args.input, config.column_policy)
        .with_context(|| format!("loading records from {}", args.input.display()))?;
    info!("Loaded {} records", table.len());

    if args.ablation {
        let Some(dir) = args.output.as_deref() else {
            bail!("--ablation writes one file per mode and needs --output <DIR>");
        };
        std::fs::create_dir_all(dir)?;

        for (engine, matches) in run_ablation(&config, table.records())? {
            let mode = engine.config().mode;
            log_stats(mode, &matches);
            let path = dir.join(format!("top{}_{}.json", config.k, mode));
            emit(&engine, &table, &matches, args.explain, Some(&path))?;
        }
        return Ok(());
    }

    let engine = SimilarityEngine::new(config)?;
    let matches = engine.run_table(&table);
    log_stats(engine.config().mode, &matches);

    emit(&engine, &table, &matches, args.explain, args.output.as_deref())
}
