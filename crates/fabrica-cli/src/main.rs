mod logging;

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fabrica_core::{Error as CoreError, GenRng};
use fabrica_dict::{DictConfig, Dictionary};
use fabrica_generate::output::write_records_jsonl;
use fabrica_generate::{FlatEmitter, GenerationReport, Interpreter, NestedEmitter};
use fabrica_plan::{parse_document, PlanError};
use logging::init_run_logging;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("generation error: {0}")]
    Generation(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "fabrica", version, about = "Fabrica synthetic-data generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the generate statements of a plan document.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Plan document (JSON).
    #[arg(value_name = "PLAN")]
    plan: PathBuf,
    /// Output directory for runs.
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Seed override; falls back to the plan's seed, then entropy.
    #[arg(long)]
    seed: Option<u64>,
    /// Embed sub-entities in their containing record instead of
    /// emitting them flat.
    #[arg(long, default_value_t = false)]
    nested: bool,
    /// Dictionary language override.
    #[arg(long)]
    lang: Option<String>,
    /// External wordlist directory, checked before the built-in data.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Retry missing categories in English.
    #[arg(long, default_value_t = true)]
    en_fallback: bool,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let text = fs::read_to_string(&args.plan)?;
    let document = parse_document(&text)?;

    let run_id = Uuid::new_v4().to_string();
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_dir = args.out.join(format!("{timestamp}__run_{run_id}"));
    fs::create_dir_all(&run_dir)?;
    init_run_logging(&run_dir.join("run.log"))?;

    let lang = args
        .lang
        .or_else(|| document.lang.clone())
        .unwrap_or_else(|| "en".to_string());
    let dict = Dictionary::new(DictConfig {
        lang,
        use_external_data: args.data_dir.is_some(),
        custom_data_location: args.data_dir,
        en_fallback: args.en_fallback,
    })?;

    let mut rng = match args.seed.or(document.seed) {
        Some(seed) => GenRng::seed_from_u64(seed),
        None => GenRng::from_entropy(),
    };

    tracing::info!(run_id = %run_id, plan = %args.plan.display(), "starting generation run");

    let mut interpreter = Interpreter::new(document.disable_metadata);
    let output = if args.nested {
        let mut emitter = NestedEmitter::new();
        interpreter.run(&document, &dict, &mut rng, &mut emitter)?;
        emitter.output()
    } else {
        let mut emitter = FlatEmitter::new();
        interpreter.run(&document, &dict, &mut rng, &mut emitter)?;
        emitter.output()
    };

    let output = output.borrow();
    for (type_tag, records) in output.by_type() {
        let path = run_dir.join(format!("{}.jsonl", sanitize(&type_tag)));
        write_records_jsonl(&path, &records)?;
        tracing::info!(declared_type = %type_tag, records = records.len(), "wrote records");
    }

    // tallied from the emitted output so sub-entity types are included
    let report = GenerationReport::from_output(run_id, &output);
    let report_path = run_dir.join("generation_report.json");
    fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;

    println!(
        "generated {} records across {} types in {}",
        output.len(),
        report.types.len(),
        run_dir.display()
    );
    Ok(())
}

/// Keep artifact file names path-safe; formal names may contain `$`/`::`.
fn sanitize(type_tag: &str) -> String {
    type_tag
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
