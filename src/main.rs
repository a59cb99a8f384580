use anyhow::Context;
use clap::Parser;
use log::info;
use record_synth::ai::AnyProvider;
use record_synth::{GenerateConfig, GenerationRequest, GeneratorService};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "record-synth", about = "Generate linked sample records for agent data models")]
struct Cli {
    /// JSON file with agentName, agentDescription, models, actions and schedules
    #[arg(short, long)]
    input: PathBuf,

    /// Records per model (overrides RECORD_SYNTH_COUNT)
    #[arg(short, long)]
    count: Option<usize>,

    /// Model id sent to the provider (overrides RECORD_SYNTH_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("record_synth", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let mut cfg = GenerateConfig::from_env()?;
    if let Some(model) = cli.model {
        cfg.model = model;
    }

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let mut req: GenerationRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", cli.input.display()))?;
    if cli.count.is_some() {
        req.count = cli.count;
    }

    let provider = AnyProvider::from_env(cfg.request_timeout)?;
    info!("provider={} model={}", provider.name(), cfg.model);
    let service = GeneratorService::new(provider, cfg);

    let records = service
        .generate_sequential_records(&req)
        .await
        .context("failed to generate records")?;

    let out = serde_json::to_string_pretty(&records)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{out}"),
    }
    Ok(())
}
