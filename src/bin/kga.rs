use std::fs;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kegg_gene_annotator::checkpoint::Checkpoint;
use kegg_gene_annotator::config::{
    self, ConfigLoader, HighlightRequest, default_data_path,
};
use kegg_gene_annotator::error::AnnotatorError;
use kegg_gene_annotator::graph::PathwayGraph;
use kegg_gene_annotator::highlight::{self, HighlightSet};
use kegg_gene_annotator::input::read_gene_list;
use kegg_gene_annotator::kegg::KeggHttpClient;
use kegg_gene_annotator::output::{JsonOutput, StatusReport};
use kegg_gene_annotator::pipeline::PipelineSession;

#[derive(Parser)]
#[command(name = "kga")]
#[command(about = "Resumable KEGG gene-to-pathway annotator")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch gene records and build the checkpointed pathway graph")]
    Ingest(IngestArgs),
    #[command(about = "Derive highlight colors and pathway links from a complete dataset")]
    Annotate(AnnotateArgs),
    #[command(about = "Show completion state and entry counts of a data file")]
    Status(StatusArgs),
}

#[derive(Args)]
struct IngestArgs {
    /// Gene list: one `<accession> <KO code>` pair per line.
    input: Option<String>,

    #[arg(long)]
    config: Option<String>,

    /// Checkpoint/data file; defaults to the input path with `.dat`.
    #[arg(long)]
    data: Option<String>,
}

#[derive(Args)]
struct AnnotateArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    data: Option<String>,

    /// Highlight set as `<color>=<gene list file>`; repeatable.
    #[arg(long = "set", value_name = "COLOR=FILE")]
    sets: Vec<String>,

    /// Write the annotation JSON here instead of stdout.
    #[arg(long)]
    out: Option<String>,
}

#[derive(Args)]
struct StatusArgs {
    #[arg(long)]
    config: Option<String>,

    /// Checkpoint/data file; defaults to the config's data path.
    #[arg(long)]
    data: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<AnnotatorError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AnnotatorError) -> u8 {
    match error {
        AnnotatorError::DatasetComplete(_)
        | AnnotatorError::DataIncomplete(_)
        | AnnotatorError::MissingConfig => 2,
        AnnotatorError::TransientFetch(_)
        | AnnotatorError::KeggHttp(_)
        | AnnotatorError::KeggStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => run_ingest(args),
        Commands::Annotate(args) => run_annotate(args),
        Commands::Status(args) => run_status(args),
    }
}

fn run_ingest(args: IngestArgs) -> miette::Result<()> {
    let (input, data) = match args.input {
        Some(input) => {
            let input = Utf8PathBuf::from(input);
            let data = args
                .data
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| default_data_path(&input));
            (input, data)
        }
        None => {
            let resolved = ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?;
            let data = args.data.map(Utf8PathBuf::from).unwrap_or(resolved.data);
            (resolved.input, data)
        }
    };

    let inputs = read_gene_list(&input).into_diagnostic()?;
    let mut session = PipelineSession::resume(data).into_diagnostic()?;
    let client = KeggHttpClient::new().into_diagnostic()?;
    let summary = session.run(&inputs, &client).into_diagnostic()?;
    JsonOutput::print_ingest(&summary).into_diagnostic()?;
    Ok(())
}

fn run_annotate(args: AnnotateArgs) -> miette::Result<()> {
    let mut requests: Vec<HighlightRequest> = Vec::new();
    let data = if args.config.is_some() || (args.data.is_none() && args.sets.is_empty()) {
        let resolved = ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?;
        requests = resolved.highlights;
        args.data.map(Utf8PathBuf::from).unwrap_or(resolved.data)
    } else {
        args.data
            .map(Utf8PathBuf::from)
            .ok_or_else(|| miette::Report::msg("--data is required without a config file"))?
    };
    for spec in &args.sets {
        requests.push(parse_set_spec(spec).into_diagnostic()?);
    }

    let checkpoint = Checkpoint::load(&data)
        .into_diagnostic()?
        .ok_or_else(|| AnnotatorError::Checkpoint(format!("no usable data file at {data}")))
        .into_diagnostic()?;
    if !checkpoint.complete {
        return Err(AnnotatorError::DataIncomplete(data)).into_diagnostic();
    }

    let graph = PathwayGraph::from_nodes(checkpoint.pathways);
    let sets: Vec<HighlightSet> = requests
        .iter()
        .map(config::load_highlight_set)
        .collect::<Result<_, _>>()
        .into_diagnostic()?;
    let annotation = highlight::annotate(&checkpoint.genes, &graph, &sets);

    match args.out {
        Some(out) => {
            let json = serde_json::to_string_pretty(&annotation).into_diagnostic()?;
            fs::write(&out, json).into_diagnostic()?;
        }
        None => JsonOutput::print_annotation(&annotation).into_diagnostic()?,
    }
    Ok(())
}

fn run_status(args: StatusArgs) -> miette::Result<()> {
    let data = match args.data {
        Some(data) => Utf8PathBuf::from(data),
        None => {
            ConfigLoader::resolve(args.config.as_deref())
                .into_diagnostic()?
                .data
        }
    };
    let checkpoint = Checkpoint::load(&data)
        .into_diagnostic()?
        .ok_or_else(|| AnnotatorError::Checkpoint(format!("no usable data file at {data}")))
        .into_diagnostic()?;
    JsonOutput::print_status(&StatusReport {
        data: data.to_string(),
        complete: checkpoint.complete,
        genes: checkpoint.genes.len(),
        pathways: checkpoint.pathways.len(),
    })
    .into_diagnostic()?;
    Ok(())
}

fn parse_set_spec(spec: &str) -> Result<HighlightRequest, AnnotatorError> {
    let (color, path) = spec
        .split_once('=')
        .ok_or_else(|| AnnotatorError::InvalidColor(spec.to_string()))?;
    Ok(HighlightRequest {
        color: highlight::Palette::default().resolve(color)?,
        genes_path: Utf8PathBuf::from(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_data_flag_is_optional() {
        let cli = Cli::try_parse_from(["kga", "status"]).unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected the status subcommand");
        };
        assert!(args.data.is_none());
        assert!(args.config.is_none());

        let cli = Cli::try_parse_from(["kga", "status", "--data", "genes.dat"]).unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected the status subcommand");
        };
        assert_eq!(args.data.as_deref(), Some("genes.dat"));
    }
}
