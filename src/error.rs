use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotatorError {
    #[error("invalid KO code: {0}")]
    InvalidKoCode(String),

    #[error("invalid pathway map code: {0}")]
    InvalidMapCode(String),

    #[error("invalid gene accession: {0}")]
    InvalidGeneNumber(String),

    #[error("invalid highlight color: {0}")]
    InvalidColor(String),

    #[error("missing config file kga.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("KEGG request failed: {0}")]
    KeggHttp(String),

    #[error("KEGG returned status {status}: {message}")]
    KeggStatus { status: u16, message: String },

    #[error("transient fetch failure, partial progress saved: {0}")]
    #[diagnostic(help("re-run ingestion to resume from the checkpoint"))]
    TransientFetch(String),

    #[error("dataset at {0} is already complete")]
    #[diagnostic(help(
        "move or rename the data file if you want to ingest a different gene list"
    ))]
    DatasetComplete(Utf8PathBuf),

    #[error("dataset at {0} is not complete; run ingestion first")]
    DataIncomplete(Utf8PathBuf),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
