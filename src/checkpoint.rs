use std::fs;
use std::io::Write;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::GeneRecord;
use crate::error::AnnotatorError;
use crate::graph::PathwayNode;

/// Durable snapshot of ingestion progress: the completion flag, every
/// fetched gene record in input order, and every pathway node in
/// first-seen order. On disk this is one bincode stream — the flag, then
/// a count-prefixed run of gene records, then a count-prefixed run of
/// pathway nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub complete: bool,
    pub genes: Vec<GeneRecord>,
    pub pathways: Vec<PathwayNode>,
}

impl Checkpoint {
    /// Loads a checkpoint if a usable one exists. An absent file and an
    /// unreadable or truncated one both come back as `None`; the latter
    /// is reported loudly, since starting fresh discards prior progress.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>, AnnotatorError> {
        let bytes = match fs::read(path.as_std_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AnnotatorError::Filesystem(err.to_string())),
        };

        match bincode::deserialize::<Checkpoint>(&bytes) {
            Ok(checkpoint) => {
                debug!(
                    path = %path,
                    genes = checkpoint.genes.len(),
                    pathways = checkpoint.pathways.len(),
                    complete = checkpoint.complete,
                    "loaded checkpoint"
                );
                Ok(Some(checkpoint))
            }
            Err(err) => {
                warn!(
                    path = %path,
                    error = %err,
                    "checkpoint is unreadable or truncated; starting fresh and discarding it"
                );
                Ok(None)
            }
        }
    }

    /// Serializes to a sibling temp file and renames it over the target,
    /// so a crash mid-write never leaves a truncated checkpoint behind.
    pub fn write(&self, path: &Utf8Path) -> Result<(), AnnotatorError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.as_std_path(),
            _ => std::path::Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;

        let bytes = bincode::serialize(self)
            .map_err(|err| AnnotatorError::Checkpoint(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".kga-checkpoint")
            .tempfile_in(parent)
            .map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
        temp.write_all(&bytes)
            .map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
        temp.flush()
            .map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
        debug!(
            path = %path,
            genes = self.genes.len(),
            pathways = self.pathways.len(),
            complete = self.complete,
            "wrote checkpoint"
        );
        Ok(())
    }
}
