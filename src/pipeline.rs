use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::info;

use crate::checkpoint::Checkpoint;
use crate::domain::GeneRecord;
use crate::error::AnnotatorError;
use crate::graph::PathwayGraph;
use crate::input::GeneInput;
use crate::kegg::KeggClient;

/// Checkpoint cadence: a snapshot is written at every 100th gene of the
/// whole dataset, counted across runs, plus on every exit path.
const CHECKPOINT_EVERY: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub total_inputs: usize,
    pub resumed_from: usize,
    pub fetched: usize,
    pub genes: usize,
    pub pathways: usize,
    pub complete: bool,
}

/// All state of one ingestion run: the checkpoint location, the gene list
/// in input order and the pathway graph. Owning this in a value (instead
/// of module-level globals) is what lets a caller run several datasets in
/// one process.
#[derive(Debug)]
pub struct PipelineSession {
    checkpoint_path: Utf8PathBuf,
    genes: Vec<GeneRecord>,
    graph: PathwayGraph,
    resume_count: usize,
}

impl PipelineSession {
    /// Seeds the session from an existing checkpoint, or starts empty if
    /// there is none. A checkpoint already marked complete is terminal:
    /// re-ingesting into it would duplicate graph edges, so this fails
    /// before any mutation.
    pub fn resume(checkpoint_path: Utf8PathBuf) -> Result<Self, AnnotatorError> {
        match Checkpoint::load(&checkpoint_path)? {
            Some(checkpoint) if checkpoint.complete => {
                Err(AnnotatorError::DatasetComplete(checkpoint_path))
            }
            Some(checkpoint) => {
                info!(
                    path = %checkpoint_path,
                    genes = checkpoint.genes.len(),
                    "resuming from checkpoint"
                );
                Ok(Self {
                    checkpoint_path,
                    resume_count: checkpoint.genes.len(),
                    genes: checkpoint.genes,
                    graph: PathwayGraph::from_nodes(checkpoint.pathways),
                })
            }
            None => Ok(Self {
                checkpoint_path,
                genes: Vec::new(),
                graph: PathwayGraph::new(),
                resume_count: 0,
            }),
        }
    }

    pub fn checkpoint_path(&self) -> &Utf8Path {
        &self.checkpoint_path
    }

    pub fn genes(&self) -> &[GeneRecord] {
        &self.genes
    }

    pub fn graph(&self) -> &PathwayGraph {
        &self.graph
    }

    pub fn resume_count(&self) -> usize {
        self.resume_count
    }

    /// Drives the fetcher over the full input list, strictly in file
    /// order, one gene at a time. Entries up to `resume_count` are
    /// already persisted and skipped without a fetch. A transient fetch
    /// failure checkpoints the fully-processed prefix with
    /// `complete=false` and surfaces the error so the caller can resume
    /// later; exhausting the input writes the terminal `complete=true`
    /// snapshot.
    pub fn run(
        &mut self,
        inputs: &[GeneInput],
        client: &impl KeggClient,
    ) -> Result<IngestSummary, AnnotatorError> {
        // Crash-consistency guard for the boundary gene: a prior run may
        // have updated the graph for this gene but died before writing
        // the checkpoint. Only the first gene processed after a resume
        // can be in that state.
        let mut boundary_guard = self.resume_count > 0;
        let mut fetched = 0usize;

        for (position, input) in inputs.iter().enumerate() {
            let n = position + 1;
            if n <= self.resume_count {
                continue;
            }

            info!(n, ko = %input.ko_code, gene = %input.gene_number, "fetching gene");
            let profile = match client.fetch_gene(&input.ko_code) {
                Ok(profile) => profile,
                Err(err) => {
                    self.save(false)?;
                    info!(n, "fetch failed; partial progress saved");
                    return Err(err);
                }
            };

            let record = GeneRecord {
                gene_number: input.gene_number.clone(),
                ko_code: input.ko_code.clone(),
                name: profile.name,
                definition: profile.definition,
                pathway_refs: profile.pathway_refs,
            };
            for reference in &record.pathway_refs {
                if boundary_guard && self.graph.has_member(&reference.map_code, &record.ko_code)
                {
                    continue;
                }
                self.graph
                    .upsert_pathway_reference(&reference.map_code, &reference.name, &record.ko_code);
            }
            self.genes.push(record);
            fetched += 1;
            boundary_guard = false;

            if n % CHECKPOINT_EVERY == 0 {
                self.save(false)?;
            }
        }

        self.save(true)?;
        info!(
            genes = self.genes.len(),
            pathways = self.graph.len(),
            "ingestion complete"
        );
        Ok(IngestSummary {
            total_inputs: inputs.len(),
            resumed_from: self.resume_count,
            fetched,
            genes: self.genes.len(),
            pathways: self.graph.len(),
            complete: true,
        })
    }

    fn save(&self, complete: bool) -> Result<(), AnnotatorError> {
        Checkpoint {
            complete,
            genes: self.genes.clone(),
            pathways: self.graph.nodes().to_vec(),
        }
        .write(&self.checkpoint_path)
    }
}
