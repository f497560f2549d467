//! Resumable KEGG gene-to-pathway annotator: fetches per-gene records
//! from the KEGG REST service, builds a deduplicated gene/pathway graph
//! with periodic binary checkpoints, and derives blended highlight colors
//! over the finished graph for pathway-map links.

pub mod checkpoint;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod input;
pub mod kegg;
pub mod output;
pub mod pipeline;
