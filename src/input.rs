use std::fs;

use camino::Utf8Path;
use tracing::warn;

use crate::domain::{GeneNumber, KoCode};
use crate::error::AnnotatorError;

/// One usable input line: the caller's gene accession and the KO code to
/// query KEGG with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneInput {
    pub gene_number: GeneNumber,
    pub ko_code: KoCode,
}

/// Reads the gene list, keeping only lines that split into exactly two
/// tokens with a well-formed KO code. Everything else (unannotated genes,
/// comments, stray text) is skipped with a warning; the pipeline never
/// sees it.
pub fn read_gene_list(path: &Utf8Path) -> Result<Vec<GeneInput>, AnnotatorError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| AnnotatorError::Filesystem(format!("read {path}: {err}")))?;
    Ok(filter_gene_lines(&content))
}

pub fn filter_gene_lines(content: &str) -> Vec<GeneInput> {
    let mut inputs = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [gene_number, ko_code] = tokens.as_slice() else {
            if !line.trim().is_empty() {
                warn!(line = lineno + 1, "skipping line without exactly two tokens");
            }
            continue;
        };
        let (Ok(gene_number), Ok(ko_code)) =
            (gene_number.parse::<GeneNumber>(), ko_code.parse::<KoCode>())
        else {
            warn!(line = lineno + 1, "skipping line with malformed identifiers");
            continue;
        };
        inputs.push(GeneInput {
            gene_number,
            ko_code,
        });
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_two_token_lines() {
        let content = "G1 K00001\nunannotated\nG2 K00002 extra\n\nG3 K00003\n";
        let inputs = filter_gene_lines(content);
        let codes: Vec<&str> = inputs.iter().map(|i| i.ko_code.as_str()).collect();
        assert_eq!(codes, vec!["K00001", "K00003"]);
    }

    #[test]
    fn drops_malformed_ko_codes() {
        let content = "G1 notako\nG2 K00002\n";
        let inputs = filter_gene_lines(content);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].gene_number.as_str(), "G2");
    }
}
