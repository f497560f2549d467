use std::collections::HashSet;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;
use crate::highlight::{HighlightSet, Palette};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub input: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub highlights: Vec<HighlightEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HighlightEntry {
    /// Palette color name or a literal 6-hex-digit value.
    pub color: String,
    /// Path to a file with one gene accession per line.
    pub genes: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub input: Utf8PathBuf,
    pub data: Utf8PathBuf,
    pub highlights: Vec<HighlightRequest>,
}

#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pub color: crate::domain::Rgb,
    pub genes_path: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, AnnotatorError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from("kga.json"),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Err(AnnotatorError::MissingConfig);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| AnnotatorError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| AnnotatorError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, AnnotatorError> {
        let input = Utf8PathBuf::from(config.input);
        let data = match config.data {
            Some(data) => Utf8PathBuf::from(data),
            None => default_data_path(&input),
        };

        let palette = Palette::default();
        let highlights = config
            .highlights
            .into_iter()
            .map(|entry| {
                Ok(HighlightRequest {
                    color: palette.resolve(&entry.color)?,
                    genes_path: Utf8PathBuf::from(entry.genes),
                })
            })
            .collect::<Result<Vec<_>, AnnotatorError>>()?;

        Ok(ResolvedConfig {
            input,
            data,
            highlights,
        })
    }
}

/// The checkpoint sits next to the input list with a `.dat` extension.
pub fn default_data_path(input: &Utf8Path) -> Utf8PathBuf {
    input.with_extension("dat")
}

/// Reads a highlight gene-set file: one accession per line, trimmed,
/// blanks skipped.
pub fn load_highlight_set(request: &HighlightRequest) -> Result<HighlightSet, AnnotatorError> {
    let content = fs::read_to_string(request.genes_path.as_std_path()).map_err(|err| {
        AnnotatorError::Filesystem(format!("read {}: {err}", request.genes_path))
    })?;
    let genes: HashSet<_> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.parse())
        .collect::<Result<_, AnnotatorError>>()?;
    Ok(HighlightSet {
        color: request.color,
        genes,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn resolve_defaults_data_path() {
        let config = Config {
            input: "lists/genes.txt".to_string(),
            data: None,
            highlights: Vec::new(),
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.data, Utf8PathBuf::from("lists/genes.dat"));
    }

    #[test]
    fn resolve_palette_names_and_hex() {
        let config = Config {
            input: "genes.txt".to_string(),
            data: Some("genes.dat".to_string()),
            highlights: vec![
                HighlightEntry {
                    color: "red".to_string(),
                    genes: "upregulated.txt".to_string(),
                },
                HighlightEntry {
                    color: "0000FF".to_string(),
                    genes: "downregulated.txt".to_string(),
                },
            ],
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.highlights[0].color.to_hex(), "ff261f");
        assert_eq!(resolved.highlights[1].color.to_hex(), "0000ff");
    }

    #[test]
    fn resolve_rejects_unknown_color() {
        let config = Config {
            input: "genes.txt".to_string(),
            data: None,
            highlights: vec![HighlightEntry {
                color: "chartreuse-ish".to_string(),
                genes: "set.txt".to_string(),
            }],
        };
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidColor(_));
    }
}
