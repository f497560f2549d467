use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// KEGG orthology cross-reference key (`K#####`). Doubles as a gene's
/// identity inside pathway membership sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KoCode(String);

impl KoCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KoCode {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let mut chars = normalized.chars();
        let is_valid = chars.next() == Some('K')
            && normalized.len() > 1
            && chars.all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(AnnotatorError::InvalidKoCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Stable 8-character pathway key, always `map` followed by five digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapCode(String);

impl MapCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MapCode {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid = normalized.len() == 8
            && normalized.starts_with("map")
            && normalized[3..].chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(AnnotatorError::InvalidMapCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Caller-supplied gene accession from the input list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneNumber(String);

impl GeneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeneNumber {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if normalized.is_empty() || normalized.chars().any(|ch| ch.is_whitespace()) {
            return Err(AnnotatorError::InvalidGeneNumber(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// One pathway reference from a fetched gene record, already rewritten
/// from the `ko#####` form to the `map#####` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayRef {
    pub map_code: MapCode,
    pub name: String,
}

/// Fetched gene metadata. Immutable once created; the pipeline only ever
/// appends whole records to its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub gene_number: GeneNumber,
    pub ko_code: KoCode,
    pub name: String,
    pub definition: String,
    pub pathway_refs: Vec<PathwayRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase 6-hex-digit form without a leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(AnnotatorError::InvalidColor(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&trimmed[range], 16)
                .map_err(|_| AnnotatorError::InvalidColor(value.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_ko_code_valid() {
        let code: KoCode = "k04958".parse().unwrap();
        assert_eq!(code.as_str(), "K04958");
    }

    #[test]
    fn parse_ko_code_invalid() {
        let err = "X123".parse::<KoCode>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidKoCode(_));
        let err = "K12a4".parse::<KoCode>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidKoCode(_));
    }

    #[test]
    fn parse_map_code_valid() {
        let code: MapCode = "map00010".parse().unwrap();
        assert_eq!(code.as_str(), "map00010");
    }

    #[test]
    fn parse_map_code_invalid() {
        let err = "ko00010".parse::<MapCode>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidMapCode(_));
        let err = "map001".parse::<MapCode>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidMapCode(_));
    }

    #[test]
    fn parse_gene_number() {
        let gene: GeneNumber = " GQ0042 ".parse().unwrap();
        assert_eq!(gene.as_str(), "GQ0042");
        let err = "two tokens".parse::<GeneNumber>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidGeneNumber(_));
    }

    #[test]
    fn rgb_round_trip() {
        let color: Rgb = "FF261F".parse().unwrap();
        assert_eq!(color, Rgb::new(0xFF, 0x26, 0x1F));
        assert_eq!(color.to_hex(), "ff261f");
        let err = "12345".parse::<Rgb>().unwrap_err();
        assert_matches!(err, AnnotatorError::InvalidColor(_));
    }
}
