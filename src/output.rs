use std::io::{self, Write};

use serde::Serialize;

use crate::highlight::Annotation;
use crate::pipeline::IngestSummary;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub data: String,
    pub complete: bool,
    pub genes: usize,
    pub pathways: usize,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_ingest(result: &IngestSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_annotation(result: &Annotation) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_status(result: &StatusReport) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
