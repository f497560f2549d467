use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::{KoCode, PathwayRef};
use crate::error::AnnotatorError;

/// Everything KEGG reports about one KO entry. Combined with the
/// caller-supplied accession this becomes a [`crate::domain::GeneRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneProfile {
    pub name: String,
    pub definition: String,
    pub pathway_refs: Vec<PathwayRef>,
}

pub trait KeggClient: Send + Sync {
    fn fetch_gene(&self, code: &KoCode) -> Result<GeneProfile, AnnotatorError>;
}

#[derive(Clone)]
pub struct KeggHttpClient {
    client: Client,
    base_url: String,
}

impl KeggHttpClient {
    pub fn new() -> Result<Self, AnnotatorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kga/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AnnotatorError::KeggHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| AnnotatorError::KeggHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://rest.kegg.jp".to_string(),
        })
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, AnnotatorError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(status, attempt, "retrying KEGG request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(attempt, "retrying KEGG request after transport error");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(AnnotatorError::TransientFetch(err.to_string()));
                }
            }
        }
    }
}

impl KeggClient for KeggHttpClient {
    fn fetch_gene(&self, code: &KoCode) -> Result<GeneProfile, AnnotatorError> {
        let url = format!("{}/get/{}", self.base_url, code.as_str());
        let response = self.send_with_retries(|| self.client.get(&url))?;

        let status = response.status();
        if is_retryable_status(status.as_u16()) {
            return Err(AnnotatorError::TransientFetch(format!(
                "KEGG returned status {} for {}",
                status.as_u16(),
                code
            )));
        }
        if status.is_client_error() {
            // Unknown KO entries come back as 404; that is an empty
            // record, not a failure.
            debug!(code = %code, status = status.as_u16(), "KEGG entry not found");
            return Ok(GeneProfile::default());
        }
        if !status.is_success() {
            return Err(AnnotatorError::KeggStatus {
                status: status.as_u16(),
                message: format!("unexpected response for {code}"),
            });
        }

        let body = response
            .text()
            .map_err(|err| AnnotatorError::TransientFetch(err.to_string()))?;
        Ok(parse_gene_record(&body))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Parses the line-oriented `KEY value` flat-file format KEGG serves for
/// `get` requests. Only `NAME`, `DEFINITION` and the `PATHWAY` block are
/// recognized; the pathway block continues on indented `ko#####` lines
/// until the first line that does not carry the prefix. Anything else is
/// ignored, and a body with none of the recognized sections yields an
/// empty profile.
pub fn parse_gene_record(body: &str) -> GeneProfile {
    let mut profile = GeneProfile::default();
    let mut in_pathways = false;

    for line in body.lines() {
        if in_pathways {
            let entry = line.trim_start();
            if let Some(stripped) = entry.strip_prefix("ko") {
                if let Some(reference) = parse_pathway_entry(stripped) {
                    profile.pathway_refs.push(reference);
                }
            } else {
                break;
            }
            continue;
        }

        let Some((key, value)) = split_record_line(line) else {
            continue;
        };
        match key {
            "NAME" if profile.name.is_empty() => profile.name = value.to_string(),
            "DEFINITION" if profile.definition.is_empty() => {
                profile.definition = value.to_string();
            }
            "PATHWAY" => {
                in_pathways = true;
                if let Some(stripped) = value.strip_prefix("ko") {
                    if let Some(reference) = parse_pathway_entry(stripped) {
                        profile.pathway_refs.push(reference);
                    }
                }
            }
            _ => {}
        }
    }

    profile
}

/// Splits `KEY  value` at the first run of whitespace. Lines without a
/// value column (including blank ones) are skipped by the caller.
fn split_record_line(line: &str) -> Option<(&str, &str)> {
    let key_end = line.find(char::is_whitespace)?;
    let (key, rest) = line.split_at(key_end);
    let value = rest.trim_start();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// `stripped` is a pathway entry with the leading `ko` already removed,
/// e.g. `00010  Glycolysis / Gluconeogenesis`. The `ko` prefix is
/// rewritten to `map` before storage.
fn parse_pathway_entry(stripped: &str) -> Option<PathwayRef> {
    let rewritten = format!("map{stripped}");
    let (code, name) = match rewritten.find(char::is_whitespace) {
        Some(end) => {
            let (code, rest) = rewritten.split_at(end);
            (code, rest.trim())
        }
        None => (rewritten.as_str(), ""),
    };
    let map_code = code.parse().ok()?;
    Some(PathwayRef {
        map_code,
        name: name.to_string(),
    })
}
