//! Blocking client for the NCBI Entrez eutils endpoints.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::batch::BatchFetch;
use super::paged::SearchService;
use super::summary::SummaryRecord;
use crate::{Result, VirofetchError};

const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Upper bound on any single eutils request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct EutilsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    db: String,
    email: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Deserialize)]
struct EsummaryResponse {
    result: EsummaryResult,
}

#[derive(Deserialize)]
struct EsummaryResult {
    /// Response order; the per-uid documents are flattened alongside.
    #[serde(default)]
    uids: Vec<String>,

    #[serde(flatten)]
    documents: HashMap<String, serde_json::Value>,
}

impl EutilsClient {
    /// NCBI requires a contact email on every request; `api_key` raises the
    /// rate limit when present.
    pub fn new(db: &str, email: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("virofetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VirofetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: EUTILS_BASE_URL.to_string(),
            db: db.to_string(),
            email: email.to_string(),
            api_key,
        })
    }

    /// Point the client at a different eutils mirror.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<reqwest::blocking::Response> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("tool", "virofetch"), ("email", self.email.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request
            .send()
            .map_err(|e| VirofetchError::Transient(format!("{} request failed: {}", endpoint, e)))?;
        if !response.status().is_success() {
            return Err(VirofetchError::Transient(format!(
                "{} returned status {}",
                endpoint,
                response.status()
            )));
        }
        Ok(response)
    }

    /// One esearch page of identifiers for `term`.
    pub fn esearch(&self, term: &str, retstart: usize, retmax: usize) -> Result<Vec<String>> {
        let retstart = retstart.to_string();
        let retmax = retmax.to_string();
        let response = self.get(
            "esearch.fcgi",
            &[
                ("db", self.db.as_str()),
                ("term", term),
                ("retstart", retstart.as_str()),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
            ],
        )?;

        let parsed: EsearchResponse = response
            .json()
            .map_err(|e| VirofetchError::Transient(format!("malformed esearch response: {}", e)))?;
        Ok(parsed.esearchresult.idlist)
    }

    /// FASTA records for a batch of identifiers, split per record in
    /// response order.
    pub fn efetch_fasta(&self, ids: &[String]) -> Result<Vec<String>> {
        let joined = ids.join(",");
        let response = self.get(
            "efetch.fcgi",
            &[
                ("db", self.db.as_str()),
                ("id", joined.as_str()),
                ("rettype", "fasta"),
                ("retmode", "text"),
            ],
        )?;

        let body = response
            .text()
            .map_err(|e| VirofetchError::Transient(format!("failed to read efetch body: {}", e)))?;
        Ok(split_fasta_records(&body))
    }

    /// Summary documents for a batch of identifiers, in the order the
    /// service lists them under `result.uids`.
    pub fn esummary(&self, ids: &[String]) -> Result<Vec<SummaryRecord>> {
        let joined = ids.join(",");
        let response = self.get(
            "esummary.fcgi",
            &[
                ("db", self.db.as_str()),
                ("id", joined.as_str()),
                ("retmode", "json"),
            ],
        )?;

        let parsed: EsummaryResponse = response
            .json()
            .map_err(|e| VirofetchError::Transient(format!("malformed esummary response: {}", e)))?;

        summary_records(parsed.result)
    }
}

/// Order the flattened documents by `result.uids`. A listed uid with no
/// document, or a document that does not deserialize, fails the whole batch
/// so the chunk is recorded as failed instead of silently shortening the
/// output.
fn summary_records(result: EsummaryResult) -> Result<Vec<SummaryRecord>> {
    let mut records = Vec::with_capacity(result.uids.len());
    for uid in &result.uids {
        let doc = result.documents.get(uid).ok_or_else(|| {
            VirofetchError::Parse(format!("esummary response has no document for uid {}", uid))
        })?;
        let record = serde_json::from_value(doc.clone()).map_err(|e| {
            VirofetchError::Parse(format!("unparsable summary document for uid {}: {}", uid, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

impl SearchService for EutilsClient {
    fn search_page(&self, query: &str, retstart: usize, retmax: usize) -> Result<Vec<String>> {
        self.esearch(query, retstart, retmax)
    }
}

/// Sequence retrieval: one efetch request per chunk, one FASTA record out.
pub struct SequenceBatch<'a>(pub &'a EutilsClient);

impl BatchFetch for SequenceBatch<'_> {
    type Record = String;

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<String>> {
        self.0.efetch_fasta(ids)
    }
}

/// Metadata retrieval: one esummary request per chunk, structured records out.
pub struct SummaryBatch<'a>(pub &'a EutilsClient);

impl BatchFetch for SummaryBatch<'_> {
    type Record = SummaryRecord;

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<SummaryRecord>> {
        self.0.esummary(ids)
    }
}

/// Split a multi-record FASTA body into one string per record, preserving
/// response order. Text before the first header and blank separator lines
/// are dropped; each record keeps a trailing newline.
pub fn split_fasta_records(body: &str) -> Vec<String> {
    let mut records: Vec<String> = Vec::new();
    for line in body.lines() {
        if line.starts_with('>') {
            records.push(String::new());
        }
        if let Some(current) = records.last_mut() {
            if line.starts_with('>') || !line.trim().is_empty() {
                current.push_str(line);
                current.push('\n');
            }
        }
    }
    records
}
