use serde::Deserialize;

/// Placeholder emitted for any summary field the service did not return.
pub const MISSING_FIELD: &str = "N/A";

/// One esummary document for a nucleotide record.
///
/// Every field is optional on the wire; [`SummaryRecord::to_row`] substitutes
/// [`MISSING_FIELD`] for anything absent so the output schema stays fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "accessionversion")]
    pub accession: Option<String>,

    #[serde(rename = "taxid")]
    pub tax_id: Option<u64>,

    pub title: Option<String>,

    pub organism: Option<String>,

    #[serde(rename = "slen")]
    pub length: Option<u64>,

    #[serde(rename = "updatedate")]
    pub update_date: Option<String>,
}

impl SummaryRecord {
    /// Project into the fixed six-column row, in header order:
    /// Accession, TaxonomyId, Title, Organism, Length, UpdateDate.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.accession.clone().unwrap_or_else(na),
            self.tax_id.map(|t| t.to_string()).unwrap_or_else(na),
            self.title.clone().unwrap_or_else(na),
            self.organism.clone().unwrap_or_else(na),
            self.length.map(|l| l.to_string()).unwrap_or_else(na),
            self.update_date.clone().unwrap_or_else(na),
        ]
    }
}

fn na() -> String {
    MISSING_FIELD.to_string()
}
