use crate::render::RenderedArtifact;
use crate::rows::ApiCallRow;

/// Ranked plain-text digest of the most frequent calls.
///
/// Rows are taken in the order given; the query already sorts them by
/// descending frequency.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRenderer {
    top_n: usize,
}

impl SummaryRenderer {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn render(&self, rows: &[ApiCallRow]) -> RenderedArtifact {
        let lines: Vec<String> = rows
            .iter()
            .take(self.top_n)
            .enumerate()
            .map(|(i, row)| {
                format!(
                    "{}. {} ({} times) - Principal: {} [{}]",
                    i + 1,
                    row.event_name,
                    row.frequency,
                    row.principal,
                    row.principal_type
                )
            })
            .collect();

        RenderedArtifact::text(format!(
            "Top {} API Calls by IAM Principal:\n\n{}",
            self.top_n,
            lines.join("\n")
        ))
    }
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self::new(5)
    }
}
