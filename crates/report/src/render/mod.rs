//! Turning parsed rows into publishable documents.

pub mod chart;
pub mod summary;

pub use chart::ChartRenderer;
pub use summary::SummaryRenderer;

/// A rendered document ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub body: String,
    pub content_type: &'static str,
}

impl RenderedArtifact {
    pub fn html(body: String) -> Self {
        Self {
            body,
            content_type: "text/html",
        }
    }

    pub fn text(body: String) -> Self {
        Self {
            body,
            content_type: "text/plain; charset=utf-8",
        }
    }
}
