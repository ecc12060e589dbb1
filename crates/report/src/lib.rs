pub mod error;
pub mod pipeline;
pub mod render;
pub mod response;
pub mod rows;
pub mod runtime;

pub use error::ReportError;
pub use pipeline::{FlowStage, PublishedReport, ReportKind, ReportPipeline};
pub use render::{ChartRenderer, RenderedArtifact, SummaryRenderer};
pub use response::InvocationResponse;
pub use rows::{parse_rows, ApiCallRow, RowError};
