pub mod preview;
pub mod templates;

pub use preview::{PreviewOutcome, PreviewService, PreviewTracker};
pub use templates::TemplateService;
