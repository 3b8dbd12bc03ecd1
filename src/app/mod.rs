// Application layer - use case orchestration

pub mod export_interactor;

pub use export_interactor::{ExportInteractor, ExportRequest, ExportResponse, PersistOutcome};
