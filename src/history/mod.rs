//! History compression for the refinement loop

mod compressor;

pub use compressor::{AttemptSummary, CompressedHistory, HistoryCompressor, HistoryLimits};
