//! Per-tick spectrum analysis: smoothing, statistics and frame history.

pub mod history;
pub mod session;
pub mod smoothing;
pub mod stats;

pub use history::HistoryBuffer;
pub use session::AnalysisSession;
pub use smoothing::smooth_bins;
pub use stats::FrameStats;
