pub mod p001_recompute_summary;

pub use p001_recompute_summary::P001RecomputeSummaryManager;
