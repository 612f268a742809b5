pub mod dto;

pub use dto::{
    epoch_sentinel, OrderSummary, RecomputeOutcome, SummaryDelta, WatermarkPolicy, SUMMARY_ROW_ID,
};
