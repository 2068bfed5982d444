pub mod exam_result_service;
pub mod result_aggregator;

pub use exam_result_service::ExamResultService;
pub use result_aggregator::{AggregationError, ResultAggregator};
