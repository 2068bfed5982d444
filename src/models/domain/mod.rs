pub mod analytics;
pub mod exam_result;
pub mod student_result;

pub use analytics::Analytics;
pub use exam_result::{ExamResult, ExamStatus, ExamType};
pub use student_result::{Grade, ResultStatus, StudentResult};
