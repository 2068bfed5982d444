pub mod exam_result_repository;

pub use exam_result_repository::{
    ExamResultFilter, ExamResultRepository, MongoExamResultRepository,
};

#[cfg(test)]
pub use exam_result_repository::MockExamResultRepository;
