#[cfg(test)]
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::models::domain::{ExamResult, ExamType};
    use crate::models::dto::request::{CreateExamResultRequest, StudentResultInput};
    use crate::services::exam_result_service::ExamResultService;

    pub fn student_input(student: &str, marks: f64) -> StudentResultInput {
        StudentResultInput {
            student: student.to_string(),
            marks_obtained: marks,
            remarks: None,
        }
    }

    /// A first-term maths exam out of 100, passing at 40.
    pub fn create_request(student_results: Vec<StudentResultInput>) -> CreateExamResultRequest {
        CreateExamResultRequest {
            exam_name: "First Term Examination".to_string(),
            exam_type: ExamType::FirstTerm,
            subject: "Mathematics".to_string(),
            class: "class-10a".to_string(),
            teacher: "teacher-1".to_string(),
            exam_date: Utc.with_ymd_and_hms(2024, 4, 15, 9, 0, 0).unwrap(),
            total_marks: 100.0,
            passing_marks: 40.0,
            student_results,
        }
    }

    /// A draft exam out of 100 (passing at 40) already run through the save
    /// pipeline. Students are named `student-0`, `student-1`, ...
    pub fn graded_exam(marks: &[f64]) -> ExamResult {
        let mut exam = ExamResult::new_draft(
            "First Term Examination",
            ExamType::FirstTerm,
            "Mathematics",
            "class-10a",
            "teacher-1",
            Utc.with_ymd_and_hms(2024, 4, 15, 9, 0, 0).unwrap(),
            100.0,
            40.0,
        );
        let inputs = marks
            .iter()
            .enumerate()
            .map(|(i, m)| student_input(&format!("student-{}", i), *m))
            .collect();
        ExamResultService::prepare_for_save(&mut exam, inputs).expect("fixture marks are valid");
        exam
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::ExamStatus;

    #[test]
    fn test_fixtures_graded_exam() {
        let exam = graded_exam(&[80.0, 20.0]);
        assert_eq!(exam.status, ExamStatus::Draft);
        assert_eq!(exam.student_results[1].student, "student-1");
        assert_eq!(exam.analytics.passed_students, 1);
        assert_eq!(exam.analytics.failed_students, 1);
    }

    #[test]
    fn test_fixtures_create_request() {
        let request = create_request(vec![student_input("s-1", 10.0)]);
        assert_eq!(request.total_marks, 100.0);
        assert_eq!(request.student_results.len(), 1);
    }
}
