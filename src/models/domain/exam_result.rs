use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{analytics::Analytics, student_result::StudentResult};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct ExamResult {
    pub id: String,
    pub exam_name: String,
    pub exam_type: ExamType,
    pub subject: String,
    pub class: String,
    pub teacher: String,
    pub exam_date: DateTime<Utc>,
    pub total_marks: f64,
    pub passing_marks: f64,
    #[serde(default)]
    pub student_results: Vec<StudentResult>,
    #[serde(default)]
    pub analytics: Analytics,
    pub status: ExamStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "kebab-case")]
pub enum ExamType {
    Monthly,
    FirstTerm,
    SecondTerm,
    ThirdTerm,
    Final,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Monthly => "monthly",
            ExamType::FirstTerm => "first-term",
            ExamType::SecondTerm => "second-term",
            ExamType::ThirdTerm => "third-term",
            ExamType::Final => "final",
        }
    }
}

/// Workflow stage of the exam record. Unrelated to pass/fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Published => "published",
            ExamStatus::Archived => "archived",
        }
    }
}

impl ExamResult {
    /// Creates an empty draft. Student results are attached afterwards and go
    /// through the aggregator before the first save.
    #[allow(clippy::too_many_arguments)]
    pub fn new_draft(
        exam_name: &str,
        exam_type: ExamType,
        subject: &str,
        class: &str,
        teacher: &str,
        exam_date: DateTime<Utc>,
        total_marks: f64,
        passing_marks: f64,
    ) -> Self {
        let now = Utc::now();
        ExamResult {
            id: Uuid::new_v4().to_string(),
            exam_name: exam_name.to_string(),
            exam_type,
            subject: subject.to_string(),
            class: class.to_string(),
            teacher: teacher.to_string(),
            exam_date,
            total_marks,
            passing_marks,
            student_results: Vec::new(),
            analytics: Analytics::default(),
            status: ExamStatus::Draft,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ExamStatus::Published
    }

    pub fn result_for(&self, student: &str) -> Option<&StudentResult> {
        self.student_results.iter().find(|r| r.student == student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::student_result::{Grade, ResultStatus};

    fn make_exam() -> ExamResult {
        ExamResult::new_draft(
            "Unit Test 1",
            ExamType::FirstTerm,
            "Mathematics",
            "class-10a",
            "teacher-1",
            Utc::now(),
            100.0,
            40.0,
        )
    }

    #[test]
    fn new_draft_starts_empty_with_zero_analytics() {
        let exam = make_exam();

        assert_eq!(exam.status, ExamStatus::Draft);
        assert!(exam.student_results.is_empty());
        assert_eq!(exam.analytics, Analytics::default());
        assert!(Uuid::parse_str(&exam.id).is_ok());
        assert!(exam.created_at.is_some());
        assert!(!exam.is_published());
    }

    #[test]
    fn exam_type_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&ExamType::SecondTerm).expect("should serialize");
        assert_eq!(json, "\"second-term\"");

        let parsed: ExamType = serde_json::from_str("\"third-term\"").expect("should parse");
        assert_eq!(parsed, ExamType::ThirdTerm);
        assert_eq!(parsed.as_str(), "third-term");
    }

    #[test]
    fn exam_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<ExamStatus>("\"deleted\"").is_err());
        assert_eq!(ExamStatus::default(), ExamStatus::Draft);
    }

    #[test]
    fn result_for_finds_student_entry() {
        let mut exam = make_exam();
        exam.student_results.push(StudentResult {
            student: "student-7".to_string(),
            marks_obtained: 91.0,
            grade: Grade::APlus,
            percentage: 91.0,
            status: ResultStatus::Pass,
            remarks: Some("Excellent".to_string()),
        });

        let found = exam.result_for("student-7").expect("entry should exist");
        assert_eq!(found.grade, Grade::APlus);
        assert!(exam.result_for("student-8").is_none());
    }

    #[test]
    fn exam_result_deserializes_without_results_or_analytics() {
        let json = serde_json::json!({
            "id": "exam-1",
            "exam_name": "Monthly Test",
            "exam_type": "monthly",
            "subject": "Physics",
            "class": "class-9b",
            "teacher": "teacher-2",
            "exam_date": "2024-03-01T09:00:00Z",
            "total_marks": 50.0,
            "passing_marks": 20.0,
            "status": "published"
        });

        let exam: ExamResult = serde_json::from_value(json).expect("should deserialize");
        assert!(exam.student_results.is_empty());
        assert_eq!(exam.analytics, Analytics::default());
        assert!(exam.is_published());
    }
}
