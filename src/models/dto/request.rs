use std::collections::HashSet;

use async_graphql::InputObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{ExamStatus, ExamType, StudentResult};

/// Raw marks for one student as entered by a teacher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate, InputObject)]
pub struct StudentResultInput {
    #[validate(length(min = 1, max = 100))]
    pub student: String,

    #[validate(range(min = 0.0))]
    pub marks_obtained: f64,

    #[validate(length(max = 500))]
    #[serde(default)]
    pub remarks: Option<String>,
}

impl From<&StudentResult> for StudentResultInput {
    fn from(result: &StudentResult) -> Self {
        StudentResultInput {
            student: result.student.clone(),
            marks_obtained: result.marks_obtained,
            remarks: result.remarks.clone(),
        }
    }
}

impl StudentResultInput {
    /// Drops blank remarks so they are not stored as empty strings.
    pub fn normalized(mut self) -> Self {
        self.remarks = self.remarks.and_then(none_if_empty);
        self
    }
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[validate(schema(function = "validate_create_marking_scheme"))]
pub struct CreateExamResultRequest {
    #[validate(length(min = 1, max = 200))]
    pub exam_name: String,

    pub exam_type: ExamType,

    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 200))]
    pub class: String,

    #[validate(length(min = 1, max = 200))]
    pub teacher: String,

    pub exam_date: DateTime<Utc>,

    #[validate(range(exclusive_min = 0.0))]
    pub total_marks: f64,

    #[validate(range(min = 0.0))]
    pub passing_marks: f64,

    #[validate(nested)]
    #[serde(default)]
    #[graphql(default)]
    pub student_results: Vec<StudentResultInput>,
}

/// Partial update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct UpdateExamResultRequest {
    #[validate(length(min = 1, max = 200))]
    pub exam_name: Option<String>,

    pub exam_type: Option<ExamType>,

    #[validate(length(min = 1, max = 200))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub class: Option<String>,

    pub exam_date: Option<DateTime<Utc>>,

    #[validate(range(exclusive_min = 0.0))]
    pub total_marks: Option<f64>,

    #[validate(range(min = 0.0))]
    pub passing_marks: Option<f64>,

    #[validate(nested)]
    pub student_results: Option<Vec<StudentResultInput>>,
}

impl UpdateExamResultRequest {
    pub fn changes_marking_scheme(&self) -> bool {
        self.total_marks.is_some() || self.passing_marks.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct RecordStudentResultsRequest {
    #[validate(nested)]
    pub student_results: Vec<StudentResultInput>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct UpdateExamStatusRequest {
    pub status: ExamStatus,
}

/// Stateless grading of posted marks, nothing is persisted.
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[validate(schema(function = "validate_preview_marking_scheme"))]
pub struct GradingPreviewRequest {
    #[validate(range(exclusive_min = 0.0))]
    pub total_marks: f64,

    #[validate(range(min = 0.0))]
    pub passing_marks: f64,

    #[validate(nested)]
    pub student_results: Vec<StudentResultInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct ExamResultQuery {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub exam_type: Option<ExamType>,
    pub status: Option<ExamStatus>,

    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl ExamResultQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// A student may only appear once in an exam's result list.
pub fn ensure_unique_students(results: &[StudentResultInput]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for result in results {
        if !seen.insert(result.student.as_str()) {
            let mut err = ValidationError::new("duplicate_student");
            err.message = Some(format!("student '{}' appears more than once", result.student).into());
            return Err(err);
        }
    }
    Ok(())
}

/// Rejects a passing threshold the exam can never reach.
pub fn ensure_passing_within_total(
    total_marks: f64,
    passing_marks: f64,
) -> Result<(), ValidationError> {
    if passing_marks > total_marks {
        let mut err = ValidationError::new("passing_marks_exceed_total");
        err.message = Some(
            format!(
                "passing marks ({}) cannot exceed total marks ({})",
                passing_marks, total_marks
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_create_marking_scheme(request: &CreateExamResultRequest) -> Result<(), ValidationError> {
    ensure_passing_within_total(request.total_marks, request.passing_marks)?;
    ensure_unique_students(&request.student_results)
}

fn validate_preview_marking_scheme(request: &GradingPreviewRequest) -> Result<(), ValidationError> {
    ensure_passing_within_total(request.total_marks, request.passing_marks)?;
    ensure_unique_students(&request.student_results)
}

fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value)
    }
}
