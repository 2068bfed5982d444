use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Analytics, ExamResult, ExamType, StudentResult};

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginationMetadata {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl PaginationMetadata {
    pub fn new(offset: i64, limit: i64, total: i64) -> Self {
        Self {
            offset,
            limit,
            total,
            has_more: offset + limit < total,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginatedExamResults {
    pub items: Vec<ExamResult>,
    pub pagination: PaginationMetadata,
}

/// What a student sees for one published exam: their own entry plus the
/// class summary, never classmates' marks.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct StudentExamReport {
    pub exam_id: String,
    pub exam_name: String,
    pub exam_type: ExamType,
    pub subject: String,
    pub class: String,
    pub exam_date: DateTime<Utc>,
    pub total_marks: f64,
    pub passing_marks: f64,
    pub result: StudentResult,
    pub class_analytics: Analytics,
}

impl StudentExamReport {
    /// `None` when the exam is unpublished or the student has no entry in it.
    pub fn for_student(exam: ExamResult, student: &str) -> Option<Self> {
        if !exam.is_published() {
            return None;
        }
        let result = exam.result_for(student)?.clone();
        Some(StudentExamReport {
            exam_id: exam.id,
            exam_name: exam.exam_name,
            exam_type: exam.exam_type,
            subject: exam.subject,
            class: exam.class,
            exam_date: exam.exam_date,
            total_marks: exam.total_marks,
            passing_marks: exam.passing_marks,
            result,
            class_analytics: exam.analytics,
        })
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginatedStudentReports {
    pub student: String,
    pub items: Vec<StudentExamReport>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct GradingPreviewResponse {
    pub student_results: Vec<StudentResult>,
    pub analytics: Analytics,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct DeleteExamResultResponse {
    pub message: String,
}
