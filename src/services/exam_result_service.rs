use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{ExamResult, ExamStatus},
        dto::{
            request::{
                ensure_passing_within_total, ensure_unique_students, CreateExamResultRequest,
                ExamResultQuery, GradingPreviewRequest, PaginationParams,
                RecordStudentResultsRequest, StudentResultInput, UpdateExamResultRequest,
            },
            response::{
                DeleteExamResultResponse, GradingPreviewResponse, PaginatedExamResults,
                PaginatedStudentReports, PaginationMetadata, StudentExamReport,
            },
        },
    },
    repositories::{ExamResultFilter, ExamResultRepository},
    services::result_aggregator::ResultAggregator,
};

/// Write path for exam results. Every mutation of the student list goes
/// through [`ExamResultService::prepare_for_save`] before it reaches the
/// repository, so stored grades and analytics always match the stored marks.
///
/// Writes replace the whole document; two concurrent writers on the same exam
/// resolve as last-writer-wins.
pub struct ExamResultService {
    repository: Arc<dyn ExamResultRepository>,
}

impl ExamResultService {
    pub fn new(repository: Arc<dyn ExamResultRepository>) -> Self {
        Self { repository }
    }

    /// Validates the marking scheme and the raw entries, then regrades every
    /// entry and rebuilds the analytics from scratch.
    pub fn prepare_for_save(
        exam: &mut ExamResult,
        student_results: Vec<StudentResultInput>,
    ) -> AppResult<()> {
        ensure_passing_within_total(exam.total_marks, exam.passing_marks)?;
        ensure_unique_students(&student_results)?;

        let inputs: Vec<StudentResultInput> = student_results
            .into_iter()
            .map(StudentResultInput::normalized)
            .collect();

        let (graded, analytics) =
            ResultAggregator::evaluate(&inputs, exam.total_marks, exam.passing_marks)?;

        exam.student_results = graded;
        exam.analytics = analytics;
        exam.modified_at = Some(Utc::now());
        Ok(())
    }

    pub async fn create_exam_result(
        &self,
        request: CreateExamResultRequest,
    ) -> AppResult<ExamResult> {
        request.validate()?;

        let mut exam = ExamResult::new_draft(
            &request.exam_name,
            request.exam_type,
            &request.subject,
            &request.class,
            &request.teacher,
            request.exam_date,
            request.total_marks,
            request.passing_marks,
        );
        Self::prepare_for_save(&mut exam, request.student_results)?;

        let created = self.repository.create(exam).await?;
        log::info!(
            "Created exam result {} ({} students) for class {}",
            created.id,
            created.analytics.total_students,
            created.class
        );
        Ok(created)
    }

    pub async fn get_exam_result(&self, id: &str) -> AppResult<ExamResult> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exam result with id '{}' not found", id)))
    }

    pub async fn list_exam_results(
        &self,
        query: ExamResultQuery,
    ) -> AppResult<PaginatedExamResults> {
        query.validate()?;

        let pagination = query.pagination();
        let (offset, limit) = (pagination.offset(), pagination.limit());
        let filter = ExamResultFilter::from(&query);

        let (items, total) = self.repository.list(&filter, offset, limit).await?;

        Ok(PaginatedExamResults {
            items,
            pagination: PaginationMetadata::new(offset, limit, total),
        })
    }

    /// Applies the given header fields. Grades and analytics are rebuilt when
    /// the student list or the marking scheme changes.
    pub async fn update_exam_result(
        &self,
        id: &str,
        request: UpdateExamResultRequest,
    ) -> AppResult<ExamResult> {
        request.validate()?;

        let mut exam = self.get_exam_result(id).await?;
        let regrade = request.student_results.is_some() || request.changes_marking_scheme();

        if let Some(exam_name) = request.exam_name {
            exam.exam_name = exam_name;
        }
        if let Some(exam_type) = request.exam_type {
            exam.exam_type = exam_type;
        }
        if let Some(subject) = request.subject {
            exam.subject = subject;
        }
        if let Some(class) = request.class {
            exam.class = class;
        }
        if let Some(exam_date) = request.exam_date {
            exam.exam_date = exam_date;
        }
        if let Some(total_marks) = request.total_marks {
            exam.total_marks = total_marks;
        }
        if let Some(passing_marks) = request.passing_marks {
            exam.passing_marks = passing_marks;
        }

        if regrade {
            let inputs = match request.student_results {
                Some(results) => results,
                None => current_inputs(&exam),
            };
            Self::prepare_for_save(&mut exam, inputs)?;
        } else {
            exam.modified_at = Some(Utc::now());
        }

        self.repository.replace(exam).await
    }

    /// Replaces the whole student list.
    pub async fn record_student_results(
        &self,
        id: &str,
        request: RecordStudentResultsRequest,
    ) -> AppResult<ExamResult> {
        request.validate()?;

        let mut exam = self.get_exam_result(id).await?;
        Self::prepare_for_save(&mut exam, request.student_results)?;

        let saved = self.repository.replace(exam).await?;
        log::info!(
            "Recorded {} student results for exam {}",
            saved.student_results.len(),
            saved.id
        );
        Ok(saved)
    }

    /// Replaces the entry for `input.student`, or appends it.
    pub async fn upsert_student_result(
        &self,
        id: &str,
        input: StudentResultInput,
    ) -> AppResult<ExamResult> {
        input.validate()?;

        let mut exam = self.get_exam_result(id).await?;
        let mut inputs = current_inputs(&exam);

        match inputs.iter().position(|r| r.student == input.student) {
            Some(index) => inputs[index] = input,
            None => inputs.push(input),
        }

        Self::prepare_for_save(&mut exam, inputs)?;
        self.repository.replace(exam).await
    }

    pub async fn remove_student_result(&self, id: &str, student: &str) -> AppResult<ExamResult> {
        let mut exam = self.get_exam_result(id).await?;
        let mut inputs = current_inputs(&exam);

        let position = inputs
            .iter()
            .position(|r| r.student == student)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Student '{}' has no result in exam '{}'",
                    student, id
                ))
            })?;
        inputs.remove(position);

        Self::prepare_for_save(&mut exam, inputs)?;
        self.repository.replace(exam).await
    }

    /// Moves the exam through its workflow. Grades are left as they are.
    pub async fn set_status(&self, id: &str, status: ExamStatus) -> AppResult<ExamResult> {
        let mut exam = self.get_exam_result(id).await?;
        if exam.status == status {
            return Ok(exam);
        }

        log::info!(
            "Exam result {} moved from {} to {}",
            exam.id,
            exam.status.as_str(),
            status.as_str()
        );
        exam.status = status;
        exam.modified_at = Some(Utc::now());

        self.repository.replace(exam).await
    }

    pub async fn delete_exam_result(&self, id: &str) -> AppResult<DeleteExamResultResponse> {
        self.repository.delete(id).await?;
        log::info!("Deleted exam result {}", id);

        Ok(DeleteExamResultResponse {
            message: format!("Exam result '{}' deleted successfully", id),
        })
    }

    /// A student's own entries from published exams, newest first.
    pub async fn results_for_student(
        &self,
        student: &str,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedStudentReports> {
        pagination.validate()?;

        let (offset, limit) = (pagination.offset(), pagination.limit());
        let filter = ExamResultFilter::published_for_student(student);

        let (exams, total) = self.repository.list(&filter, offset, limit).await?;
        let items = exams
            .into_iter()
            .filter_map(|exam| StudentExamReport::for_student(exam, student))
            .collect();

        Ok(PaginatedStudentReports {
            student: student.to_string(),
            items,
            pagination: PaginationMetadata::new(offset, limit, total),
        })
    }

    /// Grades posted marks without touching the store.
    pub fn preview(&self, request: GradingPreviewRequest) -> AppResult<GradingPreviewResponse> {
        request.validate()?;

        let inputs: Vec<StudentResultInput> = request
            .student_results
            .into_iter()
            .map(StudentResultInput::normalized)
            .collect();
        let (student_results, analytics) =
            ResultAggregator::evaluate(&inputs, request.total_marks, request.passing_marks)?;

        Ok(GradingPreviewResponse {
            student_results,
            analytics,
        })
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

fn current_inputs(exam: &ExamResult) -> Vec<StudentResultInput> {
    exam.student_results
        .iter()
        .map(StudentResultInput::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Analytics, ExamType, Grade, ResultStatus};
    use crate::repositories::MockExamResultRepository;
    use crate::test_utils::fixtures::{create_request, graded_exam, student_input};

    fn service(mock: MockExamResultRepository) -> ExamResultService {
        ExamResultService::new(Arc::new(mock))
    }

    fn mock_with_exam(exam: ExamResult) -> MockExamResultRepository {
        let mut mock = MockExamResultRepository::new();
        let id = exam.id.clone();
        mock.expect_find_by_id()
            .withf(move |requested| requested == id)
            .returning(move |_| Ok(Some(exam.clone())));
        mock
    }

    #[tokio::test]
    async fn create_runs_aggregation_before_insert() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_create()
            .withf(|exam| {
                exam.analytics.total_students == 3
                    && exam.analytics.average_marks == 60.0
                    && exam.student_results[0].grade == Grade::A
            })
            .times(1)
            .returning(Ok);

        let request = create_request(vec![
            student_input("s-1", 80.0),
            student_input("s-2", 60.0),
            student_input("s-3", 40.0),
        ]);

        let exam = service(mock)
            .create_exam_result(request)
            .await
            .expect("create should succeed");

        assert_eq!(exam.status, ExamStatus::Draft);
        assert_eq!(exam.analytics.highest_marks, 80.0);
        assert_eq!(exam.analytics.lowest_marks, 40.0);
        assert_eq!(exam.analytics.passed_students, 3);
    }

    #[tokio::test]
    async fn create_without_students_keeps_zeroed_analytics() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_create().times(1).returning(Ok);

        let exam = service(mock)
            .create_exam_result(create_request(vec![]))
            .await
            .expect("create should succeed");

        assert!(exam.student_results.is_empty());
        assert_eq!(exam.analytics, Analytics::default());
    }

    #[tokio::test]
    async fn create_rejects_passing_above_total_without_writing() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_create().never();

        let mut request = create_request(vec![student_input("s-1", 50.0)]);
        request.passing_marks = 150.0;

        let result = service(mock).create_exam_result(request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_students() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_create().never();

        let request = create_request(vec![student_input("s-1", 50.0), student_input("s-1", 70.0)]);

        let result = service(mock).create_exam_result(request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn get_missing_exam_is_not_found() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));

        let result = service(mock).get_exam_result("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_passes_filter_and_clamped_pagination() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_list()
            .withf(|filter, offset, limit| {
                filter.class.as_deref() == Some("class-10a")
                    && filter.exam_type == Some(ExamType::Final)
                    && *offset == 0
                    && *limit == 20
            })
            .returning(|_, _, _| Ok((vec![graded_exam(&[55.0])], 21)));

        let query = ExamResultQuery {
            class: Some("class-10a".to_string()),
            exam_type: Some(ExamType::Final),
            ..Default::default()
        };

        let page = service(mock)
            .list_exam_results(query)
            .await
            .expect("list should succeed");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 21);
        assert!(page.pagination.has_more);
    }

    #[tokio::test]
    async fn update_header_only_keeps_analytics() {
        let exam = graded_exam(&[80.0, 30.0]);
        let id = exam.id.clone();
        let before = exam.analytics.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(1).returning(Ok);

        let request = UpdateExamResultRequest {
            exam_name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let updated = service(mock)
            .update_exam_result(&id, request)
            .await
            .expect("update should succeed");

        assert_eq!(updated.exam_name, "Renamed");
        assert_eq!(updated.analytics, before);
    }

    #[tokio::test]
    async fn update_with_new_total_regrades_existing_marks() {
        let exam = graded_exam(&[45.0, 20.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(1).returning(Ok);

        let request = UpdateExamResultRequest {
            total_marks: Some(50.0),
            passing_marks: Some(20.0),
            ..Default::default()
        };

        let updated = service(mock)
            .update_exam_result(&id, request)
            .await
            .expect("update should succeed");

        assert_eq!(updated.student_results[0].grade, Grade::APlus);
        assert_eq!(updated.student_results[0].percentage, 90.0);
        assert_eq!(updated.student_results[1].status, ResultStatus::Pass);
        assert_eq!(updated.analytics.average_percentage, 65.0);
    }

    #[tokio::test]
    async fn update_rejects_passing_above_new_total() {
        let exam = graded_exam(&[45.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().never();

        let request = UpdateExamResultRequest {
            total_marks: Some(30.0),
            ..Default::default()
        };

        let result = service(mock).update_exam_result(&id, request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn record_student_results_replaces_list() {
        let exam = graded_exam(&[10.0, 20.0, 30.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(1).returning(Ok);

        let request = RecordStudentResultsRequest {
            student_results: vec![student_input("s-new", 55.0)],
        };

        let saved = service(mock)
            .record_student_results(&id, request)
            .await
            .expect("record should succeed");

        assert_eq!(saved.student_results.len(), 1);
        assert_eq!(saved.student_results[0].grade, Grade::C);
        assert_eq!(saved.analytics.average_marks, 55.0);
        assert_eq!(saved.analytics.highest_marks, 55.0);
        assert_eq!(saved.analytics.lowest_marks, 55.0);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_student_and_appends_new_one() {
        let exam = graded_exam(&[30.0, 90.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(2).returning(Ok);
        let service = service(mock);

        let replaced = service
            .upsert_student_result(&id, student_input("student-0", 75.0))
            .await
            .expect("upsert should succeed");
        assert_eq!(replaced.student_results.len(), 2);
        assert_eq!(replaced.student_results[0].marks_obtained, 75.0);
        assert_eq!(replaced.student_results[0].grade, Grade::BPlus);
        assert_eq!(replaced.analytics.lowest_marks, 75.0);

        let appended = service
            .upsert_student_result(&id, student_input("student-9", 10.0))
            .await
            .expect("upsert should succeed");
        assert_eq!(appended.student_results.len(), 3);
        assert_eq!(appended.student_results[2].status, ResultStatus::Fail);
        assert_eq!(appended.analytics.failed_students, 2);
    }

    #[tokio::test]
    async fn removing_last_student_zeroes_analytics() {
        let exam = graded_exam(&[66.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(1).returning(Ok);

        let saved = service(mock)
            .remove_student_result(&id, "student-0")
            .await
            .expect("remove should succeed");

        assert!(saved.student_results.is_empty());
        assert_eq!(saved.analytics, Analytics::default());
    }

    #[tokio::test]
    async fn removing_unknown_student_is_not_found() {
        let exam = graded_exam(&[66.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().never();

        let result = service(mock).remove_student_result(&id, "nobody").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn set_status_leaves_grades_untouched() {
        let exam = graded_exam(&[80.0, 35.0]);
        let id = exam.id.clone();
        let results_before = exam.student_results.clone();
        let analytics_before = exam.analytics.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().times(1).returning(Ok);

        let published = service(mock)
            .set_status(&id, ExamStatus::Published)
            .await
            .expect("status change should succeed");

        assert_eq!(published.status, ExamStatus::Published);
        assert_eq!(published.student_results, results_before);
        assert_eq!(published.analytics, analytics_before);
    }

    #[tokio::test]
    async fn set_same_status_skips_write() {
        let exam = graded_exam(&[80.0]);
        let id = exam.id.clone();
        let mut mock = mock_with_exam(exam);
        mock.expect_replace().never();

        let unchanged = service(mock)
            .set_status(&id, ExamStatus::Draft)
            .await
            .expect("status change should succeed");
        assert_eq!(unchanged.status, ExamStatus::Draft);
    }

    #[tokio::test]
    async fn delete_reports_success_message() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_delete()
            .withf(|id| id == "exam-1")
            .returning(|_| Ok(()));

        let response = service(mock)
            .delete_exam_result("exam-1")
            .await
            .expect("delete should succeed");
        assert!(response.message.contains("exam-1"));
    }

    #[tokio::test]
    async fn student_view_uses_published_filter_and_hides_classmates() {
        let mut exam = graded_exam(&[40.0, 95.0]);
        exam.status = ExamStatus::Published;

        let mut mock = MockExamResultRepository::new();
        mock.expect_list()
            .withf(|filter, _, _| {
                filter.status == Some(ExamStatus::Published)
                    && filter.student.as_deref() == Some("student-1")
            })
            .returning(move |_, _, _| Ok((vec![exam.clone()], 1)));

        let reports = service(mock)
            .results_for_student("student-1", PaginationParams::default())
            .await
            .expect("student view should succeed");

        assert_eq!(reports.student, "student-1");
        assert_eq!(reports.items.len(), 1);
        assert_eq!(reports.items[0].result.marks_obtained, 95.0);
        assert_eq!(reports.items[0].class_analytics.total_students, 2);
    }

    #[test]
    fn preview_grades_without_repository() {
        let service = service(MockExamResultRepository::new());
        let request = GradingPreviewRequest {
            total_marks: 100.0,
            passing_marks: 50.0,
            student_results: vec![student_input("s-1", 55.0)],
        };

        let preview = service.preview(request).expect("preview should succeed");
        assert_eq!(preview.student_results[0].grade, Grade::C);
        assert_eq!(preview.student_results[0].status, ResultStatus::Pass);
        assert_eq!(preview.analytics.average_percentage, 55.0);
    }

    #[test]
    fn prepare_for_save_is_idempotent() {
        let mut exam = graded_exam(&[12.0, 47.5, 88.25]);
        let inputs = current_inputs(&exam);

        ExamResultService::prepare_for_save(&mut exam, inputs.clone()).expect("first pass");
        let first = (exam.student_results.clone(), exam.analytics.clone());

        ExamResultService::prepare_for_save(&mut exam, inputs).expect("second pass");
        assert_eq!(first, (exam.student_results.clone(), exam.analytics.clone()));
    }

    #[tokio::test]
    async fn ping_delegates_to_repository() {
        let mut mock = MockExamResultRepository::new();
        mock.expect_ping()
            .returning(|| Err(AppError::DatabaseError("down".to_string())));

        let result = service(mock).ping().await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
