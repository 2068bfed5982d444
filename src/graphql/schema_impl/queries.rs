use async_graphql::{Context, Object, ID};

use crate::{
    graphql::helpers::{app_state, into_graphql},
    models::{
        domain::ExamResult,
        dto::{
            request::{ExamResultQuery, GradingPreviewRequest, PaginationParams},
            response::{GradingPreviewResponse, PaginatedExamResults, PaginatedStudentReports},
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn exam_result(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.get_exam_result(&id).await)
    }

    async fn exam_results(
        &self,
        ctx: &Context<'_>,
        filter: Option<ExamResultQuery>,
    ) -> async_graphql::Result<PaginatedExamResults> {
        let state = app_state(ctx)?;
        into_graphql(
            state
                .exam_result_service
                .list_exam_results(filter.unwrap_or_default())
                .await,
        )
    }

    /// Published results of one student.
    async fn student_results(
        &self,
        ctx: &Context<'_>,
        student: String,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> async_graphql::Result<PaginatedStudentReports> {
        let state = app_state(ctx)?;
        into_graphql(
            state
                .exam_result_service
                .results_for_student(&student, PaginationParams { offset, limit })
                .await,
        )
    }

    async fn grading_preview(
        &self,
        ctx: &Context<'_>,
        input: GradingPreviewRequest,
    ) -> async_graphql::Result<GradingPreviewResponse> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.preview(input))
    }
}
