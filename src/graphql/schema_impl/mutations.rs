use async_graphql::{Context, Object, ID};

use crate::{
    graphql::helpers::{app_state, into_graphql},
    models::{
        domain::{ExamResult, ExamStatus},
        dto::{
            request::{
                CreateExamResultRequest, RecordStudentResultsRequest, StudentResultInput,
                UpdateExamResultRequest,
            },
            response::DeleteExamResultResponse,
        },
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_exam_result(
        &self,
        ctx: &Context<'_>,
        input: CreateExamResultRequest,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.create_exam_result(input).await)
    }

    async fn update_exam_result(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateExamResultRequest,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.update_exam_result(&id, input).await)
    }

    async fn record_student_results(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: RecordStudentResultsRequest,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(
            state
                .exam_result_service
                .record_student_results(&id, input)
                .await,
        )
    }

    async fn upsert_student_result(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: StudentResultInput,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(
            state
                .exam_result_service
                .upsert_student_result(&id, input)
                .await,
        )
    }

    async fn remove_student_result(
        &self,
        ctx: &Context<'_>,
        id: ID,
        student: String,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(
            state
                .exam_result_service
                .remove_student_result(&id, &student)
                .await,
        )
    }

    async fn set_exam_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: ExamStatus,
    ) -> async_graphql::Result<ExamResult> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.set_status(&id, status).await)
    }

    async fn delete_exam_result(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<DeleteExamResultResponse> {
        let state = app_state(ctx)?;
        into_graphql(state.exam_result_service.delete_exam_result(&id).await)
    }
}
