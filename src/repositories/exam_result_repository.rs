use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::{
        domain::{ExamResult, ExamStatus, ExamType},
        dto::request::ExamResultQuery,
    },
};

/// Selection criteria shared by every repository backend. All set fields
/// must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamResultFilter {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub exam_type: Option<ExamType>,
    pub status: Option<ExamStatus>,
    pub student: Option<String>,
}

impl ExamResultFilter {
    pub fn published_for_student(student: &str) -> Self {
        Self {
            status: Some(ExamStatus::Published),
            student: Some(student.to_string()),
            ..Default::default()
        }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(class) = &self.class {
            filter.insert("class", class.as_str());
        }
        if let Some(subject) = &self.subject {
            filter.insert("subject", subject.as_str());
        }
        if let Some(teacher) = &self.teacher {
            filter.insert("teacher", teacher.as_str());
        }
        if let Some(exam_type) = self.exam_type {
            filter.insert("exam_type", exam_type.as_str());
        }
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(student) = &self.student {
            filter.insert("student_results.student", student.as_str());
        }
        filter
    }

    pub fn matches(&self, exam: &ExamResult) -> bool {
        self.class.as_ref().map_or(true, |c| *c == exam.class)
            && self.subject.as_ref().map_or(true, |s| *s == exam.subject)
            && self.teacher.as_ref().map_or(true, |t| *t == exam.teacher)
            && self.exam_type.map_or(true, |t| t == exam.exam_type)
            && self.status.map_or(true, |s| s == exam.status)
            && self
                .student
                .as_ref()
                .map_or(true, |s| exam.result_for(s).is_some())
    }
}

impl From<&ExamResultQuery> for ExamResultFilter {
    fn from(query: &ExamResultQuery) -> Self {
        Self {
            class: query.class.clone(),
            subject: query.subject.clone(),
            teacher: query.teacher.clone(),
            exam_type: query.exam_type,
            status: query.status,
            student: None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    async fn create(&self, exam: ExamResult) -> AppResult<ExamResult>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamResult>>;
    /// Newest exam first. Returns the page and the total match count.
    async fn list(
        &self,
        filter: &ExamResultFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ExamResult>, i64)>;
    async fn replace(&self, exam: ExamResult) -> AppResult<ExamResult>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ping(&self) -> AppResult<()>;
}

pub struct MongoExamResultRepository {
    db: Database,
    collection: Collection<ExamResult>,
}

impl MongoExamResultRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self {
            db: db.clone(),
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exam results collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let class_subject_index = IndexModel::builder()
            .keys(doc! { "class": 1, "subject": 1 })
            .options(
                IndexOptions::builder()
                    .name("class_subject".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_results.student": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_results_student".to_string())
                    .build(),
            )
            .build();

        let status_index = IndexModel::builder()
            .keys(doc! { "status": 1, "exam_date": -1 })
            .options(
                IndexOptions::builder()
                    .name("status_exam_date".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes(vec![
                id_index,
                class_subject_index,
                student_index,
                status_index,
            ])
            .await?;

        log::info!("Successfully created indexes for exam results collection");
        Ok(())
    }
}

#[async_trait]
impl ExamResultRepository for MongoExamResultRepository {
    async fn create(&self, exam: ExamResult) -> AppResult<ExamResult> {
        self.collection.insert_one(&exam).await.map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::AlreadyExists(format!("Exam result with id '{}' already exists", exam.id))
            } else {
                err.into()
            }
        })?;
        Ok(exam)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamResult>> {
        let exam = self.collection.find_one(doc! { "id": id }).await?;
        Ok(exam)
    }

    async fn list(
        &self,
        filter: &ExamResultFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ExamResult>, i64)> {
        let filter = filter.to_document();

        let total = self.collection.count_documents(filter.clone()).await?;

        let items = self
            .collection
            .find(filter)
            .skip(offset.max(0) as u64)
            .limit(limit)
            .sort(doc! { "exam_date": -1, "id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok((items, total as i64))
    }

    async fn replace(&self, exam: ExamResult) -> AppResult<ExamResult> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": exam.id.as_str() }, &exam)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Exam result with id '{}' not found",
                exam.id
            )));
        }

        Ok(exam)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Exam result with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}
