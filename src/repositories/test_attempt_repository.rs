use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{AttemptAnswer, FeedbackReport, TestAttempt},
};

/// Outcome of a conditional submit. `AlreadySubmitted` is a success for the
/// caller: the stored attempt is returned unchanged so duplicate submissions
/// stay retry-safe.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Recorded,
    AlreadySubmitted,
}

#[async_trait]
pub trait TestAttemptRepository: Send + Sync {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>>;
    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)>;

    /// Atomically record scored answers on an attempt that has no selections
    /// yet. A concurrent duplicate submission loses the conditional write and
    /// observes `AlreadySubmitted`.
    async fn submit_scored(
        &self,
        id: &str,
        answers: &[AttemptAnswer],
        score: i16,
        correct_count: i16,
        incorrect_count: i16,
        feedback: Option<&FeedbackReport>,
    ) -> AppResult<SubmitOutcome>;

    /// Replace the feedback report on a submitted attempt.
    async fn set_feedback(&self, id: &str, feedback: &FeedbackReport) -> AppResult<()>;
}

pub struct MongoTestAttemptRepository {
    collection: Collection<TestAttempt>,
}

impl MongoTestAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("test_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for test_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_quiz_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1 })
            .options(IndexOptions::builder().name("user_quiz".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_quiz_index).await?;

        log::info!("Successfully created indexes for test_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl TestAttemptRepository for MongoTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)> {
        let filter = doc! { "user_id": user_id };
        let total = self.collection.count_documents(filter.clone()).await?;

        let attempts = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "taken_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }

    async fn submit_scored(
        &self,
        id: &str,
        answers: &[AttemptAnswer],
        score: i16,
        correct_count: i16,
        incorrect_count: i16,
        feedback: Option<&FeedbackReport>,
    ) -> AppResult<SubmitOutcome> {
        // Matches only while every stored answer still has a null selection.
        let unsubmitted_filter = doc! {
            "id": id,
            "answers": { "$not": { "$elemMatch": { "selected_option": { "$ne": Bson::Null } } } },
        };

        let now = Bson::DateTime(Utc::now().into());
        let mut set = doc! {
            "answers": bson::to_bson(answers)?,
            "score": score as i32,
            "correct_count": correct_count as i32,
            "incorrect_count": incorrect_count as i32,
            "taken_at": now.clone(),
            "modified_at": now,
        };
        if let Some(report) = feedback {
            set.insert("feedback", bson::to_bson(report)?);
        }

        let result = self
            .collection
            .update_one(unsubmitted_filter, doc! { "$set": set })
            .await?;

        if result.matched_count == 1 {
            Ok(SubmitOutcome::Recorded)
        } else if self.find_by_id(id).await?.is_some() {
            Ok(SubmitOutcome::AlreadySubmitted)
        } else {
            Err(AppError::NotFound(format!(
                "Test attempt with id '{}' not found",
                id
            )))
        }
    }

    async fn set_feedback(&self, id: &str, feedback: &FeedbackReport) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": {
                    "feedback": bson::to_bson(feedback)?,
                    "modified_at": Bson::DateTime(Utc::now().into()),
                } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Test attempt with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
