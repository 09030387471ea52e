use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, Bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Quiz, QuizStatus},
};

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Quiz>, i64)>;

    /// Move a STARTING quiz to GENERATING. Returns false if the quiz was not
    /// in STARTING, which keeps the transition monotone under races.
    async fn mark_generating(&self, id: &str) -> AppResult<bool>;

    /// Terminal transition to COMPLETED, setting title and question count.
    /// Only applies while the quiz is still STARTING or GENERATING.
    async fn complete_generation(
        &self,
        id: &str,
        title: &str,
        question_count: i16,
    ) -> AppResult<bool>;

    /// Terminal transition to FAILED. Only applies while non-terminal.
    async fn fail_generation(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quizzes");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "created_by_user_id": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }

    fn active_filter(id: &str) -> mongodb::bson::Document {
        doc! {
            "id": id,
            "status": { "$in": [
                QuizStatus::Starting.as_str(),
                QuizStatus::Generating.as_str(),
            ] }
        }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Quiz>, i64)> {
        use futures::TryStreamExt;

        let filter = doc! { "created_by_user_id": user_id };
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let quizzes = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((quizzes, total))
    }

    async fn mark_generating(&self, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id, "status": QuizStatus::Starting.as_str() },
                doc! { "$set": {
                    "status": QuizStatus::Generating.as_str(),
                    "modified_at": Bson::DateTime(Utc::now().into()),
                } },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn complete_generation(
        &self,
        id: &str,
        title: &str,
        question_count: i16,
    ) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                Self::active_filter(id),
                doc! { "$set": {
                    "status": QuizStatus::Completed.as_str(),
                    "title": title,
                    "question_count": question_count as i32,
                    "modified_at": Bson::DateTime(Utc::now().into()),
                } },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn fail_generation(&self, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                Self::active_filter(id),
                doc! { "$set": {
                    "status": QuizStatus::Failed.as_str(),
                    "modified_at": Bson::DateTime(Utc::now().into()),
                } },
            )
            .await?;
        Ok(result.matched_count == 1)
    }
}
