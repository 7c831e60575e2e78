pub mod memory;
pub mod mongo;

use crate::entities::{
    AccountUpdate, Comment, Like, NewComment, NewTweet, NewUser, NewVideo, Subscription, Tweet,
    User, Video, VideoListFilter, VideoUpdate,
};
use crate::error::ApiError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Owner of user records and the watch history.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fails with `Conflict` when username or email is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError>;
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError>;
    async fn update_account(&self, id: ObjectId, update: AccountUpdate) -> Result<User, ApiError>;
    async fn set_avatar(&self, id: ObjectId, url: String) -> Result<User, ApiError>;
    async fn set_cover_image(&self, id: ObjectId, url: String) -> Result<User, ApiError>;
    async fn set_password_hash(&self, id: ObjectId, hash: String) -> Result<(), ApiError>;
    async fn set_refresh_token(&self, id: ObjectId, token: Option<String>) -> Result<(), ApiError>;
    /// Set semantics: appends only when the video id is not already present.
    async fn add_to_watch_history(&self, id: ObjectId, video: ObjectId) -> Result<(), ApiError>;
}

/// Owner of the directed subscriber -> channel edge set.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn find_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Option<Subscription>, ApiError>;
    /// Fails with `Conflict` when the edge already exists.
    async fn create_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Subscription, ApiError>;
    /// Returns whether an edge was actually removed.
    async fn delete_edge(&self, subscriber: ObjectId, channel: ObjectId)
        -> Result<bool, ApiError>;
    async fn count_by_channel(&self, channel: ObjectId) -> Result<u64, ApiError>;
    async fn count_by_subscriber(&self, subscriber: ObjectId) -> Result<u64, ApiError>;
    async fn list_by_channel(&self, channel: ObjectId) -> Result<Vec<Subscription>, ApiError>;
    async fn list_by_subscriber(&self, subscriber: ObjectId)
        -> Result<Vec<Subscription>, ApiError>;
}

/// Owner of videos, likes, comments and tweets.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_video(&self, video: NewVideo) -> Result<Video, ApiError>;
    async fn find_video(&self, id: ObjectId) -> Result<Option<Video>, ApiError>;
    async fn find_videos_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Video>, ApiError>;
    /// Published videos only.
    async fn list_videos(&self, filter: VideoListFilter) -> Result<Vec<Video>, ApiError>;
    async fn update_video(&self, id: ObjectId, update: VideoUpdate) -> Result<Video, ApiError>;
    async fn set_published(&self, id: ObjectId, published: bool) -> Result<Video, ApiError>;
    /// Also removes the video's likes and comments.
    async fn delete_video(&self, id: ObjectId) -> Result<(), ApiError>;
    /// Atomic; never observed mid-update by readers.
    async fn increment_views(&self, id: ObjectId) -> Result<(), ApiError>;
    /// Most recently inserted video of the owner, published or not.
    async fn latest_video_by_owner(&self, owner: ObjectId) -> Result<Option<Video>, ApiError>;

    async fn find_like(
        &self,
        video: ObjectId,
        user: ObjectId,
    ) -> Result<Option<Like>, ApiError>;
    /// Fails with `Conflict` when the like already exists.
    async fn create_like(&self, video: ObjectId, user: ObjectId) -> Result<Like, ApiError>;
    async fn delete_like(&self, video: ObjectId, user: ObjectId) -> Result<bool, ApiError>;
    async fn count_likes(&self, video: ObjectId) -> Result<u64, ApiError>;
    /// Videos the user liked, most recent like first.
    async fn list_liked_videos(&self, user: ObjectId) -> Result<Vec<Video>, ApiError>;

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, ApiError>;
    async fn find_comment(&self, id: ObjectId) -> Result<Option<Comment>, ApiError>;
    /// Newest first.
    async fn list_comments(
        &self,
        video: ObjectId,
        page: u64,
        limit: u64,
    ) -> Result<Vec<Comment>, ApiError>;
    async fn update_comment(&self, id: ObjectId, content: String) -> Result<Comment, ApiError>;
    async fn delete_comment(&self, id: ObjectId) -> Result<(), ApiError>;

    async fn create_tweet(&self, tweet: NewTweet) -> Result<Tweet, ApiError>;
    async fn find_tweet(&self, id: ObjectId) -> Result<Option<Tweet>, ApiError>;
    /// Newest first.
    async fn list_tweets_by_owner(&self, owner: ObjectId) -> Result<Vec<Tweet>, ApiError>;
    async fn update_tweet(&self, id: ObjectId, content: String) -> Result<Tweet, ApiError>;
    async fn delete_tweet(&self, id: ObjectId) -> Result<(), ApiError>;
}

/// Store handles injected into every handler and service. Opened once at
/// process start; components borrow it instead of importing ambient state.
#[derive(Clone)]
pub struct Stores {
    pub identity: Arc<dyn IdentityStore>,
    pub relationships: Arc<dyn RelationshipStore>,
    pub content: Arc<dyn ContentStore>,
}

impl Stores {
    pub fn mongo(db: &mongodb::Database) -> Self {
        let store = Arc::new(MongoStore::new(db));
        Stores {
            identity: store.clone(),
            relationships: store.clone(),
            content: store,
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Stores {
            identity: store.clone(),
            relationships: store.clone(),
            content: store,
        }
    }
}
