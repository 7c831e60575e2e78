use crate::entities::{
    AccountUpdate, Comment, Like, NewComment, NewTweet, NewUser, NewVideo, SortDirection,
    Subscription, Tweet, User, Video, VideoListFilter, VideoSortKey, VideoUpdate,
};
use crate::error::ApiError;
use crate::stores::{ContentStore, IdentityStore, RelationshipStore};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Cursor, Database};
use serde::de::DeserializeOwned;

/// All three store interfaces backed by one MongoDB database handle.
pub struct MongoStore {
    users: Collection<User>,
    subscriptions: Collection<Subscription>,
    videos: Collection<Video>,
    likes: Collection<Like>,
    comments: Collection<Comment>,
    tweets: Collection<Tweet>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        MongoStore {
            users: db.collection::<User>("users"),
            subscriptions: db.collection::<Subscription>("subscriptions"),
            videos: db.collection::<Video>("videos"),
            likes: db.collection::<Like>("likes"),
            comments: db.collection::<Comment>("comments"),
            tweets: db.collection::<Tweet>("tweets"),
        }
    }
}

fn internal(err: mongodb::error::Error) -> ApiError {
    ApiError::Internal(err.into())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    if let ErrorKind::Write(WriteFailure::WriteError(write_err)) = err.kind.as_ref() {
        write_err.code == 11000
    } else {
        false
    }
}

async fn collect<T>(mut cursor: Cursor<T>) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while cursor.advance().await.map_err(internal)? {
        items.push(cursor.deserialize_current().map_err(internal)?);
    }
    Ok(items)
}

#[async_trait]
impl IdentityStore for MongoStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let now = Utc::now();
        let record = User {
            id: ObjectId::new(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            watch_history: Vec::new(),
            password_hash: user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        match self.users.insert_one(&record, None).await {
            Ok(_) => Ok(record),
            Err(e) if is_duplicate_key(&e) => Err(ApiError::conflict(
                "user with this email or username already exists",
            )),
            Err(e) => Err(internal(e)),
        }
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! {"username": username}, None)
            .await
            .map_err(internal)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        let filter = doc! {"$or": [{"username": username}, {"email": email}]};
        self.users.find_one(filter, None).await.map_err(internal)
    }

    async fn update_account(&self, id: ObjectId, update: AccountUpdate) -> Result<User, ApiError> {
        let change = doc! {"$set": {
            "full_name": &update.full_name,
            "email": &update.email,
            "updated_at": Utc::now().timestamp(),
        }};
        self.update_user(id, change).await
    }

    async fn set_avatar(&self, id: ObjectId, url: String) -> Result<User, ApiError> {
        let change = doc! {"$set": {"avatar": url, "updated_at": Utc::now().timestamp()}};
        self.update_user(id, change).await
    }

    async fn set_cover_image(&self, id: ObjectId, url: String) -> Result<User, ApiError> {
        let change = doc! {"$set": {"cover_image": url, "updated_at": Utc::now().timestamp()}};
        self.update_user(id, change).await
    }

    async fn set_password_hash(&self, id: ObjectId, hash: String) -> Result<(), ApiError> {
        let change = doc! {"$set": {"password_hash": hash, "updated_at": Utc::now().timestamp()}};
        self.users
            .update_one(doc! {"_id": id}, change, None)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn set_refresh_token(&self, id: ObjectId, token: Option<String>) -> Result<(), ApiError> {
        let value = match token {
            Some(t) => Bson::String(t),
            None => Bson::Null,
        };
        self.users
            .update_one(doc! {"_id": id}, doc! {"$set": {"refresh_token": value}}, None)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn add_to_watch_history(&self, id: ObjectId, video: ObjectId) -> Result<(), ApiError> {
        // $addToSet keeps the history duplicate-free without a read-modify-write.
        self.users
            .update_one(
                doc! {"_id": id},
                doc! {"$addToSet": {"watch_history": video}},
                None,
            )
            .await
            .map_err(internal)?;
        Ok(())
    }
}

impl MongoStore {
    async fn update_user(&self, id: ObjectId, change: Document) -> Result<User, ApiError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.users
            .find_one_and_update(doc! {"_id": id}, change, options)
            .await
            .map_err(internal)?
            .ok_or_else(|| ApiError::not_found("user not found"))
    }
}

#[async_trait]
impl RelationshipStore for MongoStore {
    async fn find_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Option<Subscription>, ApiError> {
        self.subscriptions
            .find_one(doc! {"subscriber": subscriber, "channel": channel}, None)
            .await
            .map_err(internal)
    }

    async fn create_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Subscription, ApiError> {
        let edge = Subscription {
            id: ObjectId::new(),
            subscriber,
            channel,
            created_at: Utc::now(),
        };
        match self.subscriptions.insert_one(&edge, None).await {
            Ok(_) => Ok(edge),
            Err(e) if is_duplicate_key(&e) => {
                Err(ApiError::conflict("subscription already exists"))
            }
            Err(e) => Err(internal(e)),
        }
    }

    async fn delete_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<bool, ApiError> {
        let result = self
            .subscriptions
            .delete_one(doc! {"subscriber": subscriber, "channel": channel}, None)
            .await
            .map_err(internal)?;
        Ok(result.deleted_count > 0)
    }

    async fn count_by_channel(&self, channel: ObjectId) -> Result<u64, ApiError> {
        self.subscriptions
            .count_documents(doc! {"channel": channel}, None)
            .await
            .map_err(internal)
    }

    async fn count_by_subscriber(&self, subscriber: ObjectId) -> Result<u64, ApiError> {
        self.subscriptions
            .count_documents(doc! {"subscriber": subscriber}, None)
            .await
            .map_err(internal)
    }

    async fn list_by_channel(&self, channel: ObjectId) -> Result<Vec<Subscription>, ApiError> {
        let cursor = self
            .subscriptions
            .find(doc! {"channel": channel}, None)
            .await
            .map_err(internal)?;
        collect(cursor).await
    }

    async fn list_by_subscriber(
        &self,
        subscriber: ObjectId,
    ) -> Result<Vec<Subscription>, ApiError> {
        let cursor = self
            .subscriptions
            .find(doc! {"subscriber": subscriber}, None)
            .await
            .map_err(internal)?;
        collect(cursor).await
    }
}

fn video_sort_doc(key: VideoSortKey, direction: SortDirection) -> Document {
    let field = match key {
        VideoSortKey::Views => "views",
        VideoSortKey::CreatedAt => "created_at",
        VideoSortKey::Duration => "duration",
    };
    let order = match direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };
    // _id tiebreak keeps pagination stable for equal keys.
    doc! {field: order, "_id": order}
}

#[async_trait]
impl ContentStore for MongoStore {
    async fn create_video(&self, video: NewVideo) -> Result<Video, ApiError> {
        let now = Utc::now();
        let record = Video {
            id: ObjectId::new(),
            owner: video.owner,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: 0,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        self.videos
            .insert_one(&record, None)
            .await
            .map_err(internal)?;
        Ok(record)
    }

    async fn find_video(&self, id: ObjectId) -> Result<Option<Video>, ApiError> {
        self.videos
            .find_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)
    }

    async fn find_videos_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Video>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .videos
            .find(doc! {"_id": {"$in": ids.to_vec()}}, None)
            .await
            .map_err(internal)?;
        collect(cursor).await
    }

    async fn list_videos(&self, filter: VideoListFilter) -> Result<Vec<Video>, ApiError> {
        let mut query = doc! {"is_published": true};
        if let Some(owner) = filter.owner {
            query.insert("owner", owner);
        }
        if let Some(search) = &filter.search {
            query.insert(
                "$or",
                vec![
                    doc! {"title": {"$regex": search, "$options": "i"}},
                    doc! {"description": {"$regex": search, "$options": "i"}},
                ],
            );
        }
        let skip = (filter.page.saturating_sub(1)) * filter.limit;
        let options = FindOptions::builder()
            .sort(video_sort_doc(filter.sort_key, filter.direction))
            .skip(skip)
            .limit(filter.limit as i64)
            .build();
        let cursor = self.videos.find(query, options).await.map_err(internal)?;
        collect(cursor).await
    }

    async fn update_video(&self, id: ObjectId, update: VideoUpdate) -> Result<Video, ApiError> {
        let mut set = doc! {
            "title": &update.title,
            "description": &update.description,
            "updated_at": Utc::now().timestamp(),
        };
        if let Some(thumbnail) = &update.thumbnail {
            set.insert("thumbnail", thumbnail.as_str());
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.videos
            .find_one_and_update(doc! {"_id": id}, doc! {"$set": set}, options)
            .await
            .map_err(internal)?
            .ok_or_else(|| ApiError::not_found("video not found"))
    }

    async fn set_published(&self, id: ObjectId, published: bool) -> Result<Video, ApiError> {
        let change = doc! {"$set": {
            "is_published": published,
            "updated_at": Utc::now().timestamp(),
        }};
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.videos
            .find_one_and_update(doc! {"_id": id}, change, options)
            .await
            .map_err(internal)?
            .ok_or_else(|| ApiError::not_found("video not found"))
    }

    async fn delete_video(&self, id: ObjectId) -> Result<(), ApiError> {
        self.videos
            .delete_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)?;
        self.likes
            .delete_many(doc! {"video": id}, None)
            .await
            .map_err(internal)?;
        self.comments
            .delete_many(doc! {"video": id}, None)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn increment_views(&self, id: ObjectId) -> Result<(), ApiError> {
        self.videos
            .update_one(doc! {"_id": id}, doc! {"$inc": {"views": 1}}, None)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn latest_video_by_owner(&self, owner: ObjectId) -> Result<Option<Video>, ApiError> {
        // Insertion order, not created_at: ObjectIds are monotonic per process
        // and match the reference's "last element" semantics.
        let options = FindOneOptions::builder().sort(doc! {"_id": -1}).build();
        self.videos
            .find_one(doc! {"owner": owner}, options)
            .await
            .map_err(internal)
    }

    async fn find_like(
        &self,
        video: ObjectId,
        user: ObjectId,
    ) -> Result<Option<Like>, ApiError> {
        self.likes
            .find_one(doc! {"video": video, "liked_by": user}, None)
            .await
            .map_err(internal)
    }

    async fn create_like(&self, video: ObjectId, user: ObjectId) -> Result<Like, ApiError> {
        let like = Like {
            id: ObjectId::new(),
            video,
            liked_by: user,
            created_at: Utc::now(),
        };
        match self.likes.insert_one(&like, None).await {
            Ok(_) => Ok(like),
            Err(e) if is_duplicate_key(&e) => Err(ApiError::conflict("already liked")),
            Err(e) => Err(internal(e)),
        }
    }

    async fn delete_like(&self, video: ObjectId, user: ObjectId) -> Result<bool, ApiError> {
        let result = self
            .likes
            .delete_one(doc! {"video": video, "liked_by": user}, None)
            .await
            .map_err(internal)?;
        Ok(result.deleted_count > 0)
    }

    async fn count_likes(&self, video: ObjectId) -> Result<u64, ApiError> {
        self.likes
            .count_documents(doc! {"video": video}, None)
            .await
            .map_err(internal)
    }

    async fn list_liked_videos(&self, user: ObjectId) -> Result<Vec<Video>, ApiError> {
        let options = FindOptions::builder().sort(doc! {"_id": -1}).build();
        let cursor = self
            .likes
            .find(doc! {"liked_by": user}, options)
            .await
            .map_err(internal)?;
        let likes = collect(cursor).await?;
        let video_ids: Vec<ObjectId> = likes.iter().map(|l| l.video).collect();
        let videos = self.find_videos_by_ids(&video_ids).await?;
        // Preserve like order; a like may outlive its video briefly, skip those.
        let ordered = video_ids
            .iter()
            .filter_map(|id| videos.iter().find(|v| v.id == *id).cloned())
            .collect();
        Ok(ordered)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, ApiError> {
        let now = Utc::now();
        let record = Comment {
            id: ObjectId::new(),
            video: comment.video,
            owner: comment.owner,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };
        self.comments
            .insert_one(&record, None)
            .await
            .map_err(internal)?;
        Ok(record)
    }

    async fn find_comment(&self, id: ObjectId) -> Result<Option<Comment>, ApiError> {
        self.comments
            .find_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)
    }

    async fn list_comments(
        &self,
        video: ObjectId,
        page: u64,
        limit: u64,
    ) -> Result<Vec<Comment>, ApiError> {
        let skip = (page.saturating_sub(1)) * limit;
        let options = FindOptions::builder()
            .sort(doc! {"_id": -1})
            .skip(skip)
            .limit(limit as i64)
            .build();
        let cursor = self
            .comments
            .find(doc! {"video": video}, options)
            .await
            .map_err(internal)?;
        collect(cursor).await
    }

    async fn update_comment(&self, id: ObjectId, content: String) -> Result<Comment, ApiError> {
        let change = doc! {"$set": {
            "content": content,
            "updated_at": Utc::now().timestamp(),
        }};
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.comments
            .find_one_and_update(doc! {"_id": id}, change, options)
            .await
            .map_err(internal)?
            .ok_or_else(|| ApiError::not_found("comment not found"))
    }

    async fn delete_comment(&self, id: ObjectId) -> Result<(), ApiError> {
        self.comments
            .delete_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn create_tweet(&self, tweet: NewTweet) -> Result<Tweet, ApiError> {
        let now = Utc::now();
        let record = Tweet {
            id: ObjectId::new(),
            owner: tweet.owner,
            content: tweet.content,
            created_at: now,
            updated_at: now,
        };
        self.tweets
            .insert_one(&record, None)
            .await
            .map_err(internal)?;
        Ok(record)
    }

    async fn find_tweet(&self, id: ObjectId) -> Result<Option<Tweet>, ApiError> {
        self.tweets
            .find_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)
    }

    async fn list_tweets_by_owner(&self, owner: ObjectId) -> Result<Vec<Tweet>, ApiError> {
        let options = FindOptions::builder().sort(doc! {"_id": -1}).build();
        let cursor = self
            .tweets
            .find(doc! {"owner": owner}, options)
            .await
            .map_err(internal)?;
        collect(cursor).await
    }

    async fn update_tweet(&self, id: ObjectId, content: String) -> Result<Tweet, ApiError> {
        let change = doc! {"$set": {
            "content": content,
            "updated_at": Utc::now().timestamp(),
        }};
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.tweets
            .find_one_and_update(doc! {"_id": id}, change, options)
            .await
            .map_err(internal)?
            .ok_or_else(|| ApiError::not_found("tweet not found"))
    }

    async fn delete_tweet(&self, id: ObjectId) -> Result<(), ApiError> {
        self.tweets
            .delete_one(doc! {"_id": id}, None)
            .await
            .map_err(internal)?;
        Ok(())
    }
}
