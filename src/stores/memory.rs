use crate::entities::{
    AccountUpdate, Comment, Like, NewComment, NewTweet, NewUser, NewVideo, SortDirection,
    Subscription, Tweet, User, Video, VideoListFilter, VideoSortKey, VideoUpdate,
};
use crate::error::ApiError;
use crate::stores::{ContentStore, IdentityStore, RelationshipStore};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::sync::RwLock;

/// In-memory implementation of the three store interfaces. Mirrors the
/// MongoDB implementation's contract (uniqueness, set-add history, atomic
/// view counts, insertion order) so the service can run and be tested
/// without external infrastructure.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    subscriptions: Vec<Subscription>,
    videos: Vec<Video>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    tweets: Vec<Tweet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("store lock poisoned")
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let mut inner = self.write();
        if inner
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(ApiError::conflict(
                "user with this email or username already exists",
            ));
        }
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
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, ApiError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn update_account(&self, id: ObjectId, update: AccountUpdate) -> Result<User, ApiError> {
        let mut inner = self.write();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiError::not_found("user not found"))?;
        user.full_name = update.full_name;
        user.email = update.email;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_avatar(&self, id: ObjectId, url: String) -> Result<User, ApiError> {
        let mut inner = self.write();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiError::not_found("user not found"))?;
        user.avatar = url;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_cover_image(&self, id: ObjectId, url: String) -> Result<User, ApiError> {
        let mut inner = self.write();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiError::not_found("user not found"))?;
        user.cover_image = Some(url);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_password_hash(&self, id: ObjectId, hash: String) -> Result<(), ApiError> {
        let mut inner = self.write();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = hash;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_refresh_token(&self, id: ObjectId, token: Option<String>) -> Result<(), ApiError> {
        let mut inner = self.write();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = token;
        }
        Ok(())
    }

    async fn add_to_watch_history(&self, id: ObjectId, video: ObjectId) -> Result<(), ApiError> {
        let mut inner = self.write();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            if !user.watch_history.contains(&video) {
                user.watch_history.push(video);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn find_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Option<Subscription>, ApiError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .find(|s| s.subscriber == subscriber && s.channel == channel)
            .cloned())
    }

    async fn create_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<Subscription, ApiError> {
        let mut inner = self.write();
        if inner
            .subscriptions
            .iter()
            .any(|s| s.subscriber == subscriber && s.channel == channel)
        {
            return Err(ApiError::conflict("subscription already exists"));
        }
        let edge = Subscription {
            id: ObjectId::new(),
            subscriber,
            channel,
            created_at: Utc::now(),
        };
        inner.subscriptions.push(edge.clone());
        Ok(edge)
    }

    async fn delete_edge(
        &self,
        subscriber: ObjectId,
        channel: ObjectId,
    ) -> Result<bool, ApiError> {
        let mut inner = self.write();
        let before = inner.subscriptions.len();
        inner
            .subscriptions
            .retain(|s| !(s.subscriber == subscriber && s.channel == channel));
        Ok(inner.subscriptions.len() < before)
    }

    async fn count_by_channel(&self, channel: ObjectId) -> Result<u64, ApiError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.channel == channel)
            .count() as u64)
    }

    async fn count_by_subscriber(&self, subscriber: ObjectId) -> Result<u64, ApiError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.subscriber == subscriber)
            .count() as u64)
    }

    async fn list_by_channel(&self, channel: ObjectId) -> Result<Vec<Subscription>, ApiError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.channel == channel)
            .cloned()
            .collect())
    }

    async fn list_by_subscriber(
        &self,
        subscriber: ObjectId,
    ) -> Result<Vec<Subscription>, ApiError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.subscriber == subscriber)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
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
        self.write().videos.push(record.clone());
        Ok(record)
    }

    async fn find_video(&self, id: ObjectId) -> Result<Option<Video>, ApiError> {
        Ok(self.read().videos.iter().find(|v| v.id == id).cloned())
    }

    async fn find_videos_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Video>, ApiError> {
        Ok(self
            .read()
            .videos
            .iter()
            .filter(|v| ids.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn list_videos(&self, filter: VideoListFilter) -> Result<Vec<Video>, ApiError> {
        let inner = self.read();
        let mut videos: Vec<(usize, Video)> = inner
            .videos
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_published)
            .filter(|(_, v)| filter.owner.map_or(true, |o| v.owner == o))
            .filter(|(_, v)| {
                filter.search.as_deref().map_or(true, |q| {
                    let q = q.to_lowercase();
                    v.title.to_lowercase().contains(&q)
                        || v.description.to_lowercase().contains(&q)
                })
            })
            .map(|(i, v)| (i, v.clone()))
            .collect();

        // Insertion index breaks ties, like the _id tiebreak in Mongo.
        videos.sort_by(|(ia, a), (ib, b)| {
            let ordering = match filter.sort_key {
                VideoSortKey::Views => a.views.cmp(&b.views),
                VideoSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                VideoSortKey::Duration => a
                    .duration
                    .partial_cmp(&b.duration)
                    .unwrap_or(std::cmp::Ordering::Equal),
            };
            let ordering = ordering.then(ia.cmp(ib));
            match filter.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let skip = (filter.page.saturating_sub(1) * filter.limit) as usize;
        Ok(videos
            .into_iter()
            .map(|(_, v)| v)
            .skip(skip)
            .take(filter.limit as usize)
            .collect())
    }

    async fn update_video(&self, id: ObjectId, update: VideoUpdate) -> Result<Video, ApiError> {
        let mut inner = self.write();
        let video = inner
            .videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| ApiError::not_found("video not found"))?;
        video.title = update.title;
        video.description = update.description;
        if let Some(thumbnail) = update.thumbnail {
            video.thumbnail = thumbnail;
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn set_published(&self, id: ObjectId, published: bool) -> Result<Video, ApiError> {
        let mut inner = self.write();
        let video = inner
            .videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| ApiError::not_found("video not found"))?;
        video.is_published = published;
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn delete_video(&self, id: ObjectId) -> Result<(), ApiError> {
        let mut inner = self.write();
        inner.videos.retain(|v| v.id != id);
        inner.likes.retain(|l| l.video != id);
        inner.comments.retain(|c| c.video != id);
        Ok(())
    }

    async fn increment_views(&self, id: ObjectId) -> Result<(), ApiError> {
        let mut inner = self.write();
        if let Some(video) = inner.videos.iter_mut().find(|v| v.id == id) {
            video.views += 1;
        }
        Ok(())
    }

    async fn latest_video_by_owner(&self, owner: ObjectId) -> Result<Option<Video>, ApiError> {
        Ok(self
            .read()
            .videos
            .iter()
            .filter(|v| v.owner == owner)
            .last()
            .cloned())
    }

    async fn find_like(
        &self,
        video: ObjectId,
        user: ObjectId,
    ) -> Result<Option<Like>, ApiError> {
        Ok(self
            .read()
            .likes
            .iter()
            .find(|l| l.video == video && l.liked_by == user)
            .cloned())
    }

    async fn create_like(&self, video: ObjectId, user: ObjectId) -> Result<Like, ApiError> {
        let mut inner = self.write();
        if inner
            .likes
            .iter()
            .any(|l| l.video == video && l.liked_by == user)
        {
            return Err(ApiError::conflict("already liked"));
        }
        let like = Like {
            id: ObjectId::new(),
            video,
            liked_by: user,
            created_at: Utc::now(),
        };
        inner.likes.push(like.clone());
        Ok(like)
    }

    async fn delete_like(&self, video: ObjectId, user: ObjectId) -> Result<bool, ApiError> {
        let mut inner = self.write();
        let before = inner.likes.len();
        inner
            .likes
            .retain(|l| !(l.video == video && l.liked_by == user));
        Ok(inner.likes.len() < before)
    }

    async fn count_likes(&self, video: ObjectId) -> Result<u64, ApiError> {
        Ok(self.read().likes.iter().filter(|l| l.video == video).count() as u64)
    }

    async fn list_liked_videos(&self, user: ObjectId) -> Result<Vec<Video>, ApiError> {
        let inner = self.read();
        let mut liked: Vec<ObjectId> = inner
            .likes
            .iter()
            .filter(|l| l.liked_by == user)
            .map(|l| l.video)
            .collect();
        liked.reverse(); // most recent like first
        Ok(liked
            .iter()
            .filter_map(|id| inner.videos.iter().find(|v| v.id == *id).cloned())
            .collect())
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
        self.write().comments.push(record.clone());
        Ok(record)
    }

    async fn find_comment(&self, id: ObjectId) -> Result<Option<Comment>, ApiError> {
        Ok(self.read().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(
        &self,
        video: ObjectId,
        page: u64,
        limit: u64,
    ) -> Result<Vec<Comment>, ApiError> {
        let skip = (page.saturating_sub(1) * limit) as usize;
        Ok(self
            .read()
            .comments
            .iter()
            .filter(|c| c.video == video)
            .rev()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_comment(&self, id: ObjectId, content: String) -> Result<Comment, ApiError> {
        let mut inner = self.write();
        let comment = inner
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("comment not found"))?;
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: ObjectId) -> Result<(), ApiError> {
        self.write().comments.retain(|c| c.id != id);
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
        self.write().tweets.push(record.clone());
        Ok(record)
    }

    async fn find_tweet(&self, id: ObjectId) -> Result<Option<Tweet>, ApiError> {
        Ok(self.read().tweets.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tweets_by_owner(&self, owner: ObjectId) -> Result<Vec<Tweet>, ApiError> {
        Ok(self
            .read()
            .tweets
            .iter()
            .filter(|t| t.owner == owner)
            .rev()
            .cloned()
            .collect())
    }

    async fn update_tweet(&self, id: ObjectId, content: String) -> Result<Tweet, ApiError> {
        let mut inner = self.write();
        let tweet = inner
            .tweets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found("tweet not found"))?;
        tweet.content = content;
        tweet.updated_at = Utc::now();
        Ok(tweet.clone())
    }

    async fn delete_tweet(&self, id: ObjectId) -> Result<(), ApiError> {
        self.write().tweets.retain(|t| t.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{IdentityStore, RelationshipStore};

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            full_name: name.to_string(),
            avatar: "https://cdn.example.com/a.png".to_string(),
            cover_image: None,
            password_hash: "hash".to_string(),
        }
    }

    #[actix_rt::test]
    async fn duplicate_username_is_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("chai")).await.unwrap();
        let err = store.create_user(new_user("chai")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[actix_rt::test]
    async fn duplicate_edge_is_conflict() {
        let store = MemoryStore::new();
        let a = ObjectId::new();
        let b = ObjectId::new();
        store.create_edge(a, b).await.unwrap();
        let err = store.create_edge(a, b).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        // The reverse edge is a different pair.
        store.create_edge(b, a).await.unwrap();
    }

    #[actix_rt::test]
    async fn watch_history_is_a_set() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("chai")).await.unwrap();
        let video = ObjectId::new();
        store.add_to_watch_history(user.id, video).await.unwrap();
        store.add_to_watch_history(user.id, video).await.unwrap();
        let fetched = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.watch_history, vec![video]);
    }
}
