//! Derived views over the identity, relationship and content stores.
//!
//! Nothing here is persisted: subscriber counts, mutuality flags and the
//! per-viewer fields are recomputed from the edge set on every call. The
//! join-heavy views are expressed as sequential store queries rather than a
//! database-side pipeline, so they work against any store implementation.

use crate::error::ApiError;
use crate::models::{
    ChannelProfileResponse, ChannelSubscribersResponse, OwnerSummary, SubscribedChannelRow,
    SubscriberRow, ToggleSubscriptionResponse, VideoDetailResponse, VideoListItem,
    VideoOwnerResponse, VideoSummary,
};
use crate::stores::Stores;
use mongodb::bson::oid::ObjectId;

/// Subscribe if no edge exists, unsubscribe otherwise.
///
/// A concurrent duplicate subscribe loses the race on the unique index and
/// is reported as an ordinary successful subscribe.
pub async fn toggle_subscription(
    stores: &Stores,
    subscriber: ObjectId,
    channel: ObjectId,
) -> Result<ToggleSubscriptionResponse, ApiError> {
    if subscriber == channel {
        return Err(ApiError::validation("cannot subscribe to your own channel"));
    }
    if stores.identity.find_by_id(channel).await?.is_none() {
        return Err(ApiError::not_found("channel not found"));
    }

    if stores
        .relationships
        .find_edge(subscriber, channel)
        .await?
        .is_some()
    {
        stores.relationships.delete_edge(subscriber, channel).await?;
        return Ok(ToggleSubscriptionResponse { subscribed: false });
    }

    match stores.relationships.create_edge(subscriber, channel).await {
        Ok(_) | Err(ApiError::Conflict(_)) => Ok(ToggleSubscriptionResponse { subscribed: true }),
        Err(e) => Err(e),
    }
}

/// Channel page for `username`, with counts derived from the edge set and
/// the viewer's own subscription state.
pub async fn channel_profile(
    stores: &Stores,
    username: &str,
    viewer: Option<ObjectId>,
) -> Result<ChannelProfileResponse, ApiError> {
    let user = stores
        .identity
        .find_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found("channel does not exist"))?;

    let subscriber_count = stores.relationships.count_by_channel(user.id).await?;
    let channels_subscribed_to_count =
        stores.relationships.count_by_subscriber(user.id).await?;
    let is_subscribed = match viewer {
        Some(viewer_id) => stores
            .relationships
            .find_edge(viewer_id, user.id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(ChannelProfileResponse {
        id: user.id.to_hex(),
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        avatar: user.avatar,
        cover_image: user.cover_image,
        subscriber_count,
        channels_subscribed_to_count,
        is_subscribed,
    })
}

/// Everyone subscribed to `channel`, one flattened row per subscriber with
/// the back-follow flag and that subscriber's own audience size.
pub async fn channel_subscribers(
    stores: &Stores,
    channel: ObjectId,
) -> Result<ChannelSubscribersResponse, ApiError> {
    let edges = stores.relationships.list_by_channel(channel).await?;
    let subscribers_count_of_channel = edges.len() as u64;

    let mut subscribers = Vec::with_capacity(edges.len());
    for edge in edges {
        // A dangling edge (subscriber record gone) contributes no row.
        let Some(user) = stores.identity.find_by_id(edge.subscriber).await? else {
            continue;
        };
        let subscribed_to_subscriber = stores
            .relationships
            .find_edge(channel, user.id)
            .await?
            .is_some();
        let subscriber_count = stores.relationships.count_by_channel(user.id).await?;
        subscribers.push(SubscriberRow {
            id: user.id.to_hex(),
            username: user.username,
            full_name: user.full_name,
            avatar: user.avatar,
            subscribed_to_subscriber,
            subscriber_count,
        });
    }

    Ok(ChannelSubscribersResponse {
        subscribers,
        subscribers_count_of_channel,
    })
}

/// Channels `subscriber` follows, each with its most recently added video.
pub async fn subscribed_channels(
    stores: &Stores,
    subscriber: ObjectId,
) -> Result<Vec<SubscribedChannelRow>, ApiError> {
    let edges = stores.relationships.list_by_subscriber(subscriber).await?;

    let mut channels = Vec::with_capacity(edges.len());
    for edge in edges {
        let Some(channel) = stores.identity.find_by_id(edge.channel).await? else {
            continue;
        };
        let latest_video = stores
            .content
            .latest_video_by_owner(channel.id)
            .await?
            .map(VideoSummary::from);
        channels.push(SubscribedChannelRow {
            id: channel.id.to_hex(),
            username: channel.username,
            full_name: channel.full_name,
            avatar: channel.avatar,
            latest_video,
        });
    }

    Ok(channels)
}

/// Video page for `viewer`: likes, owner channel state, then the two
/// best-effort side effects (view increment, watch-history set-add).
///
/// The side effects are independent writes; the returned `views` is the
/// value read before this fetch's increment.
pub async fn video_detail(
    stores: &Stores,
    video_id: ObjectId,
    viewer: ObjectId,
) -> Result<VideoDetailResponse, ApiError> {
    let video = stores
        .content
        .find_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("video not found"))?;

    let likes_count = stores.content.count_likes(video.id).await?;
    let is_liked = stores.content.find_like(video.id, viewer).await?.is_some();

    let owner = stores
        .identity
        .find_by_id(video.owner)
        .await?
        .ok_or_else(|| ApiError::not_found("video owner not found"))?;
    let subscribers_count = stores.relationships.count_by_channel(owner.id).await?;
    let is_subscribed = stores
        .relationships
        .find_edge(viewer, owner.id)
        .await?
        .is_some();

    stores.content.increment_views(video.id).await?;
    stores.identity.add_to_watch_history(viewer, video.id).await?;

    Ok(VideoDetailResponse {
        id: video.id.to_hex(),
        video_file: video.video_file,
        title: video.title,
        description: video.description,
        views: video.views,
        duration: video.duration,
        created_at: video.created_at,
        owner: VideoOwnerResponse {
            id: owner.id.to_hex(),
            username: owner.username,
            avatar: owner.avatar,
            subscribers_count,
            is_subscribed,
        },
        likes_count,
        is_liked,
    })
}

/// The viewer's watch history resolved to video rows, oldest watch first.
pub async fn watch_history(
    stores: &Stores,
    viewer: ObjectId,
) -> Result<Vec<VideoListItem>, ApiError> {
    let user = stores
        .identity
        .find_by_id(viewer)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let videos = stores
        .content
        .find_videos_by_ids(&user.watch_history)
        .await?;

    let mut items = Vec::with_capacity(user.watch_history.len());
    for video_id in &user.watch_history {
        let Some(video) = videos.iter().find(|v| v.id == *video_id) else {
            continue; // video deleted since it was watched
        };
        let Some(owner) = stores.identity.find_by_id(video.owner).await? else {
            continue;
        };
        items.push(VideoListItem {
            id: video.id.to_hex(),
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            duration: video.duration,
            views: video.views,
            created_at: video.created_at,
            owner: OwnerSummary {
                id: owner.id.to_hex(),
                username: owner.username,
                avatar: owner.avatar,
            },
        });
    }

    Ok(items)
}
