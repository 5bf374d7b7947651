use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::entity_store::{Entity, EntityStore};
use crate::environment::model::{PostId, PostRecord, UserId};

/// The fixed set of reactions a post can receive.
#[derive(IntoStaticStr, EnumIter, EnumString, Display, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[strum(serialize_all = "camelCase")]
pub enum Reaction {
    ThumbsUp,
    Wow,
    Heart,
    Rocket,
    Coffee,
}

/// Per-post reaction counters. A struct rather than a map, so every post
/// always carries all five counters and an increment can never invent a
/// new key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub thumbs_up: u32,
    pub wow: u32,
    pub heart: u32,
    pub rocket: u32,
    pub coffee: u32,
}

impl Reactions {
    pub fn add(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::ThumbsUp => self.thumbs_up += 1,
            Reaction::Wow => self.wow += 1,
            Reaction::Heart => self.heart += 1,
            Reaction::Rocket => self.rocket += 1,
            Reaction::Coffee => self.coffee += 1,
        }
    }

    pub fn get(&self, reaction: Reaction) -> u32 {
        match reaction {
            Reaction::ThumbsUp => self.thumbs_up,
            Reaction::Wow => self.wow,
            Reaction::Heart => self.heart,
            Reaction::Rocket => self.rocket,
            Reaction::Coffee => self.coffee,
        }
    }
}

/// A post as held locally: the wire fields plus the local-only `date`
/// (sort key) and reaction counters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub reactions: Reactions,
}

impl Post {
    pub fn from_record(record: PostRecord, date: DateTime<Utc>) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            body: record.body,
            date,
            reactions: Reactions::default(),
        }
    }

    /// The wire shape of this post, for `PUT` requests.
    pub fn record(&self) -> PostRecord {
        PostRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

/// The fields an update carries. Reactions are not part of it; merging a
/// patch leaves them untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostPatch {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl Entity for Post {
    type Id = PostId;
    type Patch = PostPatch;

    fn id(&self) -> PostId {
        self.id
    }

    fn patch_id(patch: &PostPatch) -> PostId {
        patch.id
    }

    fn apply(&mut self, patch: PostPatch) {
        self.user_id = patch.user_id;
        self.title = patch.title;
        self.body = patch.body;
        self.date = patch.date;
    }

    fn from_patch(patch: PostPatch) -> Self {
        Self {
            id: patch.id,
            user_id: patch.user_id,
            title: patch.title,
            body: patch.body,
            date: patch.date,
            reactions: Reactions::default(),
        }
    }
}

/// Most recent date first; ties keep their insertion order (the store
/// sorts stably).
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date)
}

#[derive(IntoStaticStr, Display, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The posts slice: the normalized post collection plus the list-load
/// status machine and an unrelated demo counter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct State {
    pub posts: EntityStore<Post>,
    pub status: LoadStatus,
    /// Only set while `status` is `Failed`; cleared when a new load starts.
    pub error: Option<String>,
    pub count: u64,
    /// Monotonic fetch sequence. A list response carrying an older
    /// generation than the latest dispatched load is stale and dropped.
    pub load_generation: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            posts: EntityStore::new(newest_first),
            status: LoadStatus::default(),
            error: None,
            count: 0,
            load_generation: 0,
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// All posts, most recent first.
    pub fn all_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.all()
    }

    pub fn post_by_id(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    /// Post ids in date-descending order.
    pub fn post_ids(&self) -> &im::Vector<PostId> {
        self.posts.ids()
    }

    pub fn posts_by_user(&self, user_id: UserId) -> impl Iterator<Item = &Post> {
        self.all_posts().filter(move |post| post.user_id == user_id)
    }

    /// The id a locally created post gets: one past the highest known id.
    /// The fake API does not allocate ids reliably, so the client does.
    pub fn next_post_id(&self) -> PostId {
        self.all_posts().map(|post| post.id).max().unwrap_or(0) + 1
    }
}

/// Memoized by-user view over the sorted posts. Recomputes only when the
/// store version or the queried user changes.
#[derive(Clone, Debug, Default)]
pub struct UserPosts {
    cached: Option<(u64, UserId, Vec<Post>)>,
    recomputes: u64,
}

impl UserPosts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, state: &State, user_id: UserId) -> &[Post] {
        let version = state.posts.version();
        let cached = matches!(
            &self.cached,
            Some((v, u, _)) if *v == version && *u == user_id
        );
        if !cached {
            let posts: Vec<Post> = state.posts_by_user(user_id).cloned().collect();
            self.recomputes += 1;
            self.cached = Some((version, user_id, posts));
        }
        match &self.cached {
            Some((_, _, posts)) => posts,
            None => &[],
        }
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
