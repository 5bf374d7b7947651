use crate::environment::model::{DraftPost, PostId, PostRecord, WriteOutcome};

use super::state::Reaction;

#[derive(Clone, Debug)]
pub enum PostsAction {
    /// Fetch the full posts collection.
    LoadPosts,
    /// Resolution of a fetch, tagged with the generation that started it.
    LoadPostsResult(u64, Result<Vec<PostRecord>, String>),
    CreatePost(DraftPost),
    CreatePostResult(Result<PostRecord, String>),
    UpdatePost(PostRecord),
    UpdatePostResult(WriteOutcome<PostRecord>),
    DeletePost(PostId),
    DeletePostResult(WriteOutcome<PostId>),
    ReactionAdded(PostId, Reaction),
    /// Demo counter, unrelated to the posts lifecycle.
    IncreaseCount,
}
