use chrono::{Duration, Utc};

use crate::dispatch::Effect;
use crate::environment::model::WriteOutcome;
use crate::environment::Environment;

use super::action::PostsAction;
use super::state::{LoadStatus, Post, PostPatch, State};

pub fn reduce(action: PostsAction, state: &mut State, environment: &Environment) -> Effect<PostsAction> {
    log::trace!("{action:?}");

    match action {
        PostsAction::LoadPosts => {
            state.status = LoadStatus::Loading;
            state.error = None;
            state.load_generation += 1;
            let generation = state.load_generation;
            let model = environment.model.clone();
            Effect::future(async move { model.posts().await }, move |result| {
                PostsAction::LoadPostsResult(generation, result)
            })
        }
        PostsAction::LoadPostsResult(generation, result) => {
            if generation != state.load_generation {
                log::debug!("dropping stale posts response (generation {generation})");
                return Effect::NONE;
            }
            match result {
                Ok(records) => {
                    state.status = LoadStatus::Succeeded;
                    // The fake API carries no timestamps. Date the records
                    // one minute apart, first record most recent.
                    let now = Utc::now();
                    let loaded = records.into_iter().enumerate().map(|(index, record)| {
                        Post::from_record(record, now - Duration::minutes(index as i64 + 1))
                    });
                    state.posts.upsert_many(loaded);
                }
                Err(error) => {
                    state.status = LoadStatus::Failed;
                    state.error = Some(error);
                }
            }
            Effect::NONE
        }
        PostsAction::CreatePost(draft) => {
            let model = environment.model.clone();
            Effect::future(
                async move { model.create_post(&draft).await },
                PostsAction::CreatePostResult,
            )
        }
        PostsAction::CreatePostResult(result) => {
            match result {
                Ok(record) => {
                    // The fake API answers every create with the same id.
                    // Assign the next free one from the loaded set instead.
                    let id = state.next_post_id();
                    let mut post = Post::from_record(record, Utc::now());
                    post.id = id;
                    state.posts.add_one(post);
                }
                Err(error) => log::warn!("create did not complete: {error}"),
            }
            Effect::NONE
        }
        PostsAction::UpdatePost(record) => {
            let model = environment.model.clone();
            Effect::future(
                async move { model.update_post(&record).await },
                PostsAction::UpdatePostResult,
            )
        }
        PostsAction::UpdatePostResult(outcome) => {
            match outcome {
                WriteOutcome::Done(record) => {
                    state.posts.merge_one(PostPatch {
                        id: record.id,
                        user_id: record.user_id,
                        title: record.title,
                        body: record.body,
                        date: Utc::now(),
                    });
                }
                // Write failures never move `status`/`error`; only the
                // list operation surfaces failures in state.
                WriteOutcome::Rejected(error) | WriteOutcome::Failed(error) => {
                    log::warn!("update did not complete: {error}");
                }
            }
            Effect::NONE
        }
        PostsAction::DeletePost(id) => {
            let model = environment.model.clone();
            Effect::future(
                async move { model.delete_post(id).await },
                PostsAction::DeletePostResult,
            )
        }
        PostsAction::DeletePostResult(outcome) => {
            match outcome {
                WriteOutcome::Done(id) => state.posts.remove_one(&id),
                WriteOutcome::Rejected(error) | WriteOutcome::Failed(error) => {
                    log::warn!("delete did not complete: {error}");
                }
            }
            Effect::NONE
        }
        PostsAction::ReactionAdded(id, reaction) => {
            if !state.posts.modify(&id, |post| post.reactions.add(reaction)) {
                log::debug!("reaction {reaction} on unknown post {id}");
            }
            Effect::NONE
        }
        PostsAction::IncreaseCount => {
            state.count += 1;
            Effect::NONE
        }
    }
}
