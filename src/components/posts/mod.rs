mod action;
mod reducer;
mod state;

pub use action::PostsAction;
pub use state::{
    newest_first, LoadStatus, Post, PostPatch, Reaction, Reactions, State, UserPosts,
};

pub use reducer::reduce;

use crate::dispatch::{Effect, Reducer};

pub struct PostsReducer;

impl Reducer for PostsReducer {
    type Action = PostsAction;

    type State = State;

    type Environment = crate::environment::Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }

    fn initial_action() -> Option<Self::Action> {
        Some(PostsAction::LoadPosts)
    }
}
