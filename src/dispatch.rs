use std::collections::VecDeque;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// The outcome of a reduce step: nothing, a follow-up action, a boxed
/// future resolving to an action, or a combination of those.
pub enum Effect<A> {
    Nothing,
    Action(A),
    Future(BoxFuture<'static, A>),
    Merge(Vec<Effect<A>>),
}

impl<A> Effect<A> {
    pub const NONE: Self = Effect::Nothing;
}

impl<A: Send + 'static> Effect<A> {
    pub fn action(action: A) -> Self {
        Effect::Action(action)
    }

    pub fn future<T, F, M>(future: F, map: M) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        M: FnOnce(T) -> A + Send + 'static,
    {
        Effect::Future(future.map(map).boxed())
    }

    pub fn merge2(a: Self, b: Self) -> Self {
        Effect::Merge(vec![a, b])
    }
}

impl<A: std::fmt::Debug> std::fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Nothing => write!(f, "Nothing"),
            Effect::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Effect::Future(_) => write!(f, "Future(..)"),
            Effect::Merge(e) => f.debug_tuple("Merge").field(e).finish(),
        }
    }
}

pub trait Reducer {
    type Action: Send + 'static;
    type State;
    type Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action>;

    /// Dispatched once when the store starts driving this reducer.
    fn initial_action() -> Option<Self::Action> {
        None
    }
}

/// Owns a reducer's state and environment and drives actions to quiescence.
/// There is exactly one writer (the reduce loop); readers borrow `state()`
/// in between `send` calls.
pub struct Store<R: Reducer> {
    state: R::State,
    environment: R::Environment,
}

impl<R: Reducer> Store<R> {
    pub fn new(state: R::State, environment: R::Environment) -> Self {
        Self { state, environment }
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn environment(&self) -> &R::Environment {
        &self.environment
    }

    /// Apply one action and resolve every effect it produces, feeding
    /// resulting actions back in FIFO order until nothing is left.
    pub async fn send(&mut self, action: R::Action) {
        let mut queue: VecDeque<Effect<R::Action>> = VecDeque::new();
        queue.push_back(Effect::Action(action));
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Nothing => {}
                Effect::Action(action) => {
                    let next = R::reduce(action, &mut self.state, &self.environment);
                    queue.push_back(next);
                }
                Effect::Future(future) => {
                    let action = future.await;
                    queue.push_back(Effect::Action(action));
                }
                Effect::Merge(effects) => {
                    for effect in effects.into_iter().rev() {
                        queue.push_front(effect);
                    }
                }
            }
        }
    }

    pub async fn run_initial(&mut self) {
        if let Some(action) = R::initial_action() {
            self.send(action).await;
        }
    }
}
