pub mod model;

use model::Model;

/// Everything a reducer needs from the outside world. Passed by reference
/// into every reduce call; there are no module-level singletons.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    pub model: Model,
}

impl Environment {
    pub fn new(model: Model) -> Self {
        Self { model }
    }
}
