use crate::util::BoxFuture;

/// Asks the user a yes/no question.
pub trait Prompter: Send + Sync {
    /// `true` only on an explicit affirmative answer.
    fn confirm(&self, message: &str) -> BoxFuture<bool>;
}

/// Batch mode: every question is answered with no.
impl Prompter for () {
    fn confirm(&self, _: &str) -> BoxFuture<bool> {
        Box::pin(async { false })
    }
}
