//! Question rotation: serve each user every active question at most once.

use std::sync::Arc;

use loudquiz_core::{
  question::{Question, QuestionId, UserId},
  store::QuestionStore,
};

use crate::{EngineError, Result};

/// Outcome of [`RotationEngine::next_question`].
///
/// An exhausted pool is an expected steady state, not an error.
#[derive(Debug, Clone)]
pub enum NextQuestion {
  Question(Question),
  NoNewQuestions,
}

/// Picks unseen questions and records exposure.
pub struct RotationEngine<S> {
  questions: Arc<S>,
}

impl<S: QuestionStore> RotationEngine<S> {
  pub fn new(questions: Arc<S>) -> Self { Self { questions } }

  /// Pick one active question `user` has not seen, mark it seen, return it.
  ///
  /// The seen mark is the conditional write that makes concurrent calls for
  /// the same user safe: if the insert reports the pair already present, a
  /// concurrent call won that question, and we pick again. The loop
  /// terminates because the seen set only grows — every lost race removes
  /// one candidate from the next pick.
  ///
  /// A store failure while marking fails the whole call; we never hand out
  /// a question whose exposure was not durably recorded.
  pub async fn next_question(&self, user: UserId) -> Result<NextQuestion> {
    loop {
      let picked = self
        .questions
        .get_active_unseen_by_user(user)
        .await
        .map_err(EngineError::store)?;

      let Some(question) = picked else {
        return Ok(NextQuestion::NoNewQuestions);
      };

      if self
        .questions
        .mark_seen(user, question.id)
        .await
        .map_err(EngineError::store)?
      {
        return Ok(NextQuestion::Question(question));
      }

      tracing::debug!(user, question = question.id, "lost seen-mark race, re-picking");
    }
  }

  /// The answer text for `id`, or `None` if the question does not exist or
  /// is no longer active. A player holding a stale button to a soft-deleted
  /// question sees exactly what they would for a nonexistent one.
  pub async fn answer_by_question_id(&self, id: QuestionId) -> Result<Option<String>> {
    let question = self
      .questions
      .get_by_id(id)
      .await
      .map_err(EngineError::store)?;

    Ok(match question {
      Some(q) if q.status.is_active() => Some(q.answer_text),
      _ => None,
    })
  }
}
