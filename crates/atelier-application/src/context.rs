//! Shared live-session state.

use atelier_core::action::StagedBatch;
use atelier_core::session::Session;
use tokio_util::sync::CancellationToken;

/// The one live session plus everything scoped to it.
///
/// `generation` increments on every session switch. Suspended work
/// (typing reveals, in-flight replies) captures the generation it
/// started under and discards its result when the numbers no longer
/// match, so nothing started in one session can write into another.
pub struct SessionContext {
    pub session: Session,
    /// Batch awaiting the user's accept/reject decision.
    pub staged: Option<StagedBatch>,
    pub generation: u64,
    /// Cancels the typing reveal for this session, if one is running.
    pub reveal_cancel: CancellationToken,
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            staged: None,
            generation: 0,
            reveal_cancel: CancellationToken::new(),
        }
    }

    /// Swaps in a new session, invalidating everything scoped to the old
    /// one.
    pub fn replace_session(&mut self, session: Session) {
        self.reveal_cancel.cancel();
        self.reveal_cancel = CancellationToken::new();
        self.session = session;
        self.staged = None;
        self.generation += 1;
    }
}
