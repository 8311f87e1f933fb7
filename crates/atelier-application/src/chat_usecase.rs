//! Chat use cases: sending turns, the fix-error loop, retries, titles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use atelier_core::action::{BatchOrigin, StagedBatch};
use atelier_core::session::{ConversationMessage, MessageRole};
use atelier_core::{AtelierError, Result};
use atelier_interaction::reply::{chat_response_schema, sandbox_response_schema};
use atelier_interaction::transport::{ChatRequest, ChatTransport, ChatTurn};
use atelier_interaction::{ReplyPayload, TypingTask, parse_reply, prompt, start_reveal};
use atelier_preview::Widget;

use crate::sandbox_usecase::SandboxUseCase;

/// Placeholder shown when a structured reply carried no text.
const EMPTY_RESPONSE_TEXT: &str = "[Empty response]";

/// How the next turn should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Free-form chat: markdown replies, optional widget, optional
    /// suggestion to enable the sandbox.
    Regular,
    /// Sandbox-aware: the reply may carry a batch of file operations.
    Coding,
}

/// What one successful exchange produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Markdown text to display.
    pub display_text: String,
    /// The unparsed reply as received.
    pub raw_text: String,
    pub widget: Option<Widget>,
    /// Number of file operations staged for the user's decision.
    pub staged_actions: usize,
    /// Number of file operations applied immediately (fix loop only).
    pub applied_actions: usize,
    /// Model suggests moving this request into the sandbox.
    pub request_sandbox: bool,
}

/// A typing reveal bound to the session it started in.
pub struct RevealHandle {
    /// Generation the reveal belongs to; stale reveals must be dropped.
    pub generation: u64,
    pub task: TypingTask,
}

pub struct ChatUseCase {
    sandbox: Arc<SandboxUseCase>,
    transport: Arc<dyn ChatTransport>,
    in_flight: AtomicBool,
}

impl ChatUseCase {
    pub fn new(sandbox: Arc<SandboxUseCase>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            sandbox,
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Sends one user turn and processes the reply.
    ///
    /// Only one turn may be in flight at a time. On transport failure the
    /// user turn is rolled back so a retry does not duplicate it.
    pub async fn send_message(
        &self,
        text: &str,
        mode: ChatMode,
        temperature: f64,
    ) -> Result<TurnOutcome> {
        self.send_turn(text, mode, temperature, true).await
    }

    /// Feeds a runtime error back to the model and applies the resulting
    /// fix batch immediately. The user opted in by pressing fix; asking
    /// again for the same changes would be a second confirmation.
    pub async fn fix_error(&self, error_message: &str, temperature: f64) -> Result<TurnOutcome> {
        let prompt = prompt::fix_error_prompt(error_message)?;
        self.send_turn(&prompt, ChatMode::Coding, temperature, false)
            .await
    }

    /// Asks the model to run the active file (or the whole project).
    pub async fn run_active_file(&self, temperature: f64) -> Result<TurnOutcome> {
        let file_name = {
            let ctx = self.sandbox.context();
            let guard = ctx.read().await;
            guard.session.sandbox.active_file().map(|f| f.name.clone())
        };
        let prompt = prompt::run_file_prompt(file_name.as_deref())?;
        self.send_turn(&prompt, ChatMode::Coding, temperature, true)
            .await
    }

    /// Drops the last exchange and resends its user message.
    pub async fn retry_last_turn(&self, mode: ChatMode, temperature: f64) -> Result<TurnOutcome> {
        let text = {
            let ctx = self.sandbox.context();
            let mut guard = ctx.write().await;
            let conversation = &mut guard.session.conversation;
            if conversation
                .last()
                .is_some_and(|m| m.role == MessageRole::Assistant)
            {
                conversation.pop();
            }
            match conversation.last() {
                Some(m) if m.role == MessageRole::User => {
                    let text = m.content.clone();
                    conversation.pop();
                    text
                }
                _ => return Err(AtelierError::internal("no user turn to retry")),
            }
        };
        self.sandbox.persist().await?;
        self.send_turn(&text, mode, temperature, true).await
    }

    /// Starts a typing reveal for reply text, tied to the live session:
    /// switching sessions cancels it, and the caller must drop updates
    /// whose generation no longer matches.
    pub async fn begin_reveal(&self, text: String, wpm: u32) -> RevealHandle {
        let (generation, session_cancel) = {
            let ctx = self.sandbox.context();
            let guard = ctx.read().await;
            (guard.generation, guard.reveal_cancel.clone())
        };
        let task = start_reveal(text, wpm);
        let reveal_cancel = task.cancel_token();
        tokio::spawn(async move {
            session_cancel.cancelled().await;
            reveal_cancel.cancel();
        });
        RevealHandle { generation, task }
    }

    /// Whether a captured generation still names the live session.
    pub async fn is_current_generation(&self, generation: u64) -> bool {
        self.sandbox.generation().await == generation
    }

    /// User-facing message for a failed turn.
    pub fn error_display(error: &AtelierError) -> String {
        if error.is_rate_limited() {
            "Rate limit reached. You've sent requests too quickly. Please wait a moment before trying again."
                .to_string()
        } else {
            format!("An unexpected error occurred: {error}")
        }
    }

    async fn send_turn(
        &self,
        text: &str,
        mode: ChatMode,
        temperature: f64,
        gate_actions: bool,
    ) -> Result<TurnOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AtelierError::internal("a turn is already in flight"));
        }
        let result = self
            .send_turn_inner(text, mode, temperature, gate_actions)
            .await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn send_turn_inner(
        &self,
        text: &str,
        mode: ChatMode,
        temperature: f64,
        gate_actions: bool,
    ) -> Result<TurnOutcome> {
        let ctx = self.sandbox.context();

        // Record the user turn and assemble the request under one lock.
        let request = {
            let mut guard = ctx.write().await;
            guard
                .session
                .conversation
                .push(ConversationMessage::user(text));

            let turns = guard
                .session
                .conversation
                .iter()
                .map(|m| match m.role {
                    MessageRole::User => ChatTurn::user(m.content.clone()),
                    MessageRole::Assistant => ChatTurn::model(m.content.clone()),
                })
                .collect();

            let (instruction, schema) = match mode {
                ChatMode::Coding => (
                    prompt::coding_system_instruction(&guard.session.sandbox)?,
                    sandbox_response_schema(),
                ),
                ChatMode::Regular => {
                    (prompt::chat_system_instruction()?, chat_response_schema())
                }
            };

            ChatRequest::new(turns)
                .with_system_instruction(instruction)
                .with_temperature(temperature)
                .with_response_schema(schema)
        };

        let raw = match self.transport.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                // Roll back the user turn so retrying does not double it.
                let mut guard = ctx.write().await;
                if guard
                    .session
                    .conversation
                    .last()
                    .is_some_and(|m| m.role == MessageRole::User)
                {
                    guard.session.conversation.pop();
                }
                return Err(e);
            }
        };

        // The stored assistant turn is the raw reply text; structured
        // replies are re-parsed on display and raw replies need nothing.
        {
            let mut guard = ctx.write().await;
            guard
                .session
                .conversation
                .push(ConversationMessage::assistant(raw.clone()));
        }
        self.sandbox.persist().await?;

        let outcome = match parse_reply(&raw) {
            ReplyPayload::Raw(raw_text) => TurnOutcome {
                display_text: raw_text.clone(),
                raw_text,
                widget: None,
                staged_actions: 0,
                applied_actions: 0,
                request_sandbox: false,
            },
            ReplyPayload::Structured(reply) => {
                let mut staged_actions = 0;
                let mut applied_actions = 0;
                if !reply.actions.is_empty() && mode == ChatMode::Coding {
                    if gate_actions {
                        staged_actions = reply.actions.len();
                        self.sandbox
                            .stage_batch(StagedBatch::new(reply.actions, BatchOrigin::Coding))
                            .await;
                    } else {
                        let report = self.sandbox.apply_batch_now(&reply.actions).await?;
                        applied_actions = report.applied.len();
                    }
                }
                let display_text = if reply.display_text.is_empty() {
                    EMPTY_RESPONSE_TEXT.to_string()
                } else {
                    reply.display_text
                };
                TurnOutcome {
                    display_text,
                    raw_text: raw,
                    widget: reply.widget,
                    staged_actions,
                    applied_actions,
                    request_sandbox: reply.request_enable_sandbox,
                }
            }
        };

        self.maybe_generate_title(text, &outcome.display_text).await;
        Ok(outcome)
    }

    /// Names the session after the first exchange. Best-effort: a failed
    /// title generation never fails the turn.
    async fn maybe_generate_title(&self, user_prompt: &str, ai_response: &str) {
        let (session_id, is_first_exchange) = {
            let ctx = self.sandbox.context();
            let guard = ctx.read().await;
            (
                guard.session.id.clone(),
                guard.session.conversation.len() <= 2,
            )
        };
        if !is_first_exchange {
            return;
        }
        let prompt = match prompt::title_prompt(user_prompt, ai_response) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!(error = %e, "could not render title prompt");
                return;
            }
        };
        let request = ChatRequest::new(vec![ChatTurn::user(prompt)]).with_temperature(0.2);
        match self.transport.generate(request).await {
            Ok(title) => {
                let title = title.trim().trim_matches('"').trim().to_string();
                if title.is_empty() {
                    return;
                }
                if let Err(e) = self.sandbox.rename_session(&session_id, &title).await {
                    tracing::warn!(error = %e, "could not store generated title");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not generate chat title"),
        }
    }
}
