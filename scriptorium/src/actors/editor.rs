//! EditorActor - owner of the document, the saved selection, the AI-action
//! popup session, and the pending autocomplete suggestion.
//!
//! Every mutation goes through this mailbox, bumps the revision, persists
//! the draft to disk, and notifies the analysis actor with the stripped
//! text. Wholesale replacement (new document, import) additionally bumps
//! the epoch, which invalidates selections captured against the old
//! document. Gateway calls for autocomplete and quick actions run on
//! spawned tasks and post back token-tagged completions; a completion whose
//! token no longer matches is dropped.

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use shared_types::{ActionKind, ActionState, EditorSnapshot, FormatCommand, SavedSelection};

use super::analysis::AnalysisMsg;
use crate::editor::action::ActionSession;
use crate::editor::{doc, EditorError};
use crate::gateway::SharedGateway;
use crate::markup;

const DRAFT_FILE: &str = "draft.html";
const META_FILE: &str = "draft.meta.json";

/// Typing quiescence before an autocomplete suggestion is requested.
pub const AUTOCOMPLETE_IDLE: Duration = Duration::from_secs(1);
/// Stripped document must exceed this length before autocomplete fires.
pub const AUTOCOMPLETE_TRIGGER_CHARS: usize = 20;

pub struct EditorActor;

pub struct EditorArguments {
    pub gateway: SharedGateway,
    pub analysis: ActorRef<AnalysisMsg>,
    pub data_dir: PathBuf,
}

pub struct EditorState {
    gateway: SharedGateway,
    analysis: ActorRef<AnalysisMsg>,
    doc_path: PathBuf,
    meta_path: PathBuf,
    content: String,
    revision: u64,
    epoch: u64,
    selection: Option<SavedSelection>,
    session: Option<ActionSession>,
    /// Monotonic popup-session id; completions carry the token they were
    /// dispatched under.
    session_token: u64,
    /// Monotonic idle-timer id; only the latest timer may fire.
    idle_token: u64,
    pending_completion: Option<String>,
}

/// Durable draft counters, stored next to the markup.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DraftMeta {
    revision: u64,
    epoch: u64,
}

/// Reply to a view resync. `replaced` is set when the client's view was
/// empty but the server still holds content, telling the client to adopt
/// the returned content instead of pushing its empty view.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub content: String,
    pub revision: u64,
    pub epoch: u64,
    pub replaced: bool,
}

#[derive(Debug)]
pub enum EditorMsg {
    Snapshot {
        reply: RpcReplyPort<EditorSnapshot>,
    },
    /// Replace the content if `base_rev` still matches.
    Update {
        content: String,
        base_rev: u64,
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    New {
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    Import {
        file_name: String,
        content: String,
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    SyncView {
        view_content: String,
        reply: RpcReplyPort<SyncOutcome>,
    },
    Format {
        command: FormatCommand,
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    SetSelection {
        start: usize,
        end: usize,
        reply: RpcReplyPort<Result<SavedSelection, EditorError>>,
    },
    GetSelection {
        reply: RpcReplyPort<Option<SavedSelection>>,
    },

    // Autocomplete.
    AutocompleteState {
        reply: RpcReplyPort<Option<String>>,
    },
    AcceptCompletion {
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    DismissCompletion {
        reply: RpcReplyPort<()>,
    },
    /// Cast by the idle timer task.
    IdleElapsed { token: u64 },
    /// Cast by the spawned autocomplete task.
    CompletionReady { token: u64, suggestion: String },

    // AI-action popup.
    StartAction {
        kind: ActionKind,
        custom_prompt: Option<String>,
        reply: RpcReplyPort<Result<ActionState, EditorError>>,
    },
    SubmitPrompt {
        prompt: String,
        reply: RpcReplyPort<Result<ActionState, EditorError>>,
    },
    GetActionState {
        reply: RpcReplyPort<ActionState>,
    },
    /// Cast by the spawned quick-action task.
    ActionFinished {
        token: u64,
        text: String,
        failed: bool,
    },
    ApplyAction {
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    CopyAction {
        reply: RpcReplyPort<Result<String, EditorError>>,
    },
    CloseAction {
        reply: RpcReplyPort<ActionState>,
    },

    /// Insert model text at the saved selection (chat apply bridge).
    InsertAtSelection {
        text: String,
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
    /// Replace the first occurrence of `original` (suggestion apply).
    ReplaceExact {
        original: String,
        replacement: String,
        reply: RpcReplyPort<Result<EditorSnapshot, EditorError>>,
    },
}

impl EditorActor {
    fn snapshot(state: &EditorState) -> EditorSnapshot {
        EditorSnapshot {
            content: state.content.clone(),
            revision: state.revision,
            epoch: state.epoch,
            word_count: markup::word_count(&state.content),
            char_count: markup::char_count(&state.content),
        }
    }

    /// Persist the draft and notify analysis. Called after every content
    /// mutation; also drops any pending autocomplete, which was generated
    /// against the old content.
    async fn commit(state: &mut EditorState) -> Result<(), EditorError> {
        state.pending_completion = None;

        let tmp = state.doc_path.with_extension("html.tmp");
        tokio::fs::write(&tmp, &state.content)
            .await
            .map_err(|e| EditorError::Persist(e.to_string()))?;
        tokio::fs::rename(&tmp, &state.doc_path)
            .await
            .map_err(|e| EditorError::Persist(e.to_string()))?;

        let meta = DraftMeta {
            revision: state.revision,
            epoch: state.epoch,
        };
        let raw = serde_json::to_vec(&meta).map_err(|e| EditorError::Persist(e.to_string()))?;
        let tmp = state.meta_path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| EditorError::Persist(e.to_string()))?;
        tokio::fs::rename(&tmp, &state.meta_path)
            .await
            .map_err(|e| EditorError::Persist(e.to_string()))?;

        let _ = state.analysis.cast(AnalysisMsg::DocumentChanged {
            text: markup::strip_markup(&state.content),
        });
        Ok(())
    }

    fn arm_idle_timer(myself: &ActorRef<EditorMsg>, state: &mut EditorState) {
        state.idle_token += 1;
        let token = state.idle_token;
        let actor = myself.clone();
        tokio::spawn(async move {
            tokio::time::sleep(AUTOCOMPLETE_IDLE).await;
            let _ = actor.cast(EditorMsg::IdleElapsed { token });
        });
    }

    fn dispatch_action(myself: &ActorRef<EditorMsg>, gateway: SharedGateway, session: &ActionSession) {
        let token = session.token;
        let kind = session.kind;
        let selection_text = session.selection_text.clone();
        let custom_prompt = session.custom_prompt.clone();
        let actor = myself.clone();
        tokio::spawn(async move {
            let reply = gateway
                .quick_action(kind, &selection_text, custom_prompt.as_deref())
                .await;
            let _ = actor.cast(EditorMsg::ActionFinished {
                token,
                text: reply.text,
                failed: reply.failed,
            });
        });
    }

    async fn update(
        myself: &ActorRef<EditorMsg>,
        state: &mut EditorState,
        content: String,
        base_rev: u64,
    ) -> Result<EditorSnapshot, EditorError> {
        if base_rev != state.revision {
            return Err(EditorError::Conflict {
                current_revision: state.revision,
                current_content: state.content.clone(),
            });
        }
        state.content = content;
        state.revision += 1;
        Self::commit(state).await?;
        Self::arm_idle_timer(myself, state);
        Ok(Self::snapshot(state))
    }

    /// Wholesale replacement: the epoch bump leaves any saved selection
    /// stale (rejected at use), and the popup session dies with the
    /// document it was opened against.
    async fn replace_document(
        state: &mut EditorState,
        content: String,
    ) -> Result<EditorSnapshot, EditorError> {
        state.content = content;
        state.revision += 1;
        state.epoch += 1;
        state.session = None;
        // Orphan any in-flight autocomplete; its completion would carry a
        // token minted against the replaced document.
        state.idle_token += 1;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }

    async fn import(
        state: &mut EditorState,
        file_name: String,
        content: String,
    ) -> Result<EditorSnapshot, EditorError> {
        let lower = file_name.to_ascii_lowercase();
        if !lower.ends_with(".txt") && !lower.ends_with(".md") {
            return Err(EditorError::UnsupportedImport(file_name));
        }
        Self::replace_document(state, markup::import_to_markup(&content)).await
    }

    async fn format(
        state: &mut EditorState,
        command: FormatCommand,
    ) -> Result<EditorSnapshot, EditorError> {
        let selection = state.selection.ok_or(EditorError::NoSelection)?;
        doc::validate_selection(&state.content, &selection, state.epoch)?;
        state.content = doc::apply_format(&state.content, &selection, command)?;
        state.revision += 1;
        // Formatting moved the text under the old offsets.
        state.selection = None;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }

    fn set_selection(
        state: &mut EditorState,
        start: usize,
        end: usize,
    ) -> Result<SavedSelection, EditorError> {
        let selection = SavedSelection {
            start,
            end,
            epoch: state.epoch,
            revision: state.revision,
        };
        doc::validate_selection(&state.content, &selection, state.epoch)?;
        state.selection = Some(selection);
        Ok(selection)
    }

    async fn accept_completion(state: &mut EditorState) -> Result<EditorSnapshot, EditorError> {
        let suggestion = state
            .pending_completion
            .take()
            .ok_or(EditorError::NoSuggestion)?;
        state.content.push_str(&markup::escape_html(&suggestion));
        state.revision += 1;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }

    fn start_action(
        myself: &ActorRef<EditorMsg>,
        state: &mut EditorState,
        kind: ActionKind,
        custom_prompt: Option<String>,
    ) -> Result<ActionState, EditorError> {
        let selection = state.selection.ok_or(EditorError::NoSelection)?;
        doc::validate_selection(&state.content, &selection, state.epoch)?;
        let selection_text = markup::strip_markup(&state.content[selection.start..selection.end]);
        if selection_text.trim().is_empty() {
            return Err(EditorError::EmptySelection);
        }

        state.session_token += 1;
        let session = ActionSession::open(
            state.session_token,
            kind,
            selection,
            selection_text,
            custom_prompt,
        );
        if session.is_processing() {
            Self::dispatch_action(myself, state.gateway.clone(), &session);
        }
        let action_state = session.state.clone();
        state.session = Some(session);
        Ok(action_state)
    }

    fn submit_prompt(
        myself: &ActorRef<EditorMsg>,
        state: &mut EditorState,
        prompt: String,
    ) -> Result<ActionState, EditorError> {
        let gateway = state.gateway.clone();
        let session = state
            .session
            .as_mut()
            .ok_or(EditorError::InvalidActionState { expected: "prompt" })?;
        session.submit_prompt(prompt)?;
        Self::dispatch_action(myself, gateway, session);
        Ok(session.state.clone())
    }

    async fn apply_action(state: &mut EditorState) -> Result<EditorSnapshot, EditorError> {
        let session = state
            .session
            .as_ref()
            .ok_or(EditorError::InvalidActionState { expected: "result" })?;
        let text = session.result_text()?.to_string();
        let selection = session.selection;
        doc::validate_selection(&state.content, &selection, state.epoch)?;

        let fragment = markup::markdown_to_markup(&markup::clean_model_output(&text));
        state.content = doc::replace_range(&state.content, &selection, &fragment);
        state.revision += 1;
        state.session = None;
        state.selection = None;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }

    async fn insert_at_selection(
        state: &mut EditorState,
        text: String,
    ) -> Result<EditorSnapshot, EditorError> {
        let selection = state.selection.ok_or(EditorError::NoSelection)?;
        doc::validate_selection(&state.content, &selection, state.epoch)?;

        let fragment = markup::markdown_to_markup(&markup::clean_model_output(&text));
        state.content = doc::replace_range(&state.content, &selection, &fragment);
        state.revision += 1;
        state.selection = None;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }

    async fn replace_exact(
        state: &mut EditorState,
        original: String,
        replacement: String,
    ) -> Result<EditorSnapshot, EditorError> {
        if !state.content.contains(&original) {
            return Err(EditorError::NoMatch);
        }
        state.content = state
            .content
            .replacen(&original, &markup::escape_html(&replacement), 1);
        state.revision += 1;
        Self::commit(state).await?;
        Ok(Self::snapshot(state))
    }
}

#[async_trait]
impl Actor for EditorActor {
    type Msg = EditorMsg;
    type State = EditorState;
    type Arguments = EditorArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tokio::fs::create_dir_all(&args.data_dir).await?;
        let doc_path = args.data_dir.join(DRAFT_FILE);
        let meta_path = args.data_dir.join(META_FILE);

        let content = match tokio::fs::read_to_string(&doc_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %doc_path.display(), "Could not read draft, starting empty");
                String::new()
            }
        };
        let meta: DraftMeta = match tokio::fs::read_to_string(&meta_path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Draft metadata is corrupt, resetting counters");
                DraftMeta::default()
            }),
            Err(_) => DraftMeta::default(),
        };

        if !content.is_empty() {
            tracing::info!(
                revision = meta.revision,
                chars = markup::char_count(&content),
                "Restored draft from disk"
            );
        }

        Ok(EditorState {
            gateway: args.gateway,
            analysis: args.analysis,
            doc_path,
            meta_path,
            content,
            revision: meta.revision,
            epoch: meta.epoch,
            selection: None,
            session: None,
            session_token: 0,
            idle_token: 0,
            pending_completion: None,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            EditorMsg::Snapshot { reply } => {
                let _ = reply.send(Self::snapshot(state));
            }
            EditorMsg::Update {
                content,
                base_rev,
                reply,
            } => {
                let _ = reply.send(Self::update(&myself, state, content, base_rev).await);
            }
            EditorMsg::New { reply } => {
                let _ = reply.send(Self::replace_document(state, String::new()).await);
            }
            EditorMsg::Import {
                file_name,
                content,
                reply,
            } => {
                let _ = reply.send(Self::import(state, file_name, content).await);
            }
            EditorMsg::SyncView {
                view_content,
                reply,
            } => {
                let replaced = view_content.trim().is_empty() && !state.content.is_empty();
                let _ = reply.send(SyncOutcome {
                    content: state.content.clone(),
                    revision: state.revision,
                    epoch: state.epoch,
                    replaced,
                });
            }
            EditorMsg::Format { command, reply } => {
                let _ = reply.send(Self::format(state, command).await);
            }
            EditorMsg::SetSelection { start, end, reply } => {
                let _ = reply.send(Self::set_selection(state, start, end));
            }
            EditorMsg::GetSelection { reply } => {
                let _ = reply.send(state.selection);
            }

            EditorMsg::AutocompleteState { reply } => {
                let _ = reply.send(state.pending_completion.clone());
            }
            EditorMsg::AcceptCompletion { reply } => {
                let _ = reply.send(Self::accept_completion(state).await);
            }
            EditorMsg::DismissCompletion { reply } => {
                state.pending_completion = None;
                let _ = reply.send(());
            }
            EditorMsg::IdleElapsed { token } => {
                if token != state.idle_token || state.session.is_some() {
                    return Ok(());
                }
                let text = markup::strip_markup(&state.content);
                if text.chars().count() <= AUTOCOMPLETE_TRIGGER_CHARS {
                    return Ok(());
                }
                let gateway = state.gateway.clone();
                let actor = myself.clone();
                tokio::spawn(async move {
                    let suggestion = gateway.autocomplete(&text).await;
                    let _ = actor.cast(EditorMsg::CompletionReady { token, suggestion });
                });
            }
            EditorMsg::CompletionReady { token, suggestion } => {
                if token == state.idle_token && !suggestion.is_empty() {
                    state.pending_completion = Some(suggestion);
                }
            }

            EditorMsg::StartAction {
                kind,
                custom_prompt,
                reply,
            } => {
                let _ = reply.send(Self::start_action(&myself, state, kind, custom_prompt));
            }
            EditorMsg::SubmitPrompt { prompt, reply } => {
                let _ = reply.send(Self::submit_prompt(&myself, state, prompt));
            }
            EditorMsg::GetActionState { reply } => {
                let action_state = state
                    .session
                    .as_ref()
                    .map(|s| s.state.clone())
                    .unwrap_or(ActionState::Closed);
                let _ = reply.send(action_state);
            }
            EditorMsg::ActionFinished {
                token,
                text,
                failed,
            } => {
                match state.session.as_mut() {
                    Some(session) if session.token == token && session.is_processing() => {
                        // Transition is infallible from processing.
                        let _ = session.complete(text, failed);
                    }
                    _ => {
                        tracing::debug!(token, "Dropping completion for a closed action session");
                    }
                }
            }
            EditorMsg::ApplyAction { reply } => {
                let _ = reply.send(Self::apply_action(state).await);
            }
            EditorMsg::CopyAction { reply } => {
                // Copy leaves the session open so the result can be reused.
                let result = state
                    .session
                    .as_ref()
                    .ok_or(EditorError::InvalidActionState { expected: "result" })
                    .and_then(|s| s.result_text().map(str::to_string));
                let _ = reply.send(result);
            }
            EditorMsg::CloseAction { reply } => {
                state.session = None;
                let _ = reply.send(ActionState::Closed);
            }

            EditorMsg::InsertAtSelection { text, reply } => {
                let _ = reply.send(Self::insert_at_selection(state, text).await);
            }
            EditorMsg::ReplaceExact {
                original,
                replacement,
                reply,
            } => {
                let _ = reply.send(Self::replace_exact(state, original, replacement).await);
            }
        }
        Ok(())
    }
}
