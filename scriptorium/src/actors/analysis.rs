//! AnalysisActor - debounced document analysis.
//!
//! Holds the latest AnalysisResult and the loading flag. Document-change
//! notifications are debounced by two seconds of quiescence using a
//! generation counter plus a spawned sleep; every new notification bumps
//! the generation, orphaning older timers. Completions are generation
//! tagged, so a superseded in-flight analysis can never overwrite a newer
//! stored result (last initiated wins).

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::Serialize;
use std::time::Duration;

use shared_types::{AnalysisResult, Suggestion};

use crate::gateway::SharedGateway;

/// Quiet period before a document change triggers analysis.
pub const ANALYSIS_DEBOUNCE: Duration = Duration::from_secs(2);
/// Stripped text must exceed this length for the debounce loop to analyze.
pub const ANALYSIS_MIN_CHARS: usize = 50;

pub struct AnalysisActor;

#[derive(Clone)]
pub struct AnalysisArguments {
    pub gateway: SharedGateway,
}

pub struct AnalysisState {
    gateway: SharedGateway,
    /// Bumped on every change notification; stale timers compare against it.
    generation: u64,
    /// Highest generation dispatched to the provider.
    dispatched: u64,
    /// Generation of the stored result.
    stored: u64,
    pending_text: Option<String>,
    result: Option<AnalysisResult>,
}

/// Observable dashboard state.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStatus {
    pub loading: bool,
    pub generation: u64,
    pub result: Option<AnalysisResult>,
}

#[derive(Debug)]
pub enum AnalysisMsg {
    /// Cast by EditorActor on every document mutation.
    DocumentChanged { text: String },
    /// Cast by the debounce timer task.
    DebounceElapsed { generation: u64 },
    /// Cast by the spawned analyze task.
    AnalysisComplete {
        generation: u64,
        result: AnalysisResult,
    },
    /// Analyze immediately, bypassing the debounce.
    Refresh {
        text: String,
        reply: RpcReplyPort<AnalysisStatus>,
    },
    Status { reply: RpcReplyPort<AnalysisStatus> },
    FindSuggestion {
        suggestion_id: String,
        reply: RpcReplyPort<Option<Suggestion>>,
    },
}

impl AnalysisActor {
    fn status(state: &AnalysisState) -> AnalysisStatus {
        AnalysisStatus {
            loading: state.dispatched > state.stored,
            generation: state.stored,
            result: state.result.clone(),
        }
    }

    fn dispatch(myself: &ActorRef<AnalysisMsg>, state: &mut AnalysisState, text: String) {
        state.dispatched = state.dispatched.max(state.generation);
        let generation = state.generation;
        let gateway = state.gateway.clone();
        let actor = myself.clone();
        tokio::spawn(async move {
            let result = gateway.analyze(&text).await;
            let _ = actor.cast(AnalysisMsg::AnalysisComplete { generation, result });
        });
    }
}

#[async_trait]
impl Actor for AnalysisActor {
    type Msg = AnalysisMsg;
    type State = AnalysisState;
    type Arguments = AnalysisArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(AnalysisState {
            gateway: args.gateway,
            generation: 0,
            dispatched: 0,
            stored: 0,
            pending_text: None,
            result: None,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            AnalysisMsg::DocumentChanged { text } => {
                state.generation += 1;
                state.pending_text = Some(text);
                let generation = state.generation;
                let timer_target = myself.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(ANALYSIS_DEBOUNCE).await;
                    let _ = timer_target.cast(AnalysisMsg::DebounceElapsed { generation });
                });
            }
            AnalysisMsg::DebounceElapsed { generation } => {
                if generation != state.generation {
                    return Ok(());
                }
                let Some(text) = state.pending_text.take() else {
                    return Ok(());
                };
                if text.chars().count() > ANALYSIS_MIN_CHARS {
                    Self::dispatch(&myself, state, text);
                }
            }
            AnalysisMsg::AnalysisComplete { generation, result } => {
                if generation < state.stored {
                    tracing::debug!(
                        generation,
                        stored = state.stored,
                        "Discarding superseded analysis completion"
                    );
                    return Ok(());
                }
                state.stored = generation;
                state.result = Some(result);
            }
            AnalysisMsg::Refresh { text, reply } => {
                state.generation += 1;
                state.pending_text = None;
                Self::dispatch(&myself, state, text);
                let _ = reply.send(Self::status(state));
            }
            AnalysisMsg::Status { reply } => {
                let _ = reply.send(Self::status(state));
            }
            AnalysisMsg::FindSuggestion {
                suggestion_id,
                reply,
            } => {
                let suggestion = state.result.as_ref().and_then(|r| {
                    r.suggestions
                        .iter()
                        .find(|s| s.id == suggestion_id)
                        .cloned()
                });
                let _ = reply.send(suggestion);
            }
        }
        Ok(())
    }
}
