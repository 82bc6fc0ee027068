//! Shared application state: configuration, the gateway, and lazily
//! spawned actor handles.

use ractor::{Actor, ActorRef};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::actors::analysis::{AnalysisActor, AnalysisArguments, AnalysisMsg};
use crate::actors::chat::{ChatActor, ChatArguments, ChatMsg};
use crate::actors::editor::{EditorActor, EditorArguments, EditorMsg};
use crate::config::Config;
use crate::gateway::SharedGateway;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    gateway: SharedGateway,
    analysis: Mutex<Option<ActorRef<AnalysisMsg>>>,
    editor: Mutex<Option<ActorRef<EditorMsg>>>,
    chat: Mutex<Option<ActorRef<ChatMsg>>>,
}

fn running<T>(actor: &ActorRef<T>) -> bool {
    actor.get_status() == ractor::ActorStatus::Running
}

impl AppState {
    pub fn new(config: Config, gateway: SharedGateway) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                analysis: Mutex::new(None),
                editor: Mutex::new(None),
                chat: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get or spawn the analysis actor. A cell that stopped (panicked
    /// handler, test teardown) is replaced rather than handed out.
    pub async fn ensure_analysis(&self) -> Result<ActorRef<AnalysisMsg>, String> {
        let mut guard = self.inner.analysis.lock().await;
        if let Some(analysis) = guard.as_ref() {
            if running(analysis) {
                return Ok(analysis.clone());
            }
            *guard = None;
        }

        let (analysis, _) = Actor::spawn(
            Some(format!("analysis:{}", uuid::Uuid::new_v4())),
            AnalysisActor,
            AnalysisArguments {
                gateway: self.inner.gateway.clone(),
            },
        )
        .await
        .map_err(|e| e.to_string())?;

        *guard = Some(analysis.clone());
        Ok(analysis)
    }

    pub async fn ensure_editor(&self) -> Result<ActorRef<EditorMsg>, String> {
        let analysis = self.ensure_analysis().await?;

        let mut guard = self.inner.editor.lock().await;
        if let Some(editor) = guard.as_ref() {
            if running(editor) {
                return Ok(editor.clone());
            }
            *guard = None;
        }

        let (editor, _) = Actor::spawn(
            Some(format!("editor:{}", uuid::Uuid::new_v4())),
            EditorActor,
            EditorArguments {
                gateway: self.inner.gateway.clone(),
                analysis,
                data_dir: self.inner.config.data_dir.clone(),
            },
        )
        .await
        .map_err(|e| e.to_string())?;

        *guard = Some(editor.clone());
        Ok(editor)
    }

    pub async fn ensure_chat(&self) -> Result<ActorRef<ChatMsg>, String> {
        let editor = self.ensure_editor().await?;

        let mut guard = self.inner.chat.lock().await;
        if let Some(chat) = guard.as_ref() {
            if running(chat) {
                return Ok(chat.clone());
            }
            *guard = None;
        }

        let (chat, _) = Actor::spawn(
            Some(format!("chat:{}", uuid::Uuid::new_v4())),
            ChatActor,
            ChatArguments {
                gateway: self.inner.gateway.clone(),
                editor,
            },
        )
        .await
        .map_err(|e| e.to_string())?;

        *guard = Some(chat.clone());
        Ok(chat)
    }
}
