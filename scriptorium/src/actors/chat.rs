//! ChatActor - the sidebar conversation.
//!
//! History is append-only: every successful turn appends exactly one user
//! message and one assistant message, including degraded turns where the
//! assistant text is the fixed apology. The gateway call runs inline in the
//! mailbox, serializing turns. Apply bridges an assistant message into the
//! document through the editor's saved selection.

use async_trait::async_trait;
use ractor::{call, Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::Serialize;

use shared_types::{ChatMessage, ChatRole, EditorSnapshot};

use super::editor::EditorMsg;
use crate::editor::EditorError;
use crate::gateway::SharedGateway;
use crate::markup;

/// Document context sent with each turn is truncated to this many chars.
pub const CHAT_CONTEXT_CHARS: usize = 1500;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("message not found")]
    NotFound,

    #[error("only assistant messages can be applied to the document")]
    NotModelTurn,

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("editor unavailable: {0}")]
    EditorUnavailable(String),
}

/// The two messages appended by one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub model: ChatMessage,
}

pub struct ChatActor;

pub struct ChatArguments {
    pub gateway: SharedGateway,
    pub editor: ActorRef<EditorMsg>,
}

pub struct ChatState {
    gateway: SharedGateway,
    editor: ActorRef<EditorMsg>,
    history: Vec<ChatMessage>,
}

#[derive(Debug)]
pub enum ChatMsg {
    Send {
        text: String,
        reply: RpcReplyPort<Result<ChatExchange, ChatError>>,
    },
    History {
        reply: RpcReplyPort<Vec<ChatMessage>>,
    },
    /// Insert an assistant message's text at the editor's saved selection.
    Apply {
        message_id: String,
        reply: RpcReplyPort<Result<EditorSnapshot, ChatError>>,
    },
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl ChatActor {
    async fn send(state: &mut ChatState, text: String) -> Result<ChatExchange, ChatError> {
        let snapshot = call!(state.editor, |reply| EditorMsg::Snapshot { reply })
            .map_err(|e| ChatError::EditorUnavailable(e.to_string()))?;
        let stripped = markup::strip_markup(&snapshot.content);
        let context = truncate_chars(&stripped, CHAT_CONTEXT_CHARS);

        let reply_text = state.gateway.chat(&state.history, &text, context).await;

        let user = ChatMessage::new(ChatRole::User, text);
        let model = ChatMessage::new(ChatRole::Model, reply_text);
        state.history.push(user.clone());
        state.history.push(model.clone());
        Ok(ChatExchange { user, model })
    }

    async fn apply(state: &ChatState, message_id: &str) -> Result<EditorSnapshot, ChatError> {
        let message = state
            .history
            .iter()
            .find(|m| m.id == message_id)
            .ok_or(ChatError::NotFound)?;
        if message.role != ChatRole::Model {
            return Err(ChatError::NotModelTurn);
        }

        let text = message.content.clone();
        call!(state.editor, |reply| EditorMsg::InsertAtSelection {
            text,
            reply
        })
        .map_err(|e| ChatError::EditorUnavailable(e.to_string()))?
        .map_err(ChatError::Editor)
    }
}

#[async_trait]
impl Actor for ChatActor {
    type Msg = ChatMsg;
    type State = ChatState;
    type Arguments = ChatArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(ChatState {
            gateway: args.gateway,
            editor: args.editor,
            history: Vec::new(),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ChatMsg::Send { text, reply } => {
                let _ = reply.send(Self::send(state, text).await);
            }
            ChatMsg::History { reply } => {
                let _ = reply.send(state.history.clone());
            }
            ChatMsg::Apply { message_id, reply } => {
                let _ = reply.send(Self::apply(state, &message_id).await);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::analysis::{AnalysisActor, AnalysisArguments};
    use crate::actors::editor::{EditorActor, EditorArguments};
    use crate::gateway::{ActionReply, WritingGateway};
    use shared_types::{ActionKind, AnalysisResult};
    use std::sync::Arc;

    struct EchoGateway;

    #[async_trait]
    impl WritingGateway for EchoGateway {
        async fn analyze(&self, _: &str) -> AnalysisResult {
            AnalysisResult::default()
        }

        async fn chat(&self, history: &[ChatMessage], new_message: &str, _: &str) -> String {
            format!("reply {} to: {new_message}", history.len() / 2 + 1)
        }

        async fn autocomplete(&self, _: &str) -> String {
            String::new()
        }

        async fn quick_action(&self, _: ActionKind, _: &str, _: Option<&str>) -> ActionReply {
            ActionReply {
                text: String::new(),
                failed: false,
            }
        }
    }

    async fn spawn_chain(dir: &std::path::Path) -> (ActorRef<EditorMsg>, ActorRef<ChatMsg>) {
        let gateway: SharedGateway = Arc::new(EchoGateway);
        let (analysis, _) = Actor::spawn(
            None,
            AnalysisActor,
            AnalysisArguments {
                gateway: gateway.clone(),
            },
        )
        .await
        .unwrap();
        let (editor, _) = Actor::spawn(
            None,
            EditorActor,
            EditorArguments {
                gateway: gateway.clone(),
                analysis,
                data_dir: dir.to_path_buf(),
            },
        )
        .await
        .unwrap();
        let (chat, _) = Actor::spawn(
            None,
            ChatActor,
            ChatArguments {
                gateway,
                editor: editor.clone(),
            },
        )
        .await
        .unwrap();
        (editor, chat)
    }

    #[tokio::test]
    async fn test_send_appends_exactly_one_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let (_editor, chat) = spawn_chain(dir.path()).await;

        let exchange = call!(chat, |reply| ChatMsg::Send {
            text: "How do I tighten this paragraph?".into(),
            reply,
        })
        .unwrap()
        .unwrap();
        assert_eq!(exchange.user.role, ChatRole::User);
        assert_eq!(exchange.model.role, ChatRole::Model);
        assert_eq!(
            exchange.model.content,
            "reply 1 to: How do I tighten this paragraph?"
        );

        let history = call!(chat, |reply| ChatMsg::History { reply }).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, exchange.user.id);
        assert_eq!(history[1].id, exchange.model.id);
    }

    #[tokio::test]
    async fn test_apply_rejects_unknown_and_user_messages() {
        let dir = tempfile::tempdir().unwrap();
        let (_editor, chat) = spawn_chain(dir.path()).await;

        let err = call!(chat, |reply| ChatMsg::Apply {
            message_id: "nope".into(),
            reply,
        })
        .unwrap()
        .unwrap_err();
        assert_eq!(err, ChatError::NotFound);

        let exchange = call!(chat, |reply| ChatMsg::Send {
            text: "hello".into(),
            reply,
        })
        .unwrap()
        .unwrap();
        let err = call!(chat, |reply| ChatMsg::Apply {
            message_id: exchange.user.id,
            reply,
        })
        .unwrap()
        .unwrap_err();
        assert_eq!(err, ChatError::NotModelTurn);
    }

    #[tokio::test]
    async fn test_apply_inserts_at_editor_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (editor, chat) = spawn_chain(dir.path()).await;

        call!(editor, |reply| EditorMsg::Update {
            content: "<p>replace THIS now</p>".into(),
            base_rev: 0,
            reply,
        })
        .unwrap()
        .unwrap();
        call!(editor, |reply| EditorMsg::SetSelection {
            start: 11,
            end: 15,
            reply,
        })
        .unwrap()
        .unwrap();

        let exchange = call!(chat, |reply| ChatMsg::Send {
            text: "suggest".into(),
            reply,
        })
        .unwrap()
        .unwrap();
        let snapshot = call!(chat, |reply| ChatMsg::Apply {
            message_id: exchange.model.id,
            reply,
        })
        .unwrap()
        .unwrap();
        assert_eq!(snapshot.content, "<p>replace reply 1 to: suggest now</p>");
    }

    #[tokio::test]
    async fn test_apply_without_selection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (_editor, chat) = spawn_chain(dir.path()).await;

        let exchange = call!(chat, |reply| ChatMsg::Send {
            text: "hi".into(),
            reply,
        })
        .unwrap()
        .unwrap();
        let err = call!(chat, |reply| ChatMsg::Apply {
            message_id: exchange.model.id,
            reply,
        })
        .unwrap()
        .unwrap_err();
        assert_eq!(err, ChatError::Editor(EditorError::NoSelection));
    }
}
