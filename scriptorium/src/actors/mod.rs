//! Actors owning the shared mutable state.
//!
//! One actor per top-level resource: the document (plus selection, popup
//! session, and pending autocomplete) in [`editor::EditorActor`], the
//! analysis result in [`analysis::AnalysisActor`], and the conversation in
//! [`chat::ChatActor`]. All mutation flows through mailboxes; gateway calls
//! that must not block a mailbox run on spawned tasks and post their
//! completions back as messages.

pub mod analysis;
pub mod chat;
pub mod editor;
