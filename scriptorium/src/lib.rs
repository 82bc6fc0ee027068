//! Scriptorium - academic writing assistant backend
//!
//! Actor-based service exposing a rich-text document model, an AI chat
//! sidebar, quick actions, live document analysis, and document export
//! over a REST API. All substantive intelligence is delegated to an
//! external generative-language provider behind the gateway trait.

pub mod actors;
pub mod api;
pub mod app_state;
pub mod config;
pub mod editor;
pub mod export;
pub mod gateway;
pub mod markup;
