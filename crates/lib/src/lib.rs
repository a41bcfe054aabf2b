//! Local Chatbot core library — configuration, Ollama gateway, conversation
//! session, turn controller, availability poller, and the web server used by
//! both the CLI and the browser UI.

pub mod chat;
pub mod config;
pub mod llm;
pub mod poller;
pub mod session;
pub mod turn;
pub mod web;
