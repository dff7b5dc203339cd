//! quiz-service: accepts a document upload plus a user-supplied Gemini API
//! key, proxies the document to the Generative Language API, and returns the
//! generated multiple-choice questions as markdown.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;
