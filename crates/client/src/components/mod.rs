//! Reusable components.

pub mod chat_widget;
pub mod sign_in_prompt;
pub mod ui;

pub use chat_widget::ChatWidget;
pub use sign_in_prompt::SignInPrompt;
