pub mod health;
pub mod pages;
pub mod prompt;

pub use health::{health_check, readiness_check};
pub use pages::index;
pub use prompt::{generate_quiz, method_not_allowed};
