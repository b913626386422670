// Public modules
pub mod api_error;
pub mod generate_content;
pub mod message;
pub mod model;

// Re-exports
pub use api_error::{ApiErrorBody, ApiErrorDetail};
pub use generate_content::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part,
};
pub use message::{Message, Role};
pub use model::{KnownModel, Model};
