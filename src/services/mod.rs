pub mod ai_service;
pub mod completion;
pub mod model_service;
pub mod openrouter;

pub use ai_service::*;
pub use completion::*;
pub use model_service::*;
pub use openrouter::*;
