pub mod error;
pub mod handlers;
pub mod manager;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use manager::ChatService;
pub use server::{build_router, run_server};
pub use state::AppState;
