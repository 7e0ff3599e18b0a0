pub mod auth;
pub mod body;
pub mod path;
pub mod response;
pub mod session;

pub use auth::{access_token_middleware, ACCESS_TOKEN_HEADER};
pub use body::JsonBody;
pub use path::UrlPath;
pub use response::{panic_response, ApiResponse, ApiResult};
pub use session::{session_middleware, SESSION_TOKEN_HEADER};
