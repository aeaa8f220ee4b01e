pub mod security_headers;
pub mod tracing;

pub use security_headers::security_headers_middleware;
pub use tracing::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
