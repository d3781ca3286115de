pub mod logging;
pub mod request_id;

pub use logging::init_tracing;
pub use request_id::{REQUEST_ID_HEADER, TracedClientExt, TracedRequest, extract_request_id};
