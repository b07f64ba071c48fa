pub mod http_client;
pub mod sink;

pub use http_client::{MockHttpClient, MockReply};
pub use sink::MockSink;
