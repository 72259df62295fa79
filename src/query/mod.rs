mod datafusion_session;
pub mod mock;
pub mod selector;
mod session;

pub use datafusion_session::{DataFormat, DataFusionSession};
pub use selector::{query_number, QuerySelector, Selection, SkipReason};
pub use session::QuerySession;
