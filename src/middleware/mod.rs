pub mod access_gate;
pub mod response;

pub use access_gate::{access_gate, AccessState, GateDecision, StudioUser};
pub use response::{ApiResponse, ApiResult, HtmlPage};
