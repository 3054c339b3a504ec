mod recycle_bin;
mod response;

pub use recycle_bin::{PageRecycleBinQuery, RecycleBinRequest, TitleQuery, TransitionResponse};
pub use response::{ApiResponse, HealthResponse, SUCCESS_CODE};
