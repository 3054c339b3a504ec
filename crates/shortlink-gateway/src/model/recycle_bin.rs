use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinRequest {
    pub gid: String,
    pub full_short_url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionResponse {
    /// `false` when the link was not in the expected state.
    pub applied: bool,
}

#[derive(Debug, Deserialize)]
pub struct PageRecycleBinQuery {
    pub gid: Option<String>,
    pub current: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub url: Option<String>,
}
