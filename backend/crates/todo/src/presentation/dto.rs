//! Request bodies and query parameters

use serde::Deserialize;

use crate::application::NewDetails;

#[derive(Debug, Clone, Deserialize)]
pub struct TodoTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TodoListRequest {
    pub name: String,
    pub type_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailsCreateRequest {
    pub to_do_list_id: i64,
    pub name: String,
    pub detail: String,
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

impl From<DetailsCreateRequest> for NewDetails {
    fn from(req: DetailsCreateRequest) -> Self {
        Self {
            to_do_list_id: req.to_do_list_id,
            name: req.name,
            detail: req.detail,
            user_ids: req.user_ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailsUpdateRequest {
    pub name: String,
    pub detail: String,
}

/// Extra query parameter of the details listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsFilter {
    pub to_do_list_id: Option<i64>,
}
