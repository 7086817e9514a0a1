use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::user::model::PublicUser;

/// A comment and, recursively, its replies. Each node owns its replies outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub replies: Vec<Comment>,
    /// Fields written by other tools, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-time projection of a [`Comment`] with its author's public fields attached.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub user_id: Option<String>,
    pub text: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    pub replies: Vec<CommentView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl CreateCommentRequest {
    /// Parent id from either `parent` or `parent_id`, ignoring empty strings.
    pub fn parent_id(&self) -> Option<&str> {
        [self.parent.as_deref(), self.parent_id.as_deref()]
            .into_iter()
            .flatten()
            .find(|p| !p.is_empty())
    }
}
