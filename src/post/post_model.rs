use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::comment::model::{Comment, CommentView};
use crate::user::model::PublicUser;
use crate::utils::model::present;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Text,
    Photo,
    Video,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// `YYYY-MM-DD`; the listing sort key.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Primary URL: the link, the video, or the first photo.
    #[serde(default)]
    pub url: Option<String>,
    /// Every photo of a multi-image post, in upload order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    pub kind: PostKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// On-disk shape of `posts/posts.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsDocument {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tags arrive either as a comma separated string (forms) or a JSON list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Joined(String),
    List(Vec<String>),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagsInput::Joined(s) => s.split(',').map(str::to_string).collect(),
            TagsInput::List(list) => list,
        };
        raw.iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Fields accepted when creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Allow-listed mutable fields for an update. For the optional fields the outer
/// `Option` tells whether the key was sent, the inner one carries an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub text: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    pub kind: Option<PostKind>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A post as served by the listing endpoint: authors attached, comments counted.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub date: String,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    pub comment_count: usize,
    pub comments: Vec<CommentView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
