use regex::Regex;
use std::sync::LazyLock;

use crate::comment::service::{attach_authors, count_all};
use crate::database::{Collection, JsonStore};
use crate::link::detect::{DetectedKind, classify};
use crate::post::post_model::{CreatePostRequest, Post, PostKind, PostView, PostsDocument, UpdatePostRequest};
use crate::user::model::UserIndex;
use crate::utils::error::CustomError;
use crate::utils::helpers::{next_id, today};

static EMBEDDED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("embedded url pattern"));

/// Pull the first `http(s)://` token out of `text`.
///
/// Returns the URL and the text with every occurrence of that URL removed and
/// the result trimmed. Later, different URLs stay in the text.
pub fn extract_first_url(text: &str) -> Option<(String, String)> {
    let url = EMBEDDED_URL.find(text)?.as_str().to_string();
    let remaining = text.replace(&url, "").trim().to_string();
    Some((url, remaining))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build a new post from submitted fields and already-stored media URLs.
pub fn compose_post(fields: CreatePostRequest, media_urls: Vec<String>, author_id: &str) -> Post {
    let title = non_empty(fields.title);
    let mut text = non_empty(fields.text);
    let tags = fields.tags.map(|t| t.into_tags()).unwrap_or_default();

    let embedded = if media_urls.is_empty() {
        text.as_deref().and_then(extract_first_url)
    } else {
        None
    };

    let (kind, url, urls) = if !media_urls.is_empty() {
        (PostKind::Photo, media_urls.first().cloned(), Some(media_urls))
    } else if let Some((url, remaining)) = embedded {
        text = Some(remaining).filter(|t| !t.is_empty());
        let kind = match classify(&url).kind {
            DetectedKind::Video => PostKind::Video,
            _ => PostKind::Link,
        };
        (kind, Some(url), None)
    } else {
        (PostKind::Text, None, None)
    };

    Post {
        id: next_id("p"),
        date: today(),
        tags,
        title,
        text,
        url,
        urls,
        kind,
        description: None,
        user_id: Some(author_id.to_string()),
        comments: Vec::new(),
        extra: Default::default(),
    }
}

/// Merge the allow-listed fields of `patch` into `post`.
pub fn apply_update(post: &mut Post, patch: UpdatePostRequest) {
    if let Some(title) = patch.title {
        post.title = title;
    }
    if let Some(text) = patch.text {
        post.text = text;
    }
    if let Some(url) = patch.url {
        post.url = url;
    }
    if let Some(description) = patch.description {
        post.description = description;
    }
    if let Some(tags) = patch.tags {
        post.tags = tags;
    }
    if let Some(kind) = patch.kind {
        post.kind = kind;
    }
    if let Some(date) = patch.date {
        post.date = date;
    }
}

/// Decorate a post for display: author, comment authors and total comment count.
pub fn project(post: Post, users: &UserIndex) -> PostView {
    PostView {
        user: post.user_id.as_ref().and_then(|uid| users.get(uid).cloned()),
        comment_count: count_all(&post.comments),
        comments: attach_authors(&post.comments, users),
        id: post.id,
        date: post.date,
        tags: post.tags,
        title: post.title,
        text: post.text,
        url: post.url,
        urls: post.urls,
        kind: post.kind,
        description: post.description,
        user_id: post.user_id,
        extra: post.extra,
    }
}

#[derive(Debug, Clone)]
pub struct PostService {
    store: JsonStore,
}

impl PostService {
    pub fn new(store: JsonStore) -> Self {
        PostService { store }
    }

    fn load_document(&self) -> Result<PostsDocument, CustomError> {
        Ok(self.store.load(Collection::Posts)?)
    }

    fn save_document(&self, document: &PostsDocument) -> Result<(), CustomError> {
        Ok(self.store.save(Collection::Posts, document)?)
    }

    /// All posts, newest date first; posts sharing a date keep their stored order.
    pub fn list_posts(&self) -> Result<Vec<Post>, CustomError> {
        let mut posts = self.load_document()?.posts;
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    pub fn get_post(&self, id: &str) -> Result<Option<Post>, CustomError> {
        Ok(self.load_document()?.posts.into_iter().find(|p| p.id == id))
    }

    /// Create a post and store it at the head of the collection.
    pub fn create_post(
        &self,
        fields: CreatePostRequest,
        media_urls: Vec<String>,
        author_id: &str,
    ) -> Result<Post, CustomError> {
        let post = compose_post(fields, media_urls, author_id);

        let mut document = self.load_document()?;
        document.posts.insert(0, post.clone());
        self.save_document(&document)?;

        log::info!("post {} created as {:?} by user {}", post.id, post.kind, author_id);
        Ok(post)
    }

    pub fn update_post(&self, id: &str, patch: UpdatePostRequest) -> Result<Post, CustomError> {
        let mut document = self.load_document()?;
        let post = document
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;

        apply_update(post, patch);
        let updated = post.clone();
        self.save_document(&document)?;

        log::info!("post {} updated", id);
        Ok(updated)
    }

    /// Remove the post if present. Repeating the call is not an error.
    pub fn delete_post(&self, id: &str) -> Result<String, CustomError> {
        let mut document = self.load_document()?;
        let before = document.posts.len();
        document.posts.retain(|p| p.id != id);
        self.save_document(&document)?;

        if document.posts.len() < before {
            log::info!("post {} deleted", id);
        } else {
            log::info!("delete of post {} found nothing to remove", id);
        }
        Ok(id.to_string())
    }
}
