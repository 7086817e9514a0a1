use crate::comment::model::{Comment, CommentView};
use crate::database::{Collection, JsonStore};
use crate::post::post_model::{Post, PostsDocument};
use crate::user::model::UserIndex;
use crate::utils::error::CustomError;
use crate::utils::helpers::{next_id, today};

/// Depth-first search over the whole forest: each node before its replies,
/// siblings in stored order. Iterative so deep threads cannot exhaust the stack.
pub fn find_by_id<'a>(forest: &'a [Comment], id: &str) -> Option<&'a Comment> {
    let mut stack: Vec<&'a Comment> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.replies.iter().rev());
    }
    None
}

/// Mutable counterpart of [`find_by_id`], same visiting order.
pub fn find_by_id_mut<'a>(forest: &'a mut [Comment], id: &str) -> Option<&'a mut Comment> {
    let mut stack: Vec<&'a mut Comment> = forest.iter_mut().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.replies.iter_mut().rev());
    }
    None
}

/// Deepest reply level a thread may reach; top-level comments are level 1.
pub const MAX_THREAD_DEPTH: usize = 200;

/// Level of the first comment with `id`, top-level comments being level 1.
pub fn depth_of(forest: &[Comment], id: &str) -> Option<usize> {
    let mut stack: Vec<(&Comment, usize)> = forest.iter().rev().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        if node.id == id {
            return Some(depth);
        }
        stack.extend(node.replies.iter().rev().map(|r| (r, depth + 1)));
    }
    None
}

/// Number of comments in the forest, replies included.
pub fn count_all(forest: &[Comment]) -> usize {
    forest.iter().map(|c| 1 + count_all(&c.replies)).sum()
}

/// Append a new comment to `post`, as a reply to `parent_id` when given.
///
/// The post is left untouched on error. The caller persists the collection.
pub fn add_comment(
    post: &mut Post,
    text: &str,
    author_id: &str,
    parent_id: Option<&str>,
) -> Result<Comment, CustomError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CustomError::ValidationError("Missing text".to_string()));
    }

    if let Some(parent_id) = parent_id {
        let parent_depth = depth_of(&post.comments, parent_id)
            .ok_or_else(|| CustomError::NotFoundError("parent not found".to_string()))?;
        if parent_depth >= MAX_THREAD_DEPTH {
            return Err(CustomError::ValidationError(format!(
                "Replies cannot nest deeper than {} levels",
                MAX_THREAD_DEPTH
            )));
        }
    }

    let siblings = match parent_id {
        Some(parent_id) => {
            &mut find_by_id_mut(&mut post.comments, parent_id)
                .ok_or_else(|| CustomError::NotFoundError("parent not found".to_string()))?
                .replies
        }
        None => &mut post.comments,
    };

    let comment = Comment {
        id: next_id("c"),
        user_id: Some(author_id.to_string()),
        text: text.to_string(),
        date: today(),
        replies: Vec::new(),
        extra: Default::default(),
    };
    siblings.push(comment.clone());

    Ok(comment)
}

/// Display projection of the forest with each comment's author attached.
pub fn attach_authors(forest: &[Comment], users: &UserIndex) -> Vec<CommentView> {
    forest
        .iter()
        .map(|c| CommentView {
            id: c.id.clone(),
            user_id: c.user_id.clone(),
            text: c.text.clone(),
            date: c.date.clone(),
            user: c.user_id.as_ref().and_then(|uid| users.get(uid).cloned()),
            replies: attach_authors(&c.replies, users),
            extra: c.extra.clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CommentService {
    store: JsonStore,
}

impl CommentService {
    pub fn new(store: JsonStore) -> Self {
        CommentService { store }
    }

    /// Add a comment to the post `post_id` and persist the post collection.
    pub fn add(
        &self,
        post_id: &str,
        text: &str,
        author_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, CustomError> {
        if text.trim().is_empty() {
            return Err(CustomError::ValidationError("Missing text".to_string()));
        }

        let mut document: PostsDocument = self.store.load(Collection::Posts)?;
        let post = document
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;

        let comment = add_comment(post, text, author_id, parent_id)?;
        self.store.save(Collection::Posts, &document)?;

        log::info!(
            "comment {} added to post {} by user {}",
            comment.id,
            post_id,
            author_id
        );
        Ok(comment)
    }
}
