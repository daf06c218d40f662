//! Comments on posts. The parent post comes from the path, the author from
//! the requester; neither is ever read from client input.

use std::sync::Arc;

use domains::validation::required_text;
use domains::{
    CommentId, CommentRepository, CommentView, DomainError, NewComment, Page, PostId,
    PostRepository, Requester, Result,
};
use tracing::{info, instrument};

use crate::pagination::{PageRequest, Paginator, PAGE_SIZE};
use crate::policy::{ensure_may_mutate, require_authenticated};
use crate::Repositories;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(repos: &Repositories) -> Self {
        Self { comments: repos.comments.clone(), posts: repos.posts.clone() }
    }

    async fn ensure_post(&self, post_id: PostId) -> Result<()> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("post", post_id)),
        }
    }

    pub async fn list(&self, post_id: PostId, request: PageRequest) -> Result<Page<CommentView>> {
        self.ensure_post(post_id).await?;
        let paginator = Paginator::new(self.comments.count_for_post(post_id).await?, PAGE_SIZE);
        let number = paginator.clamp(request);
        let items = self
            .comments
            .list_for_post(post_id, paginator.limit(), paginator.offset(number))
            .await?;
        Ok(paginator.page(number, items))
    }

    /// Every comment of a post, newest first, for the post page.
    pub async fn all_for_post(&self, post_id: PostId) -> Result<Vec<CommentView>> {
        let count = self.comments.count_for_post(post_id).await?;
        self.comments.list_for_post(post_id, count, 0).await
    }

    /// The comment, provided it belongs to `post_id`.
    pub async fn get(&self, post_id: PostId, id: CommentId) -> Result<CommentView> {
        match self.comments.find_by_id(id).await? {
            Some(view) if view.comment.post_id == post_id => Ok(view),
            _ => Err(DomainError::not_found("comment", id)),
        }
    }

    #[instrument(skip(self, requester, text))]
    pub async fn create(&self, requester: &Requester, post_id: PostId, text: String) -> Result<CommentView> {
        let author = require_authenticated(requester, "comment")?;
        let text = required_text("text", text)?;
        self.ensure_post(post_id).await?;

        let comment = self
            .comments
            .create(NewComment { post_id, author_id: author.id, text })
            .await?;
        info!(comment_id = comment.id, post_id, "comment created");
        Ok(CommentView { comment, author: author.username.clone() })
    }

    #[instrument(skip(self, requester, text))]
    pub async fn update(
        &self,
        requester: &Requester,
        post_id: PostId,
        id: CommentId,
        text: String,
    ) -> Result<CommentView> {
        let current = self.get(post_id, id).await?;
        ensure_may_mutate(requester, &current, "comment")?;
        let text = required_text("text", text)?;
        let comment = self.comments.update_text(id, text).await?;
        Ok(CommentView { comment, author: current.author })
    }

    #[instrument(skip(self, requester))]
    pub async fn delete(&self, requester: &Requester, post_id: PostId, id: CommentId) -> Result<()> {
        let current = self.get(post_id, id).await?;
        ensure_may_mutate(requester, &current, "comment")?;
        self.comments.delete(id).await?;
        info!(comment_id = id, post_id, "comment deleted");
        Ok(())
    }
}
