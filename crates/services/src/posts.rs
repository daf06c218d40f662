//! Post creation, editing and deletion behind the Access Policy.

use std::sync::Arc;

use domains::validation::{image_path, required_text};
use domains::{
    DomainError, GroupId, GroupRepository, NewPost, Post, PostChanges, PostId, PostRepository,
    PostView, Requester, Result,
};
use tracing::{info, instrument};

use crate::policy::{ensure_may_mutate, require_authenticated};
use crate::Repositories;

/// Client input for a new post. There is no author field: the author is
/// always the requester.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

/// An edit request. `None` fields keep their stored value (PATCH); a full
/// replacement (PUT) sets every field.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub text: Option<String>,
    pub group_id: Option<Option<GroupId>>,
    pub image: Option<Option<String>>,
}

impl PostUpdate {
    /// PUT semantics: every field is replaced, absent optionals are cleared.
    pub fn replace(draft: PostDraft) -> Self {
        Self {
            text: Some(draft.text),
            group_id: Some(draft.group_id),
            image: Some(draft.image),
        }
    }
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl PostService {
    pub fn new(repos: &Repositories) -> Self {
        Self { posts: repos.posts.clone(), groups: repos.groups.clone() }
    }

    fn check_image(image: Option<&str>) -> Result<()> {
        image.map_or(Ok(()), image_path)
    }

    async fn ensure_group_exists(&self, group_id: Option<GroupId>) -> Result<()> {
        if let Some(id) = group_id {
            if self.groups.find_by_id(id).await?.is_none() {
                return Err(DomainError::ValidationError(format!("group {id} does not exist")));
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: PostId) -> Result<PostView> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// A post addressed as `/{username}/{id}/`: the id must belong to that author.
    pub async fn get_scoped(&self, username: &str, id: PostId) -> Result<PostView> {
        match self.posts.find_by_id(id).await? {
            Some(view) if view.author == username => Ok(view),
            _ => Err(DomainError::not_found("post", format!("{username}/{id}"))),
        }
    }

    #[instrument(skip(self, requester, draft), fields(group_id = ?draft.group_id))]
    pub async fn create(&self, requester: &Requester, draft: PostDraft) -> Result<PostView> {
        let author = require_authenticated(requester, "create a post")?;
        let text = required_text("text", draft.text)?;
        Self::check_image(draft.image.as_deref())?;
        self.ensure_group_exists(draft.group_id).await?;

        let post = self
            .posts
            .create(NewPost { text, author_id: author.id, group_id: draft.group_id, image: draft.image })
            .await?;
        info!(post_id = post.id, author = %author.username, "post created");
        self.get(post.id).await
    }

    #[instrument(skip(self, requester, update))]
    pub async fn update(&self, requester: &Requester, id: PostId, update: PostUpdate) -> Result<PostView> {
        let current = self.get(id).await?;
        ensure_may_mutate(requester, &current, "post")?;

        let changes = PostChanges {
            text: match update.text {
                Some(text) => required_text("text", text)?,
                None => current.post.text,
            },
            group_id: update.group_id.unwrap_or(current.post.group_id),
            image: update.image.unwrap_or(current.post.image),
        };
        Self::check_image(changes.image.as_deref())?;
        self.ensure_group_exists(changes.group_id).await?;

        self.posts.update(id, changes).await?;
        info!(post_id = id, "post updated");
        self.get(id).await
    }

    #[instrument(skip(self, requester))]
    pub async fn delete(&self, requester: &Requester, id: PostId) -> Result<Post> {
        let current = self.get(id).await?;
        ensure_may_mutate(requester, &current, "post")?;
        self.posts.delete(id).await?;
        info!(post_id = id, "post deleted");
        Ok(current.post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Identity, NewGroup, NewUser, UserRepository};
    use storage_adapters::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        posts: PostService,
        author: Requester,
        stranger: Requester,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let posts = PostService::new(&Repositories::from_store(store.clone()));
        let mut requesters = Vec::new();
        for name in ["author", "stranger"] {
            let user = UserRepository::create(
                store.as_ref(),
                NewUser { username: name.into(), password_hash: String::new(), is_staff: false },
            )
            .await
            .unwrap();
            requesters.push(Requester::User(Identity::from(&user)));
        }
        let stranger = requesters.pop().unwrap();
        let author = requesters.pop().unwrap();
        Fixture { store, posts, author, stranger }
    }

    fn draft(text: &str) -> PostDraft {
        PostDraft { text: text.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn author_is_always_the_requester() {
        let f = fixture().await;
        let view = f.posts.create(&f.author, draft("hello")).await.unwrap();
        assert_eq!(Some(view.post.author_id), f.author.user_id());
        assert_eq!(view.author, "author");
    }

    #[tokio::test]
    async fn anonymous_and_blank_posts_are_rejected() {
        let f = fixture().await;
        assert!(matches!(
            f.posts.create(&Requester::Anonymous, draft("hi")).await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            f.posts.create(&f.author, draft("  ")).await,
            Err(DomainError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn unknown_group_is_a_validation_error() {
        let f = fixture().await;
        let bad = PostDraft { text: "x".into(), group_id: Some(404), image: None };
        assert!(matches!(f.posts.create(&f.author, bad).await, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn oversized_or_absolute_images_are_validation_errors() {
        let f = fixture().await;
        let long = PostDraft { image: Some(format!("posts/{}", "a".repeat(101))), ..draft("x") };
        assert!(matches!(f.posts.create(&f.author, long).await, Err(DomainError::ValidationError(_))));

        let view = f.posts.create(&f.author, draft("pic")).await.unwrap();
        let update = PostUpdate { image: Some(Some("/etc/passwd".into())), ..Default::default() };
        let err = f.posts.update(&f.author, view.post.id, update).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(f.posts.get(view.post.id).await.unwrap().post.image, None);
    }

    #[tokio::test]
    async fn non_author_edit_is_forbidden_and_leaves_post_untouched() {
        let f = fixture().await;
        let view = f.posts.create(&f.author, draft("hello")).await.unwrap();
        let update = PostUpdate { text: Some("hacked".into()), ..Default::default() };

        let err = f.posts.update(&f.stranger, view.post.id, update).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(f.posts.get(view.post.id).await.unwrap().post.text, "hello");
    }

    #[tokio::test]
    async fn partial_update_keeps_author_date_and_other_fields() {
        let f = fixture().await;
        let group = GroupRepository::create(
            f.store.as_ref(),
            NewGroup { title: "Cats".into(), slug: "cats".into(), description: String::new() },
        )
        .await
        .unwrap();
        let original = f
            .posts
            .create(&f.author, PostDraft { text: "v1".into(), group_id: Some(group.id), image: None })
            .await
            .unwrap();

        let update = PostUpdate { text: Some("v2".into()), ..Default::default() };
        let edited = f.posts.update(&f.author, original.post.id, update).await.unwrap();
        assert_eq!(edited.post.text, "v2");
        assert_eq!(edited.post.group_id, Some(group.id));
        assert_eq!(edited.post.author_id, original.post.author_id);
        assert_eq!(edited.post.pub_date, original.post.pub_date);

        let replaced = f.posts.update(&f.author, original.post.id, PostUpdate::replace(draft("v3"))).await.unwrap();
        assert_eq!(replaced.post.group_id, None);
    }

    #[tokio::test]
    async fn only_author_may_delete() {
        let f = fixture().await;
        let view = f.posts.create(&f.author, draft("bye")).await.unwrap();
        assert!(matches!(
            f.posts.delete(&f.stranger, view.post.id).await,
            Err(DomainError::Forbidden(_))
        ));
        f.posts.delete(&f.author, view.post.id).await.unwrap();
        assert!(matches!(f.posts.get(view.post.id).await, Err(DomainError::NotFound("post", _))));
    }

    #[tokio::test]
    async fn scoped_lookup_checks_the_username() {
        let f = fixture().await;
        let view = f.posts.create(&f.author, draft("mine")).await.unwrap();
        assert!(f.posts.get_scoped("author", view.post.id).await.is_ok());
        assert!(f.posts.get_scoped("stranger", view.post.id).await.is_err());
    }
}
