//! # PgStore
//!
//! Postgres implementation of the repository ports. The schema lives in
//! `migrations/` and keeps the referential rules in the database itself:
//! `ON DELETE CASCADE` from users and posts, `ON DELETE SET NULL` from
//! groups, and a unique, non-reflexive follow pair.

mod rows;

use async_trait::async_trait;
use domains::{
    Comment, CommentId, CommentRepository, CommentView, DomainError, FeedScope, FollowRepository,
    FollowView, Group, GroupId, GroupRepository, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, PostFilter, PostId, PostRepository, PostView, Result, User, UserId,
    UserRepository,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use rows::{CommentRow, CommentViewRow, FollowViewRow, GroupRow, PostRow, PostViewRow, UserRow};

pub struct PgStore {
    pool: PgPool,
}

/// Infrastructure failures surface as `Internal`; the detail is logged by the caller.
fn internal(err: sqlx::Error) -> DomainError {
    DomainError::Internal(format!("database error: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Splits a scope into the three nullable filter parameters the feed query takes.
fn scope_params(scope: FeedScope) -> (Option<GroupId>, Option<UserId>, Option<UserId>) {
    match scope {
        FeedScope::All => (None, None, None),
        FeedScope::Group(id) => (Some(id), None, None),
        FeedScope::Author(id) => (None, Some(id), None),
        FeedScope::FollowedBy(id) => (None, None, Some(id)),
    }
}

const POST_VIEW_SELECT: &str = "
    SELECT
        p.id, p.text, p.pub_date, p.author_id, p.group_id, p.image,
        u.username AS author_username,
        g.slug AS group_slug,
        g.title AS group_title,
        (SELECT COUNT(*) FROM posts_comment c WHERE c.post_id = p.id) AS comments_count
    FROM posts_post p
    JOIN auth_user u ON u.id = p.author_id
    LEFT JOIN posts_group g ON g.id = p.group_id
";

const FEED_WHERE: &str = "
    WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
      AND ($2::BIGINT IS NULL OR p.author_id = $2)
      AND ($3::BIGINT IS NULL OR p.author_id IN (SELECT f.author_id FROM posts_follow f WHERE f.user_id = $3))
      AND ($4::TEXT IS NULL OR p.text ILIKE $4)
      AND ($5::TIMESTAMPTZ IS NULL OR p.pub_date >= $5)
      AND ($6::TIMESTAMPTZ IS NULL OR p.pub_date <= $6)
";

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, is_staff, date_joined FROM auth_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, is_staff, date_joined FROM auth_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "
            INSERT INTO auth_user (username, password, is_staff)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, is_staff, date_joined
            ",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DomainError::Conflict(format!("username '{}' is taken", user.username))
            } else {
                internal(err)
            }
        })?;
        Ok(row.into())
    }

    /// Posts, comments and follow edges go with the row via `ON DELETE CASCADE`.
    async fn delete(&self, id: UserId) -> Result<()> {
        sqlx::query("DELETE FROM auth_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for PgStore {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, group: NewGroup) -> Result<Group> {
        let row = sqlx::query_as::<_, GroupRow>(
            "
            INSERT INTO posts_group (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            ",
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DomainError::Conflict(format!("group with slug '{}' already exists", group.slug))
            } else {
                internal(err)
            }
        })?;
        Ok(row.into())
    }

    /// Posts keep existing with `group_id = NULL` via `ON DELETE SET NULL`.
    async fn delete(&self, id: GroupId) -> Result<()> {
        sqlx::query("DELETE FROM posts_group WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostView>> {
        let sql = format!("{POST_VIEW_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            "
            INSERT INTO posts_post (text, author_id, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, pub_date, author_id, group_id, image
            ",
        )
        .bind(&post.text)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.into())
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            "
            UPDATE posts_post
            SET text = $2, group_id = $3, image = $4
            WHERE id = $1
            RETURNING id, text, pub_date, author_id, group_id, image
            ",
        )
        .bind(id)
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.map(Into::into).ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn delete(&self, id: PostId) -> Result<()> {
        sqlx::query("DELETE FROM posts_post WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn count(&self, scope: FeedScope, filter: &PostFilter) -> Result<u64> {
        let (group_id, author_id, follower_id) = scope_params(scope);
        let sql = format!("SELECT COUNT(*) FROM posts_post p {FEED_WHERE}");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(group_id)
            .bind(author_id)
            .bind(follower_id)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.published_after)
            .bind(filter.published_before)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        Ok(count.max(0) as u64)
    }

    async fn list(&self, scope: FeedScope, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<PostView>> {
        let (group_id, author_id, follower_id) = scope_params(scope);
        let sql = format!(
            "{POST_VIEW_SELECT} {FEED_WHERE} ORDER BY p.pub_date DESC, p.id DESC LIMIT $7 OFFSET $8"
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(group_id)
            .bind(author_id)
            .bind(follower_id)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.published_after)
            .bind(filter.published_before)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentView>> {
        let row = sqlx::query_as::<_, CommentViewRow>(
            "
            SELECT c.id, c.post_id, c.author_id, c.text, c.created, u.username AS author_username
            FROM posts_comment c
            JOIN auth_user u ON u.id = c.author_id
            WHERE c.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            "
            INSERT INTO posts_comment (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created
            ",
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.into())
    }

    async fn update_text(&self, id: CommentId, text: String) -> Result<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            "
            UPDATE posts_comment SET text = $2 WHERE id = $1
            RETURNING id, post_id, author_id, text, created
            ",
        )
        .bind(id)
        .bind(&text)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.map(Into::into).ok_or_else(|| DomainError::not_found("comment", id))
    }

    async fn delete(&self, id: CommentId) -> Result<()> {
        sqlx::query("DELETE FROM posts_comment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn count_for_post(&self, post_id: PostId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts_comment WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        Ok(count.max(0) as u64)
    }

    async fn list_for_post(&self, post_id: PostId, limit: u64, offset: u64) -> Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            "
            SELECT c.id, c.post_id, c.author_id, c.text, c.created, u.username AS author_username
            FROM posts_comment c
            JOIN auth_user u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created DESC, c.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(post_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FollowRepository for PgStore {
    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts_follow WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)
    }

    /// `ON CONFLICT DO NOTHING` turns a concurrent duplicate into `false`.
    async fn insert(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            "
            INSERT INTO posts_follow (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT posts_follow_unique_pair DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts_follow WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: UserId, author_search: Option<String>) -> Result<Vec<FollowView>> {
        let rows = sqlx::query_as::<_, FollowViewRow>(
            "
            SELECT follower.username AS user_username, author.username AS author_username
            FROM posts_follow f
            JOIN auth_user follower ON follower.id = f.user_id
            JOIN auth_user author ON author.id = f.author_id
            WHERE f.user_id = $1
              AND ($2::TEXT IS NULL OR author.username ILIKE $2)
            ORDER BY author.username
            ",
        )
        .bind(user_id)
        .bind(author_search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_followers(&self, author_id: UserId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts_follow WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        Ok(count.max(0) as u64)
    }

    async fn count_following(&self, user_id: UserId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts_follow WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cats"), "%cats%");
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
    }

    #[test]
    fn scope_maps_to_exactly_one_parameter() {
        assert_eq!(scope_params(FeedScope::All), (None, None, None));
        assert_eq!(scope_params(FeedScope::Group(4)), (Some(4), None, None));
        assert_eq!(scope_params(FeedScope::Author(5)), (None, Some(5), None));
        assert_eq!(scope_params(FeedScope::FollowedBy(6)), (None, None, Some(6)));
    }
}
