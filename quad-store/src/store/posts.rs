//! Post feed operations: creation, paging, editing, soft deletion, poll votes.

use chrono::Utc;
use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::{
    errors::StoreError,
    models::{NewPost, Poll, Post, extract_hashtags, validate_content},
    scripts::{POLL_VOTE_SCRIPT, run_script},
    store::Store,
};

/// A post joined with the author's current verification flag.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub is_verified: bool,
}

#[derive(Debug, Serialize)]
struct PollVoteCommand {
    post_key: String,
    post_id: String,
    voter: String,
    option_index: usize,
    now_ms: i64,
}

impl Store {
    /// Creates a post for the named author. Hashtags become tags, counters
    /// start at zero, and the post lands in both the global feed index and
    /// the author's scoped index.
    pub async fn create_post(&self, conn: &mut ConnectionManager, submission: NewPost) -> Result<Post, StoreError> {
        submission.validate()?;
        let author = self.fetch_user_by_username(conn, &submission.username).await?;
        let avatar_url = (!author.avatar_url.is_empty()).then(|| author.avatar_url.clone());
        let post = Post::from_submission(submission, author.id.clone(), avatar_url, Utc::now());

        let author_index = self.posts().scoped_index_key(&author.id);
        self.posts().create(conn, &post, &[], &[author_index]).await?;
        Ok(post)
    }

    /// Newest-first feed page. Soft-deleted posts are filtered after paging,
    /// so a page may come back shorter than `limit`.
    pub async fn list_feed(
        &self,
        conn: &mut ConnectionManager,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<PostView>, StoreError> {
        let posts = self.posts();
        let index = posts.created_index_key();
        let page = posts.list_page(conn, &index, offset, limit, true).await?;
        self.join_verification(conn, page).await
    }

    pub async fn get_post(&self, conn: &mut ConnectionManager, post_id: &str) -> Result<Post, StoreError> {
        let post = self.posts().fetch(conn, post_id).await?;
        if post.is_deleted {
            return Err(StoreError::not_found(post_id));
        }
        Ok(post)
    }

    /// Edits post content; tags are re-derived from the new content.
    /// Ownership is the caller's concern.
    pub async fn update_post_content(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        content: String,
    ) -> Result<Post, StoreError> {
        validate_content(&content)?;
        let posts = self.posts();
        let mut post = posts.fetch(conn, post_id).await?;
        if post.is_deleted {
            return Err(StoreError::not_found(post_id));
        }
        post.tags = extract_hashtags(&content);
        post.content = content;
        // In-place field writes; a whole-document save could undo counter
        // increments committed by an engagement script in the meantime.
        posts.set_path(conn, post_id, "$.content", &post.content).await?;
        posts.set_path(conn, post_id, "$.tags", &post.tags).await?;
        Ok(post)
    }

    /// Tombstones a post. The document and its engagement records stay in
    /// place; feeds stop showing it.
    pub async fn soft_delete_post(&self, conn: &mut ConnectionManager, post_id: &str) -> Result<(), StoreError> {
        let posts = self.posts();
        posts.fetch(conn, post_id).await?;
        posts.set_path(conn, post_id, "$.is_deleted", &true).await
    }

    /// Removes a post document and its index entries entirely. Admin path.
    pub async fn hard_delete_post(&self, conn: &mut ConnectionManager, post_id: &str) -> Result<bool, StoreError> {
        let posts = self.posts();
        let author_index = match posts.get(conn, post_id).await? {
            Some(post) => vec![posts.scoped_index_key(&post.author_id)],
            None => Vec::new(),
        };
        posts.delete(conn, post_id, &[], &author_index).await
    }

    /// The named user's posts, newest first, soft-deleted ones excluded.
    pub async fn posts_by_user(
        &self,
        conn: &mut ConnectionManager,
        user_id: &str,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts();
        let index = posts.scoped_index_key(user_id);
        let page = posts.list_page(conn, &index, offset, limit, true).await?;
        Ok(page.into_iter().filter(|post| !post.is_deleted).collect())
    }

    /// Records one poll vote. The script enforces one vote per user across
    /// all options and rejects closed polls, then returns the updated poll.
    pub async fn vote_poll(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        voter_username: &str,
        option_index: usize,
    ) -> Result<Poll, StoreError> {
        let command = PollVoteCommand {
            post_key: self.posts().entity_key(post_id),
            post_id: post_id.to_string(),
            voter: voter_username.to_string(),
            option_index,
            now_ms: Utc::now().timestamp_millis(),
        };
        run_script(conn, &POLL_VOTE_SCRIPT, &command).await?;

        let post = self.posts().fetch(conn, post_id).await?;
        post.poll.ok_or_else(|| StoreError::invalid("post has no poll"))
    }

    async fn join_verification(
        &self,
        conn: &mut ConnectionManager,
        page: Vec<Post>,
    ) -> Result<Vec<PostView>, StoreError> {
        let users = self.users();
        let mut views = Vec::with_capacity(page.len());
        for post in page {
            if post.is_deleted {
                continue;
            }
            let is_verified = users
                .get(conn, &post.author_id)
                .await?
                .map(|user| user.is_verified)
                .unwrap_or(false);
            views.push(PostView { post, is_verified });
        }
        Ok(views)
    }
}
