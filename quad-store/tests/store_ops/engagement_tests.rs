use super::support::*;
use quad_store::store::engagement::{FollowAction, LikeAction};

#[tokio::test]
async fn like_toggle_keeps_counter_in_step_with_ledger() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("like_author"))
        .await
        .expect("register author");
    store
        .create_user(&mut conn, registration("like_actor"))
        .await
        .expect("register actor");
    let post = store
        .create_post(&mut conn, post_submission("like_author", "like me"))
        .await
        .expect("post");

    let liked = store.toggle_like(&mut conn, &post.id, "like_actor").await.expect("like");
    assert_eq!(liked.action, LikeAction::Liked);
    assert_eq!(liked.likes_count, 1);
    assert!(store.has_liked(&mut conn, &post.id, "like_actor").await.expect("probe"));

    // Toggle back off: ledger record gone, counter back to zero.
    let unliked = store.toggle_like(&mut conn, &post.id, "like_actor").await.expect("unlike");
    assert_eq!(unliked.action, LikeAction::Unliked);
    assert_eq!(unliked.likes_count, 0);
    assert!(!store.has_liked(&mut conn, &post.id, "like_actor").await.expect("probe"));

    let fetched = store.get_post(&mut conn, &post.id).await.expect("post");
    assert_eq!(fetched.likes_count, 0);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn explicit_unlike_requires_existing_like() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("never_liked"))
        .await
        .expect("register");
    let post = store
        .create_post(&mut conn, post_submission("never_liked", "unloved"))
        .await
        .expect("post");

    let err = store.unlike(&mut conn, &post.id, "never_liked").await;
    assert!(matches!(err, Err(StoreError::NotFound { .. })));

    let missing_post = store.toggle_like(&mut conn, "no_such_post", "never_liked").await;
    assert!(matches!(missing_post, Err(StoreError::NotFound { .. })));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn follow_toggle_adjusts_both_counters() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("follower_a"))
        .await
        .expect("register follower");
    store
        .create_user(&mut conn, registration("target_b"))
        .await
        .expect("register target");

    let followed = store
        .toggle_follow(&mut conn, "follower_a", "target_b")
        .await
        .expect("follow");
    assert_eq!(followed.action, FollowAction::Follow);
    assert_eq!(followed.following_count, 1);
    assert_eq!(followed.followers_count, 1);

    let status = store
        .follow_status(&mut conn, "follower_a", "target_b")
        .await
        .expect("status");
    assert!(status.is_following);
    assert_eq!(status.followers_count, 1);

    let unfollowed = store
        .toggle_follow(&mut conn, "follower_a", "target_b")
        .await
        .expect("unfollow");
    assert_eq!(unfollowed.action, FollowAction::Unfollow);
    assert_eq!(unfollowed.following_count, 0);
    assert_eq!(unfollowed.followers_count, 0);

    // Counters floor at zero; an unfollow never drives them negative.
    let follower = store.fetch_user_by_username(&mut conn, "follower_a").await.expect("user");
    assert_eq!(follower.following_count, 0);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn profile_writes_never_revert_script_counters() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("busy_follower"))
        .await
        .expect("register follower");
    let target = store
        .create_user(&mut conn, registration("busy_target"))
        .await
        .expect("register target");

    store
        .toggle_follow(&mut conn, "busy_follower", "busy_target")
        .await
        .expect("follow");

    // Every document write that can land next to a counter script must be
    // field-scoped; none of these may undo the increment above.
    store
        .touch_last_active(&mut conn, &target.id)
        .await
        .expect("touch");
    store
        .set_verification(&mut conn, "busy_target", true, "root_admin")
        .await
        .expect("verify");
    store
        .update_user(
            &mut conn,
            "busy_target",
            quad_store::store::admin::AdminUserUpdate {
                role: None,
                karma_points: Some(7),
            },
        )
        .await
        .expect("update");

    let refreshed = store
        .fetch_user_by_username(&mut conn, "busy_target")
        .await
        .expect("fetch");
    assert_eq!(refreshed.followers_count, 1);
    assert!(refreshed.is_verified);
    assert_eq!(refreshed.karma_points, 7);
    assert!(refreshed.last_active >= target.last_active);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn concurrent_profile_touches_leave_follow_counters_consistent() {
    let Some(conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let mut setup_conn = conn.clone();
    store
        .create_user(&mut setup_conn, registration("churn_follower"))
        .await
        .expect("register follower");
    let target = store
        .create_user(&mut setup_conn, registration("churn_target"))
        .await
        .expect("register target");

    // An even number of toggles lands back at the unfollowed state; the
    // interleaved activity touches must not disturb either counter.
    let toggles = async {
        let mut conn = conn.clone();
        for _ in 0..10 {
            store
                .toggle_follow(&mut conn, "churn_follower", "churn_target")
                .await
                .expect("toggle");
        }
    };
    let touches = async {
        let mut conn = conn.clone();
        for _ in 0..10 {
            store.touch_last_active(&mut conn, &target.id).await.expect("touch");
        }
    };
    tokio::join!(toggles, touches);

    let mut conn = conn.clone();
    let target = store
        .fetch_user_by_username(&mut conn, "churn_target")
        .await
        .expect("fetch target");
    let follower = store
        .fetch_user_by_username(&mut conn, "churn_follower")
        .await
        .expect("fetch follower");
    assert_eq!(target.followers_count, 0);
    assert_eq!(follower.following_count, 0);
    let status = store
        .follow_status(&mut conn, "churn_follower", "churn_target")
        .await
        .expect("status");
    assert!(!status.is_following);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("lone_user"))
        .await
        .expect("register");
    let err = store.toggle_follow(&mut conn, "lone_user", "Lone_User").await;
    assert!(matches!(err, Err(StoreError::Validation(_))));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn comments_and_replies_bump_parent_counters() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("thread_author"))
        .await
        .expect("register");
    let post = store
        .create_post(&mut conn, post_submission("thread_author", "discuss"))
        .await
        .expect("post");

    let comment = store
        .create_comment(&mut conn, &post.id, comment_submission("thread_author", "first!"))
        .await
        .expect("comment");
    assert_eq!(comment.replies_count, 0);

    let fetched = store.get_post(&mut conn, &post.id).await.expect("post");
    assert_eq!(fetched.comments_count, 1);

    store
        .create_reply(&mut conn, &comment.id, reply_submission("thread_author", "second!"))
        .await
        .expect("reply");
    let comments = store.list_comments(&mut conn, &post.id, 0, 10).await.expect("comments");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].replies_count, 1);

    let replies = store.list_replies(&mut conn, &comment.id, 0, 10).await.expect("replies");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "second!");

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn tombstoned_comments_leave_counters_alone() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("mod_author"))
        .await
        .expect("register");
    let post = store
        .create_post(&mut conn, post_submission("mod_author", "moderated"))
        .await
        .expect("post");
    let comment = store
        .create_comment(&mut conn, &post.id, comment_submission("mod_author", "removed later"))
        .await
        .expect("comment");

    store.soft_delete_comment(&mut conn, &comment.id).await.expect("tombstone");

    let comments = store.list_comments(&mut conn, &post.id, 0, 10).await.expect("comments");
    assert!(comments.is_empty());

    // The parent's count is not decremented on soft delete.
    let fetched = store.get_post(&mut conn, &post.id).await.expect("post");
    assert_eq!(fetched.comments_count, 1);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn comment_on_missing_post_fails() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("orphan_author"))
        .await
        .expect("register");
    let err = store
        .create_comment(&mut conn, "no_such_post", comment_submission("orphan_author", "hello?"))
        .await;
    assert!(matches!(err, Err(StoreError::NotFound { .. })));

    ns.cleanup(&mut conn).await;
}
