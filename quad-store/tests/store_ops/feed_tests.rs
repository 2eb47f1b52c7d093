use super::support::*;

#[tokio::test]
async fn feed_pages_newest_first_and_hides_tombstones() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("feed_author"))
        .await
        .expect("register");
    let first = store
        .create_post(&mut conn, post_submission("feed_author", "first"))
        .await
        .expect("post one");
    let second = store
        .create_post(&mut conn, post_submission("feed_author", "second"))
        .await
        .expect("post two");

    let feed = store.list_feed(&mut conn, 0, 10).await.expect("feed");
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].post.id, second.id);
    assert_eq!(feed[1].post.id, first.id);

    store.soft_delete_post(&mut conn, &first.id).await.expect("tombstone");
    let feed = store.list_feed(&mut conn, 0, 10).await.expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post.id, second.id);

    // The tombstoned post also disappears from direct reads.
    let gone = store.get_post(&mut conn, &first.id).await;
    assert!(matches!(gone, Err(StoreError::NotFound { .. })));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn editing_rederives_hashtags() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("edit_author"))
        .await
        .expect("register");
    let post = store
        .create_post(&mut conn, post_submission("edit_author", "study at #library"))
        .await
        .expect("post");
    assert_eq!(post.tags, vec!["library"]);

    let edited = store
        .update_post_content(&mut conn, &post.id, "moved to the #cafe instead".to_string())
        .await
        .expect("edit");
    assert_eq!(edited.tags, vec!["cafe"]);

    let rejected = store.update_post_content(&mut conn, &post.id, "  ".to_string()).await;
    assert!(matches!(rejected, Err(StoreError::Validation(_))));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn poll_votes_are_exclusive_per_user() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("poll_author"))
        .await
        .expect("register author");
    store
        .create_user(&mut conn, registration("poll_voter"))
        .await
        .expect("register voter");

    let mut submission = post_submission("poll_author", "pick one");
    submission.poll = Some(poll(&["coffee", "tea"], Duration::days(1)));
    let post = store.create_post(&mut conn, submission).await.expect("post");

    let updated = store
        .vote_poll(&mut conn, &post.id, "poll_voter", 0)
        .await
        .expect("vote");
    assert_eq!(updated.options[0].votes, 1);
    assert_eq!(updated.options[0].voters, vec!["poll_voter"]);

    // Second vote by the same user fails, even on a different option.
    let again = store.vote_poll(&mut conn, &post.id, "poll_voter", 1).await;
    assert!(matches!(again, Err(StoreError::InvalidRequest { message }) if message == "already voted"));

    let out_of_range = store.vote_poll(&mut conn, &post.id, "poll_author", 5).await;
    assert!(matches!(out_of_range, Err(StoreError::InvalidRequest { message }) if message == "invalid poll option"));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn polls_cannot_be_created_already_closed() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("late_author"))
        .await
        .expect("register");
    let mut submission = post_submission("late_author", "too late");
    submission.poll = Some(poll(&["a", "b"], Duration::seconds(-60)));

    let created = store.create_post(&mut conn, submission).await;
    assert!(matches!(created, Err(StoreError::Validation(_))));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn closed_polls_reject_votes() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("late_voter"))
        .await
        .expect("register");
    let mut submission = post_submission("late_voter", "too late");
    submission.poll = Some(poll(&["a", "b"], Duration::days(1)));
    let post = store.create_post(&mut conn, submission).await.expect("post");

    // Expire the poll in place, then vote.
    let past_ms = (Utc::now() - Duration::minutes(1)).timestamp_millis();
    store
        .posts()
        .set_path(&mut conn, &post.id, "$.poll.ends_at", &past_ms)
        .await
        .expect("expire poll");

    let vote = store.vote_poll(&mut conn, &post.id, "late_voter", 0).await;
    assert!(matches!(vote, Err(StoreError::InvalidRequest { message }) if message == "poll has ended"));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn hard_delete_removes_post_from_indexes() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let author = store
        .create_user(&mut conn, registration("gone_author"))
        .await
        .expect("register");
    let post = store
        .create_post(&mut conn, post_submission("gone_author", "soon gone"))
        .await
        .expect("post");

    let deleted = store.hard_delete_post(&mut conn, &post.id).await.expect("delete");
    assert!(deleted);

    assert!(store.list_feed(&mut conn, 0, 10).await.expect("feed").is_empty());
    assert!(
        store
            .posts_by_user(&mut conn, &author.id, 0, 10)
            .await
            .expect("by user")
            .is_empty()
    );

    ns.cleanup(&mut conn).await;
}
