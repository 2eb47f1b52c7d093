use super::support::*;

#[tokio::test]
async fn registers_and_resolves_users() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let created = store
        .create_user(&mut conn, registration("night_owl"))
        .await
        .expect("create user");
    assert_eq!(created.followers_count, 0);
    assert_eq!(created.temp_id.len(), 8);

    let resolved = store
        .fetch_user_by_username(&mut conn, "night_owl")
        .await
        .expect("resolve by username");
    assert_eq!(resolved.id, created.id);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn usernames_are_unique_case_insensitively() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("Quad_Fan"))
        .await
        .expect("first registration");

    let err = store
        .create_user(&mut conn, registration("quad_fan"))
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, StoreError::UniqueConstraintViolation { field, .. } if field == "username"));

    // Lookups normalize case the same way.
    let found = store
        .find_user_by_username(&mut conn, "QUAD_FAN")
        .await
        .expect("lookup");
    assert!(found.is_some());

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn username_check_offers_available_suggestions() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let fresh = store.check_username(&mut conn, "untaken_name").await.expect("check");
    assert!(fresh.available);
    assert!(fresh.suggestions.is_empty());

    store
        .create_user(&mut conn, registration("taken_name"))
        .await
        .expect("register");
    let taken = store.check_username(&mut conn, "taken_name").await.expect("check");
    assert!(!taken.available);
    assert!(!taken.suggestions.is_empty());
    for suggestion in &taken.suggestions {
        let id = store
            .users()
            .find_id_by_unique(&mut conn, "username", suggestion)
            .await
            .expect("probe suggestion");
        assert!(id.is_none(), "suggestion {suggestion} is already taken");
    }

    let invalid = store.check_username(&mut conn, "x").await;
    assert!(matches!(invalid, Err(StoreError::Validation(_))));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn search_matches_username_and_college() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let state = college("c1", "State University", "Springfield");
    store
        .create_user(&mut conn, registration_at("spring_bird", state.clone()))
        .await
        .expect("register spring_bird");
    store
        .create_user(&mut conn, registration("winter_fox"))
        .await
        .expect("register winter_fox");

    let by_username = store.search_users(&mut conn, "spring", 10).await.expect("search");
    assert_eq!(by_username.len(), 1);
    assert_eq!(by_username[0].username, "spring_bird");

    let by_college = store.search_users(&mut conn, "springfield", 10).await.expect("search");
    assert_eq!(by_college.len(), 1);
    assert_eq!(by_college[0].username, "spring_bird");

    let too_short = store.search_users(&mut conn, "s", 10).await.expect("search");
    assert!(too_short.is_empty());

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn follow_suggestions_prefer_same_college() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let home = college("c1", "State University", "Springfield");
    let away = college("c2", "Tech Institute", "Shelbyville");
    store
        .create_user(&mut conn, registration_at("me_here", home.clone()))
        .await
        .expect("register requester");
    store
        .create_user(&mut conn, registration_at("classmate", home))
        .await
        .expect("register classmate");
    store
        .create_user(&mut conn, registration_at("stranger", away))
        .await
        .expect("register stranger");

    let suggestions = store
        .follow_suggestions(&mut conn, "me_here", 10)
        .await
        .expect("suggestions");
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].username, "classmate");
    assert_eq!(suggestions[0].is_same_college, Some(true));
    assert!(suggestions.iter().all(|s| s.username != "me_here"));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn profile_joins_recent_posts() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("author_one"))
        .await
        .expect("register");
    store
        .create_post(&mut conn, post_submission("author_one", "first #hello"))
        .await
        .expect("post");

    let profile = store.user_profile(&mut conn, "author_one", 10).await.expect("profile");
    assert_eq!(profile.user.username, "author_one");
    assert_eq!(profile.posts.len(), 1);
    assert_eq!(profile.posts[0].tags, vec!["hello"]);

    ns.cleanup(&mut conn).await;
}
