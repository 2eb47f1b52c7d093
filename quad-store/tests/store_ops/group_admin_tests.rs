use super::support::*;
use quad_store::models::Role;
use quad_store::store::admin::AdminUserUpdate;

#[tokio::test]
async fn membership_has_set_semantics() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("group_owner"))
        .await
        .expect("register owner");
    store
        .create_user(&mut conn, registration("group_joiner"))
        .await
        .expect("register joiner");

    let group = store
        .create_group(&mut conn, group_submission("Night Owls", "group_owner"))
        .await
        .expect("create group");
    assert_eq!(group.member_count(), 1);

    let count = store.join_group(&mut conn, &group.id, "group_joiner").await.expect("join");
    assert_eq!(count, 2);

    // Joining twice does not duplicate the membership.
    let count = store.join_group(&mut conn, &group.id, "group_joiner").await.expect("rejoin");
    assert_eq!(count, 2);

    let count = store.leave_group(&mut conn, &group.id, "group_joiner").await.expect("leave");
    assert_eq!(count, 1);

    // Leaving when not a member is a no-op.
    let count = store.leave_group(&mut conn, &group.id, "group_joiner").await.expect("leave again");
    assert_eq!(count, 1);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn group_names_are_unique() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("group_owner"))
        .await
        .expect("register");
    store
        .create_group(&mut conn, group_submission("Chess Club", "group_owner"))
        .await
        .expect("create group");

    let err = store
        .create_group(&mut conn, group_submission("chess club", "group_owner"))
        .await;
    assert!(matches!(err, Err(StoreError::UniqueConstraintViolation { .. })));

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn overview_separates_memberships_from_suggestions() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let home = college("c1", "State University", "Springfield");
    store
        .create_user(&mut conn, registration_at("overview_user", home))
        .await
        .expect("register");
    store
        .create_user(&mut conn, registration("other_owner"))
        .await
        .expect("register other");

    let mine = store
        .create_group(&mut conn, group_submission("My Circle", "overview_user"))
        .await
        .expect("own group");
    store
        .create_group(&mut conn, group_submission("Open Circle", "other_owner"))
        .await
        .expect("other group");

    let overview = store.groups_overview(&mut conn, "overview_user").await.expect("overview");
    assert_eq!(overview.my_groups.len(), 1);
    assert_eq!(overview.my_groups[0].group.id, mine.id);
    assert!(overview.my_groups[0].is_joined);
    assert_eq!(overview.suggested_groups.len(), 1);
    assert!(!overview.suggested_groups[0].is_joined);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn verification_stamps_and_clears() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("badge_user"))
        .await
        .expect("register");

    let verified = store
        .set_verification(&mut conn, "badge_user", true, "root_admin")
        .await
        .expect("verify");
    assert!(verified.is_verified);
    assert!(verified.verified_at.is_some());
    assert_eq!(verified.verified_by.as_deref(), Some("root_admin"));

    let cleared = store
        .set_verification(&mut conn, "badge_user", false, "root_admin")
        .await
        .expect("unverify");
    assert!(!cleared.is_verified);
    assert!(cleared.verified_at.is_none());
    assert!(cleared.verified_by.is_none());

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn admin_updates_role_and_karma() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("promoted_user"))
        .await
        .expect("register");

    let updated = store
        .update_user(
            &mut conn,
            "promoted_user",
            AdminUserUpdate {
                role: Some(Role::Admin),
                karma_points: Some(42),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.karma_points, 42);

    // Absent fields stay untouched.
    let unchanged = store
        .update_user(&mut conn, "promoted_user", AdminUserUpdate::default())
        .await
        .expect("noop update");
    assert_eq!(unchanged.role, Role::Admin);
    assert_eq!(unchanged.karma_points, 42);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn stats_count_documents_and_recent_activity() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    store
        .create_user(&mut conn, registration("stat_user"))
        .await
        .expect("register");
    store
        .create_post(&mut conn, post_submission("stat_user", "counted"))
        .await
        .expect("post");

    let stats = store.stats(&mut conn).await.expect("stats");
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.total_posts, 1);
    assert_eq!(stats.total_groups, 0);
    assert_eq!(stats.active_users, 1);

    ns.cleanup(&mut conn).await;
}

#[tokio::test]
async fn categories_round_trip_with_unique_names() {
    let Some(mut conn) = connect().await else { return };
    let ns = TestNamespace::unique();
    let store = ns.store();

    let category = store
        .create_category(
            &mut conn,
            quad_store::models::NewCategory {
                name: "Confessions".into(),
                icon: "mask".into(),
                description: "anonymous confessions".into(),
            },
        )
        .await
        .expect("create category");

    let duplicate = store
        .create_category(
            &mut conn,
            quad_store::models::NewCategory {
                name: "confessions".into(),
                icon: "mask".into(),
                description: "dup".into(),
            },
        )
        .await;
    assert!(matches!(duplicate, Err(StoreError::UniqueConstraintViolation { .. })));

    let listed = store.list_categories(&mut conn).await.expect("list");
    assert_eq!(listed.len(), 1);

    assert!(store.delete_category(&mut conn, &category.id).await.expect("delete"));
    assert!(store.list_categories(&mut conn).await.expect("list").is_empty());

    ns.cleanup(&mut conn).await;
}
