pub(crate) use chrono::{Duration, Utc};
pub(crate) use quad_store::{
    Store, StoreError,
    models::{AvatarType, College, NewComment, NewGroup, NewPoll, NewPollOption, NewPost, NewReply, NewUser, PersonalInfo},
    redis::aio::ConnectionManager,
};
pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};

use quad_store::id::generate_document_id;

static TEST_NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct TestNamespace {
    prefix: String,
}

impl TestNamespace {
    pub(crate) fn unique() -> Self {
        let idx = TEST_NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let salt = generate_document_id();
        Self {
            prefix: format!("quad_test_{idx}_{}", &salt[..8]),
        }
    }

    pub(crate) fn store(&self) -> Store {
        Store::new(self.prefix.clone())
    }

    pub(crate) async fn cleanup(&self, conn: &mut ConnectionManager) {
        let pattern = self.store().key_context().service_pattern();
        let _ = quad_store::cleanup_pattern(conn, &pattern).await;
    }
}

/// Connects to the test Redis, or returns `None` when the server (or its
/// JSON module) is unavailable so callers can skip.
pub(crate) async fn connect() -> Option<ConnectionManager> {
    let url = std::env::var("QUAD_TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let Ok(mut conn) = quad_store::connect(&url).await else {
        eprintln!("skipping: redis unavailable at {url}");
        return None;
    };

    // The store needs the JSON module; probe before running anything.
    let probe_key = format!("quad_test_probe_{}", generate_document_id());
    let probe: Result<(), _> = quad_store::redis::cmd("JSON.SET")
        .arg(&probe_key)
        .arg("$")
        .arg("{}")
        .query_async(&mut conn)
        .await;
    if probe.is_err() {
        eprintln!("skipping: redis JSON module unavailable at {url}");
        return None;
    }
    let _: Result<(), _> = quad_store::redis::cmd("DEL").arg(&probe_key).query_async(&mut conn).await;
    Some(conn)
}

pub(crate) fn registration(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        avatar_type: AvatarType::Generated,
        avatar_url: String::new(),
        college: None,
        personal_info: PersonalInfo::default(),
        interests: Vec::new(),
        recovery_email: format!("{username}@example.com"),
    }
}

pub(crate) fn registration_at(username: &str, college: College) -> NewUser {
    let mut user = registration(username);
    user.college = Some(college);
    user
}

pub(crate) fn college(id: &str, name: &str, location: &str) -> College {
    College {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        kind: "university".to_string(),
    }
}

pub(crate) fn post_submission(username: &str, content: &str) -> NewPost {
    NewPost {
        username: username.to_string(),
        content: content.to_string(),
        poll: None,
        media: None,
    }
}

pub(crate) fn poll(options: &[&str], ends_in: Duration) -> NewPoll {
    NewPoll {
        options: options
            .iter()
            .map(|text| NewPollOption {
                text: (*text).to_string(),
            })
            .collect(),
        ends_at: Utc::now() + ends_in,
    }
}

pub(crate) fn comment_submission(username: &str, content: &str) -> NewComment {
    NewComment {
        username: username.to_string(),
        content: content.to_string(),
    }
}

pub(crate) fn reply_submission(username: &str, content: &str) -> NewReply {
    NewReply {
        username: username.to_string(),
        content: content.to_string(),
    }
}

pub(crate) fn group_submission(name: &str, username: &str) -> NewGroup {
    NewGroup {
        name: name.to_string(),
        description: format!("{name} description"),
        username: username.to_string(),
    }
}
