//! Group membership and discovery.

use chrono::Utc;
use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::{
    errors::StoreError,
    models::{Group, NewGroup},
    scripts::{GROUP_MEMBER_SCRIPT, run_script},
    store::Store,
};

/// How many recent groups discovery considers before filtering.
const MAX_GROUP_SCAN: isize = 200;
const SUGGESTED_GROUPS_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: usize,
    pub is_joined: bool,
}

impl GroupView {
    fn new(group: Group, user_id: &str) -> Self {
        let member_count = group.member_count();
        let is_joined = group.members.iter().any(|member| member == user_id);
        Self {
            group,
            member_count,
            is_joined,
        }
    }
}

/// Discovery payload: groups the user belongs to plus suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct GroupsOverview {
    pub my_groups: Vec<GroupView>,
    pub suggested_groups: Vec<GroupView>,
}

#[derive(Debug, Serialize)]
struct GroupMemberCommand {
    group_key: String,
    group_id: String,
    user_id: String,
    op: &'static str,
}

impl Store {
    /// Creates a group; the creator's college is copied onto the group and
    /// the creator becomes the first member.
    pub async fn create_group(&self, conn: &mut ConnectionManager, submission: NewGroup) -> Result<Group, StoreError> {
        submission.validate()?;
        let creator = self.fetch_user_by_username(conn, &submission.username).await?;
        let group = submission.into_group(creator.id.clone(), creator.college.clone(), Utc::now());
        self.groups().create(conn, &group, &[("name", &group.name)], &[]).await?;
        Ok(group)
    }

    /// Adds the user to the group if absent. Returns the member count.
    pub async fn join_group(
        &self,
        conn: &mut ConnectionManager,
        group_id: &str,
        username: &str,
    ) -> Result<usize, StoreError> {
        self.mutate_membership(conn, group_id, username, "add").await
    }

    /// Removes the user from the group if present. Returns the member count.
    pub async fn leave_group(
        &self,
        conn: &mut ConnectionManager,
        group_id: &str,
        username: &str,
    ) -> Result<usize, StoreError> {
        self.mutate_membership(conn, group_id, username, "remove").await
    }

    async fn mutate_membership(
        &self,
        conn: &mut ConnectionManager,
        group_id: &str,
        username: &str,
        op: &'static str,
    ) -> Result<usize, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let command = GroupMemberCommand {
            group_key: self.groups().entity_key(group_id),
            group_id: group_id.to_string(),
            user_id: user.id,
            op,
        };
        let value = run_script(conn, &GROUP_MEMBER_SCRIPT, &command).await?;
        Ok(value
            .get("member_count")
            .and_then(|v| v.as_u64())
            .unwrap_or_default() as usize)
    }

    pub async fn get_group(&self, conn: &mut ConnectionManager, group_id: &str) -> Result<Group, StoreError> {
        self.groups().fetch(conn, group_id).await
    }

    /// Splits recent groups into the user's memberships and suggestions.
    /// Suggestions rank same-college groups first, then larger ones.
    pub async fn groups_overview(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
    ) -> Result<GroupsOverview, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let user_college = user.college.as_ref().map(|college| college.id.clone());

        let groups = self.groups();
        let index = groups.created_index_key();
        let recent = groups.list_page(conn, &index, 0, MAX_GROUP_SCAN, true).await?;

        let mut my_groups = Vec::new();
        let mut candidates: Vec<(Group, bool)> = Vec::new();
        for group in recent {
            if group.members.iter().any(|member| *member == user.id) {
                my_groups.push(GroupView::new(group, &user.id));
            } else {
                let same_college = match (&user_college, &group.college) {
                    (Some(mine), Some(theirs)) => *mine == theirs.id,
                    _ => false,
                };
                candidates.push((group, same_college));
            }
        }

        candidates.sort_by_key(|(group, same_college)| (!*same_college, -(group.member_count() as i64)));
        let suggested_groups = candidates
            .into_iter()
            .take(SUGGESTED_GROUPS_LIMIT)
            .map(|(group, _)| GroupView::new(group, &user.id))
            .collect();

        Ok(GroupsOverview {
            my_groups,
            suggested_groups,
        })
    }
}
