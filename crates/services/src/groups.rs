//! Group listing and administration.

use std::sync::Arc;

use domains::{validation, DomainError, Group, GroupRepository, NewGroup, Requester, Result};
use tracing::{info, instrument};

use crate::policy::ensure_staff;
use crate::Repositories;

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(repos: &Repositories) -> Self {
        Self { groups: repos.groups.clone() }
    }

    pub async fn list(&self) -> Result<Vec<Group>> {
        self.groups.list().await
    }

    pub async fn get(&self, slug: &str) -> Result<Group> {
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))
    }

    #[instrument(skip(self, requester, group), fields(slug = %group.slug))]
    pub async fn create(&self, requester: &Requester, group: NewGroup) -> Result<Group> {
        let admin = ensure_staff(requester)?;
        validation::slug(&group.slug)?;
        validation::group_title(&group.title)?;
        let created = self.groups.create(group).await?;
        info!(group_id = created.id, by = %admin.username, "group created");
        Ok(created)
    }

    /// Removes the group; its posts survive with no group.
    #[instrument(skip(self, requester))]
    pub async fn delete(&self, requester: &Requester, slug: &str) -> Result<()> {
        ensure_staff(requester)?;
        let group = self.get(slug).await?;
        self.groups.delete(group.id).await?;
        info!(group_id = group.id, "group deleted");
        Ok(())
    }
}
