//! The Registry: the request pipeline over locations, views and users.
//!
//! Every resource operation takes a verified [`Principal`], runs the
//! permission rules for its path class, then touches storage. Changes to
//! locations and views are published only after the write has succeeded.

use std::sync::Arc;

use serde::Serialize;

use signpost_broadcast::{Broadcaster, EventTopic, MutationEvent};
use signpost_core::{
    validate_location, validate_view, Location, LocationDetail, LocationPatch, Method, NewUser,
    Principal, Record, RoleSet, SubjectId, Token, TokenCodec, TokenConfig, User, UserPatch, View,
    ViewPatch,
};
use signpost_perms::{authorize, PathClass, Policy};
use signpost_store::{create_or_reconcile, Reconciled, Store, StoreExt};

use crate::error::{RegistryError, Result};

/// Configuration for the Registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Token lifetime.
    pub token: TokenConfig,
    /// Permission rules per path class.
    pub policy: Policy,
}

/// Outcome of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation<R> {
    /// The record was written by this request.
    Created(R),
    /// A record with the same name already existed and was left untouched.
    Existing(R),
}

impl<R> Creation<R> {
    pub fn was_created(&self) -> bool {
        matches!(self, Creation::Created(_))
    }

    pub fn record(&self) -> &R {
        match self {
            Creation::Created(r) | Creation::Existing(r) => r,
        }
    }

    pub fn into_record(self) -> R {
        match self {
            Creation::Created(r) | Creation::Existing(r) => r,
        }
    }
}

impl<R> From<Reconciled<R>> for Creation<R> {
    fn from(outcome: Reconciled<R>) -> Self {
        if outcome.was_created {
            Creation::Created(outcome.record)
        } else {
            Creation::Existing(outcome.record)
        }
    }
}

/// Outcome of the administrator bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// The caller is now the first administrator.
    Created(User),
    /// Users already exist; nothing was written.
    AlreadyPresent,
}

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Issuing and verifying bearer tokens
/// - Reading and writing locations, views and users under the rule policy
/// - Broadcasting location and view changes
pub struct Registry<S: Store, B: Broadcaster> {
    codec: TokenCodec,
    store: Arc<S>,
    broadcaster: B,
    config: RegistryConfig,
}

impl<S: Store, B: Broadcaster> Registry<S, B> {
    /// Create a registry whose tokens are keyed by `secret`.
    pub fn new(secret: &[u8], store: S, broadcaster: B, config: RegistryConfig) -> Self {
        Self::with_store(secret, Arc::new(store), broadcaster, config)
    }

    /// Create a registry over a store shared with other owners.
    pub fn with_store(secret: &[u8], store: Arc<S>, broadcaster: B, config: RegistryConfig) -> Self {
        Self {
            codec: TokenCodec::new(secret, config.token.clone()),
            store,
            broadcaster,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the token presented with a request.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Principal> {
        let token = token.ok_or(RegistryError::Unauthenticated)?;
        Ok(self.codec.verify(token)?)
    }

    /// Issue a token for `subject`.
    ///
    /// The subject need not have a user record. If it has one, the token
    /// carries its roles; otherwise it carries none. Disabled users get no
    /// token at all.
    pub async fn issue_token(&self, subject: SubjectId) -> Result<Token> {
        let roles = match self.store.get_record::<User>(subject.as_str()).await? {
            Some(user) if !user.enabled => {
                tracing::info!(subject = %subject, "refused token for disabled user");
                return Err(RegistryError::Disabled(subject));
            }
            Some(user) => user.roles,
            None => RoleSet::new(),
        };

        let token = self.codec.issue_with_roles(subject, roles)?;
        tracing::info!(subject = %token.claims().subject_id, "issued token");
        Ok(token)
    }

    /// Make `new` the first administrator if no users exist yet.
    pub async fn bootstrap_admin(&self, new: NewUser) -> Result<Bootstrap> {
        if !self.store.list_records::<User>().await?.is_empty() {
            return Ok(Bootstrap::AlreadyPresent);
        }

        let outcome = create_or_reconcile(self.store.as_ref(), User::administrator(new)).await?;
        if !outcome.was_created {
            return Ok(Bootstrap::AlreadyPresent);
        }

        tracing::info!(eid = %outcome.record.eid, "bootstrapped administrator");
        Ok(Bootstrap::Created(outcome.record))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Locations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_locations(&self, principal: &Principal) -> Result<Vec<Location>> {
        self.authorize(Method::Get, PathClass::Locations, principal, None)?;
        Ok(self.store.list_records().await?)
    }

    /// Read a location with its views resolved.
    pub async fn get_location(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<Option<LocationDetail>> {
        self.authorize(Method::Get, PathClass::Locations, principal, None)?;
        match self.store.get_record::<Location>(name).await? {
            Some(location) => Ok(Some(self.resolve_views(location).await?)),
            None => Ok(None),
        }
    }

    /// Create a location, or return the one already holding its name.
    pub async fn create_location(
        &self,
        principal: &Principal,
        location: Location,
    ) -> Result<Creation<Location>> {
        self.authorize(Method::Post, PathClass::Locations, principal, None)?;
        validate_location(&location)?;
        self.create(EventTopic::Location, location).await
    }

    /// Merge `patch` into a location. `None` if it does not exist.
    ///
    /// The reply and the `location:update` event carry the views resolved.
    pub async fn update_location(
        &self,
        principal: &Principal,
        name: &str,
        patch: LocationPatch,
    ) -> Result<Option<LocationDetail>> {
        self.authorize(Method::Patch, PathClass::Locations, principal, None)?;

        let updated = self
            .store
            .update_record(name, move |location: &mut Location| {
                patch.apply(location);
                Ok(validate_location(location)?)
            })
            .await?;

        let Some(location) = updated else {
            return Ok(None);
        };
        tracing::info!(name, "updated location");

        // The write is durable; a failed lookup only costs the resolved views.
        let detail = match self.resolve_views(location.clone()).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(name, error = %e, "could not resolve views after update");
                LocationDetail::resolve(location, Vec::new())
            }
        };
        self.announce_update(EventTopic::Location, &detail);
        Ok(Some(detail))
    }

    /// Remove a location. Absent locations are not an error.
    pub async fn delete_location(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<Option<Location>> {
        self.authorize(Method::Delete, PathClass::Locations, principal, None)?;
        self.delete(EventTopic::Location, name).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_views(&self, principal: &Principal) -> Result<Vec<View>> {
        self.authorize(Method::Get, PathClass::Views, principal, None)?;
        Ok(self.store.list_records().await?)
    }

    pub async fn get_view(&self, principal: &Principal, name: &str) -> Result<Option<View>> {
        self.authorize(Method::Get, PathClass::Views, principal, None)?;
        Ok(self.store.get_record(name).await?)
    }

    /// Create a view, or return the one already holding its name.
    pub async fn create_view(&self, principal: &Principal, view: View) -> Result<Creation<View>> {
        self.authorize(Method::Post, PathClass::Views, principal, None)?;
        validate_view(&view)?;
        self.create(EventTopic::View, view).await
    }

    /// Merge `patch` into a view.
    ///
    /// Besides `view:update`, every location showing the view is announced
    /// with `view-location:update` so displays can refresh.
    pub async fn update_view(
        &self,
        principal: &Principal,
        name: &str,
        patch: ViewPatch,
    ) -> Result<Option<View>> {
        self.authorize(Method::Patch, PathClass::Views, principal, None)?;

        let updated = self
            .store
            .update_record(name, move |view: &mut View| {
                patch.apply(view);
                Ok(validate_view(view)?)
            })
            .await?;

        let Some(view) = updated else {
            return Ok(None);
        };
        tracing::info!(name, "updated view");
        self.announce_update(EventTopic::View, &view);

        // The view write already succeeded; a failed lookup only costs the
        // follow-up events.
        match self.store.list_records::<Location>().await {
            Ok(locations) => {
                for location in locations.iter().filter(|l| l.references_view(name)) {
                    self.announce_update(EventTopic::ViewLocation, location);
                }
            }
            Err(e) => tracing::warn!(name, error = %e, "could not resolve locations for view"),
        }

        Ok(Some(view))
    }

    /// Remove a view. Locations referencing it are left as they are.
    pub async fn delete_view(&self, principal: &Principal, name: &str) -> Result<Option<View>> {
        self.authorize(Method::Delete, PathClass::Views, principal, None)?;
        self.delete(EventTopic::View, name).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>> {
        self.authorize(Method::Get, PathClass::Users, principal, None)?;
        Ok(self.store.list_records().await?)
    }

    pub async fn get_user(&self, principal: &Principal, eid: &SubjectId) -> Result<Option<User>> {
        self.authorize(Method::Get, PathClass::Users, principal, Some(eid))?;
        Ok(self.store.get_record(eid.as_str()).await?)
    }

    /// Register an ordinary user. Roles are always `{user}`.
    pub async fn create_user(&self, principal: &Principal, new: NewUser) -> Result<Creation<User>> {
        self.authorize(Method::Post, PathClass::Users, principal, None)?;
        let outcome = create_or_reconcile(self.store.as_ref(), User::register(new)).await?;
        if outcome.was_created {
            tracing::info!(eid = %outcome.record.eid, "registered user");
        }
        Ok(outcome.into())
    }

    /// Merge `patch` into a user. The path subject is the owner.
    pub async fn update_user(
        &self,
        principal: &Principal,
        eid: &SubjectId,
        patch: UserPatch,
    ) -> Result<Option<User>> {
        self.edit_user(Method::Patch, principal, eid, patch).await
    }

    /// Same as [`update_user`](Self::update_user), authorized as PUT.
    pub async fn replace_user(
        &self,
        principal: &Principal,
        eid: &SubjectId,
        patch: UserPatch,
    ) -> Result<Option<User>> {
        self.edit_user(Method::Put, principal, eid, patch).await
    }

    pub async fn delete_user(&self, principal: &Principal, eid: &SubjectId) -> Result<Option<User>> {
        self.authorize(Method::Delete, PathClass::Users, principal, Some(eid))?;
        let removed = self.store.remove_record::<User>(eid.as_str()).await?;
        if removed.is_some() {
            tracing::info!(eid = %eid, "deleted user");
        }
        Ok(removed)
    }

    async fn edit_user(
        &self,
        method: Method,
        principal: &Principal,
        eid: &SubjectId,
        patch: UserPatch,
    ) -> Result<Option<User>> {
        self.authorize(method, PathClass::Users, principal, Some(eid))?;
        let updated = self
            .store
            .update_record(eid.as_str(), move |user: &mut User| {
                patch.apply(user);
                Ok(())
            })
            .await?;
        if updated.is_some() {
            tracing::info!(eid = %eid, "updated user");
        }
        Ok(updated)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline steps
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the permission rules for `class` without touching storage.
    ///
    /// Every operation already does this itself. Front ends call it to
    /// refuse a request before spending work on its body.
    pub fn authorize(
        &self,
        method: Method,
        class: PathClass,
        principal: &Principal,
        owner: Option<&SubjectId>,
    ) -> Result<()> {
        authorize(method, self.config.policy.group(class), principal, owner)?;
        Ok(())
    }

    async fn resolve_views(&self, location: Location) -> Result<LocationDetail> {
        let mut views = Vec::with_capacity(location.views.len());
        for name in &location.views {
            match self.store.get_record::<View>(name).await? {
                Some(view) => views.push(view),
                None => tracing::debug!(location = %location.name, view = %name, "dangling view"),
            }
        }
        Ok(LocationDetail::resolve(location, views))
    }

    async fn create<R>(&self, topic: EventTopic, record: R) -> Result<Creation<R>>
    where
        R: Record + Serialize,
    {
        let outcome = create_or_reconcile(self.store.as_ref(), record).await?;
        if outcome.was_created {
            tracing::info!(class = %R::CLASS, name = outcome.record.key(), "created");
            match MutationEvent::created(topic, &outcome.record) {
                Ok(event) => self.broadcaster.publish(event),
                Err(e) => tracing::warn!(error = %e, "could not encode create event"),
            }
        } else {
            tracing::debug!(class = %R::CLASS, name = outcome.record.key(), "already exists");
        }
        Ok(outcome.into())
    }

    async fn delete<R: Record>(&self, topic: EventTopic, name: &str) -> Result<Option<R>> {
        let removed = self.store.remove_record::<R>(name).await?;
        if removed.is_some() {
            tracing::info!(class = %R::CLASS, name, "deleted");
            self.broadcaster.publish(MutationEvent::deleted(topic, name));
        }
        Ok(removed)
    }

    fn announce_update<T: Serialize>(&self, topic: EventTopic, record: &T) {
        match MutationEvent::updated(topic, record) {
            Ok(event) => self.broadcaster.publish(event),
            Err(e) => tracing::warn!(error = %e, "could not encode update event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signpost_broadcast::{Hub, HubConfig};
    use signpost_core::{roles, TokenCodec};
    use signpost_store::MemoryStore;

    const SECRET: &[u8] = b"registry unit secret";

    fn registry() -> Registry<MemoryStore, Hub> {
        Registry::new(
            SECRET,
            MemoryStore::new(),
            Hub::new(HubConfig::default()),
            RegistryConfig::default(),
        )
    }

    fn principal(subject: &str, held: &[&str]) -> Principal {
        let codec = TokenCodec::new(SECRET, TokenConfig::default());
        let token = codec
            .issue_with_roles(
                SubjectId::parse(subject).unwrap(),
                roles(held.iter().copied()),
            )
            .unwrap();
        codec.verify(token.as_str()).unwrap()
    }

    #[test]
    fn test_authenticate_requires_token() {
        let registry = registry();
        assert!(matches!(
            registry.authenticate(None),
            Err(RegistryError::Unauthenticated)
        ));
        assert!(matches!(
            registry.authenticate(Some("garbage")),
            Err(RegistryError::Token(_))
        ));
    }

    #[tokio::test]
    async fn test_issue_token_carries_stored_roles() {
        let registry = registry();
        let eid = SubjectId::parse("corp\\root").unwrap();
        registry
            .bootstrap_admin(NewUser {
                eid: eid.clone(),
                name: "Root".into(),
                email: "root@corp.example".into(),
                enabled: true,
            })
            .await
            .unwrap();

        let token = registry.issue_token(eid).await.unwrap();
        let verified = registry.authenticate(Some(token.as_str())).unwrap();
        assert_eq!(verified.roles(), &roles(["admin", "user"]));

        let stranger = registry
            .issue_token(SubjectId::parse("corp\\nobody").unwrap())
            .await
            .unwrap();
        assert!(stranger.claims().roles.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_user_gets_no_token() {
        let registry = registry();
        let admin = principal("corp\\root", &["admin", "user"]);
        let eid = SubjectId::parse("corp\\alice").unwrap();
        registry
            .create_user(
                &admin,
                NewUser {
                    eid: eid.clone(),
                    name: String::new(),
                    email: String::new(),
                    enabled: true,
                },
            )
            .await
            .unwrap();
        assert!(registry.issue_token(eid.clone()).await.is_ok());

        let patch = UserPatch {
            enabled: Some(false),
            ..Default::default()
        };
        registry.update_user(&admin, &eid, patch).await.unwrap();

        let err = registry.issue_token(eid).await.unwrap_err();
        assert!(matches!(err, RegistryError::Disabled(_)));
        assert_eq!(err.code(), "disabled");
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_forbidden_before_storage() {
        let registry = registry();
        let nobody = principal("corp\\nobody", &[]);

        let err = registry.list_locations(&nobody).await.unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));
        assert_eq!(err.code(), "forbidden");
    }

    #[tokio::test]
    async fn test_invalid_body_rejected() {
        let registry = registry();
        let user = principal("corp\\alice", &["user"]);

        let err = registry
            .create_location(&user, Location::new("a/b"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let mut view = View::new("loop");
        view.urls = vec!["u".into()];
        view.timings = vec![1, 2];
        let err = registry.create_view(&user, view).await.unwrap_err();
        assert_eq!(err.code(), "invalid");
    }

    #[tokio::test]
    async fn test_invalid_patch_writes_nothing() {
        let registry = registry();
        let user = principal("corp\\alice", &["user"]);
        registry
            .create_view(&user, View::new("loop").with_url("u", 5))
            .await
            .unwrap();

        let mut feed = registry.broadcaster().subscribe();
        let patch = ViewPatch {
            timings: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let err = registry.update_view(&user, "loop", patch).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let stored = registry.get_view(&user, "loop").await.unwrap().unwrap();
        assert_eq!(stored.timings, vec![5]);
        assert!(feed.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let registry = registry();
        let first = registry
            .bootstrap_admin(NewUser {
                eid: SubjectId::parse("corp\\root").unwrap(),
                name: String::new(),
                email: String::new(),
                enabled: true,
            })
            .await
            .unwrap();
        assert!(matches!(first, Bootstrap::Created(_)));

        let second = registry
            .bootstrap_admin(NewUser {
                eid: SubjectId::parse("corp\\other").unwrap(),
                name: String::new(),
                email: String::new(),
                enabled: true,
            })
            .await
            .unwrap();
        assert_eq!(second, Bootstrap::AlreadyPresent);
        assert_eq!(registry.store().len(), 1);
    }
}
