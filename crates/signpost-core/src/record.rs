//! Registry records: locations, views and users.
//!
//! Each record is keyed by a natural key that storage keeps unique per
//! [`ResourceClass`]. That uniqueness is the only consistency constraint the
//! registry relies on.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::secret_fragment;
use crate::error::{CoreError, Result};
use crate::types::{ResourceClass, Role, RoleSet, SubjectId};

/// A named record persisted by the storage collaborator.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which class this record belongs to.
    const CLASS: ResourceClass;

    /// The natural key storage keeps unique.
    fn key(&self) -> &str;

    /// Encode for storage.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from storage.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

/// A collection of displays that cycle through views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,

    #[serde(default)]
    pub monitors: Vec<String>,

    /// Names of the views shown here.
    #[serde(default)]
    pub views: Vec<String>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            monitors: Vec::new(),
            views: Vec::new(),
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.views.push(view.into());
        self
    }

    pub fn with_monitor(mut self, monitor: impl Into<String>) -> Self {
        self.monitors.push(monitor.into());
        self
    }

    pub fn references_view(&self, view: &str) -> bool {
        self.views.iter().any(|v| v == view)
    }
}

impl Record for Location {
    const CLASS: ResourceClass = ResourceClass::Location;

    fn key(&self) -> &str {
        &self.name
    }
}

/// Partial update for a [`Location`]. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Vec<String>>,
}

impl LocationPatch {
    pub fn apply(&self, location: &mut Location) {
        if let Some(monitors) = &self.monitors {
            location.monitors = monitors.clone();
        }
        if let Some(views) = &self.views {
            location.views = views.clone();
        }
    }
}

/// A location with its view names resolved to the stored views.
///
/// This is what a display fetches: everything it needs to start cycling.
/// Names that no longer resolve are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetail {
    pub name: String,
    pub monitors: Vec<String>,
    pub views: Vec<View>,
}

impl LocationDetail {
    /// Pair `location` with the views it names, in its own order.
    ///
    /// `views` may hold extra or missing entries; only named, present views
    /// are kept.
    pub fn resolve(location: Location, views: impl IntoIterator<Item = View>) -> Self {
        let found: BTreeMap<String, View> =
            views.into_iter().map(|v| (v.name.clone(), v)).collect();
        let views = location
            .views
            .iter()
            .filter_map(|name| found.get(name).cloned())
            .collect();
        Self {
            name: location.name,
            monitors: location.monitors,
            views,
        }
    }
}

/// A rotating set of pages shown on a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub name: String,

    #[serde(default)]
    pub urls: Vec<String>,

    /// Seconds each url stays on screen, parallel to `urls`.
    #[serde(default)]
    pub timings: Vec<u32>,

    #[serde(default)]
    pub cookies: BTreeMap<String, String>,

    #[serde(default)]
    pub reload: bool,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: Vec::new(),
            timings: Vec::new(),
            cookies: BTreeMap::new(),
            reload: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>, seconds: u32) -> Self {
        self.urls.push(url.into());
        self.timings.push(seconds);
        self
    }
}

impl Record for View {
    const CLASS: ResourceClass = ResourceClass::View;

    fn key(&self) -> &str {
        &self.name
    }
}

/// Partial update for a [`View`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Vec<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<bool>,
}

impl ViewPatch {
    pub fn apply(&self, view: &mut View) {
        if let Some(urls) = &self.urls {
            view.urls = urls.clone();
        }
        if let Some(timings) = &self.timings {
            view.timings = timings.clone();
        }
        if let Some(cookies) = &self.cookies {
            view.cookies = cookies.clone();
        }
        if let Some(reload) = self.reload {
            view.reload = reload;
        }
    }
}

/// A registry account.
///
/// Roles are fixed at creation; no operation escalates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub eid: SubjectId,
    pub name: String,
    pub email: String,
    pub roles: RoleSet,
    pub enabled: bool,

    /// Locally generated secret fragment, set once at creation.
    pub salt: String,
}

impl User {
    /// Register an ordinary user from a sign-up request.
    pub fn register(new: NewUser) -> Self {
        Self::with_roles(new, [Role::user()].into_iter().collect())
    }

    /// Register the first administrator.
    pub fn administrator(new: NewUser) -> Self {
        Self::with_roles(new, [Role::admin(), Role::user()].into_iter().collect())
    }

    fn with_roles(new: NewUser, roles: RoleSet) -> Self {
        Self {
            eid: new.eid,
            name: new.name,
            email: new.email,
            roles,
            enabled: new.enabled,
            salt: secret_fragment(),
        }
    }
}

impl Record for User {
    const CLASS: ResourceClass = ResourceClass::User;

    fn key(&self) -> &str {
        self.eid.as_str()
    }
}

/// Sign-up request body for a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub eid: SubjectId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Partial update for a [`User`]. Roles and the secret fragment are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(enabled) = self.enabled {
            user.enabled = enabled;
        }
    }
}
