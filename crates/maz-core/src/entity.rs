//! Catalogue of synchronized collections.
//!
//! Each [`EntityType`] knows its cache file name, which attribute identifies
//! its objects, how fresh its snapshot must be, and how it is fetched
//! upstream ([`SyncMode`]).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::object::RemoteObject;

/// Base urls of the two upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Directory API (e.g., `https://graph.microsoft.com`).
    pub graph_url: String,
    /// Resource-manager API (e.g., `https://management.azure.com`).
    pub arm_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graph_url: "https://graph.microsoft.com".to_string(),
            arm_url: "https://management.azure.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Which API a url belongs to, by prefix.
    #[must_use]
    pub fn surface_of(&self, url: &str) -> Option<ApiSurface> {
        if url.starts_with(&self.graph_url) {
            Some(ApiSurface::Graph)
        } else if url.starts_with(&self.arm_url) {
            Some(ApiSurface::ResourceManager)
        } else {
            None
        }
    }

    /// Tenant-wide subscription listing.
    #[must_use]
    pub fn subscriptions_url(&self) -> String {
        format!(
            "{}/subscriptions?api-version={SUBSCRIPTION_API_VERSION}",
            self.arm_url.trim_end_matches('/')
        )
    }

    /// Tenant-wide management-group listing.
    #[must_use]
    pub fn management_groups_url(&self) -> String {
        format!(
            "{}/providers/Microsoft.Management/managementGroups?api-version={MANAGEMENT_GROUP_API_VERSION}",
            self.arm_url.trim_end_matches('/')
        )
    }
}

/// The upstream API an entity type is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiSurface {
    Graph,
    ResourceManager,
}

/// Freshness class. Directory objects mutate often; authorization data is
/// comparatively static.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Directory,
    Authorization,
}

/// How a collection is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMode {
    /// Incremental query with a server-issued delta cursor; merged into the
    /// existing snapshot.
    Delta { url: String },
    /// One paginated listing; replaces the snapshot.
    Listing { url: String },
    /// One listing per authorization scope, deduplicated across scopes;
    /// replaces the snapshot. `suffix` is appended to each scope path.
    Scoped { suffix: String },
}

const ROLE_API_VERSION: &str = "2022-04-01";
const SUBSCRIPTION_API_VERSION: &str = "2022-09-01";
const MANAGEMENT_GROUP_API_VERSION: &str = "2020-05-01";

/// A synchronized collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    RoleDefinitions,
    RoleAssignments,
    Subscriptions,
    ManagementGroups,
    Users,
    Groups,
    ServicePrincipals,
    Applications,
    DirectoryRoles,
}

impl EntityType {
    pub const ALL: [Self; 9] = [
        Self::RoleDefinitions,
        Self::RoleAssignments,
        Self::Subscriptions,
        Self::ManagementGroups,
        Self::Users,
        Self::Groups,
        Self::ServicePrincipals,
        Self::Applications,
        Self::DirectoryRoles,
    ];

    /// Short command-line code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RoleDefinitions => "d",
            Self::RoleAssignments => "a",
            Self::Subscriptions => "s",
            Self::ManagementGroups => "m",
            Self::Users => "u",
            Self::Groups => "g",
            Self::ServicePrincipals => "sp",
            Self::Applications => "ap",
            Self::DirectoryRoles => "ad",
        }
    }

    /// Collection name used in cache file names.
    #[must_use]
    pub const fn cache_name(self) -> &'static str {
        match self {
            Self::RoleDefinitions => "roleDefinitions",
            Self::RoleAssignments => "roleAssignments",
            Self::Subscriptions => "subscriptions",
            Self::ManagementGroups => "managementGroups",
            Self::Users => "users",
            Self::Groups => "groups",
            Self::ServicePrincipals => "servicePrincipals",
            Self::Applications => "applications",
            Self::DirectoryRoles => "directoryRoles",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::RoleDefinitions => "RBAC Role Definition",
            Self::RoleAssignments => "RBAC Role Assignment",
            Self::Subscriptions => "Azure Subscription",
            Self::ManagementGroups => "Management Group",
            Self::Users => "Azure AD User",
            Self::Groups => "Azure AD Group",
            Self::ServicePrincipals => "Service Principal",
            Self::Applications => "Registered Application",
            Self::DirectoryRoles => "Azure AD Role",
        }
    }

    /// Attribute holding the object's identity. Resource-manager role objects
    /// are identified by their GUID `name`; their `id` is a scope-qualified path
    /// that differs per scope.
    #[must_use]
    pub const fn id_attr(self) -> &'static str {
        match self {
            Self::RoleDefinitions | Self::RoleAssignments => "name",
            _ => "id",
        }
    }

    #[must_use]
    pub const fn ttl_class(self) -> TtlClass {
        match self {
            Self::RoleDefinitions
            | Self::RoleAssignments
            | Self::Subscriptions
            | Self::ManagementGroups => TtlClass::Authorization,
            Self::Users
            | Self::Groups
            | Self::ServicePrincipals
            | Self::Applications
            | Self::DirectoryRoles => TtlClass::Directory,
        }
    }

    /// Server-side object count url for directory collections that support
    /// `$count`. Requires `ConsistencyLevel: eventual`.
    #[must_use]
    pub fn count_url(self, endpoints: &Endpoints) -> Option<String> {
        let collection = match self {
            Self::Users => "users",
            Self::Groups => "groups",
            Self::ServicePrincipals => "servicePrincipals",
            Self::Applications => "applications",
            _ => return None,
        };
        Some(format!(
            "{}/beta/{collection}/$count",
            endpoints.graph_url.trim_end_matches('/')
        ))
    }

    /// Sub-category used to break down local counts: role definitions are
    /// `builtin` or `custom`; service principals are `native` to `tenant`
    /// or `multi_tenant`. Other collections have no breakdown.
    #[must_use]
    pub fn count_class(self, x: &RemoteObject, tenant: &str) -> Option<&'static str> {
        match self {
            Self::RoleDefinitions => Some(if x.pointer_str("/properties/type") == "CustomRole" {
                "custom"
            } else {
                "builtin"
            }),
            Self::ServicePrincipals => Some(
                if x.str_attr("appOwnerOrganizationId").eq_ignore_ascii_case(tenant) {
                    "native"
                } else {
                    "multi_tenant"
                },
            ),
            _ => None,
        }
    }

    /// How this collection is fetched against the given endpoints.
    #[must_use]
    pub fn sync_mode(self, endpoints: &Endpoints) -> SyncMode {
        let graph = endpoints.graph_url.trim_end_matches('/');
        let delta = |collection: &str, select: &str| SyncMode::Delta {
            url: format!("{graph}/beta/{collection}/delta?$select={select}&$top=999"),
        };
        match self {
            Self::Users => delta("users", "displayName,userPrincipalName,onPremisesSamAccountName"),
            Self::Groups => delta("groups", "displayName,description,isAssignableToRole"),
            Self::ServicePrincipals => delta(
                "servicePrincipals",
                "displayName,appId,accountEnabled,appOwnerOrganizationId,passwordCredentials",
            ),
            Self::Applications => delta(
                "applications",
                "displayName,appId,requiredResourceAccess,passwordCredentials",
            ),
            Self::DirectoryRoles => SyncMode::Listing {
                url: format!("{graph}/beta/roleManagement/directory/roleDefinitions"),
            },
            Self::Subscriptions => SyncMode::Listing {
                url: endpoints.subscriptions_url(),
            },
            Self::ManagementGroups => SyncMode::Listing {
                url: endpoints.management_groups_url(),
            },
            Self::RoleDefinitions => SyncMode::Scoped {
                suffix: format!(
                    "/providers/Microsoft.Authorization/roleDefinitions?api-version={ROLE_API_VERSION}"
                ),
            },
            Self::RoleAssignments => SyncMode::Scoped {
                suffix: format!(
                    "/providers/Microsoft.Authorization/roleAssignments?api-version={ROLE_API_VERSION}"
                ),
            },
        }
    }

    /// Build an id → display-name map from a snapshot of this collection.
    ///
    /// Keys follow how other objects reference this type: subscriptions by
    /// their bare `subscriptionId`, role definitions by GUID `name`.
    #[must_use]
    pub fn name_map(self, objects: &[RemoteObject]) -> HashMap<String, String> {
        let pick = |x: &RemoteObject| -> (String, String) {
            match self {
                Self::RoleDefinitions => {
                    (x.id.clone(), x.pointer_str("/properties/roleName").to_string())
                }
                Self::Subscriptions => (
                    x.str_attr("subscriptionId").to_string(),
                    x.str_attr("displayName").to_string(),
                ),
                Self::ManagementGroups => {
                    let name = x.pointer_str("/properties/displayName");
                    let name = if name.is_empty() { x.str_attr("name") } else { name };
                    (x.id.clone(), name.to_string())
                }
                _ => (x.id.clone(), x.str_attr("displayName").to_string()),
            }
        };
        objects
            .iter()
            .map(pick)
            .filter(|(id, name)| !id.is_empty() && !name.is_empty())
            .collect()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_name())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == s || t.cache_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownEntityType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("u", EntityType::Users)]
    #[case("sp", EntityType::ServicePrincipals)]
    #[case("ad", EntityType::DirectoryRoles)]
    #[case("roleAssignments", EntityType::RoleAssignments)]
    #[case("managementgroups", EntityType::ManagementGroups)]
    fn parses_codes_and_names(#[case] input: &str, #[case] expected: EntityType) {
        assert_eq!(input.parse::<EntityType>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(matches!(
            "zz".parse::<EntityType>(),
            Err(CoreError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn only_delta_collections_have_server_counts() {
        let endpoints = Endpoints::default();
        for t in EntityType::ALL {
            let is_delta = matches!(t.sync_mode(&endpoints), SyncMode::Delta { .. });
            assert_eq!(is_delta, t.count_url(&endpoints).is_some(), "{t}");
        }
        assert_eq!(
            EntityType::Users.count_url(&endpoints).as_deref(),
            Some("https://graph.microsoft.com/beta/users/$count")
        );
        assert_eq!(EntityType::DirectoryRoles.ttl_class(), TtlClass::Directory);
        assert_eq!(EntityType::Subscriptions.ttl_class(), TtlClass::Authorization);
    }

    #[test]
    fn delta_url_carries_projection() {
        let SyncMode::Delta { url } = EntityType::Groups.sync_mode(&Endpoints::default()) else {
            panic!("groups should use delta");
        };
        assert_eq!(
            url,
            "https://graph.microsoft.com/beta/groups/delta?$select=displayName,description,isAssignableToRole&$top=999"
        );
    }

    #[test]
    fn surface_is_resolved_by_prefix() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.surface_of("https://graph.microsoft.com/beta/users"),
            Some(ApiSurface::Graph)
        );
        assert_eq!(
            endpoints.surface_of("https://management.azure.com/subscriptions"),
            Some(ApiSurface::ResourceManager)
        );
        assert_eq!(endpoints.surface_of("https://example.com"), None);
    }

    #[rstest]
    #[case(json!({"name": "r1", "properties": {"type": "CustomRole"}}), Some("custom"))]
    #[case(json!({"name": "r2", "properties": {"type": "BuiltInRole"}}), Some("builtin"))]
    #[case(json!({"name": "r3"}), Some("builtin"))]
    fn role_definitions_split_builtin_and_custom(
        #[case] value: serde_json::Value,
        #[case] expected: Option<&str>,
    ) {
        let x = RemoteObject::from_value(value, "name").unwrap();
        assert_eq!(EntityType::RoleDefinitions.count_class(&x, "t1"), expected);
    }

    #[rstest]
    #[case(json!({"id": "1", "appOwnerOrganizationId": "T1"}), Some("native"))]
    #[case(json!({"id": "2", "appOwnerOrganizationId": "f8cdef31"}), Some("multi_tenant"))]
    #[case(json!({"id": "3"}), Some("multi_tenant"))]
    fn service_principals_split_by_owner_tenant(
        #[case] value: serde_json::Value,
        #[case] expected: Option<&str>,
    ) {
        let x = RemoteObject::from_value(value, "id").unwrap();
        assert_eq!(EntityType::ServicePrincipals.count_class(&x, "t1"), expected);
    }

    #[test]
    fn other_collections_have_no_count_breakdown() {
        let x = RemoteObject::from_value(json!({"id": "1"}), "id").unwrap();
        assert_eq!(EntityType::Users.count_class(&x, "t1"), None);
    }

    #[test]
    fn role_definition_names_are_keyed_by_guid() {
        let defs = vec![
            RemoteObject::from_value(
                json!({"id": "/providers/Microsoft.Authorization/roleDefinitions/r1", "name": "r1", "properties": {"roleName": "Reader"}}),
                "name",
            )
            .unwrap(),
        ];
        let names = EntityType::RoleDefinitions.name_map(&defs);
        assert_eq!(names.get("r1").map(String::as_str), Some("Reader"));
    }
}
