//! Lifecycle configuration
//!
//! Names the fields the lifecycle rules read. Defaults describe the user
//! record: `email` / `emails` identity set, `status`, `_deleted`.

use serde::{Deserialize, Serialize};

/// Configuration for a record type's write lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Model name written into audit entries (e.g. `"user"`)
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Singular identity field
    #[serde(default = "default_identity_field")]
    pub identity_field: String,

    /// Repeatable-value field checked against every identity value
    #[serde(default = "default_alternates_field")]
    pub alternates_field: String,

    /// Field holding the activity status
    #[serde(default = "default_status_field")]
    pub status_field: String,

    /// Status value meaning "not active"; anything else is active
    #[serde(default = "default_inactive_status")]
    pub inactive_status: String,

    /// Soft-delete flag
    #[serde(default = "default_deleted_field")]
    pub deleted_field: String,

    /// Field stamped with the record's own identifier before validation
    #[serde(default = "default_owner_field")]
    pub owner_field: Option<String>,

    /// Severity level written into audit entries
    #[serde(default = "default_severity_level")]
    pub severity_level: u8,

    /// Domain for transition events (defaults to `model_name`)
    #[serde(default)]
    pub notification_domain: Option<String>,

    /// Spawn post-commit notifications instead of awaiting them
    #[serde(default)]
    pub detach_notifications: bool,
}

fn default_model_name() -> String {
    "user".to_string()
}

fn default_identity_field() -> String {
    "email".to_string()
}

fn default_alternates_field() -> String {
    "emails".to_string()
}

fn default_status_field() -> String {
    "status".to_string()
}

fn default_inactive_status() -> String {
    "inactive".to_string()
}

fn default_deleted_field() -> String {
    "_deleted".to_string()
}

fn default_owner_field() -> Option<String> {
    Some("_owner_id".to_string())
}

fn default_severity_level() -> u8 {
    3
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            identity_field: default_identity_field(),
            alternates_field: default_alternates_field(),
            status_field: default_status_field(),
            inactive_status: default_inactive_status(),
            deleted_field: default_deleted_field(),
            owner_field: default_owner_field(),
            severity_level: default_severity_level(),
            notification_domain: None,
            detach_notifications: false,
        }
    }
}

impl LifecycleConfig {
    /// Create a configuration for a model with default field names
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the identity set fields
    pub fn with_identity_fields(
        mut self,
        identity: impl Into<String>,
        alternates: impl Into<String>,
    ) -> Self {
        self.identity_field = identity.into();
        self.alternates_field = alternates.into();
        self
    }

    /// Set the status field and its inactive value
    pub fn with_status_field(
        mut self,
        field: impl Into<String>,
        inactive: impl Into<String>,
    ) -> Self {
        self.status_field = field.into();
        self.inactive_status = inactive.into();
        self
    }

    /// Set or clear the owner field
    pub fn with_owner_field(mut self, field: Option<String>) -> Self {
        self.owner_field = field;
        self
    }

    /// Set the transition event domain
    pub fn with_notification_domain(mut self, domain: impl Into<String>) -> Self {
        self.notification_domain = Some(domain.into());
        self
    }

    /// Spawn post-commit notifications on the runtime
    pub fn with_detached_notifications(mut self, detach: bool) -> Self {
        self.detach_notifications = detach;
        self
    }

    /// Domain used for transition events
    pub fn domain(&self) -> &str {
        self.notification_domain
            .as_deref()
            .unwrap_or(&self.model_name)
    }

    /// Model name with its first letter capitalized, for audit titles
    pub fn display_name(&self) -> String {
        let mut chars = self.model_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LifecycleConfig::default();
        assert_eq!(config.model_name, "user");
        assert_eq!(config.identity_field, "email");
        assert_eq!(config.alternates_field, "emails");
        assert_eq!(config.owner_field.as_deref(), Some("_owner_id"));
        assert_eq!(config.domain(), "user");
        assert_eq!(config.display_name(), "User");
    }

    #[test]
    fn test_from_json_partial() {
        let config = LifecycleConfig::from_json_str(
            r#"{"model_name": "member", "owner_field": null, "notification_domain": "crm"}"#,
        )
        .unwrap();

        assert_eq!(config.model_name, "member");
        assert_eq!(config.owner_field, None);
        assert_eq!(config.domain(), "crm");
        assert_eq!(config.status_field, "status");
        assert!(!config.detach_notifications);
    }

    #[test]
    fn test_builders() {
        let config = LifecycleConfig::new("account")
            .with_identity_fields("login", "aliases")
            .with_status_field("state", "disabled")
            .with_detached_notifications(true);

        assert_eq!(config.identity_field, "login");
        assert_eq!(config.alternates_field, "aliases");
        assert_eq!(config.inactive_status, "disabled");
        assert!(config.detach_notifications);
    }
}
