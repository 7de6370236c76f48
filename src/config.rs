//! Bridge configuration

use crate::capability::Permission;

/// Companion app package id checked by default
pub const DEFAULT_COMPANION_PACKAGE: &str = "com.mi.health";

/// Remote-app launch path used when the caller passes none
pub const DEFAULT_LAUNCH_PATH: &str = "/";

/// Session bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Host package id of the companion app
    pub companion_package: String,

    /// Launch path substituted when the caller supplies an empty one
    pub default_launch_path: String,

    /// Fixed permission set requested from the accessory
    pub requested_permissions: Vec<Permission>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            companion_package: DEFAULT_COMPANION_PACKAGE.to_string(),
            default_launch_path: DEFAULT_LAUNCH_PATH.to_string(),
            requested_permissions: vec![Permission::DeviceManager, Permission::Notify],
        }
    }
}

impl BridgeConfig {
    /// Load configuration, honoring `WEARBRIDGE_COMPANION_PACKAGE` and
    /// `WEARBRIDGE_LAUNCH_PATH` overrides
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(package) = std::env::var("WEARBRIDGE_COMPANION_PACKAGE")
            && !package.is_empty()
        {
            config.companion_package = package;
        }
        if let Ok(path) = std::env::var("WEARBRIDGE_LAUNCH_PATH")
            && !path.is_empty()
        {
            config.default_launch_path = path;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.companion_package, DEFAULT_COMPANION_PACKAGE);
        assert_eq!(config.default_launch_path, "/");
        assert_eq!(
            config.requested_permissions,
            vec![Permission::DeviceManager, Permission::Notify]
        );
    }
}
