// ── Location permission state ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse authorization state of the location capability.
///
/// Reading the SSID of the associated network requires location access on
/// the platforms this models; the engine only uses the state to decide
/// whether an SSID read is attempted and whether to surface a prompt.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PermissionState {
    #[default]
    Unknown,
    Denied,
    Restricted,
    GrantedWhenInUse,
    GrantedAlways,
}

impl PermissionState {
    /// True while the user still has to grant access.
    pub fn needs_prompt(self) -> bool {
        matches!(self, Self::Unknown | Self::Denied | Self::Restricted)
    }

    /// True if the platform would let us read the SSID.
    pub fn allows_ssid_read(self) -> bool {
        !self.needs_prompt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_needed_until_granted() {
        assert!(PermissionState::Unknown.needs_prompt());
        assert!(PermissionState::Denied.needs_prompt());
        assert!(PermissionState::Restricted.needs_prompt());
        assert!(!PermissionState::GrantedWhenInUse.needs_prompt());
        assert!(!PermissionState::GrantedAlways.needs_prompt());
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            "granted-when-in-use".parse::<PermissionState>().ok(),
            Some(PermissionState::GrantedWhenInUse)
        );
        assert_eq!(PermissionState::GrantedAlways.to_string(), "granted-always");
    }
}
