//! Versioned settings blobs.
//!
//! Users and rooms each carry an opaque settings document in their
//! store row. The schemas are empty today, but the rows already exist
//! in deployed databases, so both structs decode any historical blob:
//! `#[serde(default)]` fills missing fields and serde_json ignores
//! unknown ones. Add optional fields here (never remove or retype) to
//! stay forward- and backward-compatible.

use serde::{Deserialize, Serialize};

/// Per-user settings, persisted in the `users` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {}

/// Per-room settings, persisted in the `rooms` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_settings_decode_unknown_fields() {
        // Blobs written by a future version must still parse.
        let settings: UserSettings =
            serde_json::from_str(r#"{"theme":"dark","volume":3}"#).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_room_settings_decode_empty_blob() {
        let settings: RoomSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RoomSettings::default());
    }
}
