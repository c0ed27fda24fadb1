//! Value encoding shared by all backends.
//!
//! Snapshots are stored as JSON so that the persisted form matches the
//! documented `{state, resourceId?, lastUpdated, message}` layout. API keys
//! are stored as raw UTF-8.

use vpn_toggle_core::StatusSnapshot;

use crate::error::{Result, StoreError};

/// Serialize a snapshot to JSON bytes.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if encoding fails.
pub fn encode_snapshot(snapshot: &StatusSnapshot) -> Result<Vec<u8>> {
    serde_json::to_vec(snapshot).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Deserialize a snapshot from JSON bytes.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the bytes are not a valid snapshot.
pub fn decode_snapshot(data: &[u8]) -> Result<StatusSnapshot> {
    serde_json::from_slice(data).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a stored API key.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the bytes are not UTF-8.
pub fn decode_api_key(data: Vec<u8>) -> Result<String> {
    String::from_utf8(data).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpn_toggle_core::ResourceState;

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode_snapshot(b"not json"),
            Err(StoreError::Serialization(_))
        ));
        assert!(matches!(
            decode_snapshot(br#"{"state":"exploded","lastUpdated":"2024-01-01T00:00:00Z","message":""}"#),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn encoded_snapshot_is_json() {
        let snapshot = StatusSnapshot::now(ResourceState::Running, None, "VPN is running");
        let bytes = encode_snapshot(&snapshot).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(r#""state":"running""#));
        assert_eq!(decode_snapshot(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn api_key_must_be_utf8() {
        assert_eq!(decode_api_key(b"K1".to_vec()).unwrap(), "K1");
        assert!(decode_api_key(vec![0xff, 0xfe]).is_err());
    }
}
