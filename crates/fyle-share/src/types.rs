//! Shared-document payload types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use fyle_core::{Error, Result};

/// File extension for exported payloads.
pub const PAYLOAD_EXTENSION: &str = "fyle.json";

/// A document as sent to another device.
///
/// Binary fields travel as standard base64. `summaryData` is the base64 of
/// the summary's JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDocument {
    pub name: String,
    #[serde(with = "b64")]
    pub pdf_data: Vec<u8>,
    #[serde(default, with = "b64_opt", skip_serializing_if = "Option::is_none")]
    pub summary_data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
    pub date_added: DateTime<Utc>,
    #[serde(default, with = "b64_opt", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<u8>>,
    #[serde(default)]
    pub category_names: Vec<String>,
}

impl SharedDocument {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a payload. Malformed input is a `Share` error.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Share(e.to_string()))
    }

    /// Encode a summary map into `summary_data`.
    pub fn encode_summary(summary: &BTreeMap<String, String>) -> Result<Option<Vec<u8>>> {
        if summary.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_vec(summary)?))
    }

    /// Decode `summary_data`. `None` when absent or not a string map.
    pub fn summary(&self) -> Option<BTreeMap<String, String>> {
        let raw = self.summary_data.as_deref()?;
        serde_json::from_slice(raw).ok()
    }
}

/// Result of importing a payload.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub doc_id: i64,
    /// Categories that did not exist before the import.
    pub created_categories: Vec<String>,
    pub fingerprint: String,
}

/// A payload written to the exports directory.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedPayload {
    pub transfer_id: String,
    pub path: String,
    pub fingerprint: String,
    pub size: usize,
}

/// SHA-256 hex digest of payload or document bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

mod b64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_str(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SharedDocument {
        let mut summary = BTreeMap::new();
        summary.insert("Policy".to_string(), "A-1".to_string());
        SharedDocument {
            name: "Policy".into(),
            pdf_data: b"%PDF-1.7".to_vec(),
            summary_data: SharedDocument::encode_summary(&summary).unwrap(),
            expiry_date: None,
            reminder_date: None,
            is_favorite: true,
            date_added: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            thumbnail: None,
            category_names: vec!["Insurance".into()],
        }
    }

    #[test]
    fn test_wire_shape() {
        let json: serde_json::Value = serde_json::from_slice(&sample().to_bytes().unwrap()).unwrap();
        assert_eq!(json["pdfData"], "JVBERi0xLjc=");
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["categoryNames"][0], "Insurance");
        assert!(json.get("thumbnail").is_none());
        assert!(json.get("expiryDate").is_none());
    }

    #[test]
    fn test_minimal_payload_parses() {
        let raw = br#"{"name":"Scan","pdfData":"","dateAdded":"2026-01-02T03:04:05Z"}"#;
        let doc = SharedDocument::from_slice(raw).unwrap();
        assert!(doc.pdf_data.is_empty());
        assert!(doc.category_names.is_empty());
        assert!(!doc.is_favorite);
        assert!(doc.summary().is_none());
    }

    #[test]
    fn test_bad_base64_is_share_error() {
        let raw = br#"{"name":"x","pdfData":"***","dateAdded":"2026-01-02T03:04:05Z"}"#;
        assert!(matches!(SharedDocument::from_slice(raw), Err(Error::Share(_))));
    }

    #[test]
    fn test_summary_decoding() {
        let doc = sample();
        assert_eq!(doc.summary().unwrap()["Policy"], "A-1");

        let garbage = SharedDocument {
            summary_data: Some(b"[1,2]".to_vec()),
            ..sample()
        };
        assert!(garbage.summary().is_none());
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
