use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Position carried by a pagination token: the record id of the last item
/// already returned. `None` means "start from the top".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    #[serde(rename = "after_rec", skip_serializing_if = "Option::is_none")]
    pub after_record: Option<i64>,
}

impl PageCursor {
    pub fn after(record_id: i64) -> Self {
        Self {
            after_record: Some(record_id),
        }
    }
}

/// One page of a forward-only keyset listing.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub next_cursor: Option<String>,
    pub limit: usize,
}

/// Encodes a cursor as an opaque URL-safe token. Callers must treat the
/// result as opaque; only this module knows the payload shape.
pub fn encode_cursor(cursor: &PageCursor) -> String {
    // PageCursor serialization cannot fail; the payload is a flat struct.
    let payload = serde_json::to_vec(cursor).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(payload)
}

/// Decodes a token back into a cursor. Absent, empty, or malformed tokens
/// all mean "no constraint" rather than an error.
pub fn decode_cursor(token: Option<&str>) -> PageCursor {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return PageCursor::default();
    };
    URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}
