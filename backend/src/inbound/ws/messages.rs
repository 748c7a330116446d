//! Wire-level message definitions for the feed socket.
//!
//! Feed updates are transformed into these payloads before being serialized
//! to JSON and sent to connected clients.

use serde::{Deserialize, Serialize};

use crate::domain::{FeedImage, FeedQuery, FeedUpdate};

/// Inbound payload provided by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Switch the feed to `q`; blank or missing means the latest feed.
    Query {
        #[serde(default)]
        q: Option<String>,
    },
    /// The client scrolled to within 1000px of the bottom.
    NearBottom,
}

/// Outbound payload emitted for each merged fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A page was merged. `images` holds only ids not sent before.
    Page {
        #[serde(skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        page: u32,
        images: Vec<FeedImage>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        replaced: Vec<FeedImage>,
    },
    /// The provider ran dry; further `nearBottom` signals are ignored.
    Exhausted,
    /// The page could not be fetched; the next `nearBottom` retries it.
    FetchFailed { page: u32, message: String },
}

impl ServerMessage {
    /// Payload for `update`, or `None` for results that must not reach the
    /// client.
    pub fn from_update(query: Option<&FeedQuery>, update: FeedUpdate) -> Option<Self> {
        match update {
            FeedUpdate::Page {
                page,
                added,
                replaced,
            } => Some(Self::Page {
                query: query.map(ToString::to_string),
                page: page.get(),
                images: added,
                replaced,
            }),
            FeedUpdate::Exhausted => Some(Self::Exhausted),
            FeedUpdate::FetchFailed { page, message } => Some(Self::FetchFailed {
                page: page.get(),
                message,
            }),
            FeedUpdate::Stale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagination::PageNumber;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"type": "query", "q": "cats"}), ClientMessage::Query { q: Some("cats".into()) })]
    #[case(json!({"type": "query"}), ClientMessage::Query { q: None })]
    #[case(json!({"type": "nearBottom"}), ClientMessage::NearBottom)]
    fn parses_client_messages(#[case] raw: Value, #[case] expected: ClientMessage) {
        let parsed: ClientMessage = serde_json::from_value(raw).expect("client message");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_unknown_client_message() {
        let parsed = serde_json::from_value::<ClientMessage>(json!({"type": "scroll"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn page_update_serialises_added_images() {
        let image = FeedImage::new("a", "https://t/a", "https://f/a", None);
        let update = FeedUpdate::Page {
            page: PageNumber::FIRST,
            added: vec![image],
            replaced: Vec::new(),
        };
        let message = ServerMessage::from_update(FeedQuery::parse("cats").as_ref(), update)
            .expect("page message");
        let value = serde_json::to_value(message).expect("json");
        assert_eq!(value["type"], "page");
        assert_eq!(value["query"], "cats");
        assert_eq!(value["page"], 1);
        assert_eq!(value["images"][0]["thumbnailUrl"], "https://t/a");
        assert!(value.get("replaced").is_none());
    }

    #[test]
    fn failure_and_exhaustion_have_distinct_tags() {
        let failed = ServerMessage::from_update(
            None,
            FeedUpdate::FetchFailed {
                page: PageNumber::FIRST,
                message: "timeout".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(failed).expect("json"),
            json!({"type": "fetchFailed", "page": 1, "message": "timeout"})
        );
        let exhausted = ServerMessage::from_update(None, FeedUpdate::Exhausted);
        assert_eq!(
            serde_json::to_value(exhausted).expect("json"),
            json!({"type": "exhausted"})
        );
    }

    #[test]
    fn stale_updates_are_not_sent() {
        assert!(ServerMessage::from_update(None, FeedUpdate::Stale).is_none());
    }
}
