//! Operation names, payload/ack shapes and the success/failure envelope of
//! the wire protocol. Field names follow the server's JSON; domain types are
//! mapped here rather than leaking wire casing outward.

use crate::infra::channel::{Channel, ChannelError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const GET_PROFILE: &str = "get_profile";
pub const GET_ALL_CARDS: &str = "get_all_cards";
pub const GET_USER_CARDS: &str = "get_user_cards";
pub const CREATE_CARD: &str = "create_card";
pub const UPDATE_CARD: &str = "update_card";
pub const DELETE_CARD: &str = "delete_card";

/// Replacement image attached to an `update_card` request; `extension` is the
/// file-name hint the server uses when storing the new content.
#[derive(Debug, Clone, serde::Serialize, Deserialize, PartialEq)]
pub struct ImageReplacement {
    pub buffer: Vec<u8>,
    pub extension: String,
}

/// Signed-in user as reported by `get_profile`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileAck {
    pub user: Profile,
}

/// Successful half of a `get_all_cards` / `get_user_cards` ack.
#[derive(Debug, Deserialize)]
pub(crate) struct CardsAck {
    pub cards: Vec<crate::domain::Listing>,
}

/// Successful half of a `create_card` ack: where the server stored the image.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateAck {
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

/// Successful half of an `update_card` ack.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateAck {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Split a raw ack into its success payload or the server-supplied error.
pub fn into_result(ack: Value) -> Result<Value, ChannelError> {
    match ack.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(ack),
        Some(false) => {
            let message = ack
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string();
            Err(ChannelError::Rejected(message))
        }
        None => Err(ChannelError::MalformedAck(ack.to_string())),
    }
}

/// Issue `op` over `channel` and deserialize the successful half of its ack.
pub async fn call<T: DeserializeOwned>(
    channel: &dyn Channel,
    op: &str,
    payload: Value,
) -> Result<T, ChannelError> {
    let ack = channel.request(op, payload).await?;
    let ok = into_result(ack)?;
    Ok(serde_json::from_value(ok)?)
}

/// Fetch the signed-in user. A rejected ack means the session is no longer
/// valid and the caller must route back to login.
pub async fn fetch_profile(channel: &dyn Channel) -> Result<Profile, ChannelError> {
    match call::<ProfileAck>(channel, GET_PROFILE, Value::Null).await {
        Ok(ack) => Ok(ack.user),
        Err(ChannelError::Rejected(_)) => Err(ChannelError::SessionRejected),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::channel::FakeChannel;
    use serde_json::json;

    #[test]
    fn success_envelope_passes_payload_through() {
        let ok = into_result(json!({"success": true, "imagePath": "uploads/a.png"})).unwrap();
        assert_eq!(ok["imagePath"], "uploads/a.png");
    }

    #[test]
    fn failure_envelope_carries_server_message() {
        let err = into_result(json!({"success": false, "error": "quota exceeded"})).unwrap_err();
        assert!(matches!(err, ChannelError::Rejected(msg) if msg == "quota exceeded"));
    }

    #[test]
    fn failure_without_message_still_rejects() {
        let err = into_result(json!({"success": false})).unwrap_err();
        assert!(matches!(err, ChannelError::Rejected(_)));
    }

    #[test]
    fn ack_without_envelope_is_malformed() {
        let err = into_result(json!({"cards": []})).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedAck(_)));
    }

    #[tokio::test]
    async fn rejected_profile_maps_to_session_rejected() {
        let channel = FakeChannel::new();
        channel.script_ack(GET_PROFILE, json!({"success": false}));
        let err = fetch_profile(channel.as_ref()).await.unwrap_err();
        assert!(matches!(err, ChannelError::SessionRejected));
    }

    #[tokio::test]
    async fn profile_ack_yields_username() {
        let channel = FakeChannel::new();
        channel.script_ack(
            GET_PROFILE,
            json!({"success": true, "user": {"username": "dasha"}}),
        );
        let profile = fetch_profile(channel.as_ref()).await.unwrap();
        assert_eq!(profile.username, "dasha");
    }
}
