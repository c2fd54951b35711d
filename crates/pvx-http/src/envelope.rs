use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use pvx_core::ClientError;

/// Every API answer wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Decode an envelope body.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|e| e.data)
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Turn a response into its payload; a non-2xx status is a rejection.
pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    decode_body(&body)
}
