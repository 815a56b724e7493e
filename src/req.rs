use std::time::Duration;

use crate::error::PosseErr;

pub fn get_client(timeout: Duration) -> Result<reqwest::Client, PosseErr> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(timeout)
        .build()?)
}

/// Turns a non-success response into [`PosseErr::Platform`] carrying the body.
pub async fn ensure_success(
    platform: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, PosseErr> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PosseErr::Platform {
        platform: platform.to_string(),
        status: status.as_u16(),
        body,
    })
}
