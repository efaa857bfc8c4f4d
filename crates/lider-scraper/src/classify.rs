//! Status and body classification of upstream responses.

use reqwest::StatusCode;

/// What one upstream response means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Ok,
    /// The upstream is refusing us right now; worth another attempt later.
    SoftBlocked(SoftBlock),
    /// The upstream answered and the answer is final.
    HardFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftBlock {
    RateLimited,
    AntiBotChallenge,
}

/// Classifies a response by status code and body text.
///
/// Precedence: 429/503 first, then any anti-bot marker in the body (whatever
/// the status, including 2xx), then any other non-2xx status.
#[must_use]
pub fn classify<S: AsRef<str>>(status: StatusCode, body: &str, markers: &[S]) -> ResponseClass {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return ResponseClass::SoftBlocked(SoftBlock::RateLimited);
    }
    if markers
        .iter()
        .map(AsRef::as_ref)
        .any(|marker| !marker.is_empty() && body.contains(marker))
    {
        return ResponseClass::SoftBlocked(SoftBlock::AntiBotChallenge);
    }
    if !status.is_success() {
        return ResponseClass::HardFailed;
    }
    ResponseClass::Ok
}
