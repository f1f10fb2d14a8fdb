//! Tracking link and message composition.

use vassago_core::TrackingId;

use crate::OutgoingMail;

/// Path prefix the pixel endpoint is mounted under.
pub const TRACK_PATH_PREFIX: &str = "/track/";

/// Builds the pixel URL for `id` under the service's public base URL.
#[must_use]
pub fn tracking_url(public_url: &str, id: &TrackingId) -> String {
    format!(
        "{}{}{}",
        public_url.trim_end_matches('/'),
        TRACK_PATH_PREFIX,
        id
    )
}

/// Composes the tracking email with a hidden 1x1 image pointing at `tracking_url`.
#[must_use]
pub fn tracking_email(
    from: impl Into<String>,
    to: impl Into<String>,
    subject: impl Into<String>,
    tracking_url: &str,
) -> OutgoingMail {
    let html = format!(
        "<p>Hello, this email contains a tracking pixel.</p>\n\
         <img src=\"{}\" width=\"1\" height=\"1\" style=\"display:none;\">",
        escape_attr(tracking_url)
    );

    OutgoingMail {
        from: from.into(),
        to: to.into(),
        subject: subject.into(),
        html,
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
