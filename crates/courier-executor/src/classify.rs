//! # Network-Failure Classification
//!
//! A deterministic, substring-keyed table mapping raw transport error text
//! to an actionable user-facing message. Table lookup, not inference: the
//! first matching row wins, and unmatched text passes through generically
//! wrapped.

/// The failure classes the table distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    ConnectionRefused,
    NameNotResolved,
    InternetDisconnected,
    TimedOut,
    /// The ambiguous case: blocked, unreachable, or CORS-like rejection.
    FetchFailed,
}

/// Substring keys, matched case-insensitively, in priority order.
const CLASSIFICATION_TABLE: &[(&str, FailureClass)] = &[
    ("connection refused", FailureClass::ConnectionRefused),
    ("err_connection_refused", FailureClass::ConnectionRefused),
    ("name not resolved", FailureClass::NameNotResolved),
    ("err_name_not_resolved", FailureClass::NameNotResolved),
    ("failed to lookup address", FailureClass::NameNotResolved),
    ("dns error", FailureClass::NameNotResolved),
    ("internet disconnected", FailureClass::InternetDisconnected),
    ("err_internet_disconnected", FailureClass::InternetDisconnected),
    ("network is unreachable", FailureClass::InternetDisconnected),
    ("timed out", FailureClass::TimedOut),
    ("timeout", FailureClass::TimedOut),
    ("failed to fetch", FailureClass::FetchFailed),
    ("error sending request", FailureClass::FetchFailed),
];

fn message(class: FailureClass, url: &str) -> String {
    match class {
        FailureClass::ConnectionRefused => {
            format!("cannot connect to {url}: the server refused the connection")
        }
        FailureClass::NameNotResolved => {
            format!("cannot resolve the host of {url}: name not resolved")
        }
        FailureClass::InternetDisconnected => {
            format!("network appears to be offline while requesting {url}")
        }
        FailureClass::TimedOut => {
            format!("the network operation timed out while requesting {url}")
        }
        FailureClass::FetchFailed => format!(
            "failed to fetch {url}: the host is unreachable or the request was blocked"
        ),
    }
}

/// Map raw transport error text to a user-facing message naming the URL.
#[must_use]
pub fn classify_network_failure(raw: &str, url: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    for (needle, class) in CLASSIFICATION_TABLE {
        if lowered.contains(needle) {
            return message(*class, url);
        }
    }
    format!("request to {url} failed: {raw}")
}
