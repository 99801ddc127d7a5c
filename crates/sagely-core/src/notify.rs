//! Notification surface ("toast") port.
//!
//! The core never renders anything itself; user-facing failures are pushed
//! through this trait and the consumer decides how to display them.

use sagely_types::error::ApiError;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Consumer-provided notification sink.
///
/// Implementations must be cheap and non-blocking; they are called from
/// async contexts without awaiting.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Silent surface for headless embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _level: NoticeLevel, _message: &str) {}
}

/// Log an API failure and surface it to the user.
///
/// `context` names the operation the way the user would ("message send",
/// "session resolution") and is woven into the fallback text when the
/// backend supplied no message of its own.
pub(crate) fn report_api_error<N: Notifier + ?Sized>(notifier: &N, context: &str, err: &ApiError) {
    tracing::error!(error = %err, context, "backend call failed");
    notifier.notify(NoticeLevel::Error, &err.user_message(context));
}
