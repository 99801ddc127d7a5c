//! Session resolution and bootstrap hydration.
//!
//! Resolution establishes or resumes exactly one session per activation.
//! The bootstrap fetches run concurrently and each tolerates its own
//! failure: a malformed (non-list) response settles the collection to
//! empty with a warning, any other backend error additionally surfaces a
//! notice. Neither blocks the channel connection.

use std::sync::Arc;

use sagely_types::error::{ApiError, ResolveError};
use sagely_types::session::{Session, SessionId};

use crate::backend::BackendApi;
use crate::chat::SharedState;
use crate::notify::{report_api_error, Notifier};
use crate::session::store::SessionStore;

/// Establish or resume a session.
///
/// Reads the cached identifier (tolerating store failures), asks the
/// backend to resolve, and persists the returned identifier. A response
/// without a usable identifier is a hard failure: no session is
/// established and dependent components never activate. No retry is
/// attempted here; re-activation is the retry path.
pub async fn resolve<B, S, N>(
    backend: Arc<B>,
    store: Arc<S>,
    notifier: Arc<N>,
) -> Result<Session, ResolveError>
where
    B: BackendApi,
    S: SessionStore,
    N: Notifier,
{
    let cached = match store.load_session().await {
        Ok(cached) => cached,
        Err(err) => {
            tracing::warn!(error = %err, "could not read cached session id");
            None
        }
    };

    let resolved = match backend.resolve_session(cached.as_ref()).await {
        Ok(resolved) => resolved,
        Err(err) => {
            report_api_error(notifier.as_ref(), "session resolution", &err);
            return Err(err.into());
        }
    };

    let uuid = resolved
        .uuid
        .filter(|uuid| !uuid.is_empty())
        .ok_or_else(|| {
            tracing::error!("backend did not return a valid session id");
            ResolveError::MissingSessionId
        })?;

    let id = SessionId::from(uuid);
    if let Err(err) = store.save_session(&id).await {
        tracing::warn!(error = %err, session_id = %id, "failed to cache session id");
    }

    if let Some(points) = resolved.wisdom_points {
        tracing::info!(session_id = %id, wisdom_points = points, "session resolved");
    } else {
        tracing::info!(session_id = %id, "session resolved");
    }

    Ok(Session::resolved(id, resolved.wisdom_points.unwrap_or(0)))
}

/// Hydrate history, learning targets, and recent lessons concurrently.
///
/// Runs after the channel is already connecting so that the missed-event
/// window stays minimal; hydration splices fetched history in front of
/// anything the channel delivered in the meantime.
pub async fn bootstrap<B, N>(
    backend: Arc<B>,
    notifier: Arc<N>,
    state: SharedState,
    session: SessionId,
) where
    B: BackendApi,
    N: Notifier,
{
    let (messages, targets, lessons) = tokio::join!(
        backend.fetch_messages(&session),
        backend.fetch_targets(&session),
        backend.fetch_lessons(&session),
    );

    match messages {
        Ok(history) => {
            tracing::info!(count = history.len(), "loaded message history");
            state.hydrate_messages(history);
        }
        Err(err) => {
            settle(notifier.as_ref(), "message history fetch", &err);
            state.hydrate_messages(Vec::new());
        }
    }

    match targets {
        Ok(fetched) => {
            tracing::info!(count = fetched.len(), "loaded learning targets");
            state.hydrate_targets(fetched);
        }
        Err(err) => {
            settle(notifier.as_ref(), "learning targets fetch", &err);
            state.hydrate_targets(Vec::new());
        }
    }

    match lessons {
        Ok(fetched) => {
            tracing::info!(count = fetched.len(), "loaded recent lessons");
            state.hydrate_lessons(fetched);
        }
        Err(err) => {
            settle(notifier.as_ref(), "recent lessons fetch", &err);
            state.hydrate_lessons(Vec::new());
        }
    }
}

/// One bootstrap collection failed; degrade it to empty.
///
/// A wrong-shaped body is only worth a warning; real backend errors also
/// reach the notification surface.
fn settle<N: Notifier + ?Sized>(notifier: &N, context: &str, err: &ApiError) {
    match err {
        ApiError::UnexpectedShape(shape) => {
            tracing::warn!(context, shape = %shape, "endpoint did not return a list, using empty");
        }
        other => report_api_error(notifier, context, other),
    }
}
