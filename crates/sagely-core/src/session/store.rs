//! SessionStore trait definition.
//!
//! The client-side durable cache: a previously resolved session id (so a
//! repeat visit resumes instead of creating a duplicate session) and the
//! bearer credential used for both REST calls and the channel handshake.
//! Implementations live in `sagely-client` (`FileSessionStore`).
//!
//! The cache is best-effort everywhere: callers tolerate every error here
//! by logging and carrying on.

use secrecy::SecretString;

use sagely_types::error::StoreError;
use sagely_types::session::SessionId;

pub trait SessionStore: Send + Sync {
    /// The session id cached by a previous activation, if any.
    fn load_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<SessionId>, StoreError>> + Send;

    /// Persist the resolved session id for future reuse.
    fn save_session(
        &self,
        id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// The cached bearer credential, if any.
    fn auth_token(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<SecretString>, StoreError>> + Send;
}
