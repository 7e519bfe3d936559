//! Connection testing

use crate::adapters::database::{with_session, ServerInfo, StoreConnector};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::errors::ConnectionFailureKind;
use crate::domain::{AdminError, Result};

/// Opens a session, runs the liveness probe and reads the server identity
///
/// # Errors
///
/// Validation errors come back before any network access; connection
/// failures carry their classified kind.
pub async fn test_connection(
    connector: &dyn StoreConnector,
    descriptor: &ConnectionDescriptor,
) -> Result<ServerInfo> {
    descriptor.validate()?;

    tracing::info!(
        server = %descriptor.server,
        database = %descriptor.database,
        windows_auth = descriptor.use_windows_auth,
        "Testing connection"
    );

    let info = with_session(connector, descriptor, |session| {
        Box::pin(async move { session.server_info().await })
    })
    .await?;

    tracing::info!(server_name = %info.server_name, database = %info.database_name, "Connection OK");
    Ok(info)
}

/// HTTP status reported for a failed connection test
pub fn failure_status(error: &AdminError) -> u16 {
    match error {
        AdminError::Validation(_) => 400,
        AdminError::Connection(failure) => match failure.kind {
            ConnectionFailureKind::HostNotFound
            | ConnectionFailureKind::Network
            | ConnectionFailureKind::DatabaseUnavailable
            | ConnectionFailureKind::Refused => 400,
            ConnectionFailureKind::LoginFailed => 401,
            ConnectionFailureKind::Timeout => 408,
            ConnectionFailureKind::Other => 500,
        },
        AdminError::Timeout(_) => 408,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::InMemoryStore;
    use crate::config::secret_string;
    use crate::domain::errors::ConnectionFailure;

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor::sql_login("localhost", "clinic", "sa", secret_string("pw".into()))
    }

    #[tokio::test]
    async fn test_connection_success_closes_session() {
        let store = InMemoryStore::new();
        let info = test_connection(&store, &descriptor()).await.unwrap();

        assert_eq!(info.database_name, "memory");
        assert_eq!(store.session_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_connection_rejects_empty_fields() {
        let store = InMemoryStore::new();
        let mut desc = descriptor();
        desc.database = String::new();

        let err = test_connection(&store, &desc).await.unwrap_err();
        assert_eq!(failure_status(&err), 400);
        assert_eq!(store.session_counts(), (0, 0));
    }

    #[test]
    fn test_failure_status_mapping() {
        let status = |msg: &str| failure_status(&ConnectionFailure::from_message(msg).into());

        assert_eq!(status("getaddrinfo ENOTFOUND db"), 400);
        assert_eq!(status("Login failed for user 'sa'."), 401);
        assert_eq!(status("Cannot open database \"x\""), 400);
        assert_eq!(status("connect timed out"), 408);
        assert_eq!(status("Connection refused"), 400);
        assert_eq!(status("weird"), 500);
    }
}
