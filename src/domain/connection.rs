//! Connection descriptor sent by the front-end
//!
//! The descriptor names a SQL Server instance and database plus the
//! credentials to use. Field names from the legacy front-end
//! (`serverName`, `databaseName`, `useWindowAuth`) are accepted as aliases.

use crate::config::{expose, SecretString};
use crate::domain::errors::AdminError;
use crate::domain::Result;
use serde::Deserialize;

/// Target store and credentials for one request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    /// Server name: `host`, `host\INSTANCE`, `host,port`
    #[serde(default, alias = "serverName")]
    pub server: String,

    /// Database name
    #[serde(default, alias = "databaseName")]
    pub database: String,

    /// SQL login (ignored with Windows authentication)
    #[serde(default)]
    pub username: Option<String>,

    /// SQL password (ignored with Windows authentication)
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Use the server process identity instead of a SQL login
    #[serde(default, alias = "useWindowAuth")]
    pub use_windows_auth: bool,
}

/// How the session authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// Integrated (Windows) authentication
    Windows,
    /// SQL Server login
    SqlLogin { username: &'a str, password: &'a str },
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Windows => write!(f, "Windows"),
            Credentials::SqlLogin { username, .. } => f
                .debug_struct("SqlLogin")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

impl ConnectionDescriptor {
    /// Creates a descriptor using a SQL login
    pub fn sql_login(
        server: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            username: Some(username.into()),
            password: Some(password),
            use_windows_auth: false,
        }
    }

    /// Checks the fields required before any store access
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() || self.database.trim().is_empty() {
            return Err(AdminError::Validation(
                "Server Name và Database Name không được để trống".to_string(),
            ));
        }
        ServerAddress::parse(&self.server).map_err(AdminError::Validation)?;
        self.credentials()?;
        Ok(())
    }

    /// Resolves the authentication mode
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        if self.use_windows_auth {
            return Ok(Credentials::Windows);
        }

        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self
            .password
            .as_ref()
            .map(expose)
            .unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(AdminError::Validation(
                "Cần nhập tên đăng nhập và mật khẩu khi không dùng Windows Authentication"
                    .to_string(),
            ));
        }

        Ok(Credentials::SqlLogin { username, password })
    }

    /// Parsed server address
    pub fn address(&self) -> Result<ServerAddress> {
        ServerAddress::parse(&self.server).map_err(AdminError::Validation)
    }
}

/// Network location of a SQL Server instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Host name or IP address
    pub host: String,

    /// Explicit TCP port
    pub port: Option<u16>,

    /// Named instance (resolved through SQL Browser)
    pub instance: Option<String>,
}

impl ServerAddress {
    /// Parses the server-name forms accepted by SQL Server tooling
    ///
    /// `.`, `(local)` and `localhost` all resolve to `localhost`; a leading
    /// `tcp:` is ignored.
    pub fn parse(server: &str) -> std::result::Result<Self, String> {
        let mut rest = server.trim();
        if rest.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("tcp:")) {
            rest = &rest[4..];
        }
        if rest.is_empty() {
            return Err("Server name cannot be empty".to_string());
        }

        let (rest, port) = match rest.split_once(',') {
            Some((head, port)) => {
                let port = port
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port in server name: {server}"))?;
                (head.trim(), Some(port))
            }
            None => (rest, None),
        };

        let (host, instance) = match rest.split_once('\\') {
            Some((host, instance)) if !instance.trim().is_empty() => {
                (host.trim(), Some(instance.trim().to_string()))
            }
            Some(_) => return Err(format!("Invalid instance name in server name: {server}")),
            None => (rest, None),
        };

        if host.is_empty() {
            return Err(format!("Missing host in server name: {server}"));
        }

        let host = match host.to_ascii_lowercase().as_str() {
            "." | "(local)" | "localhost" => "localhost".to_string(),
            _ => host.to_string(),
        };

        Ok(Self {
            host,
            port,
            instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_deserialize_legacy_field_names() {
        let json = serde_json::json!({
            "serverName": "SQLHOST\\SQLEXPRESS",
            "databaseName": "PhongKham",
            "username": "sa",
            "password": "secret",
            "useWindowAuth": false
        });
        let desc: ConnectionDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(desc.server, "SQLHOST\\SQLEXPRESS");
        assert_eq!(desc.database, "PhongKham");
        assert!(!desc.use_windows_auth);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_deserialize_current_field_names() {
        let json = serde_json::json!({
            "server": "10.0.0.5,1433",
            "database": "PhongKham",
            "useWindowsAuth": true
        });
        let desc: ConnectionDescriptor = serde_json::from_value(json).unwrap();
        assert!(desc.use_windows_auth);
        assert_eq!(desc.credentials().unwrap(), Credentials::Windows);
    }

    #[test]
    fn test_validate_requires_server_and_database() {
        let desc = ConnectionDescriptor::sql_login("", "db", "sa", secret_string("x".into()));
        assert!(matches!(desc.validate(), Err(AdminError::Validation(_))));

        let desc = ConnectionDescriptor::sql_login("host", "  ", "sa", secret_string("x".into()));
        assert!(matches!(desc.validate(), Err(AdminError::Validation(_))));
    }

    #[test]
    fn test_sql_login_requires_password() {
        let mut desc =
            ConnectionDescriptor::sql_login("host", "db", "sa", secret_string(String::new()));
        assert!(desc.credentials().is_err());

        desc.password = Some(secret_string("pw".into()));
        assert_eq!(
            desc.credentials().unwrap(),
            Credentials::SqlLogin {
                username: "sa",
                password: "pw"
            }
        );
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let desc =
            ConnectionDescriptor::sql_login("host", "db", "sa", secret_string("hunter2".into()));
        assert!(!format!("{desc:?}").contains("hunter2"));
    }

    #[test]
    fn test_parse_plain_host() {
        let addr = ServerAddress::parse("sqlhost").unwrap();
        assert_eq!(addr.host, "sqlhost");
        assert_eq!(addr.port, None);
        assert_eq!(addr.instance, None);
    }

    #[test]
    fn test_parse_named_instance() {
        let addr = ServerAddress::parse(".\\SQLEXPRESS").unwrap();
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.instance.as_deref(), Some("SQLEXPRESS"));
    }

    #[test]
    fn test_parse_host_and_port() {
        let addr = ServerAddress::parse("tcp:10.1.2.3, 1500").unwrap();
        assert_eq!(addr.host, "10.1.2.3");
        assert_eq!(addr.port, Some(1500));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ServerAddress::parse("").is_err());
        assert!(ServerAddress::parse("host,notaport").is_err());
        assert!(ServerAddress::parse("host\\").is_err());
        assert!(ServerAddress::parse("\\INSTANCE").is_err());
    }
}
