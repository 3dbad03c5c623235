//! Handshake message model.
//!
//! Handshake documents look like:
//!
//! ```text
//! <msg t="sys"><body action="login" r="0"><login z="w1"><nick><![CDATA[name]]></nick><pword><![CDATA[...]]></pword></login></body></msg>
//! ```

use crate::error::HandshakeError;
use crate::markup::{parse_document, Element};

/// Handshake actions with a dedicated bootstrap handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandshakeAction {
    /// `verChk`: protocol version check.
    VersionCheck,
    /// `rndK`: random key request.
    RandomKey,
    /// `login`: credential submission.
    Login,
    /// Any other action. Ignored by the server.
    Other(String),
}

impl HandshakeAction {
    /// Map a wire action name.
    pub fn from_wire(action: &str) -> Self {
        match action {
            "verChk" => Self::VersionCheck,
            "rndK" => Self::RandomKey,
            "login" => Self::Login,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire action name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::VersionCheck => "verChk",
            Self::RandomKey => "rndK",
            Self::Login => "login",
            Self::Other(s) => s,
        }
    }
}

/// Login credentials carried by a `login` handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name from `<nick>`.
    pub username: String,
    /// Hex digest from `<pword>`.
    pub password: String,
    /// Requested zone from `login@z`, if any.
    pub zone: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("zone", &self.zone)
            .finish()
    }
}

/// A parsed handshake document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// `t` attribute of the root element (`sys` for system messages).
    pub kind: Option<String>,
    /// Action from the body element.
    pub action: HandshakeAction,
    /// `r` attribute of the body element.
    pub room: Option<String>,
    /// The body element itself.
    pub body: Element,
}

impl HandshakeMessage {
    /// Parse a handshake document and extract its action.
    pub fn parse(raw: &str) -> Result<Self, HandshakeError> {
        let root = parse_document(raw)?;
        let body = root
            .find("body")
            .ok_or(HandshakeError::MissingElement("body"))?;
        let action = body
            .attr("action")
            .ok_or(HandshakeError::MissingAttribute("action"))?;

        Ok(Self {
            kind: root.attr("t").map(str::to_string),
            action: HandshakeAction::from_wire(action),
            room: body.attr("r").map(str::to_string),
            body: body.clone(),
        })
    }

    /// Credentials from `body/login`.
    pub fn credentials(&self) -> Result<Credentials, HandshakeError> {
        let login = self
            .body
            .child("login")
            .ok_or(HandshakeError::MissingElement("login"))?;
        let username = login
            .child("nick")
            .ok_or(HandshakeError::MissingElement("nick"))?
            .text();
        let password = login
            .child("pword")
            .ok_or(HandshakeError::MissingElement("pword"))?
            .text();

        Ok(Credentials {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
            zone: login.attr("z").map(str::to_string),
        })
    }

    /// Client version from `body/ver@v`.
    pub fn version(&self) -> Option<&str> {
        self.body.child("ver").and_then(|v| v.attr("v"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_check() {
        let msg =
            HandshakeMessage::parse("<msg t='sys'><body action='verChk' r='0'><ver v='153' /></body></msg>")
                .unwrap();
        assert_eq!(msg.kind.as_deref(), Some("sys"));
        assert_eq!(msg.action, HandshakeAction::VersionCheck);
        assert_eq!(msg.room.as_deref(), Some("0"));
        assert_eq!(msg.version(), Some("153"));
    }

    #[test]
    fn test_unknown_action_is_kept() {
        let msg = HandshakeMessage::parse("<msg t='sys'><body action='autoJoin' r='-1'></body></msg>")
            .unwrap();
        assert_eq!(msg.action, HandshakeAction::Other("autoJoin".into()));
        assert_eq!(msg.action.as_str(), "autoJoin");
    }

    #[test]
    fn test_login_credentials() {
        let msg = HandshakeMessage::parse(
            "<msg t='sys'><body action='login' r='0'><login z='w1'>\
             <nick><![CDATA[Rocky]]></nick><pword><![CDATA[abc123]]></pword>\
             </login></body></msg>",
        )
        .unwrap();
        assert_eq!(msg.action, HandshakeAction::Login);

        let creds = msg.credentials().unwrap();
        assert_eq!(creds.username, "Rocky");
        assert_eq!(creds.password, "abc123");
        assert_eq!(creds.zone.as_deref(), Some("w1"));
        assert!(!format!("{creds:?}").contains("abc123"));
    }

    #[test]
    fn test_login_without_credentials() {
        let msg = HandshakeMessage::parse("<msg t='sys'><body action='login' r='0'></body></msg>")
            .unwrap();
        assert_eq!(
            msg.credentials(),
            Err(HandshakeError::MissingElement("login"))
        );
    }

    #[test]
    fn test_missing_body_or_action() {
        assert_eq!(
            HandshakeMessage::parse("<msg t='sys'></msg>"),
            Err(HandshakeError::MissingElement("body"))
        );
        assert_eq!(
            HandshakeMessage::parse("<msg t='sys'><body r='0'/></msg>"),
            Err(HandshakeError::MissingAttribute("action"))
        );
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            HandshakeMessage::parse("<msg t='sys'><body action='verChk'>"),
            Err(HandshakeError::Malformed(_))
        ));
    }

    #[test]
    fn test_deeply_nested_document() {
        let raw = format!("<msg t='sys'>{}", "<body action='x'>".repeat(2000));
        assert!(matches!(
            HandshakeMessage::parse(&raw),
            Err(HandshakeError::Malformed(_))
        ));
    }
}
