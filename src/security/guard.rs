//! Session guard for game packets.
//!
//! Runs after parsing and before throttling. A violation is fatal for the
//! connection: the dispatcher sends the violation code and disconnects.

use crate::config::SecurityConfig;
use crate::state::Session;
use onyx_proto::GamePacket;
use std::collections::HashSet;
use thiserror::Error;

/// Why a game packet was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardViolation {
    #[error("reserved character {ch:?} in {command}")]
    ReservedCharacter { command: String, ch: char },
    #[error("game command {command} before login")]
    Unauthenticated { command: String },
}

impl GuardViolation {
    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ReservedCharacter { .. } => "reserved_char",
            Self::Unauthenticated { .. } => "unauthenticated",
        }
    }
}

/// Content and authentication checks for game packets.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    reserved_char: char,
    allow_reserved: HashSet<String>,
    violation_code: u16,
}

impl SessionGuard {
    pub fn new(
        reserved_char: char,
        allow_reserved: impl IntoIterator<Item = impl Into<String>>,
        violation_code: u16,
    ) -> Self {
        Self {
            reserved_char,
            allow_reserved: allow_reserved.into_iter().map(Into::into).collect(),
            violation_code,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.reserved_char,
            config.allow_reserved.iter().cloned(),
            config.violation_code,
        )
    }

    /// Error code sent before disconnecting on a violation.
    pub fn violation_code(&self) -> u16 {
        self.violation_code
    }

    pub fn allows_reserved(&self, key: &str) -> bool {
        self.allow_reserved.contains(key)
    }

    pub fn allow_list(&self) -> impl Iterator<Item = &str> {
        self.allow_reserved.iter().map(String::as_str)
    }

    /// Both checks must pass. Content is checked first.
    ///
    /// Everything after the packet kind is inspected: zone, command token
    /// and arguments.
    pub fn check(&self, session: &Session, packet: &GamePacket) -> Result<(), GuardViolation> {
        let key = packet.command.as_str();
        let mut scanned = std::iter::once(packet.zone.as_str()).chain(packet.tokens());
        if !self.allows_reserved(key) && scanned.any(|t| t.contains(self.reserved_char)) {
            return Err(GuardViolation::ReservedCharacter {
                command: key.to_string(),
                ch: self.reserved_char,
            });
        }

        if !session.is_authenticated() {
            return Err(GuardViolation::Unauthenticated {
                command: key.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Identity, test_session};

    fn guard() -> SessionGuard {
        SessionGuard::from_config(&SecurityConfig::default())
    }

    fn logged_in() -> Session {
        let mut session = test_session();
        session
            .authenticate(Identity {
                id: 101,
                username: "Rocky".into(),
            })
            .unwrap();
        session
    }

    fn packet(raw: &str) -> GamePacket {
        GamePacket::parse(raw).unwrap()
    }

    #[test]
    fn authenticated_clean_packet_passes() {
        assert_eq!(guard().check(&logged_in(), &packet("%xt%s%u#sf%-1%3%")), Ok(()));
    }

    #[test]
    fn unauthenticated_is_rejected() {
        let err = guard()
            .check(&test_session(), &packet("%xt%s%u#sf%-1%3%"))
            .unwrap_err();
        assert_eq!(err.reason(), "unauthenticated");
    }

    #[test]
    fn allow_listed_command_is_still_rejected_before_login() {
        let err = guard()
            .check(&test_session(), &packet("%xt%s%m#sm%-1%hi|there%"))
            .unwrap_err();
        assert!(matches!(err, GuardViolation::Unauthenticated { .. }));
    }

    #[test]
    fn reserved_char_in_argument_is_rejected() {
        let err = guard()
            .check(&logged_in(), &packet("%xt%s%u#sf%-1%3|4%"))
            .unwrap_err();
        assert_eq!(
            err,
            GuardViolation::ReservedCharacter {
                command: "u#sf".into(),
                ch: '|'
            }
        );
    }

    #[test]
    fn reserved_char_in_command_token_is_rejected() {
        let err = guard()
            .check(&logged_in(), &packet("%xt%s%u#s|f%-1%"))
            .unwrap_err();
        assert_eq!(err.reason(), "reserved_char");
    }

    #[test]
    fn reserved_char_in_zone_is_rejected() {
        let err = guard()
            .check(&logged_in(), &packet("%xt%a|b%u#h%-1%"))
            .unwrap_err();
        assert_eq!(err.reason(), "reserved_char");
    }

    #[test]
    fn reserved_char_in_kind_is_ignored() {
        assert_eq!(guard().check(&logged_in(), &packet("%x|t%s%u#h%-1%")), Ok(()));
    }

    #[test]
    fn allow_list_permits_reserved_char() {
        let guard = guard();
        assert_eq!(guard.check(&logged_in(), &packet("%xt%s%m#sm%-1%101%hi|there%")), Ok(()));
        assert_eq!(guard.check(&logged_in(), &packet("%xt%s%g#ur%-1%1|2|3%")), Ok(()));
    }

    #[test]
    fn custom_reserved_char() {
        let guard = SessionGuard::new('~', ["x#y"], 801);
        assert_eq!(guard.violation_code(), 801);
        assert_eq!(guard.check(&logged_in(), &packet("%xt%s%u#sf%-1%a|b%")), Ok(()));
        assert!(guard.check(&logged_in(), &packet("%xt%s%u#sf%-1%a~b%")).is_err());
        assert_eq!(guard.check(&logged_in(), &packet("%xt%s%x#y%-1%a~b%")), Ok(()));
    }
}
