//! Inbound message handling.
//!
//! The [`Dispatcher`] classifies each raw message and routes it either to a
//! bootstrap [`HandshakeHandler`] or, after the session guard and throttle,
//! to a [`GameHandler`] resolved through the three-layer [`HandlerTable`].
//!
//! Handlers receive the parsed packet and a [`Context`]; they reply through
//! [`ResponseSender`] and never touch the socket.

mod core;
pub mod handshake;
pub mod world;

pub use self::core::{
    Context, Deferred, DispatchOutcome, Dispatcher, GameHandler, HandlerLayer, HandlerTable,
    HandlerTableBuilder, HandshakeHandler, HandshakeTable, Outbound, Resolved, ResponseSender,
};

#[cfg(test)]
pub(crate) mod test_support {
    //! Handler test harness: a session, its outgoing queue and shared
    //! services over an in-memory database.

    use super::{Context, Outbound, ResponseSender};
    use crate::config::ServerKind;
    use crate::db::{Database, PlayerId};
    use crate::security::ManualClock;
    use crate::services::{ServerInfo, Services, StoreAuthenticator};
    use crate::state::{Identity, Liveness, Session};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    pub struct Harness {
        pub session: Session,
        pub sender: ResponseSender,
        pub rx: mpsc::Receiver<Outbound>,
        pub services: Arc<Services>,
        pub db: Database,
    }

    impl Harness {
        pub async fn new(kind: ServerKind) -> Self {
            let db = Database::new(":memory:").await.unwrap();
            let store = Arc::new(db.clone());
            let authenticator = Arc::new(StoreAuthenticator::new(
                store.clone(),
                kind,
                Arc::new(ManualClock::at(1_700_000_000)),
            ));
            let server = ServerInfo {
                id: 100,
                name: "Test".into(),
                kind,
            };
            let services = Arc::new(Services::new(server, store, authenticator));
            Self::connect(1, services, db)
        }

        /// Another connection sharing this harness's services.
        pub fn sibling(&self, conn_id: u64) -> Self {
            Self::connect(conn_id, Arc::clone(&self.services), self.db.clone())
        }

        fn connect(conn_id: u64, services: Arc<Services>, db: Database) -> Self {
            let liveness = Liveness::new();
            let (tx, rx) = mpsc::channel(16);
            Self {
                session: Session::new(conn_id, "127.0.0.1:40000".parse().unwrap(), liveness.clone()),
                sender: ResponseSender::new(tx, liveness),
                rx,
                services,
                db,
            }
        }

        pub fn ctx(&mut self) -> Context<'_> {
            Context::new(&mut self.session, &self.sender, &self.services)
        }

        /// Mark the session as logged in without a handshake.
        pub fn login_as(&mut self, id: PlayerId, username: &str) {
            self.session
                .authenticate(Identity {
                    id,
                    username: username.into(),
                })
                .unwrap();
        }

        /// Drain queued reply frames.
        pub fn frames(&mut self) -> Vec<String> {
            let mut frames = Vec::new();
            while let Ok(item) = self.rx.try_recv() {
                if let Outbound::Frame(frame) = item {
                    frames.push(frame);
                }
            }
            frames
        }
    }
}
