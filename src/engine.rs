// src/engine.rs
use crate::connectivity::ConnectivityProbe;
use crate::notify::NotificationSender;
use crate::session::{Authenticator, Session};
use crate::types::*;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

/// Executes network-bound GUI commands, one at a time, in arrival order.
pub struct Engine {
    probe: Box<dyn ConnectivityProbe>,
    authenticator: Box<dyn Authenticator>,
    sender: Box<dyn NotificationSender>,
    session: Option<Session>,
}

impl Engine {
    pub fn new(
        probe: Box<dyn ConnectivityProbe>,
        authenticator: Box<dyn Authenticator>,
        sender: Box<dyn NotificationSender>,
    ) -> Self {
        Self {
            probe,
            authenticator,
            sender,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn handle(&mut self, cmd: GuiCommand) -> Vec<AppMessage> {
        match cmd {
            GuiCommand::Login { username, password } => self.login(&username, &password),
            GuiCommand::SendNotification(n) => self.send_notification(&n),
        }
    }

    fn login(&mut self, username: &str, password: &str) -> Vec<AppMessage> {
        if !self.probe.is_online() {
            return vec![AppMessage::Offline];
        }
        match self.authenticator.connect(username, password) {
            Ok(session) => {
                log::info!("session opened for {}", session.user());
                let user = session.user().to_owned();
                self.session = Some(session);
                vec![
                    AppMessage::Log(format!("Session opened: {user}")),
                    AppMessage::LoginSucceeded { user },
                ]
            }
            Err(e) => {
                log::warn!("login failed: {e}");
                self.session = None;
                vec![AppMessage::LoginFailed(e.to_string())]
            }
        }
    }

    fn send_notification(&mut self, notification: &Notification) -> Vec<AppMessage> {
        if !self.probe.is_online() {
            return vec![AppMessage::Offline];
        }
        let backend = self.sender.backend();
        match self.sender.send(notification) {
            Ok(()) => {
                log::info!("notification dispatched via {backend:?}: {}", notification.body());
                vec![AppMessage::NotificationSent(backend)]
            }
            Err(e) => {
                log::warn!("notification via {backend:?} failed: {e}");
                vec![AppMessage::NotificationFailed(e.to_string())]
            }
        }
    }
}

/// Runs the engine until the GUI drops its command sender.
pub fn spawn_thread(
    mut engine: Engine,
    tx: Sender<AppMessage>,
    rx_cmd: Receiver<GuiCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for cmd in rx_cmd {
            for msg in engine.handle(cmd) {
                if tx.send(msg).is_err() {
                    log::error!("engine: GUI channel closed");
                    return;
                }
            }
        }
        if let Some(session) = engine.session() {
            log::info!("closing session for {}", session.user());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use crate::session::AuthError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Arc;

    struct FixedProbe(bool);

    impl ConnectivityProbe for FixedProbe {
        fn is_online(&self) -> bool {
            self.0
        }
    }

    struct FakeAuth {
        attempts: Arc<AtomicUsize>,
    }

    impl Authenticator for FakeAuth {
        fn connect(&self, username: &str, password: &str) -> Result<Session, AuthError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if username == "operator" && password == "secret" {
                Ok(Session::new(username, Box::new(())))
            } else {
                Err(AuthError::Rejected {
                    user: username.to_owned(),
                    source: "password authentication failed".into(),
                })
            }
        }
    }

    struct CountingSender {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl NotificationSender for CountingSender {
        fn backend(&self) -> Backend {
            Backend::Mail
        }

        fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::Api("mailbox unavailable".to_owned()))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        engine: Engine,
        auth_attempts: Arc<AtomicUsize>,
        sends: Arc<AtomicUsize>,
    }

    fn harness(online: bool, sender_fails: bool) -> Harness {
        let auth_attempts = Arc::new(AtomicUsize::new(0));
        let sends = Arc::new(AtomicUsize::new(0));
        let engine = Engine::new(
            Box::new(FixedProbe(online)),
            Box::new(FakeAuth {
                attempts: auth_attempts.clone(),
            }),
            Box::new(CountingSender {
                calls: sends.clone(),
                fail: sender_fails,
            }),
        );
        Harness {
            engine,
            auth_attempts,
            sends,
        }
    }

    fn login(user: &str, password: &str) -> GuiCommand {
        GuiCommand::Login {
            username: user.to_owned(),
            password: password.to_owned(),
        }
    }

    fn notification() -> GuiCommand {
        GuiCommand::SendNotification(Notification {
            bearing_label: "Третий подшипник".to_owned(),
            deadline: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        })
    }

    #[test]
    fn test_successful_login_opens_session() {
        let mut h = harness(true, false);
        let msgs = h.engine.handle(login("operator", "secret"));
        assert!(matches!(
            msgs.last(),
            Some(AppMessage::LoginSucceeded { user }) if user == "operator"
        ));
        assert_eq!(h.engine.session().map(|s| s.user()), Some("operator"));
    }

    #[test]
    fn test_failed_login_yields_no_session() {
        let mut h = harness(true, false);
        let msgs = h.engine.handle(login("operator", "wrong"));
        assert!(matches!(msgs.as_slice(), [AppMessage::LoginFailed(_)]));
        assert!(h.engine.session().is_none());
        assert!(!msgs
            .iter()
            .any(|m| matches!(m, AppMessage::LoginSucceeded { .. })));
    }

    #[test]
    fn test_offline_login_skips_database() {
        let mut h = harness(false, false);
        let msgs = h.engine.handle(login("operator", "secret"));
        assert!(matches!(msgs.as_slice(), [AppMessage::Offline]));
        assert_eq!(h.auth_attempts.load(Ordering::SeqCst), 0);
        assert!(h.engine.session().is_none());
    }

    #[test]
    fn test_offline_blocks_dispatch() {
        let mut h = harness(false, false);
        let msgs = h.engine.handle(notification());
        assert!(matches!(msgs.as_slice(), [AppMessage::Offline]));
        assert_eq!(h.sends.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_online_dispatch_sends_once() {
        let mut h = harness(true, false);
        let msgs = h.engine.handle(notification());
        assert!(matches!(
            msgs.as_slice(),
            [AppMessage::NotificationSent(Backend::Mail)]
        ));
        assert_eq!(h.sends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_failure_is_not_retried() {
        let mut h = harness(true, true);
        let msgs = h.engine.handle(notification());
        assert!(matches!(msgs.as_slice(), [AppMessage::NotificationFailed(_)]));
        assert_eq!(h.sends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_replies_and_exits_when_gui_drops() {
        let h = harness(true, false);
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let handle = spawn_thread(h.engine, tx, rx_cmd);
        tx_cmd.send(notification()).unwrap();
        assert!(matches!(rx.recv().unwrap(), AppMessage::NotificationSent(_)));
        drop(tx_cmd);
        handle.join().unwrap();
    }
}
