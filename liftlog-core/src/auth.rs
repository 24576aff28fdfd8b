//! Optional shared-passcode gate. A successful unlock yields an
//! [`AuthSession`] that every tracker handler takes as proof of access.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::TrackerError;

#[derive(Debug)]
pub struct Gate {
    id: Uuid,
    passcode: Option<String>,
}

/// Issued by [`Gate`]; cannot be built anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    id: Uuid,
    gate_id: Uuid,
    issued_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Gate {
    /// An empty passcode leaves the tracker open.
    pub fn new(passcode: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            passcode: passcode.filter(|p| !p.is_empty()),
        }
    }

    pub fn requires_passcode(&self) -> bool {
        self.passcode.is_some()
    }

    fn issue(&self) -> AuthSession {
        let session = AuthSession {
            id: Uuid::new_v4(),
            gate_id: self.id,
            issued_at: Utc::now(),
        };
        info!("Issued session {}", session.id);
        session
    }

    /// A session without a code, available only when no passcode is set.
    pub fn open_session(&self) -> Option<AuthSession> {
        if self.requires_passcode() {
            None
        } else {
            Some(self.issue())
        }
    }

    pub fn unlock(&self, attempt: &str) -> Result<AuthSession, TrackerError> {
        let Some(passcode) = &self.passcode else {
            return Ok(self.issue());
        };
        if bool::from(passcode.as_bytes().ct_eq(attempt.as_bytes())) {
            Ok(self.issue())
        } else {
            warn!("Rejected passcode attempt");
            Err(TrackerError::WrongPasscode)
        }
    }

    pub fn verify(&self, session: &AuthSession) -> Result<(), TrackerError> {
        if session.gate_id == self.id {
            debug!(
                "Session {} verified, issued at {}",
                session.id,
                session.issued_at.to_rfc3339()
            );
            Ok(())
        } else {
            Err(TrackerError::ForeignSession)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_gate_issues_sessions_freely() {
        for passcode in [None, Some(String::new())] {
            let gate = Gate::new(passcode);
            assert!(!gate.requires_passcode());
            let session = gate.open_session().unwrap();
            gate.verify(&session).unwrap();
            gate.verify(&gate.unlock("anything").unwrap()).unwrap();
        }
    }

    #[test]
    fn passcode_gate() {
        let gate = Gate::new(Some("squat140".into()));
        assert!(gate.requires_passcode());
        assert!(gate.open_session().is_none());

        assert!(matches!(gate.unlock("squat14"), Err(TrackerError::WrongPasscode)));
        assert!(matches!(gate.unlock(""), Err(TrackerError::WrongPasscode)));

        let session = gate.unlock("squat140").unwrap();
        assert!(session.issued_at <= Utc::now());
        gate.verify(&session).unwrap();
        assert_ne!(session.id(), gate.unlock("squat140").unwrap().id());
    }

    #[test]
    fn sessions_do_not_cross_gates() {
        let first = Gate::new(None);
        let second = Gate::new(None);
        let session = first.open_session().unwrap();
        assert!(matches!(
            second.verify(&session),
            Err(TrackerError::ForeignSession)
        ));
    }
}
