//! Role-based access gates over a session snapshot.
//!
//! Pure functions: no I/O, no suspension. They read the snapshot taken
//! at login, so a role change takes effect once the session is
//! re-issued.

use warden_core::error::{WardenError, WardenResult};
use warden_core::models::account::Role;
use warden_core::models::session::SessionSnapshot;

/// True for `Admin` and `Administrator`.
pub fn is_privileged(snapshot: &SessionSnapshot) -> bool {
    matches!(snapshot.role, Role::Admin | Role::Administrator)
}

/// True only for `Administrator`, the top tier.
pub fn is_fully_privileged(snapshot: &SessionSnapshot) -> bool {
    snapshot.role == Role::Administrator
}

/// Named access levels a presentation layer can attach to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Any live session (e.g. the dashboard).
    Authenticated,
    /// Admin panel: `Admin` or `Administrator`.
    Privileged,
    /// Administrator-only area.
    FullyPrivileged,
}

impl Gate {
    pub fn permits(self, snapshot: &SessionSnapshot) -> bool {
        match self {
            Gate::Authenticated => true,
            Gate::Privileged => is_privileged(snapshot),
            Gate::FullyPrivileged => is_fully_privileged(snapshot),
        }
    }
}

/// Fail with `AuthorizationDenied` unless `gate` admits `snapshot`.
pub fn require(snapshot: &SessionSnapshot, gate: Gate) -> WardenResult<()> {
    if gate.permits(snapshot) {
        Ok(())
    } else {
        Err(WardenError::AuthorizationDenied {
            reason: format!("role '{}' does not pass {gate:?} gate", snapshot.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use warden_core::models::account::AccountStatus;

    use super::*;

    fn snapshot(role: Role) -> SessionSnapshot {
        SessionSnapshot {
            account_id: Default::default(),
            identity: "tester".into(),
            role,
            status: AccountStatus::Active,
        }
    }

    #[test]
    fn privileged_gate() {
        assert!(!is_privileged(&snapshot(Role::User)));
        assert!(is_privileged(&snapshot(Role::Admin)));
        assert!(is_privileged(&snapshot(Role::Administrator)));
    }

    #[test]
    fn fully_privileged_gate_is_exact_match() {
        assert!(!is_fully_privileged(&snapshot(Role::User)));
        assert!(!is_fully_privileged(&snapshot(Role::Admin)));
        assert!(is_fully_privileged(&snapshot(Role::Administrator)));
    }

    #[test]
    fn gates_are_nested() {
        for role in [Role::User, Role::Admin, Role::Administrator] {
            let snap = snapshot(role);
            if Gate::FullyPrivileged.permits(&snap) {
                assert!(Gate::Privileged.permits(&snap));
            }
            if Gate::Privileged.permits(&snap) {
                assert!(Gate::Authenticated.permits(&snap));
            }
        }
    }

    #[test]
    fn require_reports_denial() {
        assert!(require(&snapshot(Role::Administrator), Gate::FullyPrivileged).is_ok());

        let err = require(&snapshot(Role::Admin), Gate::FullyPrivileged).unwrap_err();
        match err {
            WardenError::AuthorizationDenied { reason } => assert!(reason.contains("admin")),
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }
}
