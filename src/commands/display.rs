//! Plain-text rendering of locks, views and outcomes.

use crate::lock::Lock;
use crate::manager::{LimitReport, LockView, Outcome, Usage};
use crate::policy::Grant;

/// One line per lock, as used by `list`.
pub fn lock_line(lock: &Lock) -> String {
    let mut line = format!(
        "{:<16} {:<15} {:<24} {}",
        lock.name(),
        lock.lock_type().as_str(),
        lock.location().to_string(),
        lock.owner()
    );
    if !lock.access_list().is_empty() {
        line.push_str(&format!(" (+{} members)", lock.access_list().len()));
    }
    line
}

pub fn view_lines(view: &LockView) -> Vec<String> {
    let mut lines = vec![
        format!("Lock:       {} [{}]", view.name, view.lock_type),
        format!("Location:   {}", view.location),
        format!("Object:     {}", view.object),
        format!("Owner:      {}", view.owner),
        format!(
            "Redstone:   {}",
            if view.protect_from_redstone {
                "blocked"
            } else {
                "allowed"
            }
        ),
        format!(
            "Created:    {}",
            view.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!(
            "Accessed:   {}",
            view.last_accessed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];
    if let Some(members) = &view.access_list {
        let members = if members.is_empty() {
            "(none)".to_string()
        } else {
            members
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("Access:     {}", members));
    }
    lines
}

fn usage_text(usage: &Usage) -> String {
    match usage.limit {
        Some(limit) => format!("{}/{}", usage.used, limit),
        None => format!("{}/unlimited", usage.used),
    }
}

pub fn limit_lines(report: &LimitReport) -> Vec<String> {
    let mut lines = vec![format!("Limits for {}", report.owner)];
    lines.push(format!("  {:<15} {}", "total", usage_text(&report.total)));
    for (lock_type, usage) in &report.per_type {
        lines.push(format!("  {:<15} {}", lock_type.as_str(), usage_text(usage)));
    }
    lines
}

fn grant_text(grant: Grant) -> &'static str {
    match grant {
        Grant::Bypass => "bypass",
        Grant::Owner => "owner",
        Grant::Member => "member",
        Grant::Public => "donation",
        Grant::Password => "password",
        Grant::FirstUnlock => "password, remembered",
        Grant::Remembered => "remembered",
    }
}

/// Lines describing a world interaction.
pub fn outcome_lines(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Unprotected => vec!["nothing is locked here".to_string()],
        Outcome::Entered(grant) => vec![format!("opened ({})", grant_text(*grant))],
        Outcome::Created(lock) => vec![format!(
            "created {} lock '{}' at {}",
            lock.lock_type(),
            lock.name(),
            lock.location()
        )],
        Outcome::Changed(lock) => vec![format!("updated lock '{}'", lock.name())],
        Outcome::Deleted(lock) => vec![format!("removed lock '{}'", lock.name())],
        Outcome::Unlocked { lock, grant } => vec![format!(
            "unlocked '{}' ({})",
            lock.name(),
            grant_text(*grant)
        )],
        Outcome::Displayed(view) => view_lines(view),
        Outcome::Denied(err) => vec![format!("denied: {}", err)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LatchError;
    use crate::lock::LockType;
    use crate::test_support::{actor, loc};

    #[test]
    fn view_shows_members_only_when_present() {
        let mut lock = Lock::new(actor("alice"), loc(1), "chest", LockType::Private, "Stash");
        lock.grant_access(&actor("bob"));

        let with_acl = view_lines(&LockView::of(&lock, true));
        assert!(with_acl.iter().any(|l| l == "Access:     bob"));

        let without = view_lines(&LockView::of(&lock, false));
        assert!(!without.iter().any(|l| l.starts_with("Access:")));
        assert_eq!(without[0], "Lock:       Stash [private]");
    }

    #[test]
    fn denial_outcome_carries_message() {
        let lines = outcome_lines(&Outcome::Denied(LatchError::WrongPassword));
        assert_eq!(lines, ["denied: the password is incorrect"]);
    }
}
