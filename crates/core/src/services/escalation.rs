//! Escalation rules for moderation sanctions.
//!
//! Pure transitions over an explicit [`ScoreState`] value; callers own
//! persistence. The transitions drive the karma ledger with the matching
//! penalty action, so all magnitudes come from the single action table.

use chrono::{DateTime, Duration, Utc};

use super::karma::{self, KarmaAction};

/// Warning count at which the next warning becomes a ban.
pub const AUTO_BAN_WARNING_COUNT: i32 = 3;

/// The moderation-relevant fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    /// Reputation score, floor 0.
    pub karma_points: i32,
    /// Accumulated warnings. Reset only by unban.
    pub warnings: i32,
    /// Banned flag. Ban takes precedence over suspension for access
    /// control; both fields persist independently.
    pub banned: bool,
    /// End of the current suspension, if any.
    pub suspended_until: Option<DateTime<Utc>>,
}

/// Account standing as observed at a point in time.
///
/// Suspension expiry is a read-time check; nothing transitions the
/// stored state when `suspended_until` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStanding {
    /// No active sanction.
    Active,
    /// Carrying warnings but not suspended or banned.
    Warned(i32),
    /// Suspended until the contained instant.
    Suspended(DateTime<Utc>),
    /// Banned until explicitly lifted.
    Banned,
}

impl ScoreState {
    /// Whether the user is currently suspended.
    #[must_use]
    pub fn is_suspended(&self, now: DateTime<Utc>) -> bool {
        self.suspended_until.is_some_and(|until| until > now)
    }

    /// Current standing, with ban taking precedence over suspension.
    #[must_use]
    pub fn standing(&self, now: DateTime<Utc>) -> AccountStanding {
        if self.banned {
            AccountStanding::Banned
        } else if let Some(until) = self.suspended_until.filter(|until| *until > now) {
            AccountStanding::Suspended(until)
        } else if self.warnings > 0 {
            AccountStanding::Warned(self.warnings)
        } else {
            AccountStanding::Active
        }
    }
}

/// Result of a punitive transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanction {
    /// The state after the transition.
    pub state: ScoreState,
    /// Nominal delta from the action table. The score itself is clamped
    /// at zero, so the realized change can be smaller.
    pub karma_delta: i32,
    /// Whether a warning escalated into an automatic ban.
    pub auto_banned: bool,
}

/// Record a warning.
///
/// The warning that reaches [`AUTO_BAN_WARNING_COUNT`] converts to a
/// ban: the counter still increments for audit, but the karma deduction
/// applied is the ban magnitude, not the warning magnitude layered on
/// top of it.
#[must_use]
pub fn warn(state: &ScoreState) -> Sanction {
    let warnings = state.warnings + 1;
    let auto_banned = warnings >= AUTO_BAN_WARNING_COUNT;

    let action = if auto_banned {
        KarmaAction::Ban
    } else {
        KarmaAction::Warning
    };

    Sanction {
        state: ScoreState {
            karma_points: karma::apply(state.karma_points, &action),
            warnings,
            banned: state.banned || auto_banned,
            suspended_until: state.suspended_until,
        },
        karma_delta: action.delta(),
        auto_banned,
    }
}

/// Suspend for `days` days from `now`.
///
/// Does not touch the warning counter. Suspending an already-suspended
/// user overwrites `suspended_until` and deducts again.
#[must_use]
pub fn suspend(state: &ScoreState, days: u32, now: DateTime<Utc>) -> Sanction {
    let action = KarmaAction::Suspension { days };

    Sanction {
        state: ScoreState {
            karma_points: karma::apply(state.karma_points, &action),
            warnings: state.warnings,
            banned: state.banned,
            suspended_until: Some(now + Duration::days(i64::from(days))),
        },
        karma_delta: action.delta(),
        auto_banned: false,
    }
}

/// Ban explicitly, independent of the warning count.
///
/// Banning an already-banned user re-applies the penalty.
#[must_use]
pub fn ban(state: &ScoreState) -> Sanction {
    let action = KarmaAction::Ban;

    Sanction {
        state: ScoreState {
            karma_points: karma::apply(state.karma_points, &action),
            warnings: state.warnings,
            banned: true,
            suspended_until: state.suspended_until,
        },
        karma_delta: action.delta(),
        auto_banned: false,
    }
}

/// Lift a ban: clears the flag, resets warnings, clears any suspension.
/// Karma is not restored.
#[must_use]
pub fn unban(state: &ScoreState) -> ScoreState {
    ScoreState {
        karma_points: state.karma_points,
        warnings: 0,
        banned: false,
        suspended_until: None,
    }
}

/// Lift a suspension early. Warnings and the ban flag are untouched;
/// karma is not restored.
#[must_use]
pub fn unsuspend(state: &ScoreState) -> ScoreState {
    ScoreState {
        suspended_until: None,
        ..*state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ScoreState {
        ScoreState::default()
    }

    #[test]
    fn test_warn_increments_and_deducts() {
        let state = ScoreState {
            karma_points: 100,
            ..fresh()
        };

        let outcome = warn(&state);

        assert_eq!(outcome.state.warnings, 1);
        assert_eq!(outcome.state.karma_points, 85);
        assert_eq!(outcome.karma_delta, -15);
        assert!(!outcome.auto_banned);
        assert!(!outcome.state.banned);
    }

    #[test]
    fn test_third_warning_becomes_ban() {
        let mut state = ScoreState {
            karma_points: 100,
            ..fresh()
        };

        let first = warn(&state);
        state = first.state;
        let second = warn(&state);
        state = second.state;
        assert!(!second.auto_banned);
        assert_eq!(state.karma_points, 70);

        let third = warn(&state);

        assert!(third.auto_banned);
        assert!(third.state.banned);
        // Counter still reaches 3 for audit purposes
        assert_eq!(third.state.warnings, 3);
        // The third strike costs the ban magnitude, not the warning one
        assert_eq!(third.karma_delta, -50);
        assert_eq!(third.state.karma_points, 20);
    }

    #[test]
    fn test_warn_clamps_karma_at_zero() {
        let state = ScoreState {
            karma_points: 10,
            ..fresh()
        };

        let outcome = warn(&state);

        assert_eq!(outcome.state.karma_points, 0);
    }

    #[test]
    fn test_suspend_sets_deadline_and_keeps_warnings() {
        let now = Utc::now();
        let state = ScoreState {
            karma_points: 50,
            warnings: 2,
            ..fresh()
        };

        let outcome = suspend(&state, 7, now);

        assert_eq!(outcome.state.warnings, 2);
        assert_eq!(outcome.state.karma_points, 30);
        assert_eq!(outcome.karma_delta, -20);
        assert_eq!(outcome.state.suspended_until, Some(now + Duration::days(7)));
    }

    #[test]
    fn test_suspend_tier_deductions() {
        let now = Utc::now();
        let state = ScoreState {
            karma_points: 100,
            ..fresh()
        };

        assert_eq!(suspend(&state, 3, now).state.karma_points, 90);
        assert_eq!(suspend(&state, 7, now).state.karma_points, 80);
        assert_eq!(suspend(&state, 30, now).state.karma_points, 70);
        assert_eq!(suspend(&state, 31, now).state.karma_points, 60);
    }

    #[test]
    fn test_resuspend_overwrites_deadline_and_deducts_again() {
        let now = Utc::now();
        let state = ScoreState {
            karma_points: 100,
            ..fresh()
        };

        let first = suspend(&state, 3, now);
        let later = now + Duration::days(1);
        let second = suspend(&first.state, 30, later);

        assert_eq!(
            second.state.suspended_until,
            Some(later + Duration::days(30))
        );
        assert_eq!(second.state.karma_points, 60);
    }

    #[test]
    fn test_explicit_ban_ignores_warning_count() {
        let state = ScoreState {
            karma_points: 60,
            warnings: 1,
            ..fresh()
        };

        let outcome = ban(&state);

        assert!(outcome.state.banned);
        assert_eq!(outcome.state.warnings, 1);
        assert_eq!(outcome.state.karma_points, 10);
        assert!(!outcome.auto_banned);
    }

    #[test]
    fn test_reban_applies_penalty_again() {
        let state = ScoreState {
            karma_points: 120,
            banned: true,
            ..fresh()
        };

        let outcome = ban(&state);

        assert!(outcome.state.banned);
        assert_eq!(outcome.state.karma_points, 70);
    }

    #[test]
    fn test_unban_resets_warnings_and_suspension() {
        let state = ScoreState {
            karma_points: 5,
            warnings: 3,
            banned: true,
            suspended_until: Some(Utc::now() + Duration::days(10)),
        };

        let cleared = unban(&state);

        assert!(!cleared.banned);
        assert_eq!(cleared.warnings, 0);
        assert_eq!(cleared.suspended_until, None);
        // Karma is not restored
        assert_eq!(cleared.karma_points, 5);
    }

    #[test]
    fn test_unban_resets_warnings_even_without_ban() {
        // Two warnings then an unban: counter drops to zero even though
        // no ban had occurred.
        let mut state = ScoreState {
            karma_points: 100,
            ..fresh()
        };
        state = warn(&state).state;
        state = warn(&state).state;
        assert_eq!(state.warnings, 2);

        let cleared = unban(&state);

        assert_eq!(cleared.warnings, 0);
        assert!(!cleared.banned);
    }

    #[test]
    fn test_unsuspend_touches_only_the_deadline() {
        let state = ScoreState {
            karma_points: 40,
            warnings: 2,
            banned: false,
            suspended_until: Some(Utc::now() + Duration::days(3)),
        };

        let cleared = unsuspend(&state);

        assert_eq!(cleared.suspended_until, None);
        assert_eq!(cleared.warnings, 2);
        assert_eq!(cleared.karma_points, 40);
    }

    #[test]
    fn test_standing_precedence() {
        let now = Utc::now();
        let until = now + Duration::days(2);

        assert_eq!(fresh().standing(now), AccountStanding::Active);
        assert_eq!(
            ScoreState {
                warnings: 2,
                ..fresh()
            }
            .standing(now),
            AccountStanding::Warned(2)
        );
        assert_eq!(
            ScoreState {
                suspended_until: Some(until),
                ..fresh()
            }
            .standing(now),
            AccountStanding::Suspended(until)
        );
        // Ban wins over a live suspension
        assert_eq!(
            ScoreState {
                banned: true,
                suspended_until: Some(until),
                ..fresh()
            }
            .standing(now),
            AccountStanding::Banned
        );
    }

    #[test]
    fn test_expired_suspension_reads_as_active() {
        let now = Utc::now();
        let state = ScoreState {
            suspended_until: Some(now - Duration::days(1)),
            ..fresh()
        };

        assert!(!state.is_suspended(now));
        assert_eq!(state.standing(now), AccountStanding::Active);
    }
}
