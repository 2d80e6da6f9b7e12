//! Constraint module - time-bounded cost penalties on road segments
//!
//! A constraint models a temporary condition (road works, a closed lane, a
//! market day) that makes an edge more expensive to travel. Validity is a
//! computed property: rows are never deleted when they expire.

use serde::{Deserialize, Serialize};

/// Seconds in one day, used to turn `expiry_days` into an instant
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Longest accepted constraint lifetime (about a century)
pub const MAX_EXPIRY_DAYS: u32 = 36_500;

/// Absolute expiry instant for a constraint created at `created_at`
///
/// # Examples
///
/// ```
/// use wastegraph_domain::constraint::expiry_instant;
///
/// assert_eq!(expiry_instant(1_000, Some(1)), Some(87_400));
/// assert_eq!(expiry_instant(1_000, None), None);
/// ```
pub fn expiry_instant(created_at: u64, expiry_days: Option<u32>) -> Option<u64> {
    expiry_days.map(|days| created_at.saturating_add(u64::from(days) * SECONDS_PER_DAY))
}

/// A persisted constraint attached to an undirected node pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Store-assigned identifier
    pub id: i64,

    /// One endpoint of the constrained edge
    pub source: String,

    /// Other endpoint of the constrained edge
    pub target: String,

    /// Cost added to the edge while the constraint is valid
    pub constraint_value: f64,

    /// Manual on/off switch
    pub is_active: bool,

    /// Human-readable reason
    pub reason: Option<String>,

    /// Creation instant (Unix seconds)
    pub created_at: u64,

    /// Lifetime requested at creation
    pub expiry_days: Option<u32>,

    /// Absolute expiry instant (Unix seconds), fixed at creation
    pub expires_at: Option<u64>,
}

impl Constraint {
    /// Whether the constraint has passed its expiry instant at `now`
    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }

    /// Whether the constraint contributes to edge costs at `now`
    ///
    /// A constraint is valid when it is active and not expired.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Whether the constraint applies to the undirected pair `{a, b}`
    pub fn applies_to(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Request to create a constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConstraint {
    /// One endpoint of the constrained edge
    pub source: String,

    /// Other endpoint of the constrained edge
    pub target: String,

    /// Cost added to the edge while valid
    pub constraint_value: f64,

    /// Human-readable reason
    #[serde(default)]
    pub reason: Option<String>,

    /// Optional lifetime in days
    #[serde(default)]
    pub expiry_days: Option<u32>,
}

impl NewConstraint {
    /// Create a constraint request without reason or expiry
    pub fn new(source: impl Into<String>, target: impl Into<String>, constraint_value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            constraint_value,
            reason: None,
            expiry_days: None,
        }
    }

    /// Attach a reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a lifetime in days
    pub fn with_expiry_days(mut self, days: u32) -> Self {
        self.expiry_days = Some(days);
        self
    }

    /// Check field invariants
    ///
    /// # Errors
    /// Returns a description of the first violated invariant
    pub fn validate(&self) -> Result<(), String> {
        if self.source.is_empty() || self.target.is_empty() {
            return Err("Constraint endpoints cannot be empty".to_string());
        }
        if !self.constraint_value.is_finite() || self.constraint_value < 0.0 {
            return Err(format!(
                "Constraint value must be a non-negative number, got {}",
                self.constraint_value
            ));
        }
        match self.expiry_days {
            Some(0) => return Err("expiry_days must be at least 1".to_string()),
            Some(days) if days > MAX_EXPIRY_DAYS => {
                return Err(format!(
                    "expiry_days must be at most {}, got {}",
                    MAX_EXPIRY_DAYS, days
                ))
            }
            _ => {}
        }
        Ok(())
    }

    /// Materialize the constraint as created at `created_at`
    pub fn into_constraint(self, id: i64, created_at: u64) -> Constraint {
        Constraint {
            id,
            expires_at: expiry_instant(created_at, self.expiry_days),
            source: self.source,
            target: self.target,
            constraint_value: self.constraint_value,
            is_active: true,
            reason: self.reason,
            created_at,
            expiry_days: self.expiry_days,
        }
    }
}

/// Sum the values of the constraints valid at `now` for the pair `{a, b}`
pub fn valid_total<'a, I>(constraints: I, a: &str, b: &str, now: u64) -> f64
where
    I: IntoIterator<Item = &'a Constraint>,
{
    constraints
        .into_iter()
        .filter(|c| c.applies_to(a, b) && c.is_valid_at(now))
        .map(|c| c.constraint_value)
        .sum()
}
