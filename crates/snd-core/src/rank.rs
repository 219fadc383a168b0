//! Rank ordering
//!
//! Rank descriptors are free-form strings such as `"GOLD III 42LP"`,
//! `"CHALLENGER I 512LP"` or the `"UNRANKED"` sentinel. This module maps the
//! tier part onto an integer key (lower = more prestigious) and answers the
//! single question the history engine needs: *is `x` strictly better than
//! `y`?*
//!
//! ```text
//! CHALLENGER I  -> 0
//! MASTER I      -> 1
//! DIAMOND I..V  -> 2..6
//! PLATINUM I..V -> 7..11
//! GOLD I..V     -> 12..16
//! SILVER I..V   -> 17..21
//! BRONZE I..V   -> 22..26
//! UNRANKED      -> 27
//! anything else -> UNKNOWN_TIER_KEY
//! ```
//!
//! [`is_higher`] is an *improvement* predicate, not a total order: when two
//! descriptors share a tier and LP, neither is higher than the other. It is
//! deliberately not exposed as `Ord`.

use regex::Regex;
use std::sync::LazyLock;

/// Sentinel descriptor for an account without a solo queue rank
pub const UNRANKED: &str = "UNRANKED";

/// Tiers that have five divisions, most prestigious first
const DIVIDED_TIERS: [&str; 5] = ["DIAMOND", "PLATINUM", "GOLD", "SILVER", "BRONZE"];

/// Divisions within a tier, best first
const DIVISIONS: [&str; 5] = ["I", "II", "III", "IV", "V"];

/// Key of the first divided tier (after CHALLENGER I and MASTER I)
const FIRST_DIVIDED_KEY: u32 = 2;

/// Key of the `UNRANKED` sentinel, one past the worst divided tier
pub const UNRANKED_KEY: u32 = FIRST_DIVIDED_KEY + (DIVIDED_TIERS.len() * DIVISIONS.len()) as u32;

/// Key for any tier token that is not in the table
pub const UNKNOWN_TIER_KEY: u32 = 9999;

static RANK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<tier>[a-zA-Z]+\s?[IV]+)?\s?(?P<lp>-?[0-9]+)?(?:LP)?")
        .expect("rank pattern is valid")
});

/// Ordering key of a tier token such as `"GOLD III"`
///
/// Returns `None` for tokens outside the table.
pub fn tier_key(tier: &str) -> Option<u32> {
    match tier {
        "CHALLENGER I" => return Some(0),
        "MASTER I" => return Some(1),
        UNRANKED => return Some(UNRANKED_KEY),
        _ => {}
    }

    let (name, division) = tier.split_once(' ')?;
    let tier_index = DIVIDED_TIERS.iter().position(|t| *t == name)?;
    let division_index = DIVISIONS.iter().position(|d| *d == division)?;
    Some(FIRST_DIVIDED_KEY + (tier_index * DIVISIONS.len() + division_index) as u32)
}

/// A parsed rank descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankDescriptor {
    /// Tier token, e.g. `"GOLD III"`, if one was recognised syntactically
    pub tier: Option<String>,
    /// League points, if present
    pub lp: Option<i64>,
}

impl RankDescriptor {
    /// Parse a free-form rank string
    ///
    /// Parsing never fails: malformed input yields a descriptor without a
    /// tier (and therefore an unknown ordering key).
    pub fn parse(input: &str) -> Self {
        if input.trim() == UNRANKED {
            return Self {
                tier: Some(UNRANKED.to_string()),
                lp: None,
            };
        }

        let Some(caps) = RANK_PATTERN.captures(input) else {
            return Self { tier: None, lp: None };
        };

        Self {
            tier: caps.name("tier").map(|m| m.as_str().to_string()),
            lp: caps.name("lp").and_then(|m| m.as_str().parse().ok()),
        }
    }

    /// Ordering key of this descriptor's tier (lower is better)
    pub fn ordering_key(&self) -> u32 {
        self.tier
            .as_deref()
            .and_then(tier_key)
            .unwrap_or(UNKNOWN_TIER_KEY)
    }

    /// League points, absent counting as zero
    pub fn points(&self) -> i64 {
        self.lp.unwrap_or(0)
    }
}

/// Returns true iff rank descriptor `x` strictly outranks `y`
///
/// Different tiers compare by ordering key; equal tiers compare by LP.
/// Equal LP is not an improvement, so `is_higher(a, b)` and
/// `is_higher(b, a)` can both be false.
pub fn is_higher(x: &str, y: &str) -> bool {
    let x = RankDescriptor::parse(x);
    let y = RankDescriptor::parse(y);

    if x.tier != y.tier {
        x.ordering_key() < y.ordering_key()
    } else {
        x.points() > y.points()
    }
}
