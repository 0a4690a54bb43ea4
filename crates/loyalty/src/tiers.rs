//! Pure balance → tier resolution against the configured threshold table.
//!
//! One generic walk of the table; no per-tier branches. Adding a fifth
//! tier is a configuration change, not a code change here.

use studio_core::loyalty::{TierStanding, TierThreshold};

/// Resolve a balance to its tier and the distance to the next tier's
/// floor. Total over all of `i64` and side-effect free.
///
/// `thresholds` must be sorted ascending by `min_points` with the lowest
/// floor at `0` (see `LoyaltyConfig::thresholds`). The walk goes from the
/// highest floor down; the first floor at or below the balance wins. A
/// negative balance matches no floor and falls back to the lowest tier,
/// so a client in deficit is bronze with `points_to_next` larger than
/// silver's nominal floor.
pub fn resolve_tier(thresholds: &[TierThreshold], balance: i64) -> TierStanding {
    let index = thresholds
        .iter()
        .rposition(|t| t.min_points <= balance)
        .unwrap_or(0);

    // Saturating: a deficit near i64::MIN must still resolve, not wrap.
    let points_to_next = thresholds
        .get(index + 1)
        .map(|next| next.min_points.saturating_sub(balance))
        .unwrap_or(0);

    TierStanding {
        tier: thresholds[index].tier,
        points_to_next,
    }
}

/// Progress through the current tier band as a percentage, clamped to
/// [0, 100] for the leaderboard progress bar. The top tier has no
/// ceiling and always reads 100.
pub fn progress_percent(thresholds: &[TierThreshold], balance: i64) -> u8 {
    let index = thresholds
        .iter()
        .rposition(|t| t.min_points <= balance)
        .unwrap_or(0);

    let Some(next) = thresholds.get(index + 1) else {
        return 100;
    };

    let floor = thresholds[index].min_points;
    let span = next.min_points - floor;
    let into_band = balance.saturating_sub(floor).max(0);

    ((into_band * 100) / span).clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::config::LoyaltyConfig;
    use studio_core::loyalty::Tier;

    fn table() -> Vec<TierThreshold> {
        LoyaltyConfig::default().thresholds()
    }

    #[test]
    fn test_resolve_at_floors_and_between() {
        let table = table();

        assert_eq!(resolve_tier(&table, 0).tier, Tier::Bronze);
        assert_eq!(resolve_tier(&table, 299).tier, Tier::Bronze);
        assert_eq!(resolve_tier(&table, 300).tier, Tier::Silver);
        assert_eq!(resolve_tier(&table, 699).tier, Tier::Silver);
        assert_eq!(resolve_tier(&table, 700).tier, Tier::Gold);
        assert_eq!(resolve_tier(&table, 1499).tier, Tier::Gold);
        assert_eq!(resolve_tier(&table, 1500).tier, Tier::Platinum);
        assert_eq!(resolve_tier(&table, 1_000_000).tier, Tier::Platinum);
    }

    #[test]
    fn test_points_to_next() {
        let table = table();

        assert_eq!(resolve_tier(&table, 0).points_to_next, 300);
        assert_eq!(resolve_tier(&table, 450).points_to_next, 250);
        assert_eq!(resolve_tier(&table, 700).points_to_next, 800);
        // No ceiling at the top tier.
        assert_eq!(resolve_tier(&table, 2000).points_to_next, 0);
    }

    #[test]
    fn test_negative_balance_is_bronze_in_deficit() {
        let table = table();

        let standing = resolve_tier(&table, -120);
        assert_eq!(standing.tier, Tier::Bronze);
        assert_eq!(standing.points_to_next, 420);
    }

    #[test]
    fn test_total_and_monotonic_over_wide_range() {
        let table = table();
        let mut last = resolve_tier(&table, -10_000).tier;

        for balance in (-10_000..=10_000).step_by(37) {
            let tier = resolve_tier(&table, balance).tier;
            assert!(tier >= last, "tier regressed at balance {balance}");
            last = tier;
        }
        // Extremes still resolve.
        assert_eq!(resolve_tier(&table, i64::MIN).tier, Tier::Bronze);
        assert_eq!(resolve_tier(&table, i64::MAX).tier, Tier::Platinum);
    }

    #[test]
    fn test_progress_percent_clamped() {
        let table = table();

        assert_eq!(progress_percent(&table, 0), 0);
        assert_eq!(progress_percent(&table, 150), 50);
        assert_eq!(progress_percent(&table, 299), 99);
        assert_eq!(progress_percent(&table, 300), 0);
        assert_eq!(progress_percent(&table, -500), 0);
        assert_eq!(progress_percent(&table, 1500), 100);
        assert_eq!(progress_percent(&table, 99_999), 100);
    }

    #[test]
    fn test_fifth_tier_needs_no_resolver_change() {
        let mut table = table();
        table.push(TierThreshold {
            tier: Tier::Platinum,
            min_points: 5000,
        });

        // The extra row participates in resolution untouched.
        assert_eq!(resolve_tier(&table, 4999).points_to_next, 1);
        assert_eq!(resolve_tier(&table, 5000).points_to_next, 0);
    }
}
