//! Pure continue/stop decision for the next search page.

use super::types::{
    PaginationConfig, PaginationDecision, PaginationState, PaginationStats, RecommendedAction,
    StopReason,
};

/// Below this success rate the criteria are probably too strict for the keyword.
const LOW_SUCCESS_RATE: f64 = 0.05;

/// Pages without a single admission before the keyword is considered dry.
const EMPTY_PAGE_LIMIT: u32 = 2;

/// Decide whether another page is worth its cost.
///
/// Stop conditions, first match wins: target reached, page budget spent,
/// no continuation token, repeated empty pages. Statistics are computed
/// regardless of the outcome. No I/O and no hidden state.
pub fn decide(state: &PaginationState, config: &PaginationConfig) -> PaginationDecision {
    let reason = if state.qualified_count >= config.target_results {
        StopReason::TargetAchieved
    } else if state.pages_searched >= config.max_pages {
        StopReason::MaxPagesReached
    } else if !state.has_next_token {
        StopReason::NoMorePagesAvailable
    } else if state.pages_searched >= EMPTY_PAGE_LIMIT && state.qualified_count == 0 {
        StopReason::ConsecutiveEmptyResults
    } else {
        StopReason::ContinueSearch {
            needed: config.target_results - state.qualified_count,
        }
    };

    PaginationDecision {
        should_continue: matches!(reason, StopReason::ContinueSearch { .. }),
        reason,
        stats: compute_stats(state, config),
    }
}

/// Efficiency figures for `state`, independent of the decision.
pub fn compute_stats(state: &PaginationState, config: &PaginationConfig) -> PaginationStats {
    let qualified = f64::from(state.qualified_count);
    let api_units_used = u64::from(state.pages_searched) * config.units_per_page();
    let target_achievement = qualified / f64::from(config.target_results.max(1));
    let success_rate = qualified / f64::from(state.raw_candidates.max(1));
    let efficiency = if api_units_used == 0 {
        0.0
    } else {
        qualified / api_units_used as f64
    };

    PaginationStats {
        api_units_used,
        target_achievement,
        target_achievement_pct: target_achievement * 100.0,
        success_rate,
        efficiency,
        average_results_per_page: qualified / f64::from(state.pages_searched.max(1)),
        recommended_action: recommend(state, config, success_rate),
    }
}

fn recommend(
    state: &PaginationState,
    config: &PaginationConfig,
    success_rate: f64,
) -> RecommendedAction {
    if state.qualified_count >= config.target_results {
        RecommendedAction::TargetMet
    } else if state.raw_candidates > 0 && success_rate < LOW_SUCCESS_RATE {
        RecommendedAction::RelaxCriteria
    } else if state.pages_searched >= config.max_pages {
        RecommendedAction::IncreasePageBudget
    } else if state.pages_searched > 0
        && (!state.has_next_token
            || (state.pages_searched >= EMPTY_PAGE_LIMIT && state.qualified_count == 0))
    {
        RecommendedAction::TryDifferentKeyword
    } else {
        RecommendedAction::ContinueSearching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(qualified: u32, pages: u32, raw: u32, token: bool) -> PaginationState {
        PaginationState {
            qualified_count: qualified,
            pages_searched: pages,
            raw_candidates: raw,
            has_next_token: token,
        }
    }

    #[test]
    fn test_continue_when_short_of_target() {
        // 45 raw candidates on page 1, 20 admitted.
        let decision = decide(&state(20, 1, 45, true), &PaginationConfig::new(40, 3));

        assert!(decision.should_continue);
        assert_eq!(decision.reason, StopReason::ContinueSearch { needed: 20 });
        assert_eq!(decision.reason.code(), "continue_search_need_20_more");
    }

    #[test]
    fn test_target_achieved() {
        let decision = decide(&state(42, 2, 90, true), &PaginationConfig::new(40, 3));

        assert!(!decision.should_continue);
        assert_eq!(decision.reason, StopReason::TargetAchieved);
        assert_eq!(decision.stats.recommended_action, RecommendedAction::TargetMet);
    }

    #[test]
    fn test_target_takes_precedence_over_page_cap() {
        let decision = decide(&state(40, 3, 150, false), &PaginationConfig::new(40, 3));
        assert_eq!(decision.reason, StopReason::TargetAchieved);
    }

    #[test]
    fn test_page_cap_takes_precedence_over_missing_token() {
        let decision = decide(&state(10, 3, 150, false), &PaginationConfig::new(40, 3));
        assert_eq!(decision.reason, StopReason::MaxPagesReached);
    }

    #[test]
    fn test_no_more_pages() {
        let decision = decide(&state(10, 1, 30, false), &PaginationConfig::new(40, 3));

        assert!(!decision.should_continue);
        assert_eq!(decision.reason, StopReason::NoMorePagesAvailable);
    }

    #[test]
    fn test_two_empty_pages_stop() {
        let decision = decide(&state(0, 2, 100, true), &PaginationConfig::new(40, 5));

        assert!(!decision.should_continue);
        assert_eq!(decision.reason, StopReason::ConsecutiveEmptyResults);
    }

    #[test]
    fn test_one_empty_page_continues() {
        let decision = decide(&state(0, 1, 50, true), &PaginationConfig::new(40, 5));
        assert!(decision.should_continue);
        assert_eq!(decision.reason, StopReason::ContinueSearch { needed: 40 });
    }

    #[test]
    fn test_decide_is_deterministic() {
        let s = state(7, 2, 80, true);
        let c = PaginationConfig::new(25, 4);
        assert_eq!(decide(&s, &c), decide(&s, &c));
    }

    #[test]
    fn test_stats() {
        let decision = decide(&state(20, 2, 80, true), &PaginationConfig::new(40, 3));
        let stats = decision.stats;

        assert_eq!(stats.api_units_used, 218);
        assert!((stats.target_achievement - 0.5).abs() < 1e-12);
        assert!((stats.target_achievement_pct - 50.0).abs() < 1e-9);
        assert!((stats.success_rate - 0.25).abs() < 1e-12);
        assert!((stats.efficiency - 20.0 / 218.0).abs() < 1e-12);
        assert!((stats.average_results_per_page - 10.0).abs() < 1e-12);
        assert_eq!(stats.recommended_action, RecommendedAction::ContinueSearching);
    }

    #[test]
    fn test_stats_before_any_page() {
        let stats = compute_stats(&PaginationState::default(), &PaginationConfig::default());

        assert_eq!(stats.api_units_used, 0);
        assert_eq!(stats.efficiency, 0.0);
        assert_eq!(stats.average_results_per_page, 0.0);
        assert_eq!(stats.recommended_action, RecommendedAction::ContinueSearching);
    }

    #[test]
    fn test_recommendations() {
        let config = PaginationConfig::new(40, 3);

        let low_yield = compute_stats(&state(1, 1, 50, true), &config);
        assert_eq!(low_yield.recommended_action, RecommendedAction::RelaxCriteria);

        let out_of_budget = compute_stats(&state(30, 3, 150, true), &config);
        assert_eq!(
            out_of_budget.recommended_action,
            RecommendedAction::IncreasePageBudget
        );

        let dry = compute_stats(&state(10, 1, 20, false), &config);
        assert_eq!(dry.recommended_action, RecommendedAction::TryDifferentKeyword);
    }
}
