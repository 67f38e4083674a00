// ═══════════════════════════════════════════════════════════════════
// Transaction Builder Tests — input validation, event construction,
// facade recording paths, dirty tracking
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use fee_ledger_core::errors::LedgerError;
use fee_ledger_core::models::event::{EventKind, TradeEvent, ADJUST_CODE, SETTLEMENT_CODE};
use fee_ledger_core::services::transaction_service::TransactionService;
use fee_ledger_core::FeeLedger;

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn empty_code_is_rejected() {
        let svc = TransactionService::new();
        let err = svc
            .build_buy(make_date(2025, 1, 10), "", None, 100, 1000.0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn whitespace_only_code_is_rejected() {
        let svc = TransactionService::new();
        let err = svc
            .build_sell(make_date(2025, 1, 10), "   ", 100, 1000.0, false)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let svc = TransactionService::new();
        let err = svc
            .build_buy(make_date(2025, 1, 10), "7203", None, 0, 1000.0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let svc = TransactionService::new();
        let err = svc
            .build_buy(make_date(2025, 1, 10), "7203", None, 100, -1.0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let svc = TransactionService::new();
        assert!(svc
            .build_buy(make_date(2025, 1, 10), "7203", None, 100, f64::NAN)
            .is_err());
        assert!(svc
            .build_sell(make_date(2025, 1, 10), "7203", 100, f64::INFINITY, false)
            .is_err());
    }

    #[test]
    fn zero_price_is_allowed() {
        // Gifted/transferred shares enter at zero cost
        let svc = TransactionService::new();
        let event = svc
            .build_buy(make_date(2025, 1, 10), "7203", None, 100, 0.0)
            .unwrap();
        assert_eq!(event.unit_price, 0.0);
    }

    #[test]
    fn code_is_trimmed_on_the_built_event() {
        let svc = TransactionService::new();
        let event = svc
            .build_buy(make_date(2025, 1, 10), "  7203  ", None, 100, 1000.0)
            .unwrap();
        assert_eq!(event.code, "7203");
    }

    #[test]
    fn non_finite_adjustment_is_rejected() {
        let svc = TransactionService::new();
        assert!(svc
            .build_adjustment(make_date(2025, 1, 1), f64::NAN)
            .is_err());
    }

    #[test]
    fn negative_adjustment_is_allowed() {
        let svc = TransactionService::new();
        let event = svc
            .build_adjustment(make_date(2025, 1, 1), -2_150_000.0)
            .unwrap();
        assert_eq!(event.kind, EventKind::Adjust);
        assert_eq!(event.code, ADJUST_CODE);
        assert_eq!(event.realized_pl, -2_150_000.0);
        assert_eq!(event.quantity, 0);
    }

    #[test]
    fn settlement_requires_positive_profit() {
        let svc = TransactionService::new();
        assert!(svc
            .build_settlement(make_date(2025, 3, 1), 0.0, false)
            .is_err());
        assert!(svc
            .build_settlement(make_date(2025, 3, 1), -100.0, false)
            .is_err());
    }

    #[test]
    fn settlement_stores_the_negated_profit() {
        let svc = TransactionService::new();
        let event = svc
            .build_settlement(make_date(2025, 3, 1), 100_000.0, true)
            .unwrap();
        assert_eq!(event.kind, EventKind::SettleFee);
        assert_eq!(event.code, SETTLEMENT_CODE);
        assert_eq!(event.realized_pl, -100_000.0);
        assert!(event.is_bonus);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Facade recording paths
// ═══════════════════════════════════════════════════════════════════

mod recording {
    use super::*;

    #[test]
    fn new_ledger_is_empty_and_clean() {
        let ledger = FeeLedger::create_new();
        assert_eq!(ledger.event_count(), 0);
        assert!(ledger.holdings().is_empty());
        assert!(!ledger.has_unsaved_changes());
    }

    #[test]
    fn recording_marks_the_ledger_dirty() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 100, 1000.0)
            .unwrap();
        assert!(ledger.has_unsaved_changes());
        assert_eq!(ledger.event_count(), 1);
    }

    #[test]
    fn rejected_input_leaves_the_ledger_untouched() {
        let mut ledger = FeeLedger::create_new();
        assert!(ledger
            .record_buy(make_date(2025, 1, 10), "", None, 100, 1000.0)
            .is_err());
        assert_eq!(ledger.event_count(), 0);
        assert!(!ledger.has_unsaved_changes());
    }

    #[test]
    fn recording_replays_immediately() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(
                make_date(2025, 1, 10),
                "7203",
                Some("Toyota Motor".into()),
                100,
                1000.0,
            )
            .unwrap();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 40, 1100.0, false)
            .unwrap();

        let h = ledger.holding("7203").unwrap();
        assert_eq!(h.name, "Toyota Motor");
        assert_eq!(h.quantity, 60);
        assert_eq!(h.realized_pl, 4_000.0);
    }

    #[test]
    fn from_events_replays_and_stays_clean() {
        let events = vec![
            TradeEvent::buy(make_date(2025, 1, 10), "7203", "", 100, 1000.0),
            TradeEvent::sell(make_date(2025, 2, 1), "7203", 50, 1200.0, false),
        ];
        let ledger = FeeLedger::from_events(events);

        assert_eq!(ledger.event_count(), 2);
        assert_eq!(ledger.holding("7203").unwrap().quantity, 50);
        assert!(!ledger.has_unsaved_changes());
    }

    #[test]
    fn replace_events_marks_dirty() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 100, 1000.0)
            .unwrap();
        // Pretend we just saved
        let events = ledger.events().to_vec();
        let mut ledger = FeeLedger::from_events(events.clone());
        assert!(!ledger.has_unsaved_changes());

        ledger.replace_events(Vec::new());
        assert!(ledger.has_unsaved_changes());
        assert_eq!(ledger.event_count(), 0);
        assert!(ledger.holdings().is_empty());
    }

    #[test]
    fn events_for_filters_by_trimmed_code() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 100, 1000.0)
            .unwrap();
        ledger
            .record_buy(make_date(2025, 1, 11), "9984", None, 100, 7000.0)
            .unwrap();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 50, 1100.0, false)
            .unwrap();

        let toyota = ledger.events_for(" 7203 ");
        assert_eq!(toyota.len(), 2);
        assert!(toyota.iter().all(|e| e.code == "7203"));
    }

    #[test]
    fn sold_out_positions_drop_off_the_active_view() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 100, 1000.0)
            .unwrap();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 100, 1100.0, false)
            .unwrap();

        // History stays; the active view is empty
        assert!(ledger.holdings().contains_key("7203"));
        assert!(ledger.active_holdings().is_empty());
        assert_eq!(ledger.holding("7203").unwrap().realized_pl, 10_000.0);
    }

    #[test]
    fn orphan_sells_are_surfaced_without_blocking() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 50, 1300.0, false)
            .unwrap();

        let orphans = ledger.orphan_sells();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].code, "7203");
        assert_eq!(ledger.event_count(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Bonus-conversion planning through the facade
// ═══════════════════════════════════════════════════════════════════

mod bonus_planning {
    use super::*;

    #[test]
    fn plan_for_unknown_code_is_none() {
        let ledger = FeeLedger::create_new();
        assert!(ledger.bonus_plan("7203").is_none());
    }

    #[test]
    fn plan_rows_cover_the_default_uplift_steps() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 1000, 1000.0)
            .unwrap();

        let plan = ledger.bonus_plan("7203").unwrap();
        assert_eq!(plan.len(), 12);
        // At +0%: sell everything to recover cost; nothing remains
        assert_eq!(plan[0].uplift_pct, 0);
        assert_eq!(plan[0].shares_to_sell, 1000);
        assert_eq!(plan[0].remaining_shares, Some(0));
        // At +100%: half the shares (rounded to a lot) recover the cost
        let doubled = plan.iter().find(|r| r.uplift_pct == 100).unwrap();
        assert_eq!(doubled.target_price, 2000.0);
        assert_eq!(doubled.shares_to_sell, 500);
        assert_eq!(doubled.remaining_shares, Some(500));
    }

    #[test]
    fn plan_is_empty_once_cost_is_recovered() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 200, 1000.0)
            .unwrap();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 100, 2500.0, true)
            .unwrap();

        // Bonus-converted: avg 0, nothing left to recover
        let plan = ledger.bonus_plan("7203").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn realized_gains_shrink_the_required_sale() {
        let mut ledger = FeeLedger::create_new();
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 1000, 1000.0)
            .unwrap();
        // Realize 200_000 of the 1_000_000 cost through a plain sell
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 200, 2000.0, false)
            .unwrap();

        let plan = ledger.bonus_plan("7203").unwrap();
        // Remaining cost = 800*1000 - 200_000 = 600_000; at +0% that is
        // 600 shares out of the 800 still held
        assert_eq!(plan[0].shares_to_sell, 600);
        assert_eq!(plan[0].remaining_shares, Some(200));
    }

    #[test]
    fn infeasible_rows_are_flagged_not_hidden() {
        let mut ledger = FeeLedger::create_new();
        // 100 shares cannot recover their own cost below +0% + lot rounding
        ledger
            .record_buy(make_date(2025, 1, 10), "7203", None, 100, 1000.0)
            .unwrap();
        ledger
            .record_sell(make_date(2025, 2, 1), "7203", 50, 500.0, false)
            .unwrap();

        let plan = ledger.bonus_plan("7203").unwrap();
        // Remaining cost 50*1000 - (-25_000) = 75_000; at +0% that needs a
        // full lot of 100 but only 50 shares are held
        assert_eq!(plan[0].shares_to_sell, 100);
        assert_eq!(plan[0].remaining_shares, None);
        assert!(!plan[0].is_feasible());
    }
}
