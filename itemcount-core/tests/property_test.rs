//! Property tests for the eligibility evaluator and the settings codec

use proptest::prelude::*;

use itemcount_core::domain::configuration::{format_id_list, parse_id_list};
use itemcount_core::domain::{evaluate, CartLine, EvaluationContext, RuleConfiguration, UnsatisfiedReason};

fn cart_line() -> impl Strategy<Value = CartLine> {
    (1i64..50, 0i32..20).prop_map(|(product_id, quantity)| CartLine::new(product_id, quantity))
}

fn cart() -> impl Strategy<Value = Vec<CartLine>> {
    prop::collection::vec(cart_line(), 1..12)
}

fn context(currency: i64, lines: Vec<CartLine>) -> EvaluationContext {
    EvaluationContext::new(42, currency, lines)
}

proptest! {
    #[test]
    fn unconstrained_accepts_any_non_empty_cart(lines in cart(), currency in 1i64..10) {
        let config = RuleConfiguration::unconstrained(1);
        prop_assert!(evaluate(&config, &context(currency, lines)).is_satisfied);
    }

    #[test]
    fn unmatched_product_filter_rejects(lines in cart()) {
        // Cart products are all below 50
        let config = RuleConfiguration::unconstrained(1).with_product_ids([100, 200]);
        let verdict = evaluate(&config, &context(1, lines));
        prop_assert!(!verdict.is_satisfied);
        prop_assert_eq!(verdict.reason, Some(UnsatisfiedReason::NoEligibleLines));
    }

    #[test]
    fn evaluation_is_idempotent(
        lines in cart(),
        products in prop::collection::btree_set(1i64..50, 0..5),
        min in -2i32..30,
        max in -2i32..30,
    ) {
        let config = RuleConfiguration::unconstrained(1)
            .with_product_ids(products)
            .with_quantity_range(min, max);
        let ctx = context(1, lines);
        prop_assert_eq!(evaluate(&config, &ctx), evaluate(&config, &ctx));
    }

    #[test]
    fn bounds_are_inclusive(lines in cart()) {
        let total: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();
        prop_assume!(total > 0);
        let total = total as i32;
        let ctx = context(1, lines);

        let at_min = RuleConfiguration::unconstrained(1).with_quantity_range(total, 0);
        let at_max = RuleConfiguration::unconstrained(1).with_quantity_range(0, total);
        let exact = RuleConfiguration::unconstrained(1).with_quantity_range(total, total);

        prop_assert!(evaluate(&at_min, &ctx).is_satisfied);
        prop_assert!(evaluate(&at_max, &ctx).is_satisfied);
        prop_assert!(evaluate(&exact, &ctx).is_satisfied);
    }

    #[test]
    fn satisfied_iff_total_within_bounds(lines in cart(), min in 0i32..40, max in 0i32..40) {
        let total: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let config = RuleConfiguration::unconstrained(1).with_quantity_range(min, max);
        let verdict = evaluate(&config, &context(1, lines));

        let expected = (min == 0 || total >= i64::from(min)) && (max == 0 || total <= i64::from(max));
        prop_assert_eq!(verdict.is_satisfied, expected);
        prop_assert_eq!(verdict.eligible_quantity, total);
    }

    #[test]
    fn disallowed_currency_rejects(lines in cart(), allowed in prop::collection::btree_set(1i64..10, 1..4)) {
        let config = RuleConfiguration::unconstrained(1).with_currency_ids(allowed);
        let verdict = evaluate(&config, &context(99, lines));
        prop_assert_eq!(verdict.reason, Some(UnsatisfiedReason::CurrencyNotAllowed));
    }

    #[test]
    fn formatted_id_list_parses_back(ids in prop::collection::btree_set(any::<i64>(), 0..10)) {
        prop_assert_eq!(parse_id_list(Some(&format_id_list(&ids))), ids);
    }

    #[test]
    fn parse_id_list_never_panics(raw in ".*") {
        let _ = parse_id_list(Some(&raw));
    }
}
