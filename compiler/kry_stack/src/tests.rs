use super::*;

#[test]
fn deep_recursion_does_not_overflow() {
    fn count_down(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { count_down(n - 1) + 1 })
    }

    assert_eq!(count_down(100_000), 100_000);
}

#[test]
fn closure_result_passes_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}

#[test]
fn budget_refuses_past_limit() {
    let mut budget = NestingBudget::new(2);
    assert!(budget.enter());
    assert!(budget.enter());
    assert!(!budget.enter());
    assert_eq!(budget.depth(), 2);

    budget.exit();
    assert!(budget.enter());
    assert_eq!(budget.depth(), 2);
}

#[test]
fn exit_on_empty_budget_saturates() {
    let mut budget = NestingBudget::default();
    budget.exit();
    assert_eq!(budget.depth(), 0);
    assert_eq!(budget.limit(), DEFAULT_MAX_NESTING);
}
