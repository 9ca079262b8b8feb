//! Property tests over random sequences of cart operations.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::GBP};

use cartwright::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Change(usize, i64),
}

const PRODUCTS: [(&str, &str, i64); 5] = [
    ("Apples", "grocery", 120),
    ("Bread", "grocery", 250),
    ("Scarf", "fashion", 2_200),
    ("Socks", "fashion", 499),
    ("Charger", "electronics", 1_249),
];

fn op_strategy() -> BoxedStrategy<Op> {
    let index = 0..PRODUCTS.len();

    prop_oneof![
        3 => index.clone().prop_map(Op::Add),
        1 => index.clone().prop_map(Op::Remove),
        3 => (index, -15_i64..=15).prop_map(|(index, delta)| Op::Change(index, delta)),
    ]
    .boxed()
}

fn coupon_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just(String::new()),
        Just("XYZ".to_string()),
        Just("CAT-FASHION".to_string()),
        (0_u32..=150).prop_map(|percent| format!("BULK{percent}")),
        (0_u32..=150).prop_map(|percent| format!("CAT-GROCERY-{percent}")),
        (0_u32..=1_500).prop_map(|tenths| format!("CAT-GROCERY-{}.{}", tenths / 10, tenths % 10)),
        (0_u32..=150).prop_map(|percent| format!("cat-fashion-{percent}")),
    ]
    .boxed()
}

fn build_cart<'a>(products: &[Product<'a>], ops: &[Op]) -> Result<Cart<'a>, CartError> {
    let mut cart = Cart::new(GBP);

    for op in ops {
        match op {
            Op::Add(index) => {
                if let Some(product) = products.get(*index) {
                    cart.add_to_cart(product)?;
                }
            }
            Op::Remove(index) => {
                if let Some(product) = products.get(*index) {
                    cart.remove_from_cart(&product.name);
                }
            }
            Op::Change(index, delta) => {
                if let Some(product) = products.get(*index) {
                    cart.change_quantity(&product.name, *delta)?;
                }
            }
        }
    }

    Ok(cart)
}

fn products<'a>() -> Vec<Product<'a>> {
    PRODUCTS
        .iter()
        .map(|(name, category, price)| Product::new(*name, *category, Money::from_minor(*price, GBP)))
        .collect()
}

fn assert_cart_invariants(cart: &Cart<'_>) -> TestCaseResult {
    let mut names: Vec<&str> = cart.iter().map(CartLine::name).collect();
    let count = names.len();

    names.sort_unstable();
    names.dedup();

    prop_assert_eq!(names.len(), count, "duplicate lines in cart");
    prop_assert!(cart.iter().all(|line| line.quantity() > 0));

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn lines_stay_unique_and_positive(ops in vec(op_strategy(), 0..40)) {
        let products = products();
        let cart = build_cart(&products, &ops).map_err(|err| TestCaseError::fail(err.to_string()))?;

        assert_cart_invariants(&cart)?;
    }

    #[test]
    fn final_total_is_clamped_base_minus_discount(
        ops in vec(op_strategy(), 0..40),
        coupon in coupon_strategy(),
        hour in 0_u8..24,
    ) {
        let products = products();
        let cart = build_cart(&products, &ops).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let hour = Hour::new(hour).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let receipt = price_cart(&cart, &coupon, hour, &DiscountRules::default())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let totals = receipt.totals();

        let base = *totals.base_total.amount();
        let total_discount = *totals.total_discount.amount();
        let unrounded = *totals.rule_discount.amount() + *totals.coupon_discount.amount();

        prop_assert!(!totals.final_total.is_negative());
        prop_assert_eq!(*totals.final_total.amount(), (base - total_discount).max(Decimal::ZERO));
        prop_assert_eq!(
            total_discount,
            unrounded.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        );
    }

    #[test]
    fn pricing_is_idempotent(
        ops in vec(op_strategy(), 0..40),
        coupon in coupon_strategy(),
        hour in 0_u8..24,
    ) {
        let products = products();
        let cart = build_cart(&products, &ops).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let hour = Hour::new(hour).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let rules = DiscountRules::default();

        let first = price_cart(&cart, &coupon, hour, &rules)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let second = price_cart(&cart, &coupon, hour, &rules)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(first, second);
    }
}
