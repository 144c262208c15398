//! Order pricing engine.
//!
//! Pure functions: given the line items, the payment method, a catalog
//! lookup and the calendar date, compute gross total, discount and net
//! total. No IO, no clock reads, no errors raised. Unresolvable items
//! contribute nothing so a stale cart never blocks a quote.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::catalog::ProductLookup;

/// Category name that promo rules treat as pizza. Exact match, including case.
pub const PIZZA_CATEGORY: &str = "Pizza";

const PIX_PAYMENT: &str = "Pix";
const VOLUME_PROMO_MIN_PIZZAS: i64 = 3;
const PIX_PROMO_THRESHOLD: u32 = 100;
const FLAT_PROMO_THRESHOLD: u32 = 200;

const VOLUME_PROMO_NOTE: &str = "Promoção 3+ pizzas (10%)";
const WEDNESDAY_PROMO_NOTE: &str = "Quarta da Pizza (5%)";
const PIX_PROMO_NOTE: &str = "PIX acima de 100 (2%)";
const FLAT_PROMO_NOTE: &str =
    "Desconto automático de 10% aplicado em pedidos acima de R$ 200,00.";

const NOTE_SEPARATOR: &str = " | ";

/// One cart line as submitted by the caller. Quantities are assumed to be
/// validated upstream; the engine only multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub produto_id: i32,
    pub quantidade: i32,
}

/// Which discount rule set applies.
///
/// `Itemized` is the production policy: three stacking promos, each with its
/// own note. `FlatTotal` is the alternative single threshold rule kept for
/// operators that prefer one blanket discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountPolicy {
    #[default]
    Itemized,
    FlatTotal,
}

impl FromStr for DiscountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "itemized" => Ok(DiscountPolicy::Itemized),
            "flat-total" => Ok(DiscountPolicy::FlatTotal),
            other => Err(format!(
                "unknown discount policy '{other}' (expected 'itemized' or 'flat-total')"
            )),
        }
    }
}

/// Result of pricing a cart. Totals are exact (unrounded); call
/// [`PricingSummary::rounded`] before persisting or displaying them.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSummary {
    pub total_bruto: BigDecimal,
    pub desconto: BigDecimal,
    pub total_liquido: BigDecimal,
    pub observacoes: Vec<String>,
}

impl PricingSummary {
    /// Totals rounded to 2 decimal places, half away from zero. Rounding
    /// happens only here, at the boundary; intermediate math stays exact.
    pub fn rounded(&self) -> PricingSummary {
        PricingSummary {
            total_bruto: round_money(&self.total_bruto),
            desconto: round_money(&self.desconto),
            total_liquido: round_money(&self.total_liquido),
            observacoes: self.observacoes.clone(),
        }
    }

    /// Notes joined for storage on the order row, `None` when no promo fired.
    pub fn observacao(&self) -> Option<String> {
        if self.observacoes.is_empty() {
            None
        } else {
            Some(self.observacoes.join(NOTE_SEPARATOR))
        }
    }
}

/// `pct`% of `base`, exact (no rounding).
fn percent_of(base: &BigDecimal, pct: u32) -> BigDecimal {
    (base * BigDecimal::from(pct)) / BigDecimal::from(100u32)
}

/// Round to 2 decimal places, half away from zero (13.345 -> 13.35).
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

fn non_negative(value: BigDecimal) -> BigDecimal {
    if value < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        value
    }
}

/// Price a cart.
///
/// Under [`DiscountPolicy::Itemized`] the promos apply in a fixed order and
/// stack by addition, each contributing a note:
///
/// 1. three or more pizzas in the cart: 10% off the pizza subtotal;
/// 2. Wednesday with a positive pizza subtotal: a further 5% off the pizza
///    subtotal;
/// 3. payment via Pix with gross total above 100: 2% off the gross total.
///
/// Under [`DiscountPolicy::FlatTotal`] a single 10% discount applies when
/// the gross total reaches 200, regardless of categories, date or payment.
///
/// The net total is clamped at zero. Items whose product id the catalog
/// cannot resolve are skipped.
pub fn compute_summary(
    itens: &[LineItem],
    forma_pagamento: &str,
    catalog: &impl ProductLookup,
    hoje: NaiveDate,
    policy: DiscountPolicy,
) -> PricingSummary {
    let mut total_bruto = BigDecimal::zero();
    let mut subtotal_pizzas = BigDecimal::zero();
    let mut qtd_pizzas: i64 = 0;

    for item in itens {
        let Some(produto) = catalog.find_by_id(item.produto_id) else {
            continue;
        };
        let linha = &produto.preco * BigDecimal::from(item.quantidade);
        total_bruto += &linha;
        if produto.categoria == PIZZA_CATEGORY {
            subtotal_pizzas += &linha;
            qtd_pizzas += i64::from(item.quantidade);
        }
    }

    let mut desconto = BigDecimal::zero();
    let mut observacoes = Vec::new();

    match policy {
        DiscountPolicy::Itemized => {
            if qtd_pizzas >= VOLUME_PROMO_MIN_PIZZAS {
                desconto += percent_of(&subtotal_pizzas, 10);
                observacoes.push(VOLUME_PROMO_NOTE.to_string());
            }
            if hoje.weekday() == Weekday::Wed && subtotal_pizzas > BigDecimal::zero() {
                desconto += percent_of(&subtotal_pizzas, 5);
                observacoes.push(WEDNESDAY_PROMO_NOTE.to_string());
            }
            if forma_pagamento == PIX_PAYMENT
                && total_bruto > BigDecimal::from(PIX_PROMO_THRESHOLD)
            {
                desconto += percent_of(&total_bruto, 2);
                observacoes.push(PIX_PROMO_NOTE.to_string());
            }
        }
        DiscountPolicy::FlatTotal => {
            if total_bruto >= BigDecimal::from(FLAT_PROMO_THRESHOLD) {
                desconto += percent_of(&total_bruto, 10);
                observacoes.push(FLAT_PROMO_NOTE.to_string());
            }
        }
    }

    let total_liquido = non_negative(&total_bruto - &desconto);

    PricingSummary {
        total_bruto,
        desconto,
        total_liquido,
        observacoes,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::catalog::ProductSnapshot;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn product(categoria: &str, preco: &str) -> ProductSnapshot {
        ProductSnapshot {
            categoria: categoria.to_string(),
            preco: dec(preco),
        }
    }

    fn catalog() -> HashMap<i32, ProductSnapshot> {
        let mut map = HashMap::new();
        map.insert(1, product("Pizza", "40.00"));
        map.insert(2, product("Pizza", "52.50"));
        map.insert(3, product("Bebida", "10.00"));
        map.insert(4, product("Sobremesa", "18.00"));
        map
    }

    fn item(produto_id: i32, quantidade: i32) -> LineItem {
        LineItem {
            produto_id,
            quantidade,
        }
    }

    // 2025-08-20 is a Wednesday, 2025-08-18 a Monday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 18).unwrap()
    }

    fn price(
        itens: &[LineItem],
        forma_pagamento: &str,
        hoje: NaiveDate,
    ) -> PricingSummary {
        compute_summary(
            itens,
            forma_pagamento,
            &catalog(),
            hoje,
            DiscountPolicy::Itemized,
        )
    }

    #[test]
    fn empty_cart_yields_zeroed_summary() {
        let summary = price(&[], "Dinheiro", monday());

        assert_eq!(summary.total_bruto, BigDecimal::zero());
        assert_eq!(summary.desconto, BigDecimal::zero());
        assert_eq!(summary.total_liquido, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
        assert_eq!(summary.observacao(), None);
    }

    #[test]
    fn unknown_products_contribute_nothing() {
        let summary = price(&[item(999, 5), item(3, 2)], "Dinheiro", monday());

        assert_eq!(summary.total_bruto, dec("20.00"));
        assert_eq!(summary.desconto, BigDecimal::zero());
        assert_eq!(summary.total_liquido, dec("20.00"));
    }

    #[test]
    fn three_pizzas_take_ten_percent_off_pizza_subtotal() {
        let summary = price(&[item(1, 3)], "Dinheiro", monday());

        assert_eq!(summary.total_bruto, dec("120.00"));
        assert_eq!(summary.desconto, dec("12.00"));
        assert_eq!(summary.total_liquido, dec("108.00"));
        assert_eq!(summary.observacoes, vec!["Promoção 3+ pizzas (10%)"]);
    }

    #[test]
    fn two_pizzas_do_not_trigger_volume_promo() {
        let summary = price(&[item(1, 2)], "Dinheiro", monday());

        assert_eq!(summary.desconto, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
    }

    #[test]
    fn pizza_count_accumulates_across_lines_and_products() {
        // 2 + 1 pizzas over two different pizza products still counts as 3.
        let summary = price(&[item(1, 2), item(2, 1)], "Dinheiro", monday());

        assert_eq!(summary.total_bruto, dec("132.50"));
        assert_eq!(summary.desconto, dec("13.25"));
        assert_eq!(summary.observacoes, vec!["Promoção 3+ pizzas (10%)"]);
    }

    #[test]
    fn wednesday_adds_five_percent_on_top_of_volume_promo() {
        let summary = price(&[item(1, 3)], "Dinheiro", wednesday());

        assert_eq!(summary.total_bruto, dec("120.00"));
        assert_eq!(summary.desconto, dec("18.00"));
        assert_eq!(summary.total_liquido, dec("102.00"));
        assert_eq!(
            summary.observacoes,
            vec!["Promoção 3+ pizzas (10%)", "Quarta da Pizza (5%)"]
        );
    }

    #[test]
    fn wednesday_promo_fires_on_a_single_pizza() {
        let summary = price(&[item(1, 1)], "Dinheiro", wednesday());

        assert_eq!(summary.desconto, dec("2.00"));
        assert_eq!(summary.observacoes, vec!["Quarta da Pizza (5%)"]);
    }

    #[test]
    fn wednesday_promo_needs_a_positive_pizza_subtotal() {
        let summary = price(&[item(3, 4)], "Dinheiro", wednesday());

        assert_eq!(summary.total_bruto, dec("40.00"));
        assert_eq!(summary.desconto, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
    }

    #[test]
    fn pix_above_one_hundred_takes_two_percent_of_gross() {
        // 15 drinks, no pizza in sight.
        let summary = price(&[item(3, 15)], "Pix", monday());

        assert_eq!(summary.total_bruto, dec("150.00"));
        assert_eq!(summary.desconto, dec("3.00"));
        assert_eq!(summary.total_liquido, dec("147.00"));
        assert_eq!(summary.observacoes, vec!["PIX acima de 100 (2%)"]);
    }

    #[test]
    fn pix_at_exactly_one_hundred_does_not_discount() {
        let summary = price(&[item(3, 10)], "Pix", monday());

        assert_eq!(summary.total_bruto, dec("100.00"));
        assert_eq!(summary.desconto, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
    }

    #[test]
    fn payment_method_match_is_exact() {
        let summary = price(&[item(3, 15)], "pix", monday());

        assert_eq!(summary.desconto, BigDecimal::zero());
    }

    #[test]
    fn category_match_is_exact() {
        let mut map = catalog();
        map.insert(9, product("pizza", "40.00"));

        let summary = compute_summary(
            &[item(9, 3)],
            "Dinheiro",
            &map,
            monday(),
            DiscountPolicy::Itemized,
        );

        assert_eq!(summary.desconto, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
    }

    #[test]
    fn all_three_promos_stack_in_order() {
        // 3 pizzas (120) + 3 drinks (30): volume 12, Wednesday 6, Pix 3.
        let summary = price(&[item(1, 3), item(3, 3)], "Pix", wednesday());

        assert_eq!(summary.total_bruto, dec("150.00"));
        assert_eq!(summary.desconto, dec("21.00"));
        assert_eq!(summary.total_liquido, dec("129.00"));
        assert_eq!(
            summary.observacoes,
            vec![
                "Promoção 3+ pizzas (10%)",
                "Quarta da Pizza (5%)",
                "PIX acima de 100 (2%)"
            ]
        );
    }

    #[test]
    fn notes_join_with_pipe_separator() {
        let summary = price(&[item(1, 3), item(3, 3)], "Pix", wednesday());

        assert_eq!(
            summary.observacao().unwrap(),
            "Promoção 3+ pizzas (10%) | Quarta da Pizza (5%) | PIX acima de 100 (2%)"
        );
    }

    #[test]
    fn same_inputs_produce_the_same_summary() {
        let itens = [item(1, 3), item(4, 2)];

        let first = price(&itens, "Pix", wednesday());
        let second = price(&itens, "Pix", wednesday());

        assert_eq!(first, second);
    }

    #[test]
    fn gross_total_grows_with_quantity() {
        let mut previous = BigDecimal::zero();
        for quantidade in 1..=6 {
            let summary = price(&[item(2, quantidade)], "Dinheiro", monday());
            assert!(summary.total_bruto >= previous);
            previous = summary.total_bruto;
        }
    }

    #[test]
    fn free_pizzas_trigger_volume_but_not_wednesday() {
        let mut map = catalog();
        map.insert(10, product("Pizza", "0.00"));

        let summary = compute_summary(
            &[item(10, 3)],
            "Dinheiro",
            &map,
            wednesday(),
            DiscountPolicy::Itemized,
        );

        assert_eq!(summary.total_bruto, BigDecimal::zero());
        assert_eq!(summary.desconto, BigDecimal::zero());
        assert_eq!(summary.total_liquido, BigDecimal::zero());
        assert_eq!(summary.observacoes, vec!["Promoção 3+ pizzas (10%)"]);
    }

    #[test]
    fn net_total_is_never_negative() {
        assert_eq!(non_negative(dec("-0.01")), BigDecimal::zero());
        assert_eq!(non_negative(dec("0.01")), dec("0.01"));
    }

    #[test]
    fn totals_stay_exact_until_rounded() {
        let mut map = HashMap::new();
        map.insert(1, product("Pizza", "13.35"));

        // 3 x 13.35 = 40.05 gross, 10% volume promo = 4.005 exact.
        let summary = compute_summary(
            &[item(1, 3)],
            "Dinheiro",
            &map,
            monday(),
            DiscountPolicy::Itemized,
        );

        assert_eq!(summary.desconto, dec("4.005"));
        assert_eq!(summary.total_liquido, dec("36.045"));

        let rounded = summary.rounded();
        assert_eq!(rounded.desconto, dec("4.01"));
        assert_eq!(rounded.total_liquido, dec("36.05"));
        assert_eq!(rounded.observacoes, summary.observacoes);
    }

    #[test]
    fn round_money_is_half_away_from_zero() {
        assert_eq!(round_money(&dec("4.005")), dec("4.01"));
        assert_eq!(round_money(&dec("4.004")), dec("4.00"));
        assert_eq!(round_money(&dec("12.345")), dec("12.35"));
        assert_eq!(round_money(&dec("-4.005")), dec("-4.01"));
    }

    #[test]
    fn flat_policy_discounts_at_two_hundred() {
        let summary = compute_summary(
            &[item(1, 5)],
            "Dinheiro",
            &catalog(),
            monday(),
            DiscountPolicy::FlatTotal,
        );

        assert_eq!(summary.total_bruto, dec("200.00"));
        assert_eq!(summary.desconto, dec("20.00"));
        assert_eq!(summary.total_liquido, dec("180.00"));
        assert_eq!(
            summary.observacoes,
            vec!["Desconto automático de 10% aplicado em pedidos acima de R$ 200,00."]
        );
    }

    #[test]
    fn flat_policy_leaves_totals_below_threshold_alone() {
        let mut map = catalog();
        map.insert(11, product("Bebida", "199.99"));

        let summary = compute_summary(
            &[item(11, 1)],
            "Dinheiro",
            &map,
            monday(),
            DiscountPolicy::FlatTotal,
        );

        assert_eq!(summary.desconto, BigDecimal::zero());
        assert!(summary.observacoes.is_empty());
    }

    #[test]
    fn flat_policy_ignores_pizzas_payment_and_date() {
        // A cart that would fire all three itemized promos gets only the
        // flat note under the flat policy.
        let summary = compute_summary(
            &[item(1, 3), item(2, 2)],
            "Pix",
            &catalog(),
            wednesday(),
            DiscountPolicy::FlatTotal,
        );

        assert_eq!(summary.total_bruto, dec("225.00"));
        assert_eq!(summary.desconto, dec("22.50"));
        assert_eq!(
            summary.observacoes,
            vec!["Desconto automático de 10% aplicado em pedidos acima de R$ 200,00."]
        );
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!(
            "itemized".parse::<DiscountPolicy>().unwrap(),
            DiscountPolicy::Itemized
        );
        assert_eq!(
            "flat-total".parse::<DiscountPolicy>().unwrap(),
            DiscountPolicy::FlatTotal
        );
        assert!("percentage".parse::<DiscountPolicy>().is_err());
        assert_eq!(DiscountPolicy::default(), DiscountPolicy::Itemized);
    }
}
