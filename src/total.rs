use crate::model::ServiceItem;

/// Sum of `price * quantity - discount` over every line.
///
/// Inputs are expected to be well-formed already; coercion of raw user input
/// happens in the form layer.
pub fn calculate_total(items: &[ServiceItem]) -> f64 {
    items.iter().map(ServiceItem::amount).sum()
}

/// Two-decimal display with the currency symbol in front, e.g. `₹245.00`.
pub fn format_currency(symbol: &str, amount: f64) -> String {
    // avoid "-0.00" for tiny negative results and negative zero
    let rounded = (amount * 100.0).round() / 100.0;
    let amount = if rounded == 0.0 { 0.0 } else { amount };
    format!("{}{:.2}", symbol, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceId;

    fn item(id: u64, quantity: u32, price: f64, discount: f64) -> ServiceItem {
        ServiceItem {
            id: ServiceId::new(id),
            description: format!("item {}", id),
            details: String::new(),
            quantity,
            price,
            discount,
        }
    }

    #[test]
    fn single_empty_item_totals_zero() {
        assert_eq!(calculate_total(&[item(1, 1, 0.0, 0.0)]), 0.0);
    }

    #[test]
    fn discount_is_per_line() {
        let items = [item(1, 2, 100.0, 10.0)];
        assert_eq!(items[0].amount(), 190.0);
        assert_eq!(calculate_total(&items), 190.0);
    }

    #[test]
    fn sums_every_line() {
        let items = [item(1, 1, 100.0, 0.0), item(2, 3, 50.0, 5.0)];
        let total = calculate_total(&items);
        assert_eq!(total, 245.0);
        assert_eq!(format_currency("₹", total), "₹245.00");
    }

    #[test]
    fn negative_lines_reduce_the_total() {
        let items = [item(1, 1, 20.0, 0.0), item(2, 1, 5.0, 15.0)];
        assert_eq!(calculate_total(&items), 10.0);
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_currency("₹", 12.5), "₹12.50");
        assert_eq!(format_currency("₹", -0.0), "₹0.00");
        assert_eq!(format_currency("₹", -0.001), "₹0.00");
        assert_eq!(format_currency("$", -15.0), "$-15.00");
    }
}
