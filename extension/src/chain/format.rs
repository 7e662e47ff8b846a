use super::ChainProperties;

const FRACTION_DIGITS: usize = 4;

/// Render a raw balance with the chain's decimals and token symbol,
/// e.g. `1,234.5678 KSM`. The fraction is truncated, never rounded up.
pub fn format_balance(raw: u128, properties: &ChainProperties) -> String {
    // 10^38 is the largest power of ten that fits in a u128
    let decimals = properties.token_decimals.min(38);
    let unit = 10u128.pow(decimals);
    let integer = group_thousands(raw / unit);

    let amount = if decimals == 0 {
        integer
    } else {
        let fraction = format!("{:0width$}", raw % unit, width = decimals as usize);
        let shown: String = fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(FRACTION_DIGITS)
            .collect();
        format!("{}.{}", integer, shown)
    };

    if properties.token_symbol.is_empty() {
        amount
    } else {
        format!("{} {}", amount, properties.token_symbol)
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(decimals: u32, symbol: &str) -> ChainProperties {
        ChainProperties {
            token_decimals: decimals,
            token_symbol: symbol.to_string(),
        }
    }

    #[test]
    fn test_formats_with_decimals_and_symbol() {
        assert_eq!(format_balance(1_234_567_800_000_000, &props(12, "KSM")), "1,234.5678 KSM");
    }

    #[test]
    fn test_truncates_fraction() {
        assert_eq!(format_balance(1_999_999, &props(6, "DEV")), "1.9999 DEV");
    }

    #[test]
    fn test_pads_short_precision() {
        assert_eq!(format_balance(15, &props(1, "")), "1.5000");
        assert_eq!(format_balance(1_000_000, &props(0, "UNIT")), "1,000,000 UNIT");
    }

    #[test]
    fn test_zero_balance() {
        assert_eq!(format_balance(0, &props(15, "DOT")), "0.0000 DOT");
    }
}
