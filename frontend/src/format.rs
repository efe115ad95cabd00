/// Fixed en-US style money formatting for a single configured currency.
#[derive(Clone, Debug, PartialEq)]
pub struct Currency {
    code: String,
    symbol: Option<&'static str>,
    fraction_digits: usize,
}

pub const DEFAULT_CURRENCY: &str = "USD";

/// Symbols as the en-US locale prints them.
fn currency_symbol_for(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "PHP" => Some("₱"),
        "INR" => Some("₹"),
        "KRW" => Some("₩"),
        "ILS" => Some("₪"),
        "VND" => Some("₫"),
        "NGN" => Some("₦"),
        "CNY" => Some("CN¥"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        "NZD" => Some("NZ$"),
        "HKD" => Some("HK$"),
        "MXN" => Some("MX$"),
        "BRL" => Some("R$"),
        "TWD" => Some("NT$"),
        _ => None,
    }
}

fn fraction_digits_for(code: &str) -> usize {
    match code {
        "JPY" | "KRW" | "VND" => 0,
        _ => 2,
    }
}

impl Currency {
    /// A blank code falls back to [`DEFAULT_CURRENCY`].
    pub fn new(code: &str) -> Self {
        let code = match code.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            code => code.to_uppercase(),
        };
        Self {
            symbol: currency_symbol_for(&code),
            fraction_digits: fraction_digits_for(&code),
            code,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// `-$1,234.50`, or `BDT 1,234.50` for codes without a known symbol.
    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.*}", self.fraction_digits, amount.abs());
        let (whole, fraction) = match fixed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (fixed.as_str(), None),
        };

        let mut digits = format_with_commas(whole);
        if let Some(fraction) = fraction {
            digits.push('.');
            digits.push_str(fraction);
        }

        let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
        let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
        match self.symbol {
            Some(symbol) => format!("{}{}{}", sign, symbol, digits),
            None => format!("{}{} {}", sign, self.code, digits),
        }
    }
}

fn format_with_commas(digits: &str) -> String {
    let s = digits.chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_usd_like_en_us() {
        let usd = Currency::new("USD");
        assert_eq!(usd.format(50.0), "$50.00");
        assert_eq!(usd.format(-50.0), "-$50.00");
        assert_eq!(usd.format(1234567.5), "$1,234,567.50");
        assert_eq!(usd.format(0.0), "$0.00");
    }

    #[test]
    fn code_without_symbol_is_spelled_out() {
        let bdt = Currency::new("bdt");
        assert_eq!(bdt.code(), "BDT");
        assert_eq!(bdt.format(1500.25), "BDT 1,500.25");
        assert_eq!(bdt.format(-3.0), "-BDT 3.00");
    }

    #[test]
    fn zero_fraction_currencies_round() {
        assert_eq!(Currency::new("JPY").format(1234.6), "¥1,235");
        assert_eq!(Currency::new("KRW").format(1234.6), "₩1,235");
    }

    #[test]
    fn blank_code_falls_back_to_default() {
        let currency = Currency::new("  ");
        assert_eq!(currency.code(), DEFAULT_CURRENCY);
        assert_eq!(currency.format(50.0), "$50.00");
    }

    #[test]
    fn prefixed_dollar_symbols() {
        assert_eq!(Currency::new("cad").format(-12.5), "-CA$12.50");
        assert_eq!(Currency::new("AUD").format(1000.0), "A$1,000.00");
    }

    #[test]
    fn tiny_negative_does_not_render_minus_zero() {
        assert_eq!(Currency::new("USD").format(-0.001), "$0.00");
    }
}
