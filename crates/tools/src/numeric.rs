//! Labeled-number extraction shared by the validation tools.
//!
//! Customs documents arrive as extracted text, so the built-in checks work
//! off labeled lines ("Total quantity: 1,200 pcs"). A hand-rolled scanner
//! keeps this dependency-free; it tolerates thousands separators and
//! currency prefixes but makes no attempt at full table parsing.

/// Extract every numeric value on lines containing any of `labels`
/// (case-insensitive). Returns values in document order.
pub fn labeled_values(content: &str, labels: &[&str]) -> Vec<f64> {
    let mut values = Vec::new();
    for line in content.lines() {
        let lower = line.to_lowercase();
        if labels.iter().any(|l| lower.contains(l)) {
            values.extend(numbers_in(line));
        }
    }
    values
}

/// The first labeled value, if any — most totals lines carry exactly one.
pub fn first_labeled_value(content: &str, labels: &[&str]) -> Option<f64> {
    labeled_values(content, labels).into_iter().next()
}

/// Extract all numbers from a line of text.
///
/// Accepts `1,200`, `1200.50`, `$3500` — separators and a leading currency
/// symbol are stripped; anything else splits tokens.
pub fn numbers_in(text: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    let mut flush = |buf: &mut String, out: &mut Vec<f64>| {
        if !buf.is_empty() {
            let cleaned = buf.trim_matches('.');
            if let Ok(n) = cleaned.parse::<f64>() {
                out.push(n);
            }
            buf.clear();
        }
    };

    for c in text.chars() {
        match c {
            '0'..='9' => current.push(c),
            '.' if !current.is_empty() => current.push(c),
            ',' if !current.is_empty() => {} // thousands separator
            _ => flush(&mut current, &mut numbers),
        }
    }
    flush(&mut current, &mut numbers);
    numbers
}

/// Relative difference between two values, safe for zero denominators.
pub fn relative_diff(a: f64, b: f64) -> f64 {
    let base = a.abs().max(b.abs());
    if base == 0.0 {
        0.0
    } else {
        (a - b).abs() / base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_numbers() {
        assert_eq!(numbers_in("Total quantity: 1200 pcs"), vec![1200.0]);
        assert_eq!(numbers_in("qty 15 of 30"), vec![15.0, 30.0]);
    }

    #[test]
    fn extracts_separated_and_decimal() {
        assert_eq!(numbers_in("Gross weight: 1,250.5 kg"), vec![1250.5]);
        assert_eq!(numbers_in("Value: $3,500"), vec![3500.0]);
    }

    #[test]
    fn no_numbers_is_empty() {
        assert!(numbers_in("no digits here").is_empty());
    }

    #[test]
    fn labeled_lines_only() {
        let doc = "Invoice No: 443\nTotal quantity: 500 units\nPrice each: 2.50";
        assert_eq!(labeled_values(doc, &["quantity", "qty"]), vec![500.0]);
        // The invoice number line carries no matching label.
        assert!(labeled_values(doc, &["weight"]).is_empty());
    }

    #[test]
    fn relative_diff_handles_zero() {
        assert_eq!(relative_diff(0.0, 0.0), 0.0);
        assert!((relative_diff(100.0, 90.0) - 0.1).abs() < 1e-9);
    }
}
