//! Personal data masking
//!
//! Sample rows are scanned before rendering. A value is masked when its
//! column name looks like personal data, or when the value itself matches a
//! known pattern (email, phone, SSN, card number, IPv4, URL).

use regex::Regex;
use tracing::trace;

use crate::schema::SampleRowSet;

/// Column name fragments that mark a column as personal data
const PII_NAME_FRAGMENTS: &[&str] = &[
    "mail", "phone", "mobile", "tel", "fax", "ssn", "social_security", "tax_id",
    "credit_card", "card_number", "cc_num", "password", "passwd", "pwd", "pass", "license",
    "licence", "dl_number", "passport", "visa", "identity", "address", "addr", "street", "zip",
    "postal", "dob", "birth", "age", "salary", "wage", "income", "earning", "first_name",
    "last_name", "full_name", "fname", "lname", "maiden", "middle_name", "nickname", "account",
    "routing", "iban", "swift", "user_agent", "token", "key", "secret", "signature",
    "fingerprint", "hash",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Email,
    Phone,
    Ssn,
    CreditCard,
    IpAddress,
    Url,
}

/// Detects and masks personal data in sampled values
pub struct PiiDetector {
    value_patterns: Vec<(ValueKind, Regex)>,
    non_digit: Regex,
}

impl PiiDetector {
    pub fn new() -> Self {
        let patterns = [
            (
                ValueKind::Email,
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            ),
            (
                ValueKind::Phone,
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
            ),
            (ValueKind::Ssn, r"\b\d{3}-\d{2}-\d{4}\b|\b\d{9}\b"),
            (ValueKind::CreditCard, r"\b(?:\d{4}[-\s]?){3}\d{4}\b"),
            (ValueKind::IpAddress, r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b"),
            (ValueKind::Url, r"https?://[^\s]+"),
        ];

        let value_patterns = patterns
            .into_iter()
            .map(|(kind, pattern)| {
                (
                    kind,
                    Regex::new(pattern).expect("Failed to compile PII value pattern"),
                )
            })
            .collect();

        Self {
            value_patterns,
            non_digit: Regex::new(r"\D").expect("Failed to compile digit filter"),
        }
    }

    /// Check if a column name suggests it contains personal data
    pub fn is_pii_column(&self, column_name: &str) -> bool {
        let lower = column_name.to_lowercase();
        PII_NAME_FRAGMENTS
            .iter()
            .any(|fragment| lower.contains(fragment))
    }

    /// Column names flagged as personal data, in the given order
    pub fn pii_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| self.is_pii_column(name))
            .map(str::to_string)
            .collect()
    }

    /// Mask a value by column name first, then by content
    ///
    /// Returns `None` when the value does not need masking.
    pub fn mask_value(&self, value: &str, column_name: &str) -> Option<String> {
        if self.is_pii_column(column_name) {
            return Some(self.mask_by_column(value, column_name));
        }

        self.value_patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(value))
            .map(|(kind, _)| self.mask_by_kind(value, *kind))
    }

    /// Mask every non-null cell of a sample in place
    ///
    /// Returns the columns whose names marked them as personal data.
    pub fn mask_sample(&self, sample: &mut SampleRowSet) -> Vec<String> {
        for row in &mut sample.rows {
            for (cell, column) in row.iter_mut().zip(&sample.columns) {
                if cell.is_null {
                    continue;
                }
                if let Some(masked) = self.mask_value(&cell.text, column) {
                    trace!(column = ?column, "Masked sample value");
                    cell.text = masked;
                }
            }
        }

        self.pii_columns(sample.columns.iter().map(String::as_str))
    }

    fn mask_by_column(&self, value: &str, column_name: &str) -> String {
        let lower = column_name.to_lowercase();
        let has = |fragments: &[&str]| fragments.iter().any(|f| lower.contains(f));

        if has(&["email", "mail"]) {
            mask_email(value)
        } else if has(&["phone", "mobile", "tel"]) {
            self.mask_phone(value)
        } else if has(&["ssn", "social_security"]) {
            self.mask_ssn(value)
        } else if has(&["password", "passwd", "pwd", "pass"]) {
            "[MASKED]".to_string()
        } else if has(&["credit_card", "card_number"]) {
            self.mask_credit_card(value)
        } else if has(&["address", "street"]) {
            "[ADDRESS MASKED]".to_string()
        } else if has(&["name", "fname", "lname"]) {
            mask_name(value)
        } else if has(&["salary", "wage", "income"]) {
            "[AMOUNT MASKED]".to_string()
        } else {
            "[PII MASKED]".to_string()
        }
    }

    fn mask_by_kind(&self, value: &str, kind: ValueKind) -> String {
        match kind {
            ValueKind::Email => mask_email(value),
            ValueKind::Phone => self.mask_phone(value),
            ValueKind::Ssn => self.mask_ssn(value),
            ValueKind::CreditCard => self.mask_credit_card(value),
            ValueKind::IpAddress => mask_ip(value),
            ValueKind::Url => "[URL MASKED]".to_string(),
        }
    }

    fn digits(&self, value: &str) -> String {
        self.non_digit.replace_all(value, "").into_owned()
    }

    /// `123-456-7890` -> `***-***-7890`
    fn mask_phone(&self, value: &str) -> String {
        let digits = self.digits(value);
        match last_four(&digits) {
            Some(tail) => format!("***-***-{}", tail),
            None => "[PHONE MASKED]".to_string(),
        }
    }

    /// `123-45-6789` -> `***-**-6789`
    fn mask_ssn(&self, value: &str) -> String {
        let digits = self.digits(value);
        match last_four(&digits) {
            Some(tail) if digits.len() == 9 => format!("***-**-{}", tail),
            _ => "[SSN MASKED]".to_string(),
        }
    }

    /// `1234-5678-9012-3456` -> `****-****-****-3456`
    fn mask_credit_card(&self, value: &str) -> String {
        let digits = self.digits(value);
        match last_four(&digits) {
            Some(tail) => format!("****-****-****-{}", tail),
            None => "[CARD MASKED]".to_string(),
        }
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Last four characters of an ASCII digit string
fn last_four(digits: &str) -> Option<&str> {
    (digits.len() >= 4).then(|| &digits[digits.len() - 4..])
}

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

/// `user@domain.com` -> `u***@d***.com`
fn mask_email(value: &str) -> String {
    let parts: Vec<&str> = value.split('@').collect();
    if let [user, domain] = parts.as_slice() {
        let masked_domain = match domain.split('.').collect::<Vec<_>>().as_slice() {
            [first, .., last] => first_char(first).map(|c| format!("{}***.{}", c, last)),
            _ => first_char(domain).map(|c| format!("{}***", c)),
        };
        if let (Some(u), Some(d)) = (first_char(user), masked_domain) {
            return format!("{}***@{}", u, d);
        }
    }
    "[EMAIL MASKED]".to_string()
}

/// `192.168.1.100` -> `***.***.***.100`
fn mask_ip(value: &str) -> String {
    let parts: Vec<&str> = value.split('.').collect();
    match parts.as_slice() {
        [_, _, _, last] => format!("***.***.***.{}", last),
        _ => "[IP MASKED]".to_string(),
    }
}

/// `John Doe` -> `J*** D***`
fn mask_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() < 2 {
        return "[NAME MASKED]".to_string();
    }

    trimmed
        .split(' ')
        .map(|part| match first_char(part) {
            Some(c) if part.chars().count() > 1 => format!("{}***", c),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SampleValue;

    #[test]
    fn test_is_pii_column() {
        let detector = PiiDetector::new();
        assert!(detector.is_pii_column("email"));
        assert!(detector.is_pii_column("Contact_Phone"));
        assert!(detector.is_pii_column("password_hash"));
        assert!(!detector.is_pii_column("id"));
        assert!(!detector.is_pii_column("name"));
        assert!(!detector.is_pii_column("status"));
    }

    #[test]
    fn test_mask_by_column_name() {
        let detector = PiiDetector::new();
        assert_eq!(
            detector.mask_value("alice@example.com", "email").as_deref(),
            Some("a***@e***.com")
        );
        assert_eq!(
            detector.mask_value("(555) 123-4567", "phone").as_deref(),
            Some("***-***-4567")
        );
        assert_eq!(
            detector.mask_value("hunter2", "password").as_deref(),
            Some("[MASKED]")
        );
        assert_eq!(
            detector.mask_value("John Ronald Doe", "full_name").as_deref(),
            Some("J*** R*** D***")
        );
        assert_eq!(
            detector.mask_value("12 Main St", "street").as_deref(),
            Some("[ADDRESS MASKED]")
        );
        assert_eq!(
            detector.mask_value("abc", "api_token").as_deref(),
            Some("[PII MASKED]")
        );
    }

    #[test]
    fn test_mask_by_value_pattern() {
        let detector = PiiDetector::new();
        assert_eq!(
            detector.mask_value("reach me at bob@mail.org", "note").as_deref(),
            Some("r***@m***.org")
        );
        assert_eq!(
            detector.mask_value("123-45-6789", "note").as_deref(),
            Some("***-**-6789")
        );
        assert_eq!(
            detector.mask_value("10.0.0.42", "origin").as_deref(),
            Some("***.***.***.42")
        );
        assert_eq!(
            detector.mask_value("see https://example.com/x", "note").as_deref(),
            Some("[URL MASKED]")
        );
        assert_eq!(detector.mask_value("plain text", "note"), None);
        assert_eq!(detector.mask_value("42", "id"), None);
    }

    #[test]
    fn test_mask_helpers_edge_cases() {
        assert_eq!(mask_email("nodomain"), "[EMAIL MASKED]");
        assert_eq!(mask_email("a@localhost"), "a***@l***");
        assert_eq!(mask_name("J"), "[NAME MASKED]");
        assert_eq!(mask_name("Jo"), "J***");
        assert_eq!(mask_ip("::1"), "[IP MASKED]");
    }

    #[test]
    fn test_mask_sample_skips_nulls() {
        let detector = PiiDetector::new();
        let mut sample = SampleRowSet::new(vec!["id".into(), "email".into()]);
        sample.push_row(&[
            SampleValue::Integer(1),
            SampleValue::Text("carol@shop.io".into()),
        ]);
        sample.push_row(&[SampleValue::Integer(2), SampleValue::Null]);

        let pii = detector.mask_sample(&mut sample);

        assert_eq!(pii, vec!["email"]);
        assert_eq!(sample.rows[0][0].text, "1");
        assert_eq!(sample.rows[0][1].text, "c***@s***.io");
        assert_eq!(sample.rows[1][1].text, "NULL");
    }
}
