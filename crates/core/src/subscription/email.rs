use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    Empty,
    Malformed,
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailError::Empty => f.write_str("Please enter an email address."),
            EmailError::Malformed => f.write_str("That is not a valid email address."),
        }
    }
}

impl std::error::Error for EmailError {}

/// Trims `input` and checks the `local@domain.tld` shape.
///
/// Accepts anything without whitespace that has exactly one `@`, a non-empty
/// local part, and a domain with a dot that is neither its first nor last
/// character. Returns the trimmed address.
pub fn validate_email(input: &str) -> Result<String, EmailError> {
    let email = input.trim();
    if email.is_empty() {
        return Err(EmailError::Empty);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(EmailError::Malformed);
    }

    let (local, domain) = email.split_once('@').ok_or(EmailError::Malformed)?;
    if local.is_empty() || domain.contains('@') {
        return Err(EmailError::Malformed);
    }

    let dotted = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !dotted {
        return Err(EmailError::Malformed);
    }

    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses_and_trims() {
        assert_eq!(validate_email("  trader@example.com ").unwrap(), "trader@example.com");
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last+tag@mail.example.kr").is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert_eq!(validate_email("   "), Err(EmailError::Empty));
        for bad in [
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@.com",
            "user@example.",
            "us er@example.com",
            "a@b@example.com",
        ] {
            assert_eq!(validate_email(bad), Err(EmailError::Malformed), "{bad}");
        }
    }
}
