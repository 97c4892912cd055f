use domain::DomainError;

/// Parse the extraction collaborator's free-text result into a finite number.
///
/// The model is prompted for a bare number but occasionally wraps it in prose
/// ("The meter shows 00123.4"), so when a direct parse fails we fall back to
/// the first unsigned numeric token in the text. Empty output, a literal
/// "null", or text without digits is a hard failure; such a result must never
/// be stored as zero.
pub fn parse_extracted_value(text: &str) -> Result<f64, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Err(DomainError::ExtractionFailed(
            "extraction result contains no numeric value".to_string(),
        ));
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Ok(value);
        }
        return Err(DomainError::ExtractionFailed(
            "extraction result is not a finite number".to_string(),
        ));
    }

    first_numeric_token(trimmed).ok_or_else(|| {
        DomainError::ExtractionFailed(format!(
            "no numeric value in extraction result: {:.60}",
            trimmed
        ))
    })
}

/// First run of digits, with an optional fractional part, anywhere in the text.
fn first_numeric_token(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            return text[start..i].parse::<f64>().ok();
        }
        i += 1;
    }

    None
}
