/// Parses a storefront price such as `"$1.990"` or `"1.234,56"`.
///
/// The storefront formats numbers with `.` for thousands and `,` for the
/// decimal mark. Everything that is not a digit or separator is dropped,
/// thousands separators are removed, and the decimal comma becomes a point.
#[must_use]
pub fn parse_locale_price(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    kept.replace('.', "").replace(',', ".").parse().ok()
}
