use crate::config::PaginationConfig;

/// Effective page window for a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPage {
    pub limit: usize,
    pub skip: usize,
}

impl FilterPage {
    /// Clamp the raw `limit`/`skip`/`page` parameters. Missing, digitless
    /// or negative values fall back to the defaults; `limit` is capped at the
    /// configured maximum. `skip` wins over `page`, which counts in pages of
    /// the effective limit.
    pub fn from_params(
        limit: Option<&str>,
        skip: Option<&str>,
        page: Option<&str>,
        config: &PaginationConfig,
    ) -> Self {
        let limit = parse_count(limit)
            .unwrap_or(config.default_limit)
            .min(config.max_limit);

        let skip = parse_count(skip)
            .or_else(|| parse_count(page).map(|page| page.saturating_mul(limit)))
            .unwrap_or(0);

        Self { limit, skip }
    }
}

/// Leading-integer parse: optional sign, then the digits up to the first
/// non-digit. `"2.5"` and `"2abc"` read as 2; no digits or a negative number
/// is `None`.
fn parse_count(raw: Option<&str>) -> Option<usize> {
    let raw = raw?.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    if negative {
        return digits.bytes().all(|b| b == b'0').then_some(0);
    }
    Some(digits.parse().unwrap_or(usize::MAX))
}
