/// Average days per month used for elapsed/remaining month arithmetic.
/// Fixed divisor carried over from the production rule set; calendar-month
/// arithmetic is used only when computing the expiration date itself.
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Average days per year (Julian year), same fixed-divisor convention.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Date layouts accepted for signature dates, tried strictly in order.
/// The first layout that parses wins; there is no disambiguation beyond
/// try-order, so `03/04/2024` is always March 4th (US layout first).
pub const DATE_LAYOUTS: [&str; 10] = [
    "%m/%d/%Y",  // 01/15/2024
    "%m/%d/%y",  // 01/15/24
    "%m-%d-%Y",  // 01-15-2024
    "%m-%d-%y",  // 01-15-24
    "%Y-%m-%d",  // 2024-01-15 (ISO 8601)
    "%y-%m-%d",  // 24-01-15
    "%d/%m/%Y",  // 15/01/2024
    "%d-%m-%Y",  // 15-01-2024
    "%Y.%m.%d",  // 2024.01.15
    "%B %d, %Y", // January 15, 2024
];

/// Layout used for all human-facing date strings in results.
pub const DISPLAY_LAYOUT: &str = "%m/%d/%Y";

/// Upper bound accepted for an explicit in-document expiration statement.
/// Captures above this are treated as OCR noise and ignored.
pub const MAX_EXPLICIT_MONTHS: u32 = 120;
