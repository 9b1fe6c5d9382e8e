/// Product identifier emitted when a calendar or card is missing one.
pub const PRODUCT_NAME: &str = "calcard";
pub const DEFAULT_PRODID: &str = const_str::concat!(
    "-//",
    PRODUCT_NAME,
    "//",
    PRODUCT_NAME,
    " ",
    env!("CARGO_PKG_VERSION"),
    "//EN"
);

/// Maximum content line length in octets, excluding the CRLF (RFC 5545 §3.1).
pub const DEFAULT_LINE_LENGTH: usize = 75;

/// Smallest line length that can still carry a 4-octet UTF-8 character
/// after the continuation space.
pub const MIN_LINE_LENGTH: usize = 5;

pub const CRLF: &str = "\r\n";

pub const ICALENDAR_VERSION: &str = "2.0";
pub const VCARD_VERSION: &str = "3.0";

/// Years always covered by a generated VTIMEZONE, widened to the years a
/// calendar actually uses.
pub const TIMEZONE_FIRST_YEAR: i32 = 2000;
pub const TIMEZONE_LAST_YEAR: i32 = 2030;
