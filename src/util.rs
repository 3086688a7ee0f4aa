//! Small shared helpers

use chrono::NaiveDate;
use uuid::Uuid;

/// Identifier prefixes per entity
pub mod prefix {
    pub const DEPARTMENT: &str = "dep";
    pub const RANK: &str = "rank";
    pub const STAFF: &str = "staff";
    pub const NOTICE: &str = "notice";
    pub const SALARY: &str = "salary";
    pub const SALARY_RECORD: &str = "record";
    pub const AUTHORITY: &str = "auth";
}

/// Path segment meaning "every record" in query endpoints
pub const ALL: &str = "all";

/// Generate an opaque identifier: prefix followed by 12 hex chars
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &hex[..12])
}

/// True for an empty string or a valid `YYYY-MM-DD` date
pub fn is_valid_date(value: &str) -> bool {
    value.is_empty() || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Escape LIKE wildcards so user input only matches literally
pub fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
