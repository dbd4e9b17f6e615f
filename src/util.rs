/*!

  Utils for gate-bench development.

*/

use crate::circuit::GateId;

/// Generates a fresh, globally unique gate id
pub fn fresh_id() -> GateId {
    GateId::new(uuid::Uuid::new_v4().to_string())
}

/// Reduces `name` to the characters `[A-Za-z0-9_-]`
pub fn sanitize_token(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Compare rendered truth tables as strings up to indentation.
#[macro_export]
macro_rules! assert_table_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_string = left_val.to_string();
                let right_string = right_val.to_string();
                let left_lines: Vec<&str> = left_string.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                let right_lines: Vec<&str> = right_string.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                assert_eq!(left_lines, right_lines);
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_string = left_val.to_string();
                let right_string = right_val.to_string();
                let left_lines: Vec<&str> = left_string.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                let right_lines: Vec<&str> = right_string.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                assert_eq!(left_lines, right_lines, std::format_args!($($arg)+));
            }
        }
    };
}
