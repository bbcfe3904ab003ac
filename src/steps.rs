//! Concrete recipe steps.

pub mod check_missing;

pub use check_missing::{CheckMissing, CheckMissingOptions, Selection, count_missing};

use uuid::Uuid;

/// Generate a step id such as `missing_3fa9c`.
pub fn rand_id(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(5).collect();
    format!("{prefix}_{suffix}")
}
