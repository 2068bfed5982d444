use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// Class-wide summary of one exam. Always rebuilt from the full list of
/// student results; an exam without results keeps the zero value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct Analytics {
    pub total_students: u32,
    pub students_appeared: u32,
    pub passed_students: u32,
    pub failed_students: u32,
    pub average_marks: f64,
    pub average_percentage: f64,
    pub highest_marks: f64,
    pub lowest_marks: f64,
}
