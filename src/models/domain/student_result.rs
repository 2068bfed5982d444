use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

/// One student's marks in an exam together with the fields derived from them.
///
/// Only `student`, `marks_obtained` and `remarks` are authored. `grade`,
/// `percentage` and `status` are filled in by the result aggregator before the
/// owning exam result is saved.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct StudentResult {
    pub student: String,
    pub marks_obtained: f64,
    pub grade: Grade,
    pub percentage: f64,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Letter grade bands, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Enum)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pass,
    Fail,
}
