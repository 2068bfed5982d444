use thiserror::Error;

use crate::models::domain::{Analytics, Grade, ResultStatus, StudentResult};
use crate::models::dto::request::StudentResultInput;

/// Lower bound (inclusive, in percent) of each grade band, best band first.
const GRADE_BANDS: [(f64, Grade); 6] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
    (40.0, Grade::D),
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    #[error("total marks must be a positive number, got {0}")]
    InvalidTotalMarks(f64),

    #[error("marks obtained by '{student}' must be a non-negative number, got {marks}")]
    InvalidMarks { student: String, marks: f64 },
}

pub type AggregationResult<T> = Result<T, AggregationError>;

/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derives grades, pass/fail status and class analytics from raw marks.
///
/// Every function here is pure: same input, same output, no shared state.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Letter grade for a score. The percentage is compared unrounded, so
    /// 89.999% is still an `A`.
    pub fn grade_of(marks_obtained: f64, total_marks: f64) -> AggregationResult<Grade> {
        ensure_total_marks(total_marks)?;

        let percentage = marks_obtained / total_marks * 100.0;
        let grade = GRADE_BANDS
            .iter()
            .find(|(lower_bound, _)| percentage >= *lower_bound)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F);

        Ok(grade)
    }

    pub fn status_of(marks_obtained: f64, passing_marks: f64) -> ResultStatus {
        if marks_obtained >= passing_marks {
            ResultStatus::Pass
        } else {
            ResultStatus::Fail
        }
    }

    pub fn percentage_of(marks_obtained: f64, total_marks: f64) -> AggregationResult<f64> {
        ensure_total_marks(total_marks)?;
        Ok(round2(marks_obtained / total_marks * 100.0))
    }

    /// Class-wide summary over an already graded list.
    ///
    /// An empty list yields `Analytics::default()`. `average_percentage` is
    /// taken from the rounded `average_marks`, not from the raw mean.
    pub fn aggregate(
        student_results: &[StudentResult],
        total_marks: f64,
    ) -> AggregationResult<Analytics> {
        ensure_total_marks(total_marks)?;

        if student_results.is_empty() {
            return Ok(Analytics::default());
        }

        let count = student_results.len() as u32;
        let passed = student_results
            .iter()
            .filter(|r| r.status == ResultStatus::Pass)
            .count() as u32;

        let marks = student_results.iter().map(|r| r.marks_obtained);
        let sum: f64 = marks.clone().sum();
        let highest = marks.clone().fold(f64::MIN, f64::max);
        let lowest = marks.fold(f64::MAX, f64::min);

        let average_marks = round2(sum / f64::from(count));
        let average_percentage = round2(average_marks / total_marks * 100.0);

        Ok(Analytics {
            total_students: count,
            students_appeared: count,
            passed_students: passed,
            failed_students: count - passed,
            average_marks,
            average_percentage,
            highest_marks: highest,
            lowest_marks: lowest,
        })
    }

    /// Grades one raw entry against the exam's marking scheme.
    pub fn grade_entry(
        input: &StudentResultInput,
        total_marks: f64,
        passing_marks: f64,
    ) -> AggregationResult<StudentResult> {
        if !input.marks_obtained.is_finite() || input.marks_obtained < 0.0 {
            return Err(AggregationError::InvalidMarks {
                student: input.student.clone(),
                marks: input.marks_obtained,
            });
        }

        Ok(StudentResult {
            student: input.student.clone(),
            marks_obtained: input.marks_obtained,
            grade: Self::grade_of(input.marks_obtained, total_marks)?,
            percentage: Self::percentage_of(input.marks_obtained, total_marks)?,
            status: Self::status_of(input.marks_obtained, passing_marks),
            remarks: input.remarks.clone(),
        })
    }

    /// Grades every entry then summarises the class, all or nothing.
    pub fn evaluate(
        inputs: &[StudentResultInput],
        total_marks: f64,
        passing_marks: f64,
    ) -> AggregationResult<(Vec<StudentResult>, Analytics)> {
        let graded = inputs
            .iter()
            .map(|input| Self::grade_entry(input, total_marks, passing_marks))
            .collect::<AggregationResult<Vec<_>>>()?;

        let analytics = Self::aggregate(&graded, total_marks)?;
        Ok((graded, analytics))
    }
}

fn ensure_total_marks(total_marks: f64) -> AggregationResult<()> {
    if total_marks.is_finite() && total_marks > 0.0 {
        Ok(())
    } else {
        Err(AggregationError::InvalidTotalMarks(total_marks))
    }
}
