use alkhair_core::models::Attendance;
use alkhair_core::remote::RemoteBackend;
use alkhair_core::SchoolData;
use serde::Serialize;

use crate::commands::common::normalize_argument;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct AttendanceSummary {
    pub student_id: String,
    pub percentage: Option<f64>,
    pub marks: Vec<Attendance>,
}

pub fn attendance_summary<B: RemoteBackend>(
    data: &SchoolData<B>,
    student_id: &str,
) -> Result<AttendanceSummary, CliError> {
    let student_id = normalize_argument(student_id, "Student ID")?;
    let repo = data.attendance();
    Ok(AttendanceSummary {
        percentage: repo.percentage_for(&student_id),
        marks: repo.for_student(&student_id),
        student_id,
    })
}

pub fn run_attendance<B: RemoteBackend>(
    data: &SchoolData<B>,
    student_id: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let summary = attendance_summary(data, student_id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let Some(percentage) = summary.percentage else {
        println!("No attendance recorded for {}", summary.student_id);
        return Ok(());
    };

    println!(
        "{}: {percentage:.1}% attended over {} marked days",
        summary.student_id,
        summary.marks.len()
    );
    for mark in &summary.marks {
        println!("  {}  {:<6}  {:?}", mark.date, mark.class_name, mark.status);
    }
    Ok(())
}
