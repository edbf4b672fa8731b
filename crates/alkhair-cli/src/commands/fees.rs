use alkhair_core::models::Fee;
use alkhair_core::remote::RemoteBackend;
use alkhair_core::SchoolData;
use serde::Serialize;

use crate::commands::common::{format_amount, normalize_argument};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct FeeStatement {
    pub student_id: String,
    pub outstanding: i64,
    pub fees: Vec<Fee>,
}

pub fn fee_statement<B: RemoteBackend>(
    data: &SchoolData<B>,
    student_id: &str,
) -> Result<FeeStatement, CliError> {
    let student_id = normalize_argument(student_id, "Student ID")?;
    let repo = data.fees();
    Ok(FeeStatement {
        outstanding: repo.outstanding_for(&student_id),
        fees: repo.for_student(&student_id),
        student_id,
    })
}

pub fn run_fees<B: RemoteBackend>(
    data: &SchoolData<B>,
    student_id: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let statement = fee_statement(data, student_id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    if statement.fees.is_empty() {
        println!("No fees recorded for {}", statement.student_id);
        return Ok(());
    }

    for fee in &statement.fees {
        println!(
            "  {}  {:>10}  {:?}  owed {}",
            fee.month,
            format_amount(fee.amount),
            fee.status,
            format_amount(fee.outstanding())
        );
    }
    println!(
        "{}: outstanding {}",
        statement.student_id,
        format_amount(statement.outstanding)
    );
    Ok(())
}
