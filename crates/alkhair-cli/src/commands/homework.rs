use alkhair_core::remote::RemoteBackend;
use alkhair_core::SchoolData;

use crate::commands::common::{normalize_argument, truncate};
use crate::error::CliError;

pub fn run_homework<B: RemoteBackend>(
    data: &SchoolData<B>,
    class_name: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let class_name = normalize_argument(class_name, "Class name")?;
    let homework = data.homework().for_class(&class_name);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&homework)?);
        return Ok(());
    }

    if homework.is_empty() {
        println!("No homework set for {class_name}");
        return Ok(());
    }

    for item in &homework {
        println!(
            "{}  {:<12}  {}",
            item.due_date,
            truncate(&item.subject, 12),
            truncate(&item.title, 50)
        );
    }
    Ok(())
}
