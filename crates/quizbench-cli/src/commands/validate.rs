//! The `quizbench validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizbench_client::load_config_from;
use quizbench_core::parser::validate_question_bank;

pub fn execute(
    question_bank: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = match question_bank {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.question_bank,
    };

    let summary = validate_question_bank(&path)?;

    match format.as_str() {
        "text" => {
            println!(
                "Question bank: {} ({} records, {} with questions, {} with choices)",
                summary.path.display(),
                summary.records,
                summary.with_question,
                summary.with_choices
            );
            println!("Question bank valid.");
        }
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => anyhow::bail!("unknown format: '{other}' (expected text or json)"),
    }

    Ok(())
}
