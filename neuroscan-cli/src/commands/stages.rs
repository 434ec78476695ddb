//! Stage catalogue command

use anyhow::Result;
use colored::*;

use neuroscan_pipeline::stages::standard_stages;

pub fn handle_stages() -> Result<()> {
    let stages = standard_stages();

    println!("{}", format!("{} stage(s):", stages.len()).bold());
    println!();
    for stage in &stages {
        println!(
            "  {} {} {}",
            format!("{}.", stage.ordinal + 1).cyan(),
            stage.display_name.bold(),
            format!("[{}]", stage.stage_id).dimmed()
        );
        println!("     {}", stage.summary);
        if stage.result_keywords.is_empty() {
            println!("     Keeps: {}", "full output".dimmed());
        } else {
            println!("     Keeps: {}", stage.result_keywords.join(", ").dimmed());
        }
        println!();
    }

    Ok(())
}
