use std::path::PathBuf;

use clap::Args;
use yogi_core::{AssessmentResults, Category, Response, ResponseSet};

#[derive(Args)]
pub struct ScoreArgs {
    /// JSON file holding a list of {"question_id", "answer"} objects
    file: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read {}: {e}", args.file.display()))?;
    let responses: Vec<Response> = serde_json::from_str(&content)?;
    let responses = ResponseSet::from(responses);
    let results = AssessmentResults::from_responses(&responses)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

pub fn print_results(results: &AssessmentResults) {
    println!("Your Progress Overview");
    for category in Category::ALL {
        let xp = results.category_xp.get(category);
        let max = AssessmentResults::category_max(category);
        println!("  {:<10} {:>3} / {:<3} {}", category.to_string(), xp, max, bar(xp, max));
    }
    println!();
    println!("  Total XP:   {}", results.total_xp);
    println!("  Percentage: {}%", results.percentage);
    println!("  Level:      {}", results.level);
    println!("  Strongest:  {}", results.strongest);
    println!("  Focus on:   {}", results.weakest);
    if results.answered < results.question_count {
        println!(
            "  ({} of {} questions answered)",
            results.answered, results.question_count
        );
    }
}

fn bar(value: u32, max: u32) -> String {
    const WIDTH: u32 = 20;
    let filled = if max == 0 { 0 } else { value * WIDTH / max };
    format!(
        "[{}{}]",
        "#".repeat(filled as usize),
        "-".repeat((WIDTH - filled) as usize)
    )
}
