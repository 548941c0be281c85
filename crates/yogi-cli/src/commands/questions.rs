use clap::Args;
use yogi_core::catalog::{self, Category};
use yogi_core::scoring;

#[derive(Args)]
pub struct QuestionsArgs {
    /// Only show one category (mental, physical, spiritual, financial)
    #[arg(long)]
    category: Option<Category>,
    /// Include point values for each option
    #[arg(long)]
    points: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: QuestionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let questions: Vec<_> = catalog::questions()
        .iter()
        .filter(|q| args.category.map_or(true, |c| q.category == c))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    let mut current = None;
    for q in questions {
        if current != Some(q.category) {
            current = Some(q.category);
            println!("{}", q.category);
            println!("{}", "=".repeat(q.category.as_str().len()));
        }
        println!("{:>2}. {}", q.id, q.text);
        for (i, option) in q.options.iter().enumerate() {
            if args.points {
                let points = scoring::points_for(q.id, option)?;
                println!("     {}) {} [{}]", i + 1, option, points);
            } else {
                println!("     {}) {}", i + 1, option);
            }
        }
        println!();
    }
    Ok(())
}
