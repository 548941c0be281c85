use clap::Args;
use yogi_core::{resolve, Resolution};

#[derive(Args)]
pub struct RouteArgs {
    /// Request path, optionally with a query string
    path: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RouteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resolution = resolve(&args.path);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    match resolution {
        Resolution::Render { route } => println!("200 {}", route.path()),
        Resolution::Redirect { location, status } => println!("{status} -> {location}"),
        Resolution::NotFound => println!("404 not found"),
    }
    Ok(())
}
