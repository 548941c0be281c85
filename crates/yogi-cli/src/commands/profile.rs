use clap::Subcommand;
use yogi_core::{ProfileField, ProfileUpdate, RespondentProfile};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Check whether a set of answers completes the profile
    Check {
        /// field=value assignment (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List profile fields and accepted values
    Fields,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Check { assignments, json } => {
            let mut profile = RespondentProfile::new();
            for assignment in &assignments {
                profile.apply(ProfileUpdate::parse_assignment(assignment)?);
            }
            let missing: Vec<&str> = profile.missing_fields().iter().map(|f| f.as_str()).collect();

            if json {
                let out = serde_json::json!({
                    "complete": missing.is_empty(),
                    "missing": missing,
                    "profile": profile,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if missing.is_empty() {
                println!("complete");
            } else {
                println!("incomplete: missing {}", missing.join(", "));
            }

            if !missing.is_empty() {
                std::process::exit(1);
            }
        }
        ProfileAction::Fields => {
            for field in ProfileField::ALL {
                let choices = field.choices();
                if choices.is_empty() {
                    println!("{:<16} {}", field.as_str(), field.label());
                } else {
                    println!(
                        "{:<16} {} [{}]",
                        field.as_str(),
                        field.label(),
                        choices.join(", ")
                    );
                }
            }
        }
    }
    Ok(())
}
