use std::io::{self, BufRead, Write};

use clap::Args;
use tracing::debug;
use yogi_core::{
    Config, ContactForm, Event, FlowDriver, FlowMode, ProfileField, ProfileUpdate, Stage,
    SubmissionPayload, Submitter,
};

use super::score::print_results;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Args)]
pub struct AssessArgs {
    /// One list of questions without category intros
    #[arg(long)]
    flat: bool,
    /// Override the auto-advance delay from config
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,
    /// Print flow events as JSON lines on stdout; prompts go to stderr
    #[arg(long)]
    json: bool,
}

pub fn run(args: AssessArgs) -> CliResult {
    let config = Config::load_or_default();
    let mut flow = config.flow.clone();
    if args.flat {
        flow.mode = FlowMode::Flat;
    }
    if let Some(ms) = args.delay_ms {
        flow.auto_advance_ms = ms;
    }
    let submitter = Submitter::from_config(&config.submission)?;
    debug!(mode = ?flow.mode, delay_ms = flow.auto_advance_ms, target = %submitter.target(), "starting assessment");

    let runtime = tokio::runtime::Runtime::new()?;
    let stdin = io::stdin();
    let mut console = Console {
        input: stdin.lock(),
        json: args.json,
    };
    runtime.block_on(run_flow(&mut console, FlowDriver::from_config(&flow), &submitter))
}

struct Console<R> {
    input: R,
    json: bool,
}

impl<R: BufRead> Console<R> {
    fn say(&self, text: &str) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    fn ask(&mut self, label: &str) -> CliResult<String> {
        if self.json {
            eprint!("{label}: ");
            io::stderr().flush()?;
        } else {
            print!("{label}: ");
            io::stdout().flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err("input closed before the assessment finished".into());
        }
        Ok(line.trim().to_string())
    }

    fn emit(&self, events: &[Event]) -> CliResult {
        if self.json {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        Ok(())
    }
}

async fn run_flow<R: BufRead>(
    console: &mut Console<R>,
    mut driver: FlowDriver,
    submitter: &Submitter,
) -> CliResult {
    loop {
        match driver.inspect(|s| s.stage()).await {
            Stage::Stats => {
                collect_profile(console, &mut driver).await?;
                console.emit(&driver.proceed().await?)?;
            }
            Stage::AssessmentIntro => {
                console.say("");
                console.say("You want to be better. Here's how you start.");
                console.say("Fourteen questions across four parts of life: mental, physical, spiritual and financial.");
                console.ask("Press Enter to begin")?;
                console.emit(&driver.proceed().await?)?;
            }
            Stage::Intro => {
                console.say("Answer honestly. Every answer earns up to 10 XP.");
                console.ask("Press Enter to continue")?;
                console.emit(&driver.proceed().await?)?;
            }
            Stage::SectionIntro { .. } => {
                let category = driver
                    .inspect(|s| s.current_section().and_then(|section| section.category))
                    .await;
                if let Some(category) = category {
                    console.say("");
                    console.say(&format!("{category}: {}", category.tagline()));
                }
                console.ask("Press Enter to continue")?;
                console.emit(&driver.proceed().await?)?;
            }
            Stage::Questions { .. } => ask_question(console, &mut driver).await?,
            Stage::Completion => break,
        }
    }

    let session = driver.finish().await;
    let results = session.results()?;
    if console.json {
        println!("{}", serde_json::to_string(&results)?);
    } else {
        println!();
        print_results(&results);
    }

    let contact = collect_contact(console)?;
    let payload = SubmissionPayload::from_session(&session, contact)?;
    let confirmation = submitter.submit(&payload).await?;
    let target = submitter.target();
    console.emit(&[confirmation.to_event(&target)])?;
    console.say(&format!(
        "Submitted to {target} (confirmation {})",
        confirmation.confirmation_id
    ));
    Ok(())
}

async fn collect_profile<R: BufRead>(console: &mut Console<R>, driver: &mut FlowDriver) -> CliResult {
    console.say("Tell us about yourself.");
    // Visibility is rechecked per field: education questions follow is_student.
    for field in ProfileField::ALL {
        let visible = driver
            .inspect(|s| s.profile().visible_fields().contains(&field))
            .await;
        if visible {
            ask_field(console, driver, field).await?;
        }
    }

    loop {
        let missing = driver.inspect(|s| s.profile().missing_fields()).await;
        if missing.is_empty() {
            return Ok(());
        }
        let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
        console.say(&format!("Please complete: {}", labels.join(", ")));
        for field in missing {
            ask_field(console, driver, field).await?;
        }
    }
}

async fn ask_field<R: BufRead>(
    console: &mut Console<R>,
    driver: &mut FlowDriver,
    field: ProfileField,
) -> CliResult {
    let choices = field.choices();
    let label = if choices.is_empty() {
        field.label().to_string()
    } else {
        format!("{} [{}]", field.label(), choices.join("/"))
    };
    let raw = console.ask(&label)?;
    let events = driver
        .update_profile(ProfileUpdate::for_field(field, &raw))
        .await?;
    console.emit(&events)
}

async fn ask_question<R: BufRead>(console: &mut Console<R>, driver: &mut FlowDriver) -> CliResult {
    let (question, selected, progress) = driver
        .inspect(|s| {
            (
                s.current_question(),
                s.selected_answer().map(str::to_string),
                s.progress(),
            )
        })
        .await;
    let question = question.ok_or("no question on screen")?;

    console.say("");
    match progress.position_in_section {
        Some((pos, len)) => console.say(&format!("[{} {pos}/{len}] {}", question.category, question.text)),
        None => console.say(question.text),
    }
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected.as_deref() == Some(*option) { " *" } else { "" };
        console.say(&format!("  {}) {option}{marker}", i + 1));
    }

    let input = console.ask("Answer (1-4, b = back, n = next)")?;
    match input.to_ascii_lowercase().as_str() {
        "b" | "back" => match driver.go_back().await {
            Ok(events) => console.emit(&events)?,
            Err(e) => console.say(&format!("  {e}")),
        },
        "n" | "next" => match driver.go_next().await {
            Ok(events) => console.emit(&events)?,
            Err(e) => console.say(&format!("  {e}")),
        },
        _ => match question.match_option(&input) {
            Some(option) => {
                let mut events = driver.select_answer(option).await?;
                for event in &events {
                    if let Event::AnswerRecorded {
                        points, feedback, ..
                    } = event
                    {
                        console.say(&format!("  +{points} XP. {feedback}"));
                    }
                }
                events.extend(driver.settle().await);
                console.emit(&events)?;
            }
            None => console.say("  Pick 1-4 or type one of the options."),
        },
    }
    Ok(())
}

fn collect_contact<R: BufRead>(console: &mut Console<R>) -> CliResult<ContactForm> {
    console.say("");
    console.say("Where should we send your personalized plan?");
    loop {
        let email = console.ask("Email")?;
        let phone = console.ask("Phone")?;
        let mut contact = ContactForm::new(email, phone);
        let missing = contact.missing_fields();
        if missing.is_empty() {
            contact.name = optional(console.ask("Name (optional)")?);
            contact.age = optional(console.ask("Age (optional)")?);
            contact.goals = optional(console.ask("Goals (optional)")?);
            return Ok(contact);
        }
        console.say(&format!("Please provide a valid {}", missing.join(" and ")));
    }
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
