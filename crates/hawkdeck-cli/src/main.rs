use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use hawkdeck_core::{
    Config, Session, access_token, build_deck, build_spreadsheet, load_events, load_seating,
    presentation_url, spreadsheet_url, today,
};

#[derive(Parser)]
#[command(name = "hawkdeck")]
#[command(about = "Build per-event analytics spreadsheets and report decks")]
struct Cli {
    /// Event feed JSON file
    #[arg(short, long, default_value = "event_data.json")]
    events: PathBuf,

    /// Seating sections JSON file (optional; placeholders are used when absent)
    #[arg(short, long, default_value = "seating.json")]
    seating: PathBuf,

    /// Presentation id of the deck template to copy
    /// (falls back to the HAWKDECK_TEMPLATE_ID environment variable)
    #[arg(short, long)]
    template_id: Option<String>,

    /// Process events ending on this date instead of today (YYYY-MM-DD)
    #[arg(short, long)]
    date: Option<String>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate the token before touching any input
    let token = match access_token() {
        Ok(token) => token,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    let session = Session::new(token);

    let template_id = match cli
        .template_id
        .or_else(|| std::env::var("HAWKDECK_TEMPLATE_ID").ok())
    {
        Some(id) if !id.is_empty() => id,
        _ => {
            eprintln!(
                "{} no deck template configured: pass --template-id or set HAWKDECK_TEMPLATE_ID",
                style("Error:").red().bold()
            );
            std::process::exit(1);
        }
    };
    let config = Config::new(template_id);

    println!(
        "\n{}  {}\n",
        style("hawkdeck").cyan().bold(),
        style("Event Report Builder").dim()
    );

    let events = load_events(&cli.events).await?;
    let seating = load_seating(&cli.seating).await;

    let report_date = cli.date.unwrap_or_else(today);
    let due: Vec<_> = events.iter().filter(|e| e.is_due(&report_date)).collect();
    if due.is_empty() {
        println!(
            "{} No events ending on {}",
            style("·").dim(),
            style(&report_date).yellow()
        );
        return Ok(());
    }

    for event in due {
        println!("{}", style(&event.event_title).bold());

        let spinner = create_spinner("Building spreadsheet and charts...");
        let handle = build_spreadsheet(&session, event, seating.as_deref()).await?;
        spinner.finish_with_message(format!(
            "{} Spreadsheet: {}",
            style("✓").green().bold(),
            style(spreadsheet_url(&handle.spreadsheet_id)).cyan()
        ));

        let spinner = create_spinner("Assembling report deck...");
        let presentation_id = build_deck(
            &session,
            &config,
            event,
            &handle.spreadsheet_id,
            &handle.chart_ids,
        )
        .await?;
        spinner.finish_with_message(format!(
            "{} Deck: {}",
            style("✓").green().bold(),
            style(presentation_url(&presentation_id)).cyan()
        ));
    }

    Ok(())
}
