use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use quiz_client::{UploadController, ViewPhase};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate multiple-choice questions from a document.
#[derive(Parser)]
#[command(name = "quiz", version)]
struct Cli {
    /// Document to upload
    file: PathBuf,

    /// Gemini API key (falls back to $GEMINI_API_KEY)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the quiz service
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "quiz_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let controller = UploadController::new(cli.server);
    controller.set_credential(cli.api_key);
    controller.select_file(cli.file);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}%")
            .expect("valid progress template")
            .progress_chars("=> "),
    );
    bar.set_message("Uploading");

    let mut rx = controller.subscribe();
    loop {
        rx.changed().await?;
        let state = rx.borrow().clone();

        match state.phase() {
            ViewPhase::Uploading { percent, generating } => {
                bar.set_position(u64::from(percent));
                bar.set_message(if generating {
                    "Generating questions..."
                } else {
                    "Uploading"
                });
            }
            ViewPhase::Ready(data) => {
                bar.finish_and_clear();
                println!("{}", data);
                return Ok(());
            }
            ViewPhase::Failed(error) => {
                bar.finish_and_clear();
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            ViewPhase::Empty => {}
        }
    }
}
