// nyaya-agent-rs/src/main.rs
// Terminal chat over one Nyaya Sahayak session

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use nyaya_agent::config::{DialogueConfig, DEFAULT_PROVIDER};
use nyaya_agent::drafts::SavedDraft;
use nyaya_agent::fir::{DialogueState, FirForm, FirRecord};
use nyaya_agent::{
    ChatSession, DocumentGenerator, GeminiClient, GenerationOutcome, Language, LegalAgent, TextGenerator,
};

const HELP: &str = "Commands: /lang (switch English/Hindi), /cancel (abandon the FIR), /manual <value> (enter a field by hand), /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load environment variables
    dotenv::dotenv().ok();

    let client = GeminiClient::from_env().context("failed to configure the Gemini client")?;
    let dialogue_config =
        DialogueConfig::from_provider(&**DEFAULT_PROVIDER).context("invalid dialogue configuration")?;

    log::info!(
        "Starting chat with models {} / {}",
        client.config().reasoning_model,
        client.config().fast_model
    );

    let generator: Arc<dyn TextGenerator> = Arc::new(client);
    let agent = LegalAgent::new(generator.clone());
    let drafts = DocumentGenerator::new(generator);
    let session = ChatSession::from_config(&dialogue_config);

    if let Some(welcome) = session.messages().await.first() {
        println!("{}\n", welcome.text);
    }
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/lang", _) => {
                let language = session.toggle_language().await;
                println!("Language: {}\n", language.name());
            }
            ("/cancel", _) => {
                if session.cancel_fir().await {
                    println!("FIR collection cancelled.\n");
                } else {
                    println!("No FIR in progress.\n");
                }
            }
            ("/manual", value) => match session.fir_state().await {
                Some(DialogueState::ManualEntry { field }) => {
                    match session.supply_manual_entry(field, value).await {
                        Ok(prompt) => println!("{}\n", prompt),
                        Err(err) => eprintln!("{}\n", err),
                    }
                }
                _ => println!("No field is waiting for manual entry.\n"),
            },
            _ => match session.submit(&agent, line).await {
                Ok(outcome) => {
                    let language = session.language().await;
                    println!("{}\n", outcome.response.response_text);
                    if let Some(prompt) = outcome.follow_up {
                        println!("{}\n", prompt);
                    }
                    if let Some(workflow) = outcome.navigation {
                        println!("[{}]\n", workflow.label(language));
                    }
                    if let Some(record) = outcome.fir_ready {
                        print_draft(&drafts, &record, language).await?;
                    }
                }
                Err(err) if err.is_fatal() => return Err(err).context("chat turn failed"),
                Err(err) => eprintln!("{}\n", err),
            },
        }
    }

    Ok(())
}

async fn print_draft(drafts: &DocumentGenerator, record: &FirRecord, language: Language) -> anyhow::Result<()> {
    match drafts.fir_draft(record, language).await? {
        GenerationOutcome::Generated(content) => {
            println!("{}\n", content);
            let draft = SavedDraft::new(FirForm::from_record(record), content);
            println!("{}\n", serde_json::to_string_pretty(&draft)?);
        }
        GenerationOutcome::Failed { message, reason } => {
            log::warn!("FIR generation failed: {}", reason);
            println!("{}\n", message);
        }
    }
    Ok(())
}
