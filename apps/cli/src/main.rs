use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpResourceClient, JsonService, TeststepResource};
use controllers::{
    pretty_print_json_or_xml, ArticlesController, InvocationOutcome, RequestGeneration,
    SoapTeststepController, TeststepContext, TeststepSession,
};
use shared::{
    domain::{ArticleId, TestResult, TestcaseId, TeststepId},
    protocol::AssertionVerificationRequest,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::{FileRequestModal, TerminalErrorDisplay, TerminalNavigator};

#[derive(Parser, Debug)]
#[command(name = "irontest", about = "Drive Iron Test test steps and articles from a terminal")]
struct Cli {
    /// Config file; defaults to ./irontest.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured server URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Teststep {
        #[command(subcommand)]
        command: TeststepCommand,
    },
    Articles {
        #[command(subcommand)]
        command: ArticlesCommand,
    },
    /// List managed endpoints of one type.
    Endpoints {
        #[arg(long = "type", default_value = "SOAP")]
        endpoint_type: String,
    },
    Assertion {
        #[command(subcommand)]
        command: AssertionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TeststepCommand {
    Show {
        testcase_id: i64,
        teststep_id: i64,
    },
    /// Run the test step against its endpoint and print the response.
    Invoke {
        testcase_id: i64,
        teststep_id: i64,
        /// Print the response body without reformatting.
        #[arg(long)]
        raw: bool,
    },
    /// Replace the test step request with a generated one and save it.
    Generate {
        testcase_id: i64,
        teststep_id: i64,
        /// Generated request to apply; without it the generation is dismissed.
        #[arg(long)]
        request_file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ArticlesCommand {
    List,
    Grid,
    Show {
        article_id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Update {
        article_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Remove {
        article_id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum AssertionCommand {
    /// Verify an assertion against an input, both read from a JSON file.
    Verify {
        #[arg(long)]
        file: PathBuf,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    init_tracing(&settings.log_filter);
    info!(server_url = %settings.server_url, "using Iron Test server");

    let client = Arc::new(
        HttpResourceClient::with_timeout(
            &settings.server_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
        .context("failed to build resource client")?,
    );

    match cli.command {
        Command::Teststep { command } => run_teststep(command, client, &settings).await,
        Command::Articles { command } => run_articles(command, client).await,
        Command::Endpoints { endpoint_type } => {
            let endpoints = client
                .find_managed_endpoints_by_type(&endpoint_type)
                .await
                .context("failed to list managed endpoints")?;
            for endpoint in endpoints {
                println!(
                    "{}\t{}\t{}",
                    endpoint.id.map(|id| id.to_string()).unwrap_or_default(),
                    endpoint.name.unwrap_or_default(),
                    endpoint.url.unwrap_or_default()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Assertion {
            command: AssertionCommand::Verify { file },
        } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let request: AssertionVerificationRequest = serde_json::from_str(&raw)
                .with_context(|| format!("'{}' is not a verification request", file.display()))?;
            let result = client
                .verify_assertion(&request)
                .await
                .context("failed to verify assertion")?;
            match result.result {
                TestResult::Passed => {
                    println!("PASSED");
                    Ok(ExitCode::SUCCESS)
                }
                TestResult::Failed => {
                    println!("FAILED: {}", result.error.unwrap_or_default());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

async fn run_teststep(
    command: TeststepCommand,
    client: Arc<HttpResourceClient>,
    settings: &Settings,
) -> Result<ExitCode> {
    let (testcase_id, teststep_id, request_file) = match &command {
        TeststepCommand::Show {
            testcase_id,
            teststep_id,
        }
        | TeststepCommand::Invoke {
            testcase_id,
            teststep_id,
            ..
        } => (*testcase_id, *teststep_id, None),
        TeststepCommand::Generate {
            testcase_id,
            teststep_id,
            request_file,
        } => (*testcase_id, *teststep_id, request_file.clone()),
    };

    let teststep = client
        .get(TestcaseId(testcase_id), TeststepId(teststep_id))
        .await
        .with_context(|| format!("failed to load teststep {teststep_id} of testcase {testcase_id}"))?;

    let errors = Arc::new(TerminalErrorDisplay);
    let session = Arc::new(
        TeststepSession::new(teststep, client.clone(), errors.clone())
            .with_autosave_delay(Duration::from_millis(settings.autosave_delay_ms)),
    );
    let controller = SoapTeststepController::new(
        session.clone(),
        client,
        Arc::new(FileRequestModal::new(request_file)),
        errors,
    );

    match command {
        TeststepCommand::Show { .. } => {
            println!("{}", serde_json::to_string_pretty(&session.snapshot().await)?);
            Ok(ExitCode::SUCCESS)
        }
        TeststepCommand::Invoke { raw, .. } => match controller.invoke().await {
            InvocationOutcome::Succeeded => {
                let body = controller.temp_data().await.soap_response.unwrap_or_default();
                if raw {
                    println!("{body}");
                } else {
                    println!("{}", pretty_print_json_or_xml(&body));
                }
                Ok(ExitCode::SUCCESS)
            }
            InvocationOutcome::Failed => Ok(ExitCode::FAILURE),
        },
        TeststepCommand::Generate { .. } => match controller.generate_request().await {
            RequestGeneration::Saved => {
                println!("generated request saved to teststep {teststep_id}");
                Ok(ExitCode::SUCCESS)
            }
            RequestGeneration::SaveFailed => {
                eprintln!("generated request was not saved to teststep {teststep_id}");
                Ok(ExitCode::FAILURE)
            }
            RequestGeneration::Dismissed => {
                println!("generation dismissed; teststep {teststep_id} unchanged");
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

async fn run_articles(command: ArticlesCommand, client: Arc<HttpResourceClient>) -> Result<ExitCode> {
    let controller = ArticlesController::new(client, Arc::new(TerminalNavigator));

    match command {
        ArticlesCommand::List => {
            controller.find().await?;
            for article in controller.view().await.articles {
                print_article_row(&article);
            }
        }
        ArticlesCommand::Grid => {
            controller.find_grid().await?;
            let view = controller.view().await;
            let header: Vec<_> = view.column_defs.iter().map(|c| c.name.as_str()).collect();
            println!("{}", header.join("\t"));
            for article in &view.articles {
                println!("{}\t{}", article.title, article.content);
            }
        }
        ArticlesCommand::Show { article_id } => {
            controller.find_one(ArticleId(article_id)).await?;
            if let Some(article) = controller.view().await.article {
                println!("{}", serde_json::to_string_pretty(&article)?);
            }
        }
        ArticlesCommand::Create { title, content } => {
            let is_valid = !title.trim().is_empty() && !content.trim().is_empty();
            controller.set_form(title, content).await;
            controller.create(is_valid).await?;
            if controller.view().await.submitted {
                eprintln!("title and content are required");
                return Ok(ExitCode::from(2));
            }
        }
        ArticlesCommand::Update {
            article_id,
            title,
            content,
        } => {
            controller.find_one(ArticleId(article_id)).await?;
            controller
                .edit_article(|article| {
                    if let Some(title) = title {
                        article.title = title;
                    }
                    if let Some(content) = content {
                        article.content = content;
                    }
                })
                .await;
            let is_valid = controller
                .view()
                .await
                .article
                .is_some_and(|article| !article.title.trim().is_empty());
            controller.update(is_valid).await?;
            if controller.view().await.submitted {
                eprintln!("title is required");
                return Ok(ExitCode::from(2));
            }
        }
        ArticlesCommand::Remove { article_id } => {
            controller.find_one(ArticleId(article_id)).await?;
            if let Some(article) = controller.view().await.article {
                controller.remove(&article).await?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_article_row(article: &shared::protocol::Article) {
    println!(
        "{}\t{}",
        article.id.map(|id| id.to_string()).unwrap_or_default(),
        article.title
    );
}
