use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use customer_flow_e2e::domain::customer::{
    generate_browse_payload, generate_payload, BrowseFixtures, BrowseScenario, UpdateCommand,
    UpdateKind,
};
use customer_flow_e2e::flow::{
    BaselineIdentity, CreateOptions, FetchStrategy, UpdateSubmissionOutcome, VerificationRules,
    DEFAULT_BASELINE_RETRIES,
};
use customer_flow_e2e::metrics::Metrics;
use customer_flow_e2e::{ApiConfig, CustomerApiClient, FlowOrchestrator};

const INVALID_API_KEY: &str = "invalid-api-key";

#[derive(Parser)]
#[command(name = "customer-flow", about = "Drive customer API workflows end to end")]
struct Cli {
    /// Print Prometheus metrics when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a random customer and verify what the backend stored
    Create {
        /// Skip the lookup by alcohol license number
        #[arg(long)]
        global_id_only: bool,
        /// Expected canonical account name, instead of the generated one
        #[arg(long)]
        expected_account_name: Option<String>,
    },
    /// Seed a baseline customer and write its identity file
    Baseline {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BASELINE_RETRIES)]
        max_retries: u32,
        /// Identity to report when seeding fails
        #[arg(long)]
        fallback_global_id: Option<String>,
    },
    /// Send one browse scenario (e.g. validStateOnly, missingState, unauthorized)
    Browse {
        #[arg(long)]
        scenario: String,
    },
    /// Apply a valid update action to an existing customer and wait for it
    Update {
        #[arg(long)]
        global_id: String,
        /// accountDetails, billingAddress, dropPoint, license or paymentDetails
        #[arg(long)]
        action: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,customer_flow_e2e=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = ApiConfig::from_env().context("Loading API configuration")?;
    tracing::info!(base_url = %config.base_url, "Customer API configured");

    let metrics = Arc::new(Metrics::new()?);
    let client = CustomerApiClient::new(config.clone())?;
    let orchestrator = FlowOrchestrator::new(client).with_metrics(metrics.clone());

    let ok = match cli.command {
        Command::Create {
            global_id_only,
            expected_account_name,
        } => run_create(&orchestrator, global_id_only, expected_account_name).await?,
        Command::Baseline {
            file,
            max_retries,
            fallback_global_id,
        } => run_baseline(&orchestrator, file, max_retries, fallback_global_id).await?,
        Command::Browse { scenario } => run_browse(config, metrics.clone(), &scenario).await?,
        Command::Update { global_id, action } => {
            run_update(&orchestrator, &global_id, &action).await?
        }
    };

    if cli.metrics {
        println!("{}", metrics.encode_text()?);
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run_create(
    orchestrator: &FlowOrchestrator,
    global_id_only: bool,
    expected_account_name: Option<String>,
) -> anyhow::Result<bool> {
    let payload = generate_payload();
    let options = CreateOptions {
        fetch: if global_id_only {
            FetchStrategy::GlobalIdOnly
        } else {
            FetchStrategy::GlobalIdAndLicense
        },
        rules: VerificationRules {
            expected_account_name,
        },
    };

    let outcome = orchestrator.create_and_verify(&payload, &options).await?;

    tracing::info!(
        outcome = outcome.label(),
        request_id = outcome.request_id().unwrap_or("N/A"),
        global_id = outcome.global_id().unwrap_or("N/A"),
        "Create flow finished"
    );
    for mismatch in outcome.mismatches() {
        tracing::error!(mismatch = %mismatch, "Verification failed");
    }

    Ok(outcome.is_clean())
}

async fn run_baseline(
    orchestrator: &FlowOrchestrator,
    file: PathBuf,
    max_retries: u32,
    fallback_global_id: Option<String>,
) -> anyhow::Result<bool> {
    let result = orchestrator.build_baseline(&file, max_retries).await;
    let built = result.is_ok();

    let identity = match fallback_global_id {
        Some(fallback) => BaselineIdentity::resolve(result, BaselineIdentity::new(fallback)),
        None => BaselineIdentity::from(&result?),
    };

    tracing::info!(
        global_id = %identity.global_id,
        licence_number = identity.licence_number.as_deref().unwrap_or("N/A"),
        address_id = identity.address_id.as_deref().unwrap_or("N/A"),
        fresh = built,
        "Baseline identity"
    );

    Ok(built)
}

async fn run_browse(config: ApiConfig, metrics: Arc<Metrics>, scenario: &str) -> anyhow::Result<bool> {
    let scenario = BrowseScenario::from_name(scenario)
        .ok_or_else(|| anyhow!("Unknown browse scenario: {}", scenario))?;

    let config = match scenario {
        BrowseScenario::Unauthorized => config.with_api_key(INVALID_API_KEY),
        _ => config,
    };
    let client = CustomerApiClient::new(config)?.with_metrics(metrics);

    let payload = generate_browse_payload(scenario, &BrowseFixtures::default());
    let response = client.browse_customers(&payload).await?;

    tracing::info!(
        scenario = scenario.name(),
        status = response.status,
        records = response.records().len(),
        "Browse finished"
    );
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(true)
}

async fn run_update(orchestrator: &FlowOrchestrator, global_id: &str, action: &str) -> anyhow::Result<bool> {
    let kind = UpdateKind::from_action_name(action)
        .ok_or_else(|| anyhow!("Unknown update action: {}", action))?;

    // Drop points attach to an existing address
    let address_id = match kind {
        UpdateKind::DropPoint => orchestrator
            .client()
            .get_customer_by_global_id(global_id)
            .await?
            .customer
            .first_address()
            .and_then(|a| a.address_id.clone()),
        _ => None,
    };

    let command = UpdateCommand::valid(kind, address_id.as_deref());
    let outcome = orchestrator.submit_update_and_verify(global_id, &command).await?;

    match &outcome {
        UpdateSubmissionOutcome::Rejected { status, api_error, .. } => {
            tracing::error!(
                status = status,
                api_error = api_error.as_deref().unwrap_or("Unknown"),
                "Update rejected"
            );
        }
        UpdateSubmissionOutcome::Completed(result) => {
            tracing::info!(
                outcome = result.label(),
                error = result.error().unwrap_or("N/A"),
                "Update flow finished"
            );
        }
    }

    Ok(matches!(
        &outcome,
        UpdateSubmissionOutcome::Completed(result) if result.is_active()
    ))
}
