//! One-shot mode: run a single submission and print the panels to stdout.

use ragscope_core::render::TextOptions;
use ragscope_core::{Parameters, PipelineClient, RagscopeConfig, Session, SessionState};
use std::process::ExitCode;

/// How the loaded result is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print the merged result as JSON instead of panels.
    pub json: bool,
    pub text: TextOptions,
}

/// Run `query` once with the configured defaults and print the outcome.
pub async fn run(
    query: &str,
    config: &RagscopeConfig,
    options: OutputOptions,
) -> anyhow::Result<ExitCode> {
    for warning in config.defaults.validate() {
        tracing::warn!("{}", warning);
    }
    let client = PipelineClient::from_config(&config.backend)?;
    let defaults = &config.defaults;
    let params = Parameters::new(
        query,
        defaults.chunk_size,
        defaults.chunk_overlap,
        defaults.top_k,
    );

    match execute(&client, &params, options).await? {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Submit `params` and format the result. The inner `Err` carries the
/// user-facing message of a failed submission.
async fn execute(
    client: &PipelineClient,
    params: &Parameters,
    options: OutputOptions,
) -> anyhow::Result<Result<String, String>> {
    let mut session = Session::new();
    tracing::info!(
        endpoint = client.endpoint(),
        protocol = %client.protocol(),
        "Running one-shot submission"
    );
    match session.run(client, params).await {
        SessionState::Loaded { result, .. } if options.json => {
            Ok(Ok(serde_json::to_string_pretty(result)?))
        }
        state @ SessionState::Loaded { .. } => {
            let panels = ragscope_core::render_panels(state, params.top_k())
                .map(|panels| panels.to_plain_text(options.text))
                .unwrap_or_default();
            Ok(Ok(panels))
        }
        SessionState::Failed { message } => Ok(Err(message.clone())),
        SessionState::Idle | SessionState::Submitting { .. } => {
            anyhow::bail!("submission did not complete")
        }
    }
}
