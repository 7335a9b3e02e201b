#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::Write;

use args::Args;
use clap::Parser;
use futures_util::StreamExt;
use relay_config::{Config, LogFormat, TelemetryConfig};
use relay_llm::{Content, GenerateConfig, LlmRequest, LlmResponse, Model, OpenRouterModel};
use secrecy::SecretString;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration, falling back to defaults when no file is given
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(api_key) = args.api_key {
        config.openrouter.api_key = Some(SecretString::from(api_key));
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if args.json_logs {
        config.telemetry.get_or_insert_with(TelemetryConfig::default).format = LogFormat::Json;
    }
    config.validate()?;

    relay_telemetry::init(config.telemetry.as_ref(), "info")?;

    let model = OpenRouterModel::new(&config.model, &config.openrouter)?;

    let mut request = LlmRequest::from_text(args.prompt);
    if let Some(system) = args.system {
        request = request.with_config(GenerateConfig {
            system_instruction: Some(Content::from_text(system, "system")),
            ..GenerateConfig::default()
        });
    }

    let stream = !args.no_stream;
    tracing::info!(model = model.name(), stream, "sending prompt");

    tokio::select! {
        result = run(&model, &request, stream) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!();
            tracing::info!("interrupted, response abandoned");
        }
    }

    Ok(())
}

/// Print the model's reply as it arrives
async fn run(model: &impl Model, request: &LlmRequest, stream: bool) -> anyhow::Result<()> {
    let mut responses = model.generate_content(request, stream);

    while let Some(response) = responses.next().await {
        let response = response?;

        if response.partial {
            print!("{}", response.text());
            std::io::stdout().flush()?;
            continue;
        }

        // Streamed text has already been printed chunk by chunk
        if !stream {
            print!("{}", response.text());
        }
        print_function_calls(&response);

        if response.turn_complete {
            println!();
            log_completion(&response);
        }
    }

    Ok(())
}

fn print_function_calls(response: &LlmResponse) {
    let Some(content) = &response.content else {
        return;
    };

    for call in content.function_calls() {
        let args = serde_json::Value::Object(call.args.clone());
        println!("\n[call {}] {}({args})", call.id, call.name);
    }
}

fn log_completion(response: &LlmResponse) {
    match &response.usage_metadata {
        Some(usage) => tracing::info!(
            finish_reason = ?response.finish_reason,
            prompt_tokens = usage.prompt_token_count,
            completion_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            "response complete"
        ),
        None => tracing::info!(finish_reason = ?response.finish_reason, "response complete"),
    }
}
