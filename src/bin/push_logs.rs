// src/bin/push_logs.rs

use clap::Parser;
use std::time::Duration;

use ops_automation::{clients::IngestClient, services::log_emitter::emit_logs};

/// Envia logs sintéticos para o OpenObserve
#[derive(Debug, Parser)]
#[command(name = "push-logs", about = "Send multiple logs to OpenObserve")]
struct Args {
    /// Quantidade de logs a enviar
    num_logs: usize,

    #[arg(long, default_value = "https://openobserve-ingester.example.com")]
    host: String,

    #[arg(long, default_value = "default")]
    org: String,

    #[arg(long, default_value = "quickstart1")]
    stream: String,

    #[arg(long, default_value = "root@example.com")]
    user: String,

    #[arg(long, default_value = "xyzabc123")]
    password: String,

    /// Intervalo em segundos entre os envios
    #[arg(long, default_value_t = 0.0)]
    delay: f64,
}

// Rejeita valores negativos, não finitos ou grandes demais para um `Duration`
fn parse_delay(secs: f64) -> anyhow::Result<Duration> {
    if secs < 0.0 {
        anyhow::bail!("--delay deve ser um número >= 0");
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("--delay inválido ({}): {}", secs, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let args = Args::parse();
    let delay = parse_delay(args.delay)?;

    let client = IngestClient::new(
        &args.host,
        &args.org,
        &args.stream,
        &args.user,
        &args.password,
    )?;

    tracing::info!("Enviando {} logs para {}...", args.num_logs, client.url());
    let summary = emit_logs(&client, args.num_logs, delay).await;

    tracing::info!(
        "Envio concluído: {} enviados, {} com falha",
        summary.sent,
        summary.failed
    );
    Ok(())
}
