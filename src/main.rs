use actix_web::{middleware as actix_middleware, App, HttpServer};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod errors;
mod models;
mod routes;
mod services;
mod utils;

use config::Config;
use errors::ServiceError;
use models::responses::VerificationResponse;
use services::card_service::DigitalCardService;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Offline tools; without a subcommand the HTTP server starts.
#[derive(Subcommand)]
enum Commands {
    /// Print a random base64 secret for QR_SIGNING_SECRET.
    GenerateSecret {
        /// Number of random bytes.
        #[arg(short, long, default_value_t = 32)]
        bytes: usize,
    },
    /// Issue a QR token and show it in the terminal.
    Issue {
        /// User identity the token is bound to.
        #[arg(short, long)]
        subject: String,
        /// Also write the QR code as a PNG file.
        #[arg(long)]
        png: Option<String>,
    },
    /// Verify a scanned token without a server.
    Verify {
        #[arg(short, long)]
        token: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::GenerateSecret { bytes }) => {
            println!("{}", utils::generate_secret(bytes));
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Issue { subject, png }) => issue(&subject, png.as_deref()),
        Some(Commands::Verify { token }) => verify(&token),
        None => actix_web::rt::System::new()
            .block_on(start_server())
            .map(|_| ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|e| {
        log::error!("{}", e);
        ExitCode::FAILURE
    })
}

fn load_card_service() -> Result<DigitalCardService, ServiceError> {
    Ok(DigitalCardService::new(&Config::from_env()?))
}

fn issue(subject: &str, png_path: Option<&str>) -> Result<ExitCode, ServiceError> {
    let service = load_card_service()?;
    let issued = service.tokens.issue(subject)?;

    println!("{}", service.renderer.render_text(&issued.token)?);
    println!("token:      {}", issued.token);
    println!("expires_at: {}", issued.expires_at.to_rfc3339());

    if let Some(path) = png_path {
        std::fs::write(path, service.renderer.encode(&issued.token)?)?;
        log::info!("QR code written to {}", path);
    }
    Ok(ExitCode::SUCCESS)
}

fn verify(token: &str) -> Result<ExitCode, ServiceError> {
    let service = load_card_service()?;
    let verdict = service.tokens.verify(token);
    let valid = verdict.is_valid();

    let response: VerificationResponse = verdict.into();
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn start_server() -> Result<(), ServiceError> {
    let config = Config::from_env()?;

    let app_state = routes::AppState {
        card_service: Arc::new(DigitalCardService::new(&config)),
    };

    let bind_address = config.bind_address.clone();
    log::info!(
        "Starting server at {} (token ttl {}s)",
        bind_address,
        config.token_ttl_secs
    );

    HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(app_state.clone()))
            .wrap(actix_middleware::Logger::default())
            .configure(routes::init_routes)
    })
    .workers(num_cpus::get().min(8))
    .bind(&bind_address)
    .map_err(|e| {
        log::error!("Failed to bind server to {}: {}", bind_address, e);
        e
    })?
    .run()
    .await?;

    Ok(())
}
