use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use std::{env, process};
use tensorflowrequest::receiver::Receiver;
use tensorflowrequest::server::routes;
use tensorflowrequest::settings::{Settings, DEFAULT_LOG_FILTER};
use tensorflowrequest::tensorflow::TensorflowClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: ./tensorflowrequest [config file]";

fn get_args() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        println!("{USAGE}");
        process::exit(1);
    }

    args.get(1).cloned()
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config_file = get_args();
    let settings = Settings::load(config_file.as_deref())?;

    info!(
        "forwarding predictions to {}, listening on {}:{}",
        settings.tf_endpoint, settings.host, settings.port
    );

    let receiver = web::Data::new(Receiver::new(TensorflowClient::new(
        settings.tf_endpoint.clone(),
    )));

    let max_payload = settings.max_payload;

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(receiver.clone())
            .app_data(web::PayloadConfig::new(max_payload))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(settings.bind_addr())
    .with_context(|| format!("binding {}:{}", settings.host, settings.port))?
    .run()
    .await?;

    Ok(())
}
