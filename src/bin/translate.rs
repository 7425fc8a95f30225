//! lwm2m-translate
//!
//! Translates one device response given on the command line and prints the
//! resulting LwM2M response as JSON.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use lwm2m_bridge::coap::{CoapResponse, ContentFormat, Exchange, ResponseCode};
use lwm2m_bridge::codec::{DefaultDecoder, NodeDecoder};
use lwm2m_bridge::node::LwM2mPath;
use lwm2m_bridge::observe::InMemoryObservationRegistry;
use lwm2m_bridge::request::{build_request, NotificationAttributes, Payload, WriteMode};
use lwm2m_bridge::{Client, Config, DownlinkRequest, ResponseTranslator, Translation};
use tracing_subscriber::{fmt, EnvFilter};

/// lwm2m-translate
#[derive(Parser, Debug)]
#[command(name = "lwm2m-translate")]
#[command(about = "Translate a CoAP response into an LwM2M response")]
#[command(version)]
struct Args {
    /// Operation the response answers
    #[arg(short, long, value_enum)]
    op: Op,

    /// Target path (e.g. /3/0/9)
    #[arg(short, long)]
    path: String,

    /// CoAP response code (e.g. 2.05)
    #[arg(short, long)]
    code: String,

    /// Content-Format option
    #[arg(short, long)]
    format: Option<u16>,

    /// Payload as text
    #[arg(long, conflicts_with = "payload_hex")]
    payload: Option<String>,

    /// Payload as hex
    #[arg(long)]
    payload_hex: Option<String>,

    /// Observe option sequence number
    #[arg(long)]
    observe: Option<u32>,

    /// Location-Path option (e.g. 3/1)
    #[arg(long)]
    location: Option<String>,

    /// Endpoint name reported in errors
    #[arg(short, long, default_value = "cli-device")]
    endpoint: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Op {
    Read,
    Discover,
    Write,
    WriteAttributes,
    Execute,
    Create,
    Delete,
    Observe,
}

fn main() {
    let config = Config::default();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args, config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let path: LwM2mPath = args.path.parse()?;
    let code: ResponseCode = args.code.parse()?;

    let payload = match (&args.payload, &args.payload_hex) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(hex_text)) => hex::decode(hex_text)?,
        (None, None) => Vec::new(),
    };

    let request = match args.op {
        Op::Read => DownlinkRequest::read(path),
        Op::Discover => DownlinkRequest::discover(path),
        Op::Write => DownlinkRequest::Write {
            path,
            payload: Payload::new(ContentFormat::Text, Vec::new()),
            mode: WriteMode::Replace,
        },
        Op::WriteAttributes => DownlinkRequest::WriteAttributes {
            path,
            attributes: NotificationAttributes::default(),
        },
        Op::Execute => DownlinkRequest::Execute { path, arguments: None },
        Op::Create => DownlinkRequest::Create {
            path,
            payload: Payload::new(ContentFormat::Tlv, Vec::new()),
        },
        Op::Delete => DownlinkRequest::delete(path),
        Op::Observe => DownlinkRequest::observe(path),
    };

    let mut response = CoapResponse::new(code).with_payload(payload);
    response.options.content_format = args.format;
    response.options.observe = args.observe;
    if let Some(location) = &args.location {
        response = response.with_location_path(location);
    }

    let decoder: Arc<dyn NodeDecoder> = Arc::new(DefaultDecoder::default());
    let registry = Arc::new(InMemoryObservationRegistry::new(Arc::clone(&decoder)));
    let translator =
        ResponseTranslator::new(decoder, registry).with_max_payload_size(config.max_payload_size);

    let client = Client::new(&args.endpoint, "cli");
    let exchange = Exchange::new(build_request(&request, &client));

    match translator.translate(&client, &request, &exchange, &response)? {
        Translation::Response(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Translation::Observed { response, registration } => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            match registration {
                Ok(observation) => tracing::info!("Observation {} registered", observation.token()),
                Err(e) => tracing::warn!("Observation not registered: {}", e),
            }
        }
        Translation::Suppressed => {
            tracing::info!("Response suppressed (notification on observe exchange)");
        }
    }

    Ok(())
}
