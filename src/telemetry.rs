use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, Transport};

/// Initialize structured logging.
///
/// - `EnvFilter` from `RUST_LOG`, defaulting to `info,mixpanel_mcp=debug`
/// - human-readable or JSON lines, per `logging.format`
/// - stderr under the stdio transport, since stdout carries protocol frames
pub fn init(format: LogFormat, transport: Transport) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mixpanel_mcp=debug"));

    let writer = match transport {
        Transport::Stdio => BoxMakeWriter::new(std::io::stderr),
        Transport::Http => BoxMakeWriter::new(std::io::stdout),
    };

    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(transport == Transport::Http)
                    .compact()
                    .with_writer(writer),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(writer),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(pretty)
        .with(json)
        .init();
}
