use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChatError {
    #[snafu(display("inbound message is missing a usable '{field}'"))]
    MalformedMessage { field: &'static str },
    #[snafu(display("timestamp '{raw}' is not an ISO-8601 instant"))]
    InvalidTimestamp {
        raw: String,
        source: chrono::ParseError,
    },
    #[snafu(display("cannot send an empty message"))]
    EmptyComposition,
    #[snafu(display("cannot attach '{path}'"))]
    ResolveAttachment {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to read config file {path}"))]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse config file {path}"))]
    ParseConfig {
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("failed to serialize config"))]
    SerializeConfig { source: serde_json::Error },
    #[snafu(display("failed to write config file {path}"))]
    WriteConfig {
        path: String,
        source: std::io::Error,
    },
}

pub type ChatResult<T> = Result<T, ChatError>;
