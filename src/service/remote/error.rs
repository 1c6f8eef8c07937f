use snafu::Snafu;
use url::Url;

pub type Result<T, E = RemoteError> = ::std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RemoteError {
    #[snafu(display("`{url}` is not a valid remote URL: {source}"))]
    BaseUrl { url: String, source: url::ParseError },

    #[snafu(display("cannot build endpoint `{path}` from `{base}`: {source}"))]
    Endpoint {
        base: Url,
        path: String,
        source: url::ParseError,
    },

    #[snafu(display("failed to build the HTTP client: {source}"))]
    Client { source: reqwest::Error },

    #[snafu(display("request to the remote failed: {source}"))]
    Transport { source: reqwest::Error },

    #[snafu(display("remote answered with HTTP {status}"))]
    Status { status: reqwest::StatusCode },

    #[snafu(display("malformed response from the remote: {source}"))]
    Decode { source: reqwest::Error },

    #[snafu(display("remote is unreachable"))]
    Unreachable,
}
