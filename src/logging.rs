// Logging setup.
//
// `init` installs the stderr subscriber once from `main`. The client does
// not decide on its own what to print: it is handed a `RequestLogger`
// built from the configured verbosity.

use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::transport::{PreparedRequest, RawResponse};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,premiumize_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Request/response tracing for the API client.
#[derive(Debug, Clone, Copy)]
pub struct RequestLogger {
    level: Level,
}

impl RequestLogger {
    pub fn new(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::INFO },
        }
    }

    /// A logger that never emits request details.
    pub fn quiet() -> Self {
        Self { level: Level::ERROR }
    }

    fn enabled(&self) -> bool {
        self.level >= Level::DEBUG
    }

    pub fn request(&self, request: &PreparedRequest) {
        if self.enabled() {
            debug!(
                method = request.method.as_str(),
                url = %redact(&request.url),
                body = request.body.as_deref().unwrap_or(""),
                "[fetch] prepared request"
            );
        }
    }

    pub fn dry_run(&self, request: &PreparedRequest) {
        if self.enabled() {
            debug!(url = %redact(&request.url), "[fetch] dry run, request not sent");
        }
    }

    pub fn response(&self, request: &PreparedRequest, response: &RawResponse) {
        if self.enabled() {
            debug!(
                url = %redact(&request.url),
                status = response.status,
                bytes = response.body.len(),
                "[fetch] response received"
            );
        }
    }
}

/// Replace the value of the `apikey` query parameter with `***`.
///
/// Keys are compared after percent-decoding. Anything that does not parse
/// as a URL, or carries no key, is returned unchanged.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(key, _)| key == "apikey") {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "apikey" { "***".into() } else { value.into_owned() };
            (key.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_hides_only_the_key() {
        assert_eq!(
            redact("https://x/api/folder/list?id=1&apikey=secret"),
            "https://x/api/folder/list?id=1&apikey=***"
        );
        assert_eq!(redact("https://x/api/services/list?apikey=s"), "https://x/api/services/list?apikey=***");
        assert_eq!(redact("https://x/api"), "https://x/api");
    }

    #[test]
    fn redact_matches_percent_encoded_key() {
        assert_eq!(
            redact("https://x/api/item/details?api%6Bey=secret&id=7"),
            "https://x/api/item/details?apikey=***&id=7"
        );
    }

    #[test]
    fn redact_keeps_the_fragment_out_of_the_key() {
        let redacted = redact("https://x/api/folder/list?apikey=secret#top");
        assert_eq!(redacted, "https://x/api/folder/list?apikey=***#top");
        assert!(!redacted.contains("secret"));
    }

    #[test]
    fn verbosity_controls_request_logging() {
        assert!(RequestLogger::new(true).enabled());
        assert!(!RequestLogger::new(false).enabled());
        assert!(!RequestLogger::quiet().enabled());
    }
}
