//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::str::FromStr;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use riverlink_core::{StreamType, SubscriptionEndpoint};

use crate::cli::GlobalOpts;

/// Run a verified operation behind a stderr spinner.
///
/// Join and leave verification can take several seconds on real hardware.
/// The spinner is hidden in quiet mode and when stderr is not a terminal.
pub async fn with_spinner<F, T>(message: String, global: &GlobalOpts, fut: F) -> T
where
    F: Future<Output = T>,
{
    let bar = if global.quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    };
    bar.set_message(message);

    let out = fut.await;
    bar.finish_and_clear();
    out
}

/// Parse a `--type` value; unknown names pass through verbatim.
pub fn parse_stream_type(raw: &str) -> StreamType {
    let upper = raw.trim().to_ascii_uppercase();
    StreamType::from_str(&upper).unwrap_or(StreamType::Other(upper))
}

/// Human label for what a subscription is showing.
pub fn source_label(sub: Option<&SubscriptionEndpoint>) -> String {
    match sub {
        Some(s) if s.is_streaming() => s
            .source_device_name
            .clone()
            .unwrap_or_else(|| format!("unknown ({})", s.address)),
        _ => "-".into(),
    }
}

/// `-` for missing optional values in detail views.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(state: &str, name: Option<&str>) -> SubscriptionEndpoint {
        SubscriptionEndpoint {
            stream_type: StreamType::Hdmi,
            index: 0,
            address: "239.0.0.1".into(),
            enabled: true,
            state: state.into(),
            source_device_id: name.map(|_| "tx1".to_string()),
            source_device_name: name.map(str::to_string),
        }
    }

    #[test]
    fn stream_types_are_case_insensitive() {
        assert_eq!(parse_stream_type("hdmi_audio"), StreamType::HdmiAudio);
        assert_eq!(parse_stream_type(" HDMI "), StreamType::Hdmi);
        assert_eq!(
            parse_stream_type("usb"),
            StreamType::Other("USB".to_string())
        );
    }

    #[test]
    fn source_label_reflects_stream_state() {
        assert_eq!(source_label(None), "-");
        assert_eq!(source_label(Some(&sub("STOPPED", Some("Camera")))), "-");
        assert_eq!(source_label(Some(&sub("STREAMING", Some("Camera")))), "Camera");
        assert_eq!(
            source_label(Some(&sub("STREAMING", None))),
            "unknown (239.0.0.1)"
        );
    }
}
