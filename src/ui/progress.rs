use std::future::Future;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Run `fut` behind a stderr spinner registered on `multi`. Anything else
/// printed through `multi` while the future runs lands above the spinner.
/// The spinner is hidden when stderr is not a terminal or `enabled` is false.
pub async fn with_spinner<F: Future>(
    multi: &MultiProgress,
    message: &str,
    enabled: bool,
    fut: F,
) -> F::Output {
    let bar = if enabled && !multi.is_hidden() {
        multi.add(ProgressBar::new_spinner())
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is a valid static string"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    let output = fut.await;
    bar.finish_and_clear();
    multi.remove(&bar);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[tokio::test]
    async fn test_hidden_spinner_passes_output_through() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let value = with_spinner(&multi, "Loading", true, async { 42 }).await;
        assert_eq!(value, 42);
    }
}
