use indicatif::{ProgressBar, ProgressStyle};

/// Page counter for the ride-log crawl. The length is set once the page
/// count is known; the bar hides itself when stderr is not a terminal.
pub(crate) fn page_bar(message: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg}: {percent:>3}%|{bar:40.cyan/blue}| {pos}/{len} [{elapsed_precise}<{eta}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message(message.to_string());
    bar
}
