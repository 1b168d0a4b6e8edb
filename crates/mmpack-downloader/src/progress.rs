//! Per-package download progress reporting.

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};

/// Narrow interface so the downloader doesn't need to know whether
/// progress is rendered to a terminal, suppressed (`-q`), or collected
/// by a test.
pub trait ProgressSink {
    /// Called once the total size is known (or `None` if the server
    /// didn't report a `Content-Length`).
    fn start(&self, name: &str, total: Option<u64>);
    /// Called as bytes arrive, with the cumulative count so far.
    fn advance(&self, downloaded: u64);
    /// Called once the download completes successfully.
    fn finish(&self);
}

/// An [`indicatif`] bar (or spinner, when the total size is unknown),
/// the default sink for interactive use.
#[derive(Default)]
pub struct IndicatifSink {
    bar: RefCell<ProgressBar>,
}

impl ProgressSink for IndicatifSink {
    fn start(&self, name: &str, total: Option<u64>) {
        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template("{msg} [{bar:30}] {bytes}/{total_bytes} ({eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        };
        bar.set_message(name.to_string());
        *self.bar.borrow_mut() = bar;
    }

    fn advance(&self, downloaded: u64) {
        self.bar.borrow().set_position(downloaded);
    }

    fn finish(&self) {
        self.bar.borrow().finish_and_clear();
    }
}

/// A sink that drops all updates, used when `-q/--quiet` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn start(&self, _name: &str, _total: Option<u64>) {}
    fn advance(&self, _downloaded: u64) {}
    fn finish(&self) {}
}
