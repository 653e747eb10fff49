use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// File counter shown while a batch runs. Hidden when stderr is not a
/// terminal or when the caller asks for quiet output.
pub struct Bar {
    progress: ProgressBar,
}

impl Bar {
    pub fn new(message: &str, total: u64, hidden: bool) -> Self {
        let progress = if hidden {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(total)
        };
        if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len}") {
            progress.set_style(style.progress_chars("=> "));
        }
        progress.set_message(message.to_string());

        Self { progress }
    }

    pub fn set_length(&self, total: u64) {
        self.progress.set_length(total);
    }

    pub fn inc(&self) {
        self.progress.inc(1);
    }

    /// Prints above the bar without tearing it.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.progress.is_hidden() {
            eprintln!("{}", line.as_ref());
        } else {
            self.progress.println(line.as_ref());
        }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}
