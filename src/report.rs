use crate::job::CondenseJob;
use crate::timestamp::Clock;

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub path: PathBuf,
    pub original: Duration,
    pub condensed: Duration,
    pub intervals: usize,
}

impl Stats {
    pub fn percent(&self) -> f64 {
        percent(self.condensed, self.original)
    }
}

impl From<&CondenseJob> for Stats {
    fn from(job: &CondenseJob) -> Self {
        Stats {
            path: job.input.clone(),
            original: job.original_duration,
            condensed: job.condensed_duration,
            intervals: job.intervals.len(),
        }
    }
}

fn percent(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.as_secs_f64() / whole.as_secs_f64() * 100.0
}

pub fn print_file(stats: &Stats) {
    println!("{}", render_file(stats));
}

pub fn print_summary(stats: &[Stats]) {
    println!("{}", render_summary(stats));
}

fn render_file(stats: &Stats) -> String {
    format!(
        "file: {}\noriginal duration: {}\ncondensed duration: {} ({:.1}%, {} intervals)",
        stats.path.display(),
        Clock(stats.original),
        Clock(stats.condensed),
        stats.percent(),
        stats.intervals
    )
}

fn render_summary(stats: &[Stats]) -> String {
    let original: Duration = stats.iter().map(|s| s.original).sum();
    let condensed: Duration = stats.iter().map(|s| s.condensed).sum();
    format!(
        "total: {} files\noriginal duration: {}\ncondensed duration: {} ({:.1}%)",
        stats.len(),
        Clock(original),
        Clock(condensed),
        percent(condensed, original)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(path: &str, original: u64, condensed: u64, intervals: usize) -> Stats {
        Stats {
            path: PathBuf::from(path),
            original: Duration::from_millis(original),
            condensed: Duration::from_millis(condensed),
            intervals,
        }
    }

    #[test]
    fn file_report() {
        let report = render_file(&stats("ep01.mkv", 1_440_000, 612_345, 153));
        assert_eq!(
            report,
            "file: ep01.mkv\n\
             original duration: 00:24:00.000\n\
             condensed duration: 00:10:12.345 (42.5%, 153 intervals)"
        );
    }

    #[test]
    fn summary_report() {
        let report = render_summary(&[
            stats("ep01.mkv", 1_000_000, 250_000, 10),
            stats("ep02.mkv", 1_000_000, 750_000, 30),
        ]);
        assert_eq!(
            report,
            "total: 2 files\n\
             original duration: 00:33:20.000\n\
             condensed duration: 00:16:40.000 (50.0%)"
        );
    }

    #[test]
    fn zero_length_original() {
        assert_eq!(stats("x", 0, 0, 1).percent(), 0.0);
    }

    #[test]
    fn from_job() {
        let mut job = CondenseJob::new("a.mkv".into(), "a.srt".into(), "a.mp3".into());
        job.intervals = vec![crate::dialog::Interval::new(
            Duration::from_secs(1),
            Duration::from_secs(3),
        )];
        job.original_duration = Duration::from_secs(4);
        job.condensed_duration = Duration::from_secs(2);

        let stats = Stats::from(&job);
        assert_eq!(stats.intervals, 1);
        assert_eq!(stats.percent(), 50.0);
    }
}
