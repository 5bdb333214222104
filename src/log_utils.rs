use std::path::*;
use flexi_logger::*;

pub struct TimeLogger {
    start_time: std::time::Instant,
}

impl TimeLogger {
    pub fn start() -> TimeLogger {
        TimeLogger { start_time: std::time::Instant::now() }
    }

    pub fn log(self, text: &str) {
        let time = self.start_time.elapsed().as_secs_f64();
        log::debug!("BENCH {} time = {:.6} s", text, time);
    }
}

pub fn start_logger(log_path: &Path) -> anyhow::Result<LoggerHandle> {
    let custom_format_fun = |
        w:      &mut dyn std::io::Write,
        now:    &mut DeferredNow,
        record: &Record
    | -> Result<(), std::io::Error> {
        write!(
            w, "[{}] {} {}",
            now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
            record.level(),
            record.args()
        )
    };

    let handle = Logger::try_with_str("trace")?
        .log_to_file(
            FileSpec::default()
                .directory(log_path)
                .basename(env!("CARGO_PKG_NAME"))
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format(custom_format_fun)
        .start()?;

    Ok(handle)
}

/// Removes `*.log` files older than `days`
pub fn cleanup_old_logs(log_path: &Path, days: u64) {
    let Ok(dir) = std::fs::read_dir(log_path) else {
        return;
    };
    let max_age = std::time::Duration::from_secs(days * 24 * 60 * 60);
    for entry in dir.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            continue;
        }
        let age = entry.metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        if matches!(age, Some(age) if age > max_age) {
            _ = std::fs::remove_file(&path);
        }
    }
}

#[test]
fn test_cleanup_old_logs() {
    let dir = std::env::temp_dir()
        .join(format!("{}_logs_test_{}", env!("CARGO_PKG_NAME"), std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let log_file = dir.join("fresh.log");
    let other_file = dir.join("notes.txt");
    std::fs::write(&log_file, "log").unwrap();
    std::fs::write(&other_file, "txt").unwrap();

    // Fresh files survive
    cleanup_old_logs(&dir, 14);
    assert!(log_file.is_file());

    // Zero age limit removes logs only
    std::thread::sleep(std::time::Duration::from_millis(20));
    cleanup_old_logs(&dir, 0);
    assert!(!log_file.exists());
    assert!(other_file.is_file());

    _ = std::fs::remove_dir_all(&dir);
    cleanup_old_logs(&dir, 0);
}
