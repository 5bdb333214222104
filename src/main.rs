#![allow(dead_code)]
#![allow(
    clippy::too_many_arguments,
    clippy::uninlined_format_args,
    clippy::wrong_self_convention
)]

mod log_utils;
mod options;
mod sky;
mod sky_math;
mod utils;

use std::{io::Write, path::{Path, PathBuf}, sync::{mpsc, atomic::{AtomicU64, Ordering}}};
use clap::{Parser, ValueEnum};

use crate::{
    options::Options,
    sky::{catalog::Catalog, ephemeris::*, frame::Frame, report::status_text},
    utils::{io_utils::*, timer::Timer},
};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    /// Human readable status block
    Text,
    /// One JSON frame per line for external renderers
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "astrolab")]
#[command(author, version, about = "Digital astrolab: Sun, Moon and constellations for your location")]
struct Args {
    /// Latitude in degrees (-6.2 or -06:12:00)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    /// Longitude in degrees (106.8166 or 106:49:00)
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(short, long)]
    interval: Option<u32>,

    /// Number of refreshes, 0 means run forever
    #[arg(short, long, default_value = "0")]
    count: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Additional `;` separated catalog with name;ra;dec;color columns
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Options file instead of the one in config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store location and interval given in command line into options
    #[arg(long)]
    save: bool,
}

fn panic_handler(
    panic_info:        &std::panic::PanicHookInfo,
    logs_dir:          &Path,
    def_panic_handler: &(dyn Fn(&std::panic::PanicHookInfo<'_>) + 'static + Sync + Send),
) {
    let payload_str =
        if let Some(msg) = panic_info.payload().downcast_ref::<&'static str>() {
            Some(*msg)
        } else if let Some(msg) = panic_info.payload().downcast_ref::<String>() {
            Some(msg.as_str())
        } else {
            None
        };

    log::error!("PANIC OCCURRED");

    if let Some(payload) = &payload_str {
        log::error!("Panic payload: {}", payload);
    }

    if let Some(loc) = panic_info.location() {
        log::error!("Panic location: {}", loc);
    }

    log::error!(
        "Panic stacktrace: {}",
        std::backtrace::Backtrace::force_capture()
    );

    log::error!("Look logs at {}", logs_dir.display());

    def_panic_handler(panic_info);
}

fn load_options(args: &Args) -> anyhow::Result<Options> {
    let mut options = Options::default();
    match &args.config {
        Some(file_name) => load_json_from_file(&mut options, file_name)?,
        None => load_json_from_config_file(&mut options, "options")?,
    }
    Ok(options)
}

fn save_options(args: &Args, options: &Options) -> anyhow::Result<()> {
    match &args.config {
        Some(file_name) => save_json_to_file(options, file_name),
        None => save_json_to_config(options, "options"),
    }
}

/// Command line values override ones from options
fn apply_args(args: &Args, options: &mut Options) -> anyhow::Result<Observer> {
    let lat_str = args.lat.clone().unwrap_or_else(|| options.site.latitude.to_string());
    let lon_str = args.lon.clone().unwrap_or_else(|| options.site.longitude.to_string());
    let observer = Observer::parse(&lat_str, &lon_str)?;
    options.site.latitude = observer.latitude_degrees();
    options.site.longitude = observer.longitude_degrees();

    if let Some(interval) = args.interval {
        options.refresh.interval_ms = interval.max(1);
    }
    if let Some(catalog) = &args.catalog {
        options.sky.catalog_file = Some(catalog.clone());
    }
    Ok(observer)
}

fn create_catalog(options: &Options) -> anyhow::Result<Catalog> {
    let mut catalog = if options.sky.show_constellations {
        Catalog::new_constellations()
    } else {
        Catalog::default()
    };
    if let Some(file_name) = &options.sky.catalog_file {
        catalog.load_csv_file(file_name)
            .map_err(|e| anyhow::anyhow!("{}: {}", file_name.display(), e))?;
        log::info!("Catalog {} loaded", file_name.display());
    }
    log::info!("{} fixed objects in catalog", catalog.len());
    Ok(catalog)
}

fn write_frame(
    out:    &mut impl Write,
    frame:  &Frame,
    format: OutputFormat,
    tz:     &chrono::FixedOffset,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text =>
            writeln!(out, "{}\n", status_text(&frame.snapshot, tz))?,
        OutputFormat::Json =>
            writeln!(out, "{}", frame.to_json()?)?,
    }
    out.flush()?;
    Ok(())
}

fn print_frame(frame: &Frame, format: OutputFormat) -> anyhow::Result<()> {
    let tz = *chrono::Local::now().offset();
    let mut stdout = std::io::stdout().lock();
    write_frame(&mut stdout, frame, format, &tz)
        .map_err(|e| anyhow::anyhow!("Can't write frame: {}", e))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logs_dir = get_app_dir()?;
    logs_dir.push("logs");
    log_utils::cleanup_old_logs(&logs_dir, 14/*days*/);
    let _logger = log_utils::start_logger(&logs_dir)?;
    log::set_max_level(log::LevelFilter::Info);

    log::info!(
        "{} {} ver. {} is started",
        env!("CARGO_PKG_NAME"),
        std::env::consts::ARCH,
        env!("CARGO_PKG_VERSION")
    );

    std::panic::set_hook({
        let logs_dir = logs_dir.clone();
        let default_panic_handler = std::panic::take_hook();
        Box::new(move |panic_info| {
            panic_handler(panic_info, &logs_dir, &*default_panic_handler)
        })
    });

    let mut options = load_options(&args)?;
    let observer = apply_args(&args, &mut options)?;
    log::info!(
        "Observer: latitude = {:.4}°, longitude = {:.4}°",
        options.site.latitude,
        options.site.longitude
    );

    if args.save {
        save_options(&args, &options)?;
        log::info!("Options saved");
    }

    let catalog = create_catalog(&options)?;
    let ephem = MiniEphemeris;
    let format = args.format;
    let count = args.count;
    let interval_ms = options.refresh.interval_ms;

    let compute_and_print = move || -> anyhow::Result<()> {
        let time_log = log_utils::TimeLogger::start();
        let utc = chrono::Utc::now().naive_utc();
        let frame = Frame::compute(&ephem, &observer, &utc, &catalog, &options.dial);
        time_log.log("frame computation");
        print_frame(&frame, format)
    };

    let (done_tx, done_rx) = mpsc::channel::<anyhow::Result<()>>();
    let ticks = AtomicU64::new(0);

    // First frame immediately, then every interval
    let tick = move || {
        if count != 0 && ticks.load(Ordering::Relaxed) >= count {
            return;
        }
        let result = compute_and_print();
        let ticks_done = ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if result.is_err() || (count != 0 && ticks_done >= count) {
            _ = done_tx.send(result);
        }
    };
    tick();

    let timer = Timer::new();
    timer.exec(interval_ms, true, tick);

    let result = done_rx.recv()
        .map_err(|e| anyhow::anyhow!("Refresh loop stopped: {}", e))
        .and_then(|result| result);
    drop(timer);

    if let Err(err) = &result {
        log::error!("{}", err);
    }
    log::info!("Exited");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_args() {
        let args = Args::parse_from([
            "astrolab", "--lat", "-06:12:00", "--lon", "106.8166", "-i", "500", "-c", "3"
        ]);
        let mut options = Options::default();
        options.site.latitude = 10.0;
        let observer = apply_args(&args, &mut options).unwrap();
        assert!(f64::abs(observer.latitude_degrees() - -6.2) < 1e-9);
        assert!(f64::abs(options.site.latitude - -6.2) < 1e-9);
        assert_eq!(options.refresh.interval_ms, 500);
        assert_eq!(args.count, 3);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_apply_args_from_options() {
        let args = Args::parse_from(["astrolab", "--format", "json"]);
        let mut options = Options::default();
        options.site.latitude = 55.75;
        options.site.longitude = 37.62;
        let observer = apply_args(&args, &mut options).unwrap();
        assert!(f64::abs(observer.longitude_degrees() - 37.62) < 1e-9);
        assert_eq!(options.refresh.interval_ms, 1000);
        assert_eq!(args.format, OutputFormat::Json);
    }

    fn test_frame() -> Frame {
        let observer = Observer::from_degrees(-6.2, 106.8166).unwrap();
        let utc = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            .and_hms_opt(12, 0, 0).unwrap();
        Frame::compute(
            &MiniEphemeris,
            &observer,
            &utc,
            &Catalog::new_constellations(),
            &Options::default().dial
        )
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_frame() {
        let frame = test_frame();
        let tz = chrono::FixedOffset::east_opt(7 * 3600).unwrap();

        let mut text = Vec::new();
        write_frame(&mut text, &frame, OutputFormat::Text, &tz).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.starts_with("Location: -06:12:00, 106:49:00\n"), "{}", text);
        assert!(text.ends_with("\n\n"));

        let mut json = Vec::new();
        write_frame(&mut json, &frame, OutputFormat::Json, &tz).unwrap();
        assert_eq!(json.iter().filter(|&&b| b == b'\n').count(), 1);
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value.get("snapshot").is_some());

        // Closed output is an error, not a panic
        for format in [OutputFormat::Text, OutputFormat::Json] {
            let result = write_frame(&mut ClosedOutput, &frame, format, &tz);
            let err = result.unwrap_err();
            let io_err = err.downcast_ref::<std::io::Error>().unwrap();
            assert_eq!(io_err.kind(), std::io::ErrorKind::BrokenPipe);
        }
    }

    #[test]
    fn test_apply_args_wrong_latitude() {
        let args = Args::parse_from(["astrolab", "--lat", "95", "--lon", "0"]);
        assert!(apply_args(&args, &mut Options::default()).is_err());

        let args = Args::parse_from(["astrolab", "--lat", "north"]);
        assert!(apply_args(&args, &mut Options::default()).is_err());
    }
}
