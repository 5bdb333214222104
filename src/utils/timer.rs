use std::{
    sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}},
    time::{Duration, Instant},
};

const TICK_MS: u64 = 100;

/// Calls registered functions from background thread
pub struct Timer {
    thread:    Option<std::thread::JoinHandle<()>>,
    commands:  Arc<Mutex<Vec<TimerCommand>>>,
    exit_flag: Arc<AtomicBool>,
}

struct TimerCommand {
    fun:      Option<Box<dyn Fn() + Sync + Send + 'static>>,
    time:     Instant,
    to_ms:    u32,
    periodic: bool,
}

impl TimerCommand {
    fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.time) >= self.period()
    }

    fn period(&self) -> Duration {
        Duration::from_millis(self.to_ms as u64)
    }

    /// Moves start of periodic command to the next period
    /// (not to `now`, so call times don't drift)
    fn reschedule(&mut self, now: Instant) {
        if !self.periodic {
            self.fun = None;
            return;
        }
        self.time += self.period();
        // Skip missed periods instead of calling `fun` several times in row
        if self.is_due(now) {
            self.time = now;
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!("Stopping timer thread...");
        self.exit_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            _ = thread.join();
        }
        log::debug!("Timer thread stopped");
    }
}

impl Timer {
    pub fn new() -> Self {
        let commands = Arc::new(Mutex::new(Vec::new()));
        let exit_flag = Arc::new(AtomicBool::new(false));

        let thread = {
            let commands = Arc::clone(&commands);
            let exit_flag = Arc::clone(&exit_flag);
            std::thread::spawn(move || {
                Self::thread_fun(&commands, &exit_flag);
            })
        };
        Self {
            thread: Some(thread),
            commands,
            exit_flag,
        }
    }

    /// Runs `fun` after `to_ms` milliseconds (and every `to_ms` if `periodic`)
    pub fn exec(&self, to_ms: u32, periodic: bool, fun: impl Fn() + Sync + Send + 'static) {
        let command = TimerCommand {
            fun: Some(Box::new(fun)),
            time: Instant::now(),
            to_ms,
            periodic,
        };
        let mut commands = match self.commands.lock() {
            Ok(commands) => commands,
            Err(poisoned) => poisoned.into_inner(),
        };
        commands.push(command);
    }

    fn thread_fun(
        commands:  &Mutex<Vec<TimerCommand>>,
        exit_flag: &AtomicBool
    ) {
        while !exit_flag.load(Ordering::Relaxed) {
            let Ok(mut commands) = commands.lock() else {
                log::error!("Timer commands are poisoned");
                break;
            };
            let now = Instant::now();
            for cmd in &mut *commands {
                if cmd.is_due(now) {
                    if let Some(fun) = &cmd.fun {
                        fun();
                    }
                    cmd.reschedule(now);
                }
            }
            commands.retain(|cmd| cmd.fun.is_some());
            drop(commands);
            std::thread::sleep(Duration::from_millis(TICK_MS));
        }
    }
}

#[test]
fn test_timer() {
    use std::sync::atomic::AtomicUsize;

    let single = Arc::new(AtomicUsize::new(0));
    let periodic = Arc::new(AtomicUsize::new(0));
    let timer = Timer::new();
    timer.exec(100, false, {
        let single = Arc::clone(&single);
        move || { single.fetch_add(1, Ordering::Relaxed); }
    });
    timer.exec(100, true, {
        let periodic = Arc::clone(&periodic);
        move || { periodic.fetch_add(1, Ordering::Relaxed); }
    });
    std::thread::sleep(Duration::from_millis(1000));
    drop(timer);

    assert_eq!(single.load(Ordering::Relaxed), 1);
    assert!(periodic.load(Ordering::Relaxed) >= 2);
}

#[test]
fn test_timer_command_reschedule() {
    let start = Instant::now();
    let mut cmd = TimerCommand {
        fun: Some(Box::new(|| {})),
        time: start,
        to_ms: 1000,
        periodic: true,
    };
    assert!(!cmd.is_due(start + Duration::from_millis(999)));

    // Called late: next period is counted from schedule, not from call time
    let now = start + Duration::from_millis(1080);
    assert!(cmd.is_due(now));
    cmd.reschedule(now);
    assert_eq!(cmd.time, start + Duration::from_millis(1000));
    assert!(!cmd.is_due(start + Duration::from_millis(1999)));
    assert!(cmd.is_due(start + Duration::from_millis(2000)));

    // Far behind schedule: missed periods are skipped
    let now = start + Duration::from_millis(5500);
    cmd.reschedule(now);
    assert_eq!(cmd.time, now);
    assert!(cmd.fun.is_some());

    let mut single = TimerCommand { periodic: false, ..cmd };
    single.reschedule(now);
    assert!(single.fun.is_none());
}
