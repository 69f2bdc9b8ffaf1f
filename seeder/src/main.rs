use airsense::{Database, Engine, Metric, Reading};
use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc, Weekday};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use std::{path::PathBuf, sync::Arc};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const STATIONS: [(&str, f64); 5] = [
    ("Station-01", 45.0),
    ("Station-02", 32.0),
    ("Station-03", 18.0),
    ("Station-04", 22.0),
    ("Station-05", 15.0),
];

const HOURS: i64 = 7 * 24;

/// One synthetic hourly reading, following rush hours, nights, weekends and the daily temperature cycle
fn synthesize(rng: &mut impl Rng, device_id: &str, base_pm25: f64, ts: DateTime<Utc>) -> Reading {
    let hour = ts.hour();
    let is_rush_hour = (7..=9).contains(&hour) || (17..=19).contains(&hour);
    let is_night = hour >= 22 || hour <= 6;
    let is_weekend = matches!(ts.weekday(), Weekday::Sat | Weekday::Sun);

    let mut pm25 = base_pm25 + (rng.gen::<f64>() - 0.5) * 10.0;

    if is_rush_hour && !is_weekend {
        pm25 += rng.gen::<f64>() * 15.0;
    }
    if is_night {
        pm25 -= rng.gen::<f64>() * 8.0;
    }
    if is_weekend {
        pm25 -= rng.gen::<f64>() * 5.0;
    }

    let pm25 = pm25.max(5.0);
    let pm10 = pm25 * rng.gen::<f64>().mul_add(0.5, 1.5);

    let daily = ((f64::from(hour) - 6.0) * std::f64::consts::PI / 12.0).sin();
    let temperature = daily.mul_add(5.0, 27.0) + (rng.gen::<f64>() - 0.5) * 3.0;
    let humidity = (75.0 - (temperature - 27.0) * 2.0 + (rng.gen::<f64>() - 0.5) * 10.0).clamp(0.0, 100.0);

    Reading::new(device_id, ts)
        .with(Metric::Pm25, pm25)
        .with(Metric::Pm10, pm10)
        .with(Metric::Temperature, temperature)
        .with(Metric::Humidity, humidity)
}

fn log_json(label: &str, value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => log::info!("{label}: {json}"),
        Err(e) => log::error!("{label}: could not serialize response: {e}"),
    }
}

fn main() -> airsense::Result<()> {
    env_logger::builder()
        .filter_module("lsm_tree", log::LevelFilter::Warn)
        .filter_module("fjall", log::LevelFilter::Warn)
        .filter_module("airsense", log::LevelFilter::Debug)
        .filter_module("seeder", log::LevelFilter::Trace)
        .parse_default_env()
        .init();

    let path = std::env::var_os("AIRSENSE_SEED_PATH")
        .map_or_else(|| PathBuf::from(".airsense"), PathBuf::from);

    if path.try_exists()? {
        std::fs::remove_dir_all(&path)?;
    }

    let mut rng = rand::thread_rng();
    let db = Database::builder()
        .cache_size_mib(64)
        .hyper_mode(true)
        .open(&path)?;

    let max_memory_bytes = Arc::new(AtomicU64::new(0));

    std::thread::spawn({
        let max_memory_bytes = max_memory_bytes.clone();

        let mut sys = sysinfo::System::new_all();
        sys.refresh_all();

        let pid = sysinfo::Pid::from(std::process::id() as usize);

        move || loop {
            sys.refresh_processes_specifics(
                sysinfo::ProcessesToUpdate::Some(&[pid]),
                true,
                sysinfo::ProcessRefreshKind::new().with_memory(),
            );
            if let Some(process) = sys.process(pid) {
                max_memory_bytes.fetch_max(process.memory(), Ordering::Relaxed);
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    });

    let now = airsense::now();
    let top_of_hour = airsense::truncate_to_hour(now);

    let start = Instant::now();
    let mut items_written = 0u64;

    for offset in (1..=HOURS).rev() {
        let minute = rng.gen_range(0..60);
        let ts = top_of_hour - TimeDelta::hours(offset) + TimeDelta::minutes(minute);

        for (device_id, base_pm25) in STATIONS {
            db.write(&synthesize(&mut rng, device_id, base_pm25, ts))?;
            items_written += 1;
        }

        if offset % 24 == 0 {
            log::debug!("seeded up to {ts}, {items_written} readings");
        }
    }

    db.persist()?;

    let elapsed = start.elapsed();
    let write_speed = items_written * 1_000_000 / (elapsed.as_micros().max(1) as u64);
    let max_memory = max_memory_bytes.load(Ordering::Relaxed);

    log::info!("ingested {items_written} readings of {} devices in {elapsed:?}", db.devices().len());
    log::info!("write speed: {write_speed} WPS");
    log::info!("peak mem: {} MiB", max_memory / 1_024 / 1_024);

    match fs_extra::dir::get_size(&path) {
        Ok(disk_space) => log::info!("disk space (KiB): {}", disk_space / 1_024),
        Err(e) => log::warn!("could not measure disk space: {e}"),
    }

    let engine = Engine::new(db);

    for _ in 0..5 {
        let start = Instant::now();
        let response = engine.aggregate("pm25").period("7d").at(now).run()?;
        log::info!("aggregated {} hours in {:?}", response.buckets.len(), start.elapsed());
    }

    log_json("aggregate", &engine.aggregate("pm25").device("Station-01").hours(6).at(now).run()?);
    log_json("aggregate_window", &engine.aggregate_window("pm10").period("24h").at(now).run()?);
    log_json("correlate", &engine.correlate("temperature", "humidity").period("7d").at(now).run()?);
    log_json("historical", &engine.historical().hours(3).at(now).run()?);
    log_json("summary", &engine.summary().period("7d").at(now).run()?);
    log_json("latest", &engine.latest("pm25").device("Station-03").run()?);

    Ok(())
}
