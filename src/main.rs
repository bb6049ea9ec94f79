/*!
 * Sandbox Host - Main Entry Point
 *
 * Runs the application host with a periodic resource dashboard refresh
 * driving the event loop clock.
 */

use std::error::Error;
use std::time::Instant;
use tracing::{info, warn};

use app_sandbox::{
    init_tracing, AppDescriptor, AppHost, FrameRateMeter, HostConfig, KeyInput, ShortcutTable,
    StaticDirectory, SystemReport,
};

fn demo_directory() -> StaticDirectory {
    StaticDirectory::new(vec![
        AppDescriptor::builtin("notes", "Notes").with_icon("📝"),
        AppDescriptor::builtin("clock", "Clock").with_icon("🕒"),
        AppDescriptor::user_app("weather", "Weather").with_icon("☀"),
    ])
}

fn log_report(report: &SystemReport) {
    let a = &report.aggregate;
    info!(
        running = a.running_apps,
        installed = a.total_apps,
        elements = a.total_rendered_elements,
        timers = a.total_timers,
        global_events = a.total_global_events,
        "resource sweep"
    );
    for row in &report.apps {
        info!(
            app = %row.snapshot.app,
            name = %row.name,
            mode = %row.snapshot.mode,
            timers = row.snapshot.timers,
            listeners = row.snapshot.global_event_listeners,
            estimated = ?row.snapshot.estimated_listeners,
            elements = row.snapshot.rendered_elements,
            "app resources"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = HostConfig::from_env()?;
    init_tracing(config.trace_json);

    info!("Sandbox host starting...");
    let refresh_interval = config.refresh_interval;

    let builder = AppHost::builder();
    let builder = if config.directory_url.is_some() {
        builder.with_config(config)
    } else {
        info!("No directory URL configured, using built-in demo directory");
        builder.with_config(config).with_directory(demo_directory())
    };
    let host = builder.build()?;

    // Seed the directory cache and the installed-app count
    if let Some(report) = host.refresh(&log_report).await {
        info!(installed = report.aggregate.total_apps, "Directory loaded");
    }

    let mut launched = Vec::new();
    for id in ["notes", "clock", "weather"] {
        match host.launch_by_id(id) {
            Ok(app) => launched.push(app),
            Err(e) => warn!(app = id, error = %e, "Could not launch application"),
        }
    }

    if let Some(notes) = launched.first() {
        let table = ShortcutTable::new().bind("ctrl+s", |_| {
            info!("Notes saved");
            Ok(())
        })?;
        host.register_shortcuts(notes, table, None);
        host.focus(notes);
        host.press_key(KeyInput::new("s").ctrl());
    }

    for app in &launched {
        host.create_tracked_timer(app, Box::new(|| {}), 1_000, true);
    }

    info!("Host entering main loop, press Ctrl+C to exit");
    let meter = FrameRateMeter::new();
    let mut ticker = tokio::time::interval(refresh_interval);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let fired = host.tick(now.duration_since(last_tick));
                last_tick = now;
                let rate = meter.frame_at(now);
                tracing::debug!(fired, rate, "event loop tick");
                host.refresh(&log_report).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    for app in host.running_apps() {
        let report = host.destroy(&app);
        info!(%report, "Application destroyed");
    }
    info!("Sandbox host stopped");
    Ok(())
}
