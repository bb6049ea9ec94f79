/*!
 * Dashboard Refresh Tests
 * Single sweep before render and the overlapping-refresh guard
 */

use app_sandbox::lifecycle::CleanupHookRegistry;
use app_sandbox::resources::{ResourceMonitor, SystemReport};
use app_sandbox::runtime::HostRuntime;
use app_sandbox::{AppDescriptor, AppDirectory, AppId, SandboxResult, StaticDirectory};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Directory whose fetch suspends until released
struct GatedDirectory {
    gate: Arc<Notify>,
    apps: Vec<AppDescriptor>,
}

impl AppDirectory for GatedDirectory {
    fn lookup(&self, id: &str) -> Option<AppDescriptor> {
        self.apps.iter().find(|a| a.id == id).cloned()
    }

    fn fetch_installed(&self) -> BoxFuture<'_, SandboxResult<Vec<AppDescriptor>>> {
        Box::pin(async move {
            self.gate.notified().await;
            Ok(self.apps.clone())
        })
    }
}

fn launch(monitor: &ResourceMonitor, runtime: &HostRuntime, id: &str, elements: usize) -> AppId {
    let app = AppId::from(format!("{}-1", id));
    monitor.attach(&app, &AppDescriptor::user_app(id, id));
    let root = runtime.render.mount_app_root(&app);
    for _ in 0..elements {
        runtime.render.append(root, "div").unwrap();
    }
    app
}

#[tokio::test]
async fn test_all_apps_measured_before_render() {
    let runtime = HostRuntime::new();
    let monitor = ResourceMonitor::new(runtime.clone(), &CleanupHookRegistry::new());
    let apps = vec![
        launch(&monitor, &runtime, "alpha", 2),
        launch(&monitor, &runtime, "beta", 5),
        launch(&monitor, &runtime, "gamma", 1),
    ];

    // Rendering the dashboard adds rows inside every app container
    let render_runtime = runtime.clone();
    let render_apps = apps.clone();
    let sink = move |_: &SystemReport| {
        for app in &render_apps {
            let root = render_runtime.render.app_root(app).unwrap();
            render_runtime.render.append(root, "tr").unwrap();
        }
    };

    let report = monitor
        .refresh(&StaticDirectory::default(), &sink)
        .await
        .unwrap();

    let counts: Vec<usize> = report.apps.iter().map(|r| r.snapshot.rendered_elements).collect();
    assert_eq!(counts, vec![2, 5, 1]);
    assert_eq!(report.aggregate.total_rendered_elements, 8);
    assert_eq!(monitor.snapshot(&apps[0]).unwrap().rendered_elements, 3);
}

#[tokio::test]
async fn test_overlapping_refresh_is_dropped() {
    let runtime = HostRuntime::new();
    let monitor = ResourceMonitor::new(runtime.clone(), &CleanupHookRegistry::new());
    launch(&monitor, &runtime, "alpha", 1);

    let gate = Arc::new(Notify::new());
    let directory = GatedDirectory {
        gate: gate.clone(),
        apps: vec![
            AppDescriptor::user_app("alpha", "Alpha"),
            AppDescriptor::builtin("notes", "Notes"),
            AppDescriptor::builtin("clock", "Clock"),
        ],
    };
    let renders = AtomicUsize::new(0);
    let sink = |_: &SystemReport| {
        renders.fetch_add(1, Ordering::SeqCst);
    };

    let mut in_flight = Box::pin(monitor.refresh(&directory, &sink));
    assert!((&mut in_flight).now_or_never().is_none());
    assert!(monitor.is_refreshing());

    assert!(monitor.refresh(&directory, &sink).await.is_none());
    assert_eq!(renders.load(Ordering::SeqCst), 0);

    gate.notify_one();
    let report = in_flight.await.unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert!(!monitor.is_refreshing());
    assert_eq!(report.aggregate.total_apps, 3);
    assert_eq!(report.aggregate.running_apps, 1);
    assert_eq!(report.apps[0].name, "Alpha");
}

#[tokio::test]
async fn test_directory_failure_still_renders() {
    struct Offline;
    impl AppDirectory for Offline {
        fn lookup(&self, _id: &str) -> Option<AppDescriptor> {
            None
        }
        fn fetch_installed(&self) -> BoxFuture<'_, SandboxResult<Vec<AppDescriptor>>> {
            Box::pin(async { Err("directory offline".into()) })
        }
    }

    let runtime = HostRuntime::new();
    let monitor = ResourceMonitor::new(runtime.clone(), &CleanupHookRegistry::new());
    launch(&monitor, &runtime, "alpha", 0);

    let seen = Mutex::new(Vec::new());
    let sink = |report: &SystemReport| seen.lock().push(report.aggregate);
    let report = monitor.refresh(&Offline, &sink).await.unwrap();

    assert_eq!(report.apps[0].name, "alpha");
    assert_eq!(report.aggregate.total_apps, 1);
    assert_eq!(seen.lock().len(), 1);
}
