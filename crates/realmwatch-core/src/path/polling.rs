// Polling path observer (Linux)
//
// Samples the kernel routing table, picks the default route with the lowest
// metric, and classifies its interface as Wi-Fi when sysfs exposes wireless
// attributes for it. Emits the first reading and every change after that.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{NetworkPathObserver, PathCallback};
use crate::config::DEFAULT_PATH_POLL_INTERVAL;
use crate::error::CoreError;

const RTF_UP: u32 = 0x0001;

/// Path observer backed by `/proc/net/route` and `/sys/class/net`.
#[derive(Debug, Clone)]
pub struct PollingPathObserver {
    root: PathBuf,
    interval: Duration,
}

impl Default for PollingPathObserver {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_POLL_INTERVAL)
    }
}

impl PollingPathObserver {
    pub fn new(interval: Duration) -> Self {
        Self::with_root("/", interval)
    }

    /// Observer reading `proc` and `sys` below `root` instead of `/`.
    pub fn with_root(root: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            root: root.into(),
            interval,
        }
    }
}

impl NetworkPathObserver for PollingPathObserver {
    fn observe(
        self: Box<Self>,
        on_change: PathCallback,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let Self { root, interval } = *self;
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last: Option<bool> = None;
            let mut warned = false;

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let on_wifi = match default_route_is_wifi(&root) {
                            Ok(on_wifi) => {
                                warned = false;
                                on_wifi
                            }
                            Err(e) => {
                                if !warned {
                                    warn!(
                                        error = %e,
                                        "cannot read network path, assuming not on Wi-Fi"
                                    );
                                    warned = true;
                                }
                                false
                            }
                        };
                        if last != Some(on_wifi) {
                            debug!(on_wifi, "network path changed");
                            last = Some(on_wifi);
                            on_change(on_wifi);
                        }
                    }
                }
            }
        }))
    }
}

/// True if the default route below `root` leaves through a wireless interface.
///
/// No default route at all counts as "not on Wi-Fi".
pub fn default_route_is_wifi(root: &Path) -> Result<bool, CoreError> {
    let route_path = root.join("proc/net/route");
    let table = std::fs::read_to_string(&route_path).map_err(|e| CoreError::PathUnavailable {
        message: format!("{}: {e}", route_path.display()),
    })?;

    let Some(iface) = default_route_interface(&table) else {
        return Ok(false);
    };

    let class_dir = root.join("sys/class/net").join(iface);
    Ok(class_dir.join("wireless").exists() || class_dir.join("phy80211").exists())
}

/// Interface of the lowest-metric default route in a `/proc/net/route` table.
fn default_route_interface(table: &str) -> Option<&str> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let [iface, dest, _gateway, flags, _refcnt, _use, metric, mask, ..] = cols.as_slice()
            else {
                return None;
            };
            let flags = u32::from_str_radix(flags, 16).ok()?;
            if *dest != "00000000" || *mask != "00000000" || flags & RTF_UP == 0 {
                return None;
            }
            Some((*iface, metric.parse::<u32>().unwrap_or(u32::MAX)))
        })
        .min_by_key(|(_, metric)| *metric)
        .map(|(iface, _)| iface)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use super::*;

    const HEADER: &str =
        "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n";

    fn route_line(iface: &str, dest: &str, flags: &str, metric: u32) -> String {
        format!("{iface}\t{dest}\t0102A8C0\t{flags}\t0\t0\t{metric}\t00000000\t0\t0\t0\n")
    }

    fn fake_root(routes: &str, wireless: &[&str]) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("proc/net")).expect("proc dir");
        std::fs::write(dir.path().join("proc/net/route"), format!("{HEADER}{routes}"))
            .expect("route table");
        for iface in wireless {
            std::fs::create_dir_all(dir.path().join("sys/class/net").join(iface).join("wireless"))
                .expect("sysfs dir");
        }
        dir
    }

    #[test]
    fn picks_lowest_metric_default_route() {
        let table = format!(
            "{HEADER}{}{}{}",
            route_line("eth0", "00000000", "0003", 100),
            route_line("wlan0", "00000000", "0003", 600),
            route_line("wlan0", "0002A8C0", "0001", 0),
        );
        assert_eq!(default_route_interface(&table), Some("eth0"));
    }

    #[test]
    fn ignores_routes_that_are_down() {
        let table = format!("{HEADER}{}", route_line("eth0", "00000000", "0002", 0));
        assert_eq!(default_route_interface(&table), None);
    }

    #[test]
    fn wireless_default_route_is_wifi() {
        let root = fake_root(&route_line("wlan0", "00000000", "0003", 600), &["wlan0"]);
        assert!(default_route_is_wifi(root.path()).unwrap_or(false));
    }

    #[test]
    fn wired_default_route_is_not_wifi() {
        let routes = route_line("eth0", "00000000", "0003", 100);
        let root = fake_root(&routes, &["wlan0"]);
        assert!(!default_route_is_wifi(root.path()).unwrap_or(true));
    }

    #[test]
    fn missing_route_table_is_path_unavailable() {
        let dir = TempDir::new().expect("tempdir");
        assert!(matches!(
            default_route_is_wifi(dir.path()),
            Err(CoreError::PathUnavailable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn observer_reports_initial_state_and_changes() {
        let root = fake_root(&route_line("wlan0", "00000000", "0003", 600), &["wlan0"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let observer = Box::new(PollingPathObserver::with_root(
            root.path(),
            Duration::from_secs(1),
        ));
        let handle = observer.observe(
            Arc::new(move |on_wifi| {
                let _ = tx.send(on_wifi);
            }),
            cancel.clone(),
        );

        assert_eq!(rx.recv().await, Some(true));

        std::fs::write(
            root.path().join("proc/net/route"),
            format!("{HEADER}{}", route_line("eth0", "00000000", "0003", 100)),
        )
        .expect("rewrite route table");
        assert_eq!(rx.recv().await, Some(false));

        cancel.cancel();
        if let Some(handle) = handle {
            handle.await.expect("observer task");
        }
        assert_eq!(rx.recv().await, None);
    }
}
