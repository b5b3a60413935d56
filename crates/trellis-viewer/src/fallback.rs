//! Textual fallback view
//!
//! When no rendering context can be created the viewer must still surface
//! the site's alerts: the full alert list is enumerated as text, and no
//! canvas or pointer handlers exist on this path.

use trellis_core::telemetry::{Alert, Panel};

use crate::feed::SiteFeed;

/// Render the complete alert listing as plain text.
pub fn alert_listing(alerts: &[Alert], panels: &[Panel]) -> String {
    let mut out = String::new();
    out.push_str("Trellis — structural health alerts (3D view unavailable)\n");
    out.push_str(&format!(
        "{} panel(s) monitored, {} active alert(s)\n\n",
        panels.len(),
        alerts.len()
    ));

    if alerts.is_empty() {
        out.push_str("No active alerts.\n");
        return out;
    }

    for alert in alerts {
        out.push_str(&format!(
            "[{:?}] {:?} — {} ({}): {} {:.1}\n",
            alert.severity, alert.kind, alert.title, alert.location_name, alert.metric, alert.value
        ));
    }

    out.push_str("\nPanels:\n");
    for panel in panels {
        out.push_str(&format!("  {} — {:?}\n", panel.panel_name, panel.status));
    }
    out
}

/// Print the fallback listing to stdout.
pub fn run_fallback(feed: &SiteFeed) {
    print!("{}", alert_listing(&feed.alerts, &feed.panels));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::demo_feed;

    #[test]
    fn test_listing_enumerates_every_alert() {
        let feed = demo_feed();
        let listing = alert_listing(&feed.alerts, &feed.panels);
        for alert in &feed.alerts {
            assert!(listing.contains(&alert.title), "missing alert {}", alert.id);
            assert!(listing.contains(&alert.location_name));
        }
        for panel in &feed.panels {
            assert!(listing.contains(&panel.panel_name));
        }
    }

    #[test]
    fn test_listing_with_no_alerts() {
        let feed = demo_feed();
        let listing = alert_listing(&[], &feed.panels);
        assert!(listing.contains("No active alerts."));
    }
}
