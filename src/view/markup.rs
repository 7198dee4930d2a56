//! Dashboard HTML fragments
//!
//! Table rows and alert boxes in the page's Bootstrap vocabulary:
//! - route badge `bg-success` (OTC) / `bg-primary` (other)
//! - slippage `text-warning` above threshold, `text-success` otherwise
//! - savings `text-success` when positive, `text-muted` placeholder otherwise
//!
//! Every interpolated value is escaped.

use crate::notifications::{Notification, Severity};
use crate::table::{RouteBadge, RowView, SavingsStyle, SlippageLevel};

/// Attribute carried by each alert's close button
pub const DISMISS_ATTR: &str = "data-dismiss-notification";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn row_html(row: &RowView) -> String {
    let badge = match row.route_badge {
        RouteBadge::Otc => "success",
        RouteBadge::Other => "primary",
    };
    let slippage_class = match row.slippage_level {
        SlippageLevel::Warning => "text-warning",
        SlippageLevel::Normal => "text-success",
    };
    let savings_class = match row.savings_style {
        SavingsStyle::Positive => "text-success",
        SavingsStyle::Neutral => "text-muted",
    };

    format!(
        r#"<tr class="fade-in" data-trade-id="{id}">
    <td><small class="text-muted">{time}</small></td>
    <td><span class="badge bg-{badge}">{route}</span></td>
    <td>{pair}</td>
    <td>{amount}</td>
    <td>{price}</td>
    <td><span class="{slippage_class}">{slippage}</span></td>
    <td><span class="{savings_class}">{savings}</span></td>
</tr>"#,
        id = row.trade_id,
        time = escape(&row.time),
        route = escape(&row.route),
        pair = escape(&row.pair),
        amount = escape(&row.amount),
        price = escape(&row.price),
        slippage = escape(&row.slippage),
        savings = escape(&row.savings),
    )
}

pub fn rows_html(rows: &[RowView]) -> String {
    rows.iter().map(row_html).collect::<Vec<_>>().join("\n")
}

pub fn notification_html(notification: &Notification) -> String {
    let (kind, icon) = match notification.severity {
        Severity::Success => ("success", "bi-check-circle"),
        Severity::Error => ("danger", "bi-exclamation-triangle"),
    };
    format!(
        r#"<div class="alert alert-{kind} alert-dismissible fade show" role="alert">
    <i class="bi {icon} me-2"></i>{message}
    <button type="button" class="btn-close" {DISMISS_ATTR}="{id}" aria-label="Close"></button>
</div>"#,
        message = escape(&notification.message),
        id = notification.id,
    )
}

/// Alerts in list order (newest first)
pub fn notifications_html(notifications: &[Notification]) -> String {
    let mut out = String::new();
    for n in notifications {
        out.push_str(&notification_html(n));
        out.push('\n');
    }
    out
}

/// Submit button content while busy
pub fn busy_button_html(label: &str) -> String {
    format!(
        r#"<span class="spinner-border spinner-border-sm me-2"></span>{}"#,
        escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::notifications::NotificationCenter;
    use crate::table::TableRenderer;
    use crate::test_support::sample_trade;
    use crate::timers::TimerQueue;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b a="1">&'"#), "&lt;b a=&quot;1&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_otc_row_markup() {
        let row = TableRenderer::new(&DashboardConfig::default()).render_row(&sample_trade(1));
        let html = row_html(&row);

        assert!(html.contains(r#"<span class="badge bg-success">OTC</span>"#));
        assert!(html.contains("<td>1000.00 USDC</td>"));
        assert!(html.contains("<td>$3500.1234</td>"));
        assert!(html.contains(r#"<span class="text-success">0.250%</span>"#));
        assert!(html.contains(r#"<span class="text-success">+$12.50</span>"#));
    }

    #[test]
    fn test_warning_and_neutral_classes() {
        let mut trade = sample_trade(1);
        trade.slippage = 1.5;
        trade.cost_savings = 0.0;
        trade.route = "DEX".into();
        let row = TableRenderer::new(&DashboardConfig::default()).render_row(&trade);
        let html = row_html(&row);

        assert!(html.contains("bg-primary"));
        assert!(html.contains(r#"<span class="text-warning">1.500%</span>"#));
        assert!(html.contains(r#"<span class="text-muted">$0.00</span>"#));
    }

    #[test]
    fn test_tokens_are_escaped() {
        let mut trade = sample_trade(1);
        trade.input_token = "<script>".into();
        let row = TableRenderer::new(&DashboardConfig::default()).render_row(&trade);
        assert!(!row_html(&row).contains("<script>"));
    }

    #[test]
    fn test_notifications_newest_first_with_dismiss() {
        let mut timers = TimerQueue::new();
        let mut center = NotificationCenter::new(&DashboardConfig::default());
        center.notify(&mut timers, 0, "Auto-refresh enabled", Severity::Success);
        let err = center.notify(&mut timers, 1, "Failed to refresh data", Severity::Error);

        let html = notifications_html(center.list());
        let danger = html.find("alert-danger").unwrap();
        let success = html.find("alert-success").unwrap();
        assert!(danger < success);
        assert!(html.contains(&format!(r#"{DISMISS_ATTR}="{err}""#)));
        assert_eq!(html.matches("</div>\n").count(), 2);
        assert!(notifications_html(&[]).is_empty());
    }
}
