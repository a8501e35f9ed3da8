//! Email templates
//!
//! Each template renders a subject, an HTML body and a plain-text body from
//! the notification context. Rendering returns `None` when the context lacks
//! what the template needs.

use flood_core::mailer::EmailMessage;
use flood_core::{RiskLevel, UserRecord, NOTIFICATION_EXCERPT_CHARS};

use super::notification_service::NotificationContext;

const DEFAULT_REJECTION_REASON: &str = "The report could not be verified at this time.";

const SAFETY_INSTRUCTIONS: [&str; 5] = [
    "Stay informed and monitor official updates",
    "Avoid walking or driving through flood waters",
    "Move to higher ground if flooding is imminent",
    "Keep emergency supplies ready",
    "Follow evacuation orders if issued",
];

const EMERGENCY_CONTACTS: [&str; 3] = [
    "Kenya Red Cross: 1199",
    "National Emergency: 999",
    "NDMA: 0800 723 253",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Receipt sent to the reporter
    ReportConfirmation,
    /// New-report notice sent to authorities
    NewReportNotice,
    ReportValidated,
    ReportRejected,
    FloodAlert,
    DailySummary,
    /// Automatic alert when a ward is raised to High risk
    RiskEscalation,
}

pub(crate) fn render(
    template: Template,
    ctx: &NotificationContext,
    recipient: &UserRecord,
    to: &str,
    site_url: &str,
) -> Option<EmailMessage> {
    let name = escape_html(&recipient.username);

    let (subject, html, text) = match template {
        Template::ReportConfirmation => {
            let report = ctx.report.as_ref()?;
            let subject = format!("Report Received: #{} - Flood Warning System", report.report_id);
            let link = format!("{}/report/{}/", site_url, report.report_id);
            let html = format!(
                "<p>Dear {name},</p>\
                 <p>Thank you for submitting your flood report. Your contribution helps protect our community.</p>\
                 <p><strong>Report ID:</strong> #{id}<br><strong>Location:</strong> {location}<br>\
                 <strong>Status:</strong> Under Review</p>\
                 <p>Our authorities will review your report shortly and you will receive an update by email.</p>\
                 <p><a href=\"{link}\">View Report Status</a></p>",
                id = report.report_id,
                location = escape_html(&report.location),
            );
            let text = format!(
                "Dear {},\n\nThank you for submitting flood report #{} ({}). \
                 It is now under review.\n\nView its status: {}",
                recipient.username, report.report_id, report.location, link
            );
            (subject, html, text)
        }

        Template::NewReportNotice => {
            let report = ctx.report.as_ref()?;
            let submitted_by = ctx
                .reporter
                .as_ref()
                .map(|r| r.username.clone())
                .unwrap_or_else(|| report.reporter_id.to_string());
            let location = if report.location.trim().is_empty() {
                "Not specified"
            } else {
                report.location.as_str()
            };
            let excerpt = excerpt(&report.description);
            let subject = format!("New Flood Report Submitted: #{}", report.report_id);
            let link = format!("{}/authority/dashboard/", site_url);
            let html = format!(
                "<p>A new flood report has been submitted and requires your review.</p>\
                 <p><strong>Report ID:</strong> #{id}<br><strong>Location:</strong> {location}<br>\
                 <strong>Submitted By:</strong> {by}<br><strong>Description:</strong> {excerpt}...</p>\
                 <p>Please validate or reject this report.</p>\
                 <p><a href=\"{link}\">Review Report</a></p>",
                id = report.report_id,
                location = escape_html(location),
                by = escape_html(&submitted_by),
                excerpt = escape_html(&excerpt),
            );
            let text = format!(
                "New flood report #{} at {} by {}:\n{}...\n\nReview it at {}",
                report.report_id, location, submitted_by, excerpt, link
            );
            (subject, html, text)
        }

        Template::ReportValidated => {
            let report = ctx.report.as_ref()?;
            let notes = ctx.action.as_ref().and_then(|a| a.notes.as_deref());
            let subject = format!("Flood Report #{} Has Been Validated", report.report_id);
            let notes_html = notes
                .map(|n| format!("<h4>Admin Notes</h4><p>{}</p>", escape_html(n)))
                .unwrap_or_default();
            let html = format!(
                "<p>Dear {name},</p>\
                 <p>Your flood report #{id} has been reviewed and validated by our authorities. \
                 It is now being used to help protect the community.</p>{notes_html}\
                 <p>Thank you for your contribution to community safety.</p>",
                id = report.report_id,
            );
            let mut text = format!(
                "Dear {},\n\nYour flood report #{} has been validated.",
                recipient.username, report.report_id
            );
            if let Some(notes) = notes {
                text.push_str(&format!("\n\nAdmin notes: {}", notes));
            }
            (subject, html, text)
        }

        Template::ReportRejected => {
            let report = ctx.report.as_ref()?;
            let reason = ctx
                .action
                .as_ref()
                .and_then(|a| a.notes.as_deref())
                .unwrap_or(DEFAULT_REJECTION_REASON);
            let subject = format!("Flood Report #{} Update", report.report_id);
            let link = format!("{}/submit-report/", site_url);
            let html = format!(
                "<p>Dear {name},</p>\
                 <p>We have reviewed your flood report #{id} and unfortunately could not validate it at this time.</p>\
                 <h4>Reason for Rejection</h4><p>{reason}</p>\
                 <p>If you have additional information, please submit a new report with more details.</p>\
                 <p><a href=\"{link}\">Submit New Report</a></p>",
                id = report.report_id,
                reason = escape_html(reason),
            );
            let text = format!(
                "Dear {},\n\nYour flood report #{} could not be validated.\n\nReason: {}\n\n\
                 Submit a new report: {}",
                recipient.username, report.report_id, reason, link
            );
            (subject, html, text)
        }

        Template::FloodAlert | Template::RiskEscalation => {
            let alert = ctx.alert.as_ref()?;
            let ward_name = ctx
                .ward
                .as_ref()
                .map(|w| w.name.clone())
                .unwrap_or_else(|| format!("Ward {}", alert.ward_id));
            let intro = if template == Template::RiskEscalation {
                "The flood risk level for your subscribed ward has been raised."
            } else {
                "A flood alert has been issued for your area."
            };
            let subject = format!("Flood Alert: {} Risk in {}", alert.risk_level, ward_name);
            let link = format!("{}/map/", site_url);
            let html = format!(
                "<h1 style=\"color: {color};\">FLOOD ALERT</h1><p>{level} Risk Level</p>\
                 <p>Dear {name},</p><p>{intro}</p>\
                 <h3>{ward}</h3><p>{message}</p>\
                 <h3>Safety Instructions</h3><ul>{safety}</ul>\
                 <h3>Emergency Contacts</h3><ul>{contacts}</ul>\
                 <p><a href=\"{link}\">View Live Flood Map</a></p>",
                color = risk_color(alert.risk_level),
                level = alert.risk_level,
                ward = escape_html(&ward_name),
                message = escape_html(&alert.message),
                safety = html_list(&SAFETY_INSTRUCTIONS),
                contacts = html_list(&EMERGENCY_CONTACTS),
            );
            let text = format!(
                "FLOOD ALERT: {} risk in {}\n\n{}\n\n{}\n\nSafety instructions:\n{}\n\n\
                 Emergency contacts:\n{}\n\nLive map: {}",
                alert.risk_level,
                ward_name,
                intro,
                alert.message,
                text_list(&SAFETY_INSTRUCTIONS),
                text_list(&EMERGENCY_CONTACTS),
                link
            );
            (subject, html, text)
        }

        Template::DailySummary => {
            let summary = ctx.summary.as_ref()?;
            let date = summary.date.format("%B %d, %Y").to_string();
            let subject = format!("Daily Flood Summary - {}", date);
            let link = format!("{}/authority/dashboard/", site_url);
            let html = format!(
                "<p>Dear {name},</p><p>Flood Warning System summary for {date}.</p>\
                 <ul><li>Pending reports: {pending}</li>\
                 <li>Validated reports from yesterday: {validated}</li>\
                 <li>High risk wards: {high}</li><li>Medium risk wards: {medium}</li>\
                 <li>Low risk wards: {low}</li></ul>\
                 <p><a href=\"{link}\">Open Dashboard</a></p>",
                pending = summary.pending_reports,
                validated = summary.validated_yesterday,
                high = summary.high_risk_wards,
                medium = summary.medium_risk_wards,
                low = summary.low_risk_wards,
            );
            let text = format!(
                "Daily flood summary for {}\n\nPending reports: {}\nValidated yesterday: {}\n\
                 High risk wards: {}\nMedium risk wards: {}\nLow risk wards: {}\n\nDashboard: {}",
                date,
                summary.pending_reports,
                summary.validated_yesterday,
                summary.high_risk_wards,
                summary.medium_risk_wards,
                summary.low_risk_wards,
                link
            );
            (subject, html, text)
        }
    };

    Some(EmailMessage {
        to: to.to_string(),
        subject,
        html: wrap_html(&html),
        text,
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(NOTIFICATION_EXCERPT_CHARS).collect()
}

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "#dc3545",
        RiskLevel::Medium => "#fd7e14",
        RiskLevel::Low => "#28a745",
    }
}

fn html_list(items: &[&str]) -> String {
    items.iter().map(|i| format!("<li>{}</li>", i)).collect()
}

fn text_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_html(body: &str) -> String {
    format!(
        "<html><body style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         {}<hr><p style=\"color: #666; font-size: 12px;\">\
         This is an automated message from Flood Warning System. Do not reply to this email.</p>\
         </body></html>",
        body
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flood_core::{
        ActionId, Coordinates, ReportAction, ReportId, ReportRecord, ReportStatus, ReviewDecision,
        Role, UserId, DEFAULT_RELIABILITY_SCORE,
    };

    fn report(description: &str) -> ReportRecord {
        ReportRecord {
            report_id: ReportId(12),
            reporter_id: UserId::new("r1"),
            ward_id: None,
            location: "Kibera <Line Saba>".to_string(),
            coordinates: Coordinates::new(-1.31, 36.78),
            description: description.to_string(),
            photo: None,
            status: ReportStatus::Rejected,
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            reliability_score: DEFAULT_RELIABILITY_SCORE,
        }
    }

    fn reviewer_action(notes: Option<&str>) -> ReportAction {
        ReportAction {
            action_id: ActionId(1),
            report_id: ReportId(12),
            admin_id: UserId::new("auth"),
            decision: ReviewDecision::Reject,
            notes: notes.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn recipient() -> UserRecord {
        UserRecord::new(UserId::new("r1"), "wanjiru", Role::Resident)
    }

    #[test]
    fn test_rejection_uses_default_reason() {
        let ctx = NotificationContext {
            report: Some(report("water")),
            action: Some(reviewer_action(None)),
            ..Default::default()
        };
        let msg = render(Template::ReportRejected, &ctx, &recipient(), "w@example.com", "http://x")
            .unwrap();
        assert_eq!(msg.subject, "Flood Report #12 Update");
        assert!(msg.text.contains(DEFAULT_REJECTION_REASON));
    }

    #[test]
    fn test_rejection_carries_reason() {
        let ctx = NotificationContext {
            report: Some(report("water")),
            action: Some(reviewer_action(Some("Photo shows a different area"))),
            ..Default::default()
        };
        let msg = render(Template::ReportRejected, &ctx, &recipient(), "w@example.com", "http://x")
            .unwrap();
        assert!(msg.text.contains("Photo shows a different area"));
        assert!(msg.html.contains("Photo shows a different area"));
    }

    #[test]
    fn test_notice_excerpt_and_escaping() {
        let long = "x".repeat(250);
        let ctx = NotificationContext {
            report: Some(report(&long)),
            ..Default::default()
        };
        let msg = render(Template::NewReportNotice, &ctx, &recipient(), "a@example.com", "http://x")
            .unwrap();
        assert_eq!(msg.subject, "New Flood Report Submitted: #12");
        assert!(msg.text.contains(&format!("{}...", "x".repeat(100))));
        assert!(!msg.text.contains(&"x".repeat(101)));
        assert!(msg.html.contains("Kibera &lt;Line Saba&gt;"));
    }

    #[test]
    fn test_missing_context_renders_nothing() {
        let ctx = NotificationContext::default();
        assert!(render(Template::FloodAlert, &ctx, &recipient(), "a@example.com", "http://x").is_none());
    }
}
