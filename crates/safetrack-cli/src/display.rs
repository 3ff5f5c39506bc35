//! Terminal rendering for compliance cards and gap reports.

use chrono::NaiveDate;
use safetrack_core::{
    AreaStatus, CertificateStatus, ComplianceSummary, ExpiryFacts, GapReport, Personnel,
    RiskLevel,
};

const MAX_LIST_ITEMS: usize = 10;

// ── Person card ──

/// Print one person's per-area statuses as a vertical card.
pub fn print_person_card(person: &Personnel, statuses: &[AreaStatus], today: NaiveDate) {
    let summary = ComplianceSummary::from_statuses(statuses);

    println!("=== {} ===", person.full_name);
    match person.organization_name.as_deref() {
        Some(org) => println!("{} · {}", person.position, org),
        None => println!("{}", person.position),
    }
    println!(
        "Areas compliant: {}/{} ({}%)  as of {}",
        summary.compliant,
        summary.total,
        summary.percent(),
        today
    );
    println!();

    if statuses.is_empty() {
        println!("  No required areas for this position.");
        return;
    }

    for status in statuses {
        println!(
            "{}  {}  [{}]",
            status.area.code, status.area.name, status.area.category
        );
        println!("  {:<26} {}", "status", status.overall_status);

        let dpo = status.qualification.as_ref().map(|m| {
            format!(
                "{}  {}",
                m.record.certificate_number,
                format_expiry(&m.expiry, today)
            )
        });
        println!("  {:<26} {}", "dpo certificate", dpo.as_deref().unwrap_or("-"));

        let attestation = status.attestation.as_ref().map(|m| {
            format!(
                "{} ({})  {}",
                m.record.protocol_number,
                m.record.attestation_type,
                format_expiry(&m.expiry, today)
            )
        });
        println!(
            "  {:<26} {}",
            "attestation",
            attestation.as_deref().unwrap_or("-")
        );
        println!();
    }
}

/// `expires 2027-04-14 (13 months, active)`
fn format_expiry(expiry: &ExpiryFacts, today: NaiveDate) -> String {
    let validity = CertificateStatus::of(expiry.expiry_date, today);
    format!(
        "expires {} ({} months, {})",
        expiry.expiry_date, expiry.months_until_expiry, validity
    )
}

// ── Gap report ──

pub fn print_gap_report(report: &GapReport) {
    println!("=== Competency gap report ({}) ===", report.as_of);
    println!();

    println!("Totals");
    println!("  {:<26} {}", "personnel", report.total_personnel);
    println!("  {:<26} {}", "compliant", report.compliant_personnel);
    println!("  {:<26} {}", "non-compliant", report.non_compliant_personnel);
    println!("  {:<26} {}", "critical", report.critical_gaps);
    println!("  {:<26} {}", "high risk", report.high_risk_gaps);
    println!("  {:<26} {}%", "compliance rate", report.compliance_rate);
    println!();

    if !report.by_organization.is_empty() {
        println!("By organisation");
        for org in &report.by_organization {
            println!(
                "  {:<26} {}/{} ({}%)",
                truncate(&org.organization_name, 26),
                org.compliant,
                org.total_personnel,
                org.compliance_rate
            );
        }
        println!();
    }

    if !report.by_category.is_empty() {
        println!("By category");
        for cat in &report.by_category {
            println!(
                "  {:<26} {} missing of {} required",
                cat.category, cat.total_missing, cat.total_required
            );
            if !cat.most_missing_areas.is_empty() {
                let top: Vec<String> = cat
                    .most_missing_areas
                    .iter()
                    .map(|a| format!("{} ×{}", a.code, a.count))
                    .collect();
                println!("  {:<26} {}", "", top.join(", "));
            }
        }
        println!();
    }

    let at_risk: Vec<_> = report
        .gaps
        .iter()
        .filter(|g| matches!(g.risk_level, RiskLevel::Critical | RiskLevel::High))
        .collect();
    if at_risk.is_empty() {
        return;
    }

    println!("At risk ({}):", at_risk.len());
    for gap in at_risk.iter().take(MAX_LIST_ITEMS) {
        let missing: Vec<&str> = gap.missing_areas.iter().map(|m| m.code.as_str()).collect();
        println!(
            "  {:<30} {:<8} {:>3}%  missing: {}",
            truncate(&gap.full_name, 30),
            gap.risk_level.as_str(),
            gap.completion_rate,
            missing.join(", ")
        );
    }
    if at_risk.len() > MAX_LIST_ITEMS {
        println!("  ... and {} more", at_risk.len() - MAX_LIST_ITEMS);
    }
}

/// Shorten to `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
