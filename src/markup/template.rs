//! Template Compiler: structured fields to canonical markup text.
//!
//! Deterministic and total: missing optional fields omit their section,
//! nothing fails. Section numbers are fixed labels and are never
//! renumbered when an optional section is absent. Everything emitted here
//! must classify cleanly: the classifier grammar is the contract.

use crate::consolidation::synthesis::ConsolidatedBriefing;
use crate::models::report::ReportFields;

/// Closing boilerplate appended verbatim to the overall section.
const CLOSING_BOILERPLATE: &str =
    "Submitted for your information and any further necessary action, please.";

/// Fixed closing salutation.
const CLOSING_SALUTATION: &str = "Warm regards.";

/// Fixed default for empty force-discipline fields.
const NONE_REPORTED: &str = "None reported.";

/// Compiles report fields into the canonical markup body.
pub fn compile_daily_report(fields: &ReportFields) -> String {
    let mut sections: Vec<String> = Vec::new();

    // 1. Operational narrative
    let mut narrative = format!(
        "*1. OPERATIONAL NARRATIVE*\nToday marks the {} day of attachment with {}. {}",
        fields.attachment_day, fields.unit, fields.narrative
    );
    if let Some(extra) = fields.supplementary.as_deref().filter(|s| !s.trim().is_empty()) {
        narrative.push('\n');
        narrative.push_str(extra.trim());
    }
    sections.push(narrative);

    // 2. Security situation, with an incidents sub-block when any exist
    let mut security = format!(
        "*2. SECURITY SITUATION*\nThe security situation in the area of responsibility was {}.",
        fields.security_status
    );
    if !fields.incidents.is_empty() {
        security.push_str("\nThe following incidents were recorded:");
        for incident in &fields.incidents {
            security.push_str(&format!("\nAt {}, {}", incident.time, incident.description));
        }
    }
    sections.push(security);

    // 3. Action taken: label and text share the line, so it classifies
    // as Body, not Heading. Deliberate; the exported layout expects it.
    if let Some(action) = fields.action_taken.as_deref().filter(|s| !s.trim().is_empty()) {
        sections.push(format!("*3. ACTION TAKEN:* {}", action.trim()));
    }

    // 4. Duties, one bullet per entry
    if !fields.duties.is_empty() {
        let mut duties = String::from("*4. DUTIES CARRIED OUT*");
        for duty in &fields.duties {
            duties.push_str(&format!("\n. {duty}"));
        }
        sections.push(duties);
    }

    // 5. Force discipline: always present
    sections.push(format!(
        "*5. FORCE DISCIPLINE*\n. Casualties: {}\n. Disciplinary cases: {}",
        or_none_reported(&fields.casualties),
        or_none_reported(&fields.disciplinary_cases),
    ));

    // 6/7. Challenges and recommendations collapse into one prose line
    // joined with " and ": a deliberate, testable joining rule.
    if !fields.challenges.is_empty() {
        sections.push(format!("*6. CHALLENGES*\n{}", fields.challenges.join(" and ")));
    }
    if !fields.recommendations.is_empty() {
        sections.push(format!(
            "*7. RECOMMENDATIONS*\n{}",
            fields.recommendations.join(" and ")
        ));
    }

    // Overall block: summary, boilerplate, signature, salutation
    let summary = fields.overall_summary.trim();
    let summary_line = if summary.is_empty() {
        CLOSING_BOILERPLATE.to_string()
    } else {
        format!("{summary} {CLOSING_BOILERPLATE}")
    };
    sections.push(format!(
        "*OVERALL*\n{summary_line}\n\n{}\n\n{CLOSING_SALUTATION}",
        signature_line(&fields.unit, &fields.signing_officer),
    ));

    sections.join("\n\n")
}

/// Signature line in the exact persisted form.
pub fn signature_line(unit: &str, signing_officer: &str) -> String {
    format!("OC {unit}: OC {signing_officer}")
}

fn or_none_reported(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NONE_REPORTED
    } else {
        trimmed
    }
}

/// Compiles a consolidated briefing through the same grammar, so the
/// document codec path is identical to daily reports. Empty sections are
/// omitted, matching the report compiler's omission rule.
pub fn compile_briefing(briefing: &ConsolidatedBriefing, day_count: usize) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !briefing.executive_summary.trim().is_empty() {
        sections.push(format!(
            "*EXECUTIVE SUMMARY*\nConsolidated over the first {day_count} report day(s).\n{}",
            briefing.executive_summary.trim()
        ));
    }

    push_bullet_section(&mut sections, "KEY ACHIEVEMENTS", &briefing.key_achievements);
    push_bullet_section(&mut sections, "OPERATIONAL TRENDS", &briefing.operational_trends);
    push_bullet_section(&mut sections, "CRITICAL CHALLENGES", &briefing.critical_challenges);
    push_bullet_section(
        &mut sections,
        "STRATEGIC RECOMMENDATIONS",
        &briefing.strategic_recommendations,
    );

    if !briefing.incident_timeline.is_empty() {
        let mut timeline = String::from("*INCIDENT TIMELINE*");
        for day in &briefing.incident_timeline {
            timeline.push_str(&format!("\n{}:", day.day_label));
            for event in &day.events {
                timeline.push_str(&format!("\n. {event}"));
            }
        }
        sections.push(timeline);
    }

    sections.join("\n\n")
}

fn push_bullet_section(sections: &mut Vec<String>, title: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    let mut section = format!("*{title}*");
    for entry in entries {
        section.push_str(&format!("\n. {entry}"));
    }
    sections.push(section);
}
