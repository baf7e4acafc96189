//! Prompt-ready renderings of each [`CaseRecord`] section.
//!
//! Every function tolerates a sparse record: absent leaves render as
//! [`NOT_AVAILABLE`], absent lists render a single `- N/A` line, and section
//! headings are always emitted.

use serde_json::Value;

use crate::record::{render, CaseRecord, NOT_AVAILABLE};

fn field(item: &Value, key: &str) -> String {
    render(item.get(key))
}

/// `- item` per element, or `- N/A` when the list is empty or absent.
fn bullets(items: &[Value]) -> String {
    bullet_lines(items.iter().map(|v| render(Some(v))))
}

fn bullet_lines(lines: impl Iterator<Item = String>) -> String {
    let lines: Vec<String> = lines.map(|l| format!("- {l}")).collect();
    if lines.is_empty() {
        format!("- {NOT_AVAILABLE}")
    } else {
        lines.join("\n")
    }
}

fn joined(items: &[Value]) -> String {
    if items.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    items
        .iter()
        .map(|v| render(Some(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn case_summary(record: &CaseRecord) -> String {
    format!(
        "\nTitle: {title}\n\
         Case Type: {case_type}\n\n\
         Consumer Details:\n\
         - Description: {consumer}\n\
         - Claim Amount: Rs. {claim}\n\
         - Key Grievances: {grievances}\n\n\
         Opposite Party:\n\
         - Description: {opposite}\n\n\
         Facts of Case:\n{facts}\n\n\
         Evidence Available:\n{available}\n\n\
         Evidence Missing:\n{missing}\n",
        title = record.text("Case_Summary.Title"),
        case_type = record.text("Case_Summary.Case_Type"),
        consumer = record.text("Case_Summary.Consumer_Details.Description"),
        claim = record.text("Case_Summary.Consumer_Details.Claim_Amount"),
        grievances = joined(record.items("Case_Summary.Consumer_Details.Key_Grievances")),
        opposite = record.text("Case_Summary.Opposite_Party_Details.Description"),
        facts = bullets(record.items("Case_Summary.Facts_of_Case")),
        available = bullets(record.items("Case_Summary.Evidence_Available")),
        missing = bullets(record.items("Case_Summary.Evidence_Missing")),
    )
}

pub fn legal_grounds(record: &CaseRecord) -> String {
    let sections = bullet_lines(
        record
            .items("Legal_Grounds.Applicable_Sections")
            .iter()
            .map(|s| {
                format!(
                    "Section {} of {}: {}",
                    field(s, "Section"),
                    field(s, "Act"),
                    field(s, "Description")
                )
            }),
    );
    let precedents = bullet_lines(
        record
            .items("Legal_Grounds.Precedents_Cited")
            .iter()
            .map(|p| {
                format!(
                    "{} ({}): {}",
                    field(p, "Case_Name"),
                    field(p, "Year"),
                    field(p, "Key_Holding")
                )
            }),
    );
    format!(
        "\nApplicable Sections:\n{sections}\n\n\
         Precedents:\n{precedents}\n\n\
         Legal Principles:\n{principles}\n",
        principles = bullets(record.items("Legal_Grounds.Legal_Principles")),
    )
}

pub fn judgment_reasoning(record: &CaseRecord) -> String {
    let issues: Vec<String> = record
        .items("Judgment_Reasoning.Issues_Framed")
        .iter()
        .map(|i| {
            format!(
                "Issue {}: {}\nFinding: {}",
                field(i, "Issue_Number"),
                field(i, "Issue"),
                field(i, "Finding")
            )
        })
        .collect();
    let issues = if issues.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        issues.join("\n")
    };
    format!(
        "\nIssues Framed:\n{issues}\n\n\
         Overall Findings: {findings}\n\
         Liability Status: {status}\n\
         Liability Confidence: {confidence}\n",
        findings = record.text("Judgment_Reasoning.Findings"),
        status = record.text("Judgment_Reasoning.Liability_Status"),
        confidence = record.text("Judgment_Reasoning.Liability_Confidence"),
    )
}

pub fn relief_granted(record: &CaseRecord) -> String {
    let additional = bullet_lines(
        record
            .items("Relief_Granted.Additional_Relief")
            .iter()
            .map(|r| {
                format!(
                    "{}: Rs. {} ({})",
                    field(r, "Type"),
                    field(r, "Amount"),
                    field(r, "Justification")
                )
            }),
    );
    format!(
        "\nPrimary Relief: {kind} - Rs. {amount}\n\n\
         Additional Relief:\n{additional}\n\n\
         Total Compensation Range: Rs. {min} - Rs. {max}\n\
         Most Likely: Rs. {likely}\n\n\
         Recommended Forum: {forum}\n",
        kind = record.text("Relief_Granted.Primary_Relief.Type"),
        amount = record.text("Relief_Granted.Primary_Relief.Amount"),
        min = record.text("Relief_Granted.Total_Compensation_Range.Minimum"),
        max = record.text("Relief_Granted.Total_Compensation_Range.Maximum"),
        likely = record.text("Relief_Granted.Total_Compensation_Range.Most_Likely"),
        forum = record.text("Relief_Granted.Recommended_Forum"),
    )
}

/// The opposite party's own position, for defense counsel.
pub fn defense_arguments(record: &CaseRecord) -> String {
    format!(
        "\nClient Description: {client}\n\
         Client Claim Amount: Rs. {claim}\n\n\
         Defense Arguments:\n{defense}\n\n\
         Key Counter-Arguments Available:\n{counter}\n\n\
         Critical Moments to Watch:\n{moments}\n",
        client = record.text("Case_Summary.Opposite_Party_Details.Description"),
        claim = record.text("Case_Summary.Opposite_Party_Details.Claim_Amount"),
        defense = bullets(record.items("Case_Summary.Opposite_Party_Details.Defense_Arguments")),
        counter = bullets(record.items("Simulation_Metadata.Key_Arguments_For_Opposite_Party")),
        moments = bullets(record.items("Simulation_Metadata.Critical_Moments")),
    )
}

pub fn applicable_sections(record: &CaseRecord) -> String {
    bullet_lines(
        record
            .items("Legal_Grounds.Applicable_Sections")
            .iter()
            .map(|s| {
                format!(
                    "{}: {} (Relevance: {})",
                    field(s, "Section"),
                    field(s, "Description"),
                    field(s, "Relevance_to_Case")
                )
            }),
    )
}

pub fn consumer_arguments(record: &CaseRecord) -> String {
    bullets(record.items("Simulation_Metadata.Key_Arguments_For_Consumer"))
}
