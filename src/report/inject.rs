//! Analysis injection into a `<testcase>`
//!
//! Structured fields go into `<properties>` (one `<property>` per name,
//! updated in place on re-runs). The readable summary goes into
//! `<system-out>`, which only ever grows.

use crate::analysis::AnalysisPayload;
use crate::report::document::{Element, Node};

pub const PROPERTY_CLASSIFICATION: &str = "ai_classification";
pub const PROPERTY_DETAILS: &str = "ai_details";
pub const PROPERTY_AFFECTED_TESTS: &str = "ai_affected_tests";
pub const PROPERTY_CODE_FIX_FILE: &str = "ai_code_fix_file";
pub const PROPERTY_CODE_FIX_LINE: &str = "ai_code_fix_line";
pub const PROPERTY_CODE_FIX_CHANGE: &str = "ai_code_fix_change";
pub const PROPERTY_BUG_TITLE: &str = "ai_bug_title";
pub const PROPERTY_BUG_SEVERITY: &str = "ai_bug_severity";
pub const PROPERTY_BUG_COMPONENT: &str = "ai_bug_component";
pub const PROPERTY_BUG_DESCRIPTION: &str = "ai_bug_description";

/// Delimiter between existing `<system-out>` content and the analysis
pub const OUTPUT_DELIMITER: &str = "\n\n--- AI Analysis ---\n";

/// Inject `analysis` into a testcase element
pub fn inject_analysis(testcase: &mut Element, analysis: &AnalysisPayload) {
    let had_properties = testcase.child("properties").is_some();
    let properties = testcase.child_or_insert("properties");
    set_property(properties, PROPERTY_CLASSIFICATION, &analysis.classification);
    set_property(properties, PROPERTY_DETAILS, &analysis.details);
    if !analysis.affected_tests.is_empty() {
        set_property(
            properties,
            PROPERTY_AFFECTED_TESTS,
            &analysis.affected_tests.join(", "),
        );
    }
    if let Some(fix) = &analysis.code_fix {
        set_property(properties, PROPERTY_CODE_FIX_FILE, &fix.file);
        set_property(properties, PROPERTY_CODE_FIX_LINE, &fix.line);
        set_property(properties, PROPERTY_CODE_FIX_CHANGE, &fix.change);
    }
    if let Some(bug) = &analysis.product_bug_report {
        set_property(properties, PROPERTY_BUG_TITLE, &bug.title);
        set_property(properties, PROPERTY_BUG_SEVERITY, &bug.severity);
        set_property(properties, PROPERTY_BUG_COMPONENT, &bug.component);
        set_property(properties, PROPERTY_BUG_DESCRIPTION, &bug.description);
    }
    // Nothing to say: drop the <properties/> we just appended
    if !had_properties && properties.children.is_empty() {
        testcase.children.pop();
    }

    let text = format_analysis_text(analysis);
    if !text.is_empty() {
        append_output(testcase, &text);
    }
}

/// Set a `<property>` by name; empty values are not written
///
/// Reuses the first property with the same name and drops later
/// duplicates, so the name appears exactly once afterwards.
pub fn set_property(properties: &mut Element, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let mut seen = false;
    properties.children.retain_mut(|node| match node {
        Node::Element(prop) if prop.name == "property" && prop.attribute("name") == Some(name) => {
            if seen {
                return false;
            }
            seen = true;
            prop.set_attribute("value", value);
            true
        }
        _ => true,
    });
    if !seen {
        properties.children.push(Node::Element(
            Element::new("property")
                .with_attribute("name", name)
                .with_attribute("value", value),
        ));
    }
}

/// Append to `<system-out>`, creating it when absent
pub fn append_output(testcase: &mut Element, text: &str) {
    let system_out = testcase.child_or_insert("system-out");
    if system_out.text().is_empty() {
        system_out.append_text(text);
    } else {
        system_out.append_text(&format!("{}{}", OUTPUT_DELIMITER, text));
    }
}

/// Human-readable rendering of an analysis
pub fn format_analysis_text(analysis: &AnalysisPayload) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !analysis.classification.is_empty() {
        parts.push(format!("Classification: {}", analysis.classification));
    }
    if !analysis.details.is_empty() {
        parts.push(format!("\n{}", analysis.details));
    }
    if let Some(fix) = &analysis.code_fix {
        parts.push("\nCode Fix:".to_string());
        parts.push(format!("  File: {}", fix.file));
        parts.push(format!("  Line: {}", fix.line));
        parts.push(format!("  Change: {}", fix.change));
    }
    if let Some(bug) = &analysis.product_bug_report {
        parts.push("\nProduct Bug:".to_string());
        parts.push(format!("  Title: {}", bug.title));
        parts.push(format!("  Severity: {}", bug.severity));
        parts.push(format!("  Component: {}", bug.component));
        parts.push(format!("  Description: {}", bug.description));
    }

    parts.join("\n")
}
