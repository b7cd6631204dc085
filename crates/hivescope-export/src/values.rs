//! Value report rendering.

use hivescope_core::{ValueGroup, ValueGroupOutcome};

use crate::report::{ReportHeader, separator};

/// Render value groups under a single header.
pub fn render_values(header: &ReportHeader, groups: &[ValueGroup]) -> String {
    let mut out = String::new();
    out.push_str(&header.title_line());
    out.push('\n');
    out.push_str(&separator());
    out.push_str("\n\n");
    for group in groups {
        out.push_str(&render_value_group(group));
    }
    out
}

/// Render one group, including its trailing blank line.
pub fn render_value_group(group: &ValueGroup) -> String {
    let mut out = String::new();
    match &group.outcome {
        ValueGroupOutcome::Read { entries } => {
            out.push_str(&format!("===== {} =====\n\n", group.title));
            for (name, value) in entries {
                match value {
                    Some(value) => out.push_str(&format!("{name} = {value}\n")),
                    None => out.push_str(&format!("{name} = NULL\n")),
                }
            }
        }
        ValueGroupOutcome::Failed { reason } => {
            out.push_str(&format!("[FAILED] {}\nReason: {reason}\n", group.title));
        }
        ValueGroupOutcome::Error { reason } => {
            out.push_str(&format!("[ERROR] {}\nReason: {reason}\n", group.title));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivescope_core::KeyValue;

    #[test]
    fn test_read_group() {
        let group = ValueGroup {
            title: "UAC Settings".into(),
            path: "P".into(),
            outcome: ValueGroupOutcome::Read {
                entries: [
                    ("EnableLUA".to_string(), Some(KeyValue::Dword(1))),
                    ("ConsentPromptBehaviorUser".to_string(), None),
                ]
                .into_iter()
                .collect(),
            },
        };
        assert_eq!(
            render_value_group(&group),
            "===== UAC Settings =====\n\nEnableLUA = 1\nConsentPromptBehaviorUser = NULL\n\n"
        );
    }

    #[test]
    fn test_failed_and_error_groups() {
        let failed = ValueGroup {
            title: "Time Zone Info".into(),
            path: "P".into(),
            outcome: ValueGroupOutcome::Failed {
                reason: "Key not found - P".into(),
            },
        };
        assert_eq!(
            render_value_group(&failed),
            "[FAILED] Time Zone Info\nReason: Key not found - P\n\n"
        );

        let error = ValueGroup {
            title: "T".into(),
            path: "P".into(),
            outcome: ValueGroupOutcome::Error { reason: "boom".into() },
        };
        assert_eq!(render_value_group(&error), "[ERROR] T\nReason: boom\n\n");
    }
}
