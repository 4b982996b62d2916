use serde::Serialize;

use crate::ConversationRow;

pub const DEFAULT_GOAL: f64 = 0.9;

/// How far an analyst is from having classified enough conversations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationGoal {
    pub total: usize,
    pub classified: usize,
    pub pending: usize,
    /// Classified share, in percent.
    pub rate: f64,
    /// Target share, as a fraction.
    pub goal: f64,
    pub met: bool,
    /// Conversations still to classify to reach the goal.
    pub remaining: usize,
}

/// An empty set of rows counts as meeting the goal.
pub fn classification_goal(rows: &[ConversationRow], reason_column: &str, goal: f64) -> ClassificationGoal {
    let total = rows.len();
    let classified = rows
        .iter()
        .filter(|row| row.attribute(reason_column).is_some())
        .count();
    let rate = if total == 0 { 0.0 } else { classified as f64 / total as f64 * 100.0 };
    let met = total == 0 || rate >= goal * 100.0;
    let remaining = if met {
        0
    } else {
        (goal * total as f64 - classified as f64).floor().max(0.0) as usize + 1
    };

    ClassificationGoal { total, classified, pending: total - classified, rate, goal, met, remaining }
}

/// Rows still missing a reason, in their original order.
pub fn pending<'a>(rows: &'a [ConversationRow], reason_column: &str) -> Vec<&'a ConversationRow> {
    rows.iter()
        .filter(|row| row.attribute(reason_column).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use deskpulse_domain::ConversationId;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    const REASON: &str = "Motivo de Contato";

    fn rows(classified: usize, total: usize) -> Vec<ConversationRow> {
        (0..total)
            .map(|i| {
                let mut attributes = IndexMap::new();
                if i < classified {
                    attributes.insert(REASON.to_string(), Value::from("Acesso"));
                }
                ConversationRow {
                    id: ConversationId::new(i.to_string()),
                    created_at: i as i64,
                    date: String::new(),
                    assignee: "Ana".to_string(),
                    link: String::new(),
                    reply_seconds: None,
                    resolution_seconds: None,
                    rating: None,
                    remark: None,
                    attributes,
                }
            })
            .collect()
    }

    #[test]
    fn test_goal_not_met() {
        let actual = classification_goal(&rows(7, 10), REASON, DEFAULT_GOAL);
        let expected = ClassificationGoal {
            total: 10,
            classified: 7,
            pending: 3,
            rate: 70.0,
            goal: 0.9,
            met: false,
            remaining: 3,
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_remaining_rounds_down_then_adds_one() {
        // 0.9 * 15 - 10 = 3.5
        let actual = classification_goal(&rows(10, 15), REASON, DEFAULT_GOAL);
        assert_eq!(actual.remaining, 4);
        assert!(!actual.met);
    }

    #[test]
    fn test_goal_met() {
        let actual = classification_goal(&rows(9, 10), REASON, DEFAULT_GOAL);
        assert!(actual.met);
        assert_eq!(actual.remaining, 0);
        assert_eq!(actual.pending, 1);
    }

    #[test]
    fn test_empty_rows_meet_goal() {
        let actual = classification_goal(&[], REASON, DEFAULT_GOAL);
        assert!(actual.met);
        assert_eq!(actual.rate, 0.0);
    }

    #[test]
    fn test_pending_rows() {
        let fixture = rows(2, 4);
        let actual: Vec<&str> = pending(&fixture, REASON).iter().map(|row| row.id.as_str()).collect();
        assert_eq!(actual, vec!["2", "3"]);
    }
}
