use chrono::{DateTime, Utc};

use super::types::*;

pub fn calculate_session_stats(
    turns: &[AgentTurn],
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
) -> SessionStats {
    let total_turns = turns.len();
    let duration_seconds = end_time
        .map(|end| (end - start_time).num_seconds())
        .unwrap_or(0);
    let approx_output_tokens: u64 = turns.iter().map(|t| t.stats.approx_output_tokens).sum();

    SessionStats {
        total_turns,
        duration_seconds,
        approx_output_tokens,
    }
}

pub fn calculate_turn_stats(steps: &[AgentStep], turn_start: DateTime<Utc>) -> TurnStats {
    let step_count = steps.len();
    let duration_ms = steps
        .last()
        .map(|last| (last.timestamp - turn_start).num_milliseconds())
        .unwrap_or(0);
    let approx_output_tokens: u64 = steps.iter().map(|s| s.approx_output_tokens).sum();

    TurnStats {
        duration_ms,
        step_count,
        approx_output_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::UserMessage;
    use jacques_types::UserEntry;
    use uuid::Uuid;

    fn step(tokens: u64) -> AgentStep {
        AgentStep {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            reasoning: None,
            message: None,
            tools: Vec::new(),
            approx_output_tokens: tokens,
            is_failed: false,
            status: StepStatus::Done,
        }
    }

    #[test]
    fn turn_stats_sum_step_tokens() {
        let start = Utc::now();
        let steps = vec![step(10), step(20)];
        let stats = calculate_turn_stats(&steps, start);
        assert_eq!(stats.approx_output_tokens, 30);
        assert_eq!(stats.step_count, 2);
    }

    #[test]
    fn session_stats_sum_turn_tokens() {
        let start = Utc::now();
        let turn_stats = calculate_turn_stats(&[step(5)], start);
        let turn = AgentTurn {
            id: Uuid::new_v4(),
            timestamp: start,
            user: UserMessage {
                entry_id: Uuid::new_v4(),
                content: UserEntry { text: "hi".to_string(), internal: false },
            },
            steps: vec![step(5)],
            stats: turn_stats,
        };
        let stats = calculate_session_stats(&[turn], start, Some(start));
        assert_eq!(stats.total_turns, 1);
        assert_eq!(stats.approx_output_tokens, 5);
    }
}
