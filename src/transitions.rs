use std::collections::HashMap;
use crate::types::State;
use crate::events::Event;

pub type TransitionTable = HashMap<(State, Event), State>;

/// Builds the ReAct-cycle transition table.
///
/// Any (State, Event) pair not in this table is illegal and makes
/// `AgentEngine::run()` return `AgentError::InvalidTransition`.
pub fn build_transition_table() -> TransitionTable {
    let mut t = HashMap::new();

    // ── IDLE ─────────────────────────────────────────────
    t.insert((State::idle(),      Event::start()),            State::planning());

    // ── PLANNING ─────────────────────────────────────────
    t.insert((State::planning(),  Event::llm_tool_call()),    State::acting());
    t.insert((State::planning(),  Event::llm_final_answer()), State::done());
    t.insert((State::planning(),  Event::max_steps()),        State::error());
    t.insert((State::planning(),  Event::answer_too_short()), State::planning());
    t.insert((State::planning(),  Event::fatal_error()),      State::error());

    // ── ACTING ───────────────────────────────────────────
    t.insert((State::acting(),    Event::tool_success()),     State::observing());
    t.insert((State::acting(),    Event::tool_failure()),     State::observing());
    t.insert((State::acting(),    Event::fatal_error()),      State::error());

    // ── OBSERVING ────────────────────────────────────────
    t.insert((State::observing(), Event::r#continue()),       State::planning());

    // DONE and ERROR are terminal; the engine exits before a lookup.
    t
}

pub fn is_valid_transition(table: &TransitionTable, state: &State, event: &Event) -> bool {
    table.contains_key(&(state.clone(), event.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        let table = build_transition_table();
        assert!(table.keys().all(|(from, _)| !from.is_terminal()));
    }

    #[test]
    fn tool_failure_is_observed_not_fatal() {
        let table = build_transition_table();
        assert_eq!(
            table.get(&(State::acting(), Event::tool_failure())),
            Some(&State::observing())
        );
        assert!(!is_valid_transition(&table, &State::observing(), &Event::tool_failure()));
    }
}
