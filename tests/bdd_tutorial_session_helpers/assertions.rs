//! Then-step assertions for tutorial session scenarios.

use std::time::Duration;

use rstest_bdd_macros::then;
use tutorial_sequencer::progress::ProgressStore;

use super::state::{StepResult, TutorialSessionState, parse_tutorial};

/// Slack allowed on completion times: one completion timer tick.
const TICK: Duration = Duration::from_millis(20);

#[then("the current step index is {index}")]
fn current_step_index_is(
    tutorial_session_state: &TutorialSessionState,
    index: usize,
) -> StepResult<()> {
    let status = tutorial_session_state.world()?.status()?;
    if status.step == Some(index) {
        return Ok(());
    }
    Err(format!("expected step {index}, got {:?}", status.step))
}

#[then("step {index} of the {tutorial_name} tutorial is highlighted")]
fn step_is_highlighted(
    tutorial_session_state: &TutorialSessionState,
    index: usize,
    tutorial_name: String,
) -> StepResult<()> {
    let tutorial = parse_tutorial(&tutorial_name)?;
    let world = tutorial_session_state.world()?;
    world.status()?;
    let flags = world.highlighted(tutorial);
    let highlighted: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter_map(|(i, active)| active.then_some(i))
        .collect();
    if highlighted == vec![index] {
        return Ok(());
    }
    Err(format!(
        "expected only step {index} highlighted, got {highlighted:?}"
    ))
}

#[then("the {tutorial_name} tutorial completes after {seconds} seconds")]
fn tutorial_completes_after(
    tutorial_session_state: &TutorialSessionState,
    tutorial_name: String,
    seconds: u64,
) -> StepResult<()> {
    let expected = parse_tutorial(&tutorial_name)?;
    let (completed, elapsed) = tutorial_session_state.world()?.next_completion()?;
    if completed != expected {
        return Err(format!("expected {expected} to complete, got {completed}"));
    }
    let lower = Duration::from_secs(seconds);
    if elapsed < lower || elapsed > lower + TICK {
        return Err(format!(
            "expected completion after about {seconds}s, got {elapsed:?}"
        ));
    }
    Ok(())
}

#[then("the {tutorial_name} completion flag is set")]
fn completion_flag_is_set(
    tutorial_session_state: &TutorialSessionState,
    tutorial_name: String,
) -> StepResult<()> {
    let tutorial = parse_tutorial(&tutorial_name)?;
    let done = tutorial_session_state
        .world()?
        .progress()
        .is_completed(tutorial)
        .map_err(|e| e.to_string())?;
    if done {
        return Ok(());
    }
    Err(format!("expected {tutorial} completion flag to be set"))
}

#[then("the mask is hidden")]
fn mask_is_hidden(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    let status = tutorial_session_state.world()?.status()?;
    if status.mask.mask_visible {
        return Err(String::from("expected the mask to be hidden"));
    }
    Ok(())
}

#[then("the tap-to-dismiss handler is armed")]
fn tap_handler_is_armed(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    let status = tutorial_session_state.world()?.status()?;
    if status.mask.tap_armed {
        return Ok(());
    }
    Err(String::from("expected the tap-to-dismiss handler to be armed"))
}

#[then("no tutorial is active")]
fn no_tutorial_is_active(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    let status = tutorial_session_state.world()?.status()?;
    match status.active {
        None => Ok(()),
        Some(active) => Err(format!("expected no active tutorial, got {active}")),
    }
}

#[then("the {tutorial_name} tutorial is still active")]
fn tutorial_is_still_active(
    tutorial_session_state: &TutorialSessionState,
    tutorial_name: String,
) -> StepResult<()> {
    let expected = parse_tutorial(&tutorial_name)?;
    let status = tutorial_session_state.world()?.status()?;
    if status.active == Some(expected) {
        return Ok(());
    }
    Err(format!("expected {expected} to be active, got {:?}", status.active))
}

#[then("no completion is announced")]
fn no_completion_is_announced(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    let world = tutorial_session_state.world()?;
    world.pass_time(TICK * 10);
    match world.pending_completion() {
        None => Ok(()),
        Some((tutorial, elapsed)) => Err(format!(
            "unexpected completion of {tutorial} after {elapsed:?}"
        )),
    }
}
