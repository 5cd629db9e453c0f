//! Given/when step definitions for tutorial session scenarios.

use std::sync::Arc;
use std::time::Duration;

use rstest_bdd_macros::{given, when};
use tutorial_sequencer::signals::{Signal, WorkDone};

use super::state::{StepResult, TutorialSessionState, World, parse_tutorial};

#[given("a tutorial router with three steps per tutorial")]
fn tutorial_router_started(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    tutorial_session_state.world.set(Arc::new(World::start()?));
    Ok(())
}

#[when("the game requests the {tutorial_name} tutorial")]
fn game_requests_tutorial(
    tutorial_session_state: &TutorialSessionState,
    tutorial_name: String,
) -> StepResult<()> {
    let tutorial = parse_tutorial(&tutorial_name)?;
    tutorial_session_state
        .world()?
        .publish(&Signal::TutorialRequested(tutorial));
    Ok(())
}

#[when("the player advances {count} times")]
fn player_advances(tutorial_session_state: &TutorialSessionState, count: usize) -> StepResult<()> {
    let world = tutorial_session_state.world()?;
    for _ in 0..count {
        world.handle().advance().map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[when("the player steps back {count} times")]
fn player_steps_back(
    tutorial_session_state: &TutorialSessionState,
    count: usize,
) -> StepResult<()> {
    let world = tutorial_session_state.world()?;
    for _ in 0..count {
        world.handle().step_back().map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[when("the player spends {seconds} seconds in the tutorial")]
fn player_spends_time(
    tutorial_session_state: &TutorialSessionState,
    seconds: u64,
) -> StepResult<()> {
    let world = tutorial_session_state.world()?;
    // Apply queued commands first so the session clock starts now.
    world.status()?;
    world.pass_time(Duration::from_secs(seconds));
    Ok(())
}

#[when("a hint for {element} is purchased")]
fn hint_purchased(
    tutorial_session_state: &TutorialSessionState,
    element: String,
) -> StepResult<()> {
    tutorial_session_state
        .world()?
        .publish(&Signal::WorkDone(WorkDone::HintPurchased { element }));
    Ok(())
}

#[when("tier {tier} is loaded")]
fn tier_loaded(tutorial_session_state: &TutorialSessionState, tier: u32) -> StepResult<()> {
    tutorial_session_state
        .world()?
        .publish(&Signal::WorkDone(WorkDone::TierLoaded { tier }));
    Ok(())
}

#[when("the player taps the mask")]
fn player_taps_mask(tutorial_session_state: &TutorialSessionState) -> StepResult<()> {
    tutorial_session_state
        .world()?
        .handle()
        .dismiss()
        .map_err(|e| e.to_string())
}
