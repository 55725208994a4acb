//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm running a search of the given size
pub fn confirm_search(candidates: usize, folds: usize) -> Result<bool> {
    let message = format!(
        "Run grid search: {} candidate(s) x {} fold(s) = {} fits?",
        candidates,
        folds,
        candidates * folds
    );
    confirm_step(&message)
}
