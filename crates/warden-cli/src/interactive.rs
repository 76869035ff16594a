//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for the terminal confirmation of baseline promotion.

use colored::Colorize;
use dialoguer::Confirm;
use warden_core::{Approval, PromotionRequest};

const PROMPT: &str = r#"Do you want to update the "last known good" to this?"#;

/// Asks on the terminal before a walk becomes the baseline. Defaults to no.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleApproval;

impl Approval for ConsoleApproval {
    fn approve(&self, request: &PromotionRequest<'_>) -> warden_core::Result<bool> {
        println!();
        match request.current {
            Some(current) => println!(
                "{}: {} (walk {})",
                "Current baseline".dimmed(),
                current.walk_reference,
                current.walk_id
            ),
            None => println!("{}: {}", "Current baseline".dimmed(), "none".yellow()),
        }
        println!(
            "{}: {} (walk {})",
            "Candidate".dimmed(),
            request.candidate.reference,
            request.candidate.walk.id()
        );

        Confirm::new()
            .with_prompt(PROMPT)
            .default(false)
            .interact()
            .map_err(|e| warden_core::Error::Io(std::io::Error::other(e)))
    }
}
