//! Pluggable approval of baseline promotion

use super::Review;
use crate::Result;
use crate::walk::persist::LoadedWalk;

/// What is about to be promoted.
#[derive(Debug, Clone, Copy)]
pub struct PromotionRequest<'a> {
    pub hostname: &'a str,
    /// Current baseline of the host, if any
    pub current: Option<&'a Review>,
    pub candidate: &'a LoadedWalk,
}

/// Decides whether a walk becomes the new baseline.
pub trait Approval {
    /// Return `Ok(true)` to promote.
    fn approve(&self, request: &PromotionRequest<'_>) -> Result<bool>;
}

/// Approves every promotion.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysApprove;

impl Approval for AlwaysApprove {
    fn approve(&self, _request: &PromotionRequest<'_>) -> Result<bool> {
        Ok(true)
    }
}

/// Declines every promotion.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverApprove;

impl Approval for NeverApprove {
    fn approve(&self, _request: &PromotionRequest<'_>) -> Result<bool> {
        Ok(false)
    }
}

impl<F> Approval for F
where
    F: Fn(&PromotionRequest<'_>) -> Result<bool>,
{
    fn approve(&self, request: &PromotionRequest<'_>) -> Result<bool> {
        self(request)
    }
}
