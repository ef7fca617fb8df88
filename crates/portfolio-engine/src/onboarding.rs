//! Onboarding wizard: role -> portfolio details -> plan -> payment
//!
//! `OnboardingContext` carries the partial form data across steps and
//! records which steps have been completed. It is an ordinary value owned by
//! the application state; nothing here is global.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Role,
    PortfolioDetails,
    Plan,
    Payment,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::Role,
        OnboardingStep::PortfolioDetails,
        OnboardingStep::Plan,
        OnboardingStep::Payment,
    ];

    pub fn index(&self) -> usize {
        match self {
            OnboardingStep::Role => 0,
            OnboardingStep::PortfolioDetails => 1,
            OnboardingStep::Plan => 2,
            OnboardingStep::Payment => 3,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn name(&self) -> &'static str {
        match self {
            OnboardingStep::Role => "role",
            OnboardingStep::PortfolioDetails => "portfolio",
            OnboardingStep::Plan => "plan",
            OnboardingStep::Payment => "payment",
        }
    }

    pub fn route(&self) -> String {
        format!("/onboarding/{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    PropertyOwner,
    PropertyManager,
    Broker,
    Lender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub role: UserRole,
    pub title: &'static str,
    pub description: &'static str,
    /// Property and unit counts are shown and required
    pub requires_quantities: bool,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::PropertyOwner,
        UserRole::PropertyManager,
        UserRole::Broker,
        UserRole::Lender,
    ];

    pub fn definition(&self) -> RoleDefinition {
        match self {
            UserRole::PropertyOwner => RoleDefinition {
                role: *self,
                title: "Property Owner",
                description: "I own residential or commercial properties",
                requires_quantities: true,
            },
            UserRole::PropertyManager => RoleDefinition {
                role: *self,
                title: "Property Manager",
                description: "I manage properties on behalf of owners",
                requires_quantities: true,
            },
            UserRole::Broker => RoleDefinition {
                role: *self,
                title: "Insurance Broker",
                description: "I place coverage for property clients",
                requires_quantities: false,
            },
            UserRole::Lender => RoleDefinition {
                role: *self,
                title: "Lender",
                description: "I track insurance on collateral properties",
                requires_quantities: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Starter,
    Professional,
    Enterprise,
}

impl PlanTier {
    pub fn monthly_price_cents(&self) -> u32 {
        match self {
            PlanTier::Starter => 4_900,
            PlanTier::Professional => 14_900,
            PlanTier::Enterprise => 49_900,
        }
    }

    /// `None` means unlimited
    pub fn property_limit(&self) -> Option<u32> {
        match self {
            PlanTier::Starter => Some(10),
            PlanTier::Professional => Some(100),
            PlanTier::Enterprise => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingData {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub property_count: Option<u32>,
    #[serde(default)]
    pub unit_count: Option<u32>,
    #[serde(default)]
    pub primary_markets: Vec<String>,
    #[serde(default)]
    pub plan: Option<PlanTier>,
    #[serde(default)]
    pub cardholder_name: String,
    #[serde(default)]
    pub billing_email: String,
    #[serde(default)]
    pub accept_terms: bool,
}

/// Partial update sent by a step form; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPatch {
    pub role: Option<UserRole>,
    pub company_name: Option<String>,
    pub property_count: Option<u32>,
    pub unit_count: Option<u32>,
    pub primary_markets: Option<Vec<String>>,
    pub plan: Option<PlanTier>,
    pub cardholder_name: Option<String>,
    pub billing_email: Option<String>,
    pub accept_terms: Option<bool>,
}

impl OnboardingData {
    pub fn apply(&mut self, patch: OnboardingPatch) {
        if let Some(role) = patch.role {
            self.role = Some(role);
        }
        if let Some(name) = patch.company_name {
            self.company_name = name;
        }
        if let Some(count) = patch.property_count {
            self.property_count = Some(count);
        }
        if let Some(count) = patch.unit_count {
            self.unit_count = Some(count);
        }
        if let Some(markets) = patch.primary_markets {
            self.primary_markets = markets;
        }
        if let Some(plan) = patch.plan {
            self.plan = Some(plan);
        }
        if let Some(name) = patch.cardholder_name {
            self.cardholder_name = name;
        }
        if let Some(email) = patch.billing_email {
            self.billing_email = email;
        }
        if let Some(accept) = patch.accept_terms {
            self.accept_terms = accept;
        }
    }

    pub fn requires_quantities(&self) -> bool {
        self.role
            .map(|r| r.definition().requires_quantities)
            .unwrap_or(false)
    }

    pub fn validate_step(&self, step: OnboardingStep) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match step {
            OnboardingStep::Role => {
                if self.role.is_none() {
                    errors.add("role", "Select a role to continue");
                }
            }
            OnboardingStep::PortfolioDetails => {
                errors.require_non_empty("company_name", &self.company_name, "Company name");
                if self.requires_quantities() {
                    if !matches!(self.property_count, Some(n) if n >= 1) {
                        errors.add("property_count", "Enter at least one property");
                    }
                    if !matches!(self.unit_count, Some(n) if n >= 1) {
                        errors.add("unit_count", "Enter at least one unit");
                    }
                }
            }
            OnboardingStep::Plan => match self.plan {
                None => errors.add("plan", "Select a plan"),
                Some(plan) => {
                    if let (Some(limit), Some(count), true) =
                        (plan.property_limit(), self.property_count, self.requires_quantities())
                    {
                        if count > limit {
                            errors.add(
                                "plan",
                                format!("This plan covers up to {} properties", limit),
                            );
                        }
                    }
                }
            },
            OnboardingStep::Payment => {
                errors.require_non_empty(
                    "cardholder_name",
                    &self.cardholder_name,
                    "Cardholder name",
                );
                errors.require_email("billing_email", &self.billing_email);
                if !self.accept_terms {
                    errors.add("accept_terms", "You must accept the terms");
                }
            }
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingContext {
    data: OnboardingData,
    current: OnboardingStep,
    completed: BTreeSet<OnboardingStep>,
}

impl Default for OnboardingContext {
    fn default() -> Self {
        Self {
            data: OnboardingData::default(),
            current: OnboardingStep::Role,
            completed: BTreeSet::new(),
        }
    }
}

impl OnboardingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &OnboardingData {
        &self.data
    }

    pub fn current(&self) -> OnboardingStep {
        self.current
    }

    pub fn is_step_complete(&self, step: OnboardingStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn update(&mut self, patch: OnboardingPatch) {
        self.data.apply(patch);
    }

    /// Quantity inputs are only rendered for roles that need them
    pub fn show_quantity_fields(&self) -> bool {
        self.data.requires_quantities()
    }

    /// Validate the current step and advance. Stays put on the last step.
    pub fn next(&mut self) -> Result<OnboardingStep, ValidationErrors> {
        self.data.validate_step(self.current)?;
        self.completed.insert(self.current);

        if let Some(next) = self.current.next() {
            debug!(from = self.current.name(), to = next.name(), "Onboarding advanced");
            self.current = next;
        }
        Ok(self.current)
    }

    pub fn back(&mut self) -> Option<OnboardingStep> {
        let previous = self.current.previous()?;
        self.current = previous;
        Some(previous)
    }

    /// Jump to a step already reached; skipping ahead is refused
    pub fn go_to(&mut self, step: OnboardingStep) -> bool {
        let reachable = step <= self.current
            || OnboardingStep::ALL[..step.index()]
                .iter()
                .all(|s| self.completed.contains(s));

        if reachable {
            self.current = step;
        }
        reachable
    }

    pub fn is_complete(&self) -> bool {
        OnboardingStep::ALL
            .iter()
            .all(|s| self.completed.contains(s))
    }

    /// Re-check every step, since earlier answers may have changed since completion
    pub fn finish(&self) -> Result<OnboardingData, EngineError> {
        for step in OnboardingStep::ALL {
            if !self.completed.contains(&step) || self.data.validate_step(step).is_err() {
                return Err(EngineError::OnboardingIncomplete(step.name()));
            }
        }
        Ok(self.data.clone())
    }

    pub fn progress_pct(&self) -> f64 {
        self.completed.len() as f64 / OnboardingStep::ALL.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owner_details() -> OnboardingPatch {
        OnboardingPatch {
            company_name: Some("Bayside Holdings".to_string()),
            property_count: Some(4),
            unit_count: Some(120),
            ..Default::default()
        }
    }

    fn payment() -> OnboardingPatch {
        OnboardingPatch {
            cardholder_name: Some("Dana Reyes".to_string()),
            billing_email: Some("billing@bayside.com".to_string()),
            accept_terms: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_required() {
        let mut ctx = OnboardingContext::new();
        let errors = ctx.next().unwrap_err();
        assert!(errors.get("role").is_some());
        assert_eq!(ctx.current(), OnboardingStep::Role);
    }

    #[test]
    fn test_full_owner_flow() {
        let mut ctx = OnboardingContext::new();
        ctx.update(OnboardingPatch {
            role: Some(UserRole::PropertyOwner),
            ..Default::default()
        });
        assert_eq!(ctx.next().unwrap(), OnboardingStep::PortfolioDetails);
        assert!(ctx.show_quantity_fields());

        ctx.update(owner_details());
        assert_eq!(ctx.next().unwrap(), OnboardingStep::Plan);

        ctx.update(OnboardingPatch {
            plan: Some(PlanTier::Starter),
            ..Default::default()
        });
        assert_eq!(ctx.next().unwrap(), OnboardingStep::Payment);

        ctx.update(payment());
        assert_eq!(ctx.next().unwrap(), OnboardingStep::Payment);
        assert!(ctx.is_complete());
        assert_eq!(ctx.progress_pct(), 100.0);

        let data = ctx.finish().unwrap();
        assert_eq!(data.company_name, "Bayside Holdings");
    }

    #[test]
    fn test_quantities_required_only_for_owner_roles() {
        let mut data = OnboardingData {
            role: Some(UserRole::PropertyManager),
            company_name: "Acme".to_string(),
            ..Default::default()
        };
        let errors = data.validate_step(OnboardingStep::PortfolioDetails).unwrap_err();
        assert!(errors.get("property_count").is_some());
        assert!(errors.get("unit_count").is_some());

        data.role = Some(UserRole::Broker);
        assert!(data.validate_step(OnboardingStep::PortfolioDetails).is_ok());
    }

    #[test]
    fn test_plan_limit_checked_against_property_count() {
        let data = OnboardingData {
            role: Some(UserRole::PropertyOwner),
            property_count: Some(25),
            plan: Some(PlanTier::Starter),
            ..Default::default()
        };
        assert!(data.validate_step(OnboardingStep::Plan).is_err());

        let data = OnboardingData {
            plan: Some(PlanTier::Professional),
            ..data
        };
        assert!(data.validate_step(OnboardingStep::Plan).is_ok());
    }

    #[test]
    fn test_payment_validation() {
        let data = OnboardingData {
            billing_email: "nope".to_string(),
            ..Default::default()
        };
        let errors = data.validate_step(OnboardingStep::Payment).unwrap_err();
        assert!(errors.get("cardholder_name").is_some());
        assert!(errors.get("billing_email").is_some());
        assert!(errors.get("accept_terms").is_some());
    }

    #[test]
    fn test_back_and_go_to() {
        let mut ctx = OnboardingContext::new();
        assert_eq!(ctx.back(), None);

        ctx.update(OnboardingPatch {
            role: Some(UserRole::Lender),
            ..Default::default()
        });
        ctx.next().unwrap();
        assert!(!ctx.go_to(OnboardingStep::Payment));
        assert_eq!(ctx.back(), Some(OnboardingStep::Role));
        assert!(ctx.go_to(OnboardingStep::PortfolioDetails));
        assert_eq!(ctx.current(), OnboardingStep::PortfolioDetails);
    }

    #[test]
    fn test_finish_rechecks_changed_answers() {
        let mut ctx = OnboardingContext::new();
        ctx.update(OnboardingPatch {
            role: Some(UserRole::Broker),
            company_name: Some("Coastal Brokerage".to_string()),
            plan: Some(PlanTier::Starter),
            ..Default::default()
        });
        ctx.update(payment());
        for _ in 0..4 {
            ctx.next().unwrap();
        }
        assert!(ctx.finish().is_ok());

        // Switching to an owner role makes the skipped quantities required
        ctx.update(OnboardingPatch {
            role: Some(UserRole::PropertyOwner),
            ..Default::default()
        });
        assert_eq!(
            ctx.finish(),
            Err(EngineError::OnboardingIncomplete("portfolio"))
        );
    }

    #[test]
    fn test_step_routes() {
        assert_eq!(OnboardingStep::Plan.route(), "/onboarding/plan");
        assert_eq!(OnboardingStep::Payment.next(), None);
        assert_eq!(OnboardingStep::Role.previous(), None);
    }
}
