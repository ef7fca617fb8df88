//! View-model logic behind the portfolio dashboard pages
//!
//! Everything here is synchronous and pure over records already fetched:
//! filtering and sorting properties, the claims board, renewal roll-ups,
//! the onboarding wizard, enrichment card state and chart data.

pub mod analytics;
pub mod enrichment;
pub mod error;
pub mod fixtures;
pub mod kanban;
pub mod load_guard;
pub mod onboarding;
pub mod properties;
pub mod renewals;
pub mod validation;

pub use analytics::{
    breakdown_by_type, generate_series, ChartSeries, SeriesKind, SeriesPoint, TypeBreakdown,
};
pub use enrichment::{CardState, EnrichmentCard, SubmitRejected, EXPECTED_LATENCY_SECS};
pub use error::EngineError;
pub use kanban::{ColumnSummary, DropOutcome, KanbanBoard, StatusChange};
pub use load_guard::{LoadGuard, LoadTicket};
pub use onboarding::{
    OnboardingContext, OnboardingData, OnboardingPatch, OnboardingStep, PlanTier, RoleDefinition,
    UserRole,
};
pub use properties::{
    derive_property_view, effective_days, filter_properties, portfolio_stats, sort_properties,
    ExpirationFilter, PortfolioStats, PropertyFilter, PropertySort, PropertyView, SortDirection,
    SortField, MISSING_EXPIRATION_DAYS,
};
pub use renewals::{
    alerts_with_status, apply_acknowledge, apply_resolve, normalize_alert_config, renewal_rows,
    summarize_renewals, RenewalRow, RenewalStatus, RenewalSummary, StatusCounts, UrgencyBucket,
    UrgencyCounts,
};
pub use validation::{SignInForm, SignUpForm, ValidationErrors};
