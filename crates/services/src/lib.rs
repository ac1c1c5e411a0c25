#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment;
pub mod assignments;
pub mod catalog;
pub mod content;
pub mod dashboard;
pub mod error;
pub mod fault;
pub mod roster;
pub mod schools;

pub use pd_core::Clock;

pub use app_services::{AppServices, ContentBackend, ServicesConfig};
pub use assessment::{AssessmentService, SectionPage, SubmitReview};
pub use assignments::{AssignOutcome, PdAssignmentService};
pub use catalog::PdCatalogService;
pub use content::{AssessmentContent, HttpContent, HttpContentConfig, SimulatedContent, StoredContent};
pub use dashboard::{AdminOverview, AssignmentTally, DashboardService, SchoolOverview, TeacherOverview};
pub use error::{
    AppServicesError, AssessmentError, AssignmentServiceError, CatalogServiceError, ContentError,
    DashboardError, InjectedFailure, PageError, RosterError, SchoolServiceError, SubmitError,
};
pub use fault::FaultInjector;
pub use roster::{RosterCapacity, TeacherRosterService};
pub use schools::SchoolOnboardingService;
