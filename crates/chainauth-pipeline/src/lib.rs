pub mod enable_checker;
pub mod entitlement_evaluator;
pub mod entitlement_fetcher;
pub mod linked_wallet_resolver;
pub mod membership_probe;
pub mod pipeline;

pub use enable_checker::EnableChecker;
pub use entitlement_evaluator::EntitlementEvaluator;
pub use entitlement_fetcher::EntitlementFetcher;
pub use linked_wallet_resolver::LinkedWalletResolver;
pub use membership_probe::MembershipProbe;
pub use pipeline::{DecisionPipeline, PipelineDeps};
