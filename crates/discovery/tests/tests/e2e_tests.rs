#[path = "e2e/two_generations.rs"]
mod two_generations;

#[path = "e2e/regression_routing.rs"]
mod regression_routing;

#[path = "e2e/failure_policy.rs"]
mod failure_policy;

#[path = "e2e/cancellation.rs"]
mod cancellation;

#[path = "e2e/http_process.rs"]
mod http_process;
