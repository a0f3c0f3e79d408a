#[path = "property/population_ids.rs"]
mod population_ids;

#[path = "property/consumption.rs"]
mod consumption;

#[path = "property/niche_budget.rs"]
mod niche_budget;
