//! Rate resolution and cost/margin aggregation.
//!
//! Pure, synchronous, and infallible: every lookup and division edge
//! case resolves to a defined zero value, so pricing never blocks on a
//! bad reference. Persistence is a separate concern (`poolq-persistence`).

mod aggregate;
mod resolver;

pub use aggregate::{aggregate, recommended_retail_price};
pub use resolver::resolve;
