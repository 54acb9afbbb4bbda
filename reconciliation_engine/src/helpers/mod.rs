mod rate_matching;

pub use rate_matching::{find_matching_rate, rates_debug_context};
