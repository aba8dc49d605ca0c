pub mod location_formatter;
pub mod vote_aggregator;

pub use location_formatter::{
    distinct_locations, JoinedLocations, LocationFormatter, MULTIPLE_REGIONS,
};
pub use vote_aggregator::{VoteAggregator, VoteThresholds};
