pub mod coverage;
pub mod index;

pub use coverage::{find_matches, Coverage, MatchResult};
pub use index::{dot, normalize_l2, FlatIndex, Hit};
