pub mod candidate;

pub use candidate::{Candidate, SocialLinks};
