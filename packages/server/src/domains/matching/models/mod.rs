pub mod candidate;
pub mod facility;

pub use candidate::{ReceiverCandidate, Role};
pub use facility::{Facility, FacilityKind};
