mod place;
mod reaction;

pub use place::{OpeningHoursDay, Place, PlaceCardRow, PlaceStatus, PLACE_CARD_SELECT};
pub use reaction::{Reaction, ReactionState, Transition};
