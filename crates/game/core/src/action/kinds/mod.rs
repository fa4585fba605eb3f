pub mod pass;
pub mod place_token;
pub mod resign;

pub use pass::{Pass, PassAction};
pub use place_token::{PlaceToken, PlaceTokenAction, PlaceTokenError};
pub use resign::{Resign, ResignAction};
