//! Action kind enumeration - the discriminator of every stored action.

/// Types of actions that can be recorded in an action log.
///
/// Adding a kind means adding a variant here, a stored/bound pair under
/// [`crate::action::kinds`], and the match arms the compiler then demands.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    /// Put one of the entity's tokens into a free slot of a location.
    PlaceToken,

    /// Yield the turn without doing anything.
    Pass,

    /// Leave the game permanently.
    Resign,
}

impl ActionKind {
    /// Returns the snake_case string representation of the kind.
    ///
    /// Used for logging fields, event payloads and file names.
    pub fn as_snake_case(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_names_round_trip() {
        assert_eq!(ActionKind::PlaceToken.as_snake_case(), "place_token");
        assert_eq!(ActionKind::Pass.to_string(), "pass");
        assert_eq!("resign".parse::<ActionKind>(), Ok(ActionKind::Resign));
    }
}
