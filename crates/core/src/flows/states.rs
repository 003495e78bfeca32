use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;

/// The space a customer picked, carried unchanged from `select_space` onwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSelection {
    pub space_type: String,
    pub city: String,
    pub asset_id: String,
}

/// When the customer wants the space. `duration` is the raw reply id
/// (`hourly`, `daily`, ...) and is only interpreted at pricing time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub duration: String,
    pub date: String,
    pub time: String,
}

/// Everything the finalizer needs. Only reachable once the email passed validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub space: SpaceSelection,
    pub slot: Slot,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub price: PriceBreakdown,
}

/// Per-sender dialogue position. Each step carries exactly the answers
/// collected so far, so a price can never exist without an asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Start,
    Menu,
    SelectType,
    SelectCity {
        space_type: String,
    },
    SelectSpace {
        space_type: String,
        city: String,
    },
    SelectDuration {
        space: SpaceSelection,
    },
    EnterDate {
        space: SpaceSelection,
        duration: String,
    },
    EnterTime {
        space: SpaceSelection,
        duration: String,
        date: String,
    },
    EnterName {
        space: SpaceSelection,
        slot: Slot,
    },
    EnterEmail {
        space: SpaceSelection,
        slot: Slot,
        name: String,
    },
    Confirm {
        draft: BookingDraft,
    },
}

impl ConversationState {
    pub fn step(&self) -> ConversationStep {
        match self {
            Self::Start => ConversationStep::Start,
            Self::Menu => ConversationStep::Menu,
            Self::SelectType => ConversationStep::SelectType,
            Self::SelectCity { .. } => ConversationStep::SelectCity,
            Self::SelectSpace { .. } => ConversationStep::SelectSpace,
            Self::SelectDuration { .. } => ConversationStep::SelectDuration,
            Self::EnterDate { .. } => ConversationStep::EnterDate,
            Self::EnterTime { .. } => ConversationStep::EnterTime,
            Self::EnterName { .. } => ConversationStep::EnterName,
            Self::EnterEmail { .. } => ConversationStep::EnterEmail,
            Self::Confirm { .. } => ConversationStep::Confirm,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    Start,
    Menu,
    SelectType,
    SelectCity,
    SelectSpace,
    SelectDuration,
    EnterDate,
    EnterTime,
    EnterName,
    EnterEmail,
    Confirm,
}

impl ConversationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Menu => "menu",
            Self::SelectType => "select_type",
            Self::SelectCity => "select_city",
            Self::SelectSpace => "select_space",
            Self::SelectDuration => "select_duration",
            Self::EnterDate => "enter_date",
            Self::EnterTime => "enter_time",
            Self::EnterName => "enter_name",
            Self::EnterEmail => "enter_email",
            Self::Confirm => "confirm",
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{BookingDraft, ConversationState, ConversationStep, Slot, SpaceSelection};
    use crate::pricing::PriceBreakdown;

    fn space() -> SpaceSelection {
        SpaceSelection {
            space_type: "meeting_room".to_string(),
            city: "bangalore".to_string(),
            asset_id: "asset-1".to_string(),
        }
    }

    #[test]
    fn unseen_sender_starts_at_start() {
        assert_eq!(ConversationState::default(), ConversationState::Start);
        assert_eq!(ConversationState::default().step().as_str(), "start");
    }

    #[test]
    fn step_names_match_wire_names() {
        let state = ConversationState::EnterDate { space: space(), duration: "daily".to_string() };
        assert_eq!(state.step(), ConversationStep::EnterDate);

        let step_json = serde_json::to_value(state.step()).expect("serialize step");
        assert_eq!(step_json, json!(state.step().as_str()));
    }

    #[test]
    fn state_serializes_with_step_tag() {
        let state = ConversationState::SelectSpace {
            space_type: "hot_desk".to_string(),
            city: "pune".to_string(),
        };

        let value = serde_json::to_value(&state).expect("serialize state");
        assert_eq!(value, json!({"step": "select_space", "space_type": "hot_desk", "city": "pune"}));

        let decoded: ConversationState = serde_json::from_value(value).expect("decode state");
        assert_eq!(decoded, state);
    }

    #[test]
    fn confirm_state_keeps_the_priced_draft_when_serialized() {
        let draft = BookingDraft {
            space: space(),
            slot: Slot {
                duration: "hourly".to_string(),
                date: "25/12/2099".to_string(),
                time: "14:30".to_string(),
            },
            name: "asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "919800000001".to_string(),
            price: PriceBreakdown {
                amount: Decimal::from(500),
                tax: Decimal::from(90),
                total: Decimal::from(590),
                currency: "INR".to_string(),
            },
        };

        let confirm = ConversationState::Confirm { draft };
        let value = serde_json::to_value(&confirm).expect("serialize state");
        assert_eq!(value["step"], "confirm");
        assert_eq!(value["draft"]["email"], "asha@example.com");

        let decoded: ConversationState = serde_json::from_value(value).expect("decode state");
        assert_eq!(decoded, confirm);
    }
}
