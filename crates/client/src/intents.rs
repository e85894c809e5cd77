//! Action buttons offered for backend intents.

use crate::model::MessageAction;

/// `(intent, label, path)`
const INTENT_ACTIONS: &[(&str, &str, &str)] = &[
    ("track_shipment", "Track shipment", "/track"),
    ("get_quote", "Get a quote", "/quote"),
    ("schedule_pickup", "Schedule a pickup", "/pickup"),
    ("contact_support", "Contact support", "/contact"),
];

/// Actions to render under a bot reply carrying `intent`.
pub fn actions_for_intent(intent: Option<&str>) -> Vec<MessageAction> {
    let Some(intent) = intent.map(str::trim).filter(|i| !i.is_empty()) else {
        return Vec::new();
    };

    INTENT_ACTIONS
        .iter()
        .filter(|(name, _, _)| name.eq_ignore_ascii_case(intent))
        .map(|(_, label, path)| MessageAction::new(*label, *path))
        .collect()
}

/// Every path an intent action can navigate to.
pub fn action_paths() -> impl Iterator<Item = &'static str> {
    INTENT_ACTIONS.iter().map(|(_, _, path)| *path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_intent_yields_its_button() {
        let actions = actions_for_intent(Some("track_shipment"));
        assert_eq!(actions, vec![MessageAction::new("Track shipment", "/track")]);
    }

    #[test]
    fn intent_matching_ignores_case_and_padding() {
        assert_eq!(actions_for_intent(Some("  GET_QUOTE ")).len(), 1);
    }

    #[test]
    fn unknown_or_missing_intent_yields_nothing() {
        assert!(actions_for_intent(None).is_empty());
        assert!(actions_for_intent(Some("")).is_empty());
        assert!(actions_for_intent(Some("small_talk")).is_empty());
    }
}
