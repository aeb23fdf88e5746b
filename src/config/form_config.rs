fn default_reject_past_departures() -> bool {
    true
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Reject departure dates before the day of submission.
    #[serde(default = "default_reject_past_departures")]
    pub reject_past_departures: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reject_past_departures: default_reject_past_departures(),
        }
    }
}
