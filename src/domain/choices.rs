use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

pub const STATUS_PLACEHOLDER: &str = "Pilih Status";
pub const PURPOSE_PLACEHOLDER: &str = "Pilih Tujuan";

/// Relationship of the requester to the employee the vehicle is booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Status {
    #[strum(to_string = "Employee")]
    Employee,
    #[strum(to_string = "Spouse")]
    Spouse,
    #[strum(to_string = "Child-1")]
    FirstChild,
    #[strum(to_string = "Child-2")]
    SecondChild,
    #[strum(to_string = "Child-3")]
    ThirdChild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Purpose {
    #[strum(to_string = "Clinic Visit")]
    ClinicVisit,
    #[strum(to_string = "Hospitalization")]
    Hospitalization,
    #[strum(to_string = "Post-hospitalization Care")]
    PostHospitalizationCare,
}

/// An enumerated form input. The placeholder is only ever shown by the UI and
/// never maps to a value of the implementing type.
pub trait Choice: Sized + Copy + IntoEnumIterator + FromStr + Into<&'static str> {
    const PLACEHOLDER: &'static str;

    fn label(self) -> &'static str {
        self.into()
    }

    fn options() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Options as rendered by a select input, placeholder first.
    fn ui_options() -> Vec<&'static str> {
        std::iter::once(Self::PLACEHOLDER)
            .chain(Self::iter().map(Self::label))
            .collect()
    }

    /// Maps a raw UI value back to a choice. The placeholder and unknown labels
    /// both mean nothing was selected.
    fn from_ui(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == Self::PLACEHOLDER {
            return None;
        }
        Self::from_str(raw).ok()
    }
}

impl Choice for Status {
    const PLACEHOLDER: &'static str = STATUS_PLACEHOLDER;
}

impl Choice for Purpose {
    const PLACEHOLDER: &'static str = PURPOSE_PLACEHOLDER;
}
