use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the same strings so stored JSON keeps its wire values.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(PrescriptionStatus {
    Draft => "draft",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(EvidenceLevel {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
});

str_enum!(WarningType {
    Contraindication => "contraindication",
    Interaction => "interaction",
    SideEffect => "side_effect",
    Monitoring => "monitoring",
});

str_enum!(WarningSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(SmokingStatus {
    Never => "never",
    Former => "former",
    Current => "current",
});

str_enum!(AlcoholStatus {
    Never => "never",
    Occasional => "occasional",
    Regular => "regular",
});

str_enum!(ActivityLevel {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    High => "high",
});

str_enum!(BleedingSeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(FallFrequency {
    Rare => "rare",
    Occasional => "occasional",
    Frequent => "frequent",
});

str_enum!(ComplianceLevel {
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    Poor => "poor",
});

impl PrescriptionStatus {
    /// Completed and cancelled prescriptions never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a prescription may move from `self` to `next`.
    pub fn can_transition_to(&self, next: PrescriptionStatus) -> bool {
        use PrescriptionStatus::*;
        match (*self, next) {
            (a, b) if a == b => true,
            (Draft, Active) => true,
            (Draft | Active, Completed | Cancelled) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for (variant, s) in [
            (Gender::Male, "male"),
            (Gender::Female, "female"),
            (Gender::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn prescription_status_round_trip() {
        for (variant, s) in [
            (PrescriptionStatus::Draft, "draft"),
            (PrescriptionStatus::Active, "active"),
            (PrescriptionStatus::Completed, "completed"),
            (PrescriptionStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PrescriptionStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn evidence_level_keeps_uppercase_wire_form() {
        let json = serde_json::to_string(&EvidenceLevel::A).unwrap();
        assert_eq!(json, "\"A\"");
        let back: EvidenceLevel = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(back, EvidenceLevel::C);
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&WarningType::SideEffect).unwrap();
        assert_eq!(json, "\"side_effect\"");
        let back: PrescriptionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, PrescriptionStatus::Cancelled);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Gender::from_str("MALE").is_err());
        assert!(PrescriptionStatus::from_str("archived").is_err());
        assert!(serde_json::from_str::<EvidenceLevel>("\"E\"").is_err());
    }

    #[test]
    fn invalid_enum_error_names_the_type() {
        let err = PrescriptionStatus::from_str("archived").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid enum value for PrescriptionStatus: archived"
        );
    }

    #[test]
    fn status_transitions_never_revert() {
        use PrescriptionStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Active));
        assert!(!Active.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Completed.is_terminal());
        assert!(!Draft.is_terminal());
    }
}
