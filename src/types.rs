//! Shared enumerations stored as TEXT columns with CHECK constraints.
//!
//! Payloads deserialize into these so unknown values are rejected before any
//! SQL runs; rows keep the plain `String` column value.
use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("invalid {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

text_enum!(MemberStatus {
    Active => "active",
    Inactive => "inactive",
    Visitor => "visitor",
    Transferred => "transferred",
    Deceased => "deceased",
});

text_enum!(Gender {
    Male => "male",
    Female => "female",
});

text_enum!(WeekDay {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

text_enum!(CommitteePosition {
    Chair => "chair",
    Secretary => "secretary",
    Treasurer => "treasurer",
    Member => "member",
});

text_enum!(SocietyKind {
    Men => "men",
    Women => "women",
    Youth => "youth",
    Children => "children",
    Other => "other",
});

text_enum!(
    /// Counselor is the only position a society may have several of.
    SocietyPosition {
        President => "president",
        VicePresident => "vice_president",
        Secretary => "secretary",
        Treasurer => "treasurer",
        Counselor => "counselor",
    }
);

text_enum!(
    /// Kind of both categories and transactions.
    EntryKind {
        Income => "income",
        Expense => "expense",
    }
);

text_enum!(AccountType {
    Checking => "checking",
    Savings => "savings",
});

text_enum!(PaymentMethod {
    Cash => "cash",
    Transfer => "transfer",
    Check => "check",
    Card => "card",
    Other => "other",
});

text_enum!(ActivityType {
    Worship => "worship",
    Prayer => "prayer",
    BibleStudy => "bible_study",
    Outreach => "outreach",
    Fellowship => "fellowship",
    Meeting => "meeting",
    Other => "other",
});

text_enum!(ActivityStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl Default for ActivityType {
    fn default() -> Self {
        ActivityType::Other
    }
}

impl Default for ActivityStatus {
    fn default() -> Self {
        ActivityStatus::Scheduled
    }
}

impl Default for CommitteePosition {
    fn default() -> Self {
        CommitteePosition::Member
    }
}

impl Default for MemberStatus {
    fn default() -> Self {
        MemberStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_column_text() {
        assert_eq!(serde_json::to_value(SocietyPosition::VicePresident).unwrap(), "vice_president");
        let parsed: ActivityType = serde_json::from_value(serde_json::json!("bible_study")).unwrap();
        assert_eq!(parsed, ActivityType::BibleStudy);
        assert!(serde_json::from_value::<MemberStatus>(serde_json::json!("archived")).is_err());
    }

    #[test]
    fn from_str_matches_as_str() {
        for kind in EntryKind::ALL {
            assert_eq!(kind.as_str().parse::<EntryKind>().unwrap(), *kind);
        }
        assert!("weekly".parse::<WeekDay>().is_err());
    }
}
