use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::LoanError;

/// A closed dropdown choice with a fixed integer code the model was trained on.
pub trait Category: Copy + Eq + Sized + 'static {
    /// Label shown above the dropdown.
    const FIELD: &'static str;

    /// Every option, in dropdown order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn code(self) -> u8;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.label() == label)
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident,
        { $($variant:ident => ($label:literal, $code:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl Category for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = LoanError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as Category>::from_label(s).ok_or_else(|| LoanError::UnknownCategory {
                    field: $field,
                    value: s.to_string(),
                })
            }
        }
    };
}

category!(Gender, "Gender", default = Male, {
    Male => ("Male", 1),
    Female => ("Female", 0),
});

category!(MaritalStatus, "Marital Status", default = Married, {
    Married => ("Married", 0),
    Single => ("Single", 1),
});

category!(Education, "Education", default = HighSchool, {
    HighSchool => ("High School", 0),
    Bachelors => ("Bachelor's", 1),
    Masters => ("Master's", 2),
});

category!(
    /// Yes/No flag; not a lookup table in the form, but encoded the same way.
    SelfEmployed, "Self-Employed", default = No, {
    Yes => ("Yes", 1),
    No => ("No", 0),
});

category!(CreditHistory, "Credit History", default = Good, {
    Good => ("Good", 0),
    Poor => ("Poor", 1),
});

category!(PropertyArea, "Property Area", default = Urban, {
    Urban => ("Urban", 1),
    Rural => ("Rural", 0),
});

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_closed_mapping<C: Category + fmt::Debug>(expected: &[(&str, u8)]) {
        assert_eq!(C::ALL.len(), expected.len(), "{} option count", C::FIELD);

        let mut labels = HashSet::new();
        for (option, (label, code)) in C::ALL.iter().zip(expected) {
            assert_eq!(option.label(), *label);
            assert_eq!(option.code(), *code, "{} {:?}", C::FIELD, option);
            assert!(labels.insert(option.label()), "duplicate label {}", label);
            assert_eq!(C::from_label(label), Some(*option));
        }
    }

    #[test]
    fn mappings_match_training_codes() {
        assert_closed_mapping::<Gender>(&[("Male", 1), ("Female", 0)]);
        assert_closed_mapping::<MaritalStatus>(&[("Married", 0), ("Single", 1)]);
        assert_closed_mapping::<Education>(&[
            ("High School", 0),
            ("Bachelor's", 1),
            ("Master's", 2),
        ]);
        assert_closed_mapping::<SelfEmployed>(&[("Yes", 1), ("No", 0)]);
        assert_closed_mapping::<CreditHistory>(&[("Good", 0), ("Poor", 1)]);
        assert_closed_mapping::<PropertyArea>(&[("Urban", 1), ("Rural", 0)]);
    }

    #[test]
    fn codes_are_unique_within_each_mapping() {
        fn unique<C: Category>() -> bool {
            let codes: HashSet<u8> = C::ALL.iter().map(|c| c.code()).collect();
            codes.len() == C::ALL.len()
        }

        assert!(unique::<Gender>());
        assert!(unique::<MaritalStatus>());
        assert!(unique::<Education>());
        assert!(unique::<SelfEmployed>());
        assert!(unique::<CreditHistory>());
        assert!(unique::<PropertyArea>());
    }

    #[test]
    fn defaults_match_form_preselection() {
        assert_eq!(Gender::default(), Gender::Male);
        assert_eq!(MaritalStatus::default(), MaritalStatus::Married);
        assert_eq!(Education::default(), Education::HighSchool);
        assert_eq!(SelfEmployed::default(), SelfEmployed::No);
        assert_eq!(CreditHistory::default(), CreditHistory::Good);
        assert_eq!(PropertyArea::default(), PropertyArea::Urban);
    }

    #[test]
    fn parsing_rejects_unknown_labels() {
        assert_eq!("Master's".parse::<Education>().ok(), Some(Education::Masters));

        let err = "PhD".parse::<Education>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown Education option: PhD");
        assert!("male".parse::<Gender>().is_err());
    }
}
