//! Respondent intake profile.
//!
//! The profile is edited only through [`ProfileUpdate`] values applied by
//! [`RespondentProfile::apply`]. String input (form fields, CLI flags) is
//! turned into a typed update by [`ProfileUpdate::parse`]; malformed values
//! never error, they just leave the profile incomplete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProfileError;

/// A numeric form field.
///
/// Input that is not a positive finite number is kept as `Invalid` rather
/// than rejected, so the completeness check can report it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum Measurement {
    #[default]
    Unset,
    Invalid,
    Value(f64),
}

impl Measurement {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Measurement::Unset;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Measurement::Value(v),
            _ => Measurement::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Measurement::Value(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Measurement::Value(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! select_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $key:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or(())
            }
        }
    };
}

select_enum! {
    /// Annual income bracket.
    pub enum IncomeBracket {
        Under25k => "under-25k",
        From25kTo50k => "25k-50k",
        From50kTo100k => "50k-100k",
        From100kTo200k => "100k-200k",
        Over200k => "200k-plus",
    }
}

select_enum! {
    pub enum WorkStatus {
        FullTime => "full-time",
        PartTime => "part-time",
        SelfEmployed => "self-employed",
        Unemployed => "unemployed",
        Retired => "retired",
    }
}

select_enum! {
    pub enum EducationLevel {
        HighSchool => "high-school",
        College => "college",
        Graduate => "graduate",
    }
}

/// Names of the profile form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Age,
    Height,
    Weight,
    BodyFat,
    IncomeBracket,
    WorkStatus,
    IsStudent,
    EducationLevel,
    YearInSchool,
    FieldOfStudy,
}

impl ProfileField {
    pub const ALL: [ProfileField; 11] = [
        ProfileField::Name,
        ProfileField::Age,
        ProfileField::Height,
        ProfileField::Weight,
        ProfileField::BodyFat,
        ProfileField::IncomeBracket,
        ProfileField::WorkStatus,
        ProfileField::IsStudent,
        ProfileField::EducationLevel,
        ProfileField::YearInSchool,
        ProfileField::FieldOfStudy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Age => "age",
            ProfileField::Height => "height",
            ProfileField::Weight => "weight",
            ProfileField::BodyFat => "body_fat",
            ProfileField::IncomeBracket => "income_bracket",
            ProfileField::WorkStatus => "work_status",
            ProfileField::IsStudent => "is_student",
            ProfileField::EducationLevel => "education_level",
            ProfileField::YearInSchool => "year_in_school",
            ProfileField::FieldOfStudy => "field_of_study",
        }
    }

    /// Prompt label used by interactive front ends.
    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Name => "Name",
            ProfileField::Age => "Age",
            ProfileField::Height => "Height (cm)",
            ProfileField::Weight => "Weight (kg)",
            ProfileField::BodyFat => "Estimated body fat (%)",
            ProfileField::IncomeBracket => "Income bracket",
            ProfileField::WorkStatus => "Work status",
            ProfileField::IsStudent => "Are you a student?",
            ProfileField::EducationLevel => "Education level",
            ProfileField::YearInSchool => "Year in school",
            ProfileField::FieldOfStudy => "Field of study",
        }
    }

    /// Accepted values for select fields, empty for free-form ones.
    pub fn choices(&self) -> Vec<&'static str> {
        match self {
            ProfileField::IncomeBracket => IncomeBracket::ALL.iter().map(|v| v.as_str()).collect(),
            ProfileField::WorkStatus => WorkStatus::ALL.iter().map(|v| v.as_str()).collect(),
            ProfileField::EducationLevel => EducationLevel::ALL.iter().map(|v| v.as_str()).collect(),
            ProfileField::IsStudent => vec!["yes", "no"],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = ProfileError;

    /// Accepts snake_case, kebab-case, and camelCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ProfileField::ALL
            .into_iter()
            .find(|f| f.as_str().replace('_', "") == normalized)
            .ok_or_else(|| ProfileError::UnknownField(s.to_string()))
    }
}

/// A single typed edit to the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProfileUpdate {
    Name(String),
    Age(Measurement),
    Height(Measurement),
    Weight(Measurement),
    BodyFat(Measurement),
    IncomeBracket(Option<IncomeBracket>),
    WorkStatus(Option<WorkStatus>),
    SetStudent(bool),
    EducationLevel(Option<EducationLevel>),
    YearInSchool(String),
    FieldOfStudy(String),
}

impl ProfileUpdate {
    /// Build an update from a field name and raw form input.
    ///
    /// Only an unknown field name is an error.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ProfileError> {
        let field: ProfileField = field.parse()?;
        Ok(Self::for_field(field, raw))
    }

    /// Parse a `field=value` assignment.
    pub fn parse_assignment(assignment: &str) -> Result<Self, ProfileError> {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| ProfileError::MalformedAssignment(assignment.to_string()))?;
        Self::parse(field, raw)
    }

    pub fn for_field(field: ProfileField, raw: &str) -> Self {
        match field {
            ProfileField::Name => ProfileUpdate::Name(raw.trim().to_string()),
            ProfileField::Age => ProfileUpdate::Age(Measurement::parse(raw)),
            ProfileField::Height => ProfileUpdate::Height(Measurement::parse(raw)),
            ProfileField::Weight => ProfileUpdate::Weight(Measurement::parse(raw)),
            ProfileField::BodyFat => ProfileUpdate::BodyFat(Measurement::parse(raw)),
            ProfileField::IncomeBracket => ProfileUpdate::IncomeBracket(raw.parse().ok()),
            ProfileField::WorkStatus => ProfileUpdate::WorkStatus(raw.parse().ok()),
            ProfileField::IsStudent => ProfileUpdate::SetStudent(parse_flag(raw)),
            ProfileField::EducationLevel => ProfileUpdate::EducationLevel(raw.parse().ok()),
            ProfileField::YearInSchool => ProfileUpdate::YearInSchool(raw.trim().to_string()),
            ProfileField::FieldOfStudy => ProfileUpdate::FieldOfStudy(raw.trim().to_string()),
        }
    }

    pub fn field(&self) -> ProfileField {
        match self {
            ProfileUpdate::Name(_) => ProfileField::Name,
            ProfileUpdate::Age(_) => ProfileField::Age,
            ProfileUpdate::Height(_) => ProfileField::Height,
            ProfileUpdate::Weight(_) => ProfileField::Weight,
            ProfileUpdate::BodyFat(_) => ProfileField::BodyFat,
            ProfileUpdate::IncomeBracket(_) => ProfileField::IncomeBracket,
            ProfileUpdate::WorkStatus(_) => ProfileField::WorkStatus,
            ProfileUpdate::SetStudent(_) => ProfileField::IsStudent,
            ProfileUpdate::EducationLevel(_) => ProfileField::EducationLevel,
            ProfileUpdate::YearInSchool(_) => ProfileField::YearInSchool,
            ProfileUpdate::FieldOfStudy(_) => ProfileField::FieldOfStudy,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "on"
    )
}

/// Demographic and financial intake collected before the questions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RespondentProfile {
    pub name: String,
    pub age: Measurement,
    pub height: Measurement,
    pub weight: Measurement,
    pub body_fat: Measurement,
    pub income_bracket: Option<IncomeBracket>,
    pub work_status: Option<WorkStatus>,
    pub is_student: bool,
    /// Education fields are kept when `is_student` is cleared but ignored by
    /// the completeness check.
    pub education_level: Option<EducationLevel>,
    pub year_in_school: String,
    pub field_of_study: String,
}

impl RespondentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        match update {
            ProfileUpdate::Name(v) => self.name = v,
            ProfileUpdate::Age(v) => self.age = v,
            ProfileUpdate::Height(v) => self.height = v,
            ProfileUpdate::Weight(v) => self.weight = v,
            ProfileUpdate::BodyFat(v) => self.body_fat = v,
            ProfileUpdate::IncomeBracket(v) => self.income_bracket = v,
            ProfileUpdate::WorkStatus(v) => self.work_status = v,
            ProfileUpdate::SetStudent(v) => self.is_student = v,
            ProfileUpdate::EducationLevel(v) => self.education_level = v,
            ProfileUpdate::YearInSchool(v) => self.year_in_school = v,
            ProfileUpdate::FieldOfStudy(v) => self.field_of_study = v,
        }
    }

    /// Fields that currently block completion, in form order.
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(ProfileField::Name);
        }
        for (field, value) in [
            (ProfileField::Age, self.age),
            (ProfileField::Height, self.height),
            (ProfileField::Weight, self.weight),
            (ProfileField::BodyFat, self.body_fat),
        ] {
            if !value.is_valid() {
                missing.push(field);
            }
        }
        if self.income_bracket.is_none() {
            missing.push(ProfileField::IncomeBracket);
        }
        if self.work_status.is_none() {
            missing.push(ProfileField::WorkStatus);
        }
        if self.is_student {
            if self.education_level.is_none() {
                missing.push(ProfileField::EducationLevel);
            }
            if self.year_in_school.trim().is_empty() {
                missing.push(ProfileField::YearInSchool);
            }
            if self.education_level == Some(EducationLevel::College)
                && self.field_of_study.trim().is_empty()
            {
                missing.push(ProfileField::FieldOfStudy);
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fields the form currently shows, given the student flags.
    pub fn visible_fields(&self) -> Vec<ProfileField> {
        let mut fields = ProfileField::ALL[..8].to_vec();
        if self.is_student {
            fields.push(ProfileField::EducationLevel);
            fields.push(ProfileField::YearInSchool);
            if self.education_level == Some(EducationLevel::College) {
                fields.push(ProfileField::FieldOfStudy);
            }
        }
        fields
    }
}
