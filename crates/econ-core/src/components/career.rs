//! Career Tables
//!
//! Education tiers, education paths, careers and the fixed lookup tables the
//! decision model and the income assignment read from.

use econ_events::{Industry, ParseLabelError};
use std::fmt;
use std::str::FromStr;

/// Income for any job the salary table does not list.
pub const DEFAULT_SALARY: f64 = 2000.0;

/// Automation risk above which a career's income is discounted.
pub const AUTOMATION_RISK_THRESHOLD: f64 = 0.5;

/// Income multiplier for high-risk careers while automation is enabled.
pub const AUTOMATION_INCOME_FACTOR: f64 = 0.6;

/// Formal education tier of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Education {
    #[default]
    None,
    HighSchool,
    College,
}

impl Education {
    pub const ALL: [Education; 3] = [Education::None, Education::HighSchool, Education::College];

    /// Careers an agent of this tier is drawn into by a simple reassignment.
    pub fn entry_careers(self) -> &'static [Career] {
        match self {
            Education::College => &[Career::Engineer, Career::Doctor, Career::Lawyer],
            Education::HighSchool => &[
                Career::Teacher,
                Career::Technician,
                Career::Clerk,
                Career::Driver,
            ],
            Education::None => &[Career::GigWorker, Career::Laborer],
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Education::None => write!(f, "None"),
            Education::HighSchool => write!(f, "High School"),
            Education::College => write!(f, "College"),
        }
    }
}

/// Skill dimensions an agent is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Talent {
    Logical,
    Artistic,
    Social,
    Physical,
    Technical,
}

impl Talent {
    pub const ALL: [Talent; 5] = [
        Talent::Logical,
        Talent::Artistic,
        Talent::Social,
        Talent::Physical,
        Talent::Technical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Talent::Logical => "logical",
            Talent::Artistic => "artistic",
            Talent::Social => "social",
            Talent::Physical => "physical",
            Talent::Technical => "technical",
        }
    }
}

/// Hobby tags agents pick from a fixed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hobby {
    Music,
    Sports,
    Reading,
    Coding,
    Art,
    Gaming,
    Cooking,
    Travel,
    Diy,
}

impl Hobby {
    pub const POOL: [Hobby; 9] = [
        Hobby::Music,
        Hobby::Sports,
        Hobby::Reading,
        Hobby::Coding,
        Hobby::Art,
        Hobby::Gaming,
        Hobby::Cooking,
        Hobby::Travel,
        Hobby::Diy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Hobby::Music => "Music",
            Hobby::Sports => "Sports",
            Hobby::Reading => "Reading",
            Hobby::Coding => "Coding",
            Hobby::Art => "Art",
            Hobby::Gaming => "Gaming",
            Hobby::Cooking => "Cooking",
            Hobby::Travel => "Travel",
            Hobby::Diy => "DIY",
        }
    }
}

impl fmt::Display for Hobby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hobby {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hobby::POOL
            .into_iter()
            .find(|hobby| hobby.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError {
                kind: "hobby",
                label: s.to_string(),
            })
    }
}

/// A named occupation with fixed income, industry and risk figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Career {
    Engineer,
    Doctor,
    Lawyer,
    Teacher,
    Technician,
    Clerk,
    Driver,
    GigWorker,
    Laborer,
    Electrician,
    Plumber,
    Retail,
    Delivery,
}

impl Career {
    pub const ALL: [Career; 13] = [
        Career::Engineer,
        Career::Doctor,
        Career::Lawyer,
        Career::Teacher,
        Career::Technician,
        Career::Clerk,
        Career::Driver,
        Career::GigWorker,
        Career::Laborer,
        Career::Electrician,
        Career::Plumber,
        Career::Retail,
        Career::Delivery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Career::Engineer => "Engineer",
            Career::Doctor => "Doctor",
            Career::Lawyer => "Lawyer",
            Career::Teacher => "Teacher",
            Career::Technician => "Technician",
            Career::Clerk => "Clerk",
            Career::Driver => "Driver",
            Career::GigWorker => "Gig Worker",
            Career::Laborer => "Laborer",
            Career::Electrician => "Electrician",
            Career::Plumber => "Plumber",
            Career::Retail => "Retail",
            Career::Delivery => "Delivery",
        }
    }

    /// Income assigned when an agent takes this career.
    pub fn salary(self) -> f64 {
        match self {
            Career::Engineer => 9000.0,
            Career::Doctor => 12000.0,
            Career::Lawyer => 11000.0,
            Career::Teacher => 4000.0,
            Career::Technician => 4500.0,
            Career::Clerk => 3000.0,
            Career::Driver => 3200.0,
            Career::GigWorker => 2000.0,
            Career::Laborer => 2500.0,
            Career::Electrician | Career::Plumber | Career::Retail | Career::Delivery => {
                DEFAULT_SALARY
            }
        }
    }

    /// Income the decision model expects from this career.
    pub fn expected_income(self) -> f64 {
        match self {
            Career::Electrician => 5000.0,
            Career::Plumber => 5200.0,
            Career::Retail => 2800.0,
            Career::Delivery => 2600.0,
            other => other.salary(),
        }
    }

    pub fn industry(self) -> Industry {
        match self {
            Career::Engineer | Career::Technician => Industry::Tech,
            Career::Doctor => Industry::Healthcare,
            Career::Lawyer => Industry::Legal,
            Career::Teacher => Industry::Education,
            Career::Clerk => Industry::Retail,
            Career::Driver => Industry::Logistics,
            Career::Laborer => Industry::Manufacturing,
            _ => Industry::Services,
        }
    }

    pub fn automation_risk(self) -> f64 {
        match self {
            Career::GigWorker => 0.7,
            Career::Laborer => 0.6,
            Career::Retail => 0.5,
            Career::Delivery => 0.8,
            Career::Technician => 0.3,
            Career::Driver => 0.9,
            _ => 0.0,
        }
    }

    /// Whether automation discounts this career.
    pub fn is_automatable(self) -> bool {
        self.automation_risk() > AUTOMATION_RISK_THRESHOLD
    }

    /// Talent dimension that decides how well an agent fits this career.
    pub fn key_talent(self) -> Option<Talent> {
        match self {
            Career::Engineer | Career::Technician | Career::Electrician | Career::Plumber => {
                Some(Talent::Technical)
            }
            Career::Doctor | Career::Teacher | Career::Lawyer => Some(Talent::Logical),
            Career::Retail | Career::Driver | Career::Delivery => Some(Talent::Social),
            Career::Laborer => Some(Talent::Physical),
            Career::GigWorker => Some(Talent::Artistic),
            Career::Clerk => None,
        }
    }

    /// Hobby that earns a bonus toward this career.
    pub fn matching_hobby(self) -> Option<Hobby> {
        match self {
            Career::Engineer => Some(Hobby::Coding),
            Career::Teacher | Career::Doctor => Some(Hobby::Reading),
            Career::Electrician | Career::Plumber => Some(Hobby::Diy),
            Career::GigWorker => Some(Hobby::Gaming),
            _ => None,
        }
    }

    /// Prestige level used for display tinting, 0 (low) to 3 (elite).
    pub fn tier(self) -> u8 {
        match self {
            Career::Engineer | Career::Doctor | Career::Lawyer => 3,
            Career::Teacher | Career::Technician => 2,
            Career::Clerk | Career::Driver => 1,
            _ => 0,
        }
    }

    pub fn insured(self) -> bool {
        matches!(self, Career::Doctor | Career::Engineer | Career::Teacher)
    }
}

impl fmt::Display for Career {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Career {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Career::ALL
            .into_iter()
            .find(|career| career.as_str() == s)
            .ok_or_else(|| ParseLabelError {
                kind: "career",
                label: s.to_string(),
            })
    }
}

/// Education route an agent can commit to when choosing a career.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EducationPath {
    NoSchool,
    TradeSchool,
    College,
}

impl EducationPath {
    /// Declaration order doubles as the tie-break order when ranking.
    pub const ALL: [EducationPath; 3] = [
        EducationPath::NoSchool,
        EducationPath::TradeSchool,
        EducationPath::College,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EducationPath::NoSchool => "No School",
            EducationPath::TradeSchool => "Trade School",
            EducationPath::College => "College",
        }
    }

    pub fn years(self) -> u32 {
        match self {
            EducationPath::NoSchool => 0,
            EducationPath::TradeSchool => 2,
            EducationPath::College => 4,
        }
    }

    pub fn cost(self) -> u32 {
        match self {
            EducationPath::NoSchool => 0,
            EducationPath::TradeSchool => 5000,
            EducationPath::College => 40000,
        }
    }

    pub fn careers(self) -> &'static [Career] {
        match self {
            EducationPath::NoSchool => &[
                Career::GigWorker,
                Career::Laborer,
                Career::Retail,
                Career::Delivery,
            ],
            EducationPath::TradeSchool => &[
                Career::Electrician,
                Career::Plumber,
                Career::Technician,
                Career::Driver,
            ],
            EducationPath::College => &[
                Career::Doctor,
                Career::Lawyer,
                Career::Engineer,
                Career::Teacher,
            ],
        }
    }
}

impl fmt::Display for EducationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationPath {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EducationPath::ALL
            .into_iter()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| ParseLabelError {
                kind: "education path",
                label: s.to_string(),
            })
    }
}

/// Outcome of the last full career decision, if the agent ever made one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CareerPath {
    pub education_path: Option<EducationPath>,
    pub career: Option<Career>,
    pub education_years: Option<u32>,
    pub education_cost: Option<u32>,
    pub career_entry_age: Option<f64>,
    /// Human-readable summary of the inputs behind the decision
    pub decision_trace: Option<String>,
}

/// What an agent currently does for a living.
///
/// Labels outside the career list and the reserved states are kept verbatim
/// in `Other` (companies hire under their own name, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Job {
    Career(Career),
    Retired,
    Unemployed,
    Displaced,
    Other(String),
}

impl Job {
    pub fn label(&self) -> &str {
        match self {
            Job::Career(career) => career.as_str(),
            Job::Retired => "Retired",
            Job::Unemployed => "Unemployed",
            Job::Displaced => "Displaced",
            Job::Other(label) => label,
        }
    }

    /// Income from the static per-job salary table.
    pub fn salary(&self) -> f64 {
        match self {
            Job::Career(career) => career.salary(),
            Job::Retired => 1000.0,
            _ => DEFAULT_SALARY,
        }
    }

    /// Industry from the static per-job table (`None` for retirees).
    pub fn industry(&self) -> Option<Industry> {
        match self {
            Job::Career(career) => Some(career.industry()),
            Job::Retired => None,
            _ => Some(Industry::Services),
        }
    }

    pub fn career(&self) -> Option<Career> {
        match self {
            Job::Career(career) => Some(*career),
            _ => None,
        }
    }

    /// Holding a job that pays (not retired, unemployed or displaced).
    pub fn is_employed(&self) -> bool {
        matches!(self, Job::Career(_) | Job::Other(_))
    }

    /// Out of work and eligible for retraining.
    pub fn is_seeking_work(&self) -> bool {
        matches!(self, Job::Unemployed | Job::Displaced)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Job {
    fn from(label: &str) -> Self {
        match label {
            "Retired" => Job::Retired,
            "Unemployed" => Job::Unemployed,
            "Displaced" => Job::Displaced,
            other => match other.parse::<Career>() {
                Ok(career) => Job::Career(career),
                Err(_) => Job::Other(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_table_defaults() {
        assert_eq!(Career::Doctor.salary(), 12000.0);
        assert_eq!(Career::Electrician.salary(), DEFAULT_SALARY);
        assert_eq!(Career::Electrician.expected_income(), 5000.0);
        assert_eq!(Job::Retired.salary(), 1000.0);
        assert_eq!(Job::Other("Tech".into()).salary(), DEFAULT_SALARY);
    }

    #[test]
    fn test_automation_threshold_is_strict() {
        assert!(Career::Driver.is_automatable());
        assert!(Career::Laborer.is_automatable());
        assert!(!Career::Retail.is_automatable());
        assert!(!Career::Technician.is_automatable());
    }

    #[test]
    fn test_job_labels_round_trip() {
        for career in Career::ALL {
            assert_eq!(Job::from(career.as_str()), Job::Career(career));
        }
        assert_eq!(Job::from("Displaced"), Job::Displaced);
        assert_eq!(Job::from("Tech"), Job::Other("Tech".into()));
        assert_eq!(Job::from("Tech").label(), "Tech");
    }

    #[test]
    fn test_industry_table() {
        assert_eq!(Job::Career(Career::Driver).industry(), Some(Industry::Logistics));
        assert_eq!(Job::Career(Career::Plumber).industry(), Some(Industry::Services));
        assert_eq!(Job::Retired.industry(), None);
    }

    #[test]
    fn test_paths_declare_four_careers() {
        for path in EducationPath::ALL {
            assert_eq!(path.careers().len(), 4);
            assert_eq!(path.as_str().parse::<EducationPath>().unwrap(), path);
        }
    }

    #[test]
    fn test_hobby_labels() {
        assert_eq!("DIY".parse::<Hobby>().unwrap(), Hobby::Diy);
        assert!("Knitting".parse::<Hobby>().is_err());
    }
}
