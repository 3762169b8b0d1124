//! Read-only Projections
//!
//! Display classifications derived from agent state. Nothing here feeds
//! back into the simulation.

use econ_events::Industry;
use serde::Serialize;
use std::fmt;

use crate::components::agent::{
    AgentId, Demographics, Employment, Finances, Movement, Wellbeing,
};
use crate::components::career::Job;

/// Socioeconomic class from income and savings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SocioeconomicClass {
    Lower,
    Working,
    Middle,
    Upper,
}

impl SocioeconomicClass {
    pub const ALL: [SocioeconomicClass; 4] = [
        SocioeconomicClass::Lower,
        SocioeconomicClass::Working,
        SocioeconomicClass::Middle,
        SocioeconomicClass::Upper,
    ];

    /// Highest class whose income or savings threshold is met
    pub fn classify(income: f64, savings: f64) -> Self {
        if income >= 9000.0 || savings >= 50_000.0 {
            SocioeconomicClass::Upper
        } else if income >= 4000.0 || savings >= 15_000.0 {
            SocioeconomicClass::Middle
        } else if income >= 2000.0 || savings >= 5000.0 {
            SocioeconomicClass::Working
        } else {
            SocioeconomicClass::Lower
        }
    }
}

impl fmt::Display for SocioeconomicClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocioeconomicClass::Lower => write!(f, "Lower"),
            SocioeconomicClass::Working => write!(f, "Working"),
            SocioeconomicClass::Middle => write!(f, "Middle"),
            SocioeconomicClass::Upper => write!(f, "Upper"),
        }
    }
}

/// Marker shape by industry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Hexagon,
}

impl Shape {
    pub fn for_industry(industry: Option<Industry>) -> Self {
        match industry {
            Some(Industry::Tech | Industry::Logistics) => Shape::Square,
            Some(Industry::Healthcare | Industry::Retail) => Shape::Circle,
            Some(Industry::Legal | Industry::Services) => Shape::Triangle,
            Some(Industry::Education | Industry::Manufacturing) => Shape::Hexagon,
            _ => Shape::Circle,
        }
    }
}

/// RGB tint for the prestige tier of a job
pub fn career_tier_colour(job: &Job) -> (u8, u8, u8) {
    match job {
        Job::Retired => (180, 180, 180),
        Job::Career(career) => match career.tier() {
            3 => (255, 180, 50),
            2 => (255, 255, 100),
            1 => (100, 255, 150),
            _ => (120, 120, 255),
        },
        _ => (120, 120, 255),
    }
}

/// What a display layer needs to draw one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub at_work: bool,
    pub colour: (u8, u8, u8),
    pub shape: Shape,
    pub class: SocioeconomicClass,
    pub job: String,
    pub health: f64,
    pub retired: bool,
}

impl AgentView {
    pub fn new(
        id: &AgentId,
        demographics: &Demographics,
        employment: &Employment,
        finances: &Finances,
        wellbeing: &Wellbeing,
        movement: &Movement,
    ) -> Self {
        Self {
            id: id.0,
            x: movement.x,
            y: movement.y,
            at_work: movement.at_work,
            colour: career_tier_colour(&employment.job),
            shape: Shape::for_industry(employment.industry),
            class: SocioeconomicClass::classify(employment.income, finances.savings),
            job: employment.job.label().to_string(),
            health: wellbeing.health,
            retired: demographics.retired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::career::Career;

    #[test]
    fn test_class_thresholds() {
        assert_eq!(SocioeconomicClass::classify(9000.0, 0.0), SocioeconomicClass::Upper);
        assert_eq!(SocioeconomicClass::classify(0.0, 50_000.0), SocioeconomicClass::Upper);
        assert_eq!(SocioeconomicClass::classify(8999.0, 0.0), SocioeconomicClass::Middle);
        assert_eq!(SocioeconomicClass::classify(1000.0, 15_000.0), SocioeconomicClass::Middle);
        assert_eq!(SocioeconomicClass::classify(2000.0, 0.0), SocioeconomicClass::Working);
        assert_eq!(SocioeconomicClass::classify(0.0, 5000.0), SocioeconomicClass::Working);
        assert_eq!(SocioeconomicClass::classify(1999.0, 4999.0), SocioeconomicClass::Lower);
    }

    #[test]
    fn test_tier_colours() {
        assert_eq!(career_tier_colour(&Job::Retired), (180, 180, 180));
        assert_eq!(career_tier_colour(&Job::Career(Career::Doctor)), (255, 180, 50));
        assert_eq!(career_tier_colour(&Job::Career(Career::Teacher)), (255, 255, 100));
        assert_eq!(career_tier_colour(&Job::Career(Career::Driver)), (100, 255, 150));
        assert_eq!(career_tier_colour(&Job::Career(Career::Plumber)), (120, 120, 255));
        assert_eq!(career_tier_colour(&Job::Displaced), (120, 120, 255));
    }

    #[test]
    fn test_shapes() {
        assert_eq!(Shape::for_industry(Some(Industry::Logistics)), Shape::Square);
        assert_eq!(Shape::for_industry(Some(Industry::Retail)), Shape::Circle);
        assert_eq!(Shape::for_industry(Some(Industry::Legal)), Shape::Triangle);
        assert_eq!(Shape::for_industry(Some(Industry::Manufacturing)), Shape::Hexagon);
        assert_eq!(Shape::for_industry(Some(Industry::Finance)), Shape::Circle);
        assert_eq!(Shape::for_industry(None), Shape::Circle);
    }
}
