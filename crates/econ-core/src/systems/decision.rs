//! Career Decisions
//!
//! Education-path scoring, weighted career choice and the lighter-weight
//! spontaneous career transition.
//!
//! Each of the three education paths is scored as
//! `roi + talent fit + hobby bonus + noise`, where
//! `roi = (expected_income * 10 - cost) / (years + 1)`. The best path wins
//! (first declared on ties) and a career inside it is drawn with weights
//! `1 + fit + hobby bonus`.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::agent::{AgentId, Demographics, Employment, Traits, Transition};
use crate::components::career::{
    Career, EducationPath, Job, AUTOMATION_INCOME_FACTOR, DEFAULT_SALARY,
};

/// Half-width of the uniform noise added to each path score.
pub const SCORE_NOISE: f64 = 0.2;

/// ROI discount while a recession is in force.
pub const RECESSION_ROI_FACTOR: f64 = 0.8;

/// Extra discount on expensive paths during a recession.
pub const RECESSION_COSTLY_PATH_FACTOR: f64 = 0.7;

/// Paths costing more than this get the extra recession discount.
pub const COSTLY_PATH_THRESHOLD: u32 = 10_000;

/// Breakdown of one path's score
#[derive(Debug, Clone, PartialEq)]
pub struct PathScore {
    pub path: EducationPath,
    pub expected_income: f64,
    pub roi: f64,
    pub fit: f64,
    pub hobby_bonus: f64,
    pub noise: f64,
}

impl PathScore {
    pub fn total(&self) -> f64 {
        self.roi + self.fit + self.hobby_bonus + self.noise
    }
}

/// Result of a full career decision
#[derive(Debug, Clone, PartialEq)]
pub struct CareerDecision {
    pub path: EducationPath,
    pub career: Career,
    /// Every path's score, in declaration order
    pub scores: Vec<PathScore>,
}

/// Mean expected income of `careers`, discounting automatable ones when
/// automation is on.
pub fn expected_income(careers: &[Career], automation: bool) -> f64 {
    if careers.is_empty() {
        return DEFAULT_SALARY;
    }
    let total: f64 = careers
        .iter()
        .map(|&career| {
            let base = career.expected_income();
            if automation && career.is_automatable() {
                base * AUTOMATION_INCOME_FACTOR
            } else {
                base
            }
        })
        .sum();
    total / careers.len() as f64
}

/// Return on an education path, discounted during a recession.
pub fn education_roi(cost: u32, years: u32, expected_income: f64, recession: bool) -> f64 {
    let roi = (expected_income * 10.0 - f64::from(cost)) / f64::from(years + 1);
    if recession {
        roi * RECESSION_ROI_FACTOR
    } else {
        roi
    }
}

/// Average talent fit across `careers`.
pub fn talent_fit(traits: &Traits, careers: &[Career]) -> f64 {
    let total: f64 = careers.iter().map(|&c| traits.fit(c)).sum();
    total / careers.len().max(1) as f64
}

/// Summed hobby bonus across `careers`.
pub fn hobby_bonus(traits: &Traits, careers: &[Career]) -> f64 {
    careers.iter().map(|&c| traits.hobby_bonus(c)).sum()
}

/// Score one education path. Draws one noise sample.
pub fn score_path(
    path: EducationPath,
    traits: &Traits,
    automation: bool,
    recession: bool,
    rng: &mut impl Rng,
) -> PathScore {
    let careers = path.careers();
    let expected = expected_income(careers, automation);
    let mut roi = education_roi(path.cost(), path.years(), expected, recession);
    let fit = talent_fit(traits, careers);
    if recession && path.cost() > COSTLY_PATH_THRESHOLD {
        roi *= RECESSION_COSTLY_PATH_FACTOR;
    }
    let hobby_bonus = hobby_bonus(traits, careers);
    let noise = rng.gen_range(-SCORE_NOISE..=SCORE_NOISE);
    PathScore {
        path,
        expected_income: expected,
        roi,
        fit,
        hobby_bonus,
        noise,
    }
}

/// Sampling weight of a single career for this agent.
pub fn career_weight(career: Career, traits: &Traits, automation: bool) -> f64 {
    let weight = 1.0 + traits.fit(career) + traits.hobby_bonus(career);
    if automation && career.is_automatable() {
        weight * AUTOMATION_INCOME_FACTOR
    } else {
        weight
    }
}

/// Draw a career from `careers` in proportion to talent and hobby fit.
///
/// Falls back to a uniform pick when no career carries any weight.
pub fn pick_career(
    careers: &[Career],
    traits: &Traits,
    automation: bool,
    rng: &mut impl Rng,
) -> Option<Career> {
    let weights: Vec<f64> = careers
        .iter()
        .map(|&c| career_weight(c, traits, automation))
        .collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => careers.get(dist.sample(rng)).copied(),
        Err(_) => careers.choose(rng).copied(),
    }
}

/// Score every path, keep the best and pick a career inside it.
pub fn decide_career_path(
    traits: &Traits,
    automation: bool,
    recession: bool,
    rng: &mut impl Rng,
) -> CareerDecision {
    let scores: Vec<PathScore> = EducationPath::ALL
        .iter()
        .map(|&path| score_path(path, traits, automation, recession, rng))
        .collect();

    let mut best = EducationPath::ALL[0];
    let mut best_total = f64::NEG_INFINITY;
    for score in &scores {
        if score.total() > best_total {
            best_total = score.total();
            best = score.path;
        }
    }

    let career = pick_career(best.careers(), traits, automation, rng)
        .unwrap_or(best.careers()[0]);

    CareerDecision {
        path: best,
        career,
        scores,
    }
}

/// Commit an agent to a decision and record the trace.
pub fn apply_decision(
    id: AgentId,
    demographics: &Demographics,
    traits: &Traits,
    employment: &mut Employment,
    decision: &CareerDecision,
) {
    employment.commit(decision.path, decision.career, demographics.age);
    let talents = traits
        .talents
        .iter()
        .map(|(t, v)| format!("{}={:.2}", t.as_str(), v))
        .collect::<Vec<_>>()
        .join(",");
    let hobbies = traits
        .hobbies
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let trace = format!(
        "Agent {}: Talents=[{}] Hobbies=[{}] Path={} Career={} Age={:.1} Income={}",
        id,
        talents,
        hobbies,
        decision.path,
        decision.career,
        employment.path.career_entry_age.unwrap_or(demographics.age),
        employment.income
    );
    tracing::debug!("{}", trace);
    employment.path.decision_trace = Some(trace);
}

/// Redraw the job from the entry careers of the agent's schooling.
///
/// Starts the transition animation. Returns the previous job.
pub fn transition_career(
    demographics: &Demographics,
    employment: &mut Employment,
    transition: &mut Transition,
    rng: &mut impl Rng,
) -> Job {
    transition.start();
    let previous = employment.job.clone();
    let career = demographics
        .education
        .entry_careers()
        .choose(rng)
        .copied()
        .unwrap_or(Career::GigWorker);
    employment.assign(Job::Career(career));
    previous
}
