//! Agent Components
//!
//! Components for individual agents: demographics, traits, employment,
//! personal finances, wellbeing and position.

use bevy_ecs::prelude::*;
use econ_events::Industry;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

use super::career::{Career, CareerPath, Education, EducationPath, Hobby, Job, Talent};

/// Number of income samples kept per agent.
pub const INCOME_HISTORY_LEN: usize = 120;

/// Share of each tick's net income that reaches savings.
pub const SAVINGS_RATE: f64 = 0.01;

/// Share of a savings shortfall that becomes debt.
pub const DEBT_RATE: f64 = 0.01;

/// Fixed pension paid to retirees.
pub const DEFAULT_PENSION: f64 = 1000.0;

/// Where agents with an industry commute to during the work phase.
pub const WORK_CENTRE: (i32, i32) = (400, 300);

/// Fraction of the remaining distance covered per tick while commuting.
pub const COMMUTE_STEP: f64 = 0.05;

/// Unique identifier for an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Age, schooling and retirement state
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Demographics {
    pub education: Education,
    /// Age in years (fractional, advances every tick)
    pub age: f64,
    pub retirement_age: u32,
    pub retired: bool,
    pub pension: f64,
}

impl Demographics {
    pub fn reached_retirement(&self) -> bool {
        self.age >= f64::from(self.retirement_age)
    }
}

/// Skill profile, every dimension held in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Talents {
    values: [f64; 5],
}

impl Talents {
    pub fn new(logical: f64, artistic: f64, social: f64, physical: f64, technical: f64) -> Self {
        let mut talents = Self { values: [0.0; 5] };
        talents.set(Talent::Logical, logical);
        talents.set(Talent::Artistic, artistic);
        talents.set(Talent::Social, social);
        talents.set(Talent::Physical, physical);
        talents.set(Talent::Technical, technical);
        talents
    }

    /// Every dimension at the same level.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value, value)
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        let mut talents = Self::uniform(0.0);
        for talent in Talent::ALL {
            talents.set(talent, rng.gen_range(0.0..=1.0));
        }
        talents
    }

    /// Copy with each dimension nudged by up to ±0.1.
    pub fn mutated(&self, rng: &mut impl Rng) -> Self {
        let mut child = *self;
        for talent in Talent::ALL {
            child.set(talent, self.get(talent) + rng.gen_range(-0.1..=0.1));
        }
        child
    }

    pub fn get(&self, talent: Talent) -> f64 {
        self.values[talent as usize]
    }

    pub fn set(&mut self, talent: Talent, value: f64) {
        self.values[talent as usize] = value.clamp(0.0, 1.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Talent, f64)> + '_ {
        Talent::ALL.into_iter().map(|talent| (talent, self.get(talent)))
    }
}

/// Talents and hobbies - fixed at creation
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Traits {
    pub talents: Talents,
    pub hobbies: Vec<Hobby>,
}

impl Traits {
    pub fn has_hobby(&self, hobby: Hobby) -> bool {
        self.hobbies.contains(&hobby)
    }

    /// Talent level backing `career`, zero when the career has no key talent.
    pub fn fit(&self, career: Career) -> f64 {
        career
            .key_talent()
            .map_or(0.0, |talent| self.talents.get(talent))
    }

    /// Bonus for holding the hobby that matches `career`.
    pub fn hobby_bonus(&self, career: Career) -> f64 {
        match career.matching_hobby() {
            Some(hobby) if self.has_hobby(hobby) => 0.2,
            _ => 0.0,
        }
    }
}

/// Draw 1..=3 distinct hobbies from the pool.
pub fn random_hobbies(rng: &mut impl Rng) -> Vec<Hobby> {
    let count = rng.gen_range(1..=3);
    Hobby::POOL.choose_multiple(rng, count).copied().collect()
}

/// Keep one or two of the parent's hobbies and pick up to two new ones.
pub fn inherited_hobbies(parent: &[Hobby], rng: &mut impl Rng) -> Vec<Hobby> {
    if parent.is_empty() {
        return random_hobbies(rng);
    }
    let keep = parent.len().min(rng.gen_range(1..=2));
    let mut hobbies: Vec<Hobby> = parent.choose_multiple(rng, keep).copied().collect();
    let fresh: Vec<Hobby> = Hobby::POOL
        .into_iter()
        .filter(|hobby| !hobbies.contains(hobby))
        .collect();
    let extra = rng.gen_range(0..=2);
    hobbies.extend(fresh.choose_multiple(rng, extra).copied());
    hobbies
}

/// Current job, pay and the last recorded career decision
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Employment {
    pub job: Job,
    pub industry: Option<Industry>,
    pub income: f64,
    pub path: CareerPath,
}

impl Employment {
    /// Employment for `job` with table income and industry.
    pub fn for_job(job: Job) -> Self {
        let mut employment = Self {
            job: Job::Unemployed,
            industry: None,
            income: 0.0,
            path: CareerPath::default(),
        };
        employment.assign(job);
        employment
    }

    /// Take `job`, drawing income and industry from the static tables.
    pub fn assign(&mut self, job: Job) {
        self.income = job.salary();
        self.industry = job.industry();
        self.job = job;
    }

    /// Permanently switch to the pension.
    pub fn retire(&mut self, pension: f64) {
        self.job = Job::Retired;
        self.income = pension;
        self.industry = None;
    }

    /// Commit to a path and career as a decision outcome.
    pub fn commit(&mut self, path: EducationPath, career: Career, age: f64) {
        self.path = CareerPath {
            education_path: Some(path),
            career: Some(career),
            education_years: Some(path.years()),
            education_cost: Some(path.cost()),
            career_entry_age: Some(age + f64::from(path.years())),
            decision_trace: None,
        };
        self.assign(Job::Career(career));
    }
}

/// Savings, debt and the bounded income record
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Finances {
    /// Never negative; shortfalls move into `debt`
    pub savings: f64,
    pub debt: f64,
    pub cost_of_living: f64,
    pub bankrupt: bool,
    income_history: VecDeque<f64>,
}

impl Finances {
    pub fn new(savings: f64, debt: f64, cost_of_living: f64) -> Self {
        Self {
            savings: savings.max(0.0),
            debt: debt.max(0.0),
            cost_of_living,
            bankrupt: false,
            income_history: VecDeque::with_capacity(INCOME_HISTORY_LEN),
        }
    }

    /// Apply one tick of income against the cost of living.
    ///
    /// Returns the tick's net income.
    pub fn update(&mut self, income: f64) -> f64 {
        let net = income - self.cost_of_living;
        self.savings += net * SAVINGS_RATE;
        if self.savings < 0.0 {
            self.debt += self.savings.abs() * DEBT_RATE;
            self.savings = 0.0;
        }
        self.record_income(income);
        net
    }

    pub fn record_income(&mut self, income: f64) {
        if self.income_history.len() >= INCOME_HISTORY_LEN {
            self.income_history.pop_front();
        }
        self.income_history.push_back(income);
    }

    pub fn income_history(&self) -> &VecDeque<f64> {
        &self.income_history
    }

    /// Raise the bankrupt flag when savings fall below the negated debt.
    ///
    /// Returns true when the flag was newly raised. There is no way back.
    pub fn check_bankruptcy(&mut self) -> bool {
        if !self.bankrupt && self.savings < -self.debt {
            self.bankrupt = true;
            return true;
        }
        false
    }

    /// Scale the cost of living by one period of inflation (whole units).
    pub fn inflate(&mut self, monthly_rate: f64) {
        self.cost_of_living = (self.cost_of_living * (1.0 + monthly_rate)).trunc();
    }
}

/// Health and insurance cover
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Wellbeing {
    /// 0 to 100
    pub health: f64,
    pub has_insurance: bool,
}

/// Which way the day cycle sends an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommuteTarget {
    Home,
    Work,
}

/// Screen position, home and commute state
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Movement {
    pub x: i32,
    pub y: i32,
    pub home: (i32, i32),
    pub at_work: bool,
}

impl Movement {
    pub fn at_home(home: (i32, i32)) -> Self {
        Self {
            x: home.0,
            y: home.1,
            home,
            at_work: false,
        }
    }

    /// Step toward the target for this phase of the day.
    ///
    /// Agents without an industry stay home during work hours.
    pub fn commute(&mut self, target: CommuteTarget, industry: Option<Industry>) {
        self.at_work = target == CommuteTarget::Work;
        let (tx, ty) = match (target, industry) {
            (CommuteTarget::Work, Some(_)) => WORK_CENTRE,
            _ => self.home,
        };
        self.x += (f64::from(tx - self.x) * COMMUTE_STEP) as i32;
        self.y += (f64::from(ty - self.y) * COMMUTE_STEP) as i32;
    }
}

/// Career-change animation state
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct Transition {
    pub transitioning: bool,
    /// 0.0 to 1.0
    pub progress: f64,
}

impl Transition {
    pub fn start(&mut self) {
        self.transitioning = true;
        self.progress = 0.0;
    }

    /// Advance the transition; clears the flag once complete.
    pub fn advance(&mut self, rate: f64) {
        if !self.transitioning {
            return;
        }
        self.progress += rate;
        if self.progress >= 1.0 {
            self.transitioning = false;
        }
    }
}

/// Family line of an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Lineage {
    pub parent_id: Option<AgentId>,
    pub generation: u32,
}

/// Everything an agent entity is spawned with
#[derive(Bundle, Debug, Clone)]
pub struct AgentBundle {
    pub id: AgentId,
    pub demographics: Demographics,
    pub traits: Traits,
    pub employment: Employment,
    pub finances: Finances,
    pub wellbeing: Wellbeing,
    pub movement: Movement,
    pub transition: Transition,
    pub lineage: Lineage,
}

impl AgentBundle {
    /// A fresh random individual.
    pub fn random(id: AgentId, rng: &mut impl Rng) -> Self {
        let education = *Education::ALL.choose(rng).unwrap_or(&Education::None);
        let age = f64::from(rng.gen_range(18..=75u32));
        let retirement_age = rng.gen_range(65..=75u32);
        let demographics = Demographics {
            education,
            age,
            retirement_age,
            retired: age >= f64::from(retirement_age),
            pension: DEFAULT_PENSION,
        };

        let career = *education
            .entry_careers()
            .choose(rng)
            .unwrap_or(&Career::GigWorker);
        let mut employment = Employment::for_job(Job::Career(career));
        let health = f64::from(rng.gen_range(60..=100u32));
        if demographics.retired {
            employment.retire(demographics.pension);
        }
        let has_insurance = employment.job.career().is_some_and(Career::insured);

        let cost_of_living = f64::from(rng.gen_range(800..=2500u32));
        let home = (rng.gen_range(100..=700), rng.gen_range(100..=500));
        let traits = Traits {
            talents: Talents::random(rng),
            hobbies: random_hobbies(rng),
        };

        let savings = f64::from(rng.gen_range(0..=10_000u32));
        let debt = f64::from(rng.gen_range(0..=5_000u32));
        let mut finances = Finances::new(savings, debt, cost_of_living);
        finances.record_income(employment.income);

        Self {
            id,
            demographics,
            traits,
            employment,
            finances,
            wellbeing: Wellbeing {
                health,
                has_insurance,
            },
            movement: Movement::at_home(home),
            transition: Transition::default(),
            lineage: Lineage::default(),
        }
    }

    /// A child of `parent`: random demographics, inherited traits.
    pub fn offspring(id: AgentId, parent: (AgentId, &Traits, &Lineage), rng: &mut impl Rng) -> Self {
        let (parent_id, parent_traits, parent_lineage) = parent;
        let mut child = Self::random(id, rng);
        child.traits = Traits {
            talents: parent_traits.talents.mutated(rng),
            hobbies: inherited_hobbies(&parent_traits.hobbies, rng),
        };
        child.lineage = Lineage {
            parent_id: Some(parent_id),
            generation: parent_lineage.generation + 1,
        };
        child
    }
}
