//! A simulated admission season.
//!
//! Everything is derived from one RNG seed: keys, course quotas and
//! weights, student credit caps, purchases and bids. The same seed and config
//! always replay the same season and end in the same award roots.

use coursebid_types::{
    Course, CourseCode, CoursebidError, EngineConfig, Identity, Result, SettlementReport,
};
use coursebid_university::{ManualClock, University, identity_of, sign_enrollment};
use ed25519_dalek::SigningKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of a season.
#[derive(Debug, Clone)]
pub struct SimParams {
    pub seed: u64,
    pub students: usize,
    pub courses: usize,
    pub rounds: usize,
    pub round_secs: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            seed: 42,
            students: 40,
            courses: 8,
            rounds: 2,
            round_secs: 3_600,
        }
    }
}

impl SimParams {
    /// Read `COURSEBID_SIM_*` overrides from the environment.
    pub fn from_env() -> Result<Self> {
        let mut params = Self::default();
        if let Some(v) = env_number("COURSEBID_SIM_SEED")? {
            params.seed = v;
        }
        if let Some(v) = env_number("COURSEBID_SIM_STUDENTS")? {
            params.students = usize::try_from(v).map_err(config_err)?;
        }
        if let Some(v) = env_number("COURSEBID_SIM_COURSES")? {
            params.courses = usize::try_from(v).map_err(config_err)?;
        }
        if let Some(v) = env_number("COURSEBID_SIM_ROUNDS")? {
            params.rounds = usize::try_from(v).map_err(config_err)?;
        }
        if let Some(v) = env_number("COURSEBID_SIM_ROUND_SECS")? {
            params.round_secs = v;
        }
        if params.courses == 0 {
            return Err(CoursebidError::Configuration(
                "COURSEBID_SIM_COURSES must be > 0".to_string(),
            ));
        }
        Ok(params)
    }
}

fn env_number(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| CoursebidError::Configuration(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn config_err(e: impl std::fmt::Display) -> CoursebidError {
    CoursebidError::Configuration(e.to_string())
}

fn key(rng: &mut StdRng) -> SigningKey {
    let mut seed = [0u8; 32];
    rng.fill(&mut seed);
    SigningKey::from_bytes(&seed)
}

/// Run a full season and return each round's settlement.
pub fn run_season(config: EngineConfig, params: &SimParams) -> Result<Vec<SettlementReport>> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let clock = ManualClock::default();

    let chief = identity_of(&key(&mut rng));
    let mut uni = University::new(config, chief, clock.clone())?;
    let admin_key = key(&mut rng);
    let admin = identity_of(&admin_key);
    uni.appoint_admin(&chief, admin)?;
    let lecturer = identity_of(&key(&mut rng));
    uni.appoint_lecturer(&admin, lecturer)?;

    let mut codes = Vec::with_capacity(params.courses);
    for i in 0..params.courses {
        let code = CourseCode::new(format!("C{i:03}"))?;
        let quota = rng.gen_range(1..=5);
        let weight = rng.gen_range(3..=8);
        uni.create_course(&admin, Course::new(code.clone(), quota, weight, lecturer))?;
        codes.push(code);
    }
    if codes.is_empty() {
        return Err(CoursebidError::Configuration(
            "a season needs at least one course".to_string(),
        ));
    }

    let max_credits = uni.config().fees.max_credits_per_claimant;
    let mut students: Vec<Identity> = Vec::with_capacity(params.students);
    for _ in 0..params.students {
        let student = identity_of(&key(&mut rng));
        let cap = rng.gen_range(max_credits / 2..=max_credits);
        let auth = sign_enrollment(&admin_key, uni.system_id(), student, cap);
        uni.enroll(&auth)?;
        let credits = rng
            .gen_range(100..=1_000u64)
            .min(uni.remaining_allowance(&student));
        if credits > 0 {
            let price = uni.quote(credits);
            uni.purchase_credits(&student, credits, price)?;
        }
        students.push(student);
    }
    tracing::info!(
        students = students.len(),
        courses = codes.len(),
        supply = %uni.total_supply(),
        "season prepared"
    );

    let round_secs = i64::try_from(params.round_secs).map_err(config_err)?;
    let mut reports = Vec::with_capacity(params.rounds);
    for _ in 0..params.rounds {
        let round_id = uni.open_round(&admin, params.round_secs)?;
        let mut placed = 0usize;
        for student in &students {
            for _ in 0..rng.gen_range(1..=3) {
                let available = uni.unreserved(student);
                if available == 0 {
                    break;
                }
                let code = &codes[rng.gen_range(0..codes.len())];
                let amount = rng.gen_range(1..=available);
                match uni.place_bid(student, code, amount) {
                    Ok(_) => placed += 1,
                    Err(e) => {
                        tracing::debug!(%student, course = %code, error = %e, "bid refused");
                    }
                }
            }
        }

        clock.advance_secs(round_secs + 1);
        let report = uni.close_round(&admin)?;
        tracing::info!(
            round = %round_id,
            placed,
            awards = report.awards.len(),
            rejections = report.rejections.len(),
            discarded = report.discarded.len(),
            burned = %report.burned_total(),
            award_root = %report.award_root_hex(),
            "round settled"
        );
        reports.push(report);
    }

    uni.verify_supply()?;
    tracing::info!(
        supply = %uni.total_supply(),
        fees = %uni.fees_collected(),
        events = uni.events().len(),
        "season finished"
    );
    Ok(reports)
}
