//! End-to-end admission tests across the whole workspace.
//!
//! These drive a `University` through full rounds:
//! enrollment -> credit purchase -> bidding -> close -> settlement
//!
//! and check the properties that must hold across crates: quota limits,
//! budget ceilings, priority order, supply conservation, replay protection
//! and deterministic settlement.

use coursebid_types::*;
use coursebid_university::{
    ManualClock, SharedUniversity, University, identity_of, sign_enrollment, sign_transfer,
};
use ed25519_dalek::SigningKey;
use rust_decimal::Decimal;

const ROUND_SECS: u64 = 3_600;

/// Helper: one university with a chief, an admin, a lecturer and a clock.
struct Admission {
    uni: University,
    clock: ManualClock,
    admin_key: SigningKey,
    lecturer: Identity,
    next_seed: u8,
}

impl Admission {
    fn new(config: EngineConfig) -> Self {
        let start = chrono::DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let clock = ManualClock::new(start);
        let chief = identity_of(&SigningKey::from_bytes(&[1u8; 32]));
        let mut uni = University::new(config, chief, clock.clone()).expect("valid config");
        let admin_key = SigningKey::from_bytes(&[2u8; 32]);
        uni.appoint_admin(&chief, identity_of(&admin_key))
            .expect("chief appoints admin");
        let lecturer = identity_of(&SigningKey::from_bytes(&[3u8; 32]));
        uni.appoint_lecturer(&identity_of(&admin_key), lecturer)
            .expect("admin appoints lecturer");
        Self {
            uni,
            clock,
            admin_key,
            lecturer,
            next_seed: 10,
        }
    }

    fn admin(&self) -> Identity {
        identity_of(&self.admin_key)
    }

    /// Enroll a fresh student with a deterministic key and buy `credits`.
    fn student_with(&mut self, credits: u64, credit_cap: u64) -> (SigningKey, Identity) {
        let key = SigningKey::from_bytes(&[self.next_seed; 32]);
        self.next_seed += 1;
        let id = identity_of(&key);
        let auth = sign_enrollment(&self.admin_key, self.uni.system_id(), id, credit_cap);
        self.uni.enroll(&auth).expect("enrollment succeeds");
        if credits > 0 {
            let price = self.uni.quote(credits);
            self.uni
                .purchase_credits(&id, credits, price)
                .expect("purchase succeeds");
        }
        (key, id)
    }

    fn student(&mut self, credits: u64) -> Identity {
        let cap = self.uni.config().fees.max_credits_per_claimant;
        self.student_with(credits, cap).1
    }

    fn course(&mut self, code: &str, quota: u32, weight: u32) -> CourseCode {
        let code = CourseCode::new(code).expect("valid code");
        let admin = self.admin();
        self.uni
            .create_course(&admin, Course::new(code.clone(), quota, weight, self.lecturer))
            .expect("course created");
        code
    }

    fn open(&mut self) -> RoundId {
        let admin = self.admin();
        self.uni.open_round(&admin, ROUND_SECS).expect("round opens")
    }

    fn close(&mut self) -> SettlementReport {
        self.clock.advance_secs(i64::try_from(ROUND_SECS).unwrap() + 1);
        let admin = self.admin();
        self.uni.close_round(&admin).expect("round closes")
    }
}

fn admission() -> Admission {
    Admission::new(EngineConfig::default())
}

// =========================================================================
// Scenario A: quota-limited course, highest bids win
// =========================================================================

#[test]
fn scenario_a_top_two_bids_accepted() {
    let mut a = admission();
    let cs = a.course("CS101", 2, 5);
    let bidders: Vec<(Identity, u64)> = [1200, 800, 1000, 600, 600]
        .into_iter()
        .map(|amount| (a.student(2_000), amount))
        .collect();

    a.open();
    for (who, amount) in &bidders {
        a.uni.place_bid(who, &cs, *amount).unwrap();
    }
    let report = a.close();

    let accepted = a.uni.get_accepted(&cs).unwrap().to_vec();
    assert_eq!(accepted, vec![bidders[0].0, bidders[2].0]);
    assert_eq!(report.awards.len(), 2);
    assert_eq!(report.rejections.len(), 3);
    assert_eq!(report.burned_total(), 2_200);

    assert_eq!(a.uni.balance(&bidders[0].0), 800);
    assert_eq!(a.uni.balance(&bidders[2].0), 1_000);
    for (who, _) in [bidders[1], bidders[3], bidders[4]] {
        assert_eq!(a.uni.balance(&who), 2_000);
        assert_eq!(a.uni.reserved(&who), 0);
    }
    assert!(a.uni.get_bids(&cs).unwrap().is_empty());
    a.uni.verify_supply().unwrap();
}

#[test]
fn equal_bids_resolved_by_arrival() {
    let mut a = admission();
    let cs = a.course("CS102", 1, 5);
    let (first, second) = (a.student(100), a.student(100));
    a.open();
    a.uni.place_bid(&first, &cs, 50).unwrap();
    a.uni.place_bid(&second, &cs, 50).unwrap();
    a.close();
    assert_eq!(a.uni.get_accepted(&cs).unwrap(), &[first]);
}

// =========================================================================
// Scenario B: budget ceiling exhausted
// =========================================================================

#[test]
fn scenario_b_budget_exceeded() {
    let mut a = admission();
    let heavy = a.course("HEAVY", 5, 6);
    let other = a.course("OTHER", 5, 6);
    let student = a.student(10);

    a.open();
    a.uni.place_bid(&student, &heavy, 5).unwrap();
    let err = a.uni.place_bid(&student, &other, 4).unwrap_err();
    assert!(matches!(
        err,
        CoursebidError::BudgetExceeded {
            needed: 12,
            ceiling: 10
        }
    ));
    assert!(a.uni.get_bid(&other, &student).unwrap().is_none());
}

#[test]
fn course_heavier_than_paid_in_is_refused() {
    let mut a = admission();
    let thesis = a.course("THESIS", 1, 20);
    let student = a.student_with(10, 30).1;
    a.open();
    assert!(matches!(
        a.uni.place_bid(&student, &thesis, 5),
        Err(CoursebidError::BudgetExceeded {
            needed: 20,
            ceiling: 10
        })
    ));
    assert_eq!(a.uni.reserved(&student), 0);
    assert!(a.uni.get_bids(&thesis).unwrap().is_empty());
}

#[test]
fn awarded_weight_counts_in_later_rounds() {
    let mut a = admission();
    let first = a.course("FIRST", 5, 8);
    let second = a.course("SECOND", 5, 8);
    let student = a.student(10);

    a.open();
    a.uni.place_bid(&student, &first, 5).unwrap();
    a.close();
    assert_eq!(a.uni.awarded(&student), vec![first.clone()]);

    a.open();
    assert!(matches!(
        a.uni.place_bid(&student, &second, 5),
        Err(CoursebidError::BudgetExceeded { needed: 16, ceiling: 10 })
    ));
    assert!(matches!(
        a.uni.place_bid(&student, &first, 5),
        Err(CoursebidError::AlreadyAwarded { .. })
    ));
}

// =========================================================================
// Scenario C: duplicate bid, then change
// =========================================================================

#[test]
fn scenario_c_duplicate_then_change() {
    let mut a = admission();
    let cs = a.course("CS201", 1, 5);
    let (x, y) = (a.student(500), a.student(500));
    a.open();
    a.uni.place_bid(&x, &cs, 100).unwrap();
    a.uni.place_bid(&y, &cs, 200).unwrap();

    let err = a.uni.place_bid(&x, &cs, 300).unwrap_err();
    assert!(matches!(err, CoursebidError::DuplicateBid { .. }));

    a.uni.change_bid(&x, &cs, 300).unwrap();
    let order: Vec<Identity> = a.uni.get_bids(&cs).unwrap().iter().map(|e| e.claimant).collect();
    assert_eq!(order, vec![x, y]);
    assert_eq!(a.uni.reserved(&x), 300);

    let report = a.close();
    assert_eq!(report.awards[0].claimant, x);
    assert_eq!(report.awards[0].amount, 300);
    assert_eq!(a.uni.balance(&x), 200);
}

#[test]
fn removed_bid_frees_credit() {
    let mut a = admission();
    let cs = a.course("CS202", 1, 5);
    let other = a.course("CS203", 1, 5);
    let x = a.student(100);
    a.open();
    a.uni.place_bid(&x, &cs, 100).unwrap();
    assert!(matches!(
        a.uni.place_bid(&x, &other, 1),
        Err(CoursebidError::InsufficientFunds { .. })
    ));
    a.uni.remove_bid(&x, &cs).unwrap();
    a.uni.place_bid(&x, &other, 100).unwrap();
    assert_eq!(a.uni.pending_bids(&x).len(), 1);
}

// =========================================================================
// Scenario D: round lifecycle
// =========================================================================

#[test]
fn scenario_d_close_lifecycle() {
    let mut a = admission();
    let admin = a.admin();
    a.open();

    a.clock.advance_secs(i64::try_from(ROUND_SECS).unwrap());
    assert!(a.uni.is_bidding_open());
    assert!(matches!(
        a.uni.close_round(&admin),
        Err(CoursebidError::TooEarly { .. })
    ));

    a.clock.advance_secs(1);
    assert!(!a.uni.is_bidding_open());
    a.uni.close_round(&admin).unwrap();
    assert!(matches!(
        a.uni.close_round(&admin),
        Err(CoursebidError::RoundClosed)
    ));
}

#[test]
fn bids_frozen_after_deadline() {
    let mut a = admission();
    let cs = a.course("LATE", 1, 5);
    let x = a.student(100);
    a.open();
    a.uni.place_bid(&x, &cs, 10).unwrap();
    let y = a.student(100);
    a.clock.advance_secs(i64::try_from(ROUND_SECS).unwrap() + 1);
    assert!(matches!(a.uni.place_bid(&y, &cs, 10), Err(CoursebidError::RoundClosed)));
    assert!(matches!(a.uni.change_bid(&x, &cs, 20), Err(CoursebidError::RoundClosed)));
    assert!(matches!(a.uni.remove_bid(&x, &cs), Err(CoursebidError::RoundClosed)));
    assert!(a.uni.round_state().is_open());
}

// =========================================================================
// Scenario E: signed transfers
// =========================================================================

#[test]
fn scenario_e_transfer_replay_rejected() {
    let mut a = Admission::new(EngineConfig {
        transfers_enabled: true,
        ..EngineConfig::default()
    });
    let (sender_key, sender) = a.student_with(500, 500);
    let recipient = a.student(0);
    let fee = a.uni.config().fees.transfer_fee;
    let collected_before = a.uni.fees_collected();

    let auth = sign_transfer(&sender_key, a.uni.system_id(), recipient, 120, 7);
    a.uni.transfer(&auth, fee).unwrap();
    assert_eq!(a.uni.balance(&sender), 380);
    assert_eq!(a.uni.balance(&recipient), 120);
    assert_eq!(a.uni.fees_collected() - collected_before, fee);

    let err = a.uni.transfer(&auth, fee).unwrap_err();
    assert!(matches!(err, CoursebidError::ReplayedNonce { nonce: 7, .. }));
    assert_eq!(a.uni.balance(&sender), 380);
    assert_eq!(a.uni.balance(&recipient), 120);
    a.uni.verify_supply().unwrap();
}

#[test]
fn transfer_rejections_leave_balances() {
    let mut a = Admission::new(EngineConfig {
        transfers_enabled: true,
        ..EngineConfig::default()
    });
    let (sender_key, sender) = a.student_with(100, 100);
    let recipient = a.student(0);
    let fee = a.uni.config().fees.transfer_fee;

    let underpaid = sign_transfer(&sender_key, a.uni.system_id(), recipient, 10, 1);
    assert!(matches!(
        a.uni.transfer(&underpaid, fee - Decimal::new(1, 2)),
        Err(CoursebidError::InsufficientPayment { .. })
    ));

    let mut forged = sign_transfer(&sender_key, a.uni.system_id(), recipient, 10, 2);
    forged.amount = 90;
    assert!(matches!(
        a.uni.transfer(&forged, fee),
        Err(CoursebidError::InvalidSignature { .. })
    ));

    let outsider = identity_of(&SigningKey::from_bytes(&[200u8; 32]));
    let to_outsider = sign_transfer(&sender_key, a.uni.system_id(), outsider, 10, 3);
    assert!(matches!(
        a.uni.transfer(&to_outsider, fee),
        Err(CoursebidError::NotEnrolled(_))
    ));

    assert_eq!(a.uni.balance(&sender), 100);
    assert_eq!(a.uni.balance(&recipient), 0);

    // Rejected transfers do not consume their nonce.
    let ok = sign_transfer(&sender_key, a.uni.system_id(), recipient, 10, 1);
    a.uni.transfer(&ok, fee).unwrap();
}

// =========================================================================
// Cross-crate properties
// =========================================================================

#[test]
fn winner_of_one_course_loses_other_bids() {
    let mut a = admission();
    let algo = a.course("ALGO", 1, 5);
    let bio = a.course("BIO", 1, 5);
    let (x, y) = (a.student(1_000), a.student(1_000));
    a.open();
    a.uni.place_bid(&x, &algo, 300).unwrap();
    a.uni.place_bid(&x, &bio, 400).unwrap();
    a.uni.place_bid(&y, &bio, 50).unwrap();

    let report = a.close();
    assert_eq!(a.uni.get_accepted(&algo).unwrap(), &[x]);
    assert_eq!(a.uni.get_accepted(&bio).unwrap(), &[y]);
    assert_eq!(report.discarded.len(), 1);
    assert_eq!(a.uni.balance(&x), 700);
    assert_eq!(a.uni.balance(&y), 950);
}

#[test]
fn prerequisites_gate_bidding() {
    let mut a = admission();
    let intro = a.course("INTRO", 10, 3);
    let admin = a.admin();
    let advanced = CourseCode::new("ADVANCED").unwrap();
    a.uni
        .create_course(
            &admin,
            Course::new(advanced.clone(), 10, 3, a.lecturer).with_prerequisites([intro.clone()]),
        )
        .unwrap();
    let x = a.student(100);
    a.open();
    assert!(matches!(
        a.uni.place_bid(&x, &advanced, 10),
        Err(CoursebidError::PrerequisiteNotMet { .. })
    ));
    let lecturer = a.lecturer;
    a.uni.mark_completed(&lecturer, x, &intro).unwrap();
    a.uni.place_bid(&x, &advanced, 10).unwrap();
}

#[test]
fn reads_do_not_mutate() {
    let mut a = admission();
    let cs = a.course("READ", 2, 5);
    let x = a.student(100);
    a.open();
    a.uni.place_bid(&x, &cs, 40).unwrap();
    let events = a.uni.events().len();
    for _ in 0..3 {
        assert_eq!(a.uni.get_bids(&cs).unwrap().len(), 1);
        assert_eq!(a.uni.get_bid(&cs, &x).unwrap().unwrap().amount, 40);
        assert!(a.uni.get_accepted(&cs).unwrap().is_empty());
        assert_eq!(a.uni.unreserved(&x), 60);
    }
    assert_eq!(a.uni.events().len(), events);
    assert_eq!(a.uni.balance(&x), 100);
}

#[test]
fn replicas_agree_on_award_root() {
    fn run() -> SettlementReport {
        let mut a = admission();
        let courses = [a.course("A1", 2, 3), a.course("B1", 1, 3), a.course("C1", 3, 3)];
        let students: Vec<Identity> = (0..6).map(|_| a.student(1_000)).collect();
        a.open();
        for (i, who) in students.iter().enumerate() {
            for (j, course) in courses.iter().enumerate() {
                let amount = 10 + ((i * 7 + j * 13) % 50) as u64;
                a.uni.place_bid(who, course, amount).unwrap();
            }
        }
        a.close()
    }

    let first = run();
    let second = run();
    assert_eq!(first.awards, second.awards);
    assert_eq!(first.award_root, second.award_root);
    assert!(coursebid_auction::verify_award_root(&first.awards, &first.award_root));
}

#[test]
fn supply_conserved_across_rounds() {
    let mut a = admission();
    let courses = [a.course("S1", 2, 3), a.course("S2", 2, 3)];
    let students: Vec<Identity> = (0..5).map(|_| a.student(500)).collect();
    let minted: u128 = 2_500;

    let mut burned = 0u128;
    for round in 0..3u64 {
        a.open();
        for (i, who) in students.iter().enumerate() {
            let course = &courses[(i + round as usize) % 2];
            let _ = a.uni.place_bid(who, course, 10 + i as u64);
        }
        let report = a.close();
        burned += report.burned_total();
        assert_eq!(a.uni.total_supply(), minted - burned);
        a.uni.verify_supply().unwrap();
    }
    for course in &courses {
        assert!(a.uni.get_accepted(course).unwrap().len() <= 2);
    }
}

#[test]
fn shared_handle_runs_a_round() {
    let mut a = admission();
    let cs = a.course("SHARED", 1, 5);
    let x = a.student(100);
    let admin = a.admin();
    let clock = a.clock.clone();
    let shared = SharedUniversity::new(a.uni);

    shared.write(|u| u.open_round(&admin, ROUND_SECS)).unwrap();
    shared.write(|u| u.place_bid(&x, &cs, 25)).unwrap();
    assert!(shared.read(University::is_bidding_open));
    clock.advance_secs(i64::try_from(ROUND_SECS).unwrap() + 1);
    let report = shared.write(|u| u.close_round(&admin)).unwrap();
    assert_eq!(report.awards.len(), 1);
    assert_eq!(shared.read(|u| u.balance(&x)), 75);
}

#[test]
fn settlement_report_serializes() {
    let mut a = admission();
    let cs = a.course("JSON", 1, 5);
    let x = a.student(100);
    a.open();
    a.uni.place_bid(&x, &cs, 10).unwrap();
    let report = a.close();

    let json = serde_json::to_string(&report).unwrap();
    let back: SettlementReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.awards, report.awards);
    assert_eq!(back.award_root, report.award_root);

    let events = serde_json::to_string(a.uni.events()).unwrap();
    let back: Vec<UniversityEvent> = serde_json::from_str(&events).unwrap();
    assert_eq!(back.len(), a.uni.events().len());
}
