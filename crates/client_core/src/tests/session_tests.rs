use super::*;
use alloy_primitives::U256;
use shared::protocol::TxHash;

fn session_with_token(raw: &str) -> SessionController {
    let mut session = SessionController::new();
    session.set_token_id(raw);
    session
}

#[test]
fn new_session_starts_on_identify_step() {
    let session = SessionController::new();
    assert_eq!(session.step(), Step::Identify);
    assert!(session.token_id().is_empty());
    assert!(!session.avatar_transitioned());
    assert!(!session.slide_open());
    assert_eq!(session.custom_amount(), "");
}

#[test]
fn set_token_id_strips_every_non_digit() {
    let mut session = SessionController::new();
    for (raw, expected) in [
        ("42", "42"),
        (" 4 2 ", "42"),
        ("id:0x1f", "01"),
        ("no digits", ""),
        ("", ""),
    ] {
        assert_eq!(session.set_token_id(raw).as_str(), expected, "input {raw:?}");
        assert!(session
            .token_id()
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn advance_without_token_id_stays_on_step_one() {
    let mut session = SessionController::new();
    assert!(!session.can_advance());
    assert!(!session.advance());
    assert_eq!(session.step(), Step::Identify);
    assert!(!session.avatar_transitioned());
}

#[test]
fn advance_and_retreat_toggle_avatar_transition() {
    let mut session = session_with_token("42");
    assert!(session.advance());
    assert_eq!(session.step(), Step::Pay);
    assert!(session.avatar_transitioned());
    assert!(session.shows_nav_avatar());

    session.retreat();
    assert_eq!(session.step(), Step::Identify);
    assert!(!session.avatar_transitioned());
    assert!(!session.shows_nav_avatar());
}

#[test]
fn retreat_has_no_guard() {
    let mut session = SessionController::new();
    session.retreat();
    assert_eq!(session.step(), Step::Identify);
}

#[test]
fn presets_one_two_five_sum_to_eight() {
    let mut session = session_with_token("42");
    session.toggle_amount(1);
    session.toggle_amount(2);
    session.toggle_amount(5);
    assert_eq!(session.custom_amount(), "8");
}

#[test]
fn toggling_twice_restores_selection() {
    let mut session = session_with_token("42");
    session.toggle_amount(10);
    let before = session.amounts().selected().clone();
    session.toggle_amount(50);
    session.toggle_amount(50);
    assert_eq!(session.amounts().selected(), &before);
}

#[test]
fn invalid_custom_amount_is_rejected() {
    let mut session = SessionController::new();
    assert!(session.set_custom_amount("7.5"));
    assert!(!session.set_custom_amount("12.345"));
    assert_eq!(session.custom_amount(), "7.5");
}

#[test]
fn compute_energy_uses_unit_price() {
    assert_eq!(SessionController::compute_energy("6"), 100.0);
}

#[test]
fn energy_label_only_for_positive_amounts() {
    let mut session = SessionController::new();
    assert_eq!(session.energy_label(), None);
    session.set_custom_amount("6");
    assert_eq!(session.energy_label().as_deref(), Some("100.00 kWh"));
    session.set_custom_amount("0");
    assert_eq!(session.energy_label(), None);
}

#[test]
fn builds_payment_intent_from_token_and_amount() {
    let mut session = session_with_token("42");
    session.set_custom_amount("10");
    assert_eq!(
        session.build_payment_intent(),
        Some(PaymentIntent::new(42u64, 10u64))
    );
}

#[test]
fn payment_intent_requires_token_and_positive_whole_amount() {
    let mut session = SessionController::new();
    session.set_custom_amount("10");
    assert_eq!(session.build_payment_intent(), None);

    session.set_token_id("42");
    session.set_custom_amount("0");
    assert_eq!(session.build_payment_intent(), None);

    session.set_custom_amount("");
    assert_eq!(session.build_payment_intent(), None);

    session.set_custom_amount("2.50");
    assert_eq!(session.build_payment_intent(), None);
}

#[test]
fn large_token_ids_are_kept_as_256_bit_integers() {
    let mut session = session_with_token("123456789012345678901234567890");
    session.set_custom_amount("1");
    let intent = session.build_payment_intent().expect("intent");
    assert_eq!(
        intent.token_id,
        U256::from_str_radix("123456789012345678901234567890", 10).expect("u256")
    );
}

#[test]
fn restore_jumps_to_payment_step() {
    let mut session = SessionController::new();
    assert!(session.restore(&TokenId::sanitize("99")));
    assert_eq!(session.step(), Step::Pay);
    assert!(session.avatar_transitioned());
    assert_eq!(session.token_id().as_str(), "99");

    let mut untouched = SessionController::new();
    assert!(!untouched.restore(&TokenId::default()));
    assert_eq!(untouched.step(), Step::Identify);
}

#[test]
fn seed_applies_id_and_valid_amount_only() {
    let mut session = SessionController::new();
    assert!(session.seed(&LaunchParams::new(Some("m-17".into()), Some("3.333".into()))));
    assert_eq!(session.token_id().as_str(), "17");
    assert_eq!(session.custom_amount(), "");
    assert_eq!(session.step(), Step::Identify);

    assert!(!session.seed(&LaunchParams::new(None, Some("3.33".into()))));
    assert_eq!(session.token_id().as_str(), "17");
    assert_eq!(session.custom_amount(), "3.33");
}

#[test]
fn launch_id_without_digits_keeps_restored_token() {
    let mut session = SessionController::new();
    let persist = session.load(
        Some(&TokenId::sanitize("42")),
        &LaunchParams::new(Some("abc".into()), None),
    );
    assert!(!persist);
    assert_eq!(session.step(), Step::Pay);
    assert_eq!(session.token_id().as_str(), "42");
    assert!(session.shows_nav_avatar());
}

#[test]
fn launch_id_without_digits_on_fresh_session_stays_on_identify() {
    let mut session = SessionController::new();
    assert!(!session.load(None, &LaunchParams::new(Some("#".into()), Some("4".into()))));
    assert_eq!(session.step(), Step::Identify);
    assert!(session.token_id().is_empty());
    assert_eq!(session.custom_amount(), "4");
}

#[test]
fn load_lets_launch_id_override_restored_token() {
    let mut session = SessionController::new();
    assert!(session.load(
        Some(&TokenId::sanitize("42")),
        &LaunchParams::new(Some("77".into()), None),
    ));
    assert_eq!(session.step(), Step::Pay);
    assert_eq!(session.token_id().as_str(), "77");
}

#[test]
fn submit_is_disabled_while_pending_or_without_amount() {
    let mut session = session_with_token("42");
    assert!(!session.can_submit(&TransactionStatus::Idle));

    session.set_custom_amount("5");
    assert!(session.can_submit(&TransactionStatus::Idle));
    assert!(!session.can_submit(&TransactionStatus::Pending(TxHash::ZERO)));
    assert!(session.can_submit(&TransactionStatus::Failed("reverted".into())));
}

#[test]
fn slides_open_and_close() {
    let mut session = SessionController::new();
    session.open_slides();
    assert!(session.slide_open());
    session.close_slides();
    assert!(!session.slide_open());
}

#[test]
fn snapshot_reflects_state() {
    let mut session = session_with_token("8");
    session.advance();
    session.toggle_amount(2);
    session.toggle_amount(1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.step, 2);
    assert_eq!(snapshot.token_id, "8");
    assert_eq!(snapshot.selected_amounts, vec![1, 2]);
    assert_eq!(snapshot.custom_amount, "3");
    assert_eq!(snapshot.energy_kwh, 50.0);
}
