use super::*;

#[test]
fn only_game_host_is_host() {
    assert!(is_host("gameHost"));
    assert!(!is_host("gamehost"));
    assert!(!is_host("bob"));
    assert!(!is_host(""));
}

#[test]
fn role_reflects_mode_and_identity() {
    assert_eq!(GameRole::of(false, "gameHost"), GameRole::Inactive);
    assert_eq!(GameRole::of(false, "bob"), GameRole::Inactive);
    assert_eq!(GameRole::of(true, "gameHost"), GameRole::ActiveAsHost);
    assert_eq!(GameRole::of(true, "bob"), GameRole::ActiveAsGuest);
}

#[test]
fn control_bodies_parse_back() {
    let start = GameControl::Start(vec![3, 7, 1, 12]);
    assert_eq!(start.encode(), "!game start 3 7 1 12");
    assert_eq!(GameControl::parse("!game start 3 7 1 12"), Some(start));
    assert_eq!(GameControl::parse(&GameControl::Stop.encode()), Some(GameControl::Stop));
}

#[test]
fn formulas_and_malformed_controls_are_not_controls() {
    assert_eq!(GameControl::parse("6*4"), None);
    assert_eq!(GameControl::parse("!game start"), None);
    assert_eq!(GameControl::parse("!game start 3 x"), None);
    assert_eq!(GameControl::parse("!game stop now"), None);
    assert_eq!(GameControl::parse("!game pause"), None);
}
