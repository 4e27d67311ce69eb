use super::*;

#[test]
fn every_command_parses_from_its_name() {
    for cmd in Command::ALL {
        assert_eq!(cmd.as_str().parse::<Command>(), Ok(cmd));
    }
}

#[test]
fn names_match_button_vocabulary() {
    let names: Vec<&str> = Command::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(names, ["edit_toggle", "clear", "allClear", "activateGameMode", "deactivateGameMode"]);
}

#[test]
fn unknown_name_is_rejected() {
    assert_eq!("AllClear".parse::<Command>(), Err(UnknownCommand("AllClear".into())));
    assert!("".parse::<Command>().is_err());
}

#[test]
fn only_game_commands_are_host_only() {
    assert!(Command::ActivateGameMode.host_only());
    assert!(Command::DeactivateGameMode.host_only());
    assert!(!Command::EditToggle.host_only());
    assert!(!Command::Clear.host_only());
    assert!(!Command::AllClear.host_only());
}
