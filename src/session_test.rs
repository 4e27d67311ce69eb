use super::*;

#[test]
fn empty_user_name_has_no_identity() {
    let session = Session::new("", "sheet1");
    assert_eq!(session.identity(), None);
    assert_eq!(session.document_name(), "sheet1");
}

#[test]
fn set_user_name_enables_identity() {
    let mut session = Session::new("", "sheet1");
    session.set_user_name("alice");
    assert_eq!(session.identity(), Some("alice"));
}

#[test]
fn whitespace_user_name_counts_as_missing() {
    let mut session = Session::new("bob", "sheet1");
    session.set_user_name("   ");
    assert_eq!(session.identity(), None);
    assert_eq!(session.user_name(), "");
}
