use super::*;

#[test]
fn parses_simple_label() {
    let addr: CellAddress = "B7".parse().expect("label");
    assert_eq!(addr, CellAddress::new(1, 6));
}

#[test]
fn parses_lowercase_and_double_letter_columns() {
    assert_eq!("a1".parse::<CellAddress>().expect("label"), CellAddress::new(0, 0));
    assert_eq!("AA10".parse::<CellAddress>().expect("label"), CellAddress::new(26, 9));
}

#[test]
fn rejects_malformed_labels() {
    for bad in ["", "7", "B", "B0", "B-1", "1B", "B7C"] {
        assert!(bad.parse::<CellAddress>().is_err(), "{bad} should be rejected");
    }
}

#[test]
fn label_formats_back() {
    assert_eq!(CellAddress::new(7, 9).label(), "H10");
    assert_eq!(CellAddress::new(27, 0).to_string(), "AB1");
}

#[test]
fn column_names_roll_over() {
    assert_eq!(column_name(0), "A");
    assert_eq!(column_name(25), "Z");
    assert_eq!(column_name(26), "AA");
    assert_eq!(column_name(701), "ZZ");
    assert_eq!(column_name(702), "AAA");
}
