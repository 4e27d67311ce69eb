use super::*;
use crate::tokens::tokenize;

fn eval_text(text: &str) -> Result<f64, EvalError> {
    evaluate(&tokenize(text), |addr, _depth| match addr.label().as_str() {
        "A1" => Ok(2.0),
        "B2" => Ok(10.0),
        other => Err(EvalError::BadReference(other.to_string())),
    })
}

#[test]
fn respects_operator_precedence() {
    assert_eq!(eval_text("3+4*2"), Ok(11.0));
    assert_eq!(eval_text("(3+4)*2"), Ok(14.0));
}

#[test]
fn resolves_cell_references() {
    assert_eq!(eval_text("3+B2"), Ok(13.0));
    assert_eq!(eval_text("A1*B2-1"), Ok(19.0));
}

#[test]
fn supports_unary_minus() {
    assert_eq!(eval_text("-3+5"), Ok(2.0));
    assert_eq!(eval_text("2*-A1"), Ok(-4.0));
}

#[test]
fn division_by_zero_is_reported() {
    assert_eq!(eval_text("1/0"), Err(EvalError::DivideByZero));
}

#[test]
fn dangling_operator_is_syntax_error() {
    assert_eq!(eval_text("3+"), Err(EvalError::Syntax));
    assert_eq!(eval_text("(3+4"), Err(EvalError::Syntax));
    assert_eq!(eval_text("3 4"), Err(EvalError::Syntax));
}

#[test]
fn unknown_reference_propagates_lookup_error() {
    assert_eq!(eval_text("C9"), Err(EvalError::BadReference("C9".into())));
}

#[test]
fn format_number_drops_trailing_zeros() {
    assert_eq!(format_number(24.0), "24");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(1.0 / 3.0), "0.333333");
}

#[test]
fn error_display_codes() {
    assert_eq!(EvalError::Syntax.display_code(), "#ERR");
    assert_eq!(EvalError::DivideByZero.display_code(), "#DIV/0!");
    assert_eq!(EvalError::BadReference("Z99".into()).display_code(), "#REF!");
}

#[test]
fn nesting_up_to_limit_evaluates() {
    let text = format!("{}7{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
    assert_eq!(eval_text(&text), Ok(7.0));
}

#[test]
fn deep_nesting_is_rejected_without_recursing() {
    let parens = format!("{}1{}", "(".repeat(3000), ")".repeat(3000));
    assert_eq!(eval_text(&parens), Err(EvalError::TooDeep));
    let negations = format!("{}1", "-".repeat(3000));
    assert_eq!(eval_text(&negations), Err(EvalError::TooDeep));
    assert_eq!(EvalError::TooDeep.display_code(), "#ERR");
}

#[test]
fn lookup_receives_reference_depth() {
    let seen = std::cell::Cell::new(0);
    let value = evaluate(&tokenize("((A1))"), |_, depth| {
        seen.set(depth);
        Ok(1.0)
    });
    assert_eq!(value, Ok(1.0));
    assert_eq!(seen.get(), 3);
}

#[test]
fn reference_past_budget_is_rejected() {
    let value = evaluate_at(&tokenize("A1"), MAX_NESTING, |_, _| Ok(1.0));
    assert_eq!(value, Err(EvalError::TooDeep));
}
